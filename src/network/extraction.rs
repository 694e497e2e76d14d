//! Nominations → petgraph extraction.
//!
//! Converts the packed nomination lists of a request into one directed
//! graph per valence. Every declared member becomes a node, including
//! members who neither nominate nor are nominated, so that node sets and
//! adjacency ordering are identical across valences.
//!
//! Input is expected to have passed the upstream validator. Anything that
//! slips through (non-symbol ids, self-nominations, targets outside the
//! group) is a contract violation and is rejected, never repaired.

use std::collections::HashSet;

use crate::error::{AnalysisError, Result};

use super::models::{
    AdjacencyMatrix, AnalysisInput, Network, NodeId, Nomination, NominationEntry, PerValence,
    SocioGraph, Valence,
};

/// Builds the per-valence networks of a request.
pub struct NetworkBuilder;

impl NetworkBuilder {
    /// Build both valences against the shared member list.
    pub fn build_all(input: &AnalysisInput) -> Result<PerValence<Network>> {
        let unpacked_a = Self::unpack(Valence::A, &input.a)?;
        let unpacked_b = Self::unpack(Valence::B, &input.b)?;
        let members = Self::declared_members(&unpacked_a, &unpacked_b);

        Ok(PerValence::new(
            Self::build(Valence::A, &members, &unpacked_a)?,
            Self::build(Valence::B, &members, &unpacked_b)?,
        ))
    }

    /// Unpack `{"A": "B,C"}` entries into [`Nomination`]s.
    pub fn unpack(valence: Valence, entries: &[NominationEntry]) -> Result<Vec<Nomination>> {
        let mut seen: HashSet<NodeId> = HashSet::with_capacity(entries.len());
        let mut out = Vec::with_capacity(entries.len());

        for entry in entries {
            if entry.0.len() != 1 {
                return Err(AnalysisError::MalformedNomination {
                    valence,
                    source_id: entry.0.keys().cloned().collect::<Vec<_>>().join(","),
                    detail: format!("expected exactly one source, got {}", entry.0.len()),
                });
            }
            for (source, packed) in &entry.0 {
                let source = source.trim().to_string();
                if !is_member_symbol(&source) {
                    return Err(AnalysisError::MalformedNomination {
                        valence,
                        source_id: source,
                        detail: "source is not a single alphabetic symbol".into(),
                    });
                }
                if !seen.insert(source.clone()) {
                    return Err(AnalysisError::DuplicateMember {
                        valence,
                        member: source,
                    });
                }

                let targets = parse_targets(valence, &source, packed.as_deref())?;
                out.push(Nomination { source, targets });
            }
        }
        Ok(out)
    }

    /// Keys of valence A in order, followed by keys that only appear in B.
    pub fn declared_members(a: &[Nomination], b: &[Nomination]) -> Vec<NodeId> {
        let mut seen = HashSet::new();
        a.iter()
            .chain(b)
            .filter(|n| seen.insert(n.source.clone()))
            .map(|n| n.source.clone())
            .collect()
    }

    /// Build one valence's graph, isolated set and adjacency matrix.
    pub fn build(
        valence: Valence,
        members: &[NodeId],
        nominations: &[Nomination],
    ) -> Result<Network> {
        let edge_hint: usize = nominations.iter().map(|n| n.targets.len()).sum();
        let mut graph = SocioGraph::with_capacity(members.len(), edge_hint);
        for member in members {
            graph.add_node(member);
        }

        for nomination in nominations {
            for target in &nomination.targets {
                if graph.add_edge(&nomination.source, target).is_none() {
                    return Err(AnalysisError::UnknownMember {
                        valence,
                        source_id: nomination.source.clone(),
                        target: target.clone(),
                    });
                }
            }
        }

        let edges = graph.edge_pairs();

        // Symmetric difference between declared members and edge endpoints.
        let connected: HashSet<&str> = edges
            .iter()
            .flat_map(|(s, t)| [s.as_str(), t.as_str()])
            .collect();
        let declared: HashSet<&str> = members.iter().map(String::as_str).collect();
        let unconnected: HashSet<&str> =
            declared.symmetric_difference(&connected).copied().collect();
        let isolated: Vec<NodeId> = members
            .iter()
            .filter(|m| unconnected.contains(m.as_str()))
            .cloned()
            .collect();

        let adjacency = AdjacencyMatrix::from_graph(members, &graph);

        tracing::debug!(
            valence = %valence,
            nodes = graph.node_count(),
            edges = graph.edge_count(),
            isolated = isolated.len(),
            "Network built"
        );

        Ok(Network {
            valence,
            members: members.to_vec(),
            edges,
            isolated,
            adjacency,
            graph,
        })
    }
}

fn is_member_symbol(s: &str) -> bool {
    let mut chars = s.chars();
    matches!((chars.next(), chars.next()), (Some(c), None) if c.is_alphabetic())
}

fn parse_targets(valence: Valence, source: &str, packed: Option<&str>) -> Result<Vec<NodeId>> {
    let Some(packed) = packed else {
        return Ok(Vec::new());
    };

    let mut targets: Vec<NodeId> = Vec::new();
    for raw in packed.split(',') {
        let target = raw.trim();
        if target.is_empty() {
            continue;
        }
        if !is_member_symbol(target) {
            return Err(AnalysisError::MalformedNomination {
                valence,
                source_id: source.to_string(),
                detail: format!("target '{}' is not a single alphabetic symbol", target),
            });
        }
        if target == source {
            return Err(AnalysisError::MalformedNomination {
                valence,
                source_id: source.to_string(),
                detail: "self-nomination".into(),
            });
        }
        if !targets.iter().any(|t| t == target) {
            targets.push(target.to_string());
        }
    }
    Ok(targets)
}

// ============================================================================
// Tests
// ============================================================================
