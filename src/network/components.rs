//! Cliques and connected components.
//!
//! - **Maximal cliques** on the undirected projection (Bron–Kerbosch with pivoting)
//! - **Strongly connected components** via `petgraph::algo::tarjan_scc`
//! - **Weakly connected components** via BFS over both edge directions
//!
//! Only groups of at least `min_component_size` members are reported,
//! largest first. A weakly connected component with the same member set as
//! a reported strongly connected component is left out of the weak list.

use petgraph::algo::tarjan_scc;
use petgraph::graph::NodeIndex;
use petgraph::Direction;
use std::collections::{BTreeSet, VecDeque};

use super::algorithms::undirected_neighbors;
use super::models::{Component, ComponentKind, ComponentSet, Network, SocioGraph};

pub struct ComponentFinder;

impl ComponentFinder {
    pub fn find(network: &Network, min_size: usize) -> ComponentSet {
        let graph = &network.graph;

        let cliques = to_components(graph, maximal_cliques(graph), ComponentKind::Clique, min_size);
        let strongly_connected = to_components(
            graph,
            strongly_connected(graph),
            ComponentKind::StronglyConnected,
            min_size,
        );
        let weakly_connected: Vec<Component> = to_components(
            graph,
            weakly_connected(graph),
            ComponentKind::WeaklyConnected,
            min_size,
        )
        .into_iter()
        .filter(|weak| !strongly_connected.iter().any(|s| s.members == weak.members))
        .collect();

        tracing::debug!(
            valence = %network.valence,
            cliques = cliques.len(),
            strongly_connected = strongly_connected.len(),
            weakly_connected = weakly_connected.len(),
            "Components found"
        );

        ComponentSet {
            cliques,
            strongly_connected,
            weakly_connected,
        }
    }
}

/// Sort members into member order, drop small groups, largest first.
/// Equal sizes keep member order of their first member.
fn to_components(
    graph: &SocioGraph,
    groups: Vec<Vec<usize>>,
    kind: ComponentKind,
    min_size: usize,
) -> Vec<Component> {
    let mut groups: Vec<Vec<usize>> = groups
        .into_iter()
        .filter(|g| g.len() >= min_size)
        .map(|mut g| {
            g.sort_unstable();
            g
        })
        .collect();
    groups.sort_by(|a, b| b.len().cmp(&a.len()).then_with(|| a.cmp(b)));

    let g = &graph.graph;
    groups
        .into_iter()
        .map(|members| Component {
            kind,
            members: members
                .into_iter()
                .map(|i| g[NodeIndex::new(i)].clone())
                .collect(),
        })
        .collect()
}

// ============================================================================
// Maximal cliques (Bron–Kerbosch with pivot)
// ============================================================================

pub fn maximal_cliques(graph: &SocioGraph) -> Vec<Vec<usize>> {
    let neighbors = undirected_neighbors(graph);
    let candidates: BTreeSet<usize> = (0..neighbors.len()).collect();
    let mut cliques = Vec::new();
    bron_kerbosch(
        &neighbors,
        &mut Vec::new(),
        candidates,
        BTreeSet::new(),
        &mut cliques,
    );
    cliques
}

fn bron_kerbosch(
    neighbors: &[BTreeSet<usize>],
    current: &mut Vec<usize>,
    mut candidates: BTreeSet<usize>,
    mut excluded: BTreeSet<usize>,
    out: &mut Vec<Vec<usize>>,
) {
    if candidates.is_empty() {
        if excluded.is_empty() {
            out.push(current.clone());
        }
        return;
    }

    // Pivot: the vertex covering most candidates.
    let pivot = candidates
        .iter()
        .chain(&excluded)
        .copied()
        .max_by_key(|&u| neighbors[u].intersection(&candidates).count())
        .unwrap_or(0);

    let branch: Vec<usize> = candidates.difference(&neighbors[pivot]).copied().collect();
    for v in branch {
        current.push(v);
        bron_kerbosch(
            neighbors,
            current,
            candidates.intersection(&neighbors[v]).copied().collect(),
            excluded.intersection(&neighbors[v]).copied().collect(),
            out,
        );
        current.pop();
        candidates.remove(&v);
        excluded.insert(v);
    }
}

// ============================================================================
// Connected components
// ============================================================================

pub fn strongly_connected(graph: &SocioGraph) -> Vec<Vec<usize>> {
    tarjan_scc(&graph.graph)
        .into_iter()
        .map(|scc| scc.into_iter().map(|idx| idx.index()).collect())
        .collect()
}

pub fn weakly_connected(graph: &SocioGraph) -> Vec<Vec<usize>> {
    let g = &graph.graph;
    let mut component_of: Vec<Option<usize>> = vec![None; g.node_count()];
    let mut components: Vec<Vec<usize>> = Vec::new();

    for start in g.node_indices() {
        if component_of[start.index()].is_some() {
            continue;
        }
        let id = components.len();
        let mut members = vec![start.index()];
        let mut queue = VecDeque::new();
        queue.push_back(start);
        component_of[start.index()] = Some(id);

        while let Some(current) = queue.pop_front() {
            let around = g
                .neighbors_directed(current, Direction::Outgoing)
                .chain(g.neighbors_directed(current, Direction::Incoming));
            for neighbor in around {
                if component_of[neighbor.index()].is_none() {
                    component_of[neighbor.index()] = Some(id);
                    members.push(neighbor.index());
                    queue.push_back(neighbor);
                }
            }
        }
        components.push(members);
    }
    components
}

// ============================================================================
// Tests
// ============================================================================
