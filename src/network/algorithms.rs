//! Graph algorithms.
//!
//! Implements the node- and network-level measures on [`SocioGraph`]:
//! - **In-degree centrality**: in-degree / (n − 1)
//! - **Katz centrality**: power iteration over incoming edges, L2-normalized
//! - **PageRank**: power iteration (custom implementation)
//! - **Betweenness centrality**: via `rustworkx_core::centrality::betweenness_centrality`
//! - **Closeness centrality**: incoming BFS distances, Wasserman–Faust scaling
//! - **HITS hubs**: power iteration on `A·Aᵀ`, sum-normalized, absolute value
//! - **Transitivity / centralization**: on the undirected projection
//!
//! Node-level results are `Vec<f64>` indexed by `NodeIndex::index()`, which
//! is the member order of the valence.

use petgraph::graph::NodeIndex;
use petgraph::visit::EdgeRef;
use petgraph::Direction;
use std::collections::{BTreeSet, VecDeque};

use crate::error::{AnalysisError, Result};
use crate::AnalysisConfig;

use super::models::{SocioGraph, Valence};

// ============================================================================
// Degree centrality
// ============================================================================

/// In-degree divided by the number of possible nominators.
pub fn in_degree_centrality(graph: &SocioGraph) -> Vec<f64> {
    let n = graph.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }
    graph
        .graph
        .node_indices()
        .map(|idx| graph.in_degree(idx) as f64 / (n - 1) as f64)
        .collect()
}

// ============================================================================
// Katz centrality (power iteration)
// ============================================================================

/// Largest attenuation kept for a graph, as a share of `1 / λmax`.
const KATZ_SPECTRAL_MARGIN: f64 = 0.9;

/// Katz centrality: `x = α·Aᵀx + β`, normalized to unit L2 norm.
///
/// `α` is capped at `0.9 / d`, where `d` is the smaller of the maximum in-
/// and out-degree. `d` bounds the spectral radius, so the iteration
/// contracts on every graph. [`AnalysisError::NoConvergence`] is left for
/// an iteration limit too small to reach the tolerance.
pub fn katz_centrality(
    graph: &SocioGraph,
    config: &AnalysisConfig,
    valence: Valence,
) -> Result<Vec<f64>> {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return Ok(Vec::new());
    }

    let alpha = katz_attenuation(graph, config.katz_alpha);
    if alpha < config.katz_alpha {
        tracing::debug!(
            valence = %valence,
            configured = config.katz_alpha,
            alpha,
            "Katz attenuation capped by spectral bound"
        );
    }
    let beta = config.katz_beta;
    let mut x: Vec<f64> = vec![0.0; n];

    for _ in 0..config.katz_max_iterations {
        let last = std::mem::replace(&mut x, vec![0.0; n]);

        for edge in g.edge_references() {
            x[edge.target().index()] += last[edge.source().index()];
        }
        for value in x.iter_mut() {
            *value = alpha * *value + beta;
        }

        let err: f64 = x.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if !err.is_finite() {
            break;
        }
        if err < n as f64 * config.katz_tolerance {
            let norm = x.iter().map(|v| v * v).sum::<f64>().sqrt();
            if norm > 0.0 {
                for value in x.iter_mut() {
                    *value /= norm;
                }
            }
            return Ok(x);
        }
    }

    Err(AnalysisError::NoConvergence {
        algorithm: "katz centrality",
        valence,
        iterations: config.katz_max_iterations,
    })
}

/// `min(alpha, 0.9 / d)` with `d = min(max in-degree, max out-degree)`.
pub fn katz_attenuation(graph: &SocioGraph, alpha: f64) -> f64 {
    let g = &graph.graph;
    let max_in = g.node_indices().map(|idx| graph.in_degree(idx)).max().unwrap_or(0);
    let max_out = g.node_indices().map(|idx| graph.out_degree(idx)).max().unwrap_or(0);
    let bound = max_in.min(max_out);
    if bound == 0 {
        alpha
    } else {
        alpha.min(KATZ_SPECTRAL_MARGIN / bound as f64)
    }
}

// ============================================================================
// PageRank (power iteration)
// ============================================================================

/// PageRank over the nominations of one valence, summing to 1.
///
/// Members who nominate nobody spread their score over the whole group.
/// That mass is pooled once per sweep and added to the teleport term.
pub fn pagerank(graph: &SocioGraph, config: &AnalysisConfig) -> Vec<f64> {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return Vec::new();
    }

    let d = config.pagerank_damping;
    let uniform = 1.0 / n as f64;
    let out_degree: Vec<usize> = g.node_indices().map(|idx| graph.out_degree(idx)).collect();

    let mut rank = vec![uniform; n];
    for _ in 0..config.pagerank_max_iterations {
        let dangling: f64 = rank
            .iter()
            .zip(&out_degree)
            .filter(|&(_, &k)| k == 0)
            .map(|(r, _)| r)
            .sum();
        let base = (1.0 - d) * uniform + d * dangling * uniform;

        let mut next = vec![base; n];
        for edge in g.edge_references() {
            let source = edge.source().index();
            next[edge.target().index()] += d * rank[source] / out_degree[source] as f64;
        }

        let delta: f64 = next.iter().zip(&rank).map(|(a, b)| (a - b).abs()).sum();
        rank = next;
        if delta < config.pagerank_tolerance {
            break;
        }
    }

    let total: f64 = rank.iter().sum();
    if total > 0.0 {
        rank.iter_mut().for_each(|r| *r /= total);
    }
    rank
}

// ============================================================================
// Betweenness Centrality (via rustworkx-core)
// ============================================================================

/// Normalized directed betweenness centrality, endpoints excluded.
pub fn betweenness_centrality(graph: &SocioGraph) -> Vec<f64> {
    let g = &graph.graph;
    if g.node_count() == 0 {
        return Vec::new();
    }

    let scores = rustworkx_core::centrality::betweenness_centrality(
        g, false, // include_endpoints
        true,  // normalized
        200,   // parallel_threshold (sequential for small graphs)
    );

    g.node_indices()
        .map(|idx| scores[idx.index()].unwrap_or(0.0))
        .collect()
}

// ============================================================================
// Closeness Centrality
// ============================================================================

/// Closeness over incoming shortest paths, scaled by the reachable share
/// of the group so that small reachable sets are not over-rewarded.
pub fn closeness_centrality(graph: &SocioGraph) -> Vec<f64> {
    let g = &graph.graph;
    let n = g.node_count();
    if n <= 1 {
        return vec![0.0; n];
    }

    g.node_indices()
        .map(|target| {
            let distances = bfs_distances(graph, target, Direction::Incoming);
            let reached = distances.iter().filter(|d| d.is_some()).count();
            let total: usize = distances.iter().flatten().sum();
            if total == 0 {
                return 0.0;
            }
            let others = (reached - 1) as f64;
            (others / total as f64) * (others / (n - 1) as f64)
        })
        .collect()
}

fn bfs_distances(graph: &SocioGraph, start: NodeIndex, direction: Direction) -> Vec<Option<usize>> {
    let g = &graph.graph;
    let mut dist: Vec<Option<usize>> = vec![None; g.node_count()];
    let mut queue = VecDeque::new();
    dist[start.index()] = Some(0);
    queue.push_back(start);

    while let Some(current) = queue.pop_front() {
        let d = dist[current.index()].unwrap_or(0);
        for neighbor in g.neighbors_directed(current, direction) {
            if dist[neighbor.index()].is_none() {
                dist[neighbor.index()] = Some(d + 1);
                queue.push_back(neighbor);
            }
        }
    }
    dist
}

// ============================================================================
// HITS hubs
// ============================================================================

/// Hub component of HITS, normalized to sum 1, reported as absolute values.
///
/// Non-convergence is logged and the last iterate is used: the scores only
/// feed a ranking, and the iteration on `A·Aᵀ` stays bounded.
pub fn hub_scores(graph: &SocioGraph, config: &AnalysisConfig, valence: Valence) -> Vec<f64> {
    let g = &graph.graph;
    let n = g.node_count();
    if n == 0 {
        return Vec::new();
    }
    if g.edge_count() == 0 {
        return vec![0.0; n];
    }

    let mut hubs: Vec<f64> = vec![1.0 / n as f64; n];
    let mut converged = false;

    for _ in 0..config.hits_max_iterations {
        let last = hubs.clone();

        let mut authorities = vec![0.0; n];
        for edge in g.edge_references() {
            authorities[edge.target().index()] += last[edge.source().index()];
        }
        hubs = vec![0.0; n];
        for edge in g.edge_references() {
            hubs[edge.source().index()] += authorities[edge.target().index()];
        }

        let max = hubs.iter().copied().fold(0.0f64, f64::max);
        if max > 0.0 {
            for h in hubs.iter_mut() {
                *h /= max;
            }
        }

        let err: f64 = hubs.iter().zip(&last).map(|(a, b)| (a - b).abs()).sum();
        if err < config.hits_tolerance {
            converged = true;
            break;
        }
    }

    if !converged {
        tracing::warn!(
            valence = %valence,
            iterations = config.hits_max_iterations,
            "HITS did not converge, using last iterate"
        );
    }

    let total: f64 = hubs.iter().sum();
    if total > 0.0 {
        for h in hubs.iter_mut() {
            *h = (*h / total).abs();
        }
    }
    hubs
}

// ============================================================================
// Undirected projection measures
// ============================================================================

/// Distinct neighbors of each node, ignoring direction.
pub fn undirected_neighbors(graph: &SocioGraph) -> Vec<BTreeSet<usize>> {
    let g = &graph.graph;
    g.node_indices()
        .map(|idx| {
            g.neighbors_directed(idx, Direction::Outgoing)
                .chain(g.neighbors_directed(idx, Direction::Incoming))
                .filter(|&n| n != idx)
                .map(|n| n.index())
                .collect()
        })
        .collect()
}

/// Global clustering coefficient: closed triplets over connected triplets.
pub fn transitivity(graph: &SocioGraph) -> f64 {
    let neighbors = undirected_neighbors(graph);
    let mut closed = 0usize;
    let mut triplets = 0usize;

    for adj in &neighbors {
        let k = adj.len();
        if k < 2 {
            continue;
        }
        triplets += k * (k - 1) / 2;

        let list: Vec<usize> = adj.iter().copied().collect();
        for i in 0..list.len() {
            for j in (i + 1)..list.len() {
                if neighbors[list[i]].contains(&list[j]) {
                    closed += 1;
                }
            }
        }
    }

    if triplets == 0 {
        0.0
    } else {
        closed as f64 / triplets as f64
    }
}

/// Freeman degree centralization on the undirected projection.
///
/// Groups with fewer than three members have no defined denominator and
/// report `0.0` (no concentration is measurable).
pub fn degree_centralization(graph: &SocioGraph) -> f64 {
    let n = graph.node_count();
    if n < 3 {
        return 0.0;
    }
    let degrees: Vec<usize> = undirected_neighbors(graph).iter().map(|s| s.len()).collect();
    let max = degrees.iter().copied().max().unwrap_or(0);
    let spread: usize = degrees.iter().map(|d| max - d).sum();
    spread as f64 / ((n - 1) * (n - 2)) as f64
}

/// Edges over possible directed edges.
pub fn density(graph: &SocioGraph) -> f64 {
    let n = graph.node_count();
    if n < 2 {
        return 0.0;
    }
    graph.edge_count() as f64 / (n * (n - 1)) as f64
}

/// Share of edges whose reverse edge also exists.
pub fn reciprocity(reciprocal_pairs: usize, edge_count: usize) -> f64 {
    if edge_count == 0 {
        0.0
    } else {
        (2 * reciprocal_pairs) as f64 / edge_count as f64
    }
}

// ============================================================================
// Tests
// ============================================================================
