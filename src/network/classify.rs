//! Reciprocity and cross-network edge classification.
//!
//! Works on the boolean adjacency matrices of the classified valence `X`
//! and its reference valence `Y`. Reciprocal structure is found with the
//! element-wise product `X ∘ Xᵀ`; the strict upper triangle keeps one cell
//! per unordered pair so symmetric pairs are never counted twice.
//!
//! | bucket    | cells                                  | stored as      |
//! |-----------|----------------------------------------|----------------|
//! | type_v    | `upper(X∘Xᵀ ∘ Y∘Yᵀ)`                   | unordered pair |
//! | type_ii   | `upper(X∘Xᵀ − Y∘Yᵀ)`                   | unordered pair |
//! | type_iii  | `(X − Xᵀ) ∘ Y`                         | directed edge  |
//! | type_iv   | `((X − Xᵀ) − Y) ∘ Yᵀ`                  | directed edge  |
//! | type_i    | `(X − Xᵀ) − Y − Yᵀ`                    | directed edge  |

use super::models::{AdjacencyMatrix, EdgeClassification, Network};

pub struct EdgeClassifier;

impl EdgeClassifier {
    /// Classify the edges of `network` against `reference`.
    pub fn classify(network: &Network, reference: &Network) -> EdgeClassification {
        let classification = Self::classify_matrices(&network.adjacency, &reference.adjacency);
        tracing::debug!(
            valence = %network.valence,
            type_i = classification.type_i.len(),
            type_ii = classification.type_ii.len(),
            type_iii = classification.type_iii.len(),
            type_iv = classification.type_iv.len(),
            type_v = classification.type_v.len(),
            "Edges classified"
        );
        classification
    }

    pub fn classify_matrices(x: &AdjacencyMatrix, y: &AdjacencyMatrix) -> EdgeClassification {
        let x_t = x.transpose();
        let y_t = y.transpose();

        let reciprocal_x = x.hadamard(&x_t);
        let reciprocal_y = y.hadamard(&y_t);
        let one_way_x = x.subtract(&x_t);

        let type_v = reciprocal_x.hadamard(&reciprocal_y).upper_triangle();
        let type_ii = reciprocal_x.subtract(&reciprocal_y).upper_triangle();
        let type_iii = one_way_x.hadamard(y);
        let not_same_direction = one_way_x.subtract(y);
        let type_iv = not_same_direction.hadamard(&y_t);
        let type_i = not_same_direction.subtract(&y_t);

        EdgeClassification {
            type_i: x.label(&type_i.nonzero()),
            type_ii: x.label(&type_ii.nonzero()),
            type_iii: x.label(&type_iii.nonzero()),
            type_iv: x.label(&type_iv.nonzero()),
            type_v: x.label(&type_v.nonzero()),
        }
    }
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::network::models::{EdgePair, NodeId};
    use std::collections::HashSet;

    fn matrix(n: usize, edges: &[(usize, usize)]) -> AdjacencyMatrix {
        let members: Vec<NodeId> = (0..n).map(|i| ((b'A' + i as u8) as char).to_string()).collect();
        let mut m = AdjacencyMatrix::zeros(members);
        for &(i, j) in edges {
            m.cells[i][j] = 1;
        }
        m
    }

    fn pair(a: &str, b: &str) -> EdgePair {
        (a.to_string(), b.to_string())
    }

    fn buckets(c: &EdgeClassification) -> [&Vec<EdgePair>; 5] {
        [&c.type_i, &c.type_ii, &c.type_iii, &c.type_iv, &c.type_v]
    }

    #[test]
    fn test_reciprocal_pair_counted_once() {
        // A↔B, A→C
        let x = matrix(3, &[(0, 1), (1, 0), (0, 2)]);
        let y = matrix(3, &[]);
        let c = EdgeClassifier::classify_matrices(&x, &y);

        assert_eq!(c.type_ii, vec![pair("A", "B")]);
        assert_eq!(c.type_i, vec![pair("A", "C")]);
        assert!(c.type_iii.is_empty() && c.type_iv.is_empty() && c.type_v.is_empty());
    }

    #[test]
    fn test_cross_network_buckets() {
        // X: A↔B, A→C, B→C, D→A     Y: A↔B, A→C, C→B
        let x = matrix(4, &[(0, 1), (1, 0), (0, 2), (1, 2), (3, 0)]);
        let y = matrix(4, &[(0, 1), (1, 0), (0, 2), (2, 1)]);
        let c = EdgeClassifier::classify_matrices(&x, &y);

        assert_eq!(c.type_v, vec![pair("A", "B")]);
        assert!(c.type_ii.is_empty());
        assert_eq!(c.type_iii, vec![pair("A", "C")]);
        assert_eq!(c.type_iv, vec![pair("B", "C")]);
        assert_eq!(c.type_i, vec![pair("D", "A")]);
    }

    #[test]
    fn test_buckets_disjoint_and_cover_edges() {
        let x = matrix(
            5,
            &[(0, 1), (1, 0), (1, 2), (2, 1), (2, 3), (3, 4), (4, 0), (0, 3)],
        );
        let y = matrix(5, &[(1, 2), (2, 1), (3, 2), (0, 3), (4, 1)]);
        let c = EdgeClassifier::classify_matrices(&x, &y);

        let all = buckets(&c);
        for i in 0..all.len() {
            for j in (i + 1)..all.len() {
                let a: HashSet<&EdgePair> = all[i].iter().collect();
                assert!(
                    all[j].iter().all(|e| !a.contains(e)),
                    "buckets {} and {} overlap",
                    i,
                    j
                );
            }
        }

        let mut expected = x.label(&x.nonzero());
        expected.sort();
        assert_eq!(c.covered_edges(), expected);

        // A reciprocal pair contributes two directed edges.
        assert!(2 * c.reciprocal_pairs() <= x.count_nonzero());
    }
}
