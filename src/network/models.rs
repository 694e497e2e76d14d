//! Network data models.
//!
//! ## Input types
//! - [`NominationEntry`] / [`Nomination`]: packed and unpacked nomination lists
//! - [`AnalysisInput`]: the two nomination sequences of one request
//!
//! ## Graph types
//! - [`Valence`] / [`PerValence`]: positive (A) and negative (B) networks
//! - [`SocioGraph`]: petgraph wrapper with ID ↔ NodeIndex mapping
//! - [`AdjacencyMatrix`]: 0/1 matrix ordered by the declared member list
//! - [`Network`]: everything the builder produces for one valence
//!
//! ## Output types
//! - [`EdgeClassification`], [`MacroStats`], [`MicroStats`], [`ComponentSet`]

use petgraph::graph::{DiGraph, EdgeIndex, NodeIndex};
use petgraph::Direction;
use serde::{Deserialize, Serialize, Serializer};
use std::collections::{BTreeMap, HashMap};

/// Member identifier: a single alphabetic symbol such as `"A"`.
pub type NodeId = String;

/// Directed pair of member ids.
pub type EdgePair = (NodeId, NodeId);

// ============================================================================
// Valence
// ============================================================================

/// One of the two nomination networks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Valence {
    /// Positive nominations ("who do you choose").
    A,
    /// Negative nominations ("who do you reject").
    B,
}

impl Valence {
    pub const ALL: [Valence; 2] = [Valence::A, Valence::B];

    /// The reference valence used for cross-network comparisons.
    pub fn other(self) -> Valence {
        match self {
            Self::A => Self::B,
            Self::B => Self::A,
        }
    }
}

impl std::fmt::Display for Valence {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::A => write!(f, "a"),
            Self::B => write!(f, "b"),
        }
    }
}

/// A value computed independently for each valence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PerValence<T> {
    pub a: T,
    pub b: T,
}

impl<T> PerValence<T> {
    pub fn new(a: T, b: T) -> Self {
        Self { a, b }
    }

    pub fn get(&self, valence: Valence) -> &T {
        match valence {
            Valence::A => &self.a,
            Valence::B => &self.b,
        }
    }

    pub fn map<U>(&self, mut f: impl FnMut(Valence, &T) -> U) -> PerValence<U> {
        PerValence {
            a: f(Valence::A, &self.a),
            b: f(Valence::B, &self.b),
        }
    }

    pub fn iter(&self) -> impl Iterator<Item = (Valence, &T)> {
        [(Valence::A, &self.a), (Valence::B, &self.b)].into_iter()
    }
}

// ============================================================================
// Input types
// ============================================================================

/// One packed nomination as it arrives on the wire: `{"A": "B,C"}` or `{"A": null}`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NominationEntry(pub BTreeMap<String, Option<String>>);

impl NominationEntry {
    /// Build an entry from a source and a comma-separated target list.
    pub fn new(source: impl Into<String>, targets: Option<&str>) -> Self {
        let mut map = BTreeMap::new();
        map.insert(source.into(), targets.map(str::to_string));
        Self(map)
    }
}

/// An unpacked nomination: one source and its (possibly empty) targets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Nomination {
    pub source: NodeId,
    pub targets: Vec<NodeId>,
}

/// The full request: one nomination sequence per valence.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AnalysisInput {
    pub a: Vec<NominationEntry>,
    pub b: Vec<NominationEntry>,
}

impl AnalysisInput {
    pub fn entries(&self, valence: Valence) -> &[NominationEntry] {
        match valence {
            Valence::A => &self.a,
            Valence::B => &self.b,
        }
    }
}

// ============================================================================
// SocioGraph: petgraph wrapper with ID mapping
// ============================================================================

/// Wrapper around `petgraph::DiGraph` with ID ↔ NodeIndex mapping.
///
/// Nodes are inserted in declared member order, so `NodeIndex::index()`
/// doubles as the row/column of the valence's [`AdjacencyMatrix`].
#[derive(Debug, Clone, Default)]
pub struct SocioGraph {
    /// The underlying directed graph
    pub graph: DiGraph<NodeId, ()>,
    /// Mapping from member ID to petgraph NodeIndex
    pub id_to_index: HashMap<NodeId, NodeIndex>,
}

impl SocioGraph {
    pub fn with_capacity(nodes: usize, edges: usize) -> Self {
        Self {
            graph: DiGraph::with_capacity(nodes, edges),
            id_to_index: HashMap::with_capacity(nodes),
        }
    }

    /// Add a member. Returns the existing index if the member is already present.
    pub fn add_node(&mut self, id: &str) -> NodeIndex {
        if let Some(&idx) = self.id_to_index.get(id) {
            return idx;
        }
        let idx = self.graph.add_node(id.to_string());
        self.id_to_index.insert(id.to_string(), idx);
        idx
    }

    /// Add a nomination edge. Duplicate nominations collapse into one edge.
    /// Returns `None` if either endpoint is unknown.
    pub fn add_edge(&mut self, from_id: &str, to_id: &str) -> Option<EdgeIndex> {
        let from_idx = *self.id_to_index.get(from_id)?;
        let to_idx = *self.id_to_index.get(to_id)?;
        Some(self.graph.update_edge(from_idx, to_idx, ()))
    }

    pub fn get_index(&self, id: &str) -> Option<NodeIndex> {
        self.id_to_index.get(id).copied()
    }

    pub fn node_count(&self) -> usize {
        self.graph.node_count()
    }

    pub fn edge_count(&self) -> usize {
        self.graph.edge_count()
    }

    pub fn in_degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors_directed(idx, Direction::Incoming).count()
    }

    pub fn out_degree(&self, idx: NodeIndex) -> usize {
        self.graph.neighbors_directed(idx, Direction::Outgoing).count()
    }

    /// Out-neighbors of a node, in member order.
    pub fn out_neighbors(&self, idx: NodeIndex) -> Vec<NodeId> {
        let mut targets: Vec<NodeIndex> = self
            .graph
            .neighbors_directed(idx, Direction::Outgoing)
            .collect();
        targets.sort();
        targets.into_iter().map(|t| self.graph[t].clone()).collect()
    }

    /// All edges as member-id pairs, sorted by (source, target) member order.
    pub fn edge_pairs(&self) -> Vec<EdgePair> {
        let mut pairs: Vec<(NodeIndex, NodeIndex)> = self
            .graph
            .edge_indices()
            .filter_map(|e| self.graph.edge_endpoints(e))
            .collect();
        pairs.sort();
        pairs
            .into_iter()
            .map(|(s, t)| (self.graph[s].clone(), self.graph[t].clone()))
            .collect()
    }
}

// ============================================================================
// AdjacencyMatrix
// ============================================================================

/// Square 0/1 matrix indexed by the declared member list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AdjacencyMatrix {
    pub members: Vec<NodeId>,
    pub cells: Vec<Vec<u8>>,
}

impl AdjacencyMatrix {
    pub fn zeros(members: Vec<NodeId>) -> Self {
        let n = members.len();
        Self {
            members,
            cells: vec![vec![0; n]; n],
        }
    }

    pub fn from_graph(members: &[NodeId], graph: &SocioGraph) -> Self {
        let mut matrix = Self::zeros(members.to_vec());
        for edge in graph.graph.edge_indices() {
            if let Some((s, t)) = graph.graph.edge_endpoints(edge) {
                matrix.cells[s.index()][t.index()] = 1;
            }
        }
        matrix
    }

    pub fn size(&self) -> usize {
        self.members.len()
    }

    pub fn get(&self, row: usize, col: usize) -> bool {
        self.cells[row][col] != 0
    }

    pub fn transpose(&self) -> Self {
        let n = self.size();
        let mut out = Self::zeros(self.members.clone());
        for i in 0..n {
            for j in 0..n {
                out.cells[j][i] = self.cells[i][j];
            }
        }
        out
    }

    /// Element-wise product.
    pub fn hadamard(&self, other: &Self) -> Self {
        self.zip_with(other, |x, y| x & y)
    }

    /// Element-wise `self AND NOT other`.
    pub fn subtract(&self, other: &Self) -> Self {
        self.zip_with(other, |x, y| x & (1 - y))
    }

    /// Keep cells strictly above the diagonal.
    pub fn upper_triangle(&self) -> Self {
        let mut out = self.clone();
        for (i, row) in out.cells.iter_mut().enumerate() {
            for cell in row.iter_mut().take(i + 1) {
                *cell = 0;
            }
        }
        out
    }

    /// Keep cells strictly below the diagonal.
    pub fn lower_triangle(&self) -> Self {
        let mut out = self.clone();
        for (i, row) in out.cells.iter_mut().enumerate() {
            for cell in row.iter_mut().skip(i) {
                *cell = 0;
            }
        }
        out
    }

    pub fn row_sums(&self) -> Vec<usize> {
        self.cells
            .iter()
            .map(|row| row.iter().map(|&c| c as usize).sum())
            .collect()
    }

    pub fn col_sums(&self) -> Vec<usize> {
        self.transpose().row_sums()
    }

    /// Per-row count of reciprocated nominations (row sums of `M ∘ Mᵀ`).
    pub fn mutual_counts(&self) -> Vec<usize> {
        self.hadamard(&self.transpose()).row_sums()
    }

    /// Non-zero cells as (row, col), row-major.
    pub fn nonzero(&self) -> Vec<(usize, usize)> {
        let mut out = Vec::new();
        for (i, row) in self.cells.iter().enumerate() {
            for (j, &cell) in row.iter().enumerate() {
                if cell != 0 {
                    out.push((i, j));
                }
            }
        }
        out
    }

    pub fn count_nonzero(&self) -> usize {
        self.row_sums().iter().sum()
    }

    /// Translate index pairs to member-id pairs.
    pub fn label(&self, pairs: &[(usize, usize)]) -> Vec<EdgePair> {
        pairs
            .iter()
            .map(|&(i, j)| (self.members[i].clone(), self.members[j].clone()))
            .collect()
    }

    fn zip_with(&self, other: &Self, f: impl Fn(u8, u8) -> u8) -> Self {
        let mut out = Self::zeros(self.members.clone());
        for (i, row) in out.cells.iter_mut().enumerate() {
            for (j, cell) in row.iter_mut().enumerate() {
                *cell = f(self.cells[i][j], other.cells[i][j]);
            }
        }
        out
    }
}

// ============================================================================
// Network: builder output for one valence
// ============================================================================

#[derive(Debug, Clone, Serialize)]
pub struct Network {
    pub valence: Valence,
    /// Declared members, identical across valences
    pub members: Vec<NodeId>,
    /// Directed edges in member order
    pub edges: Vec<EdgePair>,
    /// Members without any edge in this valence
    pub isolated: Vec<NodeId>,
    pub adjacency: AdjacencyMatrix,
    #[serde(skip)]
    pub graph: SocioGraph,
}

// ============================================================================
// Edge classification
// ============================================================================

/// Reciprocity and cross-network labels for the edges of one valence.
///
/// The five buckets partition the valence's edges. Pair buckets
/// (`type_ii`, `type_v`) hold each unordered pair once as `(u, v)` with `u`
/// before `v` in member order and account for both directed edges.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct EdgeClassification {
    /// Non-reciprocal, no counterpart in the reference valence
    pub type_i: Vec<EdgePair>,
    /// Reciprocal here, not reciprocal in the reference valence
    pub type_ii: Vec<EdgePair>,
    /// Non-reciprocal, same direction also present in the reference valence
    pub type_iii: Vec<EdgePair>,
    /// Non-reciprocal, opposite direction present in the reference valence
    pub type_iv: Vec<EdgePair>,
    /// Reciprocal in both valences
    pub type_v: Vec<EdgePair>,
}

impl EdgeClassification {
    /// Unordered reciprocal pairs (`type_ii ∪ type_v`).
    pub fn reciprocal_pairs(&self) -> usize {
        self.type_ii.len() + self.type_v.len()
    }

    /// Directed edges that are not reciprocated.
    pub fn non_reciprocal(&self) -> Vec<EdgePair> {
        let mut out: Vec<EdgePair> = self
            .type_i
            .iter()
            .chain(&self.type_iii)
            .chain(&self.type_iv)
            .cloned()
            .collect();
        out.sort();
        out
    }

    /// Reciprocal pairs expanded to both directed edges.
    pub fn reciprocal(&self) -> Vec<EdgePair> {
        let mut out: Vec<EdgePair> = self
            .type_ii
            .iter()
            .chain(&self.type_v)
            .flat_map(|(u, v)| [(u.clone(), v.clone()), (v.clone(), u.clone())])
            .collect();
        out.sort();
        out
    }

    /// Every directed edge covered by the classification.
    pub fn covered_edges(&self) -> Vec<EdgePair> {
        let mut out = self.non_reciprocal();
        out.extend(self.reciprocal());
        out.sort();
        out
    }
}

// ============================================================================
// Statistics records
// ============================================================================

/// Network-level measures for one valence.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MacroStats {
    pub valence: Valence,
    pub node_count: usize,
    pub edge_count: usize,
    pub reciprocal_pairs: usize,
    pub density: f64,
    pub centralization: f64,
    pub transitivity: f64,
    pub reciprocity: f64,
}

/// The ranked node-level centralities.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CentralityMetric {
    InDegree,
    Katz,
    PageRank,
    Betweenness,
    Closeness,
    Hub,
}

impl CentralityMetric {
    pub const ALL: [CentralityMetric; 6] = [
        Self::InDegree,
        Self::Katz,
        Self::PageRank,
        Self::Betweenness,
        Self::Closeness,
        Self::Hub,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::InDegree => "in_degree",
            Self::Katz => "katz",
            Self::PageRank => "pagerank",
            Self::Betweenness => "betweenness",
            Self::Closeness => "closeness",
            Self::Hub => "hub",
        }
    }
}

impl std::fmt::Display for CentralityMetric {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// Whether a node sends and/or receives nominations. Serialized as its code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DegreeStatus {
    Normal,
    NoIncoming,
    NoOutgoing,
    Isolated,
}

impl DegreeStatus {
    pub fn from_degrees(in_degree: usize, out_degree: usize) -> Self {
        match (in_degree, out_degree) {
            (0, 0) => Self::Isolated,
            (0, _) => Self::NoIncoming,
            (_, 0) => Self::NoOutgoing,
            _ => Self::Normal,
        }
    }

    pub fn code(self) -> u8 {
        match self {
            Self::Normal => 0,
            Self::NoIncoming => 1,
            Self::NoOutgoing => 2,
            Self::Isolated => 3,
        }
    }
}

impl Serialize for DegreeStatus {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u8(self.code())
    }
}

/// One node's row in the micro table.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicroRow {
    pub node: NodeId,
    pub out_neighbors: Vec<NodeId>,
    pub in_degree: usize,
    pub out_degree: usize,
    pub degree_status: DegreeStatus,
    pub centrality: BTreeMap<CentralityMetric, f64>,
    /// Dense rank per centrality, descending (1 = most central)
    pub ranks: BTreeMap<CentralityMetric, usize>,
}

impl MicroRow {
    pub fn value(&self, metric: CentralityMetric) -> f64 {
        self.centrality.get(&metric).copied().unwrap_or(0.0)
    }

    pub fn rank(&self, metric: CentralityMetric) -> usize {
        self.ranks.get(&metric).copied().unwrap_or(0)
    }
}

/// Node-level measures for one valence, one row per member in member order.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MicroStats {
    pub valence: Valence,
    pub rows: Vec<MicroRow>,
}

impl MicroStats {
    pub fn row(&self, node: &str) -> Option<&MicroRow> {
        self.rows.iter().find(|r| r.node == node)
    }

    pub fn column(&self, metric: CentralityMetric) -> Vec<f64> {
        self.rows.iter().map(|r| r.value(metric)).collect()
    }
}

// ============================================================================
// Components
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ComponentKind {
    Clique,
    StronglyConnected,
    WeaklyConnected,
}

/// A group of at least `min_component_size` members.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Component {
    pub kind: ComponentKind,
    /// Members in member order
    pub members: Vec<NodeId>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct ComponentSet {
    pub cliques: Vec<Component>,
    pub strongly_connected: Vec<Component>,
    pub weakly_connected: Vec<Component>,
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn members(ids: &[&str]) -> Vec<NodeId> {
        ids.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_socio_graph_collapses_duplicate_edges() {
        let mut g = SocioGraph::with_capacity(2, 2);
        g.add_node("A");
        g.add_node("B");
        g.add_edge("A", "B");
        g.add_edge("A", "B");
        assert_eq!(g.edge_count(), 1);
        assert!(g.add_edge("A", "Z").is_none());
    }

    #[test]
    fn test_adjacency_triangles_and_mutuals() {
        let mut m = AdjacencyMatrix::zeros(members(&["A", "B", "C"]));
        m.cells[0][1] = 1;
        m.cells[1][0] = 1;
        m.cells[1][2] = 1;

        assert_eq!(m.mutual_counts(), vec![1, 1, 0]);
        assert_eq!(m.upper_triangle().nonzero(), vec![(0, 1), (1, 2)]);
        assert_eq!(m.lower_triangle().nonzero(), vec![(1, 0)]);
        assert_eq!(m.col_sums(), vec![1, 1, 1]);
        assert_eq!(m.subtract(&m.transpose()).nonzero(), vec![(1, 2)]);
    }

    #[test]
    fn test_degree_status_codes() {
        assert_eq!(DegreeStatus::from_degrees(0, 0).code(), 3);
        assert_eq!(DegreeStatus::from_degrees(0, 2).code(), 1);
        assert_eq!(DegreeStatus::from_degrees(1, 0).code(), 2);
        assert_eq!(DegreeStatus::from_degrees(1, 1).code(), 0);
        assert_eq!(serde_json::to_string(&DegreeStatus::Isolated).unwrap(), "3");
    }

    #[test]
    fn test_nomination_entry_wire_shape() {
        let entry: NominationEntry = serde_json::from_str(r#"{"A": "B,C"}"#).unwrap();
        assert_eq!(entry, NominationEntry::new("A", Some("B,C")));
        let empty: NominationEntry = serde_json::from_str(r#"{"D": null}"#).unwrap();
        assert_eq!(empty, NominationEntry::new("D", None));
    }

    #[test]
    fn test_classification_views() {
        let pair = |a: &str, b: &str| (a.to_string(), b.to_string());
        let c = EdgeClassification {
            type_i: vec![pair("A", "C")],
            type_ii: vec![pair("A", "B")],
            ..Default::default()
        };
        assert_eq!(c.reciprocal_pairs(), 1);
        assert_eq!(
            c.covered_edges(),
            vec![pair("A", "B"), pair("A", "C"), pair("B", "A")]
        );
    }
}
