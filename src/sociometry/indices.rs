//! Per-member sociometric indices derived from both adjacency matrices.

use serde::{Deserialize, Serialize};

use crate::network::models::{AdjacencyMatrix, NodeId};

/// The derived index columns.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SociometricIndex {
    /// Positive nominations received
    Rp,
    /// Negative nominations received
    Rr,
    /// Positive nominations given
    Gp,
    /// Negative nominations given
    Gr,
    /// Mutual positive nominations
    Mp,
    /// Mutual negative nominations
    Mr,
    /// Balance: `rp − rr`
    Bl,
    /// Orientation: `gp − gr`
    Or,
    /// Impact: `rp + rr`
    Im,
    /// Activity: `bl + or`
    Ai,
    /// Integration: `rp + mp`
    Ii,
}

impl SociometricIndex {
    pub const ALL: [SociometricIndex; 11] = [
        Self::Rp,
        Self::Rr,
        Self::Gp,
        Self::Gr,
        Self::Mp,
        Self::Mr,
        Self::Bl,
        Self::Or,
        Self::Im,
        Self::Ai,
        Self::Ii,
    ];

    pub fn name(self) -> &'static str {
        match self {
            Self::Rp => "rp",
            Self::Rr => "rr",
            Self::Gp => "gp",
            Self::Gr => "gr",
            Self::Mp => "mp",
            Self::Mr => "mr",
            Self::Bl => "bl",
            Self::Or => "or",
            Self::Im => "im",
            Self::Ai => "ai",
            Self::Ii => "ii",
        }
    }
}

impl std::fmt::Display for SociometricIndex {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Indices {
    pub rp: i64,
    pub rr: i64,
    pub gp: i64,
    pub gr: i64,
    pub mp: i64,
    pub mr: i64,
    pub bl: i64,
    pub or: i64,
    pub im: i64,
    pub ai: i64,
    pub ii: i64,
}

impl Indices {
    pub fn from_counts(rp: i64, rr: i64, gp: i64, gr: i64, mp: i64, mr: i64) -> Self {
        let bl = rp - rr;
        let or = gp - gr;
        Self {
            rp,
            rr,
            gp,
            gr,
            mp,
            mr,
            bl,
            or,
            im: rp + rr,
            ai: bl + or,
            ii: rp + mp,
        }
    }

    pub fn get(&self, index: SociometricIndex) -> i64 {
        match index {
            SociometricIndex::Rp => self.rp,
            SociometricIndex::Rr => self.rr,
            SociometricIndex::Gp => self.gp,
            SociometricIndex::Gr => self.gr,
            SociometricIndex::Mp => self.mp,
            SociometricIndex::Mr => self.mr,
            SociometricIndex::Bl => self.bl,
            SociometricIndex::Or => self.or,
            SociometricIndex::Im => self.im,
            SociometricIndex::Ai => self.ai,
            SociometricIndex::Ii => self.ii,
        }
    }

    /// No nomination given or received in either valence.
    pub fn is_isolated(&self) -> bool {
        self.rp == 0 && self.rr == 0 && self.gp == 0 && self.gr == 0
    }
}

/// Indices for every member, in member order.
pub fn compute_indices(a: &AdjacencyMatrix, b: &AdjacencyMatrix) -> Vec<(NodeId, Indices)> {
    let rp = a.col_sums();
    let rr = b.col_sums();
    let gp = a.row_sums();
    let gr = b.row_sums();
    let mp = a.mutual_counts();
    let mr = b.mutual_counts();

    a.members
        .iter()
        .enumerate()
        .map(|(i, member)| {
            let indices = Indices::from_counts(
                rp[i] as i64,
                rr[i] as i64,
                gp[i] as i64,
                gr[i] as i64,
                mp[i] as i64,
                mr[i] as i64,
            );
            (member.clone(), indices)
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_indices_from_matrices() {
        let members: Vec<NodeId> = ["A", "B", "C"].iter().map(|s| s.to_string()).collect();
        let mut a = AdjacencyMatrix::zeros(members.clone());
        // A↔B, C→A
        a.cells[0][1] = 1;
        a.cells[1][0] = 1;
        a.cells[2][0] = 1;
        let mut b = AdjacencyMatrix::zeros(members);
        // B→C
        b.cells[1][2] = 1;

        let rows = compute_indices(&a, &b);
        let (_, a_idx) = &rows[0];
        assert_eq!((a_idx.rp, a_idx.gp, a_idx.mp), (2, 1, 1));
        assert_eq!((a_idx.bl, a_idx.im, a_idx.ii), (2, 2, 3));

        let (_, c_idx) = &rows[2];
        assert_eq!((c_idx.rr, c_idx.gp, c_idx.bl, c_idx.or, c_idx.ai), (1, 1, -1, 1, 0));
        assert!(!c_idx.is_isolated());
    }

    #[test]
    fn test_get_covers_every_index() {
        let idx = Indices::from_counts(3, 1, 2, 4, 1, 0);
        let values: Vec<i64> = SociometricIndex::ALL.iter().map(|&i| idx.get(i)).collect();
        assert_eq!(values, vec![3, 1, 2, 4, 1, 0, 2, -2, 4, 0, 4]);
    }
}
