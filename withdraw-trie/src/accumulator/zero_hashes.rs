use std::ops::Index;

use crate::accumulator::{hash_nodes, H256, MAX_HEIGHT};

/// Roots of perfectly empty subtrees, one per depth.
///
/// `zero[0]` is 32 zero bytes and `zero[d] = hash(zero[d - 1], zero[d - 1])`.
/// They pad the right side of incomplete subtrees.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ZeroHashes([H256; MAX_HEIGHT]);

impl Default for ZeroHashes {
    fn default() -> Self {
        let mut hashes = [H256::zero(); MAX_HEIGHT];
        for i in 1..MAX_HEIGHT {
            hashes[i] = hash_nodes(hashes[i - 1], hashes[i - 1]);
        }
        Self(hashes)
    }
}

impl ZeroHashes {
    /// Compute the table
    pub fn new() -> Self {
        Self::default()
    }

    /// All entries, depth 0 first
    pub fn as_slice(&self) -> &[H256] {
        &self.0
    }
}

impl Index<usize> for ZeroHashes {
    type Output = H256;

    fn index(&self, depth: usize) -> &H256 {
        &self.0[depth]
    }
}
