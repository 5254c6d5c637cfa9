use std::ops::{Index, IndexMut};

use crate::{
    accumulator::{
        bit_length, digest_from_slice, hash_nodes, ZeroHashes, H256, MAX_HEIGHT, MAX_LEAVES,
    },
    TrieError,
};

/// The rightmost edge of the trie, one digest per depth.
///
/// `frontier[d]` holds the most recent left-side subtree of depth `d` that is
/// still waiting for its right sibling. Slots above the current height are
/// zero.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frontier([H256; MAX_HEIGHT]);

impl Default for Frontier {
    fn default() -> Self {
        Self([H256::zero(); MAX_HEIGHT])
    }
}

impl Frontier {
    /// All slots, depth 0 first
    pub fn as_slice(&self) -> &[H256] {
        &self.0
    }
}

impl Index<usize> for Frontier {
    type Output = H256;

    fn index(&self, depth: usize) -> &H256 {
        &self.0[depth]
    }
}

impl IndexMut<usize> for Frontier {
    fn index_mut(&mut self, depth: usize) -> &mut H256 {
        &mut self.0[depth]
    }
}

/// Fold the leaf at `index` into `frontier` and return its inclusion proof.
///
/// The proof has `bit_length(index)` siblings, depth 0 first, and is valid
/// against the root of the trie right after this append. Untouched subtrees
/// are never re-hashed.
///
/// # Panics
///
/// If `index` does not fit in a trie of `MAX_HEIGHT` levels.
pub fn append_leaf(
    zeroes: &ZeroHashes,
    frontier: &mut Frontier,
    index: u64,
    leaf: H256,
) -> Vec<H256> {
    assert!(index < MAX_LEAVES, "leaf index {index} exceeds trie capacity");

    let mut node = leaf;
    let mut proof = Vec::with_capacity(bit_length(index));
    let mut path = index;
    let mut depth = 0;

    while path > 0 {
        if path & 1 == 0 {
            // left child, right sibling is still empty
            frontier[depth] = node;
            proof.push(zeroes[depth]);
            node = hash_nodes(node, zeroes[depth]);
        } else {
            proof.push(frontier[depth]);
            node = hash_nodes(frontier[depth], node);
        }
        path >>= 1;
        depth += 1;
    }

    frontier[depth] = node;
    proof
}

/// Rebuild a full frontier from a previously issued proof, the index it was
/// issued for and the leaf it proves.
///
/// Every slot above the proof's depth is zero. `index` must fit in
/// `proof.len()` bits.
pub fn recover_frontier(proof: &[H256], index: u64, leaf: &[u8]) -> Result<Frontier, TrieError> {
    let leaf = digest_from_slice(leaf)?;
    if proof.len() >= MAX_HEIGHT {
        return Err(TrieError::ProofTooDeep(proof.len()));
    }
    if index.checked_shr(proof.len() as u32).unwrap_or(0) != 0 {
        return Err(TrieError::IndexBeyondProof {
            index,
            depth: proof.len(),
        });
    }

    let mut frontier = Frontier::default();
    let mut node = leaf;

    for (depth, sibling) in proof.iter().enumerate() {
        if (index >> depth) & 1 == 0 {
            frontier[depth] = node;
            node = hash_nodes(node, *sibling);
        } else {
            frontier[depth] = *sibling;
            node = hash_nodes(*sibling, node);
        }
    }

    frontier[proof.len()] = node;
    Ok(frontier)
}
