use crate::{
    accumulator::{hash_nodes, H256, DIGEST_LEN},
    TrieError,
};

/// Split proof bytes into 32-byte siblings, depth 0 first.
pub fn decode_proof(bytes: &[u8]) -> Result<Vec<H256>, TrieError> {
    if bytes.len() % DIGEST_LEN != 0 {
        return Err(TrieError::InvalidProofLength(bytes.len()));
    }
    Ok(bytes.chunks_exact(DIGEST_LEN).map(H256::from_slice).collect())
}

/// Concatenate proof siblings into one byte string.
pub fn encode_proof(proof: &[H256]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(proof.len() * DIGEST_LEN);
    for sibling in proof {
        bytes.extend_from_slice(sibling.as_bytes());
    }
    bytes
}

/// Compute a root hash from a leaf and a Merkle proof.
///
/// Bit `i` of `index` tells which side the leaf's ancestor sits on at depth
/// `i`: 0 puts the sibling on the right, 1 on the left. The proof length is
/// the height of the tree it was issued against.
pub fn merkle_root_from_branch(leaf: H256, branch: &[H256], index: u64) -> H256 {
    let mut current = leaf;

    for (i, next) in branch.iter().enumerate() {
        let ith_bit = index.checked_shr(i as u32).unwrap_or(0) & 0x01;
        if ith_bit == 1 {
            current = hash_nodes(*next, current);
        } else {
            current = hash_nodes(current, *next);
        }
    }

    current
}

/// Verify a proof that `leaf` exists at `index` in a tree rooted at `root`.
///
/// An index with bits set above the proof's depth cannot be in the tree.
pub fn verify_merkle_proof(leaf: H256, branch: &[H256], index: u64, root: H256) -> bool {
    if index.checked_shr(branch.len() as u32).unwrap_or(0) != 0 {
        return false;
    }
    merkle_root_from_branch(leaf, branch, index) == root
}
