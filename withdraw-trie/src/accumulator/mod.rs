use sha3::{digest::Update, Digest, Keccak256};

pub use primitive_types::H256;

use crate::TrieError;

/// Fan-in cache used by batch appends
mod batch;
/// The rightmost edge of the trie, and the single-leaf update rules over it
pub mod frontier;
/// Encoding and evaluation of inclusion proofs
pub mod proof;
/// The append-only withdraw trie
pub mod withdraw_trie;
/// Roots of empty subtrees
pub mod zero_hashes;

pub use frontier::{append_leaf, recover_frontier, Frontier};
pub use proof::{decode_proof, encode_proof, merkle_root_from_branch, verify_merkle_proof};
pub use zero_hashes::ZeroHashes;

/// The maximum possible height of the withdraw trie. The frontier and the
/// zero table hold one entry per level below it.
pub const MAX_HEIGHT: usize = 40;

/// The number of leaves the trie can hold. The leaf at index `i` needs
/// frontier slot `bit_length(i)`, so the last usable index is
/// `2^(MAX_HEIGHT - 1) - 1`.
pub const MAX_LEAVES: u64 = 1 << (MAX_HEIGHT - 1);

/// The largest message nonce the trie will hand out. Nonces are exchanged
/// with components that store them as doubles, so this is the largest
/// integer a double represents exactly.
pub const MAX_MESSAGE_NONCE: u64 = (1 << 53) - 1;

/// Length in bytes of a digest
pub const DIGEST_LEN: usize = 32;

/// Hash the concatenation of two 32-byte digests with keccak256.
///
/// Fails with [`TrieError::InvalidDigestLength`] if either side is not
/// exactly 32 bytes.
pub fn hash_concat(left: impl AsRef<[u8]>, right: impl AsRef<[u8]>) -> Result<H256, TrieError> {
    let left = digest_from_slice(left.as_ref())?;
    let right = digest_from_slice(right.as_ref())?;
    Ok(hash_nodes(left, right))
}

/// Interpret a byte string as a digest.
pub fn digest_from_slice(bytes: &[u8]) -> Result<H256, TrieError> {
    if bytes.len() != DIGEST_LEN {
        return Err(TrieError::InvalidDigestLength {
            expected: DIGEST_LEN,
            actual: bytes.len(),
        });
    }
    Ok(H256::from_slice(bytes))
}

pub(crate) fn hash_nodes(left: H256, right: H256) -> H256 {
    H256::from_slice(
        Keccak256::new()
            .chain(left)
            .chain(right)
            .finalize()
            .as_slice(),
    )
}

/// Number of significant bits in `index`. This is the height of the trie
/// right after the leaf at `index` was appended.
pub(crate) fn bit_length(index: u64) -> usize {
    (u64::BITS - index.leading_zeros()) as usize
}
