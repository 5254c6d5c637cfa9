use serde::{Deserialize, Serialize};

use crate::{encode_proof, merkle_root_from_branch, H256};

/// The point a withdraw trie can be resumed from: the latest message, its
/// nonce, the proof issued for it and the root that proof commits to.
///
/// Persisting it is the caller's business. It serializes as camelCase JSON
/// with `0x`-prefixed digests.
#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawCheckpoint {
    /// Nonce of the latest appended message
    pub message_nonce: u64,
    /// Digest of the latest appended message
    pub message_hash: H256,
    /// Proof issued for the latest message, depth 0 first
    pub proof: Vec<H256>,
    /// Trie root right after the latest message was appended
    pub root: H256,
}

impl WithdrawCheckpoint {
    /// The root produced by folding `message_hash` with `proof`
    pub fn computed_root(&self) -> H256 {
        merkle_root_from_branch(self.message_hash, &self.proof, self.message_nonce)
    }

    /// Whether the proof commits to the recorded root
    pub fn verify(&self) -> bool {
        self.computed_root() == self.root
    }

    /// The proof in its flat wire encoding
    pub fn proof_bytes(&self) -> Vec<u8> {
        encode_proof(&self.proof)
    }
}
