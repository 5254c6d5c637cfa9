//! Withdrawal trie. An append-only, fixed-depth keccak merkle accumulator
//! for outgoing bridge messages.
//!
//! Every outgoing message digest is appended as a leaf. The resulting root is
//! committed on the counterpart chain, and the per-leaf proofs let a relayer
//! prove inclusion of a single message against it.

#![warn(missing_docs)]
#![warn(unused_extern_crates)]
#![forbid(unsafe_code)]

/// Accumulator management
pub mod accumulator;

/// Data structures shared with callers
pub mod types;
pub use types::*;

mod error;
pub use error::TrieError;

/// Test functions that output json files for Solidity tests
#[cfg(feature = "output")]
pub mod test_output;

pub use accumulator::{
    decode_proof, digest_from_slice, encode_proof, hash_concat, merkle_root_from_branch,
    verify_merkle_proof, withdraw_trie::WithdrawTrie, Frontier, ZeroHashes, H256, MAX_HEIGHT,
    MAX_LEAVES, MAX_MESSAGE_NONCE,
};
