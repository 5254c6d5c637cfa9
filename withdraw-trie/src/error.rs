use crate::H256;

/// Error types for withdraw trie operations.
///
/// Every variant is a precondition violation raised by the call that
/// violated it. A call that returns one of these has not mutated the trie.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TrieError {
    /// A byte string supplied where a digest is required has the wrong length
    #[error("Digest must be {expected} bytes, got {actual}")]
    InvalidDigestLength {
        /// The required length
        expected: usize,
        /// The supplied length
        actual: usize,
    },
    /// Proof bytes are not a whole number of 32-byte siblings
    #[error("Proof bytes must be a multiple of 32, got {0}")]
    InvalidProofLength(usize),
    /// The message nonce would pass the counter ceiling
    #[error("Message nonce would exceed {max}: next nonce {next}, appending {count}")]
    CounterOverflow {
        /// The next nonce at the time of the call
        next: u64,
        /// The number of messages the call tried to admit
        count: u64,
        /// The counter ceiling
        max: u64,
    },
    /// The trie has no room for another leaf at its fixed height
    #[error("Withdraw trie is full. Capacity: {capacity}. Requested nonce: {nonce}")]
    TrieFull {
        /// The highest nonce the call asked for
        nonce: u64,
        /// The number of leaves the trie can hold
        capacity: u64,
    },
    /// A proof does not have one sibling per level of the tree at `nonce`
    #[error("Proof for nonce {nonce} must have {expected} siblings, got {actual}")]
    ProofDepthMismatch {
        /// The nonce the proof was issued for
        nonce: u64,
        /// The tree height right after `nonce` was appended
        expected: usize,
        /// The number of siblings supplied
        actual: usize,
    },
    /// A proof is deeper than the trie can ever be
    #[error("Proof has {0} siblings, deeper than the trie height")]
    ProofTooDeep(usize),
    /// A proof is too short to reach the leaf at `index`
    #[error("Index {index} does not fit a proof of {depth} siblings")]
    IndexBeyondProof {
        /// The index the proof was supplied for
        index: u64,
        /// The number of siblings supplied
        depth: usize,
    },
    /// `initialize` was called on a trie that already holds messages
    #[error("Withdraw trie already initialized. Next nonce: {0}")]
    AlreadyInitialized(u64),
    /// A checkpoint's proof does not fold to the root it records
    #[error("Checkpoint root mismatch. Expected: {expected:?}. Got: {actual:?}.")]
    CheckpointRootMismatch {
        /// The root recorded in the checkpoint
        expected: H256,
        /// The root produced by the checkpoint's proof
        actual: H256,
    },
}
