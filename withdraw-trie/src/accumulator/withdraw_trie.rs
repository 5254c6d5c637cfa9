use tracing::{debug, instrument, warn};

use crate::{
    accumulator::{
        append_leaf, batch::BatchCache, bit_length, decode_proof, digest_from_slice,
        encode_proof, recover_frontier, Frontier, ZeroHashes, H256, MAX_LEAVES, MAX_MESSAGE_NONCE,
    },
    TrieError, WithdrawCheckpoint,
};

/// The latest message admitted to the trie and the proof issued for it
#[derive(Debug, Clone, PartialEq, Eq)]
struct LatestMessage {
    message_hash: H256,
    proof: Vec<H256>,
}

/// An append-only merkle trie over outgoing message digests.
///
/// The trie keeps only its frontier, so appends cost O(height) and the trie can
/// be resumed from the proof of its latest message instead of the full history.
/// It is a single-owner structure: callers that share it must serialize access
/// themselves.
#[derive(Debug, Clone)]
pub struct WithdrawTrie {
    zeroes: ZeroHashes,
    frontier: Frontier,
    /// `None` until the first message is admitted
    height: Option<usize>,
    next_message_nonce: u64,
    latest: Option<LatestMessage>,
}

impl Default for WithdrawTrie {
    fn default() -> Self {
        Self {
            zeroes: ZeroHashes::new(),
            frontier: Frontier::default(),
            height: None,
            next_message_nonce: 0,
            latest: None,
        }
    }
}

impl WithdrawTrie {
    /// Create an empty trie
    pub fn new() -> Self {
        Self::default()
    }

    /// Resume a trie from a checkpoint.
    ///
    /// Fails if the checkpoint's proof does not fold to its recorded root.
    pub fn from_checkpoint(checkpoint: &WithdrawCheckpoint) -> Result<Self, TrieError> {
        let actual = checkpoint.computed_root();
        if actual != checkpoint.root {
            return Err(TrieError::CheckpointRootMismatch {
                expected: checkpoint.root,
                actual,
            });
        }

        let mut trie = Self::new();
        trie.initialize(
            checkpoint.message_nonce,
            checkpoint.message_hash.as_bytes(),
            &checkpoint.proof_bytes(),
        )?;
        Ok(trie)
    }

    /// Resume from the latest message's nonce, digest and proof, without
    /// replaying the messages before it.
    ///
    /// Only valid on an empty trie. The proof must be the one issued when
    /// `nonce` was the latest message, i.e. it has `bit_length(nonce)`
    /// siblings.
    #[instrument(level = "debug", skip(self, message_hash, proof_bytes), err)]
    pub fn initialize(
        &mut self,
        nonce: u64,
        message_hash: &[u8],
        proof_bytes: &[u8],
    ) -> Result<(), TrieError> {
        if !self.is_empty() {
            warn!(
                next_message_nonce = self.next_message_nonce,
                "Refusing to re-initialize a populated withdraw trie"
            );
            return Err(TrieError::AlreadyInitialized(self.next_message_nonce));
        }
        check_room(nonce, 1)?;

        let message_hash = digest_from_slice(message_hash)?;
        let proof = decode_proof(proof_bytes)?;
        let expected = bit_length(nonce);
        if proof.len() != expected {
            return Err(TrieError::ProofDepthMismatch {
                nonce,
                expected,
                actual: proof.len(),
            });
        }

        self.frontier = recover_frontier(&proof, nonce, message_hash.as_bytes())?;
        self.height = Some(proof.len());
        self.next_message_nonce = nonce + 1;
        self.latest = Some(LatestMessage {
            message_hash,
            proof,
        });

        debug!(
            root = ?self.message_root(),
            height = expected,
            next_message_nonce = self.next_message_nonce,
            "Initialized withdraw trie"
        );
        Ok(())
    }

    /// Append one message and return its encoded inclusion proof.
    pub fn append_message(&mut self, message_hash: H256) -> Result<Vec<u8>, TrieError> {
        let mut proofs = self.append_messages(&[message_hash])?;
        Ok(proofs.pop().unwrap_or_default())
    }

    /// Append messages in order and return one encoded inclusion proof per
    /// message.
    ///
    /// Every proof is valid against the root after the whole batch, including
    /// the proofs of messages that were not the last one. Either every message
    /// is admitted or, on error, none is.
    #[instrument(
        level = "debug",
        skip_all,
        fields(count = messages.len(), first_nonce = self.next_message_nonce)
    )]
    pub fn append_messages(&mut self, messages: &[H256]) -> Result<Vec<Vec<u8>>, TrieError> {
        if messages.is_empty() {
            return Ok(vec![]);
        }

        let first = self.next_message_nonce;
        check_room(first, messages.len() as u64)?;

        let cache = BatchCache::fan_in(&self.zeroes, &self.frontier, first, messages);

        // advance the frontier exactly as sequential appends would
        for (offset, message) in messages.iter().enumerate() {
            append_leaf(&self.zeroes, &mut self.frontier, first + offset as u64, *message);
        }
        self.height = Some(cache.height());
        self.next_message_nonce = first + messages.len() as u64;
        debug_assert_eq!(self.message_root(), cache.root());

        let proofs: Vec<Vec<H256>> = (first..self.next_message_nonce)
            .map(|nonce| cache.proof(nonce))
            .collect();
        if let (Some(message_hash), Some(proof)) = (messages.last(), proofs.last()) {
            self.latest = Some(LatestMessage {
                message_hash: *message_hash,
                proof: proof.clone(),
            });
        }

        debug!(
            root = ?self.message_root(),
            height = cache.height(),
            next_message_nonce = self.next_message_nonce,
            "Appended messages"
        );
        Ok(proofs.iter().map(|proof| encode_proof(proof)).collect())
    }

    /// The current root. 32 zero bytes while the trie is empty.
    pub fn message_root(&self) -> H256 {
        self.height
            .map_or_else(H256::zero, |height| self.frontier[height])
    }

    /// The nonce the next appended message will get
    pub fn next_message_nonce(&self) -> u64 {
        self.next_message_nonce
    }

    /// Number of populated levels above the leaves, `None` while empty
    pub fn height(&self) -> Option<usize> {
        self.height
    }

    /// Whether no message has been admitted yet
    pub fn is_empty(&self) -> bool {
        self.height.is_none()
    }

    /// The rightmost edge of the trie
    pub fn frontier(&self) -> &Frontier {
        &self.frontier
    }

    /// The empty-subtree table the trie pads with
    pub fn zero_hashes(&self) -> &ZeroHashes {
        &self.zeroes
    }

    /// The point this trie can be resumed from, `None` while empty
    pub fn checkpoint(&self) -> Option<WithdrawCheckpoint> {
        self.latest.as_ref().map(|latest| WithdrawCheckpoint {
            message_nonce: self.next_message_nonce - 1,
            message_hash: latest.message_hash,
            proof: latest.proof.clone(),
            root: self.message_root(),
        })
    }
}

/// Check that `count` more messages starting at nonce `first` fit under both
/// the counter ceiling and the trie capacity.
fn check_room(first: u64, count: u64) -> Result<(), TrieError> {
    let end = first
        .checked_add(count)
        .filter(|end| *end <= MAX_MESSAGE_NONCE)
        .ok_or(TrieError::CounterOverflow {
            next: first,
            count,
            max: MAX_MESSAGE_NONCE,
        })?;
    if end > MAX_LEAVES {
        return Err(TrieError::TrieFull {
            nonce: end - 1,
            capacity: MAX_LEAVES,
        });
    }
    Ok(())
}

#[cfg(test)]
mod test {
    use hex_literal::hex;

    use super::*;
    use crate::{merkle_root_from_branch, verify_merkle_proof};

    const HASH_A: H256 = H256(hex!(
        "72530d2135620c0c7ddfac2cc523ae31c2901f62ce0109d2f74ab99f1756b51f"
    ));
    const HASH_B: H256 = H256(hex!(
        "3bb63288619c7896198f42167e192d5365da04f5fd5e9f418ea31bafc1f3bf53"
    ));
    const HASH_C: H256 = H256(hex!(
        "6dae1726e96e70a2bbe52917a67d578c67958b774160cc29f34e16843793703b"
    ));

    fn messages(count: u8) -> Vec<H256> {
        (0..count).map(|i| H256::repeat_byte(i + 1)).collect()
    }

    #[test]
    fn it_starts_empty() {
        let trie = WithdrawTrie::new();

        assert!(trie.is_empty());
        assert_eq!(trie.height(), None);
        assert_eq!(trie.next_message_nonce(), 0);
        assert_eq!(trie.message_root(), H256::zero());
        assert_eq!(trie.checkpoint(), None);
    }

    #[test]
    fn it_owns_the_zero_table() {
        let trie = WithdrawTrie::new();
        assert_eq!(trie.zero_hashes(), &ZeroHashes::new());
    }

    #[test]
    fn it_produces_the_known_root() {
        let mut trie = WithdrawTrie::new();

        trie.append_messages(&[HASH_A, HASH_B, HASH_C]).unwrap();

        assert_eq!(
            trie.message_root(),
            H256(hex!(
                "77ca755fbc2499f32c71f55d967145ca263c415261a1e52c7cca5c25db2e2753"
            ))
        );
    }

    #[test]
    fn it_produces_the_known_proof_for_the_last_message() {
        let mut trie = WithdrawTrie::new();

        let proofs = trie.append_messages(&[HASH_A, HASH_B, HASH_C]).unwrap();

        assert_eq!(proofs.len(), 3);
        assert_eq!(
            proofs[2],
            hex!(
                "0000000000000000000000000000000000000000000000000000000000000000"
                "eac9b33976a25627817774db946ec33e0268bea17c0eed2346fa659afd9aa5cc"
            )
        );
    }

    #[test]
    fn it_counts_appended_messages() {
        let mut trie = WithdrawTrie::new();

        trie.append_messages(&messages(3)).unwrap();
        assert_eq!(trie.next_message_nonce(), 3);

        trie.append_message(H256::repeat_byte(0xee)).unwrap();
        assert_eq!(trie.next_message_nonce(), 4);

        assert!(trie.append_messages(&[]).unwrap().is_empty());
        assert_eq!(trie.next_message_nonce(), 4);
        assert_eq!(trie.height(), Some(2));
    }

    #[test]
    fn it_proves_each_message_against_the_root_after_its_append() {
        let mut trie = WithdrawTrie::new();

        for (nonce, message) in messages(10).into_iter().enumerate() {
            let proof = decode_proof(&trie.append_message(message).unwrap()).unwrap();
            assert!(verify_merkle_proof(
                message,
                &proof,
                nonce as u64,
                trie.message_root()
            ));
        }
    }

    #[test]
    fn it_initializes_from_an_existing_proof() {
        let mut trie = WithdrawTrie::new();

        trie.initialize(5, HASH_A.as_bytes(), &[7u8; 96]).unwrap();

        assert_eq!(trie.next_message_nonce(), 6);
        assert_eq!(trie.height(), Some(3));
        assert_eq!(
            trie.message_root(),
            merkle_root_from_branch(HASH_A, &[H256::repeat_byte(7); 3], 5)
        );
    }

    #[test]
    fn it_refuses_to_reinitialize() {
        let mut trie = WithdrawTrie::new();
        trie.append_messages(&messages(2)).unwrap();
        let root = trie.message_root();

        assert_eq!(
            trie.initialize(5, HASH_A.as_bytes(), &[7u8; 96]),
            Err(TrieError::AlreadyInitialized(2))
        );
        assert_eq!(trie.message_root(), root);
        assert_eq!(trie.next_message_nonce(), 2);
    }

    #[test]
    fn it_validates_initialize_inputs() {
        let mut trie = WithdrawTrie::new();

        assert_eq!(
            trie.initialize(5, &[0u8; 31], &[7u8; 96]),
            Err(TrieError::InvalidDigestLength {
                expected: 32,
                actual: 31
            })
        );
        assert_eq!(
            trie.initialize(5, HASH_A.as_bytes(), &[7u8; 95]),
            Err(TrieError::InvalidProofLength(95))
        );
        assert_eq!(
            trie.initialize(5, HASH_A.as_bytes(), &[7u8; 64]),
            Err(TrieError::ProofDepthMismatch {
                nonce: 5,
                expected: 3,
                actual: 2
            })
        );
        // past both bounds, the counter is checked first
        assert_eq!(
            trie.initialize(MAX_MESSAGE_NONCE, HASH_A.as_bytes(), &[]),
            Err(TrieError::CounterOverflow {
                next: MAX_MESSAGE_NONCE,
                count: 1,
                max: MAX_MESSAGE_NONCE
            })
        );
        assert_eq!(
            trie.initialize(MAX_LEAVES, HASH_A.as_bytes(), &[]),
            Err(TrieError::TrieFull {
                nonce: MAX_LEAVES,
                capacity: MAX_LEAVES
            })
        );
        assert!(trie.is_empty());
    }

    #[test]
    fn it_refuses_to_pass_the_counter_ceiling() {
        let mut trie = WithdrawTrie::new();
        trie.next_message_nonce = MAX_MESSAGE_NONCE;

        assert_eq!(
            trie.append_messages(&[HASH_A]),
            Err(TrieError::CounterOverflow {
                next: MAX_MESSAGE_NONCE,
                count: 1,
                max: MAX_MESSAGE_NONCE
            })
        );
        assert_eq!(trie.next_message_nonce(), MAX_MESSAGE_NONCE);
        assert_eq!(trie.frontier(), &Frontier::default());
    }

    #[test]
    fn it_rejects_a_whole_batch_that_would_overflow() {
        let mut trie = WithdrawTrie::new();
        trie.next_message_nonce = MAX_MESSAGE_NONCE - 2;

        assert!(matches!(
            trie.append_messages(&messages(3)),
            Err(TrieError::CounterOverflow { count: 3, .. })
        ));
        assert_eq!(trie.next_message_nonce(), MAX_MESSAGE_NONCE - 2);
        assert_eq!(trie.frontier(), &Frontier::default());
        assert!(trie.checkpoint().is_none());
    }

    #[test]
    fn it_checkpoints_the_latest_message() {
        let mut trie = WithdrawTrie::new();
        let proofs = trie.append_messages(&[HASH_A, HASH_B, HASH_C]).unwrap();

        let checkpoint = trie.checkpoint().unwrap();

        assert_eq!(checkpoint.message_nonce, 2);
        assert_eq!(checkpoint.message_hash, HASH_C);
        assert_eq!(checkpoint.proof_bytes(), proofs[2]);
        assert_eq!(checkpoint.root, trie.message_root());
        assert!(checkpoint.verify());
    }

    #[test]
    fn it_resumes_from_a_checkpoint() {
        let mut trie = WithdrawTrie::new();
        trie.append_messages(&messages(6)).unwrap();

        let resumed = WithdrawTrie::from_checkpoint(&trie.checkpoint().unwrap()).unwrap();

        assert_eq!(resumed.message_root(), trie.message_root());
        assert_eq!(resumed.next_message_nonce(), trie.next_message_nonce());
        assert_eq!(resumed.frontier(), trie.frontier());
        assert_eq!(resumed.checkpoint(), trie.checkpoint());
    }

    #[test]
    fn it_rejects_a_checkpoint_with_a_foreign_root() {
        let mut trie = WithdrawTrie::new();
        trie.append_messages(&messages(6)).unwrap();
        let mut checkpoint = trie.checkpoint().unwrap();
        let actual = checkpoint.root;
        checkpoint.root = H256::repeat_byte(0xff);

        assert_eq!(
            WithdrawTrie::from_checkpoint(&checkpoint).unwrap_err(),
            TrieError::CheckpointRootMismatch {
                expected: H256::repeat_byte(0xff),
                actual
            }
        );
    }
}
