use std::{fs::OpenOptions, io::Write, path::Path};

use hex_literal::hex;
use serde_json::{json, Value};
use sha3::{Digest, Keccak256};

use crate::{TrieError, WithdrawTrie, H256};

/// Errors raised while writing test vectors
#[derive(Debug, thiserror::Error)]
pub enum OutputError {
    /// The trie rejected the generated messages
    #[error(transparent)]
    Trie(#[from] TrieError),
    /// IO error while writing the vector file
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

/// Three fixed message digests whose root and proofs the on-chain verifier
/// pins as its golden vector
pub const KNOWN_WITHDRAWALS: [H256; 3] = [
    H256(hex!(
        "72530d2135620c0c7ddfac2cc523ae31c2901f62ce0109d2f74ab99f1756b51f"
    )),
    H256(hex!(
        "3bb63288619c7896198f42167e192d5365da04f5fd5e9f418ea31bafc1f3bf53"
    )),
    H256(hex!(
        "6dae1726e96e70a2bbe52917a67d578c67958b774160cc29f34e16843793703b"
    )),
];

/// Test functions that output json files
pub mod output_functions {
    use super::*;

    /// The deterministic message digest used for nonce `nonce` in vectors
    pub fn withdrawal_message(nonce: usize) -> H256 {
        H256::from_slice(Keccak256::digest(format!("withdrawal {nonce}")).as_slice())
    }

    /// Build one vector: append `count` messages to a fresh trie as one batch
    /// and record every proof with the final root.
    pub fn withdraw_trie_case(count: usize) -> Result<Value, TrieError> {
        let messages: Vec<H256> = (0..count).map(withdrawal_message).collect();
        let name = match count {
            1 => "1 withdrawal".to_owned(),
            _ => format!("{count} withdrawals"),
        };
        batch_case(&name, &messages)
    }

    /// The vector for [`KNOWN_WITHDRAWALS`]
    pub fn known_withdrawals_case() -> Result<Value, TrieError> {
        batch_case("three known withdrawals", &KNOWN_WITHDRAWALS)
    }

    fn batch_case(name: &str, messages: &[H256]) -> Result<Value, TrieError> {
        let mut trie = WithdrawTrie::new();
        let proofs = trie.append_messages(messages)?;

        Ok(json!({
            "testName": name,
            "leaves": messages,
            "proofs": proofs
                .iter()
                .map(|proof| format!("0x{}", hex::encode(proof)))
                .collect::<Vec<_>>(),
            "expectedRoot": trie.message_root(),
        }))
    }

    /// Outputs withdraw trie test cases to `path`, the known withdrawals
    /// first and then one case per entry of `counts`
    pub fn output_withdraw_trie_proofs(path: &Path, counts: &[usize]) -> Result<(), OutputError> {
        let test_cases = std::iter::once(known_withdrawals_case())
            .chain(counts.iter().map(|count| withdraw_trie_case(*count)))
            .collect::<Result<Vec<_>, _>>()?;
        let cases = test_cases.len();

        let json = json!({ "testCases": test_cases }).to_string();

        let mut file = OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(path)?;

        file.write_all(json.as_bytes())?;
        tracing::info!(path = %path.display(), cases, "Wrote withdraw trie vectors");
        Ok(())
    }
}
