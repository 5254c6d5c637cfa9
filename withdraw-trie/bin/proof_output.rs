use std::path::PathBuf;

use clap::Parser;
use eyre::Result;
use tracing_subscriber::EnvFilter;

use withdraw_trie::test_output::output_functions::output_withdraw_trie_proofs;

/// Write withdraw trie test vectors for the on-chain verifier's test suite
#[derive(Parser, Debug)]
#[command(version, about)]
struct Args {
    /// Where to write the vector file
    #[arg(long, default_value = "vectors/withdraw_trie.json")]
    out: PathBuf,

    /// Number of messages in each test case
    #[arg(
        long,
        value_delimiter = ',',
        default_value = "1,2,4,5,8,9,13,16,17,33"
    )]
    counts: Vec<usize>,
}

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let args = Args::parse();
    output_withdraw_trie_proofs(&args.out, &args.counts)?;
    Ok(())
}
