//! verkle CLI - build a verkle trie from key/value pairs and inspect it
//!
//! Entries come from `KEY=VALUE` hex pairs on the command line and an
//! optional JSON input file mapping hex keys to hex values.

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use verkle_trie::{
    Blake3Committer, Bytes32, Committer, MemoryStore, Sha256Committer, StoredRecord, VerkleTrie,
};

#[derive(Parser)]
#[command(name = "verkle")]
#[command(about = "Compute verkle trie commitments for a set of key/value pairs")]
#[command(version)]
struct Cli {
    /// Output format (json or text)
    #[arg(short, long, default_value = "json", global = true)]
    format: OutputFormat,

    /// Commitment oracle
    #[arg(long, default_value = "blake3", global = true)]
    hasher: HasherKind,

    /// JSON file with an object of hex keys to hex values
    #[arg(short, long, global = true)]
    input: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum OutputFormat {
    Json,
    Text,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum HasherKind {
    Blake3,
    Sha256,
}

impl HasherKind {
    fn committer(self) -> Box<dyn Committer> {
        match self {
            HasherKind::Blake3 => Box::new(Blake3Committer),
            HasherKind::Sha256 => Box::new(Sha256Committer),
        }
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Print the root commitment
    Root {
        /// Entries as KEY=VALUE hex pairs
        pairs: Vec<String>,
    },

    /// Look up a single key
    Get {
        /// The key to look up (hex)
        key: String,
        /// Entries as KEY=VALUE hex pairs
        pairs: Vec<String>,
    },

    /// Print the tree structure
    Dump {
        /// Entries as KEY=VALUE hex pairs
        pairs: Vec<String>,
    },

    /// Commit to an in-memory store and list the stored records
    Records {
        /// Entries as KEY=VALUE hex pairs
        pairs: Vec<String>,
    },
}

impl Commands {
    fn pairs(&self) -> &[String] {
        match self {
            Commands::Root { pairs }
            | Commands::Get { pairs, .. }
            | Commands::Dump { pairs }
            | Commands::Records { pairs } => pairs,
        }
    }
}

fn main() -> anyhow::Result<()> {
    env_logger::init();
    let cli = Cli::parse();

    let entries = collect_entries(cli.input.as_deref(), cli.command.pairs())?;
    let mut trie = VerkleTrie::with_committer(cli.hasher.committer());
    for (key, value) in &entries {
        trie.put(key.as_bytes(), *value)?;
    }

    match cli.command {
        Commands::Root { .. } => {
            let root = trie.root_hash();
            output(
                &cli.format,
                &serde_json::json!({
                    "root": root.to_string(),
                    "entries": entries.len()
                }),
            );
        }

        Commands::Get { key, .. } => {
            let key = parse_word(&key).context("invalid key")?;
            let value = trie.get(key.as_bytes())?;
            output(
                &cli.format,
                &serde_json::json!({
                    "key": key.to_string(),
                    "value": value.map(|v| v.to_string())
                }),
            );
        }

        Commands::Dump { .. } => {
            let root = trie.root_hash();
            match cli.format {
                OutputFormat::Json => output(
                    &cli.format,
                    &serde_json::json!({
                        "root": root.to_string(),
                        "tree": trie.print()
                    }),
                ),
                OutputFormat::Text => println!("{}", trie.print()),
            }
        }

        Commands::Records { .. } => {
            let store = MemoryStore::new();
            trie.commit(&store)?;
            let records = store
                .records()
                .into_iter()
                .map(|(location, encoded)| {
                    let record = StoredRecord::decode(&encoded)?;
                    Ok(serde_json::json!({
                        "location": hex::encode(&location),
                        "kind": record.kind(),
                        "record": hex::encode(&encoded)
                    }))
                })
                .collect::<verkle_trie::Result<Vec<_>>>()?;
            output(
                &cli.format,
                &serde_json::json!({
                    "root": trie.root_hash().to_string(),
                    "count": records.len(),
                    "records": records
                }),
            );
        }
    }

    Ok(())
}

/// Gather entries from the input file and the command line, later ones winning
fn collect_entries(input: Option<&Path>, pairs: &[String]) -> anyhow::Result<BTreeMap<Bytes32, Bytes32>> {
    let mut entries: BTreeMap<Bytes32, Bytes32> = match input {
        Some(path) => {
            let text = std::fs::read_to_string(path)
                .with_context(|| format!("reading {}", path.display()))?;
            serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))?
        }
        None => BTreeMap::new(),
    };

    for pair in pairs {
        let Some((key, value)) = pair.split_once('=') else {
            bail!("expected KEY=VALUE, got {pair}");
        };
        entries.insert(
            parse_word(key).with_context(|| format!("invalid key {key}"))?,
            parse_word(value).with_context(|| format!("invalid value for {key}"))?,
        );
    }

    Ok(entries)
}

fn parse_word(s: &str) -> anyhow::Result<Bytes32> {
    Ok(Bytes32::from_hex(s.trim())?)
}

fn output(format: &OutputFormat, value: &serde_json::Value) {
    match format {
        OutputFormat::Json => {
            println!("{}", serde_json::to_string(value).unwrap());
        }
        OutputFormat::Text => {
            println!("{}", serde_json::to_string_pretty(value).unwrap());
        }
    }
}
