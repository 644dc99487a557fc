use std::path::Path;

use anyhow::{bail, Context};
use colored::Colorize;
use serde_json::json;
use tracing::debug;
use votechain_crypto::EntryHasher;
use votechain_ledger::{audit_entries, tally, ChainExport, Entry};
use votechain_server::{ServerConfig, VoteServer};
use votechain_types::EntryPayload;

use crate::cli::*;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let format = cli.format;
    match cli.command {
        Command::Serve(args) => cmd_serve(args),
        Command::Verify(args) => cmd_verify(args, format),
        Command::Show(args) => cmd_show(args, format),
        Command::Tally(args) => cmd_tally(args, format),
        Command::Config(args) => cmd_config(args),
    }
}

fn load_config(path: Option<&Path>) -> anyhow::Result<ServerConfig> {
    match path {
        Some(path) => Ok(ServerConfig::load(path)?),
        None => Ok(ServerConfig::default()),
    }
}

fn serve_config(args: &ServeArgs) -> anyhow::Result<ServerConfig> {
    let mut config = load_config(args.config.as_deref())?;
    if let Some(bind) = args.bind {
        config.bind_addr = bind;
    }
    if let Some(digest) = args.digest {
        config.digest = digest;
    }
    Ok(config)
}

fn load_chain(path: &Path) -> anyhow::Result<Vec<Entry>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    let export = ChainExport::from_json(&text)
        .with_context(|| format!("parsing {}", path.display()))?;
    debug!(path = %path.display(), entries = export.chain.len(), "chain loaded");
    Ok(export.chain)
}

fn cmd_serve(args: ServeArgs) -> anyhow::Result<()> {
    let config = serve_config(&args)?;
    println!(
        "{} votechain on {} (digest: {})",
        "▶".green().bold(),
        config.bind_addr.to_string().bold(),
        config.digest.to_string().cyan()
    );
    let runtime = tokio::runtime::Runtime::new()?;
    runtime.block_on(VoteServer::new(config).serve())?;
    Ok(())
}

fn cmd_verify(args: VerifyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let chain = load_chain(&args.file)?;
    let report = audit_entries(&chain, &EntryHasher::new(args.digest));

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&report)?),
        OutputFormat::Text if report.is_valid() => {
            println!("{} Chain integrity verified", "✓".green().bold());
            println!("  Entries: {}", report.entry_count.to_string().bold());
            println!("  Digest: {}", args.digest.to_string().cyan());
            if let Some(tail) = chain.last() {
                println!("  Head: {}", tail.commitment().to_hex().yellow());
            }
        }
        OutputFormat::Text => {
            println!("{} Chain integrity check failed", "✗".red().bold());
            for violation in &report.violations {
                println!(
                    "  [{}] {}",
                    violation.index.to_string().yellow(),
                    violation.kind.describe()
                );
            }
        }
    }

    if !report.is_valid() {
        bail!(
            "{} violation(s) found in {}",
            report.violations.len(),
            args.file.display()
        );
    }
    Ok(())
}

fn cmd_show(args: ShowArgs, format: OutputFormat) -> anyhow::Result<()> {
    let chain = load_chain(&args.file)?;
    let selected: Vec<&Entry> = match args.index {
        Some(index) => {
            let entry = chain
                .iter()
                .find(|e| e.sequence_index() == index)
                .with_context(|| format!("no entry with index {index}"))?;
            vec![entry]
        }
        None => chain.iter().collect(),
    };

    if let OutputFormat::Json = format {
        println!("{}", serde_json::to_string_pretty(&selected)?);
        return Ok(());
    }

    for entry in selected {
        let what = match entry.payload() {
            EntryPayload::Genesis => "Genesis Block".dimmed().to_string(),
            EntryPayload::Vote(ballot) => format!(
                "{} → {}",
                ballot.voter_id().to_string().bold(),
                ballot.candidate().green()
            ),
        };
        println!(
            "{}  {}  {}",
            format!("#{}", entry.sequence_index()).yellow().bold(),
            entry.commitment().short_hex().dimmed(),
            what
        );
        println!("  Time: {}", entry.timestamp());
        println!("  Previous: {}", entry.previous_commitment());
    }
    Ok(())
}

fn cmd_tally(args: TallyArgs, format: OutputFormat) -> anyhow::Result<()> {
    let chain = load_chain(&args.file)?;
    let counts = tally(&chain);

    match format {
        OutputFormat::Json => {
            let rows: Vec<_> = counts
                .iter()
                .map(|(candidate, count)| json!({ "candidate": candidate, "count": count }))
                .collect();
            println!("{}", serde_json::to_string_pretty(&rows)?);
        }
        OutputFormat::Text if counts.is_empty() => println!("No votes."),
        OutputFormat::Text => {
            for (candidate, count) in &counts {
                println!("  {:<24} {}", candidate, count.to_string().bold());
            }
        }
    }
    Ok(())
}

fn cmd_config(args: ConfigArgs) -> anyhow::Result<()> {
    let config = load_config(args.config.as_deref())?;
    print!("{}", config.to_toml()?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use std::path::PathBuf;

    use votechain_crypto::DigestAlgorithm;
    use votechain_ledger::Ledger;
    use votechain_types::{Ballot, VoterId};

    use super::*;

    fn write_chain(dir: &Path, hasher: EntryHasher) -> PathBuf {
        let mut ledger = Ledger::with_hasher(hasher).unwrap();
        for (voter, candidate) in [("a", "X"), ("b", "Y"), ("c", "X")] {
            let ballot = Ballot::new(VoterId::parse(voter).unwrap(), candidate).unwrap();
            ledger.append(ballot).unwrap();
        }
        let path = dir.join("chain.json");
        let export = ChainExport::new(ledger.snapshot().to_vec());
        std::fs::write(&path, serde_json::to_string(&export).unwrap()).unwrap();
        path
    }

    fn verify(file: PathBuf, digest: DigestAlgorithm) -> anyhow::Result<()> {
        cmd_verify(VerifyArgs { file, digest }, OutputFormat::Json)
    }

    #[test]
    fn verify_accepts_exported_chain() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chain(dir.path(), EntryHasher::default());
        verify(path, DigestAlgorithm::Sha256).unwrap();
    }

    #[test]
    fn verify_fails_on_edited_vote() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chain(dir.path(), EntryHasher::default());

        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["chain"][2]["payload"]["candidate"] = json!("Z");
        std::fs::write(&path, value.to_string()).unwrap();

        let err = verify(path, DigestAlgorithm::Sha256).unwrap_err();
        assert!(err.to_string().contains("1 violation(s)"));
    }

    #[test]
    fn verify_fails_on_unparseable_edit() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chain(dir.path(), EntryHasher::default());

        let mut value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
        value["chain"][1]["payload"]["candidate_override"] = json!("Y");
        std::fs::write(&path, value.to_string()).unwrap();

        assert!(verify(path, DigestAlgorithm::Sha256).is_err());
    }

    #[test]
    fn verify_needs_matching_digest() {
        let dir = tempfile::tempdir().unwrap();
        let path = write_chain(dir.path(), EntryHasher::new(DigestAlgorithm::Blake3));
        verify(path.clone(), DigestAlgorithm::Blake3).unwrap();
        assert!(verify(path, DigestAlgorithm::Sha256).is_err());
    }

    #[test]
    fn missing_file_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_chain(&dir.path().join("absent.json")).is_err());
    }

    #[test]
    fn show_unknown_index_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_chain(dir.path(), EntryHasher::default());
        cmd_show(ShowArgs { file: file.clone(), index: Some(2) }, OutputFormat::Text).unwrap();
        assert!(cmd_show(ShowArgs { file, index: Some(9) }, OutputFormat::Text).is_err());
    }

    #[test]
    fn tally_reads_exported_chain() {
        let dir = tempfile::tempdir().unwrap();
        let file = write_chain(dir.path(), EntryHasher::default());
        let chain = load_chain(&file).unwrap();
        let counts = tally(&chain);
        assert_eq!(counts.get("X"), Some(&2));
        assert_eq!(counts.get("Y"), Some(&1));
        cmd_tally(TallyArgs { file }, OutputFormat::Text).unwrap();
    }

    #[test]
    fn serve_flags_override_config_file() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("vote.toml");
        std::fs::write(&path, "bind_addr = \"0.0.0.0:4000\"\ncandidates = [\"X\"]\n").unwrap();

        let config = serve_config(&ServeArgs {
            config: Some(path),
            bind: Some("127.0.0.1:5000".parse().unwrap()),
            digest: Some(DigestAlgorithm::Blake3),
        })
        .unwrap();
        assert_eq!(config.bind_addr.port(), 5000);
        assert_eq!(config.digest, DigestAlgorithm::Blake3);
        assert_eq!(config.candidates, vec!["X"]);
    }

    #[test]
    fn config_defaults_without_file() {
        assert_eq!(load_config(None).unwrap(), ServerConfig::default());
    }
}
