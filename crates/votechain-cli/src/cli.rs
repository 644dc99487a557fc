use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use votechain_crypto::DigestAlgorithm;

#[derive(Parser)]
#[command(
    name = "votechain",
    about = "Tamper-evident vote ledger",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Start the voting HTTP server
    Serve(ServeArgs),
    /// Verify an exported chain file
    Verify(VerifyArgs),
    /// Print entries of an exported chain file
    Show(ShowArgs),
    /// Count votes per candidate in an exported chain file
    Tally(TallyArgs),
    /// Print the effective server configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct ServeArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
    /// Overrides `bind_addr` from the config file
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Overrides `digest` from the config file
    #[arg(long)]
    pub digest: Option<DigestAlgorithm>,
}

#[derive(Args)]
pub struct VerifyArgs {
    pub file: PathBuf,
    #[arg(long, default_value = "sha256")]
    pub digest: DigestAlgorithm,
}

#[derive(Args)]
pub struct ShowArgs {
    pub file: PathBuf,
    #[arg(long)]
    pub index: Option<u64>,
}

#[derive(Args)]
pub struct TallyArgs {
    pub file: PathBuf,
}

#[derive(Args)]
pub struct ConfigArgs {
    #[arg(short, long)]
    pub config: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_serve_defaults() {
        let cli = Cli::try_parse_from(["votechain", "serve"]).unwrap();
        if let Command::Serve(args) = cli.command {
            assert!(args.config.is_none());
            assert!(args.bind.is_none());
            assert!(args.digest.is_none());
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_serve_overrides() {
        let cli = Cli::try_parse_from([
            "votechain",
            "serve",
            "--config",
            "vote.toml",
            "--bind",
            "0.0.0.0:8080",
            "--digest",
            "blake3",
        ])
        .unwrap();
        if let Command::Serve(args) = cli.command {
            assert_eq!(args.config, Some(PathBuf::from("vote.toml")));
            assert_eq!(args.bind.unwrap().port(), 8080);
            assert_eq!(args.digest, Some(DigestAlgorithm::Blake3));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_verify_default_digest() {
        let cli = Cli::try_parse_from(["votechain", "verify", "chain.json"]).unwrap();
        if let Command::Verify(args) = cli.command {
            assert_eq!(args.file, PathBuf::from("chain.json"));
            assert_eq!(args.digest, DigestAlgorithm::Sha256);
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn parse_show_index() {
        let cli = Cli::try_parse_from(["votechain", "show", "c.json", "--index", "3"]).unwrap();
        if let Command::Show(args) = cli.command {
            assert_eq!(args.index, Some(3));
        } else {
            panic!("wrong command");
        }
    }

    #[test]
    fn bad_digest_is_rejected() {
        assert!(Cli::try_parse_from(["votechain", "verify", "c.json", "--digest", "md5"]).is_err());
    }

    #[test]
    fn parse_verbose_json() {
        let cli =
            Cli::try_parse_from(["votechain", "--verbose", "--format", "json", "tally", "c.json"])
                .unwrap();
        assert!(cli.verbose);
        assert!(matches!(cli.format, OutputFormat::Json));
        assert!(matches!(cli.command, Command::Tally(_)));
    }
}
