use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser)]
#[command(
    name = "tally",
    about = "Tally: inventory and lending library with file-backed records",
    version,
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// TOML configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Directory that relative data and log paths are resolved against
    #[arg(long, global = true)]
    pub data_dir: Option<PathBuf>,

    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the interactive inventory manager
    Inventory(InventoryArgs),
    /// Run the interactive lending library
    Library(LibraryArgs),
    /// Print the resolved configuration
    Config(ConfigArgs),
}

#[derive(Args)]
pub struct InventoryArgs {}

#[derive(Args)]
pub struct LibraryArgs {
    /// Override the maximum number of books a member may hold
    #[arg(long)]
    pub loan_limit: Option<usize>,
}

#[derive(Args)]
pub struct ConfigArgs {
    /// Print paths as written, without resolving them against the data dir
    #[arg(long)]
    pub raw: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_inventory() {
        let cli = Cli::try_parse_from(["tally", "inventory"]).unwrap();
        assert!(matches!(cli.command, Command::Inventory(_)));
        assert!(cli.config.is_none());
        assert!(!cli.verbose);
    }

    #[test]
    fn parse_library_loan_limit() {
        let cli = Cli::try_parse_from(["tally", "library", "--loan-limit", "5"]).unwrap();
        if let Command::Library(args) = cli.command {
            assert_eq!(args.loan_limit, Some(5));
        } else { panic!("wrong command"); }
    }

    #[test]
    fn parse_global_options_after_subcommand() {
        let cli = Cli::try_parse_from([
            "tally", "inventory", "--data-dir", "/srv/data", "-c", "tally.toml", "-v",
        ])
        .unwrap();
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/data")));
        assert_eq!(cli.config, Some(PathBuf::from("tally.toml")));
        assert!(cli.verbose);
    }

    #[test]
    fn parse_config_raw() {
        let cli = Cli::try_parse_from(["tally", "config", "--raw"]).unwrap();
        if let Command::Config(args) = cli.command {
            assert!(args.raw);
        } else { panic!("wrong command"); }
    }

    #[test]
    fn subcommand_is_required() {
        assert!(Cli::try_parse_from(["tally"]).is_err());
    }

    #[test]
    fn rejects_non_numeric_loan_limit() {
        assert!(Cli::try_parse_from(["tally", "library", "--loan-limit", "many"]).is_err());
    }
}
