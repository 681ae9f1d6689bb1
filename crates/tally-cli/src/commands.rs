use std::io;

use colored::Colorize;
use tracing::info;

use crate::cli::*;
use crate::config::TallyConfig;
use crate::menu;
use crate::prompt::Prompter;

pub fn run_command(cli: Cli) -> anyhow::Result<()> {
    let mut config = TallyConfig::load(cli.config.as_deref())?;
    if let Some(dir) = cli.data_dir {
        config.data_dir = dir;
    }
    match cli.command {
        Command::Inventory(_) => cmd_inventory(&config),
        Command::Library(args) => cmd_library(&config, args),
        Command::Config(args) => cmd_config(&config, args),
    }
}

fn cmd_inventory(config: &TallyConfig) -> anyhow::Result<()> {
    let resolved = config.resolved();
    info!(data_dir = %resolved.data_dir.display(), "starting inventory console");
    let (inventory, report) = tally_inventory::open(&resolved.inventory);

    let stdin = io::stdin();
    let mut prompt = Prompter::new(stdin.lock(), io::stdout().lock());
    menu::report_load(prompt.out(), "inventario", &report)?;
    menu::inventory::run(inventory, &mut prompt)
}

fn cmd_library(config: &TallyConfig, args: LibraryArgs) -> anyhow::Result<()> {
    let mut resolved = config.resolved();
    if let Some(limit) = args.loan_limit {
        resolved.library.loan_limit = limit;
    }
    info!(
        data_dir = %resolved.data_dir.display(),
        loan_limit = resolved.library.loan_limit,
        "starting library console"
    );
    let (library, load) = tally_library::Library::open(&resolved.library);

    let stdin = io::stdin();
    let mut prompt = Prompter::new(stdin.lock(), io::stdout().lock());
    menu::report_load(prompt.out(), "libros", &load.books)?;
    menu::report_load(prompt.out(), "usuarios", &load.members)?;
    menu::library::run(library, &mut prompt)
}

fn cmd_config(config: &TallyConfig, args: ConfigArgs) -> anyhow::Result<()> {
    let shown = if args.raw { config.clone() } else { config.resolved() };
    println!("{} Configuration", "✓".green().bold());
    print!("{}", shown.to_toml()?);
    Ok(())
}
