use clap::Parser;
use sharknotes::cli::{
    handle_config_path, handle_config_set, handle_config_show, handle_sync, Cli, Commands,
    ConfigAction,
};
use tracing_subscriber::EnvFilter;

fn setup_logging(verbose: bool) {
    let default = if verbose { "sharknotes=debug" } else { "warn" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    setup_logging(cli.verbose);

    let result = match cli.command {
        Commands::Sync { dry_run, yes, json } => {
            handle_sync(cli.config, cli.vault, dry_run, yes, json).await
        }
        Commands::Config(config_cmd) => match config_cmd.action {
            ConfigAction::Show { json } => handle_config_show(cli.config, json),
            ConfigAction::Set { key, value } => handle_config_set(cli.config, key, value),
            ConfigAction::Path => handle_config_path(cli.config),
        },
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}
