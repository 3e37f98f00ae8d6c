//! CLI entry point - the composition root.
//!
//! This is the ONLY place where infrastructure is wired together via
//! bootstrap. Command dispatch routes to handlers which delegate to the
//! sync facade.

use clap::{CommandFactory, Parser};
use tracing_subscriber::EnvFilter;

use tanksync_cli::{Cli, CliConfig, CliContext, CliError, Commands, bootstrap, handlers};

fn init_tracing(verbose: bool) {
    let default = if verbose { "debug" } else { "info" };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();
}

#[tokio::main]
async fn main() {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    init_tracing(cli.verbose);

    if let Err(e) = run(cli).await {
        eprintln!("Error: {e:#}");
        let code = e.downcast_ref::<CliError>().map_or(1, CliError::exit_code);
        std::process::exit(code);
    }
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let config = CliConfig::from_cli(&cli)?;

    let Some(command) = cli.command else {
        Cli::command().print_help()?;
        return Ok(());
    };

    // Paths never opens a store
    if matches!(command, Commands::Paths) {
        return handlers::paths::execute(&config.stores);
    }

    let ctx = bootstrap(config).await?;
    dispatch(&ctx, command).await
}

async fn dispatch(ctx: &CliContext, command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Paths => handlers::paths::execute(&ctx.stores)?,
        Commands::PostNews {
            title,
            source,
            content,
            url,
        } => {
            handlers::post_news::execute(ctx, &title, &source, content, url).await?;
        }
        Commands::Remark { text, source } => {
            handlers::remark::execute(ctx, &text, &source).await?;
        }
        Commands::WatchAdd { symbols } => {
            handlers::watchlist::add(ctx, &symbols).await?;
        }
        Commands::WatchRemove { symbol } => {
            handlers::watchlist::remove(ctx, &symbol).await?;
        }
        Commands::Show { collection, limit } => {
            handlers::show::execute(ctx, &collection, limit).await?;
        }
        Commands::Spoken { id, mark } => {
            handlers::spoken::execute(ctx, &id, mark).await?;
        }
        Commands::Follow {
            collection,
            announce,
        } => {
            handlers::follow::execute(ctx, &collection, announce).await?;
        }
    }

    Ok(())
}
