//! CLI entry point - the composition root.

use clap::{CommandFactory, Parser};

use instafetch_cli::{Cli, Commands, handlers, logging};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Load .env before parsing so env-backed flags see it
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    logging::init(cli.verbose);

    let Some(command) = cli.command else {
        // No command provided - show help
        Cli::command().print_help()?;
        return Ok(());
    };

    let settings = cli.settings.to_settings();

    match command {
        Commands::Serve {
            host,
            port,
            allow_origins,
        } => {
            let config = handlers::serve::server_config(settings, host, port, allow_origins);
            handlers::serve::execute(config).await?;
        }
        Commands::Fetch {
            url,
            output,
            cookies_from_browser,
        } => {
            handlers::fetch::execute(settings, &url, &output, cookies_from_browser).await?;
        }
        Commands::Clean => {
            handlers::clean::execute(&settings).await?;
        }
        Commands::Check => {
            handlers::check::execute(&settings)?;
        }
    }

    Ok(())
}
