use anyhow::Result;
use ckan_core::Endpoint;
use ckan_flows::{flows, legacy, logging, naming, tour};
use ckan_flows::{ConsoleSink, Dispatcher, ObservationSink, ReqwestTransport, TracingSink};
use clap::{Parser, Subcommand};
use tracing::info;

#[derive(Parser, Debug)]
#[command(name = "ckan-flows", version, about = "Example calls against a CKAN action API")]
struct Cli {
    /// Site URL without the API path and without a trailing slash, e.g. https://beta.avoindata.fi.
    /// Empty means origin-relative URLs resolved against --origin.
    #[arg(long, env = "CKAN_BASE_URL", default_value = "")]
    base_url: String,

    /// API key of the user whose permissions write actions use.
    #[arg(long, env = "CKAN_API_KEY", hide_env_values = true)]
    api_key: Option<String>,

    /// Origin for origin-relative URLs when --base-url is empty.
    #[arg(long, env = "CKAN_ORIGIN")]
    origin: Option<String>,

    /// Send observations through the log instead of stdout.
    #[arg(long)]
    log_observations: bool,

    /// Debug-level diagnostics.
    #[arg(short, long)]
    verbose: bool,

    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug, Clone, Copy)]
enum Command {
    /// List organizations.
    List,
    /// Create a test organization, then delete it.
    CreateDelete,
    /// Both flows concurrently in continuation style; failures are silent.
    Legacy,
    /// Check that the site serves action API version 3.
    Discover,
    /// Discovery plus a full organization and dataset lifecycle.
    Tour,
    /// Listing and create-then-delete concurrently (the default).
    All,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    logging::init_logger(cli.verbose)?;

    let mut endpoint = Endpoint::new(&cli.base_url);
    if endpoint.is_origin_relative() && cli.origin.is_none() {
        anyhow::bail!("no site to call: pass --base-url, or --origin together with an empty base URL");
    }
    if let Some(key) = cli.api_key {
        endpoint = endpoint.with_api_key(key);
    }
    let mut transport = ReqwestTransport::new()?;
    if let Some(origin) = &cli.origin {
        transport = transport.with_origin(origin);
    }
    let dispatcher = Dispatcher::new(endpoint, transport);

    let command = cli.command.unwrap_or(Command::All);
    if cli.log_observations {
        run(command, &dispatcher, &TracingSink).await
    } else {
        run(command, &dispatcher, &ConsoleSink).await
    }
}

async fn run<S: ObservationSink>(command: Command, dispatcher: &Dispatcher<ReqwestTransport>, sink: &S) -> Result<()> {
    match command {
        Command::List => {
            flows::list_organizations(dispatcher, sink).await?;
        }
        Command::CreateDelete => {
            let name = flows::create_then_delete_organization(dispatcher, sink).await?;
            info!(organization = %name, "done");
        }
        Command::Legacy => {
            tokio::join!(
                legacy::list_organizations(dispatcher, sink),
                legacy::create_then_delete_organization(dispatcher, sink),
            );
        }
        Command::Discover => {
            let version = tour::discover_api_version(dispatcher).await?;
            sink.observe(&format!("Action API version {version} found"));
        }
        Command::Tour => {
            tour::run_tour(dispatcher, sink, &naming::execution_id()).await?;
        }
        Command::All => {
            let (listed, chained) = tokio::join!(
                flows::list_organizations(dispatcher, sink),
                flows::create_then_delete_organization(dispatcher, sink),
            );
            listed?;
            chained?;
        }
    }
    Ok(())
}
