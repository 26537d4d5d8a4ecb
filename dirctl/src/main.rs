//! Command-line client for the directory service: dials `dird`'s gRPC
//! facade over whatever `--server` address is given and prints results in
//! the requested `--output` format.

mod client;
mod commands;
mod output;
mod reference;

use std::path::PathBuf;

use clap::{Parser, Subcommand};
use output::OutputFormat;

#[derive(Parser, Debug)]
#[command(name = "dirctl", author, version, about = "Client for the Agent Directory service")]
struct Cli {
    /// Address of the directory service's gRPC facade.
    #[arg(long, global = true, default_value = "127.0.0.1:8080")]
    server: String,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Push a record from a file or stdin.
    Push {
        path: Option<PathBuf>,
        #[arg(long)]
        stdin: bool,
        #[arg(long, value_enum, default_value = "raw")]
        output: OutputFormat,
    },
    /// Pull a record by CID or name reference.
    Pull {
        reference: String,
        #[arg(long, value_enum, default_value = "json")]
        output: OutputFormat,
    },
    /// Print a record's stored metadata.
    Info {
        reference: String,
        #[arg(long, value_enum, default_value = "human")]
        output: OutputFormat,
    },
    /// Delete a record by CID.
    Delete { cid: String },
    /// Search the index.
    Search(SearchArgs),
    /// Announce a locally-held CID to the routing layer.
    Publish {
        cid: String,
        #[arg(long, conflicts_with = "network")]
        local: bool,
        #[arg(long)]
        network: bool,
    },
    /// Withdraw a CID's routing announcement.
    Unpublish { cid: String },
    /// List peers known to the routing layer.
    List(ListArgs),
    /// Attach an ECDSA P-256 signature to a stored record.
    Sign { cid: String, key: String },
    /// Re-run and print cached signature verification for a record.
    Verify {
        cid: String,
        #[arg(long, value_enum, default_value = "human")]
        output: OutputFormat,
    },
    /// Name-ownership verification.
    Naming(NamingArgs),
    /// Import records from an external catalog.
    Import {
        #[arg(long = "type")]
        import_type: String,
        #[arg(long)]
        url: String,
        #[arg(long)]
        limit: Option<usize>,
        #[arg(long)]
        enrich_config: Option<PathBuf>,
    },
}

#[derive(clap::Args, Debug)]
struct ListArgs {
    #[command(subcommand)]
    action: ListAction,
}

#[derive(Subcommand, Debug)]
enum ListAction {
    /// List peers known to announce a given digest.
    Peers {
        #[arg(long)]
        digest: String,
        #[arg(long, value_enum, default_value = "human")]
        output: OutputFormat,
    },
}

#[derive(clap::Args, Debug)]
struct NamingArgs {
    #[command(subcommand)]
    action: NamingAction,
}

#[derive(Subcommand, Debug)]
enum NamingAction {
    /// Force a fresh well-known-document fetch and re-verify.
    Verify {
        reference: String,
        #[arg(long, value_enum, default_value = "human")]
        output: OutputFormat,
    },
    /// Print the last cached name verification.
    Check {
        reference: String,
        #[arg(long, value_enum, default_value = "human")]
        output: OutputFormat,
    },
}

#[derive(clap::Args, Debug)]
struct SearchArgs {
    #[arg(long = "name")]
    name: Vec<String>,
    #[arg(long = "version")]
    version: Vec<String>,
    #[arg(long = "skill-id")]
    skill_id: Vec<i64>,
    #[arg(long = "skill-name")]
    skill_name: Vec<String>,
    #[arg(long = "locator")]
    locator: Vec<String>,
    #[arg(long = "domain")]
    domain: Vec<String>,
    #[arg(long = "domain-id")]
    domain_id: Vec<i64>,
    #[arg(long = "module")]
    module: Vec<String>,
    #[arg(long = "author")]
    author: Vec<String>,
    #[arg(long = "schema-version")]
    schema_version: Vec<String>,
    #[arg(long = "created-at")]
    created_at: Vec<String>,
    #[arg(long, default_value_t = 100)]
    limit: i64,
    #[arg(long, default_value_t = 0)]
    offset: i64,
    #[arg(long, value_enum, default_value = "json")]
    output: OutputFormat,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| "warn".into()))
        .init();

    let cli = Cli::parse();
    if let Err(err) = run(cli).await {
        eprintln!("error: {err:#}");
        std::process::exit(1);
    }
    Ok(())
}

async fn run(cli: Cli) -> anyhow::Result<()> {
    let server = cli.server.as_str();
    match cli.command {
        Command::Push { path, stdin, output } => commands::store::push(server, path, stdin, output).await,
        Command::Pull { reference, output } => commands::store::pull(server, &reference, output).await,
        Command::Info { reference, output } => commands::store::info(server, &reference, output).await,
        Command::Delete { cid } => commands::store::delete(server, &cid).await,
        Command::Search(args) => {
            let output = args.output;
            commands::search::run(
                server,
                commands::search::SearchArgs {
                    name: args.name,
                    version: args.version,
                    skill_id: args.skill_id,
                    skill_name: args.skill_name,
                    locator: args.locator,
                    domain: args.domain,
                    domain_id: args.domain_id,
                    module: args.module,
                    author: args.author,
                    schema_version: args.schema_version,
                    created_at: args.created_at,
                    limit: args.limit,
                    offset: args.offset,
                },
                output,
            )
            .await
        }
        Command::Publish { cid, local: _, network } => commands::routing::publish(server, &cid, network).await,
        Command::Unpublish { cid } => commands::routing::unpublish(server, &cid).await,
        Command::List(ListArgs { action: ListAction::Peers { digest, output } }) => {
            commands::routing::list_peers(server, &digest, output).await
        }
        Command::Sign { cid, key } => commands::sign::sign(server, &cid, &key).await,
        Command::Verify { cid, output } => commands::sign::verify(server, &cid, output).await,
        Command::Naming(NamingArgs { action: NamingAction::Verify { reference, output } }) => {
            commands::naming::verify(server, &reference, output).await
        }
        Command::Naming(NamingArgs { action: NamingAction::Check { reference, output } }) => {
            commands::naming::check(server, &reference, output).await
        }
        Command::Import { import_type, url, limit, enrich_config } => {
            commands::import::run(server, &import_type, &url, limit, enrich_config).await
        }
    }
}
