use clap::{Parser, Subcommand};
use dnswire_domain::CliOverrides;
use std::net::SocketAddr;
use tracing::info;

mod bootstrap;
mod server;
mod walk;

#[derive(Parser)]
#[command(name = "dnswire")]
#[command(version)]
#[command(about = "dnswire - DNS wire codec with UDP server and client demos")]
struct Cli {
    /// Configuration file path
    #[arg(short = 'c', long, value_name = "FILE", global = true)]
    config: Option<String>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    log_level: Option<String>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Answer every question authoritatively with a fixed record set
    Serve {
        /// DNS server port
        #[arg(short = 'd', long)]
        dns_port: Option<u16>,

        /// Bind address
        #[arg(short = 'b', long)]
        bind: Option<String>,
    },

    /// Relay every request to an upstream server
    Proxy {
        /// DNS server port
        #[arg(short = 'd', long)]
        dns_port: Option<u16>,

        /// Bind address
        #[arg(short = 'b', long)]
        bind: Option<String>,

        /// Upstream server (IP:PORT)
        #[arg(short = 'u', long)]
        upstream: Option<String>,
    },

    /// Follow NSEC links from a starting name and print each owner
    Walk {
        /// Server to query; defaults to A.ROOT-SERVERS.NET
        #[arg(short = 's', long)]
        server: Option<SocketAddr>,

        /// Name to start from
        #[arg(long, default_value = ".")]
        start: String,

        /// Maximum number of names to visit
        #[arg(short = 'n', long, default_value_t = 50)]
        limit: usize,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let mut cli_overrides = CliOverrides {
        log_level: cli.log_level.clone(),
        ..Default::default()
    };
    match &cli.command {
        Command::Serve { dns_port, bind } => {
            cli_overrides.dns_port = *dns_port;
            cli_overrides.bind_address = bind.clone();
        }
        Command::Proxy {
            dns_port,
            bind,
            upstream,
        } => {
            cli_overrides.dns_port = *dns_port;
            cli_overrides.bind_address = bind.clone();
            cli_overrides.upstream = upstream.clone();
        }
        Command::Walk { .. } => {}
    }

    let config = bootstrap::load_config(cli.config.as_deref(), cli_overrides)?;

    bootstrap::init_logging(&config.logging);

    info!("Starting dnswire v{}", env!("CARGO_PKG_VERSION"));

    match cli.command {
        Command::Serve { .. } => server::authoritative::run(&config).await?,
        Command::Proxy { .. } => server::proxy::run(&config).await?,
        Command::Walk {
            server,
            start,
            limit,
        } => walk::run(&config, server, &start, limit).await?,
    }

    Ok(())
}
