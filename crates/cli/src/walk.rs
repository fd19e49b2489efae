use anyhow::{anyhow, Context};
use dnswire_domain::config::TransportConfig;
use dnswire_domain::{Config, Message, RData, RecordType};
use dnswire_infrastructure::dns::transport::socket::unspecified_for;
use dnswire_infrastructure::dns::DnsClient;
use std::collections::HashSet;
use std::net::SocketAddr;
use std::time::Duration;
use tracing::{debug, info, warn};

const ROOT_SERVER: &str = "a.root-servers.net:53";

/// Follows the NSEC chain from `start`, printing each owner name, until the
/// chain wraps, a name repeats, a server stops answering with NSEC, or
/// `limit` names have been visited.
pub async fn run(
    config: &Config,
    server: Option<SocketAddr>,
    start: &str,
    limit: usize,
) -> anyhow::Result<()> {
    let server = match server {
        Some(server) => server,
        None => resolve_root_server().await?,
    };
    info!(server = %server, start, limit, "Walking NSEC chain");

    let names = walk(server, &config.transport, config.client.query_timeout(), start, limit).await?;
    for name in &names {
        println!("{}", name);
    }
    Ok(())
}

async fn resolve_root_server() -> anyhow::Result<SocketAddr> {
    let addrs: Vec<SocketAddr> = tokio::net::lookup_host(ROOT_SERVER)
        .await
        .with_context(|| format!("cannot resolve {}", ROOT_SERVER))?
        .collect();
    addrs
        .iter()
        .find(|addr| addr.is_ipv4())
        .or_else(|| addrs.first())
        .copied()
        .ok_or_else(|| anyhow!("{} has no addresses", ROOT_SERVER))
}

fn canonical(name: &str) -> String {
    name.trim_end_matches('.').to_ascii_lowercase()
}

fn same_name(a: &str, b: &str) -> bool {
    canonical(a) == canonical(b)
}

/// Returns the visited names in chain order, starting with `start`.
pub async fn walk(
    server: SocketAddr,
    transport: &TransportConfig,
    timeout: Duration,
    start: &str,
    limit: usize,
) -> anyhow::Result<Vec<String>> {
    let client = DnsClient::bind(unspecified_for(server), transport).await?;
    let mut visited = Vec::new();
    let mut seen = HashSet::new();
    let mut current = start.to_string();

    while visited.len() < limit {
        seen.insert(canonical(&current));
        visited.push(current.clone());

        let response = query(&client, server, timeout, &current).await?;
        let next = match next_name(&response) {
            Some(next) => next,
            None => {
                warn!(name = %current, rcode = ?response.header.rcode(), "No NSEC record in answer");
                break;
            }
        };
        debug!(name = %current, next = %next, "Followed NSEC link");

        if same_name(&next, start) || seen.contains(&canonical(&next)) {
            break;
        }
        current = next;
    }
    Ok(visited)
}

async fn query(
    client: &DnsClient,
    server: SocketAddr,
    timeout: Duration,
    name: &str,
) -> anyhow::Result<Message> {
    let mut request = client.request(server);
    request.header.rd = true;
    request.add_question(name, "NSEC", "IN")?;
    let pending = request.send().await?;
    let id = pending.id();

    match tokio::time::timeout(timeout, pending.recv()).await {
        Ok(response) => Ok(response?),
        Err(_) => {
            client.cancel(id, server);
            Err(anyhow!("{} did not answer NSEC query for {}", server, name))
        }
    }
}

fn next_name(response: &Message) -> Option<String> {
    response
        .records()
        .filter(|rr| rr.record_type == RecordType::NSEC)
        .find_map(|rr| match &rr.rdata {
            RData::Nsec {
                next_domain_name, ..
            } => Some(next_domain_name.clone()),
            _ => None,
        })
}
