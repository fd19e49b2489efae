use async_trait::async_trait;
use dnswire_domain::{Config, DomainError, Message, ResponseCode, Section};
use dnswire_infrastructure::dns::{RequestHandler, ServerResponse};
use tracing::{debug, warn};

/// Answers every question as if authoritative for the queried name.
pub struct AuthoritativeHandler;

#[async_trait]
impl RequestHandler for AuthoritativeHandler {
    async fn handle(&self, request: Message, mut response: ServerResponse) {
        if let Some(question) = request.questions.first() {
            let zone = question.name.clone();
            if let Err(e) = populate(&mut response, &zone) {
                warn!(peer = %response.peer(), zone = %zone, error = %e, "Cannot build answer");
                *response = Message::response_to(&request);
                response.set_header(|h| h.rcode = ResponseCode::ServFail.to_u8());
            }
        }

        match response.send().await {
            Ok(outcome) => debug!(
                peer = %response.peer(),
                bytes = outcome.bytes,
                truncated = outcome.truncated,
                "Answered"
            ),
            Err(e) => warn!(peer = %response.peer(), error = %e, "Failed to send answer"),
        }
    }
}

fn child(label: &str, zone: &str) -> String {
    if zone == "." {
        label.to_string()
    } else {
        format!("{}.{}", label, zone)
    }
}

/// Fills `message` with the fixed record set for `zone`: SOA, TXT and MX
/// answers, four NS records and their glue.
pub fn populate(message: &mut Message, zone: &str) -> Result<(), DomainError> {
    message.set_header(|h| {
        h.qr = true;
        h.ra = true;
        h.rd = false;
    });

    let hostmaster = child("hostmaster", zone);
    let mail = child("mail", zone);
    message.add_record_to(
        Section::Answer,
        zone,
        1,
        "IN",
        "SOA",
        &[hostmaster.as_str(), hostmaster.as_str(), "1", "2", "3", "4", "5"],
    )?;
    message.add_record_to(Section::Answer, zone, 2, "IN", "TXT", &["Hello World"])?;
    message.add_record_to(Section::Answer, zone, 3, "IN", "MX", &["10", mail.as_str()])?;

    let servers: Vec<String> = ["ns1", "ns2", "ns3", "ns4"]
        .iter()
        .map(|label| child(label, zone))
        .collect();
    for (ttl, server) in (4..).zip(&servers) {
        message.add_record_to(Section::Authority, zone, ttl, "IN", "NS", &[server.as_str()])?;
    }

    message.add_record_to(Section::Additional, &mail, 8, "IN", "A", &["127.0.0.1"])?;
    let glue = ["127.0.0.1", "127.0.0.2", "127.0.0.3", "127.0.0.4"];
    for ((ttl, server), addr) in (9..).zip(&servers).zip(glue) {
        message.add_record_to(Section::Additional, server.as_str(), ttl, "IN", "A", &[addr])?;
    }
    Ok(())
}

pub async fn run(config: &Config) -> anyhow::Result<()> {
    super::start_dns_server(config, AuthoritativeHandler).await
}
