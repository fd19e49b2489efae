use async_trait::async_trait;
use dnswire_domain::config::TransportConfig;
use dnswire_domain::{DomainError, Message, RData};
use dnswire_infrastructure::dns::wire::PACKETSZ;
use dnswire_infrastructure::dns::{encode_to_vec, DnsClient, RequestHandler, ServerResponse};
use std::net::{Ipv4Addr, SocketAddr};
use std::time::Duration;
use tokio::net::UdpSocket;

mod helpers;
use helpers::{loopback, spawn_server, MessageBuilder};

const WAIT: Duration = Duration::from_secs(5);

/// Answers every question with one A record.
struct AddressHandler;

#[async_trait]
impl RequestHandler for AddressHandler {
    async fn handle(&self, request: Message, mut response: ServerResponse) {
        for question in &request.questions {
            response
                .add_record(question.name.as_str(), 60, "IN", "A", &["192.0.2.53"])
                .unwrap();
        }
        response.send().await.unwrap();
    }
}

/// Never answers.
struct SilentHandler;

#[async_trait]
impl RequestHandler for SilentHandler {
    async fn handle(&self, _request: Message, _response: ServerResponse) {}
}

/// Answers with more records than a small budget can hold.
struct OversizedHandler;

#[async_trait]
impl RequestHandler for OversizedHandler {
    async fn handle(&self, _request: Message, mut response: ServerResponse) {
        response.set_max_send(64).unwrap();
        for answer in MessageBuilder::new(0).many_answers(10).build().answers {
            response.push_record(dnswire_domain::Section::Answer, answer);
        }
        response.send().await.unwrap();
    }
}

async fn client() -> DnsClient {
    DnsClient::bind(loopback(), &TransportConfig::default())
        .await
        .unwrap()
}

async fn ask(client: &DnsClient, server: SocketAddr, name: &str) -> Result<Message, DomainError> {
    let mut request = client.request(server);
    request.add_question(name, "A", "IN").unwrap();
    let pending = request.send().await?;
    tokio::time::timeout(WAIT, pending.recv())
        .await
        .expect("response timed out")
}

#[tokio::test]
async fn test_request_receives_matching_response() {
    let server = spawn_server(AddressHandler).await;
    let client = client().await;

    let response = ask(&client, server, "www.example.com").await.unwrap();

    assert!(response.header.qr);
    assert_eq!(response.questions[0].name, "www.example.com");
    assert_eq!(response.answers.len(), 1);
    assert_eq!(response.answers[0].rdata, RData::A(Ipv4Addr::new(192, 0, 2, 53)));
    assert_eq!(client.pending_count(), 0);
}

#[tokio::test]
async fn test_concurrent_requests_share_one_socket() {
    let server = spawn_server(AddressHandler).await;
    let client = client().await;

    let mut handles = Vec::new();
    for i in 0..10u16 {
        let mut request = client.request(server);
        request.header.id = 1000 + i;
        request
            .add_question(format!("host{}.example.com", i), "A", "IN")
            .unwrap();
        handles.push(tokio::spawn(async move {
            let pending = request.send().await.unwrap();
            tokio::time::timeout(WAIT, pending.recv()).await.unwrap().unwrap()
        }));
    }

    for (i, handle) in handles.into_iter().enumerate() {
        let response = handle.await.unwrap();
        assert_eq!(response.header.id, 1000 + i as u16);
        assert_eq!(response.questions[0].name, format!("host{}.example.com", i));
    }
    assert_eq!(client.pending_count(), 0);
}

#[tokio::test]
async fn test_duplicate_in_flight_request_is_refused() {
    let server = spawn_server(SilentHandler).await;
    let client = client().await;
    let query = MessageBuilder::new(7).question("example.com", "A").build();

    let first = client.request(server).send_message(&query).await.unwrap();
    assert_eq!(first.id(), 7);
    assert!(client.submitted_at(7, server).is_some());

    let second = client.request(server).send_message(&query).await;
    assert!(matches!(second, Err(DomainError::DuplicateRequest { id: 7, .. })));
    assert_eq!(client.pending_count(), 1);

    assert!(client.cancel(7, server));
    assert_eq!(first.recv().await, Err(DomainError::RequestCancelled));
    assert_eq!(client.pending_count(), 0);
}

#[tokio::test]
async fn test_expired_requests_are_cancelled() {
    let server = spawn_server(SilentHandler).await;
    let client = client().await;

    let mut request = client.request(server);
    request.add_question("example.com", "A", "IN").unwrap();
    let pending = request.send().await.unwrap();
    let key = (pending.id(), pending.destination());

    assert!(client.expire_older_than(Duration::from_secs(3600)).is_empty());
    assert_eq!(client.expire_older_than(Duration::ZERO), vec![key]);
    assert_eq!(pending.recv().await, Err(DomainError::RequestCancelled));
}

#[tokio::test]
async fn test_budget_below_header_fails_without_pending_entry() {
    let server = spawn_server(AddressHandler).await;
    let client = client().await;

    let mut request = client.request(server);
    request.add_question("example.com", "A", "IN").unwrap();
    request.set_max_send(8).unwrap();
    let result = request.send().await;
    assert!(result.unwrap_err().is_size());
    assert_eq!(client.pending_count(), 0);

    let mut request = client.request(server);
    assert_eq!(
        request.set_max_send(70_000),
        Err(DomainError::MessageTooLarge(70_000))
    );
}

#[tokio::test]
async fn test_oversized_response_arrives_truncated() {
    let server = spawn_server(OversizedHandler).await;
    let client = client().await;

    let response = ask(&client, server, "example.com").await.unwrap();

    assert!(response.header.tc);
    assert_eq!(response.questions.len(), 1);
    assert!(response.answers.is_empty());
}

#[tokio::test]
async fn test_server_skips_malformed_datagrams() {
    let server = spawn_server(AddressHandler).await;
    let raw = UdpSocket::bind(loopback()).await.unwrap();
    raw.send_to(&[0xde, 0xad, 0xbe], server).await.unwrap();
    raw.send_to(&[0, 1, 0, 0, 0, 1, 0, 0, 0, 0, 0, 0], server)
        .await
        .unwrap();

    let client = client().await;
    let response = ask(&client, server, "after.example").await.unwrap();
    assert_eq!(response.answers.len(), 1);
}

#[tokio::test]
async fn test_response_events_report_matched_and_unsolicited() {
    let server = spawn_server(AddressHandler).await;
    let (client, mut events) = DnsClient::bind_with_events(loopback(), &TransportConfig::default())
        .await
        .unwrap();

    let response = ask(&client, server, "example.com").await.unwrap();
    let event = tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert!(event.matched);
    assert_eq!(event.id(), response.header.id);
    assert_eq!(event.peer, server);

    let stray = MessageBuilder::new(0x4242).response().question("stray.example", "A").build();
    let (wire, _) = encode_to_vec(&stray, PACKETSZ).unwrap();
    let raw = UdpSocket::bind(loopback()).await.unwrap();
    raw.send_to(&wire, client.local_addr().unwrap()).await.unwrap();

    let event = tokio::time::timeout(WAIT, events.recv()).await.unwrap().unwrap();
    assert!(event.is_unsolicited());
    assert_eq!(event.id(), 0x4242);
    assert_eq!(event.peer, raw.local_addr().unwrap());
    assert_eq!(event.message, stray);
}
