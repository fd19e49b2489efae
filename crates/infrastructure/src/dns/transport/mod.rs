pub mod client;
pub mod outgoing;
pub mod pending;
pub mod scratch_pool;
pub mod server;
pub mod socket;

pub use client::{ClientRequest, DnsClient, PendingResponse};
pub use outgoing::{OutgoingMessage, SendOutcome};
pub use pending::{PendingKey, PendingRequest, PendingTable};
pub use scratch_pool::{PoolStats, ScratchBuffer, ScratchPool};
pub use server::{DnsServer, RequestHandler, ServerResponse};
pub use socket::create_udp_socket;
