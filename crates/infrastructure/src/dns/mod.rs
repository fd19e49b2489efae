pub mod events;
pub mod transport;
pub mod wire;

pub use events::{ResponseEvent, ResponseEventEmitter};
pub use transport::{
    ClientRequest, DnsClient, DnsServer, OutgoingMessage, PendingResponse, RequestHandler,
    ServerResponse,
};
pub use wire::{decode_message, encode_message, encode_to_vec, validate_message};
