//! dnswire domain layer: message model, record tables and configuration.
pub mod config;
pub mod dns_header;
pub mod dns_message;
pub mod dns_record;
pub mod errors;

pub use config::{CliOverrides, Config};
pub use dns_header::{Header, ResponseCode};
pub use dns_message::{Message, Question, Section};
pub use dns_record::{RData, RecordClass, RecordType, ResourceRecord, Soa};
pub use errors::DomainError;
