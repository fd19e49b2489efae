pub mod rdata;
pub mod record;
pub mod record_class;
pub mod record_type;

pub use rdata::{build_type_bitmap, parse_type_bitmap, RData, Soa};
pub use record::ResourceRecord;
pub use record_class::RecordClass;
pub use record_type::RecordType;
