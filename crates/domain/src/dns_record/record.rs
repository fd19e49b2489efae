use super::{RData, RecordClass, RecordType};
use crate::DomainError;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResourceRecord {
    /// Owner name in presentation form.
    pub name: String,

    pub record_type: RecordType,

    pub class: RecordClass,

    pub ttl: u32,

    pub rdata: RData,
}

impl ResourceRecord {
    /// Fails with `InvalidRdata` when the payload shape does not belong to `record_type`.
    pub fn new(
        name: impl Into<String>,
        record_type: RecordType,
        class: RecordClass,
        ttl: u32,
        rdata: RData,
    ) -> Result<Self, DomainError> {
        if !rdata.fits(record_type) {
            return Err(DomainError::InvalidRdata(format!(
                "{} payload cannot be carried by a {} record",
                rdata
                    .natural_type()
                    .map_or_else(|| "raw".to_string(), |t| t.to_string()),
                record_type
            )));
        }
        Ok(Self {
            name: name.into(),
            record_type,
            class,
            ttl,
            rdata,
        })
    }

    /// Builds a record from mnemonic names and positional payload arguments,
    /// e.g. `("mail.example.com", 8, "IN", "A", &["127.0.0.1"])`.
    pub fn from_args(
        name: impl Into<String>,
        ttl: u32,
        class_name: &str,
        type_name: &str,
        args: &[&str],
    ) -> Result<Self, DomainError> {
        let record_type: RecordType = type_name.parse()?;
        let class: RecordClass = class_name.parse()?;
        let rdata = RData::from_args(record_type, args)?;
        Self::new(name, record_type, class, ttl, rdata)
    }
}
