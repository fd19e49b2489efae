use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DomainError {
    /// Structurally invalid input: bad label length, non-hex bit-string,
    /// rdlength mismatch.
    #[error("Format error: {0}")]
    FormatError(String),

    /// Destination capacity exhausted, or a name/label over its protocol maximum.
    #[error("Size error: {0}")]
    SizeError(String),

    /// A cursor would move past the declared end of its buffer.
    #[error("Bounds error: {0}")]
    BoundsError(String),

    #[error("Unknown record type: {0}")]
    UnknownRecordType(String),

    #[error("Unknown record class: {0}")]
    UnknownRecordClass(String),

    #[error("Invalid record data: {0}")]
    InvalidRdata(String),

    #[error("Request with id {id} to {peer} is already in flight")]
    DuplicateRequest { id: u16, peer: String },

    #[error("Request cancelled before a response arrived")]
    RequestCancelled,

    #[error("Message size {0} exceeds 65535 bytes")]
    MessageTooLarge(usize),

    #[error("I/O error: {0}")]
    IoError(String),
}

impl DomainError {
    pub fn is_format(&self) -> bool {
        matches!(self, DomainError::FormatError(_))
    }

    pub fn is_size(&self) -> bool {
        matches!(self, DomainError::SizeError(_))
    }

    pub fn is_bounds(&self) -> bool {
        matches!(self, DomainError::BoundsError(_))
    }

    /// True for the three wire-codec failure classes.
    pub fn is_codec(&self) -> bool {
        self.is_format() || self.is_size() || self.is_bounds()
    }
}

impl From<std::io::Error> for DomainError {
    fn from(e: std::io::Error) -> Self {
        DomainError::IoError(e.to_string())
    }
}
