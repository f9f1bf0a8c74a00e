use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Packet contains an invalid header.
    #[error("Invalid header")]
    InvalidHeader,
    /// Cumulative lost exceeds the 24-bit wire field.
    #[error("Invalid total lost count")]
    InvalidTotalLost,
    /// Report list is already at the 5-bit count maximum of 31.
    #[error("Too many reports")]
    TooManyReports,
    /// Source list is already at the 5-bit count maximum of 31.
    #[error("Too many sources")]
    TooManySources,
    /// Input buffer is truncated relative to the declared structure.
    #[error("Packet too short")]
    PacketTooShort,
    /// Output buffer cannot hold the marshaled packet.
    #[error("Buffer too short to be written")]
    BufferTooShort,
    /// Packet type in the common header does not match the model.
    #[error("Wrong packet type")]
    WrongType,
    /// Goodbye reason exceeds its single-byte length prefix.
    #[error("Reason must be < 255 octets long")]
    ReasonTooLong,
    /// Common header carries a version other than 2.
    #[error("Invalid packet version")]
    BadVersion,
    /// Profile-specific extension is not a whole number of 32-bit words.
    #[error("Profile extension must be in 32-bit words")]
    ProfileExtensionNotAligned,

    #[error("{0}")]
    Util(#[from] util::Error),

    #[error("{0}")]
    Other(String),
}

impl From<Error> for util::Error {
    fn from(e: Error) -> Self {
        util::Error::from_std(e)
    }
}

impl PartialEq<util::Error> for Error {
    fn eq(&self, other: &util::Error) -> bool {
        if let Some(down) = other.downcast_ref::<Error>() {
            self == down
        } else {
            false
        }
    }
}
