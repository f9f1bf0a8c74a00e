use thiserror::Error;

#[derive(Error, Debug, PartialEq)]
#[non_exhaustive]
pub enum Error {
    /// Buffer does not hold a complete fixed header.
    #[error("RTP header size insufficient")]
    ErrHeaderSizeInsufficient,
    /// Buffer ends inside the CSRC list declared by the CC field.
    #[error("RTP header size insufficient for CSRC list")]
    ErrHeaderSizeInsufficientForCsrc,
    /// Output buffer cannot hold the marshaled packet.
    #[error("buffer too small")]
    ErrBufferTooSmall,
    /// Payload type given at construction is outside the 7-bit domain.
    #[error("payload type {0} out of range [0-127]")]
    PayloadTypeOutOfRange(u8),

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
