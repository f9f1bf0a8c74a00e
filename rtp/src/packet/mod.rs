
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;

/// Packet represents an RTP packet: the fixed header, the CSRC list, and an
/// opaque payload. The payload is owned by the packet; `set_payload` copies
/// and never aliases caller memory. Extension headers are not modeled
/// beyond the X flag; when present their words travel inside the payload.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct Packet {
    pub header: Header,
    payload: Bytes,
}

impl fmt::Display for Packet {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = "RTP PACKET:\n".to_string();

        out += format!("\tVersion: {}\n", self.header.version()).as_str();
        out += format!("\tMarker: {}\n", self.header.marker()).as_str();
        out += format!("\tPayload Type: {}\n", self.header.payload_type()).as_str();
        out += format!("\tSequence Number: {}\n", self.header.sequence_number()).as_str();
        out += format!("\tTimestamp: {}\n", self.header.timestamp()).as_str();
        out += format!(
            "\tSSRC: {} ({:x})\n",
            self.header.ssrc(),
            self.header.ssrc()
        )
        .as_str();
        out += format!("\tPayload Length: {}\n", self.payload.len()).as_str();

        write!(f, "{out}")
    }
}

impl Packet {
    /// Creates a packet for the given payload type with version 2, all flags
    /// clear, and an empty payload.
    ///
    /// Unlike the field setters, which silently mask to the field width,
    /// construction validates its argument: a payload type above 127 is
    /// rejected rather than truncated.
    pub fn new(payload_type: u8) -> Result<Self, Error> {
        if payload_type > PT_MASK {
            return Err(Error::PayloadTypeOutOfRange(payload_type));
        }

        let mut header = Header::default();
        header.set_version(RTP_VERSION);
        header.set_payload_type(payload_type);

        Ok(Packet {
            header,
            payload: Bytes::new(),
        })
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    /// Replaces the payload with a copy of `payload`.
    pub fn set_payload(&mut self, payload: &[u8]) {
        self.payload = Bytes::copy_from_slice(payload);
    }

    /// Resets the payload to zero length.
    pub fn clear_payload(&mut self) {
        self.payload = Bytes::new();
    }
}

impl MarshalSize for Packet {
    /// marshal_size returns the serialized size: 12 + 4 * CC + payload length.
    fn marshal_size(&self) -> usize {
        self.header.marshal_size() + self.payload.len()
    }
}

impl Marshal for Packet {
    /// marshal_to serializes the header and payload into `buf`.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize, util::Error> {
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::ErrBufferTooSmall.into());
        }

        let n = self.header.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put(&*self.payload);

        Ok(self.marshal_size())
    }
}

impl Unmarshal for Packet {
    /// Unmarshal parses `raw_packet` into a header and payload. Everything
    /// after the CSRC list becomes the payload.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        let header = Header::unmarshal(raw_packet)?;
        let payload = raw_packet.copy_to_bytes(raw_packet.remaining());

        Ok(Packet { header, payload })
    }
}
