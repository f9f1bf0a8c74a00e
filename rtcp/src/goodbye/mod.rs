
use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::util::{get_padding_size, put_padding};

/// The Goodbye (BYE) packet indicates that one or more sources are no
/// longer active.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct Goodbye {
    /// The SSRC/CSRC identifiers that are no longer active.
    pub sources: Vec<u32>,
    /// Optional text indicating the reason for leaving, e.g., "camera
    /// malfunction" or "RTP loop detected". Empty means absent.
    pub reason: Bytes,
}

impl fmt::Display for Goodbye {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = "Goodbye:\n\tSources:\n".to_string();
        for s in &self.sources {
            out += format!("\t{s}\n").as_str();
        }
        out += format!("\tReason: {:?}\n", self.reason).as_str();

        write!(f, "{out}")
    }
}

impl Goodbye {
    /// Appends a leaving source; the header count follows the list length.
    /// Fails once the 5-bit count field is exhausted at 31 sources.
    pub fn add_source(&mut self, ssrc: u32) -> Result<(), Error> {
        if self.sources.len() >= COUNT_MAX {
            return Err(Error::TooManySources);
        }
        self.sources.push(ssrc);
        Ok(())
    }

    /// Removes the first matching source. Returns false when no source
    /// matches; that is a normal outcome, not an error.
    pub fn remove_source(&mut self, ssrc: u32) -> bool {
        match self.sources.iter().position(|s| *s == ssrc) {
            Some(index) => {
                self.sources.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the reason text with a copy of `reason`, which must fit the
    /// single-byte length prefix (at most 255 bytes).
    pub fn set_reason(&mut self, reason: &[u8]) -> Result<(), Error> {
        if reason.len() > REASON_MAX_LENGTH {
            return Err(Error::ReasonTooLong);
        }
        self.reason = Bytes::copy_from_slice(reason);
        Ok(())
    }

    /// Clears the reason text.
    pub fn clear_reason(&mut self) {
        self.reason = Bytes::new();
    }
}

impl Packet for Goodbye {
    /// Header returns the Header associated with this packet, deriving the
    /// count from the source list. The reason's zero padding is plain null
    /// bytes delimited by the reason's own length prefix, so the P bit
    /// stays clear (RFC 3550, 6.6).
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: self.sources.len() as u8,
            packet_type: PacketType::Goodbye,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    /// destination_ssrc returns an array of SSRC values that this packet
    /// refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        self.sources.to_vec()
    }

    fn raw_size(&self) -> usize {
        let reason_length = if self.reason.is_empty() {
            0
        } else {
            self.reason.len() + 1
        };

        HEADER_LENGTH + self.sources.len() * SSRC_LENGTH + reason_length
    }
}

impl MarshalSize for Goodbye {
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        // align to 32-bit boundary
        l + get_padding_size(l)
    }
}

impl Marshal for Goodbye {
    /// marshal_to encodes the packet in binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize, util::Error> {
        /*
         *        0                   1                   2                   3
         *        0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *       |V=2|P|    SC   |   PT=BYE=203  |             length            |
         *       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *       |                           SSRC/CSRC                           |
         *       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *       :                              ...                              :
         *       +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * (opt) |     length    |               reason for leaving            ...
         *       +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        if self.sources.len() > COUNT_MAX {
            return Err(Error::TooManySources.into());
        }
        if self.reason.len() > REASON_MAX_LENGTH {
            return Err(Error::ReasonTooLong.into());
        }
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        for s in &self.sources {
            buf.put_u32(*s);
        }

        if !self.reason.is_empty() {
            buf.put_u8(self.reason.len() as u8);
            buf.put(&*self.reason);
        }

        put_padding(buf, self.raw_size());

        Ok(self.marshal_size())
    }
}

impl Unmarshal for Goodbye {
    /// Unmarshal decodes the Goodbye from binary.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        let raw_packet_len = raw_packet.remaining();
        if raw_packet_len < HEADER_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::Goodbye {
            return Err(Error::WrongType.into());
        }

        if raw_packet_len < HEADER_LENGTH + header.count as usize * SSRC_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let mut sources = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            sources.push(raw_packet.get_u32());
        }

        let mut reason = Bytes::new();
        if raw_packet.has_remaining() {
            let reason_length = raw_packet.get_u8() as usize;
            if reason_length > raw_packet.remaining() {
                return Err(Error::PacketTooShort.into());
            }
            reason = raw_packet.copy_to_bytes(reason_length);

            // discard trailing null padding
            if raw_packet.has_remaining() {
                let trailing = raw_packet.remaining();
                raw_packet.advance(trailing);
            }
        }

        Ok(Goodbye { sources, reason })
    }
}
