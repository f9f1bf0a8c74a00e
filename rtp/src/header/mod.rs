
use bytes::{Buf, BufMut};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;

pub const RTP_VERSION: u8 = 2;

pub const HEADER_LENGTH: usize = 12;
pub const VERSION_SHIFT: u8 = 6;
pub const VERSION_MASK: u8 = 0x3;
pub const PADDING_SHIFT: u8 = 5;
pub const PADDING_MASK: u8 = 0x1;
pub const EXTENSION_SHIFT: u8 = 4;
pub const EXTENSION_MASK: u8 = 0x1;
pub const CC_MASK: u8 = 0xF;
pub const MARKER_SHIFT: u8 = 7;
pub const MARKER_MASK: u8 = 0x1;
pub const PT_MASK: u8 = 0x7F;
pub const CSRC_LENGTH: usize = 4;
pub const CSRC_MAX: usize = CC_MASK as usize;

/// Header models the fixed 12-byte RTP header plus the CSRC list.
///
/// Fields are private; the typed accessors mask every write to the declared
/// bit width of the wire field, so a Header can never hold a value the
/// packed layout cannot carry. The CC field is derived from the CSRC list
/// length and the two are resized together.
#[derive(Debug, Eq, PartialEq, Default, Clone)]
pub struct Header {
    version: u8,
    padding: bool,
    extension: bool,
    marker: bool,
    payload_type: u8,
    sequence_number: u16,
    timestamp: u32,
    ssrc: u32,
    csrc: Vec<u32>,
}

impl Header {
    pub fn version(&self) -> u8 {
        self.version
    }

    /// Writes the low 2 bits of `version`.
    pub fn set_version(&mut self, version: u8) {
        self.version = version & VERSION_MASK;
    }

    pub fn padding(&self) -> bool {
        self.padding
    }

    pub fn set_padding(&mut self, padding: bool) {
        self.padding = padding;
    }

    pub fn extension(&self) -> bool {
        self.extension
    }

    pub fn set_extension(&mut self, extension: bool) {
        self.extension = extension;
    }

    pub fn marker(&self) -> bool {
        self.marker
    }

    pub fn set_marker(&mut self, marker: bool) {
        self.marker = marker;
    }

    pub fn payload_type(&self) -> u8 {
        self.payload_type
    }

    /// Writes the low 7 bits of `payload_type`.
    pub fn set_payload_type(&mut self, payload_type: u8) {
        self.payload_type = payload_type & PT_MASK;
    }

    pub fn sequence_number(&self) -> u16 {
        self.sequence_number
    }

    pub fn set_sequence_number(&mut self, sequence_number: u16) {
        self.sequence_number = sequence_number;
    }

    pub fn timestamp(&self) -> u32 {
        self.timestamp
    }

    pub fn set_timestamp(&mut self, timestamp: u32) {
        self.timestamp = timestamp;
    }

    pub fn ssrc(&self) -> u32 {
        self.ssrc
    }

    pub fn set_ssrc(&mut self, ssrc: u32) {
        self.ssrc = ssrc;
    }

    pub fn csrc_count(&self) -> u8 {
        self.csrc.len() as u8
    }

    /// Writes the low 4 bits of `count` and resizes the CSRC list to match,
    /// zero-filling new entries.
    pub fn set_csrc_count(&mut self, count: u8) {
        self.csrc.resize((count & CC_MASK) as usize, 0);
    }

    pub fn csrc(&self) -> &[u32] {
        &self.csrc
    }

    /// Replaces the CSRC list, keeping at most the first 15 entries.
    pub fn set_csrc(&mut self, csrc: Vec<u32>) {
        self.csrc = csrc;
        self.csrc.truncate(CSRC_MAX);
    }
}

impl MarshalSize for Header {
    fn marshal_size(&self) -> usize {
        HEADER_LENGTH + self.csrc.len() * CSRC_LENGTH
    }
}

impl Marshal for Header {
    /// marshal_to packs the header into `buf` in network byte order.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize, util::Error> {
        /*
         *  0                   1                   2                   3
         *  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |V=2|P|X|  CC   |M|     PT      |       sequence number         |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |                           timestamp                           |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * |           synchronization source (SSRC) identifier            |
         * +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * |            contributing source (CSRC) identifiers             |
         * |                             ....                              |
         * +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::ErrBufferTooSmall.into());
        }

        let mut b0 = (self.version << VERSION_SHIFT) | self.csrc.len() as u8;
        if self.padding {
            b0 |= 1 << PADDING_SHIFT;
        }
        if self.extension {
            b0 |= 1 << EXTENSION_SHIFT;
        }
        buf.put_u8(b0);

        let mut b1 = self.payload_type;
        if self.marker {
            b1 |= 1 << MARKER_SHIFT;
        }
        buf.put_u8(b1);

        buf.put_u16(self.sequence_number);
        buf.put_u32(self.timestamp);
        buf.put_u32(self.ssrc);

        for csrc in &self.csrc {
            buf.put_u32(*csrc);
        }

        Ok(self.marshal_size())
    }
}

impl Unmarshal for Header {
    /// Unmarshal parses the fixed header and CSRC list from `raw_packet`.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        let raw_packet_len = raw_packet.remaining();
        if raw_packet_len < HEADER_LENGTH {
            return Err(Error::ErrHeaderSizeInsufficient.into());
        }

        let b0 = raw_packet.get_u8();
        let version = b0 >> VERSION_SHIFT & VERSION_MASK;
        let padding = (b0 >> PADDING_SHIFT & PADDING_MASK) > 0;
        let extension = (b0 >> EXTENSION_SHIFT & EXTENSION_MASK) > 0;
        let cc = (b0 & CC_MASK) as usize;

        if raw_packet_len < HEADER_LENGTH + cc * CSRC_LENGTH {
            return Err(Error::ErrHeaderSizeInsufficientForCsrc.into());
        }

        let b1 = raw_packet.get_u8();
        let marker = (b1 >> MARKER_SHIFT & MARKER_MASK) > 0;
        let payload_type = b1 & PT_MASK;

        let sequence_number = raw_packet.get_u16();
        let timestamp = raw_packet.get_u32();
        let ssrc = raw_packet.get_u32();

        let mut csrc = Vec::with_capacity(cc);
        for _ in 0..cc {
            csrc.push(raw_packet.get_u32());
        }

        Ok(Header {
            version,
            padding,
            extension,
            marker,
            payload_type,
            sequence_number,
            timestamp,
            ssrc,
            csrc,
        })
    }
}
