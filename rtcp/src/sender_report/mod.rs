#[cfg(test)]
mod sender_report_test;

use std::fmt;

use bytes::{Buf, BufMut, Bytes};
use util::marshal::{Marshal, MarshalSize, Unmarshal};

use crate::error::Error;
use crate::header::*;
use crate::packet::Packet;
use crate::reception_report::*;
use crate::util::get_padding_size;

pub(crate) const SENDER_INFO_LENGTH: usize = 24;

/// Seconds between the NTP epoch (1900-01-01) and the Unix epoch (1970-01-01).
pub const NTP_EPOCH_OFFSET_SECS: i64 = 2_208_988_800;

/// A SenderReport (SR) packet carries a sender's transmission statistics
/// and per-peer reception reports for an RTP stream.
#[derive(Debug, PartialEq, Eq, Default, Clone)]
pub struct SenderReport {
    /// The synchronization source identifier for the originator of this
    /// SR packet.
    pub ssrc: u32,
    /// The wallclock time when this report was sent, as a 64-bit fixed
    /// point NTP timestamp: 32 bits of seconds since 1900-01-01 and 32
    /// bits of binary fraction of a second.
    pub ntp_time: u64,
    /// Corresponds to the same time as the NTP timestamp, but in the same
    /// units and with the same random offset as the RTP timestamps in
    /// data packets.
    pub rtp_time: u32,
    /// The total number of RTP data packets transmitted by the sender
    /// since starting transmission up until the time this SR packet was
    /// generated.
    pub packet_count: u32,
    /// The total number of payload octets transmitted in RTP data packets
    /// by the sender since starting transmission.
    pub octet_count: u32,
    /// Zero or more reception report blocks, one per source heard by this
    /// sender since the last report, serialized in list order.
    pub reports: Vec<ReceptionReport>,
    /// Additional payload-specific information that needs to be reported
    /// regularly about the sender. Always a whole number of 32-bit words.
    pub profile_extensions: Bytes,
}

impl fmt::Display for SenderReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut out = format!("SenderReport from {}\n", self.ssrc);
        out += format!("\tNTPTime:\t{}\n", self.ntp_time).as_str();
        out += format!("\tRTPTime:\t{}\n", self.rtp_time).as_str();
        out += format!("\tPacketCount:\t{}\n", self.packet_count).as_str();
        out += format!("\tOctetCount:\t{}\n", self.octet_count).as_str();
        out += "\tSSRC    \tLost\tLastSequence\n";
        for rep in &self.reports {
            out += format!(
                "\t{:x}\t{}/{}\t{}\n",
                rep.ssrc, rep.fraction_lost, rep.total_lost, rep.last_sequence_number
            )
            .as_str();
        }
        out += format!("\tProfile Extension Data: {:?}\n", self.profile_extensions).as_str();

        write!(f, "{out}")
    }
}

impl SenderReport {
    /// Appends a reception report block; the header count follows the list
    /// length. Fails once the 5-bit count field is exhausted at 31 blocks.
    pub fn add_report(&mut self, report: ReceptionReport) -> Result<(), Error> {
        if self.reports.len() >= COUNT_MAX {
            return Err(Error::TooManyReports);
        }
        self.reports.push(report);
        Ok(())
    }

    /// Removes the first report block whose SSRC matches. Returns false
    /// when no block matches; that is a normal outcome, not an error.
    pub fn remove_report(&mut self, ssrc: u32) -> bool {
        match self.reports.iter().position(|rep| rep.ssrc == ssrc) {
            Some(index) => {
                self.reports.remove(index);
                true
            }
            None => false,
        }
    }

    /// Replaces the profile-specific extension with a copy of `ext`, which
    /// must be a whole number of 32-bit words.
    pub fn set_profile_extensions(&mut self, ext: &[u8]) -> Result<(), Error> {
        if ext.len() % 4 != 0 {
            return Err(Error::ProfileExtensionNotAligned);
        }
        self.profile_extensions = Bytes::copy_from_slice(ext);
        Ok(())
    }

    /// Resets the profile-specific extension to zero length.
    pub fn clear_profile_extensions(&mut self) {
        self.profile_extensions = Bytes::new();
    }

    /// Returns the NTP timestamp as milliseconds since the Unix epoch.
    ///
    /// The fixed-point field holds 1/2^32-second precision; reading it at
    /// millisecond granularity rounds the fraction, so round-tripping
    /// through this accessor is lossy below 1 ms.
    pub fn ntp_unix_millis(&self) -> i64 {
        let secs = (self.ntp_time >> 32) as i64 - NTP_EPOCH_OFFSET_SECS;
        let frac = self.ntp_time & 0xFFFF_FFFF;
        let millis = ((frac * 1000) + (1 << 31)) >> 32;

        secs * 1000 + millis as i64
    }

    /// Sets the NTP timestamp from milliseconds since the Unix epoch,
    /// rounding the sub-second part into the 32-bit binary fraction.
    pub fn set_ntp_unix_millis(&mut self, unix_millis: i64) {
        let ntp_millis = unix_millis + NTP_EPOCH_OFFSET_SECS * 1000;
        let secs = ntp_millis.div_euclid(1000);
        let millis = ntp_millis.rem_euclid(1000) as u64;
        let frac = ((millis << 32) + 500) / 1000;

        self.ntp_time = ((secs as u64) << 32) | frac;
    }
}

impl Packet for SenderReport {
    /// Header returns the Header associated with this packet, deriving the
    /// count from the report list.
    fn header(&self) -> Header {
        Header {
            padding: false,
            count: self.reports.len() as u8,
            packet_type: PacketType::SenderReport,
            length: ((self.marshal_size() / 4) - 1) as u16,
        }
    }

    /// destination_ssrc returns an array of SSRC values that this packet
    /// refers to.
    fn destination_ssrc(&self) -> Vec<u32> {
        let mut out: Vec<u32> = self.reports.iter().map(|rep| rep.ssrc).collect();
        out.push(self.ssrc);
        out
    }

    fn raw_size(&self) -> usize {
        let mut reps_length = 0;
        for rep in &self.reports {
            reps_length += rep.marshal_size();
        }

        HEADER_LENGTH + SENDER_INFO_LENGTH + reps_length + self.profile_extensions.len()
    }
}

impl MarshalSize for SenderReport {
    fn marshal_size(&self) -> usize {
        let l = self.raw_size();
        // The header, sender info and report blocks are all multiples of 4;
        // only a misaligned extension could make this differ from raw_size,
        // and marshal_to rejects that.
        l + get_padding_size(l)
    }
}

impl Marshal for SenderReport {
    /// marshal_to encodes the packet in binary.
    fn marshal_to(&self, mut buf: &mut [u8]) -> Result<usize, util::Error> {
        /*
         *         0                   1                   2                   3
         *         0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         * header |V=2|P|    RC   |   PT=SR=200   |             length            |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                         SSRC of sender                        |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * sender |              NTP timestamp, most significant word             |
         * info   +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |             NTP timestamp, least significant word             |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                         RTP timestamp                         |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                     sender's packet count                     |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         *        |                      sender's octet count                     |
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         * report |                         report blocks                         |
         * blocks :                              ...                              :
         *        +=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+=+
         *        |                  profile-specific extensions                  |
         *        +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
         */
        if self.reports.len() > COUNT_MAX {
            return Err(Error::TooManyReports.into());
        }
        if self.profile_extensions.len() % 4 != 0 {
            return Err(Error::ProfileExtensionNotAligned.into());
        }
        if buf.remaining_mut() < self.marshal_size() {
            return Err(Error::BufferTooShort.into());
        }

        let h = self.header();
        let n = h.marshal_to(buf)?;
        buf = &mut buf[n..];

        buf.put_u32(self.ssrc);
        buf.put_u64(self.ntp_time);
        buf.put_u32(self.rtp_time);
        buf.put_u32(self.packet_count);
        buf.put_u32(self.octet_count);

        for rep in &self.reports {
            let n = rep.marshal_to(buf)?;
            buf = &mut buf[n..];
        }

        buf.put(&*self.profile_extensions);

        Ok(self.marshal_size())
    }
}

impl Unmarshal for SenderReport {
    /// Unmarshal decodes the SenderReport from binary.
    fn unmarshal<B>(raw_packet: &mut B) -> Result<Self, util::Error>
    where
        Self: Sized,
        B: Buf,
    {
        let raw_packet_len = raw_packet.remaining();
        if raw_packet_len < HEADER_LENGTH + SENDER_INFO_LENGTH {
            return Err(Error::PacketTooShort.into());
        }

        let header = Header::unmarshal(raw_packet)?;
        if header.packet_type != PacketType::SenderReport {
            return Err(Error::WrongType.into());
        }

        let ssrc = raw_packet.get_u32();
        let ntp_time = raw_packet.get_u64();
        let rtp_time = raw_packet.get_u32();
        let packet_count = raw_packet.get_u32();
        let octet_count = raw_packet.get_u32();

        let mut offset = HEADER_LENGTH + SENDER_INFO_LENGTH;
        let mut reports = Vec::with_capacity(header.count as usize);
        for _ in 0..header.count {
            if offset + RECEPTION_REPORT_LENGTH > raw_packet_len {
                return Err(Error::PacketTooShort.into());
            }
            reports.push(ReceptionReport::unmarshal(raw_packet)?);
            offset += RECEPTION_REPORT_LENGTH;
        }

        if raw_packet.remaining() % 4 != 0 {
            return Err(Error::ProfileExtensionNotAligned.into());
        }
        let profile_extensions = raw_packet.copy_to_bytes(raw_packet.remaining());

        Ok(SenderReport {
            ssrc,
            ntp_time,
            rtp_time,
            packet_count,
            octet_count,
            reports,
            profile_extensions,
        })
    }
}
