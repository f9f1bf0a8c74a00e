use std::fmt;

use util::marshal::{Marshal, Unmarshal};

use crate::header::Header;

/// Packet is the seam shared by the RTCP packet models: a common header
/// derived from current body state, the set of SSRCs the packet refers to,
/// and the unpadded body size.
pub trait Packet: Marshal + Unmarshal + fmt::Display + fmt::Debug {
    /// Returns the common header for the current body state. The count and
    /// length fields are always recomputed from the lists they describe,
    /// never stored.
    fn header(&self) -> Header;

    /// Returns the SSRC values this packet refers to.
    fn destination_ssrc(&self) -> Vec<u32>;

    /// Returns the serialized size before 32-bit alignment padding.
    fn raw_size(&self) -> usize;
}
