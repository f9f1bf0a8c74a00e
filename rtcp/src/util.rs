use bytes::BufMut;

/// Number of bytes needed to reach the next 32-bit boundary.
pub(crate) fn get_padding_size(len: usize) -> usize {
    if len % 4 == 0 {
        0
    } else {
        4 - (len % 4)
    }
}

/// Writes null padding for a body of `len` bytes up to the next 32-bit
/// boundary. RFC 3550 pads variable-length text (the BYE reason) with
/// zeros; the text's own length prefix delimits it.
pub(crate) fn put_padding(mut buf: &mut [u8], len: usize) {
    for _ in 0..get_padding_size(len) {
        buf.put_u8(0);
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn test_get_padding_size() {
        for (len, want) in [(0, 0), (1, 3), (2, 2), (3, 1), (4, 0), (5, 3), (8, 0)] {
            assert_eq!(get_padding_size(len), want, "padding for length {len}");
        }
    }
}
