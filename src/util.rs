//! Byte-span helpers shared by the ART and Radix engines.
//!
//! Neither engine carries shared mutable state; these are pure functions
//! over `&[u8]` spans.

/// Length of the common leading span shared by `a` and `b`.
#[inline]
pub(crate) fn common_prefix_len(a: &[u8], b: &[u8]) -> usize {
    a.iter().zip(b.iter()).take_while(|(x, y)| x == y).count()
}

/// Bounded copy of `src` into `dst`, copying at most `dst.len()` bytes and
/// leaving the remainder of `dst` untouched.
#[inline]
pub(crate) fn bounded_copy(dst: &mut [u8], src: &[u8]) {
    let n = dst.len().min(src.len());
    dst[..n].copy_from_slice(&src[..n]);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn common_prefix_len_basic() {
        assert_eq!(common_prefix_len(b"romane", b"romanus"), 4);
        assert_eq!(common_prefix_len(b"abc", b"abc"), 3);
        assert_eq!(common_prefix_len(b"abc", b"xyz"), 0);
        assert_eq!(common_prefix_len(b"", b"abc"), 0);
    }

    #[test]
    fn bounded_copy_truncates() {
        let mut dst = [0u8; 4];
        bounded_copy(&mut dst, b"hello");
        assert_eq!(&dst, b"hell");
    }
}
