//! `Slice`: a non-owning view over an externally-owned byte range.
//!
//! A `Slice` borrows its buffer and can never outlive it; trimming
//! operations (`sub_slice`, `remove_prefix`, `clear`) move the view, never
//! the underlying bytes. Out-of-range bounds are programmer errors and
//! panic, matching the container's fatal-assertion discipline.

use core::cmp::Ordering;
use core::fmt;
use core::ops::Index;

/// Borrowed view over a contiguous byte range.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Slice<'a> {
    data: &'a [u8],
}

impl<'a> Slice<'a> {
    /// View over an existing byte buffer.
    #[inline]
    pub fn new(data: &'a [u8]) -> Self {
        Slice { data }
    }

    /// The viewed bytes, with the source buffer's lifetime.
    #[inline]
    pub fn data(&self) -> &'a [u8] {
        self.data
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.data.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    /// Byte at position `i`.
    ///
    /// # Panics
    ///
    /// Panics if `i >= len()`.
    #[inline]
    pub fn at(&self, i: usize) -> u8 {
        self.data[i]
    }

    /// The sub-view over `[l, r)`.
    ///
    /// # Panics
    ///
    /// Panics if `l > r` or `r > len()`.
    pub fn sub_slice(&self, l: usize, r: usize) -> Slice<'a> {
        assert!(l <= r, "sub_slice bounds inverted: {l} > {r}");
        assert!(r <= self.len(), "sub_slice end {r} out of range {}", self.len());
        Slice {
            data: &self.data[l..r],
        }
    }

    /// Reset to an empty, zero-length view.
    #[inline]
    pub fn clear(&mut self) {
        self.data = &[];
    }

    /// Advance the view past its first `n` bytes.
    ///
    /// # Panics
    ///
    /// Panics if `n > len()`.
    pub fn remove_prefix(&mut self, n: usize) {
        assert!(n <= self.len(), "remove_prefix {n} out of range {}", self.len());
        self.data = &self.data[n..];
    }

    /// True iff this view is at least as long as `prefix` and begins with
    /// its bytes.
    #[inline]
    pub fn starts_with<'b>(&self, prefix: impl Into<Slice<'b>>) -> bool {
        self.data.starts_with(prefix.into().data)
    }

    /// Byte-wise three-way comparison; on a common prefix the shorter view
    /// sorts first.
    #[inline]
    pub fn compare(&self, other: &Slice<'_>) -> Ordering {
        self.data.cmp(other.data)
    }
}

impl<'a> From<&'a [u8]> for Slice<'a> {
    #[inline]
    fn from(data: &'a [u8]) -> Self {
        Slice::new(data)
    }
}

impl<'a> From<&'a str> for Slice<'a> {
    #[inline]
    fn from(s: &'a str) -> Self {
        Slice::new(s.as_bytes())
    }
}

impl<'a> From<&'a String> for Slice<'a> {
    #[inline]
    fn from(s: &'a String) -> Self {
        Slice::new(s.as_bytes())
    }
}

impl Index<usize> for Slice<'_> {
    type Output = u8;

    #[inline]
    fn index(&self, i: usize) -> &u8 {
        &self.data[i]
    }
}

impl PartialOrd for Slice<'_> {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Slice<'_> {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        self.compare(other)
    }
}

/// Lossy UTF-8 rendition of the viewed bytes; `to_string()` copies them
/// out into an owned `String`.
impl fmt::Display for Slice<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&String::from_utf8_lossy(self.data), f)
    }
}
