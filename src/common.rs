/// Maximum length of the encoded header, unless overridden in `ParseOptions`
pub const MAX_HEADER_LENGTH: usize = 8192;

/// Limits applied while decomposing a compact token
#[derive(Clone, Debug, Default)]
pub struct ParseOptions {
    /// Reject tokens longer than this (the `Bearer ` prefix is not counted)
    pub max_token_length: Option<usize>,

    /// Reject tokens whose encoded header is longer than this
    ///
    /// Defaults to `MAX_HEADER_LENGTH`.
    pub max_header_length: Option<usize>,
}

#[inline(never)]
pub(crate) fn timingsafe_eq(a: &[u8], b: &[u8]) -> bool {
    a.len() == b.len() && ct_codecs::verify(a, b)
}

#[test]
fn timingsafe_eq_lengths() {
    assert!(timingsafe_eq(b"abc", b"abc"));
    assert!(!timingsafe_eq(b"abc", b"abd"));
    assert!(!timingsafe_eq(b"abc", b"abcd"));
    assert!(timingsafe_eq(b"", b""));
}
