/// Prefix of a token in an `Authorization` header
pub const BEARER_PREFIX: &str = "Bearer ";

/// Prepend the `"Bearer "` prefix
pub fn to_bearer(token: &str) -> String {
    let mut bearer = String::with_capacity(BEARER_PREFIX.len() + token.len());
    bearer.push_str(BEARER_PREFIX);
    bearer.push_str(token);
    bearer
}

/// Strip the `"Bearer "` prefix, if present.
///
/// Anything else is returned unchanged and left for the token parser to reject.
pub fn from_bearer(input: &str) -> &str {
    input.strip_prefix(BEARER_PREFIX).unwrap_or(input)
}
