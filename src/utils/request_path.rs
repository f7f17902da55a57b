/// Returns the last `/`-delimited segment of a request path.
///
/// No validation or decoding happens here: `/emotes/` yields an empty id and
/// percent-escapes are kept as sent.
pub fn channel_id(path: &str) -> &str {
    path.rsplit('/').next().unwrap_or_default()
}
