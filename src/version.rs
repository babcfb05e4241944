//! Lenient version parsing for the comparison rules

/// Parses a loosely formatted version into (major, minor, patch).
///
/// Every character that is not a digit or a dot is dropped before splitting,
/// so `v1.2.3` and `1.2.3-rc.1` both work. Missing or unparsable components
/// are zero.
pub fn parse_version(raw: &str) -> (u64, u64, u64) {
    let cleaned: String = raw
        .chars()
        .filter(|c| c.is_ascii_digit() || *c == '.')
        .collect();

    let mut parts = cleaned.split('.').map(|part| part.parse::<u64>().unwrap_or(0));

    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

/// Whether `raw` names a concrete numeric version rather than a tag.
///
/// An optional leading `v` is allowed, so `v0.1.0` and `0.26` qualify while
/// `""`, `latest` and `next` do not.
pub fn is_numeric(raw: &str) -> bool {
    let raw = raw.trim();
    raw.strip_prefix('v')
        .unwrap_or(raw)
        .starts_with(|c: char| c.is_ascii_digit())
}
