//! The `urn:uuid` and namespace-indicator string conventions.
//!
//! Canonical entity identity is a `urn:uuid:` string (RFC 4122 URN form).
//! A namespace indicator (NI) is a three-segment `~:<namespace>:<value>`
//! string used as a class pointer inside `$ids` and `rdf:type` and as a
//! typed reference inside attribute values.

/// Canonical urn:uuid scheme prefix.
pub const URN_UUID_PREFIX: &str = "urn:uuid:";

/// Length of a full urn:uuid string: the scheme prefix plus 36 characters
/// of UUID text.
pub const URN_UUID_LEN: usize = 45;

/// Marker opening every namespace indicator.
pub const NI_MARKER: &str = "~";

/// A parsed namespace indicator `~:<namespace>:<value>`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct NiPointer<'a> {
    pub namespace: &'a str,
    pub value: &'a str,
}

/// Parse a namespace indicator. The string must consist of exactly three
/// colon-separated segments, the first being the `~` marker.
pub fn parse_ni(s: &str) -> Option<NiPointer<'_>> {
    let mut segments = s.split(':');
    let marker = segments.next()?;
    let namespace = segments.next()?;
    let value = segments.next()?;
    if marker != NI_MARKER || segments.next().is_some() {
        return None;
    }
    Some(NiPointer { namespace, value })
}

/// True if `s` is a urn:uuid string: scheme prefix, total length 45, and a
/// suffix of five hyphen-delimited groups.
pub fn is_urn_uuid(s: &str) -> bool {
    s.len() == URN_UUID_LEN
        && s.starts_with(URN_UUID_PREFIX)
        && hyphen_groups(uuid_suffix(s)) == 5
}

/// The UUID text following the urn:uuid scheme prefix, or the input
/// unchanged when the prefix is absent.
pub fn uuid_suffix(s: &str) -> &str {
    s.strip_prefix(URN_UUID_PREFIX).unwrap_or(s)
}

/// Number of hyphen-delimited groups in `s`.
pub fn hyphen_groups(s: &str) -> usize {
    s.split('-').count()
}
