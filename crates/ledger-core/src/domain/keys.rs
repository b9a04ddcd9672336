//! # Key Encoding
//!
//! Namespaced keys for the key-value store. Survey numbers routinely contain
//! punctuation (`67/4`, `12/1A`), so they are hex-encoded inside keys; the
//! fixed-width decimal suffix keeps revisions and events in ascending order
//! under a lexicographic prefix scan.
//!
//! - `b:{hex(survey)}:{revision:08}` -> block revision
//! - `t:{hex(survey)}:{sequence:08}` -> timeline event

/// Prefix under which all block revisions live.
pub const BLOCK_NAMESPACE: &str = "b:";

/// Prefix under which all timeline events live.
pub const TIMELINE_NAMESPACE: &str = "t:";

/// Key of one block revision.
pub fn block_key(survey_number: &str, revision: u64) -> String {
    format!("{}{:08}", block_prefix(survey_number), revision)
}

/// Prefix matching every revision of one survey.
pub fn block_prefix(survey_number: &str) -> String {
    format!("{BLOCK_NAMESPACE}{}:", hex::encode(survey_number))
}

/// Key of one timeline event.
pub fn timeline_key(survey_number: &str, sequence: u64) -> String {
    format!("{}{:08}", timeline_prefix(survey_number), sequence)
}

/// Prefix matching every timeline event of one survey.
pub fn timeline_prefix(survey_number: &str) -> String {
    format!("{TIMELINE_NAMESPACE}{}:", hex::encode(survey_number))
}

/// Recover the survey number from a block key, if well-formed.
pub fn survey_from_block_key(key: &str) -> Option<String> {
    let rest = key.strip_prefix(BLOCK_NAMESPACE)?;
    let (encoded, _revision) = rest.rsplit_once(':')?;
    let bytes = hex::decode(encoded).ok()?;
    String::from_utf8(bytes).ok()
}
