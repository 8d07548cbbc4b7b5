use regex::Captures;

use super::prefix::FieldMap;

/// Placeholder the server prints for an identity field it does not know yet
/// (e.g. before authentication completes).
pub const UNKNOWN_PLACEHOLDER: &str = "[unknown]";

/// Field text pulled out of a matched line, before any conversion.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RawFields<'a> {
    pub time: &'a str,
    pub pid: &'a str,
    pub user: Option<&'a str>,
    pub database: Option<&'a str>,
    pub application: Option<&'a str>,
    pub level: &'a str,
    pub content: &'a str,
}

/// Map capture groups to fields according to `fields`.
///
/// Groups that did not participate in the match (optional prefix sections)
/// yield empty text; identity fields are scrubbed of the unknown placeholder.
pub fn extract<'a>(fields: &FieldMap, caps: &Captures<'a>) -> RawFields<'a> {
    let group = |idx: Option<usize>| idx.and_then(|i| caps.get(i)).map(|m| m.as_str());

    RawFields {
        time: group(fields.time).unwrap_or(""),
        pid: group(fields.pid).unwrap_or(""),
        user: scrub(group(fields.user)),
        database: scrub(group(fields.database)),
        application: scrub(group(fields.application)),
        level: group(Some(fields.level)).unwrap_or(""),
        content: group(Some(fields.content)).unwrap_or(""),
    }
}

pub fn scrub(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.is_empty() && *v != UNKNOWN_PLACEHOLDER)
}

/// Encoded length of U+FFFD, which lossy decoding substitutes for each
/// invalid sequence.
const REPLACEMENT_LEN: usize = '\u{FFFD}'.len_utf8();

/// Byte position in `raw` of byte `decoded_pos` of
/// `String::from_utf8_lossy(raw)`.
///
/// Positions inside a replacement character map to the start of the invalid
/// sequence it stands for.
pub fn raw_position(raw: &[u8], decoded_pos: usize) -> usize {
    let mut decoded = 0;
    let mut consumed = 0;

    for chunk in raw.utf8_chunks() {
        let valid = chunk.valid().len();
        if decoded_pos <= decoded + valid {
            return consumed + (decoded_pos - decoded);
        }
        decoded += valid;
        consumed += valid;

        let invalid = chunk.invalid().len();
        if invalid > 0 {
            if decoded_pos < decoded + REPLACEMENT_LEN {
                return consumed;
            }
            decoded += REPLACEMENT_LEN;
            consumed += invalid;
        }
    }
    consumed
}

/// Backend pid, 0 when absent or out of range.
pub fn parse_pid(text: &str) -> i32 {
    text.parse().unwrap_or(0)
}
