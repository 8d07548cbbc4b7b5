//! Continuation stitching: lines that do not start a record extend the
//! previous one.

use crate::parser::LogLine;

/// What happened to a continuation fragment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stitch {
    /// Appended to the target record
    Merged,
    /// Nothing to append
    Empty,
    /// No record to attach to; the fragment is dropped
    Orphaned,
}

/// Append `content` to `target`, extending its `byte_end` by `byte_len`, the
/// number of source bytes `content` was decoded from. Identity fields, level
/// and timestamp are never touched.
pub fn stitch(target: Option<&mut LogLine>, content: &str, byte_len: u64) -> Stitch {
    if content.is_empty() {
        return Stitch::Empty;
    }
    let Some(line) = target else {
        return Stitch::Orphaned;
    };

    line.content.push_str(content);
    line.byte_end += byte_len;
    Stitch::Merged
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::{parse_log_line, LogLevel};

    fn header() -> LogLine {
        let raw = "2018-05-04 03:06:43 UTC [8127] ERROR:  syntax error at or near \"FROM\"\n";
        let parsed = parse_log_line(raw, None).unwrap();
        LogLine::from_raw(parsed, 0, raw.as_bytes())
    }

    #[test]
    fn test_merge_extends_content_and_end() {
        let mut line = header();
        let end = line.byte_end;

        assert_eq!(stitch(Some(&mut line), "\tFROM orders\n", 13), Stitch::Merged);
        assert_eq!(line.content, "syntax error at or near \"FROM\"\n\tFROM orders\n");
        assert_eq!(line.byte_end, end + 13);
        assert_eq!(line.log_level, LogLevel::Error);
        assert_eq!(line.backend_pid, 8127);
    }

    #[test]
    fn test_empty_fragment_is_noop() {
        let mut line = header();
        let before = line.clone();
        assert_eq!(stitch(Some(&mut line), "", 0), Stitch::Empty);
        assert_eq!(line, before);
    }

    #[test]
    fn test_merge_extends_end_by_source_bytes() {
        let mut line = header();
        let end = line.byte_end;

        // "\tbad \xff\n" decodes to 9 bytes but spans 7 in the source
        assert_eq!(stitch(Some(&mut line), "\tbad \u{FFFD}\n", 7), Stitch::Merged);
        assert_eq!(line.byte_end, end + 7);
        assert!(line.content.ends_with("\tbad \u{FFFD}\n"));
    }

    #[test]
    fn test_orphan_without_target() {
        assert_eq!(stitch(None, "\tFROM orders\n", 13), Stitch::Orphaned);
    }
}
