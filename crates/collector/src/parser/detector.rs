use super::formats::syslog;
use super::model::LogFormat;
use super::prefix::LogPrefix;

/// Order in which prefixes are tried during auto-detection.
///
/// Several grammars overlap, so the first match wins. Custom4 must precede
/// Custom3: its `host=` section would otherwise be swallowed by Custom3's
/// `app=` field. The syslog wrapper is tried last.
pub const DETECTION_ORDER: [LogPrefix; 9] = [
    LogPrefix::AmazonRds,
    LogPrefix::Custom1,
    LogPrefix::Custom2,
    LogPrefix::Custom4,
    LogPrefix::Custom3,
    LogPrefix::Custom5,
    LogPrefix::Custom6,
    LogPrefix::Custom7,
    LogPrefix::Simple,
];

/// Find the grammar that produced `line`, if any.
pub fn detect_format(line: &str) -> Option<LogFormat> {
    DETECTION_ORDER
        .iter()
        .find(|prefix| prefix.regex().is_match(line))
        .map(|prefix| LogFormat::Prefix(*prefix))
        .or_else(|| syslog::is_match(line).then_some(LogFormat::Syslog))
}

/// Resolve the grammar for `line`, honouring an explicit prefix.
///
/// An explicit prefix bypasses detection; a line that does not match it is
/// reported as unmatched. `LogPrefix::Empty` is the unset `log_line_prefix`
/// and falls back to detection.
pub fn resolve_format(line: &str, prefix: Option<LogPrefix>) -> Option<LogFormat> {
    match prefix {
        None | Some(LogPrefix::Empty) => detect_format(line),
        Some(prefix) => prefix
            .regex()
            .is_match(line)
            .then_some(LogFormat::Prefix(prefix)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn detect(line: &str) -> Option<LogFormat> {
        detect_format(line)
    }

    #[test]
    fn test_detect_amazon_rds() {
        assert_eq!(
            detect("2018-05-04 03:06:43 UTC:10.1.1.1(45678):app@appdb:[8127]:LOG:  connection authorized\n"),
            Some(LogFormat::Prefix(LogPrefix::AmazonRds))
        );
    }

    #[test]
    fn test_detect_custom1() {
        assert_eq!(
            detect("2018-05-04 03:06:43.123 UTC [8127][3/0] : [1-1] [app=psql] LOG:  statement: SELECT 1\n"),
            Some(LogFormat::Prefix(LogPrefix::Custom1))
        );
    }

    #[test]
    fn test_detect_custom2() {
        assert_eq!(
            detect("2018-05-04 03:06:43 UTC [8127-1] app@appdb LOG:  statement: SELECT 1\n"),
            Some(LogFormat::Prefix(LogPrefix::Custom2))
        );
    }

    #[test]
    fn test_custom4_takes_priority_over_custom3() {
        let line = "2018-05-04 03:06:43.123 UTC [8127] [user=app,db=appdb,app=psql,host=10.0.0.5] LOG:  statement: SELECT 1\n";
        // Custom3 alone would accept this line with app = "psql,host=10.0.0.5"
        assert!(LogPrefix::Custom3.regex().is_match(line));
        assert_eq!(detect(line), Some(LogFormat::Prefix(LogPrefix::Custom4)));
    }

    #[test]
    fn test_detect_custom5_through_7() {
        assert_eq!(
            detect("2018-05-04 03:06:43 UTC [8127]: [2-1] user=app,db=appdb - PG-00000 LOG:  checkpoint complete\n"),
            Some(LogFormat::Prefix(LogPrefix::Custom5))
        );
        assert_eq!(
            detect("2018-05-04 03:06:43 UTC [8127]: [2-1] user=app,db=appdb,app=psql,client=10.0.0.5 LOG:  disconnection\n"),
            Some(LogFormat::Prefix(LogPrefix::Custom6))
        );
        assert_eq!(
            detect("2018-05-04 03:06:43 UTC [8127]: [2-1] [trx_id=5512] user=app,db=appdb ERROR:  deadlock detected\n"),
            Some(LogFormat::Prefix(LogPrefix::Custom7))
        );
    }

    #[test]
    fn test_detect_syslog() {
        assert_eq!(
            detect("May  4 03:06:43 db1 postgres[8127]: [2-1] LOG:  checkpoint starting\n"),
            Some(LogFormat::Syslog)
        );
    }

    #[test]
    fn test_detect_nothing() {
        assert_eq!(detect("\tAND created_at > now()\n"), None);
        assert_eq!(detect("LOG:  no prefix at all\n"), None);
        assert_eq!(detect(""), None);
    }

    #[test]
    fn test_resolve_explicit_prefix() {
        let line = "2018-05-04 03:06:43 UTC [8127] LOG:  hello\n";
        assert_eq!(
            resolve_format(line, Some(LogPrefix::Simple)),
            Some(LogFormat::Prefix(LogPrefix::Simple))
        );
        assert_eq!(resolve_format(line, Some(LogPrefix::AmazonRds)), None);
        assert_eq!(resolve_format(line, Some(LogPrefix::Empty)), detect(line));
    }
}
