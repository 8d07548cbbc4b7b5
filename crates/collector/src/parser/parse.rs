use super::detector::resolve_format;
use super::extract::{extract, parse_pid};
use super::formats::syslog;
use super::model::{LogFormat, LogLevel, ParseError, ParsedLine};
use super::prefix::LogPrefix;
use super::time::parse_timestamp;

/// Parse one raw log line (including its trailing newline, if any).
///
/// With `prefix` set, that grammar is applied directly; otherwise the
/// grammar is auto-detected. `Err` means the line does not start a new
/// record, and carries the text that continues the previous one.
pub fn parse_log_line(line: &str, prefix: Option<LogPrefix>) -> Result<ParsedLine, ParseError> {
    match resolve_format(line, prefix) {
        Some(LogFormat::Prefix(prefix)) => parse_with_prefix(line, prefix),
        Some(LogFormat::Syslog) => syslog::parse(line),
        Some(LogFormat::HerokuDebug) | None => Err(ParseError::Unrecognized {
            content: line.to_string(),
        }),
    }
}

fn parse_with_prefix(line: &str, prefix: LogPrefix) -> Result<ParsedLine, ParseError> {
    let Some(caps) = prefix.regex().captures(line) else {
        return Err(ParseError::Unrecognized { content: line.to_string() });
    };
    let raw = extract(&prefix.fields(), &caps);

    let Some(occurred_at) = parse_timestamp(raw.time) else {
        return Err(ParseError::InvalidTimestamp {
            timestamp: raw.time.to_string(),
            content: line.to_string(),
        });
    };

    if raw.level.is_empty() {
        return Err(ParseError::MissingLevel { content: raw.content.to_string() });
    }
    let Some(log_level) = LogLevel::from_name(raw.level) else {
        return Err(ParseError::UnknownLevel {
            level: raw.level.to_string(),
            content: line.to_string(),
        });
    };

    Ok(ParsedLine {
        format: LogFormat::Prefix(prefix),
        occurred_at,
        username: raw.user.map(str::to_string),
        database: raw.database.map(str::to_string),
        application: raw.application.map(str::to_string),
        backend_pid: parse_pid(raw.pid),
        log_level,
        content: raw.content.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::detector::detect_format;

    #[test]
    fn test_parse_rds_line() {
        let parsed = parse_log_line(
            "2018-05-04 03:06:43 UTC:10.1.1.1(45678):app_user@app_db:[8127]:ERROR:  permission denied for relation orders\n",
            None,
        )
        .unwrap();
        assert_eq!(parsed.format, LogFormat::Prefix(LogPrefix::AmazonRds));
        assert_eq!(parsed.username.as_deref(), Some("app_user"));
        assert_eq!(parsed.database.as_deref(), Some("app_db"));
        assert_eq!(parsed.application, None);
        assert_eq!(parsed.backend_pid, 8127);
        assert_eq!(parsed.log_level, LogLevel::Error);
        assert_eq!(parsed.content, "permission denied for relation orders\n");
        assert_eq!(parsed.occurred_at.to_rfc3339(), "2018-05-04T03:06:43+00:00");
    }

    #[test]
    fn test_parse_rds_unknown_identity() {
        let parsed = parse_log_line(
            "2018-05-04 03:06:43 UTC:[local]:[unknown]@[unknown]:[8127]:LOG:  connection received: host=[local]\n",
            None,
        )
        .unwrap();
        assert_eq!(parsed.username, None);
        assert_eq!(parsed.database, None);
    }

    #[test]
    fn test_parse_custom4_fields() {
        let parsed = parse_log_line(
            "2018-05-04 03:06:43.123 +0200 [8127] [user=app,db=appdb,app=psql,host=10.0.0.5] LOG:  statement: SELECT 1\n",
            None,
        )
        .unwrap();
        assert_eq!(parsed.format, LogFormat::Prefix(LogPrefix::Custom4));
        assert_eq!(parsed.application.as_deref(), Some("psql"));
        assert_eq!(parsed.occurred_at.offset().local_minus_utc(), 7200);
    }

    #[test]
    fn test_parse_custom6_keeps_application() {
        let parsed = parse_log_line(
            "2018-05-04 03:06:43 UTC [8127]: [2-1] user=app,db=appdb,app=psql,client=10.0.0.5 LOG:  disconnection\n",
            None,
        )
        .unwrap();
        assert_eq!(parsed.username.as_deref(), Some("app"));
        assert_eq!(parsed.database.as_deref(), Some("appdb"));
        assert_eq!(parsed.application.as_deref(), Some("psql"));
    }

    #[test]
    fn test_unrecognized_line_keeps_raw_content() {
        let err = parse_log_line("\tAND created_at > now()\n", None).unwrap_err();
        assert_eq!(
            err,
            ParseError::Unrecognized { content: "\tAND created_at > now()\n".to_string() }
        );
    }

    #[test]
    fn test_unknown_level_is_not_a_record() {
        let err = parse_log_line("2018-05-04 03:06:43 UTC [8127] Something:  odd\n", None).unwrap_err();
        assert!(matches!(err, ParseError::UnknownLevel { ref level, .. } if level == "Something"));
        assert_eq!(err.content(), "2018-05-04 03:06:43 UTC [8127] Something:  odd\n");
    }

    #[test]
    fn test_bad_timestamp_is_not_a_record() {
        let err = parse_log_line("2018-05-04 03:06:43 +03x [8127] LOG:  hello\n", None).unwrap_err();
        assert!(matches!(err, ParseError::InvalidTimestamp { .. }));
    }

    #[test]
    fn test_explicit_prefix_mismatch_falls_back_to_raw() {
        let line = "2018-05-04 03:06:43 UTC [8127] LOG:  hello\n";
        let err = parse_log_line(line, Some(LogPrefix::AmazonRds)).unwrap_err();
        assert_eq!(err.content(), line);
    }

    #[test]
    fn test_explicit_prefix_matches_detection() {
        let lines = [
            "2018-05-04 03:06:43 UTC:10.1.1.1(45678):app@appdb:[8127]:LOG:  connection authorized\n",
            "2018-05-04 03:06:43.123 UTC [8127][3/0] : [1-1] [app=psql] LOG:  statement: SELECT 1\n",
            "2018-05-04 03:06:43 UTC [8127-1] app@appdb LOG:  statement: SELECT 1\n",
            "2018-05-04 03:06:43 UTC [8127] [user=app,db=appdb,app=psql] LOG:  statement: SELECT 1\n",
            "2018-05-04 03:06:43 UTC [8127]: [2-1] [trx_id=5512] user=app,db=appdb ERROR:  deadlock detected\n",
        ];
        for line in lines {
            let Some(LogFormat::Prefix(prefix)) = detect_format(line) else {
                panic!("expected a prefix grammar for {:?}", line);
            };
            assert_eq!(
                parse_log_line(line, None).unwrap(),
                parse_log_line(line, Some(prefix)).unwrap()
            );
        }
    }
}
