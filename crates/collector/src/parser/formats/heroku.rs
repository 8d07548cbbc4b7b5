use std::sync::LazyLock;

use chrono::{DateTime, FixedOffset};
use regex::Regex;

use crate::parser::model::{LogFormat, LogLevel, ParseError, ParsedLine};
use crate::parser::prefix::SQLSTATE;
use crate::parser::time::parse_syslog_timestamp;

// [Mon D HH:MM:SS host app[postgres] stream ][COLOR] [n-m] [ sql_error_code = XXXXX LEVEL:  ]content
static HEROKU_POSTGRES_DEBUG: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^(?:(\w+ \d+ \d+:\d+:\d+) \w+ app\[postgres\] \w+ )?\[(\w+)\] \[\d+-\d+\] (?: sql_error_code = {SQLSTATE} (\w+):  )?(.+\n?)$"
    );
    Regex::new(&pattern).expect("heroku debug grammar must compile")
});

mod group {
    pub const TIME: usize = 1;
    pub const SQLSTATE: usize = 3;
    pub const LEVEL: usize = 4;
    pub const CONTENT: usize = 5;
}

/// Parse a line from a hosting-platform log drain.
///
/// Returns `None` when the line is not wrapped in the drain envelope, so the
/// caller can fall back to the general grammars. A wrapped line is a new
/// record only when it carries both a SQLSTATE and a level; otherwise its
/// content continues the previous record. Lines without the envelope's
/// timestamp are stamped with `received_at`.
pub fn parse(line: &str, received_at: DateTime<FixedOffset>) -> Option<Result<ParsedLine, ParseError>> {
    let caps = HEROKU_POSTGRES_DEBUG.captures(line)?;
    let text = |idx| caps.get(idx).map_or("", |m| m.as_str());

    let content = text(group::CONTENT).to_string();
    let (sqlstate, level) = (text(group::SQLSTATE), text(group::LEVEL));
    if sqlstate.is_empty() || level.is_empty() {
        return Some(Err(ParseError::MissingLevel { content }));
    }

    let Some(log_level) = LogLevel::from_name(level) else {
        return Some(Err(ParseError::UnknownLevel {
            level: level.to_string(),
            content,
        }));
    };

    let occurred_at = match caps.get(group::TIME) {
        Some(m) => match parse_syslog_timestamp(m.as_str()) {
            Some(ts) => ts,
            None => {
                return Some(Err(ParseError::InvalidTimestamp {
                    timestamp: m.as_str().to_string(),
                    content: line.to_string(),
                }))
            }
        },
        None => received_at,
    };

    Some(Ok(ParsedLine {
        format: LogFormat::HerokuDebug,
        occurred_at,
        username: None,
        database: None,
        application: None,
        backend_pid: 0,
        log_level,
        content,
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Timelike};

    fn received_at() -> DateTime<FixedOffset> {
        FixedOffset::east_opt(0)
            .unwrap()
            .with_ymd_and_hms(2018, 5, 4, 0, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_new_record_with_sqlstate() {
        let parsed = parse(
            "[RED] [12-1]  sql_error_code = 00000 LOG:  duration: 12.5 ms  statement: SELECT 1\n",
            received_at(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(parsed.format, LogFormat::HerokuDebug);
        assert_eq!(parsed.log_level, LogLevel::Log);
        assert_eq!(parsed.content, "duration: 12.5 ms  statement: SELECT 1\n");
        assert_eq!(parsed.occurred_at, received_at());
    }

    #[test]
    fn test_envelope_timestamp() {
        let parsed = parse(
            "Jun 27 22:33:42 d2hn app[postgres] info [RED] [12-1]  sql_error_code = 28000 FATAL:  no pg_hba.conf entry\n",
            received_at(),
        )
        .unwrap()
        .unwrap();
        assert_eq!(parsed.log_level, LogLevel::Fatal);
        assert_eq!(parsed.occurred_at.hour(), 22);
        assert_ne!(parsed.occurred_at, received_at());
    }

    #[test]
    fn test_continuation_without_sqlstate() {
        let err = parse("[RED] [12-2] FROM orders WHERE id = 1\n", received_at())
            .unwrap()
            .unwrap_err();
        assert_eq!(err.content(), "FROM orders WHERE id = 1\n");
    }

    #[test]
    fn test_not_wrapped() {
        assert!(parse("2018-05-04 03:06:43 UTC [1] LOG:  hi\n", received_at()).is_none());
    }
}
