use std::sync::LazyLock;

use regex::Regex;

use crate::parser::extract::{extract, parse_pid};
use crate::parser::model::{LogFormat, LogLevel, ParseError, ParsedLine};
use crate::parser::prefix::{FieldMap, LogPrefix, APP, DB, LEVEL_AND_CONTENT, PID, USER};
use crate::parser::time::parse_syslog_timestamp;

/// rsyslog escapes control characters; tabs inside statements arrive as `#011`.
const ESCAPED_TAB: &str = "#011";

// Mon D HH:MM:SS host process[pid]: [seq-split] body
static RSYSLOG: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(
        r"^(\w+\s+\d+ \d{{2}}:\d{{2}}:\d{{2}}) (\S+) (\w+)\[{PID}\]: (\[[\d-]+\])? (.*\n?)$"
    );
    Regex::new(&pattern).expect("syslog grammar must compile")
});

/// `[user=..,db=..,app=..] LEVEL:  content` inside a syslog body.
static BRACKETED_IDENTITY: LazyLock<Regex> = LazyLock::new(|| {
    let pattern = format!(r"^\[user={USER},db={DB},app={APP}\] {LEVEL_AND_CONTENT}");
    Regex::new(&pattern).expect("syslog identity grammar must compile")
});

const BRACKETED_FIELDS: FieldMap = FieldMap {
    time: None,
    pid: None,
    user: Some(1),
    database: Some(2),
    application: Some(3),
    level: 4,
    content: 5,
};

mod group {
    pub const TIME: usize = 1;
    pub const PID: usize = 4;
    pub const BODY: usize = 6;
}

pub fn is_match(line: &str) -> bool {
    RSYSLOG.is_match(line)
}

/// Parse a syslog-framed server line.
///
/// The syslog hostname, process name and sequence counter are discarded.
/// The body is tried against the bracketed identity sub-format, then against
/// the bare `LEVEL:  content` grammar; a body with neither is a continuation.
pub fn parse(line: &str) -> Result<ParsedLine, ParseError> {
    let Some(caps) = RSYSLOG.captures(line) else {
        return Err(ParseError::Unrecognized { content: line.to_string() });
    };

    let time = caps.get(group::TIME).map_or("", |m| m.as_str());
    let Some(occurred_at) = parse_syslog_timestamp(time) else {
        return Err(ParseError::InvalidTimestamp {
            timestamp: time.to_string(),
            content: line.to_string(),
        });
    };
    let backend_pid = parse_pid(caps.get(group::PID).map_or("", |m| m.as_str()));
    let body = caps
        .get(group::BODY)
        .map_or("", |m| m.as_str())
        .replace(ESCAPED_TAB, "\t");

    let empty = LogPrefix::Empty;
    let raw = if let Some(inner) = BRACKETED_IDENTITY.captures(&body) {
        extract(&BRACKETED_FIELDS, &inner)
    } else if let Some(inner) = empty.regex().captures(&body) {
        extract(&empty.fields(), &inner)
    } else {
        return Err(ParseError::MissingLevel { content: body.clone() });
    };

    let Some(log_level) = LogLevel::from_name(raw.level) else {
        return Err(ParseError::UnknownLevel {
            level: raw.level.to_string(),
            content: body.clone(),
        });
    };

    Ok(ParsedLine {
        format: LogFormat::Syslog,
        occurred_at,
        username: raw.user.map(str::to_string),
        database: raw.database.map(str::to_string),
        application: raw.application.map(str::to_string),
        backend_pid,
        log_level,
        content: raw.content.to_string(),
    })
}
