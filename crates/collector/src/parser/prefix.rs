//! Prefix grammar set: the supported `log_line_prefix` templates.
//!
//! Each template is compiled from fixed field sub-patterns. Every sub-pattern
//! contributes exactly one capture group, so extraction is a lookup in the
//! per-grammar [`FieldMap`] table instead of hand-maintained indices.

use std::sync::LazyLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

// %t or %m
pub(crate) const TIME: &str = r"(\d{4}-\d{2}-\d{2} \d{2}:\d{2}:\d{2}(?:\.\d+)? [\-+]?\w+)";
// %r
const HOST_AND_PORT: &str = r"(.+(?:\(\d+\))?)?";
// %p
pub(crate) const PID: &str = r"(\d+)";
// %u
pub(crate) const USER: &str = r"(\S*)";
// %d
pub(crate) const DB: &str = r"(\S*)";
// %a
pub(crate) const APP: &str = r"(\S*)";
// %h
const HOST: &str = r"(\S*)";
// %v
const VIRTUAL_TX: &str = r"(\d+/\d+)?";
// %l
const LINE_COUNTER: &str = r"(\d+)";
// %e
pub(crate) const SQLSTATE: &str = r"(\w{5})";
// %x
const TRANSACTION_ID: &str = r"(\d+)";

pub(crate) const LEVEL_AND_CONTENT: &str = r"(\w+):\s+(.*\n?)$";

pub const LOG_PREFIX_AMAZON_RDS: &str = "%t:%r:%u@%d:[%p]:";
pub const LOG_PREFIX_CUSTOM1: &str = "%m [%p][%v] : [%l-1] %q[app=%a] ";
pub const LOG_PREFIX_CUSTOM2: &str = "%t [%p-%l] %q%u@%d ";
pub const LOG_PREFIX_CUSTOM3: &str = "%m [%p] %q[user=%u,db=%d,app=%a] ";
pub const LOG_PREFIX_CUSTOM4: &str = "%m [%p] %q[user=%u,db=%d,app=%a,host=%h] ";
pub const LOG_PREFIX_CUSTOM5: &str = "%t [%p]: [%l-1] user=%u,db=%d - PG-%e ";
pub const LOG_PREFIX_CUSTOM6: &str = "%t [%p]: [%l-1] user=%u,db=%d,app=%a,client=%h ";
pub const LOG_PREFIX_CUSTOM7: &str = "%t [%p]: [%l-1] [trx_id=%x] user=%u,db=%d ";
pub const LOG_PREFIX_SIMPLE: &str = "%m [%p] ";
pub const LOG_PREFIX_EMPTY: &str = "";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LogPrefix {
    AmazonRds,
    Custom1,
    Custom2,
    Custom3,
    Custom4,
    Custom5,
    Custom6,
    Custom7,
    Simple,
    /// No metadata at all, just `LEVEL:  content`
    Empty,
}

/// Capture-group index of each field within a grammar's pattern.
///
/// Fields a grammar does not carry are `None`. Fields a grammar carries but
/// that are never stored (host, virtual transaction id, SQLSTATE, ...) are
/// simply not listed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FieldMap {
    pub time: Option<usize>,
    pub pid: Option<usize>,
    pub user: Option<usize>,
    pub database: Option<usize>,
    pub application: Option<usize>,
    pub level: usize,
    pub content: usize,
}

impl LogPrefix {
    pub const ALL: [LogPrefix; 10] = [
        LogPrefix::AmazonRds,
        LogPrefix::Custom1,
        LogPrefix::Custom2,
        LogPrefix::Custom3,
        LogPrefix::Custom4,
        LogPrefix::Custom5,
        LogPrefix::Custom6,
        LogPrefix::Custom7,
        LogPrefix::Simple,
        LogPrefix::Empty,
    ];

    /// The `log_line_prefix` setting this grammar recognizes.
    pub fn template(&self) -> &'static str {
        match self {
            LogPrefix::AmazonRds => LOG_PREFIX_AMAZON_RDS,
            LogPrefix::Custom1 => LOG_PREFIX_CUSTOM1,
            LogPrefix::Custom2 => LOG_PREFIX_CUSTOM2,
            LogPrefix::Custom3 => LOG_PREFIX_CUSTOM3,
            LogPrefix::Custom4 => LOG_PREFIX_CUSTOM4,
            LogPrefix::Custom5 => LOG_PREFIX_CUSTOM5,
            LogPrefix::Custom6 => LOG_PREFIX_CUSTOM6,
            LogPrefix::Custom7 => LOG_PREFIX_CUSTOM7,
            LogPrefix::Simple => LOG_PREFIX_SIMPLE,
            LogPrefix::Empty => LOG_PREFIX_EMPTY,
        }
    }

    pub fn from_template(template: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|p| p.template() == template)
    }

    pub fn name(&self) -> &'static str {
        match self {
            LogPrefix::AmazonRds => "amazon_rds",
            LogPrefix::Custom1 => "custom1",
            LogPrefix::Custom2 => "custom2",
            LogPrefix::Custom3 => "custom3",
            LogPrefix::Custom4 => "custom4",
            LogPrefix::Custom5 => "custom5",
            LogPrefix::Custom6 => "custom6",
            LogPrefix::Custom7 => "custom7",
            LogPrefix::Simple => "simple",
            LogPrefix::Empty => "empty",
        }
    }

    pub fn fields(&self) -> FieldMap {
        let f = |time, pid, user, database, application, level, content| FieldMap {
            time: Some(time),
            pid: Some(pid),
            user,
            database,
            application,
            level,
            content,
        };

        match self {
            // time, host:port, user, db, pid
            LogPrefix::AmazonRds => f(1, 5, Some(3), Some(4), None, 6, 7),
            // time, pid, vxid, line, app
            LogPrefix::Custom1 => f(1, 2, None, None, Some(5), 6, 7),
            // time, pid, line, user, db
            LogPrefix::Custom2 => f(1, 2, Some(4), Some(5), None, 6, 7),
            // time, pid, user, db, app
            LogPrefix::Custom3 => f(1, 2, Some(3), Some(4), Some(5), 6, 7),
            // time, pid, user, db, app, host
            LogPrefix::Custom4 => f(1, 2, Some(3), Some(4), Some(5), 7, 8),
            // time, pid, line, user, db, sqlstate
            LogPrefix::Custom5 => f(1, 2, Some(4), Some(5), None, 7, 8),
            // time, pid, line, user, db, app, client
            LogPrefix::Custom6 => f(1, 2, Some(4), Some(5), Some(6), 8, 9),
            // time, pid, line, xid, user, db
            LogPrefix::Custom7 => f(1, 2, Some(5), Some(6), None, 7, 8),
            LogPrefix::Simple => f(1, 2, None, None, None, 3, 4),
            LogPrefix::Empty => FieldMap {
                time: None,
                pid: None,
                user: None,
                database: None,
                application: None,
                level: 1,
                content: 2,
            },
        }
    }

    /// Compiled pattern for this grammar, anchored at the start of the line.
    pub fn regex(&self) -> &'static Regex {
        &GRAMMARS[*self as usize]
    }
}

/// Whether `prefix` is a `log_line_prefix` value the parser understands.
/// The empty string is supported and means "auto-detect".
pub fn is_supported_prefix(prefix: &str) -> bool {
    LogPrefix::from_template(prefix).is_some()
}

fn pattern(prefix: LogPrefix) -> String {
    let lc = LEVEL_AND_CONTENT;
    match prefix {
        LogPrefix::AmazonRds => {
            format!(r"^{TIME}:{HOST_AND_PORT}:{USER}@{DB}:\[{PID}\]:{lc}")
        }
        LogPrefix::Custom1 => format!(
            r"^{TIME} \[{PID}\]\[{VIRTUAL_TX}\] : \[{LINE_COUNTER}-1\] (?:\[app={APP}\] )?{lc}"
        ),
        LogPrefix::Custom2 => {
            format!(r"^{TIME} \[{PID}-{LINE_COUNTER}\] (?:{USER}@{DB} )?{lc}")
        }
        LogPrefix::Custom3 => format!(
            r"^{TIME} \[{PID}\] (?:\[user={USER},db={DB},app={APP}\] )?{lc}"
        ),
        LogPrefix::Custom4 => format!(
            r"^{TIME} \[{PID}\] (?:\[user={USER},db={DB},app={APP},host={HOST}\] )?{lc}"
        ),
        LogPrefix::Custom5 => format!(
            r"^{TIME} \[{PID}\]: \[{LINE_COUNTER}-1\] user={USER},db={DB} - PG-{SQLSTATE} {lc}"
        ),
        LogPrefix::Custom6 => format!(
            r"^{TIME} \[{PID}\]: \[{LINE_COUNTER}-1\] user={USER},db={DB},app={APP},client={HOST} {lc}"
        ),
        LogPrefix::Custom7 => format!(
            r"^{TIME} \[{PID}\]: \[{LINE_COUNTER}-1\] \[trx_id={TRANSACTION_ID}\] user={USER},db={DB} {lc}"
        ),
        LogPrefix::Simple => format!(r"^{TIME} \[{PID}\] {lc}"),
        LogPrefix::Empty => format!(r"^{lc}"),
    }
}

static GRAMMARS: LazyLock<Vec<Regex>> = LazyLock::new(|| {
    LogPrefix::ALL
        .iter()
        .map(|p| Regex::new(&pattern(*p)).expect("log prefix grammar must compile"))
        .collect()
});

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_all_grammars_compile_in_declaration_order() {
        for prefix in LogPrefix::ALL {
            // Indexing by discriminant must line up with ALL
            assert_eq!(LogPrefix::ALL[prefix as usize], prefix);
            assert!(prefix.regex().as_str().starts_with('^'));
        }
    }

    #[test]
    fn test_field_map_indices_exist() {
        for prefix in LogPrefix::ALL {
            let groups = prefix.regex().captures_len() - 1;
            let map = prefix.fields();
            assert_eq!(map.content, groups, "{:?}: content must be the last group", prefix);
            assert_eq!(map.level, groups - 1, "{:?}: level precedes content", prefix);
            for idx in [map.time, map.pid, map.user, map.database, map.application]
                .into_iter()
                .flatten()
            {
                assert!(idx < map.level, "{:?}: field index {} out of prefix range", prefix, idx);
            }
        }
    }

    #[test]
    fn test_supported_prefixes() {
        assert!(is_supported_prefix("%t:%r:%u@%d:[%p]:"));
        assert!(is_supported_prefix("%m [%p] "));
        assert!(is_supported_prefix(""));
        assert!(!is_supported_prefix("%m [%p]"));
        assert!(!is_supported_prefix("%m %p %u"));
    }

    #[test]
    fn test_from_template_round_trips_every_prefix() {
        for prefix in LogPrefix::ALL {
            assert_eq!(LogPrefix::from_template(prefix.template()), Some(prefix));
        }
    }

    #[test]
    fn test_rds_pattern_captures() {
        let line = "2018-05-04 03:06:43 UTC:10.1.1.1(45678):app_user@app_db:[8127]:LOG:  connection received\n";
        let caps = LogPrefix::AmazonRds.regex().captures(line).unwrap();
        let map = LogPrefix::AmazonRds.fields();
        assert_eq!(&caps[map.time.unwrap()], "2018-05-04 03:06:43 UTC");
        assert_eq!(&caps[map.user.unwrap()], "app_user");
        assert_eq!(&caps[map.database.unwrap()], "app_db");
        assert_eq!(&caps[map.pid.unwrap()], "8127");
        assert_eq!(&caps[map.level], "LOG");
        assert_eq!(&caps[map.content], "connection received\n");
    }
}
