//! Output: one JSON object per line for every record and sample.

use std::io::Write;

use serde::Serialize;

use crate::error::CollectorError;
use crate::parser::{LogLine, QuerySample};

#[derive(Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
enum OutputRecord<'a> {
    LogLine {
        source: &'a str,
        #[serde(flatten)]
        line: &'a LogLine,
    },
    QuerySample {
        source: &'a str,
        #[serde(flatten)]
        sample: &'a QuerySample,
    },
}

/// Write `log_lines` then `samples` from `source` to `out`.
pub fn write_records<W: Write>(
    out: &mut W,
    source: &str,
    log_lines: &[LogLine],
    samples: &[QuerySample],
) -> Result<(), CollectorError> {
    for line in log_lines {
        serde_json::to_writer(&mut *out, &OutputRecord::LogLine { source, line })?;
        out.write_all(b"\n")?;
    }
    for sample in samples {
        serde_json::to_writer(&mut *out, &OutputRecord::QuerySample { source, sample })?;
        out.write_all(b"\n")?;
    }
    out.flush()?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::parser::parse_log_line;

    #[test]
    fn test_json_lines() {
        let raw = "2018-05-04 03:06:43 UTC [8127] [user=app,db=appdb,app=psql] LOG:  duration: 1.5 ms  statement: SELECT 1\n";
        let line = LogLine::from_raw(parse_log_line(raw, None).unwrap(), 0, raw.as_bytes());
        let sample = QuerySample {
            occurred_at: line.occurred_at,
            username: None,
            database: None,
            query: "SELECT 1".to_string(),
            runtime_ms: 1.5,
            log_line_uuid: line.uuid,
        };

        let mut buf = Vec::new();
        write_records(&mut buf, "pg.log", &[line.clone()], &[sample]).unwrap();
        let text = String::from_utf8(buf).unwrap();
        let rows: Vec<serde_json::Value> = text
            .lines()
            .map(|l| serde_json::from_str(l).unwrap())
            .collect();

        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0]["kind"], "log_line");
        assert_eq!(rows[0]["source"], "pg.log");
        assert_eq!(rows[0]["log_level"], "LOG");
        assert_eq!(rows[0]["username"], "app");
        assert!(rows[0]["occurred_at"].as_str().unwrap().starts_with("2018-05-04T03:06:43"));
        assert_eq!(rows[0]["uuid"], line.uuid.to_string());
        assert_eq!(rows[1]["kind"], "query_sample");
        assert_eq!(rows[1]["runtime_ms"], 1.5);
        assert!(rows[1].get("username").is_none());
    }
}
