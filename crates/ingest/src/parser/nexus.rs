//! Nexus repository request log 파서
//!
//! Apache 유사 형식이며 응답/요청 크기와 처리 시간이 추가됩니다:
//! ```text
//! IP - user [timestamp] "METHOD path HTTP/version" status resp_size req_size time_ms "user-agent" [thread]
//! ```
//!
//! 예시 라인:
//! ```text
//! 127.0.0.1 - admin [29/May/2025:12:34:56 +0000] "GET /repository/maven-public/a.jar HTTP/1.1" 200 1234 5678 89 "Apache-Maven/3.9" [qtp123-42]
//! ```
//!
//! 후행 user-agent와 thread 필드는 선택입니다. 타임스탬프는 배포본마다
//! 형식이 달라 다섯 가지 형식을 순서대로 판별합니다.

use chrono::NaiveDateTime;
use regex::Regex;

use logminer_core::error::ParseError;
use logminer_core::pipeline::LogParser;
use logminer_core::types::{LogFamily, LogRecord};

use crate::error::IngestError;

const NEXUS_LINE_PATTERN: &str = concat!(
    r#"^(?P<ip>\S+) "#,
    r#"- "#,
    r#"(?P<user>\S+) "#,
    r#"\[(?P<timestamp>[^\]]+)\] "#,
    r#""(?P<method>\S+) "#,
    r#"(?P<path>\S+) "#,
    r#"(?P<http_version>[^"]+)" "#,
    r#"(?P<status_code>\d+) "#,
    r#"(?P<response_size>\d+|-) "#,
    r#"(?P<request_size>\d+|-) "#,
    r#"(?P<processing_time_ms>\d+|-)"#,
    r#"(?: "(?P<user_agent>[^"]*)")?"#,
    r#"(?: \[(?P<thread_info>[^\]]+)\])?"#,
);

const DATETIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const APACHE_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

/// Nexus 로그 파서
pub struct NexusParser {
    pattern: Regex,
}

impl NexusParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Result<Self, IngestError> {
        let pattern = Regex::new(NEXUS_LINE_PATTERN).map_err(|e| IngestError::Pattern {
            pattern: NEXUS_LINE_PATTERN.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// 배포본별 타임스탬프 형식을 판별해 파싱합니다.
    ///
    /// 판별 순서:
    /// 1. Apache 스타일 `12/Jun/2025:09:11:00 +0000`
    /// 2. 밀리초 콤마 스타일 `2025-05-29 12:34:56,123+0000`
    /// 3. `+` 오프셋 스타일 `2025-05-29 12:34:56+0000`
    /// 4. `-` 오프셋 스타일 `2025-05-29 12:34:56-0400`
    /// 5. 오프셋 없는 `2025-05-29 12:34:56`
    ///
    /// 오프셋/밀리초는 버리고 naive 시각으로 저장합니다.
    fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
        if value.contains('/') && value.contains(':') {
            let base = value.split(' ').next().unwrap_or(value);
            NaiveDateTime::parse_from_str(base, APACHE_FORMAT).ok()
        } else if value.contains(',') {
            let base = value.split(',').next().unwrap_or(value);
            NaiveDateTime::parse_from_str(base, DATETIME_FORMAT).ok()
        } else if value.contains('+') {
            let base = value.split('+').next().unwrap_or(value);
            NaiveDateTime::parse_from_str(base, DATETIME_FORMAT).ok()
        } else if value.matches('-').count() >= 3 {
            // 날짜의 대시 두 개 외에 추가 대시가 있으면 음수 오프셋
            let base = value.rsplit_once('-').map(|(b, _)| b).unwrap_or(value);
            NaiveDateTime::parse_from_str(base, DATETIME_FORMAT).ok()
        } else {
            NaiveDateTime::parse_from_str(value, DATETIME_FORMAT).ok()
        }
    }
}

impl LogParser for NexusParser {
    fn family(&self) -> LogFamily {
        LogFamily::Nexus
    }

    fn parse(&self, line: &str, line_number: u64, source: &str) -> Result<LogRecord, ParseError> {
        let captures = self.pattern.captures(line).ok_or_else(|| {
            ParseError::FormatMismatch {
                family: "nexus",
                lineage: source.to_owned(),
                line_number,
            }
        })?;

        let timestamp_raw = &captures["timestamp"];
        let timestamp = Self::parse_timestamp(timestamp_raw).ok_or_else(|| {
            ParseError::InvalidTimestamp {
                value: timestamp_raw.to_owned(),
                lineage: source.to_owned(),
                line_number,
            }
        })?;

        let status_raw = &captures["status_code"];
        let status_code: u16 = status_raw.parse().map_err(|_| {
            ParseError::InvalidStatusCode {
                value: status_raw.to_owned(),
                lineage: source.to_owned(),
                line_number,
            }
        })?;

        Ok(LogRecord {
            family: LogFamily::Nexus,
            ip_address: captures["ip"].to_owned(),
            // Nexus 레코드는 `-`도 원문 그대로 보존 (저장소 측 관례)
            remote_user: Some(captures["user"].to_owned()),
            timestamp,
            method: captures["method"].to_owned(),
            path: captures["path"].to_owned(),
            http_version: captures["http_version"].to_owned(),
            status_code,
            response_size: super::parse_size_field(&captures["response_size"]),
            request_size: super::parse_size_field(&captures["request_size"]),
            processing_time_ms: super::parse_size_field(&captures["processing_time_ms"]),
            referer: None,
            user_agent: captures.name("user_agent").map(|m| m.as_str().to_owned()),
            thread_info: captures.name("thread_info").map(|m| m.as_str().to_owned()),
            raw_log: line.to_owned(),
            source: source.to_owned(),
        })
    }
}
