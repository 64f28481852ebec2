//! nginx combined log format 파서
//!
//! ```text
//! IP remote_user auth_user [timestamp] "request" status size "referer" "user-agent"
//! ```
//!
//! 예시 라인:
//! ```text
//! 127.0.0.1 - - [29/May/2025:00:00:09 -0400] "GET /api/test HTTP/1.1" 200 1234 "-" "Mozilla/5.0"
//! ```
//!
//! request 필드는 관대하게 처리합니다. `METHOD path HTTP/version` 3토큰이
//! 아닌 요청(SSH 배너 프로브, 바이너리, JSON-RPC 스캔 트래픽)은 파싱 실패가
//! 아니라 센티널 method/version 쌍으로 분류되어 그대로 저장됩니다.
//! 포렌식 검토를 위해 비 HTTP 트래픽도 버리지 않습니다.

use chrono::NaiveDateTime;
use regex::Regex;

use logminer_core::error::ParseError;
use logminer_core::pipeline::LogParser;
use logminer_core::types::{LogFamily, LogRecord};

use crate::error::IngestError;

const NGINX_LINE_PATTERN: &str = concat!(
    r#"^(?P<ip>\S+) "#,
    r#"(?P<remote_user>\S+) "#,
    r#"(?P<auth_user>\S+) "#,
    r#"\[(?P<timestamp>[^\]]+)\] "#,
    r#""(?P<request>[^"]*)" "#,
    r#"(?P<status_code>\d+) "#,
    r#"(?P<response_size>\S+) "#,
    r#""(?P<referer>[^"]*)" "#,
    r#""(?P<user_agent>[^"]*)""#,
);

const TIMESTAMP_FORMAT: &str = "%d/%b/%Y:%H:%M:%S";

/// nginx 로그 파서
pub struct NginxParser {
    pattern: Regex,
}

impl NginxParser {
    /// 새 파서를 생성합니다.
    pub fn new() -> Result<Self, IngestError> {
        let pattern = Regex::new(NGINX_LINE_PATTERN).map_err(|e| IngestError::Pattern {
            pattern: NGINX_LINE_PATTERN.to_owned(),
            reason: e.to_string(),
        })?;
        Ok(Self { pattern })
    }

    /// request 필드를 (method, path, http_version)으로 분해합니다.
    ///
    /// 정상 HTTP 요청은 그대로 통과하고, 그 외에는 센티널 분류를 적용합니다:
    /// - `SSH-`로 시작 → `SSH-ATTEMPT`
    /// - `{`로 시작하거나 `method` 포함 → `JSON-RPC`
    /// - 비인쇄 문자 포함 → `BINARY-DATA` (경로는 `[BINARY]`)
    /// - 그 외 → `MALFORMED`
    fn classify_request(request: &str) -> (String, String, String) {
        let parts: Vec<&str> = request.splitn(3, ' ').collect();
        if parts.len() == 3 && parts[2].starts_with("HTTP/") {
            return (
                parts[0].to_owned(),
                parts[1].to_owned(),
                parts[2].to_owned(),
            );
        }

        let non_http = "NON-HTTP".to_owned();
        if request.starts_with("SSH-") {
            ("SSH-ATTEMPT".to_owned(), super::truncate_raw_request(request), non_http)
        } else if request.starts_with('{') || request.contains("method") {
            ("JSON-RPC".to_owned(), super::truncate_raw_request(request), non_http)
        } else if request.chars().any(|c| {
            let code = c as u32;
            code < 0x20 || code > 0x7e
        }) {
            ("BINARY-DATA".to_owned(), "[BINARY]".to_owned(), non_http)
        } else {
            ("MALFORMED".to_owned(), super::truncate_raw_request(request), non_http)
        }
    }

    /// `29/May/2025:00:00:09 -0400` 형식의 타임스탬프를 파싱합니다.
    ///
    /// 타임존 오프셋은 버리고 naive 시각으로 저장합니다.
    fn parse_timestamp(value: &str) -> Option<NaiveDateTime> {
        let date_part = value.split(' ').next().unwrap_or(value);
        NaiveDateTime::parse_from_str(date_part, TIMESTAMP_FORMAT).ok()
    }
}

impl LogParser for NginxParser {
    fn family(&self) -> LogFamily {
        LogFamily::Nginx
    }

    fn parse(&self, line: &str, line_number: u64, source: &str) -> Result<LogRecord, ParseError> {
        let captures = self.pattern.captures(line).ok_or_else(|| {
            ParseError::FormatMismatch {
                family: "nginx",
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

        let (method, path, http_version) = Self::classify_request(&captures["request"]);

        Ok(LogRecord {
            family: LogFamily::Nginx,
            ip_address: captures["ip"].to_owned(),
            remote_user: super::clean_optional_field(&captures["remote_user"]),
            timestamp,
            method,
            path,
            http_version,
            status_code,
            response_size: super::parse_size_field(&captures["response_size"]),
            request_size: None,
            processing_time_ms: None,
            referer: super::clean_optional_field(&captures["referer"]),
            user_agent: Some(captures["user_agent"].to_owned()),
            thread_info: None,
            raw_log: line.to_owned(),
            source: source.to_owned(),
        })
    }
}
