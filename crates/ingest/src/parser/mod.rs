//! 로그 라인 파싱 모듈 -- nginx combined, Nexus request 형식별 파서
//!
//! 각 파서는 core의 [`LogParser`](logminer_core::pipeline::LogParser) trait을
//! 구현합니다. 파서는 한 라인에 대한 순수 함수이며, 라인 번호와 소스 계보는
//! 에러 보고용 컨텍스트로만 사용합니다.
//!
//! # 지원 형식
//! - nginx combined log format ([`NginxParser`])
//! - Nexus repository request log ([`NexusParser`])
//!
//! # 허용 정책
//! 하드 실패는 세 가지뿐입니다: 문법 전체 불일치, 타임스탬프 실패,
//! 상태 코드 실패. 그 외 필드 이상은 None 또는 센티널 값으로 흡수되어
//! 레코드가 보존됩니다.

pub mod nginx;
pub mod nexus;

pub use nginx::NginxParser;
pub use nexus::NexusParser;

use logminer_core::pipeline::LogParser;
use logminer_core::types::LogFamily;

use crate::error::IngestError;

/// 패밀리에 맞는 파서를 생성합니다.
pub fn parser_for(family: LogFamily) -> Result<Box<dyn LogParser>, IngestError> {
    Ok(match family {
        LogFamily::Nginx => Box::new(NginxParser::new()?),
        LogFamily::Nexus => Box::new(NexusParser::new()?),
    })
}

/// 비 HTTP 요청 경로의 최대 보존 길이 (초과분은 `...`로 대체)
const MAX_RAW_REQUEST_LEN: usize = 50;

/// 크기/시간 필드를 파싱합니다. `-`와 파싱 불가 값은 None입니다.
fn parse_size_field(value: &str) -> Option<u64> {
    if value.is_empty() || value == "-" {
        return None;
    }
    value.parse().ok()
}

/// `-` 마커를 None으로 바꿉니다.
fn clean_optional_field(value: &str) -> Option<String> {
    if value == "-" {
        None
    } else {
        Some(value.to_owned())
    }
}

/// 비 HTTP 요청 문자열을 보존 길이로 자릅니다.
fn truncate_raw_request(value: &str) -> String {
    if value.chars().count() > MAX_RAW_REQUEST_LEN {
        let head: String = value.chars().take(MAX_RAW_REQUEST_LEN).collect();
        format!("{head}...")
    } else {
        value.to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn size_field_dash_is_none() {
        assert_eq!(parse_size_field("-"), None);
        assert_eq!(parse_size_field(""), None);
        assert_eq!(parse_size_field("1234"), Some(1234));
    }

    #[test]
    fn size_field_garbage_degrades_to_none() {
        assert_eq!(parse_size_field("abc"), None);
        assert_eq!(parse_size_field("-5"), None);
    }

    #[test]
    fn optional_field_cleaning() {
        assert_eq!(clean_optional_field("-"), None);
        assert_eq!(clean_optional_field("admin"), Some("admin".to_owned()));
    }

    #[test]
    fn truncation_preserves_short_strings() {
        assert_eq!(truncate_raw_request("short"), "short");
        let long = "x".repeat(80);
        let truncated = truncate_raw_request(&long);
        assert_eq!(truncated.chars().count(), 53);
        assert!(truncated.ends_with("..."));
    }

    #[test]
    fn parser_for_builds_both_families() {
        assert_eq!(
            parser_for(LogFamily::Nginx).unwrap().family(),
            LogFamily::Nginx
        );
        assert_eq!(
            parser_for(LogFamily::Nexus).unwrap().family(),
            LogFamily::Nexus
        );
    }
}
