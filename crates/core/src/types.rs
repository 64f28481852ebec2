//! 도메인 타입 — 시스템 전역에서 사용되는 공통 타입
//!
//! 파이프라인과 스토리지 계약이 공유하는 데이터 구조를 정의합니다.

use std::fmt;

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

/// 로그 패밀리 — 지원하는 두 가지 로그 문법
///
/// 디스커버리, 파서 선택, 스토리지 라우팅이 모두 이 값으로 분기합니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogFamily {
    /// nginx combined log format
    Nginx,
    /// Nexus repository manager request log
    Nexus,
}

impl LogFamily {
    /// 패밀리명을 소문자 문자열로 반환합니다.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Nginx => "nginx",
            Self::Nexus => "nexus",
        }
    }

    /// 문자열에서 패밀리를 파싱합니다. 대소문자를 구분하지 않습니다.
    pub fn from_str_loose(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "nginx" => Some(Self::Nginx),
            "nexus" => Some(Self::Nexus),
            _ => None,
        }
    }
}

impl fmt::Display for LogFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// 파싱된 로그 레코드
///
/// 한 라인의 파싱 결과를 나타냅니다. 두 패밀리가 같은 구조체를 공유하며,
/// 패밀리 전용 필드는 `Option`입니다 (nginx: `referer`,
/// nexus: `request_size`/`processing_time_ms`/`thread_info`).
///
/// 필수 필드(타임스탬프, 상태 코드)가 없는 레코드는 생성되지 않습니다.
/// 파싱 실패는 레코드가 아니라 [`ParseError`](crate::error::ParseError)로
/// 전달됩니다.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LogRecord {
    /// 로그 패밀리
    pub family: LogFamily,
    /// 클라이언트 IP 주소 (문자열 그대로 보존)
    pub ip_address: String,
    /// 원격 사용자 (`-`는 None)
    pub remote_user: Option<String>,
    /// 타임스탬프 (오프셋은 파싱 후 버리고 naive로 저장)
    pub timestamp: NaiveDateTime,
    /// HTTP 메서드, 또는 센티널 분류 (`SSH-ATTEMPT` 등)
    pub method: String,
    /// 요청 경로 (비 HTTP 요청은 원문을 50자로 잘라 보존)
    pub path: String,
    /// HTTP 버전, 비 HTTP 트래픽은 `NON-HTTP`
    pub http_version: String,
    /// HTTP 상태 코드
    pub status_code: u16,
    /// 응답 크기 (바이트, `-`는 None)
    pub response_size: Option<u64>,
    /// 요청 크기 (nexus 전용)
    pub request_size: Option<u64>,
    /// 처리 시간 밀리초 (nexus 전용)
    pub processing_time_ms: Option<u64>,
    /// Referer 헤더 (nginx 전용, `-`는 None)
    pub referer: Option<String>,
    /// User-Agent 헤더
    pub user_agent: Option<String>,
    /// 스레드 정보 (nexus 전용)
    pub thread_info: Option<String>,
    /// 원본 라인 (감사 목적으로 보존)
    pub raw_log: String,
    /// 소스 계보 문자열 (예: `nginx:outer.tar.gz->inner.tar->access.log`)
    pub source: String,
}

impl fmt::Display for LogRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] {} {} {} {} ({})",
            self.family, self.ip_address, self.method, self.path, self.status_code, self.source,
        )
    }
}
