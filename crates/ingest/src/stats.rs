//! 수집 런 통계
//!
//! 한 번의 수집 런 동안 오케스트레이터가 증분 갱신하고, 런이 끝난 뒤
//! 요약 출력에 한 번 읽습니다. 영속화되지 않습니다.

use std::fmt;
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Serialize;

use logminer_core::types::LogFamily;

/// 패밀리 하나의 누적 카운터
#[derive(Debug, Clone, Default, Serialize)]
pub struct FamilyStats {
    /// 처리한 파일 수
    pub files_processed: u64,
    /// 처리한 비어 있지 않은 라인 수
    pub lines_processed: u64,
    /// 파싱에 성공해 스토리지로 전달된 레코드 수
    pub records_parsed: u64,
    /// 파싱 에러 수 (파일 단위 실패 포함)
    pub parse_errors: u64,
    /// 이 패밀리 처리에 걸린 시간
    #[serde(skip)]
    pub elapsed: Duration,
}

impl FamilyStats {
    /// 파싱 성공률 (0.0 ~ 1.0). 라인이 없으면 1.0입니다.
    pub fn success_rate(&self) -> f64 {
        if self.lines_processed == 0 {
            1.0
        } else {
            self.records_parsed as f64 / self.lines_processed as f64
        }
    }
}

/// 수집 런 전체의 통계
#[derive(Debug, Clone, Serialize)]
pub struct ProcessingStatistics {
    /// nginx 패밀리 카운터
    pub nginx: FamilyStats,
    /// Nexus 패밀리 카운터
    pub nexus: FamilyStats,
    /// 런 시작 시각
    pub started_at: DateTime<Utc>,
    /// 런 종료 시각 (finalize 전에는 None)
    pub finished_at: Option<DateTime<Utc>>,
}

impl Default for ProcessingStatistics {
    fn default() -> Self {
        Self::new()
    }
}

impl ProcessingStatistics {
    /// 시작 시각이 기록된 새 통계를 생성합니다.
    pub fn new() -> Self {
        Self {
            nginx: FamilyStats::default(),
            nexus: FamilyStats::default(),
            started_at: Utc::now(),
            finished_at: None,
        }
    }

    /// 패밀리 카운터에 대한 가변 참조
    pub fn family_mut(&mut self, family: LogFamily) -> &mut FamilyStats {
        match family {
            LogFamily::Nginx => &mut self.nginx,
            LogFamily::Nexus => &mut self.nexus,
        }
    }

    /// 패밀리 카운터에 대한 참조
    pub fn family(&self, family: LogFamily) -> &FamilyStats {
        match family {
            LogFamily::Nginx => &self.nginx,
            LogFamily::Nexus => &self.nexus,
        }
    }

    /// 종료 시각을 기록합니다. 두 번 호출해도 첫 기록을 유지합니다.
    pub fn finalize(&mut self) {
        if self.finished_at.is_none() {
            self.finished_at = Some(Utc::now());
        }
    }

    /// 전체 파일 수
    pub fn total_files(&self) -> u64 {
        self.nginx.files_processed + self.nexus.files_processed
    }

    /// 전체 레코드 수
    pub fn total_records(&self) -> u64 {
        self.nginx.records_parsed + self.nexus.records_parsed
    }

    /// 전체 파싱 에러 수
    pub fn total_errors(&self) -> u64 {
        self.nginx.parse_errors + self.nexus.parse_errors
    }
}

impl fmt::Display for ProcessingStatistics {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "ingestion summary:")?;
        for (name, stats) in [("nginx", &self.nginx), ("nexus", &self.nexus)] {
            writeln!(
                f,
                "  {name}: {} files, {} lines, {} records, {} errors ({:.1}% ok, {:.2}s)",
                stats.files_processed,
                stats.lines_processed,
                stats.records_parsed,
                stats.parse_errors,
                stats.success_rate() * 100.0,
                stats.elapsed.as_secs_f64(),
            )?;
        }
        write!(
            f,
            "  total: {} files, {} records, {} errors",
            self.total_files(),
            self.total_records(),
            self.total_errors(),
        )
    }
}
