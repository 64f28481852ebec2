//! 파일명 글롭 매칭
//!
//! 디스커버리는 파일의 전체 경로가 아닌 파일명(basename)만 패턴과 비교합니다.
//! 매칭은 대소문자를 구분하지 않습니다 (`ACCESS.LOG.1`도 `access.log*`에
//! 매칭됩니다).

use std::path::Path;

use globset::{GlobBuilder, GlobSet, GlobSetBuilder};

use crate::error::IngestError;

/// 컴파일된 파일명 패턴 집합
///
/// 패턴 목록 중 하나라도 매칭되면 수집 대상입니다.
#[derive(Debug, Clone)]
pub struct PatternMatcher {
    set: GlobSet,
}

impl PatternMatcher {
    /// 글롭 패턴 목록을 컴파일합니다.
    pub fn new(patterns: &[String]) -> Result<Self, IngestError> {
        let mut builder = GlobSetBuilder::new();
        for pattern in patterns {
            let glob = GlobBuilder::new(pattern)
                .case_insensitive(true)
                .build()
                .map_err(|e| IngestError::Pattern {
                    pattern: pattern.clone(),
                    reason: e.to_string(),
                })?;
            builder.add(glob);
        }
        let set = builder.build().map_err(|e| IngestError::Pattern {
            pattern: patterns.join(","),
            reason: e.to_string(),
        })?;
        Ok(Self { set })
    }

    /// 경로의 파일명이 패턴 중 하나에 매칭되는지 확인합니다.
    pub fn matches(&self, path: &Path) -> bool {
        match path.file_name() {
            Some(name) => self.set.is_match(Path::new(name)),
            None => false,
        }
    }

    /// 파일명 문자열이 패턴 중 하나에 매칭되는지 확인합니다.
    pub fn matches_name(&self, name: &str) -> bool {
        self.set.is_match(Path::new(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn matcher(patterns: &[&str]) -> PatternMatcher {
        let owned: Vec<String> = patterns.iter().map(|s| (*s).to_owned()).collect();
        PatternMatcher::new(&owned).unwrap()
    }

    #[test]
    fn nginx_default_pattern_matches_rotations() {
        let m = matcher(&["access.log*"]);
        assert!(m.matches_name("access.log"));
        assert!(m.matches_name("access.log.1"));
        assert!(m.matches_name("access.log.2.gz"));
        assert!(!m.matches_name("error.log"));
    }

    #[test]
    fn matching_is_case_insensitive() {
        let m = matcher(&["access.log*"]);
        assert!(m.matches_name("ACCESS.LOG"));
        assert!(m.matches_name("Access.Log.1"));
    }

    #[test]
    fn nexus_default_patterns() {
        let m = matcher(&["request*.log*", "nexus_logs_*.tar", "nexus_logs_*.tar.gz"]);
        assert!(m.matches_name("request.log"));
        assert!(m.matches_name("request-2025-05-29.log.gz"));
        assert!(m.matches_name("nexus_logs_20250529.tar"));
        assert!(m.matches_name("nexus_logs_20250529.tar.gz"));
        assert!(!m.matches_name("audit.log"));
    }

    #[test]
    fn matches_uses_basename_only() {
        let m = matcher(&["access.log*"]);
        assert!(m.matches(Path::new("/deep/nested/dir/access.log.3")));
        assert!(!m.matches(Path::new("/access.log.dir/other.txt")));
    }

    #[test]
    fn invalid_pattern_is_rejected() {
        let result = PatternMatcher::new(&["[".to_owned()]);
        assert!(matches!(result, Err(IngestError::Pattern { .. })));
    }

    #[test]
    fn path_without_filename_never_matches() {
        let m = matcher(&["*"]);
        assert!(!m.matches(Path::new("/")));
    }
}
