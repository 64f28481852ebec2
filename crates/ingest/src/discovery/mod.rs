//! 로그 파일 디스커버리
//!
//! 루트 디렉토리를 워킹하며 패턴에 매칭되는 파일을 찾고, 아카이브는
//! 깊이 제한 안에서 재귀적으로 추출합니다. 결과는 지연 평가되는
//! [`DiscoveryStream`]으로 나옵니다. 한 번 소비하면 끝이며, 다시
//! 디스커버리하면 파일시스템을 다시 워킹하고 아카이브를 새 임시
//! 디렉토리에 다시 추출합니다.
//!
//! 추출에 사용된 임시 디렉토리는 전부 [`DiscoveryEngine`]이 소유하며
//! [`DiscoveryEngine::cleanup`] 한 번으로 일괄 삭제됩니다. 스트림 소비가
//! 끝나기 전에는 절대 삭제하지 않습니다.

pub mod archive;

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use logminer_core::types::LogFamily;

use crate::config::SourceSpec;
use crate::error::IngestError;
use crate::pattern::PatternMatcher;
use archive::ArchiveKind;

/// 디스커버리가 찾아낸 로그 소스 하나
///
/// 추출된 아카이브 멤버의 경우 `path`는 엔진 소유의 임시 디렉토리를
/// 가리키므로, 엔진의 `cleanup()` 전에 읽어야 합니다.
#[derive(Debug, Clone)]
pub struct DiscoveredFile {
    /// 읽기 가능한 절대 경로
    pub path: PathBuf,
    /// 소스 계보 (예: `nexus:nexus_logs_1.tar.gz->inner.tar->request.log`)
    pub lineage: String,
    /// 이 파일이 발견된 로그 패밀리
    pub family: LogFamily,
}

/// 디스커버리 엔진
///
/// 아카이브 추출에 쓰인 임시 디렉토리의 아레나를 소유합니다.
/// 디스커버리 런이 모두 끝난 뒤 [`cleanup`](Self::cleanup)을 호출해야
/// 하며, 호출하지 않아도 드롭 시점에 `TempDir`가 정리를 시도합니다.
pub struct DiscoveryEngine {
    max_archive_depth: usize,
    temp_dirs: Vec<TempDir>,
}

impl DiscoveryEngine {
    /// 새 엔진을 생성합니다.
    pub fn new(max_archive_depth: usize) -> Self {
        Self {
            max_archive_depth,
            temp_dirs: Vec::new(),
        }
    }

    /// 루트 디렉토리에서 패턴에 매칭되는 로그 파일의 지연 스트림을 만듭니다.
    ///
    /// 루트가 없거나 디렉토리가 아니면 경고 후 빈 스트림을 반환합니다.
    /// 여러 루트를 순회하는 호출자가 계속 진행할 수 있게 에러로 만들지
    /// 않습니다.
    pub fn discover(
        &mut self,
        spec: &SourceSpec,
        family: LogFamily,
    ) -> Result<DiscoveryStream<'_>, IngestError> {
        let matcher = PatternMatcher::new(&spec.patterns)?;
        let mut stream = DiscoveryStream {
            engine: self,
            matcher,
            family,
            stack: Vec::new(),
            seen: HashSet::new(),
        };

        if !spec.root_dir.is_dir() {
            warn!(
                root = %spec.root_dir.display(),
                family = %family,
                "root directory does not exist or is not a directory, yielding nothing"
            );
            return Ok(stream);
        }

        stream.seed_from_root(&spec.root_dir);
        Ok(stream)
    }

    /// 이번 런에서 만든 임시 디렉토리를 일괄 삭제합니다.
    ///
    /// 삭제 실패는 경고로만 남기고 에러로 만들지 않습니다.
    pub fn cleanup(&mut self) {
        let count = self.temp_dirs.len();
        for dir in self.temp_dirs.drain(..) {
            let path = dir.path().to_path_buf();
            if let Err(e) = dir.close() {
                warn!(dir = %path.display(), error = %e, "failed to remove temp directory");
            }
        }
        if count > 0 {
            info!(temp_dirs = count, "discovery temp directories swept");
        }
    }

    /// 현재 아레나에 등록된 임시 디렉토리 수
    pub fn temp_dir_count(&self) -> usize {
        self.temp_dirs.len()
    }
}

/// 작업 스택의 한 항목
enum WorkItem {
    /// 바로 yield할 수 있는 로그 파일
    File { path: PathBuf, lineage: String },
    /// 추출이 필요한 아카이브 (depth는 1부터 시작)
    Archive {
        path: PathBuf,
        kind: ArchiveKind,
        lineage: String,
        depth: usize,
    },
}

/// 디스커버리 결과의 지연 스트림
///
/// `next()`가 호출될 때에야 아카이브를 추출합니다. 유한하며 재시작할 수
/// 없습니다.
pub struct DiscoveryStream<'a> {
    engine: &'a mut DiscoveryEngine,
    matcher: PatternMatcher,
    family: LogFamily,
    stack: Vec<WorkItem>,
    seen: HashSet<PathBuf>,
}

impl DiscoveryStream<'_> {
    /// 루트 디렉토리를 한 번 워킹해 작업 스택을 채웁니다.
    fn seed_from_root(&mut self, root: &Path) {
        let mut items = Vec::new();
        let walker = WalkDir::new(root)
            .follow_links(true)
            .sort_by_file_name()
            .into_iter();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(root = %root.display(), error = %e, "skipping unreadable entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            let path = entry.path();
            if !self.matcher.matches(path) {
                continue;
            }
            // 심링크 순환으로 같은 파일을 두 번 방문하지 않게 실제 경로로 중복 제거
            let resolved = path.canonicalize().unwrap_or_else(|_| path.to_path_buf());
            if !self.seen.insert(resolved) {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();
            let lineage = format!("{}:{}", self.family, filename);
            items.push(self.classify(path.to_path_buf(), lineage, 1));
        }
        // LIFO 스택이므로 역순으로 쌓아 워킹 순서를 보존
        items.reverse();
        self.stack = items;
    }

    fn classify(&self, path: PathBuf, lineage: String, depth: usize) -> WorkItem {
        match ArchiveKind::detect(&path) {
            Some(kind) => WorkItem::Archive {
                path,
                kind,
                lineage,
                depth,
            },
            None => WorkItem::File { path, lineage },
        }
    }

    /// 아카이브 하나를 추출하고 내용물을 작업 스택에 밀어 넣습니다.
    fn expand_archive(&mut self, path: &Path, kind: ArchiveKind, lineage: &str, depth: usize) {
        if depth > self.engine.max_archive_depth {
            warn!(
                archive = %lineage,
                depth,
                max_depth = self.engine.max_archive_depth,
                "archive nesting exceeds depth limit, skipping branch"
            );
            return;
        }

        let temp = match tempfile::tempdir() {
            Ok(temp) => temp,
            Err(e) => {
                warn!(archive = %lineage, error = %e, "failed to create temp directory");
                return;
            }
        };

        if let Err(e) = archive::extract(path, kind, temp.path()) {
            warn!(archive = %lineage, error = %e, "extraction failed, skipping branch");
            // 부분 추출물까지 일괄 정리 대상에 포함
            self.engine.temp_dirs.push(temp);
            return;
        }

        let extracted_root = temp.path().to_path_buf();
        self.engine.temp_dirs.push(temp);

        let mut items = Vec::new();
        let walker = WalkDir::new(&extracted_root)
            .sort_by_file_name()
            .into_iter();
        for entry in walker {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    warn!(archive = %lineage, error = %e, "skipping unreadable extracted entry");
                    continue;
                }
            };
            if !entry.file_type().is_file() {
                continue;
            }
            if !self.matcher.matches(entry.path()) {
                continue;
            }
            let relative = entry
                .path()
                .strip_prefix(&extracted_root)
                .unwrap_or(entry.path())
                .to_string_lossy()
                .into_owned();
            let child_lineage = format!("{lineage}->{relative}");
            items.push(self.classify(entry.path().to_path_buf(), child_lineage, depth + 1));
        }
        debug!(archive = %lineage, matched = items.len(), "archive expanded");
        items.reverse();
        self.stack.extend(items);
    }
}

impl Iterator for DiscoveryStream<'_> {
    type Item = DiscoveredFile;

    fn next(&mut self) -> Option<Self::Item> {
        loop {
            match self.stack.pop()? {
                WorkItem::File { path, lineage } => {
                    return Some(DiscoveredFile {
                        path,
                        lineage,
                        family: self.family,
                    });
                }
                WorkItem::Archive {
                    path,
                    kind,
                    lineage,
                    depth,
                } => {
                    self.expand_archive(&path, kind, &lineage, depth);
                }
            }
        }
    }
}
