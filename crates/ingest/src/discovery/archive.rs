//! 아카이브 형식 감지와 안전한 추출
//!
//! tar / tar.gz / tar.bz2 / zip / 단독 gzip을 지원합니다. 모든 추출은
//! 호출자가 지정한 임시 디렉토리 안으로만 이루어지며, path traversal을
//! 시도하는 멤버(`..` 세그먼트, 절대 경로, 드라이브 프리픽스)는 경고 후
//! 건너뜁니다. 디스크에 쓰이는 일은 없습니다.

use std::fs::File;
use std::io::{self, BufReader};
use std::path::{Component, Path, PathBuf};

use tracing::{debug, warn};

use crate::error::IngestError;

/// 지원하는 아카이브 컨테이너 형식
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ArchiveKind {
    /// 비압축 tar
    Tar,
    /// gzip 압축 tar
    TarGz,
    /// bzip2 압축 tar
    TarBz2,
    /// zip
    Zip,
    /// 단독 gzip (tar가 아닌 단일 파일 압축)
    Gzip,
}

impl ArchiveKind {
    /// 파일명 접미사로 아카이브 형식을 판별합니다.
    ///
    /// `.tar.gz`는 `.gz`보다 먼저 검사합니다 (이중 접미사 우선).
    /// 대소문자를 구분하지 않습니다. 아카이브가 아니면 `None`입니다.
    pub fn detect(path: &Path) -> Option<Self> {
        let name = path.file_name()?.to_string_lossy().to_lowercase();
        if name.ends_with(".tar.gz") || name.ends_with(".tgz") {
            Some(Self::TarGz)
        } else if name.ends_with(".tar.bz2") {
            Some(Self::TarBz2)
        } else if name.ends_with(".tar") {
            Some(Self::Tar)
        } else if name.ends_with(".zip") {
            Some(Self::Zip)
        } else if name.ends_with(".gz") {
            Some(Self::Gzip)
        } else {
            None
        }
    }
}

/// 아카이브 멤버 경로가 추출 대상 디렉토리를 벗어나지 않는지 검증합니다.
///
/// # 거부 규칙
/// - `..` 컴포넌트 포함
/// - `/` 또는 `\`로 시작하는 경로 (절대 경로)
/// - Windows 드라이브 프리픽스 (`C:\...`)
/// - 빈 경로
pub fn is_safe_member(member: &str) -> bool {
    if member.is_empty() {
        return false;
    }
    if member.starts_with('/') || member.starts_with('\\') {
        return false;
    }
    // 백슬래시 구분자도 세그먼트로 취급해 검사
    let normalized = member.replace('\\', "/");
    let path = Path::new(&normalized);
    for component in path.components() {
        match component {
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return false,
            Component::Normal(seg) => {
                // "C:" 같은 드라이브 세그먼트는 Unix에서 Normal로 파싱됨
                let seg = seg.to_string_lossy();
                if seg.len() == 2 && seg.ends_with(':') {
                    return false;
                }
            }
            Component::CurDir => {}
        }
    }
    true
}

/// 아카이브를 `dest` 디렉토리로 추출합니다.
///
/// 안전하지 않은 멤버와 개별 멤버의 I/O 실패는 경고 후 건너뛰며,
/// 컨테이너 자체를 열 수 없을 때만 에러를 반환합니다.
/// 추출에 성공한 멤버(파일) 수를 반환합니다.
pub fn extract(archive: &Path, kind: ArchiveKind, dest: &Path) -> Result<usize, IngestError> {
    debug!(archive = %archive.display(), ?kind, dest = %dest.display(), "extracting archive");
    match kind {
        ArchiveKind::Tar => {
            let file = open(archive)?;
            extract_tar(archive, tar::Archive::new(BufReader::new(file)), dest)
        }
        ArchiveKind::TarGz => {
            let file = open(archive)?;
            let decoder = flate2::read::GzDecoder::new(BufReader::new(file));
            extract_tar(archive, tar::Archive::new(decoder), dest)
        }
        ArchiveKind::TarBz2 => {
            let file = open(archive)?;
            let decoder = bzip2::read::BzDecoder::new(BufReader::new(file));
            extract_tar(archive, tar::Archive::new(decoder), dest)
        }
        ArchiveKind::Zip => extract_zip(archive, dest),
        ArchiveKind::Gzip => extract_gzip(archive, dest),
    }
}

fn open(archive: &Path) -> Result<File, IngestError> {
    File::open(archive).map_err(|e| IngestError::Extraction {
        archive: archive.to_path_buf(),
        reason: e.to_string(),
    })
}

fn extract_tar<R: io::Read>(
    archive: &Path,
    mut tar: tar::Archive<R>,
    dest: &Path,
) -> Result<usize, IngestError> {
    let entries = tar.entries().map_err(|e| IngestError::Extraction {
        archive: archive.to_path_buf(),
        reason: e.to_string(),
    })?;

    let mut extracted = 0;
    for entry in entries {
        let mut entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                // 엔트리 헤더가 깨지면 스트림 전체를 더 읽을 수 없음
                return Err(IngestError::Extraction {
                    archive: archive.to_path_buf(),
                    reason: e.to_string(),
                });
            }
        };

        let member = match entry.path() {
            Ok(path) => path.to_string_lossy().into_owned(),
            Err(e) => {
                warn!(archive = %archive.display(), error = %e, "skipping tar member with invalid path");
                continue;
            }
        };

        if !is_safe_member(&member) {
            warn!(
                archive = %archive.display(),
                member = %member,
                "skipping unsafe archive member"
            );
            continue;
        }

        let is_file = entry.header().entry_type().is_file();
        match entry.unpack_in(dest) {
            Ok(true) if is_file => extracted += 1,
            Ok(_) => {}
            Err(e) => {
                warn!(
                    archive = %archive.display(),
                    member = %member,
                    error = %e,
                    "failed to unpack tar member"
                );
            }
        }
    }
    Ok(extracted)
}

fn extract_zip(archive: &Path, dest: &Path) -> Result<usize, IngestError> {
    let file = open(archive)?;
    let mut zip = zip::ZipArchive::new(BufReader::new(file)).map_err(|e| {
        IngestError::Extraction {
            archive: archive.to_path_buf(),
            reason: e.to_string(),
        }
    })?;

    let mut extracted = 0;
    for index in 0..zip.len() {
        let mut member = match zip.by_index(index) {
            Ok(member) => member,
            Err(e) => {
                warn!(archive = %archive.display(), index, error = %e, "failed to read zip member");
                continue;
            }
        };

        let name = member.name().to_owned();
        if !is_safe_member(&name) {
            warn!(
                archive = %archive.display(),
                member = %name,
                "skipping unsafe archive member"
            );
            continue;
        }

        let target = dest.join(name.replace('\\', "/"));
        if member.is_dir() {
            if let Err(e) = std::fs::create_dir_all(&target) {
                warn!(archive = %archive.display(), member = %name, error = %e, "failed to create directory");
            }
            continue;
        }

        if let Some(parent) = target.parent()
            && let Err(e) = std::fs::create_dir_all(parent)
        {
            warn!(archive = %archive.display(), member = %name, error = %e, "failed to create parent directory");
            continue;
        }

        match File::create(&target).and_then(|mut out| io::copy(&mut member, &mut out)) {
            Ok(_) => extracted += 1,
            Err(e) => {
                warn!(archive = %archive.display(), member = %name, error = %e, "failed to unpack zip member");
            }
        }
    }
    Ok(extracted)
}

/// 단독 gzip 파일을 해제합니다.
///
/// 디렉토리 구조가 없으므로 `.gz` 접미사를 제거한 이름의 단일 파일을
/// `dest`에 생성합니다 (`access.log.2.gz` → `access.log.2`).
fn extract_gzip(archive: &Path, dest: &Path) -> Result<usize, IngestError> {
    let file = open(archive)?;
    let mut decoder = flate2::read::GzDecoder::new(BufReader::new(file));

    let target = dest.join(gzip_output_name(archive));
    let mut out = File::create(&target).map_err(|e| IngestError::Extraction {
        archive: archive.to_path_buf(),
        reason: e.to_string(),
    })?;
    io::copy(&mut decoder, &mut out).map_err(|e| IngestError::Extraction {
        archive: archive.to_path_buf(),
        reason: e.to_string(),
    })?;
    Ok(1)
}

/// gzip 해제 결과 파일명 (`.gz` 접미사 제거)
pub fn gzip_output_name(archive: &Path) -> PathBuf {
    let name = archive
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_else(|| "decompressed".to_owned());
    let stripped = name
        .strip_suffix(".gz")
        .or_else(|| name.strip_suffix(".GZ"))
        .unwrap_or(&name);
    PathBuf::from(stripped)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Write;

    #[test]
    fn detect_by_suffix() {
        assert_eq!(ArchiveKind::detect(Path::new("a.tar")), Some(ArchiveKind::Tar));
        assert_eq!(
            ArchiveKind::detect(Path::new("nexus_logs_20250529.tar.gz")),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(
            ArchiveKind::detect(Path::new("a.tar.bz2")),
            Some(ArchiveKind::TarBz2)
        );
        assert_eq!(ArchiveKind::detect(Path::new("a.zip")), Some(ArchiveKind::Zip));
        assert_eq!(
            ArchiveKind::detect(Path::new("access.log.2.gz")),
            Some(ArchiveKind::Gzip)
        );
        assert_eq!(ArchiveKind::detect(Path::new("access.log")), None);
    }

    #[test]
    fn detect_is_case_insensitive() {
        assert_eq!(
            ArchiveKind::detect(Path::new("ARCHIVE.TAR.GZ")),
            Some(ArchiveKind::TarGz)
        );
        assert_eq!(ArchiveKind::detect(Path::new("A.ZIP")), Some(ArchiveKind::Zip));
    }

    #[test]
    fn tar_gz_wins_over_gz() {
        assert_eq!(
            ArchiveKind::detect(Path::new("bundle.tar.gz")),
            Some(ArchiveKind::TarGz)
        );
    }

    #[test]
    fn safe_member_accepts_relative_paths() {
        assert!(is_safe_member("access.log"));
        assert!(is_safe_member("logs/nested/request.log"));
        assert!(is_safe_member("./access.log"));
    }

    #[test]
    fn safe_member_rejects_traversal() {
        assert!(!is_safe_member("../../etc/passwd"));
        assert!(!is_safe_member("logs/../../escape"));
        assert!(!is_safe_member("/etc/passwd"));
        assert!(!is_safe_member("\\windows\\system32"));
        assert!(!is_safe_member("C:\\windows\\system32"));
        assert!(!is_safe_member("c:/temp/x"));
        assert!(!is_safe_member(""));
    }

    #[test]
    fn gzip_output_strips_suffix() {
        assert_eq!(
            gzip_output_name(Path::new("/tmp/access.log.2.gz")),
            PathBuf::from("access.log.2")
        );
        assert_eq!(
            gzip_output_name(Path::new("plain.txt")),
            PathBuf::from("plain.txt")
        );
    }

    #[test]
    fn extract_standalone_gzip() {
        let dir = tempfile::tempdir().unwrap();
        let gz_path = dir.path().join("access.log.1.gz");
        let mut encoder =
            flate2::write::GzEncoder::new(File::create(&gz_path).unwrap(), Default::default());
        encoder.write_all(b"line one\nline two\n").unwrap();
        encoder.finish().unwrap();

        let out_dir = tempfile::tempdir().unwrap();
        let count = extract(&gz_path, ArchiveKind::Gzip, out_dir.path()).unwrap();
        assert_eq!(count, 1);
        let content = std::fs::read_to_string(out_dir.path().join("access.log.1")).unwrap();
        assert_eq!(content, "line one\nline two\n");
    }

    #[test]
    fn extract_tar_with_unsafe_member() {
        let dir = tempfile::tempdir().unwrap();
        let tar_path = dir.path().join("mixed.tar");
        {
            let mut builder = tar::Builder::new(File::create(&tar_path).unwrap());
            let data = b"safe content\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(data.len() as u64);
            header.set_mode(0o644);
            header.set_cksum();
            builder
                .append_data(&mut header, "access.log", &data[..])
                .unwrap();

            let evil = b"evil\n";
            let mut header = tar::Header::new_gnu();
            header.set_size(evil.len() as u64);
            header.set_mode(0o644);
            {
                // tar::Builder는 `..` 경로를 거부하므로 헤더 바이트에 직접 기록
                let name = b"../../etc/passwd";
                header.as_gnu_mut().unwrap().name[..name.len()].copy_from_slice(name);
            }
            header.set_cksum();
            builder.append(&header, &evil[..]).unwrap();
            builder.finish().unwrap();
        }

        let out_dir = tempfile::tempdir().unwrap();
        let count = extract(&tar_path, ArchiveKind::Tar, out_dir.path()).unwrap();
        assert_eq!(count, 1);
        assert!(out_dir.path().join("access.log").exists());
        assert!(!out_dir.path().join("../../etc/passwd").exists());
    }

    #[test]
    fn extract_zip_members() {
        let dir = tempfile::tempdir().unwrap();
        let zip_path = dir.path().join("logs.zip");
        {
            let mut writer = zip::ZipWriter::new(File::create(&zip_path).unwrap());
            let options = zip::write::FileOptions::default();
            writer.start_file("nested/request.log", options).unwrap();
            writer.write_all(b"zip line\n").unwrap();
            writer.finish().unwrap();
        }

        let out_dir = tempfile::tempdir().unwrap();
        let count = extract(&zip_path, ArchiveKind::Zip, out_dir.path()).unwrap();
        assert_eq!(count, 1);
        assert!(out_dir.path().join("nested/request.log").exists());
    }

    #[test]
    fn corrupt_archive_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let bad = dir.path().join("broken.tar.gz");
        std::fs::write(&bad, b"this is not gzip data").unwrap();
        let out_dir = tempfile::tempdir().unwrap();
        let result = extract(&bad, ArchiveKind::TarGz, out_dir.path());
        assert!(result.is_err());
    }
}
