use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use std::time::Duration;

use tracing::{debug, warn};

use crate::core::tagger;
use crate::web::error::WebError;

const SESSION_PREFIX: &str = "upload-";

/// 저장되지 않은 업로드가 남아있는 최대 시간
const SESSION_TTL: Duration = Duration::from_secs(60 * 60);

/// Shared by all workers. Only the upload root is shared; every
/// upload/edit/download cycle lives in its own directory below it.
pub struct AppState {
    pub uploads: PathBuf,
    pub max_upload_bytes: usize,
}

/// An uploaded file waiting to be edited.
#[derive(Debug)]
pub struct Upload {
    pub dir: PathBuf,
    pub path: PathBuf,
}

impl Upload {
    pub fn filename(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

impl AppState {
    pub fn new(uploads: PathBuf, max_upload_bytes: usize) -> Self {
        AppState {
            uploads,
            max_upload_bytes,
        }
    }

    /// 새 업로드 디렉토리를 만들고 (토큰, 경로)를 반환한다.
    /// 만들기 전에 오래된 세션을 정리한다.
    pub fn create_session(&self) -> io::Result<(String, PathBuf)> {
        self.sweep_stale(SESSION_TTL);
        let dir = tempfile::Builder::new()
            .prefix(SESSION_PREFIX)
            .tempdir_in(&self.uploads)?
            .keep();
        let token = dir
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok((token, dir))
    }

    /// 토큰에 해당하는 업로드 파일을 찾는다.
    /// 형식이 맞지 않거나 이미 정리된 토큰이면 SessionExpired.
    pub fn find_upload(&self, token: &str) -> Result<Upload, WebError> {
        if !is_valid_token(token) {
            return Err(WebError::SessionExpired);
        }
        let dir = self.uploads.join(token);
        let path = fs::read_dir(&dir)
            .map_err(|_| WebError::SessionExpired)?
            .filter_map(|entry| entry.ok())
            .map(|entry| entry.path())
            .find(|path| path.is_file() && tagger::has_mp3_extension(path))
            .ok_or(WebError::SessionExpired)?;
        Ok(Upload { dir, path })
    }

    /// `max_age`보다 오래된 세션 디렉토리를 지우고 지운 개수를 반환한다.
    pub fn sweep_stale(&self, max_age: Duration) -> usize {
        let entries = match fs::read_dir(&self.uploads) {
            Ok(entries) => entries,
            Err(e) => {
                warn!(dir = %self.uploads.display(), error = %e, "cannot list upload directory");
                return 0;
            }
        };

        let mut removed = 0;
        for entry in entries.filter_map(|entry| entry.ok()) {
            let name = entry.file_name();
            if !name.to_str().is_some_and(is_valid_token) {
                continue;
            }
            let stale = entry
                .metadata()
                .and_then(|meta| meta.modified())
                .ok()
                .and_then(|modified| modified.elapsed().ok())
                .is_some_and(|age| age >= max_age);
            if !stale {
                continue;
            }
            match fs::remove_dir_all(entry.path()) {
                Ok(()) => removed += 1,
                Err(e) => warn!(dir = %entry.path().display(), error = %e, "cannot remove stale upload"),
            }
        }

        if removed > 0 {
            debug!(removed, "swept stale uploads");
        }
        removed
    }
}

fn is_valid_token(token: &str) -> bool {
    token
        .strip_prefix(SESSION_PREFIX)
        .is_some_and(|rest| !rest.is_empty() && rest.chars().all(|c| c.is_ascii_alphanumeric()))
}

/// 업로드된 파일명을 디렉토리 안에 저장할 안전한 이름으로 바꾼다.
pub fn stored_name(original: &str) -> String {
    let base = Path::new(original)
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let name = crate::core::renamer::sanitize_filename(&base);
    if name.is_empty() || !tagger::has_mp3_extension(Path::new(&name)) {
        "upload.mp3".to_string()
    } else {
        name
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_session_round_trip() {
        let root = TempDir::new().unwrap();
        let state = AppState::new(root.path().to_path_buf(), 1024);

        let (token, dir) = state.create_session().unwrap();
        assert!(token.starts_with(SESSION_PREFIX));
        assert!(dir.is_dir());

        fs::write(dir.join("song.mp3"), b"ID3").unwrap();
        let upload = state.find_upload(&token).unwrap();
        assert_eq!(upload.filename(), "song.mp3");
        assert_eq!(upload.dir, dir);
    }

    #[test]
    fn test_find_upload_rejects_bad_tokens() {
        let root = TempDir::new().unwrap();
        let state = AppState::new(root.path().to_path_buf(), 1024);

        for token in ["", "upload-", "../etc", "upload-..", "other-abc"] {
            assert!(matches!(state.find_upload(token), Err(WebError::SessionExpired)));
        }
    }

    #[test]
    fn test_find_upload_missing_directory() {
        let root = TempDir::new().unwrap();
        let state = AppState::new(root.path().to_path_buf(), 1024);
        assert!(matches!(
            state.find_upload("upload-abc123"),
            Err(WebError::SessionExpired)
        ));
    }

    #[test]
    fn test_sweep_stale_removes_old_sessions_only() {
        let root = TempDir::new().unwrap();
        let state = AppState::new(root.path().to_path_buf(), 1024);
        let (token, dir) = state.create_session().unwrap();
        fs::write(dir.join("song.mp3"), b"ID3").unwrap();
        fs::create_dir(root.path().join("keep-me")).unwrap();

        assert_eq!(state.sweep_stale(Duration::from_secs(60 * 60)), 0);
        assert!(state.find_upload(&token).is_ok());

        assert_eq!(state.sweep_stale(Duration::ZERO), 1);
        assert!(matches!(state.find_upload(&token), Err(WebError::SessionExpired)));
        assert!(root.path().join("keep-me").is_dir());
    }

    #[test]
    fn test_stored_name() {
        assert_eq!(stored_name("HV 19.mp3"), "HV 19.mp3");
        assert_eq!(stored_name("../../etc/passwd.mp3"), "passwd.mp3");
        assert_eq!(stored_name("a:b?.MP3"), "a_b_.MP3");
        assert_eq!(stored_name(""), "upload.mp3");
    }
}
