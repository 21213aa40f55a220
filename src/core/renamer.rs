use std::path::{Path, PathBuf};

use crate::models::{TagField, TagRecord, ORGANIZATION};

const UNTITLED: &str = "Untitled";

/// 파일명에 사용할 수 없는 문자를 `_`로 치환한다.
/// 플랫폼과 무관하게 같은 결과를 내도록 Windows 기준 금지 문자를 모두 치환한다.
pub fn sanitize_filename(s: &str) -> String {
    let replaced: String = s
        .chars()
        .map(|c| {
            if matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|') || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect();
    replaced.trim().trim_end_matches('.').trim_end().to_string()
}

/// `"{title} ©️ {organization}.mp3"` 형식의 파일명을 생성한다.
/// 제목이 비어있으면 "Untitled"를 사용한다.
pub fn derive_filename(title: &str, organization: &str) -> String {
    let title = sanitize_filename(title);
    let title = if title.is_empty() { UNTITLED } else { title.as_str() };
    format!(
        "{} \u{00A9}\u{FE0F} {}.mp3",
        title,
        sanitize_filename(organization)
    )
}

/// TagRecord의 제목으로 출력 파일명을 만든다.
pub fn output_filename(record: &TagRecord) -> String {
    derive_filename(record.display(TagField::Title), ORGANIZATION)
}

/// 원본 파일과 같은 디렉토리에 놓일 출력 경로.
pub fn output_path(source: &Path, record: &TagRecord) -> PathBuf {
    let dir = source.parent().unwrap_or_else(|| Path::new("."));
    dir.join(output_filename(record))
}
