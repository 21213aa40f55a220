use std::fs::{self, File};
use std::io::{Read, Write};
use std::path::Path;

use id3::frame::Comment;
use id3::{Tag, TagLike, Version};
use tempfile::NamedTempFile;
use tracing::{debug, info, warn};

use crate::core::error::{TagError, TagResult};
use crate::models::{TagField, TagRecord};

const COMMENT_LANG: &str = "eng";

/// MP3 파일의 ID3 태그를 읽어 TagRecord로 변환한다.
/// 태그가 없거나 손상된 경우 기본값만 채운 레코드를 반환한다.
pub fn read_record(path: &Path) -> TagResult<TagRecord> {
    ensure_mp3(path)?;

    let tag = match read_tag(path)? {
        Some(tag) => tag,
        None => return Ok(TagRecord::with_defaults()),
    };

    let defaults = TagRecord::with_defaults();
    let mut record = TagRecord::default();
    for field in TagField::ALL {
        let value = frame_text(&tag, field)
            .filter(|text| !text.trim().is_empty())
            .or_else(|| defaults.get(field));
        record.set(field, value.unwrap_or_default());
    }

    debug!(path = %path.display(), ?record, "read tags");
    Ok(record)
}

/// `source`의 오디오에 TagRecord를 ID3v2.4 태그로 붙여 `dest`에 기록한다.
/// 값이 있는 필드는 덮어쓰고, 비어있는 필드는 프레임을 삭제한다.
/// 기존 태그는 그대로 보존되며, 손상된 경우 빈 태그에서 시작한다.
pub fn write_record(record: &TagRecord, source: &Path, dest: &Path) -> TagResult<()> {
    let audio = fs::read(source).map_err(|e| TagError::from_io(source, e))?;
    let permissions = fs::metadata(source)
        .map_err(|e| TagError::from_io(source, e))?
        .permissions();

    let mut tag = read_tag(source)?.unwrap_or_else(Tag::new);
    apply_record(&mut tag, record);

    let dir = dest
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or_else(|| Path::new("."));
    let mut tmp = NamedTempFile::new_in(dir).map_err(|e| TagError::from_io(dir, e))?;

    tag.write_to(&mut tmp, Version::Id3v24)?;
    tmp.write_all(&audio[audio_offset(&audio)..])
        .map_err(|e| TagError::from_io(dest, e))?;
    fs::set_permissions(tmp.path(), permissions).map_err(|e| TagError::from_io(dest, e))?;
    tmp.persist(dest)
        .map_err(|e| TagError::from_io(dest, e.error))?;

    info!(source = %source.display(), dest = %dest.display(), "wrote tags");
    Ok(())
}

/// 존재 여부, 확장자, 파일 앞부분을 검사해 MP3가 아니면 에러를 반환한다.
pub fn ensure_mp3(path: &Path) -> TagResult<()> {
    if !path.exists() {
        return Err(TagError::NotFound(path.to_path_buf()));
    }
    if !has_mp3_extension(path) {
        return Err(TagError::InvalidFormat(path.to_path_buf()));
    }

    let mut header = Vec::with_capacity(3);
    File::open(path)
        .and_then(|f| f.take(3).read_to_end(&mut header))
        .map_err(|e| TagError::from_io(path, e))?;

    if !looks_like_mp3(&header) {
        return Err(TagError::InvalidFormat(path.to_path_buf()));
    }
    Ok(())
}

/// 확장자가 .mp3인지 확인한다 (대소문자 무시).
pub fn has_mp3_extension(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map(|ext| ext.eq_ignore_ascii_case("mp3"))
        .unwrap_or(false)
}

/// ID3v2 헤더나 MPEG 프레임 싱크로 시작하는지 확인한다.
pub fn looks_like_mp3(header: &[u8]) -> bool {
    header.starts_with(b"ID3") || matches!(header, [0xFF, b, ..] if b & 0xE0 == 0xE0)
}

fn read_tag(path: &Path) -> TagResult<Option<Tag>> {
    match Tag::read_from_path(path) {
        Ok(tag) => Ok(Some(tag)),
        Err(id3::Error {
            kind: id3::ErrorKind::NoTag,
            ..
        }) => {
            debug!(path = %path.display(), "no ID3 tag");
            Ok(None)
        }
        Err(id3::Error {
            kind: id3::ErrorKind::Io(err),
            ..
        }) if err.kind() != std::io::ErrorKind::UnexpectedEof => Err(TagError::from_io(path, err)),
        Err(e) => {
            warn!(path = %path.display(), error = %e, "corrupt ID3 tag, starting from an empty one");
            Ok(None)
        }
    }
}

fn frame_text(tag: &Tag, field: TagField) -> Option<&str> {
    match field {
        TagField::Comment => tag
            .comments()
            .filter(|c| c.description.is_empty())
            .min_by_key(|c| c.lang != COMMENT_LANG)
            .map(|c| c.text.as_str()),
        _ => tag.get(field.frame_id()).and_then(|f| f.content().text()),
    }
}

fn apply_record(tag: &mut Tag, record: &TagRecord) {
    for field in TagField::ALL {
        match (field, record.get(field)) {
            (TagField::Comment, Some(text)) => {
                tag.remove_comment(Some(""), None);
                tag.add_frame(Comment {
                    lang: COMMENT_LANG.to_string(),
                    description: String::new(),
                    text: text.to_string(),
                });
            }
            (TagField::Comment, None) => tag.remove_comment(Some(""), None),
            (_, Some(text)) => tag.set_text(field.frame_id(), text),
            (_, None) => {
                tag.remove(field.frame_id());
            }
        }
    }
}

/// 선행 ID3v2 태그를 건너뛴 오디오 시작 위치.
/// 헤더가 깨져 크기를 믿을 수 없으면 첫 MPEG 프레임 싱크부터 시작한다.
fn audio_offset(data: &[u8]) -> usize {
    if data.len() < 10 || !data.starts_with(b"ID3") {
        return 0;
    }
    let size_bytes = &data[6..10];
    if size_bytes.iter().all(|b| b & 0x80 == 0) {
        let size = size_bytes
            .iter()
            .fold(0usize, |acc, &b| (acc << 7) | b as usize);
        let footer = if data[5] & 0x10 != 0 { 10 } else { 0 };
        let end = 10 + size + footer;
        if end <= data.len() {
            return end;
        }
    }
    next_frame_sync(data, 10)
}

fn next_frame_sync(data: &[u8], from: usize) -> usize {
    data[from..]
        .windows(2)
        .position(|w| w[0] == 0xFF && w[1] & 0xE0 == 0xE0)
        .map(|pos| from + pos)
        .unwrap_or(data.len())
}
