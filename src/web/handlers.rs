use std::fs;

use actix_multipart::{Field, Multipart};
use actix_web::http::header::{
    self, Charset, ContentDisposition, ContentType, DispositionParam, DispositionType,
    ExtendedValue,
};
use actix_web::web::{self, Data, Form};
use actix_web::HttpResponse;
use futures_util::StreamExt;
use serde::Deserialize;
use tracing::{info, warn};

use crate::core::error::TagError;
use crate::core::{renamer, tagger};
use crate::models::{TagField, TagRecord};
use crate::web::error::WebError;
use crate::web::pages;
use crate::web::state::{stored_name, AppState};

/// Edit form as posted by the browser. Missing inputs count as empty.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct TagForm {
    pub title: String,
    pub artist: String,
    pub lyricist: String,
    pub composer: String,
    pub copyright: String,
    pub comment: String,
}

impl From<TagForm> for TagRecord {
    fn from(form: TagForm) -> Self {
        let mut record = TagRecord::default();
        record.set(TagField::Title, form.title.trim());
        record.set(TagField::Artist, form.artist.trim());
        record.set(TagField::Lyricist, form.lyricist.trim());
        record.set(TagField::Composer, form.composer.trim());
        record.set(TagField::Copyright, form.copyright.trim());
        record.set(TagField::Comment, form.comment.trim());
        record
    }
}

pub async fn index() -> HttpResponse {
    HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::upload_page(None))
}

/// 업로드된 MP3를 새 세션 디렉토리에 저장하고 편집 페이지로 보낸다.
pub async fn upload(state: Data<AppState>, mut payload: Multipart) -> Result<HttpResponse, WebError> {
    while let Some(field) = payload.next().await {
        let mut field = field?;
        if field.name() != Some("file") {
            continue;
        }

        let original = field
            .content_disposition()
            .and_then(|cd| cd.get_filename())
            .unwrap_or_default()
            .to_string();
        if original.is_empty() {
            return Err(WebError::BadUpload("No file selected"));
        }
        if !tagger::has_mp3_extension(std::path::Path::new(&original)) {
            return Err(WebError::BadUpload("Please upload a valid MP3 file"));
        }

        let data = read_field(&mut field, state.max_upload_bytes).await?;
        if !tagger::looks_like_mp3(&data) {
            return Err(WebError::BadUpload("Please upload a valid MP3 file"));
        }

        let (token, dir) = state.create_session()?;
        let path = dir.join(stored_name(&original));
        let size = data.len();
        web::block(move || fs::write(&path, data)).await??;

        info!(token = %token, file = %original, size, "upload accepted");
        return Ok(HttpResponse::SeeOther()
            .insert_header((header::LOCATION, format!("/edit/{}", token)))
            .finish());
    }

    Err(WebError::BadUpload("No file selected"))
}

async fn read_field(field: &mut Field, limit: usize) -> Result<Vec<u8>, WebError> {
    let mut data = Vec::new();
    while let Some(chunk) = field.next().await {
        let chunk = chunk?;
        if data.len() + chunk.len() > limit {
            return Err(WebError::TooLarge(limit));
        }
        data.extend_from_slice(&chunk);
    }
    Ok(data)
}

pub async fn edit_form(
    state: Data<AppState>,
    token: web::Path<String>,
) -> Result<HttpResponse, WebError> {
    let upload = state.find_upload(&token)?;
    let filename = upload.filename();
    let record = web::block(move || tagger::read_record(&upload.path)).await??;

    Ok(HttpResponse::Ok()
        .content_type(ContentType::html())
        .body(pages::edit_page(&token, &filename, &record)))
}

/// 폼 값을 새 파일에 기록해 다운로드로 돌려준다.
/// 성공하면 세션 디렉토리를 지운다. 실패하면 남겨서 다시 시도할 수 있게 한다.
pub async fn save(
    state: Data<AppState>,
    token: web::Path<String>,
    form: Form<TagForm>,
) -> Result<HttpResponse, WebError> {
    let upload = state.find_upload(&token)?;
    let record = TagRecord::from(form.into_inner()).with_save_defaults();
    let filename = renamer::output_filename(&record);

    let output = upload.dir.join(&filename);
    let bytes = web::block(move || -> Result<Vec<u8>, TagError> {
        tagger::write_record(&record, &upload.path, &output)?;
        let bytes = fs::read(&output).map_err(|e| TagError::from_io(&output, e))?;
        if let Err(e) = fs::remove_dir_all(&upload.dir) {
            warn!(dir = %upload.dir.display(), error = %e, "cannot remove upload directory");
        }
        Ok(bytes)
    })
    .await??;

    info!(token = %token, file = %filename, "download ready");
    Ok(HttpResponse::Ok()
        .content_type("audio/mpeg")
        .insert_header(attachment(&filename))
        .body(bytes))
}

fn attachment(filename: &str) -> ContentDisposition {
    ContentDisposition {
        disposition: DispositionType::Attachment,
        parameters: vec![
            DispositionParam::Filename(filename.to_string()),
            DispositionParam::FilenameExt(ExtendedValue {
                charset: Charset::Ext("UTF-8".to_string()),
                language_tag: None,
                value: filename.as_bytes().to_vec(),
            }),
        ],
    }
}
