use actix_multipart::MultipartError;
use actix_web::error::BlockingError;
use actix_web::http::header::ContentType;
use actix_web::http::StatusCode;
use actix_web::{HttpResponse, ResponseError};
use thiserror::Error;
use tracing::{error, warn};

use crate::core::error::TagError;
use crate::web::pages;

#[derive(Error, Debug)]
pub enum WebError {
    #[error("{0}")]
    BadUpload(&'static str),

    #[error("File is larger than {}", human_size(.0))]
    TooLarge(usize),

    #[error("Session expired. Please upload the file again.")]
    SessionExpired,

    #[error(transparent)]
    Tag(#[from] TagError),

    #[error("Upload: {0}")]
    Multipart(#[from] MultipartError),

    #[error("IO: {0}")]
    Io(#[from] std::io::Error),

    #[error("worker pool is gone")]
    Blocking(#[from] BlockingError),
}

const MIB: usize = 1024 * 1024;

fn human_size(bytes: &usize) -> String {
    let bytes = *bytes;
    if bytes < MIB {
        format!("{} bytes", bytes)
    } else {
        format!("{} MB", bytes.div_ceil(MIB))
    }
}

impl WebError {
    /// 사용자에게 보여줄 메시지. 서버 경로는 노출하지 않는다.
    fn user_message(&self) -> String {
        match self {
            WebError::Tag(TagError::NotFound(_)) => {
                "File not found. Please upload the file again.".to_string()
            }
            WebError::Tag(TagError::InvalidFormat(_)) => "Please upload a valid MP3 file".to_string(),
            WebError::Tag(TagError::PermissionDenied(_)) => {
                "Error creating file: permission denied".to_string()
            }
            WebError::Tag(_) | WebError::Io(_) | WebError::Blocking(_) => {
                "Error creating file".to_string()
            }
            other => other.to_string(),
        }
    }

    fn shows_upload_form(&self) -> bool {
        matches!(
            self,
            WebError::BadUpload(_)
                | WebError::TooLarge(_)
                | WebError::Multipart(_)
                | WebError::Tag(TagError::InvalidFormat(_))
        )
    }
}

impl ResponseError for WebError {
    fn status_code(&self) -> StatusCode {
        match self {
            WebError::BadUpload(_) | WebError::Multipart(_) => StatusCode::BAD_REQUEST,
            WebError::TooLarge(_) => StatusCode::PAYLOAD_TOO_LARGE,
            WebError::SessionExpired => StatusCode::NOT_FOUND,
            WebError::Tag(TagError::NotFound(_)) => StatusCode::NOT_FOUND,
            WebError::Tag(TagError::InvalidFormat(_)) => StatusCode::BAD_REQUEST,
            WebError::Tag(_) | WebError::Io(_) | WebError::Blocking(_) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        }
    }

    fn error_response(&self) -> HttpResponse {
        let status = self.status_code();
        if status.is_server_error() {
            error!(error = %self, "request failed");
        } else {
            warn!(error = %self, status = status.as_u16(), "request rejected");
        }

        let message = self.user_message();
        let body = if self.shows_upload_form() {
            pages::upload_page(Some(&message))
        } else {
            pages::error_page(status, &message)
        };
        HttpResponse::build(status)
            .content_type(ContentType::html())
            .body(body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;

    #[test]
    fn test_status_codes() {
        assert_eq!(
            WebError::Tag(TagError::NotFound(PathBuf::from("x.mp3"))).status_code(),
            StatusCode::NOT_FOUND
        );
        assert_eq!(
            WebError::Tag(TagError::InvalidFormat(PathBuf::from("x.txt"))).status_code(),
            StatusCode::BAD_REQUEST
        );
        assert_eq!(
            WebError::Tag(TagError::PermissionDenied(PathBuf::from("/ro"))).status_code(),
            StatusCode::INTERNAL_SERVER_ERROR
        );
        assert_eq!(WebError::TooLarge(1).status_code(), StatusCode::PAYLOAD_TOO_LARGE);
        assert_eq!(WebError::SessionExpired.status_code(), StatusCode::NOT_FOUND);
    }

    #[test]
    fn test_user_message_hides_paths() {
        let err = WebError::Tag(TagError::InvalidFormat(PathBuf::from("/tmp/secret/x.mp3")));
        assert!(!err.user_message().contains("/tmp/secret"));
    }

    #[test]
    fn test_too_large_message() {
        assert_eq!(
            WebError::TooLarge(50 * 1024 * 1024).to_string(),
            "File is larger than 50 MB"
        );
        assert_eq!(WebError::TooLarge(64).to_string(), "File is larger than 64 bytes");
        assert_eq!(
            WebError::TooLarge(MIB + 1).to_string(),
            "File is larger than 2 MB"
        );
    }
}
