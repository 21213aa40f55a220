use actix_web::http::StatusCode;

use crate::models::{TagField, TagRecord};

const STYLE: &str = "body{font-family:sans-serif;max-width:40rem;margin:2rem auto;padding:0 1rem}\
label{display:block;margin-top:.8rem;font-weight:bold}\
input[type=text]{width:100%;padding:.4rem;box-sizing:border-box}\
button{margin-top:1.2rem;padding:.5rem 1.2rem}\
.message{background:#fde8e8;border:1px solid #f5a3a3;padding:.6rem}";

fn layout(title: &str, body: &str) -> String {
    format!(
        "<!DOCTYPE html>\n<html lang=\"en\">\n<head>\n<meta charset=\"utf-8\">\n\
         <title>{}</title>\n<style>{}</style>\n</head>\n<body>\n{}\n</body>\n</html>\n",
        escape(title),
        STYLE,
        body
    )
}

fn message_block(message: Option<&str>) -> String {
    message
        .map(|m| format!("<p class=\"message\">{}</p>\n", escape(m)))
        .unwrap_or_default()
}

pub fn upload_page(message: Option<&str>) -> String {
    let body = format!(
        "<h1>MP3 Tag Editor</h1>\n{}\
         <form method=\"post\" action=\"/\" enctype=\"multipart/form-data\">\n\
         <label for=\"file\">MP3 file</label>\n\
         <input type=\"file\" id=\"file\" name=\"file\" accept=\".mp3,audio/mpeg\" required>\n\
         <button type=\"submit\">Upload</button>\n\
         </form>",
        message_block(message)
    );
    layout("MP3 Tag Editor", &body)
}

pub fn edit_page(token: &str, filename: &str, record: &TagRecord) -> String {
    let fields: String = TagField::ALL
        .into_iter()
        .map(|field| {
            format!(
                "<label for=\"{key}\">{label}</label>\n\
                 <input type=\"text\" id=\"{key}\" name=\"{key}\" value=\"{value}\">\n",
                key = field.key(),
                label = escape(field.label()),
                value = escape(record.display(field)),
            )
        })
        .collect();

    let body = format!(
        "<h1>Edit tags</h1>\n<p>File: <strong>{}</strong></p>\n\
         <form method=\"post\" action=\"/edit/{}\">\n{}\
         <button type=\"submit\">Save and download</button>\n\
         </form>\n<p><a href=\"/\">Upload another file</a></p>",
        escape(filename),
        escape(token),
        fields
    );
    layout("Edit tags", &body)
}

pub fn error_page(status: StatusCode, message: &str) -> String {
    let body = format!(
        "<h1>{}</h1>\n{}<p><a href=\"/\">Back to upload</a></p>",
        status.as_u16(),
        message_block(Some(message))
    );
    layout("Error", &body)
}

/// HTML 특수문자 이스케이프
pub fn escape(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => out.push_str("&amp;"),
            '<' => out.push_str("&lt;"),
            '>' => out.push_str("&gt;"),
            '"' => out.push_str("&quot;"),
            '\'' => out.push_str("&#39;"),
            _ => out.push(c),
        }
    }
    out
}
