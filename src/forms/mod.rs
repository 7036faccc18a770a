use std::io::{self, Read, Seek};

use actix_multipart::form::tempfile::TempFile;

use crate::image_store::UploadedImage;

pub mod categories;
pub mod products;

/// Read an uploaded temp file into memory.
///
/// Browsers submit an untouched file input as a part with an empty file name
/// and no content; such parts yield `None`.
pub fn read_upload(upload: TempFile) -> io::Result<Option<UploadedImage>> {
    let TempFile {
        mut file,
        content_type,
        file_name,
        size,
    } = upload;

    let file_name = file_name.filter(|name| !name.trim().is_empty());
    if file_name.is_none() && size == 0 {
        return Ok(None);
    }

    let mut data = Vec::with_capacity(size);
    file.rewind()?;
    file.read_to_end(&mut data)?;

    Ok(Some(UploadedImage::new(
        file_name,
        content_type.map(|mime| mime.to_string()),
        data,
    )))
}

/// Collapse runs of whitespace into single spaces and drop control characters.
fn sanitize_inline_text(input: &str) -> String {
    let mut sanitized = String::with_capacity(input.len());
    let mut previous_whitespace = false;

    for ch in input.trim().chars() {
        if ch.is_whitespace() {
            if !previous_whitespace {
                sanitized.push(' ');
                previous_whitespace = true;
            }
        } else if ch.is_control() {
            continue;
        } else {
            sanitized.push(ch);
            previous_whitespace = false;
        }
    }

    sanitized
}

fn sanitize_multiline_text(input: &str) -> String {
    let mut lines: Vec<String> = input.lines().map(sanitize_inline_text).collect();

    while matches!(lines.first(), Some(line) if line.is_empty()) {
        lines.remove(0);
    }

    while matches!(lines.last(), Some(line) if line.is_empty()) {
        lines.pop();
    }

    let mut result = Vec::with_capacity(lines.len());
    let mut previous_empty = false;
    for line in lines {
        if line.is_empty() {
            if previous_empty {
                continue;
            }
            previous_empty = true;
            result.push(String::new());
        } else {
            previous_empty = false;
            result.push(line);
        }
    }

    result.join("\n")
}
