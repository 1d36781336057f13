//! Blob keys for uploaded day assets: `{date}_{title}[_hd].{ext}`.

use chrono::NaiveDate;
use potd_model::day_key;
use url::Url;

const MAX_TITLE_LEN: usize = 50;
const DEFAULT_EXTENSION: &str = "jpg";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BlobVariant {
    Standard,
    HighDef,
}

/// Lower-case, collapse every non-alphanumeric run into `_`, trim, truncate.
pub fn sanitize_title(title: &str) -> String {
    let mut out = String::with_capacity(title.len());
    let mut pending_sep = false;
    for ch in title.chars() {
        if ch.is_ascii_alphanumeric() {
            if pending_sep && !out.is_empty() {
                out.push('_');
            }
            pending_sep = false;
            out.push(ch.to_ascii_lowercase());
        } else {
            pending_sep = true;
        }
    }
    out.truncate(MAX_TITLE_LEN);
    let trimmed = out.trim_end_matches('_');
    if trimmed.is_empty() {
        "untitled".to_string()
    } else {
        trimmed.to_string()
    }
}

/// File extension of the URL's last path segment, or `jpg`.
pub fn extension_from_url(raw: &str) -> String {
    Url::parse(raw)
        .ok()
        .and_then(|url| {
            let segment = url.path_segments()?.next_back()?.to_string();
            let (_, ext) = segment.rsplit_once('.')?;
            let ext = ext.to_ascii_lowercase();
            (!ext.is_empty()
                && ext.len() <= 5
                && ext.chars().all(|c| c.is_ascii_alphanumeric()))
            .then_some(ext)
        })
        .unwrap_or_else(|| DEFAULT_EXTENSION.to_string())
}

pub fn content_type_for(ext: &str) -> &'static str {
    match ext {
        "jpg" | "jpeg" => "image/jpeg",
        "png" => "image/png",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "tif" | "tiff" => "image/tiff",
        "bmp" => "image/bmp",
        _ => "application/octet-stream",
    }
}

pub fn blob_key(
    date: NaiveDate,
    title: &str,
    source_url: &str,
    variant: BlobVariant,
) -> String {
    let suffix = match variant {
        BlobVariant::Standard => "",
        BlobVariant::HighDef => "_hd",
    };
    format!(
        "{}_{}{}.{}",
        day_key(date),
        sanitize_title(title),
        suffix,
        extension_from_url(source_url)
    )
}
