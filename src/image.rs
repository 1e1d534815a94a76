// Image encoder: reads an image from disk, sniffs its content type from the
// leading bytes and turns it into a `data:` URI suitable for the JSON body.

use crate::error::EncodeError;
use ::image::ImageFormat;
use base64::{engine::general_purpose::STANDARD, Engine as _};
use serde::{Serialize, Serializer};
use std::fmt;
use std::path::Path;

/// Only the first 512 bytes are considered when sniffing.
const SNIFF_LEN: usize = 512;

/// The two image kinds the verification service accepts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageMime {
    Jpeg,
    Png,
}

impl ImageMime {
    pub fn as_str(&self) -> &'static str {
        match self {
            ImageMime::Jpeg => "image/jpeg",
            ImageMime::Png => "image/png",
        }
    }

    fn from_sniffed(mime: &str) -> Option<Self> {
        match mime {
            "image/jpeg" => Some(ImageMime::Jpeg),
            "image/png" => Some(ImageMime::Png),
            _ => None,
        }
    }
}

/// A base64 payload tagged with its MIME type. Serializes as the full
/// `data:<mime>;base64,<payload>` string.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    mime: ImageMime,
    payload: String,
}

impl EncodedImage {
    pub fn from_bytes(data: &[u8], mime: ImageMime) -> Self {
        EncodedImage {
            mime,
            payload: STANDARD.encode(data),
        }
    }

    pub fn mime(&self) -> ImageMime {
        self.mime
    }

    pub fn payload(&self) -> &str {
        &self.payload
    }
}

impl fmt::Display for EncodedImage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "data:{};base64,{}", self.mime.as_str(), self.payload)
    }
}

impl Serialize for EncodedImage {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Read `path` and encode it, rejecting anything that is not JPEG or PNG.
pub fn encode_file(path: &Path) -> Result<EncodedImage, EncodeError> {
    let data = std::fs::read(path).map_err(|source| EncodeError::FileRead {
        path: path.to_path_buf(),
        source,
    })?;

    let sniffed = detect_content_type(&data);
    let mime = ImageMime::from_sniffed(sniffed).ok_or_else(|| EncodeError::UnsupportedFormat {
        mime: sniffed.to_string(),
        path: path.to_path_buf(),
    })?;

    Ok(EncodedImage::from_bytes(&data, mime))
}

/// Tags recognised as HTML when followed by a space or `>`. Matched without
/// regard to ASCII case after leading whitespace.
const HTML_TAGS: &[&[u8]] = &[
    b"<!DOCTYPE HTML",
    b"<HTML",
    b"<HEAD",
    b"<SCRIPT",
    b"<IFRAME",
    b"<H1",
    b"<DIV",
    b"<FONT",
    b"<TABLE",
    b"<A",
    b"<STYLE",
    b"<TITLE",
    b"<B",
    b"<BODY",
    b"<BR",
    b"<P",
    b"<!--",
];

/// Exact prefixes for the non-image kinds and the text byte-order marks.
const SIGNATURES: &[(&[u8], &str)] = &[
    (b"%PDF-", "application/pdf"),
    (b"%!PS-Adobe-", "application/postscript"),
    (b"\xFE\xFF", "text/plain; charset=utf-16be"),
    (b"\xFF\xFE", "text/plain; charset=utf-16le"),
    (b"\xEF\xBB\xBF", "text/plain; charset=utf-8"),
    (b"\x00\x00\x02\x00", "image/x-icon"),
    (b"\x1F\x8B\x08", "application/x-gzip"),
    (b"PK\x03\x04", "application/zip"),
];

/// Best-effort content type of `data`, always returning something.
pub fn detect_content_type(data: &[u8]) -> &'static str {
    let head = &data[..data.len().min(SNIFF_LEN)];

    let trimmed = match head.iter().position(|b| !b" \t\n\x0C\r".contains(b)) {
        Some(start) => &head[start..],
        None => &[][..],
    };
    if HTML_TAGS.iter().any(|tag| is_html_tag(trimmed, tag)) {
        return "text/html; charset=utf-8";
    }
    if trimmed.starts_with(b"<?xml") {
        return "text/xml; charset=utf-8";
    }

    if let Some((_, mime)) = SIGNATURES.iter().find(|(sig, _)| head.starts_with(sig)) {
        return *mime;
    }
    if let Some(mime) = image_mime(head) {
        return mime;
    }

    if head.iter().any(|&b| is_binary_byte(b)) {
        "application/octet-stream"
    } else {
        "text/plain; charset=utf-8"
    }
}

/// Image kinds worth naming in an error. Other formats the decoder knows
/// about (PNM, TIFF, ...) fall through to the text/binary check.
fn image_mime(head: &[u8]) -> Option<&'static str> {
    let mime = match ::image::guess_format(head).ok()? {
        ImageFormat::Jpeg => "image/jpeg",
        ImageFormat::Png => "image/png",
        ImageFormat::Gif => "image/gif",
        ImageFormat::Bmp => "image/bmp",
        ImageFormat::WebP => "image/webp",
        ImageFormat::Ico => "image/x-icon",
        _ => return None,
    };
    Some(mime)
}

fn is_html_tag(data: &[u8], tag: &[u8]) -> bool {
    data.len() > tag.len()
        && data[..tag.len()].eq_ignore_ascii_case(tag)
        && matches!(data[tag.len()], b' ' | b'>')
}

fn is_binary_byte(b: u8) -> bool {
    matches!(b, 0x00..=0x08 | 0x0B | 0x0E..=0x1A | 0x1C..=0x1F)
}
