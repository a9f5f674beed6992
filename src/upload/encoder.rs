// Turns a selected file into the text payload the backend accepts

use super::selection::{FileSource, SelectedFile};
use crate::error::{Error, Result};
use base64::{engine::general_purpose, Engine as _};

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedImage {
    pub media_type: &'static str,
    /// Standard base64 of the raw file bytes
    pub data: String,
}

/// Detect an image format from its file signature.
pub fn sniff_media_type(bytes: &[u8]) -> Option<&'static str> {
    if bytes.starts_with(&[0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A]) {
        Some("image/png")
    } else if bytes.starts_with(&[0xFF, 0xD8, 0xFF]) {
        Some("image/jpeg")
    } else if bytes.starts_with(b"GIF87a") || bytes.starts_with(b"GIF89a") {
        Some("image/gif")
    } else if bytes.len() >= 12 && &bytes[0..4] == b"RIFF" && &bytes[8..12] == b"WEBP" {
        Some("image/webp")
    } else if bytes.starts_with(b"BM") && bytes.len() >= 14 {
        Some("image/bmp")
    } else if bytes.starts_with(b"II*\0") || bytes.starts_with(b"MM\0*") {
        Some("image/tiff")
    } else {
        sniff_iso_bmff(bytes)
    }
}

// HEIF family: `ftyp` box at offset 4, major brand right after it
fn sniff_iso_bmff(bytes: &[u8]) -> Option<&'static str> {
    if bytes.len() < 12 || &bytes[4..8] != b"ftyp" {
        return None;
    }

    match &bytes[8..12] {
        b"avif" | b"avis" => Some("image/avif"),
        b"heic" | b"heix" | b"hevc" | b"hevx" | b"heim" | b"heis" => Some("image/heic"),
        b"mif1" | b"msf1" => Some("image/heif"),
        _ => None,
    }
}

/// Read the file and encode it. Files whose content is not a recognised image
/// are refused before any bytes are encoded.
pub async fn encode(file: &SelectedFile) -> Result<EncodedImage> {
    let bytes: std::borrow::Cow<'_, [u8]> = match file.source() {
        FileSource::Path(path) => tokio::fs::read(path).await?.into(),
        FileSource::Bytes(bytes) => (&bytes[..]).into(),
    };

    encode_bytes(file.name(), &bytes)
}

pub fn encode_bytes(name: &str, bytes: &[u8]) -> Result<EncodedImage> {
    let media_type =
        sniff_media_type(bytes).ok_or_else(|| Error::UnsupportedMedia(name.to_string()))?;

    Ok(EncodedImage {
        media_type,
        data: general_purpose::STANDARD.encode(bytes),
    })
}
