//! Image MIME detection from magic bytes.
//!
//! Telegram hands out photos without a reliable extension, so the vision engine
//! labels the data URL from the leading bytes instead.

/// Detect an image MIME type from its leading bytes. Defaults to JPEG, which is
/// what Telegram re-encodes photos to.
pub fn sniff_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => "image/png",
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        [b'B', b'M', ..] => "image/bmp",
        [b'I', b'I', 0x2A, 0x00, ..] | [b'M', b'M', 0x00, 0x2A, ..] => "image/tiff",
        _ => "image/jpeg",
    }
}
