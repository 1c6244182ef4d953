//! Image transport helpers: media type sniffing and base64 encoding.

use base64::Engine as _;

/// Detect an image media type from magic bytes. Unknown data is sent as JPEG.
pub fn detect_image_mime(bytes: &[u8]) -> &'static str {
    match bytes {
        [0xFF, 0xD8, 0xFF, ..] => "image/jpeg",
        [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A, ..] => "image/png",
        [b'G', b'I', b'F', b'8', ..] => "image/gif",
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => "image/webp",
        _ => "image/jpeg",
    }
}

pub fn encode_base64(bytes: &[u8]) -> String {
    base64::engine::general_purpose::STANDARD.encode(bytes)
}

/// `data:` URL carrying the image inline.
pub fn image_data_url(bytes: &[u8]) -> String {
    format!("data:{};base64,{}", detect_image_mime(bytes), encode_base64(bytes))
}
