//! MIME classification for generated assets.

use crate::request::ContentType;

pub const MIME_IMAGE_PNG: &str = "image/png";
pub const MIME_VIDEO_MP4: &str = "video/mp4";
pub const MIME_AUDIO_WAV: &str = "audio/wav";
pub const MIME_AUDIO_MPEG: &str = "audio/mpeg";
pub const MIME_AUDIO_OGG: &str = "audio/ogg";

/// Audio extensions checked in order; the first one found in the URL wins.
const AUDIO_EXTENSIONS: &[(&str, &str)] = &[
    (".wav", MIME_AUDIO_WAV),
    (".mp3", MIME_AUDIO_MPEG),
    (".ogg", MIME_AUDIO_OGG),
];

/// Classify the MIME type of an asset from its content type and URL.
///
/// Images and videos have a fixed type. Audio is sniffed from the URL's
/// extension and falls back to `audio/mpeg`.
pub fn classify_mime(content_type: ContentType, url: &str) -> &'static str {
    match content_type {
        ContentType::Image => MIME_IMAGE_PNG,
        ContentType::Video => MIME_VIDEO_MP4,
        ContentType::Audio => {
            let lower = url.to_ascii_lowercase();
            AUDIO_EXTENSIONS
                .iter()
                .find(|(ext, _)| lower.contains(ext))
                .map(|(_, mime)| *mime)
                .unwrap_or(MIME_AUDIO_MPEG)
        }
    }
}
