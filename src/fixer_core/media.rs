use std::path::Path;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MediaType {
    Image,
    Video,
}

/// Image file extensions (lowercase).
pub const IMAGE_EXTENSIONS: &[&str] = &[
    "jpg", "jpeg", "png", "gif", "bmp", "tiff", "tif", "webp", "heic", "heif", "avif",
    // RAW formats
    "raw", "cr2", "cr3", "nef", "orf", "arw", "dng", "sr2", "raf", "rw2", "pef",
];

/// Video file extensions (lowercase).
pub const VIDEO_EXTENSIONS: &[&str] = &[
    "mp4", "mov", "m4v", "avi", "mkv", "webm", "mts", "m2ts", "3gp", "wmv", "flv",
];

/// Detect media type from a file path by its extension.
pub fn detect_media_type(path: &Path) -> Option<MediaType> {
    let ext = path.extension()?.to_str()?.to_lowercase();

    if IMAGE_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MediaType::Image);
    }

    if VIDEO_EXTENSIONS.contains(&ext.as_str()) {
        return Some(MediaType::Video);
    }

    None
}

/// Check whether a file is a photo or video the tagging step cares about.
pub fn is_media(path: &Path) -> bool {
    detect_media_type(path).is_some()
}

/// Every known media extension, images first.
pub fn all_extensions() -> impl Iterator<Item = &'static str> {
    IMAGE_EXTENSIONS.iter().chain(VIDEO_EXTENSIONS).copied()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_image_extensions() {
        assert_eq!(detect_media_type(Path::new("photo.jpg")), Some(MediaType::Image));
        assert_eq!(detect_media_type(Path::new("photo.HEIC")), Some(MediaType::Image));
        assert_eq!(detect_media_type(Path::new("photo.DNG")), Some(MediaType::Image));
    }

    #[test]
    fn test_detect_video_extensions() {
        assert_eq!(detect_media_type(Path::new("video.mp4")), Some(MediaType::Video));
        assert_eq!(detect_media_type(Path::new("video.MOV")), Some(MediaType::Video));
        assert_eq!(detect_media_type(Path::new("clip.3gp")), Some(MediaType::Video));
    }

    #[test]
    fn test_sidecars_are_not_media() {
        assert!(!is_media(Path::new("IMG_0001.jpg.supplemental-metadata.json")));
        assert!(!is_media(Path::new("metadata.json")));
        assert!(!is_media(Path::new("no_extension")));
    }
}
