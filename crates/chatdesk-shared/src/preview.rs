//! Which files the side panel can render as a text preview.

/// Extensions of binary or opaque formats the preview pane never opens.
pub const NON_PREVIEWABLE_EXTENSIONS: &[&str] = &[
    // images
    "png", "jpg", "jpeg", "gif", "bmp", "ico", "webp", "svg", "avif",
    // video
    "mp4", "mov", "avi", "mkv", "webm", "flv", "wmv",
    // audio
    "mp3", "wav", "ogg", "flac", "aac", "wma",
    // archives
    "zip", "tar", "gz", "rar", "7z", "bz2",
    // documents
    "pdf", "doc", "docx", "xls", "xlsx", "ppt", "pptx",
    // executables and images
    "exe", "dll", "so", "dylib", "bin", "dmg", "iso",
    // fonts
    "woff", "woff2", "ttf", "otf", "eot",
];

/// Lower-cased text after the last `.` of the path, or the whole path when
/// there is no dot.
fn extension(path: &str) -> String {
    path.rsplit('.').next().unwrap_or_default().to_ascii_lowercase()
}

pub fn is_previewable(path: &str) -> bool {
    let ext = extension(path);
    !NON_PREVIEWABLE_EXTENSIONS.contains(&ext.as_str())
}
