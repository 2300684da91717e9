//! File-type tag to content-type resolution.

/// Content type used for any tag outside the known table.
pub const OCTET_STREAM: &str = "application/octet-stream";

/// Map a short file-type tag (e.g. "pdf", "MP4", ".jpeg") to its canonical MIME string.
///
/// Lookup is case-insensitive and total: unknown, empty or missing tags resolve to
/// `application/octet-stream`.
pub fn resolve(file_type_tag: &str) -> &'static str {
    let tag = file_type_tag.trim();
    let tag = tag.strip_prefix('.').unwrap_or(tag).to_ascii_lowercase();

    match tag.as_str() {
        "pdf" => "application/pdf",
        "png" => "image/png",
        "jpg" | "jpeg" => "image/jpeg",
        "gif" => "image/gif",
        "webp" => "image/webp",
        "mp4" => "video/mp4",
        "webm" => "video/webm",
        "mp3" => "audio/mpeg",
        "avi" => "video/x-msvideo",
        "mov" => "video/quicktime",
        "mkv" => "video/x-matroska",
        _ => OCTET_STREAM,
    }
}

/// Same as [`resolve`] for an optional tag.
pub fn resolve_opt(file_type_tag: Option<&str>) -> &'static str {
    file_type_tag.map(resolve).unwrap_or(OCTET_STREAM)
}

/// Extract the extension of a file name as a tag ("scan.PDF" -> "PDF").
pub fn tag_from_file_name(file_name: &str) -> Option<&str> {
    std::path::Path::new(file_name)
        .extension()
        .and_then(|ext| ext.to_str())
}
