//! MIME type detection module
//!
//! Maps a file's extension to the Content-Type sent with it.

use std::path::Path;

/// Content-Type for a path, by its extension (case-insensitive)
///
/// # Examples
/// ```
/// use asset_server::http::mime::content_type_for;
/// assert_eq!(content_type_for("js/app.3f2a.js"), "text/javascript; charset=utf-8");
/// assert_eq!(content_type_for("index.HTML"), "text/html; charset=utf-8");
/// assert_eq!(content_type_for("LICENSE"), "application/octet-stream");
/// ```
pub fn content_type_for(path: impl AsRef<Path>) -> &'static str {
    let extension = path
        .as_ref()
        .extension()
        .and_then(|e| e.to_str())
        .map(str::to_ascii_lowercase);
    lookup(extension.as_deref())
}

fn lookup(extension: Option<&str>) -> &'static str {
    match extension {
        // Documents and scripts
        Some("html" | "htm") => "text/html; charset=utf-8",
        Some("css") => "text/css; charset=utf-8",
        Some("js" | "mjs") => "text/javascript; charset=utf-8",
        Some("json" | "map") => "application/json",
        Some("webmanifest") => "application/manifest+json",
        Some("txt") => "text/plain; charset=utf-8",
        Some("xml") => "application/xml",
        Some("wasm") => "application/wasm",

        // Images
        Some("png") => "image/png",
        Some("jpg" | "jpeg") => "image/jpeg",
        Some("gif") => "image/gif",
        Some("svg") => "image/svg+xml",
        Some("ico") => "image/x-icon",
        Some("webp") => "image/webp",

        // Fonts
        Some("woff") => "font/woff",
        Some("woff2") => "font/woff2",
        Some("ttf") => "font/ttf",
        Some("otf") => "font/otf",
        Some("eot") => "application/vnd.ms-fontobject",

        _ => "application/octet-stream",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_asset_types() {
        assert_eq!(content_type_for("index.html"), "text/html; charset=utf-8");
        assert_eq!(content_type_for("css/app.css"), "text/css; charset=utf-8");
        assert_eq!(content_type_for("fonts/fa.woff2"), "font/woff2");
        assert_eq!(content_type_for("images/logo.PNG"), "image/png");
        assert_eq!(content_type_for("js/app.js.map"), "application/json");
    }

    #[test]
    fn test_unknown_extension() {
        assert_eq!(content_type_for("archive.xyz"), "application/octet-stream");
        assert_eq!(content_type_for("Makefile"), "application/octet-stream");
    }
}
