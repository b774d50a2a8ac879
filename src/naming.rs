//! Output filename derivation.
//!
//! The optimized file is named after the upload:
//! `optimized-` + source name with its last extension removed + `.` + output extension.
//!
//! - `holiday.png` → WebP → `optimized-holiday.webp`
//! - `archive.tar.gz` → JPEG → `optimized-archive.tar.jpg`
//! - `README` → AVIF → `optimized-README.avif`

/// Prefix prepended to every suggested filename.
pub const OUTPUT_PREFIX: &str = "optimized-";

/// Remove the final `.ext` from a name.
///
/// Only a dot followed by at least one character, none of them `/` or `.`,
/// counts as an extension:
/// - `"photo.jpeg"` → `"photo"`
/// - `"a.b.c"` → `"a.b"`
/// - `"trailing."` → `"trailing."`
/// - `"dir.d/file"` → `"dir.d/file"`
/// - `".hidden"` → `""`
pub fn strip_extension(name: &str) -> &str {
    match name.rfind('.') {
        Some(dot) => {
            let ext = &name[dot + 1..];
            if ext.is_empty() || ext.contains('/') {
                name
            } else {
                &name[..dot]
            }
        }
        None => name,
    }
}

/// `optimized-<stem>.<extension>`
pub fn suggested_filename(source_filename: &str, extension: &str) -> String {
    format!(
        "{OUTPUT_PREFIX}{}.{extension}",
        strip_extension(source_filename)
    )
}

/// `Content-Disposition` header value that makes a browser save the output
/// under `filename`.
pub fn content_disposition(filename: &str) -> String {
    let escaped = filename.replace('\\', "\\\\").replace('"', "\\\"");
    format!("attachment; filename=\"{escaped}\"")
}
