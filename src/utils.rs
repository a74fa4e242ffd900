use std::path::Path;

/// Characters that may not appear in a title used as a file name
pub const FORBIDDEN_TITLE_CHARS: &[char] = &[' ', '*', '"', '/', '\\', '<', '>', ':', '|', '(', ')', ','];

/// Convert a document title to a safe file name stem
///
/// Every forbidden character and every control character is replaced by a
/// single `_`, so the result has the same number of characters as the input
/// and never contains a path separator.
pub fn sanitize_title(title: &str) -> String {
    title
        .chars()
        .map(|c| {
            if FORBIDDEN_TITLE_CHARS.contains(&c) || c.is_control() {
                '_'
            } else {
                c
            }
        })
        .collect()
}

/// Page index encoded in an image file name (`12.jpg` -> 12)
pub fn page_index_from_path(path: &Path) -> Option<usize> {
    path.file_stem()?.to_str()?.parse().ok()
}
