//! Filename construction and sanitization for downloaded artifacts

/// Longest filename most filesystems accept, in bytes
const MAX_FILENAME_BYTES: usize = 255;

const RESERVED_NAMES: &[&str] = &[
    "CON", "PRN", "AUX", "NUL", "COM1", "COM2", "COM3", "COM4", "COM5", "COM6", "COM7", "COM8",
    "COM9", "LPT1", "LPT2", "LPT3", "LPT4", "LPT5", "LPT6", "LPT7", "LPT8", "LPT9",
];

/// Builds the filename of a book text: `"{id} {title}.txt"`
pub fn text_filename(book_id: &str, title: &str) -> String {
    with_extension(&format!("{} {}", book_id, title), ".txt")
}

/// Builds the filename of a cover image: `"{id} {basename}"`
///
/// The basename's extension is kept when a long name is truncated.
pub fn image_filename(book_id: &str, image_basename: &str) -> String {
    let (stem, extension) = match image_basename.rfind('.') {
        Some(dot) if dot > 0 => image_basename.split_at(dot),
        _ => (image_basename, ""),
    };
    with_extension(&format!("{} {}", book_id, stem), extension)
}

/// Sanitizes `stem` within the bytes left over by `extension`, then appends it
fn with_extension(stem: &str, extension: &str) -> String {
    let extension = remove_invalid_chars(extension);
    let budget = MAX_FILENAME_BYTES.saturating_sub(extension.len());
    format!("{}{}", sanitize_to(stem, budget), extension)
}

fn remove_invalid_chars(name: &str) -> String {
    name.chars()
        .filter(|c| !matches!(c, '/' | '\\' | ':' | '*' | '?' | '"' | '<' | '>' | '|'))
        .filter(|c| !c.is_control())
        .collect()
}

/// Sanitizes a filename for filesystem safety.
///
/// Removes characters that are invalid on common filesystems
/// (`/ \ : * ? " < > |` and control characters), trims surrounding
/// whitespace and trailing dots, and truncates to 255 bytes without
/// splitting a character.
pub fn sanitize_filename(name: &str) -> String {
    sanitize_to(name, MAX_FILENAME_BYTES)
}

fn sanitize_to(name: &str, max_bytes: usize) -> String {
    let cleaned = remove_invalid_chars(name);

    let mut cleaned = truncate_to_bytes(cleaned.trim(), max_bytes)
        .trim_end_matches(|c: char| c == '.' || c.is_whitespace())
        .to_string();

    if cleaned.is_empty() {
        return "_".to_string();
    }

    let stem = cleaned.split('.').next().unwrap_or_default();
    if RESERVED_NAMES
        .iter()
        .any(|reserved| reserved.eq_ignore_ascii_case(stem))
    {
        let stem_len = stem.len();
        cleaned.insert(stem_len, '_');
    }

    cleaned
}

fn truncate_to_bytes(value: &str, max: usize) -> &str {
    if value.len() <= max {
        return value;
    }
    let mut end = max;
    while !value.is_char_boundary(end) {
        end -= 1;
    }
    &value[..end]
}
