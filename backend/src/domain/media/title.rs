//! Human-friendly photo titles derived from upload filenames.

/// Title used when a fresh upload carries no usable filename.
pub const UNTITLED_PHOTO: &str = "Untitled Photo";
/// Title used for assets that were already stored remotely.
pub const EXISTING_PHOTO: &str = "Photo";

/// Upper-case the first character of a word and lower-case the rest.
fn capitalise(word: &str) -> String {
    let mut chars = word.chars();
    chars.next().map_or_else(String::new, |first| {
        first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect()
    })
}

/// Derive a display title from a filename.
///
/// Drops any directory prefix and the extension, turns `_` and `-` into
/// spaces, and capitalises each whitespace-separated word.
///
/// # Examples
/// ```
/// use lightbox::domain::media::title_from_filename;
///
/// assert_eq!(title_from_filename(Some("my_cool-photo.jpg")), "My Cool Photo");
/// assert_eq!(title_from_filename(None), "Untitled Photo");
/// ```
pub fn title_from_filename(filename: Option<&str>) -> String {
    let Some(filename) = filename else {
        return UNTITLED_PHOTO.to_owned();
    };

    let base = filename.rsplit(['/', '\\']).next().unwrap_or(filename);
    let stem = match base.rsplit_once('.') {
        Some((stem, _)) if !stem.is_empty() => stem,
        _ => base,
    };

    let title = stem
        .replace(['_', '-'], " ")
        .split_whitespace()
        .map(capitalise)
        .collect::<Vec<_>>()
        .join(" ");

    if title.is_empty() {
        UNTITLED_PHOTO.to_owned()
    } else {
        title
    }
}
