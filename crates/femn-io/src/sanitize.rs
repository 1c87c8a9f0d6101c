//! Filename/title sanitization (§4.6, §8): replace the filesystem-forbidden
//! characters `<>:"/\|?*` with a single placeholder, leaving everything
//! else untouched. Idempotent by construction since the placeholder itself
//! is not one of the forbidden characters.

const FORBIDDEN: &[char] = &['<', '>', ':', '"', '/', '\\', '|', '?', '*'];
const PLACEHOLDER: char = '_';

pub fn sanitize_title(title: &str) -> String {
    title.chars().map(|c| if FORBIDDEN.contains(&c) { PLACEHOLDER } else { c }).collect()
}
