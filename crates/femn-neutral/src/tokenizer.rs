//! Field splitting for one FEMAP Neutral record line.
//!
//! FEMAP Neutral records are free-form: fields are separated either by commas
//! (with an optional trailing comma) or by runs of whitespace. A line never
//! mixes the two conventions, so the tokenizer only needs to pick one.

/// Sentinel FEMAP uses in place of an empty text field.
pub const NULL_SENTINEL: &str = "<NULL>";

/// Split one record line into fields.
///
/// Trailing commas and surrounding whitespace are trimmed first. If a comma
/// remains in what's left, the line is comma-delimited and empty fragments
/// are dropped; otherwise the line is split on whitespace runs.
pub fn split_record(line: &str) -> Vec<String> {
    let trimmed = line.trim().trim_end_matches(',').trim_end();

    if trimmed.contains(',') {
        trimmed
            .split(',')
            .map(str::trim)
            .filter(|field| !field.is_empty())
            .map(str::to_string)
            .collect()
    } else {
        trimmed.split_whitespace().map(str::to_string).collect()
    }
}

/// Replace the FEMAP empty-text sentinel with an actual empty string.
pub fn normalize_null(field: &str) -> String {
    if field == NULL_SENTINEL {
        String::new()
    } else {
        field.to_string()
    }
}
