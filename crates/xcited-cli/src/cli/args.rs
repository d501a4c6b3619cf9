//! Argument value parsers.

use xcited_core::publication::is_author_id;

/// Accepts exactly 12 characters of `[A-Za-z0-9_-]`.
pub(super) fn scholar_id(value: &str) -> Result<String, String> {
    if is_author_id(value) {
        Ok(value.to_string())
    } else {
        Err("the Google Scholar ID is a string of 12 characters corresponding to \
             the value of the 'user' field in the URL of your profile"
            .to_string())
    }
}

pub(super) fn positive_integer(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(n) if n > 0 => Ok(n),
        _ => Err(format!("{} is an invalid positive int value", value)),
    }
}
