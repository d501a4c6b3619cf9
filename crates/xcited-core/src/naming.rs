//! Filename and display-label derivation.
//!
//! Pure string transforms: no I/O, deterministic.

use std::collections::HashSet;

use unicode_normalization::UnicodeNormalization;

/// Labels longer than this are cut and suffixed with `..`.
pub const LABEL_MAX_CHARS: usize = 50;

/// Slugifies a string for use as a filename stem.
///
/// - Decomposes to NFKD and drops what is left outside ASCII, so accented
///   letters keep their base letter
/// - Keeps alphanumerics, `_`, `-` and whitespace; drops everything else
/// - Lowercases and trims
/// - Collapses runs of whitespace and `-` into a single `-`
pub fn slugify(value: &str) -> String {
    let kept: String = value
        .nfkd()
        .filter(|c| c.is_ascii_alphanumeric() || *c == '_' || *c == '-' || c.is_ascii_whitespace())
        .collect::<String>()
        .trim()
        .to_lowercase();

    let mut out = String::with_capacity(kept.len());
    let mut in_run = false;
    for c in kept.chars() {
        if c == '-' || c.is_whitespace() {
            if !in_run {
                out.push('-');
            }
            in_run = true;
        } else {
            out.push(c);
            in_run = false;
        }
    }
    out
}

/// Filename for a publication PDF: `<year>_<title>` when the year is known, slugified, plus `.pdf`.
pub fn publication_filename(title: &str, pub_year: Option<&str>) -> String {
    let stem = match pub_year {
        Some(year) => format!("{}_{}", year, title),
        None => title.to_string(),
    };
    format!("{}.pdf", slugify(&stem))
}

/// Returns `filename`, or `<stem>-1.<ext>`, `<stem>-2.<ext>`, ... when an
/// earlier call already handed it out. Records the result in `taken`.
pub fn unique_filename(filename: &str, taken: &mut HashSet<String>) -> String {
    if taken.insert(filename.to_string()) {
        return filename.to_string();
    }
    let (stem, ext) = match filename.rfind('.') {
        Some(dot) => filename.split_at(dot),
        None => (filename, ""),
    };
    let mut n = 1usize;
    loop {
        let candidate = format!("{}-{}{}", stem, n, ext);
        if taken.insert(candidate.clone()) {
            return candidate;
        }
        n += 1;
    }
}

/// Progress label for the task at `index`: `"{index}-"` followed by the filename,
/// cut to [`LABEL_MAX_CHARS`] characters plus `..` when longer.
///
/// The positional prefix keeps tasks with identical filenames apart.
pub fn task_label(index: usize, filename: &str) -> String {
    if filename.chars().count() > LABEL_MAX_CHARS {
        let head: String = filename.chars().take(LABEL_MAX_CHARS).collect();
        format!("{}-{}..", index, head)
    } else {
        format!("{}-{}", index, filename)
    }
}
