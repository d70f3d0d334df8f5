//! Search title cleanup.

use marquee_core::WorkItem;
use regex::Regex;

/// Remove a trailing year token equal to `year`, optionally wrapped in
/// parentheses or brackets.
///
/// The title is returned unchanged when there is no year, the token is not
/// at the end, or stripping would leave nothing.
///
/// # Examples
///
/// ```
/// use marquee_catalog::strip_trailing_year;
///
/// assert_eq!(strip_trailing_year("Sintel 2010", Some("2010")), "Sintel");
/// assert_eq!(strip_trailing_year("Sintel (2010)", Some("2010")), "Sintel");
/// assert_eq!(strip_trailing_year("Sintel [2010]", Some("2010")), "Sintel");
/// assert_eq!(strip_trailing_year("Sintel 2010", Some("2011")), "Sintel 2010");
/// assert_eq!(strip_trailing_year("1917", Some("1917")), "1917");
/// ```
pub fn strip_trailing_year(title: &str, year: Option<&str>) -> String {
    let title = title.trim();
    let Some(year) = year.map(str::trim).filter(|y| !y.is_empty()) else {
        return title.to_string();
    };

    let pattern = format!(r"(?:^|\s+)[(\[]?{}[)\]]?$", regex::escape(year));
    let stripped = match Regex::new(&pattern) {
        Ok(re) => re.replace(title, "").trim().to_string(),
        Err(e) => {
            tracing::warn!(year, error = %e, "Cannot build year pattern");
            return title.to_string();
        }
    };

    if stripped.is_empty() {
        title.to_string()
    } else {
        stripped
    }
}

/// Title to search for: the known original title, else the parsed title,
/// else one derived from the file name, with a trailing year removed.
pub fn search_title(item: &WorkItem) -> Option<String> {
    let attrs = &item.attributes;
    let raw = attrs
        .original_title
        .as_deref()
        .map(str::trim)
        .filter(|t| !t.is_empty())
        .map(str::to_string)
        .or_else(|| {
            attrs
                .title
                .as_deref()
                .map(str::trim)
                .filter(|t| !t.is_empty())
                .map(str::to_string)
        })
        .or_else(|| item.filename_title())?;

    Some(strip_trailing_year(&raw, attrs.year.as_deref()))
}

/// Year usable as a search constraint.
pub(crate) fn search_year(year: Option<&str>) -> Option<&str> {
    year.map(str::trim)
        .filter(|y| y.len() == 4 && y.chars().all(|c| c.is_ascii_digit()))
}
