//! Work item intake.

use marquee_core::WorkItem;
use marquee_error::{JsonError, MarqueeResult};
use serde::Deserialize;

#[derive(Deserialize)]
#[serde(untagged)]
enum Intake {
    Many(Vec<WorkItem>),
    One(WorkItem),
}

/// Parse work items from JSON holding either one item or an array of items.
///
/// # Examples
///
/// ```
/// use marquee::parse_work_items;
///
/// let one = parse_work_items(r#"{"content_ref": "a1", "path": "x.mkv"}"#).unwrap();
/// assert_eq!(one.len(), 1);
///
/// let many = parse_work_items(r#"[{"content_ref": "a1", "path": "x.mkv"},
///                                 {"content_ref": "a2", "path": "y.mkv"}]"#).unwrap();
/// assert_eq!(many[1].content_ref, "a2");
/// ```
///
/// # Errors
///
/// Returns a JSON error when the input is neither shape.
pub fn parse_work_items(json: &str) -> MarqueeResult<Vec<WorkItem>> {
    let intake: Intake = serde_json::from_str(json).map_err(JsonError::from)?;
    Ok(match intake {
        Intake::Many(items) => items,
        Intake::One(item) => vec![item],
    })
}
