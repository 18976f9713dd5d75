//! Field resolution over nested content records.
//!
//! A [`FieldPath`] is walked through a [`FieldValue`] one segment at a time:
//!
//! ```text
//! path: content.body
//!
//! { content: [ { body: "# Hi" }, { body: "ignored" } ] }
//!     └─ map: take "content"
//!          └─ list: unwrap first element, path unchanged
//!               └─ map: take "body"  →  "# Hi"
//! ```
//!
//! Lists are transparently unwrapped one level without consuming a segment,
//! and only their first element is ever consulted. Every failure mode
//! (missing key, scalar in the middle of a path, empty list) degrades to
//! `None`. Callers treat `None` as "leave this section out", never as an
//! error.

use crate::types::{ContentNode, FieldPath, FieldValue, Scalar};

/// Resolve `path` against `value`.
///
/// - Empty path: the value itself.
/// - Null: returned as-is, whatever the path.
/// - List: resolve against the first element with the same path.
/// - Map: look up the head segment and recurse with the tail.
/// - Any other scalar with segments left: absent.
pub fn resolve<'a>(value: &'a FieldValue, path: &[String]) -> Option<&'a FieldValue> {
    let Some((head, tail)) = path.split_first() else {
        return Some(value);
    };
    match value {
        FieldValue::Scalar(Scalar::Null) => Some(value),
        FieldValue::List(items) => resolve(items.first()?, path),
        FieldValue::Map(map) => resolve(map.get(head)?, tail),
        FieldValue::Scalar(_) => None,
    }
}

impl ContentNode {
    /// Resolve a dotted path starting at this node's fields.
    ///
    /// A node is not itself a [`FieldValue`], so an empty path is absent.
    pub fn resolve(&self, path: &FieldPath) -> Option<&FieldValue> {
        let (head, tail) = path.segments().split_first()?;
        resolve(self.fields.get(head)?, tail)
    }
}

/// Render a resolved value as body text.
///
/// Strings pass through; numbers and booleans use their display form.
/// Null, lists and maps have no text form and are absent.
pub fn body_text(value: &FieldValue) -> Option<String> {
    match value {
        FieldValue::Scalar(Scalar::String(s)) => Some(s.clone()),
        FieldValue::Scalar(Scalar::Integer(n)) => Some(n.to_string()),
        FieldValue::Scalar(Scalar::Float(n)) => Some(n.to_string()),
        FieldValue::Scalar(Scalar::Bool(b)) => Some(b.to_string()),
        FieldValue::Scalar(Scalar::Null) | FieldValue::List(_) | FieldValue::Map(_) => None,
    }
}
