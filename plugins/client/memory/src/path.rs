use serde_json::{Map, Value};
use thiserror::Error;

/// A field path that cannot be written without discarding data.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PathError {
    #[error("index {index} is past the end of an array of length {len}")]
    IndexOutOfRange { index: usize, len: usize },

    #[error("segment '{segment}' is not an array index")]
    NotAnIndex { segment: String },
}

/// Split a field path into segments. `a.b[0].c` and `a.b.0.c` are equivalent.
fn segments(path: &str) -> Vec<&str> {
    path.split(['.', '[', ']'])
        .filter(|s| !s.is_empty())
        .collect()
}

/// Get a nested value using a field path. `None` if any segment is missing.
pub fn get_path<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut current = root;
    for segment in segments(path) {
        current = match current {
            Value::Object(map) => map.get(segment)?,
            Value::Array(items) => items.get(segment.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(current)
}

/// Write `value` at `path` inside `root`.
///
/// Missing intermediate containers are created: an array when the next
/// segment is numeric, an object otherwise. Scalars in the way are replaced.
/// An empty path replaces `root` itself.
///
/// Arrays grow by at most one element per write: an index equal to the
/// length appends, a larger one is rejected, and so is a non-numeric segment
/// on an array. `root` may be partly modified when an error is returned.
pub fn set_path(root: &mut Value, path: &str, value: Value) -> Result<(), PathError> {
    assign(root, &segments(path), value)
}

fn assign(target: &mut Value, segments: &[&str], value: Value) -> Result<(), PathError> {
    let Some((head, rest)) = segments.split_first() else {
        *target = value;
        return Ok(());
    };
    let index = head.parse::<usize>().ok();

    let slot = match (target, index) {
        (Value::Array(items), Some(i)) => {
            if i > items.len() {
                return Err(PathError::IndexOutOfRange {
                    index: i,
                    len: items.len(),
                });
            }
            if i == items.len() {
                items.push(Value::Null);
            }
            &mut items[i]
        }
        (Value::Array(_), None) => {
            return Err(PathError::NotAnIndex {
                segment: head.to_string(),
            });
        }
        (Value::Object(map), _) => map.entry(head.to_string()).or_insert(Value::Null),
        (other, _) => {
            *other = if index.is_some() {
                Value::Array(Vec::new())
            } else {
                Value::Object(Map::new())
            };
            return assign(other, segments, value);
        }
    };
    assign(slot, rest, value)
}
