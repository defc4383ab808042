use serde_json::Value;

/// Resolves a dotted path (`"episodes.watched"`) against a serialized stats
/// value, yielding the numeric leaf if one exists.
///
/// Returns `None` for a missing key, a non-object intermediate, or a
/// non-numeric leaf. Never panics; progress display degrades to 0% instead.
pub fn resolve(value: &Value, path: &str) -> Option<f64> {
    let mut current = value;
    for segment in path.split('.') {
        current = current.as_object()?.get(segment)?;
    }
    current.as_f64()
}
