/// Canonical form of a collection name: trimmed, lower-cased, with a trailing
/// " Collection" suffix removed. Two names refer to the same collection iff
/// their normalized forms are equal.
pub fn normalize_collection_name(name: &str) -> String {
    let lowered = name.trim().to_lowercase();
    let stripped = lowered
        .strip_suffix(" collection")
        .unwrap_or(lowered.as_str());
    stripped.trim_end().to_string()
}
