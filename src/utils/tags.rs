pub const MAX_TAGS: usize = 10;

/// Trim, lowercase, drop empties, dedupe keeping the first occurrence and cap
/// the list at [`MAX_TAGS`]. Idempotent, so it is safe to run on values that
/// were already normalized when they were stored.
pub fn normalize_tags(tags: &[String]) -> Vec<String> {
    let mut seen = std::collections::HashSet::new();
    tags.iter()
        .map(|tag| tag.trim().to_lowercase())
        .filter(|tag| !tag.is_empty())
        .filter(|tag| seen.insert(tag.clone()))
        .take(MAX_TAGS)
        .collect()
}
