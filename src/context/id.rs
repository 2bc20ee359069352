//! Context identifier generation.

use chrono::Utc;

const SUFFIX_LEN: usize = 6;

/// Generate a context id of the form `<type>-<unix-millis>-<random suffix>`.
pub fn generate_context_id(context_type: &str) -> String {
    let suffix: String = uuid::Uuid::new_v4()
        .simple()
        .to_string()
        .chars()
        .take(SUFFIX_LEN)
        .collect();
    format!("{}-{}-{}", context_type, Utc::now().timestamp_millis(), suffix)
}

/// Placeholder used for a missing `name` or `id` in path templates: `<type>-<unix-millis>`.
pub fn fallback_label(context_type: &str) -> String {
    format!("{}-{}", context_type, Utc::now().timestamp_millis())
}
