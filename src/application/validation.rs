//! Field checks shared by the mutation services. Messages are client-facing.

pub fn missing(field: &str) -> String {
    format!("Missing required field: {field}")
}

/// Present and non-blank, returned trimmed.
pub fn require_text(value: Option<String>, field: &str) -> Result<String, String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
        .ok_or_else(|| missing(field))
}

pub fn require<T>(value: Option<T>, field: &str) -> Result<T, String> {
    value.ok_or_else(|| missing(field))
}

pub fn non_negative(value: i64, field: &str) -> Result<i64, String> {
    if value < 0 {
        Err(format!("Field {field} must not be negative"))
    } else {
        Ok(value)
    }
}

/// Deliberately loose: one `@` with something on both sides and a dot in the domain.
pub fn looks_like_email(value: &str) -> bool {
    match value.split_once('@') {
        Some((local, domain)) => {
            !local.is_empty()
                && !domain.contains('@')
                && domain.contains('.')
                && !domain.starts_with('.')
                && !domain.ends_with('.')
        }
        None => false,
    }
}

/// Blank optional text collapses to `None`.
pub fn optional_text(value: Option<String>) -> Option<String> {
    value
        .map(|value| value.trim().to_string())
        .filter(|value| !value.is_empty())
}
