//! Slug validation for product lookup keys.
//!
//! Slugs are supplied by the caller rather than derived, so the only job here is to make
//! sure a slug already is what `slug::slugify` would produce: lowercase ASCII letters and
//! digits separated by single hyphens.

use slug::slugify;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum SlugError {
    #[error("slug must not be empty")]
    Empty,
    #[error("slug `{input}` is not URL safe; try `{suggestion}`")]
    NotUrlSafe { input: String, suggestion: String },
}

/// Accept `input` only when it is already in canonical slug form.
pub fn ensure_url_safe(input: &str) -> Result<(), SlugError> {
    if input.trim().is_empty() {
        return Err(SlugError::Empty);
    }

    let canonical = slugify(input);
    if canonical == input {
        Ok(())
    } else {
        Err(SlugError::NotUrlSafe {
            input: input.to_string(),
            suggestion: canonical,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_canonical_slugs() {
        assert_eq!(ensure_url_safe("eggs"), Ok(()));
        assert_eq!(ensure_url_safe("organic-farm-eggs-30"), Ok(()));
    }

    #[test]
    fn rejects_blank_input() {
        assert_eq!(ensure_url_safe("  "), Err(SlugError::Empty));
    }

    #[test]
    fn suggests_a_canonical_form() {
        let err = ensure_url_safe("Fresh Eggs").unwrap_err();
        assert_eq!(
            err,
            SlugError::NotUrlSafe {
                input: "Fresh Eggs".to_string(),
                suggestion: "fresh-eggs".to_string(),
            }
        );
    }
}
