//! Sequential `{prefix}-{n}` identifiers.
//!
//! The prefix is taken from the first member of the collection and the number is one past
//! the largest numeric suffix present. Callers must hold the store's write gate while
//! computing and inserting, otherwise two writers can observe the same maximum.

pub const GENERIC_ID_PREFIX: &str = "item";

const SEPARATOR: char = '-';

pub trait Identified {
    fn id(&self) -> &str;
}

/// Next identifier after `ids`, falling back to `default_prefix` when there are none.
pub fn next_id<'a, I>(ids: I, default_prefix: &str) -> String
where
    I: IntoIterator<Item = &'a str>,
{
    let mut ids = ids.into_iter().peekable();
    let prefix = ids
        .peek()
        .copied()
        .and_then(|id| id.split(SEPARATOR).next())
        .filter(|prefix| !prefix.is_empty())
        .unwrap_or(default_prefix)
        .to_string();

    let max = ids.map(numeric_suffix).max().unwrap_or(0);

    format!("{prefix}{SEPARATOR}{}", max.saturating_add(1))
}

/// Leading digits of the second segment; anything unparseable counts as zero.
fn numeric_suffix(id: &str) -> u64 {
    let Some(segment) = id.split(SEPARATOR).nth(1) else {
        return 0;
    };
    let digits: String = segment.chars().take_while(char::is_ascii_digit).collect();
    digits.parse().unwrap_or(0)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn increments_past_the_largest_suffix() {
        assert_eq!(next_id(["product-3", "product-7"], "product"), "product-8");
    }

    #[test]
    fn empty_collection_uses_default_prefix() {
        let none: [&str; 0] = [];
        assert_eq!(next_id(none, GENERIC_ID_PREFIX), "item-1");
        assert_eq!(next_id(none, "order"), "order-1");
    }

    #[test]
    fn prefix_comes_from_first_member() {
        assert_eq!(next_id(["sku-2", "product-9"], "product"), "sku-10");
    }

    #[test]
    fn malformed_ids_degrade_to_zero() {
        let ids = ["legacy", "product-x", "product-"];
        assert_eq!(next_id(ids, "product"), "legacy-1");
    }

    #[test]
    fn trailing_garbage_after_digits_is_ignored() {
        assert_eq!(next_id(["order-12abc", "order-4"], "order"), "order-13");
    }
}
