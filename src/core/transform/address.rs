//! Street address decomposition
//!
//! Splits a single free-form street line into two structured lines using a
//! positional heuristic keyed only on the number of whitespace-separated
//! tokens. There is no general solution; token counts outside 3..=6 yield a
//! placeholder that downstream consumers use to detect bad rows, so the text of
//! that placeholder must not change.

use super::fields::clean;

/// Country code appended to every decomposed address
pub const DEFAULT_COUNTRY: &str = "US";

/// Street address split into the six trailing patient columns
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructuredAddress {
    pub line1: String,
    pub line2: String,
    pub city: String,
    pub state: String,
    pub postal: String,
    pub country: &'static str,
}

impl StructuredAddress {
    /// Column values in header order (line1, line2, city, state, postal, country)
    pub fn into_fields(self) -> [String; 6] {
        [
            self.line1,
            self.line2,
            self.city,
            self.state,
            self.postal,
            self.country.to_string(),
        ]
    }
}

/// Decomposes a street line into address lines plus locality fields
///
/// | tokens | line 1       | line 2     |
/// |--------|--------------|------------|
/// | 3      | all three    | empty      |
/// | 4      | all four     | empty      |
/// | 5      | first three  | last two   |
/// | 6      | first four   | last two   |
/// | other  | placeholder  | empty      |
///
/// # Examples
///
/// ```
/// use tabula::core::transform::address::split_address;
///
/// let address = split_address("100 Main St", "Springfield", "IL", "62704");
/// assert_eq!(address.line1, "100 Main St");
/// assert_eq!(address.line2, "");
/// assert_eq!(address.country, "US");
/// ```
pub fn split_address(street: &str, city: &str, state: &str, postal: &str) -> StructuredAddress {
    let tokens: Vec<String> = street.split_whitespace().map(|token| clean(token)).collect();

    let (line1, line2) = match tokens.len() {
        3 | 4 => (tokens.join(" "), String::new()),
        5 => (tokens[..3].join(" "), tokens[3..].join(" ")),
        6 => (tokens[..4].join(" "), tokens[4..].join(" ")),
        count => (placeholder(count), String::new()),
    };

    StructuredAddress {
        line1,
        line2,
        city: clean(city),
        state: clean(state),
        postal: clean(postal),
        country: DEFAULT_COUNTRY,
    }
}

fn placeholder(token_count: usize) -> String {
    format!(" address contained{token_count} elements")
}
