use std::cmp::Ordering;

/// Locale-style string ordering for segment names.
///
/// Case-insensitive first; among names equal ignoring case, lowercase sorts
/// before uppercase at the first differing position, then code point order.
pub fn locale_cmp(a: &str, b: &str) -> Ordering {
    let folded = a
        .chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase));
    folded
        .then_with(|| case_order(a, b))
        .then_with(|| a.cmp(b))
}

fn case_order(a: &str, b: &str) -> Ordering {
    for (ca, cb) in a.chars().zip(b.chars()) {
        if ca == cb {
            continue;
        }
        if ca.is_lowercase() && cb.is_uppercase() {
            return Ordering::Less;
        }
        if ca.is_uppercase() && cb.is_lowercase() {
            return Ordering::Greater;
        }
        return Ordering::Equal;
    }
    Ordering::Equal
}
