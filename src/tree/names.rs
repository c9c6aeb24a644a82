//! Display-name resolution for tree nodes.

/// Resolves display names for nature codes.
///
/// The chain, highest priority first:
/// 1. an explicit label supplied with the code,
/// 2. a mother-level description whose code equals the target or shares its trailing 3 characters,
/// 3. a leaf description matched the same way,
/// 4. `"Item <code>"`.
///
/// Steps 1-3 skip labels that are blank or purely numeric. The trailing-3 match can pick up an
/// unrelated code that happens to share the suffix; that is how the ledger's sub-category codes are
/// matched and is kept as is.
#[derive(Debug, Default)]
pub(super) struct NameResolver<'a> {
    mothers: Vec<(&'a str, &'a str)>,
    leaves: Vec<(&'a str, &'a str)>,
}

impl<'a> NameResolver<'a> {
    /// `mothers` and `leaves` are `(code, description)` pairs searched by steps 2 and 3.
    pub(super) fn new(
        mothers: impl IntoIterator<Item = (&'a str, &'a str)>,
        leaves: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) -> Self {
        Self {
            mothers: mothers.into_iter().collect(),
            leaves: leaves.into_iter().collect(),
        }
    }

    pub(super) fn resolve(&self, code: &str, explicit: Option<&str>) -> String {
        if let Some(label) = explicit.filter(|l| is_usable(l)) {
            return label.trim().to_string();
        }
        search(&self.mothers, code)
            .or_else(|| search(&self.leaves, code))
            .map(|label| label.trim().to_string())
            .unwrap_or_else(|| format!("Item {code}"))
    }
}

fn search<'a>(candidates: &[(&'a str, &'a str)], code: &str) -> Option<&'a str> {
    candidates
        .iter()
        .find(|(candidate, label)| is_usable(label) && codes_match(candidate, code))
        .map(|(_, label)| *label)
}

/// A label is usable if it has some non-digit content.
fn is_usable(label: &str) -> bool {
    let trimmed = label.trim();
    !trimmed.is_empty() && !trimmed.chars().all(|c| c.is_ascii_digit())
}

/// Codes match when equal, or when both have at least 3 characters and the last 3 agree.
fn codes_match(candidate: &str, target: &str) -> bool {
    if candidate == target {
        return true;
    }
    match (last3(candidate), last3(target)) {
        (Some(a), Some(b)) => a == b,
        _ => false,
    }
}

fn last3(code: &str) -> Option<&str> {
    let len = code.chars().count();
    if len < 3 {
        return None;
    }
    code.char_indices().nth(len - 3).map(|(ix, _)| &code[ix..])
}
