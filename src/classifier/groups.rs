use serde::Serialize;

/// A selectable produce type and the checkpoint classes that describe it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ProduceGroup {
    pub key: &'static str,
    pub category: &'static str,
    pub fresh_label: &'static str,
    pub rotten_label: &'static str,
}

const fn group(
    key: &'static str,
    category: &'static str,
    fresh_label: &'static str,
    rotten_label: &'static str,
) -> ProduceGroup {
    ProduceGroup {
        key,
        category,
        fresh_label,
        rotten_label,
    }
}

// Label strings must match the checkpoint's id2label verbatim,
// "Bittergroud" included.
pub const PRODUCE_GROUPS: [ProduceGroup; 9] = [
    group("apple", "fruit", "Fresh Apple(s)", "Rotten Apple(s)"),
    group("banana", "fruit", "Fresh Banana(s)", "Rotten Banana(s)"),
    group(
        "bittergourd",
        "vegetable",
        "Fresh Bittergroud(s)",
        "Rotten Bittergroud(s)",
    ),
    group(
        "capsicum",
        "vegetable",
        "Fresh Capsicum(s)",
        "Rotten Capsicum(s)",
    ),
    group(
        "cucumber",
        "vegetable",
        "Fresh Cucumber(s)",
        "Rotten Cucumber(s)",
    ),
    group("okra", "vegetable", "Fresh Okra(s)", "Rotten Okra(s)"),
    group("orange", "fruit", "Fresh Orange(s)", "Rotten Orange(s)"),
    group("potato", "vegetable", "Fresh Potato(s)", "Rotten Potato(s)"),
    group("tomato", "fruit", "Fresh Tomato(s)", "Rotten Tomato(s)"),
];

/// Looks up a group by key, ignoring case and surrounding whitespace.
#[must_use]
pub fn find_group(key: &str) -> Option<&'static ProduceGroup> {
    let key = key.trim();
    PRODUCE_GROUPS
        .iter()
        .find(|g| g.key.eq_ignore_ascii_case(key))
}
