use unicode_normalization::UnicodeNormalization;

use crate::config::CategoryTable;
use crate::models::CategoryTag;

fn fold(s: &str) -> String {
    s.nfc().collect::<String>().to_lowercase()
}

/// Static keyword lookup over a fixed category table.
pub struct CategoryMatcher {
    table: Vec<(CategoryTag, Vec<String>)>, // keywords pre-folded
}

impl CategoryMatcher {
    pub fn new(table: &CategoryTable) -> Self {
        let table = table
            .iter()
            .map(|(tag, kws)| (*tag, kws.iter().map(|k| fold(k)).collect()))
            .collect();
        Self { table }
    }

    /// Categories whose keywords occur as case-insensitive substrings, in table order.
    /// A category is reported once no matter how many of its keywords occur.
    pub fn categorize(&self, text: &str) -> Vec<CategoryTag> {
        if text.is_empty() {
            return Vec::new();
        }
        let lowered = fold(text);
        self.table
            .iter()
            .filter(|(_, kws)| kws.iter().any(|k| !k.is_empty() && lowered.contains(k.as_str())))
            .map(|(tag, _)| *tag)
            .collect()
    }
}
