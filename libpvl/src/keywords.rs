//! Flat keyword table: dotted paths to the text of each value.

use indexmap::IndexMap;
use tracing::trace;

/// Keyword table keyed by dotted path (`"IsisCube.Core.Format"`).
///
/// Keys are unique. A later keyword at the same path replaces the earlier
/// text but keeps its place in label order.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Keywords {
    entries: IndexMap<String, String>,
}

impl Keywords {
    pub fn new() -> Self {
        Self::default()
    }

    pub(crate) fn upsert(&mut self, path: String, text: String) {
        if let Some(previous) = self.entries.insert(path, text) {
            trace!(%previous, "keyword overwritten");
        }
    }

    pub(crate) fn clear(&mut self) {
        self.entries.clear();
    }

    /// Text stored at `path`.
    pub fn get(&self, path: &str) -> Option<&str> {
        self.entries.get(path).map(String::as_str)
    }

    /// Text stored at `path`, or `default`.
    pub fn get_or<'a>(&'a self, path: &str, default: &'a str) -> &'a str {
        self.get(path).unwrap_or(default)
    }

    /// The `index`-th (1-based) element of a list value.
    ///
    /// Only values whose text starts with `(` are lists here. Nested
    /// brackets are flattened, so `((1,2),(3,4))` has four elements.
    /// Commas inside double quotes do not split.
    pub fn get_sub(&self, path: &str, index: usize) -> Option<String> {
        let text = self.get(path)?;
        if !text.starts_with('(') || index == 0 {
            return None;
        }
        split_list_text(text).into_iter().nth(index - 1)
    }

    /// `(path, text)` pairs in label order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// Split list text on brackets and commas, dropping empty pieces.
fn split_list_text(text: &str) -> Vec<String> {
    let mut items = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;

    let mut flush = |current: &mut String| {
        let item = current.trim();
        if !item.is_empty() {
            items.push(item.to_string());
        }
        current.clear();
    };

    for c in text.chars() {
        match c {
            '"' => {
                in_quotes = !in_quotes;
                current.push(c);
            }
            '(' | ')' | '{' | '}' | ',' if !in_quotes => flush(&mut current),
            _ => current.push(c),
        }
    }
    flush(&mut current);
    items
}
