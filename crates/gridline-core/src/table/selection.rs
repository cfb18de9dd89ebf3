// ── Row selection ──

use std::collections::HashSet;

/// Ids of the currently checked rows.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Selection {
    ids: HashSet<String>,
}

impl Selection {
    /// Replace the selection with `page_ids`, or clear it.
    pub fn select_all<'a>(&mut self, page_ids: impl IntoIterator<Item = &'a str>, checked: bool) {
        self.ids.clear();
        if checked {
            self.ids.extend(page_ids.into_iter().map(str::to_owned));
        }
    }

    /// Add or remove one id. Idempotent.
    pub fn select_one(&mut self, id: &str, checked: bool) {
        if checked {
            self.ids.insert(id.to_owned());
        } else {
            self.ids.remove(id);
        }
    }

    pub fn is_selected(&self, id: &str) -> bool {
        self.ids.contains(id)
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    pub fn clear(&mut self) {
        self.ids.clear();
    }

    /// Selected ids in sorted order.
    pub fn ids(&self) -> Vec<String> {
        let mut ids: Vec<String> = self.ids.iter().cloned().collect();
        ids.sort();
        ids
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn select_all_replaces_prior_selection() {
        let mut sel = Selection::default();
        sel.select_one("1", true);
        sel.select_all(["3", "4"], true);
        assert_eq!(sel.ids(), ["3", "4"]);
        sel.select_all(["3", "4"], false);
        assert!(sel.is_empty());
    }

    #[test]
    fn select_one_is_idempotent() {
        let mut sel = Selection::default();
        sel.select_one("7", true);
        sel.select_one("7", true);
        assert_eq!(sel.len(), 1);
        sel.select_one("7", false);
        sel.select_one("7", false);
        assert!(!sel.is_selected("7"));
    }
}
