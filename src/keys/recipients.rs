/// One entry in the recipient list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Recipient {
    pub identifier: String,
    pub selected: bool,
}

/// Ordered, duplicate-free list of recipient identifiers with a selection flag each.
///
/// A person who registers several keys under one email still appears once.
#[derive(Debug, Clone, Default)]
pub struct RecipientSet {
    entries: Vec<Recipient>,
}

impl RecipientSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn contains(&self, identifier: &str) -> bool {
        self.entries.iter().any(|r| r.identifier == identifier)
    }

    /// Add `identifier` as selected. Skips if already present, leaving its
    /// selection untouched. Returns whether an entry was added.
    pub fn insert_selected(&mut self, identifier: &str) -> bool {
        if self.contains(identifier) {
            return false;
        }
        self.entries.push(Recipient {
            identifier: identifier.to_string(),
            selected: true,
        });
        true
    }

    /// Mark a known recipient as selected. Returns whether it was found.
    pub fn select(&mut self, identifier: &str) -> bool {
        self.set_selected(identifier, true)
    }

    /// Clear the selection on a known recipient. Returns whether it was found.
    pub fn deselect(&mut self, identifier: &str) -> bool {
        self.set_selected(identifier, false)
    }

    /// Clear every selection. Entries stay in the list.
    pub fn deselect_all(&mut self) {
        for entry in &mut self.entries {
            entry.selected = false;
        }
    }

    /// Selected identifiers in insertion order.
    pub fn selected(&self) -> Vec<String> {
        self.entries
            .iter()
            .filter(|r| r.selected)
            .map(|r| r.identifier.clone())
            .collect()
    }

    pub fn has_selection(&self) -> bool {
        self.entries.iter().any(|r| r.selected)
    }

    pub fn entries(&self) -> &[Recipient] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn set_selected(&mut self, identifier: &str, selected: bool) -> bool {
        match self.entries.iter_mut().find(|r| r.identifier == identifier) {
            Some(entry) => {
                entry.selected = selected;
                true
            }
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn insert_dedups() {
        let mut set = RecipientSet::new();
        assert!(set.insert_selected("alice@x.com"));
        assert!(!set.insert_selected("alice@x.com"));
        assert_eq!(set.len(), 1);
        assert_eq!(set.selected(), vec!["alice@x.com".to_string()]);
    }

    #[test]
    fn reinsert_keeps_deselection() {
        let mut set = RecipientSet::new();
        set.insert_selected("alice@x.com");
        assert!(set.deselect("alice@x.com"));
        set.insert_selected("alice@x.com");
        assert!(!set.has_selection());
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn selected_preserves_insertion_order() {
        let mut set = RecipientSet::new();
        set.insert_selected("carol@x.com");
        set.insert_selected("alice@x.com");
        set.insert_selected("bob@x.com");
        set.deselect("alice@x.com");

        assert_eq!(
            set.selected(),
            vec!["carol@x.com".to_string(), "bob@x.com".to_string()]
        );
    }

    #[test]
    fn deselect_all_keeps_entries() {
        let mut set = RecipientSet::new();
        set.insert_selected("alice@x.com");
        set.insert_selected("bob@x.com");
        set.deselect_all();

        assert_eq!(set.len(), 2);
        assert!(set.selected().is_empty());
        assert!(set.select("bob@x.com"));
        assert_eq!(set.selected(), vec!["bob@x.com".to_string()]);
    }

    #[test]
    fn select_unknown_returns_false() {
        let mut set = RecipientSet::new();
        assert!(!set.select("ghost@x.com"));
        assert!(!set.deselect("ghost@x.com"));
    }
}
