//! Order-preserving label bindings
//!
//! A `TagBindingTable` maps caller-visible labels to a target name. The input
//! side maps labels to canonical field names; the output side maps labels to
//! Symphony system fields. Renaming moves a binding to a new label without
//! touching any other binding, so rebinding configuration can be applied
//! declaratively and more than once.

use crate::app::models::Field;
use crate::constants::symphony::OUTPUT_BINDINGS;

/// Ordered label → target bindings
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TagBindingTable {
    bindings: Vec<(String, String)>,
}

impl TagBindingTable {
    pub fn new() -> Self {
        Self::default()
    }

    /// Input-side table binding every canonical field to its own name
    pub fn canonical_fields() -> Self {
        Field::ALL
            .iter()
            .map(|field| (field.as_str(), field.as_str()))
            .collect()
    }

    /// Output-side table binding record labels to Symphony system fields
    pub fn symphony_defaults() -> Self {
        OUTPUT_BINDINGS.iter().copied().collect()
    }

    /// Bind a label, replacing its target in place if already bound
    pub fn bind(&mut self, label: impl Into<String>, target: impl Into<String>) {
        let label = label.into();
        let target = target.into();
        match self.bindings.iter_mut().find(|(key, _)| *key == label) {
            Some((_, existing)) => *existing = target,
            None => self.bindings.push((label, target)),
        }
    }

    /// Move the binding for `old_label` to `new_label`
    ///
    /// Empty arguments and unknown labels are silent no-ops. The renamed
    /// binding moves to the end; all others keep their relative order.
    pub fn rename(&mut self, old_label: &str, new_label: &str) {
        if old_label.is_empty() || new_label.is_empty() {
            return;
        }
        let Some(position) = self.bindings.iter().position(|(key, _)| key == old_label) else {
            return;
        };
        let (_, target) = self.bindings.remove(position);
        self.bindings.retain(|(key, _)| key != new_label);
        self.bindings.push((new_label.to_string(), target));
    }

    /// Target bound to a label
    pub fn resolve(&self, label: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(key, _)| key == label)
            .map(|(_, target)| target.as_str())
    }

    /// First label bound to a target
    pub fn label_for(&self, target: &str) -> Option<&str> {
        self.bindings
            .iter()
            .find(|(_, bound)| bound == target)
            .map(|(key, _)| key.as_str())
    }

    /// Bound labels in binding order
    pub fn current_labels(&self) -> Vec<&str> {
        self.bindings.iter().map(|(key, _)| key.as_str()).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.bindings
            .iter()
            .map(|(key, target)| (key.as_str(), target.as_str()))
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.bindings.is_empty()
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for TagBindingTable {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        let mut table = TagBindingTable::new();
        for (label, target) in iter {
            table.bind(label, target);
        }
        table
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> TagBindingTable {
        [("firstName", "userFirstName"), ("lastName", "userLastName"), ("email", "email")]
            .into_iter()
            .collect()
    }

    #[test]
    fn test_rename_moves_binding_to_end() {
        let mut bindings = table();
        bindings.rename("firstName", "nom");

        assert_eq!(bindings.current_labels(), vec!["lastName", "email", "nom"]);
        assert_eq!(bindings.resolve("nom"), Some("userFirstName"));
        assert_eq!(bindings.resolve("firstName"), None);
    }

    #[test]
    fn test_rename_twice_only_changes_final_label() {
        let mut bindings = table();
        bindings.rename("email", "courriel");
        bindings.rename("courriel", "contact");

        assert_eq!(bindings.current_labels(), vec!["firstName", "lastName", "contact"]);
        assert_eq!(bindings.resolve("contact"), Some("email"));
        assert_eq!(bindings.label_for("email"), Some("contact"));
    }

    #[test]
    fn test_rename_unknown_or_empty_is_noop() {
        let mut bindings = table();
        bindings.rename("dob", "birthday");
        bindings.rename("", "birthday");
        bindings.rename("email", "");

        assert_eq!(bindings, table());
    }

    #[test]
    fn test_rename_is_idempotent() {
        let mut bindings = table();
        bindings.rename("firstName", "nom");
        bindings.rename("firstName", "nom");

        assert_eq!(bindings.len(), 3);
        assert_eq!(bindings.resolve("nom"), Some("userFirstName"));
    }

    #[test]
    fn test_rename_onto_existing_label_replaces_it() {
        let mut bindings = table();
        bindings.rename("firstName", "email");

        assert_eq!(bindings.current_labels(), vec!["lastName", "email"]);
        assert_eq!(bindings.resolve("email"), Some("userFirstName"));
    }

    #[test]
    fn test_bind_replaces_in_place() {
        let mut bindings = table();
        bindings.bind("lastName", "userName");
        bindings.bind("country", "userCategory3");

        assert_eq!(
            bindings.current_labels(),
            vec!["firstName", "lastName", "email", "country"]
        );
        assert_eq!(bindings.resolve("lastName"), Some("userName"));
    }

    #[test]
    fn test_defaults_cover_every_canonical_field_but_country() {
        let input = TagBindingTable::canonical_fields();
        let output = TagBindingTable::symphony_defaults();

        assert_eq!(input.len(), Field::ALL.len());
        for field in Field::ALL {
            assert_eq!(input.resolve(field.as_str()), Some(field.as_str()));
            if field != Field::Country {
                assert!(output.resolve(field.as_str()).is_some(), "{field} unbound");
            }
        }
        assert_eq!(output.resolve("country"), None);
    }
}
