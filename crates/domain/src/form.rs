use formloom_core::EventEmitter;

use crate::tree::{Tree, TreeKind};

/// Form-level state container: exactly one data tree and one control
/// tree over the same universe of mug types.
///
/// A mug type may occupy different structural positions (or be absent)
/// in each tree; the trees never share nodes. The form also carries the
/// named-event capability the editor UI subscribes to for change
/// notification.
#[derive(Debug)]
pub struct Form {
    data_tree: Tree,
    control_tree: Tree,
    events: EventEmitter,
}

impl Form {
    /// Creates an empty form with fresh data and control trees.
    #[must_use]
    pub fn new() -> Self {
        Self {
            data_tree: Tree::new(TreeKind::Data),
            control_tree: Tree::new(TreeKind::Control),
            events: EventEmitter::new(),
        }
    }

    /// Returns the persisted-data-layout tree.
    #[must_use]
    pub fn data_tree(&self) -> &Tree {
        &self.data_tree
    }

    /// Returns the data tree for structural edits.
    #[must_use]
    pub fn data_tree_mut(&mut self) -> &mut Tree {
        &mut self.data_tree
    }

    /// Returns the UI-control-layout tree.
    #[must_use]
    pub fn control_tree(&self) -> &Tree {
        &self.control_tree
    }

    /// Returns the control tree for structural edits.
    #[must_use]
    pub fn control_tree_mut(&mut self) -> &mut Tree {
        &mut self.control_tree
    }

    /// Returns the form-level event registry.
    #[must_use]
    pub fn events(&self) -> &EventEmitter {
        &self.events
    }
}

impl Default for Form {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::Form;
    use crate::tree::TreeKind;

    #[test]
    fn form_owns_one_tree_of_each_kind() {
        let form = Form::new();
        assert_eq!(form.data_tree().kind(), TreeKind::Data);
        assert_eq!(form.control_tree().kind(), TreeKind::Control);
    }

    #[test]
    fn form_events_reach_subscribers() {
        let form = Form::new();
        form.events().on("form-loaded", || {});
        assert_eq!(form.events().fire("form-loaded"), 1);
    }
}
