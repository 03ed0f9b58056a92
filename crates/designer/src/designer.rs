use std::rc::Rc;

use formloom_core::Ufid;
use formloom_domain::{
    ElementKind, Form, ModelResult, MovePolicy, MugTypeRef, Position, QuestionIdGenerator,
    QuestionKind, Tree, TreeKind, Vocabulary,
};

/// Composition layer the editor controller drives: owns the form and
/// its collaborators, and orchestrates question creation, moves, and
/// removal across the data and control hierarchies.
pub struct FormDesigner {
    form: Form,
    vocabulary: Vocabulary,
    ids: Rc<dyn QuestionIdGenerator>,
    move_policy: Rc<dyn MovePolicy>,
}

impl FormDesigner {
    /// Creates a designer over an empty form with injected collaborators.
    #[must_use]
    pub fn new(
        vocabulary: Vocabulary,
        ids: Rc<dyn QuestionIdGenerator>,
        move_policy: Rc<dyn MovePolicy>,
    ) -> Self {
        Self {
            form: Form::new(),
            vocabulary,
            ids,
            move_policy,
        }
    }

    /// Returns the form, including its event registry for subscriptions.
    #[must_use]
    pub fn form(&self) -> &Form {
        &self.form
    }

    fn tree(&self, kind: TreeKind) -> &Tree {
        match kind {
            TreeKind::Data => self.form.data_tree(),
            TreeKind::Control => self.form.control_tree(),
        }
    }

    /// Builds a new question of the given kind and places it in the
    /// hierarchies its type string names, relative to `reference`.
    ///
    /// The reference only applies in a tree that actually contains it;
    /// elsewhere the question lands under the root. If the control
    /// placement is rejected after the data placement succeeded, the
    /// half-placed question is removed again before the error returns.
    pub fn add_question(
        &mut self,
        kind: QuestionKind,
        position: Option<Position>,
        reference: Option<&MugTypeRef>,
    ) -> ModelResult<MugTypeRef> {
        let mug_type = kind.build(&self.vocabulary, self.ids.as_ref())?.into_ref();

        let (in_data, in_control) = {
            let mug_type = mug_type.borrow();
            (
                mug_type.has_element_tag(ElementKind::Data),
                mug_type.has_element_tag(ElementKind::Control),
            )
        };

        if in_data {
            let reference = reference
                .filter(|candidate| self.form.data_tree().node_from_mug_type(candidate).is_some());
            self.form.data_tree_mut().insert_mug_type(
                &mug_type,
                position,
                reference,
                self.move_policy.as_ref(),
            )?;
        }

        if in_control {
            let reference = reference.filter(|candidate| {
                self.form
                    .control_tree()
                    .node_from_mug_type(candidate)
                    .is_some()
            });
            let placed = self.form.control_tree_mut().insert_mug_type(
                &mug_type,
                position,
                reference,
                self.move_policy.as_ref(),
            );
            if let Err(error) = placed {
                self.form.data_tree_mut().remove_mug_type(&mug_type);
                return Err(error);
            }
        }

        tracing::debug!(kind = kind.as_str(), "question added");
        self.form.events().fire("question-added");
        Ok(mug_type)
    }

    /// Moves an existing question in every hierarchy that contains it.
    ///
    /// Each tree move is atomic on its own; if the second tree rejects
    /// the move after the first accepted it, the hierarchies diverge and
    /// the error tells the caller to re-read both.
    pub fn move_question(
        &mut self,
        mug_type: &MugTypeRef,
        position: Option<Position>,
        reference: Option<&MugTypeRef>,
    ) -> ModelResult<()> {
        let mut moved_anywhere = false;

        for kind in [TreeKind::Data, TreeKind::Control] {
            if self.tree(kind).node_from_mug_type(mug_type).is_none() {
                continue;
            }
            let reference =
                reference.filter(|candidate| self.tree(kind).node_from_mug_type(candidate).is_some());
            let tree = match kind {
                TreeKind::Data => self.form.data_tree_mut(),
                TreeKind::Control => self.form.control_tree_mut(),
            };
            let result =
                tree.insert_mug_type(mug_type, position, reference, self.move_policy.as_ref());
            if let Err(error) = result {
                if moved_anywhere {
                    tracing::warn!(
                        tree = kind.as_str(),
                        "move rejected after the other hierarchy already moved"
                    );
                }
                return Err(error);
            }
            moved_anywhere = true;
        }

        if moved_anywhere {
            self.form.events().fire("question-moved");
        }
        Ok(())
    }

    /// Removes a question (and its subtree) from both hierarchies.
    ///
    /// Returns whether anything was actually removed; removing an
    /// unknown question is a no-op.
    pub fn remove_question(&mut self, mug_type: &MugTypeRef) -> bool {
        let removed_data = self.form.data_tree_mut().remove_mug_type(mug_type).is_some();
        let removed_control = self
            .form
            .control_tree_mut()
            .remove_mug_type(mug_type)
            .is_some();

        let removed = removed_data || removed_control;
        if removed {
            self.form.events().fire("question-removed");
        }
        removed
    }

    /// Returns a question's absolute path in the given hierarchy.
    pub fn question_path(&self, mug_type: &MugTypeRef, kind: TreeKind) -> ModelResult<String> {
        self.tree(kind).absolute_path(mug_type)
    }

    /// Returns the top-level questions of the given hierarchy, in order.
    #[must_use]
    pub fn root_questions(&self, kind: TreeKind) -> Vec<MugTypeRef> {
        self.tree(kind).root_children()
    }

    /// Finds a question by its stable identifier in either hierarchy.
    #[must_use]
    pub fn question_by_ufid(&self, ufid: Ufid) -> Option<MugTypeRef> {
        self.form
            .data_tree()
            .mug_type_from_ufid(ufid)
            .or_else(|| self.form.control_tree().mug_type_from_ufid(ufid))
    }
}

impl std::fmt::Debug for FormDesigner {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("FormDesigner")
            .field("form", &self.form)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::rc::Rc;

    use formloom_domain::{
        ControlAttribute, ModelError, Mug, Position, QuestionKind, TreeKind, Vocabulary,
    };

    use super::FormDesigner;
    use crate::id_generator::SequentialQuestionIdGenerator;
    use crate::move_policy::StructuralMovePolicy;

    fn designer() -> FormDesigner {
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .try_init();
        FormDesigner::new(
            Vocabulary::default(),
            Rc::new(SequentialQuestionIdGenerator::new()),
            Rc::new(StructuralMovePolicy),
        )
    }

    #[test]
    fn text_questions_land_in_both_hierarchies() {
        let mut designer = designer();
        let text = designer
            .add_question(QuestionKind::Text, None, None)
            .unwrap_or_else(|_| unreachable!());

        assert!(
            designer
                .root_questions(TreeKind::Data)
                .iter()
                .any(|question| Rc::ptr_eq(question, &text))
        );
        assert!(
            designer
                .root_questions(TreeKind::Control)
                .iter()
                .any(|question| Rc::ptr_eq(question, &text))
        );
    }

    #[test]
    fn items_land_in_the_control_hierarchy_only() {
        let mut designer = designer();
        let select = designer
            .add_question(QuestionKind::MultiSelect, None, None)
            .unwrap_or_else(|_| unreachable!());
        let item = designer
            .add_question(QuestionKind::Item, Some(Position::Into), Some(&select))
            .unwrap_or_else(|_| unreachable!());

        assert!(
            designer
                .form()
                .data_tree()
                .node_from_mug_type(&item)
                .is_none()
        );
        let parent = designer
            .form()
            .control_tree()
            .parent_mug_type(&item)
            .unwrap_or_else(|| unreachable!());
        assert!(Rc::ptr_eq(&parent, &select));
    }

    #[test]
    fn nesting_under_a_text_question_is_rejected() {
        let mut designer = designer();
        let text = designer
            .add_question(QuestionKind::Text, None, None)
            .unwrap_or_else(|_| unreachable!());

        let result = designer.add_question(QuestionKind::Item, Some(Position::Into), Some(&text));
        assert!(matches!(result, Err(ModelError::IllegalMove(_))));
        // Nothing half-placed is left behind.
        assert_eq!(designer.root_questions(TreeKind::Control).len(), 1);
    }

    #[test]
    fn questions_move_in_both_hierarchies() {
        let mut designer = designer();
        let group = designer
            .add_question(QuestionKind::Group, None, None)
            .unwrap_or_else(|_| unreachable!());
        let text = designer
            .add_question(QuestionKind::Text, None, None)
            .unwrap_or_else(|_| unreachable!());

        designer
            .move_question(&text, Some(Position::Into), Some(&group))
            .unwrap_or_else(|_| unreachable!());

        for kind in [TreeKind::Data, TreeKind::Control] {
            let parent = match kind {
                TreeKind::Data => designer.form().data_tree().parent_mug_type(&text),
                TreeKind::Control => designer.form().control_tree().parent_mug_type(&text),
            };
            let parent = parent.unwrap_or_else(|| unreachable!());
            assert!(Rc::ptr_eq(&parent, &group));
        }
    }

    #[test]
    fn removal_clears_both_hierarchies_and_is_idempotent() {
        let mut designer = designer();
        let text = designer
            .add_question(QuestionKind::Text, None, None)
            .unwrap_or_else(|_| unreachable!());

        assert!(designer.remove_question(&text));
        assert!(designer.root_questions(TreeKind::Data).is_empty());
        assert!(designer.root_questions(TreeKind::Control).is_empty());
        assert!(!designer.remove_question(&text));
    }

    #[test]
    fn question_paths_use_each_hierarchy_identifier() {
        let mut designer = designer();
        let group = designer
            .add_question(QuestionKind::Group, None, None)
            .unwrap_or_else(|_| unreachable!());
        let text = designer
            .add_question(QuestionKind::Text, Some(Position::Into), Some(&group))
            .unwrap_or_else(|_| unreachable!());

        let data_path = designer
            .question_path(&text, TreeKind::Data)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(data_path, "/question1/question2");

        // The control hierarchy labels by display name, which for fresh
        // questions is the bind node id as well.
        let control_path = designer
            .question_path(&text, TreeKind::Control)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(control_path, "/question1/question2");
    }

    #[test]
    fn ufid_lookup_spans_both_hierarchies() {
        let mut designer = designer();
        let select = designer
            .add_question(QuestionKind::MultiSelect, None, None)
            .unwrap_or_else(|_| unreachable!());
        let item = designer
            .add_question(QuestionKind::Item, Some(Position::Into), Some(&select))
            .unwrap_or_else(|_| unreachable!());

        let item_ufid = item.borrow().ufid();
        let found = designer
            .question_by_ufid(item_ufid)
            .unwrap_or_else(|| unreachable!());
        assert!(Rc::ptr_eq(&found, &item));
    }

    #[test]
    fn structural_changes_fire_form_events() {
        let mut designer = designer();
        let added = Rc::new(Cell::new(0));
        let seen = Rc::clone(&added);
        designer
            .form()
            .events()
            .on("question-added", move || seen.set(seen.get() + 1));

        let text = designer
            .add_question(QuestionKind::Text, None, None)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(added.get(), 1);

        let removed = Rc::new(Cell::new(0));
        let seen = Rc::clone(&removed);
        designer
            .form()
            .events()
            .on("question-removed", move || seen.set(seen.get() + 1));
        designer.remove_question(&text);
        assert_eq!(removed.get(), 1);
    }

    #[test]
    fn edited_labels_show_up_in_control_paths() {
        let mut designer = designer();
        let item_parent = designer
            .add_question(QuestionKind::MultiSelect, None, None)
            .unwrap_or_else(|_| unreachable!());
        let item = designer
            .add_question(QuestionKind::Item, Some(Position::Into), Some(&item_parent))
            .unwrap_or_else(|_| unreachable!());

        if let Some(control) = item.borrow_mut().mug_mut().and_then(Mug::control_element_mut) {
            control.set_attribute(ControlAttribute::Label, Some("Yes".to_owned()));
        }

        let path = designer
            .question_path(&item, TreeKind::Control)
            .unwrap_or_else(|_| unreachable!());
        assert_eq!(path, "/question1/Yes");
    }
}
