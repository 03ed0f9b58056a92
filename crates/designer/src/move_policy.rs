use formloom_domain::{ControlElement, MovePolicy, Mug, MugTypeRef, Position};

/// Policy that accepts every move; useful in tests and for data-only
/// tooling that manages legality elsewhere.
#[derive(Debug, Clone, Copy, Default)]
pub struct AllowAllMovePolicy;

impl MovePolicy for AllowAllMovePolicy {
    fn check_move(
        &self,
        _mug_type: &MugTypeRef,
        _position: Position,
        _reference: Option<&MugTypeRef>,
    ) -> bool {
        true
    }
}

/// Reference structural policy driven by the schemas themselves.
///
/// Nesting under a reference question requires that its control node
/// accepts children and, when it restricts child tags, that the moved
/// question's control tag is in the allowed list; this is what makes
/// items nest only under selects. Sibling placements are always
/// structurally fine because the parent was vetted when it got its own
/// children.
#[derive(Debug, Clone, Copy, Default)]
pub struct StructuralMovePolicy;

impl MovePolicy for StructuralMovePolicy {
    fn check_move(
        &self,
        mug_type: &MugTypeRef,
        position: Position,
        reference: Option<&MugTypeRef>,
    ) -> bool {
        match position {
            Position::Before | Position::After => true,
            Position::Into | Position::First | Position::Last => {
                let Some(parent) = reference else {
                    // The synthetic root accepts anything.
                    return true;
                };

                let parent = parent.borrow();
                if !parent.control_node_can_have_children() {
                    return false;
                }

                let moved = mug_type.borrow();
                let tag = moved
                    .mug()
                    .and_then(Mug::control_element)
                    .and_then(ControlElement::tag_name);
                match tag {
                    // No control facet: nothing to restrict by tag.
                    None => true,
                    Some(tag) => {
                        let allowed = parent.control_node_allowed_children();
                        allowed.is_empty() || allowed.iter().any(|candidate| candidate == tag)
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::rc::Rc;

    use formloom_domain::{MovePolicy, MugTypeRef, Position, QuestionKind, Vocabulary};

    use super::StructuralMovePolicy;
    use crate::id_generator::SequentialQuestionIdGenerator;

    fn build(kind: QuestionKind) -> MugTypeRef {
        let ids = SequentialQuestionIdGenerator::new();
        kind.build(&Vocabulary::default(), &ids)
            .unwrap_or_else(|_| unreachable!())
            .into_ref()
    }

    #[test]
    fn items_nest_under_selects_only() {
        let policy = StructuralMovePolicy;
        let select = build(QuestionKind::MultiSelect);
        let text = build(QuestionKind::Text);
        let item = build(QuestionKind::Item);

        assert!(policy.check_move(&item, Position::Into, Some(&select)));
        assert!(!policy.check_move(&item, Position::Into, Some(&text)));
        assert!(!policy.check_move(&text, Position::Into, Some(&select)));
    }

    #[test]
    fn groups_accept_their_allowed_tags() {
        let policy = StructuralMovePolicy;
        let group = build(QuestionKind::Group);
        let text = build(QuestionKind::Text);
        let item = build(QuestionKind::Item);

        assert!(policy.check_move(&text, Position::Into, Some(&group)));
        assert!(!policy.check_move(&item, Position::Into, Some(&group)));
    }

    #[test]
    fn sibling_placement_and_root_nesting_are_always_allowed() {
        let policy = StructuralMovePolicy;
        let text = build(QuestionKind::Text);
        let other = build(QuestionKind::Text);

        assert!(policy.check_move(&text, Position::After, Some(&other)));
        assert!(policy.check_move(&Rc::clone(&text), Position::Into, None));
    }
}
