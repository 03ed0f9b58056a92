//! Collaborator seams the model consumes but does not implement.
//!
//! The editor's controller layer owns the real implementations;
//! reference implementations live in the designer crate.

use crate::mug_type::MugTypeRef;
use crate::tree::Position;

/// Supplies stable question node identifiers for newly built mugs.
pub trait QuestionIdGenerator {
    /// Returns the next unused question node identifier.
    fn next_question_id(&self) -> String;
}

/// Structural-legality oracle consulted before every tree move.
///
/// The tree itself enforces no domain nesting rules ("items may only
/// nest under select controls" and the like live here); it only refuses
/// moves that would corrupt the tree shape.
pub trait MovePolicy {
    /// Returns whether the mug type may be placed at `position` relative
    /// to `reference` (`None` means the tree root).
    fn check_move(
        &self,
        mug_type: &MugTypeRef,
        position: Position,
        reference: Option<&MugTypeRef>,
    ) -> bool;
}
