//! Designer services and reference collaborator implementations.
//!
//! The domain crate defines the collaborator seams (id generation,
//! move legality); this crate supplies working implementations and the
//! [`FormDesigner`] composition layer the editor controller drives.

#![forbid(unsafe_code)]

mod designer;
mod id_generator;
mod move_policy;

pub use designer::FormDesigner;
pub use id_generator::SequentialQuestionIdGenerator;
pub use move_policy::{AllowAllMovePolicy, StructuralMovePolicy};
