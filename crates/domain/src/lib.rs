//! Form-model entities and invariants: elements, mugs, rule schemas,
//! the validation engine, and the dual data/control tree structure.

#![forbid(unsafe_code)]

mod element;
mod error;
mod form;
mod live_text;
mod mug;
mod mug_type;
mod ports;
mod question;
mod rule;
mod tree;
mod vocab;

pub use element::{
    BindAttribute, BindElement, ControlAttribute, ControlElement, DataAttribute, DataElement,
    ElementKind,
};
pub use error::{ModelError, ModelResult, MugCreationError, ValidationErrorKind, ValidationFailure};
pub use form::Form;
pub use live_text::LiveText;
pub use mug::Mug;
pub use mug_type::{BindRules, ControlRules, DataRules, MugType, MugTypeRef};
pub use ports::{MovePolicy, QuestionIdGenerator};
pub use question::{
    QuestionKind, control_only, create_mug_from_mug_type, data_bind, data_bind_control,
    data_control, data_only, group, item, multi_select, text_question, trigger,
};
pub use rule::{CrossFieldCheck, Editable, Presence, PropertyRule, Visibility};
pub use tree::{NodeId, Position, Tree, TreeKind};
pub use vocab::Vocabulary;
