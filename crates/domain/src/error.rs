use formloom_core::AppError;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::element::ElementKind;
use crate::mug_type::MugType;

/// Result type for form-model operations.
pub type ModelResult<T> = Result<T, ModelError>;

/// The ways a mug can fail validation against its rule schema.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ValidationErrorKind {
    /// The schema's type string disagrees with its rule blocks.
    TypeStringMismatch,
    /// A declared rule was violated (presence or cross-field check).
    RuleViolation,
    /// The mug carries an attribute no rule governs.
    MissingRule,
    /// The schema declares a rule block but the mug lacks that element.
    MissingElement,
    /// The schema has no mug attached to validate.
    MissingMug,
}

impl ValidationErrorKind {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::TypeStringMismatch => "type_string_mismatch",
            Self::RuleViolation => "rule_violation",
            Self::MissingRule => "missing_rule",
            Self::MissingElement => "missing_element",
            Self::MissingMug => "missing_mug",
        }
    }
}

/// Structured diagnostic for one validation failure: the failing rule
/// key, the containing block, and a human-readable message.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, Error)]
#[error("{message}")]
pub struct ValidationFailure {
    kind: ValidationErrorKind,
    block: Option<ElementKind>,
    key: Option<String>,
    message: String,
}

impl ValidationFailure {
    /// Creates a validation failure diagnostic.
    #[must_use]
    pub fn new(
        kind: ValidationErrorKind,
        block: Option<ElementKind>,
        key: Option<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            kind,
            block,
            key,
            message: message.into(),
        }
    }

    /// Returns the failure kind.
    #[must_use]
    pub fn kind(&self) -> ValidationErrorKind {
        self.kind
    }

    /// Returns the rule block the failure occurred in, if any.
    #[must_use]
    pub fn block(&self) -> Option<ElementKind> {
        self.block
    }

    /// Returns the failing rule key, if any.
    #[must_use]
    pub fn key(&self) -> Option<&str> {
        self.key.as_deref()
    }

    /// Returns the human-readable failure message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// A mug built by the factory failed its immediate validation.
///
/// Construction is all-or-nothing: the error owns the schema (and the
/// mug attached to it) so callers still get the full diagnostic picture
/// without ever seeing a half-built question.
#[derive(Debug, Error)]
#[error("newly constructed mug failed validation: {failure}")]
pub struct MugCreationError {
    failure: ValidationFailure,
    mug_type: Box<MugType>,
}

impl MugCreationError {
    /// Creates a mug construction error.
    #[must_use]
    pub fn new(failure: ValidationFailure, mug_type: MugType) -> Self {
        Self {
            failure,
            mug_type: Box::new(mug_type),
        }
    }

    /// Returns the validation diagnostic.
    #[must_use]
    pub fn failure(&self) -> &ValidationFailure {
        &self.failure
    }

    /// Returns the schema (with its failed mug attached) for inspection.
    #[must_use]
    pub fn mug_type(&self) -> &MugType {
        &self.mug_type
    }

    /// Consumes the error, recovering the schema.
    #[must_use]
    pub fn into_mug_type(self) -> MugType {
        *self.mug_type
    }
}

/// Errors surfaced by the form model.
#[derive(Debug, Error)]
pub enum ModelError {
    /// Core primitive failure.
    #[error(transparent)]
    Core(#[from] AppError),

    /// Schema/mug mismatch with full diagnostic.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationFailure),

    /// Mug factory failure; carries the schema and mug that failed.
    #[error(transparent)]
    MugCreation(#[from] MugCreationError),

    /// Tree move rejected by the move policy or by tree structure.
    #[error("illegal move: {0}")]
    IllegalMove(String),

    /// Malformed argument, such as an unknown position token.
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// Operation was given a missing node where one is required.
    #[error("missing node: {0}")]
    NullNode(String),
}

#[cfg(test)]
mod tests {
    use super::{ValidationErrorKind, ValidationFailure};
    use crate::element::ElementKind;

    #[test]
    fn failure_display_uses_the_message() {
        let failure = ValidationFailure::new(
            ValidationErrorKind::RuleViolation,
            Some(ElementKind::Control),
            Some("hint_label".to_owned()),
            "\"hint_label\" is not allowed in block control_element",
        );
        assert_eq!(
            failure.to_string(),
            "\"hint_label\" is not allowed in block control_element"
        );
        assert_eq!(failure.block(), Some(ElementKind::Control));
        assert_eq!(failure.key(), Some("hint_label"));
    }

    #[test]
    fn failure_serializes_with_snake_case_kind() {
        let failure = ValidationFailure::new(ValidationErrorKind::MissingRule, None, None, "drift");
        let json = serde_json::to_value(&failure).unwrap_or_else(|_| unreachable!());
        assert_eq!(json["kind"], "missing_rule");
    }
}
