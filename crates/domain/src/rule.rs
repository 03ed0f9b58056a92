use std::str::FromStr;

use formloom_core::AppError;
use serde::{Deserialize, Serialize};

use crate::element::BindAttribute;
use crate::mug::Mug;

/// Whether a property may be changed through the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Editable {
    /// Read only.
    Read,
    /// Read and write.
    Write,
}

impl Editable {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Read => "r",
            Self::Write => "w",
        }
    }
}

impl FromStr for Editable {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "r" => Ok(Self::Read),
            "w" => Ok(Self::Write),
            _ => Err(AppError::Validation(format!(
                "unknown editable flag '{value}'"
            ))),
        }
    }
}

/// Whether a property shows up as user editable in the editor.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Visibility {
    /// Hidden from the property editor.
    Hidden,
    /// Shown in the property editor.
    Visible,
}

impl Visibility {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Hidden => "hidden",
            Self::Visible => "visible",
        }
    }
}

impl FromStr for Visibility {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "hidden" => Ok(Self::Hidden),
            "visible" => Ok(Self::Visible),
            _ => Err(AppError::Validation(format!(
                "unknown visibility flag '{value}'"
            ))),
        }
    }
}

/// Rule classification of an attribute as required, optional, or
/// not allowed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Presence {
    /// Attribute must be set to a non-empty value.
    Required,
    /// Attribute may be set or absent.
    Optional,
    /// Attribute must be absent (or empty).
    NotAllowed,
}

impl Presence {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Required => "required",
            Self::Optional => "optional",
            Self::NotAllowed => "notallowed",
        }
    }
}

impl FromStr for Presence {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "required" => Ok(Self::Required),
            "optional" => Ok(Self::Optional),
            "notallowed" => Ok(Self::NotAllowed),
            _ => Err(AppError::Validation(format!(
                "unknown presence flag '{value}'"
            ))),
        }
    }
}

/// Cross-field validation checks a rule can carry.
///
/// A closed set instead of arbitrary callbacks keeps rule schemas
/// cloneable, comparable, and serializable. A check's verdict overrides
/// the simple presence verdict for its rule.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossFieldCheck {
    /// A bind may only carry a constraint message when it also carries
    /// a constraint expression.
    ConstraintMsgRequiresConstraint,
}

impl CrossFieldCheck {
    /// Runs the check against a mug, returning an error message on failure.
    ///
    /// Checks test attribute presence (`Some`), not value truthiness.
    pub fn run(&self, mug: &Mug) -> Result<(), String> {
        match self {
            Self::ConstraintMsgRequiresConstraint => {
                let bind = mug.bind_element();
                let has_constraint = bind
                    .map(|element| element.attribute(BindAttribute::ConstraintAttr).is_some())
                    .unwrap_or(false);
                let has_constraint_msg = bind
                    .map(|element| {
                        element
                            .attribute(BindAttribute::ConstraintMsgAttr)
                            .is_some()
                    })
                    .unwrap_or(false);

                if has_constraint_msg && !has_constraint {
                    return Err(
                        "bind cannot have a constraint message with no constraint".to_owned()
                    );
                }

                Ok(())
            }
        }
    }
}

/// Declarative rule governing one attribute of one element kind.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PropertyRule {
    editable: Editable,
    visibility: Visibility,
    presence: Presence,
    values: Vec<String>,
    validation: Option<CrossFieldCheck>,
    lstring: Option<String>,
}

impl PropertyRule {
    /// Creates a rule with no allowed-value list and no cross-field check.
    #[must_use]
    pub fn new(editable: Editable, visibility: Visibility, presence: Presence) -> Self {
        Self {
            editable,
            visibility,
            presence,
            values: Vec::new(),
            validation: None,
            lstring: None,
        }
    }

    /// Attaches an ordered allowed-value list.
    #[must_use]
    pub fn with_values(mut self, values: Vec<String>) -> Self {
        self.values = values;
        self
    }

    /// Attaches a cross-field check.
    #[must_use]
    pub fn with_validation(mut self, validation: CrossFieldCheck) -> Self {
        self.validation = Some(validation);
        self
    }

    /// Attaches a human-readable property description.
    #[must_use]
    pub fn with_lstring(mut self, lstring: impl Into<String>) -> Self {
        self.lstring = Some(lstring.into());
        self
    }

    /// Returns the editability flag.
    #[must_use]
    pub fn editable(&self) -> Editable {
        self.editable
    }

    /// Returns the visibility flag.
    #[must_use]
    pub fn visibility(&self) -> Visibility {
        self.visibility
    }

    /// Returns the presence classification.
    #[must_use]
    pub fn presence(&self) -> Presence {
        self.presence
    }

    /// Tightens or loosens the presence classification in place.
    pub fn set_presence(&mut self, presence: Presence) {
        self.presence = presence;
    }

    /// Returns the ordered allowed-value list (empty when unrestricted).
    #[must_use]
    pub fn values(&self) -> &[String] {
        &self.values
    }

    /// Returns the cross-field check, if any.
    #[must_use]
    pub fn validation(&self) -> Option<CrossFieldCheck> {
        self.validation
    }

    /// Returns the human-readable property description, if any.
    #[must_use]
    pub fn lstring(&self) -> Option<&str> {
        self.lstring.as_deref()
    }
}

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use super::{CrossFieldCheck, Editable, Presence, PropertyRule, Visibility};
    use crate::element::{BindAttribute, BindElement};
    use crate::mug::Mug;

    #[test]
    fn presence_parses_storage_tokens() {
        let presence = Presence::from_str("notallowed").unwrap_or_else(|_| unreachable!());
        assert_eq!(presence, Presence::NotAllowed);
        assert!(Presence::from_str("sometimes").is_err());
    }

    #[test]
    fn rule_builder_carries_values_and_lstring() {
        let rule = PropertyRule::new(Editable::Write, Visibility::Visible, Presence::Optional)
            .with_values(vec!["xsd:string".to_owned(), "xsd:int".to_owned()])
            .with_lstring("Data Type");

        assert_eq!(rule.values()[0], "xsd:string");
        assert_eq!(rule.lstring(), Some("Data Type"));
        assert_eq!(rule.validation(), None);
    }

    #[test]
    fn constraint_msg_check_requires_constraint() {
        let mut mug = Mug::new();
        mug.set_bind_element(BindElement::new());
        if let Some(bind) = mug.bind_element_mut() {
            bind.set_attribute(BindAttribute::ConstraintMsgAttr, Some("too big".to_owned()));
        }

        let check = CrossFieldCheck::ConstraintMsgRequiresConstraint;
        assert!(check.run(&mug).is_err());

        if let Some(bind) = mug.bind_element_mut() {
            bind.set_attribute(BindAttribute::ConstraintAttr, Some(". < 10".to_owned()));
        }
        assert!(check.run(&mug).is_ok());
    }
}
