use std::cell::RefCell;
use std::fmt::{Display, Formatter};
use std::rc::Rc;

use formloom_core::{AppError, AppResult, NonEmptyString, Ufid};
use serde::{Deserialize, Serialize};

use crate::element::{BindAttribute, ControlAttribute, DataAttribute, ElementKind};
use crate::error::{ValidationErrorKind, ValidationFailure};
use crate::mug::Mug;
use crate::rule::{Presence, PropertyRule};

/// Shared handle to a mug type.
///
/// The same mug type occupies independent positions in the data tree and
/// the control tree, so tree nodes hold a shared single-threaded handle;
/// attribute mutation is serialized by the editor's event dispatch.
pub type MugTypeRef = Rc<RefCell<MugType>>;

/// Rule block governing data-element attributes.
///
/// A `None` slot means no rule governs that attribute at all; the
/// validator's reverse sweep flags any set attribute landing on one.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataRules {
    node_id: Option<PropertyRule>,
    data_value: Option<PropertyRule>,
}

impl DataRules {
    /// Returns the rule for one attribute, if any.
    #[must_use]
    pub fn rule(&self, attribute: DataAttribute) -> Option<&PropertyRule> {
        match attribute {
            DataAttribute::NodeId => self.node_id.as_ref(),
            DataAttribute::DataValue => self.data_value.as_ref(),
        }
    }

    /// Returns the rule for one attribute for in-place tightening.
    #[must_use]
    pub fn rule_mut(&mut self, attribute: DataAttribute) -> Option<&mut PropertyRule> {
        match attribute {
            DataAttribute::NodeId => self.node_id.as_mut(),
            DataAttribute::DataValue => self.data_value.as_mut(),
        }
    }

    /// Installs or removes the rule for one attribute.
    pub fn set_rule(&mut self, attribute: DataAttribute, rule: Option<PropertyRule>) {
        match attribute {
            DataAttribute::NodeId => self.node_id = rule,
            DataAttribute::DataValue => self.data_value = rule,
        }
    }
}

/// Rule block governing bind-element attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindRules {
    node_id: Option<PropertyRule>,
    data_type: Option<PropertyRule>,
    relevant_attr: Option<PropertyRule>,
    calculate_attr: Option<PropertyRule>,
    constraint_attr: Option<PropertyRule>,
    constraint_msg_attr: Option<PropertyRule>,
}

impl BindRules {
    /// Returns the rule for one attribute, if any.
    #[must_use]
    pub fn rule(&self, attribute: BindAttribute) -> Option<&PropertyRule> {
        match attribute {
            BindAttribute::NodeId => self.node_id.as_ref(),
            BindAttribute::DataType => self.data_type.as_ref(),
            BindAttribute::RelevantAttr => self.relevant_attr.as_ref(),
            BindAttribute::CalculateAttr => self.calculate_attr.as_ref(),
            BindAttribute::ConstraintAttr => self.constraint_attr.as_ref(),
            BindAttribute::ConstraintMsgAttr => self.constraint_msg_attr.as_ref(),
        }
    }

    /// Returns the rule for one attribute for in-place tightening.
    #[must_use]
    pub fn rule_mut(&mut self, attribute: BindAttribute) -> Option<&mut PropertyRule> {
        match attribute {
            BindAttribute::NodeId => self.node_id.as_mut(),
            BindAttribute::DataType => self.data_type.as_mut(),
            BindAttribute::RelevantAttr => self.relevant_attr.as_mut(),
            BindAttribute::CalculateAttr => self.calculate_attr.as_mut(),
            BindAttribute::ConstraintAttr => self.constraint_attr.as_mut(),
            BindAttribute::ConstraintMsgAttr => self.constraint_msg_attr.as_mut(),
        }
    }

    /// Installs or removes the rule for one attribute.
    pub fn set_rule(&mut self, attribute: BindAttribute, rule: Option<PropertyRule>) {
        match attribute {
            BindAttribute::NodeId => self.node_id = rule,
            BindAttribute::DataType => self.data_type = rule,
            BindAttribute::RelevantAttr => self.relevant_attr = rule,
            BindAttribute::CalculateAttr => self.calculate_attr = rule,
            BindAttribute::ConstraintAttr => self.constraint_attr = rule,
            BindAttribute::ConstraintMsgAttr => self.constraint_msg_attr = rule,
        }
    }
}

/// Rule block governing control-element attributes.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlRules {
    name: Option<PropertyRule>,
    tag_name: Option<PropertyRule>,
    label: Option<PropertyRule>,
    hint_label: Option<PropertyRule>,
    label_itext: Option<PropertyRule>,
    hint_itext: Option<PropertyRule>,
    default_value: Option<PropertyRule>,
}

impl ControlRules {
    /// Returns the rule for one attribute, if any.
    #[must_use]
    pub fn rule(&self, attribute: ControlAttribute) -> Option<&PropertyRule> {
        match attribute {
            ControlAttribute::Name => self.name.as_ref(),
            ControlAttribute::TagName => self.tag_name.as_ref(),
            ControlAttribute::Label => self.label.as_ref(),
            ControlAttribute::HintLabel => self.hint_label.as_ref(),
            ControlAttribute::LabelItext => self.label_itext.as_ref(),
            ControlAttribute::HintItext => self.hint_itext.as_ref(),
            ControlAttribute::DefaultValue => self.default_value.as_ref(),
        }
    }

    /// Returns the rule for one attribute for in-place tightening.
    #[must_use]
    pub fn rule_mut(&mut self, attribute: ControlAttribute) -> Option<&mut PropertyRule> {
        match attribute {
            ControlAttribute::Name => self.name.as_mut(),
            ControlAttribute::TagName => self.tag_name.as_mut(),
            ControlAttribute::Label => self.label.as_mut(),
            ControlAttribute::HintLabel => self.hint_label.as_mut(),
            ControlAttribute::LabelItext => self.label_itext.as_mut(),
            ControlAttribute::HintItext => self.hint_itext.as_mut(),
            ControlAttribute::DefaultValue => self.default_value.as_mut(),
        }
    }

    /// Installs or removes the rule for one attribute.
    pub fn set_rule(&mut self, attribute: ControlAttribute, rule: Option<PropertyRule>) {
        match attribute {
            ControlAttribute::Name => self.name = rule,
            ControlAttribute::TagName => self.tag_name = rule,
            ControlAttribute::Label => self.label = rule,
            ControlAttribute::HintLabel => self.hint_label = rule,
            ControlAttribute::LabelItext => self.label_itext = rule,
            ControlAttribute::HintItext => self.hint_itext = rule,
            ControlAttribute::DefaultValue => self.default_value = rule,
        }
    }
}

/// The declarative definition of which elements and attributes a mug of
/// a given question kind must, may, and must not have, together with the
/// mug it validates.
///
/// The type string encodes the legal element combination as a subset of
/// the characters `d`, `b`, and `c`; the rule blocks actually present
/// must agree with it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MugType {
    ufid: Ufid,
    type_name: NonEmptyString,
    type_string: String,
    data_rules: Option<DataRules>,
    bind_rules: Option<BindRules>,
    control_rules: Option<ControlRules>,
    control_node_can_have_children: bool,
    control_node_allowed_children: Vec<String>,
    data_node_can_have_children: bool,
    mug: Option<Mug>,
}

impl MugType {
    /// Creates a schema with the given human-readable name and type
    /// string; rule blocks start empty.
    pub fn new(type_name: impl Into<String>, type_string: impl Into<String>) -> AppResult<Self> {
        let type_string = type_string.into();
        for letter in type_string.chars() {
            if !matches!(letter, 'd' | 'b' | 'c') {
                return Err(AppError::Validation(format!(
                    "type string may only contain 'd', 'b' and 'c', got '{type_string}'"
                )));
            }
        }
        if type_string
            .chars()
            .enumerate()
            .any(|(index, letter)| type_string[..index].contains(letter))
        {
            return Err(AppError::Validation(format!(
                "type string has a repeated element tag: '{type_string}'"
            )));
        }

        Ok(Self {
            ufid: Ufid::new(),
            type_name: NonEmptyString::new(type_name)?,
            type_string,
            data_rules: None,
            bind_rules: None,
            control_rules: None,
            control_node_can_have_children: false,
            control_node_allowed_children: Vec::new(),
            data_node_can_have_children: true,
            mug: None,
        })
    }

    /// Wraps the schema in the shared handle tree nodes hold.
    #[must_use]
    pub fn into_ref(self) -> MugTypeRef {
        Rc::new(RefCell::new(self))
    }

    /// Returns the stable schema identifier.
    #[must_use]
    pub fn ufid(&self) -> Ufid {
        self.ufid
    }

    /// Returns the human-readable type name.
    #[must_use]
    pub fn type_name(&self) -> &NonEmptyString {
        &self.type_name
    }

    /// Replaces the human-readable type name.
    pub fn set_type_name(&mut self, type_name: impl Into<String>) -> AppResult<()> {
        self.type_name = NonEmptyString::new(type_name)?;
        Ok(())
    }

    /// Returns the element-combination type string.
    #[must_use]
    pub fn type_string(&self) -> &str {
        &self.type_string
    }

    /// Returns whether the type string names the given element kind.
    #[must_use]
    pub fn has_element_tag(&self, kind: ElementKind) -> bool {
        self.type_string.contains(kind.letter())
    }

    /// Returns the data rule block, if any.
    #[must_use]
    pub fn data_rules(&self) -> Option<&DataRules> {
        self.data_rules.as_ref()
    }

    /// Returns the data rule block for in-place tightening.
    #[must_use]
    pub fn data_rules_mut(&mut self) -> Option<&mut DataRules> {
        self.data_rules.as_mut()
    }

    /// Installs or removes the data rule block.
    pub fn set_data_rules(&mut self, rules: Option<DataRules>) {
        self.data_rules = rules;
    }

    /// Returns the bind rule block, if any.
    #[must_use]
    pub fn bind_rules(&self) -> Option<&BindRules> {
        self.bind_rules.as_ref()
    }

    /// Returns the bind rule block for in-place tightening.
    #[must_use]
    pub fn bind_rules_mut(&mut self) -> Option<&mut BindRules> {
        self.bind_rules.as_mut()
    }

    /// Installs or removes the bind rule block.
    pub fn set_bind_rules(&mut self, rules: Option<BindRules>) {
        self.bind_rules = rules;
    }

    /// Returns the control rule block, if any.
    #[must_use]
    pub fn control_rules(&self) -> Option<&ControlRules> {
        self.control_rules.as_ref()
    }

    /// Returns the control rule block for in-place tightening.
    #[must_use]
    pub fn control_rules_mut(&mut self) -> Option<&mut ControlRules> {
        self.control_rules.as_mut()
    }

    /// Installs or removes the control rule block.
    pub fn set_control_rules(&mut self, rules: Option<ControlRules>) {
        self.control_rules = rules;
    }

    /// Returns whether this question's control node may nest children.
    #[must_use]
    pub fn control_node_can_have_children(&self) -> bool {
        self.control_node_can_have_children
    }

    /// Sets whether this question's control node may nest children.
    pub fn set_control_node_can_have_children(&mut self, value: bool) {
        self.control_node_can_have_children = value;
    }

    /// Returns the control tag names valid as children of this control
    /// node (empty means any, when children are allowed at all).
    #[must_use]
    pub fn control_node_allowed_children(&self) -> &[String] {
        &self.control_node_allowed_children
    }

    /// Sets the control tag names valid as children of this control node.
    pub fn set_control_node_allowed_children(&mut self, children: Vec<String>) {
        self.control_node_allowed_children = children;
    }

    /// Returns whether this question's data node may nest children.
    #[must_use]
    pub fn data_node_can_have_children(&self) -> bool {
        self.data_node_can_have_children
    }

    /// Sets whether this question's data node may nest children.
    pub fn set_data_node_can_have_children(&mut self, value: bool) {
        self.data_node_can_have_children = value;
    }

    /// Returns the mug this schema validates, if one is attached.
    #[must_use]
    pub fn mug(&self) -> Option<&Mug> {
        self.mug.as_ref()
    }

    /// Returns the attached mug for in-place attribute edits.
    #[must_use]
    pub fn mug_mut(&mut self) -> Option<&mut Mug> {
        self.mug.as_mut()
    }

    /// Attaches (or replaces) the mug this schema validates.
    pub fn set_mug(&mut self, mug: Mug) {
        self.mug = Some(mug);
    }

    /// Validates the attached mug against this schema.
    ///
    /// Two independent checks must pass: the type string must agree with
    /// the rule blocks actually present, and every attribute must
    /// conform to its rule. The first violation found is returned;
    /// validation never mutates anything.
    pub fn validate_mug(&self) -> Result<(), ValidationFailure> {
        let mug = self.mug.as_ref().ok_or_else(|| {
            ValidationFailure::new(
                ValidationErrorKind::MissingMug,
                None,
                None,
                "mug type has no mug attached to validate",
            )
        })?;

        self.check_type_string()?;
        self.check_declared_rules(mug)?;
        self.check_undeclared_attributes(mug)
    }

    fn has_rule_block(&self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Data => self.data_rules.is_some(),
            ElementKind::Bind => self.bind_rules.is_some(),
            ElementKind::Control => self.control_rules.is_some(),
        }
    }

    fn check_type_string(&self) -> Result<(), ValidationFailure> {
        for kind in ElementKind::ALL {
            let has_block = self.has_rule_block(kind);
            let has_tag = self.has_element_tag(kind);

            if has_block && !has_tag {
                return Err(ValidationFailure::new(
                    ValidationErrorKind::TypeStringMismatch,
                    Some(kind),
                    None,
                    format!(
                        "schema has a {} rule block but no '{}' in its type string '{}'",
                        kind.as_str(),
                        kind.letter(),
                        self.type_string
                    ),
                ));
            }
            if !has_block && has_tag {
                return Err(ValidationFailure::new(
                    ValidationErrorKind::TypeStringMismatch,
                    Some(kind),
                    None,
                    format!(
                        "type string '{}' has '{}' but the schema has no {} rule block",
                        self.type_string,
                        kind.letter(),
                        kind.as_str()
                    ),
                ));
            }
        }

        Ok(())
    }

    fn check_declared_rules(&self, mug: &Mug) -> Result<(), ValidationFailure> {
        if let Some(rules) = &self.data_rules {
            let element = mug
                .data_element()
                .ok_or_else(|| missing_element(ElementKind::Data))?;
            for attribute in DataAttribute::ALL {
                if let Some(rule) = rules.rule(attribute) {
                    self.check_rule(
                        ElementKind::Data,
                        attribute.as_str(),
                        rule,
                        element.attribute(attribute),
                        mug,
                    )?;
                }
            }
        }

        if let Some(rules) = &self.bind_rules {
            let element = mug
                .bind_element()
                .ok_or_else(|| missing_element(ElementKind::Bind))?;
            for attribute in BindAttribute::ALL {
                if let Some(rule) = rules.rule(attribute) {
                    self.check_rule(
                        ElementKind::Bind,
                        attribute.as_str(),
                        rule,
                        element.attribute(attribute),
                        mug,
                    )?;
                }
            }
        }

        if let Some(rules) = &self.control_rules {
            let element = mug
                .control_element()
                .ok_or_else(|| missing_element(ElementKind::Control))?;
            for attribute in ControlAttribute::ALL {
                if let Some(rule) = rules.rule(attribute) {
                    self.check_rule(
                        ElementKind::Control,
                        attribute.as_str(),
                        rule,
                        element.attribute(attribute),
                        mug,
                    )?;
                }
            }
        }

        Ok(())
    }

    fn check_rule(
        &self,
        block: ElementKind,
        key: &str,
        rule: &PropertyRule,
        value: Option<&str>,
        mug: &Mug,
    ) -> Result<(), ValidationFailure> {
        // A cross-field check overrides the simple presence verdict.
        if let Some(check) = rule.validation() {
            return check.run(mug).map_err(|message| {
                ValidationFailure::new(
                    ValidationErrorKind::RuleViolation,
                    Some(block),
                    Some(key.to_owned()),
                    format!("\"{key}\" in block {}: {message}", block.as_str()),
                )
            });
        }

        let set = is_set(value);
        match rule.presence() {
            Presence::Optional => Ok(()),
            Presence::Required if set => Ok(()),
            Presence::Required => Err(ValidationFailure::new(
                ValidationErrorKind::RuleViolation,
                Some(block),
                Some(key.to_owned()),
                format!(
                    "\"{key}\" is required in block {} but is not set",
                    block.as_str()
                ),
            )),
            Presence::NotAllowed if !set => Ok(()),
            Presence::NotAllowed => Err(ValidationFailure::new(
                ValidationErrorKind::RuleViolation,
                Some(block),
                Some(key.to_owned()),
                format!("\"{key}\" is not allowed in block {}", block.as_str()),
            )),
        }
    }

    /// Reverse sweep: flags attributes the mug carries that no rule in
    /// the schema governs, catching schema drift. Short-circuits on the
    /// first hit, like the forward pass.
    fn check_undeclared_attributes(&self, mug: &Mug) -> Result<(), ValidationFailure> {
        if let Some(element) = mug.data_element() {
            let rules = self.data_rules.as_ref();
            for attribute in DataAttribute::ALL {
                if element.attribute(attribute).is_some()
                    && rules.and_then(|block| block.rule(attribute)).is_none()
                {
                    return Err(missing_rule(ElementKind::Data, attribute.as_str()));
                }
            }
        }

        if let Some(element) = mug.bind_element() {
            let rules = self.bind_rules.as_ref();
            for attribute in BindAttribute::ALL {
                if element.attribute(attribute).is_some()
                    && rules.and_then(|block| block.rule(attribute)).is_none()
                {
                    return Err(missing_rule(ElementKind::Bind, attribute.as_str()));
                }
            }
        }

        if let Some(element) = mug.control_element() {
            let rules = self.control_rules.as_ref();
            for attribute in ControlAttribute::ALL {
                if element.attribute(attribute).is_some()
                    && rules.and_then(|block| block.rule(attribute)).is_none()
                {
                    return Err(missing_rule(ElementKind::Control, attribute.as_str()));
                }
            }
        }

        Ok(())
    }
}

fn is_set(value: Option<&str>) -> bool {
    // Empty counts as unset; the single-space factory placeholder does not.
    value.is_some_and(|text| !text.is_empty())
}

fn missing_element(kind: ElementKind) -> ValidationFailure {
    ValidationFailure::new(
        ValidationErrorKind::MissingElement,
        Some(kind),
        None,
        format!(
            "schema declares a {} rule block but the mug has no such element",
            kind.as_str()
        ),
    )
}

fn missing_rule(kind: ElementKind, key: &str) -> ValidationFailure {
    ValidationFailure::new(
        ValidationErrorKind::MissingRule,
        Some(kind),
        Some(key.to_owned()),
        format!("{} has attribute \"{key}\" but no rule governs it in the mug type", kind.as_str()),
    )
}

impl Display for MugType {
    fn fmt(&self, formatter: &mut Formatter<'_>) -> std::fmt::Result {
        match self.mug.as_ref().and_then(Mug::bind_element_id) {
            Some(node_id) => write!(formatter, "{node_id}"),
            None => write!(formatter, "{}", self.type_name),
        }
    }
}
