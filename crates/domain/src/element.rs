use std::str::FromStr;

use formloom_core::{AppError, Ufid};
use serde::{Deserialize, Serialize};

/// The three element facets a question can be composed of.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ElementKind {
    /// Persisted data storage facet.
    Data,
    /// Binding/transform facet.
    Bind,
    /// UI control facet.
    Control,
}

impl ElementKind {
    /// All element kinds in validation order.
    pub const ALL: [Self; 3] = [Self::Data, Self::Bind, Self::Control];

    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Data => "data_element",
            Self::Bind => "bind_element",
            Self::Control => "control_element",
        }
    }

    /// Returns the single-character tag used in mug-type type strings.
    #[must_use]
    pub fn letter(&self) -> char {
        match self {
            Self::Data => 'd',
            Self::Bind => 'b',
            Self::Control => 'c',
        }
    }
}

impl FromStr for ElementKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "data_element" => Ok(Self::Data),
            "bind_element" => Ok(Self::Bind),
            "control_element" => Ok(Self::Control),
            _ => Err(AppError::Validation(format!(
                "unknown element kind '{value}'"
            ))),
        }
    }
}

/// Attributes of a data element, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DataAttribute {
    /// Question node identifier in the persisted data layout.
    NodeId,
    /// Default data value.
    DataValue,
}

impl DataAttribute {
    /// All data attributes in declaration order.
    pub const ALL: [Self; 2] = [Self::NodeId, Self::DataValue];

    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeId => "node_id",
            Self::DataValue => "data_value",
        }
    }
}

/// Attributes of a bind element, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BindAttribute {
    /// Question node identifier the bind points at.
    NodeId,
    /// XSD data type token.
    DataType,
    /// Relevancy expression.
    RelevantAttr,
    /// Calculate expression.
    CalculateAttr,
    /// Constraint expression.
    ConstraintAttr,
    /// Message shown when the constraint fails.
    ConstraintMsgAttr,
}

impl BindAttribute {
    /// All bind attributes in declaration order.
    pub const ALL: [Self; 6] = [
        Self::NodeId,
        Self::DataType,
        Self::RelevantAttr,
        Self::CalculateAttr,
        Self::ConstraintAttr,
        Self::ConstraintMsgAttr,
    ];

    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::NodeId => "node_id",
            Self::DataType => "data_type",
            Self::RelevantAttr => "relevant_attr",
            Self::CalculateAttr => "calculate_attr",
            Self::ConstraintAttr => "constraint_attr",
            Self::ConstraintMsgAttr => "constraint_msg_attr",
        }
    }
}

/// Attributes of a control element, in declaration order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ControlAttribute {
    /// Question type name token (e.g. `Text`).
    Name,
    /// Control tag name token (e.g. `input`).
    TagName,
    /// Plain label.
    Label,
    /// Plain hint label.
    HintLabel,
    /// Itext reference for the label.
    LabelItext,
    /// Itext reference for the hint.
    HintItext,
    /// Default value shown by the control.
    DefaultValue,
}

impl ControlAttribute {
    /// All control attributes in declaration order.
    pub const ALL: [Self; 7] = [
        Self::Name,
        Self::TagName,
        Self::Label,
        Self::HintLabel,
        Self::LabelItext,
        Self::HintItext,
        Self::DefaultValue,
    ];

    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::TagName => "tag_name",
            Self::Label => "label",
            Self::HintLabel => "hint_label",
            Self::LabelItext => "label_itext",
            Self::HintItext => "hint_itext",
            Self::DefaultValue => "default_value",
        }
    }
}

/// Final resting place of data entered by the user or manipulated by
/// the form.
///
/// No validation happens at this layer; validity is entirely the rule
/// schema's responsibility.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DataElement {
    ufid: Ufid,
    node_id: Option<String>,
    data_value: Option<String>,
}

impl DataElement {
    /// Creates an empty data element with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ufid: Ufid::new(),
            node_id: None,
            data_value: None,
        }
    }

    /// Returns the stable element identifier.
    #[must_use]
    pub fn ufid(&self) -> Ufid {
        self.ufid
    }

    /// Returns the question node identifier.
    #[must_use]
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Returns one attribute value.
    #[must_use]
    pub fn attribute(&self, attribute: DataAttribute) -> Option<&str> {
        match attribute {
            DataAttribute::NodeId => self.node_id.as_deref(),
            DataAttribute::DataValue => self.data_value.as_deref(),
        }
    }

    /// Sets one attribute value; `None` clears it.
    pub fn set_attribute(&mut self, attribute: DataAttribute, value: Option<String>) {
        match attribute {
            DataAttribute::NodeId => self.node_id = value,
            DataAttribute::DataValue => self.data_value = value,
        }
    }
}

impl Default for DataElement {
    fn default() -> Self {
        Self::new()
    }
}

/// The element that transforms data and hands it off to the data element.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BindElement {
    ufid: Ufid,
    node_id: Option<String>,
    data_type: Option<String>,
    relevant_attr: Option<String>,
    calculate_attr: Option<String>,
    constraint_attr: Option<String>,
    constraint_msg_attr: Option<String>,
}

impl BindElement {
    /// Creates an empty bind element with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ufid: Ufid::new(),
            node_id: None,
            data_type: None,
            relevant_attr: None,
            calculate_attr: None,
            constraint_attr: None,
            constraint_msg_attr: None,
        }
    }

    /// Returns the stable element identifier.
    #[must_use]
    pub fn ufid(&self) -> Ufid {
        self.ufid
    }

    /// Returns the question node identifier.
    #[must_use]
    pub fn node_id(&self) -> Option<&str> {
        self.node_id.as_deref()
    }

    /// Returns one attribute value.
    #[must_use]
    pub fn attribute(&self, attribute: BindAttribute) -> Option<&str> {
        match attribute {
            BindAttribute::NodeId => self.node_id.as_deref(),
            BindAttribute::DataType => self.data_type.as_deref(),
            BindAttribute::RelevantAttr => self.relevant_attr.as_deref(),
            BindAttribute::CalculateAttr => self.calculate_attr.as_deref(),
            BindAttribute::ConstraintAttr => self.constraint_attr.as_deref(),
            BindAttribute::ConstraintMsgAttr => self.constraint_msg_attr.as_deref(),
        }
    }

    /// Sets one attribute value; `None` clears it.
    pub fn set_attribute(&mut self, attribute: BindAttribute, value: Option<String>) {
        match attribute {
            BindAttribute::NodeId => self.node_id = value,
            BindAttribute::DataType => self.data_type = value,
            BindAttribute::RelevantAttr => self.relevant_attr = value,
            BindAttribute::CalculateAttr => self.calculate_attr = value,
            BindAttribute::ConstraintAttr => self.constraint_attr = value,
            BindAttribute::ConstraintMsgAttr => self.constraint_msg_attr = value,
        }
    }
}

impl Default for BindElement {
    fn default() -> Self {
        Self::new()
    }
}

/// The element seen by the user during an entry session, usually a
/// question prompt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ControlElement {
    ufid: Ufid,
    name: Option<String>,
    tag_name: Option<String>,
    label: Option<String>,
    hint_label: Option<String>,
    label_itext: Option<String>,
    hint_itext: Option<String>,
    default_value: Option<String>,
}

impl ControlElement {
    /// Creates an empty control element with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ufid: Ufid::new(),
            name: None,
            tag_name: None,
            label: None,
            hint_label: None,
            label_itext: None,
            hint_itext: None,
            default_value: None,
        }
    }

    /// Returns the stable element identifier.
    #[must_use]
    pub fn ufid(&self) -> Ufid {
        self.ufid
    }

    /// Returns the question type name token.
    #[must_use]
    pub fn name(&self) -> Option<&str> {
        self.name.as_deref()
    }

    /// Returns the control tag name token.
    #[must_use]
    pub fn tag_name(&self) -> Option<&str> {
        self.tag_name.as_deref()
    }

    /// Returns the plain label.
    #[must_use]
    pub fn label(&self) -> Option<&str> {
        self.label.as_deref()
    }

    /// Returns one attribute value.
    #[must_use]
    pub fn attribute(&self, attribute: ControlAttribute) -> Option<&str> {
        match attribute {
            ControlAttribute::Name => self.name.as_deref(),
            ControlAttribute::TagName => self.tag_name.as_deref(),
            ControlAttribute::Label => self.label.as_deref(),
            ControlAttribute::HintLabel => self.hint_label.as_deref(),
            ControlAttribute::LabelItext => self.label_itext.as_deref(),
            ControlAttribute::HintItext => self.hint_itext.as_deref(),
            ControlAttribute::DefaultValue => self.default_value.as_deref(),
        }
    }

    /// Sets one attribute value; `None` clears it.
    pub fn set_attribute(&mut self, attribute: ControlAttribute, value: Option<String>) {
        match attribute {
            ControlAttribute::Name => self.name = value,
            ControlAttribute::TagName => self.tag_name = value,
            ControlAttribute::Label => self.label = value,
            ControlAttribute::HintLabel => self.hint_label = value,
            ControlAttribute::LabelItext => self.label_itext = value,
            ControlAttribute::HintItext => self.hint_itext = value,
            ControlAttribute::DefaultValue => self.default_value = value,
        }
    }
}

impl Default for ControlElement {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::{
        BindAttribute, BindElement, ControlAttribute, ControlElement, DataAttribute, DataElement,
    };

    #[test]
    fn data_element_attributes_round_trip() {
        let mut element = DataElement::new();
        element.set_attribute(DataAttribute::NodeId, Some("question1".to_owned()));

        assert_eq!(element.node_id(), Some("question1"));
        assert_eq!(element.attribute(DataAttribute::NodeId), Some("question1"));
        assert_eq!(element.attribute(DataAttribute::DataValue), None);
    }

    #[test]
    fn bind_element_clears_attribute_with_none() {
        let mut element = BindElement::new();
        element.set_attribute(BindAttribute::ConstraintAttr, Some(". > 5".to_owned()));
        element.set_attribute(BindAttribute::ConstraintAttr, None);

        assert_eq!(element.attribute(BindAttribute::ConstraintAttr), None);
    }

    #[test]
    fn control_elements_get_distinct_ufids() {
        let first = ControlElement::new();
        let second = ControlElement::new();
        assert_ne!(first.ufid(), second.ufid());
    }

    #[test]
    fn attribute_order_is_stable() {
        assert_eq!(ControlAttribute::ALL[0].as_str(), "name");
        assert_eq!(ControlAttribute::ALL[1].as_str(), "tag_name");
        assert_eq!(BindAttribute::ALL[5].as_str(), "constraint_msg_attr");
    }
}
