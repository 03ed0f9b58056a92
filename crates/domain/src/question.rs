//! Question-type builders and the mug factory.
//!
//! Concrete question schemas are composed from scratch out of shared
//! rule-set constructors and then tightened, instead of cloning and
//! mutating a shared prototype; specialization mistakes surface as
//! loud construction failures, never as corrupted shared state.

use std::str::FromStr;

use formloom_core::{AppError, AppResult};
use serde::{Deserialize, Serialize};

use crate::element::{
    BindAttribute, BindElement, ControlAttribute, ControlElement, DataAttribute, DataElement,
};
use crate::error::{ModelError, ModelResult, MugCreationError};
use crate::mug::Mug;
use crate::mug_type::{BindRules, ControlRules, DataRules, MugType};
use crate::ports::QuestionIdGenerator;
use crate::rule::{CrossFieldCheck, Editable, Presence, PropertyRule, Visibility};
use crate::vocab::Vocabulary;

/// The concrete question kinds the editor can create.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum QuestionKind {
    /// Free text input.
    Text,
    /// Select-list item.
    Item,
    /// Trigger/message prompt.
    Trigger,
    /// Multiple-choice select.
    MultiSelect,
    /// Nesting group.
    Group,
}

impl QuestionKind {
    /// Returns stable storage value.
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Text => "text",
            Self::Item => "item",
            Self::Trigger => "trigger",
            Self::MultiSelect => "multi_select",
            Self::Group => "group",
        }
    }

    /// Builds the fully validated schema (and mug) for this kind.
    pub fn build(
        &self,
        vocabulary: &Vocabulary,
        ids: &dyn QuestionIdGenerator,
    ) -> ModelResult<MugType> {
        match self {
            Self::Text => text_question(vocabulary, ids),
            Self::Item => item(vocabulary, ids),
            Self::Trigger => trigger(vocabulary, ids),
            Self::MultiSelect => multi_select(vocabulary, ids),
            Self::Group => group(vocabulary, ids),
        }
    }
}

impl FromStr for QuestionKind {
    type Err = AppError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "text" => Ok(Self::Text),
            "item" => Ok(Self::Item),
            "trigger" => Ok(Self::Trigger),
            "multi_select" => Ok(Self::MultiSelect),
            "group" => Ok(Self::Group),
            _ => Err(AppError::Validation(format!(
                "unknown question kind '{value}'"
            ))),
        }
    }
}

fn rule(editable: Editable, visibility: Visibility, presence: Presence) -> PropertyRule {
    PropertyRule::new(editable, visibility, presence)
}

fn root_data_rules() -> DataRules {
    let mut rules = DataRules::default();
    rules.set_rule(
        DataAttribute::NodeId,
        Some(
            rule(Editable::Write, Visibility::Visible, Presence::Required)
                .with_lstring("Question ID"),
        ),
    );
    rules.set_rule(
        DataAttribute::DataValue,
        Some(
            rule(Editable::Write, Visibility::Visible, Presence::Optional)
                .with_lstring("Default Data Value"),
        ),
    );
    rules
}

fn root_bind_rules(vocabulary: &Vocabulary) -> BindRules {
    let mut rules = BindRules::default();
    rules.set_rule(
        BindAttribute::NodeId,
        Some(rule(Editable::Write, Visibility::Hidden, Presence::Optional)),
    );
    rules.set_rule(
        BindAttribute::DataType,
        Some(
            rule(Editable::Write, Visibility::Hidden, Presence::Optional)
                .with_values(vocabulary.xsd_data_types().to_vec()),
        ),
    );
    rules.set_rule(
        BindAttribute::RelevantAttr,
        Some(rule(
            Editable::Write,
            Visibility::Visible,
            Presence::Optional,
        )),
    );
    rules.set_rule(
        BindAttribute::CalculateAttr,
        Some(rule(
            Editable::Write,
            Visibility::Visible,
            Presence::Optional,
        )),
    );
    rules.set_rule(
        BindAttribute::ConstraintAttr,
        Some(rule(
            Editable::Write,
            Visibility::Visible,
            Presence::Optional,
        )),
    );
    rules.set_rule(
        BindAttribute::ConstraintMsgAttr,
        Some(
            rule(Editable::Write, Visibility::Hidden, Presence::Optional)
                .with_validation(CrossFieldCheck::ConstraintMsgRequiresConstraint),
        ),
    );
    rules
}

fn root_control_rules(vocabulary: &Vocabulary) -> ControlRules {
    let mut rules = ControlRules::default();
    rules.set_rule(
        ControlAttribute::Name,
        Some(
            rule(Editable::Write, Visibility::Hidden, Presence::Required)
                .with_values(vocabulary.question_type_names().to_vec())
                .with_lstring("Question Type"),
        ),
    );
    rules.set_rule(
        ControlAttribute::TagName,
        Some(
            rule(Editable::Read, Visibility::Hidden, Presence::Required)
                .with_values(vocabulary.control_tag_names().to_vec()),
        ),
    );
    rules.set_rule(
        ControlAttribute::Label,
        Some(rule(Editable::Write, Visibility::Hidden, Presence::Required)),
    );
    rules.set_rule(
        ControlAttribute::HintLabel,
        Some(rule(Editable::Write, Visibility::Hidden, Presence::Optional)),
    );
    rules.set_rule(
        ControlAttribute::LabelItext,
        Some(
            rule(Editable::Write, Visibility::Visible, Presence::Optional)
                .with_lstring("Question Text"),
        ),
    );
    rules.set_rule(
        ControlAttribute::HintItext,
        Some(
            rule(Editable::Write, Visibility::Hidden, Presence::Optional)
                .with_lstring("Question Extra Information"),
        ),
    );
    rules
}

/// Base shape with data and bind elements only.
pub fn data_bind(vocabulary: &Vocabulary) -> AppResult<MugType> {
    let mut mug_type = MugType::new("Data + bind mug", "db")?;
    mug_type.set_data_rules(Some(root_data_rules()));
    mug_type.set_bind_rules(Some(root_bind_rules(vocabulary)));
    Ok(mug_type)
}

/// Base shape with data, bind, and control elements.
pub fn data_bind_control(vocabulary: &Vocabulary) -> AppResult<MugType> {
    let mut mug_type = MugType::new("Data + bind + control mug", "dbc")?;
    mug_type.set_data_rules(Some(root_data_rules()));
    mug_type.set_bind_rules(Some(root_bind_rules(vocabulary)));
    mug_type.set_control_rules(Some(root_control_rules(vocabulary)));
    Ok(mug_type)
}

/// Base shape with data and control elements only.
pub fn data_control(vocabulary: &Vocabulary) -> AppResult<MugType> {
    let mut mug_type = MugType::new("Data + control mug", "dc")?;
    mug_type.set_data_rules(Some(root_data_rules()));
    mug_type.set_control_rules(Some(root_control_rules(vocabulary)));
    Ok(mug_type)
}

/// Base shape with a data element only.
pub fn data_only(_vocabulary: &Vocabulary) -> AppResult<MugType> {
    let mut mug_type = MugType::new("Data only mug", "d")?;
    mug_type.set_data_rules(Some(root_data_rules()));
    Ok(mug_type)
}

/// Base shape with a control element only.
pub fn control_only(vocabulary: &Vocabulary) -> AppResult<MugType> {
    let mut mug_type = MugType::new("Control only mug", "c")?;
    mug_type.set_control_rules(Some(root_control_rules(vocabulary)));
    Ok(mug_type)
}

fn default_for(rule: Option<&PropertyRule>) -> Option<String> {
    let rule = rule?;
    if !rule.values().is_empty() && rule.presence() != Presence::NotAllowed {
        return Some(rule.values()[0].clone());
    }
    match rule.presence() {
        // Single-space placeholder: set, but obviously not real content.
        Presence::Required | Presence::Optional => Some(" ".to_owned()),
        Presence::NotAllowed => None,
    }
}

/// Builds a new mug with default values from the schema's rules and
/// attaches it to the schema.
///
/// Every required or optional attribute gets a single-space placeholder,
/// or the first allowed value where the rule restricts values. Node ids
/// come from the injected generator; when both data and bind node ids
/// are generated, the bind node id is forced equal to the data node id.
/// The attached mug is validated immediately: construction is
/// all-or-nothing, and the error keeps the schema and mug for
/// diagnostics.
pub fn create_mug_from_mug_type(
    mut mug_type: MugType,
    ids: &dyn QuestionIdGenerator,
) -> Result<MugType, MugCreationError> {
    let mut mug = Mug::new();

    if let Some(rules) = mug_type.data_rules() {
        let mut element = DataElement::new();
        for attribute in DataAttribute::ALL {
            element.set_attribute(attribute, default_for(rules.rule(attribute)));
        }
        if element.attribute(DataAttribute::NodeId).is_some() {
            element.set_attribute(DataAttribute::NodeId, Some(ids.next_question_id()));
        }
        mug.set_data_element(element);
    }

    if let Some(rules) = mug_type.bind_rules() {
        let mut element = BindElement::new();
        for attribute in BindAttribute::ALL {
            element.set_attribute(attribute, default_for(rules.rule(attribute)));
        }
        if element.attribute(BindAttribute::NodeId).is_some() {
            let node_id = mug
                .data_element_id()
                .map(ToOwned::to_owned)
                .unwrap_or_else(|| ids.next_question_id());
            element.set_attribute(BindAttribute::NodeId, Some(node_id));
        }
        mug.set_bind_element(element);
    }

    if let Some(rules) = mug_type.control_rules() {
        let mut element = ControlElement::new();
        for attribute in ControlAttribute::ALL {
            element.set_attribute(attribute, default_for(rules.rule(attribute)));
        }
        mug.set_control_element(element);
    }

    mug_type.set_mug(mug);

    match mug_type.validate_mug() {
        Ok(()) => Ok(mug_type),
        Err(failure) => {
            tracing::error!(
                mug_type = %mug_type,
                failure = %failure,
                "newly constructed mug failed validation"
            );
            Err(MugCreationError::new(failure, mug_type))
        }
    }
}

fn set_control_tokens(mug_type: &mut MugType, name: &str, tag_name: &str) {
    if let Some(control) = mug_type.mug_mut().and_then(Mug::control_element_mut) {
        control.set_attribute(ControlAttribute::Name, Some(name.to_owned()));
        control.set_attribute(ControlAttribute::TagName, Some(tag_name.to_owned()));
    }
}

fn revalidate(mug_type: MugType) -> ModelResult<MugType> {
    match mug_type.validate_mug() {
        Ok(()) => Ok(mug_type),
        Err(failure) => {
            tracing::error!(
                mug_type = %mug_type,
                failure = %failure,
                "question specialization broke a schema invariant"
            );
            Err(ModelError::from(MugCreationError::new(failure, mug_type)))
        }
    }
}

/// Builds the standard free-text question.
pub fn text_question(
    vocabulary: &Vocabulary,
    ids: &dyn QuestionIdGenerator,
) -> ModelResult<MugType> {
    let mut mug_type = data_bind_control(vocabulary)?;
    mug_type.set_type_name("Text question")?;

    let mut mug_type = create_mug_from_mug_type(mug_type, ids)?;
    set_control_tokens(&mut mug_type, "Text", "input");
    revalidate(mug_type)
}

/// Builds the select-list item.
///
/// Items carry no hints and must carry a value of their own.
pub fn item(vocabulary: &Vocabulary, ids: &dyn QuestionIdGenerator) -> ModelResult<MugType> {
    let mut mug_type = control_only(vocabulary)?;
    mug_type.set_type_name("Item")?;

    if let Some(rules) = mug_type.control_rules_mut() {
        if let Some(hint_label) = rules.rule_mut(ControlAttribute::HintLabel) {
            hint_label.set_presence(Presence::NotAllowed);
        }
        if let Some(hint_itext) = rules.rule_mut(ControlAttribute::HintItext) {
            hint_itext.set_presence(Presence::NotAllowed);
        }
        rules.set_rule(
            ControlAttribute::DefaultValue,
            Some(
                rule(Editable::Write, Visibility::Visible, Presence::Required)
                    .with_lstring("Item Value"),
            ),
        );
    }

    let mut mug_type = create_mug_from_mug_type(mug_type, ids)?;
    set_control_tokens(&mut mug_type, "Item", "item");
    revalidate(mug_type)
}

/// Builds the trigger/message prompt.
///
/// Triggers store no value, so the control default value and the bind
/// data type are both disallowed.
pub fn trigger(vocabulary: &Vocabulary, ids: &dyn QuestionIdGenerator) -> ModelResult<MugType> {
    let mut mug_type = data_bind_control(vocabulary)?;
    mug_type.set_type_name("Trigger/message question")?;

    if let Some(rules) = mug_type.control_rules_mut() {
        rules.set_rule(
            ControlAttribute::DefaultValue,
            Some(rule(
                Editable::Write,
                Visibility::Hidden,
                Presence::NotAllowed,
            )),
        );
    }
    if let Some(rules) = mug_type.bind_rules_mut() {
        if let Some(data_type) = rules.rule_mut(BindAttribute::DataType) {
            data_type.set_presence(Presence::NotAllowed);
        }
    }

    let mut mug_type = create_mug_from_mug_type(mug_type, ids)?;
    set_control_tokens(&mut mug_type, "Trigger", "trigger");
    revalidate(mug_type)
}

/// Builds the multiple-choice select question; items nest under it.
pub fn multi_select(
    vocabulary: &Vocabulary,
    ids: &dyn QuestionIdGenerator,
) -> ModelResult<MugType> {
    let mut mug_type = data_bind_control(vocabulary)?;
    mug_type.set_type_name("Multi-select question")?;
    mug_type.set_control_node_can_have_children(true);
    mug_type.set_control_node_allowed_children(vec!["item".to_owned()]);

    let mut mug_type = create_mug_from_mug_type(mug_type, ids)?;
    set_control_tokens(&mut mug_type, "Multi-Select", "select");
    if let Some(bind) = mug_type.mug_mut().and_then(Mug::bind_element_mut) {
        bind.set_attribute(BindAttribute::DataType, Some("xsd:select".to_owned()));
    }
    revalidate(mug_type)
}

/// Builds the nesting group question.
pub fn group(vocabulary: &Vocabulary, ids: &dyn QuestionIdGenerator) -> ModelResult<MugType> {
    let mut mug_type = data_bind_control(vocabulary)?;
    mug_type.set_type_name("Group")?;
    mug_type.set_control_node_can_have_children(true);
    mug_type.set_control_node_allowed_children(
        ["repeat", "input", "select", "select1", "group"]
            .iter()
            .map(|tag| (*tag).to_owned())
            .collect(),
    );
    if let Some(rules) = mug_type.bind_rules_mut() {
        if let Some(data_type) = rules.rule_mut(BindAttribute::DataType) {
            data_type.set_presence(Presence::NotAllowed);
        }
    }

    let mut mug_type = create_mug_from_mug_type(mug_type, ids)?;
    set_control_tokens(&mut mug_type, "Group", "group");
    revalidate(mug_type)
}

#[cfg(test)]
mod tests {
    use std::cell::Cell;
    use std::str::FromStr;

    use super::{QuestionKind, create_mug_from_mug_type, data_bind};
    use crate::element::{BindAttribute, ControlAttribute, DataAttribute};
    use crate::error::ValidationErrorKind;
    use crate::mug::Mug;
    use crate::mug_type::MugType;
    use crate::ports::QuestionIdGenerator;
    use crate::rule::Presence;
    use crate::vocab::Vocabulary;

    struct CountingIds(Cell<usize>);

    impl CountingIds {
        fn new() -> Self {
            Self(Cell::new(0))
        }
    }

    impl QuestionIdGenerator for CountingIds {
        fn next_question_id(&self) -> String {
            self.0.set(self.0.get() + 1);
            format!("question{}", self.0.get())
        }
    }

    fn build(kind: QuestionKind) -> MugType {
        kind.build(&Vocabulary::default(), &CountingIds::new())
            .unwrap_or_else(|_| unreachable!())
    }

    #[test]
    fn every_question_kind_builds_a_valid_mug() {
        for kind in [
            QuestionKind::Text,
            QuestionKind::Item,
            QuestionKind::Trigger,
            QuestionKind::MultiSelect,
            QuestionKind::Group,
        ] {
            let mug_type = build(kind);
            assert!(mug_type.validate_mug().is_ok(), "{} failed", kind.as_str());
        }
    }

    #[test]
    fn text_question_carries_its_control_tokens() {
        let mug_type = build(QuestionKind::Text);
        let control = mug_type
            .mug()
            .and_then(Mug::control_element)
            .unwrap_or_else(|| unreachable!());
        assert_eq!(control.name(), Some("Text"));
        assert_eq!(control.tag_name(), Some("input"));
    }

    #[test]
    fn bind_node_id_matches_data_node_id() {
        let mug_type = build(QuestionKind::Text);
        let mug = mug_type.mug().unwrap_or_else(|| unreachable!());
        assert_eq!(mug.bind_element_id(), mug.data_element_id());
        assert_eq!(mug.data_element_id(), Some("question1"));
    }

    #[test]
    fn generated_question_ids_are_sequential_across_builds() {
        let ids = CountingIds::new();
        let vocabulary = Vocabulary::default();
        let first = QuestionKind::Text
            .build(&vocabulary, &ids)
            .unwrap_or_else(|_| unreachable!());
        let second = QuestionKind::Text
            .build(&vocabulary, &ids)
            .unwrap_or_else(|_| unreachable!());

        let first_id = first
            .mug()
            .and_then(Mug::data_element_id)
            .unwrap_or_else(|| unreachable!());
        let second_id = second
            .mug()
            .and_then(Mug::data_element_id)
            .unwrap_or_else(|| unreachable!());
        assert_eq!(first_id, "question1");
        assert_eq!(second_id, "question2");
    }

    #[test]
    fn item_disallows_hints_and_requires_a_value() {
        let mug_type = build(QuestionKind::Item);
        assert_eq!(mug_type.type_string(), "c");

        let control = mug_type
            .mug()
            .and_then(Mug::control_element)
            .unwrap_or_else(|| unreachable!());
        assert_eq!(control.name(), Some("Item"));
        assert_eq!(control.tag_name(), Some("item"));
        assert_eq!(control.attribute(ControlAttribute::HintLabel), None);
        assert_eq!(control.attribute(ControlAttribute::DefaultValue), Some(" "));
    }

    #[test]
    fn item_with_a_hint_label_fails_revalidation() {
        let mut mug_type = build(QuestionKind::Item);
        if let Some(control) = mug_type.mug_mut().and_then(Mug::control_element_mut) {
            control.set_attribute(ControlAttribute::HintLabel, Some("a hint".to_owned()));
        }

        let failure = match mug_type.validate_mug() {
            Err(failure) => failure,
            Ok(()) => unreachable!(),
        };
        assert_eq!(failure.kind(), ValidationErrorKind::RuleViolation);
        assert_eq!(failure.key(), Some("hint_label"));
        assert!(failure.message().contains("not allowed"));
    }

    #[test]
    fn trigger_has_no_data_type_and_no_default_value() {
        let mug_type = build(QuestionKind::Trigger);
        let mug = mug_type.mug().unwrap_or_else(|| unreachable!());

        let bind = mug.bind_element().unwrap_or_else(|| unreachable!());
        assert_eq!(bind.attribute(BindAttribute::DataType), None);
        let control = mug.control_element().unwrap_or_else(|| unreachable!());
        assert_eq!(control.attribute(ControlAttribute::DefaultValue), None);
        assert_eq!(control.name(), Some("Trigger"));
    }

    #[test]
    fn multi_select_allows_item_children_and_selects_its_data_type() {
        let mug_type = build(QuestionKind::MultiSelect);
        assert!(mug_type.control_node_can_have_children());
        assert_eq!(mug_type.control_node_allowed_children(), ["item"]);

        let bind = mug_type
            .mug()
            .and_then(Mug::bind_element)
            .unwrap_or_else(|| unreachable!());
        assert_eq!(bind.attribute(BindAttribute::DataType), Some("xsd:select"));
    }

    #[test]
    fn group_disallows_a_bind_data_type_but_nests_controls() {
        let mug_type = build(QuestionKind::Group);
        assert!(mug_type.control_node_can_have_children());
        assert!(
            mug_type
                .control_node_allowed_children()
                .iter()
                .any(|tag| tag == "group")
        );

        let bind = mug_type
            .mug()
            .and_then(Mug::bind_element)
            .unwrap_or_else(|| unreachable!());
        assert_eq!(bind.attribute(BindAttribute::DataType), None);
    }

    #[test]
    fn data_type_defaults_to_the_first_allowed_value() {
        let mug_type = build(QuestionKind::Text);
        let bind = mug_type
            .mug()
            .and_then(Mug::bind_element)
            .unwrap_or_else(|| unreachable!());
        assert_eq!(bind.attribute(BindAttribute::DataType), Some("xsd:string"));
    }

    #[test]
    fn factory_failure_keeps_the_schema_for_diagnostics() {
        // A bind-only type tag with a data rule block cannot validate.
        let vocabulary = Vocabulary::default();
        let mut mug_type = data_bind(&vocabulary).unwrap_or_else(|_| unreachable!());
        mug_type.set_bind_rules(None);

        let error = match create_mug_from_mug_type(mug_type, &CountingIds::new()) {
            Err(error) => error,
            Ok(_) => unreachable!(),
        };
        assert_eq!(
            error.failure().kind(),
            ValidationErrorKind::TypeStringMismatch
        );
        // The recovered schema still carries the mug that failed.
        assert!(error.into_mug_type().mug().is_some());
    }

    #[test]
    fn factory_uses_placeholders_for_unrestricted_attributes() {
        let mug_type = build(QuestionKind::Text);
        let mug = mug_type.mug().unwrap_or_else(|| unreachable!());

        let data = mug.data_element().unwrap_or_else(|| unreachable!());
        assert_eq!(data.attribute(DataAttribute::DataValue), Some(" "));
        let control = mug.control_element().unwrap_or_else(|| unreachable!());
        assert_eq!(control.attribute(ControlAttribute::Label), Some(" "));
    }

    #[test]
    fn question_kind_parses_storage_tokens() {
        let kind = QuestionKind::from_str("multi_select").unwrap_or_else(|_| unreachable!());
        assert_eq!(kind, QuestionKind::MultiSelect);
        assert!(QuestionKind::from_str("matrix").is_err());
    }

    #[test]
    fn required_presence_check_sees_trigger_defaults() {
        // The trigger keeps required control rules satisfied by its
        // factory defaults even with two rules tightened to not-allowed.
        let mug_type = build(QuestionKind::Trigger);
        if let Some(rules) = mug_type.control_rules() {
            let label = rules
                .rule(ControlAttribute::Label)
                .unwrap_or_else(|| unreachable!());
            assert_eq!(label.presence(), Presence::Required);
        }
    }
}
