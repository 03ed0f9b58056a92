use serde::{Deserialize, Serialize};

/// Externally supplied allowed-value sets used by the rule schemas.
///
/// The first entry of each list doubles as the factory default for the
/// attribute the list governs, so order matters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Vocabulary {
    xsd_data_types: Vec<String>,
    question_type_names: Vec<String>,
    control_tag_names: Vec<String>,
}

impl Vocabulary {
    /// Creates a vocabulary from caller-supplied token sets.
    #[must_use]
    pub fn new(
        xsd_data_types: Vec<String>,
        question_type_names: Vec<String>,
        control_tag_names: Vec<String>,
    ) -> Self {
        Self {
            xsd_data_types,
            question_type_names,
            control_tag_names,
        }
    }

    /// Returns the valid XSD data type tokens for bind elements.
    #[must_use]
    pub fn xsd_data_types(&self) -> &[String] {
        &self.xsd_data_types
    }

    /// Returns the valid question type name tokens for control elements.
    #[must_use]
    pub fn question_type_names(&self) -> &[String] {
        &self.question_type_names
    }

    /// Returns the valid control tag name tokens.
    #[must_use]
    pub fn control_tag_names(&self) -> &[String] {
        &self.control_tag_names
    }
}

impl Default for Vocabulary {
    fn default() -> Self {
        let owned = |tokens: &[&str]| tokens.iter().map(|token| (*token).to_owned()).collect();

        Self {
            xsd_data_types: owned(&[
                "xsd:string",
                "xsd:int",
                "xsd:long",
                "xsd:double",
                "xsd:date",
                "xsd:time",
                "xsd:dateTime",
                "xsd:boolean",
                "xsd:select",
                "xsd:geopoint",
                "xsd:barcode",
            ]),
            question_type_names: owned(&[
                "Text",
                "Item",
                "Trigger",
                "Multi-Select",
                "Single-Select",
                "Group",
                "Repeat",
                "Secret",
            ]),
            control_tag_names: owned(&[
                "input",
                "item",
                "trigger",
                "select",
                "select1",
                "group",
                "repeat",
                "secret",
            ]),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::Vocabulary;

    #[test]
    fn default_vocabulary_leads_with_factory_defaults() {
        let vocabulary = Vocabulary::default();
        assert_eq!(vocabulary.xsd_data_types()[0], "xsd:string");
        assert_eq!(vocabulary.question_type_names()[0], "Text");
        assert_eq!(vocabulary.control_tag_names()[0], "input");
    }

    #[test]
    fn default_vocabulary_covers_the_selectable_tags() {
        let vocabulary = Vocabulary::default();
        for tag in ["item", "select", "select1", "group", "repeat"] {
            assert!(
                vocabulary
                    .control_tag_names()
                    .iter()
                    .any(|token| token == tag)
            );
        }
    }
}
