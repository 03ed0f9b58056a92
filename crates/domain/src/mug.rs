use formloom_core::Ufid;
use serde::{Deserialize, Serialize};

use crate::element::{
    BindElement, ControlAttribute, ControlElement, DataElement, ElementKind,
};

/// The aggregate object representing one question: the combined data,
/// bind, and control elements in one of their valid combinations.
///
/// Which combination is valid for a given question kind is decided by
/// the owning [`MugType`](crate::MugType), not here.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Mug {
    ufid: Ufid,
    data_element: Option<DataElement>,
    bind_element: Option<BindElement>,
    control_element: Option<ControlElement>,
}

impl Mug {
    /// Creates an empty mug with a fresh identifier.
    #[must_use]
    pub fn new() -> Self {
        Self {
            ufid: Ufid::new(),
            data_element: None,
            bind_element: None,
            control_element: None,
        }
    }

    /// Returns the stable mug identifier.
    #[must_use]
    pub fn ufid(&self) -> Ufid {
        self.ufid
    }

    /// Returns the data element, if present.
    #[must_use]
    pub fn data_element(&self) -> Option<&DataElement> {
        self.data_element.as_ref()
    }

    /// Returns the data element for in-place attribute edits.
    #[must_use]
    pub fn data_element_mut(&mut self) -> Option<&mut DataElement> {
        self.data_element.as_mut()
    }

    /// Attaches (or replaces) the data element.
    pub fn set_data_element(&mut self, element: DataElement) {
        self.data_element = Some(element);
    }

    /// Returns the bind element, if present.
    #[must_use]
    pub fn bind_element(&self) -> Option<&BindElement> {
        self.bind_element.as_ref()
    }

    /// Returns the bind element for in-place attribute edits.
    #[must_use]
    pub fn bind_element_mut(&mut self) -> Option<&mut BindElement> {
        self.bind_element.as_mut()
    }

    /// Attaches (or replaces) the bind element.
    pub fn set_bind_element(&mut self, element: BindElement) {
        self.bind_element = Some(element);
    }

    /// Returns the control element, if present.
    #[must_use]
    pub fn control_element(&self) -> Option<&ControlElement> {
        self.control_element.as_ref()
    }

    /// Returns the control element for in-place attribute edits.
    #[must_use]
    pub fn control_element_mut(&mut self) -> Option<&mut ControlElement> {
        self.control_element.as_mut()
    }

    /// Attaches (or replaces) the control element.
    pub fn set_control_element(&mut self, element: ControlElement) {
        self.control_element = Some(element);
    }

    /// Returns whether the element of the given kind is present.
    #[must_use]
    pub fn has_element(&self, kind: ElementKind) -> bool {
        match kind {
            ElementKind::Data => self.data_element.is_some(),
            ElementKind::Bind => self.bind_element.is_some(),
            ElementKind::Control => self.control_element.is_some(),
        }
    }

    /// Returns the bind element's node identifier, if any.
    #[must_use]
    pub fn bind_element_id(&self) -> Option<&str> {
        self.bind_element.as_ref().and_then(BindElement::node_id)
    }

    /// Returns the data element's node identifier, if any.
    #[must_use]
    pub fn data_element_id(&self) -> Option<&str> {
        self.data_element.as_ref().and_then(DataElement::node_id)
    }

    /// Returns the name shown for this question: bind node id, falling
    /// back to data node id, falling back to the control label.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.bind_element_id()
            .or_else(|| self.data_element_id())
            .or_else(|| {
                self.control_element
                    .as_ref()
                    .and_then(|element| element.attribute(ControlAttribute::Label))
            })
    }
}

impl Default for Mug {
    fn default() -> Self {
        Self::new()
    }
}
