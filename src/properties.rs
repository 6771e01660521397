//! Properties sheet of a Spout capture source.
//!
//! Describes the fields the host shows when the user configures the source,
//! and the callbacks that keep them consistent with each other.

use crate::network::{enumerate, SenderDirectory};
use crate::settings::{SourceSettings, CUSTOM_SPOUT_NAME, SPOUT_SENDER_LIST, USE_FIRST_AVAILABLE_SENDER};

/// Kind of a property field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PropertyKind {
    /// Checkbox
    Bool,
    /// Single-line text input
    Text,
    /// Drop-down list of strings; each entry is (label, value)
    StringList(Vec<(String, String)>),
}

/// One field of the properties sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Property {
    /// Settings key the field edits
    pub key: &'static str,
    /// Localised label
    pub label: &'static str,
    pub kind: PropertyKind,
}

/// The full properties sheet.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceProperties {
    pub properties: Vec<Property>,
}

/// en-US label for a locale key.
pub fn module_text(key: &str) -> &'static str {
    match key {
        "UseFirstAvailableSender" => "Use first available sender",
        "CustomSpoutName" => "Spout sender name",
        "SpoutSenders" => "Spout senders",
        _ => "",
    }
}

impl SourceProperties {
    /// Build the sheet, listing the senders advertised right now.
    pub fn build(directory: &dyn SenderDirectory) -> Self {
        let senders = enumerate(directory)
            .into_iter()
            .map(|sender| {
                let name = sender.name.to_string();
                (name.clone(), name)
            })
            .collect();

        Self {
            properties: vec![
                Property {
                    key: USE_FIRST_AVAILABLE_SENDER,
                    label: module_text("UseFirstAvailableSender"),
                    kind: PropertyKind::Bool,
                },
                Property {
                    key: CUSTOM_SPOUT_NAME,
                    label: module_text("CustomSpoutName"),
                    kind: PropertyKind::Text,
                },
                Property {
                    key: SPOUT_SENDER_LIST,
                    label: module_text("SpoutSenders"),
                    kind: PropertyKind::StringList(senders),
                },
            ],
        }
    }

    pub fn get(&self, key: &str) -> Option<&Property> {
        self.properties.iter().find(|p| p.key == key)
    }

    /// Senders offered in the list field.
    pub fn sender_choices(&self) -> Vec<&str> {
        match self.get(SPOUT_SENDER_LIST).map(|p| &p.kind) {
            Some(PropertyKind::StringList(entries)) => {
                entries.iter().map(|(_, value)| value.as_str()).collect()
            }
            _ => Vec::new(),
        }
    }

    /// Called when a field changes. Returns whether the sheet must refresh.
    pub fn on_modified(key: &str, settings: &mut SourceSettings) -> bool {
        match key {
            USE_FIRST_AVAILABLE_SENDER => on_toggle_first_available(settings),
            SPOUT_SENDER_LIST => on_sender_list_selected(settings),
            _ => false,
        }
    }
}

/// Turning "first available" off starts from an empty sender name.
fn on_toggle_first_available(settings: &mut SourceSettings) -> bool {
    if !settings.use_first_available_sender {
        settings.custom_spout_name.clear();
    }
    true
}

/// Picking a sender from the list targets it by name.
fn on_sender_list_selected(settings: &mut SourceSettings) -> bool {
    if settings.selected_sender.is_empty() {
        return true;
    }

    settings.custom_spout_name = settings.selected_sender.clone();
    settings.use_first_available_sender = false;
    true
}
