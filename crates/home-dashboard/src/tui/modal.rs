//! Modal dialogs: calendar credentials, widget toggles and text input.
//!
//! A modal owns the keyboard while open. Keys are turned into a
//! [`ModalOutcome`] that the app applies to the preference store.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};

use crate::widgets::{InputKind, VisibilityMap, WidgetId, DESCRIPTORS};

/// A single-line text field.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TextField {
    value: String,
}

impl TextField {
    /// Field pre-filled with `value`.
    pub fn with_value(value: impl Into<String>) -> Self {
        Self {
            value: value.into(),
        }
    }

    /// Current text.
    pub fn value(&self) -> &str {
        &self.value
    }

    /// Applies an editing key. Returns false if the key is not an edit.
    fn edit(&mut self, key: KeyEvent) -> bool {
        match key.code {
            KeyCode::Char('u') if key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.clear();
                true
            }
            KeyCode::Char(c) if !key.modifiers.contains(KeyModifiers::CONTROL) => {
                self.value.push(c);
                true
            }
            KeyCode::Backspace => {
                self.value.pop();
                true
            }
            _ => false,
        }
    }
}

/// Which credential field has the cursor.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CredentialField {
    /// Calendar API key.
    ApiKey,
    /// Calendar id.
    CalendarId,
}

/// Credentials dialog state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CredentialsForm {
    /// API key being edited.
    pub api_key: TextField,
    /// Calendar id being edited.
    pub calendar_id: TextField,
    /// Focused field.
    pub field: CredentialField,
}

impl CredentialsForm {
    /// Form pre-filled with the stored values.
    pub fn new(api_key: &str, calendar_id: &str) -> Self {
        Self {
            api_key: TextField::with_value(api_key),
            calendar_id: TextField::with_value(calendar_id),
            field: CredentialField::ApiKey,
        }
    }

    fn focused(&mut self) -> &mut TextField {
        match self.field {
            CredentialField::ApiKey => &mut self.api_key,
            CredentialField::CalendarId => &mut self.calendar_id,
        }
    }

    fn switch_field(&mut self) {
        self.field = match self.field {
            CredentialField::ApiKey => CredentialField::CalendarId,
            CredentialField::CalendarId => CredentialField::ApiKey,
        };
    }
}

/// One line of the widget-toggle dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ToggleEntry {
    /// Widget.
    pub id: WidgetId,
    /// Name shown in the list.
    pub display_name: &'static str,
    /// Current visibility.
    pub visible: bool,
}

/// Widget-toggle dialog state. Lists the widgets hidden by default.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct WidgetToggles {
    /// Toggleable widgets in descriptor order.
    pub entries: Vec<ToggleEntry>,
    /// Highlighted entry.
    pub selected: usize,
}

impl WidgetToggles {
    /// Entries for the non-default widgets, checked per `visibility`.
    pub fn new(visibility: &VisibilityMap) -> Self {
        let entries = DESCRIPTORS
            .iter()
            .filter(|d| !d.default_visible)
            .map(|d| ToggleEntry {
                id: d.id,
                display_name: d.display_name,
                visible: visibility.is_visible(d.id),
            })
            .collect();
        Self {
            entries,
            selected: 0,
        }
    }
}

/// Text-input dialog state.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InputPrompt {
    /// What the text is for.
    pub kind: InputKind,
    /// Text typed so far.
    pub field: TextField,
}

/// An open dialog.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Modal {
    /// Calendar API key and id.
    Credentials(CredentialsForm),
    /// Show or hide optional widgets.
    Widgets(WidgetToggles),
    /// Free text for a panel's add action.
    Input(InputPrompt),
}

/// What a key press in a modal asks the app to do.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ModalOutcome {
    /// Keep the modal open; nothing to apply.
    Continue,
    /// Close without applying anything.
    Close,
    /// Store the credentials and close.
    SaveCredentials {
        /// API key as typed.
        api_key: String,
        /// Calendar id as typed.
        calendar_id: String,
    },
    /// Store a visibility change; the modal stays open.
    SetVisible(WidgetId, bool),
    /// Apply the typed text and close.
    Submit(InputKind, String),
}

impl Modal {
    /// Input dialog for `kind`.
    pub fn input(kind: InputKind) -> Self {
        Modal::Input(InputPrompt {
            kind,
            field: TextField::default(),
        })
    }

    /// Dialog title.
    pub fn title(&self) -> &'static str {
        match self {
            Modal::Credentials(_) => "Calendar settings",
            Modal::Widgets(_) => "Widgets",
            Modal::Input(prompt) => prompt.kind.prompt(),
        }
    }

    /// Handles a key while this modal is open.
    pub fn handle_key(&mut self, key: KeyEvent) -> ModalOutcome {
        if key.code == KeyCode::Esc {
            return ModalOutcome::Close;
        }
        match self {
            Modal::Credentials(form) => match key.code {
                KeyCode::Tab | KeyCode::BackTab | KeyCode::Up | KeyCode::Down => {
                    form.switch_field();
                    ModalOutcome::Continue
                }
                KeyCode::Enter => ModalOutcome::SaveCredentials {
                    api_key: form.api_key.value().to_string(),
                    calendar_id: form.calendar_id.value().to_string(),
                },
                _ => {
                    form.focused().edit(key);
                    ModalOutcome::Continue
                }
            },
            Modal::Widgets(toggles) => match key.code {
                KeyCode::Char('j') | KeyCode::Down => {
                    let last = toggles.entries.len().saturating_sub(1);
                    toggles.selected = (toggles.selected + 1).min(last);
                    ModalOutcome::Continue
                }
                KeyCode::Char('k') | KeyCode::Up => {
                    toggles.selected = toggles.selected.saturating_sub(1);
                    ModalOutcome::Continue
                }
                KeyCode::Char(' ') | KeyCode::Enter => {
                    match toggles.entries.get_mut(toggles.selected) {
                        Some(entry) => {
                            entry.visible = !entry.visible;
                            ModalOutcome::SetVisible(entry.id, entry.visible)
                        }
                        None => ModalOutcome::Continue,
                    }
                }
                KeyCode::Char('q') | KeyCode::Char('w') => ModalOutcome::Close,
                _ => ModalOutcome::Continue,
            },
            Modal::Input(prompt) => match key.code {
                KeyCode::Enter => {
                    let text = prompt.field.value().trim().to_string();
                    if text.is_empty() {
                        ModalOutcome::Close
                    } else {
                        ModalOutcome::Submit(prompt.kind, text)
                    }
                }
                _ => {
                    prompt.field.edit(key);
                    ModalOutcome::Continue
                }
            },
        }
    }
}
