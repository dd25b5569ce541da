mod line_editor;

use crate::domain::{ResolvedScope, SessionRecord, UNNAMED, format_timestamp};
use crate::infra::{LoadSessionNamesError, ScanOutput, ScanWarningCount, SessionNames};
use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use std::path::PathBuf;
use thiserror::Error;

pub use line_editor::LineEditor;

#[derive(Debug, Error)]
pub enum AppError {
    #[error("terminal I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Everything the picker shows, loaded fresh after every mutation.
#[derive(Clone, Debug)]
pub struct AppData {
    pub sessions_dir: PathBuf,
    /// Newest first.
    pub sessions: Vec<SessionRecord>,
    pub names: SessionNames,
    pub skipped: ScanWarningCount,
    pub notice: Option<String>,
}

impl AppData {
    /// A name store that cannot be read shows up as a notice and the picker
    /// falls back to extracted titles.
    pub fn from_scan(
        sessions_dir: PathBuf,
        scan: ScanOutput,
        names: Result<SessionNames, LoadSessionNamesError>,
    ) -> Self {
        let (names, names_notice) = match names {
            Ok(names) => (names, None),
            Err(error) => (SessionNames::default(), Some(format!("Names ignored: {error}"))),
        };
        let notice = match (scan.notice, names_notice) {
            (Some(first), Some(second)) => Some(format!("{first} · {second}")),
            (first, second) => first.or(second),
        };
        Self {
            sessions_dir,
            sessions: scan.sessions,
            names,
            skipped: scan.skipped,
            notice,
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum DeleteConfirmSelection {
    Cancel,
    Delete,
}

impl DeleteConfirmSelection {
    fn toggle(self) -> Self {
        match self {
            Self::Cancel => Self::Delete,
            Self::Delete => Self::Cancel,
        }
    }
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct RenameDialog {
    pub session_id: String,
    pub editor: LineEditor,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeleteConfirmDialog {
    pub session_id: String,
    pub label: String,
    /// `None` when the transcript carries no parseable start time.
    pub started: Option<String>,
    pub log_path: PathBuf,
    pub selection: DeleteConfirmSelection,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub enum PickerState {
    Listing,
    Renaming(RenameDialog),
    ConfirmingDelete(DeleteConfirmDialog),
}

#[derive(Clone, Debug)]
pub struct AppModel {
    pub data: AppData,
    /// `None` when no scope could be resolved; the toggle is then inert.
    pub scope: Option<ResolvedScope>,
    pub show_all: bool,
    /// Indices into `data.sessions` currently listed.
    pub rows: Vec<usize>,
    pub selected: usize,
    pub state: PickerState,
    pub notice: Option<String>,
    pub terminal_size: (u16, u16),
}

impl AppModel {
    pub fn new(data: AppData, scope: Option<ResolvedScope>, show_all: bool) -> Self {
        let notice = data.notice.clone();
        let mut model = Self {
            data,
            show_all: show_all || scope.is_none(),
            scope,
            rows: Vec::new(),
            selected: 0,
            state: PickerState::Listing,
            notice,
            terminal_size: (0, 0),
        };
        model.refresh_rows(None);
        model
    }

    /// Swaps in rescanned data, keeping the cursor on the same session when it
    /// still exists.
    pub fn with_data(mut self, data: AppData) -> Self {
        let keep = self.selected_session().map(|session| session.id.clone());
        let previous = self.selected;
        self.data = data;
        self.refresh_rows(keep.as_deref());
        if keep.is_some() && self.selected_session().map(|s| &s.id) != keep.as_ref() {
            self.selected = previous.min(self.rows.len().saturating_sub(1));
        }
        self
    }

    pub fn with_terminal_size(mut self, width: u16, height: u16) -> Self {
        self.terminal_size = (width, height);
        self
    }

    pub fn with_notice(mut self, notice: Option<String>) -> Self {
        self.notice = notice;
        self
    }

    pub fn visible_sessions(&self) -> impl Iterator<Item = &SessionRecord> {
        self.rows.iter().map(|&index| &self.data.sessions[index])
    }

    pub fn selected_session(&self) -> Option<&SessionRecord> {
        self.rows
            .get(self.selected)
            .map(|&index| &self.data.sessions[index])
    }

    fn refresh_rows(&mut self, keep_id: Option<&str>) {
        let scope = if self.show_all {
            None
        } else {
            self.scope.as_ref()
        };
        self.rows = self
            .data
            .sessions
            .iter()
            .enumerate()
            .filter(|(_, session)| match scope {
                Some(scope) => session
                    .cwd
                    .as_deref()
                    .is_some_and(|cwd| scope.contains(cwd)),
                None => true,
            })
            .map(|(index, _)| index)
            .collect();

        let found = keep_id.and_then(|id| {
            self.rows
                .iter()
                .position(|&index| self.data.sessions[index].id == id)
        });
        self.selected = found.unwrap_or(0);
    }

    fn page_size(&self) -> usize {
        usize::from(self.terminal_size.1).saturating_sub(8).max(1)
    }

    fn move_selection(&mut self, delta: isize) {
        if self.rows.is_empty() {
            self.selected = 0;
            return;
        }
        let last = self.rows.len() - 1;
        self.selected = self.selected.saturating_add_signed(delta).min(last);
    }
}

#[derive(Clone, Debug)]
pub enum AppEvent {
    Key(KeyEvent),
    Paste(String),
    Resize(u16, u16),
}

/// What the picker asks its caller to do. `None` keeps the picker running.
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum AppCommand {
    None,
    Quit,
    Resume { session_id: String },
    NewSession,
    Rename { session_id: String, name: String },
    ClearName { session_id: String },
    Delete { session_id: String },
}

pub fn update(model: AppModel, event: AppEvent) -> (AppModel, AppCommand) {
    match event {
        AppEvent::Key(key) => update_on_key(model, key),
        AppEvent::Paste(text) => update_on_paste(model, text),
        AppEvent::Resize(width, height) => (model.with_terminal_size(width, height), AppCommand::None),
    }
}

fn update_on_key(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        model.state = PickerState::Listing;
        return (model, AppCommand::Quit);
    }

    match model.state.clone() {
        PickerState::Listing => update_listing(model, key),
        PickerState::Renaming(dialog) => update_renaming(model, dialog, key),
        PickerState::ConfirmingDelete(dialog) => update_delete_confirm(model, dialog, key),
    }
}

fn update_on_paste(mut model: AppModel, text: String) -> (AppModel, AppCommand) {
    if let PickerState::Renaming(dialog) = &mut model.state {
        dialog.editor.insert_str(&text);
    }
    (model, AppCommand::None)
}

fn update_listing(mut model: AppModel, key: KeyEvent) -> (AppModel, AppCommand) {
    model.notice = None;
    let page = isize::try_from(model.page_size()).unwrap_or(isize::MAX);

    match key.code {
        KeyCode::Esc | KeyCode::Char('q') => return (model, AppCommand::Quit),
        KeyCode::Up | KeyCode::Char('k') => model.move_selection(-1),
        KeyCode::Down | KeyCode::Char('j') => model.move_selection(1),
        KeyCode::PageUp => model.move_selection(-page),
        KeyCode::PageDown => model.move_selection(page),
        KeyCode::Home | KeyCode::Char('g') => model.selected = 0,
        KeyCode::End | KeyCode::Char('G') => {
            model.selected = model.rows.len().saturating_sub(1);
        }
        KeyCode::Enter => {
            if let Some(session) = model.selected_session() {
                let session_id = session.id.clone();
                return (model, AppCommand::Resume { session_id });
            }
        }
        KeyCode::Char('n') => return (model, AppCommand::NewSession),
        KeyCode::Char('a') => {
            if model.scope.is_some() {
                let keep = model.selected_session().map(|session| session.id.clone());
                model.show_all = !model.show_all;
                model.refresh_rows(keep.as_deref());
            }
        }
        KeyCode::Char('r') => {
            if let Some(session) = model.selected_session() {
                let current = model.data.names.name_for(&session.id).unwrap_or_default();
                model.state = PickerState::Renaming(RenameDialog {
                    session_id: session.id.clone(),
                    editor: LineEditor::from_text(current),
                });
            }
        }
        KeyCode::Char('d') | KeyCode::Delete => {
            if let Some(session) = model.selected_session() {
                model.state = PickerState::ConfirmingDelete(DeleteConfirmDialog {
                    session_id: session.id.clone(),
                    label: model.data.names.label_for(session, UNNAMED).to_string(),
                    started: session
                        .started_at()
                        .map(|started| format_timestamp(started.into())),
                    log_path: session.log_path.clone(),
                    selection: DeleteConfirmSelection::Cancel,
                });
            }
        }
        _ => {}
    }
    (model, AppCommand::None)
}

fn update_renaming(
    mut model: AppModel,
    mut dialog: RenameDialog,
    key: KeyEvent,
) -> (AppModel, AppCommand) {
    let control = key.modifiers.contains(KeyModifiers::CONTROL);
    match key.code {
        KeyCode::Esc => {
            model.state = PickerState::Listing;
            return (model, AppCommand::None);
        }
        KeyCode::Enter => {
            model.state = PickerState::Listing;
            let name = dialog.editor.text.trim().to_string();
            let command = if name.is_empty() {
                AppCommand::ClearName {
                    session_id: dialog.session_id,
                }
            } else {
                AppCommand::Rename {
                    session_id: dialog.session_id,
                    name,
                }
            };
            return (model, command);
        }
        KeyCode::Char('w') if control => dialog.editor.delete_word_back(),
        KeyCode::Char('u') if control => dialog.editor.clear_to_start(),
        KeyCode::Char('a') if control => dialog.editor.move_home(),
        KeyCode::Char('e') if control => dialog.editor.move_end(),
        KeyCode::Char(ch) if !control => dialog.editor.insert_char(ch),
        KeyCode::Backspace => dialog.editor.backspace(),
        KeyCode::Delete => dialog.editor.delete_forward(),
        KeyCode::Left => dialog.editor.move_left(),
        KeyCode::Right => dialog.editor.move_right(),
        KeyCode::Home => dialog.editor.move_home(),
        KeyCode::End => dialog.editor.move_end(),
        _ => {}
    }

    model.state = PickerState::Renaming(dialog);
    (model, AppCommand::None)
}

fn update_delete_confirm(
    mut model: AppModel,
    mut dialog: DeleteConfirmDialog,
    key: KeyEvent,
) -> (AppModel, AppCommand) {
    match key.code {
        KeyCode::Esc | KeyCode::Backspace | KeyCode::Char('n') | KeyCode::Char('N') => {
            model.state = PickerState::Listing;
            return (model, AppCommand::None);
        }
        KeyCode::Left | KeyCode::Right | KeyCode::Tab => {
            dialog.selection = dialog.selection.toggle();
        }
        KeyCode::Enter => {
            model.state = PickerState::Listing;
            let command = if dialog.selection == DeleteConfirmSelection::Delete {
                AppCommand::Delete {
                    session_id: dialog.session_id,
                }
            } else {
                AppCommand::None
            };
            return (model, command);
        }
        KeyCode::Char('y') | KeyCode::Char('Y') => {
            model.state = PickerState::Listing;
            return (
                model,
                AppCommand::Delete {
                    session_id: dialog.session_id,
                },
            );
        }
        _ => {}
    }

    model.state = PickerState::ConfirmingDelete(dialog);
    (model, AppCommand::None)
}
