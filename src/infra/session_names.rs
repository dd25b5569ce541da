use crate::domain::{SessionRecord, display_label};
use crate::infra::ResolveDirError;
use dirs::home_dir;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SessionNameEntry {
    pub name: String,
    pub updated_at: String,
}

/// User-chosen display names keyed by session id. Entries may outlive their
/// sessions.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub struct SessionNames {
    entries: BTreeMap<String, SessionNameEntry>,
}

impl SessionNames {
    pub fn name_for(&self, session_id: &str) -> Option<&str> {
        self.entries
            .get(session_id)
            .map(|entry| entry.name.as_str())
    }

    pub fn entry(&self, session_id: &str) -> Option<&SessionNameEntry> {
        self.entries.get(session_id)
    }

    pub fn label_for<'a>(&'a self, session: &'a SessionRecord, placeholder: &'a str) -> &'a str {
        display_label(self.name_for(&session.id), session, placeholder)
    }

    fn set(&mut self, session_id: &str, name: &str, updated_at: String) {
        self.entries.insert(
            session_id.to_string(),
            SessionNameEntry {
                name: name.to_string(),
                updated_at,
            },
        );
    }

    fn remove(&mut self, session_id: &str) -> bool {
        self.entries.remove(session_id).is_some()
    }
}

#[derive(Debug, Error)]
pub enum SaveSessionNamesError {
    #[error("failed to encode session names: {0}")]
    Encode(#[from] serde_json::Error),

    #[error("failed to write session names: {0}")]
    Write(#[from] io::Error),
}

pub fn resolve_state_dir() -> Result<PathBuf, ResolveDirError> {
    if let Some(override_dir) = std::env::var_os("CXS_STATE_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveDirError::HomeDirNotFound);
    };
    Ok(home.join(".cxs"))
}

pub fn session_names_path(state_dir: &Path) -> PathBuf {
    state_dir.join("session_names.json")
}

#[derive(Debug, Error)]
pub enum LoadSessionNamesError {
    #[error("failed to read session names {path}: {source}")]
    Read { path: String, source: io::Error },

    #[error("failed to parse session names {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
}

/// A store that does not exist yet is an empty one.
pub fn read_session_names(state_dir: &Path) -> Result<SessionNames, LoadSessionNamesError> {
    let path = session_names_path(state_dir);
    let raw = match fs::read_to_string(&path) {
        Ok(raw) => raw,
        Err(error) if error.kind() == io::ErrorKind::NotFound => {
            return Ok(SessionNames::default());
        }
        Err(source) => {
            return Err(LoadSessionNamesError::Read {
                path: path.display().to_string(),
                source,
            });
        }
    };

    let entries = serde_json::from_str::<BTreeMap<String, SessionNameEntry>>(&raw).map_err(
        |source| LoadSessionNamesError::Parse {
            path: path.display().to_string(),
            source,
        },
    )?;
    Ok(SessionNames { entries })
}

/// Like [`read_session_names`], but an unreadable store is logged and treated
/// as empty.
pub fn load_session_names(state_dir: &Path) -> SessionNames {
    read_session_names(state_dir).unwrap_or_else(|error| {
        tracing::warn!(%error, "ignoring session names");
        SessionNames::default()
    })
}

fn save_session_names(
    state_dir: &Path,
    names: &SessionNames,
) -> Result<(), SaveSessionNamesError> {
    fs::create_dir_all(state_dir)?;

    let path = session_names_path(state_dir);
    let tmp = path.with_extension("json.tmp");
    let text = serde_json::to_string_pretty(&names.entries)?;
    fs::write(&tmp, text)?;
    fs::rename(tmp, path)?;
    Ok(())
}

pub fn upsert_session_name(
    state_dir: &Path,
    session_id: &str,
    name: &str,
) -> Result<(), SaveSessionNamesError> {
    let mut names = load_session_names(state_dir);
    names.set(session_id, name.trim(), now_rfc3339());
    save_session_names(state_dir, &names)?;
    tracing::info!(session_id, "renamed session");
    Ok(())
}

/// Returns `false` when there was no entry; the file is left untouched then.
pub fn remove_session_name(
    state_dir: &Path,
    session_id: &str,
) -> Result<bool, SaveSessionNamesError> {
    let mut names = load_session_names(state_dir);
    if !names.remove(session_id) {
        return Ok(false);
    }
    save_session_names(state_dir, &names)?;
    tracing::info!(session_id, "cleared session name");
    Ok(true)
}

fn now_rfc3339() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| "1970-01-01T00:00:00Z".to_string())
}
