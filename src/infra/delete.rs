use crate::domain::SessionRecord;
use crate::infra::{SaveSessionNamesError, remove_session_name};
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct DeleteOutcome {
    pub log_path: PathBuf,
    pub name_removed: bool,
}

#[derive(Debug, Error)]
pub enum DeleteSessionError {
    #[error("refusing to delete a file outside the sessions directory: {0}")]
    OutsideSessionsDir(String),

    #[error("failed to delete session log {path}: {source}")]
    RemoveLog { path: String, source: io::Error },

    #[error(transparent)]
    RemoveName(#[from] SaveSessionNamesError),
}

/// Removes the transcript first; the name entry goes only once the file is
/// gone.
pub fn delete_session(
    sessions_dir: &Path,
    state_dir: &Path,
    session: &SessionRecord,
) -> Result<DeleteOutcome, DeleteSessionError> {
    let log_path = &session.log_path;
    if !log_path.starts_with(sessions_dir) {
        return Err(DeleteSessionError::OutsideSessionsDir(
            log_path.display().to_string(),
        ));
    }

    fs::remove_file(log_path).map_err(|source| DeleteSessionError::RemoveLog {
        path: log_path.display().to_string(),
        source,
    })?;
    let name_removed = remove_session_name(state_dir, &session.id)?;
    tracing::info!(session_id = %session.id, log = %log_path.display(), "deleted session");

    Ok(DeleteOutcome {
        log_path: log_path.clone(),
        name_removed,
    })
}
