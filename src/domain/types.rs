use serde::Serialize;
use std::path::PathBuf;
use std::time::SystemTime;
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;

#[derive(Clone, Debug, Default, Eq, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct GitInfo {
    pub repository_url: Option<String>,
    pub branch: Option<String>,
    pub commit_hash: Option<String>,
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionMeta {
    pub id: String,
    pub cwd: Option<PathBuf>,
    pub started_at_rfc3339: String,
    pub git: Option<GitInfo>,
}

/// One Codex transcript that passed extraction.
///
/// `id` and `log_path` are never empty; files without a usable
/// `session_meta` line never become a record.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct SessionRecord {
    pub id: String,
    pub started_at_rfc3339: String,
    pub last_modified: SystemTime,
    pub cwd: Option<PathBuf>,
    pub log_path: PathBuf,
    pub title: Option<String>,
    pub git: Option<GitInfo>,
    pub file_size_bytes: u64,
}

impl SessionRecord {
    pub fn started_at(&self) -> Option<OffsetDateTime> {
        if self.started_at_rfc3339.is_empty() {
            return None;
        }
        OffsetDateTime::parse(&self.started_at_rfc3339, &Rfc3339).ok()
    }

    pub fn short_id(&self) -> &str {
        match self.id.char_indices().nth(8) {
            Some((idx, _)) => &self.id[..idx],
            None => &self.id,
        }
    }
}

pub fn make_session_record(
    meta: SessionMeta,
    log_path: PathBuf,
    title: Option<String>,
    file_size_bytes: u64,
    last_modified: SystemTime,
) -> SessionRecord {
    SessionRecord {
        id: meta.id,
        started_at_rfc3339: meta.started_at_rfc3339,
        last_modified,
        cwd: meta.cwd,
        log_path,
        title,
        git: meta.git,
        file_size_bytes,
    }
}
