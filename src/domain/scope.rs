use crate::domain::SessionRecord;
use std::fs;
use std::path::{Component, Path, PathBuf};
use thiserror::Error;

/// A scope directory in both of its absolute spellings: lexically normalized
/// and, when it exists on disk, canonicalized.
#[derive(Clone, Debug, Eq, PartialEq)]
pub struct ResolvedScope {
    lexical: PathBuf,
    canonical: Option<PathBuf>,
}

impl ResolvedScope {
    pub fn new(scope: &Path) -> Self {
        let absolute = if scope.is_absolute() {
            scope.to_path_buf()
        } else {
            match std::env::current_dir() {
                Ok(cwd) => cwd.join(scope),
                Err(_) => scope.to_path_buf(),
            }
        };
        let lexical = normalize_lexically(&absolute);
        let canonical = fs::canonicalize(&lexical)
            .ok()
            .filter(|canonical| *canonical != lexical);
        Self { lexical, canonical }
    }

    pub fn path(&self) -> &Path {
        &self.lexical
    }

    pub fn contains(&self, cwd: &Path) -> bool {
        is_within_scope(cwd, &self.lexical)
            || self
                .canonical
                .as_deref()
                .is_some_and(|canonical| is_within_scope(cwd, canonical))
    }
}

/// Structural check only: `cwd` is never looked up on disk.
pub fn is_within_scope(cwd: &Path, scope: &Path) -> bool {
    if !cwd.is_absolute() {
        return false;
    }
    normalize_lexically(cwd).starts_with(scope)
}

pub fn filter_by_scope(sessions: Vec<SessionRecord>, scope: &ResolvedScope) -> Vec<SessionRecord> {
    sessions
        .into_iter()
        .filter(|session| {
            session
                .cwd
                .as_deref()
                .is_some_and(|cwd| scope.contains(cwd))
        })
        .collect()
}

pub fn normalize_lexically(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() && !out.has_root() {
                    out.push(component);
                }
            }
            other => out.push(other),
        }
    }
    out
}

/// Newest first by file mtime; ties keep scan order.
pub fn sort_by_recency(sessions: &mut [SessionRecord]) {
    sessions.sort_by(|a, b| b.last_modified.cmp(&a.last_modified));
}

pub fn latest_session(sessions: &[SessionRecord]) -> Option<&SessionRecord> {
    sessions.iter().max_by_key(|session| session.last_modified)
}

#[derive(Debug, Error, Eq, PartialEq)]
pub enum LookupError {
    #[error("session not found: {0}\nHint: run `cxs list --all` and copy the id column.")]
    NotFound(String),

    #[error("session id prefix matches {count} sessions: {query}")]
    Ambiguous { query: String, count: usize },
}

/// Exact id first, then a unique id prefix.
pub fn find_session<'a>(
    sessions: &'a [SessionRecord],
    query: &str,
) -> Result<&'a SessionRecord, LookupError> {
    if let Some(session) = sessions.iter().find(|session| session.id == query) {
        return Ok(session);
    }

    let matches = sessions
        .iter()
        .filter(|session| !query.is_empty() && session.id.starts_with(query))
        .collect::<Vec<_>>();
    match matches.as_slice() {
        [] => Err(LookupError::NotFound(query.to_string())),
        [session] => Ok(*session),
        _ => Err(LookupError::Ambiguous {
            query: query.to_string(),
            count: matches.len(),
        }),
    }
}
