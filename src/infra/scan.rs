use crate::domain::{
    SessionRecord, find_title, make_session_record, parse_session_meta_line, sort_by_recency,
};
use dirs::home_dir;
use std::fs::{self, File};
use std::io::{self, Read};
use std::path::{Path, PathBuf};
use thiserror::Error;
use walkdir::WalkDir;

/// Head budget per transcript; `session_meta` is always the first record.
pub const MAX_HEAD_BYTES: u64 = 64 * 1024;
const TRANSCRIPT_SUFFIX: &str = ".jsonl";

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub struct ScanWarningCount(usize);

impl From<usize> for ScanWarningCount {
    fn from(value: usize) -> Self {
        Self(value)
    }
}

impl ScanWarningCount {
    pub fn get(&self) -> usize {
        self.0
    }
}

#[derive(Debug, Error)]
pub enum ScanError {
    #[error("sessions directory does not exist: {0}")]
    SessionsDirMissing(String),

    #[error("failed to read sessions directory {path}: {source}")]
    ReadRoot { path: String, source: io::Error },
}

#[derive(Debug, Error)]
pub enum ResolveDirError {
    #[error("home directory not found")]
    HomeDirNotFound,
}

pub fn resolve_sessions_dir() -> Result<PathBuf, ResolveDirError> {
    if let Some(override_dir) = std::env::var_os("CODEX_SESSIONS_DIR") {
        return Ok(PathBuf::from(override_dir));
    }

    let Some(home) = home_dir() else {
        return Err(ResolveDirError::HomeDirNotFound);
    };

    Ok(home.join(".codex").join("sessions"))
}

#[derive(Clone, Debug, Default)]
pub struct ScanOutput {
    pub sessions: Vec<SessionRecord>,
    pub skipped: ScanWarningCount,
    pub notice: Option<String>,
}

/// Every `*.jsonl` regular file below `sessions_dir`, at any depth.
///
/// Only a failure to read the root itself is an error; unreadable nested
/// directories are skipped.
pub fn list_transcript_files(sessions_dir: &Path) -> Result<Vec<PathBuf>, ScanError> {
    if let Err(source) = fs::read_dir(sessions_dir) {
        let path = sessions_dir.display().to_string();
        if source.kind() == io::ErrorKind::NotFound {
            return Err(ScanError::SessionsDirMissing(path));
        }
        return Err(ScanError::ReadRoot { path, source });
    }

    let mut files = Vec::new();
    for entry in WalkDir::new(sessions_dir).follow_links(false) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(error) => {
                tracing::debug!(%error, "skipping unreadable entry");
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        if entry
            .file_name()
            .to_string_lossy()
            .ends_with(TRANSCRIPT_SUFFIX)
        {
            files.push(entry.into_path());
        }
    }
    Ok(files)
}

pub fn scan_sessions(sessions_dir: &Path) -> Result<ScanOutput, ScanError> {
    let files = list_transcript_files(sessions_dir)?;
    let mut sessions = Vec::with_capacity(files.len());
    let mut skipped = 0usize;

    for path in files {
        match read_session_record(&path) {
            Some(session) => sessions.push(session),
            None => skipped += 1,
        }
    }

    tracing::debug!(
        dir = %sessions_dir.display(),
        found = sessions.len(),
        skipped,
        "scanned sessions"
    );
    Ok(ScanOutput {
        sessions,
        skipped: ScanWarningCount::from(skipped),
        notice: None,
    })
}

/// Scan sorted newest first. A sessions dir that does not exist yet is an
/// empty result with a notice.
pub fn load_sessions(sessions_dir: &Path) -> Result<ScanOutput, ScanError> {
    let mut output = match scan_sessions(sessions_dir) {
        Ok(output) => output,
        Err(ScanError::SessionsDirMissing(path)) => ScanOutput {
            notice: Some(format!("Codex sessions dir not found: {path}")),
            ..ScanOutput::default()
        },
        Err(error) => return Err(error),
    };
    sort_by_recency(&mut output.sessions);
    Ok(output)
}

/// Builds a record from the head of one transcript. Any failure means "not a
/// session" and never aborts the surrounding scan.
pub fn read_session_record(path: &Path) -> Option<SessionRecord> {
    let file = File::open(path).ok()?;
    let metadata = fs::metadata(path).ok()?;
    let last_modified = metadata.modified().ok()?;

    let mut head = Vec::new();
    file.take(MAX_HEAD_BYTES).read_to_end(&mut head).ok()?;
    let text = String::from_utf8_lossy(&head);

    let mut lines = text.lines().map(str::trim).filter(|line| !line.is_empty());
    let meta = parse_session_meta_line(lines.next()?).ok()?;
    let title = find_title(lines);

    Some(make_session_record(
        meta,
        path.to_path_buf(),
        title,
        metadata.len(),
        last_modified,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::{Duration, SystemTime};
    use tempfile::tempdir;

    const META: &str = r#"{"timestamp":"2026-02-18T21:45:57.762Z","type":"session_meta","payload":{"id":"s1","timestamp":"2026-02-18T21:39:39.022Z","cwd":"/tmp/project"}}"#;

    fn user_line(text: &str) -> String {
        serde_json::json!({
            "type": "response_item",
            "payload": {
                "type": "message",
                "role": "user",
                "content": [{"type": "input_text", "text": text}]
            }
        })
        .to_string()
    }

    fn write_session(path: &Path, id: &str, extra: &[String]) {
        let meta = META.replace("\"s1\"", &format!("\"{id}\""));
        let mut body = vec![meta];
        body.extend(extra.iter().cloned());
        fs::create_dir_all(path.parent().expect("parent")).expect("create");
        fs::write(path, body.join("\n")).expect("write");
    }

    #[test]
    fn lists_nested_jsonl_files_only() {
        let dir = tempdir().expect("tempdir");
        let day = dir.path().join("2026").join("02").join("18");
        write_session(&day.join("rollout-a.jsonl"), "a", &[]);
        write_session(&dir.path().join("rollout-b.jsonl"), "b", &[]);
        fs::write(day.join("notes.json"), "{}").expect("write");
        fs::create_dir_all(dir.path().join("dir.jsonl")).expect("create");

        let mut files = list_transcript_files(dir.path()).expect("list");
        files.sort();
        assert_eq!(
            files,
            vec![
                day.join("rollout-a.jsonl"),
                dir.path().join("rollout-b.jsonl")
            ]
        );
    }

    #[test]
    fn missing_root_is_reported() {
        let dir = tempdir().expect("tempdir");
        let missing = dir.path().join("nope");
        assert!(matches!(
            list_transcript_files(&missing),
            Err(ScanError::SessionsDirMissing(_))
        ));
    }

    #[test]
    fn root_that_is_a_file_is_an_error() {
        let dir = tempdir().expect("tempdir");
        let file = dir.path().join("sessions");
        fs::write(&file, "").expect("write");

        assert!(matches!(
            list_transcript_files(&file),
            Err(ScanError::ReadRoot { .. })
        ));
        assert!(load_sessions(&file).is_err());
    }

    #[cfg(unix)]
    #[test]
    fn unreadable_nested_dir_is_skipped() {
        use std::os::unix::fs::PermissionsExt;

        let dir = tempdir().expect("tempdir");
        write_session(&dir.path().join("ok.jsonl"), "ok", &[]);
        let locked = dir.path().join("locked");
        write_session(&locked.join("hidden.jsonl"), "hidden", &[]);
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o000)).expect("chmod");

        // Permission bits do not bind root.
        if fs::read_dir(&locked).is_ok() {
            fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod");
            return;
        }

        let output = scan_sessions(dir.path());
        fs::set_permissions(&locked, fs::Permissions::from_mode(0o755)).expect("chmod");

        let output = output.expect("scan");
        let ids: Vec<_> = output.sessions.iter().map(|s| s.id.as_str()).collect();
        assert_eq!(ids, vec!["ok"]);
        assert_eq!(output.skipped.get(), 0);
    }

    #[test]
    fn extracts_metadata_title_and_mtime() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("rollout.jsonl");
        write_session(
            &path,
            "s1",
            &[
                r#"{"type":"turn_context","payload":{}}"#.to_string(),
                user_line("<environment_context>\n<cwd>/tmp/project</cwd>\n</environment_context>"),
                "{broken".to_string(),
                user_line("  Add   a scope\nfilter  "),
                user_line("second message"),
            ],
        );
        let mtime = SystemTime::UNIX_EPOCH + Duration::from_secs(1_700_000_000);
        File::options()
            .write(true)
            .open(&path)
            .expect("open")
            .set_modified(mtime)
            .expect("set mtime");

        let session = read_session_record(&path).expect("session");
        assert_eq!(session.id, "s1");
        assert_eq!(session.cwd, Some(PathBuf::from("/tmp/project")));
        assert_eq!(session.title.as_deref(), Some("Add a scope filter"));
        assert_eq!(session.last_modified, mtime);
        assert_eq!(session.log_path, path);
    }

    #[test]
    fn rejects_files_without_leading_session_meta() {
        let dir = tempdir().expect("tempdir");

        let no_meta = dir.path().join("a.jsonl");
        fs::write(&no_meta, format!("{}\n{META}", user_line("hi"))).expect("write");
        assert!(read_session_record(&no_meta).is_none());

        let no_id = dir.path().join("b.jsonl");
        fs::write(&no_id, r#"{"type":"session_meta","payload":{"cwd":"/x"}}"#).expect("write");
        assert!(read_session_record(&no_id).is_none());

        let empty = dir.path().join("c.jsonl");
        fs::write(&empty, "\n\n").expect("write");
        assert!(read_session_record(&empty).is_none());

        write_session(&dir.path().join("ok.jsonl"), "ok", &[]);
        let output = scan_sessions(dir.path()).expect("scan");
        assert_eq!(output.sessions.len(), 1);
        assert_eq!(output.sessions[0].id, "ok");
        assert_eq!(output.sessions[0].title, None);
        assert_eq!(output.skipped.get(), 3);
    }

    #[test]
    fn load_sorts_by_mtime_and_tolerates_missing_dir() {
        let dir = tempdir().expect("tempdir");
        for (id, secs) in [("old", 100), ("new", 300), ("mid", 200)] {
            let path = dir.path().join(format!("{id}.jsonl"));
            write_session(&path, id, &[]);
            File::options()
                .write(true)
                .open(&path)
                .expect("open")
                .set_modified(SystemTime::UNIX_EPOCH + Duration::from_secs(secs))
                .expect("set mtime");
        }

        let output = load_sessions(dir.path()).expect("load");
        let ids = output
            .sessions
            .iter()
            .map(|session| session.id.as_str())
            .collect::<Vec<_>>();
        assert_eq!(ids, vec!["new", "mid", "old"]);
        assert!(output.notice.is_none());

        let missing = load_sessions(&dir.path().join("missing")).expect("load");
        assert!(missing.sessions.is_empty());
        assert!(missing.notice.is_some());
    }

    #[test]
    fn title_beyond_head_budget_is_not_read() {
        let dir = tempdir().expect("tempdir");
        let path = dir.path().join("big.jsonl");
        let filler = format!(
            r#"{{"type":"event_msg","payload":{{"type":"note","text":"{}"}}}}"#,
            "x".repeat(MAX_HEAD_BYTES as usize)
        );
        write_session(&path, "big", &[filler, user_line("too late")]);

        let session = read_session_record(&path).expect("session");
        assert_eq!(session.id, "big");
        assert_eq!(session.title, None);
    }
}
