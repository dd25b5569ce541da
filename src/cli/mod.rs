use crate::domain::{
    LookupError, ResolvedScope, SessionRecord, UNNAMED, UNTITLED, filter_by_scope, find_session,
    format_timestamp, latest_session, relative_time_ago, tilde_path,
};
use crate::infra::{
    AgentInvocation, DeleteSessionError, LaunchAgentError, ResolveDirError, SaveSessionNamesError,
    ScanError, ScanOutput, SessionNames, delete_session, load_session_names, load_sessions,
    remove_session_name, resolve_agent_bin, resolve_scope_dir, resolve_sessions_dir,
    resolve_state_dir, run_agent, upsert_session_name,
};
use clap::{Args, Parser, Subcommand};
use humansize::{DECIMAL, format_size};
use serde::Serialize;
use std::ffi::OsString;
use std::io::{self, BufRead, IsTerminal, Write};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use thiserror::Error;

pub const DEFAULT_LIMIT: usize = 20;

/// Browse, name and resume Codex sessions for the current repository.
#[derive(Parser, Debug)]
#[command(name = "cxs", version)]
pub struct Cli {
    // Global so the flags apply on either side of the subcommand.
    #[command(flatten)]
    pub scope: ScopeArgs,

    // Without a subcommand the interactive picker opens.
    #[command(subcommand)]
    pub command: Option<CliCommand>,
}

#[derive(Args, Clone, Debug, Default, Eq, PartialEq)]
pub struct ScopeArgs {
    /// Show sessions from every directory instead of the current repository
    #[arg(short, long, global = true)]
    pub all: bool,

    /// Scope to this directory instead of the detected repository root
    #[arg(
        short = 'C',
        long,
        value_name = "DIR",
        conflicts_with = "all",
        global = true
    )]
    pub dir: Option<PathBuf>,
}

#[derive(Subcommand, Clone, Debug, Eq, PartialEq)]
pub enum CliCommand {
    /// List sessions, newest first
    List {
        /// Max sessions to print
        #[arg(short = 'n', long, default_value_t = DEFAULT_LIMIT, value_parser = parse_limit)]
        limit: usize,

        /// Include the transcript size column
        #[arg(long)]
        size: bool,

        /// Print a JSON array instead of tab-separated lines
        #[arg(long)]
        json: bool,
    },

    /// Resume a session (defaults to the latest one in scope)
    Resume {
        /// Session id or unique id prefix
        id: Option<String>,

        /// Prompt to send on resume
        #[arg(last = true)]
        prompt: Vec<String>,
    },

    /// Start a new Codex session
    New {
        /// Initial prompt
        prompt: Vec<String>,
    },

    /// Set or clear the display name of a session
    Rename {
        /// Session id or unique id prefix
        id: String,

        /// New display name
        #[arg(required_unless_present = "clear")]
        name: Option<String>,

        /// Remove the stored name
        #[arg(long, conflicts_with = "name")]
        clear: bool,
    },

    /// Delete a session transcript and its stored name
    Delete {
        /// Session id or unique id prefix
        id: String,

        /// Do not ask for confirmation
        #[arg(short, long)]
        yes: bool,
    },
}

pub fn parse_limit(value: &str) -> Result<usize, String> {
    match value.parse::<usize>() {
        Ok(0) => Err("must be at least 1".to_string()),
        Ok(limit) => Ok(limit),
        Err(_) => Err(format!("not a positive integer: {value}")),
    }
}

#[derive(Debug, Error)]
pub enum CliRunError {
    #[error(transparent)]
    ResolveDir(#[from] ResolveDirError),

    #[error(transparent)]
    Scan(#[from] ScanError),

    #[error(transparent)]
    Lookup(#[from] LookupError),

    #[error(transparent)]
    SaveNames(#[from] SaveSessionNamesError),

    #[error(transparent)]
    Delete(#[from] DeleteSessionError),

    #[error(transparent)]
    Launch(#[from] LaunchAgentError),

    #[error("no sessions found under {0}\nHint: pass --all to search every directory.")]
    NoSessionsInScope(String),

    #[error("name must not be empty\nHint: use `cxs rename <id> --clear` to remove a name.")]
    EmptyName,

    #[error("refusing to delete without confirmation\nHint: pass --yes when not on a terminal.")]
    ConfirmationRequired,

    #[error("failed to resolve current directory: {0}")]
    CurrentDir(io::Error),

    #[error(transparent)]
    WriteOutput(#[from] io::Error),
}

impl CliRunError {
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Launch(error) => error.exit_code(),
            _ => 1,
        }
    }
}

/// Paths and settings resolved once per run.
#[derive(Clone, Debug)]
pub struct Context {
    pub sessions_dir: PathBuf,
    pub state_dir: PathBuf,
    pub current_dir: PathBuf,
    pub agent_bin: OsString,
}

impl Context {
    pub fn resolve() -> Result<Self, CliRunError> {
        Ok(Self {
            sessions_dir: resolve_sessions_dir()?,
            state_dir: resolve_state_dir()?,
            current_dir: std::env::current_dir().map_err(CliRunError::CurrentDir)?,
            agent_bin: resolve_agent_bin(),
        })
    }

    /// `None` means every session is in view.
    pub fn scope(&self, args: &ScopeArgs) -> Option<ResolvedScope> {
        if args.all {
            return None;
        }
        let dir = resolve_scope_dir(args.dir.as_deref(), &self.current_dir);
        Some(ResolvedScope::new(&dir))
    }
}

/// Runs a non-interactive command and returns the process exit code.
pub fn run(command: CliCommand, scope: &ScopeArgs, ctx: &Context) -> Result<i32, CliRunError> {
    let stdout = io::stdout();
    let mut out = io::BufWriter::new(stdout.lock());
    let stderr = io::stderr();
    let mut err = io::BufWriter::new(stderr.lock());

    match command {
        CliCommand::List { limit, size, json } => {
            let options = ListOptions { limit, size, json };
            run_list(ctx, scope, options, &mut out, &mut err)
        }
        CliCommand::Resume { id, prompt } => {
            let session = resume_target(ctx, scope, id.as_deref())?;
            let names = load_session_names(&ctx.state_dir);
            write_line(
                &mut err,
                &format!(
                    "Resuming {} · {}",
                    session.short_id(),
                    names.label_for(&session, UNNAMED)
                ),
            )?;
            err.flush()?;
            drop(out);
            drop(err);
            Ok(run_agent(
                &ctx.agent_bin,
                &AgentInvocation::resume(&session.id, join_prompt(&prompt)),
            )?)
        }
        CliCommand::New { prompt } => {
            drop(out);
            drop(err);
            Ok(run_agent(
                &ctx.agent_bin,
                &AgentInvocation::new_session(join_prompt(&prompt)),
            )?)
        }
        CliCommand::Rename { id, name, clear } => {
            run_rename(ctx, &id, name.as_deref(), clear, &mut out)
        }
        CliCommand::Delete { id, yes } => {
            let stdin = io::stdin();
            let mut lock = stdin.lock();
            let input: Option<&mut dyn BufRead> = if stdin.is_terminal() {
                Some(&mut lock)
            } else {
                None
            };
            run_delete(ctx, &id, yes, input, &mut out, &mut err)
        }
    }
}

#[derive(Clone, Copy, Debug)]
pub struct ListOptions {
    pub limit: usize,
    pub size: bool,
    pub json: bool,
}

pub fn run_list(
    ctx: &Context,
    scope: &ScopeArgs,
    options: ListOptions,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32, CliRunError> {
    let scope = ctx.scope(scope);
    let output = load_sessions(&ctx.sessions_dir)?;
    let notice = output.notice.clone();
    let sessions = scoped_sessions(output, scope.as_ref());
    let names = load_session_names(&ctx.state_dir);
    let shown = &sessions[..sessions.len().min(options.limit)];

    if options.json {
        let rows = shown
            .iter()
            .map(|session| SessionJson::new(session, &names))
            .collect::<Vec<_>>();
        let rendered = serde_json::to_string_pretty(&rows).map_err(io::Error::from)?;
        write_line(out, &rendered)?;
    } else {
        print_session_table(out, shown, &names, options.size)?;
    }

    if let Some(notice) = notice {
        write_line(err, &notice)?;
    }
    if sessions.len() > shown.len() {
        let hidden = sessions.len() - shown.len();
        write_line(err, &format!("{hidden} more (use --limit)"))?;
    }
    Ok(0)
}

/// An explicit id is looked up across every directory; without one the
/// newest session in scope is picked.
pub fn resume_target(
    ctx: &Context,
    scope: &ScopeArgs,
    id: Option<&str>,
) -> Result<SessionRecord, CliRunError> {
    let output = load_sessions(&ctx.sessions_dir)?;
    if let Some(id) = id {
        return Ok(find_session(&output.sessions, id)?.clone());
    }

    let scope = ctx.scope(scope);
    let sessions = scoped_sessions(output, scope.as_ref());
    latest_session(&sessions).cloned().ok_or_else(|| {
        let place = scope
            .map(|scope| scope.path().display().to_string())
            .unwrap_or_else(|| ctx.sessions_dir.display().to_string());
        CliRunError::NoSessionsInScope(place)
    })
}

pub fn run_rename(
    ctx: &Context,
    id: &str,
    name: Option<&str>,
    clear: bool,
    out: &mut impl Write,
) -> Result<i32, CliRunError> {
    let name = name.unwrap_or_default().trim();
    if !clear && name.is_empty() {
        return Err(CliRunError::EmptyName);
    }
    let output = load_sessions(&ctx.sessions_dir)?;
    let session = find_session(&output.sessions, id)?;

    if clear {
        let removed = remove_session_name(&ctx.state_dir, &session.id)?;
        let line = if removed {
            format!("cleared:\t{}", session.id)
        } else {
            format!("unchanged:\t{}\t(no name set)", session.id)
        };
        write_line(out, &line)?;
    } else {
        upsert_session_name(&ctx.state_dir, &session.id, name)?;
        write_line(out, &format!("renamed:\t{}\t{name}", session.id))?;
    }
    Ok(0)
}

/// `input` is the terminal to ask on; `None` means nobody can answer, so
/// only `--yes` proceeds.
pub fn run_delete(
    ctx: &Context,
    id: &str,
    yes: bool,
    input: Option<&mut dyn BufRead>,
    out: &mut impl Write,
    err: &mut impl Write,
) -> Result<i32, CliRunError> {
    let output = load_sessions(&ctx.sessions_dir)?;
    let session = find_session(&output.sessions, id)?;

    if !yes {
        let Some(input) = input else {
            return Err(CliRunError::ConfirmationRequired);
        };
        let names = load_session_names(&ctx.state_dir);
        let label = names.label_for(session, UNNAMED);
        write!(err, "Delete \"{label}\" ({})? [y/N] ", session.short_id())?;
        err.flush()?;
        if !confirm(input)? {
            write_line(err, "aborted")?;
            return Ok(1);
        }
    }

    let outcome = delete_session(&ctx.sessions_dir, &ctx.state_dir, session)?;
    let mut line = format!("deleted:\t{}\t{}", session.id, outcome.log_path.display());
    if outcome.name_removed {
        line.push_str("\tname-cleared");
    }
    write_line(out, &line)?;
    Ok(0)
}

fn scoped_sessions(output: ScanOutput, scope: Option<&ResolvedScope>) -> Vec<SessionRecord> {
    match scope {
        Some(scope) => filter_by_scope(output.sessions, scope),
        None => output.sessions,
    }
}

fn join_prompt(words: &[String]) -> Option<String> {
    let prompt = words.join(" ");
    if prompt.trim().is_empty() {
        None
    } else {
        Some(prompt)
    }
}

fn confirm<R: BufRead + ?Sized>(input: &mut R) -> io::Result<bool> {
    let mut answer = String::new();
    input.read_line(&mut answer)?;
    Ok(matches!(answer.trim(), "y" | "Y" | "yes" | "YES" | "Yes"))
}

fn print_session_table(
    out: &mut impl Write,
    sessions: &[SessionRecord],
    names: &SessionNames,
    size: bool,
) -> io::Result<()> {
    let now = SystemTime::now();
    let home = dirs::home_dir();
    for session in sessions {
        let modified = relative_time_ago(session.last_modified, now);
        let label = names.label_for(session, UNTITLED);
        let cwd = session
            .cwd
            .as_deref()
            .map(|cwd| tilde_path(cwd, home.as_deref()))
            .unwrap_or_else(|| "-".to_string());
        let line = if size {
            format!(
                "{modified}\t{}\t{label}\t{}\t{cwd}",
                session.id,
                format_size(session.file_size_bytes, DECIMAL)
            )
        } else {
            format!("{modified}\t{}\t{label}\t{cwd}", session.id)
        };
        if !write_line(out, &line)? {
            return Ok(());
        }
    }
    Ok(())
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct SessionJson<'a> {
    id: &'a str,
    name: Option<&'a str>,
    name_updated_at: Option<&'a str>,
    title: Option<&'a str>,
    label: &'a str,
    started_at: Option<&'a str>,
    last_modified: String,
    last_modified_unix_ms: u64,
    cwd: Option<&'a Path>,
    log_path: &'a Path,
    size_bytes: u64,
    git: Option<&'a crate::domain::GitInfo>,
}

impl<'a> SessionJson<'a> {
    fn new(session: &'a SessionRecord, names: &'a SessionNames) -> Self {
        Self {
            id: &session.id,
            name: names.name_for(&session.id),
            name_updated_at: names
                .entry(&session.id)
                .map(|entry| entry.updated_at.as_str()),
            title: session.title.as_deref(),
            label: names.label_for(session, UNTITLED),
            started_at: Some(session.started_at_rfc3339.as_str()).filter(|text| !text.is_empty()),
            last_modified: format_timestamp(session.last_modified),
            last_modified_unix_ms: session
                .last_modified
                .duration_since(UNIX_EPOCH)
                .map(|delta| u64::try_from(delta.as_millis()).unwrap_or(u64::MAX))
                .unwrap_or_default(),
            cwd: session.cwd.as_deref(),
            log_path: &session.log_path,
            size_bytes: session.file_size_bytes,
            git: session.git.as_ref(),
        }
    }
}

fn write_line(out: &mut impl Write, line: &str) -> io::Result<bool> {
    match writeln!(out, "{line}") {
        Ok(()) => Ok(true),
        Err(error) if error.kind() == io::ErrorKind::BrokenPipe => Ok(false),
        Err(error) => Err(error),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SessionMeta, make_session_record};
    use crate::infra::{load_session_names, upsert_session_name};
    use clap::error::ErrorKind;
    use std::fs;
    use std::time::Duration;
    use tempfile::{TempDir, tempdir};

    struct Fixture {
        _root: TempDir,
        ctx: Context,
        repo: PathBuf,
    }

    /// Sessions dir with `s1` recorded in `<root>/repo` and `s2` in
    /// `<root>/other`.
    fn fixture() -> Fixture {
        let root = tempdir().expect("tempdir");
        let sessions_dir = root.path().join("sessions");
        let repo = root.path().join("repo");
        let other = root.path().join("other");
        fs::create_dir_all(&sessions_dir).expect("create");
        for (id, cwd) in [("s1", &repo), ("s2", &other)] {
            let meta = serde_json::json!({
                "type": "session_meta",
                "payload": {"id": id, "cwd": cwd},
            });
            fs::write(sessions_dir.join(format!("{id}.jsonl")), meta.to_string())
                .expect("write");
        }
        let ctx = Context {
            sessions_dir,
            state_dir: root.path().join("state"),
            current_dir: root.path().to_path_buf(),
            agent_bin: OsString::from("codex"),
        };
        Fixture {
            _root: root,
            ctx,
            repo,
        }
    }

    fn dir_scope(dir: &Path) -> ScopeArgs {
        ScopeArgs {
            all: false,
            dir: Some(dir.to_path_buf()),
        }
    }

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(args)
    }

    #[test]
    fn no_subcommand_opens_picker() {
        let cli = parse(&["cxs"]).expect("parse");
        assert_eq!(cli.command, None);
        assert_eq!(cli.scope, ScopeArgs::default());

        let cli = parse(&["cxs", "--all"]).expect("parse");
        assert!(cli.scope.all);
    }

    #[test]
    fn list_defaults_and_flags() {
        let cli = parse(&["cxs", "list"]).expect("parse");
        assert_eq!(
            cli.command,
            Some(CliCommand::List {
                limit: DEFAULT_LIMIT,
                size: false,
                json: false,
            })
        );

        let cli = parse(&["cxs", "list", "-n", "5", "--all", "--json"]).expect("parse");
        assert!(cli.scope.all);
        let Some(CliCommand::List { limit, json, .. }) = cli.command else {
            panic!("expected list");
        };
        assert_eq!(limit, 5);
        assert!(json);
    }

    #[test]
    fn non_positive_limit_is_rejected() {
        let error = parse(&["cxs", "list", "--limit", "0"]).unwrap_err();
        assert_eq!(error.kind(), ErrorKind::ValueValidation);
        assert!(parse(&["cxs", "list", "--limit", "-3"]).is_err());
        assert!(parse(&["cxs", "list", "--limit", "many"]).is_err());
    }

    #[test]
    fn all_conflicts_with_dir() {
        assert!(parse(&["cxs", "list", "--all", "--dir", "/x"]).is_err());
        assert!(parse(&["cxs", "--all", "list", "--dir", "/x"]).is_err());
    }

    #[test]
    fn scope_flags_apply_before_or_after_subcommand() {
        let cli = parse(&["cxs", "--all", "list"]).expect("parse");
        assert!(cli.scope.all);
        assert!(matches!(cli.command, Some(CliCommand::List { .. })));

        let cli = parse(&["cxs", "--dir", "/elsewhere", "resume"]).expect("parse");
        assert_eq!(cli.scope.dir, Some(PathBuf::from("/elsewhere")));
        assert!(matches!(cli.command, Some(CliCommand::Resume { id: None, .. })));

        let cli = parse(&["cxs", "resume", "-C", "/elsewhere"]).expect("parse");
        assert_eq!(cli.scope.dir, Some(PathBuf::from("/elsewhere")));
    }

    #[test]
    fn resume_takes_optional_id_and_trailing_prompt() {
        let cli = parse(&["cxs", "resume"]).expect("parse");
        assert_eq!(
            cli.command,
            Some(CliCommand::Resume {
                id: None,
                prompt: Vec::new(),
            })
        );

        let cli = parse(&["cxs", "resume", "abc", "--", "keep", "going"]).expect("parse");
        let Some(CliCommand::Resume { id, prompt, .. }) = cli.command else {
            panic!("expected resume");
        };
        assert_eq!(id.as_deref(), Some("abc"));
        assert_eq!(join_prompt(&prompt).as_deref(), Some("keep going"));
    }

    #[test]
    fn rename_requires_name_or_clear() {
        assert!(parse(&["cxs", "rename", "abc"]).is_err());
        assert!(parse(&["cxs", "rename", "abc", "x", "--clear"]).is_err());

        let cli = parse(&["cxs", "rename", "abc", "--clear"]).expect("parse");
        assert_eq!(
            cli.command,
            Some(CliCommand::Rename {
                id: "abc".to_string(),
                name: None,
                clear: true,
            })
        );
    }

    #[test]
    fn parse_limit_messages() {
        assert_eq!(parse_limit("3"), Ok(3));
        assert!(parse_limit("0").is_err());
        assert!(parse_limit("").is_err());
    }

    #[test]
    fn confirm_accepts_only_yes() {
        assert!(confirm(&mut "y\n".as_bytes()).expect("read"));
        assert!(confirm(&mut "yes\n".as_bytes()).expect("read"));
        assert!(!confirm(&mut "\n".as_bytes()).expect("read"));
        assert!(!confirm(&mut "nope\n".as_bytes()).expect("read"));
    }

    #[test]
    fn table_rows_use_resolved_labels() {
        let session = |id: &str, title: Option<&str>| {
            make_session_record(
                SessionMeta {
                    id: id.to_string(),
                    cwd: Some(PathBuf::from("/srv/repo")),
                    started_at_rfc3339: String::new(),
                    git: None,
                },
                PathBuf::from(format!("/sessions/{id}.jsonl")),
                title.map(str::to_string),
                2048,
                SystemTime::now() - Duration::from_secs(7200),
            )
        };
        let sessions = vec![session("a1", Some("Bar")), session("b2", None)];

        let mut out = Vec::new();
        print_session_table(&mut out, &sessions, &SessionNames::default(), false).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();
        assert_eq!(lines[0], "2h ago\ta1\tBar\t/srv/repo");
        assert_eq!(lines[1], "2h ago\tb2\t(untitled)\t/srv/repo");

        let mut out = Vec::new();
        print_session_table(&mut out, &sessions, &SessionNames::default(), true).expect("print");
        let text = String::from_utf8(out).expect("utf8");
        assert!(text.lines().all(|line| line.split('\t').count() == 5));
    }

    #[test]
    fn list_honours_scope() {
        let fx = fixture();
        let options = ListOptions {
            limit: DEFAULT_LIMIT,
            size: false,
            json: false,
        };

        let (mut out, mut err) = (Vec::new(), Vec::new());
        run_list(&fx.ctx, &dir_scope(&fx.repo), options, &mut out, &mut err).expect("list");
        let text = String::from_utf8(out).expect("utf8");
        assert_eq!(text.lines().count(), 1);
        assert!(text.contains("\ts1\t"));

        let all = ScopeArgs {
            all: true,
            dir: None,
        };
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let options = ListOptions { limit: 1, ..options };
        run_list(&fx.ctx, &all, options, &mut out, &mut err).expect("list");
        assert_eq!(String::from_utf8(out).expect("utf8").lines().count(), 1);
        assert_eq!(String::from_utf8(err).expect("utf8"), "1 more (use --limit)\n");
    }

    #[test]
    fn resume_without_id_needs_a_session_in_scope() {
        let fx = fixture();
        let target = resume_target(&fx.ctx, &dir_scope(&fx.repo), None).expect("target");
        assert_eq!(target.id, "s1");

        let empty = fx.ctx.current_dir.join("empty");
        let error = resume_target(&fx.ctx, &dir_scope(&empty), None).unwrap_err();
        assert!(matches!(error, CliRunError::NoSessionsInScope(_)));

        let by_id = resume_target(&fx.ctx, &dir_scope(&empty), Some("s2")).expect("by id");
        assert_eq!(by_id.id, "s2");
    }

    #[test]
    fn rename_rejects_blank_name_before_io() {
        let fx = fixture();
        let ctx = Context {
            sessions_dir: fx.ctx.current_dir.join("missing"),
            ..fx.ctx.clone()
        };
        let mut out = Vec::new();
        let error = run_rename(&ctx, "s1", Some("   "), false, &mut out).unwrap_err();
        assert!(matches!(error, CliRunError::EmptyName));
        assert!(out.is_empty());
        assert!(!fx.ctx.state_dir.exists());
    }

    #[test]
    fn rename_then_clear_reports_each_step() {
        let fx = fixture();
        let mut out = Vec::new();
        run_rename(&fx.ctx, "s1", None, true, &mut out).expect("clear");
        run_rename(&fx.ctx, "s1", Some("  Fix parser "), false, &mut out).expect("rename");
        assert_eq!(
            load_session_names(&fx.ctx.state_dir).name_for("s1"),
            Some("Fix parser")
        );
        run_rename(&fx.ctx, "s1", None, true, &mut out).expect("clear");
        assert_eq!(
            String::from_utf8(out).expect("utf8"),
            "unchanged:\ts1\t(no name set)\nrenamed:\ts1\tFix parser\ncleared:\ts1\n"
        );
    }

    #[test]
    fn delete_needs_confirmation_without_a_terminal() {
        let fx = fixture();
        let log = fx.ctx.sessions_dir.join("s1.jsonl");
        let (mut out, mut err) = (Vec::new(), Vec::new());
        let error = run_delete(&fx.ctx, "s1", false, None, &mut out, &mut err).unwrap_err();
        assert!(matches!(error, CliRunError::ConfirmationRequired));
        assert!(log.exists());

        let mut answer = "n\n".as_bytes();
        let code = run_delete(&fx.ctx, "s1", false, Some(&mut answer), &mut out, &mut err)
            .expect("declined");
        assert_eq!(code, 1);
        assert!(log.exists());
        assert!(String::from_utf8(err).expect("utf8").ends_with("aborted\n"));
    }

    #[test]
    fn delete_reports_cleared_name() {
        let fx = fixture();
        upsert_session_name(&fx.ctx.state_dir, "s1", "Doomed").expect("upsert");
        let (mut out, mut err) = (Vec::new(), Vec::new());
        run_delete(&fx.ctx, "s1", true, None, &mut out, &mut err).expect("delete");
        run_delete(&fx.ctx, "s2", true, None, &mut out, &mut err).expect("delete");

        let text = String::from_utf8(out).expect("utf8");
        let lines = text.lines().collect::<Vec<_>>();
        assert!(lines[0].starts_with("deleted:\ts1\t"));
        assert!(lines[0].ends_with("\tname-cleared"));
        assert!(!lines[1].ends_with("name-cleared"));
        assert_eq!(load_session_names(&fx.ctx.state_dir).name_for("s1"), None);
    }
}
