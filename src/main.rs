mod app;
mod cli;
mod domain;
mod infra;
mod ui;

use crate::app::{AppCommand, AppData, AppEvent, AppModel};
use crate::cli::{Cli, CliRunError, Context, ScopeArgs};
use crate::infra::{
    AgentInvocation, delete_session, load_sessions, read_session_names, remove_session_name,
    run_agent, upsert_session_name,
};
use clap::Parser;
use crossterm::event::{
    self, DisableBracketedPaste, EnableBracketedPaste, Event, KeyEventKind,
};
use crossterm::terminal::size as terminal_size;
use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use crossterm::{ExecutableCommand, execute};
use ratatui::Terminal;
use ratatui::backend::CrosstermBackend;
use std::io::{self, Stdout, Write};
use std::sync::atomic::{AtomicBool, Ordering};
use thiserror::Error;
use tracing_subscriber::EnvFilter;

#[derive(Debug, Error)]
enum MainError {
    #[error(transparent)]
    App(#[from] crate::app::AppError),

    #[error(transparent)]
    Cli(#[from] CliRunError),
}

impl MainError {
    fn exit_code(&self) -> i32 {
        match self {
            Self::App(_) => 1,
            Self::Cli(error) => error.exit_code(),
        }
    }
}

/// How the picker was left.
enum PickerExit {
    Quit,
    Launch(AgentInvocation),
}

fn main() {
    init_tracing();
    match run_main() {
        Ok(code) => std::process::exit(code),
        Err(error) => {
            let mut err = io::stderr().lock();
            let _ = writeln!(err, "{error}");
            std::process::exit(error.exit_code());
        }
    }
}

/// Set while the picker owns the screen; log lines are dropped meanwhile.
static PICKER_ACTIVE: AtomicBool = AtomicBool::new(false);

/// Logs go to stderr so stdout stays clean for `list` output. `CXS_LOG`
/// takes the usual filter syntax, e.g. `CXS_LOG=cxs=debug`.
fn init_tracing() {
    let filter = EnvFilter::try_from_env("CXS_LOG").unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(log_writer)
        .with_target(false)
        .try_init();
}

fn log_writer() -> Box<dyn Write> {
    if PICKER_ACTIVE.load(Ordering::Relaxed) {
        Box::new(io::sink())
    } else {
        Box::new(io::stderr())
    }
}

fn run_main() -> Result<i32, MainError> {
    let cli = Cli::parse();
    let ctx = Context::resolve()?;
    tracing::debug!(
        sessions_dir = %ctx.sessions_dir.display(),
        state_dir = %ctx.state_dir.display(),
        "resolved context"
    );

    match cli.command {
        Some(command) => Ok(cli::run(command, &cli.scope, &ctx)?),
        None => run_picker(&ctx, &cli.scope),
    }
}

fn run_picker(ctx: &Context, args: &ScopeArgs) -> Result<i32, MainError> {
    let scope = ctx.scope(&ScopeArgs {
        all: false,
        dir: args.dir.clone(),
    });
    let mut model = AppModel::new(load_app_data(ctx)?, scope, args.all);

    let mut terminal = setup_terminal()?;
    PICKER_ACTIVE.store(true, Ordering::Relaxed);
    if let Ok((width, height)) = terminal_size() {
        model = model.with_terminal_size(width, height);
    }
    let result = run(&mut terminal, model, ctx);
    PICKER_ACTIVE.store(false, Ordering::Relaxed);
    restore_terminal(&mut terminal)?;

    match result? {
        PickerExit::Quit => Ok(0),
        PickerExit::Launch(invocation) => {
            Ok(run_agent(&ctx.agent_bin, &invocation).map_err(CliRunError::from)?)
        }
    }
}

fn load_app_data(ctx: &Context) -> Result<AppData, CliRunError> {
    let scan = load_sessions(&ctx.sessions_dir)?;
    let names = read_session_names(&ctx.state_dir);
    Ok(AppData::from_scan(ctx.sessions_dir.clone(), scan, names))
}

fn setup_terminal() -> Result<Terminal<CrosstermBackend<Stdout>>, app::AppError> {
    enable_raw_mode()?;
    let mut stdout = io::stdout();
    stdout.execute(EnterAlternateScreen)?;
    let _ = stdout.execute(EnableBracketedPaste);
    let backend = CrosstermBackend::new(stdout);
    Ok(Terminal::new(backend)?)
}

fn restore_terminal(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
) -> Result<(), app::AppError> {
    disable_raw_mode()?;
    let _ = execute!(terminal.backend_mut(), DisableBracketedPaste);
    execute!(terminal.backend_mut(), LeaveAlternateScreen)?;
    terminal.show_cursor()?;
    Ok(())
}

fn run(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    mut model: AppModel,
    ctx: &Context,
) -> Result<PickerExit, app::AppError> {
    loop {
        terminal.draw(|frame| ui::render(frame, &model))?;

        let event = match event::read()? {
            Event::Key(key) if key.kind == KeyEventKind::Press => AppEvent::Key(key),
            Event::Paste(text) => AppEvent::Paste(text),
            Event::Resize(width, height) => AppEvent::Resize(width, height),
            _ => continue,
        };

        let (next, command) = app::update(model, event);
        model = next;

        match command {
            AppCommand::None => {}
            AppCommand::Quit => return Ok(PickerExit::Quit),
            AppCommand::Resume { session_id } => {
                return Ok(PickerExit::Launch(AgentInvocation::resume(&session_id, None)));
            }
            AppCommand::NewSession => {
                return Ok(PickerExit::Launch(AgentInvocation::new_session(None)));
            }
            AppCommand::Rename { session_id, name } => {
                let notice = match upsert_session_name(&ctx.state_dir, &session_id, &name) {
                    Ok(()) => format!("Renamed to \"{name}\""),
                    Err(error) => format!("Rename failed: {error}"),
                };
                model = reload(model, ctx, notice);
            }
            AppCommand::ClearName { session_id } => {
                let notice = match remove_session_name(&ctx.state_dir, &session_id) {
                    Ok(true) => "Name cleared".to_string(),
                    Ok(false) => "No name to clear".to_string(),
                    Err(error) => format!("Clear name failed: {error}"),
                };
                model = reload(model, ctx, notice);
            }
            AppCommand::Delete { session_id } => {
                let session = model
                    .data
                    .sessions
                    .iter()
                    .find(|session| session.id == session_id)
                    .cloned();
                let notice = match session {
                    Some(session) => {
                        match delete_session(&ctx.sessions_dir, &ctx.state_dir, &session) {
                            Ok(outcome) if outcome.name_removed => {
                                format!("Deleted {} and its name", session.short_id())
                            }
                            Ok(_) => format!("Deleted {}", session.short_id()),
                            Err(error) => format!("Delete failed: {error}"),
                        }
                    }
                    None => "Session no longer exists".to_string(),
                };
                model = reload(model, ctx, notice);
            }
        }
    }
}

/// Rescans after a mutation. A failed rescan keeps the old rows and reports
/// the error instead.
fn reload(model: AppModel, ctx: &Context, notice: String) -> AppModel {
    match load_app_data(ctx) {
        Ok(data) => {
            let notice = match &data.notice {
                Some(extra) => format!("{notice} · {extra}"),
                None => notice,
            };
            model.with_data(data).with_notice(Some(notice))
        }
        Err(error) => model.with_notice(Some(format!("{notice} · rescan failed: {error}"))),
    }
}
