use crate::app::{
    AppModel, DeleteConfirmDialog, DeleteConfirmSelection, PickerState, RenameDialog,
};
use crate::domain::{SessionRecord, UNTITLED, relative_time_ago, tilde_path};
use crate::infra::SessionNames;
use ratatui::prelude::*;
use ratatui::widgets::*;
use std::path::Path;
use std::time::SystemTime;
use unicode_width::UnicodeWidthStr;

const COLUMN_SEP: &str = "  ·  ";

pub fn render(frame: &mut Frame, model: &AppModel) {
    let full_area = frame.area();
    if full_area.width == 0 || full_area.height == 0 {
        return;
    }

    render_sessions(frame, full_area, model);

    match &model.state {
        PickerState::Listing => {}
        PickerState::Renaming(dialog) => render_rename_overlay(frame, full_area, dialog),
        PickerState::ConfirmingDelete(dialog) => {
            render_delete_confirm_overlay(frame, full_area, model, dialog)
        }
    }
}

fn render_sessions(frame: &mut Frame, area: Rect, model: &AppModel) {
    let area = inner_area(area);
    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(area);

    let home = dirs::home_dir();
    let header_title = match (&model.scope, model.show_all) {
        (Some(scope), false) => format!(
            "Codex sessions · {}",
            tilde_path(scope.path(), home.as_deref())
        ),
        _ => "Codex sessions · all directories".to_string(),
    };
    let header_hint = format!(
        "{} of {} sessions · newest first",
        model.rows.len(),
        model.data.sessions.len()
    );
    let header = Paragraph::new(header_hint).block(
        Block::default()
            .borders(Borders::ALL)
            .padding(Padding::horizontal(1))
            .title(header_title),
    );
    frame.render_widget(header, chunks[0]);

    if model.rows.is_empty() {
        let message = if model.show_all {
            "No sessions found. Press n to start one."
        } else {
            "No sessions for this directory. Press a to show all, n to start one."
        };
        let paragraph = Paragraph::new(message).block(
            Block::default()
                .borders(Borders::ALL)
                .padding(Padding::horizontal(1)),
        );
        frame.render_widget(paragraph, chunks[1]);
    } else {
        let max_width = (chunks[1].width as usize).saturating_sub(6);
        let now = SystemTime::now();
        let modified_col_width = model
            .visible_sessions()
            .map(|session| {
                UnicodeWidthStr::width(relative_time_ago(session.last_modified, now).as_str())
            })
            .max()
            .unwrap_or(0);
        let items: Vec<ListItem> = model
            .visible_sessions()
            .map(|session| {
                session_list_item(
                    session,
                    &model.data.names,
                    SessionRowLayout {
                        max_width,
                        modified_col_width,
                        now,
                        home: home.as_deref(),
                    },
                )
            })
            .collect();

        let list = List::new(items)
            .block(
                Block::default()
                    .borders(Borders::ALL)
                    .padding(Padding::horizontal(1))
                    .title("Sessions"),
            )
            .highlight_style(
                Style::default()
                    .fg(Color::Yellow)
                    .add_modifier(Modifier::BOLD),
            )
            .highlight_symbol("▸ ");

        let mut state = ListState::default();
        state.select(Some(model.selected.min(model.rows.len().saturating_sub(1))));
        frame.render_stateful_widget(list, chunks[1], &mut state);
    }

    frame.render_widget(footer_line(model), chunks[2]);
}

fn footer_line(model: &AppModel) -> Paragraph<'static> {
    let scope_hint = if model.scope.is_some() {
        if model.show_all { "  a=this dir" } else { "  a=all dirs" }
    } else {
        ""
    };
    let mut text = format!(
        "Keys: ↑/↓=move  Enter=resume  n=new  r=rename  d=delete{scope_hint}  q/Esc=quit"
    );
    let skipped = model.data.skipped.get();
    if skipped > 0 {
        text.push_str(&format!("{COLUMN_SEP}skipped: {skipped}"));
    }
    let text = footer_with_notice(text, model.notice.as_deref());
    Paragraph::new(text).style(Style::default().fg(Color::DarkGray))
}

fn footer_with_notice(mut base: String, notice: Option<&str>) -> String {
    if let Some(message) = notice.filter(|message| !message.trim().is_empty()) {
        base.push_str(COLUMN_SEP);
        base.push_str(message);
    }
    base
}

struct SessionRowLayout<'a> {
    max_width: usize,
    modified_col_width: usize,
    now: SystemTime,
    home: Option<&'a Path>,
}

fn session_list_item(
    session: &SessionRecord,
    names: &SessionNames,
    layout: SessionRowLayout<'_>,
) -> ListItem<'static> {
    if layout.max_width == 0 {
        return ListItem::new(Line::from(""));
    }

    let modified = relative_time_ago(session.last_modified, layout.now);
    let modified = pad_left(&modified, layout.modified_col_width);
    let id = pad_right(session.short_id(), 8);
    let named = names.name_for(&session.id).is_some();
    let label = names.label_for(session, UNTITLED);
    let cwd = session
        .cwd
        .as_deref()
        .map(|cwd| tilde_path(cwd, layout.home))
        .unwrap_or_default();

    let sep_width = UnicodeWidthStr::width(COLUMN_SEP);
    let fixed_width = layout.modified_col_width + sep_width + 8 + sep_width;
    let available = layout.max_width.saturating_sub(fixed_width);
    let cwd_width = if cwd.is_empty() {
        0
    } else {
        (available / 3).min(UnicodeWidthStr::width(cwd.as_str()))
    };
    let cwd_sep_width = if cwd_width > 0 { sep_width } else { 0 };
    let label_width = available.saturating_sub(cwd_width + cwd_sep_width);

    let label_style = if named {
        Style::default().add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let dim = Style::default().fg(Color::DarkGray);
    let label = pad_right(&truncate_end(label, label_width), label_width);

    let mut spans = vec![
        Span::styled(modified, dim),
        Span::styled(COLUMN_SEP, dim),
        Span::styled(id, Style::default().fg(Color::Cyan)),
        Span::styled(COLUMN_SEP, dim),
        Span::styled(label, label_style),
    ];
    if cwd_width > 0 {
        spans.push(Span::styled(COLUMN_SEP, dim));
        spans.push(Span::styled(truncate_start(&cwd, cwd_width), dim));
    }
    ListItem::new(Line::from(spans))
}

fn render_rename_overlay(frame: &mut Frame, area: Rect, dialog: &RenameDialog) {
    let popup = centered_rect(64, 30, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .title("Rename Session");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(2),
            Constraint::Length(3),
            Constraint::Min(0),
            Constraint::Length(1),
        ])
        .split(inner);

    let short_id: String = dialog.session_id.chars().take(8).collect();
    frame.render_widget(
        Paragraph::new(format!("Name for session {short_id} (empty clears it):")),
        chunks[0],
    );

    let input_block = Block::default().borders(Borders::ALL);
    let input_inner = input_block.inner(chunks[1]);
    let width = input_inner.width as usize;
    let (visible, cursor_x) = visible_input(&dialog.editor.text, dialog.editor.cursor_col, width);
    frame.render_widget(Paragraph::new(visible).block(input_block), chunks[1]);
    if input_inner.width > 0 && input_inner.height > 0 {
        let x = input_inner
            .x
            .saturating_add(u16::try_from(cursor_x).unwrap_or(u16::MAX))
            .min(input_inner.x + input_inner.width.saturating_sub(1));
        frame.set_cursor_position(Position::new(x, input_inner.y));
    }

    let hint = Paragraph::new("Keys: Enter save  Esc cancel  Ctrl+W word  Ctrl+U clear")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[3]);
}

/// Horizontal window over the input so the cursor stays visible. Returns the
/// visible text and the cursor's column inside it.
fn visible_input(text: &str, cursor_col: usize, width: usize) -> (String, usize) {
    if width == 0 {
        return (String::new(), 0);
    }
    let chars: Vec<char> = text.chars().collect();
    let cursor_col = cursor_col.min(chars.len());

    let mut start = 0usize;
    loop {
        let before: String = chars[start..cursor_col].iter().collect();
        if UnicodeWidthStr::width(before.as_str()) < width || start >= cursor_col {
            let visible = take_prefix_width(&chars[start..].iter().collect::<String>(), width);
            return (visible, UnicodeWidthStr::width(before.as_str()));
        }
        start += 1;
    }
}

fn render_delete_confirm_overlay(
    frame: &mut Frame,
    area: Rect,
    model: &AppModel,
    confirm: &DeleteConfirmDialog,
) {
    let popup = centered_rect(72, 44, area);
    frame.render_widget(Clear, popup);

    let block = Block::default()
        .borders(Borders::ALL)
        .padding(Padding::horizontal(1))
        .title("Delete Session");
    let inner = block.inner(popup);
    frame.render_widget(block, popup);

    let chunks = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Min(0),
            Constraint::Length(3),
            Constraint::Length(1),
        ])
        .split(inner);

    let max_line_width = (chunks[0].width as usize).saturating_sub(1);
    let sessions_dir = model.data.sessions_dir.display().to_string();
    let sessions_dir = truncate_start(&sessions_dir, max_line_width.saturating_sub(14));
    let log_file = confirm
        .log_path
        .file_name()
        .map(|name| name.to_string_lossy().to_string())
        .unwrap_or_else(|| confirm.log_path.display().to_string());
    let log_file = truncate_start(&log_file, max_line_width.saturating_sub(10));

    let message = vec![
        Line::from(vec![
            Span::raw("Delete "),
            Span::styled(
                format!(
                    "\"{}\"",
                    truncate_end(&confirm.label, max_line_width.saturating_sub(10))
                ),
                Style::default().add_modifier(Modifier::BOLD),
            ),
            Span::raw("?"),
        ]),
        Line::from(""),
        Line::from(format!("Session: {}", confirm.session_id)),
        Line::from(format!(
            "Started: {}",
            confirm.started.as_deref().unwrap_or("-")
        )),
        Line::from(format!("Log file: {log_file}")),
        Line::from(""),
        Line::from(vec![Span::styled(
            "This deletes the transcript and its saved name. It cannot be undone.",
            Style::default()
                .fg(Color::Yellow)
                .add_modifier(Modifier::BOLD),
        )]),
        Line::from(format!("Sessions dir: {sessions_dir}")),
    ];

    let paragraph = Paragraph::new(message).wrap(Wrap { trim: false });
    frame.render_widget(paragraph, chunks[0]);

    let cancel_style = if confirm.selection == DeleteConfirmSelection::Cancel {
        Style::default()
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD)
    } else {
        Style::default()
    };
    let delete_base = Style::default().fg(Color::Red);
    let delete_style = if confirm.selection == DeleteConfirmSelection::Delete {
        delete_base
            .add_modifier(Modifier::REVERSED)
            .add_modifier(Modifier::BOLD)
    } else {
        delete_base.add_modifier(Modifier::BOLD)
    };

    let buttons = Paragraph::new(Line::from(vec![
        Span::styled("[ Cancel ]", cancel_style),
        Span::raw("   "),
        Span::styled("[ Delete ]", delete_style),
    ]))
    .alignment(Alignment::Center);
    frame.render_widget(buttons, chunks[1]);

    let hint = Paragraph::new("Keys: ←/→ choose  Enter confirm  Esc cancel  y/n")
        .style(Style::default().fg(Color::DarkGray))
        .alignment(Alignment::Center);
    frame.render_widget(hint, chunks[2]);
}

fn pad_left(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", " ".repeat(width.saturating_sub(current)), text)
}

fn pad_right(text: &str, width: usize) -> String {
    let current = UnicodeWidthStr::width(text);
    if current >= width {
        return text.to_string();
    }
    format!("{}{}", text, " ".repeat(width.saturating_sub(current)))
}

fn truncate_end(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis = "…";
    let available = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));
    let mut out = take_prefix_width(text, available);
    out.push_str(ellipsis);
    out
}

/// Paths read best from their tail.
fn truncate_start(text: &str, max_width: usize) -> String {
    if max_width == 0 {
        return String::new();
    }
    if UnicodeWidthStr::width(text) <= max_width {
        return text.to_string();
    }
    let ellipsis = "…";
    let available = max_width.saturating_sub(UnicodeWidthStr::width(ellipsis));
    format!("{ellipsis}{}", take_suffix_width(text, available))
}

fn take_prefix_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    for ch in text.chars() {
        let next = format!("{out}{ch}");
        if UnicodeWidthStr::width(next.as_str()) > width {
            break;
        }
        out.push(ch);
    }
    out
}

fn take_suffix_width(text: &str, width: usize) -> String {
    let mut out = String::new();
    for ch in text.chars().rev() {
        let next = format!("{ch}{out}");
        if UnicodeWidthStr::width(next.as_str()) > width {
            break;
        }
        out.insert(0, ch);
    }
    out
}

fn inner_area(area: Rect) -> Rect {
    if area.width < 40 || area.height < 12 {
        return area;
    }
    area.inner(Margin {
        vertical: 1,
        horizontal: 2,
    })
}

fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let popup_layout = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Percentage((100 - percent_y) / 2),
            Constraint::Percentage(percent_y),
            Constraint::Percentage((100 - percent_y) / 2),
        ])
        .split(r);

    Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Percentage((100 - percent_x) / 2),
            Constraint::Percentage(percent_x),
            Constraint::Percentage((100 - percent_x) / 2),
        ])
        .split(popup_layout[1])[1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::app::{AppData, AppEvent, update};
    use crate::domain::{ResolvedScope, SessionMeta, make_session_record};
    use crate::infra::ScanWarningCount;
    use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
    use ratatui::backend::TestBackend;
    use std::path::PathBuf;

    fn model() -> AppModel {
        let session = make_session_record(
            SessionMeta {
                id: "0194f1c2-aaaa".to_string(),
                cwd: Some(PathBuf::from("/work/repo")),
                started_at_rfc3339: String::new(),
                git: None,
            },
            PathBuf::from("/sessions/rollout-0194f1c2.jsonl"),
            Some("Add a scope filter".to_string()),
            10,
            SystemTime::now(),
        );
        let data = AppData {
            sessions_dir: PathBuf::from("/sessions"),
            sessions: vec![session],
            names: SessionNames::default(),
            skipped: ScanWarningCount::from(2),
            notice: None,
        };
        AppModel::new(data, Some(ResolvedScope::new(Path::new("/work/repo"))), false)
            .with_terminal_size(100, 30)
    }

    fn screen(model: &AppModel) -> String {
        let mut terminal = Terminal::new(TestBackend::new(100, 30)).expect("terminal");
        terminal.draw(|frame| render(frame, model)).expect("draw");
        let buffer = terminal.backend().buffer();
        let mut out = String::new();
        for y in 0..buffer.area.height {
            for x in 0..buffer.area.width {
                out.push_str(buffer[(x, y)].symbol());
            }
            out.push('\n');
        }
        out
    }

    #[test]
    fn renders_rows_and_footer() {
        let text = screen(&model());
        assert!(text.contains("1 of 1 sessions"));
        assert!(text.contains("0194f1c2"));
        assert!(text.contains("Add a scope filter"));
        assert!(text.contains("just now"));
        assert!(text.contains("skipped: 2"));
    }

    #[test]
    fn renders_dialog_overlays() {
        let key = |code| AppEvent::Key(KeyEvent::new(code, KeyModifiers::NONE));
        let (renaming, _) = update(model(), key(KeyCode::Char('r')));
        assert!(screen(&renaming).contains("Rename Session"));

        let (confirming, _) = update(model(), key(KeyCode::Char('d')));
        let text = screen(&confirming);
        assert!(text.contains("Delete Session"));
        assert!(text.contains("[ Cancel ]"));
    }

    #[test]
    fn truncates_by_display_width() {
        assert_eq!(truncate_end("abcdef", 4), "abc…");
        assert_eq!(truncate_end("abc", 4), "abc");
        assert_eq!(truncate_start("/a/b/c/d", 5), "…/c/d");
        assert_eq!(pad_left("7m ago", 8), "  7m ago");
    }

    #[test]
    fn input_window_follows_cursor() {
        assert_eq!(visible_input("hello", 5, 10), ("hello".to_string(), 5));
        let (visible, cursor) = visible_input("abcdefghij", 10, 4);
        assert_eq!(visible, "hij");
        assert_eq!(cursor, 3);
    }
}
