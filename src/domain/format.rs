use std::cmp::Ordering;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use time::OffsetDateTime;
use time::macros::format_description;

pub fn relative_time_ago(time: SystemTime, now: SystemTime) -> String {
    let diff = now.duration_since(time).unwrap_or(Duration::from_secs(0));
    match diff.cmp(&Duration::from_secs(60)) {
        Ordering::Less => "just now".to_string(),
        Ordering::Equal | Ordering::Greater => humanize_duration(diff),
    }
}

fn humanize_duration(duration: Duration) -> String {
    let seconds = duration.as_secs();
    if seconds < 60 {
        return format!("{seconds}s ago");
    }
    let minutes = seconds / 60;
    if minutes < 60 {
        return format!("{minutes}m ago");
    }
    let hours = minutes / 60;
    if hours < 24 {
        return format!("{hours}h ago");
    }
    let days = hours / 24;
    format!("{days}d ago")
}

/// UTC, minute precision: `2026-02-18 21:39`.
pub fn format_timestamp(time: SystemTime) -> String {
    let moment = OffsetDateTime::from(time);
    moment
        .format(format_description!("[year]-[month]-[day] [hour]:[minute]"))
        .unwrap_or_else(|_| "-".to_string())
}

/// Replaces a leading home directory with `~`.
pub fn tilde_path(path: &Path, home: Option<&Path>) -> String {
    let Some(home) = home else {
        return path.display().to_string();
    };
    match path.strip_prefix(home) {
        Ok(rest) if rest.as_os_str().is_empty() => "~".to_string(),
        Ok(rest) => PathBuf::from("~").join(rest).display().to_string(),
        Err(_) => path.display().to_string(),
    }
}
