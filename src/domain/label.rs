use crate::domain::SessionRecord;

pub const UNTITLED: &str = "(untitled)";
pub const UNNAMED: &str = "(unnamed)";

/// Override name, then extracted title, then `placeholder`. Blank overrides
/// count as absent.
pub fn display_label<'a>(
    override_name: Option<&'a str>,
    session: &'a SessionRecord,
    placeholder: &'a str,
) -> &'a str {
    override_name
        .filter(|name| !name.trim().is_empty())
        .or(session.title.as_deref())
        .unwrap_or(placeholder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::{SessionMeta, make_session_record};
    use std::path::PathBuf;
    use std::time::SystemTime;

    fn session(title: Option<&str>) -> SessionRecord {
        make_session_record(
            SessionMeta {
                id: "s1".to_string(),
                cwd: None,
                started_at_rfc3339: String::new(),
                git: None,
            },
            PathBuf::from("/tmp/s1.jsonl"),
            title.map(str::to_string),
            0,
            SystemTime::UNIX_EPOCH,
        )
    }

    #[test]
    fn override_beats_title_beats_placeholder() {
        let titled = session(Some("Bar"));
        assert_eq!(display_label(Some("Foo"), &titled, UNTITLED), "Foo");
        assert_eq!(display_label(None, &titled, UNTITLED), "Bar");

        let bare = session(None);
        assert_eq!(display_label(None, &bare, UNTITLED), UNTITLED);
        assert_eq!(display_label(None, &bare, UNNAMED), UNNAMED);
        assert_eq!(display_label(Some("  "), &bare, UNNAMED), UNNAMED);
    }
}
