use std::path::{Path, PathBuf};
use std::process::{Command, Stdio};

/// Scope for directory-filtered views: the explicit directory when given,
/// else the enclosing git work tree, else the current directory.
pub fn resolve_scope_dir(explicit: Option<&Path>, current_dir: &Path) -> PathBuf {
    if let Some(dir) = explicit {
        return dir.to_path_buf();
    }
    git_toplevel(current_dir).unwrap_or_else(|| current_dir.to_path_buf())
}

fn git_toplevel(dir: &Path) -> Option<PathBuf> {
    let output = Command::new("git")
        .arg("rev-parse")
        .arg("--show-toplevel")
        .current_dir(dir)
        .stdin(Stdio::null())
        .stderr(Stdio::null())
        .output()
        .ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let root = text.trim();
    if root.is_empty() {
        return None;
    }
    Some(PathBuf::from(root))
}
