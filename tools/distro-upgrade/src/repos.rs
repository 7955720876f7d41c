//! Pointing the local zypper repository definitions at a new release.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::Context;

pub const REPO_FILE_EXTENSION: &str = "repo";

/// Can `from` at this position be a whole release token, i.e. `15.4` in `leap/15.4/repo` but
/// not in `15.45` or `115.4`
fn is_release_boundary(before: Option<char>, after: &str) -> bool {
    let before_ok = !matches!(before, Some(c) if c.is_ascii_digit() || c == '.');

    let mut rest = after.chars();
    let after_ok = match rest.next() {
        Some(c) if c.is_ascii_digit() => false,
        Some('.') => !matches!(rest.next(), Some(c) if c.is_ascii_digit()),
        _ => true,
    };

    before_ok && after_ok
}

/// Replace every whole occurrence of release `from` with `to`.
///
/// Returns `None` when nothing matched, which makes rewriting already rewritten text a no-op.
pub fn rewrite_release(text: &str, from: &str, to: &str) -> Option<String> {
    if from.is_empty() || from == to {
        return None;
    }

    let mut rewritten = String::with_capacity(text.len());
    let mut last = 0;

    for (idx, _) in text.match_indices(from) {
        let before = text[..idx].chars().next_back();
        let after = &text[idx + from.len()..];

        if is_release_boundary(before, after) {
            rewritten.push_str(&text[last..idx]);
            rewritten.push_str(to);
            last = idx + from.len();
        }
    }

    if last == 0 {
        return None;
    }

    rewritten.push_str(&text[last..]);
    Some(rewritten)
}

#[derive(Debug, Default, PartialEq, Eq)]
pub struct RewriteSummary {
    pub rewritten: Vec<PathBuf>,
    pub unchanged: Vec<PathBuf>,
    pub excluded: Vec<PathBuf>,
}

fn repo_files(dir: &Path) -> anyhow::Result<Vec<PathBuf>> {
    let entries = fs::read_dir(dir)
        .with_context(|| format!("Failed to read repository directory {}", dir.display()))?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry?.path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == REPO_FILE_EXTENSION) {
            files.push(path);
        }
    }

    files.sort();
    Ok(files)
}

/// Rewrite release `from` to `to` in every repository definition in `dir` apart from those in
/// `exclude`. Only files which contain `from` are written.
pub fn rewrite_repo_files(
    dir: &Path,
    from: &str,
    to: &str,
    exclude: &[PathBuf],
) -> anyhow::Result<RewriteSummary> {
    let mut summary = RewriteSummary::default();

    for path in repo_files(dir)? {
        if exclude.contains(&path) {
            tracing::debug!("Leaving {} on its pinned release", path.display());
            summary.excluded.push(path);
            continue;
        }

        let contents = fs::read_to_string(&path)
            .with_context(|| format!("Failed to read {}", path.display()))?;

        match rewrite_release(&contents, from, to) {
            Some(rewritten) => {
                fs::write(&path, rewritten)
                    .with_context(|| format!("Failed to write {}", path.display()))?;
                tracing::info!("Pointed {} at release {to}", path.display());
                summary.rewritten.push(path);
            }
            None => {
                tracing::debug!("No reference to release {from} in {}", path.display());
                summary.unchanged.push(path);
            }
        }
    }

    Ok(summary)
}
