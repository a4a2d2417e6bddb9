//! Optional source-control probing for the `Source` vertex. Shells out
//! to `git`; absence of `git`, or the root not being a repository, is
//! not an error — `probe` simply returns `None`.

use std::path::Path;
use std::process::Command;

use crate::protocol::types::Source;

/// Runs `git rev-parse`/`git symbolic-ref` against `root` and returns a
/// `Source` vertex payload when successful. `repository_type` defaults to
/// `git`, the only system this probe shells out to; an explicit
/// `--repository-type` override is threaded through unchanged.
pub fn probe(root: &Path, repository_url: Option<String>, repository_type: Option<String>) -> Option<Source> {
    let repository = repository_url.or_else(|| remote_url(root))?;
    Some(Source {
        repository,
        repository_type: repository_type.unwrap_or_else(|| "git".to_string()),
        revision: git_output(root, &["rev-parse", "HEAD"]),
        branch: git_output(root, &["symbolic-ref", "--short", "HEAD"]),
    })
}

fn remote_url(root: &Path) -> Option<String> {
    git_output(root, &["config", "--get", "remote.origin.url"])
}

fn git_output(root: &Path, args: &[&str]) -> Option<String> {
    let output = Command::new("git").arg("-C").arg(root).args(args).output().ok()?;
    if !output.status.success() {
        return None;
    }
    let text = String::from_utf8(output.stdout).ok()?;
    let trimmed = text.trim();
    if trimmed.is_empty() {
        None
    } else {
        Some(trimmed.to_string())
    }
}
