//! `larder commit` command - Publish local files as one commit.

use std::fs;
use std::path::{Component, Path, PathBuf};

use anyhow::{Context, Result, bail};
use larder_github::FileChange;

use crate::commands::utils;
use crate::output;
use crate::services::CommitRequest;

/// Run the commit command.
pub fn run(config_path: &Path, paths: &[PathBuf], message: &str) -> Result<()> {
    let config = utils::load_config(config_path)?;
    let root = &config.content.dir;

    let files = paths
        .iter()
        .map(|path| read_change(root, path))
        .collect::<Result<Vec<_>>>()?;

    let service = utils::open_service(&config);
    if let Some(committer) = service.committer() {
        let repo = committer.repo();
        output::info(&format!(
            "Publishing {} file(s) to {}/{}@{}...",
            files.len(),
            repo.owner,
            repo.repo,
            repo.branch
        ));
    }

    let rt = utils::runtime()?;
    let response = rt.block_on(service.commit(CommitRequest {
        files,
        message: message.to_string(),
    }))?;

    for file in &response.files {
        output::detail(&format!("  {file}"));
    }
    output::success(&format!("Committed {}", response.commit.sha));
    output::essential(&response.commit.url);
    Ok(())
}

/// Read `path` and address it relative to the content root.
fn read_change(root: &Path, path: &Path) -> Result<FileChange> {
    let relative = repo_path(root, path)?;
    let content = fs::read_to_string(root.join(&relative))
        .with_context(|| format!("Failed to read {}", path.display()))?;
    Ok(FileChange::new(relative, content))
}

/// Repo-relative, `/`-separated form of `path`.
fn repo_path(root: &Path, path: &Path) -> Result<String> {
    let relative = if path.is_absolute() {
        let root = root
            .canonicalize()
            .with_context(|| format!("Content directory {} not found", root.display()))?;
        path.strip_prefix(&root)
            .with_context(|| format!("{} is outside {}", path.display(), root.display()))?
            .to_path_buf()
    } else {
        path.to_path_buf()
    };

    let mut parts = Vec::new();
    for component in relative.components() {
        match component {
            Component::Normal(part) => parts.push(
                part.to_str()
                    .with_context(|| format!("{} is not valid UTF-8", path.display()))?,
            ),
            Component::CurDir => {}
            _ => bail!("{} must stay inside the content directory", path.display()),
        }
    }

    if parts.is_empty() {
        bail!("{} is not a file path", path.display());
    }
    Ok(parts.join("/"))
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_repo_path_relative() {
        let root = Path::new("/srv/recipes");
        assert_eq!(
            repo_path(root, Path::new("./content/recipes/pho/index.md")).unwrap(),
            "content/recipes/pho/index.md"
        );
        assert!(repo_path(root, Path::new("../secrets.md")).is_err());
        assert!(repo_path(root, Path::new(".")).is_err());
    }

    #[test]
    fn test_repo_path_absolute_inside_root() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().canonicalize().unwrap();
        let file = root.join("content").join("a.md");

        assert_eq!(repo_path(&root, &file).unwrap(), "content/a.md");
        assert!(repo_path(&root, Path::new("/etc/passwd")).is_err());
    }

    #[test]
    fn test_read_change() {
        let temp = TempDir::new().unwrap();
        fs::create_dir_all(temp.path().join("notes")).unwrap();
        fs::write(temp.path().join("notes/a.md"), "hello").unwrap();

        let change = read_change(temp.path(), Path::new("notes/a.md")).unwrap();
        assert_eq!(change, FileChange::new("notes/a.md", "hello"));
        assert!(read_change(temp.path(), Path::new("notes/missing.md")).is_err());
    }
}
