use super::fixture::DEFAULT_FIXTURE;
use super::SandboxError;
use crate::config::SandboxConfig;
use crate::overlay::Overlay;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tempfile::TempDir;

/// A materialized sandbox. Dropping it removes the whole directory tree.
pub struct Prepared {
    pub dir: TempDir,
    pub project: PathBuf,
    pub artifact: PathBuf,
    pub suites: Vec<PathBuf>,
    pub ignores: Vec<PathBuf>,
    /// Overlay entries that were refused.
    pub rejected: Vec<String>,
}

impl Prepared {
    pub fn root(&self) -> &Path {
        self.dir.path()
    }
}

pub fn prepare(
    cfg: &SandboxConfig,
    overlay: &Overlay,
    include_hidden: bool,
) -> Result<Prepared, SandboxError> {
    let dir = tempfile::Builder::new().prefix("sponge_sandbox_").tempdir()?;
    let root = dir.path().to_path_buf();
    let project = root.join(&cfg.project_dir);

    copy_tree(&cfg.reference_project, &project, &cfg.copy_excludes)?;

    let mut rejected = Vec::new();
    let project_real = fs::canonicalize(&project)?;
    for (rel, content) in overlay.iter() {
        match write_overlay_file(&project_real, rel, content) {
            Ok(()) => {}
            Err(OverlayWrite::Rejected(reason)) => {
                tracing::warn!(
                    event = "sponge.sandbox.overlay_rejected",
                    path = %rel,
                    reason = %reason,
                    "overlay entry outside the sandbox was skipped"
                );
                rejected.push(rel.to_string());
            }
            Err(OverlayWrite::Io(e)) => return Err(e.into()),
        }
    }

    let fixture = match &cfg.fixture_source {
        Some(src) => fs::read_to_string(src)?,
        None => DEFAULT_FIXTURE.to_string(),
    };
    fs::write(root.join(&cfg.fixture_name), fixture)?;

    let mut suites = vec![copy_suite(&cfg.visible_suite, &root)?];
    if include_hidden {
        if let Some(hidden) = &cfg.hidden_suite {
            suites.push(copy_suite(hidden, &root)?);
        }
    }

    let ignores = cfg.ignore_dirs.iter().map(|d| project.join(d)).collect();

    Ok(Prepared {
        artifact: root.join(&cfg.artifact_name),
        dir,
        project,
        suites,
        ignores,
        rejected,
    })
}

fn copy_suite(src: &Path, root: &Path) -> Result<PathBuf, SandboxError> {
    let name = src.file_name().ok_or_else(|| {
        std::io::Error::new(
            std::io::ErrorKind::InvalidInput,
            format!("suite path has no file name: {}", src.display()),
        )
    })?;
    let dst = root.join(name);
    fs::copy(src, &dst)?;
    Ok(dst)
}

fn copy_tree(src: &Path, dst: &Path, exclude: &[String]) -> Result<(), SandboxError> {
    if !src.is_dir() {
        return Err(std::io::Error::new(
            std::io::ErrorKind::NotFound,
            format!("reference project not found: {}", src.display()),
        )
        .into());
    }
    let walker = walkdir::WalkDir::new(src).into_iter().filter_entry(|e| {
        e.depth() == 0
            || !exclude
                .iter()
                .any(|ex| e.file_name().to_string_lossy() == ex.as_str())
    });
    for entry in walker {
        let entry = entry?;
        let rel = match entry.path().strip_prefix(src) {
            Ok(r) => r,
            Err(_) => continue,
        };
        let target = dst.join(rel);
        let ft = entry.file_type();
        if ft.is_dir() {
            fs::create_dir_all(&target)?;
        } else if ft.is_symlink() {
            // Links are materialized as plain files; linked directories are skipped.
            match fs::metadata(entry.path()) {
                Ok(meta) if meta.is_file() => {
                    fs::copy(entry.path(), &target)?;
                }
                _ => {
                    tracing::debug!(path = %entry.path().display(), "skipping symlink");
                }
            }
        } else {
            fs::copy(entry.path(), &target)?;
        }
    }
    Ok(())
}

enum OverlayWrite {
    Rejected(&'static str),
    Io(std::io::Error),
}

impl From<std::io::Error> for OverlayWrite {
    fn from(e: std::io::Error) -> Self {
        OverlayWrite::Io(e)
    }
}

/// Writes one overlay entry under `project_real` (already canonical).
fn write_overlay_file(project_real: &Path, rel: &str, content: &str) -> Result<(), OverlayWrite> {
    let rel_path = Path::new(rel);
    if rel.trim().is_empty() || rel_path.is_absolute() {
        return Err(OverlayWrite::Rejected("absolute or empty path"));
    }
    if rel_path
        .components()
        .any(|c| !matches!(c, Component::Normal(_) | Component::CurDir))
    {
        return Err(OverlayWrite::Rejected("parent or root component"));
    }

    let dest = project_real.join(rel_path);
    let Some(parent) = dest.parent() else {
        return Err(OverlayWrite::Rejected("no parent directory"));
    };
    // Check the deepest existing ancestor first so no directory is created
    // through a link that points outside.
    let mut anchor = parent;
    while !anchor.exists() {
        match anchor.parent() {
            Some(p) => anchor = p,
            None => break,
        }
    }
    if !fs::canonicalize(anchor)?.starts_with(project_real) {
        return Err(OverlayWrite::Rejected("resolves outside the project copy"));
    }
    fs::create_dir_all(parent)?;
    let parent_real = fs::canonicalize(parent)?;
    if !parent_real.starts_with(project_real) {
        return Err(OverlayWrite::Rejected("resolves outside the project copy"));
    }
    if let Ok(meta) = fs::symlink_metadata(&dest) {
        if meta.file_type().is_symlink() {
            return Err(OverlayWrite::Rejected("destination is a symlink"));
        }
        if meta.is_dir() {
            return Err(OverlayWrite::Rejected("destination is a directory"));
        }
    }
    let Some(file_name) = dest.file_name() else {
        return Err(OverlayWrite::Rejected("no file name"));
    };
    fs::write(parent_real.join(file_name), content)?;
    Ok(())
}
