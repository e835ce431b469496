use std::path::{Component, Path, PathBuf};

/// Resolves config-relative paths against the directory holding the config file.
#[derive(Clone)]
pub struct PathResolver {
    base_dir: PathBuf,
}

impl PathResolver {
    pub fn new(config_path: &Path) -> Self {
        let base_dir = config_path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."))
            .to_path_buf();
        Self { base_dir }
    }

    pub fn resolve(&self, p: &mut PathBuf) {
        if p.as_os_str().is_empty() || p.is_absolute() {
            return;
        }
        *p = lexical_clean(&self.base_dir.join(&*p));
    }

    pub fn resolve_opt(&self, p: &mut Option<PathBuf>) {
        if let Some(inner) = p.as_mut() {
            self.resolve(inner);
        }
    }
}

fn lexical_clean(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for c in path.components() {
        match c {
            Component::CurDir => {}
            Component::ParentDir => {
                if !out.pop() {
                    out.push("..");
                }
            }
            Component::RootDir | Component::Prefix(_) | Component::Normal(_) => {
                out.push(c.as_os_str())
            }
        }
    }
    if out.as_os_str().is_empty() {
        out.push(".");
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_relative_paths_follow_config_dir() {
        let r = PathResolver::new(Path::new("/srv/exercise/sponge.yaml"));
        let mut p = PathBuf::from("../shared/rq-v1.0");
        r.resolve(&mut p);
        assert_eq!(p, PathBuf::from("/srv/shared/rq-v1.0"));

        let mut abs = PathBuf::from("/opt/suite.py");
        r.resolve(&mut abs);
        assert_eq!(abs, PathBuf::from("/opt/suite.py"));
    }

    #[test]
    fn test_bare_file_name_resolves_to_cwd() {
        let r = PathResolver::new(Path::new("sponge.yaml"));
        let mut p = Some(PathBuf::from("./tests/test_hidden.py"));
        r.resolve_opt(&mut p);
        assert_eq!(p, Some(PathBuf::from("tests/test_hidden.py")));
    }
}
