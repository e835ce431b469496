use std::path::{Path, PathBuf};

/// Values substituted into the configured argument templates.
///
/// * `{root}` sandbox root, also the working directory
/// * `{project}` the project copy
/// * `{artifact}` path the runner must write its JUnit report to
/// * `{suites}` as a whole argument expands to one argument per suite file
/// * `{ignore}` repeats the argument once per ignored directory, and drops it when there are none
pub struct Placeholders<'a> {
    pub root: &'a Path,
    pub project: &'a Path,
    pub artifact: &'a Path,
    pub suites: &'a [PathBuf],
    pub ignores: &'a [PathBuf],
}

pub fn expand_args(templates: &[String], p: &Placeholders<'_>) -> Vec<String> {
    let mut out = Vec::with_capacity(templates.len() + p.suites.len());
    for t in templates {
        if t == "{suites}" {
            out.extend(p.suites.iter().map(|s| s.display().to_string()));
            continue;
        }
        let base = substitute(t, p);
        if base.contains("{ignore}") {
            for dir in p.ignores {
                out.push(base.replace("{ignore}", &dir.display().to_string()));
            }
            continue;
        }
        out.push(base);
    }
    out
}

fn substitute(t: &str, p: &Placeholders<'_>) -> String {
    let suites = p
        .suites
        .iter()
        .map(|s| s.display().to_string())
        .collect::<Vec<_>>()
        .join(" ");
    t.replace("{root}", &p.root.display().to_string())
        .replace("{project}", &p.project.display().to_string())
        .replace("{artifact}", &p.artifact.display().to_string())
        .replace("{suites}", &suites)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::SandboxConfig;

    #[test]
    fn test_default_args_expand_like_pytest_invocation() {
        let root = PathBuf::from("/tmp/sb");
        let project = root.join("rq-v1.0");
        let artifact = root.join("results.xml");
        let suites = vec![root.join("test_submission.py"), root.join("test_hidden.py")];
        let ignores = vec![project.join("tests")];
        let p = Placeholders {
            root: &root,
            project: &project,
            artifact: &artifact,
            suites: &suites,
            ignores: &ignores,
        };

        let args = expand_args(&SandboxConfig::default().args, &p);
        assert_eq!(
            args,
            vec![
                "-m",
                "pytest",
                "/tmp/sb/test_submission.py",
                "/tmp/sb/test_hidden.py",
                "--junitxml=/tmp/sb/results.xml",
                "-q",
                "--no-header",
                "--ignore=/tmp/sb/rq-v1.0/tests",
                "--rootdir=/tmp/sb",
            ]
        );
    }

    #[test]
    fn test_ignore_arg_dropped_without_dirs() {
        let root = PathBuf::from("/r");
        let p = Placeholders {
            root: &root,
            project: &root,
            artifact: &root,
            suites: &[],
            ignores: &[],
        };
        let args = expand_args(&["--ignore={ignore}".to_string(), "-x".to_string()], &p);
        assert_eq!(args, vec!["-x"]);
    }
}
