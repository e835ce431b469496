use regex::Regex;
use std::collections::BTreeMap;
use std::sync::OnceLock;

fn marker_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^//\s*---\s*(.+?)\s*---\s*$").ok())
        .as_ref()
}

/// Candidate files keyed by relative path, parsed from a single blob with
/// `// --- <path> ---` marker lines.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Overlay {
    files: BTreeMap<String, String>,
}

impl Overlay {
    /// Text before the first marker is discarded. A repeated path keeps its
    /// last occurrence. Paths are not validated here. Content is kept byte
    /// for byte between markers, including trailing newlines and `\r`.
    pub fn parse(blob: &str) -> Self {
        let Some(re) = marker_re() else {
            return Self::default();
        };
        let mut files = BTreeMap::new();
        let mut current: Option<String> = None;
        let mut lines: Vec<&str> = Vec::new();

        for line in blob.split('\n') {
            if let Some(caps) = re.captures(line) {
                if let Some(path) = current.take() {
                    files.insert(path, lines.join("\n"));
                }
                lines.clear();
                current = Some(caps[1].trim().to_string());
            } else if current.is_some() {
                lines.push(line);
            }
        }
        if let Some(path) = current {
            files.insert(path, lines.join("\n"));
        }

        Self { files }
    }

    pub fn from_files<I, K, V>(files: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            files: files
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }

    pub fn to_blob(&self) -> String {
        self.files
            .iter()
            .map(|(path, content)| format!("// --- {} ---\n{}", path, content))
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn get(&self, path: &str) -> Option<&str> {
        self.files.get(path).map(String::as_str)
    }

    pub fn paths(&self) -> impl Iterator<Item = &str> {
        self.files.keys().map(String::as_str)
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.files.iter().map(|(k, v)| (k.as_str(), v.as_str()))
    }
}
