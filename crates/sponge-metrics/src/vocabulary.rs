use regex::Regex;
use sponge_core::config::Vocabulary;
use std::collections::HashSet;
use std::sync::OnceLock;

fn word_re() -> Option<&'static Regex> {
    static RE: OnceLock<Option<Regex>> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"\w+").ok()).as_ref()
}

/// Lower-cased term lists matched as substrings of a lower-cased prompt.
#[derive(Debug, Clone)]
pub struct Matcher {
    grounding: Vec<String>,
    tradeoff: Vec<String>,
    edge_case: Vec<String>,
}

impl Matcher {
    pub fn new(vocab: &Vocabulary) -> Self {
        let lower = |terms: &[String]| -> Vec<String> {
            terms
                .iter()
                .map(|t| t.trim().to_lowercase())
                .filter(|t| !t.is_empty())
                .collect()
        };
        Self {
            grounding: lower(&vocab.grounding),
            tradeoff: lower(&vocab.tradeoff),
            edge_case: lower(&vocab.edge_case),
        }
    }

    /// Mentions a file, function or concept of the reference project.
    pub fn is_grounded(&self, prompt: &str) -> bool {
        contains_any(prompt, &self.grounding)
    }

    pub fn has_tradeoff(&self, prompt: &str) -> bool {
        contains_any(prompt, &self.tradeoff)
    }

    pub fn has_edge_case(&self, prompt: &str) -> bool {
        contains_any(prompt, &self.edge_case)
    }
}

impl Default for Matcher {
    fn default() -> Self {
        Self::new(&Vocabulary::default())
    }
}

fn contains_any(text: &str, terms: &[String]) -> bool {
    let lower = text.to_lowercase();
    terms.iter().any(|t| lower.contains(t.as_str()))
}

fn words(s: &str) -> HashSet<String> {
    let lower = s.to_lowercase();
    match word_re() {
        Some(re) => re.find_iter(&lower).map(|m| m.as_str().to_string()).collect(),
        None => HashSet::new(),
    }
}

/// Jaccard similarity of the two texts' word sets; 0 when either is empty.
pub fn word_overlap(a: &str, b: &str) -> f64 {
    let wa = words(a);
    let wb = words(b);
    if wa.is_empty() || wb.is_empty() {
        return 0.0;
    }
    let inter = wa.intersection(&wb).count();
    let union = wa.union(&wb).count();
    inter as f64 / union as f64
}
