// Shared text helpers: dedup keys, bullet stripping, number words, decimals.

use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::LazyLock;

const BULLETS: &[char] = &['-', '*', '•', '·', '–', '—', '>', '+', '▪', '◦', '→'];

static PUNCTUATION_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^\p{L}\p{N}\s]+").unwrap());
static WHITESPACE_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"\s+").unwrap());
static NUMBER_WORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(eins|einen|einem|einer|eine|ein|zwei|zwo|drei|vier|fünf|fuenf|sechs|sieben|acht|neun|zehn|elf|zwölf|zwoelf)\b",
    )
    .unwrap()
});

/// Comparison key used for every dedup and membership check:
/// lower-cased, punctuation replaced by spaces, whitespace collapsed.
pub fn normalize_key(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = PUNCTUATION_RE.replace_all(&lowered, " ");
    WHITESPACE_RE.replace_all(stripped.trim(), " ").into_owned()
}

pub fn collapse_whitespace(text: &str) -> String {
    WHITESPACE_RE.replace_all(text.trim(), " ").into_owned()
}

pub fn strip_leading_bullets(text: &str) -> &str {
    text.trim_start_matches(|c: char| c.is_whitespace() || BULLETS.contains(&c))
}

pub fn strip_bullets(text: &str) -> &str {
    strip_leading_bullets(text).trim_end()
}

fn number_word_value(word: &str) -> &'static str {
    match word.to_lowercase().as_str() {
        "eins" | "ein" | "eine" | "einen" | "einem" | "einer" => "1",
        "zwei" | "zwo" => "2",
        "drei" => "3",
        "vier" => "4",
        "fünf" | "fuenf" => "5",
        "sechs" => "6",
        "sieben" => "7",
        "acht" => "8",
        "neun" => "9",
        "zehn" => "10",
        "elf" => "11",
        _ => "12",
    }
}

/// Replaces spelled-out counts (ein … zwölf) with digits.
pub fn replace_number_words(text: &str) -> String {
    NUMBER_WORD_RE
        .replace_all(text, |caps: &Captures| number_word_value(&caps[1]).to_string())
        .into_owned()
}

/// Parses "4", "4.5" or "4,5". Negative or non-finite values are rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    raw.trim()
        .replace(',', ".")
        .parse::<f64>()
        .ok()
        .filter(|v| v.is_finite() && *v >= 0.0)
}

/// Splits on commas, keeping decimal commas ("2,5") intact.
pub fn split_on_commas(text: &str) -> Vec<String> {
    let chars: Vec<char> = text.chars().collect();
    let mut parts = Vec::new();
    let mut current = String::new();

    for (i, &ch) in chars.iter().enumerate() {
        let decimal = ch == ','
            && i > 0
            && chars[i - 1].is_ascii_digit()
            && chars.get(i + 1).is_some_and(|c| c.is_ascii_digit());
        if ch == ',' && !decimal {
            parts.push(std::mem::take(&mut current));
        } else {
            current.push(ch);
        }
    }
    parts.push(current);

    parts
        .iter()
        .map(|p| strip_bullets(p).to_string())
        .filter(|p| !p.is_empty())
        .collect()
}

/// Insertion-ordered list deduplicated by [`normalize_key`].
#[derive(Debug, Clone, Default)]
pub struct OrderedSet {
    items: Vec<String>,
    keys: HashSet<String>,
}

impl OrderedSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns false for duplicates and for items whose key is empty.
    pub fn insert(&mut self, item: impl Into<String>) -> bool {
        let item = item.into();
        let key = normalize_key(&item);
        if key.is_empty() || !self.keys.insert(key) {
            return false;
        }
        self.items.push(item);
        true
    }

    pub fn contains(&self, text: &str) -> bool {
        self.keys.contains(&normalize_key(text))
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.keys.contains(key)
    }

    pub fn iter(&self) -> impl Iterator<Item = &String> {
        self.items.iter()
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn into_vec(self) -> Vec<String> {
        self.items
    }
}

impl FromIterator<String> for OrderedSet {
    fn from_iter<I: IntoIterator<Item = String>>(iter: I) -> Self {
        let mut set = OrderedSet::new();
        for item in iter {
            set.insert(item);
        }
        set
    }
}
