// Workforce detection and extraction.
//
// Both the predicate and the extractor are ordered tables; the first signal or
// strategy that fires decides.

use crate::core::text::{parse_decimal, replace_number_words, strip_bullets};
use crate::core::vocab::{
    contains_role_word, is_name_candidate, is_role_word, role_label, words, CLOCK_RE,
    COUNT_ROLE_HOURS_RE, COUNT_ROLE_RATE_RE, HOURS_RE, NAME_HOURS_RE, NAME_TOKEN_RE, ON_SITE_RE,
    PER_HOURS_RE, PER_PERSON_RE, WORKING_TIME_RE,
};
use crate::domain::model::WorkerEntry;
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

/// Upper bound for synthesized crew members from a single "N Monteure je Xh" line.
const MAX_CREW_SIZE: usize = 50;

static TRAILING_HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)[\s,:;=-]*(?:\b(?:je|jeweils|à)\s*\d+(?:[.,]\d+)?\s*(?:h|hrs|std|stunden|stunde)?|\d+(?:[.,]\d+)?\s*(?:h|hrs|std|stunden|stunde))\.?\s*$",
    )
    .unwrap()
});

type Signal = fn(&str) -> bool;

const WORKFORCE_SIGNALS: &[(&str, Signal)] = &[
    ("working_time", |text| WORKING_TIME_RE.is_match(text)),
    ("role_with_time", role_with_time),
    ("counted_crew_rate", |text| counted_crew(text).is_some()),
    ("named_hours", has_named_hours),
    ("on_site_crew", on_site_crew),
];

/// Name of the first workforce signal the text triggers.
pub fn workforce_signal(text: &str) -> Option<&'static str> {
    WORKFORCE_SIGNALS
        .iter()
        .find(|(_, signal)| signal(text))
        .map(|(name, _)| *name)
}

pub fn is_workforce_like(text: &str) -> bool {
    workforce_signal(text).is_some()
}

fn role_with_time(text: &str) -> bool {
    contains_role_word(text)
        && (HOURS_RE.is_match(text) || CLOCK_RE.is_match(text) || ON_SITE_RE.is_match(text))
}

fn has_named_hours(text: &str) -> bool {
    NAME_HOURS_RE
        .captures_iter(text)
        .any(|caps| is_name_candidate(&caps[1]))
}

fn on_site_crew(text: &str) -> bool {
    if !ON_SITE_RE.is_match(text) {
        return false;
    }
    let normalized = replace_number_words(text);
    COUNT_ROLE_HOURS_RE
        .captures_iter(&normalized)
        .any(|caps| contains_role_word(&caps[2]))
}

/// Collapses crew words to one label: generic words ("Männer", "Helfer",
/// "Kolonne") become "Mitarbeiter", specific trades keep their singular form.
pub fn normalize_role_label(phrase: &str) -> String {
    if let Some(label) = words(phrase).find_map(role_label) {
        return label.to_string();
    }
    words(phrase)
        .map(|word| {
            let mut chars = word.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}

struct CountedCrew {
    count: usize,
    role: String,
    hours: f64,
}

fn counted_crew(text: &str) -> Option<CountedCrew> {
    let normalized = replace_number_words(text);
    COUNT_ROLE_RATE_RE.captures_iter(&normalized).find_map(|caps| {
        let count = caps[1].parse::<usize>().ok().filter(|c| (1..=MAX_CREW_SIZE).contains(c))?;
        if !contains_role_word(&caps[2]) {
            return None;
        }
        let hours = parse_decimal(&caps[3])?;
        Some(CountedCrew {
            count,
            role: normalize_role_label(&caps[2]),
            hours,
        })
    })
}

/// Removes hour remnants captured as part of a name ("Müller 8h", "Kai je 4h").
pub fn sanitize_display_name(name: &str) -> String {
    let mut current = name.trim().to_string();
    while let Some(m) = TRAILING_HOURS_RE.find(&current) {
        current.truncate(m.start());
    }
    current
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, ',' | ';' | ':' | '-' | '='))
        .to_string()
}

/// Splits an optional `group;` prefix off a workforce fragment.
///
/// The part before the first semicolon only counts as a group label when it
/// carries no hours of its own ("Müller 8h; Schmidt 6h" has no group).
pub fn split_group(fragment: &str) -> (String, String) {
    let body = strip_bullets(fragment);
    if let Some((head, rest)) = body.split_once(';') {
        let head = head.trim();
        let rest = rest.trim();
        if !head.is_empty()
            && !rest.is_empty()
            && !HOURS_RE.is_match(head)
            && !PER_HOURS_RE.is_match(head)
        {
            return (head.to_string(), rest.to_string());
        }
    }
    (String::new(), body.to_string())
}

fn hours_value(text: &str) -> Option<f64> {
    HOURS_RE
        .captures(text)
        .or_else(|| PER_HOURS_RE.captures(text))
        .and_then(|caps| parse_decimal(&caps[1]))
}

fn first_hours_indicator(text: &str) -> Option<usize> {
    [&HOURS_RE, &PER_HOURS_RE, &PER_PERSON_RE, &CLOCK_RE]
        .iter()
        .filter_map(|re| re.find(text).map(|m| m.start()))
        .min()
}

fn strip_on_site_prefix(text: &str) -> &str {
    let trimmed = text.trim_start();
    match ON_SITE_RE.find(trimmed) {
        Some(m) if m.start() == 0 => trimmed[m.end()..]
            .trim_start_matches(|c: char| c.is_whitespace() || matches!(c, ':' | ',' | ';' | '-')),
        _ => trimmed,
    }
}

struct WorkforceInput<'a> {
    group: &'a str,
    text: &'a str,
}

type Strategy = fn(&WorkforceInput<'_>) -> Option<Vec<WorkerEntry>>;

const STRATEGIES: &[(&str, Strategy)] = &[
    ("named_hours", named_hours),
    ("name_list", name_list),
    ("counted_crew", counted_crew_entries),
    ("whole_text", whole_text),
];

/// `Müller 8h, Schmidt 6h`: one entry per pair. Gives up when a pair's name
/// is a role word. When other names sit between two pairs ("Müller Schmidt
/// 4h"), the pairing is ambiguous: those names and the pair's own name are
/// kept without hours, and the pairs before them stand.
fn named_hours(input: &WorkforceInput<'_>) -> Option<Vec<WorkerEntry>> {
    let mut entries = Vec::new();
    let mut previous_end = 0;

    for caps in NAME_HOURS_RE.captures_iter(input.text) {
        let whole = caps.get(0)?;
        let name = &caps[1];
        let lowered = name.to_lowercase();
        if is_role_word(name) || lowered == "je" || lowered == "jeweils" {
            return None;
        }
        if !is_name_candidate(name) {
            continue;
        }

        let between: Vec<&str> = NAME_TOKEN_RE
            .find_iter(&input.text[previous_end..whole.start()])
            .map(|m| m.as_str().trim_end_matches(['-', '\'', '’']))
            .filter(|word| is_name_candidate(word))
            .collect();
        if between.is_empty() {
            entries.push(WorkerEntry::named(input.group, name, parse_decimal(&caps[2])));
        } else {
            tracing::trace!(names = between.len() + 1, "hours withheld for ambiguous names");
            entries.extend(
                between
                    .into_iter()
                    .chain([name])
                    .map(|n| WorkerEntry::named(input.group, n, None)),
            );
        }
        previous_end = whole.end();
    }

    (!entries.is_empty()).then_some(entries)
}

/// `Müller, Schmidt jeweils 8h`: names before the first hours indicator.
/// Hours are only assigned when they clearly apply to every listed person.
fn name_list(input: &WorkforceInput<'_>) -> Option<Vec<WorkerEntry>> {
    let text = strip_on_site_prefix(input.text);
    let cut = first_hours_indicator(text).unwrap_or(text.len());

    let mut seen = HashSet::new();
    let names: Vec<&str> = NAME_TOKEN_RE
        .find_iter(&text[..cut])
        .map(|m| m.as_str().trim_end_matches(['-', '\'', '’']))
        .filter(|word| is_name_candidate(word))
        .filter(|word| seen.insert(word.to_lowercase()))
        .collect();
    if names.is_empty() {
        return None;
    }

    let apply_to_all =
        names.len() == 1 || PER_PERSON_RE.is_match(text) || PER_HOURS_RE.is_match(text);
    let hours = if apply_to_all { hours_value(text) } else { None };

    Some(
        names
            .into_iter()
            .map(|name| WorkerEntry::named(input.group, name, hours))
            .collect(),
    )
}

/// `2 Installateure je 4h` -> "Installateur 1", "Installateur 2".
fn counted_crew_entries(input: &WorkforceInput<'_>) -> Option<Vec<WorkerEntry>> {
    let crew = counted_crew(input.text)?;
    Some(
        (1..=crew.count)
            .map(|i| WorkerEntry {
                group: input.group.to_string(),
                name: format!("{} {}", crew.role, i),
                hours: Some(crew.hours),
                no_aggregate: true,
            })
            .collect(),
    )
}

fn whole_text(input: &WorkforceInput<'_>) -> Option<Vec<WorkerEntry>> {
    let text = input.text.trim();
    if text.is_empty() {
        return None;
    }
    Some(vec![WorkerEntry::named(
        input.group,
        &sanitize_display_name(text),
        hours_value(text),
    )])
}

/// Turns one workforce fragment into worker entries.
pub fn extract_workers(fragment: &str) -> Vec<WorkerEntry> {
    let (group, text) = split_group(fragment);
    let input = WorkforceInput {
        group: &group,
        text: &text,
    };

    for (name, strategy) in STRATEGIES {
        if let Some(entries) = strategy(&input) {
            tracing::trace!(strategy = *name, count = entries.len(), "workforce fragment parsed");
            return entries;
        }
    }
    Vec::new()
}
