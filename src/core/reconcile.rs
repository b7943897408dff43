// Builds the final three sections from routed fragments and an optional
// external classification.

use crate::core::aggregate::aggregate_workers;
use crate::core::headers::{is_header_only, split_bare_prefix, split_header_content};
use crate::core::material::{extract_materials, is_material_like};
use crate::core::router::classify_lines;
use crate::core::text::{collapse_whitespace, normalize_key, split_on_commas, strip_bullets, OrderedSet};
use crate::core::workforce::{extract_workers, is_workforce_like};
use crate::domain::model::{
    AggregatedWorker, ExternalClassification, MaterialEntry, NormalizedSections, SectionKind,
};
use regex::Regex;
use std::collections::HashSet;
use std::sync::LazyLock;

static SENTENCE_END_RE: LazyLock<Regex> = LazyLock::new(|| Regex::new(r"[.!?]\s+").unwrap());

#[derive(Debug, Default)]
struct Buckets {
    services: Vec<String>,
    workforce: Vec<String>,
    material: Vec<String>,
}

impl Buckets {
    fn get_mut(&mut self, kind: SectionKind) -> &mut Vec<String> {
        match kind {
            SectionKind::Services => &mut self.services,
            SectionKind::Workforce => &mut self.workforce,
            SectionKind::Material => &mut self.material,
        }
    }

    fn keys(&self) -> HashSet<String> {
        self.services
            .iter()
            .chain(&self.workforce)
            .chain(&self.material)
            .map(|item| normalize_key(item))
            .collect()
    }
}

/// Content-based section for a services item that really is workforce or material.
fn rescan(item: &str) -> SectionKind {
    if is_workforce_like(item) {
        SectionKind::Workforce
    } else if is_material_like(item) {
        SectionKind::Material
    } else {
        SectionKind::Services
    }
}

/// Section for a whole services item. An item whose comma parts disagree
/// stays in services and is split later.
fn whole_item_section(item: &str) -> SectionKind {
    let kind = rescan(item);
    if kind == SectionKind::Services {
        return kind;
    }
    let parts = split_on_commas(item);
    if parts.len() > 1 && parts.iter().any(|part| rescan(&strip_header_remnants(part)) != kind) {
        return SectionKind::Services;
    }
    kind
}

/// Drops a leading "AK:" / "Material:" / "AK " remnant, repeatedly.
fn strip_header_remnants(item: &str) -> String {
    let mut current = strip_bullets(item).to_string();
    while let Some((_, rest)) = split_header_content(&current).or_else(|| split_bare_prefix(&current)) {
        if rest == current {
            break;
        }
        current = rest;
    }
    current
}

/// Normalization keys of the raw lines; accepted items must occur in one of them.
struct RawText {
    line_keys: Vec<String>,
}

impl RawText {
    fn new<S: AsRef<str>>(lines: &[S]) -> Self {
        Self {
            line_keys: lines.iter().map(|l| normalize_key(l.as_ref())).collect(),
        }
    }

    fn contains(&self, item: &str) -> bool {
        let key = normalize_key(item);
        !key.is_empty() && self.line_keys.iter().any(|line| line.contains(&key))
    }

    /// Cleans one item; returns None for headers and text that is not in the report.
    fn sanitize(&self, item: &str) -> Option<String> {
        let cleaned = strip_header_remnants(item);
        if cleaned.is_empty() || is_header_only(&cleaned) || !self.contains(&cleaned) {
            return None;
        }
        Some(cleaned)
    }
}

fn sentences<S: AsRef<str>>(lines: &[S]) -> Vec<String> {
    let joined = lines
        .iter()
        .map(|l| l.as_ref())
        .collect::<Vec<_>>()
        .join(" ");
    let collapsed = collapse_whitespace(&joined);
    SENTENCE_END_RE
        .split(&collapsed)
        .map(strip_header_remnants)
        .filter(|s| !s.is_empty() && !is_header_only(s))
        .collect()
}

/// Normalizes a report's raw lines into the three output sections.
///
/// `external` is merged in after the rule-based pass and may only add items
/// that occur in the raw text.
pub fn normalize_report<S: AsRef<str>>(
    lines: &[S],
    external: Option<&ExternalClassification>,
) -> NormalizedSections {
    let raw = RawText::new(lines);
    let mut buckets = Buckets::default();

    for fragment in classify_lines(lines) {
        if let Some(item) = raw.sanitize(&fragment.text) {
            buckets.get_mut(fragment.kind).push(item);
        }
    }

    if let Some(external) = external.filter(|e| !e.is_empty()) {
        let mut baseline = buckets.keys();
        let mut added = 0;
        for kind in [SectionKind::Workforce, SectionKind::Material, SectionKind::Services] {
            for item in external.items(kind) {
                let Some(item) = raw.sanitize(item) else {
                    continue;
                };
                if baseline.insert(normalize_key(&item)) {
                    buckets.get_mut(kind).push(item);
                    added += 1;
                }
            }
        }
        tracing::debug!(added, "external classification merged");
    }

    for item in std::mem::take(&mut buckets.services) {
        let kind = whole_item_section(&item);
        buckets.get_mut(kind).push(item);
    }

    if buckets.workforce.is_empty() || buckets.material.is_empty() {
        let want_workforce = buckets.workforce.is_empty();
        let want_material = buckets.material.is_empty();
        for sentence in sentences(lines) {
            if want_workforce && is_workforce_like(&sentence) {
                buckets.workforce.push(sentence.clone());
            }
            if want_material && is_material_like(&sentence) {
                buckets.material.push(sentence);
            }
        }
    }

    for item in std::mem::take(&mut buckets.services) {
        for part in split_on_commas(&item) {
            let part = strip_header_remnants(&part);
            if part.is_empty() || is_header_only(&part) {
                continue;
            }
            let kind = rescan(&part);
            buckets.get_mut(kind).push(part);
        }
    }

    let sections = deduplicate(buckets);
    tracing::debug!(
        leistungen = sections.leistungen.len(),
        arbeitskraefte = sections.arbeitskraefte.len(),
        material = sections.material.len(),
        "report normalized"
    );
    sections
}

/// Workforce claims first, then material, then services. Material fragments
/// are expanded to display strings here.
fn deduplicate(buckets: Buckets) -> NormalizedSections {
    let workforce: OrderedSet = buckets.workforce.into_iter().collect();

    let mut material = OrderedSet::new();
    let mut material_fragment_keys = HashSet::new();
    for fragment in buckets.material {
        let key = normalize_key(&fragment);
        if workforce.contains_key(&key) {
            continue;
        }
        for entry in extract_materials(&fragment) {
            let display = entry.display();
            if !workforce.contains(&display) {
                material.insert(display);
            }
        }
        material_fragment_keys.insert(key);
    }

    let mut services = OrderedSet::new();
    for item in buckets.services {
        let key = normalize_key(&item);
        if workforce.contains_key(&key)
            || material.contains_key(&key)
            || material_fragment_keys.contains(&key)
        {
            continue;
        }
        services.insert(item);
    }

    NormalizedSections {
        leistungen: services.into_vec(),
        arbeitskraefte: workforce.into_vec(),
        material: material.into_vec(),
    }
}

impl NormalizedSections {
    /// Workforce items parsed and aggregated by name.
    pub fn workers(&self) -> Vec<AggregatedWorker> {
        let entries: Vec<_> = self
            .arbeitskraefte
            .iter()
            .flat_map(|item| extract_workers(item))
            .collect();
        aggregate_workers(&entries)
    }

    pub fn materials(&self) -> Vec<MaterialEntry> {
        self.material
            .iter()
            .flat_map(|item| extract_materials(item))
            .collect()
    }

    /// Renders the sections as report text, one `<header> <item>` line per item.
    /// Normalizing this text yields the same sections again.
    pub fn to_report_text(&self) -> String {
        [SectionKind::Services, SectionKind::Workforce, SectionKind::Material]
            .into_iter()
            .flat_map(|kind| {
                self.items(kind)
                    .iter()
                    .map(move |item| format!("{} {}", kind.header(), item))
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lines(text: &str) -> Vec<String> {
        text.lines().map(str::to_string).collect()
    }

    #[test]
    fn test_full_report() {
        let report = lines(
            "Leistungen:\n- Graben ausgehoben\n- Schacht gesetzt\nAK: Team A; Müller 8h\nMaterial: 10m Rohr, 3 Stk Dübel",
        );
        let sections = normalize_report(&report, None);
        assert_eq!(sections.leistungen, vec!["Graben ausgehoben", "Schacht gesetzt"]);
        assert_eq!(sections.arbeitskraefte, vec!["Team A; Müller 8h"]);
        assert_eq!(sections.material, vec!["10; m; Rohr", "3; Stk; Dübel"]);
    }

    #[test]
    fn test_service_with_material_mention_is_material_only() {
        let sections = normalize_report(&["Schacht gesetzt und 10m Rohr verlegt"], None);
        assert!(sections.leistungen.is_empty());
        assert_eq!(sections.material, vec!["10; m; Rohr verlegt"]);
    }

    #[test]
    fn test_header_fragments_never_become_content() {
        let sections = normalize_report(&["AK:", "Material:", "Leistungen:"], None);
        assert!(sections.is_empty());
    }

    #[test]
    fn test_services_are_split_on_commas() {
        let sections = normalize_report(&["Feld 2,5 abgezogen, Wand gespachtelt"], None);
        assert_eq!(sections.leistungen, vec!["Feld 2,5 abgezogen", "Wand gespachtelt"]);
    }

    #[test]
    fn test_mixed_service_item_is_split_before_rescan() {
        let sections = normalize_report(&["Leistung: Rohr 5,5 m verlegt, Dichtung getauscht"], None);
        assert_eq!(sections.leistungen, vec!["Dichtung getauscht"]);
        assert_eq!(sections.material.len(), 1);
        assert!(sections.material[0].starts_with("5,5; m;"));
    }

    #[test]
    fn test_external_items_must_occur_in_text() {
        let external = ExternalClassification {
            leistungen: vec!["Dach gedeckt".to_string()],
            arbeitskraefte: vec!["Schmidt".to_string()],
            material: vec![],
        };
        let sections = normalize_report(&["Graben ausgehoben", "Schmidt war da"], Some(&external));
        assert_eq!(sections.arbeitskraefte, vec!["Schmidt"]);
        assert_eq!(sections.leistungen, vec!["Graben ausgehoben", "Schmidt war da"]);
    }

    #[test]
    fn test_sentence_fallback_finds_workforce() {
        let sections = normalize_report(&["Schacht gesetzt. Polier", "vor Ort bis 16 Uhr"], None);
        assert_eq!(sections.arbeitskraefte, vec!["Polier vor Ort bis 16 Uhr"]);
    }

    #[test]
    fn test_buckets_are_disjoint() {
        let report = lines(
            "Rohr verlegt AK: Müller 8h\nMüller 8h\nMaterial: 10m Rohr\n10m Rohr\nLeistung: Müller 8h",
        );
        let sections = normalize_report(&report, None);
        let keys = |items: &[String]| -> HashSet<String> {
            items.iter().map(|i| normalize_key(i)).collect()
        };
        let (s, w, m) = (
            keys(&sections.leistungen),
            keys(&sections.arbeitskraefte),
            keys(&sections.material),
        );
        assert!(s.is_disjoint(&w));
        assert!(s.is_disjoint(&m));
        assert!(w.is_disjoint(&m));
        assert_eq!(sections.arbeitskraefte, vec!["Müller 8h"]);
    }

    #[test]
    fn test_round_trip_is_stable() {
        let report = lines(
            "Graben ausgehoben, Schacht gesetzt\nAK Müller 8h, Schmidt 6h\n2 Installateure je 4h\nMaterial: 3 Sack Zement\nKies nachbestellt",
        );
        let first = normalize_report(&report, None);
        let second = normalize_report(&lines(&first.to_report_text()), None);
        assert_eq!(first, second);
    }

    #[test]
    fn test_workers_and_materials() {
        let sections = normalize_report(
            &["AK: Müller 8h", "AK: müller 2h", "2 Installateure je 4h", "Mat: 5 Stk Dübel"],
            None,
        );
        let workers = sections.workers();
        let names: Vec<&str> = workers.iter().map(|w| w.name.as_str()).collect();
        assert_eq!(names, vec!["Müller", "Installateur 1", "Installateur 2"]);
        assert_eq!(workers[0].hours, 10.0);
        assert_eq!(
            sections.materials(),
            vec![MaterialEntry::new("5", "Stk", "Dübel")]
        );
    }
}
