// Material detection and extraction.

use crate::core::text::strip_bullets;
use crate::core::vocab::{canonical_unit, is_hour_unit, MATERIAL_KEYWORD_RE};
use crate::core::workforce::is_workforce_like;
use crate::domain::model::MaterialEntry;
use regex::Regex;
use std::sync::LazyLock;

/// `<qty> <unit> <description up to , or ;>`
static QUANTITY_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"\b(\d+(?:[.,]\d+)?)\s*(\p{L}[\p{L}\d²³]*\.?)\s*([^,;\n]*)").unwrap()
});

/// `2 x Schachtabdeckung`, `3× Deckel`, `4*Kappe`
static TIMES_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(\d+)\s*(?:×|\*|x\b)\s*([^,;\n]+)").unwrap()
});

type Reader = fn(&str) -> Vec<MaterialEntry>;

/// Structured readers in priority order; the whole-text fallback is not one of them.
const READERS: &[(&str, Reader)] = &[
    ("strict_triple", strict_triple),
    ("quantity_unit", quantity_unit),
    ("times_count", times_count),
];

fn clean_description(raw: &str) -> String {
    strip_bullets(raw)
        .trim_end_matches(|c: char| c.is_whitespace() || matches!(c, '.' | ':' | '-'))
        .to_string()
}

/// `qty; unit; desc`, exactly three non-empty parts.
fn strict_triple(text: &str) -> Vec<MaterialEntry> {
    let parts: Vec<&str> = text.split(';').map(str::trim).collect();
    match parts.as_slice() {
        [qty, unit, desc] if !qty.is_empty() && !unit.is_empty() && !desc.is_empty() => {
            let unit = canonical_unit(unit).unwrap_or(*unit);
            vec![MaterialEntry::new(qty, unit, &clean_description(desc))]
        }
        _ => Vec::new(),
    }
}

fn quantity_unit(text: &str) -> Vec<MaterialEntry> {
    let mut entries = Vec::new();
    let mut position = 0;

    while let Some(caps) = QUANTITY_RE.captures_at(text, position) {
        let (Some(whole), Some(qty), Some(unit)) = (caps.get(0), caps.get(1), caps.get(2)) else {
            break;
        };
        let desc = clean_description(caps.get(3).map_or("", |m| m.as_str()));

        match canonical_unit(unit.as_str()) {
            Some(canonical) if !is_hour_unit(unit.as_str()) && !desc.is_empty() => {
                entries.push(MaterialEntry::new(qty.as_str(), canonical, &desc));
                position = whole.end().max(position + 1);
            }
            // retry right after the number so a later quantity in the same item is found
            _ => position = qty.end(),
        }
    }

    entries
}

fn times_count(text: &str) -> Vec<MaterialEntry> {
    TIMES_RE
        .captures_iter(text)
        .filter_map(|caps| {
            let desc = clean_description(&caps[2]);
            (!desc.is_empty()).then(|| MaterialEntry::new(&caps[1], "Stk", &desc))
        })
        .collect()
}

/// Entries from the first structured reader that finds anything.
pub fn extract_structured_materials(fragment: &str) -> Vec<MaterialEntry> {
    let text = strip_bullets(fragment);
    for (name, reader) in READERS {
        let entries = reader(text);
        if !entries.is_empty() {
            tracing::trace!(reader = *name, count = entries.len(), "material fragment parsed");
            return entries;
        }
    }
    Vec::new()
}

/// Turns one material fragment into entries; unreadable text is kept as a
/// description-only entry.
pub fn extract_materials(fragment: &str) -> Vec<MaterialEntry> {
    let entries = extract_structured_materials(fragment);
    if !entries.is_empty() {
        return entries;
    }
    let text = strip_bullets(fragment);
    if text.is_empty() {
        return Vec::new();
    }
    vec![MaterialEntry::unstructured(text)]
}

pub fn is_material_like(text: &str) -> bool {
    (MATERIAL_KEYWORD_RE.is_match(text) && !is_workforce_like(text))
        || !extract_structured_materials(text).is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantity_unit_pairs() {
        assert_eq!(
            extract_materials("10m Rohr, 3 Stk Dübel"),
            vec![
                MaterialEntry::new("10", "m", "Rohr"),
                MaterialEntry::new("3", "Stk", "Dübel"),
            ]
        );
    }

    #[test]
    fn test_unit_aliases_and_decimal_comma() {
        assert_eq!(
            extract_materials("2,5 cbm Beton; 12 qm Vlies"),
            vec![
                MaterialEntry::new("2,5", "m³", "Beton"),
                MaterialEntry::new("12", "m²", "Vlies"),
            ]
        );
    }

    #[test]
    fn test_strict_triple_wins() {
        assert_eq!(
            extract_materials("10; lfm; KG-Rohr DN 150"),
            vec![MaterialEntry::new("10", "m", "KG-Rohr DN 150")]
        );
    }

    #[test]
    fn test_hour_units_are_not_material() {
        assert!(extract_structured_materials("Müller 8 h gearbeitet").is_empty());
        assert!(extract_structured_materials("2 Installateure je 4h").is_empty());
    }

    #[test]
    fn test_times_fallback() {
        assert_eq!(
            extract_materials("2 x Schachtabdeckung"),
            vec![MaterialEntry::new("2", "Stk", "Schachtabdeckung")]
        );
    }

    #[test]
    fn test_skips_unknown_unit_and_keeps_scanning() {
        assert_eq!(
            extract_materials("DN 150 Rohr 6 m"),
            vec![MaterialEntry::unstructured("DN 150 Rohr 6 m")]
        );
        assert_eq!(
            extract_materials("Anschluss 3 Rohre 6 m Kabel"),
            vec![MaterialEntry::new("6", "m", "Kabel")]
        );
    }

    #[test]
    fn test_unreadable_text_is_kept() {
        assert_eq!(
            extract_materials("Kies nachbestellt"),
            vec![MaterialEntry::unstructured("Kies nachbestellt")]
        );
        assert!(extract_materials("  ").is_empty());
    }

    #[test]
    fn test_material_predicate() {
        assert!(is_material_like("Material geliefert"));
        assert!(is_material_like("Schacht gesetzt, 10m Rohr verlegt"));
        assert!(!is_material_like("Schacht gesetzt"));
        assert!(!is_material_like("Müller 8h Material sortiert"));
    }
}
