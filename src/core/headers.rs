// Section header detection: "AK:", "Material", "Ausgeführte Arbeiten:" and friends.

use crate::core::text::{collapse_whitespace, strip_bullets};
use crate::core::vocab::lookup_header;
use crate::domain::model::SectionKind;

fn header_token(text: &str) -> String {
    let trimmed = strip_bullets(text)
        .trim_end_matches(|c: char| c.is_whitespace() || c.is_ascii_punctuation())
        .to_lowercase();
    collapse_whitespace(&trimmed)
}

/// Returns the section a fragment names when the whole fragment is a header token.
pub fn detect_section_header(fragment: &str) -> Option<SectionKind> {
    let token = header_token(fragment);
    if token.is_empty() {
        return None;
    }
    lookup_header(&token).map(|alias| alias.kind)
}

/// Splits `<marker>: <rest>` into the marker's section and the (possibly empty) rest.
pub fn split_header_content(fragment: &str) -> Option<(SectionKind, String)> {
    let body = strip_bullets(fragment);
    let colon = body.find(':')?;
    let kind = detect_section_header(&body[..colon])?;
    let rest = strip_bullets(&body[colon + 1..]).to_string();
    Some((kind, rest))
}

/// Splits a bare marker prefix without colon ("AK Müller 8h").
pub fn split_bare_prefix(fragment: &str) -> Option<(SectionKind, String)> {
    let body = strip_bullets(fragment);
    let (head, rest) = match body.split_once(char::is_whitespace) {
        Some((head, rest)) => (head, rest),
        None => (body, ""),
    };
    let alias = lookup_header(&header_token(head))?;
    if !alias.bare {
        return None;
    }
    Some((alias.kind, strip_bullets(rest).to_string()))
}

/// True when the fragment is nothing but a header token (with or without colon).
pub fn is_header_only(fragment: &str) -> bool {
    detect_section_header(fragment).is_some()
        || split_header_content(fragment).is_some_and(|(_, rest)| rest.is_empty())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_detect_section_header_variants() {
        assert_eq!(detect_section_header("AK:"), Some(SectionKind::Workforce));
        assert_eq!(detect_section_header("- Mitarbeiter"), Some(SectionKind::Workforce));
        assert_eq!(detect_section_header("LEISTUNGEN:"), Some(SectionKind::Services));
        assert_eq!(
            detect_section_header("Ausgeführte  Arbeiten:"),
            Some(SectionKind::Services)
        );
        assert_eq!(detect_section_header("Mat."), Some(SectionKind::Material));
        assert_eq!(detect_section_header("Materialien"), Some(SectionKind::Material));
        assert_eq!(detect_section_header("Rohr verlegt"), None);
        assert_eq!(detect_section_header(""), None);
    }

    #[test]
    fn test_split_header_content() {
        assert_eq!(
            split_header_content("AK: Team A; Müller 8h"),
            Some((SectionKind::Workforce, "Team A; Müller 8h".to_string()))
        );
        assert_eq!(
            split_header_content("Material:"),
            Some((SectionKind::Material, String::new()))
        );
        assert_eq!(
            split_header_content("Leistung: - Schacht gesetzt"),
            Some((SectionKind::Services, "Schacht gesetzt".to_string()))
        );
        assert_eq!(split_header_content("Arbeitszeit: 7-16 Uhr"), None);
        assert_eq!(split_header_content("Müller 8h"), None);
    }

    #[test]
    fn test_split_bare_prefix_only_for_bare_aliases() {
        assert_eq!(
            split_bare_prefix("AK Müller 8h"),
            Some((SectionKind::Workforce, "Müller 8h".to_string()))
        );
        assert_eq!(split_bare_prefix("Team A Müller 8h"), None);
        assert_eq!(split_bare_prefix("Material 10m Rohr"), None);
    }

    #[test]
    fn test_is_header_only() {
        assert!(is_header_only("Material:"));
        assert!(is_header_only("Leistungen"));
        assert!(!is_header_only("Material: 10m Rohr"));
    }
}
