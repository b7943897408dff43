// Routes split fragments into sections. The router state is the fold
// accumulator: the section the previous fragment ended up in.

use crate::core::headers::{detect_section_header, split_bare_prefix, split_header_content};
use crate::core::material::is_material_like;
use crate::core::splitter::split_report_line;
use crate::core::text::strip_bullets;
use crate::core::workforce::is_workforce_like;
use crate::domain::model::{ClassifiedFragment, SectionKind};

/// Outcome of one rule: the next state and the text to emit, if any.
struct Route {
    state: SectionKind,
    emit: Option<String>,
}

impl Route {
    fn new(state: SectionKind, content: &str) -> Self {
        let content = strip_bullets(content);
        Self {
            state,
            emit: (!content.is_empty()).then(|| content.to_string()),
        }
    }
}

type Rule = fn(&str, Option<SectionKind>) -> Option<Route>;

const RULES: &[(&str, Rule)] = &[
    ("explicit_marker", explicit_marker),
    ("header_token", header_token),
    ("workforce_content", workforce_content),
    ("material_content", material_content),
    ("sticky", sticky),
];

fn explicit_marker(fragment: &str, _: Option<SectionKind>) -> Option<Route> {
    split_header_content(fragment).map(|(kind, rest)| Route::new(kind, &rest))
}

fn header_token(fragment: &str, _: Option<SectionKind>) -> Option<Route> {
    if let Some(kind) = detect_section_header(fragment) {
        return Some(Route::new(kind, ""));
    }
    split_bare_prefix(fragment).map(|(kind, rest)| Route::new(kind, &rest))
}

fn workforce_content(fragment: &str, _: Option<SectionKind>) -> Option<Route> {
    is_workforce_like(fragment).then(|| Route::new(SectionKind::Workforce, fragment))
}

fn material_content(fragment: &str, _: Option<SectionKind>) -> Option<Route> {
    is_material_like(fragment).then(|| Route::new(SectionKind::Material, fragment))
}

fn sticky(fragment: &str, state: Option<SectionKind>) -> Option<Route> {
    Some(Route::new(state.unwrap_or(SectionKind::Services), fragment))
}

fn route(fragment: &str, state: Option<SectionKind>) -> Route {
    for (name, rule) in RULES {
        if let Some(route) = rule(fragment, state) {
            tracing::trace!(rule = *name, section = %route.state, fragment, "fragment routed");
            return route;
        }
    }
    // the sticky rule always answers
    Route::new(state.unwrap_or(SectionKind::Services), fragment)
}

/// Assigns each fragment to a section in one pass.
///
/// Header fragments only switch the state; their content, if any, is emitted
/// under the new section. Header-only fragments emit nothing.
pub fn classify_fragments<I, S>(fragments: I) -> Vec<ClassifiedFragment>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let (_, classified) = fragments.into_iter().fold(
        (None, Vec::new()),
        |(state, mut out): (Option<SectionKind>, Vec<ClassifiedFragment>), fragment| {
            let Route { state: next, emit } = route(fragment.as_ref(), state);
            if let Some(text) = emit {
                out.push(ClassifiedFragment { kind: next, text });
            }
            (Some(next), out)
        },
    );
    classified
}

/// Splits every raw line and routes the resulting fragments.
pub fn classify_lines<S: AsRef<str>>(lines: &[S]) -> Vec<ClassifiedFragment> {
    classify_fragments(lines.iter().flat_map(|line| split_report_line(line.as_ref())))
}

#[cfg(test)]
mod tests {
    use super::*;
    use SectionKind::{Material, Services, Workforce};

    fn fragment(kind: SectionKind, text: &str) -> ClassifiedFragment {
        ClassifiedFragment {
            kind,
            text: text.to_string(),
        }
    }

    #[test]
    fn test_explicit_marker_routes_content() {
        assert_eq!(
            classify_lines(&["AK: Team A; Müller 8h"]),
            vec![fragment(Workforce, "Team A; Müller 8h")]
        );
    }

    #[test]
    fn test_headers_are_sticky() {
        let lines = ["Material:", "- Kies", "- Sand", "Leistungen:", "Graben ausgehoben"];
        assert_eq!(
            classify_lines(&lines),
            vec![
                fragment(Material, "Kies"),
                fragment(Material, "Sand"),
                fragment(Services, "Graben ausgehoben"),
            ]
        );
    }

    #[test]
    fn test_unmarked_text_defaults_to_services() {
        assert_eq!(
            classify_lines(&["Schacht gesetzt"]),
            vec![fragment(Services, "Schacht gesetzt")]
        );
    }

    #[test]
    fn test_content_heuristics_override_state() {
        let lines = ["Leistung: Graben ausgehoben", "Müller 8h", "10m Rohr geliefert"];
        assert_eq!(
            classify_lines(&lines),
            vec![
                fragment(Services, "Graben ausgehoben"),
                fragment(Workforce, "Müller 8h"),
                fragment(Material, "10m Rohr geliefert"),
            ]
        );
    }

    #[test]
    fn test_inline_markers_and_bare_prefix() {
        assert_eq!(
            classify_lines(&["Rohr verlegt AK Müller 8h Mat: 3 Sack Zement"]),
            vec![
                fragment(Services, "Rohr verlegt"),
                fragment(Workforce, "Müller 8h"),
                fragment(Material, "3 Sack Zement"),
            ]
        );
    }

    #[test]
    fn test_service_sentence_with_material_goes_to_material() {
        assert_eq!(
            classify_lines(&["Schacht gesetzt und 10m Rohr verlegt"]),
            vec![fragment(Material, "Schacht gesetzt und 10m Rohr verlegt")]
        );
    }
}
