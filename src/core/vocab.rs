// Domain vocabulary: header aliases, role words, unit aliases and the shared
// regexes for hours, clock times and "on site" phrases.

use crate::domain::model::SectionKind;
use regex::Regex;
use std::sync::LazyLock;

pub struct HeaderAlias {
    pub token: &'static str,
    pub kind: SectionKind,
    /// Recognized without a trailing colon, both mid-line and as a prefix.
    pub bare: bool,
}

const fn alias(token: &'static str, kind: SectionKind, bare: bool) -> HeaderAlias {
    HeaderAlias { token, kind, bare }
}

use SectionKind::{Material, Services, Workforce};

pub const HEADER_ALIASES: &[HeaderAlias] = &[
    alias("ak", Workforce, true),
    alias("arbeitskräfte", Workforce, true),
    alias("arbeitskraefte", Workforce, true),
    alias("arbeitskräften", Workforce, false),
    alias("arbeitskraft", Workforce, false),
    alias("mitarbeiter", Workforce, false),
    alias("mitarbeitern", Workforce, false),
    alias("personal", Workforce, false),
    alias("personaleinsatz", Workforce, false),
    alias("team", Workforce, false),
    alias("teams", Workforce, false),
    alias("mannschaft", Workforce, false),
    alias("besetzung", Workforce, false),
    alias("kolonne", Workforce, false),
    alias("leute", Workforce, false),
    alias("lst", Services, true),
    alias("leistung", Services, false),
    alias("leistungen", Services, false),
    alias("ergebnis", Services, false),
    alias("ergebnisse", Services, false),
    alias("tätigkeit", Services, false),
    alias("tätigkeiten", Services, false),
    alias("taetigkeiten", Services, false),
    alias("arbeiten", Services, false),
    alias("ausgeführte arbeiten", Services, false),
    alias("ausgefuehrte arbeiten", Services, false),
    alias("durchgeführte arbeiten", Services, false),
    alias("erledigt", Services, false),
    alias("erledigte arbeiten", Services, false),
    alias("mat", Material, true),
    alias("material", Material, false),
    alias("materialien", Material, false),
    alias("materials", Material, false),
    alias("materialeinsatz", Material, false),
    alias("materialverbrauch", Material, false),
    alias("lieferung", Material, false),
    alias("lieferungen", Material, false),
    alias("anlieferung", Material, false),
];

pub fn lookup_header(token: &str) -> Option<&'static HeaderAlias> {
    HEADER_ALIASES.iter().find(|a| a.token == token)
}

/// Canonical label used for all interchangeable crew words.
pub const GENERIC_ROLE: &str = "Mitarbeiter";

/// Inflection endings accepted after a role stem; the word must end there.
const AGENT_ENDINGS: &[&str] = &["", "n", "in", "innen", "s"];
const TRADE_ENDINGS: &[&str] = &["", "e", "en", "in", "innen", "s"];

/// Stem, accepted endings and label. First match wins.
const ROLE_LABELS: &[(&str, &[&str], &str)] = &[
    ("vorarbeiter", AGENT_ENDINGS, "Vorarbeiter"),
    ("bauleiter", AGENT_ENDINGS, "Bauleiter"),
    ("mitarbeiter", AGENT_ENDINGS, GENERIC_ROLE),
    ("arbeitskraft", &[""], GENERIC_ROLE),
    ("arbeitskräfte", &["", "n"], GENERIC_ROLE),
    ("arbeitskraefte", &["", "n"], GENERIC_ROLE),
    ("arbeiter", AGENT_ENDINGS, GENERIC_ROLE),
    ("installateur", TRADE_ENDINGS, "Installateur"),
    ("monteur", TRADE_ENDINGS, "Monteur"),
    ("elektriker", AGENT_ENDINGS, "Elektriker"),
    ("helfer", AGENT_ENDINGS, GENERIC_ROLE),
    ("polier", &["", "e", "in", "innen", "s"], "Polier"),
    ("gesell", &["e", "en", "in", "innen"], "Geselle"),
    ("lehrling", &["", "e", "en", "s"], "Lehrling"),
    ("azubi", &["", "s"], "Azubi"),
    ("techniker", AGENT_ENDINGS, "Techniker"),
    ("maurer", AGENT_ENDINGS, "Maurer"),
    ("schlosser", AGENT_ENDINGS, "Schlosser"),
    ("meister", &["", "s", "in", "innen"], "Meister"),
    ("fahrer", AGENT_ENDINGS, "Fahrer"),
    ("männer", &["", "n"], GENERIC_ROLE),
    ("maenner", &["", "n"], GENERIC_ROLE),
    ("mann", &["", "s"], GENERIC_ROLE),
    ("personal", &[""], GENERIC_ROLE),
    ("kolonne", &["", "n"], GENERIC_ROLE),
    ("team", &["", "s"], GENERIC_ROLE),
    ("leute", &["", "n"], GENERIC_ROLE),
];

/// Canonical role label for a single word ("Installateure" -> "Installateur").
/// Words that merely start with a stem ("poliert", "Gesellschaft") do not count.
pub fn role_label(word: &str) -> Option<&'static str> {
    let lowered = word.to_lowercase();
    ROLE_LABELS
        .iter()
        .find(|(stem, endings, _)| {
            lowered
                .strip_prefix(stem)
                .is_some_and(|ending| endings.contains(&ending))
        })
        .map(|(_, _, label)| *label)
}

pub fn is_role_word(word: &str) -> bool {
    role_label(word).is_some()
}

pub fn words(text: &str) -> impl Iterator<Item = &str> {
    text.split(|c: char| !c.is_alphanumeric())
        .filter(|w| !w.is_empty())
}

pub fn contains_role_word(text: &str) -> bool {
    words(text).any(is_role_word)
}

/// Capitalized words that are never person names in a workforce line.
const NON_NAME_WORDS: &[&str] = &[
    "je", "jeweils", "und", "vor", "ort", "auf", "der", "die", "das", "baustelle",
    "arbeitszeit", "insgesamt", "gesamt", "summe", "zusammen", "ca", "circa", "heute",
    "gestern", "morgen", "std", "stunden", "stunde", "uhr", "pause", "von", "bis", "pro",
    "person", "kopf", "ak", "mat", "lst",
];

pub fn is_name_candidate(word: &str) -> bool {
    let lowered = word.to_lowercase();
    word.chars().count() >= 2
        && word.chars().next().is_some_and(char::is_uppercase)
        && !NON_NAME_WORDS.contains(&lowered.as_str())
        && lookup_header(&lowered).is_none()
        && !is_role_word(word)
}

/// Unit aliases keyed by lower-cased token without a trailing dot.
const UNIT_ALIASES: &[(&str, &str)] = &[
    ("m", "m"),
    ("meter", "m"),
    ("metern", "m"),
    ("lfm", "m"),
    ("lfdm", "m"),
    ("lm", "m"),
    ("cm", "cm"),
    ("mm", "mm"),
    ("km", "km"),
    ("qm", "m²"),
    ("m2", "m²"),
    ("m²", "m²"),
    ("quadratmeter", "m²"),
    ("cbm", "m³"),
    ("m3", "m³"),
    ("m³", "m³"),
    ("kubikmeter", "m³"),
    ("g", "g"),
    ("kg", "kg"),
    ("kilo", "kg"),
    ("kilogramm", "kg"),
    ("t", "t"),
    ("to", "t"),
    ("tonne", "t"),
    ("tonnen", "t"),
    ("l", "l"),
    ("ltr", "l"),
    ("liter", "l"),
    ("stk", "Stk"),
    ("stck", "Stk"),
    ("st", "Stk"),
    ("stück", "Stk"),
    ("stueck", "Stk"),
    ("stuck", "Stk"),
    ("pcs", "Stk"),
    ("sack", "Sack"),
    ("säcke", "Sack"),
    ("saecke", "Sack"),
    ("sck", "Sack"),
    ("rolle", "Rolle"),
    ("rollen", "Rolle"),
    ("pal", "Pal"),
    ("palette", "Pal"),
    ("paletten", "Pal"),
    ("pkt", "Pkt"),
    ("paket", "Pkt"),
    ("pakete", "Pkt"),
    ("eimer", "Eimer"),
    ("kartusche", "Kartusche"),
    ("kartuschen", "Kartusche"),
    ("karton", "Karton"),
    ("kartons", "Karton"),
    ("satz", "Satz"),
    ("bund", "Bund"),
];

const HOUR_UNITS: &[&str] = &["h", "hrs", "std", "stunde", "stunden"];

fn unit_key(token: &str) -> String {
    token.trim().trim_end_matches('.').to_lowercase()
}

pub fn canonical_unit(token: &str) -> Option<&'static str> {
    let key = unit_key(token);
    UNIT_ALIASES
        .iter()
        .find(|(alias, _)| *alias == key)
        .map(|(_, unit)| *unit)
}

pub fn is_hour_unit(token: &str) -> bool {
    HOUR_UNITS.contains(&unit_key(token).as_str())
}

/// Number followed by an hour unit: "8h", "4,5 Std.", "6 Stunden".
pub static HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)(\d+(?:[.,]\d+)?)\s*(?:h|hrs|std|stunden|stunde)\b\.?").unwrap()
});

/// "je 4h" / "je 4" / "jeweils 4 Std".
pub static PER_HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:je|jeweils|à)\s*(\d+(?:[.,]\d+)?)\s*(?:h|hrs|std|stunden|stunde)?\b\.?")
        .unwrap()
});

/// Explicit per-person markers.
pub static PER_PERSON_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:jeweils|pro\s+(?:person|mann|kopf|mitarbeiter)|per\s+person)\b").unwrap()
});

pub static CLOCK_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b\d{1,2}:\d{2}\b|\b\d{1,2}(?:[.:]\d{2})?\s*uhr\b").unwrap()
});

pub static ON_SITE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\bvor\s+ort\b|\bauf\s+(?:der\s+)?baustelle\b").unwrap()
});

pub static WORKING_TIME_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)arbeitszeit").unwrap());

pub static MATERIAL_KEYWORD_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)\b(?:material\w*|\w*lieferung\w*|geliefert|angeliefert|mat)\b").unwrap()
});

/// `<count> <up to three words> je <hours>[h]`, applied after number-word replacement.
pub static COUNT_ROLE_RATE_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d+)\s+(\p{L}+(?:\s+\p{L}+){0,2})\s+(?:je|jeweils|à|a)\s*(\d+(?:[.,]\d+)?)\s*(?:h|hrs|std|stunden|stunde)?\b",
    )
    .unwrap()
});

/// `<count> <up to three words> <hours>h` without a rate marker.
pub static COUNT_ROLE_HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"(?i)\b(\d+)\s+(\p{L}+(?:\s+\p{L}+){0,2})\s+(\d+(?:[.,]\d+)?)\s*(?:h|hrs|std|stunden|stunde)\b",
    )
    .unwrap()
});

/// A capitalized word directly followed by an hours value: "Müller 8h", "Kai: 6 Std".
/// Case-sensitive on purpose; only the unit is case-insensitive.
pub static NAME_HOURS_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(
        r"\b(\p{Lu}[\p{L}'’-]*)\s*[:=]?\s*(\d+(?:[.,]\d+)?)\s*(?i:h|hrs|std|stunden|stunde)\b\.?",
    )
    .unwrap()
});

pub static NAME_TOKEN_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"\b\p{Lu}[\p{L}'’-]*").unwrap());
