use serde::{Deserialize, Serialize};
use std::fmt;

/// One of the three report categories a fragment can be filed under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SectionKind {
    Services,
    Workforce,
    Material,
}

impl SectionKind {
    /// Header used when a section is rendered back into report text.
    pub fn header(&self) -> &'static str {
        match self {
            SectionKind::Services => "Leistungen:",
            SectionKind::Workforce => "AK:",
            SectionKind::Material => "Material:",
        }
    }
}

impl fmt::Display for SectionKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            SectionKind::Services => "services",
            SectionKind::Workforce => "workforce",
            SectionKind::Material => "material",
        };
        f.write_str(name)
    }
}

/// A fragment after routing, tagged with the section it was filed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassifiedFragment {
    pub kind: SectionKind,
    pub text: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WorkerEntry {
    pub group: String,
    pub name: String,
    pub hours: Option<f64>,
    /// Set for synthesized crew members ("Monteur 1", "Monteur 2"); never merged.
    pub no_aggregate: bool,
}

impl WorkerEntry {
    pub fn named(group: &str, name: &str, hours: Option<f64>) -> Self {
        Self {
            group: group.to_string(),
            name: name.to_string(),
            hours,
            no_aggregate: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AggregatedWorker {
    pub name: String,
    pub group: String,
    pub hours: f64,
    pub has_hours: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MaterialEntry {
    pub qty: String,
    pub unit: String,
    pub desc: String,
}

impl MaterialEntry {
    pub fn new(qty: &str, unit: &str, desc: &str) -> Self {
        Self {
            qty: qty.to_string(),
            unit: unit.to_string(),
            desc: desc.to_string(),
        }
    }

    /// Text-only entry used when nothing structured could be read.
    pub fn unstructured(desc: &str) -> Self {
        Self::new("", "", desc)
    }

    pub fn is_structured(&self) -> bool {
        !self.qty.is_empty() || !self.unit.is_empty()
    }

    /// `"qty; unit; desc"`, or just the description for unstructured entries.
    pub fn display(&self) -> String {
        if self.is_structured() {
            format!("{}; {}; {}", self.qty, self.unit, self.desc)
        } else {
            self.desc.clone()
        }
    }
}

/// Final output of the normalizer: three ordered, deduplicated lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizedSections {
    pub leistungen: Vec<String>,
    pub arbeitskraefte: Vec<String>,
    pub material: Vec<String>,
}

impl NormalizedSections {
    pub fn is_empty(&self) -> bool {
        self.leistungen.is_empty() && self.arbeitskraefte.is_empty() && self.material.is_empty()
    }

    pub fn items(&self, kind: SectionKind) -> &[String] {
        match kind {
            SectionKind::Services => &self.leistungen,
            SectionKind::Workforce => &self.arbeitskraefte,
            SectionKind::Material => &self.material,
        }
    }
}

/// Classification of the same line buffer produced by an outside collaborator
/// (usually a language model). Missing or malformed fields are empty lists.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExternalClassification {
    #[serde(default)]
    pub leistungen: Vec<String>,
    #[serde(default)]
    pub arbeitskraefte: Vec<String>,
    #[serde(default)]
    pub material: Vec<String>,
}

impl ExternalClassification {
    pub fn is_empty(&self) -> bool {
        self.leistungen.is_empty() && self.arbeitskraefte.is_empty() && self.material.is_empty()
    }

    pub fn items(&self, kind: SectionKind) -> &[String] {
        match kind {
            SectionKind::Services => &self.leistungen,
            SectionKind::Workforce => &self.arbeitskraefte,
            SectionKind::Material => &self.material,
        }
    }

    /// Lenient parse of a classifier answer.
    ///
    /// Accepts text around the JSON object (code fences, prose), English key
    /// aliases and single strings in place of lists. Non-string list members are
    /// skipped. Returns `None` when no JSON object can be read.
    pub fn from_json_str(raw: &str) -> Option<Self> {
        let start = raw.find('{')?;
        let end = raw.rfind('}')?;
        if end < start {
            return None;
        }
        let value: serde_json::Value = serde_json::from_str(&raw[start..=end]).ok()?;
        let object = value.as_object()?;

        let field = |keys: &[&str]| -> Vec<String> {
            let Some(value) = keys.iter().find_map(|k| object.get(*k)) else {
                return Vec::new();
            };
            match value {
                serde_json::Value::String(s) => vec![s.clone()],
                serde_json::Value::Array(items) => items
                    .iter()
                    .filter_map(|item| item.as_str())
                    .map(str::trim)
                    .filter(|s| !s.is_empty())
                    .map(str::to_string)
                    .collect(),
                _ => Vec::new(),
            }
        };

        Some(Self {
            leistungen: field(&["leistungen", "services", "work"]),
            arbeitskraefte: field(&["arbeitskraefte", "arbeitskräfte", "workforce", "workers"]),
            material: field(&["material", "materials", "materialien"]),
        })
    }
}

/// Everything the transform phase hands to the load phase.
#[derive(Debug, Clone, Serialize)]
pub struct ReportResult {
    pub sections: NormalizedSections,
    pub workers: Vec<AggregatedWorker>,
    pub materials: Vec<MaterialEntry>,
    pub used_external: bool,
    pub line_count: usize,
}
