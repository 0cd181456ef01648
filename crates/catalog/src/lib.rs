use serde::{Deserialize, Serialize};

/// One selectable statistics dataset (a concept/code pair of a summary).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetEntry {
    /// `<concept>.<code>`, unique within a summary.
    pub id: String,
    /// Human readable code description.
    pub label: String,
    pub concept: String,
    /// Statistics source location, resolved against the summary location.
    pub url: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct SummaryCode {
    k: String,
    v: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct SummaryConcept {
    name: String,
    #[serde(default)]
    codes: Vec<SummaryCode>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
struct Summary {
    concepts: Vec<SummaryConcept>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CatalogError {
    NotFound(String),
    Corrupt(String),
}

impl std::fmt::Display for CatalogError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            CatalogError::NotFound(id) => write!(f, "dataset not found: {id}"),
            CatalogError::Corrupt(msg) => write!(f, "dataset summary corrupt: {msg}"),
        }
    }
}

impl std::error::Error for CatalogError {}

/// Ordered list of the datasets a summary file offers.
///
/// Order follows the summary (concepts, then codes) so the first entry is
/// the default selection.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct DatasetCatalog {
    entries: Vec<DatasetEntry>,
}

impl DatasetCatalog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_summary_json(summary_url: &str, payload: &str) -> Result<Self, CatalogError> {
        let summary: Summary =
            serde_json::from_str(payload).map_err(|e| CatalogError::Corrupt(e.to_string()))?;
        let base = base_url(summary_url);

        let mut entries = Vec::new();
        for concept in summary.concepts {
            for code in concept.codes {
                let file = format!("{}.{}.json", concept.name, code.k);
                let url = match base {
                    Some(base) => format!("{base}/{file}"),
                    None => file,
                };
                entries.push(DatasetEntry {
                    id: format!("{}.{}", concept.name, code.k),
                    label: code.v,
                    concept: concept.name.clone(),
                    url,
                });
            }
        }
        Ok(Self { entries })
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn entries(&self) -> &[DatasetEntry] {
        &self.entries
    }

    pub fn first(&self) -> Option<&DatasetEntry> {
        self.entries.first()
    }

    pub fn get(&self, id: &str) -> Result<&DatasetEntry, CatalogError> {
        self.entries
            .iter()
            .find(|e| e.id == id)
            .ok_or_else(|| CatalogError::NotFound(id.to_string()))
    }
}

/// Directory part of a summary location, without the trailing slash.
fn base_url(summary_url: &str) -> Option<&str> {
    summary_url.rfind('/').map(|idx| &summary_url[..idx])
}

#[cfg(test)]
mod tests {
    use super::{CatalogError, DatasetCatalog, DatasetEntry};
    use pretty_assertions::assert_eq;

    const SUMMARY: &str = r#"{
        "concepts": [
            { "name": "MEASURE", "codes": [
                { "k": "ERP", "v": "Estimated resident population (persons)" },
                { "k": "MEDAGE", "v": "Median age (years)" }
            ] },
            { "name": "EMPTY" }
        ]
    }"#;

    #[test]
    fn expands_concepts_into_dataset_urls() {
        let catalog =
            DatasetCatalog::from_summary_json("data/stats/ABS_NRP9_ASGS/summary.json", SUMMARY)
                .expect("parse");
        assert_eq!(catalog.len(), 2);
        assert_eq!(
            catalog.first(),
            Some(&DatasetEntry {
                id: "MEASURE.ERP".to_string(),
                label: "Estimated resident population (persons)".to_string(),
                concept: "MEASURE".to_string(),
                url: "data/stats/ABS_NRP9_ASGS/MEASURE.ERP.json".to_string(),
            })
        );
        assert_eq!(
            catalog.get("MEASURE.MEDAGE").map(|e| e.url.as_str()),
            Ok("data/stats/ABS_NRP9_ASGS/MEASURE.MEDAGE.json")
        );
    }

    #[test]
    fn bare_summary_name_resolves_next_to_it() {
        let catalog = DatasetCatalog::from_summary_json("summary.json", SUMMARY).expect("parse");
        assert_eq!(catalog.entries()[1].url, "MEASURE.MEDAGE.json");
    }

    #[test]
    fn errors_are_reported() {
        let catalog = DatasetCatalog::from_summary_json("s.json", SUMMARY).expect("parse");
        assert_eq!(
            catalog.get("nope"),
            Err(CatalogError::NotFound("nope".to_string()))
        );
        assert!(matches!(
            DatasetCatalog::from_summary_json("s.json", "[]"),
            Err(CatalogError::Corrupt(_))
        ));
        assert!(DatasetCatalog::new().is_empty());
    }
}
