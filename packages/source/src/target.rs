//! Protein targets from the Guide to Pharmacology web services.

use std::str::FromStr as _;

use drug_nme_approval_models::{DatabaseLink, Species};
use drug_nme_scraper::progress::{NullProgress, ProgressCallback};
use drug_nme_scraper::{DocumentFetcher, ScrapeError, fetch_json};
use reqwest::Url;
use serde::Deserialize;
use serde_json::Value;

use crate::{SourceConfig, SourceError};

/// Databases kept by [`TargetFetcher::database_ids`].
pub const KEPT_DATABASES: [&str; 3] = ["ChEMBL Target", "Ensembl Gene", "UniProtKB"];

/// Which targets to request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TargetQuery {
    /// Every target.
    All,
    /// Targets with this HGNC gene symbol (e.g. `CATSPER4`).
    Gene(String),
    /// Targets with this name (e.g. `HER3`).
    Name(String),
}

/// Parses a species filter name, case-insensitively.
///
/// # Errors
///
/// Returns [`SourceError::UnknownSpecies`] for anything but Human, Mouse,
/// Rat or All.
pub fn parse_species(name: &str) -> Result<Species, SourceError> {
    Species::from_str(name.trim()).map_err(|_| SourceError::UnknownSpecies(name.to_owned()))
}

#[derive(Debug, Deserialize)]
struct RawLink {
    accession: Option<String>,
    database: Option<String>,
    species: Option<String>,
}

/// Fetches target data from the configured targets endpoint.
#[derive(Debug, Clone)]
pub struct TargetFetcher<F: DocumentFetcher> {
    fetcher: F,
    base_url: String,
}

impl<F: DocumentFetcher> TargetFetcher<F> {
    /// Creates a fetcher for the configured targets endpoint. A trailing
    /// `/` on the URL is ignored.
    #[must_use]
    pub fn new(fetcher: F, config: &SourceConfig) -> Self {
        Self {
            fetcher,
            base_url: config.targets_url.trim_end_matches('/').to_owned(),
        }
    }

    fn query_url(&self, query: &TargetQuery) -> Result<String, SourceError> {
        let mut url = Url::parse(&self.base_url).map_err(|e| ScrapeError::InvalidUrl {
            url: self.base_url.clone(),
            message: e.to_string(),
        })?;
        match query {
            TargetQuery::All => {}
            TargetQuery::Gene(symbol) => {
                url.query_pairs_mut().append_pair("geneSymbol", symbol);
            }
            TargetQuery::Name(name) => {
                url.query_pairs_mut().append_pair("name", name);
            }
        }
        Ok(url.into())
    }

    async fn fetch_array(
        &self,
        url: &str,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<Value>, SourceError> {
        match fetch_json(&self.fetcher, url, progress).await? {
            Value::Array(items) => Ok(items),
            other => Err(SourceError::UnexpectedResponse {
                url: url.to_owned(),
                message: format!("expected a JSON array, got {}", json_kind(&other)),
            }),
        }
    }

    /// Fetches the targets matching `query`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the response is not
    /// a JSON array.
    pub async fn targets(
        &self,
        query: &TargetQuery,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<Value>, SourceError> {
        let url = self.query_url(query)?;
        progress.set_message("Downloading data from Guide to Pharmacology".to_owned());
        let targets = self.fetch_array(&url, progress).await?;
        progress.finish_and_clear();
        log::info!("Fetched {} targets", targets.len());
        Ok(targets)
    }

    /// Fetches every target family.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the request fails or the response is not
    /// a JSON array.
    pub async fn families(
        &self,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<Value>, SourceError> {
        let url = format!("{}/families", self.base_url);
        progress.set_message("Downloading target families".to_owned());
        let families = self.fetch_array(&url, progress).await?;
        progress.finish_and_clear();
        log::info!("Fetched {} target families", families.len());
        Ok(families)
    }

    /// Fetches ChEMBL, Ensembl and UniProtKB identifiers for each target in
    /// `target_ids`, keeping links for `species`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] on the first target whose links cannot be
    /// fetched.
    pub async fn database_ids(
        &self,
        target_ids: &[i64],
        species: Species,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<DatabaseLink>, SourceError> {
        progress.set_total(target_ids.len() as u64);
        progress.set_message("Obtaining target ids".to_owned());

        let mut links = Vec::new();
        for &target_id in target_ids {
            let url = format!("{}/{target_id}/databaseLinks", self.base_url);
            let items = self.fetch_array(&url, &NullProgress).await?;

            let before = links.len();
            for item in items {
                let raw: RawLink = serde_json::from_value(item)?;
                let (Some(accession), Some(database), Some(species_name)) =
                    (raw.accession, raw.database, raw.species)
                else {
                    continue;
                };
                if species.matches(&species_name) && KEPT_DATABASES.contains(&database.as_str()) {
                    links.push(DatabaseLink {
                        target_id,
                        accession,
                        database,
                        species: species_name,
                    });
                }
            }
            log::debug!("Target {target_id}: {} links kept", links.len() - before);
            progress.inc(1);
        }

        progress.finish(format!("Found {} database links", links.len()));
        Ok(links)
    }
}

const fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}

#[cfg(test)]
mod tests {
    use drug_nme_scraper::MemoryFetcher;
    use serde_json::json;

    use super::*;

    fn config() -> SourceConfig {
        SourceConfig {
            targets_url: "https://gtop.test/targets/".to_owned(),
            ..SourceConfig::default()
        }
    }

    fn links_json() -> String {
        json!([
            {"accession": "CHEMBL1824", "database": "ChEMBL Target", "url": "https://x", "species": "Human"},
            {"accession": "P04626", "database": "UniProtKB", "url": "https://x", "species": "Human"},
            {"accession": "P70424", "database": "UniProtKB", "url": "https://x", "species": "Mouse"},
            {"accession": "2064", "database": "Entrez Gene", "url": "https://x", "species": "Human"},
            {"accession": "x", "database": "UniProtKB", "url": "https://x", "species": null}
        ])
        .to_string()
    }

    #[tokio::test]
    async fn queries_by_gene_symbol_and_name() {
        let fetcher = MemoryFetcher::new()
            .with_document(
                "https://gtop.test/targets?geneSymbol=ERBB2",
                r#"[{"targetId": 2019, "name": "ErbB2"}]"#,
            )
            .with_document("https://gtop.test/targets?name=HER3", "[]");
        let targets = TargetFetcher::new(fetcher, &config());

        let by_gene = targets
            .targets(&TargetQuery::Gene("ERBB2".to_owned()), &NullProgress)
            .await
            .unwrap();
        assert_eq!(by_gene[0]["targetId"], 2019);

        let by_name = targets
            .targets(&TargetQuery::Name("HER3".to_owned()), &NullProgress)
            .await
            .unwrap();
        assert!(by_name.is_empty());
    }

    #[tokio::test]
    async fn fetches_families() {
        let fetcher = MemoryFetcher::new().with_document(
            "https://gtop.test/targets/families",
            r#"[{"familyId": 1, "name": "5-HT receptors"}]"#,
        );
        let families = TargetFetcher::new(fetcher, &config())
            .families(&NullProgress)
            .await
            .unwrap();
        assert_eq!(families.len(), 1);
    }

    #[tokio::test]
    async fn object_response_is_unexpected() {
        let fetcher =
            MemoryFetcher::new().with_document("https://gtop.test/targets", r#"{"error": "busy"}"#);
        let err = TargetFetcher::new(fetcher, &config())
            .targets(&TargetQuery::All, &NullProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::UnexpectedResponse { .. }));
    }

    #[tokio::test]
    async fn keeps_selected_species_and_databases() {
        let fetcher = MemoryFetcher::new()
            .with_document("https://gtop.test/targets/2019/databaseLinks", links_json());
        let targets = TargetFetcher::new(fetcher, &config());

        let human = targets
            .database_ids(&[2019], Species::Human, &NullProgress)
            .await
            .unwrap();
        let accessions: Vec<&str> = human.iter().map(|l| l.accession.as_str()).collect();
        assert_eq!(accessions, vec!["CHEMBL1824", "P04626"]);
        assert!(human.iter().all(|l| l.target_id == 2019));

        let all = targets
            .database_ids(&[2019], Species::All, &NullProgress)
            .await
            .unwrap();
        assert_eq!(all.len(), 3);
    }

    #[tokio::test]
    async fn missing_target_fails() {
        let targets = TargetFetcher::new(MemoryFetcher::new(), &config());
        let result = targets.database_ids(&[1], Species::Human, &NullProgress).await;
        assert!(matches!(result, Err(SourceError::Scrape(_))));
    }

    #[test]
    fn parses_species_names() {
        assert_eq!(parse_species("rat").unwrap(), Species::Rat);
        assert_eq!(parse_species("ALL").unwrap(), Species::All);
        assert!(matches!(
            parse_species("zebrafish"),
            Err(SourceError::UnknownSpecies(_))
        ));
    }
}
