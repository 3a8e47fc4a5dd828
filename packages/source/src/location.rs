//! Where a bulk data file lives: a URL or a path on disk.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use drug_nme_scraper::DocumentFetcher;
use drug_nme_scraper::progress::ProgressCallback;
use reqwest::Url;

use crate::SourceError;

/// A remote or local data file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum DataLocation {
    /// Downloaded over HTTP(S).
    Url(String),
    /// Read from disk.
    File(PathBuf),
}

impl DataLocation {
    /// Reads the whole file.
    ///
    /// Downloads report bytes through `progress`.
    ///
    /// # Errors
    ///
    /// Returns [`SourceError`] if the download or file read fails.
    pub async fn read(
        &self,
        fetcher: &impl DocumentFetcher,
        progress: &dyn ProgressCallback,
    ) -> Result<Vec<u8>, SourceError> {
        match self {
            Self::Url(url) => {
                log::info!("Downloading {url}");
                let bytes = fetcher.fetch(url, progress).await?;
                progress.finish_and_clear();
                Ok(bytes)
            }
            Self::File(path) => {
                log::info!("Reading {}", path.display());
                Ok(std::fs::read(path)?)
            }
        }
    }

    /// Whether this is a remote location.
    #[must_use]
    pub const fn is_url(&self) -> bool {
        matches!(self, Self::Url(_))
    }
}

impl FromStr for DataLocation {
    type Err = std::convert::Infallible;

    /// Existing files win; otherwise `http`, `https` and `ftp` URLs with a
    /// host are remote and anything else is treated as a path.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let path = PathBuf::from(s);
        if path.is_file() {
            return Ok(Self::File(path));
        }
        let is_url = Url::parse(s).is_ok_and(|url| {
            matches!(url.scheme(), "http" | "https" | "ftp") && url.host().is_some()
        });
        Ok(if is_url {
            Self::Url(s.to_owned())
        } else {
            Self::File(path)
        })
    }
}

impl fmt::Display for DataLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Url(url) => f.write_str(url),
            Self::File(path) => write!(f, "{}", path.display()),
        }
    }
}

#[cfg(test)]
mod tests {
    use drug_nme_scraper::MemoryFetcher;
    use drug_nme_scraper::progress::NullProgress;

    use super::*;

    #[test]
    fn classifies_urls_and_paths() {
        assert_eq!(
            "https://download.open.fda.gov/x.zip".parse::<DataLocation>().unwrap(),
            DataLocation::Url("https://download.open.fda.gov/x.zip".to_owned())
        );
        assert_eq!(
            "data/drugsfda.json".parse::<DataLocation>().unwrap(),
            DataLocation::File(PathBuf::from("data/drugsfda.json"))
        );
        assert!(!"mailto:someone@example.com".parse::<DataLocation>().unwrap().is_url());
    }

    #[tokio::test]
    async fn reads_remote_location_through_fetcher() {
        let fetcher = MemoryFetcher::new().with_document("https://x.test/a.json", "[]");
        let location = DataLocation::Url("https://x.test/a.json".to_owned());
        let bytes = location.read(&fetcher, &NullProgress).await.unwrap();
        assert_eq!(bytes, b"[]");
    }

    #[tokio::test]
    async fn missing_file_is_an_io_error() {
        let location = DataLocation::File(PathBuf::from("/definitely/not/here.json"));
        let err = location
            .read(&MemoryFetcher::new(), &NullProgress)
            .await
            .unwrap_err();
        assert!(matches!(err, SourceError::Io(_)));
    }
}
