//! Location of a prebuilt JSON manifest: a local file or an HTTP URL.

use serde_json::Value;
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use xcontrol_core::{Result, XControlError};

const FETCH_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ManifestSource {
    File(PathBuf),
    Http(String),
}

impl ManifestSource {
    /// `http://` and `https://` values are URLs; anything else is a path.
    pub fn parse(location: &str) -> Self {
        let location = location.trim();
        let lower = location.to_lowercase();
        if lower.starts_with("http://") || lower.starts_with("https://") {
            ManifestSource::Http(location.to_string())
        } else {
            ManifestSource::File(PathBuf::from(location))
        }
    }

    /// Reads and parses the manifest.
    ///
    /// A missing file or an HTTP 404 is `Ok(None)`. Other failures are errors.
    pub async fn fetch_json(&self, client: &reqwest::Client) -> Result<Option<Value>> {
        match self {
            ManifestSource::File(path) => {
                let content = match tokio::fs::read_to_string(path).await {
                    Ok(content) => content,
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
                    Err(e) => {
                        return Err(XControlError::io(format!(
                            "Failed to read {}: {}",
                            path.display(),
                            e
                        )));
                    }
                };
                Ok(Some(serde_json::from_str(&content)?))
            }
            ManifestSource::Http(url) => {
                let response = client
                    .get(url)
                    .timeout(FETCH_TIMEOUT)
                    .send()
                    .await
                    .map_err(|e| XControlError::unreachable(format!("GET {}: {}", url, e)))?;

                let status = response.status();
                if status == reqwest::StatusCode::NOT_FOUND {
                    return Ok(None);
                }
                if !status.is_success() {
                    return Err(XControlError::upstream(
                        status.as_u16(),
                        format!("GET {} failed", url),
                    ));
                }
                let body = response
                    .text()
                    .await
                    .map_err(|e| XControlError::unreachable(format!("GET {}: {}", url, e)))?;
                Ok(Some(serde_json::from_str(&body)?))
            }
        }
    }
}

impl fmt::Display for ManifestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ManifestSource::File(path) => write!(f, "{}", path.display()),
            ManifestSource::Http(url) => f.write_str(url),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_parse_location() {
        assert_eq!(
            ManifestSource::parse(" HTTPS://dl.svc.plus/dl-index/all.json "),
            ManifestSource::Http("HTTPS://dl.svc.plus/dl-index/all.json".to_string())
        );
        assert_eq!(
            ManifestSource::parse("public/dl-index/all.json"),
            ManifestSource::File(PathBuf::from("public/dl-index/all.json"))
        );
    }

    #[tokio::test]
    async fn test_file_source() {
        let dir = TempDir::new().unwrap();
        let client = reqwest::Client::new();

        let missing = ManifestSource::File(dir.path().join("missing.json"));
        assert_eq!(missing.fetch_json(&client).await.unwrap(), None);

        let path = dir.path().join("index.json");
        std::fs::write(&path, r#"{"docs": []}"#).unwrap();
        let value = ManifestSource::File(path.clone()).fetch_json(&client).await.unwrap();
        assert_eq!(value, Some(serde_json::json!({"docs": []})));

        std::fs::write(&path, "{ not json").unwrap();
        let err = ManifestSource::File(path).fetch_json(&client).await.unwrap_err();
        assert!(err.is_serialization());
    }
}
