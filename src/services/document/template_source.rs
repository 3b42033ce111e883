use std::{fmt, path::PathBuf, time::Duration};

use url::Url;

use super::DocumentError;

/// Where a template package lives: an HTTP(S) resource or a local file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TemplateLocation {
    Remote(Url),
    Local(PathBuf),
}

impl TemplateLocation {
    pub fn parse(raw: &str) -> Result<Self, url::ParseError> {
        let raw = raw.trim();
        if raw.starts_with("http://") || raw.starts_with("https://") {
            Url::parse(raw).map(TemplateLocation::Remote)
        } else {
            Ok(TemplateLocation::Local(PathBuf::from(raw)))
        }
    }
}

impl fmt::Display for TemplateLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TemplateLocation::Remote(url) => write!(f, "{}", url),
            TemplateLocation::Local(path) => write!(f, "{}", path.display()),
        }
    }
}

/// A configured template: the key callers use, where to fetch it and the
/// file name offered for the generated download.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TemplateSpec {
    pub key: String,
    pub location: TemplateLocation,
    pub file_name: String,
}

impl TemplateSpec {
    /// Find a configured template by its key.
    pub fn lookup<'a>(templates: &'a [TemplateSpec], key: &str) -> Option<&'a TemplateSpec> {
        templates.iter().find(|template| template.key == key)
    }
}

/// Fetches complete template packages. Each call reads a fresh copy.
#[derive(Clone)]
pub struct TemplateSource {
    client: reqwest::Client,
}

impl TemplateSource {
    pub fn new(timeout: Option<Duration>) -> Result<Self, reqwest::Error> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }
        Ok(Self {
            client: builder.build()?,
        })
    }

    pub async fn fetch(&self, location: &TemplateLocation) -> Result<Vec<u8>, DocumentError> {
        let fail = |reason: String| DocumentError::Fetch {
            location: location.to_string(),
            reason,
        };

        let bytes = match location {
            TemplateLocation::Remote(url) => {
                let response = self
                    .client
                    .get(url.clone())
                    .send()
                    .await
                    .map_err(|e| fail(e.to_string()))?;

                let status = response.status();
                if !status.is_success() {
                    return Err(fail(format!("server responded with {}", status)));
                }

                let expected = response.content_length();
                let body = response.bytes().await.map_err(|e| fail(e.to_string()))?;
                if let Some(expected) = expected {
                    if (body.len() as u64) < expected {
                        return Err(fail(format!(
                            "incomplete body: got {} of {} bytes",
                            body.len(),
                            expected
                        )));
                    }
                }
                body.to_vec()
            }
            TemplateLocation::Local(path) => tokio::fs::read(path)
                .await
                .map_err(|e| fail(e.to_string()))?,
        };

        if bytes.is_empty() {
            return Err(fail("empty body".to_string()));
        }

        log::debug!("Fetched template {} ({} bytes)", location, bytes.len());
        Ok(bytes)
    }
}
