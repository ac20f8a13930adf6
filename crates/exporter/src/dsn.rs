//! Uptrace DSN parsing
//!
//! A DSN identifies the project spans are sent to and carries the project
//! token: `https://<token>@api.uptrace.dev/<project_id>`.

use percent_encoding::percent_decode_str;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;
use url::Url;

/// Errors returned when a DSN cannot be used
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum DsnError {
    #[error("DSN is empty")]
    Empty,

    #[error("can't parse DSN={dsn:?}: {source}")]
    Invalid {
        dsn: String,
        #[source]
        source: url::ParseError,
    },

    #[error("unsupported scheme={0:?} (supported schemes are http and https)")]
    UnsupportedScheme(String),

    #[error("DSN={0:?} does not have a host")]
    MissingHost(String),

    #[error("DSN={0:?} does not have a project id")]
    MissingProjectId(String),

    #[error("DSN={0:?} does not have a token")]
    MissingToken(String),
}

/// A parsed and validated DSN
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Dsn {
    original: String,
    scheme: String,
    /// Host including the port, if any
    host: String,
    project_id: String,
    token: String,
}

impl Dsn {
    pub fn parse(dsn: &str) -> Result<Self, DsnError> {
        if dsn.is_empty() {
            return Err(DsnError::Empty);
        }

        let url = Url::parse(dsn).map_err(|source| DsnError::Invalid {
            dsn: dsn.to_string(),
            source,
        })?;

        let scheme = url.scheme();
        if scheme != "http" && scheme != "https" {
            return Err(DsnError::UnsupportedScheme(scheme.to_string()));
        }

        let mut host = match url.host_str() {
            Some(host) if !host.is_empty() => host.to_string(),
            _ => return Err(DsnError::MissingHost(dsn.to_string())),
        };
        if host == "uptrace.dev" {
            host = "api.uptrace.dev".to_string();
        }
        if let Some(port) = url.port() {
            host = format!("{}:{}", host, port);
        }

        // Only the first path segment names the project
        let project_id = url
            .path_segments()
            .and_then(|mut segments| segments.next())
            .unwrap_or_default();
        if project_id.is_empty() {
            return Err(DsnError::MissingProjectId(dsn.to_string()));
        }

        let token = percent_decode_str(url.username()).decode_utf8_lossy();
        if token.is_empty() {
            return Err(DsnError::MissingToken(dsn.to_string()));
        }

        Ok(Self {
            original: dsn.to_string(),
            scheme: scheme.to_string(),
            host,
            project_id: project_id.to_string(),
            token: token.to_string(),
        })
    }

    pub fn scheme(&self) -> &str {
        &self.scheme
    }

    pub fn host(&self) -> &str {
        &self.host
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    pub fn token(&self) -> &str {
        &self.token
    }

    /// URL that span batches are posted to
    pub fn spans_endpoint(&self) -> String {
        format!(
            "{}://{}/api/v1/tracing/{}/spans",
            self.scheme, self.host, self.project_id
        )
    }
}

impl FromStr for Dsn {
    type Err = DsnError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl fmt::Display for Dsn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.original)
    }
}
