//! HTTP readiness checks.
//!
//! The service is considered active once the body served at the configured
//! URI matches the readiness pattern. Fetching and matching are separate so
//! the controller can be exercised with scripted bodies.

use std::time::Duration;

use regex::Regex;
use tracing::debug;
use url::Url;

use super::error::{LifecycleError, ValidationError};
use super::types::ServiceEndpoint;

/// A single readiness fetch.
#[derive(Debug, Clone, Copy)]
pub struct ReadinessRequest<'a> {
    pub url: &'a Url,
    /// Pre-rendered `Authorization` header value.
    pub authorization: Option<&'a str>,
    pub timeout: Duration,
}

/// Fetches the body of the readiness page.
///
/// Implementations return the body for any completed HTTP exchange,
/// including non-success statuses, and reserve errors for requests that did
/// not complete.
pub trait ReadinessSource {
    fn fetch(&self, request: &ReadinessRequest<'_>) -> Result<String, LifecycleError>;
}

/// Decides whether a response body signals readiness.
pub trait BodyMatcher {
    fn matches(&self, body: &str) -> bool;
}

impl BodyMatcher for Regex {
    fn matches(&self, body: &str) -> bool {
        self.is_match(body)
    }
}

/// Validated readiness parameters: where to look and what to look for.
pub struct ReadinessCheck {
    uri: String,
    matcher: Box<dyn BodyMatcher>,
}

impl std::fmt::Debug for ReadinessCheck {
    fn fmt(&self, formatter: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        formatter
            .debug_struct("ReadinessCheck")
            .field("uri", &self.uri)
            .finish_non_exhaustive()
    }
}

impl ReadinessCheck {
    /// Validates the raw parameters and compiles the pattern.
    ///
    /// Both values must be present and non-blank.
    pub fn from_parameters(
        uri: Option<&str>,
        pattern: Option<&str>,
    ) -> Result<Self, ValidationError> {
        let uri = non_empty(uri, "uri")?;
        let pattern = non_empty(pattern, "pattern")?;
        let regex = Regex::new(pattern).map_err(|source| ValidationError::InvalidPattern {
            pattern: pattern.to_owned(),
            source,
        })?;
        Ok(Self::with_matcher(uri, regex))
    }

    /// Builds a check around an already constructed matcher.
    pub fn with_matcher(uri: impl Into<String>, matcher: impl BodyMatcher + 'static) -> Self {
        Self {
            uri: uri.into(),
            matcher: Box::new(matcher),
        }
    }

    /// Absolute URL of the readiness page on the given endpoint.
    ///
    /// The URI is always treated as a path (plus optional query) on the
    /// endpoint; it can never change the scheme or host.
    pub fn url(&self, endpoint: &ServiceEndpoint) -> Result<Url, LifecycleError> {
        let (path, query) = match self.uri.split_once('?') {
            Some((path, query)) => (path, Some(query)),
            None => (self.uri.as_str(), None),
        };
        let mut url = endpoint
            .base_url()
            .map_err(|source| LifecycleError::InvalidUrl {
                input: format!("{endpoint}/{}", self.uri.trim_start_matches('/')),
                source,
            })?;
        url.set_path(&format!("/{}", path.trim_start_matches('/')));
        url.set_query(query);
        Ok(url)
    }

    pub fn matches(&self, body: &str) -> bool {
        self.matcher.matches(body)
    }
}

fn non_empty<'a>(
    value: Option<&'a str>,
    parameter: &'static str,
) -> Result<&'a str, ValidationError> {
    value
        .filter(|text| !text.trim().is_empty())
        .ok_or(ValidationError::MissingReadinessParameter { parameter })
}

/// Production readiness source backed by a blocking `ureq` agent.
pub struct HttpReadiness {
    agent: ureq::Agent,
}

impl Default for HttpReadiness {
    fn default() -> Self {
        Self {
            agent: ureq::AgentBuilder::new().build(),
        }
    }
}

impl ReadinessSource for HttpReadiness {
    fn fetch(&self, request: &ReadinessRequest<'_>) -> Result<String, LifecycleError> {
        let mut call = self
            .agent
            .get(request.url.as_str())
            .timeout(request.timeout);
        if let Some(authorization) = request.authorization {
            call = call.set("Authorization", authorization);
        }
        let response = match call.call() {
            Ok(response) => response,
            Err(ureq::Error::Status(status, response)) => {
                debug!(url = %request.url, status, "readiness page returned an error status");
                response
            }
            Err(ureq::Error::Transport(transport)) => {
                return Err(LifecycleError::Transport {
                    url: request.url.to_string(),
                    source: Box::new(transport),
                });
            }
        };
        response
            .into_string()
            .map_err(|source| LifecycleError::Transport {
                url: request.url.to_string(),
                source: Box::new(source),
            })
    }
}
