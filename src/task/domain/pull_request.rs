//! Pull request URL value object carried by PR confirmation events.

use super::TaskDomainError;
use serde::{Deserialize, Serialize};
use std::fmt;

/// URL of a pull request opened for a task's work.
///
/// # Examples
///
///     use taskwarden::task::domain::PullRequestUrl;
///
///     let url = PullRequestUrl::new(" https://example.com/pr/7 ").expect("valid");
///     assert_eq!(url.as_str(), "https://example.com/pr/7");
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct PullRequestUrl(String);

impl PullRequestUrl {
    /// Creates a validated pull request URL.
    ///
    /// # Errors
    ///
    /// Returns [`TaskDomainError::EmptyPullRequestUrl`] when the value is
    /// empty after trimming.
    pub fn new(value: impl Into<String>) -> Result<Self, TaskDomainError> {
        let raw = value.into();
        let normalized = raw.trim();
        if normalized.is_empty() {
            return Err(TaskDomainError::EmptyPullRequestUrl);
        }
        Ok(Self(normalized.to_owned()))
    }

    /// Returns the URL as `str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for PullRequestUrl {
    type Error = TaskDomainError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<PullRequestUrl> for String {
    fn from(value: PullRequestUrl) -> Self {
        value.0
    }
}

impl fmt::Display for PullRequestUrl {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}
