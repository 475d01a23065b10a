//! Site version document: a semantic version plus the time it last changed.
//!
//! The admin screen bumps the patch number after publishing catalog edits so
//! visitors can tell the gallery has changed.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::api::ApiError;
use crate::store::{self, DocumentStore};

/// Contents of `version.json`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct VersionInfo {
    pub version: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub last_updated: Option<DateTime<Utc>>,
}

impl Default for VersionInfo {
    fn default() -> Self {
        Self {
            version: SemVer::INITIAL.to_string(),
            last_updated: None,
        }
    }
}

/// `major.minor.patch`
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct SemVer {
    pub major: u64,
    pub minor: u64,
    pub patch: u64,
}

impl SemVer {
    pub const INITIAL: SemVer = SemVer {
        major: 0,
        minor: 1,
        patch: 0,
    };

    /// `None` once the patch number cannot grow any further.
    pub fn next_patch(self) -> Option<Self> {
        Some(Self {
            patch: self.patch.checked_add(1)?,
            ..self
        })
    }
}

impl fmt::Display for SemVer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{}.{}", self.major, self.minor, self.patch)
    }
}

impl FromStr for SemVer {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let mut parts = s.trim().split('.');
        let mut next = |name: &str| -> Result<u64, String> {
            parts
                .next()
                .ok_or_else(|| format!("version {:?} is missing its {} number", s, name))?
                .parse::<u64>()
                .map_err(|e| format!("version {:?} has a bad {} number: {}", s, name, e))
        };
        let version = SemVer {
            major: next("major")?,
            minor: next("minor")?,
            patch: next("patch")?,
        };
        if parts.next().is_some() {
            return Err(format!("version {:?} has more than three parts", s));
        }
        Ok(version)
    }
}

/// Current version document; the initial version when none was ever written.
pub async fn current(store: &dyn DocumentStore) -> Result<VersionInfo, ApiError> {
    Ok(store::load_json(store, store::VERSION)
        .await?
        .unwrap_or_default())
}

/// Increment the patch number, stamp the time, and persist.
pub async fn bump(store: &dyn DocumentStore) -> Result<VersionInfo, ApiError> {
    let info = current(store).await?;
    let version: SemVer = info.version.parse().map_err(ApiError::Internal)?;
    let bumped = version.next_patch().ok_or_else(|| {
        ApiError::Internal(format!("version {} has no next patch number", version))
    })?;

    let next = VersionInfo {
        version: bumped.to_string(),
        last_updated: Some(Utc::now()),
    };
    store::save_json(store, store::VERSION, &next).await?;

    tracing::info!(from = %info.version, to = %next.version, "site version bumped");
    Ok(next)
}
