//! Moderation blocklist configuration.
//!
//! Banned terms are grouped under policy versions so a deployment can ship a
//! new list from a file and switch to it without touching the validation code.

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use thiserror::Error;

pub const DEFAULT_POLICY_VERSION: &str = "v1";

const DEFAULT_BANNED_TERMS: &[&str] = &[
    "fan", "fitta", "hora", "kuk", "cp", "idiot", "jävla", "fuck", "shit", "bitch", "nigger",
    "retard", "naz",
];

#[derive(Debug, Error)]
pub enum ModerationLoadError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        source: std::io::Error,
    },
    #[error("failed to parse {path}: {source}")]
    Parse {
        path: String,
        source: serde_json::Error,
    },
    #[error("active policy version {0:?} is not defined")]
    UnknownVersion(String),
}

#[derive(Debug, Deserialize)]
struct PolicyFile {
    active: String,
    versions: BTreeMap<String, Vec<String>>,
}

#[derive(Clone, Debug)]
pub struct ModerationPolicy {
    active: String,
    versions: BTreeMap<String, Vec<String>>,
}

impl Default for ModerationPolicy {
    fn default() -> Self {
        let mut versions = BTreeMap::new();
        versions.insert(
            DEFAULT_POLICY_VERSION.to_string(),
            DEFAULT_BANNED_TERMS
                .iter()
                .map(|term| term.to_string())
                .collect(),
        );
        Self {
            active: DEFAULT_POLICY_VERSION.to_string(),
            versions,
        }
    }
}

impl ModerationPolicy {
    pub fn new(
        active: impl Into<String>,
        versions: BTreeMap<String, Vec<String>>,
    ) -> Result<Self, ModerationLoadError> {
        let active = active.into();
        if !versions.contains_key(&active) {
            return Err(ModerationLoadError::UnknownVersion(active));
        }
        let versions = versions
            .into_iter()
            .map(|(version, terms)| (version, sanitize_terms(terms)))
            .collect();
        Ok(Self { active, versions })
    }

    pub fn from_file(path: &Path) -> Result<Self, ModerationLoadError> {
        let text = fs::read_to_string(path).map_err(|source| ModerationLoadError::Read {
            path: path.display().to_string(),
            source,
        })?;
        let parsed: PolicyFile =
            serde_json::from_str(&text).map_err(|source| ModerationLoadError::Parse {
                path: path.display().to_string(),
                source,
            })?;
        Self::new(parsed.active, parsed.versions)
    }

    pub fn active_version(&self) -> &str {
        &self.active
    }

    pub fn banned_terms(&self) -> &[String] {
        self.versions
            .get(&self.active)
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    /// Substring match against the lowercased name. Over-inclusive on purpose:
    /// short terms also hit inside longer, harmless names.
    pub fn contains_blocked_term(&self, name: &str) -> bool {
        let lower = name.to_lowercase();
        self.banned_terms()
            .iter()
            .any(|term| lower.contains(term.as_str()))
    }
}

fn sanitize_terms(terms: Vec<String>) -> Vec<String> {
    terms
        .into_iter()
        .map(|term| term.trim().to_lowercase())
        .filter(|term| !term.is_empty())
        .collect()
}
