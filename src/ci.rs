//! Build provenance from the CI environment.
//!
//! Only GitHub Actions is recognised. Outside of it the metadata is the
//! [`CiPlatform::Null`] record and no provenance fields are overlaid on the
//! document metadata.

use serde::Serialize;
use tracing::debug;

use crate::metadata::FieldMap;

/// The CI service a build ran on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum CiPlatform {
    /// No CI environment detected
    #[default]
    Null,
    GithubActions,
}

/// Provenance of the current build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CiMetadata {
    pub platform: CiPlatform,
    pub git_sha: Option<String>,
    pub git_ref: Option<String>,
    pub git_ref_type: Option<String>,
    pub build_id: Option<String>,
    pub build_url: Option<String>,
    /// Web URL of the repository
    pub github_repository: Option<String>,
    pub github_slug: Option<String>,
}

impl CiMetadata {
    /// Metadata for a build outside any CI service.
    pub fn null() -> Self {
        Self::default()
    }

    /// Detect the CI environment from the process environment.
    pub fn from_env() -> Self {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Detect the CI environment through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(key).filter(|v| !v.is_empty());

        if var("GITHUB_ACTIONS").as_deref() != Some("true") {
            debug!("no CI environment detected");
            return Self::null();
        }

        let server = var("GITHUB_SERVER_URL").unwrap_or_else(|| "https://github.com".to_string());
        let server = server.trim_end_matches('/');
        let slug = var("GITHUB_REPOSITORY");
        let build_id = var("GITHUB_RUN_ID");
        let repository = slug.as_ref().map(|s| format!("{}/{}", server, s));
        let build_url = match (&repository, &build_id) {
            (Some(repo), Some(id)) => Some(format!("{}/actions/runs/{}", repo, id)),
            _ => None,
        };

        debug!("detected GitHub Actions build {:?}", build_id);
        Self {
            platform: CiPlatform::GithubActions,
            git_sha: var("GITHUB_SHA"),
            git_ref: var("GITHUB_REF_NAME"),
            git_ref_type: var("GITHUB_REF_TYPE"),
            build_id,
            build_url,
            github_repository: repository,
            github_slug: slug,
        }
    }

    pub fn is_detected(&self) -> bool {
        self.platform != CiPlatform::Null
    }

    /// Write the provenance fields into `fields`, replacing existing values.
    ///
    /// Does nothing when no CI platform was detected.
    pub fn overlay(&self, fields: &mut FieldMap) {
        if !self.is_detected() {
            return;
        }
        let entries = [
            ("git_commit_sha", &self.git_sha),
            ("git_ref", &self.git_ref),
            ("git_ref_type", &self.git_ref_type),
            ("ci_build_id", &self.build_id),
            ("ci_build_url", &self.build_url),
            ("repository_url", &self.github_repository),
            ("github_slug", &self.github_slug),
        ];
        for (key, value) in entries {
            if let Some(value) = value {
                fields.insert(key.to_string(), value.clone().into());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn github_env() -> HashMap<&'static str, &'static str> {
        HashMap::from([
            ("GITHUB_ACTIONS", "true"),
            ("GITHUB_SHA", "0123abcd"),
            ("GITHUB_REF_NAME", "main"),
            ("GITHUB_REF_TYPE", "branch"),
            ("GITHUB_RUN_ID", "42"),
            ("GITHUB_SERVER_URL", "https://github.com"),
            ("GITHUB_REPOSITORY", "SPHEREx/SSDC-MS-001"),
        ])
    }

    #[test]
    fn test_github_actions_detection() {
        let env = github_env();
        let ci = CiMetadata::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        assert_eq!(ci.platform, CiPlatform::GithubActions);
        assert_eq!(ci.git_sha.as_deref(), Some("0123abcd"));
        assert_eq!(
            ci.github_repository.as_deref(),
            Some("https://github.com/SPHEREx/SSDC-MS-001")
        );
        assert_eq!(
            ci.build_url.as_deref(),
            Some("https://github.com/SPHEREx/SSDC-MS-001/actions/runs/42")
        );
    }

    #[test]
    fn test_no_ci_is_null() {
        let ci = CiMetadata::from_lookup(|_| None);
        assert_eq!(ci, CiMetadata::null());
        assert!(!ci.is_detected());

        let mut fields = FieldMap::new();
        ci.overlay(&mut fields);
        assert!(fields.is_empty());
    }

    #[test]
    fn test_overlay_replaces_fields() {
        let env = github_env();
        let ci = CiMetadata::from_lookup(|k| env.get(k).map(|v| v.to_string()));
        let mut fields = FieldMap::new();
        fields.insert("git_ref".to_string(), "stale".into());
        ci.overlay(&mut fields);
        assert_eq!(fields["git_ref"], "main");
        assert_eq!(fields["github_slug"], "SPHEREx/SSDC-MS-001");
        assert_eq!(fields["ci_build_id"], "42");
    }
}
