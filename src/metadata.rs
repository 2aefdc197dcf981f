//! Core data model for SPHEREx documents.
//!
//! Every document class record embeds a [`SpherexMetadata`] (flattened when
//! serialized) and adds its own fields. Records are built once from a merged
//! field dictionary and are read-only afterwards; URLs and role-filtered
//! author lists are derived on demand rather than stored.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

use crate::utils::error::{ExtractionError, ExtractionResult};

/// Field name to value dictionary that records are assembled from.
pub type FieldMap = serde_json::Map<String, serde_json::Value>;

/// Role label of the lead author from the SPHEREx science team.
pub const SPHEREX_LEAD: &str = "SPHEREx Lead";
/// Role label of the lead author from IPAC.
pub const IPAC_LEAD: &str = "IPAC Lead";
/// Role label of the external partner of an interface document.
pub const INTERFACE_PARTNER: &str = "Interface Partner";

/// A document author.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Contributor {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub role: Option<String>,
}

impl Contributor {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            email: None,
            role: None,
        }
    }

    pub fn with_email(mut self, email: Option<impl Into<String>>) -> Self {
        self.email = email.map(Into::into);
        self
    }

    pub fn with_role(mut self, role: impl Into<String>) -> Self {
        self.role = Some(role.into());
        self
    }

    pub fn has_role(&self, role: &str) -> bool {
        self.role.as_deref() == Some(role)
    }
}

/// A document's approval metadata.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalInfo {
    /// Name of the approver.
    pub name: String,
    /// Date of the approval, as written in the document.
    pub date: String,
}

/// A DOORS requirements-traceability identifier.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DoorsId {
    pub id: String,
    pub url: String,
}

/// Metadata common to all SPHEREx documents.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct SpherexMetadata {
    pub title: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub version: Option<String>,

    /// Document handle, such as `SSDC-MS-001`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub date_modified: Option<NaiveDate>,

    #[serde(default)]
    pub authors: Vec<Contributor>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub canonical_url: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub repository_url: Option<String>,

    /// Git commit SHA.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_commit_sha: Option<String>,

    /// Git ref (branch or tag name).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_ref: Option<String>,

    /// Git ref type (branch or tag).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub git_ref_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_build_id: Option<String>,

    /// URL of the CI job/build.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ci_build_url: Option<String>,

    /// The slug (`org/name`) of the repository on GitHub.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_slug: Option<String>,
}

impl SpherexMetadata {
    /// First author carrying `role`.
    pub fn author_with_role(&self, role: &str) -> Option<&Contributor> {
        self.authors.iter().find(|a| a.has_role(role))
    }

    pub fn spherex_lead(&self) -> Option<&Contributor> {
        self.author_with_role(SPHEREX_LEAD)
    }

    pub fn ipac_lead(&self) -> Option<&Contributor> {
        self.author_with_role(IPAC_LEAD)
    }

    /// Authors whose role is not in `reserved`, in document order.
    pub fn authors_excluding(&self, reserved: &[&str]) -> Vec<&Contributor> {
        self.authors
            .iter()
            .filter(|a| !a.role.as_deref().is_some_and(|r| reserved.contains(&r)))
            .collect()
    }

    /// The GitHub web URL corresponding to the branch or tag.
    pub fn github_ref_url(&self) -> Option<String> {
        let git_ref = self.git_ref.as_deref()?;
        self.github_repo_path(&format!("tree/{}", git_ref))
    }

    /// The GitHub web URL corresponding to the commit.
    pub fn github_commit_url(&self) -> Option<String> {
        let sha = self.git_commit_sha.as_deref()?;
        self.github_repo_path(&format!("commit/{}", sha))
    }

    fn github_repo_path(&self, path: &str) -> Option<String> {
        let repo = self.repository_url.as_deref().filter(|s| !s.is_empty())?;
        self.github_slug.as_deref().filter(|s| !s.is_empty())?;
        Some(format!("{}{}", with_trailing_slash(repo), path))
    }

    /// URL of the edition dashboard.
    pub fn dashboard_url(&self) -> Option<String> {
        let canonical = self.canonical_url.as_deref().filter(|s| !s.is_empty())?;
        Some(format!("{}v/", with_trailing_slash(canonical)))
    }

    /// The handle prefix: `SSDC-MS` for `SSDC-MS-001`.
    ///
    /// `None` when there is no identifier or it has fewer than two
    /// hyphen-separated segments.
    pub fn document_handle_prefix(&self) -> Option<String> {
        let identifier = self.identifier.as_deref()?;
        let mut segments = identifier.split('-');
        match (segments.next(), segments.next()) {
            (Some(first), Some(second)) if !first.is_empty() => {
                Some(format!("{}-{}", first, second))
            }
            _ => None,
        }
    }

    /// Check the invariants serde cannot express.
    pub fn validate(&self) -> ExtractionResult<()> {
        let urls = [
            ("canonical_url", &self.canonical_url),
            ("repository_url", &self.repository_url),
            ("ci_build_url", &self.ci_build_url),
        ];
        for (field, value) in urls {
            if let Some(url) = value {
                if !is_http_url(url) {
                    return Err(ExtractionError::invalid(format!(
                        "{} is not an http(s) URL: {}",
                        field, url
                    )));
                }
            }
        }
        Ok(())
    }
}

/// Behaviour shared by the per-class records.
pub trait DocumentMetadata {
    /// Roles that are shown separately from the ordinary author list.
    const RESERVED_ROLES: &'static [&'static str] = &[SPHEREX_LEAD, IPAC_LEAD];

    fn base(&self) -> &SpherexMetadata;

    /// Additional authors, without the reserved roles.
    fn other_authors(&self) -> Vec<&Contributor> {
        self.base().authors_excluding(Self::RESERVED_ROLES)
    }

    fn validate(&self) -> ExtractionResult<()> {
        self.base().validate()
    }
}

fn with_trailing_slash(url: &str) -> String {
    if url.ends_with('/') {
        url.to_string()
    } else {
        format!("{}/", url)
    }
}

fn is_http_url(url: &str) -> bool {
    ["http://", "https://"]
        .iter()
        .any(|scheme| url.len() > scheme.len() && url.starts_with(scheme))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn with_identifier(identifier: Option<&str>) -> SpherexMetadata {
        SpherexMetadata {
            title: "Example".to_string(),
            identifier: identifier.map(str::to_string),
            ..Default::default()
        }
    }

    #[test]
    fn test_document_handle_prefix() {
        assert_eq!(
            with_identifier(Some("SSDC-MS-001")).document_handle_prefix(),
            Some("SSDC-MS".to_string())
        );
        assert_eq!(
            with_identifier(Some("SSDC-PM")).document_handle_prefix(),
            Some("SSDC-PM".to_string())
        );
        assert_eq!(with_identifier(Some("SSDC")).document_handle_prefix(), None);
        assert_eq!(with_identifier(Some("")).document_handle_prefix(), None);
        assert_eq!(with_identifier(None).document_handle_prefix(), None);
    }

    #[test]
    fn test_dashboard_url() {
        let mut m = with_identifier(None);
        assert_eq!(m.dashboard_url(), None);
        m.canonical_url = Some("https://ssdc-ms-001.example.org".to_string());
        assert_eq!(
            m.dashboard_url().as_deref(),
            Some("https://ssdc-ms-001.example.org/v/")
        );
        m.canonical_url = Some("https://ssdc-ms-001.example.org/".to_string());
        assert_eq!(
            m.dashboard_url().as_deref(),
            Some("https://ssdc-ms-001.example.org/v/")
        );
    }

    #[test]
    fn test_github_urls_need_all_inputs() {
        let mut m = with_identifier(None);
        m.repository_url = Some("https://github.com/SPHEREx/SSDC-MS-001".to_string());
        m.git_commit_sha = Some("abc123".to_string());
        m.git_ref = Some("main".to_string());
        assert_eq!(m.github_commit_url(), None);

        m.github_slug = Some("SPHEREx/SSDC-MS-001".to_string());
        assert_eq!(
            m.github_commit_url().as_deref(),
            Some("https://github.com/SPHEREx/SSDC-MS-001/commit/abc123")
        );
        assert_eq!(
            m.github_ref_url().as_deref(),
            Some("https://github.com/SPHEREx/SSDC-MS-001/tree/main")
        );

        m.git_ref = None;
        assert_eq!(m.github_ref_url(), None);
    }

    #[test]
    fn test_role_filters() {
        let mut m = with_identifier(None);
        m.authors = vec![
            Contributor::new("A").with_role(SPHEREX_LEAD),
            Contributor::new("B").with_role(IPAC_LEAD),
            Contributor::new("C"),
        ];
        assert_eq!(m.spherex_lead().map(|a| a.name.as_str()), Some("A"));
        assert_eq!(m.ipac_lead().map(|a| a.name.as_str()), Some("B"));
        let others = m.authors_excluding(&[SPHEREX_LEAD, IPAC_LEAD]);
        assert_eq!(others.len(), 1);
        assert_eq!(others[0].name, "C");
    }

    #[test]
    fn test_validate_urls() {
        let mut m = with_identifier(None);
        assert!(m.validate().is_ok());
        m.ci_build_url = Some("not a url".to_string());
        assert!(matches!(
            m.validate(),
            Err(ExtractionError::InvalidMetadata { .. })
        ));
    }

    #[test]
    fn test_absent_fields_are_not_serialized() {
        let m = with_identifier(Some("SSDC-TN-002"));
        let value = serde_json::to_value(&m).unwrap();
        let obj = value.as_object().unwrap();
        assert_eq!(obj.get("identifier").and_then(|v| v.as_str()), Some("SSDC-TN-002"));
        assert!(!obj.contains_key("version"));
        assert!(obj.contains_key("authors"));
    }
}
