//! SSDC interface documents (SSDC-IF).
//!
//! Interface documents name an interface partner with
//! `\interfaceparter[options]{Full Name}`; the partner is listed after the
//! other authors.

use serde::{Deserialize, Serialize};

use super::common::{put, put_opt, SpherexParser};
use super::DocumentParser;
use crate::metadata::{
    Contributor, DocumentMetadata, FieldMap, SpherexMetadata, INTERFACE_PARTNER, IPAC_LEAD,
    SPHEREX_LEAD,
};
use crate::utils::error::ExtractionResult;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SsdcIfMetadata {
    #[serde(flatten)]
    pub base: SpherexMetadata,
}

impl SsdcIfMetadata {
    pub fn interface_partner(&self) -> Option<&Contributor> {
        self.base.author_with_role(INTERFACE_PARTNER)
    }
}

impl DocumentMetadata for SsdcIfMetadata {
    const RESERVED_ROLES: &'static [&'static str] = &[SPHEREX_LEAD, IPAC_LEAD, INTERFACE_PARTNER];

    fn base(&self) -> &SpherexMetadata {
        &self.base
    }
}

#[derive(Debug, Clone, Copy, Default)]
pub struct SsdcIfParser;

impl DocumentParser for SsdcIfParser {
    type Metadata = SsdcIfMetadata;
    const NAME: &'static str = "spherex-ssdc-if";

    fn extract_fields(&self, parser: &mut SpherexParser<'_>) -> ExtractionResult<FieldMap> {
        let mut m = FieldMap::new();
        put(&mut m, "title", parser.parse_title()?)?;
        put_opt(&mut m, "version", parser.parse_version())?;

        let mut authors = parser.parse_authors()?;
        if let Some(partner) = parser.parse_role_command("interfaceparter", INTERFACE_PARTNER)? {
            authors.push(partner);
        }
        put(&mut m, "authors", authors)?;

        put_opt(&mut m, "date_modified", parser.parse_date()?)?;
        put_opt(&mut m, "identifier", parser.parse_handle())?;
        Ok(m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ci::CiMetadata;
    use crate::core::texutils::TexDocument;
    use crate::parsers::extract_metadata;
    use crate::settings::BuildSettings;

    const SOURCE: &str = r"\title{Pipeline to Archive Interface}
\spherexHandle{SSDC-IF-004}
\ipaclead[email=lead@example.com]{Ada Lead}
\interfaceparter[email=partner@example.org]{Pat Partner}
\author{\person{Sam Writer}}
";

    #[test]
    fn test_partner_is_listed_last() {
        let output = extract_metadata(
            &SsdcIfParser,
            &TexDocument::new(SOURCE),
            &CiMetadata::null(),
            &BuildSettings::default(),
        )
        .unwrap();
        let metadata = output.metadata;
        let names: Vec<_> = metadata.base.authors.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["Ada Lead", "Sam Writer", "Pat Partner"]);

        let partner = metadata.interface_partner().unwrap();
        assert_eq!(partner.email.as_deref(), Some("partner@example.org"));

        let others: Vec<_> = metadata.other_authors().iter().map(|a| a.name.as_str()).collect();
        assert_eq!(others, vec!["Sam Writer"]);
    }

    #[test]
    fn test_approval_is_not_part_of_the_record() {
        let source = format!("{}\\approved{{2022-01-01}}{{A. Approver}}\n", SOURCE);
        let output = extract_metadata(
            &SsdcIfParser,
            &TexDocument::new(&source),
            &CiMetadata::null(),
            &BuildSettings::default(),
        )
        .unwrap();
        let json = serde_json::to_value(&output.metadata).unwrap();
        assert!(json.get("approval").is_none());
        assert!(!output
            .warnings
            .iter()
            .any(|w| w.command.as_deref() == Some("approved")));
    }
}
