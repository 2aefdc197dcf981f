//! Parsing shared by every SPHEREx document class.
//!
//! [`SpherexParser`] holds one document together with its CI context and
//! build settings, and offers the per-field extraction steps the class
//! parsers compose. Optional fields that cannot be found are logged, recorded
//! as warnings and left out of the field dictionary; only mandatory fields
//! and malformed values produce errors.

use chrono::{DateTime, NaiveDate, NaiveDateTime};
use lazy_static::lazy_static;
use regex::Regex;
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, warn};

use crate::ci::CiMetadata;
use crate::core::texutils::{
    convert_tex_span, CommandElement, CommandInvocation, KvOptionMap, LatexCommand, TexDocument,
};
use crate::metadata::{
    ApprovalInfo, Contributor, DocumentMetadata, FieldMap, IPAC_LEAD, SPHEREX_LEAD,
};
use crate::settings::BuildSettings;
use crate::utils::error::{
    ExtractionError, ExtractionOutput, ExtractionResult, ExtractionWarning,
};

/// Macros consulted for the modification date, in order of preference.
const DATE_MACROS: [&str; 2] = ["\\docDate", "\\vcsDate"];

/// One document's extraction state.
pub struct SpherexParser<'a> {
    document: &'a TexDocument,
    ci: &'a CiMetadata,
    settings: &'a BuildSettings,
    warnings: Vec<ExtractionWarning>,
}

impl<'a> SpherexParser<'a> {
    pub fn new(document: &'a TexDocument, ci: &'a CiMetadata, settings: &'a BuildSettings) -> Self {
        Self {
            document,
            ci,
            settings,
            warnings: Vec::new(),
        }
    }

    /// Comment-free source of the document.
    pub fn source(&self) -> &'a str {
        self.document.source()
    }

    /// Operator override for `field`, if the build settings carry one.
    pub fn override_value(&self, field: &str) -> Option<&'a serde_json::Value> {
        self.settings.metadata.get(field)
    }

    pub fn warnings(&self) -> &[ExtractionWarning] {
        &self.warnings
    }

    /// Log and record a recoverable problem.
    pub fn warn(&mut self, warning: ExtractionWarning) {
        warn!("{}", warning.message);
        self.warnings.push(warning);
    }

    /// Last invocation of `command`, warning when there is none.
    pub fn find_last(&mut self, command: &LatexCommand) -> Option<CommandInvocation> {
        let found = command.last(self.source());
        if found.is_none() {
            self.warn(ExtractionWarning::missing_command(command.name()));
        }
        found
    }

    /// Raw content of a single-argument command's last invocation.
    pub fn parse_single(&mut self, name: &str) -> Option<String> {
        let command = LatexCommand::new(name, [CommandElement::required("value")]);
        self.find_last(&command)
            .and_then(|inv| inv.get("value").map(str::to_string))
    }

    /// Parse the title command.
    ///
    /// If the title command includes an optional short version, only the
    /// required long version is kept.
    pub fn parse_title(&self) -> ExtractionResult<String> {
        let command = LatexCommand::new(
            "title",
            [
                CommandElement::optional("short_title"),
                CommandElement::required("long_title"),
            ],
        );
        command
            .last(self.source())
            .and_then(|inv| inv.get("long_title").map(str::to_string))
            .ok_or_else(|| ExtractionError::missing("title"))
    }

    pub fn parse_version(&mut self) -> Option<String> {
        self.parse_single("version")
    }

    pub fn parse_handle(&mut self) -> Option<String> {
        self.parse_single("spherexHandle")
    }

    /// Parse the modification date from `\docDate`, falling back to `\vcsDate`.
    pub fn parse_date(&mut self) -> ExtractionResult<Option<NaiveDate>> {
        let macros = self.document.macros();
        let Some((name, value)) = DATE_MACROS
            .iter()
            .find_map(|name| macros.get(*name).map(|value| (*name, value.clone())))
        else {
            debug!("no date macro defined");
            return Ok(None);
        };
        if value.trim().is_empty() {
            return Ok(None);
        }
        parse_iso_date(&value).map(Some).ok_or_else(|| {
            ExtractionError::malformed(
                name.trim_start_matches('\\'),
                value.as_str(),
                "not an ISO 8601 date",
            )
        })
    }

    /// Parse the approved command: `\approved{date}{name}`.
    pub fn parse_approved(&mut self) -> Option<ApprovalInfo> {
        let command = LatexCommand::new(
            "approved",
            [
                CommandElement::required("date"),
                CommandElement::required("name"),
            ],
        );
        let inv = self.find_last(&command)?;
        Some(ApprovalInfo {
            name: inv.get("name")?.to_string(),
            date: inv.get("date")?.to_string(),
        })
    }

    /// Parse a `\<name>[options]{Full Name}` command into a contributor with
    /// `role`, taking the last invocation.
    pub fn parse_role_command(
        &mut self,
        name: &str,
        role: &str,
    ) -> ExtractionResult<Option<Contributor>> {
        let command = person_like(name);
        let Some(inv) = self.find_last(&command) else {
            return Ok(None);
        };
        contributor_from(&inv).map(|c| Some(c.with_role(role)))
    }

    /// Parse author information, including lead and other authors.
    ///
    /// Leads come first (SPHEREx, then IPAC) followed by every `\person`
    /// inside every `\author` block, in document order.
    pub fn parse_authors(&mut self) -> ExtractionResult<Vec<Contributor>> {
        let mut authors = Vec::new();

        if let Some(lead) = self.parse_role_command("spherexlead", SPHEREX_LEAD)? {
            authors.push(lead);
        }
        if let Some(lead) = self.parse_role_command("ipaclead", IPAC_LEAD)? {
            authors.push(lead);
        }

        let author_command = LatexCommand::new("author", [CommandElement::required("body")]);
        let person_command = person_like("person");
        for author in author_command.parse(self.source()) {
            let Some(body) = author.get("body") else {
                continue;
            };
            for person in person_command.parse(body) {
                authors.push(contributor_from(&person)?);
            }
        }

        debug!("parsed {} authors", authors.len());
        Ok(authors)
    }

    /// Collect metadata common to most SPHEREx documents.
    ///
    /// The title is optional here; documents may set it through the build
    /// settings instead. [`SpherexParser::finish`] still requires one.
    pub fn collect_common_metadata(&mut self) -> ExtractionResult<FieldMap> {
        let mut m = FieldMap::new();
        match self.parse_title() {
            Ok(title) => put(&mut m, "title", title)?,
            Err(err) => debug!("{}; expecting a title override", err),
        }
        put_opt(&mut m, "version", self.parse_version())?;
        put(&mut m, "authors", self.parse_authors()?)?;
        put_opt(&mut m, "date_modified", self.parse_date()?)?;
        put_opt(&mut m, "identifier", self.parse_handle())?;
        Ok(m)
    }

    /// Overlay CI and operator-supplied fields and build the record.
    ///
    /// Precedence, lowest first: parsed fields, CI provenance, the canonical
    /// URL setting, then the settings' metadata overrides.
    pub fn finish<M>(self, mut fields: FieldMap) -> ExtractionResult<ExtractionOutput<M>>
    where
        M: DocumentMetadata + DeserializeOwned,
    {
        self.ci.overlay(&mut fields);
        if let Some(url) = self.settings.canonical_url.as_deref().filter(|u| !u.is_empty()) {
            fields.insert("canonical_url".to_string(), url.into());
        }
        for (key, value) in &self.settings.metadata {
            fields.insert(key.clone(), value.clone());
        }

        if !fields.contains_key("title") {
            return Err(ExtractionError::missing("title"));
        }

        let metadata: M = serde_json::from_value(serde_json::Value::Object(fields))
            .map_err(|e| ExtractionError::invalid(e.to_string()))?;
        metadata.validate()?;
        Ok(ExtractionOutput::with_warnings(metadata, self.warnings))
    }
}

/// `\<name>[options]{name}`
fn person_like(name: &str) -> LatexCommand {
    LatexCommand::new(
        name,
        [
            CommandElement::optional("options"),
            CommandElement::required("name"),
        ],
    )
}

fn contributor_from(inv: &CommandInvocation) -> ExtractionResult<Contributor> {
    let name = convert_tex_span(inv.get("name").unwrap_or_default())?;
    let options = inv.get("options").map(KvOptionMap::parse).unwrap_or_default();
    Ok(Contributor::new(name).with_email(options.email()))
}

/// Insert a field value.
pub fn put(fields: &mut FieldMap, key: &str, value: impl Serialize) -> ExtractionResult<()> {
    let value = serde_json::to_value(value).map_err(|e| ExtractionError::invalid(e.to_string()))?;
    fields.insert(key.to_string(), value);
    Ok(())
}

/// Insert a field value only when present.
pub fn put_opt<T: Serialize>(fields: &mut FieldMap, key: &str, value: Option<T>) -> ExtractionResult<()> {
    match value {
        Some(v) => put(fields, key, v),
        None => Ok(()),
    }
}

lazy_static! {
    /// `hh[:mm[:ss[.fff]]]` with an optional `Z` or `+hh[:mm]` offset.
    static ref ISO_TIME: Regex =
        Regex::new(r"^\d{2}(?::?\d{2}(?::?\d{2}(?:[.,]\d+)?)?)?(?:Z|[+-]\d{2}(?::?\d{2})?)?$")
            .expect("ISO time pattern is valid");
}

/// Permissive ISO 8601 date parsing; only the calendar date is kept.
///
/// Reduced-precision forms are accepted: `YYYY-MM` and `YYYY` take the first
/// day, and the time part may stop after the hour.
pub fn parse_iso_date(value: &str) -> Option<NaiveDate> {
    let value = value.trim();
    if !value.is_ascii() {
        return None;
    }
    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.date_naive());
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%z", "%Y-%m-%dT%H:%M%z"] {
        if let Ok(dt) = DateTime::parse_from_str(value, fmt) {
            return Some(dt.date_naive());
        }
    }
    for fmt in [
        "%Y-%m-%dT%H:%M:%S",
        "%Y-%m-%dT%H:%M:%S%.f",
        "%Y-%m-%dT%H:%M",
        "%Y-%m-%d %H:%M:%S",
    ] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(dt.date());
        }
    }

    let date = match value.split_once('T') {
        Some((date, time)) if ISO_TIME.is_match(time) => date,
        Some(_) => return None,
        None => value,
    };
    parse_calendar_date(date)
}

/// `YYYY-MM-DD`, `YYYYMMDD`, `YYYY-MM` or `YYYY`. Expects ASCII input.
fn parse_calendar_date(value: &str) -> Option<NaiveDate> {
    if let Ok(date) = NaiveDate::parse_from_str(value, "%Y-%m-%d") {
        return Some(date);
    }
    let digits = |s: &str| s.bytes().all(|b| b.is_ascii_digit());
    match value.len() {
        8 if digits(value) => ymd(&value[0..4], &value[4..6], &value[6..8]),
        7 if value.as_bytes()[4] == b'-' && digits(&value[..4]) && digits(&value[5..]) => {
            ymd(&value[0..4], &value[5..7], "1")
        }
        4 if digits(value) => ymd(value, "1", "1"),
        _ => None,
    }
}

fn ymd(year: &str, month: &str, day: &str) -> Option<NaiveDate> {
    NaiveDate::from_ymd_opt(year.parse().ok()?, month.parse().ok()?, day.parse().ok()?)
}
