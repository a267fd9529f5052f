//! FHIR-aligned organization wire models and translation helpers.
//!
//! This module provides both domain-level types and wire models for the organization
//! directory, which lists every clinic, site and top-level program a patient may be
//! affiliated with.
//!
//! Responsibilities:
//! - Define public domain-level types for external API use
//! - Define a lenient wire model for serialisation/deserialisation
//! - Resolve extensions and identifiers into typed variants once, at parse time
//! - Skip (and count) entries that do not describe a usable organization
//!
//! Notes:
//! - Unknown keys are ignored; the directory service adds fields freely
//! - `partOf.reference` is resolved to the trailing id segment (`api/organization/12` -> 12)

use crate::{
    FhirError, FhirResult, LANGUAGE_EXTENSION_URL, PRACTICE_REGION_SYSTEM, TIMEZONE_EXTENSION_URL,
};
use portal_types::{LanguageCode, OrgId};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::path::Path;

// ============================================================================
// Public domain-level types
// ============================================================================

/// Purpose of an identifier.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum IdentifierUse {
    Usual,
    Official,
    Temp,
    Secondary,
}

impl IdentifierUse {
    /// Convert to FHIR wire format string.
    fn to_wire(self) -> &'static str {
        match self {
            IdentifierUse::Usual => "usual",
            IdentifierUse::Official => "official",
            IdentifierUse::Temp => "temp",
            IdentifierUse::Secondary => "secondary",
        }
    }

    /// Parse from FHIR wire format string.
    fn from_wire(s: &str) -> Option<Self> {
        match s {
            "usual" => Some(IdentifierUse::Usual),
            "official" => Some(IdentifierUse::Official),
            "temp" => Some(IdentifierUse::Temp),
            "secondary" => Some(IdentifierUse::Secondary),
            _ => None,
        }
    }
}

/// A single code from a terminology system.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Coding {
    pub system: Option<String>,
    pub code: String,
    pub display: Option<String>,
}

impl Coding {
    /// A BCP-47 language coding for `code`.
    pub fn bcp47(code: &LanguageCode, display: Option<String>) -> Self {
        Self {
            system: Some(crate::BCP47_SYSTEM.to_string()),
            code: code.as_str().to_string(),
            display,
        }
    }
}

/// A `(system, value)` identifier attached to an organization.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Identifier {
    pub system: String,
    pub value: String,
    pub use_type: Option<IdentifierUse>,
}

impl Identifier {
    pub fn new(system: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            system: system.into(),
            value: value.into(),
            use_type: None,
        }
    }

    /// True for a practice-region identifier that carries a value.
    pub fn is_practice_region(&self) -> bool {
        self.system == PRACTICE_REGION_SYSTEM && !self.value.is_empty()
    }

    /// Region encoded by a practice-region identifier (`state:CA` -> `CA`).
    ///
    /// Returns `None` for identifiers from any other system, or when the value carries no
    /// `:`-separated region.
    pub fn practice_region(&self) -> Option<&str> {
        if self.system != PRACTICE_REGION_SYSTEM {
            return None;
        }
        self.value.split(':').nth(1).filter(|region| !region.is_empty())
    }
}

/// Organization extension, resolved by URL into a typed variant.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum OrgExtension {
    /// Language codings the organization's members communicate in.
    Language(Vec<Coding>),
    /// Timezone name, e.g. `Australia/Sydney`.
    Timezone(String),
    /// Any other extension, carried through untouched.
    Other { url: String, raw: Value },
}

impl OrgExtension {
    pub fn url(&self) -> &str {
        match self {
            OrgExtension::Language(_) => LANGUAGE_EXTENSION_URL,
            OrgExtension::Timezone(_) => TIMEZONE_EXTENSION_URL,
            OrgExtension::Other { url, .. } => url,
        }
    }
}

/// Domain-level carrier for one organization entry of the directory.
///
/// `id` is optional because the directory may return entries without one; consumers that
/// build hierarchies skip those entries rather than failing.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct OrganizationRecord {
    pub id: Option<OrgId>,
    pub name: String,
    pub part_of: Option<OrgId>,
    pub extensions: Vec<OrgExtension>,
    pub identifiers: Vec<Identifier>,
    pub language: Option<LanguageCode>,
}

impl OrganizationRecord {
    pub fn new(id: OrgId, name: impl Into<String>) -> Self {
        Self {
            id: Some(id),
            name: name.into(),
            ..Self::default()
        }
    }

    pub fn with_parent(mut self, parent: OrgId) -> Self {
        self.part_of = Some(parent);
        self
    }

    pub fn with_language(mut self, language: LanguageCode) -> Self {
        self.language = Some(language);
        self
    }

    pub fn with_extension(mut self, extension: OrgExtension) -> Self {
        self.extensions.push(extension);
        self
    }

    pub fn with_identifier(mut self, identifier: Identifier) -> Self {
        self.identifiers.push(identifier);
        self
    }
}

/// Result of parsing a directory bundle.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrganizationBundle {
    /// Usable organization records, in bundle order.
    pub records: Vec<OrganizationRecord>,
    /// Number of entries that were not usable organizations.
    pub skipped: usize,
}

/// Serialisation format of a bundle document.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BundleFormat {
    Json,
    Yaml,
}

impl BundleFormat {
    /// Pick a format from a file extension; anything other than `.yaml`/`.yml` is JSON.
    pub fn from_path(path: &Path) -> Self {
        match path.extension().and_then(|ext| ext.to_str()) {
            Some(ext) if ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml") => {
                BundleFormat::Yaml
            }
            _ => BundleFormat::Json,
        }
    }
}

// ============================================================================
// Public Organization operations
// ============================================================================

/// Organization directory operations.
///
/// This is a zero-sized type used for namespacing organization-related operations.
/// All methods are associated functions.
pub struct Organization;

impl Organization {
    /// Parse a directory bundle (`{"resourceType": "Bundle", "entry": [...]}`).
    ///
    /// Entries may be bare organizations or wrapped as `{"resource": {...}}`. Entries that do
    /// not deserialise as an organization, or whose `partOf` reference has no numeric id, are
    /// counted in [`OrganizationBundle::skipped`].
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if:
    /// - the text is not a JSON/YAML document of the bundle shape (the error carries the path
    ///   of the failing field),
    /// - resourceType is present and is not "Bundle".
    pub fn parse_bundle(text: &str, format: BundleFormat) -> FhirResult<OrganizationBundle> {
        let wire = match format {
            BundleFormat::Json => {
                let mut deserializer = serde_json::Deserializer::from_str(text);
                deserialize_bundle(&mut deserializer)?
            }
            BundleFormat::Yaml => deserialize_bundle(serde_yaml::Deserializer::from_str(text))?,
        };

        if let Some(resource_type) = wire.resource_type.as_deref() {
            if resource_type != "Bundle" {
                return Err(FhirError::InvalidInput(format!(
                    "Expected resourceType 'Bundle', got '{resource_type}'"
                )));
            }
        }

        let mut bundle = OrganizationBundle::default();
        for entry in wire.entry.unwrap_or_default() {
            match entry_to_record(entry) {
                Some(record) => bundle.records.push(record),
                None => bundle.skipped += 1,
            }
        }
        Ok(bundle)
    }

    /// Render organization records as a bundle document.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    pub fn render_bundle(
        records: &[OrganizationRecord],
        format: BundleFormat,
    ) -> FhirResult<String> {
        let wire = BundleWire {
            resource_type: Some("Bundle".to_string()),
            entry: Some(
                records
                    .iter()
                    .map(|record| serde_json::to_value(domain_to_wire(record)))
                    .collect::<Result<Vec<_>, _>>()?,
            ),
        };

        match format {
            BundleFormat::Json => serde_json::to_string_pretty(&wire).map_err(|e| {
                FhirError::Translation(format!("Failed to serialise organization bundle: {e}"))
            }),
            BundleFormat::Yaml => serde_yaml::to_string(&wire).map_err(|e| {
                FhirError::Translation(format!("Failed to serialise organization bundle: {e}"))
            }),
        }
    }
}

// ============================================================================
// Wire types (internal)
// ============================================================================

#[derive(Clone, Debug, Deserialize, Serialize)]
struct BundleWire {
    #[serde(rename = "resourceType", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub entry: Option<Vec<Value>>,
}

#[derive(Clone, Debug, Default, Deserialize, Serialize)]
struct OrganizationWire {
    #[serde(rename = "resourceType", default, skip_serializing_if = "Option::is_none")]
    pub resource_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub id: Option<OrgId>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,

    #[serde(rename = "partOf", default, skip_serializing_if = "Option::is_none")]
    pub part_of: Option<ReferenceWire>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<Vec<Value>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub identifier: Option<Vec<IdentifierWire>>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub language: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct ReferenceWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reference: Option<String>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct IdentifierWire {
    #[serde(rename = "use", default, skip_serializing_if = "Option::is_none")]
    pub use_type: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<Value>,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
pub(crate) struct CodingWire {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub system: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub code: Option<String>,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub display: Option<String>,
}

impl CodingWire {
    pub(crate) fn from_domain(coding: &Coding) -> Self {
        Self {
            system: coding.system.clone(),
            code: Some(coding.code.clone()),
            display: coding.display.clone(),
        }
    }

    fn into_domain(self) -> Option<Coding> {
        let code = self.code.filter(|c| !c.trim().is_empty())?;
        Some(Coding {
            system: self.system,
            code,
            display: self.display,
        })
    }
}

// ============================================================================
// Helper functions (internal)
// ============================================================================

fn deserialize_bundle<'de, D>(deserializer: D) -> FhirResult<BundleWire>
where
    D: serde::Deserializer<'de>,
{
    serde_path_to_error::deserialize::<_, BundleWire>(deserializer).map_err(|err| {
        let path = err.path().to_string();
        let source = err.into_inner();
        let path = if path.is_empty() {
            "<root>"
        } else {
            path.as_str()
        };
        FhirError::Translation(format!(
            "Organization bundle schema mismatch at {path}: {source}"
        ))
    })
}

/// Unwrap `{"resource": {...}}` entries and translate one organization.
fn entry_to_record(entry: Value) -> Option<OrganizationRecord> {
    let resource = match entry {
        Value::Object(mut map) if map.contains_key("resource") => map.remove("resource")?,
        other => other,
    };

    let wire: OrganizationWire = serde_json::from_value(resource).ok()?;
    if let Some(resource_type) = wire.resource_type.as_deref() {
        if resource_type != "Organization" {
            return None;
        }
    }
    wire_to_domain(wire).ok()
}

fn wire_to_domain(wire: OrganizationWire) -> FhirResult<OrganizationRecord> {
    let part_of = match wire.part_of.and_then(|p| p.reference) {
        Some(reference) => Some(OrgId::from_reference(&reference).map_err(|e| {
            FhirError::Translation(format!("Invalid partOf reference '{reference}': {e}"))
        })?),
        None => None,
    };

    let language = wire
        .language
        .as_deref()
        .and_then(|code| LanguageCode::new(code).ok());

    let identifiers = wire
        .identifier
        .unwrap_or_default()
        .into_iter()
        .filter_map(identifier_to_domain)
        .collect();

    let extensions = wire
        .extension
        .unwrap_or_default()
        .into_iter()
        .filter_map(extension_to_domain)
        .collect();

    Ok(OrganizationRecord {
        id: wire.id,
        name: wire.name.unwrap_or_default(),
        part_of,
        extensions,
        identifiers,
        language,
    })
}

fn identifier_to_domain(wire: IdentifierWire) -> Option<Identifier> {
    let system = wire.system?;
    let value = match wire.value? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        _ => return None,
    };
    Some(Identifier {
        system,
        value,
        use_type: wire.use_type.as_deref().and_then(IdentifierUse::from_wire),
    })
}

fn extension_to_domain(raw: Value) -> Option<OrgExtension> {
    let url = raw.get("url")?.as_str()?.to_string();

    match url.as_str() {
        LANGUAGE_EXTENSION_URL => {
            let codings = raw
                .get("valueCodeableConcept")
                .and_then(|concept| concept.get("coding"))
                .cloned()
                .and_then(|coding| serde_json::from_value::<Vec<CodingWire>>(coding).ok())
                .unwrap_or_default()
                .into_iter()
                .filter_map(CodingWire::into_domain)
                .collect();
            Some(OrgExtension::Language(codings))
        }
        TIMEZONE_EXTENSION_URL => match raw.get("timezone").and_then(Value::as_str) {
            Some(tz) if !tz.trim().is_empty() => Some(OrgExtension::Timezone(tz.to_string())),
            _ => Some(OrgExtension::Other { url, raw }),
        },
        _ => Some(OrgExtension::Other { url, raw }),
    }
}

fn extension_to_wire(extension: &OrgExtension) -> Value {
    match extension {
        OrgExtension::Language(codings) => serde_json::json!({
            "url": LANGUAGE_EXTENSION_URL,
            "valueCodeableConcept": {
                "coding": codings.iter().map(CodingWire::from_domain).collect::<Vec<_>>(),
            },
        }),
        OrgExtension::Timezone(tz) => serde_json::json!({
            "url": TIMEZONE_EXTENSION_URL,
            "timezone": tz,
        }),
        OrgExtension::Other { raw, .. } => raw.clone(),
    }
}

fn domain_to_wire(record: &OrganizationRecord) -> OrganizationWire {
    let reference = |id: OrgId| ReferenceWire {
        reference: Some(format!("api/organization/{id}")),
    };

    OrganizationWire {
        resource_type: Some("Organization".to_string()),
        id: record.id,
        name: Some(record.name.clone()),
        part_of: record.part_of.map(reference),
        extension: (!record.extensions.is_empty())
            .then(|| record.extensions.iter().map(extension_to_wire).collect()),
        identifier: (!record.identifiers.is_empty()).then(|| {
            record
                .identifiers
                .iter()
                .map(|i| IdentifierWire {
                    use_type: i.use_type.map(|u| u.to_wire().to_string()),
                    system: Some(i.system.clone()),
                    value: Some(Value::String(i.value.clone())),
                })
                .collect()
        }),
        language: record.language.as_ref().map(|l| l.as_str().to_string()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SAMPLE_BUNDLE: &str = r#"{
  "resourceType": "Bundle",
  "total": 4,
  "entry": [
    {"resourceType": "Organization", "id": 0, "name": "none of the above"},
    {"resourceType": "Organization", "id": 1, "name": "TrueNTH Global Registry",
     "language": "en_US",
     "identifier": [
       {"system": "http://us.truenth.org/identity-codes/practice-region", "value": "state:CA", "use": "secondary"}
     ]},
    {"resourceType": "Organization", "id": 2, "name": "Sydney Clinic",
     "partOf": {"reference": "api/organization/1"},
     "extension": [
       {"url": "http://hl7.org/fhir/valueset/languages",
        "valueCodeableConcept": {"coding": [{"system": "urn:ietf:bcp:47", "code": "en_AU", "display": "Australian English"}]}},
       {"url": "http://hl7.org/fhir/StructureDefinition/user-timezone", "timezone": "Australia/Sydney"},
       {"url": "http://example.org/custom", "valueString": "kept"}
     ]},
    {"resource": {"resourceType": "Organization", "id": "3", "name": "Wrapped",
                  "partOf": {"reference": "api/organization/2"}}}
  ]
}"#;

    #[test]
    fn parses_sample_bundle() {
        let bundle =
            Organization::parse_bundle(SAMPLE_BUNDLE, BundleFormat::Json).expect("parse bundle");
        assert_eq!(bundle.skipped, 0);
        assert_eq!(bundle.records.len(), 4);

        let ids: Vec<_> = bundle.records.iter().map(|r| r.id).collect();
        assert_eq!(
            ids,
            vec![
                Some(OrgId::NONE),
                Some(OrgId::new(1)),
                Some(OrgId::new(2)),
                Some(OrgId::new(3))
            ]
        );

        assert_eq!(bundle.records[2].part_of, Some(OrgId::new(1)));
        assert_eq!(bundle.records[3].part_of, Some(OrgId::new(2)));
        assert_eq!(bundle.records[3].name, "Wrapped");
    }

    #[test]
    fn resolves_typed_extensions_and_identifiers() {
        let bundle =
            Organization::parse_bundle(SAMPLE_BUNDLE, BundleFormat::Json).expect("parse bundle");

        let registry = &bundle.records[1];
        assert_eq!(
            registry.language.as_ref().map(LanguageCode::as_str),
            Some("en_US")
        );
        assert_eq!(registry.identifiers[0].practice_region(), Some("CA"));
        assert_eq!(
            registry.identifiers[0].use_type,
            Some(IdentifierUse::Secondary)
        );

        let clinic = &bundle.records[2];
        assert_eq!(clinic.extensions.len(), 3);
        match &clinic.extensions[0] {
            OrgExtension::Language(codings) => {
                assert_eq!(codings.len(), 1);
                assert_eq!(codings[0].code, "en_AU");
                assert_eq!(codings[0].display.as_deref(), Some("Australian English"));
            }
            other => panic!("expected language extension, got {other:?}"),
        }
        assert_eq!(
            clinic.extensions[1],
            OrgExtension::Timezone("Australia/Sydney".into())
        );
        assert_eq!(clinic.extensions[2].url(), "http://example.org/custom");
    }

    #[test]
    fn skips_unusable_entries() {
        let input = r#"{
  "entry": [
    {"id": 1, "name": "Good"},
    {"id": "not-a-number", "name": "Bad id"},
    {"id": 5, "name": "Bad parent", "partOf": {"reference": "api/organization/xyz"}},
    {"resourceType": "Patient", "id": 9},
    42
  ]
}"#;

        let bundle = Organization::parse_bundle(input, BundleFormat::Json).expect("parse bundle");
        assert_eq!(bundle.records.len(), 1);
        assert_eq!(bundle.skipped, 4);
    }

    #[test]
    fn keeps_entries_without_id() {
        let input = r#"{"entry": [{"name": "Anonymous"}]}"#;
        let bundle = Organization::parse_bundle(input, BundleFormat::Json).expect("parse bundle");
        assert_eq!(bundle.records.len(), 1);
        assert!(bundle.records[0].id.is_none());
    }

    #[test]
    fn blank_language_is_ignored() {
        let input = r#"{"entry": [{"id": 4, "name": "Clinic", "language": "  "}]}"#;
        let bundle = Organization::parse_bundle(input, BundleFormat::Json).expect("parse bundle");
        assert!(bundle.records[0].language.is_none());
    }

    #[test]
    fn rejects_invalid_resource_type() {
        let input = r#"{"resourceType": "Patient", "entry": []}"#;
        let err = Organization::parse_bundle(input, BundleFormat::Json)
            .expect_err("should reject resourceType");
        match err {
            FhirError::InvalidInput(msg) => {
                assert!(msg.contains("Bundle"));
                assert!(msg.contains("Patient"));
            }
            other => panic!("expected InvalidInput error, got {other:?}"),
        }
    }

    #[test]
    fn reports_path_of_structural_mismatch() {
        let input = r#"{"resourceType": "Bundle", "entry": "not a list"}"#;
        let err = Organization::parse_bundle(input, BundleFormat::Json)
            .expect_err("should reject non-list entry");
        match err {
            FhirError::Translation(msg) => assert!(msg.contains("entry")),
            other => panic!("expected Translation error, got {other:?}"),
        }
    }

    #[test]
    fn malformed_yaml_is_a_translation_error() {
        let input = "resourceType: Bundle\nentry: [unterminated\n";
        let err = Organization::parse_bundle(input, BundleFormat::Yaml)
            .expect_err("should reject malformed yaml");
        assert!(matches!(err, FhirError::Translation(_)));
    }

    #[test]
    fn parses_yaml_bundle() {
        let input = r#"resourceType: Bundle
entry:
  - id: 10
    name: Program
  - id: 11
    name: Site
    partOf:
      reference: Organization/10
"#;

        let bundle = Organization::parse_bundle(input, BundleFormat::Yaml).expect("parse yaml");
        assert_eq!(bundle.records.len(), 2);
        assert_eq!(bundle.records[1].part_of, Some(OrgId::new(10)));
    }

    #[test]
    fn renders_bundle_with_reference_and_extensions() {
        let record = OrganizationRecord::new(OrgId::new(2), "Sydney Clinic")
            .with_parent(OrgId::new(1))
            .with_extension(OrgExtension::Timezone("Australia/Sydney".into()))
            .with_identifier(Identifier::new(PRACTICE_REGION_SYSTEM, "state:NSW"));

        let json = Organization::render_bundle(std::slice::from_ref(&record), BundleFormat::Json)
            .expect("render bundle");
        assert!(json.contains("\"resourceType\": \"Bundle\""));
        assert!(json.contains("api/organization/1"));
        assert!(json.contains("Australia/Sydney"));

        let reparsed = Organization::parse_bundle(&json, BundleFormat::Json).expect("reparse");
        assert_eq!(reparsed.records, vec![record]);
    }

    #[test]
    fn picks_format_from_extension() {
        assert_eq!(
            BundleFormat::from_path(Path::new("orgs.yaml")),
            BundleFormat::Yaml
        );
        assert_eq!(
            BundleFormat::from_path(Path::new("orgs.YML")),
            BundleFormat::Yaml
        );
        assert_eq!(
            BundleFormat::from_path(Path::new("orgs.json")),
            BundleFormat::Json
        );
    }
}
