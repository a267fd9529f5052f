//! FHIR wire/boundary support for the organization directory.
//!
//! This crate provides **wire models** and **format/translation helpers** for the documents the
//! portal exchanges with the organization directory service:
//! - `Organization` bundles (JSON from the REST API, or YAML/JSON dumps on disk)
//! - patient `communication` entries derived from organization languages
//!
//! This crate focuses on:
//! - FHIR semantic alignment (without the REST transport itself)
//! - serialisation/deserialisation
//! - translation between domain primitives and wire structs
//!
//! Unlike a validating parser, bundle parsing is best effort: entries that do not match the
//! organization schema are counted and skipped so a partially broken directory response still
//! yields a usable list.

pub mod communication;
pub mod organization;

// Re-export facades
pub use communication::Communication;
pub use organization::Organization;

// Re-export public domain-level types
pub use communication::CommunicationData;
pub use organization::{
    BundleFormat, Coding, Identifier, IdentifierUse, OrgExtension, OrganizationBundle,
    OrganizationRecord,
};

pub use portal_types::{LanguageCode, OrgId};

/// Extension URL carrying an organization's language codings.
pub const LANGUAGE_EXTENSION_URL: &str = "http://hl7.org/fhir/valueset/languages";

/// Extension URL carrying a timezone name.
pub const TIMEZONE_EXTENSION_URL: &str = "http://hl7.org/fhir/StructureDefinition/user-timezone";

/// Identifier system whose value encodes `state:<region>`.
pub const PRACTICE_REGION_SYSTEM: &str = "http://us.truenth.org/identity-codes/practice-region";

/// Coding system for BCP-47 language tags.
pub const BCP47_SYSTEM: &str = "urn:ietf:bcp:47";

/// Errors returned by the `fhir` boundary crate.
#[derive(Debug, thiserror::Error)]
pub enum FhirError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("invalid JSON: {0}")]
    InvalidJson(#[from] serde_json::Error),

    #[error("translation error: {0}")]
    Translation(String),
}

/// Type alias for Results that can fail with a [`FhirError`].
pub type FhirResult<T> = Result<T, FhirError>;
