//! FHIR-aligned patient communication wire models.
//!
//! A patient's `communication` list records the languages they communicate in. The portal
//! derives it from the organizations a patient is affiliated with; this module only owns the
//! wire shape (`[{"language": {"coding": [...]}}]`).

use crate::organization::{Coding, CodingWire};
use crate::{FhirError, FhirResult};
use serde::{Deserialize, Serialize};

/// Domain-level carrier for one communication entry.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CommunicationData {
    /// Codings of the language; never empty for entries produced by the portal.
    pub codings: Vec<Coding>,
}

/// Patient communication operations.
pub struct Communication;

impl Communication {
    /// Convert communication entries into their JSON wire value.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    pub fn to_value(entries: &[CommunicationData]) -> FhirResult<serde_json::Value> {
        Ok(serde_json::to_value(to_wire(entries))?)
    }

    /// Render communication entries as pretty JSON text.
    ///
    /// # Errors
    ///
    /// Returns [`FhirError`] if serialisation fails.
    pub fn render(entries: &[CommunicationData]) -> FhirResult<String> {
        serde_json::to_string_pretty(&to_wire(entries)).map_err(|e| {
            FhirError::Translation(format!("Failed to serialise communication: {e}"))
        })
    }
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct CommunicationWire {
    pub language: LanguageWire,
}

#[derive(Clone, Debug, Deserialize, Serialize)]
struct LanguageWire {
    pub coding: Vec<CodingWire>,
}

fn to_wire(entries: &[CommunicationData]) -> Vec<CommunicationWire> {
    entries
        .iter()
        .map(|entry| CommunicationWire {
            language: LanguageWire {
                coding: entry.codings.iter().map(CodingWire::from_domain).collect(),
            },
        })
        .collect()
}
