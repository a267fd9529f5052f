//! Derive a patient's communication languages from their organizations.

use crate::hierarchy::OrgHierarchy;
use fhir::{Coding, CommunicationData, OrgExtension};
use portal_types::{LanguageCode, OrgId};

impl OrgHierarchy {
    /// Communication entries implied by the selected organizations.
    ///
    /// For each selected organization (skipping `OrgId::NONE` and unknown ids): a direct
    /// language yields one BCP-47 coding; otherwise each language extension with codings
    /// yields an entry. When nothing is found, `default_locale` (if any) is used.
    pub fn communication_for_orgs(
        &self,
        selected: &[OrgId],
        default_locale: Option<&LanguageCode>,
    ) -> Vec<CommunicationData> {
        let mut entries = Vec::new();

        for id in selected {
            if id.is_none() {
                continue;
            }
            let Some(node) = self.get(*id) else {
                continue;
            };

            if let Some(language) = node.language() {
                entries.push(CommunicationData {
                    codings: vec![Coding::bcp47(language, None)],
                });
                continue;
            }

            entries.extend(node.extensions().iter().filter_map(|ext| match ext {
                OrgExtension::Language(codings) if !codings.is_empty() => {
                    Some(CommunicationData {
                        codings: codings.clone(),
                    })
                }
                _ => None,
            }));
        }

        if entries.is_empty() {
            if let Some(locale) = default_locale {
                entries.push(CommunicationData {
                    codings: vec![Coding::bcp47(locale, None)],
                });
            }
        }

        entries
    }
}
