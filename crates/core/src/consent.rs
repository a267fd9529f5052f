//! Organization shown against a consent agreement.
//!
//! Deployments either record consent directly against top-level programs, or against the
//! clinic a patient enrolled at. In the latter case consent listings still show the top-level
//! program, so the clinic's top-level parent is resolved here.

use crate::config::CoreConfig;
use crate::hierarchy::{OrgHierarchy, OrgNode};
use portal_types::OrgId;

/// Where consent agreements are recorded.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ConsentScope {
    /// Consents reference top-level organizations; display them as-is.
    TopLevel,
    /// Consents reference the enrolling organization; display its top-level parent.
    Enrolling,
}

impl ConsentScope {
    pub fn from_config(cfg: &CoreConfig) -> Self {
        if cfg.consent_with_top_level_org() {
            ConsentScope::TopLevel
        } else {
            ConsentScope::Enrolling
        }
    }
}

impl OrgHierarchy {
    /// Organization to display for a consent agreement recorded against `org_id`.
    ///
    /// With [`ConsentScope::Enrolling`], the top-level parent is shown; if that lookup fails
    /// (unknown parent, cyclic data) the organization itself is used. Returns `None` only when
    /// `org_id` itself is unknown.
    pub fn consent_display_org(&self, org_id: OrgId, scope: ConsentScope) -> Option<&OrgNode> {
        match scope {
            ConsentScope::TopLevel => self.get(org_id),
            ConsentScope::Enrolling => match self.top_level_parent_org(org_id) {
                Ok(Some(top)) => self.get(top).or_else(|| self.get(org_id)),
                Ok(None) => self.get(org_id),
                Err(err) => {
                    tracing::warn!(%org_id, error = %err, "falling back to consent organization");
                    self.get(org_id)
                }
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::OrganizationRecord;
    use std::path::PathBuf;

    fn hierarchy() -> OrgHierarchy {
        OrgHierarchy::from_records(&[
            OrganizationRecord::new(OrgId::new(1), "National Program"),
            OrganizationRecord::new(OrgId::new(2), "Clinic").with_parent(OrgId::new(1)),
            OrganizationRecord::new(OrgId::new(5), "Loop A").with_parent(OrgId::new(6)),
            OrganizationRecord::new(OrgId::new(6), "Loop B").with_parent(OrgId::new(5)),
        ])
    }

    #[test]
    fn enrolling_scope_shows_top_level_program() {
        let h = hierarchy();
        let org = h
            .consent_display_org(OrgId::new(2), ConsentScope::Enrolling)
            .expect("known org");
        assert_eq!(org.name(), "National Program");
    }

    #[test]
    fn top_level_scope_shows_org_itself() {
        let h = hierarchy();
        let org = h
            .consent_display_org(OrgId::new(2), ConsentScope::TopLevel)
            .expect("known org");
        assert_eq!(org.name(), "Clinic");
    }

    #[test]
    fn cyclic_parent_falls_back_to_org() {
        let h = hierarchy();
        let org = h
            .consent_display_org(OrgId::new(5), ConsentScope::Enrolling)
            .expect("known org");
        assert_eq!(org.name(), "Loop A");
    }

    #[test]
    fn unknown_org_has_no_display() {
        assert!(hierarchy()
            .consent_display_org(OrgId::new(404), ConsentScope::Enrolling)
            .is_none());
    }

    #[test]
    fn scope_follows_config_flag() {
        let cfg = CoreConfig::new(PathBuf::from("orgs.json"), None, true).unwrap();
        assert_eq!(ConsentScope::from_config(&cfg), ConsentScope::TopLevel);
        let cfg = CoreConfig::new(PathBuf::from("orgs.json"), None, false).unwrap();
        assert_eq!(ConsentScope::from_config(&cfg), ConsentScope::Enrolling);
    }
}
