//! Which organizations the form renderer should hide for a set of permitted leaf clinics.
//!
//! The renderer paints one checkbox per organization, grouped under their parents. When only
//! some clinics may be chosen, every other checkbox is hidden, leaf labels go with their
//! checkboxes, and a group disappears once nothing inside it remains selectable.

use crate::hierarchy::OrgHierarchy;
use crate::HierarchyResult;
use portal_types::OrgId;
use std::collections::{BTreeSet, HashSet};

/// Hidden elements computed by [`OrgHierarchy::filter_orgs`].
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct OrgVisibility {
    /// Organizations whose checkbox is hidden (every id not in the allowed set).
    pub hidden_checkboxes: BTreeSet<OrgId>,
    /// Hidden leaf organizations whose whole label is hidden as well.
    pub hidden_labels: BTreeSet<OrgId>,
    /// Organizations with children whose group (legend/container) is hidden because no
    /// organization in their subtree is allowed.
    pub hidden_groups: BTreeSet<OrgId>,
}

impl OrgVisibility {
    pub fn is_checkbox_visible(&self, id: OrgId) -> bool {
        !self.hidden_checkboxes.contains(&id)
    }

    pub fn is_group_visible(&self, id: OrgId) -> bool {
        !self.hidden_groups.contains(&id)
    }
}

impl OrgHierarchy {
    /// Compute what to hide when only `allowed_leaf_ids` may be selected.
    ///
    /// Returns `Ok(None)` when `allowed_leaf_ids` is empty, meaning no filtering applies.
    ///
    /// # Errors
    ///
    /// Returns [`crate::HierarchyError::CyclicHierarchy`] if a subtree is cyclic.
    pub fn filter_orgs(&self, allowed_leaf_ids: &[OrgId]) -> HierarchyResult<Option<OrgVisibility>> {
        if allowed_leaf_ids.is_empty() {
            return Ok(None);
        }
        let allowed: HashSet<OrgId> = allowed_leaf_ids.iter().copied().collect();

        let mut visibility = OrgVisibility::default();
        for (id, node) in self.orgs_list() {
            if allowed.contains(id) {
                continue;
            }
            visibility.hidden_checkboxes.insert(*id);
            if node.is_leaf() {
                visibility.hidden_labels.insert(*id);
                continue;
            }

            let any_allowed_below = self
                .child_orgs(std::slice::from_ref(id))?
                .iter()
                .any(|descendant| allowed.contains(descendant));
            if !any_allowed_below {
                visibility.hidden_groups.insert(*id);
            }
        }

        Ok(Some(visibility))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use fhir::OrganizationRecord;

    fn org(id: u64, name: &str) -> OrganizationRecord {
        OrganizationRecord::new(OrgId::new(id), name)
    }

    fn child(id: u64, name: &str, parent: u64) -> OrganizationRecord {
        org(id, name).with_parent(OrgId::new(parent))
    }

    fn set(values: &[u64]) -> BTreeSet<OrgId> {
        values.iter().copied().map(OrgId::new).collect()
    }

    fn sample() -> OrgHierarchy {
        OrgHierarchy::from_records(&[
            org(1, "Program A"),
            child(10, "Region A1", 1),
            child(100, "Clinic A1a", 10),
            child(101, "Clinic A1b", 10),
            child(11, "Clinic A2", 1),
            org(2, "Program B"),
            child(20, "Clinic B1", 2),
        ])
    }

    #[test]
    fn empty_allowed_set_means_no_filtering() {
        assert_eq!(sample().filter_orgs(&[]).unwrap(), None);
    }

    #[test]
    fn hides_everything_outside_allowed_subtrees() {
        let visibility = sample()
            .filter_orgs(&[OrgId::new(100)])
            .unwrap()
            .expect("filtering applies");

        assert_eq!(
            visibility.hidden_checkboxes,
            set(&[1, 2, 10, 11, 20, 101])
        );
        assert_eq!(visibility.hidden_labels, set(&[11, 20, 101]));
        assert_eq!(visibility.hidden_groups, set(&[2]));

        assert!(visibility.is_checkbox_visible(OrgId::new(100)));
        assert!(visibility.is_group_visible(OrgId::new(1)));
        assert!(visibility.is_group_visible(OrgId::new(10)));
        assert!(!visibility.is_group_visible(OrgId::new(2)));
    }

    #[test]
    fn allowed_parent_keeps_its_group_visible() {
        let visibility = sample()
            .filter_orgs(&[OrgId::new(2)])
            .unwrap()
            .expect("filtering applies");

        assert!(visibility.is_checkbox_visible(OrgId::new(2)));
        assert!(visibility.is_group_visible(OrgId::new(2)));
        assert!(visibility.hidden_groups.contains(&OrgId::new(1)));
        assert!(visibility.hidden_groups.contains(&OrgId::new(10)));
    }
}
