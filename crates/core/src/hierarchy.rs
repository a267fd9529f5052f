//! In-memory organization forest.
//!
//! The directory service returns organizations as a flat list in which each entry may point at
//! a parent through `partOf`. [`OrgHierarchy::ingest`] turns that list into a forest and the
//! query methods answer the questions the portal asks of it:
//!
//! - which organizations are top-level programs,
//! - which organizations sit below (or "here and below") a selection,
//! - which top-level program a clinic ultimately belongs to.
//!
//! ## Ingestion
//!
//! Ingestion is best effort. Records without an id are skipped and counted. Nodes are created
//! for the whole batch before any parent link is made, so children may precede their parents.
//! A parent that is neither in the batch nor already in the forest gets a placeholder node,
//! which is filled in if the parent's own record arrives in a later batch.
//!
//! Re-ingesting is idempotent with respect to ids: nodes, top-level entries and child links are
//! never duplicated. The first parent assignment a node receives is kept; a node first seen as
//! top-level stays top-level.
//!
//! ## Cycles
//!
//! Flat input cannot guarantee acyclicity. Upward and downward walks track the nodes they have
//! visited and fail with [`HierarchyError::CyclicHierarchy`] instead of looping.

use crate::{HierarchyError, HierarchyResult};
use fhir::{Identifier, OrgExtension, OrganizationRecord};
use portal_types::{LanguageCode, OrgId};
use std::collections::{BTreeMap, HashMap, HashSet};

// ============================================================================
// Node
// ============================================================================

/// One organization in the forest.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OrgNode {
    id: OrgId,
    name: String,
    parent_id: Option<OrgId>,
    is_top_level: bool,
    placeholder: bool,
    children: Vec<OrgId>,
    language: Option<LanguageCode>,
    extensions: Vec<OrgExtension>,
    identifiers: Vec<Identifier>,
    region: Option<String>,
}

impl OrgNode {
    fn new(id: OrgId, name: impl Into<String>) -> Self {
        Self {
            id,
            name: name.into(),
            parent_id: None,
            is_top_level: false,
            placeholder: false,
            children: Vec::new(),
            language: None,
            extensions: Vec::new(),
            identifiers: Vec::new(),
            region: None,
        }
    }

    fn placeholder(id: OrgId, name: impl Into<String>) -> Self {
        Self {
            placeholder: true,
            ..Self::new(id, name)
        }
    }

    pub fn id(&self) -> OrgId {
        self.id
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn parent_id(&self) -> Option<OrgId> {
        self.parent_id
    }

    pub fn is_top_level(&self) -> bool {
        self.is_top_level
    }

    /// True while the node exists only because a child referenced it.
    pub fn is_placeholder(&self) -> bool {
        self.placeholder
    }

    /// Child ids in ingestion order.
    pub fn children(&self) -> &[OrgId] {
        &self.children
    }

    pub fn is_leaf(&self) -> bool {
        self.children.is_empty()
    }

    pub fn language(&self) -> Option<&LanguageCode> {
        self.language.as_ref()
    }

    pub fn extensions(&self) -> &[OrgExtension] {
        &self.extensions
    }

    pub fn identifiers(&self) -> &[Identifier] {
        &self.identifiers
    }

    /// Practice region taken from the first practice-region identifier with a value
    /// (`state:CA` -> `CA`). Later identifiers are not consulted even if the first one carries
    /// no region.
    pub fn region(&self) -> Option<&str> {
        self.region.as_deref()
    }

    /// Timezone from the first timezone extension.
    pub fn timezone(&self) -> Option<&str> {
        self.extensions.iter().find_map(|ext| match ext {
            OrgExtension::Timezone(tz) => Some(tz.as_str()),
            _ => None,
        })
    }

    fn set_identifiers(&mut self, identifiers: Vec<Identifier>) {
        self.region = identifiers
            .iter()
            .find(|identifier| identifier.is_practice_region())
            .and_then(Identifier::practice_region)
            .map(str::to_string);
        self.identifiers = identifiers;
    }

    fn apply_record_fields(&mut self, record: &OrganizationRecord) {
        if !record.extensions.is_empty() {
            self.extensions = record.extensions.clone();
        }
        if let Some(language) = &record.language {
            self.language = Some(language.clone());
        }
        if !record.identifiers.is_empty() {
            self.set_identifiers(record.identifiers.clone());
        }
    }

    /// A placeholder met as a real record takes over the record's name.
    fn claim(&mut self, record: &OrganizationRecord) {
        if self.placeholder {
            self.name = record.name.clone();
            self.placeholder = false;
        }
    }
}

// ============================================================================
// Hierarchy
// ============================================================================

/// Whether the hierarchy has been populated.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum HierarchyState {
    #[default]
    Uninitialised,
    Initialised,
}

/// Summary of one ingestion call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct IngestReport {
    /// Records that carried an id and were applied to the forest.
    pub ingested: usize,
    /// Records (or bundle entries) that could not be used.
    pub skipped: usize,
    /// Parent nodes synthesised before (or without) their own record.
    pub placeholders: usize,
}

/// Organization forest built from a flat directory listing.
#[derive(Clone, Debug, Default)]
pub struct OrgHierarchy {
    state: HierarchyState,
    nodes: BTreeMap<OrgId, OrgNode>,
    top_level: Vec<OrgId>,
}

impl OrgHierarchy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a hierarchy from a single batch of records.
    pub fn from_records(records: &[OrganizationRecord]) -> Self {
        let mut hierarchy = Self::new();
        hierarchy.ingest(records);
        hierarchy
    }

    pub fn state(&self) -> HierarchyState {
        self.state
    }

    pub fn is_initialised(&self) -> bool {
        self.state == HierarchyState::Initialised
    }

    /// Drop every node and return to the uninitialised state.
    pub fn reset(&mut self) {
        self.nodes.clear();
        self.top_level.clear();
        self.state = HierarchyState::Uninitialised;
    }

    /// Ingest a flat list of organization records into the forest.
    ///
    /// Runs two passes. The first creates (or claims) a node for every record, applies its
    /// fields and indexes top-level records; the second links every child under its parent, so
    /// the order of records within a batch does not matter. A parent missing from both the
    /// batch and the forest gets a placeholder. See the module docs for the idempotency and
    /// first-assignment rules.
    pub fn ingest(&mut self, records: &[OrganizationRecord]) -> IngestReport {
        let mut report = IngestReport::default();

        // The first record seen for an id in this batch decides whether it is a root.
        let mut first_parent: HashMap<OrgId, Option<OrgId>> = HashMap::new();
        for record in records {
            let Some(id) = record.id else {
                tracing::debug!(name = %record.name, "skipping organization record without id");
                report.skipped += 1;
                continue;
            };
            report.ingested += 1;

            let node = self
                .nodes
                .entry(id)
                .or_insert_with(|| OrgNode::new(id, record.name.clone()));
            node.claim(record);
            node.apply_record_fields(record);

            if first_parent.entry(id).or_insert(record.part_of).is_none() {
                self.mark_top_level(id);
            }
        }

        for record in records {
            if let (Some(id), Some(parent)) = (record.id, record.part_of) {
                self.link(id, parent, &mut report);
            }
        }

        self.state = HierarchyState::Initialised;
        tracing::info!(
            ingested = report.ingested,
            skipped = report.skipped,
            placeholders = report.placeholders,
            total = self.nodes.len(),
            "ingested organization records"
        );
        report
    }

    fn mark_top_level(&mut self, id: OrgId) {
        let Some(node) = self.nodes.get_mut(&id) else {
            return;
        };
        if id.is_none() || node.parent_id.is_some() {
            return;
        }
        node.is_top_level = true;
        if !self.top_level.contains(&id) {
            self.top_level.push(id);
        }
    }

    /// Attach `id` under `parent` unless the node already has a different first assignment,
    /// synthesising the parent if it is not in the forest.
    fn link(&mut self, id: OrgId, parent: OrgId, report: &mut IngestReport) {
        let Some(node) = self.nodes.get(&id) else {
            return;
        };
        if node.is_top_level || node.parent_id.is_some_and(|existing| existing != parent) {
            tracing::debug!(%id, %parent, "keeping first parent assignment");
            return;
        }

        if !self.nodes.contains_key(&parent) {
            tracing::warn!(%id, %parent, "parent organization missing from directory");
            self.nodes
                .insert(parent, OrgNode::placeholder(parent, String::new()));
            report.placeholders += 1;
        }

        if let Some(parent_node) = self.nodes.get_mut(&parent) {
            if !parent_node.children.contains(&id) {
                parent_node.children.push(id);
            }
        }
        if let Some(node) = self.nodes.get_mut(&id) {
            node.parent_id = Some(parent);
        }
    }

    // ------------------------------------------------------------------------
    // Queries
    // ------------------------------------------------------------------------

    /// Read-only view of every node, keyed by id.
    pub fn orgs_list(&self) -> &BTreeMap<OrgId, OrgNode> {
        &self.nodes
    }

    pub fn get(&self, id: OrgId) -> Option<&OrgNode> {
        self.nodes.get(&id)
    }

    pub fn parent_of(&self, id: OrgId) -> Option<OrgId> {
        self.nodes.get(&id).and_then(OrgNode::parent_id)
    }

    pub fn region_of(&self, id: OrgId) -> Option<&str> {
        self.nodes.get(&id).and_then(OrgNode::region)
    }

    /// Top-level organization ids in the order they were first discovered.
    pub fn top_level_orgs(&self) -> Vec<OrgId> {
        self.top_level.clone()
    }

    /// Every node without a parent: top-level organizations in discovery order, then the
    /// parentless placeholders (and the `OrgId::NONE` node, if present) in id order.
    pub fn forest_roots(&self) -> Vec<OrgId> {
        let mut roots = self.top_level.clone();
        roots.extend(
            self.nodes
                .values()
                .filter(|node| node.parent_id.is_none() && !node.is_top_level)
                .map(|node| node.id),
        );
        roots
    }

    /// All descendants of `start` (children, grandchildren, ...), breadth first.
    ///
    /// The start ids themselves are not included unless one is a descendant of another.
    /// Unknown ids contribute nothing.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::CyclicHierarchy`] if a walk from any start id reaches a node it
    /// has already visited.
    pub fn child_orgs(&self, start: &[OrgId]) -> HierarchyResult<Vec<OrgId>> {
        let mut visited: Vec<HashSet<OrgId>> = start.iter().map(|id| HashSet::from([*id])).collect();
        let mut frontier: Vec<(usize, OrgId)> = start.iter().copied().enumerate().collect();
        let mut seen = HashSet::new();
        let mut descendants = Vec::new();

        while !frontier.is_empty() {
            let mut next = Vec::new();
            for (root, id) in frontier {
                let Some(node) = self.nodes.get(&id) else {
                    continue;
                };
                for child in &node.children {
                    if !visited[root].insert(*child) {
                        return Err(HierarchyError::CyclicHierarchy { id: *child });
                    }
                    if seen.insert(*child) {
                        descendants.push(*child);
                    }
                    next.push((root, *child));
                }
            }
            frontier = next;
        }

        Ok(descendants)
    }

    /// Each start id followed by its own descendants.
    ///
    /// Duplicates across different start ids are kept. Returns an empty list before the first
    /// ingest.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::CyclicHierarchy`] if any subtree is cyclic.
    pub fn here_below_orgs(&self, start_ids: &[OrgId]) -> HierarchyResult<Vec<OrgId>> {
        if !self.is_initialised() {
            return Ok(Vec::new());
        }

        let mut here_below = Vec::new();
        for id in start_ids {
            here_below.push(*id);
            here_below.extend(self.child_orgs(std::slice::from_ref(id))?);
        }
        Ok(here_below)
    }

    /// Walk parent links upward from `id` to its top-level organization.
    ///
    /// Returns `Ok(None)` for unknown ids. A node with no parent that is not marked top-level
    /// (for example a placeholder whose record never arrived) is its own top-level parent.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::CyclicHierarchy`] if the parent chain loops.
    pub fn top_level_parent_org(&self, id: OrgId) -> HierarchyResult<Option<OrgId>> {
        let Some(mut node) = self.nodes.get(&id) else {
            return Ok(None);
        };
        let mut visited = HashSet::new();

        loop {
            if !visited.insert(node.id) {
                return Err(HierarchyError::CyclicHierarchy { id: node.id });
            }
            if node.is_top_level {
                return Ok(Some(node.id));
            }
            match node.parent_id {
                None => return Ok(Some(node.id)),
                Some(parent) => match self.nodes.get(&parent) {
                    Some(parent_node) => node = parent_node,
                    None => return Ok(None),
                },
            }
        }
    }

    /// Distinct top-level parents of `ids`, in first-seen order. Unknown ids are dropped.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::CyclicHierarchy`] if any parent chain loops.
    pub fn user_top_level_parent_orgs(&self, ids: &[OrgId]) -> HierarchyResult<Vec<OrgId>> {
        let mut parents = Vec::new();
        for id in ids {
            if let Some(top) = self.top_level_parent_org(*id)? {
                if !parents.contains(&top) {
                    parents.push(top);
                }
            }
        }
        Ok(parents)
    }

    /// Check that every parent chain and every top-level subtree terminates.
    ///
    /// # Errors
    ///
    /// Returns [`HierarchyError::CyclicHierarchy`] naming a node on the first cycle found.
    pub fn validate(&self) -> HierarchyResult<()> {
        for id in self.nodes.keys() {
            self.top_level_parent_org(*id)?;
        }
        self.child_orgs(&self.top_level)?;
        Ok(())
    }

    /// First record in `records` with the given id. `OrgId::NONE` never matches.
    pub fn find_org(records: &[OrganizationRecord], id: OrgId) -> Option<&OrganizationRecord> {
        if id.is_none() {
            return None;
        }
        records.iter().find(|record| record.id == Some(id))
    }

    // ------------------------------------------------------------------------
    // Field-level updates
    // ------------------------------------------------------------------------

    /// Replace a node's extensions in place. Returns `false` for unknown ids.
    pub fn update_extensions(&mut self, id: OrgId, extensions: Vec<OrgExtension>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.extensions = extensions;
                true
            }
            None => false,
        }
    }

    /// Replace a node's direct language in place. Returns `false` for unknown ids.
    pub fn set_language(&mut self, id: OrgId, language: Option<LanguageCode>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.language = language;
                true
            }
            None => false,
        }
    }

    /// Replace a node's identifiers in place, re-deriving its practice region.
    /// Returns `false` for unknown ids.
    pub fn set_identifiers(&mut self, id: OrgId, identifiers: Vec<Identifier>) -> bool {
        match self.nodes.get_mut(&id) {
            Some(node) => {
                node.set_identifiers(identifiers);
                true
            }
            None => false,
        }
    }
}
