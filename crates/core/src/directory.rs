//! Access to the organization directory.
//!
//! The directory service owns organization data; the hierarchy only consumes its flat listing
//! through [`OrganizationDirectory`]. [`FileDirectory`] reads a bundle dumped to disk (JSON or
//! YAML, chosen by file extension).

use crate::config::CoreConfig;
use crate::hierarchy::{IngestReport, OrgHierarchy};
use crate::{HierarchyError, HierarchyResult};
use fhir::{BundleFormat, Organization, OrganizationBundle};
use std::path::{Path, PathBuf};

/// Source of the flat organization listing.
pub trait OrganizationDirectory {
    /// Fetch the current organization bundle.
    fn fetch(&self) -> HierarchyResult<OrganizationBundle>;
}

/// Directory backed by a bundle file.
#[derive(Clone, Debug)]
pub struct FileDirectory {
    path: PathBuf,
}

impl FileDirectory {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn from_config(cfg: &CoreConfig) -> Self {
        Self::new(cfg.org_bundle_path())
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl OrganizationDirectory for FileDirectory {
    fn fetch(&self) -> HierarchyResult<OrganizationBundle> {
        let text = std::fs::read_to_string(&self.path).map_err(|source| HierarchyError::Directory {
            path: self.path.clone(),
            source,
        })?;

        let bundle = Organization::parse_bundle(&text, BundleFormat::from_path(&self.path))?;
        if bundle.skipped > 0 {
            tracing::warn!(
                path = %self.path.display(),
                skipped = bundle.skipped,
                "organization bundle contained unusable entries"
            );
        }
        Ok(bundle)
    }
}

impl OrgHierarchy {
    /// Fetch from `directory` and ingest on top of the current forest.
    ///
    /// Bundle entries the wire layer could not use are added to the report's `skipped` count.
    ///
    /// # Errors
    ///
    /// Returns the directory's error; the forest is left untouched in that case.
    pub fn load_from(&mut self, directory: &dyn OrganizationDirectory) -> HierarchyResult<IngestReport> {
        let bundle = directory.fetch()?;
        Ok(self.ingest_bundle(&bundle))
    }

    /// Fetch from `directory` and rebuild the forest from scratch.
    ///
    /// The current forest is only discarded once the fetch has succeeded.
    ///
    /// # Errors
    ///
    /// Returns the directory's error; the forest is left untouched in that case.
    pub fn reload_from(
        &mut self,
        directory: &dyn OrganizationDirectory,
    ) -> HierarchyResult<IngestReport> {
        let bundle = directory.fetch()?;
        Ok(self.replace_with(&bundle))
    }

    /// Ingest an already fetched bundle on top of the current forest.
    ///
    /// Bundle entries the wire layer could not use are added to the report's `skipped` count.
    pub fn ingest_bundle(&mut self, bundle: &OrganizationBundle) -> IngestReport {
        let mut report = self.ingest(&bundle.records);
        report.skipped += bundle.skipped;
        report
    }

    /// Discard the current forest and rebuild it from an already fetched bundle.
    pub fn replace_with(&mut self, bundle: &OrganizationBundle) -> IngestReport {
        self.reset();
        self.ingest_bundle(bundle)
    }
}
