//! # Portal Core
//!
//! Organization hierarchy logic for the patient portal.
//!
//! This crate contains pure in-memory operations over the organization directory:
//! - building a forest from the directory's flat `Organization` listing
//! - ancestor and descendant queries (top-level programs, "here and below" selections)
//! - derived answers used by the form renderer and consent listings (visibility filtering,
//!   communication languages, consent display organizations)
//!
//! **No API concerns**: HTTP servers and command-line handling belong in the `portal-run` and
//! `portal-cli` binaries. The hierarchy is a plain value owned by its caller; multi-threaded
//! callers wrap it in a lock.

pub mod communication;
pub mod config;
pub mod consent;
pub mod constants;
pub mod directory;
pub mod error;
pub mod hierarchy;
pub mod visibility;

pub use config::CoreConfig;
pub use consent::ConsentScope;
pub use constants::DEFAULT_ORG_BUNDLE_PATH;
pub use directory::{FileDirectory, OrganizationDirectory};
pub use error::{HierarchyError, HierarchyResult};
pub use hierarchy::{HierarchyState, IngestReport, OrgHierarchy, OrgNode};
pub use visibility::OrgVisibility;

pub use portal_types::{LanguageCode, OrgId};
