//! Constants used throughout the portal core crate.

/// Default location of the organization directory dump when none is configured.
pub const DEFAULT_ORG_BUNDLE_PATH: &str = "organizations.json";

/// Environment variable naming the organization directory dump.
pub const ORG_BUNDLE_PATH_ENV: &str = "ORG_BUNDLE_PATH";

/// Environment variable holding the system default locale.
pub const DEFAULT_LOCALE_ENV: &str = "PORTAL_DEFAULT_LOCALE";

/// Environment variable selecting whether consents are recorded against top-level orgs.
pub const CONSENT_WITH_TOP_LEVEL_ORG_ENV: &str = "CONSENT_WITH_TOP_LEVEL_ORG";
