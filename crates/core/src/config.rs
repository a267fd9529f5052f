//! Core runtime configuration.
//!
//! This module defines configuration that should be resolved once at process startup and then
//! passed into core services. Services never read process-wide environment variables
//! themselves; binaries read them and hand the raw values to the parsers below.

use crate::constants::DEFAULT_ORG_BUNDLE_PATH;
use crate::{HierarchyError, HierarchyResult};
use portal_types::LanguageCode;
use std::path::{Path, PathBuf};

/// Core configuration resolved at startup.
#[derive(Clone, Debug)]
pub struct CoreConfig {
    org_bundle_path: PathBuf,
    default_locale: Option<LanguageCode>,
    consent_with_top_level_org: bool,
}

impl CoreConfig {
    /// Create a new `CoreConfig`.
    pub fn new(
        org_bundle_path: PathBuf,
        default_locale: Option<LanguageCode>,
        consent_with_top_level_org: bool,
    ) -> HierarchyResult<Self> {
        if org_bundle_path.as_os_str().is_empty() {
            return Err(HierarchyError::InvalidInput(
                "org_bundle_path cannot be empty".into(),
            ));
        }

        Ok(Self {
            org_bundle_path,
            default_locale,
            consent_with_top_level_org,
        })
    }

    pub fn org_bundle_path(&self) -> &Path {
        &self.org_bundle_path
    }

    /// Locale used for patient communication when no selected organization specifies one.
    pub fn default_locale(&self) -> Option<&LanguageCode> {
        self.default_locale.as_ref()
    }

    /// Whether consent agreements are recorded directly against top-level organizations.
    pub fn consent_with_top_level_org(&self) -> bool {
        self.consent_with_top_level_org
    }
}

/// Resolve the organization bundle path from an optional value, falling back to
/// [`DEFAULT_ORG_BUNDLE_PATH`] when unset or blank.
pub fn org_bundle_path_from_env_value(value: Option<String>) -> PathBuf {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
        .map(PathBuf::from)
        .unwrap_or_else(|| PathBuf::from(DEFAULT_ORG_BUNDLE_PATH))
}

/// Parse the default locale from an optional value. Unset or blank means no default.
pub fn default_locale_from_env_value(value: Option<String>) -> Option<LanguageCode> {
    value.and_then(|v| LanguageCode::new(v).ok())
}

/// Parse the consent-with-top-level-org flag from an optional value.
///
/// Accepts `true/false`, `1/0` and `yes/no` (case-insensitive). Unset or blank is `false`.
pub fn consent_with_top_level_org_from_env_value(value: Option<String>) -> HierarchyResult<bool> {
    let value = value
        .map(|v| v.trim().to_ascii_lowercase())
        .filter(|v| !v.is_empty());

    match value.as_deref() {
        None => Ok(false),
        Some("true" | "1" | "yes") => Ok(true),
        Some("false" | "0" | "no") => Ok(false),
        Some(other) => Err(HierarchyError::InvalidInput(format!(
            "CONSENT_WITH_TOP_LEVEL_ORG must be a boolean, got '{other}'"
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejects_empty_bundle_path() {
        let err = CoreConfig::new(PathBuf::new(), None, false).expect_err("empty path");
        assert!(matches!(err, HierarchyError::InvalidInput(_)));
    }

    #[test]
    fn bundle_path_defaults_when_blank() {
        assert_eq!(
            org_bundle_path_from_env_value(None),
            PathBuf::from(DEFAULT_ORG_BUNDLE_PATH)
        );
        assert_eq!(
            org_bundle_path_from_env_value(Some("  ".into())),
            PathBuf::from(DEFAULT_ORG_BUNDLE_PATH)
        );
        assert_eq!(
            org_bundle_path_from_env_value(Some("/data/orgs.yaml".into())),
            PathBuf::from("/data/orgs.yaml")
        );
    }

    #[test]
    fn default_locale_ignores_blank_values() {
        assert!(default_locale_from_env_value(None).is_none());
        assert!(default_locale_from_env_value(Some(" ".into())).is_none());
        assert_eq!(
            default_locale_from_env_value(Some("en_US".into()))
                .as_ref()
                .map(LanguageCode::as_str),
            Some("en_US")
        );
    }

    #[test]
    fn parses_consent_flag() {
        assert!(!consent_with_top_level_org_from_env_value(None).expect("unset"));
        assert!(consent_with_top_level_org_from_env_value(Some("TRUE".into())).expect("true"));
        assert!(consent_with_top_level_org_from_env_value(Some("1".into())).expect("1"));
        assert!(!consent_with_top_level_org_from_env_value(Some("no".into())).expect("no"));
        assert!(consent_with_top_level_org_from_env_value(Some("maybe".into())).is_err());
    }
}
