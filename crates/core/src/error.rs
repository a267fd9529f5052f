use portal_types::OrgId;

#[derive(Debug, thiserror::Error)]
pub enum HierarchyError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("cyclic organization hierarchy detected at organization {id}")]
    CyclicHierarchy { id: OrgId },
    #[error("failed to read organization directory {path}: {source}", path = path.display())]
    Directory {
        path: std::path::PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("organization directory returned an unusable bundle: {0}")]
    Fhir(#[from] fhir::FhirError),
    #[error("invalid language code: {0}")]
    LanguageCode(#[from] portal_types::TextError),
}

pub type HierarchyResult<T> = std::result::Result<T, HierarchyError>;
