use shipment_types::InvalidWeight;
use thiserror::Error;

/// Everything that can abort a band calculation or a reconciliation run
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ReconcileError {
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    #[error("Document classification failed: {0}")]
    Classification(String),

    #[error("Could not extract {field} from '{document}': {reason}")]
    Extraction {
        document: String,
        field: String,
        reason: String,
    },

    #[error("Parsing '{document}' did not finish within {timeout_ms}ms")]
    Timeout { document: String, timeout_ms: u64 },

    #[error("Configuration error: {0}")]
    Config(String),
}

impl ReconcileError {
    pub(crate) fn extraction(
        document: impl Into<String>,
        field: impl Into<String>,
        reason: impl Into<String>,
    ) -> Self {
        Self::Extraction {
            document: document.into(),
            field: field.into(),
            reason: reason.into(),
        }
    }
}

impl From<InvalidWeight> for ReconcileError {
    fn from(e: InvalidWeight) -> Self {
        Self::InvalidInput(e.to_string())
    }
}

pub type Result<T> = std::result::Result<T, ReconcileError>;
