use thiserror::Error;

/// Top-level error type for inmo.
///
/// The first six variants are the taxonomy surfaced to callers; the rest are
/// infrastructure passthroughs.
#[derive(Debug, Error)]
pub enum InmoError {
    /// Input failed a format or business-rule check.
    #[error("validación: {0}")]
    Validation(String),

    /// The requested resource does not exist (or is filtered by status).
    #[error("no encontrado: {0}")]
    NotFound(String),

    /// The caller's role does not permit the operation.
    #[error("no autorizado: {0}")]
    Authorization(String),

    /// The resource is already in the requested state.
    #[error("conflicto: {0}")]
    Conflict(String),

    /// A collaborator call failed or timed out. `call` names the sub-call.
    #[error("error externo en {call}: {detail}")]
    Upstream { call: String, detail: String },

    /// The request itself is structurally invalid (missing type or user).
    #[error("solicitud malformada: {0}")]
    MalformedRequest(String),

    /// Configuration error.
    #[error("config error: {0}")]
    Config(String),

    /// I/O error.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error.
    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl InmoError {
    /// Shorthand for an upstream failure, naming the sub-call that failed.
    pub fn upstream(call: impl Into<String>, detail: impl std::fmt::Display) -> Self {
        Self::Upstream {
            call: call.into(),
            detail: detail.to_string(),
        }
    }
}
