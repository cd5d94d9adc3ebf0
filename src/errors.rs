use thiserror::Error;

/// Failure taxonomy for the DR workflow.
///
/// Every component boundary returns one of these instead of continuing in a
/// partially-applied state; the workflow driver matches on the kind to
/// decide whether a step aborts the run or downgrades to success.
#[derive(Error, Debug)]
pub enum DrError {
    #[error("Configuration error: {0}")]
    InvalidConfiguration(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Transient infrastructure error: {0}")]
    TransientInfrastructure(String),

    #[error("Provisioning timeout: {0}")]
    ProvisioningTimeout(String),

    #[error("Remote operation failed: {0}")]
    RemoteOperation(String),
}

pub type Result<T> = std::result::Result<T, DrError>;
