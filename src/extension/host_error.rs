//! Errors as reported to the filter and service host.

use crate::binder::error::BindError;

/// The host distinguishes bad request data from everything else.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum HostError {
    #[error("Data error: {0}")]
    Data(BindError),

    #[error("Service error: {0}")]
    Service(BindError),
}

impl HostError {
    pub fn cause(&self) -> &BindError {
        match self {
            HostError::Data(e) | HostError::Service(e) => e,
        }
    }
}

impl From<BindError> for HostError {
    fn from(e: BindError) -> Self {
        if e.is_data_error() {
            HostError::Data(e)
        } else {
            HostError::Service(e)
        }
    }
}
