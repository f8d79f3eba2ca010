//! Remote call failures
//!
//! Every failure maps to one generic, operation-specific error: the
//! caller learns which operation failed and (for HTTP failures) the
//! status code, nothing more. Failure bodies are never parsed and
//! status classes are not differentiated.

use std::fmt;
use thiserror::Error;

/// The remote operation that was being attempted
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ApiOperation {
    ListTasks,
    GetTask,
    CreateTask,
    UpdateTask,
    DeleteTask,
    SetTaskState,
    AddBlocker,
    RemoveBlocker,
}

impl fmt::Display for ApiOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            ApiOperation::ListTasks => "fetch tasks",
            ApiOperation::GetTask => "fetch task",
            ApiOperation::CreateTask => "create task",
            ApiOperation::UpdateTask => "update task",
            ApiOperation::DeleteTask => "delete task",
            ApiOperation::SetTaskState => "set task state",
            ApiOperation::AddBlocker => "add blocker",
            ApiOperation::RemoveBlocker => "remove blocker",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Error)]
pub enum ApiError {
    /// The service answered with a non-2xx status
    #[error("failed to {op} (HTTP {status})")]
    Status { op: ApiOperation, status: u16 },

    /// The request never produced an HTTP response
    #[error("failed to {op}")]
    Transport {
        op: ApiOperation,
        #[source]
        source: Box<ureq::Transport>,
    },

    /// The response body was not the expected JSON
    #[error("failed to {op}: invalid response body")]
    Decode {
        op: ApiOperation,
        #[source]
        source: std::io::Error,
    },
}

impl ApiError {
    /// Returns the operation that failed
    pub fn operation(&self) -> ApiOperation {
        match self {
            ApiError::Status { op, .. }
            | ApiError::Transport { op, .. }
            | ApiError::Decode { op, .. } => *op,
        }
    }

    /// Returns the HTTP status, if the service answered at all
    pub fn status(&self) -> Option<u16> {
        match self {
            ApiError::Status { status, .. } => Some(*status),
            _ => None,
        }
    }

    pub(crate) fn from_ureq(op: ApiOperation, err: ureq::Error) -> Self {
        match err {
            ureq::Error::Status(status, _) => ApiError::Status { op, status },
            ureq::Error::Transport(source) => ApiError::Transport {
                op,
                source: Box::new(source),
            },
        }
    }
}
