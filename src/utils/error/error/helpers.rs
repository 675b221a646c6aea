//! Helper functions for creating specific error types

use super::types::PipelineError;

impl PipelineError {
    pub fn config<S: Into<String>>(message: S) -> Self {
        Self::Config(message.into())
    }

    pub fn buffer<S: Into<String>>(message: S) -> Self {
        Self::Buffer(message.into())
    }

    pub fn store<S: Into<String>>(message: S) -> Self {
        Self::Store(message.into())
    }

    pub fn processing<S: Into<String>>(message: S) -> Self {
        Self::Processing(message.into())
    }

    pub fn timeout<S: Into<String>>(message: S) -> Self {
        Self::Timeout(message.into())
    }

    pub fn not_found<S: Into<String>>(message: S) -> Self {
        Self::NotFound(message.into())
    }

    pub fn bad_request<S: Into<String>>(message: S) -> Self {
        Self::BadRequest(message.into())
    }

    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal(message.into())
    }
}
