//! Ingress configuration

use crate::core::normalizer::DEFAULT_TENANT_HEADER;
use actix_web::http::header::HeaderName;
use serde::{Deserialize, Serialize};

/// Request normalization settings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct IngestConfig {
    /// Header carrying the tenant id of unstructured payloads
    #[serde(default = "default_tenant_header")]
    pub tenant_header: String,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            tenant_header: default_tenant_header(),
        }
    }
}

impl IngestConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.tenant_header != default_tenant_header() {
            self.tenant_header = other.tenant_header;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if HeaderName::try_from(self.tenant_header.as_str()).is_err() {
            return Err(format!(
                "Tenant header '{}' is not a valid header name",
                self.tenant_header
            ));
        }
        Ok(())
    }
}

fn default_tenant_header() -> String {
    DEFAULT_TENANT_HEADER.to_string()
}
