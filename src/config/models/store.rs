//! Record store configuration

use serde::{Deserialize, Serialize};
use std::str::FromStr;

/// Store backend selection
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StoreBackend {
    /// In-process table
    #[default]
    Memory,
    /// Amazon DynamoDB (requires the `aws` feature)
    Dynamodb,
}

impl FromStr for StoreBackend {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "memory" => Ok(StoreBackend::Memory),
            "dynamodb" => Ok(StoreBackend::Dynamodb),
            other => Err(format!("unknown store backend '{}'", other)),
        }
    }
}

/// Store configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StoreConfig {
    #[serde(default)]
    pub backend: StoreBackend,
    /// Table name (dynamodb backend)
    #[serde(default)]
    pub table_name: Option<String>,
    /// AWS region override (dynamodb backend)
    #[serde(default)]
    pub region: Option<String>,
    /// Endpoint override, e.g. DynamoDB Local (dynamodb backend)
    #[serde(default)]
    pub endpoint_url: Option<String>,
}

impl StoreConfig {
    pub fn merge(mut self, other: Self) -> Self {
        if other.backend != StoreBackend::default() {
            self.backend = other.backend;
        }
        if other.table_name.is_some() {
            self.table_name = other.table_name;
        }
        if other.region.is_some() {
            self.region = other.region;
        }
        if other.endpoint_url.is_some() {
            self.endpoint_url = other.endpoint_url;
        }
        self
    }

    pub fn validate(&self) -> Result<(), String> {
        if self.backend == StoreBackend::Dynamodb
            && self.table_name.as_deref().is_none_or(str::is_empty)
        {
            return Err("Table name is required for the dynamodb backend".to_string());
        }
        Ok(())
    }
}
