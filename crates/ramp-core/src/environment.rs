//! # Deployment Environments
//!
//! Each environment resolves both the API host and the widget host from a
//! fixed naming convention, so session calls and widget embeds for the same
//! environment always agree.

use crate::error::{RampError, RampResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Root domain shared by the API and widget hosts
pub const ROOT_DOMAIN: &str = "example.com";

/// Deployment target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Production,
    X1,
    X2,
    Voltorb,
}

impl Environment {
    pub const ALL: [Environment; 4] = [
        Environment::Production,
        Environment::X1,
        Environment::X2,
        Environment::Voltorb,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Environment::Production => "production",
            Environment::X1 => "x1",
            Environment::X2 => "x2",
            Environment::Voltorb => "voltorb",
        }
    }

    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }

    /// Base URL of the REST API (e.g., "https://api.x1.example.com")
    pub fn api_base_url(&self) -> String {
        format!("https://{}", self.host_for("api"))
    }

    /// Base URL of the hosted widget (e.g., "https://ramp.x1.example.com")
    pub fn widget_base_url(&self) -> String {
        format!("https://{}", self.host_for("ramp"))
    }

    /// Hostname inbound widget messages must originate from
    pub fn widget_host(&self) -> String {
        self.host_for("ramp")
    }

    fn host_for(&self, service: &str) -> String {
        match self {
            Environment::Production => format!("{}.{}", service, ROOT_DOMAIN),
            other => format!("{}.{}.{}", service, other.as_str(), ROOT_DOMAIN),
        }
    }
}

impl fmt::Display for Environment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Environment {
    type Err = RampError;

    fn from_str(s: &str) -> RampResult<Self> {
        match s.trim().to_lowercase().as_str() {
            "production" | "prod" => Ok(Environment::Production),
            "x1" => Ok(Environment::X1),
            "x2" => Ok(Environment::X2),
            "voltorb" => Ok(Environment::Voltorb),
            other => Err(RampError::Validation(format!(
                "unknown environment: {}",
                other
            ))),
        }
    }
}
