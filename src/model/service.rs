use std::{convert::Infallible, fmt, str::FromStr};

use chrono::{DateTime, FixedOffset};
use serde::{Deserialize, Serialize};

use super::api_model::ServiceRecord;

#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum ServiceMode {
    Bus,
    Train,
    Ferry,
    CableCar,
    Other(String),
}

impl FromStr for ServiceMode {
    type Err = Infallible;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(match s {
            "Bus" => ServiceMode::Bus,
            "Train" => ServiceMode::Train,
            "Ferry" => ServiceMode::Ferry,
            "Cable Car" => ServiceMode::CableCar,
            other => ServiceMode::Other(other.to_owned()),
        })
    }
}

impl From<String> for ServiceMode {
    fn from(value: String) -> Self {
        match value.parse() {
            Ok(mode) => mode,
            Err(never) => match never {},
        }
    }
}

impl From<ServiceMode> for String {
    fn from(value: ServiceMode) -> Self {
        value.to_string()
    }
}

impl fmt::Display for ServiceMode {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match self {
            ServiceMode::Bus => f.write_str("Bus"),
            ServiceMode::Train => f.write_str("Train"),
            ServiceMode::Ferry => f.write_str("Ferry"),
            ServiceMode::CableCar => f.write_str("Cable Car"),
            ServiceMode::Other(other) => f.write_str(other),
        }
    }
}

/// A named transit line, e.g. a bus route
#[derive(Debug, Clone, PartialEq)]
pub struct Service {
    pub code: String,
    pub name: String,
    pub mode: ServiceMode,
    pub last_modified: DateTime<FixedOffset>,
    pub schools: Vec<String>,
}

impl From<ServiceRecord> for Service {
    fn from(value: ServiceRecord) -> Self {
        Service {
            code: value.code,
            name: value.name,
            mode: value.mode,
            last_modified: value.last_modified,
            schools: value
                .schools
                .into_iter()
                .map(|school| school.trim().to_string())
                .filter(|school| !school.is_empty())
                .collect(),
        }
    }
}
