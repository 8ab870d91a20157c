//! Data access layer: the agency export is read from, and route maps written to, JSON files.
//!
//! ```text
//! <data>/api/stops.json
//! <data>/api/services.json
//! <data>/api/service-maps/<service code>.json
//! ```
pub mod exports;
pub mod services;
pub mod stops;

pub use exports::*;
pub use services::*;
pub use stops::*;

use std::path::Path;

use anyhow::Context;
use serde::{Serialize, de::DeserializeOwned};

pub const API_DIR: &str = "api";

async fn read_json<T: DeserializeOwned>(path: &Path) -> anyhow::Result<T> {
    let text = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("reading {}", path.display()))?;

    serde_json::from_str(&text).with_context(|| format!("parsing {}", path.display()))
}

async fn write_json(path: &Path, value: &impl Serialize) -> anyhow::Result<()> {
    let json = serde_json::to_vec_pretty(value)?;

    tokio::fs::write(path, json)
        .await
        .with_context(|| format!("writing {}", path.display()))
}

#[cfg(test)]
pub(crate) async fn scratch_dir(name: &str) -> std::path::PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "metlink_route_maps-{name}-{}",
        std::process::id()
    ));
    _ = tokio::fs::remove_dir_all(&dir).await;
    tokio::fs::create_dir_all(&dir).await.unwrap();
    dir
}
