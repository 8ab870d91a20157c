use std::path::{Path, PathBuf};

use tracing::info;

use super::{API_DIR, read_json};
use crate::model::api_model::{ServiceMapPayload, ServiceRecord};

pub const SERVICES_FILE: &str = "services.json";
pub const SERVICE_MAPS_DIR: &str = "service-maps";

pub fn service_map_path(data_dir: &Path, service_code: &str) -> PathBuf {
    data_dir
        .join(API_DIR)
        .join(SERVICE_MAPS_DIR)
        .join(format!("{service_code}.json"))
}

#[tracing::instrument(err)]
pub async fn load_services(data_dir: &Path) -> anyhow::Result<Vec<ServiceRecord>> {
    let services: Vec<ServiceRecord> =
        read_json(&data_dir.join(API_DIR).join(SERVICES_FILE)).await?;
    info!("Loaded {} services", services.len());

    Ok(services)
}

/// Loads the polylines of one service. `Ok(None)` when the service has no map file.
#[tracing::instrument(err)]
pub async fn load_service_map(
    data_dir: &Path,
    service_code: &str,
) -> anyhow::Result<Option<ServiceMapPayload>> {
    let path = service_map_path(data_dir, service_code);
    if !tokio::fs::try_exists(&path).await? {
        return Ok(None);
    }

    let payload: ServiceMapPayload = read_json(&path).await?;
    anyhow::ensure!(
        payload.service_code == service_code,
        "{} holds polylines of service {}",
        path.display(),
        payload.service_code
    );

    Ok(Some(payload))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dal::scratch_dir;
    use crate::model::service::ServiceMode;

    async fn write(path: PathBuf, contents: &str) {
        tokio::fs::create_dir_all(path.parent().unwrap()).await.unwrap();
        tokio::fs::write(path, contents).await.unwrap();
    }

    #[tokio::test]
    async fn test_load_services() {
        let dir = scratch_dir("load-services").await;
        write(
            dir.join(API_DIR).join(SERVICES_FILE),
            r#"[
                {"code": "1", "name": "Island Bay - Johnsonville", "mode": "Bus", "last_modified": "2019-04-16T00:00:31+12:00"},
                {"code": "CCL", "name": "Cable Car", "mode": "Cable Car", "last_modified": "2019-04-16T00:00:31+12:00", "schools": ["Kelburn Normal"]}
            ]"#,
        )
        .await;

        let services = load_services(&dir).await.unwrap();

        assert_eq!(services.len(), 2);
        assert_eq!(services[1].mode, ServiceMode::CableCar);
        assert!(services[0].schools.is_empty());
    }

    #[tokio::test]
    async fn test_load_service_map() {
        let dir = scratch_dir("load-service-map").await;
        write(
            service_map_path(&dir, "14"),
            r#"{"service_code": "14", "polylines": [["-41.1,174.8", "-41.2,174.9,0"], []]}"#,
        )
        .await;
        write(
            service_map_path(&dir, "15"),
            r#"{"service_code": "14", "polylines": []}"#,
        )
        .await;

        let payload = load_service_map(&dir, "14").await.unwrap().unwrap();
        assert_eq!(payload.polylines.len(), 2);
        assert_eq!(payload.polylines[0][1], "-41.2,174.9,0");

        assert!(load_service_map(&dir, "2").await.unwrap().is_none());
        assert!(load_service_map(&dir, "15").await.is_err());
    }
}
