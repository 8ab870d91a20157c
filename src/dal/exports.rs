use std::path::{Path, PathBuf};

use anyhow::ensure;
use tracing::{debug, error, info};

use super::write_json;
use crate::projection::ServiceProjection;

pub const SERVICE_SUMMARY_FILE: &str = "service.json";
pub const SERVICE_LAYER_FILE: &str = "service.geojson";

pub fn service_dir(output_dir: &Path, service_code: &str) -> PathBuf {
    output_dir.join(format!("service-{service_code}"))
}

/// Whether `name` can be used as a single file or folder name inside the output folder
fn is_plain_file_name(name: &str) -> bool {
    !name.is_empty() && name != "." && name != ".." && !name.contains(['/', '\\'])
}

/// Deletes every `.geojson` file directly inside `dir`, returning how many were removed
async fn remove_stale_layers(dir: &Path) -> anyhow::Result<usize> {
    let mut removed = 0;
    let mut entries = tokio::fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if entry.file_type().await?.is_file()
            && path.extension().is_some_and(|ext| ext == "geojson")
        {
            tokio::fs::remove_file(&path).await?;
            removed += 1;
        }
    }

    Ok(removed)
}

/// Writes `service-<code>/` with the summary, the service layer and one layer per route.
///
/// Layers left over from earlier runs are removed first so routes that disappeared don't linger.
#[tracing::instrument(err, skip(projection), fields(service = %projection.summary.code))]
pub async fn write_service(
    output_dir: &Path,
    projection: &ServiceProjection,
) -> anyhow::Result<PathBuf> {
    let code = &projection.summary.code;
    ensure!(is_plain_file_name(code), "service code {code:?} is not a valid folder name");
    let dir = service_dir(output_dir, code);
    tokio::fs::create_dir_all(&dir).await?;

    let removed = remove_stale_layers(&dir).await?;
    debug!("Removed {removed} old layers from {}", dir.display());

    let mut written = 0;
    for (route_id, layer) in &projection.route_layers {
        if !is_plain_file_name(route_id) {
            error!("Not writing route {route_id:?} of service {code}, its id is not a file name");
            continue;
        }
        write_json(&dir.join(format!("{route_id}.geojson")), layer).await?;
        written += 1;
    }
    write_json(&dir.join(SERVICE_LAYER_FILE), &projection.service_layer).await?;
    write_json(&dir.join(SERVICE_SUMMARY_FILE), &projection.summary).await?;

    info!("Wrote {written} routes to {}", dir.display());

    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dal::scratch_dir;
    use crate::matching::{
        assembler::assemble,
        coordinate::{Precision, quantize},
        route_matcher::{ToleranceLadder, match_polyline},
        stop_index::StopIndex,
    };
    use crate::model::{
        service::{Service, ServiceMode},
        stop::{StopCatalogue, tests::stop},
    };
    use crate::projection::project_service;
    use chrono::DateTime;

    fn projection() -> ServiceProjection {
        let stops = vec![stop("A", "0", "0"), stop("B", "0.0001", "0")];
        let index = StopIndex::build(&stops);
        let p = Precision::default();
        let polyline = vec![quantize("0", "0", p).unwrap(), quantize("0.0001", "0", p).unwrap()];
        let segment = match_polyline(&polyline, &index, &ToleranceLadder::default()).unwrap();
        let service = Service {
            code: "18e".to_string(),
            name: "Miramar - Karori".to_string(),
            mode: ServiceMode::Bus,
            last_modified: DateTime::parse_from_rfc3339("2019-04-16T00:00:31+12:00").unwrap(),
            schools: Vec::new(),
        };

        project_service(
            &service,
            &assemble("18e", vec![segment]),
            &StopCatalogue::new(stops),
        )
    }

    #[tokio::test]
    async fn test_write_service() {
        let out = scratch_dir("write-service").await;
        let stale = service_dir(&out, "18e").join("A-C.geojson");
        tokio::fs::create_dir_all(stale.parent().unwrap()).await.unwrap();
        tokio::fs::write(&stale, "{}").await.unwrap();
        tokio::fs::write(service_dir(&out, "18e").join("notes.txt"), "keep")
            .await
            .unwrap();

        let dir = write_service(&out, &projection()).await.unwrap();

        assert_eq!(dir, out.join("service-18e"));
        assert!(!tokio::fs::try_exists(&stale).await.unwrap());
        assert!(tokio::fs::try_exists(dir.join("notes.txt")).await.unwrap());
        assert!(tokio::fs::try_exists(dir.join("A-B.geojson")).await.unwrap());
        assert!(tokio::fs::try_exists(dir.join(SERVICE_LAYER_FILE)).await.unwrap());

        let summary: serde_json::Value = serde_json::from_str(
            &tokio::fs::read_to_string(dir.join(SERVICE_SUMMARY_FILE))
                .await
                .unwrap(),
        )
        .unwrap();
        assert_eq!(summary["routes"][0]["id"], serde_json::json!("A-B"));
        assert_eq!(summary["last_modified"], serde_json::json!("2019-04-16T00:00:31+12:00"));
    }

    #[tokio::test]
    async fn test_route_ids_stay_inside_the_service_folder() {
        let out = scratch_dir("route-id-paths").await;
        let mut projection = projection();
        let layer = projection.route_layers[0].1.clone();
        projection.route_layers.push(("../escaped".to_string(), layer.clone()));
        projection.route_layers.push(("a/b".to_string(), layer));

        let dir = write_service(&out, &projection).await.unwrap();

        assert!(!tokio::fs::try_exists(out.join("escaped.geojson")).await.unwrap());
        assert!(!tokio::fs::try_exists(dir.join("a")).await.unwrap());
        assert!(tokio::fs::try_exists(dir.join("A-B.geojson")).await.unwrap());
        assert!(tokio::fs::try_exists(dir.join(SERVICE_SUMMARY_FILE)).await.unwrap());
    }

    #[tokio::test]
    async fn test_service_code_must_be_a_folder_name() {
        let out = scratch_dir("service-code-paths").await;
        let mut projection = projection();
        projection.summary.code = "../18e".to_string();

        assert!(write_service(&out, &projection).await.is_err());
        assert!(!is_plain_file_name(".."));
        assert!(!is_plain_file_name(""));
        assert!(is_plain_file_name("A-B-2"));
    }
}
