use std::{collections::BTreeMap, path::Path};

use tracing::info;

use super::{API_DIR, read_json, write_json};
use crate::{
    model::{api_model::StopRecord, stop::StopId},
    projection::CatalogueStop,
};

pub const STOPS_FILE: &str = "stops.json";

#[tracing::instrument(err)]
pub async fn load_stops(data_dir: &Path) -> anyhow::Result<Vec<StopRecord>> {
    let stops: Vec<StopRecord> = read_json(&data_dir.join(API_DIR).join(STOPS_FILE)).await?;
    info!("Loaded {} stop records", stops.len());

    Ok(stops)
}

/// Writes `<output>/stops.json`
#[tracing::instrument(err, skip(catalogue))]
pub async fn write_stop_catalogue(
    output_dir: &Path,
    catalogue: &BTreeMap<StopId, CatalogueStop>,
) -> anyhow::Result<()> {
    tokio::fs::create_dir_all(output_dir).await?;
    write_json(&output_dir.join(STOPS_FILE), catalogue).await
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dal::scratch_dir;
    use crate::matching::coordinate::QuantizeCache;
    use crate::model::stop::StopCatalogue;
    use crate::projection::stop_catalogue;

    #[tokio::test]
    async fn test_load_stops() {
        let dir = scratch_dir("load-stops").await;
        tokio::fs::create_dir_all(dir.join(API_DIR)).await.unwrap();
        tokio::fs::write(
            dir.join(API_DIR).join(STOPS_FILE),
            r#"[
                {"id": "5000", "name": "Courtenay Place", "fare_zone": "1", "lat": "-41.29372", "lon": "174.7816", "last_modified": "2019-04-16T00:00:31+12:00"},
                {"id": "WELL1", "name": "Wellington Station", "lat": -41.27871, "lon": 174.77601, "last_modified": "2019-04-16T00:00:31+12:00"}
            ]"#,
        )
        .await
        .unwrap();

        let stops = load_stops(&dir).await.unwrap();

        assert_eq!(stops.len(), 2);
        assert_eq!(stops[1].fare_zone, "");
        assert_eq!(stops[1].lat, "-41.27871");
    }

    #[tokio::test]
    async fn test_missing_stops_file() {
        let dir = scratch_dir("missing-stops").await;

        assert!(load_stops(&dir).await.is_err());
    }

    #[tokio::test]
    async fn test_write_stop_catalogue() {
        let dir = scratch_dir("write-catalogue").await;
        let out = dir.join("out");
        let mut cache = QuantizeCache::new(Default::default(), 16);
        let catalogue = StopCatalogue::from_records(
            vec![crate::model::stop::tests::record("5000", "-41.29372", "174.7816")],
            &mut cache,
        );

        write_stop_catalogue(&out, &stop_catalogue(&catalogue))
            .await
            .unwrap();

        let written: serde_json::Value =
            serde_json::from_str(&tokio::fs::read_to_string(out.join(STOPS_FILE)).await.unwrap())
                .unwrap();
        assert_eq!(written["5000"]["lon"], serde_json::json!(174.7816));
        assert_eq!(written["5000"]["fare_zone"], serde_json::json!("1"));
    }
}
