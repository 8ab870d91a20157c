//! Responsible for a whole run: reading the agency export and writing every service's route map
use std::{collections::HashMap, path::Path, sync::Arc};

use itertools::Itertools;
use tracing::{Instrument, error, info, info_span, warn};

use super::route_map_builder::{ServiceMatchReport, build_route_maps};
use crate::{
    config::MatchConfig,
    dal::{load_service_map, load_services, load_stops, write_service, write_stop_catalogue},
    matching::stop_index::StopIndex,
    model::{
        api_model::ServiceMapPayload,
        service::Service,
        stop::StopCatalogue,
    },
    projection::{project_service, stop_catalogue},
};

/// Totals of one run, logged once everything is written
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub stops: usize,
    pub services: usize,
    /// Services listed without a readable polyline file
    pub services_without_map: usize,
    pub routes: usize,
    pub dropped_polylines: usize,
    pub failed_exports: usize,
}

/// Only unreadable stop or service lists fail the run, everything else is logged and skipped.
#[tracing::instrument(err, skip(config))]
pub async fn export_route_maps(
    data_dir: &Path,
    output_dir: &Path,
    config: &MatchConfig,
) -> anyhow::Result<RunSummary> {
    let mut summary = RunSummary::default();

    let mut cache = config.new_cache();
    let catalogue = StopCatalogue::from_records(load_stops(data_dir).await?, &mut cache);
    summary.stops = catalogue.len();

    let index = Arc::new(StopIndex::build(catalogue.stops()));
    if !index.duplicates().is_empty() {
        warn!(
            "{} stops share a coordinate with another stop",
            index.duplicates().len()
        );
    }

    write_stop_catalogue(output_dir, &stop_catalogue(&catalogue)).await?;

    let services: HashMap<String, Service> = load_services(data_dir)
        .await?
        .into_iter()
        .map(|record| (record.code.clone(), Service::from(record)))
        .collect();
    summary.services = services.len();

    let payloads = load_payloads(data_dir, services.keys().sorted())
        .instrument(info_span!("Loading service maps"))
        .await;
    summary.services_without_map = services.len() - payloads.len();

    let reports = build_route_maps(payloads, index, *config).await;

    for report in reports {
        summary.routes += report.collection.entries().len();
        summary.dropped_polylines += report.dropped.len();

        if let Err(e) = export_service(output_dir, &services, &catalogue, &report).await {
            error!("Error exporting service {} {e:?}", report.service_code());
            summary.failed_exports += 1;
        }
    }

    info!(
        "Exported {} routes for {} services, {} services without a map, {} polylines dropped, {} exports failed",
        summary.routes,
        summary.services - summary.services_without_map,
        summary.services_without_map,
        summary.dropped_polylines,
        summary.failed_exports
    );

    Ok(summary)
}

async fn load_payloads<'a>(
    data_dir: &Path,
    codes: impl Iterator<Item = &'a String>,
) -> Vec<ServiceMapPayload> {
    let mut payloads = vec![];

    for code in codes {
        match load_service_map(data_dir, code).await {
            Err(e) => error!("Error loading service map of {code} {e:?}"),
            Ok(None) => warn!("Service {code} has no service map"),
            Ok(Some(payload)) => payloads.push(payload),
        }
    }

    payloads
}

async fn export_service(
    output_dir: &Path,
    services: &HashMap<String, Service>,
    catalogue: &StopCatalogue,
    report: &ServiceMatchReport,
) -> anyhow::Result<()> {
    let service = services
        .get(report.service_code())
        .ok_or_else(|| anyhow::anyhow!("service {} is not listed", report.service_code()))?;

    let projection = project_service(service, &report.collection, catalogue);
    write_service(output_dir, &projection).await?;

    Ok(())
}
