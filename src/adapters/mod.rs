// Adapters layer: concrete implementations for external systems (geocoding, visit logs)

pub mod geocoder;
pub mod visit_log;

use crate::config::cli::LocalStorage;
use crate::config::settings::{Settings, VisitLogBackend};
use crate::core::{ReverseGeocoder, VisitLog};
use crate::utils::error::Result;
use geocoder::{DisabledGeocoder, HttpReverseGeocoder};
use visit_log::{NoopVisitLog, RemoteRepoVisitLog, StorageVisitLog};

pub fn geocoder_from_settings(settings: &Settings) -> Result<Box<dyn ReverseGeocoder>> {
    if !settings.geocoding_enabled {
        tracing::debug!("Reverse geocoding disabled");
        return Ok(Box::new(DisabledGeocoder));
    }

    Ok(Box::new(HttpReverseGeocoder::new(
        settings.geocoder_endpoint.clone(),
        &settings.user_agent,
        settings.geocoder_timeout,
    )?))
}

pub fn visit_log_from_settings(settings: &Settings) -> Result<Box<dyn VisitLog>> {
    match &settings.visit_log {
        VisitLogBackend::None => Ok(Box::new(NoopVisitLog)),
        VisitLogBackend::Local { path } => Ok(Box::new(StorageVisitLog::new(
            LocalStorage::new(settings.base_dir.clone()),
            path.clone(),
        ))),
        VisitLogBackend::Remote { settings, timeout } => {
            Ok(Box::new(RemoteRepoVisitLog::new(settings.clone(), *timeout)?))
        }
    }
}
