use crate::adapters::geocoder::DisabledGeocoder;
use crate::adapters::visit_log::NoopVisitLog;
use crate::core::directions::directions_url;
use crate::core::nearest::find_nearest;
use crate::core::stops::{load_stops, StopTable};
use crate::core::{ConfigProvider, ReverseGeocoder, Storage, VisitLog};
use crate::domain::model::{Coordinates, LookupOutcome, StopReport, VisitRecord};
use crate::utils::error::{Result, ShuttleError};
use chrono::Utc;

/// 一次查詢的流程：載入站點表、篩選、找最近站點、反向地理編碼、寫入訪問記錄
pub struct ShuttleFinder<S: Storage, C: ConfigProvider> {
    storage: S,
    config: C,
    geocoder: Box<dyn ReverseGeocoder>,
    visit_log: Box<dyn VisitLog>,
}

impl<S: Storage, C: ConfigProvider> ShuttleFinder<S, C> {
    pub fn new(storage: S, config: C) -> Self {
        Self {
            storage,
            config,
            geocoder: Box::new(DisabledGeocoder),
            visit_log: Box::new(NoopVisitLog),
        }
    }

    pub fn with_geocoder(mut self, geocoder: Box<dyn ReverseGeocoder>) -> Self {
        self.geocoder = geocoder;
        self
    }

    pub fn with_visit_log(mut self, visit_log: Box<dyn VisitLog>) -> Self {
        self.visit_log = visit_log;
        self
    }

    pub async fn load_table(&self) -> Result<StopTable> {
        let path = self.config.stops_file();
        tracing::debug!("Loading shuttle stops from {}", path);

        let data = self
            .storage
            .read_file(path)
            .await?
            .ok_or_else(|| ShuttleError::DataError {
                message: format!("stops file '{}' not found", path),
            })?;

        let table = load_stops(&data)?;
        tracing::info!("🚌 Loaded {} shuttle stops", table.len());
        Ok(table)
    }

    pub async fn destinations(&self) -> Result<Vec<String>> {
        let table = self.load_table().await?;
        Ok(table.destinations().into_iter().map(String::from).collect())
    }

    pub async fn lookup(
        &self,
        destination: &str,
        location: Option<Coordinates>,
    ) -> Result<LookupOutcome> {
        let table = self.load_table().await?;
        self.lookup_in(&table, destination, location).await
    }

    pub async fn lookup_in(
        &self,
        table: &StopTable,
        destination: &str,
        location: Option<Coordinates>,
    ) -> Result<LookupOutcome> {
        let destination = destination.trim();

        let Some(user) = location else {
            tracing::warn!("No user location available");
            return Ok(LookupOutcome::LocationUnavailable);
        };

        if !table.has_destination(destination) {
            return Err(ShuttleError::UnknownDestination {
                destination: destination.to_string(),
            });
        }

        let candidates = table.candidates(destination);
        tracing::debug!(
            "{} candidate stops for '{}'",
            candidates.len(),
            destination
        );

        let Some(nearest) = find_nearest(user, candidates) else {
            tracing::info!("No usable shuttle stops for '{}'", destination);
            return Ok(LookupOutcome::NoStops {
                destination: destination.to_string(),
            });
        };

        tracing::info!(
            "📍 Nearest stop for '{}': {} ({:.2} mi)",
            destination,
            nearest.stop.origin,
            nearest.distance_miles
        );

        let address = match self.geocoder.reverse(user).await {
            Ok(address) => address,
            Err(e) => {
                tracing::warn!("⚠️ Reverse geocoding failed: {}", e);
                None
            }
        };

        let url = directions_url(
            self.config.directions_base_url(),
            user,
            &nearest.stop.location,
            self.config.maps_api_key(),
        )?;

        let report = StopReport {
            stop: nearest.stop,
            distance_miles: nearest.distance_miles,
            directions_url: url,
            address,
        };

        let record = VisitRecord::from_report(Utc::now(), user, destination, &report);
        if let Err(e) = self.visit_log.append(&record).await {
            tracing::warn!("⚠️ Could not record visit: {}", e);
        }

        Ok(LookupOutcome::Found(report))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use tokio::sync::Mutex;

    const STOPS: &str = "\
Origin,Destination (Depot),Pickup Times,Locations longitude and latitude
Main Street,North Depot,07:15,\"40.7128, -74.0060\"
North Depot Yard,North Depot,06:30,\"40.5001, -74.2501\"
Harbour Road,North Depot,07:25,TBC
Elm Park,North Depot,07:45,\"40.9, -73.8\"
Broken Lane,South Depot,08:00,unknown
";

    #[derive(Clone, Default)]
    struct MockStorage {
        files: Arc<Mutex<HashMap<String, Vec<u8>>>>,
    }

    impl MockStorage {
        fn with_stops() -> Self {
            let storage = Self::default();
            storage
                .files
                .try_lock()
                .unwrap()
                .insert("shuttles.csv".to_string(), STOPS.as_bytes().to_vec());
            storage
        }
    }

    impl Storage for MockStorage {
        async fn read_file(&self, path: &str) -> Result<Option<Vec<u8>>> {
            Ok(self.files.lock().await.get(path).cloned())
        }

        async fn write_file(&self, path: &str, data: &[u8]) -> Result<()> {
            self.files
                .lock()
                .await
                .insert(path.to_string(), data.to_vec());
            Ok(())
        }
    }

    struct MockConfig {
        api_key: Option<String>,
    }

    impl ConfigProvider for MockConfig {
        fn stops_file(&self) -> &str {
            "shuttles.csv"
        }

        fn directions_base_url(&self) -> &str {
            "https://www.google.com/maps/dir/"
        }

        fn maps_api_key(&self) -> Option<&str> {
            self.api_key.as_deref()
        }
    }

    struct FixedGeocoder(Option<String>);

    #[async_trait]
    impl ReverseGeocoder for FixedGeocoder {
        async fn reverse(&self, _coords: Coordinates) -> Result<Option<String>> {
            Ok(self.0.clone())
        }
    }

    struct FailingGeocoder;

    #[async_trait]
    impl ReverseGeocoder for FailingGeocoder {
        async fn reverse(&self, _coords: Coordinates) -> Result<Option<String>> {
            Err(ShuttleError::GeocodingError {
                message: "service down".to_string(),
            })
        }
    }

    #[derive(Clone, Default)]
    struct RecordingLog {
        records: Arc<Mutex<Vec<VisitRecord>>>,
    }

    #[async_trait]
    impl VisitLog for RecordingLog {
        async fn append(&self, record: &VisitRecord) -> Result<()> {
            self.records.lock().await.push(record.clone());
            Ok(())
        }
    }

    struct FailingLog;

    #[async_trait]
    impl VisitLog for FailingLog {
        async fn append(&self, _record: &VisitRecord) -> Result<()> {
            Err(ShuttleError::VisitLogError {
                message: "disk full".to_string(),
            })
        }
    }

    fn finder() -> ShuttleFinder<MockStorage, MockConfig> {
        ShuttleFinder::new(
            MockStorage::with_stops(),
            MockConfig {
                api_key: Some("k".to_string()),
            },
        )
    }

    fn near_main_street() -> Option<Coordinates> {
        Some(Coordinates::new(40.71, -74.0).unwrap())
    }

    #[tokio::test]
    async fn test_destinations() {
        let destinations = finder().destinations().await.unwrap();
        assert_eq!(destinations, vec!["North Depot", "South Depot"]);
    }

    #[tokio::test]
    async fn test_lookup_finds_nearest_and_logs_visit() {
        let log = RecordingLog::default();
        let finder = finder()
            .with_geocoder(Box::new(FixedGeocoder(Some("1 Main St".to_string()))))
            .with_visit_log(Box::new(log.clone()));

        let outcome = finder
            .lookup("North Depot", near_main_street())
            .await
            .unwrap();

        let LookupOutcome::Found(report) = outcome else {
            panic!("expected a stop");
        };
        assert_eq!(report.stop.origin, "Main Street");
        assert_eq!(report.stop.pickup_times, "07:15");
        assert_eq!(report.address.as_deref(), Some("1 Main St"));
        assert!(report.directions_url.contains("key=k"));

        let records = log.records.lock().await;
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].nearest_stop, "Main Street");
        assert_eq!(records[0].destination, "North Depot");
        assert_eq!(records[0].address, "1 Main St");
    }

    #[tokio::test]
    async fn test_depot_origins_are_never_selected() {
        // 使用者就站在 North Depot Yard 旁
        let here = Some(Coordinates::new(40.5, -74.25).unwrap());
        let outcome = finder().lookup("North Depot", here).await.unwrap();

        let LookupOutcome::Found(report) = outcome else {
            panic!("expected a stop");
        };
        assert_ne!(report.stop.origin, "North Depot Yard");
    }

    #[tokio::test]
    async fn test_lookup_without_location() {
        let log = RecordingLog::default();
        let finder = finder().with_visit_log(Box::new(log.clone()));

        let outcome = finder.lookup("North Depot", None).await.unwrap();

        assert_eq!(outcome, LookupOutcome::LocationUnavailable);
        assert!(log.records.lock().await.is_empty());
    }

    #[tokio::test]
    async fn test_lookup_with_only_unparseable_stops() {
        let outcome = finder()
            .lookup("South Depot", near_main_street())
            .await
            .unwrap();

        assert_eq!(
            outcome,
            LookupOutcome::NoStops {
                destination: "South Depot".to_string()
            }
        );
    }

    #[tokio::test]
    async fn test_lookup_unknown_destination() {
        let err = finder()
            .lookup("West Depot", near_main_street())
            .await
            .unwrap_err();
        assert!(matches!(err, ShuttleError::UnknownDestination { .. }));
    }

    #[tokio::test]
    async fn test_geocoder_and_log_failures_do_not_abort() {
        let finder = finder()
            .with_geocoder(Box::new(FailingGeocoder))
            .with_visit_log(Box::new(FailingLog));

        let outcome = finder
            .lookup("North Depot", near_main_street())
            .await
            .unwrap();

        let LookupOutcome::Found(report) = outcome else {
            panic!("expected a stop");
        };
        assert!(report.address.is_none());
    }

    #[tokio::test]
    async fn test_missing_stops_file() {
        let finder = ShuttleFinder::new(MockStorage::default(), MockConfig { api_key: None });
        let err = finder.destinations().await.unwrap_err();
        assert!(matches!(err, ShuttleError::DataError { .. }));
    }
}
