use crate::domain::model::ShuttleStop;
use crate::utils::error::{Result, ShuttleError};
use serde::Deserialize;

pub const ORIGIN_COLUMN: &str = "Origin";
pub const DESTINATION_COLUMN: &str = "Destination (Depot)";
pub const PICKUP_TIMES_COLUMN: &str = "Pickup Times";
pub const LOCATION_COLUMN: &str = "Locations longitude and latitude";

#[derive(Debug, Deserialize)]
struct StopRow {
    #[serde(rename = "Origin", default)]
    origin: Option<String>,
    #[serde(rename = "Destination (Depot)", default)]
    destination: Option<String>,
    #[serde(rename = "Pickup Times", default)]
    pickup_times: Option<String>,
    #[serde(rename = "Locations longitude and latitude", default)]
    location: Option<String>,
}

/// 載入後不再變動的站點表
#[derive(Debug, Clone, Default)]
pub struct StopTable {
    stops: Vec<ShuttleStop>,
}

impl StopTable {
    pub fn new(stops: Vec<ShuttleStop>) -> Self {
        Self { stops }
    }

    pub fn stops(&self) -> &[ShuttleStop] {
        &self.stops
    }

    pub fn len(&self) -> usize {
        self.stops.len()
    }

    pub fn is_empty(&self) -> bool {
        self.stops.is_empty()
    }

    /// 依首次出現順序列出不重複的目的地
    pub fn destinations(&self) -> Vec<&str> {
        let mut seen: Vec<&str> = Vec::new();
        for stop in &self.stops {
            if !stop.destination.is_empty() && !seen.contains(&stop.destination.as_str()) {
                seen.push(stop.destination.as_str());
            }
        }
        seen
    }

    pub fn has_destination(&self, destination: &str) -> bool {
        self.stops.iter().any(|s| s.destination == destination)
    }

    /// 指定目的地的上車點，排除起點本身就是車庫的列
    pub fn candidates(&self, destination: &str) -> Vec<&ShuttleStop> {
        self.stops
            .iter()
            .filter(|s| s.destination == destination)
            .filter(|s| !s.origin.to_lowercase().contains("depot"))
            .collect()
    }
}

pub fn load_stops(data: &[u8]) -> Result<StopTable> {
    let mut reader = csv::ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .trim(csv::Trim::Headers)
        .from_reader(data);

    let headers = reader.headers()?.clone();
    for required in [
        ORIGIN_COLUMN,
        DESTINATION_COLUMN,
        PICKUP_TIMES_COLUMN,
        LOCATION_COLUMN,
    ] {
        if !headers.iter().any(|h| h == required) {
            return Err(ShuttleError::DataError {
                message: format!("missing required column '{}'", required),
            });
        }
    }

    let mut stops = Vec::new();
    for (index, row) in reader.deserialize::<StopRow>().enumerate() {
        let row = row?;
        let stop = ShuttleStop {
            origin: row.origin.unwrap_or_default().trim().to_string(),
            destination: row.destination.unwrap_or_default().trim().to_string(),
            pickup_times: row.pickup_times.unwrap_or_default().trim().to_string(),
            location: row.location.unwrap_or_default(),
        };
        tracing::trace!("row {}: {:?}", index + 1, stop);
        stops.push(stop);
    }

    tracing::debug!("Loaded {} shuttle stops", stops.len());
    Ok(StopTable::new(stops))
}
