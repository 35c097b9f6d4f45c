use crate::utils::error::{Result, ShuttleError};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// 使用者或站點的經緯度
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Coordinates {
    pub latitude: f64,
    pub longitude: f64,
}

impl Coordinates {
    pub fn new(latitude: f64, longitude: f64) -> Result<Self> {
        let input = format!("{}, {}", latitude, longitude);
        if !latitude.is_finite() || !(-90.0..=90.0).contains(&latitude) {
            return Err(ShuttleError::CoordinateError {
                input,
                reason: "latitude must be between -90 and 90".to_string(),
            });
        }
        if !longitude.is_finite() || !(-180.0..=180.0).contains(&longitude) {
            return Err(ShuttleError::CoordinateError {
                input,
                reason: "longitude must be between -180 and 180".to_string(),
            });
        }
        Ok(Self {
            latitude,
            longitude,
        })
    }

    /// 解析 "lat, lon" 格式字串
    pub fn parse(input: &str) -> Result<Self> {
        let parts: Vec<&str> = input.split(',').map(str::trim).collect();
        if parts.len() != 2 {
            return Err(ShuttleError::CoordinateError {
                input: input.to_string(),
                reason: format!("expected 2 comma-separated values, found {}", parts.len()),
            });
        }

        let parse_part = |part: &str, name: &str| {
            part.parse::<f64>()
                .map_err(|e| ShuttleError::CoordinateError {
                    input: input.to_string(),
                    reason: format!("{} is not a number: {}", name, e),
                })
        };

        let latitude = parse_part(parts[0], "latitude")?;
        let longitude = parse_part(parts[1], "longitude")?;
        Self::new(latitude, longitude)
    }
}

impl fmt::Display for Coordinates {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{},{}", self.latitude, self.longitude)
    }
}

/// 站點表中的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ShuttleStop {
    pub origin: String,
    pub destination: String,
    pub pickup_times: String,
    /// 檔案中原樣保存的 "lat, lon" 字串
    pub location: String,
}

impl ShuttleStop {
    pub fn coordinates(&self) -> Result<Coordinates> {
        Coordinates::parse(&self.location)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct NearestStop {
    pub stop: ShuttleStop,
    pub distance_miles: f64,
}

#[derive(Debug, Clone, PartialEq)]
pub struct StopReport {
    pub stop: ShuttleStop,
    pub distance_miles: f64,
    pub directions_url: String,
    pub address: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum LookupOutcome {
    Found(StopReport),
    NoStops { destination: String },
    LocationUnavailable,
}

impl LookupOutcome {
    pub fn message(&self) -> String {
        match self {
            LookupOutcome::Found(report) => format!(
                "The nearest shuttle stop is {}. It departs at {}. Make sure you are here by this time.",
                report.stop.origin, report.stop.pickup_times
            ),
            LookupOutcome::NoStops { .. } => {
                "No shuttle stops found for the selected depot.".to_string()
            }
            LookupOutcome::LocationUnavailable => {
                "Could not detect your location. Please pass --location \"lat, lon\" and try again."
                    .to_string()
            }
        }
    }
}

/// 訪問記錄檔中的一列
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VisitRecord {
    pub timestamp: DateTime<Utc>,
    pub latitude: f64,
    pub longitude: f64,
    pub address: String,
    pub destination: String,
    pub nearest_stop: String,
    pub pickup_times: String,
    pub distance_miles: f64,
}

impl VisitRecord {
    pub fn from_report(
        timestamp: DateTime<Utc>,
        user: Coordinates,
        destination: &str,
        report: &StopReport,
    ) -> Self {
        Self {
            timestamp,
            latitude: user.latitude,
            longitude: user.longitude,
            address: report.address.clone().unwrap_or_default(),
            destination: destination.to_string(),
            nearest_stop: report.stop.origin.clone(),
            pickup_times: report.stop.pickup_times.clone(),
            distance_miles: report.distance_miles,
        }
    }
}
