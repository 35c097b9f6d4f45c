pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::{CliConfig, Command};

pub use config::{cli::LocalStorage, settings::Settings};
pub use crate::core::{finder::ShuttleFinder, stops::StopTable};
pub use domain::model::{Coordinates, LookupOutcome, ShuttleStop, StopReport, VisitRecord};
pub use utils::error::{Result, ShuttleError};
