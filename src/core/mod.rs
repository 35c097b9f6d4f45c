pub mod directions;
pub mod finder;
pub mod nearest;
pub mod stops;

pub use crate::domain::model::{Coordinates, LookupOutcome, ShuttleStop, StopReport, VisitRecord};
pub use crate::domain::ports::{ConfigProvider, ReverseGeocoder, Storage, VisitLog};
pub use crate::utils::error::Result;
