pub mod cli;
pub mod settings;
pub mod toml_config;

#[cfg(feature = "cli")]
pub use self::args::{CliConfig, Command};

#[cfg(feature = "cli")]
mod args {
    use crate::config::settings::{Settings, VisitLogBackend, VisitLogKind};
    use crate::config::toml_config::{redacted, TomlConfig};
    use crate::domain::model::Coordinates;
    use crate::utils::error::Result;
    use clap::{Parser, Subcommand};
    use std::fmt;

    #[derive(Clone, Parser)]
    #[command(name = "shuttle-finder")]
    #[command(about = "Find the nearest shuttle stop for your destination depot")]
    pub struct CliConfig {
        /// Path to TOML configuration file
        #[arg(short, long, global = true)]
        pub config: Option<String>,

        /// Directory that relative data and log paths resolve against
        #[arg(long, global = true)]
        pub data_dir: Option<String>,

        /// Shuttle stop table (CSV)
        #[arg(long, global = true)]
        pub stops_file: Option<String>,

        #[arg(long, env = "GOOGLE_MAPS_API_KEY", hide_env_values = true, global = true)]
        pub maps_api_key: Option<String>,

        /// Skip reverse geocoding of the user location
        #[arg(long, global = true)]
        pub no_geocode: bool,

        #[arg(long, value_enum, global = true)]
        pub visit_log: Option<VisitLogKind>,

        #[arg(long, global = true)]
        pub visit_log_path: Option<String>,

        #[arg(short, long, global = true, help = "Enable verbose output")]
        pub verbose: bool,

        #[arg(long, global = true, help = "Emit logs as JSON")]
        pub json_logs: bool,

        #[command(subcommand)]
        pub command: Command,
    }

    impl fmt::Debug for CliConfig {
        fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.debug_struct("CliConfig")
                .field("config", &self.config)
                .field("data_dir", &self.data_dir)
                .field("stops_file", &self.stops_file)
                .field("maps_api_key", &redacted(self.maps_api_key.as_deref()))
                .field("no_geocode", &self.no_geocode)
                .field("visit_log", &self.visit_log)
                .field("visit_log_path", &self.visit_log_path)
                .field("verbose", &self.verbose)
                .field("json_logs", &self.json_logs)
                .field("command", &self.command)
                .finish()
        }
    }

    #[derive(Debug, Clone, Subcommand)]
    pub enum Command {
        /// List destination depots
        Destinations,
        /// Find the nearest pickup stop for a depot
        Find {
            #[arg(short, long)]
            destination: String,

            /// Current position as "lat, lon"
            #[arg(long, allow_hyphen_values = true, conflicts_with_all = ["lat", "lon"])]
            location: Option<String>,

            #[arg(long, allow_negative_numbers = true, requires = "lon")]
            lat: Option<f64>,

            #[arg(long, allow_negative_numbers = true, requires = "lat")]
            lon: Option<f64>,
        },
        /// Load and validate the configuration, then exit
        ValidateConfig,
    }

    impl Command {
        /// 使用者位置；未提供時回傳 `Ok(None)`
        pub fn user_location(&self) -> Result<Option<Coordinates>> {
            match self {
                Command::Find {
                    location: Some(location),
                    ..
                } => Coordinates::parse(location).map(Some),
                Command::Find {
                    lat: Some(lat),
                    lon: Some(lon),
                    ..
                } => Coordinates::new(*lat, *lon).map(Some),
                _ => Ok(None),
            }
        }
    }

    impl CliConfig {
        /// 載入 TOML（若有指定）並套用命令列覆蓋
        pub fn settings(&self) -> Result<Settings> {
            let toml = match &self.config {
                Some(path) => {
                    tracing::info!("📁 Loading configuration from: {}", path);
                    TomlConfig::from_file(path)?
                }
                None => TomlConfig::default(),
            };

            let mut settings = Settings::from_toml(&toml)?;

            if let Some(dir) = &self.data_dir {
                settings.base_dir = dir.clone();
            }
            if let Some(stops_file) = &self.stops_file {
                settings.stops_file = stops_file.clone();
            }
            if let Some(key) = self.maps_api_key.as_ref().filter(|k| !k.is_empty()) {
                settings.maps_api_key = Some(key.clone());
            }
            if self.no_geocode {
                settings.geocoding_enabled = false;
            }

            if self.visit_log.is_some() || self.visit_log_path.is_some() {
                let kind = match (self.visit_log, &settings.visit_log) {
                    (Some(kind), _) => kind,
                    (None, VisitLogBackend::None) => VisitLogKind::None,
                    (None, VisitLogBackend::Local { .. }) => VisitLogKind::Local,
                    (None, VisitLogBackend::Remote { .. }) => VisitLogKind::Remote,
                };
                let local_path = self
                    .visit_log_path
                    .clone()
                    .or_else(|| toml.visit_log.path.clone());
                settings.visit_log =
                    Settings::build_visit_log(kind, local_path, toml.visit_log.remote.as_ref())?;
            }

            Ok(settings)
        }
    }

}
