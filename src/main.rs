use clap::Parser;
use shuttle_finder::adapters::{geocoder_from_settings, visit_log_from_settings};
use shuttle_finder::utils::{logger, validation::Validate};
use shuttle_finder::{CliConfig, Command, LocalStorage, LookupOutcome, ShuttleError, ShuttleFinder};

#[tokio::main]
async fn main() {
    let config = CliConfig::parse();

    // 初始化日誌
    logger::init_cli_logger(config.verbose, config.json_logs);

    tracing::info!("Starting shuttle-finder");
    if config.verbose {
        tracing::debug!("CLI config: {:?}", config);
    }

    if let Err(e) = run(config).await {
        tracing::error!(
            "❌ shuttle-finder failed: {} (Category: {:?}, Severity: {:?})",
            e,
            e.category(),
            e.severity()
        );
        tracing::error!("💡 Recovery suggestion: {}", e.recovery_suggestion());

        eprintln!("❌ {}", e.user_friendly_message());
        eprintln!("💡 Suggestion: {}", e.recovery_suggestion());

        let exit_code = e.exit_code();
        if exit_code > 0 {
            std::process::exit(exit_code);
        }
    }
}

async fn run(config: CliConfig) -> Result<(), ShuttleError> {
    let settings = config.settings()?;
    settings.validate()?;

    if let Command::ValidateConfig = config.command {
        println!("✅ Configuration is valid");
        println!("   stops file : {}", settings.stops_file);
        println!("   geocoding  : {}", settings.geocoding_enabled);
        println!("   visit log  : {:?}", settings.visit_log);
        return Ok(());
    }

    let location = config.command.user_location()?;
    let storage = LocalStorage::new(settings.base_dir.clone());
    let finder = ShuttleFinder::new(storage, settings.clone())
        .with_geocoder(geocoder_from_settings(&settings)?)
        .with_visit_log(visit_log_from_settings(&settings)?);

    match &config.command {
        Command::Destinations => {
            for destination in finder.destinations().await? {
                println!("{}", destination);
            }
        }
        Command::Find { destination, .. } => {
            let outcome = finder.lookup(destination, location).await?;
            println!("{}", outcome.message());

            if let LookupOutcome::Found(report) = &outcome {
                println!("Distance: {:.2} miles", report.distance_miles);
                match &report.address {
                    Some(address) => println!("You are near: {}", address),
                    None => println!("Your street address could not be determined."),
                }
                println!("Directions: {}", report.directions_url);
            }
        }
        Command::ValidateConfig => {}
    }

    Ok(())
}
