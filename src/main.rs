use actix_cors::Cors;
use actix_web::{App, HttpServer, middleware::Compress, web};
use clap::Parser;
use log::{error, info};
use std::path::PathBuf;
use std::sync::Arc;
use tracing_actix_web::TracingLogger;
use tracing_subscriber::{EnvFilter, FmtSubscriber};

use arcspatial::{AppState, State, catalog, handlers, parser, reproject, version};

/// Command line configuration
#[derive(Parser, Debug)]
#[command(author, version = version::VERSION, about, long_about = None)]
struct Config {
    /// IP address to bind the server to
    #[arg(long, default_value = "127.0.0.1")]
    address: String,

    /// Port to bind the server to
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// JSON export of projects and their areas. Without it the catalog is empty.
    #[arg(long)]
    catalog_file: Option<PathBuf>,

    /// UTM zone every planar coordinate is expressed in
    #[arg(long, default_value = "36N")]
    utm_zone: reproject::UtmZone,

    /// Smallest absolute easting still read as UTM
    #[arg(long, default_value_t = parser::UTM_EASTING_MIN)]
    utm_easting_min: f64,

    /// Largest absolute easting still read as UTM
    #[arg(long, default_value_t = parser::UTM_EASTING_MAX)]
    utm_easting_max: f64,

    /// Smallest absolute northing still read as UTM
    #[arg(long, default_value_t = parser::UTM_NORTHING_MIN)]
    utm_northing_min: f64,

    /// Largest absolute northing still read as UTM
    #[arg(long, default_value_t = parser::UTM_NORTHING_MAX)]
    utm_northing_max: f64,

    /// Reject coordinates whose reprojection fails instead of passing them through unchanged
    #[arg(long)]
    strict_projection: bool,

    /// Rounding applied to parsed coordinates
    #[arg(long, value_enum, default_value_t = parser::Rounding::HalfEven)]
    rounding: parser::Rounding,
}

impl Config {
    fn parser_settings(&self) -> anyhow::Result<parser::ParserSettings> {
        if self.utm_easting_min > self.utm_easting_max
            || self.utm_northing_min > self.utm_northing_max
        {
            anyhow::bail!(
                "UTM envelope is empty: easting {}..{}, northing {}..{}",
                self.utm_easting_min,
                self.utm_easting_max,
                self.utm_northing_min,
                self.utm_northing_max
            );
        }
        Ok(parser::ParserSettings {
            zone: self.utm_zone,
            envelope: parser::UtmEnvelope {
                easting_min: self.utm_easting_min,
                easting_max: self.utm_easting_max,
                northing_min: self.utm_northing_min,
                northing_max: self.utm_northing_max,
            },
            rounding: self.rounding,
            policy: if self.strict_projection {
                reproject::DegradationPolicy::Strict
            } else {
                reproject::DegradationPolicy::Lenient
            },
        })
    }
}

async fn real_main() -> anyhow::Result<()> {
    FmtSubscriber::builder()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_line_number(true)
        .with_target(true)
        .init();

    info!("Initializing version {}", version::VERSION);

    let config = Config::parse();

    info!("Configuration: {config:?}");

    let settings = config.parser_settings()?;
    let catalog = match &config.catalog_file {
        Some(path) => catalog::Catalog::load(path)?,
        None => {
            info!("No catalog file given, searches will return nothing");
            catalog::Catalog::empty()
        }
    };

    let app_state: AppState = Arc::new(State::new(settings, catalog));

    info!("Starting server on {}:{}", config.address, config.port);

    // Start the HTTP server.
    Ok(HttpServer::new(move || {
        // Configure CORS to allow cross-origin requests from any origin.
        let cors = Cors::permissive();

        App::new()
            .wrap(TracingLogger::default())
            .wrap(Compress::default())
            .wrap(cors)
            .app_data(web::Data::new(app_state.clone()))
            .configure(handlers::configure)
    })
    .bind((config.address.as_str(), config.port))?
    .run()
    .await?)
}

#[actix_web::main]
async fn main() -> std::process::ExitCode {
    match real_main().await {
        Ok(()) => std::process::ExitCode::from(0),
        Err(err) => {
            error!("{err:#}");
            std::process::ExitCode::from(10)
        }
    }
}
