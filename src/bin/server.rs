use std::{fs::OpenOptions, net::SocketAddr, path::PathBuf, process::ExitCode, sync::Arc};

use axum::{
    Router,
    extract::{MatchedPath, Request},
    middleware,
};
use axum_server::Handle;
use clap::Parser;
use tower_http::trace::TraceLayer;
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use harvest_ledger::{
    AnalyticsConfig, AppState, Error, Seed, Stores, build_router, graceful_shutdown,
    logging_middleware,
};

/// The web server for Harvest Ledger.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// The port to serve the app from.
    #[arg(short, long, default_value_t = 3000)]
    port: u16,

    /// File path to a JSON file with the farms, crops, tasks, expenses and
    /// budgets to start with. The stores start empty if omitted.
    #[arg(long)]
    seed_path: Option<PathBuf>,

    /// File path to a JSON file with the crop economics table and budget fallback.
    #[arg(long)]
    config_path: Option<PathBuf>,

    /// The budget the expenses page compares against, overriding the config file.
    #[arg(long)]
    default_total_budget: Option<f64>,

    /// The canonical name of the local timezone, e.g. "Pacific/Auckland".
    #[arg(long, default_value = "Etc/UTC")]
    timezone: String,
}

#[tokio::main]
async fn main() -> ExitCode {
    setup_logging();

    let args = Args::parse();

    let state = match load_state(&args) {
        Ok(state) => state,
        Err(error) => {
            tracing::error!("Could not start the server: {error}");
            return ExitCode::FAILURE;
        }
    };

    let addr = SocketAddr::from(([127, 0, 0, 1], args.port));

    let handle = Handle::new();
    tokio::spawn(graceful_shutdown(handle.clone()));

    let router = build_router(state).layer(middleware::from_fn(logging_middleware));
    let router = add_tracing_layer(router);

    tracing::info!("HTTP server listening on {}", addr);
    if let Err(error) = axum_server::bind(addr)
        .handle(handle)
        .serve(router.into_make_service())
        .await
    {
        tracing::error!("Server stopped with an error: {error}");
        return ExitCode::FAILURE;
    }

    ExitCode::SUCCESS
}

fn load_state(args: &Args) -> Result<AppState, Error> {
    if time_tz::timezones::get_by_name(&args.timezone).is_none() {
        return Err(Error::InvalidTimezoneError(args.timezone.clone()));
    }

    let stores = match &args.seed_path {
        Some(path) => Stores::from_seed(Seed::load(path)?)?,
        None => Stores::default(),
    };

    let mut analytics_config = match &args.config_path {
        Some(path) => AnalyticsConfig::load(path)?,
        None => AnalyticsConfig::default(),
    };

    if let Some(total_budget) = args.default_total_budget {
        if total_budget < 0.0 {
            return Err(Error::NegativeAmount(total_budget));
        }

        analytics_config.default_total_budget = total_budget;
    }

    Ok(AppState::new(stores, analytics_config, &args.timezone))
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}

fn add_tracing_layer(router: Router) -> Router {
    let tracing_layer = TraceLayer::new_for_http()
        .make_span_with(|req: &Request| {
            let method = req.method();
            let uri = req.uri();

            let matched_path = req
                .extensions()
                .get::<MatchedPath>()
                .map(|matched_path| matched_path.as_str());

            tracing::debug_span!("request", %method, %uri, matched_path)
        })
        // Errors are logged where they are handled.
        .on_failure(());

    router.layer(tracing_layer)
}
