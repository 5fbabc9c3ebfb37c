use clap::Parser;
use gohubs_locator::config::Settings;
use gohubs_locator::geo::Coordinate;
use gohubs_locator::location::{
    CachedProvider, IpLocationProvider, LocationCache, LocationProvider, ManualProvider,
    ResolutionWorkflow, WorkflowState,
};
use gohubs_locator::view::ResolutionView;
use gohubs_locator::{logging, report, server, ServiceAreaPolicy};
use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

/// GOHUBS Locator: nearest GOHUBS centers around Visakhapatnam
///
/// Checks that you are inside the GOHUBS service area and lists the
/// nearest centers with distance, phone and services.
///
/// Examples:
///   gohubs --lat 17.7231 --lon 83.3077
///   gohubs --auto
///   gohubs --offline
///   gohubs --list
///   gohubs --serve --port 8080
#[derive(Parser)]
#[command(name = "gohubs", version, about, long_about = None)]
struct Cli {
    /// Your latitude (-90 to 90).
    #[arg(long, allow_hyphen_values = true)]
    lat: Option<f64>,

    /// Your longitude (-180 to 180).
    #[arg(long, allow_hyphen_values = true)]
    lon: Option<f64>,

    /// Auto-detect location via IP geolocation.
    #[arg(long, short = 'a')]
    auto: bool,

    /// Offline mode: only use a recently cached location.
    #[arg(long)]
    offline: bool,

    /// Settings file (JSON). Defaults to ~/.gohubs/settings.json if present.
    #[arg(long)]
    settings: Option<PathBuf>,

    /// Center catalog file (JSON array). Defaults to the built-in centers.
    #[arg(long)]
    catalog: Option<PathBuf>,

    /// Service-area anchor latitude.
    #[arg(long, allow_hyphen_values = true, requires = "anchor_lon")]
    anchor_lat: Option<f64>,

    /// Service-area anchor longitude.
    #[arg(long, allow_hyphen_values = true, requires = "anchor_lat")]
    anchor_lon: Option<f64>,

    /// Service-area radius in km.
    #[arg(long)]
    radius: Option<f64>,

    /// How many centers to list.
    #[arg(long, short = 'k')]
    top_k: Option<usize>,

    /// Location request timeout in seconds.
    #[arg(long)]
    timeout: Option<f64>,

    /// Reuse a cached location up to this many seconds old.
    #[arg(long)]
    max_age: Option<f64>,

    /// Print the center catalog and exit.
    #[arg(long)]
    list: bool,

    /// Start the HTTP API instead of resolving once.
    #[arg(long)]
    serve: bool,

    /// Bind address for --serve.
    #[arg(long, default_value = "127.0.0.1")]
    host: String,

    /// Port for --serve.
    #[arg(long, default_value_t = 8080)]
    port: u16,

    /// Debug logging.
    #[arg(long, short = 'v')]
    verbose: bool,
}

#[tokio::main]
async fn main() {
    let cli = Cli::parse();
    logging::init_logger(logging::default_filter(cli.verbose, cli.serve));

    // ── Settings ────────────────────────────────────────────────

    let settings = load_settings(&cli).unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });

    let resolver = settings.build_resolver().unwrap_or_else(|e| {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    });
    let resolver = Arc::new(resolver);

    if cli.list {
        eprint!("{}", report::render_catalog(resolver.catalog()));
        return;
    }

    if cli.serve {
        if let Err(e) = server::start(&cli.host, cli.port, resolver, settings.location).await {
            eprintln!("Server error on {}:{}: {}", cli.host, cli.port, e);
            std::process::exit(1);
        }
        return;
    }

    // ── Locate and resolve ──────────────────────────────────────

    let provider = select_provider(&cli);
    let mut workflow = ResolutionWorkflow::new(resolver);
    let state = workflow.run(provider.as_ref(), &settings.location).await;

    // Text to stderr, JSON to stdout
    eprint!("{}", report::render_resolution(state));
    if let Some(view) = ResolutionView::from_state(state) {
        match serde_json::to_string_pretty(&view) {
            Ok(json) => println!("{}", json),
            Err(e) => {
                eprintln!("Error: {}", e);
                std::process::exit(1);
            }
        }
    }

    if !matches!(state, WorkflowState::Resolved { .. }) {
        std::process::exit(2);
    }
}

fn load_settings(cli: &Cli) -> Result<Settings, gohubs_locator::config::ConfigError> {
    let mut settings = match &cli.settings {
        Some(path) => Settings::load_from(path)?,
        None => Settings::load()?,
    };

    if let Some(ref path) = cli.catalog {
        settings.catalog_path = Some(path.clone());
    }
    if let (Some(lat), Some(lon)) = (cli.anchor_lat, cli.anchor_lon) {
        let anchor = Coordinate::new(lat, lon).unwrap_or_else(|e| {
            eprintln!("Error: Invalid service-area anchor: {}", e);
            std::process::exit(1);
        });
        settings.service_area = ServiceAreaPolicy::new(anchor, settings.service_area.radius_km);
    }
    if let Some(radius) = cli.radius {
        settings.service_area.radius_km = radius;
    }
    if let Some(k) = cli.top_k {
        settings.top_k = k;
    }
    if let Some(secs) = cli.timeout {
        settings.location.timeout = seconds(secs, "--timeout");
    }
    if let Some(secs) = cli.max_age {
        settings.location.max_age = seconds(secs, "--max-age");
    }

    settings.validate()?;
    Ok(settings)
}

fn seconds(secs: f64, flag: &str) -> Duration {
    Duration::try_from_secs_f64(secs).unwrap_or_else(|_| {
        eprintln!("Error: {} must be a non-negative number of seconds", flag);
        std::process::exit(1);
    })
}

fn select_provider(cli: &Cli) -> Box<dyn LocationProvider> {
    // Priority: --lat/--lon > --auto/--offline > error

    // 1. Manual coordinates
    if let (Some(lat), Some(lon)) = (cli.lat, cli.lon) {
        let coordinate = Coordinate::new(lat, lon).unwrap_or_else(|e| {
            eprintln!("Error: {}", e);
            std::process::exit(1);
        });
        return Box::new(ManualProvider::new(coordinate));
    }

    // 2. IP geolocation through the max-age cache; --offline keeps the
    //    network lookup switched off so only a cached fix can answer
    if cli.auto || cli.offline {
        let mut ip = IpLocationProvider::new();
        ip.set_offline(cli.offline);
        return Box::new(CachedProvider::new(ip, LocationCache::load()));
    }

    // 3. Nothing provided
    eprintln!("Error: No location specified.");
    eprintln!();
    eprintln!("Usage:");
    eprintln!("  gohubs --lat 17.7231 --lon 83.3077");
    eprintln!("  gohubs --auto");
    eprintln!("  gohubs --offline");
    eprintln!("  gohubs --list");
    eprintln!("  gohubs --serve");
    std::process::exit(1);
}
