use std::{fs::File, io::BufReader, path::PathBuf, sync::Arc};

use anyhow::Context;
use clap::Args;
use hermes_navigation::{
    config::NavigationConfig,
    coordinate::Coordinate,
    driver::{self, DriveOutcome},
    fix::Fix,
    route::{Route, RoutePlan},
    session::{NavigationSession, NavigationUpdate, RerouteEvent},
};
use hermes_osrm::client::{OsrmRouteClient, OsrmRouteClientParams};
use tokio::sync::mpsc;
use tracing::{info, warn};

use crate::parsers;

#[derive(Args)]
pub struct NavigateArgs {
    /// JSON array of fixes to replay
    #[arg(long, short = 'f')]
    fixes: PathBuf,

    /// JSON route plan, planned with OSRM when missing
    #[arg(long, short = 'r')]
    route: Option<PathBuf>,

    /// Origin as lat,lng, defaults to the first fix
    #[arg(long, value_parser = parsers::parse_coordinate)]
    origin: Option<Coordinate>,

    /// Destination as lat,lng, defaults to the end of the route
    #[arg(long, value_parser = parsers::parse_coordinate)]
    destination: Option<Coordinate>,

    #[arg(long, env = "HERMES_OSRM_URL", default_value = "http://localhost:5000")]
    osrm_url: String,

    /// JSON navigation config
    #[arg(long, short = 'c')]
    config: Option<PathBuf>,
}

pub async fn run(args: NavigateArgs) -> anyhow::Result<()> {
    let config = match &args.config {
        Some(path) => NavigationConfig::from_reader(BufReader::new(File::open(path)?))
            .with_context(|| format!("Invalid config {}", path.display()))?,
        None => NavigationConfig::default(),
    };

    let fixes: Vec<Fix> = serde_json::from_reader(BufReader::new(File::open(&args.fixes)?))
        .with_context(|| format!("Invalid fix trace {}", args.fixes.display()))?;

    let planner = Arc::new(OsrmRouteClient::new(OsrmRouteClientParams {
        osrm_url: args.osrm_url.clone(),
        step_match_tolerance: config.step_match_tolerance,
    }));

    let mut session = NavigationSession::new(planner, config.clone());

    match &args.route {
        Some(path) => {
            let plan: RoutePlan = serde_json::from_reader(BufReader::new(File::open(path)?))
                .with_context(|| format!("Invalid route {}", path.display()))?;
            let route = Route::new(plan, config.step_match_tolerance)?;
            let destination = args.destination.unwrap_or_else(|| route.destination());
            session.start(route, destination)?;
        }
        None => {
            let origin = args
                .origin
                .or_else(|| fixes.first().map(|fix| fix.coordinate))
                .context("An origin or at least one fix is required")?;
            let destination = args
                .destination
                .context("A destination is required without a route file")?;
            session.plan_and_start(origin, destination).await?;
        }
    }

    if let Some(route) = session.route() {
        info!(
            "Route: points = {}, steps = {}, distance = {}",
            route.len(),
            route.steps().len(),
            route.distance()
        );
    }

    let stop_handle = session.stop_handle();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            warn!("Interrupted, stopping navigation");
            stop_handle.stop();
        }
    });

    let (fix_sender, fix_receiver) = mpsc::channel(16);
    let (update_sender, mut update_receiver) = mpsc::channel(16);

    tokio::spawn(async move {
        for fix in fixes {
            if fix_sender.send(fix).await.is_err() {
                break;
            }
        }
    });

    let printer = tokio::spawn(async move {
        while let Some(update) = update_receiver.recv().await {
            log_update(&update);
        }
    });

    let outcome = driver::drive(&mut session, fix_receiver, update_sender).await?;
    printer.await?;

    match outcome {
        DriveOutcome::Completed => info!("Arrived at destination"),
        DriveOutcome::Stopped => info!("Navigation stopped"),
        DriveOutcome::FixesExhausted => info!("Fix trace ended before arrival"),
        DriveOutcome::UpdatesClosed => warn!("Update consumer closed"),
    }

    Ok(())
}

fn log_update(update: &NavigationUpdate) {
    for event in &update.reroute_events {
        match event {
            RerouteEvent::Requested => info!("Off route, requesting a new route"),
            RerouteEvent::Installed => info!("New route installed"),
            RerouteEvent::Failed(reason) => warn!("Reroute failed: {}", reason),
        }
    }

    info!(
        "step = {} ({}), to step end = {}, off route = {}, remaining = {}, eta = {}, speed = {:.1}km/h",
        update.step_index,
        update.current_step.instruction,
        update.distance_to_step_end,
        update.distance_to_route,
        update.remaining_distance,
        update.arrival,
        update.speed.value(),
    );
}
