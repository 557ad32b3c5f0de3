//! Plan one obstacle-avoiding route from the command line.
//!
//! ```text
//! TOMTOM_API_KEY=... plan_route \
//!     --origin 23.7767759,90.3996056 --destination 23.8104016,90.4125185 \
//!     --obstacle 90.399345,23.791977,90.401485,23.793821 --output route.geojson
//! ```

use anyhow::{bail, Context, Result};
use clap::Parser;
use detour_core::LatLon;
use detour_server::{
    config::Config, plan_route, CancelToken, DepartAt, PlanStatus, RoutePlanRequest, RouteType,
    TomTomClient,
};
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Start point as lat,lon
    #[arg(long, default_value = "23.7767759,90.3996056")]
    origin: LatLon,

    /// End point as lat,lon
    #[arg(long, default_value = "23.8104016,90.4125185")]
    destination: LatLon,

    /// Obstacle as minLon,minLat,maxLon,maxLat[,id]; repeatable
    #[arg(long = "obstacle", value_parser = parse_obstacle)]
    obstacles: Vec<ObstacleArg>,

    /// fastest, shortest, eco, efficient or thrilling
    #[arg(long)]
    route_type: Option<String>,

    /// Use historical instead of live traffic
    #[arg(long)]
    historical: bool,

    /// Departure time: now or RFC 3339
    #[arg(long, default_value = "now")]
    depart_at: DepartAt,

    /// Override the avoid-area cap
    #[arg(long)]
    max_avoid_areas: Option<usize>,

    /// Write the planned route as GeoJSON
    #[arg(long)]
    output: Option<PathBuf>,
}

#[derive(Debug, Clone, PartialEq)]
struct ObstacleArg(Vec<f64>);

fn parse_obstacle(value: &str) -> Result<ObstacleArg, String> {
    value
        .split(',')
        .map(|part| {
            part.trim()
                .parse::<f64>()
                .map_err(|_| format!("invalid obstacle value {:?}", part.trim()))
        })
        .collect::<Result<Vec<_>, _>>()
        .map(ObstacleArg)
}

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::registry()
        .with(tracing_subscriber::fmt::layer())
        .with(tracing_subscriber::EnvFilter::from_default_env()
            .add_directive("detour_server=info".parse()?))
        .init();

    let args = Args::parse();
    let mut config = Config::from_env();
    if let Some(cap) = args.max_avoid_areas {
        config.max_avoid_areas = cap;
    }
    if config.provider_api_key.is_none() {
        bail!("set DETOUR_PROVIDER_API_KEY or TOMTOM_API_KEY");
    }

    let provider = TomTomClient::from_config(&config)?;
    let cancel = CancelToken::new();
    let on_interrupt = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("Interrupted; stopping after the current provider call");
            on_interrupt.cancel();
        }
    });

    let request = RoutePlanRequest {
        origin: args.origin,
        destination: args.destination,
        obstacles: args.obstacles.into_iter().map(|arg| arg.0).collect(),
        route_type: args.route_type.as_deref().map(RouteType::from_name),
        traffic: Some(!args.historical),
        depart_at: Some(args.depart_at),
    };
    let response = plan_route(&provider, &config, request, cancel).await?;

    let summary = response.route.summary;
    println!(
        "Distance: {:.2} km, ETA: {:.1} min",
        summary.length_km(),
        summary.travel_time_min()
    );
    println!(
        "Iterations: {}, avoided obstacles: {:?}",
        response.iterations,
        response.avoided.iter().map(|o| o.id).collect::<Vec<_>>()
    );
    if response.status == PlanStatus::Exhausted {
        println!(
            "Unresolved collisions ({:?}):",
            response.abort_reason
        );
        for hit in &response.collisions {
            println!(
                "  obstacle {} at segment {} ({:.6}, {:.6})",
                hit.rect_id,
                hit.segment_index,
                hit.hit_point.lon(),
                hit.hit_point.lat()
            );
        }
    }

    if let Some(path) = args.output {
        let geojson = serde_json::to_string_pretty(&response.route.to_feature_collection())?;
        std::fs::write(&path, geojson)
            .with_context(|| format!("failed to write {}", path.display()))?;
        println!("Saved route to {}", path.display());
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn obstacle_argument_parses_four_or_five_values() {
        assert_eq!(
            parse_obstacle("90.399345, 23.791977,90.401485,23.793821").expect("parse"),
            ObstacleArg(vec![90.399345, 23.791977, 90.401485, 23.793821])
        );
        assert_eq!(parse_obstacle("1,2,3,4,7").expect("parse").0.len(), 5);
        assert!(parse_obstacle("1,2,x,4").is_err());
    }

    #[test]
    fn defaults_parse() {
        let args = Args::parse_from(["plan_route"]);
        assert_eq!(args.origin, LatLon::new(23.7767759, 90.3996056));
        assert_eq!(args.depart_at, DepartAt::Now);
        assert!(args.obstacles.is_empty());
    }

    #[test]
    fn obstacles_repeat() {
        let args = Args::parse_from([
            "plan_route",
            "--obstacle",
            "1,2,3,4",
            "--obstacle",
            "5,6,7,8,9",
            "--historical",
        ]);
        assert_eq!(args.obstacles.len(), 2);
        assert_eq!(args.obstacles[1].0[4], 9.0);
        assert!(args.historical);
    }
}
