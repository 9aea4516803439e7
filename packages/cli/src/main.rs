#![cfg_attr(feature = "fail-on-warnings", deny(warnings))]
#![warn(clippy::all, clippy::pedantic, clippy::nursery, clippy::cargo)]
#![allow(clippy::multiple_crate_versions, clippy::cargo_common_metadata)]

//! Command-line inspector for the facility proximity index.
//!
//! ```text
//! anshin_navi_cli nearest --lat 35.68 --lon 139.76 --filter tsunami
//! anshin_navi_cli visible --lat 35.68 --lon 139.76 --lat-delta 0.05 --lon-delta 0.05 --kind police
//! anshin_navi_cli nearby --lat 35.68 --lon 139.76 --radius 1500
//! anshin_navi_cli hierarchy 13-marunouchi-yurakucho
//! anshin_navi_cli regions --kind shelter
//! anshin_navi_cli search 公園
//! ```
//!
//! Datasets default to the samples bundled with `anshin_navi_facility`;
//! pass `--shelters` or `--police` to load a file instead. A file that
//! fails to load leaves that catalog empty.

use std::path::PathBuf;
use std::sync::Arc;

use anshin_navi_facility::{
    Catalog, CatalogHandle, LoadError, bundled_police, bundled_shelters, hierarchy, load_or_empty,
    search,
};
use anshin_navi_facility_models::{
    Coordinate, Facility, FacilityPredicate, PoliceBase, PoliceDataset, PoliceType, PoliceTypeSet,
    Region, Shelter, ShelterDataset, ShelterFilterType,
};
use anshin_navi_query::{QueryService, QuerySettings, VisibleQueryRequest};
use anshin_navi_spatial::distance;
use anshin_navi_spatial::format::{format_distance, google_maps_url};
use clap::{Args, Parser, Subcommand, ValueEnum};

#[derive(Parser)]
#[command(
    name = "anshin_navi_cli",
    about = "Find evacuation shelters and police facilities near a point"
)]
struct Cli {
    /// Shelter dataset (JSON). Defaults to the bundled sample
    #[arg(long, global = true)]
    shelters: Option<PathBuf>,
    /// Police dataset (JSON). Defaults to the bundled sample
    #[arg(long, global = true)]
    police: Option<PathBuf>,
    /// Query settings (TOML). Defaults to the built-in settings
    #[arg(long, global = true)]
    settings: Option<PathBuf>,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Show the single nearest facility passing the filters
    Nearest {
        #[command(flatten)]
        point: PointArgs,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List facilities inside a map viewport, nearest to its center first
    Visible {
        #[command(flatten)]
        point: PointArgs,
        /// North-south extent of the viewport in degrees
        #[arg(long, default_value = "0.05")]
        lat_delta: f64,
        /// East-west extent of the viewport in degrees
        #[arg(long, default_value = "0.05")]
        lon_delta: f64,
        /// Maximum number of facilities to list
        #[arg(long)]
        max: Option<usize>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// List facilities within a radius of a point
    Nearby {
        #[command(flatten)]
        point: PointArgs,
        /// Radius in meters. Defaults to the configured radius
        #[arg(long)]
        radius: Option<f64>,
        #[command(flatten)]
        filters: FilterArgs,
    },
    /// Show the chain of command above a police facility
    Hierarchy {
        /// Police facility id
        id: String,
    },
    /// List municipalities (shelters) or prefectures (police)
    Regions {
        #[arg(long, value_enum, default_value = "shelter")]
        kind: Kind,
    },
    /// Search facilities by name
    Search {
        /// Case-insensitive substring to look for
        keyword: String,
        #[arg(long, value_enum, default_value = "shelter")]
        kind: Kind,
    },
}

#[derive(Args)]
struct PointArgs {
    /// Latitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lat: f64,
    /// Longitude in degrees
    #[arg(long, allow_negative_numbers = true)]
    lon: f64,
}

impl PointArgs {
    const fn coordinate(&self) -> Coordinate {
        Coordinate::new(self.lat, self.lon)
    }
}

#[derive(Args)]
struct FilterArgs {
    /// Which catalog to query
    #[arg(long, value_enum, default_value = "shelter")]
    kind: Kind,
    /// Hazard a shelter must be rated for (repeatable, shelters only)
    #[arg(long = "filter", value_parser = parse_shelter_filter)]
    hazards: Vec<ShelterFilterType>,
    /// Police tier to include (repeatable, police only)
    #[arg(long = "police-type", value_parser = parse_police_type)]
    police_types: Vec<PoliceType>,
}

#[derive(Clone, Copy, ValueEnum)]
enum Kind {
    Shelter,
    Police,
}

/// A proximity query against either catalog.
enum Query {
    Nearest(Coordinate),
    Visible {
        region: Region,
        max_results: Option<usize>,
    },
    Nearby {
        center: Coordinate,
        radius_meters: Option<f64>,
    },
}

fn parse_shelter_filter(s: &str) -> Result<ShelterFilterType, String> {
    s.parse().map_err(|_| {
        let known: Vec<String> = ShelterFilterType::all()
            .iter()
            .map(ToString::to_string)
            .collect();
        format!("unknown hazard {s:?}, expected one of: {}", known.join(", "))
    })
}

fn parse_police_type(s: &str) -> Result<PoliceType, String> {
    s.parse()
        .map_err(|_| format!("unknown police type {s:?}, expected koban, keisatsusho, or honbu"))
}

/// Dataset locations chosen on the command line.
struct Datasets {
    shelters: Option<PathBuf>,
    police: Option<PathBuf>,
}

impl Datasets {
    fn shelters(&self) -> Result<Catalog<Shelter>, LoadError> {
        self.shelters.as_deref().map_or_else(bundled_shelters, |path| {
            Ok(load_or_empty::<ShelterDataset>(path).0)
        })
    }

    fn police(&self) -> Result<Catalog<PoliceBase>, LoadError> {
        self.police.as_deref().map_or_else(bundled_police, |path| {
            Ok(load_or_empty::<PoliceDataset>(path).0)
        })
    }
}

fn print_facility<F: Facility>(rank: usize, facility: &F, reference: Coordinate) {
    let coordinate = facility.coordinate();
    println!(
        "{rank:>3}. {:<32} {:>9}  {}  {}",
        facility.name(),
        format_distance(distance(reference, coordinate)),
        facility.id(),
        google_maps_url(coordinate),
    );
}

fn print_ranked<F: Facility>(facilities: &[F], reference: Coordinate) {
    for (i, facility) in facilities.iter().enumerate() {
        print_facility(i + 1, facility, reference);
    }
}

async fn run_query<F, P>(
    service: Arc<QueryService<F>>,
    query: Query,
    predicates: Vec<P>,
) -> Result<(), Box<dyn std::error::Error>>
where
    F: Facility + Clone + Send + Sync + 'static,
    P: FacilityPredicate<F> + Send + 'static,
{
    match query {
        Query::Nearest(reference) => match service.closest_matching(reference, &predicates)? {
            Some(facility) => print_facility(1, &facility, reference),
            None => println!("No matching facility found."),
        },
        Query::Visible {
            region,
            max_results,
        } => {
            let mut request = VisibleQueryRequest::new(region).with_predicates(predicates);
            request.max_results = max_results;
            let response = service.query_visible_async(request).await?;

            print_ranked(&response.visible_sorted, region.center);
            println!(
                "\n{} of {} matching shown ({} in view before filtering)",
                response.visible_sorted.len(),
                response.visible_count,
                response.unfiltered_sorted.len(),
            );
        }
        Query::Nearby {
            center,
            radius_meters,
        } => {
            let (sorted, total) = service.nearby(center, radius_meters, &predicates)?;
            print_ranked(&sorted, center);
            println!("\n{} of {total} shown", sorted.len());
        }
    }

    Ok(())
}

async fn dispatch(
    query: Query,
    filters: FilterArgs,
    datasets: &Datasets,
    settings: QuerySettings,
) -> Result<(), Box<dyn std::error::Error>> {
    match filters.kind {
        Kind::Shelter => {
            if !filters.police_types.is_empty() {
                log::warn!("--police-type has no effect on shelters");
            }
            let catalog = datasets.shelters()?;
            let service = QueryService::new(Arc::new(CatalogHandle::new(catalog)), settings);
            run_query(Arc::new(service), query, filters.hazards).await
        }
        Kind::Police => {
            if !filters.hazards.is_empty() {
                log::warn!("--filter has no effect on police facilities");
            }
            let types: PoliceTypeSet = filters.police_types.into_iter().collect();
            let catalog = datasets.police()?;
            let service = QueryService::new(Arc::new(CatalogHandle::new(catalog)), settings);
            run_query(Arc::new(service), query, vec![types]).await
        }
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    pretty_env_logger::init_custom_env("RUST_LOG");
    let Cli {
        shelters,
        police,
        settings: settings_path,
        command,
    } = Cli::parse();
    let datasets = Datasets { shelters, police };

    let settings = match &settings_path {
        Some(path) => QuerySettings::load(path)?,
        None => QuerySettings::default(),
    }
    .with_env_overrides();
    log::debug!("Query settings: {settings:?}");

    match command {
        Commands::Nearest { point, filters } => {
            dispatch(Query::Nearest(point.coordinate()), filters, &datasets, settings).await?;
        }
        Commands::Visible {
            point,
            lat_delta,
            lon_delta,
            max,
            filters,
        } => {
            let query = Query::Visible {
                region: Region::new(point.coordinate(), lat_delta, lon_delta),
                max_results: max,
            };
            dispatch(query, filters, &datasets, settings).await?;
        }
        Commands::Nearby {
            point,
            radius,
            filters,
        } => {
            let query = Query::Nearby {
                center: point.coordinate(),
                radius_meters: radius,
            };
            dispatch(query, filters, &datasets, settings).await?;
        }
        Commands::Hierarchy { id } => {
            let catalog = datasets.police()?;
            let Some(station) = catalog.by_id(&id) else {
                eprintln!("Police facility not found: {id}");
                std::process::exit(1);
            };

            for (depth, entry) in hierarchy::hierarchy_chain(&catalog, station)
                .into_iter()
                .enumerate()
            {
                println!(
                    "{}{} [{}] {}",
                    "  ".repeat(depth),
                    entry.name,
                    entry.police_type,
                    entry.id
                );
            }
        }
        Commands::Regions { kind } => match kind {
            Kind::Shelter => {
                let catalog = datasets.shelters()?;
                for (code, shelters) in catalog.by_region() {
                    let name = shelters.first().map_or("", |s| s.region_name.as_str());
                    println!("{code:<8} {name:<24} {}", shelters.len());
                }
            }
            Kind::Police => {
                let catalog = datasets.police()?;
                for (prefecture, stations) in catalog.by_prefecture() {
                    println!("{prefecture:<24} {}", stations.len());
                }
            }
        },
        Commands::Search { keyword, kind } => match kind {
            Kind::Shelter => {
                let catalog = datasets.shelters()?;
                for shelter in search::search_shelters(&catalog, &keyword) {
                    println!("{:<32} {}  {}", shelter.name, shelter.region_name, shelter.id);
                }
            }
            Kind::Police => {
                let catalog = datasets.police()?;
                for station in search::search_police(&catalog, &keyword) {
                    println!("{:<32} {}  {}", station.name, station.prefecture, station.id);
                }
            }
        },
    }

    Ok(())
}
