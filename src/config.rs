//! Settings for the fetch and render stages
use chrono::{DateTime, TimeDelta, TimeZone};
use chrono_tz::{Europe::Berlin, Tz};
use std::{fmt, num::NonZeroU32, path::PathBuf};

use crate::model::{
    coordinate::{Coordinate, CoordinateError},
    directions_api_model::{TransitMode, TravelMode},
};

pub const API_KEY_VAR: &str = "GOOGLE_MAPS_API_KEY";

#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    #[error("Set {API_KEY_VAR} in the environment or in .env before running")]
    MissingApiKey,

    #[error("{0} is not a single point in time in {1}")]
    AmbiguousLocalTime(String, Tz),

    #[error("departure window step must be positive, got {0}")]
    NonPositiveStep(TimeDelta),

    #[error("departure window ends ({end}) before it starts ({start})")]
    WindowEndsBeforeStart {
        start: DateTime<Tz>,
        end: DateTime<Tz>,
    },

    #[error("invalid target coordinate")]
    InvalidCoordinate(#[from] CoordinateError),
}

/// Directions API credential
#[derive(Clone)]
pub struct ApiKey(String);

impl ApiKey {
    /// Reads the key from the environment. Call `dotenvy::dotenv` first to pick up `.env`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let key = dotenvy::var(API_KEY_VAR).map_err(|_| ConfigError::MissingApiKey)?;
        Self::new(key)
    }

    pub fn new(key: impl Into<String>) -> Result<Self, ConfigError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ConfigError::MissingApiKey);
        }
        Ok(ApiKey(key))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

// Keep the key out of logs and `#[instrument]` fields
impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(***)")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Target {
    pub name: String,
    pub coordinate: Coordinate,
}

impl Target {
    pub fn new(name: &str, latitude: f64, longitude: f64) -> Result<Self, ConfigError> {
        Ok(Target {
            name: name.to_string(),
            coordinate: Coordinate::new(latitude, longitude)?,
        })
    }
}

#[derive(Clone, Debug)]
pub enum DepartureSchedule {
    /// No departure time, used for bicycling
    Now,
    At(DateTime<Tz>),
    Window(DepartureWindow),
}

/// Departures from `start` to `end`, both included, every `step`
#[derive(Clone, Debug)]
pub struct DepartureWindow {
    start: DateTime<Tz>,
    end: DateTime<Tz>,
    step: TimeDelta,
}

impl DepartureWindow {
    pub fn new(
        start: DateTime<Tz>,
        end: DateTime<Tz>,
        step: TimeDelta,
    ) -> Result<Self, ConfigError> {
        if step <= TimeDelta::zero() {
            return Err(ConfigError::NonPositiveStep(step));
        }
        if end < start {
            return Err(ConfigError::WindowEndsBeforeStart { start, end });
        }

        Ok(DepartureWindow { start, end, step })
    }

    pub fn departures(&self) -> impl Iterator<Item = DateTime<Tz>> + '_ {
        std::iter::successors(Some(self.start), move |t| t.checked_add_signed(self.step))
            .take_while(move |t| *t <= self.end)
    }
}

/// One result document to produce
#[derive(Clone, Debug)]
pub struct FetchJob {
    pub name: String,
    pub target: Target,
    pub travel_mode: TravelMode,
    pub transit_modes: Vec<TransitMode>,
    pub schedule: DepartureSchedule,
    pub output: PathBuf,
}

#[derive(Clone, Debug)]
pub struct OriginSettings {
    pub path: PathBuf,
    pub has_headers: bool,
}

#[derive(Clone, Debug)]
pub struct BatchSettings {
    /// Number of origins fetched at the same time
    pub pool_size: usize,
    /// Completions per second above which the collector pauses briefly. `None` disables pacing.
    pub max_completions_per_second: Option<NonZeroU32>,
    /// Share of failed origins, in [0, 1], tolerated before the batch is abandoned
    pub max_failure_ratio: f64,
}

impl Default for BatchSettings {
    fn default() -> Self {
        BatchSettings {
            pool_size: 50,
            max_completions_per_second: NonZeroU32::new(50),
            max_failure_ratio: 0.1,
        }
    }
}

#[derive(Clone, Debug)]
pub struct ResultSource {
    pub mode: TravelMode,
    pub path: PathBuf,
}

#[derive(Clone, Debug)]
pub struct RenderTarget {
    pub target: Target,
    /// The first source is the target's primary mode
    pub sources: Vec<ResultSource>,
}

#[derive(Clone, Debug)]
pub struct TileSettings {
    pub url: String,
    pub attribution: String,
}

#[derive(Clone, Debug)]
pub struct RenderSettings {
    pub title: String,
    pub center: Coordinate,
    pub zoom: u8,
    pub tiles: TileSettings,
    pub targets: Vec<RenderTarget>,
    pub overlay: Option<PathBuf>,
    pub overlay_name: String,
    pub attribution: String,
    pub output: PathBuf,
}

#[derive(Clone, Debug)]
pub struct Settings {
    pub origins: OriginSettings,
    pub batch: BatchSettings,
    pub jobs: Vec<FetchJob>,
    pub render: RenderSettings,
}

impl Settings {
    /// Munich: the airport and the main station
    pub fn munich() -> Result<Self, ConfigError> {
        let airport = Target::new("Flughafen", 48.35389065534375, 11.786086141168415)?;
        let main_station = Target::new("Hauptbahnhof", 48.140386, 11.560027)?;
        // the map marker uses the MVV station point
        let main_station_marker = Target::new("Hauptbahnhof", 48.1403145, 11.56112)?;

        let airport_file = PathBuf::from("directions_results_airport.json");
        let main_station_file = PathBuf::from("directions_results_hbf.json");
        let main_station_bike_file = PathBuf::from("directions_results_hbf_bike.json");

        let jobs = vec![
            FetchJob {
                name: "airport".to_string(),
                target: airport.clone(),
                travel_mode: TravelMode::Transit,
                transit_modes: vec![
                    TransitMode::Train,
                    TransitMode::Bus,
                    TransitMode::Subway,
                    TransitMode::Tram,
                ],
                schedule: DepartureSchedule::At(local_time(2025, 8, 25, 8, 0)?),
                output: airport_file.clone(),
            },
            FetchJob {
                name: "hbf".to_string(),
                target: main_station.clone(),
                travel_mode: TravelMode::Transit,
                transit_modes: vec![
                    TransitMode::Bus,
                    TransitMode::Subway,
                    TransitMode::Train,
                    TransitMode::Tram,
                    TransitMode::Rail,
                ],
                schedule: DepartureSchedule::Window(DepartureWindow::new(
                    local_time(2025, 8, 25, 8, 0)?,
                    local_time(2025, 8, 25, 9, 0)?,
                    TimeDelta::minutes(5),
                )?),
                output: main_station_file.clone(),
            },
            FetchJob {
                name: "hbf-bike".to_string(),
                target: main_station,
                travel_mode: TravelMode::Bicycling,
                transit_modes: vec![],
                schedule: DepartureSchedule::Now,
                output: main_station_bike_file.clone(),
            },
        ];

        let render = RenderSettings {
            title: "Travel time to Munich Hauptbahnhof and Flughafen".to_string(),
            center: main_station_marker.coordinate,
            zoom: 5,
            tiles: TileSettings {
                url: "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png".to_string(),
                attribution: "&copy; <a href=\"https://www.openstreetmap.org/copyright\">OpenStreetMap</a> contributors &copy; <a href=\"https://carto.com/attributions\">CARTO</a>".to_string(),
            },
            targets: vec![
                RenderTarget {
                    target: main_station_marker,
                    sources: vec![
                        ResultSource {
                            mode: TravelMode::Transit,
                            path: main_station_file,
                        },
                        ResultSource {
                            mode: TravelMode::Bicycling,
                            path: main_station_bike_file,
                        },
                    ],
                },
                RenderTarget {
                    target: airport,
                    sources: vec![ResultSource {
                        mode: TravelMode::Transit,
                        path: airport_file,
                    }],
                },
            ],
            overlay: Some(PathBuf::from("gis_osm_railways_free_1.geojson")),
            overlay_name: "Rail network".to_string(),
            attribution: "Directions data © Google; usage subject to Google Maps Platform Terms. \
                Station coordinates from MVV open data. \
                Rail overlay from OSM/geofabrik shapefile."
                .to_string(),
            output: PathBuf::from("munich_hbf_airport.html"),
        };

        Ok(Settings {
            origins: OriginSettings {
                path: PathBuf::from("cords.csv"),
                has_headers: true,
            },
            batch: BatchSettings::default(),
            jobs,
            render,
        })
    }
}

fn local_time(
    year: i32,
    month: u32,
    day: u32,
    hour: u32,
    minute: u32,
) -> Result<DateTime<Tz>, ConfigError> {
    Berlin
        .with_ymd_and_hms(year, month, day, hour, minute, 0)
        .single()
        .ok_or_else(|| {
            ConfigError::AmbiguousLocalTime(
                format!("{year:04}-{month:02}-{day:02} {hour:02}:{minute:02}"),
                Berlin,
            )
        })
}
