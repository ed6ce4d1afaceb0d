//! Rail network overlay, read from GeoJSON
use std::{f64::consts::PI, fs, path::Path};

use geojson::{Feature, FeatureCollection, GeoJson, Geometry, Value};
use tracing::info;

/// Spherical radius used by Web Mercator
const WEB_MERCATOR_RADIUS_M: f64 = 6_378_137.0;

#[derive(thiserror::Error, Debug)]
pub enum OverlayError {
    #[error("error reading overlay {path}: {source}")]
    Io {
        path: String,
        source: std::io::Error,
    },

    #[error("error parsing overlay: {0}")]
    Parsing(#[from] geojson::Error),

    #[error("unsupported coordinate reference system {0}")]
    UnsupportedCrs(String),
}

#[derive(Copy, Clone, Debug, PartialEq)]
enum Crs {
    Wgs84,
    WebMercator,
}

#[tracing::instrument(err)]
pub fn load_overlay(path: &Path) -> Result<FeatureCollection, OverlayError> {
    let text = fs::read_to_string(path).map_err(|source| OverlayError::Io {
        path: path.display().to_string(),
        source,
    })?;

    let collection = parse_overlay(&text)?;

    info!(
        "Loaded {} overlay features from {}",
        collection.features.len(),
        path.display()
    );

    Ok(collection)
}

/// Parses GeoJSON into a feature collection in EPSG:4326
pub fn parse_overlay(text: &str) -> Result<FeatureCollection, OverlayError> {
    let mut collection = match text.parse::<GeoJson>()? {
        GeoJson::FeatureCollection(collection) => collection,
        GeoJson::Feature(feature) => FeatureCollection {
            bbox: None,
            features: vec![feature],
            foreign_members: None,
        },
        GeoJson::Geometry(geometry) => FeatureCollection {
            bbox: None,
            features: vec![Feature {
                bbox: None,
                geometry: Some(geometry),
                id: None,
                properties: None,
                foreign_members: None,
            }],
            foreign_members: None,
        },
    };

    let declared = collection
        .foreign_members
        .as_ref()
        .and_then(|members| members.get("crs"))
        .and_then(|crs| crs.pointer("/properties/name"))
        .and_then(|name| name.as_str())
        .map(str::to_string);

    let crs = match declared {
        None => Crs::Wgs84,
        Some(name) => crs_from_name(&name).ok_or(OverlayError::UnsupportedCrs(name))?,
    };

    if crs == Crs::WebMercator {
        for feature in &mut collection.features {
            feature.bbox = None;
            if let Some(geometry) = feature.geometry.as_mut() {
                reproject_geometry(geometry);
            }
        }
        collection.bbox = None;
    }

    if let Some(members) = collection.foreign_members.as_mut() {
        members.remove("crs");
    }

    Ok(collection)
}

/// Understands `EPSG:3857`, `urn:ogc:def:crs:EPSG::3857` and the OGC CRS84 urn
fn crs_from_name(name: &str) -> Option<Crs> {
    if name.ends_with("CRS84") {
        return Some(Crs::Wgs84);
    }

    match name.rsplit(':').next()? {
        "4326" => Some(Crs::Wgs84),
        "3857" | "900913" | "3785" => Some(Crs::WebMercator),
        _ => None,
    }
}

fn reproject_geometry(geometry: &mut Geometry) {
    geometry.bbox = None;
    reproject_value(&mut geometry.value);
}

fn reproject_value(value: &mut Value) {
    match value {
        Value::Point(position) => reproject_position(position),
        Value::MultiPoint(positions) | Value::LineString(positions) => {
            positions.iter_mut().for_each(|p| reproject_position(p))
        }
        Value::MultiLineString(lines) | Value::Polygon(lines) => lines
            .iter_mut()
            .flatten()
            .for_each(|p| reproject_position(p)),
        Value::MultiPolygon(polygons) => polygons
            .iter_mut()
            .flatten()
            .flatten()
            .for_each(|p| reproject_position(p)),
        Value::GeometryCollection(geometries) => {
            geometries.iter_mut().for_each(reproject_geometry)
        }
    }
}

/// Web Mercator metres to longitude/latitude degrees, in place
fn reproject_position(position: &mut Vec<f64>) {
    if position.len() < 2 {
        return;
    }

    let x = position[0];
    let y = position[1];

    position[0] = (x / WEB_MERCATOR_RADIUS_M).to_degrees();
    position[1] = (2.0 * (y / WEB_MERCATOR_RADIUS_M).exp().atan() - PI / 2.0).to_degrees();
}
