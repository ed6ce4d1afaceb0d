//! Builds the interactive travel time map
use std::fs;

use anyhow::Context;
use geojson::FeatureCollection;
use serde::Serialize;
use tracing::{debug, error, info, warn};

use super::{
    color::hex_color_for_minutes,
    legend::{attribution_html, legend_html},
};
use crate::{
    config::{RenderSettings, Target, TileSettings},
    dal::{load_overlay, read_results},
    model::{
        coordinate::Coordinate,
        directions_api_model::{Route, TravelMode},
        result_model::OriginResult,
    },
    utils::{escape_html, json_for_script},
};

const TEMPLATE: &str = include_str!("map_template.html");

/// Everything the page script needs, embedded into the page as JSON
#[derive(Debug, Serialize)]
pub struct MapData {
    pub center: Coordinate,
    pub zoom: u8,
    pub tiles: TileLayer,
    pub layers: Vec<Layer>,
    pub overlay: Option<OverlayLayer>,
}

#[derive(Debug, Serialize)]
pub struct TileLayer {
    pub url: String,
    pub attribution: String,
}

impl From<&TileSettings> for TileLayer {
    fn from(value: &TileSettings) -> Self {
        TileLayer {
            url: value.url.clone(),
            attribution: value.attribution.clone(),
        }
    }
}

/// A toggleable group: the markers of one (target, mode) document plus the target itself
#[derive(Debug, Serialize)]
pub struct Layer {
    pub name: String,
    pub show: bool,
    pub markers: Vec<CircleMarker>,
    pub destination: DestinationMarker,
}

#[derive(Debug, Serialize)]
pub struct CircleMarker {
    pub location: Coordinate,
    pub color: String,
    pub tooltip: String,
    pub popup: String,
}

#[derive(Debug, Serialize)]
pub struct DestinationMarker {
    pub location: Coordinate,
    pub icon: &'static str,
    pub color: &'static str,
    pub popup: String,
}

#[derive(Debug, Serialize)]
pub struct OverlayLayer {
    pub name: String,
    pub geojson: FeatureCollection,
    pub style: LineStyle,
}

#[derive(Debug, Serialize)]
pub struct LineStyle {
    pub color: &'static str,
    pub weight: f64,
    pub opacity: f64,
}

const RAIL_STYLE: LineStyle = LineStyle {
    color: "#555",
    weight: 1.5,
    opacity: 0.7,
};

/// Reads the result documents and the overlay, then writes the map page.
/// Anything that can't be read is left out of the map instead of failing it.
#[tracing::instrument(err, skip_all, fields(output = %settings.output.display()))]
pub fn render_map(settings: &RenderSettings) -> anyhow::Result<()> {
    let map = build_map(settings);
    let html = map.to_html(settings)?;

    fs::write(&settings.output, html)
        .with_context(|| format!("error writing map {}", settings.output.display()))?;

    info!("Map saved: {}", settings.output.display());

    Ok(())
}

pub fn build_map(settings: &RenderSettings) -> MapData {
    let mut layers = vec![];

    for (target_index, render_target) in settings.targets.iter().enumerate() {
        for (source_index, source) in render_target.sources.iter().enumerate() {
            let results = match read_results(&source.path) {
                Ok(results) => results,
                Err(e) if e.is_not_found() => {
                    warn!("Missing file: {}", source.path.display());
                    continue;
                }
                Err(e) => {
                    error!("Skipping layer: {e}");
                    continue;
                }
            };

            // only the first target's primary mode starts visible
            let show = target_index == 0 && source_index == 0;
            layers.push(build_layer(
                &render_target.target,
                source.mode,
                &results,
                show,
            ));
        }
    }

    let overlay = settings
        .overlay
        .as_deref()
        .and_then(|path| match load_overlay(path) {
            Ok(geojson) => Some(OverlayLayer {
                name: settings.overlay_name.clone(),
                geojson,
                style: RAIL_STYLE,
            }),
            Err(e) => {
                warn!("Rail overlay skipped: {e}");
                None
            }
        });

    MapData {
        center: settings.center,
        zoom: settings.zoom,
        tiles: TileLayer::from(&settings.tiles),
        layers,
        overlay,
    }
}

pub fn build_layer(
    target: &Target,
    mode: TravelMode,
    results: &[OriginResult],
    show: bool,
) -> Layer {
    let markers = results.iter().filter_map(circle_marker).collect::<Vec<_>>();

    debug!(
        "{} markers for {} ({})",
        markers.len(),
        target.name,
        mode.layer_label()
    );

    Layer {
        name: format!("{} ({})", target.name, mode.layer_label()),
        show,
        markers,
        destination: destination_marker(target, mode),
    }
}

fn circle_marker(result: &OriginResult) -> Option<CircleMarker> {
    let route = result.response.best_route()?;
    let minutes = result.duration_minutes()?;
    let color = hex_color_for_minutes(minutes);

    Some(CircleMarker {
        location: result.origin,
        color,
        tooltip: format!("{minutes:.1} min"),
        popup: popup_html(minutes, route),
    })
}

/// Total time and the step list. Instructions come from the API as HTML and are kept as is.
fn popup_html(minutes: f64, route: &Route) -> String {
    let mut html =
        format!("<div style='font-size:13px;'><b>Total time:</b> {minutes:.1} min<br><b>Route:</b><br>");

    for step in route.steps() {
        let instruction = step.html_instructions.as_deref().unwrap_or_default();
        let line = step
            .transit_details
            .as_ref()
            .map(|transit| {
                format!(
                    " ({} -&gt; {})",
                    escape_html(transit.line.label()),
                    escape_html(transit.headsign.as_deref().unwrap_or_default())
                )
            })
            .unwrap_or_default();

        html.push_str(&format!("• {instruction}{line}<br>"));
    }

    html.push_str("</div>");
    html
}

fn destination_marker(target: &Target, mode: TravelMode) -> DestinationMarker {
    let (icon, color) = match mode {
        TravelMode::Transit => ("train", "red"),
        TravelMode::Bicycling => ("bicycle", "darkgreen"),
    };

    DestinationMarker {
        location: target.coordinate,
        icon,
        color,
        popup: format!("<b>{}</b><br>(destination)", escape_html(&target.name)),
    }
}

impl MapData {
    pub fn to_html(&self, settings: &RenderSettings) -> Result<String, serde_json::Error> {
        let data = json_for_script(&serde_json::to_string(self)?);

        Ok(TEMPLATE
            .replace("{{TITLE}}", &escape_html(&settings.title))
            .replace("{{LEGEND}}", &legend_html())
            .replace("{{ATTRIBUTION}}", &attribution_html(&settings.attribution))
            .replace("{{MAP_DATA}}", &data))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::{ResultSource, Settings},
        dal::write_results,
        model::{
            directions_api_model::{
                ApiStatus, Leg, Step, TextValue, TransitDetails, TransitLine,
            },
            route_candidate::RouteCandidate,
        },
    };
    use scraper::{Html, Selector};
    use std::path::PathBuf;

    fn temp_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!(
            "{}_{}_{name}",
            env!("CARGO_PKG_NAME"),
            std::process::id()
        ))
    }

    fn route(secs: u64) -> Route {
        Route {
            summary: None,
            legs: vec![Leg {
                duration: Some(TextValue {
                    text: String::new(),
                    value: secs,
                }),
                steps: vec![
                    Step {
                        html_instructions: Some("Walk to <b>Karlsplatz</b>".to_string()),
                        travel_mode: Some("WALKING".to_string()),
                        ..Default::default()
                    },
                    Step {
                        html_instructions: Some("Tram towards Scheidplatz".to_string()),
                        travel_mode: Some("TRANSIT".to_string()),
                        transit_details: Some(TransitDetails {
                            line: TransitLine {
                                short_name: Some("12".to_string()),
                                name: Some("Tram 12".to_string()),
                                ..Default::default()
                            },
                            headsign: Some("Scheidplatz".to_string()),
                            ..Default::default()
                        }),
                        ..Default::default()
                    },
                ],
                ..Default::default()
            }],
        }
    }

    fn results() -> Result<Vec<OriginResult>, anyhow::Error> {
        let destination = Coordinate::new(48.1403145, 11.56112)?;

        Ok(vec![
            OriginResult::new(
                Coordinate::new(48.15, 11.58)?,
                destination,
                ApiStatus::Ok,
                RouteCandidate::validate(route(1230)),
            ),
            OriginResult::new(
                Coordinate::new(48.2, 11.6)?,
                destination,
                ApiStatus::ZeroResults,
                None,
            ),
        ])
    }

    fn main_station() -> Result<Target, anyhow::Error> {
        Ok(Target::new("Hauptbahnhof", 48.1403145, 11.56112)?)
    }

    #[test]
    fn results_without_route_get_no_marker() -> Result<(), anyhow::Error> {
        let layer = build_layer(&main_station()?, TravelMode::Transit, &results()?, true);

        assert_eq!(layer.name, "Hauptbahnhof (train)");
        assert_eq!(layer.markers.len(), 1);

        let marker = &layer.markers[0];
        assert_eq!(marker.location, Coordinate::new(48.15, 11.58)?);
        assert_eq!(marker.tooltip, "20.5 min");
        assert_eq!(marker.color, hex_color_for_minutes(20.5));

        Ok(())
    }

    #[test]
    fn popup_lists_steps_with_lines() {
        let popup = popup_html(20.5, &route(1230));

        assert_eq!(
            popup,
            "<div style='font-size:13px;'><b>Total time:</b> 20.5 min<br><b>Route:</b><br>\
            • Walk to <b>Karlsplatz</b><br>\
            • Tram towards Scheidplatz (12 -&gt; Scheidplatz)<br>\
            </div>"
        );
    }

    #[test]
    fn destination_icon_depends_on_mode() -> Result<(), anyhow::Error> {
        let target = main_station()?;

        let train = destination_marker(&target, TravelMode::Transit);
        let bike = destination_marker(&target, TravelMode::Bicycling);

        assert_eq!((train.icon, train.color), ("train", "red"));
        assert_eq!((bike.icon, bike.color), ("bicycle", "darkgreen"));
        assert_eq!(bike.popup, "<b>Hauptbahnhof</b><br>(destination)");

        Ok(())
    }

    #[test]
    fn missing_documents_and_overlay_are_skipped() -> Result<(), anyhow::Error> {
        let mut settings = Settings::munich()?.render;
        let present = temp_path("render_present.json");
        write_results(&present, &results()?)?;

        settings.targets[0].sources = vec![
            ResultSource {
                mode: TravelMode::Transit,
                path: temp_path("render_missing.json"),
            },
            ResultSource {
                mode: TravelMode::Bicycling,
                path: present.clone(),
            },
        ];
        settings.targets[1].sources = vec![ResultSource {
            mode: TravelMode::Transit,
            path: present.clone(),
        }];
        settings.overlay = Some(temp_path("render_missing.geojson"));

        let map = build_map(&settings);
        fs::remove_file(&present)?;

        assert_eq!(
            map.layers.iter().map(|l| l.name.as_str()).collect::<Vec<_>>(),
            vec!["Hauptbahnhof (bike)", "Flughafen (train)"]
        );
        // the first target's primary document is missing, so nothing starts visible
        assert!(map.layers.iter().all(|l| !l.show));
        assert_eq!(map.layers.iter().map(|l| l.markers.len()).sum::<usize>(), 2);
        assert!(map.overlay.is_none());

        Ok(())
    }

    #[test]
    fn rendered_page_embeds_layers_legend_and_attribution() -> Result<(), anyhow::Error> {
        let mut settings = Settings::munich()?.render;
        let main_station_doc = temp_path("render_hbf.json");
        let airport_doc = temp_path("render_airport.json");
        let overlay = temp_path("render_rail.geojson");
        write_results(&main_station_doc, &results()?)?;
        write_results(&airport_doc, &results()?[..1])?;
        fs::write(
            &overlay,
            r#"{"type":"FeatureCollection","features":[{"type":"Feature","properties":{},"geometry":{"type":"LineString","coordinates":[[11.5,48.1],[11.6,48.2]]}}]}"#,
        )?;

        settings.targets[0].sources.truncate(1);
        settings.targets[0].sources[0].path = main_station_doc.clone();
        settings.targets[1].sources[0].path = airport_doc.clone();
        settings.overlay = Some(overlay.clone());
        settings.output = temp_path("render_map.html");

        render_map(&settings)?;
        let html = fs::read_to_string(&settings.output)?;
        for path in [&main_station_doc, &airport_doc, &overlay, &settings.output] {
            fs::remove_file(path)?;
        }

        let document = Html::parse_document(&html);
        let data_selector = Selector::parse("script#map-data").unwrap();
        let data_text = document
            .select(&data_selector)
            .next()
            .context("map data missing")?
            .text()
            .collect::<String>();
        let data: serde_json::Value = serde_json::from_str(&data_text)?;

        let layers = data["layers"].as_array().context("layers missing")?;
        assert_eq!(layers.len(), 2);
        assert_eq!(layers[0]["name"], "Hauptbahnhof (train)");
        assert_eq!(layers[0]["show"], true);
        assert_eq!(layers[1]["show"], false);
        assert_eq!(layers[1]["destination"]["icon"], "train");
        assert_eq!(layers[0]["markers"].as_array().map(Vec::len), Some(1));
        assert_eq!(layers[0]["markers"][0]["location"], serde_json::json!([48.15, 11.58]));
        assert_eq!(data["overlay"]["name"], "Rail network");
        assert_eq!(data["overlay"]["style"]["color"], "#555");

        let legend = Selector::parse("div.legend span.swatch").unwrap();
        assert_eq!(document.select(&legend).count(), 7);
        let attribution = Selector::parse("div.attribution-panel").unwrap();
        assert!(
            document
                .select(&attribution)
                .next()
                .context("attribution missing")?
                .text()
                .collect::<String>()
                .contains("Directions data © Google")
        );

        Ok(())
    }
}
