// Map panel using the walkers crate: tile layers, marker drawing, click hit
// testing and viewport control. Clustering of overlapping pins is the tile
// host's visual concern; we draw one pin per visible place.

use crossbeam_channel::{Receiver, Sender, unbounded};
use eframe::egui;
use rustc_hash::FxHashMap;
use walkers::sources::{Attribution, TileSource};
use walkers::{HttpTiles, Map, MapMemory, Plugin, Position, Projector, TileId, lat_lon};

use crate::filters::{Bounds, Viewport};
use crate::place::Place;
use crate::presentation::{marker_icon, parse_hex_color};

const MARKER_RADIUS: f32 = 7.0;
const SELECTED_RADIUS: f32 = 9.0;
const HIT_RADIUS: f32 = 12.0;

/// The three base layers of the original app.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BaseLayer {
    Satellite,
    Dark,
    Light,
}

impl BaseLayer {
    pub const ALL: [BaseLayer; 3] = [BaseLayer::Satellite, BaseLayer::Dark, BaseLayer::Light];

    pub fn label(&self) -> &'static str {
        match self {
            BaseLayer::Satellite => "Satellite",
            BaseLayer::Dark => "Dark",
            BaseLayer::Light => "Light",
        }
    }

    pub fn from_name(name: &str) -> Self {
        match name {
            "Dark" => BaseLayer::Dark,
            "Light" => BaseLayer::Light,
            _ => BaseLayer::Satellite,
        }
    }
}

impl TileSource for BaseLayer {
    fn tile_url(&self, tile_id: TileId) -> String {
        match self {
            BaseLayer::Satellite => format!(
                "https://server.arcgisonline.com/ArcGIS/rest/services/World_Imagery/MapServer/tile/{}/{}/{}",
                tile_id.zoom, tile_id.y, tile_id.x
            ),
            BaseLayer::Dark => format!(
                "https://a.basemaps.cartocdn.com/dark_all/{}/{}/{}.png",
                tile_id.zoom, tile_id.x, tile_id.y
            ),
            BaseLayer::Light => format!(
                "https://tile.openstreetmap.org/{}/{}/{}.png",
                tile_id.zoom, tile_id.x, tile_id.y
            ),
        }
    }

    fn attribution(&self) -> Attribution {
        match self {
            BaseLayer::Satellite => Attribution {
                text: "Tiles © Esri",
                url: "https://www.esri.com",
                logo_light: None,
                logo_dark: None,
            },
            BaseLayer::Dark => Attribution {
                text: "© OpenStreetMap, © CartoDB",
                url: "https://carto.com/attributions",
                logo_light: None,
                logo_dark: None,
            },
            BaseLayer::Light => Attribution {
                text: "© OpenStreetMap contributors",
                url: "https://www.openstreetmap.org/copyright",
                logo_light: None,
                logo_dark: None,
            },
        }
    }
}

pub struct MapPanelState {
    pub map_memory: MapMemory,
    pub base_layer: BaseLayer,
    /// One tile pipeline per base layer, created on first use so switching
    /// back keeps the cache warm.
    tiles: FxHashMap<BaseLayer, HttpTiles>,
    home: Position,
    home_zoom: f64,
    /// Transient position dot from the locate-me lookup.
    pub user_location: Option<(f64, f64)>,
    click_tx: Sender<usize>,
    click_rx: Receiver<usize>,
}

impl MapPanelState {
    pub fn new(default_lat: f64, default_lon: f64, default_zoom: f64, base_layer: BaseLayer) -> Self {
        let (click_tx, click_rx) = unbounded();
        Self {
            map_memory: MapMemory::default(),
            base_layer,
            tiles: FxHashMap::default(),
            home: lat_lon(default_lat, default_lon),
            home_zoom: default_zoom,
            user_location: None,
            click_tx,
            click_rx,
        }
    }

    /// Apply a reconciler viewport decision.
    pub fn apply_viewport(&mut self, viewport: Viewport) {
        match viewport {
            Viewport::FitBounds(bounds) => {
                let (lat, lon) = bounds.center();
                self.map_memory.center_at(lat_lon(lat, lon));
                let _ = self.map_memory.set_zoom(zoom_for_bounds(&bounds));
            }
            Viewport::ResetDefault => {
                self.map_memory.center_at(self.home);
                let _ = self.map_memory.set_zoom(self.home_zoom);
            }
            Viewport::KeepView => {}
        }
    }

    /// Center on one place, dropdown-selection style.
    pub fn focus_place(&mut self, place: &Place) {
        if place.renderable() {
            self.map_memory.center_at(lat_lon(place.latitude, place.longitude));
            let _ = self.map_memory.set_zoom(14.0);
        }
    }

    pub fn center_on(&mut self, lat: f64, lon: f64, zoom: f64) {
        self.map_memory.center_at(lat_lon(lat, lon));
        let _ = self.map_memory.set_zoom(zoom);
    }

    /// Render the map and return the index of a clicked marker, if any.
    pub fn show(
        &mut self,
        ui: &mut egui::Ui,
        places: &[Place],
        on_layer: impl Iterator<Item = usize>,
        selected: Option<usize>,
    ) -> Option<usize> {
        let markers: Vec<MarkerDraw> = on_layer
            .filter_map(|index| {
                let place = places.get(index)?;
                if !place.renderable() {
                    return None;
                }
                let icon = marker_icon(place);
                let (r, g, b) = parse_hex_color(icon.color);
                Some(MarkerDraw {
                    index,
                    position: lat_lon(place.latitude, place.longitude),
                    color: egui::Color32::from_rgb(r, g, b),
                    emoji: icon.emoji,
                    selected: selected == Some(index),
                })
            })
            .collect();

        let plugin = MarkersPlugin {
            markers,
            user_location: self.user_location.map(|(lat, lon)| lat_lon(lat, lon)),
            click_tx: self.click_tx.clone(),
        };

        let layer = self.base_layer;
        let ctx = ui.ctx().clone();
        let tiles = self.tiles.entry(layer).or_insert_with(|| HttpTiles::new(layer, ctx));
        let map = Map::new(Some(tiles), &mut self.map_memory, self.home).with_plugin(plugin);
        ui.add(map);

        self.click_rx.try_recv().ok()
    }
}

/// Coarse zoom level whose world window covers the (already padded) bounds.
fn zoom_for_bounds(bounds: &Bounds) -> f64 {
    let (lat_span, lon_span) = bounds.span();
    let lon_zoom = (360.0 / lon_span.max(1e-4)).log2();
    let lat_zoom = (180.0 / lat_span.max(1e-4)).log2();
    lon_zoom.min(lat_zoom).clamp(3.0, 16.0)
}

struct MarkerDraw {
    index: usize,
    position: Position,
    color: egui::Color32,
    emoji: &'static str,
    selected: bool,
}

/// Draws category-colored pins plus the selection halo, and reports clicks
/// back over a channel (the plugin is consumed per frame).
struct MarkersPlugin {
    markers: Vec<MarkerDraw>,
    user_location: Option<Position>,
    click_tx: Sender<usize>,
}

impl Plugin for MarkersPlugin {
    fn run(
        self: Box<Self>,
        ui: &mut egui::Ui,
        response: &egui::Response,
        projector: &Projector,
        _memory: &MapMemory,
    ) {
        let painter = ui.painter();

        if let Some(loc) = self.user_location {
            let v = projector.project(loc);
            let pos = egui::pos2(v.x, v.y);
            painter.circle_filled(pos, 6.0, egui::Color32::from_rgb(0x38, 0xBD, 0xF8));
            painter.circle_stroke(pos, 6.0, egui::Stroke::new(2.0, egui::Color32::WHITE));
        }

        let mut screen_positions = Vec::with_capacity(self.markers.len());
        for marker in &self.markers {
            let v = projector.project(marker.position);
            let pos = egui::pos2(v.x, v.y);
            screen_positions.push(pos);

            let radius = if marker.selected { SELECTED_RADIUS } else { MARKER_RADIUS };
            if marker.selected {
                // Highlight ring, like the original's selection animation.
                painter.circle_stroke(
                    pos,
                    radius + 6.0,
                    egui::Stroke::new(2.0, egui::Color32::from_rgb(0x38, 0xBD, 0xF8)),
                );
            }
            painter.circle_filled(pos, radius, marker.color);
            painter.circle_stroke(pos, radius, egui::Stroke::new(1.5, egui::Color32::WHITE));
            painter.text(
                pos,
                egui::Align2::CENTER_CENTER,
                marker.emoji,
                egui::FontId::proportional(radius * 1.2),
                egui::Color32::WHITE,
            );
        }

        if response.clicked()
            && let Some(click_pos) = response.interact_pointer_pos()
        {
            // Nearest pin within the hit radius wins.
            let mut best: Option<(usize, f32)> = None;
            for (marker, pos) in self.markers.iter().zip(&screen_positions) {
                let dist = pos.distance(click_pos);
                if dist <= HIT_RADIUS && best.map(|(_, d)| dist < d).unwrap_or(true) {
                    best = Some((marker.index, dist));
                }
            }
            if let Some((index, _)) = best {
                let _ = self.click_tx.send(index);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zoom_for_bounds_scales_with_span() {
        let island = Bounds { min_lat: 17.9, min_lon: -67.3, max_lat: 18.5, max_lon: -65.2 };
        let block = Bounds { min_lat: 18.20, min_lon: -66.11, max_lat: 18.21, max_lon: -66.10 };
        assert!(zoom_for_bounds(&island) < zoom_for_bounds(&block));
        assert_eq!(zoom_for_bounds(&block), 16.0);
    }

    #[test]
    fn test_base_layer_urls() {
        let id = TileId { x: 5, y: 10, zoom: 9 };
        assert!(BaseLayer::Satellite.tile_url(id).contains("/9/10/5"));
        assert!(BaseLayer::Light.tile_url(id).ends_with("/9/5/10.png"));
        assert_eq!(BaseLayer::from_name("Dark"), BaseLayer::Dark);
        assert_eq!(BaseLayer::from_name("unknown"), BaseLayer::Satellite);
    }
}
