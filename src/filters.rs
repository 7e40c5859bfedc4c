// Filter/visibility reconciliation: given the place list, the active filter
// pills and the search text, compute the visible set, diff it against the
// marker layer and decide what the viewport should do. One pass, one
// FiltersUpdated event.

use rustc_hash::FxHashSet;

use crate::normalize::{collation_key, soft_match};
use crate::place::Place;

/// Active filter pills plus the raw search text. Empty category/region sets
/// mean "all" (the implicit All pill).
#[derive(Debug, Clone, Default)]
pub struct FilterSelection {
    pub categories: FxHashSet<String>,
    pub regions: FxHashSet<String>,
    pub query: String,
}

impl FilterSelection {
    pub fn has_active_filters(&self) -> bool {
        !self.categories.is_empty() || !self.regions.is_empty()
    }

    pub fn toggle_category(&mut self, name: &str) {
        if !self.categories.remove(name) {
            self.categories.insert(name.to_string());
        }
    }

    pub fn toggle_region(&mut self, name: &str) {
        if !self.regions.remove(name) {
            self.regions.insert(name.to_string());
        }
    }

    pub fn reset(&mut self) {
        self.categories.clear();
        self.regions.clear();
        self.query.clear();
    }

    fn matches(&self, place: &Place) -> bool {
        let in_category =
            self.categories.is_empty() || self.categories.contains(place.category_str());
        let in_region = self.regions.is_empty() || self.regions.contains(place.region_str());
        let q = &self.query;
        let in_search = q.trim().is_empty()
            || soft_match(&place.title, q)
            || soft_match(place.description.as_deref().unwrap_or(""), q)
            || soft_match(place.category_str(), q)
            || soft_match(place.region_str(), q);
        in_category && in_region && in_search
    }
}

/// Geographic bounding box of the visible markers, already padded.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bounds {
    pub min_lat: f64,
    pub min_lon: f64,
    pub max_lat: f64,
    pub max_lon: f64,
}

impl Bounds {
    fn of_point(lat: f64, lon: f64) -> Self {
        Self { min_lat: lat, min_lon: lon, max_lat: lat, max_lon: lon }
    }

    fn extend(&mut self, lat: f64, lon: f64) {
        self.min_lat = self.min_lat.min(lat);
        self.min_lon = self.min_lon.min(lon);
        self.max_lat = self.max_lat.max(lat);
        self.max_lon = self.max_lon.max(lon);
    }

    /// Grow each side by `factor` of the span, like Leaflet's bounds.pad().
    fn pad(&self, factor: f64) -> Self {
        let lat_pad = (self.max_lat - self.min_lat) * factor;
        let lon_pad = (self.max_lon - self.min_lon) * factor;
        Self {
            min_lat: self.min_lat - lat_pad,
            min_lon: self.min_lon - lon_pad,
            max_lat: self.max_lat + lat_pad,
            max_lon: self.max_lon + lon_pad,
        }
    }

    pub fn center(&self) -> (f64, f64) {
        ((self.min_lat + self.max_lat) / 2.0, (self.min_lon + self.max_lon) / 2.0)
    }

    pub fn span(&self) -> (f64, f64) {
        (self.max_lat - self.min_lat, self.max_lon - self.min_lon)
    }
}

/// What the map should do with its viewport after a filter pass. An active
/// search keeps the view: the user reviews hits via the dropdown and list,
/// not by having the map yanked around under them.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Viewport {
    FitBounds(Bounds),
    ResetDefault,
    KeepView,
}

const BOUNDS_PAD_FACTOR: f64 = 0.2;

#[derive(Debug, Clone)]
pub struct ReconcileOutcome {
    /// Indices into the place list, title-sorted case- and
    /// accent-insensitively. Only renderable places appear here.
    pub visible: Vec<usize>,
    /// Markers to add to / remove from the layer. Exact diff against the
    /// previous layer set; unchanged markers get no operation.
    pub add_markers: Vec<usize>,
    pub remove_markers: Vec<usize>,
    pub viewport: Viewport,
    pub info_bar: String,
}

/// One full reconciliation pass. `on_layer` is the set of marker indices
/// currently on the cluster layer; the outcome's add/remove lists bring it
/// in line with the new visible set without a clear-and-rebuild.
pub fn reconcile(
    places: &[Place],
    selection: &FilterSelection,
    on_layer: &FxHashSet<usize>,
) -> ReconcileOutcome {
    let mut visible = Vec::new();
    let mut add_markers = Vec::new();
    let mut remove_markers = Vec::new();
    let mut bounds: Option<Bounds> = None;

    for (index, place) in places.iter().enumerate() {
        // Coordinate-less places have no marker and never enter the
        // visible set; they only exist in the full list.
        if !place.renderable() {
            continue;
        }

        if selection.matches(place) {
            if !on_layer.contains(&index) {
                add_markers.push(index);
            }
            match bounds {
                Some(ref mut b) => b.extend(place.latitude, place.longitude),
                None => bounds = Some(Bounds::of_point(place.latitude, place.longitude)),
            }
            visible.push(index);
        } else if on_layer.contains(&index) {
            remove_markers.push(index);
        }
    }

    // Title order, case- and accent-insensitive; equal keys keep list
    // order (stable).
    visible.sort_by_cached_key(|&i| collation_key(&places[i].title));

    let searching = !selection.query.trim().is_empty();
    let viewport = match (visible.is_empty(), searching, bounds) {
        (true, _, _) => Viewport::ResetDefault,
        (false, false, Some(b)) => Viewport::FitBounds(b.pad(BOUNDS_PAD_FACTOR)),
        _ => Viewport::KeepView,
    };

    let info_bar = info_bar_text(visible.len(), selection);

    ReconcileOutcome { visible, add_markers, remove_markers, viewport, info_bar }
}

/// "N results • Filters: Categories: … • Regions: …" or
/// "N results • No filters active". Active names are listed sorted so the
/// text is stable across passes.
pub fn info_bar_text(visible_count: usize, selection: &FilterSelection) -> String {
    let mut parts = Vec::new();
    parts.push(if visible_count == 1 {
        "1 result".to_string()
    } else {
        format!("{} results", visible_count)
    });

    let mut filter_bits = Vec::new();
    if !selection.categories.is_empty() {
        let mut names: Vec<&String> = selection.categories.iter().collect();
        names.sort();
        filter_bits.push(format!(
            "Categories: {}",
            names.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        ));
    }
    if !selection.regions.is_empty() {
        let mut names: Vec<&String> = selection.regions.iter().collect();
        names.sort();
        filter_bits.push(format!(
            "Regions: {}",
            names.iter().map(|s| s.as_str()).collect::<Vec<_>>().join(", ")
        ));
    }

    if filter_bits.is_empty() {
        parts.push("No filters active".to_string());
    } else {
        parts.push(format!("Filters: {}", filter_bits.join(" • ")));
    }

    parts.join(" • ")
}

/// Distinct sorted values of a place field, for building the filter pills.
pub fn distinct_values<F>(places: &[Place], field: F) -> Vec<String>
where
    F: Fn(&Place) -> Option<&str>,
{
    let mut values: Vec<String> = places
        .iter()
        .filter_map(|p| field(p))
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect();
    values.sort();
    values.dedup();
    values
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn place(title: &str, category: &str, region: &str, lat: f64, lon: f64) -> Place {
        Place::from_value(&json!({
            "title": title, "category": category, "region": region,
            "latitude": lat, "longitude": lon,
        }))
    }

    fn sample_places() -> Vec<Place> {
        vec![
            place("El Yunque Rainforest", "Hiking", "Este", 18.29, -65.79),
            place("Flamenco Beach", "Beach", "Culebra", 18.33, -65.32),
            place("Cueva Ventana", "Point of Interest", "Norte", 18.40, -66.69),
            place("No Coords Café", "Food", "Norte", f64::NAN, f64::NAN),
        ]
    }

    fn layer_of(indices: &[usize]) -> FxHashSet<usize> {
        indices.iter().copied().collect()
    }

    #[test]
    fn test_no_filters_all_renderable_visible() {
        let places = sample_places();
        let out = reconcile(&places, &FilterSelection::default(), &FxHashSet::default());

        // Sorted by title: Cueva, El Yunque, Flamenco. The coordinate-less
        // place never appears.
        assert_eq!(out.visible, vec![2, 0, 1]);
        assert_eq!(out.add_markers, vec![0, 1, 2]);
        assert!(out.remove_markers.is_empty());
        assert_eq!(out.info_bar, "3 results • No filters active");
        assert!(matches!(out.viewport, Viewport::FitBounds(_)));
    }

    #[test]
    fn test_category_filter() {
        let places = sample_places();
        let mut sel = FilterSelection::default();
        sel.toggle_category("Hiking");
        sel.toggle_category("Beach");

        let out = reconcile(&places, &sel, &layer_of(&[0, 1, 2]));
        assert_eq!(out.visible, vec![0, 1]);
        assert!(out.add_markers.is_empty());
        assert_eq!(out.remove_markers, vec![2]);
        assert_eq!(out.info_bar, "2 results • Filters: Categories: Beach, Hiking");
    }

    #[test]
    fn test_search_query_filters_and_keeps_view() {
        let places = sample_places();
        let sel = FilterSelection { query: "beach".to_string(), ..Default::default() };

        let out = reconcile(&places, &sel, &layer_of(&[0, 1, 2]));
        assert_eq!(out.visible, vec![1]);
        assert_eq!(out.remove_markers, vec![0, 2]);
        assert_eq!(out.viewport, Viewport::KeepView);
        assert_eq!(out.info_bar, "1 result • No filters active");
    }

    #[test]
    fn test_empty_visible_resets_view() {
        let places = sample_places();
        let sel = FilterSelection { query: "zzz".to_string(), ..Default::default() };

        let out = reconcile(&places, &sel, &layer_of(&[0, 1, 2]));
        assert!(out.visible.is_empty());
        assert_eq!(out.remove_markers, vec![0, 1, 2]);
        assert_eq!(out.viewport, Viewport::ResetDefault);
    }

    #[test]
    fn test_empty_place_list() {
        let out = reconcile(&[], &FilterSelection::default(), &FxHashSet::default());
        assert!(out.visible.is_empty());
        assert_eq!(out.viewport, Viewport::ResetDefault);
        assert_eq!(out.info_bar, "0 results • No filters active");
    }

    #[test]
    fn test_marker_diff_is_minimal() {
        let places = sample_places();
        let sel = FilterSelection::default();

        // Everything already on the layer: a second identical pass issues
        // no operations at all.
        let out = reconcile(&places, &sel, &layer_of(&[0, 1, 2]));
        assert!(out.add_markers.is_empty());
        assert!(out.remove_markers.is_empty());
    }

    #[test]
    fn test_region_and_category_combine() {
        let places = sample_places();
        let mut sel = FilterSelection::default();
        sel.toggle_category("Beach");
        sel.toggle_region("Este");

        // Category Beach AND region Este match nothing.
        let out = reconcile(&places, &sel, &FxHashSet::default());
        assert!(out.visible.is_empty());

        sel.toggle_region("Este");
        sel.toggle_region("Culebra");
        let out = reconcile(&places, &sel, &FxHashSet::default());
        assert_eq!(out.visible, vec![1]);
    }

    #[test]
    fn test_visible_sorted_case_insensitive() {
        let places = vec![
            place("banana", "", "", 18.0, -66.0),
            place("Apple", "", "", 18.1, -66.1),
            place("cherry", "", "", 18.2, -66.2),
        ];
        let out = reconcile(&places, &FilterSelection::default(), &FxHashSet::default());
        assert_eq!(out.visible, vec![1, 0, 2]);
    }

    #[test]
    fn test_visible_sorted_accent_insensitive() {
        // "Ávila" collates with the a-titles, not after "z".
        let places = vec![
            place("Beach Two", "", "", 18.0, -66.0),
            place("Ávila Pier", "", "", 18.1, -66.1),
            place("zanja trail", "", "", 18.2, -66.2),
        ];
        let out = reconcile(&places, &FilterSelection::default(), &FxHashSet::default());
        assert_eq!(out.visible, vec![1, 0, 2]);
    }

    #[test]
    fn test_bounds_padded_by_span_fraction() {
        let places = vec![
            place("A", "", "", 18.0, -67.0),
            place("B", "", "", 19.0, -65.0),
        ];
        let out = reconcile(&places, &FilterSelection::default(), &FxHashSet::default());
        let Viewport::FitBounds(b) = out.viewport else {
            panic!("expected FitBounds");
        };
        // 20% of a 1.0 lat span and a 2.0 lon span.
        assert!((b.min_lat - 17.8).abs() < 1e-9);
        assert!((b.max_lat - 19.2).abs() < 1e-9);
        assert!((b.min_lon - (-67.4)).abs() < 1e-9);
        assert!((b.max_lon - (-64.6)).abs() < 1e-9);
    }

    #[test]
    fn test_distinct_values() {
        let places = sample_places();
        let cats = distinct_values(&places, |p| p.category.as_deref());
        assert_eq!(cats, vec!["Beach", "Food", "Hiking", "Point of Interest"]);
        let regs = distinct_values(&places, |p| p.region.as_deref());
        assert_eq!(regs, vec!["Culebra", "Este", "Norte"]);
    }

    #[test]
    fn test_zero_coordinate_sentinel_excluded() {
        let places = vec![place("Null Island", "Beach", "", 0.0, 0.0)];
        let out = reconcile(&places, &FilterSelection::default(), &FxHashSet::default());
        assert!(out.visible.is_empty());
        assert!(out.add_markers.is_empty());
    }
}
