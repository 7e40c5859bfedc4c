// Central application state. Every component gets the slice it needs as an
// explicit parameter; nothing reads ambient globals. The GUI and the
// headless CLI both drive this same struct.

use rustc_hash::FxHashSet;

use crate::events::{AppEvent, EventBus};
use crate::favorites::FavoritesStore;
use crate::filters::{FilterSelection, Viewport, distinct_values, reconcile};
use crate::normalize::collation_key;
use crate::place::{Place, place_key};

#[derive(Debug, Clone, PartialEq)]
pub enum LoadPhase {
    Loading,
    Ready,
    /// Fatal for this session's data load; filters stay inert but the UI
    /// keeps running.
    Failed(String),
}

pub struct AppState {
    pub places: Vec<Place>,
    pub selection: FilterSelection,
    pub favorites: FavoritesStore,
    pub load_phase: LoadPhase,

    /// Marker indices currently on the map layer. Kept in sync by the
    /// reconciler's diff, never rebuilt wholesale.
    pub on_layer: FxHashSet<usize>,
    /// Title-sorted indices of places passing the active filters.
    pub visible: Vec<usize>,
    pub info_bar: String,
    /// Set by each reconcile pass, consumed (taken) by the map panel.
    pub viewport_request: Option<Viewport>,

    pub selected: Option<usize>,
    /// Distinct values for the filter pills, computed once per load.
    pub categories: Vec<String>,
    pub regions: Vec<String>,

    pub bus: EventBus,
}

impl AppState {
    pub fn new(favorites: FavoritesStore) -> Self {
        Self {
            places: Vec::new(),
            selection: FilterSelection::default(),
            favorites,
            load_phase: LoadPhase::Loading,
            on_layer: FxHashSet::default(),
            visible: Vec::new(),
            info_bar: String::new(),
            viewport_request: None,
            selected: None,
            categories: Vec::new(),
            regions: Vec::new(),
            bus: EventBus::new(),
        }
    }

    /// Install a fetched place list and run the initial filter pass.
    pub fn set_places(&mut self, places: Vec<Place>) {
        self.categories = distinct_values(&places, |p| p.category.as_deref());
        self.regions = distinct_values(&places, |p| p.region.as_deref());
        self.places = places;
        self.on_layer.clear();
        self.selected = None;
        self.load_phase = LoadPhase::Ready;
        self.apply_filters();
    }

    pub fn set_load_error(&mut self, message: String) {
        self.load_phase = LoadPhase::Failed(message.clone());
        self.info_bar = message;
    }

    /// One reconciliation pass: recompute visibility, patch the marker
    /// layer, record the viewport request and notify subscribers.
    pub fn apply_filters(&mut self) {
        let outcome = reconcile(&self.places, &self.selection, &self.on_layer);

        for &index in &outcome.add_markers {
            self.on_layer.insert(index);
        }
        for &index in &outcome.remove_markers {
            self.on_layer.remove(&index);
        }

        self.visible = outcome.visible;
        self.info_bar = outcome.info_bar;
        self.viewport_request = match outcome.viewport {
            Viewport::KeepView => None,
            other => Some(other),
        };

        self.bus.publish(AppEvent::FiltersUpdated { visible_count: self.visible.len() });
    }

    pub fn set_query(&mut self, query: String) {
        self.selection.query = query;
        self.apply_filters();
    }

    pub fn toggle_category(&mut self, name: &str) {
        self.selection.toggle_category(name);
        self.apply_filters();
    }

    pub fn toggle_region(&mut self, name: &str) {
        self.selection.toggle_region(name);
        self.apply_filters();
    }

    pub fn reset_filters(&mut self) {
        self.selection.reset();
        self.apply_filters();
    }

    pub fn key_for(&self, index: usize) -> String {
        place_key(&self.places[index], index)
    }

    pub fn is_favorite(&self, index: usize) -> bool {
        self.favorites.is_favorite(&self.key_for(index))
    }

    /// Flip favorite state for one place. Only the toggled control
    /// re-renders; no filter pass is triggered.
    pub fn toggle_favorite(&mut self, index: usize) -> bool {
        let key = self.key_for(index);
        let active = self.favorites.toggle(&key);
        self.bus.publish(AppEvent::FavoriteToggled { key, active });
        active
    }

    pub fn select_place(&mut self, index: usize) {
        self.selected = Some(index);
        self.bus.publish(AppEvent::PlaceSelected { index });
    }

    pub fn visible_places(&self) -> impl Iterator<Item = (usize, &Place)> {
        self.visible.iter().map(|&i| (i, &self.places[i]))
    }

    /// Favorited places in title order, for the saved view. Not limited to
    /// the current filter pass.
    pub fn saved_places(&self) -> Vec<(usize, &Place)> {
        let mut saved: Vec<(usize, &Place)> = self
            .places
            .iter()
            .enumerate()
            .filter(|(i, p)| self.favorites.is_favorite(&place_key(p, *i)))
            .collect();
        saved.sort_by_cached_key(|(_, p)| collation_key(&p.title));
        saved
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filters::Bounds;
    use serde_json::json;

    fn test_state(name: &str, places: Vec<Place>) -> AppState {
        let path = std::env::temp_dir()
            .join(format!("mapmigo_state_test_{}_{}.json", name, std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut state = AppState::new(FavoritesStore::load_from(path));
        state.set_places(places);
        state
    }

    fn sample() -> Vec<Place> {
        vec![
            Place::from_value(&json!({
                "title": "El Yunque Rainforest", "category": "Hiking",
                "latitude": 18.29, "longitude": -65.79,
            })),
            Place::from_value(&json!({
                "title": "Flamenco Beach", "category": "Beach",
                "latitude": 18.33, "longitude": -65.32,
            })),
        ]
    }

    #[test]
    fn test_query_beach_scenario() {
        let mut state = test_state("query", sample());
        assert_eq!(state.visible, vec![0, 1]);

        state.set_query("beach".to_string());
        assert_eq!(state.visible, vec![1]);
        assert_eq!(state.on_layer.len(), 1);
        assert!(state.on_layer.contains(&1));

        use crate::search::relevance_score;
        assert_eq!(relevance_score(&state.places[1], "beach"), 10);
    }

    #[test]
    fn test_layer_patched_incrementally() {
        let mut state = test_state("layer", sample());
        assert_eq!(state.on_layer.len(), 2);

        state.toggle_category("Hiking");
        assert!(state.on_layer.contains(&0));
        assert!(!state.on_layer.contains(&1));

        state.reset_filters();
        assert_eq!(state.on_layer.len(), 2);
    }

    #[test]
    fn test_viewport_request_lifecycle() {
        let mut state = test_state("viewport", sample());
        assert!(matches!(state.viewport_request, Some(Viewport::FitBounds(Bounds { .. }))));

        // Active search leaves the viewport alone.
        state.set_query("beach".to_string());
        assert_eq!(state.viewport_request, None);

        state.set_query("zzz".to_string());
        assert_eq!(state.viewport_request, Some(Viewport::ResetDefault));
    }

    #[test]
    fn test_favorite_toggle_double_restores() {
        let mut state = test_state("favtoggle", sample());
        let before = state.favorites.keys();

        assert!(state.toggle_favorite(0));
        assert!(state.is_favorite(0));
        assert!(!state.toggle_favorite(0));
        assert_eq!(state.favorites.keys(), before);
    }

    #[test]
    fn test_saved_places_sorted() {
        let mut state = test_state("saved", sample());
        state.toggle_favorite(1);
        state.toggle_favorite(0);

        let saved = state.saved_places();
        let titles: Vec<&str> = saved.iter().map(|(_, p)| p.title.as_str()).collect();
        assert_eq!(titles, vec!["El Yunque Rainforest", "Flamenco Beach"]);
    }

    #[test]
    fn test_saved_places_accent_collation() {
        let places = vec![
            Place::from_value(&json!({"title": "Zanja Trail"})),
            Place::from_value(&json!({"title": "Ávila Pier"})),
        ];
        let mut state = test_state("saved_accent", places);
        state.toggle_favorite(0);
        state.toggle_favorite(1);

        let titles: Vec<&str> = state.saved_places().iter().map(|(_, p)| p.title.as_str()).collect();
        assert_eq!(titles, vec!["Ávila Pier", "Zanja Trail"]);
    }

    #[test]
    fn test_suggestions_limited_to_visible() {
        use crate::search::rank_suggestions;

        let mut state = test_state("suggest_scope", sample());
        state.toggle_category("Hiking");

        // Flamenco Beach is filtered out by the category pill, so it is
        // never suggested even though it scores for "beach".
        let ranked = rank_suggestions(&state.places, &state.visible, "beach");
        assert!(ranked.is_empty());

        state.reset_filters();
        let ranked = rank_suggestions(&state.places, &state.visible, "beach");
        assert_eq!(ranked.len(), 1);
        assert_eq!(ranked[0].index, 1);
    }

    #[test]
    fn test_filters_updated_event_per_pass() {
        let mut state = test_state("events", sample());
        let rx = state.bus.subscribe();

        state.set_query("beach".to_string());
        assert_eq!(rx.try_recv().unwrap(), AppEvent::FiltersUpdated { visible_count: 1 });
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_load_error_keeps_ui_inert_not_crashed() {
        let path = std::env::temp_dir()
            .join(format!("mapmigo_state_err_test_{}.json", std::process::id()));
        let _ = std::fs::remove_file(&path);
        let mut state = AppState::new(FavoritesStore::load_from(path));
        state.set_load_error("Error loading places.".to_string());

        assert_eq!(state.info_bar, "Error loading places.");
        // Filter passes still run against the empty list without panicking.
        state.set_query("beach".to_string());
        assert!(state.visible.is_empty());
    }
}
