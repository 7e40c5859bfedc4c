use eframe::egui;
use crossbeam_channel::Receiver;
use crate::config::AppContext;
use crate::fetch::{spawn_fetch, spawn_locate};
use crate::geo_util::distance_bearing_string;
use crate::gui::map_panel::{BaseLayer, MapPanelState};
use crate::place::Place;
use crate::presentation::{marker_icon, place_details};
use crate::search::rank_suggestions;
use crate::state::{AppState, LoadPhase};
use std::time::Instant;

pub mod map_panel;

const APP_TITLE: &str = "MapMigo";
const STATUS_TIMEOUT_SECS: u64 = 3;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ListTab {
    Results,
    Saved,
}

pub struct GuiApp {
    state: AppState,
    ctx: AppContext,
    map: MapPanelState,

    fetch_rx: Option<Receiver<Result<Vec<Place>, String>>>,
    locate_rx: Option<Receiver<Result<(f64, f64), String>>>,

    search_input: String,
    list_tab: ListTab,
    status_message: Option<String>,
    status_set_time: Option<Instant>,

    initial_scale_applied: bool,
    panel_width: f32,
    last_window_size: Option<(u32, u32)>,
}

impl GuiApp {
    pub fn new(ctx: AppContext, state: AppState) -> Self {
        let (lat, lon, zoom) = ctx.map_config.default_view();
        let base_layer =
            BaseLayer::from_name(ctx.map_config.base_layer.as_deref().unwrap_or("Satellite"));
        let fetch_rx = Some(spawn_fetch(ctx.map_config.data_url().to_string()));
        let panel_width = ctx.gui_config.panel_width.unwrap_or(360.0);
        let initial_window_size =
            Some((ctx.gui_config.width.unwrap_or(1280), ctx.gui_config.height.unwrap_or(720)));

        Self {
            state,
            ctx,
            map: MapPanelState::new(lat, lon, zoom, base_layer),
            fetch_rx,
            locate_rx: None,
            search_input: String::new(),
            list_tab: ListTab::Results,
            status_message: None,
            status_set_time: None,
            initial_scale_applied: false,
            panel_width,
            last_window_size: initial_window_size,
        }
    }

    pub fn run(self) -> Result<(), eframe::Error> {
        let width = self.ctx.gui_config.width.unwrap_or(1280) as f32;
        let height = self.ctx.gui_config.height.unwrap_or(720) as f32;

        let options = eframe::NativeOptions {
            viewport: egui::ViewportBuilder::default()
                .with_inner_size([width, height])
                .with_title(format!("{} v{}", APP_TITLE, env!("CARGO_PKG_VERSION"))),
            ..Default::default()
        };

        eframe::run_native(
            "mapmigo",
            options,
            Box::new(move |cc| {
                egui_extras::install_image_loaders(&cc.egui_ctx);
                Ok(Box::new(self))
            }),
        )
    }

    fn set_status(&mut self, message: impl Into<String>) {
        self.status_message = Some(message.into());
        self.status_set_time = Some(Instant::now());
    }

    fn poll_workers(&mut self, ctx: &egui::Context) {
        if let Some(rx) = &self.fetch_rx {
            match rx.try_recv() {
                Ok(Ok(places)) => {
                    let count = places.len();
                    self.state.set_places(places);
                    self.set_status(format!("Loaded {} places", count));
                    self.fetch_rx = None;
                    ctx.request_repaint();
                }
                Ok(Err(message)) => {
                    self.state.set_load_error(message);
                    self.fetch_rx = None;
                    ctx.request_repaint();
                }
                Err(_) => {}
            }
        }

        if let Some(rx) = &self.locate_rx {
            match rx.try_recv() {
                Ok(Ok((lat, lon))) => {
                    self.map.user_location = Some((lat, lon));
                    self.map.center_on(lat, lon, 11.0);
                    self.set_status("Showing your approximate location");
                    self.locate_rx = None;
                    ctx.request_repaint();
                }
                Ok(Err(message)) => {
                    self.set_status(format!("Locate failed: {}", message));
                    self.locate_rx = None;
                    ctx.request_repaint();
                }
                Err(_) => {}
            }
        }

        // Keep polling while a worker is outstanding.
        if self.fetch_rx.is_some() || self.locate_rx.is_some() {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }

    fn select_and_focus(&mut self, index: usize) {
        self.state.select_place(index);
        if let Some(place) = self.state.places.get(index) {
            self.map.focus_place(place);
        }
    }

    fn show_search_box(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            let response = ui.add(
                egui::TextEdit::singleline(&mut self.search_input)
                    .hint_text("Search places...")
                    .desired_width(ui.available_width() - 28.0),
            );
            if response.changed() {
                self.state.set_query(self.search_input.clone());
            }
            if !self.search_input.is_empty() && ui.button("✕").clicked() {
                self.search_input.clear();
                self.state.set_query(String::new());
            }
        });

        // Suggestion dropdown, best five matches among the places passing
        // the active filters. A place excluded by a pill is never suggested.
        if !self.search_input.trim().is_empty() {
            let suggestions =
                rank_suggestions(&self.state.places, &self.state.visible, &self.search_input);
            let mut picked: Option<usize> = None;
            for suggestion in &suggestions {
                let place = &self.state.places[suggestion.index];
                let icon = marker_icon(place);
                let label = format!("{} {}", icon.emoji, place.title);
                if ui.small_button(label).clicked() {
                    picked = Some(suggestion.index);
                }
            }
            if let Some(index) = picked {
                self.search_input = self.state.places[index].title.clone();
                self.state.set_query(self.search_input.clone());
                self.select_and_focus(index);
            }
        }
    }

    fn show_filter_pills(&mut self, ui: &mut egui::Ui) {
        if !self.state.categories.is_empty() {
            ui.label(egui::RichText::new("Categories").small().strong());
            ui.horizontal_wrapped(|ui| {
                let names = self.state.categories.clone();
                for name in &names {
                    let active = self.state.selection.categories.contains(name);
                    if ui.selectable_label(active, name).clicked() {
                        self.state.toggle_category(name);
                    }
                }
            });
        }

        if !self.state.regions.is_empty() {
            ui.label(egui::RichText::new("Regions").small().strong());
            ui.horizontal_wrapped(|ui| {
                let names = self.state.regions.clone();
                for name in &names {
                    let active = self.state.selection.regions.contains(name);
                    if ui.selectable_label(active, name).clicked() {
                        self.state.toggle_region(name);
                    }
                }
            });
        }

        if self.state.selection.has_active_filters() && ui.button("Reset filters").clicked() {
            self.search_input.clear();
            self.state.reset_filters();
        }
    }

    fn show_place_row(ui: &mut egui::Ui, index: usize, place: &Place, saved: bool) -> bool {
        let icon = marker_icon(place);
        let star = if saved { " ★" } else { "" };
        let title = format!("{} {}{}", icon.emoji, place.title, star);
        let mut clicked = false;
        ui.push_id(index, |ui| {
            if ui.selectable_label(false, egui::RichText::new(title).strong()).clicked() {
                clicked = true;
            }
            let mut line = String::new();
            if let Some(category) = &place.category {
                line.push_str(category);
            }
            if let Some(region) = &place.region {
                if !line.is_empty() {
                    line.push_str(" • ");
                }
                line.push_str(region);
            }
            if !line.is_empty() {
                ui.label(egui::RichText::new(line).small().weak());
            }
            ui.separator();
        });
        clicked
    }

    fn show_place_list(&mut self, ui: &mut egui::Ui) {
        let mut picked: Option<usize> = None;

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            match self.list_tab {
                ListTab::Results => {
                    if self.state.visible.is_empty()
                        && matches!(self.state.load_phase, LoadPhase::Ready)
                    {
                        ui.label("No places match the current filters.");
                    }
                    for (index, place) in self.state.visible_places() {
                        let saved = self.state.favorites.is_favorite(&self.state.key_for(index));
                        if Self::show_place_row(ui, index, place, saved) {
                            picked = Some(index);
                        }
                    }
                }
                ListTab::Saved => {
                    let saved = self.state.saved_places();
                    if saved.is_empty() {
                        ui.label("No saved places yet. Tap the star on a place to keep it here.");
                    }
                    for (index, place) in saved {
                        if Self::show_place_row(ui, index, place, true) {
                            picked = Some(index);
                        }
                    }
                }
            }
        });

        if let Some(index) = picked {
            self.select_and_focus(index);
        }
    }

    fn show_sidebar(&mut self, ui: &mut egui::Ui) {
        ui.heading(APP_TITLE);

        match &self.state.load_phase {
            LoadPhase::Loading => {
                ui.horizontal(|ui| {
                    ui.spinner();
                    ui.label("Loading places...");
                });
                return;
            }
            LoadPhase::Failed(message) => {
                ui.colored_label(
                    egui::Color32::LIGHT_RED,
                    format!("Could not load places: {}", message),
                );
                if ui.button("Retry").clicked() {
                    self.state.load_phase = LoadPhase::Loading;
                    self.fetch_rx =
                        Some(spawn_fetch(self.ctx.map_config.data_url().to_string()));
                }
                return;
            }
            LoadPhase::Ready => {}
        }

        self.show_search_box(ui);
        ui.separator();
        self.show_filter_pills(ui);
        ui.separator();

        ui.horizontal(|ui| {
            if ui.selectable_label(self.list_tab == ListTab::Results, "Results").clicked() {
                self.list_tab = ListTab::Results;
            }
            let saved_label = format!("Saved ({})", self.state.favorites.len());
            if ui.selectable_label(self.list_tab == ListTab::Saved, saved_label).clicked() {
                self.list_tab = ListTab::Saved;
            }
        });
        ui.separator();

        self.show_place_list(ui);
    }

    fn show_detail_panel(&mut self, ui: &mut egui::Ui, index: usize) {
        let Some(place) = self.state.places.get(index) else {
            return;
        };
        let details = place_details(place, self.state.is_favorite(index));
        let distance_line = self
            .map
            .user_location
            .filter(|_| place.renderable())
            .and_then(|from| distance_bearing_string(from, (place.latitude, place.longitude)));

        ui.horizontal(|ui| {
            ui.heading(&details.title);
            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                if ui.button("✖").clicked() {
                    self.state.selected = None;
                }
            });
        });

        let star = if details.is_favorite { "★ Saved" } else { "☆ Save" };
        if ui.button(star).clicked() {
            let active = self.state.toggle_favorite(index);
            self.set_status(if active { "Saved place" } else { "Removed saved place" });
        }

        if let Some(line) = &details.category_line {
            ui.label(egui::RichText::new(line).small().weak());
        }
        ui.separator();

        egui::ScrollArea::vertical().auto_shrink([false, false]).show(ui, |ui| {
            if let Some(url) = &details.image_url {
                ui.add(
                    egui::Image::from_uri(url)
                        .max_width(ui.available_width())
                        .corner_radius(4.0),
                );
                if let Some(credit) = &details.image_credit {
                    ui.label(egui::RichText::new(credit).small().weak());
                }
                ui.add_space(6.0);
            }

            if let Some(description) = &details.description {
                ui.label(description);
                ui.add_space(6.0);
            }

            egui::Grid::new("place_facts").num_columns(2).show(ui, |ui| {
                ui.label(egui::RichText::new("Cost").strong());
                ui.label(&details.cost);
                ui.end_row();
                ui.label(egui::RichText::new("Parking").strong());
                ui.label(&details.parking);
                ui.end_row();
                ui.label(egui::RichText::new("Municipality").strong());
                ui.label(&details.municipality);
                ui.end_row();
                if let Some(line) = &distance_line {
                    ui.label(egui::RichText::new("From you").strong());
                    ui.label(line);
                    ui.end_row();
                }
            });
            ui.add_space(6.0);

            if let Some(url) = &details.maps_url {
                ui.hyperlink_to("Open in Google Maps", url);
            }
            if let Some(url) = &details.website_url {
                ui.hyperlink_to("Website", url);
            }
        });
    }

    fn show_info_bar(&mut self, ui: &mut egui::Ui) {
        ui.horizontal(|ui| {
            ui.label(&self.state.info_bar);

            ui.with_layout(egui::Layout::right_to_left(egui::Align::Center), |ui| {
                egui::ComboBox::from_id_salt("base_layer")
                    .selected_text(self.map.base_layer.label())
                    .show_ui(ui, |ui| {
                        for layer in BaseLayer::ALL {
                            ui.selectable_value(&mut self.map.base_layer, layer, layer.label());
                        }
                    });

                let locating = self.locate_rx.is_some();
                if ui.add_enabled(!locating, egui::Button::new("📍 Locate me")).clicked() {
                    self.locate_rx = Some(spawn_locate());
                }

                if let Some(message) = &self.status_message {
                    ui.label(egui::RichText::new(message).weak());
                }
            });
        });
    }
}

impl eframe::App for GuiApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        if !self.initial_scale_applied {
            let user_scale = self.ctx.gui_config.font_scale.unwrap_or(1.0);
            ctx.set_pixels_per_point(ctx.pixels_per_point() * user_scale);
            self.initial_scale_applied = true;
        }

        if let Some(set_time) = self.status_set_time
            && set_time.elapsed() > std::time::Duration::from_secs(STATUS_TIMEOUT_SECS)
        {
            self.status_message = None;
            self.status_set_time = None;
        }

        self.poll_workers(ctx);

        if ctx.input(|i| i.key_pressed(egui::Key::Escape)) {
            if self.state.selected.is_some() {
                self.state.selected = None;
            } else if !self.search_input.is_empty() {
                self.search_input.clear();
                self.state.set_query(String::new());
            }
        }
        if ctx.input(|i| i.modifiers.ctrl && i.key_pressed(egui::Key::Q)) {
            ctx.send_viewport_cmd(egui::ViewportCommand::Close);
        }

        if let Some(viewport) = self.state.viewport_request.take() {
            self.map.apply_viewport(viewport);
        }

        let panel = egui::SidePanel::left("sidebar")
            .resizable(true)
            .default_width(self.panel_width)
            .show(ctx, |ui| self.show_sidebar(ui));
        self.panel_width = panel.response.rect.width();

        if let Some(index) = self.state.selected {
            egui::SidePanel::right("detail")
                .resizable(true)
                .default_width(320.0)
                .show(ctx, |ui| self.show_detail_panel(ui, index));
        }

        egui::TopBottomPanel::bottom("info_bar").show(ctx, |ui| self.show_info_bar(ui));

        egui::CentralPanel::default()
            .frame(egui::Frame::NONE)
            .show(ctx, |ui| {
                let on_layer: Vec<usize> = self.state.on_layer.iter().copied().collect();
                let clicked = self.map.show(
                    ui,
                    &self.state.places,
                    on_layer.into_iter(),
                    self.state.selected,
                );
                if let Some(index) = clicked {
                    self.state.select_place(index);
                }
            });

        // Remember the window size for the config write on exit.
        let ppp = ctx.pixels_per_point();
        let used = ctx.used_rect();
        let size = ((used.width() * ppp) as u32, (used.height() * ppp) as u32);
        if size.0 > 100 && size.1 > 100 {
            self.last_window_size = Some(size);
        }
    }

    fn on_exit(&mut self) {
        let mut gui_config = self.ctx.gui_config.clone();
        if let Some((w, h)) = self.last_window_size {
            gui_config.width = Some(w);
            gui_config.height = Some(h);
        }
        gui_config.panel_width = Some(self.panel_width);
        if let Err(e) = self.ctx.save_gui_config(&gui_config) {
            eprintln!("Error saving config: {}", e);
        }
    }
}
