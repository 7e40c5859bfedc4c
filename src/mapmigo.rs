// MapMigo: browse points of interest on a slippy map, with search,
// category/region filters and saved places. Runs as a GUI by default;
// --list and --suggest provide headless output for scripting.
use clap::Parser;

mod config;
mod events;
mod favorites;
mod fetch;
mod filters;
mod geo_util;
mod gui;
mod normalize;
mod place;
mod presentation;
mod search;
mod state;

use config::AppContext;
use favorites::FavoritesStore;
use presentation::marker_icon;
use search::rank_suggestions;
use state::AppState;

// --- CLI Definition ---

#[derive(Parser, Debug)]
#[command(author, version, about = "Browse places on a map.", long_about = None)]
struct Cli {
    /// Print the places matching the filters and exit
    #[arg(long)]
    list: bool,

    /// Print the top search suggestions for a query and exit
    #[arg(long, value_name = "QUERY")]
    suggest: Option<String>,

    /// Only show places in this category (repeatable)
    #[arg(long, value_name = "NAME")]
    category: Vec<String>,

    /// Only show places in this region (repeatable)
    #[arg(long, value_name = "NAME")]
    region: Vec<String>,

    /// Search text applied before listing
    #[arg(long, value_name = "TEXT")]
    query: Option<String>,

    /// Override the places feed URL from the config file
    #[arg(long, value_name = "URL")]
    url: Option<String>,
}

impl Cli {
    fn validate(&self) -> Result<(), String> {
        if self.list && self.suggest.is_some() {
            return Err("Cannot use both --list and --suggest".to_string());
        }

        if let Some(url) = &self.url
            && !(url.starts_with("http://") || url.starts_with("https://"))
        {
            return Err(format!("Feed URL must be http(s): {}", url));
        }

        if self.suggest.as_deref().is_some_and(|q| q.trim().is_empty()) {
            return Err("Suggestion query must not be blank".to_string());
        }

        Ok(())
    }

    fn is_headless(&self) -> bool {
        self.list || self.suggest.is_some()
    }
}

fn run_headless(ctx: &AppContext, args: &Cli) -> anyhow::Result<()> {
    // Both modes run the same filter pass the GUI uses.
    let places = fetch::fetch_places(ctx.map_config.data_url())?;
    let mut state = AppState::new(FavoritesStore::load());
    state.set_places(places);
    for name in &args.category {
        state.toggle_category(name);
    }
    for name in &args.region {
        state.toggle_region(name);
    }

    if let Some(query) = &args.suggest {
        // Suggestions rank only the currently visible places.
        let suggestions = rank_suggestions(&state.places, &state.visible, query);
        if suggestions.is_empty() {
            println!("No matches.");
            return Ok(());
        }
        for suggestion in suggestions {
            let place = &state.places[suggestion.index];
            println!("{:>3}  {}", suggestion.score, place.title);
        }
        return Ok(());
    }

    if let Some(query) = &args.query {
        state.set_query(query.clone());
    }

    println!("{}", state.info_bar);
    for (index, place) in state.visible_places() {
        let icon = marker_icon(place);
        let star = if state.is_favorite(index) { " ★" } else { "" };
        println!(
            "{} {}{}  [{} | {}]  ({:.4}, {:.4})",
            icon.emoji,
            place.title,
            star,
            place.category_str(),
            place.region_str(),
            place.latitude,
            place.longitude,
        );
    }

    Ok(())
}

fn main() -> anyhow::Result<()> {
    let args = Cli::parse();
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    let mut ctx = match AppContext::new() {
        Ok(ctx) => ctx,
        Err(e) => {
            eprintln!("Config error: {}. Using built-in defaults.", e);
            AppContext::ephemeral()
        }
    };
    if let Some(url) = &args.url {
        ctx.map_config.data_url = Some(url.clone());
    }

    if args.is_headless() {
        return run_headless(&ctx, &args);
    }

    let state = AppState::new(FavoritesStore::load());
    let app = gui::GuiApp::new(ctx, state);
    if let Err(e) = app.run() {
        eprintln!("GUI Error: {}", e);
    }
    Ok(())
}
