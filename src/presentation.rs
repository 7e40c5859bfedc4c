// Pure view-model construction for markers and the detail panel. No
// business logic beyond conditional inclusion of optional fields; rendering
// lives in the gui module.

use crate::normalize::{category_color, category_emoji};
use crate::place::Place;

/// Marker appearance for one place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MarkerIcon {
    pub color: &'static str,
    pub emoji: &'static str,
}

pub fn marker_icon(place: &Place) -> MarkerIcon {
    let category = place.category_str();
    MarkerIcon { color: category_color(category), emoji: category_emoji(category) }
}

/// "#RRGGBB" to RGB components; the default category color on bad input.
pub fn parse_hex_color(hex: &str) -> (u8, u8, u8) {
    let parse = |s: &str| -> Option<(u8, u8, u8)> {
        let s = s.strip_prefix('#')?;
        if s.len() != 6 {
            return None;
        }
        Some((
            u8::from_str_radix(&s[0..2], 16).ok()?,
            u8::from_str_radix(&s[2..4], 16).ok()?,
            u8::from_str_radix(&s[4..6], 16).ok()?,
        ))
    };
    parse(hex).unwrap_or((0x25, 0x63, 0xEB))
}

/// Everything the detail popup/sheet shows for one place, with the "N/A"
/// placeholder convention for the fixed detail rows.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlaceDetails {
    pub title: String,
    /// "🥾 Hiking • Este" style line; None when the place has neither
    /// category nor region.
    pub category_line: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image_credit: Option<String>,
    pub maps_url: Option<String>,
    /// Some(url) renders a button; None renders the "Website: N/A" row.
    pub website_url: Option<String>,
    pub cost: String,
    pub parking: String,
    pub municipality: String,
    pub is_favorite: bool,
}

fn or_na(value: Option<&str>) -> String {
    match value {
        Some(s) if !s.is_empty() => s.to_string(),
        _ => "N/A".to_string(),
    }
}

pub fn place_details(place: &Place, is_favorite: bool) -> PlaceDetails {
    let category_line = match (place.category.as_deref(), place.region.as_deref()) {
        (None, None) => None,
        (category, region) => {
            let mut line = String::new();
            if let Some(c) = category {
                line.push_str(category_emoji(c));
                line.push(' ');
                line.push_str(c);
            }
            if let Some(r) = region {
                if !line.is_empty() {
                    line.push_str(" • ");
                }
                line.push_str(r);
            }
            Some(line)
        }
    };

    PlaceDetails {
        title: place.title.clone(),
        category_line,
        description: place.description.clone(),
        image_url: place.image_url.clone(),
        image_credit: place.image_credit.clone(),
        maps_url: maps_link(place),
        website_url: place.website_url.clone(),
        cost: or_na(place.cost.as_deref()),
        parking: or_na(place.parking.as_deref()),
        municipality: or_na(place.municipality.as_deref()),
        is_favorite,
    }
}

/// The feed's maps link when present, else a coordinate link for renderable
/// places, else nothing.
pub fn maps_link(place: &Place) -> Option<String> {
    if let Some(url) = place.maps_url.as_deref().filter(|s| !s.is_empty()) {
        return Some(url.to_string());
    }
    place
        .renderable()
        .then(|| format!("https://www.google.com/maps?q={},{}", place.latitude, place.longitude))
}
