// Place records as normalized at the data-fetch boundary.
//
// The feed's field names drift between revisions (lat/latitude/geo_lat,
// maps_url/google_maps_url, ...), so every alternate spelling is resolved
// here, once, into a fixed record. Downstream code never sees raw JSON.

use serde_json::Value;

use crate::normalize::normalize_text;

#[derive(Debug, Clone, Default)]
pub struct Place {
    pub id: Option<String>,
    pub slug: Option<String>,
    pub title: String,
    /// NaN when the feed had no parsable coordinate.
    pub latitude: f64,
    pub longitude: f64,
    pub category: Option<String>,
    pub region: Option<String>,
    pub description: Option<String>,
    pub image_url: Option<String>,
    pub image_credit: Option<String>,
    pub maps_url: Option<String>,
    pub website_url: Option<String>,
    pub cost: Option<String>,
    pub parking: Option<String>,
    pub municipality: Option<String>,

    // Normalized copies computed once after fetch so repeated search passes
    // don't re-normalize on every keystroke.
    pub norm_title: String,
    pub norm_category: String,
    pub norm_region: String,
    pub norm_description: String,
}

const LAT_KEYS: &[&str] = &["latitude", "lat", "Latitude", "Lat", "LAT", "geo_lat"];
const LON_KEYS: &[&str] = &["longitude", "lng", "lon", "Longitude", "Lng", "LON", "geo_lng", "geo_lon"];
const MAPS_URL_KEYS: &[&str] = &["google_maps_url", "map_url", "maps_url", "google_url"];
const IMAGE_KEYS: &[&str] = &["image_url", "image"];

/// First present key of `keys`, parsed as a float; NaN when absent or
/// unparsable. The feed has shipped coordinates both as numbers and as
/// numeric strings.
pub fn coerce_coordinate(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> f64 {
    for key in keys {
        match obj.get(*key) {
            Some(Value::Number(n)) => return n.as_f64().unwrap_or(f64::NAN),
            Some(Value::String(s)) => return s.trim().parse::<f64>().unwrap_or(f64::NAN),
            Some(_) => return f64::NAN,
            None => continue,
        }
    }
    f64::NAN
}

fn opt_string(obj: &serde_json::Map<String, Value>, keys: &[&str]) -> Option<String> {
    for key in keys {
        match obj.get(*key) {
            Some(Value::String(s)) if !s.is_empty() => return Some(s.clone()),
            Some(Value::Number(n)) => return Some(n.to_string()),
            Some(_) | None => continue,
        }
    }
    None
}

/// "Photo by {author} ({license})" from the credit field, which has shipped
/// as either a plain string or an {author, license} object.
fn credit_text(value: Option<&Value>) -> Option<String> {
    match value? {
        Value::String(s) if !s.is_empty() => Some(s.clone()),
        Value::Object(o) => {
            let author = o.get("author").and_then(Value::as_str);
            let license = o.get("license").and_then(Value::as_str);
            match (author, license) {
                (Some(a), Some(l)) => Some(format!("Photo by {} ({})", a, l)),
                (Some(a), None) => Some(format!("Photo by {}", a)),
                (None, Some(l)) => Some(l.to_string()),
                (None, None) => None,
            }
        }
        _ => None,
    }
}

impl Place {
    pub fn from_value(value: &Value) -> Self {
        let Some(obj) = value.as_object() else {
            return Self::default();
        };

        let title = opt_string(obj, &["title", "name"]).unwrap_or_default();
        let category = opt_string(obj, &["category"]);
        let region = opt_string(obj, &["region"]);
        let description = opt_string(obj, &["description"]);

        Self {
            norm_title: normalize_text(&title),
            norm_category: normalize_text(category.as_deref().unwrap_or("")),
            norm_region: normalize_text(region.as_deref().unwrap_or("")),
            norm_description: normalize_text(description.as_deref().unwrap_or("")),
            id: opt_string(obj, &["id"]),
            slug: opt_string(obj, &["slug"]),
            latitude: coerce_coordinate(obj, LAT_KEYS),
            longitude: coerce_coordinate(obj, LON_KEYS),
            image_url: opt_string(obj, IMAGE_KEYS),
            image_credit: credit_text(
                obj.get("image_credit").or_else(|| obj.get("imageCredit")).or_else(|| obj.get("credit")),
            ),
            maps_url: opt_string(obj, MAPS_URL_KEYS),
            website_url: opt_string(obj, &["website_url", "website"]),
            cost: opt_string(obj, &["cost"]),
            parking: opt_string(obj, &["parking"]),
            municipality: opt_string(obj, &["municipality"]),
            title,
            category,
            region,
            description,
        }
    }

    /// Whether this place can appear on the map. Exact 0 coordinates are the
    /// upstream "unset" sentinel and are treated as missing.
    pub fn renderable(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude != 0.0
            && self.longitude != 0.0
    }

    pub fn category_str(&self) -> &str {
        self.category.as_deref().unwrap_or("")
    }

    pub fn region_str(&self) -> &str {
        self.region.as_deref().unwrap_or("")
    }
}

/// Stable identity for favorites and marker correlation. Unique within one
/// loaded list; positional fallback keys are only stable per session, which
/// is fine for device-local favorites.
pub fn place_key(place: &Place, index: usize) -> String {
    if let Some(id) = place.id.as_deref().filter(|s| !s.is_empty()) {
        return format!("id:{}", id);
    }
    if let Some(slug) = place.slug.as_deref().filter(|s| !s.is_empty()) {
        return format!("slug:{}", slug);
    }
    format!("idx:{}:{}", index, place.title)
}
