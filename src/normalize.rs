// Text normalization and category styling shared by search, filters and markers.

use unicode_normalization::UnicodeNormalization;
use unicode_normalization::char::is_combining_mark;

/// Lowercase, NFD-decompose, drop combining marks, keep only `[a-z0-9]`.
/// Total and idempotent; the normalized form of any input round-trips
/// through itself unchanged.
pub fn normalize_text(s: &str) -> String {
    s.to_lowercase()
        .nfd()
        .filter(|c| !is_combining_mark(*c))
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit())
        .collect()
}

/// Collation key for title ordering: lowercase with combining marks
/// stripped, everything else (spaces, digits, punctuation) kept. "Ávila"
/// sorts as "avila", next to the other a-titles.
pub fn collation_key(s: &str) -> String {
    s.to_lowercase().nfd().filter(|c| !is_combining_mark(*c)).collect()
}

/// Diacritic/case-insensitive substring match. A blank query matches anything.
pub fn soft_match(text: &str, query: &str) -> bool {
    if query.trim().is_empty() {
        return true;
    }
    normalize_text(text).contains(&normalize_text(query))
}

pub const DEFAULT_CATEGORY_COLOR: &str = "#2563EB"; // Tour Blue
pub const DEFAULT_CATEGORY_EMOJI: &str = "📍";

const CATEGORY_COLORS: &[(&str, &str)] = &[
    ("Beach", "#3CB9FF"),
    ("Entertainment", "#D946EF"),
    ("Food", "#F97316"),
    ("Hiking", "#34D399"),
    ("Historical Landmark", "#8B5CF6"),
    ("Museum", "#6366F1"),
    ("Nightlife", "#EC4899"),
    ("Park/Nature", "#22C55E"),
    ("Point of Interest", "#FBBF24"),
    ("River/Waterfall", "#0EA5E9"),
    ("Shopping", "#F59E0B"),
    ("Tour/Activity", "#2563EB"),
    ("Viewpoint", "#EF4444"),
];

const CATEGORY_EMOJIS: &[(&str, &str)] = &[
    ("Beach", "🏖️"),
    ("Entertainment", "🎟️"),
    ("Food", "🍽️"),
    ("Hiking", "🥾"),
    ("Historical Landmark", "🏰"),
    ("Museum", "🏛️"),
    ("Nightlife", "🎵"),
    ("Park/Nature", "🌳"),
    ("Point of Interest", "📍"),
    ("River/Waterfall", "🏞️"),
    ("Shopping", "🛍️"),
    ("Tour/Activity", "🧭"),
    ("Viewpoint", "📸"),
];

// Substring fallbacks for category names the fixed tables don't know.
// First match wins, so e.g. "Beach Bar" stays beach-colored; keep the order.
const CATEGORY_HEURISTICS: &[(&[&str], &str, &str)] = &[
    (&["beach"], "#3CB9FF", "🏖️"),
    (&["night"], "#EC4899", "🎵"),
    (&["food", "restaurant"], "#F97316", "🍽️"),
    (&["park", "nature"], "#22C55E", "🌳"),
    (&["hike"], "#34D399", "🥾"),
    (&["view"], "#EF4444", "📸"),
    (&["museum"], "#6366F1", "🏛️"),
    (&["historic", "landmark"], "#8B5CF6", "🏰"),
    (&["shop"], "#F59E0B", "🛍️"),
    (&["entertainment"], "#D946EF", "🎟️"),
    (&["tour", "activity"], "#2563EB", "🧭"),
    (&["water", "river", "falls"], "#0EA5E9", "🏞️"),
    (&["point"], "#FBBF24", "📍"),
];

fn heuristic_match(category: &str) -> Option<(&'static str, &'static str)> {
    let lower = category.to_lowercase();
    for (needles, color, emoji) in CATEGORY_HEURISTICS {
        if needles.iter().any(|n| lower.contains(n)) {
            return Some((color, emoji));
        }
    }
    None
}

/// Hex color token for a category: exact table hit, then substring
/// heuristics, then the default.
pub fn category_color(category: &str) -> &'static str {
    if category.is_empty() {
        return DEFAULT_CATEGORY_COLOR;
    }
    if let Some((_, color)) = CATEGORY_COLORS.iter().find(|(name, _)| *name == category) {
        return color;
    }
    heuristic_match(category).map(|(c, _)| c).unwrap_or(DEFAULT_CATEGORY_COLOR)
}

pub fn category_emoji(category: &str) -> &'static str {
    if category.is_empty() {
        return DEFAULT_CATEGORY_EMOJI;
    }
    if let Some((_, emoji)) = CATEGORY_EMOJIS.iter().find(|(name, _)| *name == category) {
        return emoji;
    }
    heuristic_match(category).map(|(_, e)| e).unwrap_or(DEFAULT_CATEGORY_EMOJI)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_basic() {
        assert_eq!(normalize_text("Flamenco Beach"), "flamencobeach");
        assert_eq!(normalize_text("  El Yunque! "), "elyunque");
        assert_eq!(normalize_text(""), "");
    }

    #[test]
    fn test_normalize_diacritics() {
        assert_eq!(normalize_text("Bayamón"), "bayamon");
        assert_eq!(normalize_text("Río Camuy"), "riocamuy");
        assert_eq!(normalize_text("PIÑONES"), "pinones");
    }

    #[test]
    fn test_normalize_idempotent() {
        for s in ["Añasco 123", "Café Crème", "abc", "", "ÀÉÎÕÜ"] {
            let once = normalize_text(s);
            assert_eq!(normalize_text(&once), once);
            assert!(once.chars().all(|c| c.is_ascii_lowercase() || c.is_ascii_digit()));
        }
    }

    #[test]
    fn test_collation_key() {
        assert_eq!(collation_key("Ávila Pier"), "avila pier");
        assert_eq!(collation_key("Río Camuy 3"), "rio camuy 3");
        assert!(collation_key("Ávila Pier") < collation_key("Beach Two"));
    }

    #[test]
    fn test_soft_match() {
        assert!(soft_match("Flamenco Beach", "beach"));
        assert!(soft_match("Bayamón", "bayamon"));
        assert!(soft_match("anything", ""));
        assert!(soft_match("anything", "   "));
        assert!(!soft_match("El Yunque", "beach"));
    }

    #[test]
    fn test_category_exact_table() {
        assert_eq!(category_color("Beach"), "#3CB9FF");
        assert_eq!(category_color("Viewpoint"), "#EF4444");
        assert_eq!(category_emoji("Museum"), "🏛️");
    }

    #[test]
    fn test_category_heuristic_order() {
        // "Beach Bar" hits the beach heuristic before anything later in the list.
        assert_eq!(category_color("Beach Bar"), "#3CB9FF");
        // "Nature Viewpoint Trail" contains both "nature" and "view";
        // park/nature comes first.
        assert_eq!(category_color("Nature Viewpoint Trail"), "#22C55E");
        // "Waterfall Hike" reaches the hike heuristic before the water one.
        assert_eq!(category_emoji("Waterfall Hike"), "🥾");
        assert_eq!(category_emoji("Cascada Falls"), "🏞️");
    }

    #[test]
    fn test_category_default() {
        assert_eq!(category_color(""), DEFAULT_CATEGORY_COLOR);
        assert_eq!(category_color("Zorbing"), DEFAULT_CATEGORY_COLOR);
        assert_eq!(category_emoji("Zorbing"), DEFAULT_CATEGORY_EMOJI);
    }
}
