use std::cmp::Ordering;

use crate::models::classification::ClassificationLabel;

/// Static table translating recognized food labels into cuisine categories.
/// One key, one value: "crispy chicken" is deliberately American (the dish,
/// not the preparation style).
const FOOD_TO_CUISINE: &[(&str, &str)] = &[
    ("burger", "American"),
    ("pizza", "Italian"),
    ("sushi", "Japanese"),
    ("biryani", "Indian"),
    ("tacos", "Mexican"),
    ("pasta", "Italian"),
    ("cheesecake", "Dessert"),
    ("baked potato", "American"),
    ("crispy chicken", "American"),
    ("chai", "Indian"),
];

pub fn cuisine_for_label(label: &str) -> Option<&'static str> {
    FOOD_TO_CUISINE
        .iter()
        .find(|(food, _)| food.eq_ignore_ascii_case(label))
        .map(|(_, cuisine)| *cuisine)
}

/// Ranks labels by descending score, keeps the top 2 and maps them through
/// the cuisine table, dropping anything unmapped.
pub fn top_cuisines(mut labels: Vec<ClassificationLabel>) -> Vec<String> {
    labels.sort_by(|a, b| b.score.partial_cmp(&a.score).unwrap_or(Ordering::Equal));

    labels
        .iter()
        .take(2)
        .filter_map(|item| cuisine_for_label(&item.label))
        .map(String::from)
        .collect()
}

/// The stored `cuisines` field is a free-text comma-separated string, so a
/// restaurant matches when any inferred cuisine appears in it as a substring.
pub fn cuisines_match(stored_cuisines: &str, inferred: &[String]) -> bool {
    inferred
        .iter()
        .any(|cuisine| stored_cuisines.contains(cuisine.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn label(label: &str, score: f64) -> ClassificationLabel {
        ClassificationLabel {
            label: label.to_string(),
            score,
        }
    }

    #[test]
    fn maps_known_labels_case_insensitively() {
        assert_eq!(cuisine_for_label("pizza"), Some("Italian"));
        assert_eq!(cuisine_for_label("Pizza"), Some("Italian"));
        assert_eq!(cuisine_for_label("BAKED POTATO"), Some("American"));
        assert_eq!(cuisine_for_label("ramen"), None);
    }

    #[test]
    fn takes_top_two_labels_by_score() {
        let cuisines = top_cuisines(vec![
            label("tacos", 0.3),
            label("pizza", 0.9),
            label("sushi", 0.7),
        ]);
        assert_eq!(cuisines, vec!["Italian".to_string(), "Japanese".to_string()]);
    }

    #[test]
    fn unmapped_labels_are_dropped() {
        let cuisines = top_cuisines(vec![
            label("ramen", 0.95),
            label("pizza", 0.6),
            label("sushi", 0.5),
        ]);
        // "ramen" takes a top-2 slot but maps to nothing.
        assert_eq!(cuisines, vec!["Italian".to_string()]);
    }

    #[test]
    fn only_unmapped_labels_yield_no_cuisines() {
        let cuisines = top_cuisines(vec![label("ramen", 0.9), label("pho", 0.8)]);
        assert!(cuisines.is_empty());
    }

    #[test]
    fn matches_cuisines_by_substring() {
        let inferred = vec!["Italian".to_string(), "Japanese".to_string()];
        assert!(cuisines_match("Italian, Pizza", &inferred));
        assert!(cuisines_match("Sushi, Japanese", &inferred));
        assert!(!cuisines_match("North Indian, Mughlai", &inferred));
        assert!(!cuisines_match("", &inferred));
    }
}
