//! Field extraction from the placemark description blob.
//!
//! The map export stores per-tree attributes as labeled lines inside an
//! HTML-ish free-text block ("Common Name: Ginkgo<br>DBH: 8.5..."). Each
//! known label gets its own extraction rule, applied independently of the
//! others: the value is whatever follows "<label>:" up to the next markup
//! tag or line break. A missing label degrades to an empty string, never to
//! an error.

use once_cell::sync::Lazy;
use regex::Regex;

/// Known field labels, in the order the map export writes them.
const FIELD_LABELS: &[&str] = &[
    "Common Name",
    "Scientific Name",
    "Additional Taxonomy",
    "Tree ID",
    "DBH",
    "Source",
    "Community Tags",
    "Memorial",
];

/// Placeholder values the map uses for "nothing recorded".
const PLACEHOLDER_VALUES: &[&str] = &["...", "None", "N/A"];

static FIELD_RULES: Lazy<Vec<(&'static str, Regex)>> = Lazy::new(|| {
    FIELD_LABELS
        .iter()
        .map(|&label| {
            let rule = Regex::new(&format!(r"{}:\s*([^<\n]+)", regex::escape(label)))
                .expect("field extraction rule");
            (label, rule)
        })
        .collect()
});

/// Structured fields pulled from one description blob. Every field is a
/// plain string; empty means the label was absent or held a placeholder.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct DescriptionFields {
    pub tree_id: String,
    pub common_name: String,
    pub scientific_name: String,
    pub additional_taxonomy: String,
    pub dbh_raw: String,
    pub source: String,
    pub community_tags: String,
    pub memorial: String,
}

/// Applies every field rule to the blob and assembles the result.
pub fn parse_description(text: &str) -> DescriptionFields {
    let mut fields = DescriptionFields::default();
    for (label, rule) in FIELD_RULES.iter() {
        let value = extract_value(text, rule);
        match *label {
            "Common Name" => fields.common_name = value,
            "Scientific Name" => fields.scientific_name = value,
            "Additional Taxonomy" => fields.additional_taxonomy = value,
            "Tree ID" => fields.tree_id = value,
            "DBH" => fields.dbh_raw = value,
            "Source" => fields.source = value,
            "Community Tags" => fields.community_tags = value,
            "Memorial" => fields.memorial = value,
            _ => {}
        }
    }
    fields
}

fn extract_value(text: &str, rule: &Regex) -> String {
    let captured = rule
        .captures(text)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().trim())
        .unwrap_or("");
    if PLACEHOLDER_VALUES.contains(&captured) {
        String::new()
    } else {
        captured.to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BLOB: &str = "Common Name: Ginkgo<br>Scientific Name: Ginkgo biloba<br>\
Additional Taxonomy: ...<br>Tree ID: 1042<br>DBH: 8.5<br>Source: Nursery stock<br>\
Community Tags: N/A<br>Memorial: None";

    #[test]
    fn each_label_extracts_independently() {
        let fields = parse_description(BLOB);
        assert_eq!(fields.common_name, "Ginkgo");
        assert_eq!(fields.scientific_name, "Ginkgo biloba");
        assert_eq!(fields.tree_id, "1042");
        assert_eq!(fields.dbh_raw, "8.5");
        assert_eq!(fields.source, "Nursery stock");
    }

    #[test]
    fn placeholders_become_empty() {
        let fields = parse_description(BLOB);
        assert_eq!(fields.additional_taxonomy, "");
        assert_eq!(fields.community_tags, "");
        assert_eq!(fields.memorial, "");
    }

    #[test]
    fn missing_labels_degrade_to_empty() {
        let fields = parse_description("DBH: 12");
        assert_eq!(fields.dbh_raw, "12");
        assert_eq!(fields.common_name, "");
        assert_eq!(fields.scientific_name, "");
    }

    #[test]
    fn value_stops_at_markup_or_line_break() {
        let fields = parse_description("Common Name: Oak, Bur<br>DBH: 30\nSource: survey");
        assert_eq!(fields.common_name, "Oak, Bur");
        assert_eq!(fields.dbh_raw, "30");
        assert_eq!(fields.source, "survey");
    }

    #[test]
    fn empty_blob_yields_default_fields() {
        assert_eq!(parse_description(""), DescriptionFields::default());
    }
}
