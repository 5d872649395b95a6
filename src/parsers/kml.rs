//! Placemark reader for the campus map KML export.
//!
//! Pulls out the three things the pipeline needs per placemark: the name,
//! the free-text description blob, and the coordinate pair. Tag names are
//! matched by local name so the reader works with or without the KML
//! namespace declaration.

use roxmltree::{Document, Node};

/// One `<Placemark>` as found in the map export.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Placemark {
    pub name: String,
    pub description: String,
    /// (latitude, longitude); None when the coordinate element is missing
    /// or does not parse.
    pub coordinates: Option<(f64, f64)>,
}

/// Reads every placemark from a KML document, in document order.
pub fn parse_placemarks(xml: &str) -> Result<Vec<Placemark>, roxmltree::Error> {
    let doc = Document::parse(xml)?;
    let placemarks = doc
        .descendants()
        .filter(|node| node.tag_name().name() == "Placemark")
        .map(|node| Placemark {
            name: child_text(&node, "name"),
            description: child_text(&node, "description"),
            coordinates: coordinates(&node),
        })
        .collect();
    Ok(placemarks)
}

/// Trimmed text content of the first direct child with the given local
/// name; empty string when the child is absent.
fn child_text(node: &Node, name: &str) -> String {
    node.children()
        .find(|child| child.tag_name().name() == name)
        .map(|child| element_text(&child))
        .unwrap_or_default()
}

/// Concatenated text of an element's text and CDATA children.
fn element_text(node: &Node) -> String {
    node.children()
        .filter(|child| child.is_text())
        .filter_map(|child| child.text())
        .collect::<String>()
        .trim()
        .to_string()
}

/// Finds the `<coordinates>` descendant ("lon,lat[,alt]") and parses it
/// into (latitude, longitude). Any missing or unparseable part yields None.
fn coordinates(node: &Node) -> Option<(f64, f64)> {
    let text = node
        .descendants()
        .find(|child| child.tag_name().name() == "coordinates")
        .map(|child| element_text(&child))?;
    let mut parts = text.split(',');
    let longitude = parts.next()?.trim().parse::<f64>().ok()?;
    let latitude = parts.next()?.trim().parse::<f64>().ok()?;
    Some((latitude, longitude))
}
