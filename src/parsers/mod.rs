pub mod description;
pub mod kml;
