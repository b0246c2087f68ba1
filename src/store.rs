//! Location records loaded from a JSON file.
//!
//! The store is a flat JSON array of objects. `lat` and `lng` are required;
//! every other field (name, address, description, ...) is carried through to
//! the result untouched.

use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::error::{Error, Result};
use crate::traits::Located;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(flatten)]
    pub attributes: Map<String, Value>,
}

impl Location {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self {
            lat,
            lng,
            attributes: Map::new(),
        }
    }

    pub fn with_attribute(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn name(&self) -> Option<&str> {
        self.attributes.get("name").and_then(Value::as_str)
    }
}

impl Located for Location {
    fn location(&self) -> (f64, f64) {
        (self.lat, self.lng)
    }
}

/// Validated, ordered collection of locations.
#[derive(Debug, Clone, Default)]
pub struct LocationStore {
    locations: Vec<Location>,
}

impl LocationStore {
    pub fn new(locations: Vec<Location>) -> Result<Self> {
        for (index, location) in locations.iter().enumerate() {
            check_coordinates(index, location.lat, location.lng)?;
        }
        Ok(Self { locations })
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let store = Self::from_reader(BufReader::new(File::open(path)?))?;
        tracing::info!(count = store.len(), path = %path.display(), "loaded locations");
        Ok(store)
    }

    pub fn from_reader(reader: impl Read) -> Result<Self> {
        let records: Vec<Value> = serde_json::from_reader(reader)?;
        Self::from_records(records)
    }

    pub fn from_json_str(json: &str) -> Result<Self> {
        let records: Vec<Value> = serde_json::from_str(json)?;
        Self::from_records(records)
    }

    fn from_records(records: Vec<Value>) -> Result<Self> {
        let locations = records
            .into_iter()
            .enumerate()
            .map(|(index, record)| parse_record(index, record))
            .collect::<Result<Vec<_>>>()?;
        Self::new(locations)
    }

    pub fn locations(&self) -> &[Location] {
        &self.locations
    }

    pub fn len(&self) -> usize {
        self.locations.len()
    }

    pub fn is_empty(&self) -> bool {
        self.locations.is_empty()
    }
}

fn parse_record(index: usize, record: Value) -> Result<Location> {
    serde_json::from_value(record).map_err(|err| Error::invalid_location(index, err.to_string()))
}

fn check_coordinates(index: usize, lat: f64, lng: f64) -> Result<()> {
    if !lat.is_finite() || !(-90.0..=90.0).contains(&lat) {
        return Err(Error::invalid_location(index, format!("latitude {lat} out of range")));
    }
    if !lng.is_finite() || !(-180.0..=180.0).contains(&lng) {
        return Err(Error::invalid_location(index, format!("longitude {lng} out of range")));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_passthrough_fields_survive() {
        let store = LocationStore::from_json_str(
            r#"[{"name":"Frey House II","address":"686 W Palisades Dr","lat":33.8303,"lng":-116.5453,"year":1964}]"#,
        )
        .unwrap();
        let location = &store.locations()[0];
        assert_eq!(location.location(), (33.8303, -116.5453));
        assert_eq!(location.name(), Some("Frey House II"));
        assert_eq!(location.attributes["year"], 1964);
        assert!(!location.attributes.contains_key("lat"));

        let json = serde_json::to_value(location).unwrap();
        assert_eq!(json["lat"], 33.8303);
        assert_eq!(json["address"], "686 W Palisades Dr");
    }

    #[test]
    fn test_missing_coordinate_rejected() {
        let err = LocationStore::from_json_str(r#"[{"lat":1.0,"lng":2.0},{"name":"x","lat":1.0}]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidLocation { index: 1, ref reason } if reason.contains("lng")));
    }

    #[test]
    fn test_non_numeric_coordinate_rejected() {
        let err = LocationStore::from_json_str(r#"[{"lat":"33.8","lng":-116.5}]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidLocation { index: 0, .. }));
    }

    #[test]
    fn test_out_of_range_rejected() {
        let err = LocationStore::new(vec![Location::new(0.0, 0.0), Location::new(95.0, 0.0)]).unwrap_err();
        assert!(matches!(err, Error::InvalidLocation { index: 1, .. }));
    }

    #[test]
    fn test_integer_coordinates_accepted() {
        let store = LocationStore::from_json_str(r#"[{"name":"origin","lat":0,"lng":-116}]"#).unwrap();
        assert_eq!(store.locations()[0].location(), (0.0, -116.0));
        assert_eq!(store.locations()[0].name(), Some("origin"));
    }

    #[test]
    fn test_non_object_record_rejected() {
        let err = LocationStore::from_json_str(r#"[{"lat":1.0,"lng":2.0},[1.0,2.0]]"#).unwrap_err();
        assert!(matches!(err, Error::InvalidLocation { index: 1, .. }));
    }

    #[test]
    fn test_not_an_array() {
        let err = LocationStore::from_json_str(r#"{"lat":1.0}"#).unwrap_err();
        assert!(matches!(err, Error::Json(_)));
    }

    #[test]
    fn test_empty_store() {
        let store = LocationStore::from_json_str("[]").unwrap();
        assert!(store.is_empty());
    }
}
