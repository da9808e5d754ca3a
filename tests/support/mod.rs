#![allow(dead_code)]

use std::collections::HashMap;

use async_trait::async_trait;
use rust_xlsxwriter::{Workbook, Worksheet};

use address_to_gps::geocode::{Coordinates, Geocoder};

/// Canned geocoding provider: any address not in the map is a miss.
pub struct StaticGeocoder {
    places: HashMap<String, Coordinates>,
}

impl StaticGeocoder {
    pub fn new(entries: &[(&str, f64, f64)]) -> Self {
        let places = entries
            .iter()
            .map(|(address, latitude, longitude)| {
                (
                    address.to_string(),
                    Coordinates {
                        latitude: *latitude,
                        longitude: *longitude,
                    },
                )
            })
            .collect();
        StaticGeocoder { places }
    }

    /// A provider that never resolves anything.
    pub fn empty() -> Self {
        StaticGeocoder {
            places: HashMap::new(),
        }
    }
}

#[async_trait]
impl Geocoder for StaticGeocoder {
    async fn geocode(&self, address: &str) -> Option<Coordinates> {
        self.places.get(address).copied()
    }
}

/// Build an in-memory xlsx workbook from string rows, first row as header.
pub fn workbook_bytes(rows: &[&[&str]]) -> Vec<u8> {
    let mut workbook = Workbook::new();
    let mut worksheet = Worksheet::new();
    for (r, row) in rows.iter().enumerate() {
        for (c, cell) in row.iter().enumerate() {
            worksheet
                .write_string(r as u32, c as u16, *cell)
                .expect("write cell");
        }
    }
    workbook.push_worksheet(worksheet);
    workbook.save_to_buffer().expect("serialize workbook")
}
