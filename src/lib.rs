/*!
# Address to GPS Converter

A browser-based service that turns spreadsheet rows containing address
fragments into geocoded latitude/longitude pairs plus Google Maps links.

## Overview

Users upload an `.xls`/`.xlsx` file whose columns hold parts of an address
(e.g. Street, City, State, Postal Code, Country), pick the columns that form
the address in the right order, and download an updated `.xlsx` with
`Full_Address`, `Latitude`, `Longitude` and `Google_Maps_Link` appended.

## Pipeline

Control flows strictly forward through four stages:

1. **Loader** (`loader`) — parses the uploaded workbook into an in-memory
   [`table::Table`], reading every cell as text and normalizing missing and
   placeholder values.
2. **Address Builder** (`address`) — joins the selected columns per row into
   one `Full_Address` string and cleans up the comma artifacts empty fields
   leave behind.
3. **Geocoder Adapter** (`geocode`) — one rate-limited lookup per row against
   an external provider behind the [`geocode::Geocoder`] trait; a failed
   lookup records empty coordinates for that row only.
4. **Exporter** (`downloader`) — derives the maps-link column and serializes
   the table back to an `.xlsx` byte buffer for download.

## Modules

- **table**: the in-memory tabular structure shared by all stages
- **loader**: spreadsheet parsing and cell normalization
- **address**: address concatenation and artifact cleanup
- **geocode**: provider trait, Nominatim client, sequential row loop
- **downloader**: maps links and xlsx export
- **error**: failure taxonomy and HTTP response mapping
- **app**: axum routing, session state machine and handlers

## REST API Endpoints

- `POST /api/upload` - multipart spreadsheet upload
- `GET /api/table` - JSON preview of the current table
- `POST /api/convert` - run the conversion over selected columns
- `GET /api/progress` - row-loop progress counters
- `GET /api/download` - the converted `converted_addresses.xlsx`
*/

pub mod address;
pub mod app;
pub mod downloader;
pub mod error;
pub mod geocode;
pub mod loader;
pub mod table;
