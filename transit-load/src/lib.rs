//! # transit-load
//!
//! Reprojection des lignes et corridors du réseau de transport puis chargement dans PostGIS.
//!
//! ## Features
//!
//! - Reprojection PROJ vers la projection cible (EPSG:2961 par défaut)
//! - Chargement transactionnel par table (commit unique, rollback à la première erreur)
//! - Lecture de diagnostic d'un jeu de données
//! - CLI simple
//!
//! ## Usage CLI
//!
//! ```bash
//! # Diagnostic du jeu de données
//! transit-load inspect --path ./transit_transformed.geojson
//!
//! # Reprojection puis chargement des corridors
//! transit-load transform
//! transit-load load --variant insert-corridor
//!
//! # Tout en une fois
//! transit-load run --variant update-route --variant insert-corridor
//! ```

pub mod config;
pub mod db;
pub mod inspect;
pub mod load;
pub mod report;
pub mod reproject;
pub mod transform;

pub use config::{Config, TARGET_EPSG};
pub use db::{connect_db, DatabaseConfig};
pub use load::{load_features, load_table, LoadVariant};
pub use report::{LoadReport, LoadStatus};
