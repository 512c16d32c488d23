//! Rapport de chargement d'une table
//!
//! Un rapport par table chargée: nombre d'instructions, lignes affectées,
//! statut final (commit ou rollback).

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::Serialize;

/// Statut final d'un chargement
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum LoadStatus {
    /// Toutes les instructions exécutées et commitées
    Committed,
    /// Chargement annulé (rollback)
    RolledBack,
}

/// Rapport de chargement d'une table
#[derive(Debug, Clone, Serialize)]
pub struct LoadReport {
    /// Table cible (schema.table)
    pub table: String,
    /// Variante de chargement
    pub variant: String,
    /// Nombre d'instructions exécutées
    pub statements: usize,
    /// Nombre total de lignes affectées
    pub rows_affected: u64,
    /// Statut final
    pub status: LoadStatus,
    /// Durée du chargement
    pub duration_secs: f64,
    /// Cause du rollback
    pub error: Option<String>,
}

impl LoadReport {
    pub fn new(table: &str, variant: &str) -> Self {
        Self {
            table: table.to_string(),
            variant: variant.to_string(),
            statements: 0,
            rows_affected: 0,
            status: LoadStatus::Committed,
            duration_secs: 0.0,
            error: None,
        }
    }

    /// Définit la durée du chargement
    pub fn set_duration(&mut self, duration: Duration) {
        self.duration_secs = duration.as_secs_f64();
    }

    /// Affiche le rapport sur la console
    pub fn display(&self) {
        println!("\n{}", "=".repeat(60));
        println!("LOAD REPORT - {} ({})", self.table, self.variant);
        println!("{}", "=".repeat(60));

        println!("\nStatus: {:?}", self.status);
        println!("Duration: {:.2}s", self.duration_secs);
        println!("Statements: {}", self.statements);
        println!("Rows affected: {}", self.rows_affected);

        if let Some(error) = &self.error {
            println!("\n--- ERROR ---");
            println!("  {}", error);
        }

        println!("\n{}", "=".repeat(60));
    }

    /// Affichage compact pour le résumé
    pub fn summary(&self) -> String {
        format!(
            "{} [{}]: {} statements, {} rows, {:?}",
            self.table, self.variant, self.statements, self.rows_affected, self.status
        )
    }
}

/// Sauvegarde une liste de rapports en JSON
pub fn save_reports(reports: &[LoadReport], path: &Path) -> Result<()> {
    let json = serde_json::to_string_pretty(reports)?;
    std::fs::write(path, json)
        .with_context(|| format!("Failed to write report: {}", path.display()))?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_report() {
        let report = LoadReport::new("transit.transit_corridor", "insert-corridor");
        assert_eq!(report.status, LoadStatus::Committed);
        assert_eq!(report.statements, 0);
        assert!(report.error.is_none());
    }

    #[test]
    fn test_summary() {
        let mut report = LoadReport::new("transit.route_corridor", "insert-route-link");
        report.statements = 12;
        report.rows_affected = 12;

        let summary = report.summary();
        assert!(summary.contains("transit.route_corridor"));
        assert!(summary.contains("12 statements"));
        assert!(summary.contains("Committed"));
    }

    #[test]
    fn test_save_reports() {
        let mut rolled_back = LoadReport::new("transit.transit_route", "update-route");
        rolled_back.status = LoadStatus::RolledBack;
        rolled_back.error = Some("boom".to_string());
        let reports = vec![
            LoadReport::new("transit.transit_corridor", "insert-corridor"),
            rolled_back,
        ];

        let path = std::env::temp_dir().join(format!("transit_report_{}.json", std::process::id()));
        save_reports(&reports, &path).unwrap();

        let content = std::fs::read_to_string(&path).unwrap();
        assert!(content.contains("RolledBack"));
        assert!(content.contains("insert-corridor"));

        std::fs::remove_file(path).ok();
    }
}
