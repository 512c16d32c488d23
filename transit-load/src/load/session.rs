//! Transaction de chargement d'une table
//!
//! Toutes les instructions d'une table passent dans une seule transaction:
//! commit unique en fin de boucle, rollback explicite à la première erreur.

use std::time::Instant;

use anyhow::{Context, Result};
use tokio_postgres::types::ToSql;
use tracing::{debug, error, info};

use crate::report::{LoadReport, LoadStatus};

/// Type d'un paramètre SQL (utile pour typer un NULL)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamType {
    Int,
    Text,
}

/// Valeur de paramètre SQL construite depuis une feature
#[derive(Debug, Clone, PartialEq)]
pub enum SqlValue {
    Int(i64),
    Text(String),
    Null(ParamType),
}

impl SqlValue {
    /// Convertit en paramètre tokio-postgres
    pub fn to_sql_param(&self) -> Box<dyn ToSql + Sync> {
        match self {
            SqlValue::Int(v) => Box::new(*v),
            SqlValue::Text(s) => Box::new(s.clone()),
            SqlValue::Null(ParamType::Int) => Box::new(None::<i64>),
            SqlValue::Null(ParamType::Text) => Box::new(None::<String>),
        }
    }
}

/// Session d'exécution SQL transactionnelle
///
/// Implémentée pour `tokio_postgres::Transaction`; les tests utilisent une session
/// qui enregistre les appels.
#[allow(async_fn_in_trait)]
pub trait LoadSession {
    /// Exécute une instruction, retourne le nombre de lignes affectées
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64>;

    /// Valide la transaction
    async fn commit(self) -> Result<()>;

    /// Annule la transaction
    async fn rollback(self) -> Result<()>;
}

impl LoadSession for tokio_postgres::Transaction<'_> {
    async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<u64> {
        let values: Vec<Box<dyn ToSql + Sync>> =
            params.iter().map(SqlValue::to_sql_param).collect();
        let refs: Vec<&(dyn ToSql + Sync)> = values.iter().map(|v| v.as_ref()).collect();

        tokio_postgres::Transaction::execute(self, sql, &refs)
            .await
            .context("Statement execution failed")
    }

    async fn commit(self) -> Result<()> {
        tokio_postgres::Transaction::commit(self)
            .await
            .context("Failed to commit transaction")
    }

    async fn rollback(self) -> Result<()> {
        tokio_postgres::Transaction::rollback(self)
            .await
            .context("Failed to rollback transaction")
    }
}

/// Chargement transactionnel d'une table
pub struct TableLoad<S: LoadSession> {
    session: S,
    report: LoadReport,
    started_at: Instant,
}

impl<S: LoadSession> TableLoad<S> {
    /// Démarre le chargement d'une table sur une session déjà ouverte
    pub fn begin(session: S, table: &str, variant: &str) -> Self {
        info!(table = %table, variant = %variant, "Starting table load");

        Self {
            session,
            report: LoadReport::new(table, variant),
            started_at: Instant::now(),
        }
    }

    /// Exécute une instruction dans la transaction
    pub async fn execute(&mut self, sql: &str, params: &[SqlValue]) -> Result<()> {
        let rows = self.session.execute(sql, params).await?;
        self.report.statements += 1;
        self.report.rows_affected += rows;
        debug!(statement = self.report.statements, rows = rows, "Statement executed");
        Ok(())
    }

    /// Valide et commit la transaction
    pub async fn commit(self) -> Result<LoadReport> {
        self.session.commit().await?;

        let mut report = self.report;
        report.set_duration(self.started_at.elapsed());

        info!(
            table = %report.table,
            statements = report.statements,
            rows = report.rows_affected,
            "Table load committed"
        );
        Ok(report)
    }

    /// Annule la transaction (rollback)
    pub async fn rollback(self, reason: &str) -> LoadReport {
        error!(
            table = %self.report.table,
            reason = %reason,
            statements_attempted = self.report.statements,
            "Rolling back table load"
        );

        // Le rollback est explicite pour clarté (sinon implicite au drop)
        if let Err(e) = self.session.rollback().await {
            error!(error = %e, "Explicit rollback failed");
        }

        let mut report = self.report;
        report.status = LoadStatus::RolledBack;
        report.rows_affected = 0;
        report.error = Some(reason.to_string());
        report.set_duration(self.started_at.elapsed());
        report
    }
}
