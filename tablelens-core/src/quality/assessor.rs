//! Quality assessor: issues the three engine queries and assembles a report.

use std::sync::Arc;
use std::time::Instant;

use futures::stream::{self, StreamExt};
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::Result;
use crate::engine::QueryEngine;

use super::models::QualityReport;
use super::scoring::assemble_report;
use super::summary::summary_rows;

/// Quality assessor bound to one query engine.
///
/// # Example
///
/// ```rust,no_run
/// use std::sync::Arc;
/// use tablelens_core::engine::create_engine;
/// use tablelens_core::quality::QualityAssessor;
///
/// # async fn run() -> tablelens_core::Result<()> {
/// let engine = create_engine("sqlite:///tmp/data.db").await?;
/// let assessor = QualityAssessor::new(Arc::from(engine));
/// let report = assessor.assess("orders").await?;
/// println!("Quality score: {}", report.score);
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct QualityAssessor {
    engine: Arc<dyn QueryEngine>,
}

impl std::fmt::Debug for QualityAssessor {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("QualityAssessor")
            .field("engine", &self.engine.engine_kind())
            .finish()
    }
}

/// Outcome of assessing one table in a batch.
#[derive(Debug)]
pub struct TableAssessment {
    /// Table that was assessed
    pub table: String,
    /// Report, or the engine error that aborted the assessment
    pub outcome: Result<QualityReport>,
}

/// Serializable view of a batch outcome.
#[derive(Debug, Serialize)]
#[serde(tag = "status", rename_all = "lowercase")]
pub enum AssessmentOutcome<'a> {
    /// Assessment produced a report
    Succeeded {
        /// The report
        report: &'a QualityReport,
    },
    /// Assessment failed
    Failed {
        /// Table that failed
        table: &'a str,
        /// Upstream error text
        error: String,
    },
}

impl TableAssessment {
    /// Borrows the outcome in serializable form.
    pub fn as_outcome(&self) -> AssessmentOutcome<'_> {
        match &self.outcome {
            Ok(report) => AssessmentOutcome::Succeeded { report },
            Err(e) => AssessmentOutcome::Failed {
                table: &self.table,
                error: e.to_string(),
            },
        }
    }
}

impl QualityAssessor {
    /// Creates an assessor over the given engine.
    pub fn new(engine: Arc<dyn QueryEngine>) -> Self {
        Self { engine }
    }

    /// Returns the underlying engine.
    pub fn engine(&self) -> &Arc<dyn QueryEngine> {
        &self.engine
    }

    /// Assesses one table.
    ///
    /// The summary, row count, and duplicate count queries run concurrently
    /// and all three must succeed; the first failure aborts the assessment
    /// with the engine's message unchanged.
    pub async fn assess(&self, table: &str) -> Result<QualityReport> {
        let start = Instant::now();
        debug!("Assessing table '{}'", table);

        let (summary, total_rows, duplicate_rows) = tokio::try_join!(
            self.engine.summarize(table),
            self.engine.count_rows(table),
            self.engine.count_duplicate_rows(table),
        )?;

        let summaries = summary_rows(&summary);
        let report = assemble_report(table, &summaries, total_rows, duplicate_rows);

        info!(
            "Assessed '{}': {} columns, {} rows, score {} in {}ms",
            table,
            report.column_count,
            report.total_rows,
            report.score,
            start.elapsed().as_millis()
        );
        Ok(report)
    }

    /// Assesses several tables with bounded concurrency.
    ///
    /// Returns one outcome per table, in input order. A failing table never
    /// aborts the others.
    pub async fn assess_all<S: AsRef<str>>(
        &self,
        tables: &[S],
        max_concurrency: usize,
    ) -> Vec<TableAssessment> {
        let futures = tables.iter().enumerate().map(|(index, table)| {
            let table = table.as_ref().to_string();
            async move {
                let outcome = self.assess(&table).await;
                if let Err(e) = &outcome {
                    warn!("Failed to assess '{}': {}", table, e);
                }
                (index, TableAssessment { table, outcome })
            }
        });

        let mut results: Vec<(usize, TableAssessment)> = stream::iter(futures)
            .buffer_unordered(max_concurrency.max(1))
            .collect()
            .await;
        results.sort_by_key(|(index, _)| *index);
        results.into_iter().map(|(_, assessment)| assessment).collect()
    }
}
