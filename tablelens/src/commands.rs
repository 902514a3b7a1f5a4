//! Command implementations.
//!
//! Each command reports progress through `tracing` and writes its result
//! through [`crate::output`]. Engine failures are returned unchanged so the
//! process boundary prints the engine's message verbatim.

use std::path::Path;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result, anyhow, bail};
use tablelens_core::error::redact_database_url;
use tablelens_core::notify::{NotificationEvent, NotificationKind};
use tablelens_core::{
    AssessmentSession, AssessmentState, NotificationService, Profiler, ProfilerConfig,
    QualityAssessor, QueryEngine, RowSet, SchemaDriftPolicy, create_engine,
};
use tokio::sync::broadcast;
use tracing::{error, info};

use crate::cli::{AssessArgs, ProfileArgs};
use crate::output;

// Bounds the wait for the notification printer to drain after a session ends
const NOTIFICATION_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// Connects to the engine named by `database_url`.
pub async fn connect(database_url: Option<&str>) -> Result<Arc<dyn QueryEngine>> {
    let Some(database_url) = database_url else {
        bail!("Engine URL is required (use --database-url or DATABASE_URL)");
    };
    info!("Target: {}", redact_database_url(database_url));

    let engine = create_engine(database_url).await.map_err(|e| {
        error!("Failed to create engine: {}", e);
        e
    })?;
    info!("Created {} engine", engine.engine_kind());
    Ok(Arc::from(engine))
}

/// Loads rows from a JSON file holding an array of objects.
pub async fn load_rows(path: &Path) -> Result<RowSet> {
    let contents = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read {}", path.display()))?;
    let value: serde_json::Value = serde_json::from_str(&contents)
        .with_context(|| format!("Failed to parse {} as JSON", path.display()))?;
    if !value.is_array() {
        bail!("{} must contain a JSON array of row objects", path.display());
    }
    Ok(RowSet::from_json(&value))
}

/// Profiles a query result or a JSON file of rows.
pub async fn profile(args: &ProfileArgs, database_url: Option<&str>) -> Result<()> {
    let rows = match (&args.query, &args.input) {
        (Some(query), _) => {
            let engine = connect(database_url).await?;
            engine.execute(query).await?
        }
        (None, Some(path)) => load_rows(path).await?,
        (None, None) => bail!("Either --query or --input is required"),
    };
    info!("Profiling {} rows", rows.len());

    let policy = if args.reject_drift {
        SchemaDriftPolicy::Reject
    } else {
        SchemaDriftPolicy::Tolerate
    };
    let profiler = Profiler::new(ProfilerConfig::new().with_drift_policy(policy));
    let profiles = profiler.profile(&rows)?;

    let rendered = output::render_profiles(&profiles, args.output.format)?;
    output::emit(&rendered, args.output.output.as_deref()).await?;
    Ok(())
}

/// Assesses the requested tables.
///
/// A single table runs through an [`AssessmentSession`] whose notifications
/// are printed to stderr; several tables run as a bounded batch.
pub async fn assess(args: &AssessArgs, database_url: Option<&str>) -> Result<()> {
    let engine = connect(database_url).await?;
    let assessor = QualityAssessor::new(engine);

    match args.tables.as_slice() {
        [table] => assess_one(assessor, table, args).await,
        tables => assess_many(&assessor, tables, args).await,
    }
}

async fn assess_one(assessor: QualityAssessor, table: &str, args: &AssessArgs) -> Result<()> {
    let notifications = NotificationService::new();
    let printer = tokio::spawn(print_notifications(notifications.subscribe()));

    let session = AssessmentSession::new(assessor).with_notifier(Arc::new(notifications));
    let mut state = session.subscribe();
    session.request(table);

    let finished = state
        .wait_for(AssessmentState::is_finished)
        .await
        .map_err(|_| anyhow!("Assessment of '{table}' ended without a result"))?
        .clone();
    drop(state);
    drop(session);

    // The printer stops once the last notifier handle is gone
    if tokio::time::timeout(NOTIFICATION_DRAIN_TIMEOUT, printer)
        .await
        .is_err()
    {
        tracing::debug!("Notification printer did not finish in time");
    }

    match finished {
        AssessmentState::Succeeded { report, .. } => {
            let rendered = output::render_report(&report, args.output.format)?;
            output::emit(&rendered, args.output.output.as_deref()).await?;
            Ok(())
        }
        AssessmentState::Failed { message, .. } => Err(anyhow!(message)),
        AssessmentState::Idle | AssessmentState::Running { .. } => {
            bail!("Assessment of '{table}' ended without a result")
        }
    }
}

async fn assess_many(assessor: &QualityAssessor, tables: &[String], args: &AssessArgs) -> Result<()> {
    let assessments = assessor
        .assess_all(tables, usize::from(args.concurrency))
        .await;

    let rendered = output::render_assessments(&assessments, args.output.format)?;
    output::emit(&rendered, args.output.output.as_deref()).await?;

    let failed = assessments.iter().filter(|a| a.outcome.is_err()).count();
    if failed > 0 {
        bail!("{failed} of {} assessments failed", assessments.len());
    }
    info!("Assessed {} tables", assessments.len());
    Ok(())
}

async fn print_notifications(mut events: broadcast::Receiver<NotificationEvent>) {
    loop {
        match events.recv().await {
            Ok(NotificationEvent::Shown(notification)) => {
                eprintln!("{}", format_notification(notification.kind, &notification.message));
            }
            Ok(NotificationEvent::Dismissed { .. }) => {}
            Err(broadcast::error::RecvError::Lagged(skipped)) => {
                tracing::debug!("Skipped {} notifications", skipped);
            }
            Err(broadcast::error::RecvError::Closed) => break,
        }
    }
}

/// Formats a notification for the terminal.
pub fn format_notification(kind: NotificationKind, message: &str) -> String {
    format!("[{kind}] {message}")
}

/// Tests engine connection without touching any table.
pub async fn test_connection(database_url: Option<&str>) -> Result<()> {
    info!("Testing engine connection...");
    let engine = connect(database_url).await?;

    engine.test_connection().await.map_err(|e| {
        error!("Connection test failed: {}", e);
        e
    })?;

    info!("Connection test successful");
    println!("Connection to {} engine successful", engine.engine_kind());
    Ok(())
}

/// Lists supported engines and their connection string formats.
pub fn list_supported_engines() {
    println!("Supported Engines:");
    println!();

    #[cfg(feature = "sqlite")]
    {
        println!("SQLite:");
        println!("  Connection: sqlite:///path/to/database.db");
        println!("  Example:    sqlite:///home/user/warehouse.db");
        println!("  Example:    /path/to/database.sqlite");
        println!("  Example:    sqlite::memory:");
        println!();
    }

    #[cfg(feature = "http")]
    {
        println!("HTTP query service:");
        println!("  Connection: http://host:port");
        println!("  Example:    http://localhost:3001");
        println!("  Queries are POSTed as {{\"query\": ...}} to <base>/api/query");
        println!();
    }

    println!("Output Formats:");
    println!("  text - Human-readable (default)");
    println!("  json - Pretty-printed JSON (--format json)");
}
