//! Assessment session tests with a scripted in-process engine.
//!
//! Each table's queries block on a gate until the test releases it, so the
//! tests decide which of two overlapping assessments resolves first.

use std::collections::{HashMap, HashSet};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use serde_json::json;
use tablelens_core::{
    EngineKind, QueryEngine, Result, RowSet, TableLensError,
    notify::{NotificationEvent, NotificationKind, NotificationService},
    quality::{AssessmentSession, AssessmentState, QualityAssessor},
};
use tokio::sync::Semaphore;

struct ScriptedEngine {
    gates: HashMap<String, Arc<Semaphore>>,
    failing: HashSet<String>,
}

impl ScriptedEngine {
    fn new(tables: &[&str], failing: &[&str]) -> Self {
        Self {
            gates: tables
                .iter()
                .map(|t| (t.to_string(), Arc::new(Semaphore::new(0))))
                .collect(),
            failing: failing.iter().map(|t| t.to_string()).collect(),
        }
    }

    fn release(&self, table: &str) {
        self.gates[table].add_permits(1);
    }
}

#[async_trait]
impl QueryEngine for ScriptedEngine {
    async fn execute(&self, query: &str) -> Result<RowSet> {
        let table = query.split('"').nth(1).unwrap_or_default().to_string();
        if let Some(gate) = self.gates.get(&table) {
            let _permit = gate.acquire().await.unwrap();
        }

        if self.failing.contains(&table) {
            return Err(TableLensError::query_failed(format!(
                "Catalog Error: Table with name {} does not exist!",
                table
            )));
        }

        let value = if query.starts_with("SUMMARIZE") {
            json!([{"column_name": "id", "column_type": "BIGINT", "approx_unique": 10, "null_percentage": 0}])
        } else if query.contains("total_rows") {
            json!([{"total_rows": 10}])
        } else {
            json!([{"dup_count": 0}])
        };
        Ok(RowSet::from_json(&value))
    }

    fn engine_kind(&self) -> EngineKind {
        EngineKind::Http
    }
}

fn session_over(engine: &Arc<ScriptedEngine>) -> AssessmentSession {
    AssessmentSession::new(QualityAssessor::new(engine.clone()))
}

fn running(table: &str) -> AssessmentState {
    AssessmentState::Running {
        table: table.to_string(),
    }
}

async fn settle() {
    tokio::time::sleep(Duration::from_millis(50)).await;
}

#[tokio::test(start_paused = true)]
async fn test_session_starts_idle_and_succeeds() {
    let engine = Arc::new(ScriptedEngine::new(&["a"], &[]));
    let session = session_over(&engine);
    assert_eq!(session.state(), AssessmentState::Idle);

    let mut states = session.subscribe();
    session.request("a");
    assert_eq!(session.state(), running("a"));

    engine.release("a");
    let finished = states.wait_for(AssessmentState::is_finished).await.unwrap().clone();
    match finished {
        AssessmentState::Succeeded { report, .. } => {
            assert_eq!(report.table_name, "a");
            assert_eq!(report.score, 100);
        }
        other => panic!("expected success, got {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_later_request_wins_when_it_resolves_first() {
    let engine = Arc::new(ScriptedEngine::new(&["a", "b"], &[]));
    let session = session_over(&engine);
    let mut states = session.subscribe();

    session.request("a");
    session.request("b");
    assert_eq!(session.state(), running("b"));

    engine.release("b");
    let finished = states.wait_for(AssessmentState::is_finished).await.unwrap().clone();
    assert_eq!(finished.table(), Some("b"));

    engine.release("a");
    settle().await;
    assert_eq!(session.state().table(), Some("b"));
    assert!(matches!(session.state(), AssessmentState::Succeeded { .. }));
}

#[tokio::test(start_paused = true)]
async fn test_later_request_wins_when_earlier_resolves_first() {
    let engine = Arc::new(ScriptedEngine::new(&["a", "b"], &[]));
    let session = session_over(&engine);
    let mut states = session.subscribe();

    session.request("a");
    session.request("b");

    engine.release("a");
    settle().await;
    assert_eq!(session.state(), running("b"));

    engine.release("b");
    let finished = states.wait_for(AssessmentState::is_finished).await.unwrap().clone();
    assert_eq!(finished.table(), Some("b"));
}

#[tokio::test(start_paused = true)]
async fn test_superseded_failure_is_never_surfaced() {
    let engine = Arc::new(ScriptedEngine::new(&["bad", "good"], &["bad"]));
    let notifier = Arc::new(NotificationService::new());
    let mut notifications = notifier.subscribe();
    let session = session_over(&engine).with_notifier(notifier.clone());

    session.request("bad");
    session.request("good");
    engine.release("bad");
    settle().await;
    engine.release("good");
    settle().await;

    assert!(matches!(session.state(), AssessmentState::Succeeded { .. }));
    assert!(notifications.try_recv().is_err());
}

#[tokio::test(start_paused = true)]
async fn test_failure_is_verbatim_and_notified() {
    let engine = Arc::new(ScriptedEngine::new(&["ghost"], &["ghost"]));
    let notifier = Arc::new(NotificationService::new());
    let mut notifications = notifier.subscribe();
    let session = session_over(&engine).with_notifier(notifier.clone());
    let mut states = session.subscribe();

    session.request("ghost");
    engine.release("ghost");
    let finished = states.wait_for(AssessmentState::is_finished).await.unwrap().clone();

    match finished {
        AssessmentState::Failed { table, message, .. } => {
            assert_eq!(table, "ghost");
            assert_eq!(message, "Catalog Error: Table with name ghost does not exist!");
        }
        other => panic!("expected failure, got {:?}", other),
    }

    match notifications.recv().await.unwrap() {
        NotificationEvent::Shown(n) => {
            assert_eq!(n.kind, NotificationKind::Error);
            assert_eq!(n.message, "Catalog Error: Table with name ghost does not exist!");
        }
        other => panic!("unexpected event {:?}", other),
    }
}

#[tokio::test(start_paused = true)]
async fn test_reset_discards_in_flight_work() {
    let engine = Arc::new(ScriptedEngine::new(&["a"], &[]));
    let session = session_over(&engine);

    session.request("a");
    session.reset();
    assert_eq!(session.state(), AssessmentState::Idle);

    engine.release("a");
    settle().await;
    assert_eq!(session.state(), AssessmentState::Idle);
}

#[tokio::test(start_paused = true)]
async fn test_session_can_run_again_after_finishing() {
    let engine = Arc::new(ScriptedEngine::new(&[], &[]));
    let session = session_over(&engine);
    let mut states = session.subscribe();

    session.request("x");
    states.wait_for(AssessmentState::is_finished).await.unwrap();
    session.reset();
    assert_eq!(session.state(), AssessmentState::Idle);

    session.request("y");
    let finished = states.wait_for(|s| s.is_finished() && s.table() == Some("y")).await.unwrap().clone();
    assert!(matches!(finished, AssessmentState::Succeeded { .. }));
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_requests_publish_the_current_table() {
    let tables = ["t0", "t1", "t2", "t3", "t4", "t5", "t6", "t7"];
    let engine = Arc::new(ScriptedEngine::new(&tables, &[]));
    let session = session_over(&engine);
    let runtime = tokio::runtime::Handle::current();

    std::thread::scope(|scope| {
        for table in tables {
            let session = &session;
            let runtime = &runtime;
            scope.spawn(move || {
                let _guard = runtime.enter();
                session.request(table);
            });
        }
    });

    // Whichever table the state names must be the one still in flight
    let winner = session.state().table().unwrap().to_string();
    for table in tables.iter().filter(|t| **t != winner) {
        engine.release(table);
    }
    tokio::time::sleep(Duration::from_millis(100)).await;
    assert_eq!(session.state(), running(&winner));

    let mut states = session.subscribe();
    engine.release(&winner);
    let finished = tokio::time::timeout(
        Duration::from_secs(5),
        states.wait_for(AssessmentState::is_finished),
    )
    .await
    .unwrap()
    .unwrap()
    .clone();
    assert!(matches!(finished, AssessmentState::Succeeded { .. }));
    assert_eq!(finished.table(), Some(winner.as_str()));
}
