//! End-to-end label acquisition through the orchestrator with a scripted
//! carrier.

use std::io::{Cursor, Read};
use std::sync::Arc;

use labelbridge_core::account::{AccountKind, AccountStore, NewAccount, SqliteAccountStore};
use labelbridge_core::carrier::{PrintJobStatus, TokenCache};
use labelbridge_core::config::WorkflowConfig;
use labelbridge_core::orchestrator::{LabelOrchestrator, OrchestratorError};
use labelbridge_core::testing::MockCarrierClient;
use labelbridge_core::workflow::LabelOutput;

const TENANT: i64 = 1;

fn seeded_store() -> Arc<SqliteAccountStore> {
    let store = SqliteAccountStore::in_memory().unwrap();
    store
        .create(NewAccount {
            tenant_id: TENANT,
            kind: AccountKind::Carrier,
            name: "main carrier".to_string(),
            client_id: "client".to_string(),
            client_secret: "secret".to_string(),
            warehouse: None,
        })
        .unwrap();
    Arc::new(store)
}

fn orchestrator(client: Arc<MockCarrierClient>, max_batch_size: usize) -> LabelOrchestrator {
    LabelOrchestrator::new(
        seeded_store(),
        client,
        Arc::new(TokenCache::new()),
        WorkflowConfig {
            max_batch_size,
            poll_attempts: 15,
            poll_interval_ms: 0,
            ..WorkflowConfig::default()
        },
    )
}

fn tracking(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("1008{:04}", i)).collect()
}

#[tokio::test]
async fn slow_job_succeeds_on_final_poll_attempt() {
    let client = Arc::new(MockCarrierClient::new());
    let mut polls: Vec<_> = (0..14).map(|_| Ok(Some(PrintJobStatus::Pending))).collect();
    polls.push(Ok(Some(PrintJobStatus::Ready)));
    client.script_job("job-1", polls).await;
    client.set_document("job-1", b"%PDF-1.4 slow".to_vec()).await;

    let output = orchestrator(client.clone(), 100)
        .fetch_labels(TENANT, tracking(3))
        .await
        .unwrap();

    match output {
        LabelOutput::Single(doc) => assert_eq!(doc.content, b"%PDF-1.4 slow"),
        other => panic!("expected Single, got {:?}", other),
    }
    assert_eq!(client.poll_calls().await, 15);
}

#[tokio::test]
async fn job_never_ready_reports_poll_timeout() {
    let client = Arc::new(MockCarrierClient::new());
    client
        .script_job(
            "job-1",
            (0..15).map(|_| Ok(Some(PrintJobStatus::Pending))).collect(),
        )
        .await;

    let output = orchestrator(client.clone(), 100)
        .fetch_labels(TENANT, tracking(1))
        .await
        .unwrap();

    match output {
        LabelOutput::Failed { failures } => {
            assert_eq!(failures.len(), 1);
            assert!(failures[0].error.contains("15 poll attempts"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(client.poll_calls().await, 15);
    assert_eq!(client.download_calls().await, 0);
}

#[tokio::test]
async fn invalid_job_fails_without_consuming_remaining_attempts() {
    let client = Arc::new(MockCarrierClient::new());
    client
        .script_job(
            "job-1",
            vec![
                Ok(Some(PrintJobStatus::Pending)),
                Ok(Some(PrintJobStatus::Pending)),
                Ok(Some(PrintJobStatus::Invalid)),
            ],
        )
        .await;

    let output = orchestrator(client.clone(), 100)
        .fetch_labels(TENANT, tracking(1))
        .await
        .unwrap();

    match output {
        LabelOutput::Failed { failures } => {
            assert!(failures[0].error.contains("INVALID"));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(client.poll_calls().await, 3);
}

#[tokio::test]
async fn multiple_batches_produce_archive_with_one_entry_each() {
    let client = Arc::new(MockCarrierClient::new());
    for i in 1..=3 {
        let job = format!("job-{}", i);
        client
            .script_job(&job, vec![Ok(Some(PrintJobStatus::Ready))])
            .await;
        client
            .set_document(&job, format!("%PDF-1.4 batch {}", i).into_bytes())
            .await;
    }

    let output = orchestrator(client.clone(), 2)
        .fetch_labels(TENANT, tracking(6))
        .await
        .unwrap();

    let LabelOutput::Archive { document, failures } = output else {
        panic!("expected Archive");
    };
    assert!(failures.is_empty());
    assert!(document.filename.ends_with(".zip"));

    let mut archive = zip::ZipArchive::new(Cursor::new(document.content)).unwrap();
    assert_eq!(archive.len(), 3);
    let mut first = String::new();
    archive.by_index(0).unwrap().read_to_string(&mut first).unwrap();
    assert_eq!(first, "%PDF-1.4 batch 1");
}

#[tokio::test]
async fn partial_failure_archives_survivors_and_reports_losses() {
    let client = Arc::new(MockCarrierClient::new());
    client
        .script_job("job-1", vec![Ok(Some(PrintJobStatus::Ready))])
        .await;
    client.set_document("job-1", b"%PDF-1.4 ok".to_vec()).await;
    client
        .script_job("job-2", vec![Ok(Some(PrintJobStatus::Removed))])
        .await;
    client
        .script_job("job-3", vec![Ok(Some(PrintJobStatus::Ready))])
        .await;
    client.set_document("job-3", b"%PDF-1.4 ok2".to_vec()).await;

    let output = orchestrator(client.clone(), 1)
        .fetch_labels(TENANT, tracking(3))
        .await
        .unwrap();

    let LabelOutput::Archive { document, failures } = output else {
        panic!("expected Archive");
    };
    assert_eq!(failures.len(), 1);
    assert!(failures[0].error.contains("REMOVED"));

    let archive = zip::ZipArchive::new(Cursor::new(document.content)).unwrap();
    assert_eq!(archive.len(), 2);
}

#[tokio::test]
async fn one_error_entry_per_failed_batch() {
    let client = Arc::new(MockCarrierClient::new());
    for i in 1..=4 {
        client
            .script_job(
                &format!("job-{}", i),
                vec![Ok(Some(PrintJobStatus::Invalid))],
            )
            .await;
    }

    let output = orchestrator(client.clone(), 1)
        .fetch_labels(TENANT, tracking(4))
        .await
        .unwrap();

    match output {
        LabelOutput::Failed { failures } => assert_eq!(failures.len(), 4),
        other => panic!("expected Failed, got {:?}", other),
    }
}

#[tokio::test]
async fn auth_failure_is_reported_per_batch_not_as_request_abort() {
    let client = Arc::new(MockCarrierClient::new());
    client
        .fail_token(labelbridge_core::carrier::CarrierError::Auth {
            account: "main carrier".to_string(),
            reason: "bad credentials".to_string(),
        })
        .await;

    let output = orchestrator(client.clone(), 1)
        .fetch_labels(TENANT, tracking(2))
        .await
        .unwrap();

    match output {
        LabelOutput::Failed { failures } => {
            assert_eq!(failures.len(), 2);
            assert!(failures.iter().all(|f| f.error.contains("bad credentials")));
        }
        other => panic!("expected Failed, got {:?}", other),
    }
    assert_eq!(client.submit_calls().await, 0);
}

#[tokio::test]
async fn token_is_fetched_once_per_request() {
    let client = Arc::new(MockCarrierClient::new());
    for i in 1..=5 {
        let job = format!("job-{}", i);
        client
            .script_job(&job, vec![Ok(Some(PrintJobStatus::Ready))])
            .await;
        client.set_document(&job, b"%PDF-1.4".to_vec()).await;
    }

    orchestrator(client.clone(), 1)
        .fetch_labels(TENANT, tracking(5))
        .await
        .unwrap();

    assert_eq!(client.token_calls().await, 1);
    assert_eq!(client.submit_calls().await, 5);
}

#[tokio::test]
async fn whitespace_entries_are_filtered_before_chunking() {
    let client = Arc::new(MockCarrierClient::new());
    client
        .script_job("job-1", vec![Ok(Some(PrintJobStatus::Ready))])
        .await;
    client.set_document("job-1", b"%PDF-1.4".to_vec()).await;

    let orch = orchestrator(client.clone(), 1);
    let output = orch
        .fetch_labels(
            TENANT,
            vec!["  10080001  ".to_string(), "".to_string(), "  ".to_string()],
        )
        .await
        .unwrap();

    match output {
        LabelOutput::Single(doc) => assert_eq!(doc.filename, "label_10080001.pdf"),
        other => panic!("expected Single, got {:?}", other),
    }
    assert_eq!(client.submit_calls().await, 1);
}

#[tokio::test]
async fn tenant_without_carrier_account_gets_config_error() {
    let store = Arc::new(SqliteAccountStore::in_memory().unwrap());
    let client = Arc::new(MockCarrierClient::new());
    let orch = LabelOrchestrator::new(
        store,
        client,
        Arc::new(TokenCache::new()),
        WorkflowConfig {
            poll_interval_ms: 0,
            ..WorkflowConfig::default()
        },
    );

    let result = orch.fetch_labels(TENANT, tracking(1)).await;
    assert!(matches!(result, Err(OrchestratorError::NoCarrierAccount)));
}
