//! JSON file store behaviour, including persistence across reopen.

use chrono::{Duration, Utc};
use std::path::PathBuf;
use std::sync::Arc;
use tempfile::TempDir;

use privacy_confirm::privacy::{
    ConfirmInput, ConfirmationWorkflow, HashingConfig, JsonFileRequestStore, PrivacyRequest,
    RequestFilter, RequestIntake, RequestStatus, RequestStore, RequestType, StoreError, SystemClock,
    TokenHasher,
};

fn temp_file() -> (TempDir, PathBuf) {
    let dir = TempDir::new().unwrap();
    let path = dir.path().join("store").join("requests.json");
    (dir, path)
}

fn hasher() -> TokenHasher {
    TokenHasher::new(HashingConfig {
        memory_kib: 1024,
        iterations: 1,
        parallelism: 1,
    })
    .unwrap()
}

fn pending(email: &str) -> PrivacyRequest {
    PrivacyRequest {
        id: None,
        email: email.to_string(),
        request_type: RequestType::Export,
        status: RequestStatus::Pending,
        requested_at: Utc::now() - Duration::minutes(5),
        confirm_token: Some("$argon2id$v=19$m=1024,t=1,p=1$c2FsdA$aGFzaA".to_string()),
        confirm_token_created_at: Some(Utc::now() - Duration::minutes(5)),
    }
}

#[tokio::test]
async fn missing_file_reads_as_empty() {
    let (_dir, path) = temp_file();
    let store = JsonFileRequestStore::new(&path);

    assert!(store.load(&RequestFilter::default()).await.unwrap().is_none());
    assert!(store.list(&RequestFilter::default()).await.unwrap().is_empty());
    assert!(!path.exists());
}

#[tokio::test]
async fn rows_survive_reopen() {
    let (_dir, path) = temp_file();

    let first_id = {
        let store = JsonFileRequestStore::new(&path);
        store.store(&pending("a@example.com")).await.unwrap().id
    };

    let reopened = JsonFileRequestStore::new(&path);
    let loaded = reopened
        .load(&RequestFilter::pending_for("a@example.com"))
        .await
        .unwrap()
        .unwrap();
    assert_eq!(loaded.id, first_id);

    // Ids keep increasing after reopen
    let second = reopened.store(&pending("b@example.com")).await.unwrap();
    assert!(second.id > first_id);
}

#[tokio::test]
async fn update_of_unknown_row_fails() {
    let (_dir, path) = temp_file();
    let store = JsonFileRequestStore::new(&path);
    let mut row = pending("a@example.com");
    row.id = Some(3);

    assert!(matches!(
        store.store(&row).await,
        Err(StoreError::NotFound { id: 3 })
    ));}

#[tokio::test]
async fn unsupported_version_is_reported_as_corrupt() {
    let (_dir, path) = temp_file();
    std::fs::create_dir_all(path.parent().unwrap()).unwrap();
    std::fs::write(&path, r#"{"version": 99, "next_id": 0, "requests": []}"#).unwrap();

    let store = JsonFileRequestStore::new(&path);
    assert!(matches!(
        store.list(&RequestFilter::default()).await,
        Err(StoreError::Corrupt { .. })
    ));}

#[tokio::test]
async fn file_backed_request_can_be_filed_and_confirmed() {
    let (_dir, path) = temp_file();
    let store: Arc<dyn RequestStore> = Arc::new(JsonFileRequestStore::new(&path));
    let intake = RequestIntake::new(store.clone(), Arc::new(SystemClock), hasher());
    let workflow = ConfirmationWorkflow::new(store.clone(), Arc::new(SystemClock), hasher());

    let issued = intake
        .submit_request("subject@example.org", RequestType::Remove)
        .await
        .unwrap();

    let contents = std::fs::read_to_string(&path).unwrap();
    assert!(!contents.contains(&issued.token));

    workflow
        .confirm_request(ConfirmInput::new("subject@example.org", issued.token))
        .await
        .unwrap();

    let reopened = JsonFileRequestStore::new(&path);
    let rows = reopened
        .list(&RequestFilter::by_email("subject@example.org"))
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].status, RequestStatus::Confirmed);
}
