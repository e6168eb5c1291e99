use keyward_license::{ErrorKind, FileStore, LicenseConfig};
use tempfile::TempDir;

#[tokio::test]
async fn missing_token_reads_as_none() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    assert_eq!(store.read_token().await.unwrap(), None);
}

#[tokio::test]
async fn token_write_read_delete() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path().join("nested").join("app"));

    store.write_token("aXY=:Y2lwaGVy").await.unwrap();
    assert_eq!(
        store.read_token().await.unwrap().as_deref(),
        Some("aXY=:Y2lwaGVy")
    );

    store.delete_token().await.unwrap();
    assert_eq!(store.read_token().await.unwrap(), None);
}

#[tokio::test]
async fn token_is_stored_as_raw_text() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    store.write_token("abc:def").await.unwrap();
    assert_eq!(std::fs::read_to_string(store.token_path()).unwrap(), "abc:def");
}

#[tokio::test]
async fn read_token_trims_whitespace() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    std::fs::write(store.token_path(), "abc:def\r\n").unwrap();
    assert_eq!(store.read_token().await.unwrap().as_deref(), Some("abc:def"));
}

#[tokio::test]
async fn delete_missing_token_is_ok() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    store.delete_token().await.unwrap();
    store.delete_token().await.unwrap();
}

#[tokio::test]
async fn trial_start_roundtrip_as_decimal() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    assert_eq!(store.read_trial_start().await.unwrap(), None);

    store.write_trial_start(1_767_225_600_000).await.unwrap();
    assert_eq!(
        std::fs::read_to_string(store.trial_path()).unwrap(),
        "1767225600000"
    );
    assert_eq!(
        store.read_trial_start().await.unwrap(),
        Some(1_767_225_600_000)
    );
}

#[tokio::test]
async fn corrupt_trial_start_is_storage_error() {
    let dir = TempDir::new().unwrap();
    let store = FileStore::new(dir.path());
    std::fs::write(store.trial_path(), "not a number").unwrap();
    let err = store.read_trial_start().await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[tokio::test]
async fn write_under_a_file_fails() {
    let dir = TempDir::new().unwrap();
    let blocker = dir.path().join("blocker");
    std::fs::write(&blocker, b"x").unwrap();
    let store = FileStore::new(blocker.join("data"));

    let err = store.write_token("abc:def").await.unwrap_err();
    assert_eq!(err.kind(), ErrorKind::Persistence);
}

#[test]
fn from_config_uses_configured_names() {
    let dir = TempDir::new().unwrap();
    let config = LicenseConfig {
        data_dir: Some(dir.path().to_path_buf()),
        license_file: "license.dat".to_string(),
        trial_file: "first-run".to_string(),
        ..LicenseConfig::default()
    };
    let store = FileStore::from_config(&config).unwrap();
    assert_eq!(store.dir(), dir.path());
    assert_eq!(store.token_path(), dir.path().join("license.dat"));
    assert_eq!(store.trial_path(), dir.path().join("first-run"));
}
