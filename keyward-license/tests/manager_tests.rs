mod common;

use common::{
    engine, engine_with, make_token, payload, test_config, DEVICE_ID, LICENSE_KEY,
    UNREACHABLE_URL,
};
use keyward_license::{
    ErrorKind, LicenseManager, LicenseUi, TrialConfig, MSG_DEACTIVATION_FAILED,
    MSG_DEACTIVATION_SUCCESSFUL,
};
use serde_json::json;
use std::sync::{Arc, Mutex};
use tempfile::TempDir;
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Records every UI interaction.
#[derive(Default)]
struct RecordingUi {
    errors: Mutex<Vec<String>>,
    prompts: Mutex<usize>,
}

impl RecordingUi {
    fn errors(&self) -> Vec<String> {
        self.errors.lock().unwrap().clone()
    }

    fn prompts(&self) -> usize {
        *self.prompts.lock().unwrap()
    }
}

impl LicenseUi for RecordingUi {
    fn notify_error(&self, message: &str) {
        self.errors.lock().unwrap().push(message.to_string());
    }

    fn prompt_activation(&self) {
        *self.prompts.lock().unwrap() += 1;
    }
}

fn manager(engine: keyward_license::ActivationEngine) -> (LicenseManager, Arc<RecordingUi>) {
    let ui = Arc::new(RecordingUi::default());
    (LicenseManager::new(engine, ui.clone()), ui)
}

#[tokio::test]
async fn fetch_status_broadcasts() {
    let dir = TempDir::new().unwrap();
    let (manager, _ui) = manager(engine(dir.path(), UNREACHABLE_URL));
    let mut rx = manager.subscribe_status();

    let status = manager.fetch_status();
    assert_eq!(rx.recv().await.unwrap(), status);
    assert!(!status.activated);
}

#[tokio::test]
async fn failed_activation_notifies_ui() {
    let dir = TempDir::new().unwrap();
    let (manager, ui) = manager(engine(dir.path(), UNREACHABLE_URL));
    let mut rx = manager.subscribe_status();

    let outcome = manager.activate(LICENSE_KEY).await;
    assert!(!outcome.success);
    assert_eq!(outcome.error, Some(ErrorKind::Transport));
    assert_eq!(ui.errors(), vec![outcome.message.clone()]);
    assert!(!rx.recv().await.unwrap().activated);
}

#[tokio::test]
async fn successful_activation_broadcasts_activated_status() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/activate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "success": true,
            "activation_code": make_token(&payload(DEVICE_ID)),
        })))
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let (manager, ui) = manager(engine(dir.path(), &server.uri()));
    let mut rx = manager.subscribe_status();

    let outcome = manager.activate(LICENSE_KEY).await;
    assert!(outcome.success);
    assert!(ui.errors().is_empty());
    let status = rx.recv().await.unwrap();
    assert!(status.activated);
    assert_eq!(status.edition.as_deref(), Some("PRO"));
}

#[tokio::test]
async fn deactivate_keeps_activation_when_server_unreachable() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path(), UNREACHABLE_URL);
    engine
        .local_activate(&make_token(&payload(DEVICE_ID)))
        .await
        .unwrap();
    let (manager, ui) = manager(engine);

    let outcome = manager.deactivate().await;
    assert!(!outcome.success);
    assert_eq!(outcome.message, MSG_DEACTIVATION_FAILED);
    assert_eq!(ui.errors(), vec![MSG_DEACTIVATION_FAILED.to_string()]);
    assert!(manager.status().activated);
    assert!(manager.engine().store().read_token().await.unwrap().is_some());
}

#[tokio::test]
async fn deactivate_removes_token_after_server_release() {
    let server = MockServer::start().await;
    Mock::given(method("POST"))
        .and(path("/deactivate"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({ "success": true })))
        .expect(1)
        .mount(&server)
        .await;

    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path(), &server.uri());
    engine
        .local_activate(&make_token(&payload(DEVICE_ID)))
        .await
        .unwrap();
    let (manager, ui) = manager(engine);
    let mut rx = manager.subscribe_status();

    let outcome = manager.deactivate().await;
    assert!(outcome.success);
    assert_eq!(outcome.message, MSG_DEACTIVATION_SUCCESSFUL);
    assert!(ui.errors().is_empty());
    assert!(!rx.recv().await.unwrap().activated);
    assert_eq!(manager.engine().store().read_token().await.unwrap(), None);
}

#[tokio::test]
async fn on_ready_prompts_during_trial() {
    let dir = TempDir::new().unwrap();
    let config = keyward_license::LicenseConfig {
        trial: TrialConfig {
            enabled: true,
            days: 14,
        },
        ..test_config(dir.path(), UNREACHABLE_URL)
    };
    let (manager, ui) = manager(engine_with(config));
    let mut rx = manager.subscribe_status();

    manager.on_ready().await;

    assert_eq!(ui.prompts(), 1);
    assert!(ui.errors().is_empty());
    let first = rx.recv().await.unwrap();
    let second = rx.recv().await.unwrap();
    assert!(!first.trial);
    assert!(second.trial);
    assert_eq!(second.trial_days_left, 14);
}

#[tokio::test]
async fn on_ready_does_not_prompt_when_activated() {
    let dir = TempDir::new().unwrap();
    let engine = engine(dir.path(), UNREACHABLE_URL);
    engine
        .local_activate(&make_token(&payload(DEVICE_ID)))
        .await
        .unwrap();
    let (manager, ui) = manager(engine);

    manager.on_ready().await;

    assert_eq!(ui.prompts(), 0);
    assert!(ui.errors().is_empty());
    assert!(manager.status().activated);
}

#[tokio::test]
async fn check_trial_mode_without_trial() {
    let dir = TempDir::new().unwrap();
    let (manager, ui) = manager(engine(dir.path(), UNREACHABLE_URL));
    assert!(!manager.check_trial_mode());
    assert_eq!(ui.prompts(), 0);
}

#[test]
fn device_id_is_exposed() {
    let dir = TempDir::new().unwrap();
    let (manager, _ui) = manager(engine(dir.path(), UNREACHABLE_URL));
    assert_eq!(manager.device_id().as_deref(), Some(DEVICE_ID));
}
