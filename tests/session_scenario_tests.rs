//! Upload session scenarios against mock peers
//!
//! Every test runs a real session runner: agent discovery, the socket.io
//! channel, compile submission and polling, and the upload POST all go
//! over localhost to warp mocks.


use sketchbridge::config::BoardCatalog;
use sketchbridge::models::{SessionSnapshot, SessionStatus};
use sketchbridge::services::{SessionHandle, SessionRunner};
use std::time::Duration;
use test_fixtures::{
    BLINK_SKETCH, CompileOutcome, FlashReply, MockAgent, MockCompileServer, fast_settings,
    start_not_an_agent,
};

const WAIT: Duration = Duration::from_secs(5);

fn start_session(compile: &MockCompileServer, agent_port: u16) -> SessionHandle {
    let board = BoardCatalog::builtin()
        .get_board("arduino:avr:uno")
        .expect("Uno is in the builtin catalog")
        .clone();
    SessionRunner::new(fast_settings(&compile.url(), agent_port), board)
        .expect("Session should build")
        .with_source(BLINK_SKETCH)
        .spawn()
}

async fn wait_ready(handle: &SessionHandle) -> SessionSnapshot {
    handle
        .wait_for(WAIT, |s| s.agent.is_some() && s.selected_port.is_some())
        .await
        .expect("Agent and port list should arrive")
}

async fn wait_status(handle: &SessionHandle, status: SessionStatus) -> SessionSnapshot {
    handle
        .wait_for(WAIT, |s| s.status == status)
        .await
        .unwrap_or_else(|| panic!("Session never reached {:?}", status))
}

#[tokio::test]
async fn test_successful_upload() {
    let compile = MockCompileServer::start(2, CompileOutcome::Success(":00000001FF".to_string())).await;
    let agent = MockAgent::start(&["COM3"], FlashReply::Ok).await;
    let handle = start_session(&compile, agent.port());

    let ready = wait_ready(&handle).await;
    assert_eq!(ready.status, SessionStatus::Ready);
    assert_eq!(ready.selected_port.as_ref().unwrap().value, "COM3");

    handle.request_upload();
    let done = wait_status(&handle, SessionStatus::Done).await;
    assert!(!done.controls_disabled);
    assert!(done.annotations.is_empty());

    let submissions = compile.submissions();
    assert_eq!(submissions.len(), 1);
    assert_eq!(submissions[0]["board"], "arduino:avr:uno");
    assert_eq!(submissions[0]["script"], BLINK_SKETCH);
    assert!(compile.polls() >= 3);

    let uploads = agent.uploads();
    assert_eq!(uploads.len(), 1);
    assert_eq!(uploads[0]["port"], "COM3");
    assert_eq!(uploads[0]["hex"], ":00000001FF");
    assert_eq!(uploads[0]["filename"], "sketch.hex");
    assert_eq!(uploads[0]["extra"]["params_verbose"], "-v");

    // The cancelled timeout must not fire later
    tokio::time::sleep(Duration::from_millis(1000)).await;
    assert_eq!(handle.snapshot().status, SessionStatus::Done);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_compile_error_annotates_source() {
    let compile = MockCompileServer::start(
        0,
        CompileOutcome::Error {
            line_number: 3,
            error: "expected ';' before '}' token".to_string(),
        },
    )
    .await;
    let agent = MockAgent::start(&["COM3"], FlashReply::Ok).await;
    let handle = start_session(&compile, agent.port());
    wait_ready(&handle).await;

    handle.request_upload();
    let failed = wait_status(&handle, SessionStatus::CompileError).await;
    assert!(!failed.controls_disabled);
    assert_eq!(failed.annotations.len(), 1);
    assert_eq!(failed.annotations[0].row, 2);
    assert_eq!(failed.annotations[0].kind, "error");
    assert_eq!(failed.markers[0].start_row, 2);
    assert_eq!(failed.markers[0].end_row, 3);
    assert!(agent.uploads().is_empty());

    // Editing clears the diagnostics but keeps the status
    handle.edit_source("void setup() {}\nvoid loop() {}\n");
    let edited = handle
        .wait_for(WAIT, |s| s.annotations.is_empty())
        .await
        .expect("Annotations should clear");
    assert_eq!(edited.status, SessionStatus::CompileError);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_agent_reports_flash_failure() {
    let compile = MockCompileServer::start(0, CompileOutcome::Success(":00".to_string())).await;
    let agent = MockAgent::start(&["COM3"], FlashReply::Fail).await;
    let handle = start_session(&compile, agent.port());
    wait_ready(&handle).await;

    handle.request_upload();
    let failed = wait_status(&handle, SessionStatus::UploadError).await;
    assert!(!failed.controls_disabled);
    assert_eq!(agent.uploads().len(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_silent_agent_times_out() {
    let compile = MockCompileServer::start(0, CompileOutcome::Success(":00".to_string())).await;
    let agent = MockAgent::start(&["COM3"], FlashReply::Silent).await;
    let handle = start_session(&compile, agent.port());
    wait_ready(&handle).await;

    handle.request_upload();
    wait_status(&handle, SessionStatus::Uploading).await;
    let failed = wait_status(&handle, SessionStatus::UploadError).await;
    assert!(!failed.controls_disabled);

    // A late success report must not overwrite the timeout
    agent.push_message(&serde_json::json!({"Flash": "Ok"}));
    tokio::time::sleep(Duration::from_millis(300)).await;
    assert_eq!(handle.snapshot().status, SessionStatus::UploadError);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_no_agent_found() {
    let compile = MockCompileServer::start(0, CompileOutcome::Success(":00".to_string())).await;
    let nothing = start_not_an_agent().await;
    let handle = start_session(&compile, nothing.port());

    tokio::time::sleep(Duration::from_millis(500)).await;
    let snapshot = handle.snapshot();
    assert!(snapshot.agent.is_none());
    assert!(snapshot.ports.is_empty());
    assert_eq!(snapshot.status, SessionStatus::Ready);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_upload_requests_ignored_while_busy() {
    let compile = MockCompileServer::start(5, CompileOutcome::Success(":00".to_string())).await;
    let agent = MockAgent::start(&["COM3"], FlashReply::Ok).await;
    let handle = start_session(&compile, agent.port());
    wait_ready(&handle).await;

    handle.request_upload();
    handle.request_upload();
    handle.request_upload();

    let done = wait_status(&handle, SessionStatus::Done).await;
    assert_eq!(done.attempt, 1);
    assert_eq!(compile.submissions().len(), 1);
    assert_eq!(agent.uploads().len(), 1);

    handle.shutdown().await;
}

#[tokio::test]
async fn test_unplugged_port_flagged_disconnected() {
    let compile = MockCompileServer::start(0, CompileOutcome::Success(":00".to_string())).await;
    let agent = MockAgent::start(&["COM3", "COM4"], FlashReply::Ok).await;
    let handle = start_session(&compile, agent.port());
    wait_ready(&handle).await;

    handle.select_port("COM4");
    handle
        .wait_for(WAIT, |s| {
            s.selected_port.as_ref().is_some_and(|p| p.value == "COM4")
        })
        .await
        .expect("COM4 should be selected");

    agent.set_ports(&["COM3"]);
    let flagged = handle
        .wait_for(WAIT, |s| {
            s.selected_port.as_ref().is_some_and(|p| p.disconnected)
        })
        .await
        .expect("Selection should be flagged disconnected");
    let selected = flagged.selected_port.unwrap();
    assert_eq!(selected.value, "COM4");
    assert!(flagged.ports.iter().any(|p| p.value == "COM4" && p.disconnected));
    assert!(flagged.ports.iter().any(|p| p.value == "COM3" && !p.disconnected));

    // Plugging it back in clears the flag
    agent.set_ports(&["COM3", "COM4"]);
    handle
        .wait_for(WAIT, |s| {
            s.selected_port
                .as_ref()
                .is_some_and(|p| p.value == "COM4" && !p.disconnected)
        })
        .await
        .expect("Selection should recover");

    handle.shutdown().await;
}
