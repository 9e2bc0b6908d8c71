// SPDX-License-Identifier: GPL-3.0-only

//! Integration tests for the capture view model

mod common;

use camera_capture::backends::camera::Authorization;
use camera_capture::{
    CaptureController, CaptureError, CaptureViewModel, Config, ControllerState, FlashMode,
    Message, ViewState,
};
use common::{FakeBackend, Script};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc::UnboundedReceiver;

fn view_model(backend: &FakeBackend) -> (CaptureViewModel, UnboundedReceiver<Message>) {
    let controller = CaptureController::new(Arc::new(backend.clone()), &Config::default());
    CaptureViewModel::new(controller)
}

/// Receive the next forwarded message and apply it
async fn pump(view_model: &mut CaptureViewModel, messages: &mut UnboundedReceiver<Message>) {
    let message = tokio::time::timeout(Duration::from_secs(5), messages.recv())
        .await
        .expect("message in time")
        .expect("queue open");
    view_model.update(message).await;
}

#[tokio::test]
async fn test_appear_starts_preview() {
    let backend = FakeBackend::new();
    let (mut view_model, mut messages) = view_model(&backend);
    assert_eq!(view_model.state(), ViewState::Loading);

    view_model.update(Message::Appear).await;
    assert_eq!(view_model.state(), ViewState::Previewing);
    assert!(view_model.alert().is_none());
    let configuration = view_model.configuration().expect("snapshot");
    assert_eq!(configuration.device.as_ref().map(|d| d.id.as_str()), Some("back-dual"));

    backend.push_frame();
    pump(&mut view_model, &mut messages).await;
    assert_eq!(view_model.preview().map(|f| f.sequence), Some(0));
}

#[tokio::test]
async fn test_capture_validate_and_retake() {
    let backend = FakeBackend::new();
    let (mut view_model, mut messages) = view_model(&backend);
    view_model.update(Message::Appear).await;

    view_model.update(Message::Capture).await;
    assert_eq!(view_model.state(), ViewState::Processing);

    pump(&mut view_model, &mut messages).await;
    assert_eq!(view_model.state(), ViewState::Validating);
    let photo = view_model.photo().expect("photo").clone();
    let last = view_model
        .controller()
        .last_photo()
        .await
        .expect("controller")
        .expect("last photo");
    assert_eq!(photo.id, last.id);

    view_model.update(Message::Retake).await;
    assert_eq!(view_model.state(), ViewState::Previewing);
    assert!(view_model.photo().is_none());

    backend.push_frame();
    pump(&mut view_model, &mut messages).await;
    assert!(view_model.preview().is_some());
}

#[tokio::test]
async fn test_accept_releases_camera() {
    let backend = FakeBackend::new();
    let (mut view_model, mut messages) = view_model(&backend);
    view_model.update(Message::Appear).await;
    view_model.update(Message::Capture).await;
    pump(&mut view_model, &mut messages).await;

    view_model.update(Message::Accept).await;
    assert_eq!(view_model.state(), ViewState::Accepted);
    assert!(view_model.photo().is_some());
    assert!(view_model.preview().is_none());
    assert_eq!(
        view_model.controller().state().await,
        Ok(ControllerState::Ended)
    );
    assert!(!backend.record(|r| r.running));
}

#[tokio::test]
async fn test_dropped_photo_allows_retry() {
    let backend = FakeBackend::with_script(Script {
        fail_photo: true,
        ..Script::default()
    });
    let (mut view_model, mut messages) = view_model(&backend);
    view_model.update(Message::Appear).await;

    view_model.update(Message::Capture).await;
    assert_eq!(view_model.state(), ViewState::Processing);

    backend.script(|s| s.fail_photo = false);
    view_model.update(Message::Capture).await;
    pump(&mut view_model, &mut messages).await;
    assert_eq!(view_model.state(), ViewState::Validating);
    assert_eq!(backend.record(|r| r.photo_requests.len()), 2);
}

#[tokio::test]
async fn test_unauthorized_shows_alert() {
    let backend = FakeBackend::with_script(Script {
        authorization: Authorization::Denied,
        ..Script::default()
    });
    let (mut view_model, _messages) = view_model(&backend);

    view_model.update(Message::Appear).await;
    assert_eq!(view_model.state(), ViewState::Unauthorized);
    assert_eq!(view_model.alert(), Some(CaptureError::CameraUnauthorized));

    view_model.update(Message::DismissAlert).await;
    assert!(view_model.alert().is_none());

    backend.script(|s| s.authorization = Authorization::Authorized);
    view_model.update(Message::Appear).await;
    assert_eq!(view_model.state(), ViewState::Previewing);
}

#[tokio::test]
async fn test_failed_device_selection_surfaces_alert() {
    let backend = FakeBackend::new();
    let (mut view_model, _messages) = view_model(&backend);
    view_model.update(Message::Appear).await;

    backend.script(|s| s.reject_input = true);
    view_model
        .update(Message::SelectDevice(backend.device("back-wide")))
        .await;
    assert_eq!(view_model.alert(), Some(CaptureError::CannotAddInput));
    assert!(view_model.configuration().expect("snapshot").device.is_none());
    assert_eq!(view_model.state(), ViewState::Loading);
    assert!(view_model.preview().is_none());

    backend.script(|s| s.reject_input = false);
    view_model.update(Message::Appear).await;
    assert_eq!(view_model.state(), ViewState::Previewing);
    assert!(view_model.configuration().expect("snapshot").device.is_some());
}

#[tokio::test]
async fn test_cycle_flash_follows_device_support() {
    let backend = FakeBackend::new();
    let (mut view_model, _messages) = view_model(&backend);
    view_model.update(Message::Appear).await;

    let flash = |vm: &CaptureViewModel| vm.configuration().expect("snapshot").flash;
    assert_eq!(flash(&view_model), FlashMode::Off);
    view_model.update(Message::CycleFlash).await;
    assert_eq!(flash(&view_model), FlashMode::On);
    view_model.update(Message::CycleFlash).await;
    assert_eq!(flash(&view_model), FlashMode::Auto);

    view_model.update(Message::SetFlash(FlashMode::Off)).await;
    view_model.update(Message::SwitchPosition).await;
    view_model.update(Message::CycleFlash).await;
    assert_eq!(flash(&view_model), FlashMode::Off);
}

#[tokio::test]
async fn test_zoom_snapshot_reflects_clamp() {
    let backend = FakeBackend::new();
    let (mut view_model, _messages) = view_model(&backend);
    view_model.update(Message::Appear).await;

    view_model.update(Message::SetZoom(80.0)).await;
    assert_eq!(view_model.configuration().expect("snapshot").zoom, 25.0);
    assert!(view_model.alert().is_none());
}

#[tokio::test]
async fn test_disappear_then_appear_resubscribes() {
    let backend = FakeBackend::new();
    let (mut view_model, mut messages) = view_model(&backend);
    view_model.update(Message::Appear).await;

    view_model.update(Message::Disappear).await;
    assert_eq!(
        view_model.controller().state().await,
        Ok(ControllerState::Ended)
    );

    view_model.update(Message::Appear).await;
    assert_eq!(view_model.state(), ViewState::Previewing);
    backend.push_frame();
    pump(&mut view_model, &mut messages).await;
    assert!(view_model.preview().is_some());
}
