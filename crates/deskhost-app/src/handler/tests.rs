use super::*;
use crate::config::Settings;
use crate::state::{AppPhase, AppState, ShutdownState};
use deskhost_core::{BackendEvent, RuntimeMode, ShutdownOutcome};

fn running_state() -> AppState {
    let mut state = AppState::new(RuntimeMode::Development, Settings::default());
    update(
        &mut state,
        Message::BackendStarted {
            pid: Some(4242),
            command: "python python-yt-dl/main.py".to_string(),
        },
    );
    state
}

/// Process a message and every follow-up, collecting the actions
fn drive(state: &mut AppState, message: Message) -> Vec<UpdateAction> {
    let mut actions = Vec::new();
    let mut next = Some(message);
    while let Some(msg) = next {
        let result = update(state, msg);
        actions.extend(result.action);
        next = result.message;
    }
    actions
}

fn stop_count(actions: &[UpdateAction]) -> usize {
    actions
        .iter()
        .filter(|a| matches!(a, UpdateAction::StopBackend))
        .count()
}

#[test]
fn test_startup_launches_backend_then_loads_ui() {
    let mut state = AppState::new(RuntimeMode::Development, Settings::default())
        .with_ui_location("http://localhost:5173/");

    let actions = drive(&mut state, Message::Startup);

    assert!(matches!(actions[0], UpdateAction::LaunchBackend));
    assert!(matches!(
        &actions[1],
        UpdateAction::LoadLocation(url) if url == "http://localhost:5173/"
    ));
    assert_eq!(
        state.current_location.as_deref(),
        Some("http://localhost:5173/")
    );
}

#[test]
fn test_backend_started_probes_readiness() {
    let mut state = AppState::new(RuntimeMode::Development, Settings::default());
    let result = update(
        &mut state,
        Message::BackendStarted {
            pid: Some(1),
            command: "python main.py".to_string(),
        },
    );

    assert!(matches!(result.action, Some(UpdateAction::ProbeReadiness)));
    assert!(state.backend.running);
    assert_eq!(state.backend.pid, Some(1));
    assert_eq!(state.phase, AppPhase::Running);
}

#[test]
fn test_start_failure_shows_error_only_when_user_visible() {
    let mut state = AppState::new(RuntimeMode::Packaged, Settings::default());

    let result = update(
        &mut state,
        Message::BackendStartFailed {
            reason: "Executable not found: /res/python-dist/main".to_string(),
            user_visible: true,
        },
    );
    match result.action {
        Some(UpdateAction::ShowError { title, message }) => {
            assert_eq!(title, backend::START_FAILED_TITLE);
            assert!(message.contains("python-dist"));
        }
        other => panic!("expected ShowError, got {:?}", other),
    }

    let result = update(
        &mut state,
        Message::BackendStartFailed {
            reason: "no interpreter".to_string(),
            user_visible: false,
        },
    );
    assert!(result.action.is_none());
    assert!(!state.backend.running);
}

#[test]
fn test_backend_output_does_not_change_state() {
    let mut state = running_state();
    update(&mut state, Message::Backend(BackendEvent::Stdout("Running on :5000".into())));
    update(&mut state, Message::Backend(BackendEvent::Stderr("warning".into())));

    assert!(state.backend.running);
    assert_eq!(state.backend.pid, Some(4242));
}

#[test]
fn test_backend_exit_clears_tracking() {
    let mut state = running_state();
    update(&mut state, Message::BackendReady);
    assert!(state.backend.ready);

    update(
        &mut state,
        Message::Backend(BackendEvent::Exited {
            code: Some(1),
            signal: None,
        }),
    );

    assert!(!state.backend.running);
    assert!(!state.backend.ready);
    assert_eq!(state.backend.pid, None);
    assert_eq!(state.backend.last_exit_code, Some(1));
    assert!(!state.backend_needs_stop());
}

#[test]
fn test_ready_ignored_without_backend() {
    let mut state = AppState::new(RuntimeMode::Development, Settings::default());
    update(&mut state, Message::BackendReady);
    assert!(!state.backend.ready);
}

#[test]
fn test_close_request_prompts() {
    let mut state = running_state();
    let result = update(&mut state, Message::CloseRequested);

    match result.action {
        Some(UpdateAction::ShowConfirmDialog(dialog)) => {
            assert_eq!(dialog.message, "Are you sure you want to exit the application?");
        }
        other => panic!("expected ShowConfirmDialog, got {:?}", other),
    }
    assert!(state.is_prompting());

    // A second request while the prompt is up is ignored
    let result = update(&mut state, Message::CloseRequested);
    assert!(result.action.is_none());
}

#[test]
fn test_interrupt_prompts_like_close() {
    let mut state = running_state();
    let actions = drive(&mut state, Message::Interrupt);

    assert!(matches!(
        actions.as_slice(),
        [UpdateAction::ShowConfirmDialog(_)]
    ));
    assert!(state.is_prompting());
    assert!(!state.should_quit());
}

#[test]
fn test_repeated_interrupt_while_prompting_quits() {
    let mut state = running_state();
    drive(&mut state, Message::Interrupt);
    assert!(state.is_prompting());

    let mut actions = drive(&mut state, Message::Interrupt);
    assert_eq!(stop_count(&actions), 1);
    assert!(!state.is_prompting());
    assert_eq!(state.phase, AppPhase::ShuttingDown);

    actions.extend(drive(
        &mut state,
        Message::ShutdownComplete(ShutdownOutcome::Graceful),
    ));
    assert_eq!(stop_count(&actions), 1);
    assert!(state.should_quit());
}

#[test]
fn test_interrupt_without_prompting_closes_directly() {
    let mut settings = Settings::default();
    settings.window.confirm_close = false;
    let mut state = AppState::new(RuntimeMode::Development, settings);

    let actions = drive(&mut state, Message::Interrupt);

    assert!(actions.iter().any(|a| matches!(a, UpdateAction::CloseWindow)));
    assert!(!state.window_open);
    assert!(state.should_quit());
}

#[test]
fn test_declined_close_keeps_everything_running() {
    let mut state = running_state();
    let mut actions = drive(&mut state, Message::CloseRequested);
    actions.extend(drive(&mut state, Message::CancelClose));

    assert_eq!(stop_count(&actions), 0);
    assert!(!actions.iter().any(|a| matches!(a, UpdateAction::CloseWindow)));
    assert!(state.window_open);
    assert!(!state.is_prompting());
    assert_eq!(state.shutdown, ShutdownState::Idle);
    assert!(!state.should_quit());
}

#[test]
fn test_confirmed_close_stops_backend_once() {
    let mut state = running_state();
    let mut actions = drive(&mut state, Message::CloseRequested);
    actions.extend(drive(&mut state, Message::ConfirmClose));
    // OS quit arrives while the stop is in flight
    actions.extend(drive(&mut state, Message::BeforeQuit));

    assert_eq!(stop_count(&actions), 1);
    assert!(actions.iter().any(|a| matches!(a, UpdateAction::CloseWindow)));
    assert_eq!(state.shutdown, ShutdownState::InFlight);
    assert_eq!(state.phase, AppPhase::ShuttingDown);
    assert!(!state.should_quit());
}

#[test]
fn test_quit_proceeds_after_stop_completes() {
    let mut state = running_state();
    drive(&mut state, Message::BeforeQuit);
    assert!(!state.should_quit());

    let actions = drive(
        &mut state,
        Message::ShutdownComplete(ShutdownOutcome::ForcedAttempted),
    );

    assert_eq!(stop_count(&actions), 0);
    assert_eq!(
        state.shutdown,
        ShutdownState::Done(ShutdownOutcome::ForcedAttempted)
    );
    assert!(state.should_quit());

    // Later quits never stop again
    let actions = drive(&mut state, Message::BeforeQuit);
    assert_eq!(stop_count(&actions), 0);
    assert!(state.should_quit());
}

#[test]
fn test_quit_without_backend_is_immediate() {
    let mut state = AppState::new(RuntimeMode::Packaged, Settings::default());
    let actions = drive(&mut state, Message::BeforeQuit);

    assert_eq!(stop_count(&actions), 0);
    assert!(state.should_quit());
    assert_eq!(state.shutdown, ShutdownState::Idle);
}

#[test]
fn test_close_without_confirmation_setting() {
    let mut settings = Settings::default();
    settings.window.confirm_close = false;
    let mut state = AppState::new(RuntimeMode::Development, settings);
    update(
        &mut state,
        Message::BackendStarted {
            pid: Some(9),
            command: "python main.py".to_string(),
        },
    );

    let actions = drive(&mut state, Message::CloseRequested);

    assert!(!actions
        .iter()
        .any(|a| matches!(a, UpdateAction::ShowConfirmDialog(_))));
    assert!(actions.iter().any(|a| matches!(a, UpdateAction::CloseWindow)));
    assert_eq!(stop_count(&actions), 1);
}

#[test]
fn test_backend_exit_during_stop_still_completes() {
    let mut state = running_state();
    drive(&mut state, Message::BeforeQuit);
    update(
        &mut state,
        Message::Backend(BackendEvent::Exited {
            code: Some(0),
            signal: None,
        }),
    );
    drive(&mut state, Message::ShutdownComplete(ShutdownOutcome::Graceful));

    assert!(state.should_quit());
}

#[test]
fn test_ui_load_failure_shows_diagnostic_page() {
    let mut state = AppState::new(RuntimeMode::Development, Settings::default());
    let result = update(
        &mut state,
        Message::UiLoadFailed {
            url: "http://localhost:5173/".to_string(),
            code: -102,
            description: "ERR_CONNECTION_REFUSED".to_string(),
        },
    );

    match result.action {
        Some(UpdateAction::LoadLocation(page)) => {
            assert!(page.starts_with("data:text/html,"));
        }
        other => panic!("expected LoadLocation, got {:?}", other),
    }
    assert!(state
        .current_location
        .as_deref()
        .is_some_and(|l| l.starts_with("data:")));
}

#[test]
fn test_ui_not_loaded_after_window_closed() {
    let mut state = AppState::new(RuntimeMode::Development, Settings::default());
    drive(&mut state, Message::ConfirmClose);

    let result = update(&mut state, Message::LoadUi);
    assert!(result.action.is_none());
}
