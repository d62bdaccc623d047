use std::thread;

use log::{error, warn};
use tauri::{AppHandle, Manager, State};

use crate::{
    player::PlayerStatus,
    speech::CompletionReceiver,
    state::AppState,
};

use super::CommandError;

pub const STATUS_EVENT: &str = "player://status";

#[tauri::command]
pub fn load_instructions(state: State<'_, AppState>, instructions: String) -> PlayerStatus {
    let mut player = state.player.lock();
    player.set_instructions(instructions);
    player.status()
}

#[tauri::command]
pub fn set_player_visible(state: State<'_, AppState>, visible: bool) -> PlayerStatus {
    let mut player = state.player.lock();
    player.set_visible(visible);
    player.status()
}

#[tauri::command]
pub fn toggle_play(state: State<'_, AppState>) -> Result<PlayerStatus, CommandError> {
    let mut player = state.player.lock();
    player.toggle_play()?;
    Ok(player.status())
}

#[tauri::command]
pub fn next_step(state: State<'_, AppState>) -> Result<PlayerStatus, CommandError> {
    let mut player = state.player.lock();
    player.next()?;
    Ok(player.status())
}

#[tauri::command]
pub fn previous_step(state: State<'_, AppState>) -> Result<PlayerStatus, CommandError> {
    let mut player = state.player.lock();
    player.previous()?;
    Ok(player.status())
}

#[tauri::command]
pub fn toggle_auto_advance(state: State<'_, AppState>) -> PlayerStatus {
    let mut player = state.player.lock();
    player.toggle_auto_advance();
    player.status()
}

#[tauri::command]
pub fn player_status(state: State<'_, AppState>) -> PlayerStatus {
    state.player.lock().status()
}

/// The view closed the reader: stop speaking and hide it.
#[tauri::command]
pub fn close_player(state: State<'_, AppState>) -> PlayerStatus {
    let mut player = state.player.lock();
    player.teardown();
    player.set_visible(false);
    player.status()
}

/// Feed engine completions into the player and push the new status to the
/// webview. Runs until the engine side of the channel is dropped.
pub fn spawn_completion_pump(handle: AppHandle, completions: CompletionReceiver) {
    let spawned = thread::Builder::new()
        .name("speech-completions".into())
        .spawn(move || {
            for id in completions {
                let state = handle.state::<AppState>();
                let status = {
                    let mut player = state.player.lock();
                    if let Err(err) = player.on_utterance_end(id) {
                        warn!("Auto-advance after {id} failed: {err}");
                    }
                    player.status()
                };
                if let Err(err) = handle.emit_all(STATUS_EVENT, status) {
                    error!("Failed to emit player status: {err}");
                }
            }
        });
    if let Err(err) = spawned {
        error!("Failed to start completion pump: {err}");
    }
}
