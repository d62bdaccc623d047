use log::{error, info};
use tauri::{Manager, RunEvent};

use recipe_reader::{
    cmds::{player, suggest},
    settings::ReaderSettings,
    state::AppState,
    util::logging,
};

fn main() {
    if let Err(err) = logging::init() {
        eprintln!("Failed to initialise logger: {err:?}");
    }
    info!("Starting Recipe Reader");

    let (state, completions) = match AppState::initialise(ReaderSettings::from_env()) {
        Ok(initialised) => initialised,
        Err(err) => {
            error!("Failed to initialise application state: {err:?}");
            return;
        }
    };

    let app = tauri::Builder::default()
        .manage(state)
        .setup(move |app| {
            player::spawn_completion_pump(app.handle(), completions);
            Ok(())
        })
        .invoke_handler(tauri::generate_handler![
            player::load_instructions,
            player::set_player_visible,
            player::toggle_play,
            player::next_step,
            player::previous_step,
            player::toggle_auto_advance,
            player::player_status,
            player::close_player,
            suggest::suggest_ingredients,
        ])
        .build(tauri::generate_context!());

    match app {
        Ok(app) => app.run(|handle, event| {
            if let RunEvent::Exit = event {
                handle.state::<AppState>().player.lock().teardown();
                info!("Recipe Reader stopped");
            }
        }),
        Err(err) => error!("Tauri runtime error: {err:?}"),
    }
}
