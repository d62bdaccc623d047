use tauri::State;

use crate::state::AppState;

#[tauri::command]
pub fn suggest_ingredients(state: State<'_, AppState>, text: String) -> Vec<String> {
    state.ingredients.suggest(&text)
}
