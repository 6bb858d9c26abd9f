use serde::Serialize;
use tauri::{AppHandle, State};
use tauri_plugin_opener::OpenerExt;

use crate::{
    dashboard::{branding::Branding, DashboardController, DashboardSnapshot},
    models::TimeWindow,
    render::RenderedFrame,
    settings::DashboardSettings,
    AppState,
};

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FloorPlanInfo {
    pub width: u32,
    pub height: u32,
    pub data_url: String,
}

fn controller_from_state(state: &State<'_, AppState>) -> DashboardController {
    state.dashboard.clone()
}

#[tauri::command]
pub async fn get_dashboard_state(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.snapshot().await)
}

#[tauri::command]
pub async fn get_floor_plan(state: State<'_, AppState>) -> Result<FloorPlanInfo, String> {
    let controller = controller_from_state(&state);
    let (width, height, data_url) = controller
        .floor_plan_data_url()
        .await
        .map_err(|e| e.to_string())?;
    Ok(FloorPlanInfo {
        width,
        height,
        data_url,
    })
}

#[tauri::command]
pub async fn place_sensor(
    state: State<'_, AppState>,
    x: f64,
    y: f64,
) -> Result<DashboardSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.place_sensor(x, y).await)
}

#[tauri::command]
pub async fn undo_placement(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.undo_placement().await)
}

#[tauri::command]
pub async fn clear_placements(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let controller = controller_from_state(&state);
    Ok(controller.clear_placements().await)
}

#[tauri::command]
pub async fn set_time_window(
    state: State<'_, AppState>,
    start: String,
    end: String,
) -> Result<DashboardSnapshot, String> {
    let start = TimeWindow::parse_bound(&start).map_err(|e| e.to_string())?;
    let end = TimeWindow::parse_bound(&end).map_err(|e| e.to_string())?;
    let controller = controller_from_state(&state);
    controller
        .set_time_window(start, end)
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn toggle_animation(state: State<'_, AppState>) -> Result<DashboardSnapshot, String> {
    let controller = controller_from_state(&state);
    controller
        .toggle_animation()
        .await
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub async fn get_latest_frame(state: State<'_, AppState>) -> Result<Option<RenderedFrame>, String> {
    let controller = controller_from_state(&state);
    Ok(controller.latest_frame().await)
}

#[tauri::command]
pub fn get_branding(state: State<'_, AppState>) -> Result<Branding, String> {
    Ok(state.branding.clone())
}

#[tauri::command]
pub fn open_branding_link(app_handle: AppHandle, state: State<'_, AppState>) -> Result<(), String> {
    app_handle
        .opener()
        .open_url(state.branding.url.clone(), None::<&str>)
        .map_err(|e| e.to_string())
}

#[tauri::command]
pub fn get_settings(state: State<'_, AppState>) -> Result<DashboardSettings, String> {
    Ok(state.settings.get())
}

/// Persist settings. Frame delay and marker scale apply immediately; file
/// locations take effect on the next launch.
#[tauri::command]
pub async fn update_settings(
    state: State<'_, AppState>,
    settings: DashboardSettings,
) -> Result<DashboardSettings, String> {
    state
        .settings
        .update(settings.clone())
        .map_err(|e| e.to_string())?;

    let controller = controller_from_state(&state);
    controller.set_frame_delay(settings.frame_delay()).await;
    controller.set_render_config(settings.render_config()).await;
    Ok(settings)
}
