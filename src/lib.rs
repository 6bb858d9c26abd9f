pub mod animation;
pub mod dashboard;
pub mod data;
pub mod models;
pub mod overlay;
pub mod placement;
pub mod render;
pub mod settings;
mod utils;

use std::sync::Arc;

use dashboard::{
    branding::{load_branding, Branding},
    commands::{
        clear_placements, get_branding, get_dashboard_state, get_floor_plan, get_latest_frame,
        get_settings, open_branding_link, place_sensor, set_time_window, toggle_animation,
        undo_placement, update_settings,
    },
    events::WebviewSink,
    DashboardController, DashboardSession,
};
use data::{load_readings, FloorPlan};
use settings::SettingsStore;
use tauri::Manager;

pub(crate) struct AppState {
    pub(crate) dashboard: DashboardController,
    pub(crate) settings: SettingsStore,
    pub(crate) branding: Branding,
}

#[cfg_attr(mobile, tauri::mobile_entry_point)]
pub fn run() {
    // Initialize logging (reads RUST_LOG env var)
    env_logger::Builder::from_default_env()
        .filter_level(log::LevelFilter::Info)
        .init();

    log::info!("Sensor overlay dashboard starting up...");

    tauri::Builder::default()
        .plugin(tauri_plugin_opener::init())
        .setup(|app| {
            let result = (|| -> anyhow::Result<()> {
                let app_data_dir = app
                    .path()
                    .app_data_dir()
                    .map_err(|err| anyhow::anyhow!(err))?;
                std::fs::create_dir_all(&app_data_dir)?;

                let settings_store = SettingsStore::new(app_data_dir.join("settings.json"))?;
                let settings = settings_store.get();
                log::info!("Data root: {}", settings.data_root()?.display());

                // Without its data files the dashboard has nothing to show.
                let readings = load_readings(&settings.resolve(&settings.readings_csv)?)?;
                let floor_plan = FloorPlan::load(&settings.resolve(&settings.floor_plan_image)?)?;
                log::info!(
                    "Floor plan is {}x{} px",
                    floor_plan.width(),
                    floor_plan.height()
                );

                let session = DashboardSession::new(readings, floor_plan, settings.render_config());
                let sink = Arc::new(WebviewSink::new(app.handle().clone()));
                let dashboard = DashboardController::new(session, sink, settings.frame_delay());

                app.manage(AppState {
                    dashboard,
                    branding: load_branding(&settings),
                    settings: settings_store,
                });

                Ok(())
            })();

            result.map_err(|err| err.into())
        })
        .invoke_handler(tauri::generate_handler![
            get_dashboard_state,
            get_floor_plan,
            place_sensor,
            undo_placement,
            clear_placements,
            set_time_window,
            toggle_animation,
            get_latest_frame,
            get_branding,
            open_branding_link,
            get_settings,
            update_settings,
        ])
        .run(tauri::generate_context!())
        .expect("error while running tauri application");
}
