//! Percent Racer - Tauri Backend
//!
//! Runs the percentage quiz race and exposes it to the frontend through
//! Tauri commands. The frontend calls `tick` once per second and renders the
//! returned snapshot.

pub mod game_server;

#[cfg(feature = "desktop")]
pub use app::run;

#[cfg(feature = "desktop")]
mod app {
    use std::sync::Mutex;

    use tauri::{AppHandle, Emitter, State};

    use crate::game_server::race::{Answer, GameOver, RaceConfig, RaceEvent, RaceSnapshot};
    use crate::game_server::racer::Racer;
    use crate::game_server::simulation::{GameServer, Screen, ServerStats};

    /// Forward drained race events to the webview
    fn publish(app: &AppHandle, server: &mut GameServer) -> Result<(), String> {
        for event in server.drain_events() {
            if let RaceEvent::GameOver(over) = &event {
                app.emit("game-over", over).map_err(|e| e.to_string())?;
            }
            app.emit("race-event", &event).map_err(|e| e.to_string())?;
        }
        Ok(())
    }

    /// Racers offered on the selection screen
    #[tauri::command]
    fn list_racers() -> Vec<Racer> {
        Racer::roster()
    }

    /// Pick the racer for the next race
    #[tauri::command]
    fn select_racer(server: State<'_, Mutex<GameServer>>, racer_id: String) -> Result<Racer, String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.select_racer(&racer_id).map_err(|e| e.to_string())
    }

    /// Start a race with the selected racer
    #[tauri::command]
    fn start_race(
        app: AppHandle,
        server: State<'_, Mutex<GameServer>>,
        race_seconds: Option<u32>,
        question_seconds: Option<u32>,
        seed: Option<u64>,
    ) -> Result<RaceSnapshot, String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;

        let defaults = RaceConfig::default();
        let config = RaceConfig {
            race_seconds: race_seconds.unwrap_or(defaults.race_seconds),
            question_seconds: question_seconds.unwrap_or(defaults.question_seconds),
            seed,
            ..defaults
        };

        let snapshot = server.start_race_with(config).map_err(|e| e.to_string())?;
        log::info!("Race started with {} racer", snapshot.racer.name);
        publish(&app, &mut server)?;
        Ok(snapshot)
    }

    /// Advance the race by one second and return the current state
    #[tauri::command]
    fn tick(app: AppHandle, server: State<'_, Mutex<GameServer>>) -> Result<Option<RaceSnapshot>, String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        let snapshot = server.tick();
        publish(&app, &mut server)?;
        Ok(snapshot)
    }

    /// Submit an answer; `None` means the player gave no answer
    #[tauri::command]
    fn submit_answer(
        app: AppHandle,
        server: State<'_, Mutex<GameServer>>,
        choice: Option<u32>,
    ) -> Result<RaceSnapshot, String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        let answer = choice.map(Answer::Choice).unwrap_or(Answer::NoAnswer);
        let snapshot = server.submit_answer(answer).map_err(|e| e.to_string())?;
        publish(&app, &mut server)?;
        Ok(snapshot)
    }

    /// Get current race snapshot without advancing time
    #[tauri::command]
    fn get_snapshot(server: State<'_, Mutex<GameServer>>) -> Result<Option<RaceSnapshot>, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.get_snapshot())
    }

    /// Get the last race result
    #[tauri::command]
    fn get_result(server: State<'_, Mutex<GameServer>>) -> Result<Option<GameOver>, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.get_result())
    }

    /// Get server statistics
    #[tauri::command]
    fn get_stats(server: State<'_, Mutex<GameServer>>) -> Result<ServerStats, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.get_stats())
    }

    /// Get the screen the frontend should show
    #[tauri::command]
    fn get_screen(server: State<'_, Mutex<GameServer>>) -> Result<Screen, String> {
        let server = server.lock().map_err(|e| e.to_string())?;
        Ok(server.get_screen())
    }

    /// Return to racer selection after a race
    #[tauri::command]
    fn restart(server: State<'_, Mutex<GameServer>>) -> Result<(), String> {
        let mut server = server.lock().map_err(|e| e.to_string())?;
        server.restart().map_err(|e| e.to_string())
    }

    #[cfg_attr(mobile, tauri::mobile_entry_point)]
    pub fn run() {
        tauri::Builder::default()
            .manage(Mutex::new(GameServer::new()))
            .setup(|app| {
                if cfg!(debug_assertions) {
                    app.handle().plugin(
                        tauri_plugin_log::Builder::default()
                            .level(log::LevelFilter::Info)
                            .build(),
                    )?;
                }
                log::info!("Percent Racer game server initialized");
                Ok(())
            })
            .invoke_handler(tauri::generate_handler![
                list_racers,
                select_racer,
                start_race,
                tick,
                submit_answer,
                get_snapshot,
                get_result,
                get_stats,
                get_screen,
                restart,
            ])
            .run(tauri::generate_context!())
            .expect("error while running tauri application");
    }
}
