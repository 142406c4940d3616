//! Bunny Click entry point
//!
//! The browser build is driven from JS through `bunny_click::web`. Natively
//! this runs a headless dual-player match between two auto-tappers on a
//! manual clock and logs how it went.
//!
//! Usage: `bunny-click [seed] [seconds]`

#[cfg(not(target_arch = "wasm32"))]
mod demo {
    use bunny_click::autotap::AutoTapper;
    use bunny_click::engine::{EventKind, GameEvent};
    use bunny_click::storage::{GameStorage, MemoryStorage, load_settings, persist_record};
    use bunny_click::{Clock, GameEngine, GameMode, ManualClock, Participant, Settings, SystemClock};

    /// Simulation step (ms)
    const STEP_MS: u64 = 1;

    pub fn run(seed: u64, seconds: u32) {
        let storage = MemoryStorage::new();
        let stored = Settings {
            game_duration: seconds,
            sound_enabled: false,
            ..Default::default()
        };
        if let Err(e) = pollster::block_on(storage.save_settings(&stored)) {
            log::warn!("Could not store demo settings: {}", e);
        }

        let start = SystemClock.now_ms();
        let clock = ManualClock::new(start);
        let mut engine = GameEngine::new(clock.clone());
        engine.apply_settings(pollster::block_on(load_settings(&storage)));

        engine.on(EventKind::Tick, |event| {
            if let GameEvent::Tick { time_left } = event {
                log::debug!("{}s left", time_left);
            }
        });
        engine.on(EventKind::SessionEnded, |event| match serde_json::to_string(event) {
            Ok(json) => log::info!("{}", json),
            Err(e) => log::warn!("Could not serialize end event: {}", e),
        });

        let mut tappers = [
            AutoTapper::new(Participant::Player1, 7.5, start, seed).with_jitter(0.35),
            AutoTapper::new(Participant::Player2, 6.5, start, seed.wrapping_add(1)).with_jitter(0.35),
        ];

        if let Err(e) = engine.start_dual_player() {
            log::error!("Could not start demo match: {}", e);
            return;
        }

        let mut now = start;
        while engine.phase().is_playing() {
            now += STEP_MS;
            clock.set(now);
            for tapper in &mut tappers {
                for _ in tapper.due(now) {
                    engine.handle_click(tapper.participant(), Default::default());
                }
            }
            engine.poll();
        }

        for record in engine.take_records() {
            log::info!(
                "{} match over after {}s: {:?}, best {} taps/s",
                record.mode,
                record.duration,
                record.outcome(),
                record.best_tps
            );
            pollster::block_on(persist_record(&storage, &record));
        }

        match pollster::block_on(storage.get_high_score(GameMode::Dual)) {
            Ok(board) => {
                for (rank, entry) in board.entries.iter().enumerate() {
                    log::info!("#{} {} taps ({} tps)", rank + 1, entry.score, entry.tps);
                }
                if let Some(best) = board.top_score() {
                    log::info!("Dual record to beat: {} taps", best);
                }
            }
            Err(e) => log::warn!("Could not read high scores: {}", e),
        }

        let stats = engine.statistics();
        log::info!(
            "Totals: {} taps, {} games, peak {} taps/s",
            stats.total_clicks,
            stats.games_played,
            stats.highest_tps
        );
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();
    log::info!("Bunny Click (native) starting...");
    log::info!("Browser build: `wasm-pack build --target web`, then drive `BunnyClick` from the page");

    let mut args = std::env::args().skip(1);
    let seed = args.next().and_then(|s| s.parse().ok()).unwrap_or(42);
    let seconds = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(bunny_click::consts::DEFAULT_GAME_DURATION);

    demo::run(seed, seconds);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is bunny_click::web::wasm_main
}
