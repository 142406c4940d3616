//! Browser binding
//!
//! `BunnyClick` is what the page talks to. The UI calls `poll()` from its
//! animation frame, forwards taps and keys, and listens for JSON events and
//! feedback cues. Callbacks run after the engine borrow is released, so they
//! may call straight back into `BunnyClick`.

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use log::{info, warn};
use wasm_bindgen::prelude::*;
use wasm_bindgen_futures::{future_to_promise, spawn_local};

use crate::clock::SystemClock;
use crate::engine::{GameEngine, GameMode, GameRecord};
use crate::feedback::Cue;
use crate::input::{ClickData, Key};
use crate::storage::{GameStorage, LocalStorage, persist_record};

#[wasm_bindgen(start)]
pub fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialised".into());
    }
    info!("Bunny Click engine loaded");
}

/// Serialized output waiting for delivery to JS
enum Outbound {
    Event(String),
    Cue(String),
}

type Outbox = Rc<RefCell<Vec<Outbound>>>;

fn to_js(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

#[wasm_bindgen]
pub struct BunnyClick {
    engine: Rc<RefCell<GameEngine<SystemClock>>>,
    storage: LocalStorage,
    outbox: Outbox,
    event_callbacks: RefCell<Vec<js_sys::Function>>,
    cue_callbacks: RefCell<Vec<js_sys::Function>>,
    /// Set once the page installs settings; a late storage load must not
    /// overwrite them
    settings_touched: Rc<Cell<bool>>,
}

#[wasm_bindgen]
impl BunnyClick {
    #[wasm_bindgen(constructor)]
    pub fn new() -> BunnyClick {
        let engine = Rc::new(RefCell::new(GameEngine::new(SystemClock)));
        let outbox: Outbox = Rc::new(RefCell::new(Vec::new()));

        {
            let mut engine = engine.borrow_mut();

            let events = outbox.clone();
            engine.subscribe(move |event| match serde_json::to_string(event) {
                Ok(json) => events.borrow_mut().push(Outbound::Event(json)),
                Err(e) => warn!("Failed to serialize {} event: {}", event.name(), e),
            });

            let cues = outbox.clone();
            engine.add_feedback_sink(move |cue: Cue| {
                if let Cue::Vibrate { millis } = cue {
                    if let Some(window) = web_sys::window() {
                        window.navigator().vibrate_with_duration(millis);
                    }
                }
                match serde_json::to_string(&cue) {
                    Ok(json) => cues.borrow_mut().push(Outbound::Cue(json)),
                    Err(e) => warn!("Failed to serialize cue: {}", e),
                }
            });
        }

        let game = BunnyClick {
            engine,
            storage: LocalStorage::new(),
            outbox,
            event_callbacks: RefCell::new(Vec::new()),
            cue_callbacks: RefCell::new(Vec::new()),
            settings_touched: Rc::new(Cell::new(false)),
        };
        game.load_settings();
        game
    }

    #[wasm_bindgen(js_name = startSingle)]
    pub fn start_single(&self) -> Result<(), JsValue> {
        let result = self.engine.borrow_mut().start_single_player();
        self.settle();
        result.map_err(to_js)
    }

    #[wasm_bindgen(js_name = startDual)]
    pub fn start_dual(&self) -> Result<(), JsValue> {
        let result = self.engine.borrow_mut().start_dual_player();
        self.settle();
        result.map_err(to_js)
    }

    /// Tap from `participant` ("single", "player1", "player2") at (x, y)
    pub fn tap(&self, participant: &str, x: f32, y: f32) -> Option<u32> {
        let score = self
            .engine
            .borrow_mut()
            .handle_click_key(participant, ClickData::at(x, y));
        self.settle();
        score
    }

    /// `KeyboardEvent.code`
    pub fn key(&self, code: &str) {
        if let Some(key) = Key::from_code(code) {
            self.engine.borrow_mut().handle_key(key);
            self.settle();
        }
    }

    pub fn exit(&self) {
        self.engine.borrow_mut().exit_game();
        self.settle();
    }

    pub fn pause(&self) {
        self.engine.borrow_mut().pause();
        self.settle();
    }

    pub fn resume(&self) {
        self.engine.borrow_mut().resume();
        self.settle();
    }

    pub fn reset(&self) {
        self.engine.borrow_mut().reset_game();
        self.settle();
    }

    /// Fire due timers. Call once per animation frame.
    pub fn poll(&self) -> usize {
        let fired = self.engine.borrow_mut().poll();
        self.settle();
        fired
    }

    /// Snapshot as JSON
    pub fn state(&self) -> Result<String, JsValue> {
        let snapshot = self.engine.borrow().get_state();
        serde_json::to_string(&snapshot).map_err(to_js)
    }

    /// `callback(json)` for every engine event
    #[wasm_bindgen(js_name = onEvent)]
    pub fn on_event(&self, callback: js_sys::Function) {
        self.event_callbacks.borrow_mut().push(callback);
    }

    /// `callback(json)` for every sound/ripple/burst/vibrate cue
    #[wasm_bindgen(js_name = onCue)]
    pub fn on_cue(&self, callback: js_sys::Function) {
        self.cue_callbacks.borrow_mut().push(callback);
    }

    /// Overlay a partial JSON record onto the current settings, install and
    /// persist the result. Unknown keys are rejected.
    #[wasm_bindgen(js_name = saveSettings)]
    pub fn save_settings(&self, json: &str) -> Result<(), JsValue> {
        let settings = self.engine.borrow().settings().merged(json).map_err(to_js)?;
        self.settings_touched.set(true);
        self.engine.borrow_mut().apply_settings(settings.clone());

        let storage = self.storage;
        spawn_local(async move {
            if let Err(e) = storage.save_settings(&settings).await {
                warn!("Failed to save settings: {}", e);
            }
        });
        Ok(())
    }

    /// Resolves to the mode's leaderboard as JSON
    #[wasm_bindgen(js_name = highScores)]
    pub fn high_scores(&self, mode: &str) -> Result<js_sys::Promise, JsValue> {
        let mode = GameMode::from_str(mode).ok_or_else(|| to_js(format!("unknown mode {:?}", mode)))?;
        let storage = self.storage;
        Ok(future_to_promise(async move {
            let board = storage.get_high_score(mode).await.map_err(to_js)?;
            serde_json::to_string(&board)
                .map(JsValue::from)
                .map_err(to_js)
        }))
    }

    /// Resolves to the stored game history as JSON
    pub fn history(&self) -> js_sys::Promise {
        let storage = self.storage;
        future_to_promise(async move {
            let history = storage.get_game_history().await.map_err(to_js)?;
            serde_json::to_string(&history)
                .map(JsValue::from)
                .map_err(to_js)
        })
    }

    /// Resolves once history and high scores are wiped
    #[wasm_bindgen(js_name = clearData)]
    pub fn clear_data(&self) -> js_sys::Promise {
        let storage = self.storage;
        future_to_promise(async move {
            storage.clear_game_data().await.map_err(to_js)?;
            info!("Game data cleared");
            Ok(JsValue::UNDEFINED)
        })
    }

    /// Stop timers and drop every listener
    pub fn destroy(&self) {
        self.engine.borrow_mut().destroy();
        self.event_callbacks.borrow_mut().clear();
        self.cue_callbacks.borrow_mut().clear();
        self.outbox.borrow_mut().clear();
    }
}

impl Default for BunnyClick {
    fn default() -> Self {
        Self::new()
    }
}

impl BunnyClick {
    /// Sessions started before this resolves run on defaults
    fn load_settings(&self) {
        let engine = self.engine.clone();
        let touched = self.settings_touched.clone();
        let storage = self.storage;
        spawn_local(async move {
            let result = storage.get_settings().await;
            if touched.get() {
                info!("Settings changed before load finished, keeping them");
                return;
            }
            match result {
                Ok(Some(settings)) => engine.borrow_mut().settings_loaded(Ok(settings)),
                Ok(None) => info!("No stored settings, using defaults"),
                Err(e) => engine.borrow_mut().settings_loaded(Err(e)),
            }
        });
    }

    /// Persist finished sessions and deliver queued output
    fn settle(&self) {
        let records = self.engine.borrow_mut().take_records();
        for record in records {
            self.persist(record);
        }
        self.flush();
    }

    fn persist(&self, record: GameRecord) {
        let storage = self.storage;
        spawn_local(async move {
            persist_record(&storage, &record).await;
        });
    }

    fn flush(&self) {
        let pending = std::mem::take(&mut *self.outbox.borrow_mut());
        if pending.is_empty() {
            return;
        }
        let events = self.event_callbacks.borrow().clone();
        let cues = self.cue_callbacks.borrow().clone();

        for item in pending {
            let (callbacks, json) = match &item {
                Outbound::Event(json) => (&events, json),
                Outbound::Cue(json) => (&cues, json),
            };
            let arg = JsValue::from_str(json);
            for callback in callbacks {
                if let Err(e) = callback.call1(&JsValue::NULL, &arg) {
                    warn!("JS callback threw: {:?}", e);
                }
            }
        }
    }
}
