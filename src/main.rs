//! Crypto Breakout entry point
//!
//! Handles platform-specific initialization and runs the game loop. On the web
//! this wires the session to the canvas, the DOM HUD, input and audio. Natively
//! it plays a headless demo with the autopilot against offline levels.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlCanvasElement, MouseEvent, TouchEvent};

    use crypto_breakout::audio::AudioManager;
    use crypto_breakout::oracle::fetch_level;
    use crypto_breakout::persistence::{LocalStorageStore, ScoreStore};
    use crypto_breakout::platform::{
        format_clock, format_multiplier, format_score, pointer_to_field_x,
    };
    use crypto_breakout::renderer::CanvasRenderer;
    use crypto_breakout::session::{LevelRequest, SessionEffect};
    use crypto_breakout::sim::autopilot_target;
    use crypto_breakout::{GamePhase, Leaderboard, Session, Settings};

    /// Game instance holding all state
    struct Game {
        session: Session,
        renderer: CanvasRenderer,
        audio: AudioManager,
        settings: Settings,
        store: LocalStorageStore,
        /// Autopilot drives the paddle and relaunches
        idle_mode: bool,
        /// Phase the overlays were last drawn for
        shown_phase: Option<GamePhase>,
    }

    impl Game {
        fn new(seed: u64, renderer: CanvasRenderer, settings: Settings) -> Self {
            let store = LocalStorageStore;
            Self {
                session: Session::new(seed, store.best_score()),
                audio: AudioManager::new(&settings, seed ^ 0x5eed),
                renderer,
                settings,
                store,
                idle_mode: false,
                shown_phase: None,
            }
        }

        /// One display frame
        fn frame(&mut self) {
            if self.idle_mode && self.session.is_playing() {
                if let Some(field) = self.session.field() {
                    let target = autopilot_target(field);
                    let resting = !field.ball.active;
                    self.session.set_pointer_x(target);
                    if resting {
                        self.session.launch();
                    }
                }
            }

            for event in self.session.frame() {
                log::debug!("{:?}", event);
            }
            self.apply_effects();
            self.audio.pump();

            match self.session.field() {
                Some(field) => self.renderer.render(field),
                None => self.renderer.clear(),
            }
        }

        fn apply_effects(&mut self) {
            for effect in self.session.drain_effects() {
                match effect {
                    SessionEffect::StartMusic { level } => self.audio.start_level_music(level),
                    SessionEffect::StopMusic => self.audio.stop_music(),
                    SessionEffect::VictoryCue => self.audio.play_victory_cue(),
                    SessionEffect::SaveBestScore(score) => self.store.set_best_score(score),
                }
            }
        }

        fn launch(&mut self) {
            self.audio.resume();
            self.session.launch();
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.settings.save();
            self.audio.apply_settings(&self.settings);
            log::info!("Muted: {}", self.settings.muted);
        }

        /// Update HUD elements in DOM
        fn update_hud(&mut self, document: &Document) {
            let session = &self.session;

            set_text(document, "hud-level", &session.level().to_string());
            set_text(document, "hud-score", &format_score(session.score()));
            set_text(document, "hud-best", &format_score(session.best_score()));

            let lives = session.lives() as usize;
            let pips: String = (0..crypto_breakout::consts::INITIAL_LIVES as usize)
                .map(|i| if i < lives { '●' } else { '○' })
                .collect();
            set_text(document, "hud-lives", &pips);

            set_text(document, "hud-time", &format_clock(session.level_time_secs()));
            if let Some(el) = document.get_element_by_id("hud-time") {
                let class = if session.is_over_par() {
                    "hud-value over-par"
                } else {
                    "hud-value"
                };
                let _ = el.set_attribute("class", class);
            }

            if let Some(d) = session.descriptor() {
                set_text(document, "hud-par", &format_clock(d.target_time_secs as u64));
                set_text(document, "hud-sentiment", d.sentiment.as_str());
                set_text(document, "level-name", &d.name);
                set_text(document, "level-analysis", &d.description);
            }

            match session.advisory() {
                Some(msg) => {
                    set_text(document, "advisory", msg);
                    set_visible(document, "advisory", true);
                }
                None => set_visible(document, "advisory", false),
            }

            set_visible(document, "idle-badge", self.idle_mode);

            // Overlays only change with the phase
            let phase = session.phase();
            if self.shown_phase == Some(phase) {
                return;
            }
            self.shown_phase = Some(phase);

            set_visible(document, "menu", phase == GamePhase::Menu);
            set_visible(document, "generating", phase == GamePhase::Generating);
            set_visible(document, "victory", phase == GamePhase::Victory);
            set_visible(document, "game-over", phase == GamePhase::GameOver);
            set_visible(document, "hud", phase != GamePhase::Menu);

            if phase == GamePhase::Victory {
                set_text(document, "victory-time", &format_clock(session.level_time_secs()));
                if let Some(d) = session.descriptor() {
                    set_text(document, "victory-par", &format_clock(d.target_time_secs as u64));
                    set_text(
                        document,
                        "victory-boost",
                        &format_multiplier(d.sentiment.launch_multiplier()),
                    );
                }
                if let Some(reward) = session.last_reward() {
                    set_text(document, "victory-bonus", &format_score(reward.bonus));
                }
                set_text(document, "victory-score", &format_score(session.score()));
            }

            if phase == GamePhase::GameOver {
                set_text(document, "final-score", &format_score(session.score()));
                set_text(document, "final-level", &session.level().to_string());
                let board = Leaderboard::for_run(session.score(), session.total_time_secs());
                if let Some(rank) = board.player_rank() {
                    set_text(document, "final-rank", &format!("#{rank}"));
                }
                if let Some(el) = document.get_element_by_id("leaderboard") {
                    let rows: String = board
                        .entries
                        .iter()
                        .enumerate()
                        .map(|(i, e)| {
                            format!(
                                "<li class=\"{}\"><span>#{} {}</span><span>{}</span><span>{}</span></li>",
                                if e.is_player() { "you" } else { "" },
                                i + 1,
                                e.name,
                                format_score(e.score),
                                format_clock(e.time_secs)
                            )
                        })
                        .collect();
                    el.set_inner_html(&rows);
                }
            }
        }
    }

    fn set_text(document: &Document, id: &str, text: &str) {
        if let Some(el) = document.get_element_by_id(id) {
            if el.text_content().as_deref() != Some(text) {
                el.set_text_content(Some(text));
            }
        }
    }

    fn set_visible(document: &Document, id: &str, visible: bool) {
        if let Some(el) = document.get_element_by_id(id) {
            let _ = el.class_list().toggle_with_force("hidden", !visible);
        }
    }

    /// Resolve a level request through the oracle, off the frame loop
    fn request_level(game: Rc<RefCell<Game>>, request: Option<LevelRequest>) {
        let Some(request) = request else { return };
        let oracle = game.borrow().settings.oracle.clone();
        wasm_bindgen_futures::spawn_local(async move {
            let result = fetch_level(&oracle, request.level).await;
            game.borrow_mut().session.deliver_level(request, result);
        });
    }

    pub async fn run() {
        console_error_panic_hook::set_once();
        console_log::init_with_level(log::Level::Info).expect("Failed to init logger");

        log::info!("Crypto Breakout starting...");

        let window = web_sys::window().expect("no window");
        let document = window.document().expect("no document");

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .expect("no canvas")
            .dyn_into()
            .expect("not a canvas");

        let renderer = CanvasRenderer::new(canvas.clone()).expect("Failed to create 2d context");
        let settings = Settings::load();
        if !settings.oracle.is_configured() {
            log::warn!("No oracle endpoint configured, levels will be generated locally");
        }

        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, renderer, settings)));
        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(&canvas, game.clone());
        setup_buttons(game.clone());
        setup_clock(game.clone());
        setup_focus_mute(game.clone());

        request_animation_frame(game);

        log::info!("Crypto Breakout running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Mouse move - absolute position scaled to field units
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                let rect = canvas_clone.get_bounding_client_rect();
                let x = pointer_to_field_x(event.client_x() as f64, rect.left(), rect.width());
                game.borrow_mut().session.set_pointer_x(x);
            });
            let _ = canvas
                .add_event_listener_with_callback("mousemove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Mouse click - launch
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                game.borrow_mut().launch();
            });
            let _ = canvas
                .add_event_listener_with_callback("mousedown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch move
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x =
                        pointer_to_field_x(touch.client_x() as f64, rect.left(), rect.width());
                    game.borrow_mut().session.set_pointer_x(x);
                }
            });
            let _ = canvas
                .add_event_listener_with_callback("touchmove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Touch start (launch)
        {
            let game = game.clone();
            let canvas_clone = canvas.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: TouchEvent| {
                event.prevent_default();
                let mut g = game.borrow_mut();
                if let Some(touch) = event.touches().get(0) {
                    let rect = canvas_clone.get_bounding_client_rect();
                    let x =
                        pointer_to_field_x(touch.client_x() as f64, rect.left(), rect.width());
                    g.session.set_pointer_x(x);
                }
                g.launch();
            });
            let _ = canvas
                .add_event_listener_with_callback("touchstart", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let window = web_sys::window().unwrap();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    " " => {
                        event.prevent_default();
                        g.launch();
                    }
                    "m" | "M" => g.toggle_mute(),
                    "i" | "I" => {
                        g.idle_mode = !g.idle_mode;
                        log::info!("Idle mode: {}", g.idle_mode);
                    }
                    "Escape" => g.session.quit_to_menu(),
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let document = web_sys::window().unwrap().document().unwrap();

        let bindings: [(&str, fn(&mut Session) -> Option<LevelRequest>); 5] = [
            ("start-btn", Session::start),
            ("next-btn", Session::next_level),
            ("restart-btn", Session::restart),
            ("retry-btn", Session::restart),
            ("menu-btn", |s| {
                s.quit_to_menu();
                None
            }),
        ];

        for (id, action) in bindings {
            let Some(btn) = document.get_element_by_id(id) else {
                log::warn!("Missing #{} button", id);
                continue;
            };
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                // Button presses count as the gesture that unlocks audio
                game.borrow().audio.resume();
                let request = action(&mut game.borrow_mut().session);
                request_level(game.clone(), request);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// 1 Hz wall clock for the level and run timers
    fn setup_clock(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::<dyn FnMut()>::new(move || {
            game.borrow_mut().session.second_elapsed();
        });
        let _ = window.set_interval_with_callback_and_timeout_and_arguments_0(
            closure.as_ref().unchecked_ref(),
            1000,
        );
        closure.forget();
    }

    fn setup_focus_mute(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();

        // Window blur (click outside)
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                if g.settings.mute_on_blur {
                    g.audio.silence();
                    log::info!("Audio muted (window blur)");
                }
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Focus regained
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::FocusEvent| {
                let mut g = game.borrow_mut();
                let settings = g.settings.clone();
                g.audio.apply_settings(&settings);
            });
            let _ =
                window.add_event_listener_with_callback("focus", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let window = web_sys::window().unwrap();
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, _time: f64) {
        {
            let mut g = game.borrow_mut();
            g.frame();
            if let Some(document) = web_sys::window().and_then(|w| w.document()) {
                g.update_hud(&document);
            }
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    wasm_game::run().await;
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Crypto Breakout (native) starting...");
    log::info!("Interactive play runs in the browser - serve the wasm build for the web version");

    let levels = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(3);
    let seed = std::env::args()
        .nth(2)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0xC0FFEE);

    headless::run(levels, seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopilot demo against offline levels, at a simulated 60 frames per second
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use crypto_breakout::consts::FRAMES_PER_SECOND;
    use crypto_breakout::oracle::OracleError;
    use crypto_breakout::persistence::{MemoryStore, ScoreStore};
    use crypto_breakout::platform::{format_clock, format_score};
    use crypto_breakout::session::SessionEffect;
    use crypto_breakout::sim::{GameEvent, autopilot_target};
    use crypto_breakout::{GamePhase, Leaderboard, Session, Settings};

    /// Give up on a level after this many simulated seconds
    const LEVEL_TIME_LIMIT_SECS: u64 = 900;

    pub fn run(levels: u32, seed: u64) {
        let settings = Settings::load();
        if settings.oracle.is_configured() {
            log::info!("Oracle endpoint configured, but the native runner only plays offline levels");
        }

        let mut store = MemoryStore::new();
        let mut session = Session::new(seed, store.best_score());
        let mut request = session.start();

        while let Some(req) = request.take() {
            session.deliver_level::<OracleError>(req, Err(OracleError::NotConfigured));
            play_level(&mut session, &mut store);

            match session.phase() {
                GamePhase::Victory if session.level() < levels => {
                    request = session.next_level();
                }
                GamePhase::Playing => {
                    log::warn!(
                        "Level {} not cleared after {}, stopping",
                        session.level(),
                        format_clock(LEVEL_TIME_LIMIT_SECS)
                    );
                }
                _ => {}
            }
        }

        let board = Leaderboard::for_run(session.score(), session.total_time_secs());
        log::info!(
            "Run finished: phase {:?}, level {}, score {}, time {}, best {}",
            session.phase(),
            session.level(),
            format_score(session.score()),
            format_clock(session.total_time_secs()),
            format_score(store.best_score().unwrap_or(0))
        );
        for (rank, entry) in board.entries.iter().enumerate() {
            log::info!(
                "  #{} {:<10} {:>8} {}",
                rank + 1,
                entry.name,
                format_score(entry.score),
                format_clock(entry.time_secs)
            );
        }
    }

    fn play_level(session: &mut Session, store: &mut MemoryStore) {
        let mut frames: u64 = 0;
        while session.is_playing() && session.level_time_secs() < LEVEL_TIME_LIMIT_SECS {
            if let Some(field) = session.field() {
                let target = autopilot_target(field);
                let resting = !field.ball.active;
                session.set_pointer_x(target);
                if resting {
                    session.launch();
                }
            }

            for event in session.frame() {
                match event {
                    GameEvent::BrickDestroyed { kind, value, .. } => {
                        log::debug!("{} destroyed (+{})", kind.ticker(), value);
                    }
                    GameEvent::LifeLost { lives_remaining } => {
                        log::info!("Life lost, {} remaining", lives_remaining);
                    }
                    GameEvent::GameOver | GameEvent::LevelCleared => {}
                }
            }

            for effect in session.drain_effects() {
                if let SessionEffect::SaveBestScore(score) = effect {
                    store.set_best_score(score);
                }
            }

            frames += 1;
            if frames % FRAMES_PER_SECOND as u64 == 0 {
                session.second_elapsed();
            }
        }
    }
}
