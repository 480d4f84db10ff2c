//! Star Striker entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;

    use star_striker::audio::{AudioManager, SoundEffect};
    use star_striker::consts::*;
    use star_striker::sim::{self, EntityHandle, EntityKind, GamePhase, GameState};
    use star_striker::{
        AssetStatus, CollaboratorError, HitBanner, Notifier, Scene, SessionAction, Settings,
        confirm_action, dispatch,
    };

    // Bridge to the three.js scene living in index.html
    #[wasm_bindgen(inline_js = "
        function scene() {
            const s = window.starStriker;
            if (!s) { throw new Error('scene not initialised'); }
            return s;
        }

        export function scene_add(kind, id) {
            scene().addEntity(kind, id);
        }

        export function scene_remove(kind, id) {
            scene().removeEntity(kind, id);
        }

        export function scene_pose(kind, id, x, y, z, rx, ry, rz) {
            const s = window.starStriker;
            if (s) { s.setPose(kind, id, x, y, z, rx, ry, rz); }
        }

        export function hostile_model_ready() {
            const s = window.starStriker;
            return !!(s && s.hostileReady);
        }
    ")]
    extern "C" {
        #[wasm_bindgen(catch)]
        fn scene_add(kind: &str, id: u32) -> Result<(), JsValue>;
        #[wasm_bindgen(catch)]
        fn scene_remove(kind: &str, id: u32) -> Result<(), JsValue>;
        #[allow(clippy::too_many_arguments)]
        fn scene_pose(kind: &str, id: u32, x: f32, y: f32, z: f32, rx: f32, ry: f32, rz: f32);
        fn hostile_model_ready() -> bool;
    }

    fn kind_name(handle: EntityHandle) -> &'static str {
        match handle.kind {
            EntityKind::Ship => "ship",
            EntityKind::Bullet => "bullet",
            EntityKind::Obstacle(kind) => kind.as_str(),
        }
    }

    fn js_reason(err: &JsValue) -> String {
        err.as_string()
            .or_else(|| {
                err.dyn_ref::<js_sys::Error>()
                    .map(|e| String::from(e.message()))
            })
            .unwrap_or_else(|| format!("{:?}", err))
    }

    /// Scene collaborator backed by the page's JS renderer
    struct JsScene;

    impl Scene for JsScene {
        fn add_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError> {
            scene_add(kind_name(handle), handle.id).map_err(|err| CollaboratorError::SceneAdd {
                handle,
                reason: js_reason(&err),
            })
        }

        fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError> {
            scene_remove(kind_name(handle), handle.id).map_err(|err| {
                CollaboratorError::SceneRemove {
                    handle,
                    reason: js_reason(&err),
                }
            })
        }
    }

    /// DOM HUD plus sound effects
    struct Hud {
        audio: AudioManager,
        banner: HitBanner,
        show_hit_banner: bool,
    }

    impl Hud {
        fn set_text(&self, id: &str, text: &str, event: &'static str) -> Result<(), CollaboratorError> {
            let el = document()
                .and_then(|d| d.get_element_by_id(id))
                .ok_or_else(|| CollaboratorError::Notifier {
                    event,
                    reason: format!("missing #{} element", id),
                })?;
            el.set_text_content(Some(text));
            Ok(())
        }

        fn set_visible(&self, id: &str, visible: bool) {
            if let Some(el) = document().and_then(|d| d.get_element_by_id(id)) {
                let _ = el.set_attribute("class", if visible { "" } else { "hidden" });
            }
        }

        fn hide_banner(&mut self) {
            self.banner.clear();
            self.set_visible("hit-banner", false);
        }

        /// Play a cue outside event dispatch, logging failures like dispatch does
        fn cue(&self, effect: SoundEffect) {
            if let Err(err) = self.audio.play(effect) {
                log::warn!("Collaborator error: {}", err);
            }
        }
    }

    impl Notifier for Hud {
        fn on_score_changed(&mut self, score: u32) -> Result<(), CollaboratorError> {
            self.set_text("score", &score.to_string(), "score_changed")
        }

        fn on_health_changed(&mut self, health: u8) -> Result<(), CollaboratorError> {
            self.set_text("health", &health.to_string(), "health_changed")
        }

        fn on_player_hit(&mut self, remaining: u8) -> Result<(), CollaboratorError> {
            if self.show_hit_banner {
                let text = self.banner.show(remaining, now_ms()).map(str::to_owned);
                if let Some(message) = text {
                    self.set_text("hit-banner", &message, "player_hit")?;
                    self.set_visible("hit-banner", true);
                }
            }
            self.audio.play(SoundEffect::PlayerHit)
        }

        fn on_game_over(&mut self, final_score: u32) -> Result<(), CollaboratorError> {
            self.hide_banner();
            self.set_text("final-score", &final_score.to_string(), "game_over")?;
            self.set_visible("game-over", true);
            self.audio.play(SoundEffect::GameOver)
        }

        fn on_shot_fired(&mut self) -> Result<(), CollaboratorError> {
            self.audio.play(SoundEffect::Shot)
        }

        fn on_obstacle_destroyed(&mut self, _handle: EntityHandle) -> Result<(), CollaboratorError> {
            self.audio.play(SoundEffect::Explosion)
        }
    }

    fn document() -> Option<web_sys::Document> {
        web_sys::window().and_then(|w| w.document())
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Game instance holding all state
    struct Game {
        state: GameState,
        assets: AssetStatus,
        scene: JsScene,
        hud: Hud,
        settings: Settings,
        accumulator: f32,
        last_time: f64,
    }

    impl Game {
        fn new(seed: u64, settings: Settings) -> Self {
            Self {
                state: GameState::new(seed),
                assets: AssetStatus::default(),
                scene: JsScene,
                hud: Hud {
                    audio: AudioManager::new(&settings),
                    banner: HitBanner::default(),
                    show_hit_banner: settings.show_hit_banner,
                },
                settings,
                accumulator: 0.0,
                last_time: 0.0,
            }
        }

        /// Run simulation ticks
        fn update(&mut self, dt: f32, now: f64) {
            if !self.assets.hostile_craft && hostile_model_ready() {
                self.assets.hostile_craft = true;
                log::info!("Hostile craft model loaded");
            }

            if self.hud.banner.expire(now) {
                self.hud.set_visible("hit-banner", false);
            }

            sim::try_spawn(&mut self.state, now, &self.assets);

            let dt = dt.min(0.1);
            self.accumulator += dt;

            let mut substeps = 0;
            while self.accumulator >= SIM_DT && substeps < MAX_SUBSTEPS {
                sim::update(&mut self.state);
                self.accumulator -= SIM_DT;
                substeps += 1;
            }
            if substeps == MAX_SUBSTEPS {
                // Drop the backlog rather than spiral
                self.accumulator = 0.0;
            }

            self.flush_events();
        }

        fn flush_events(&mut self) {
            let events = self.state.drain_events();
            let errors = dispatch(events, &mut self.scene, &mut self.hud);
            if !errors.is_empty() {
                log::debug!("{} collaborator error(s) this frame", errors.len());
            }
        }

        /// Push poses to the scene
        fn sync_scene(&self) {
            let ship = self.state.ship();
            if self.state.phase != GamePhase::Menu {
                scene_pose(
                    "ship",
                    ship.handle.id,
                    ship.pos.x,
                    ship.pos.y,
                    ship.pos.z,
                    ship.rotation.x,
                    ship.rotation.y,
                    ship.rotation.z,
                );
            }
            for bullet in self.state.bullets() {
                let p = bullet.pos;
                scene_pose("bullet", bullet.handle.id, p.x, p.y, p.z, 0.0, 0.0, 0.0);
            }
            for obstacle in self.state.obstacles() {
                let p = obstacle.pos;
                let r = obstacle.spin;
                scene_pose(obstacle.kind.as_str(), obstacle.handle.id, p.x, p.y, p.z, r.x, r.y, r.z);
            }
        }

        fn start(&mut self) {
            self.hud.audio.resume();
            self.hud.set_visible("menu", false);
            self.hud.set_visible("game-over", false);
            self.hud.hide_banner();
            self.hud.set_visible("hud", true);
            sim::start(&mut self.state, now_ms());
            self.hud.cue(SoundEffect::Launch);
            self.flush_events();
        }

        fn confirm(&mut self) {
            match confirm_action(self.state.phase) {
                Some(SessionAction::Start) => self.start(),
                Some(SessionAction::Restart) => self.restart(),
                None => log::debug!("Confirm ignored while playing"),
            }
        }

        fn toggle_mute(&mut self) {
            self.settings.muted = !self.settings.muted;
            self.hud.audio.apply_settings(&self.settings);
            self.settings.save();
            log::info!("Muted: {}", self.settings.muted);
        }

        fn restart(&mut self) {
            self.hud.set_visible("game-over", false);
            self.hud.hide_banner();
            sim::reset(&mut self.state, now_ms());
            self.hud.cue(SoundEffect::Launch);
            self.flush_events();
        }
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if let Err(err) = console_log::init_with_level(log::Level::Info) {
            web_sys::console::error_1(&format!("Logger init failed: {}", err).into());
        }

        log::info!("Star Striker starting...");

        let Some(document) = document() else {
            log::error!("No document, cannot start");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let settings = Settings::load();
        let seed = js_sys::Date::now() as u64;
        let game = Rc::new(RefCell::new(Game::new(seed, settings)));

        log::info!("Game initialized with seed: {}", seed);

        setup_input_handlers(game.clone());
        setup_buttons(game.clone());
        setup_focus_loss(game.clone());

        request_animation_frame(game);

        log::info!("Star Striker running!");
    }

    fn setup_input_handlers(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };

        // Key down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                let mut g = game.borrow_mut();
                let key = event.key();
                if key == "m" || key == "M" {
                    g.toggle_mute();
                    return;
                }
                if key == "Enter" {
                    g.confirm();
                    return;
                }
                if g.state.input.set_held_dom(&key, true) {
                    // Keep arrows and space from scrolling the page
                    event.prevent_default();
                }
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Key up
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::KeyboardEvent| {
                game.borrow_mut().state.input.set_held_dom(&event.key(), false);
            });
            let _ =
                window.add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(game: Rc<RefCell<Game>>) {
        let Some(document) = document() else { return };

        if let Some(btn) = document.get_element_by_id("start-btn") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                if confirm_action(g.state.phase) == Some(SessionAction::Start) {
                    g.start();
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("restart-btn") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let mut g = game.borrow_mut();
                if confirm_action(g.state.phase) == Some(SessionAction::Restart) {
                    g.restart();
                    log::info!("Game restarted");
                }
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    /// Drop held keys when focus leaves, so the ship doesn't keep drifting
    fn setup_focus_loss(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let Some(document) = document() else { return };

        {
            let game = game.clone();
            let document_clone = document.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                if document_clone.visibility_state() == web_sys::VisibilityState::Hidden {
                    game.borrow_mut().state.input.release_all();
                    log::debug!("Input released (tab hidden)");
                }
            });
            let _ = document.add_event_listener_with_callback(
                "visibilitychange",
                closure.as_ref().unchecked_ref(),
            );
            closure.forget();
        }

        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().state.input.release_all();
                log::debug!("Input released (window blur)");
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else { return };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                SIM_DT
            };
            g.last_time = time;

            g.update(dt, time);
            g.sync_scene();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Star Striker (native) starting...");
    log::info!("Native mode is headless - serve the web build to play");

    let seed = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse().ok())
        .unwrap_or(0x5747_5253);
    headless::run(seed);
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Autopilot session with logging collaborators
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use star_striker::consts::SIM_DT;
    use star_striker::sim::{self, EntityHandle, GameState, Key, TickOutcome};
    use star_striker::{AssetStatus, CollaboratorError, Notifier, Scene, dispatch};

    /// Give up after this much simulated time
    const MAX_SECONDS: u32 = 180;

    #[derive(Default)]
    struct CountingScene {
        live: usize,
    }

    impl Scene for CountingScene {
        fn add_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError> {
            log::trace!("+ {}", handle);
            self.live += 1;
            Ok(())
        }

        fn remove_entity(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError> {
            log::trace!("- {}", handle);
            self.live = self.live.saturating_sub(1);
            Ok(())
        }
    }

    #[derive(Default)]
    struct LogHud {
        shots: u32,
        kills: u32,
    }

    impl Notifier for LogHud {
        fn on_score_changed(&mut self, score: u32) -> Result<(), CollaboratorError> {
            log::debug!("Score: {}", score);
            Ok(())
        }

        fn on_health_changed(&mut self, health: u8) -> Result<(), CollaboratorError> {
            log::debug!("Health: {}", health);
            Ok(())
        }

        fn on_player_hit(&mut self, remaining: u8) -> Result<(), CollaboratorError> {
            if let Some(message) = sim::hits_remaining_message(remaining) {
                log::info!("{}", message);
            }
            Ok(())
        }

        fn on_game_over(&mut self, final_score: u32) -> Result<(), CollaboratorError> {
            log::info!("GAME OVER - final score {}", final_score);
            Ok(())
        }

        fn on_shot_fired(&mut self) -> Result<(), CollaboratorError> {
            self.shots += 1;
            Ok(())
        }

        fn on_obstacle_destroyed(&mut self, handle: EntityHandle) -> Result<(), CollaboratorError> {
            self.kills += 1;
            log::debug!("Destroyed {}", handle);
            Ok(())
        }
    }

    pub fn run(seed: u64) {
        let mut state = GameState::new(seed);
        let assets = AssetStatus::all_ready();
        let mut scene = CountingScene::default();
        let mut hud = LogHud::default();

        let frame_ms = f64::from(SIM_DT) * 1000.0;
        let mut now = 0.0;
        sim::start(&mut state, now);
        state.input.set_held(Key::Fire, true);

        let max_ticks = MAX_SECONDS * star_striker::consts::SIM_HZ;
        for tick in 0..max_ticks {
            now += frame_ms;

            // Weave left and right every two seconds
            let going_left = (tick / 120) % 2 == 0;
            state.input.set_held(Key::Left, going_left);
            state.input.set_held(Key::Right, !going_left);

            sim::try_spawn(&mut state, now, &assets);
            let outcome = sim::update(&mut state);

            let errors = dispatch(state.drain_events(), &mut scene, &mut hud);
            for err in &errors {
                log::error!("{}", err);
            }

            if outcome == TickOutcome::GameOver {
                break;
            }
        }

        log::info!(
            "Session over after {:.1}s: score {}, {} shots, {} kills, {} entities in scene",
            state.time_ticks as f32 * SIM_DT,
            state.score,
            hud.shots,
            hud.kills,
            scene.live
        );
    }
}
