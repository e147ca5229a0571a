use crate::camera::Movement;
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::scene::GeometryBatch;
use crate::state::ProgramState;
use crate::timer::FrameClock;
use winit::event::VirtualKeyCode;

const EXPOSURE_STEP: f32 = 0.05;
const MAX_FRAME_DELTA: f32 = 0.1;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Action {
    Quit,
    ToggleUi,
    ToggleBlinn,
    ToggleSpot,
    ToggleHdr,
    ToggleBloom,
    ExposureUp,
    ExposureDown,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Binding {
    Action(Action),
    Move(Movement),
}

pub fn key_binding(key: VirtualKeyCode) -> Option<Binding> {
    let binding = match key {
        VirtualKeyCode::Escape => Binding::Action(Action::Quit),
        VirtualKeyCode::F1 => Binding::Action(Action::ToggleUi),
        VirtualKeyCode::B => Binding::Action(Action::ToggleBlinn),
        VirtualKeyCode::F => Binding::Action(Action::ToggleSpot),
        VirtualKeyCode::H => Binding::Action(Action::ToggleHdr),
        VirtualKeyCode::N => Binding::Action(Action::ToggleBloom),
        VirtualKeyCode::Up => Binding::Action(Action::ExposureUp),
        VirtualKeyCode::Down => Binding::Action(Action::ExposureDown),
        VirtualKeyCode::W => Binding::Move(Movement::Forward),
        VirtualKeyCode::S => Binding::Move(Movement::Backward),
        VirtualKeyCode::A => Binding::Move(Movement::Left),
        VirtualKeyCode::D => Binding::Move(Movement::Right),
        _ => return None,
    };

    Some(binding)
}

#[derive(Clone, Debug, Default)]
struct HeldKeys {
    forward: bool,
    backward: bool,
    left: bool,
    right: bool,
}

impl HeldKeys {
    fn set(&mut self, movement: Movement, held: bool) {
        match movement {
            Movement::Forward => self.forward = held,
            Movement::Backward => self.backward = held,
            Movement::Left => self.left = held,
            Movement::Right => self.right = held,
        }
    }

    fn active(&self) -> impl Iterator<Item = Movement> + '_ {
        [
            (self.forward, Movement::Forward),
            (self.backward, Movement::Backward),
            (self.left, Movement::Left),
            (self.right, Movement::Right),
        ]
        .into_iter()
        .filter_map(|(held, m)| held.then_some(m))
    }
}

/// Everything the event loop and the renderer share, passed explicitly to both.
pub struct AppContext {
    pub config: ViewerConfig,
    pub state: ProgramState,
    pub batch: GeometryBatch,
    pub clock: FrameClock,
    held: HeldKeys,
    last_cursor: Option<(f64, f64)>,
    running: bool,
}

impl AppContext {
    pub fn new(config: ViewerConfig, state: ProgramState, batch: GeometryBatch) -> AppContext {
        let mut clock = FrameClock::new();
        clock.set_delta_time_max_cap(MAX_FRAME_DELTA);

        AppContext {
            config,
            state,
            batch,
            clock,
            held: HeldKeys::default(),
            last_cursor: None,
            running: true,
        }
    }

    pub fn is_running(&self) -> bool {
        self.running
    }

    pub fn update(&mut self) -> f32 {
        let dt = self.clock.tick();
        self.advance(dt, self.clock.get_elapsed_time());
        dt
    }

    fn advance(&mut self, dt: f32, elapsed: f32) {
        for movement in self.held.active().collect::<Vec<_>>() {
            self.state.camera.process_keyboard(movement, dt);
        }

        let camera = &self.state.camera;
        self.state
            .lights
            .update(elapsed, camera.position, camera.front());
        self.batch.sync(&self.state.layout, &self.state.lights);
    }

    pub fn handle_action(&mut self, action: Action) {
        let state = &mut self.state;

        match action {
            Action::Quit => self.running = false,
            Action::ToggleUi => {
                state.ui_enabled = !state.ui_enabled;
                state.camera_mouse_enabled = !state.ui_enabled;
                self.last_cursor = None;
            }
            Action::ToggleBlinn => {
                state.lights.toggle_specular_model();
                log::info!("Specular model: {}", state.lights.specular_model.label());
            }
            Action::ToggleSpot => state.lights.toggle_spot(),
            Action::ToggleHdr => state.post.hdr = !state.post.hdr,
            Action::ToggleBloom => state.post.bloom = !state.post.bloom,
            Action::ExposureUp => state.post.adjust_exposure(EXPOSURE_STEP),
            Action::ExposureDown => state.post.adjust_exposure(-EXPOSURE_STEP),
        }

        log::debug!("{:?}", action);
    }

    pub fn key_changed(&mut self, key: VirtualKeyCode, pressed: bool) {
        match key_binding(key) {
            Some(Binding::Move(movement)) => self.held.set(movement, pressed),
            Some(Binding::Action(action)) if pressed => self.handle_action(action),
            _ => (),
        }
    }

    pub fn cursor_moved(&mut self, x: f64, y: f64) {
        if let Some((last_x, last_y)) = self.last_cursor {
            if self.state.camera_mouse_enabled {
                let x_offset = (x - last_x) as f32;
                let y_offset = (last_y - y) as f32;
                self.state.camera.process_mouse_movement(x_offset, y_offset);
            }
        }

        self.last_cursor = Some((x, y));
    }

    pub fn scrolled(&mut self, y_offset: f32) {
        self.state.camera.process_mouse_scroll(y_offset);
    }

    pub fn save_state(&self) -> Result<()> {
        self.state.save_to_file(&self.config.state_file)
    }
}
