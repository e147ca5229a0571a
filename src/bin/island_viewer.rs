use glutin::config::{Config, ConfigTemplateBuilder};
use glutin::context::{ContextApi, ContextAttributesBuilder, GlProfile, Version};
use glutin::display::GetGlDisplay;
use glutin::prelude::*;
use glutin::surface::{SurfaceAttributesBuilder, SwapInterval, WindowSurface};
use glutin_winit::{DisplayBuilder, GlWindow};
use island_viewer::app::{key_binding, Action, AppContext, Binding};
use island_viewer::config::ViewerConfig;
use island_viewer::renderer::{Overlay, Renderer};
use island_viewer::state::ProgramState;
use island_viewer::{Result, ViewerError};
use raw_window_handle::HasRawWindowHandle;
use std::ffi::CString;
use std::num::NonZeroU32;
use winit::dpi::PhysicalSize;
use winit::event::{ElementState, Event, KeyboardInput, MouseScrollDelta, WindowEvent};
use winit::event_loop::EventLoop;
use winit::window::{Window, WindowBuilder};

struct TitleOverlay<'a> {
    window: &'a Window,
    title: &'a str,
}

impl<'a> Overlay for TitleOverlay<'a> {
    fn draw(&mut self, state: &mut ProgramState) {
        let p = state.camera.position;

        self.window.set_title(&format!(
            "{} | camera ({:.2}, {:.2}, {:.2}) | {} | spot {} | exposure {:.2} gamma {:.2} | hdr {} | bloom {}",
            self.title,
            p.x,
            p.y,
            p.z,
            state.lights.specular_model.label(),
            on_off(state.lights.spot_enabled),
            state.post.exposure,
            state.post.gamma,
            on_off(state.post.hdr),
            on_off(state.post.bloom),
        ));
    }
}

fn on_off(flag: bool) -> &'static str {
    match flag {
        true => "on",
        false => "off",
    }
}

/// The picker has to hand back a config, so an empty offer ends the process here.
fn pick_config(configs: Box<dyn Iterator<Item = Config> + '_>) -> Config {
    let best = configs.reduce(|best, config| match config.num_samples() > best.num_samples() {
        true => config,
        false => best,
    });

    match best {
        Some(config) => config,
        None => {
            log::error!("{}", ViewerError::Context("display offered no GL configs".to_string()));
            std::process::exit(1);
        }
    }
}

fn run() -> Result<()> {
    let mut config = ViewerConfig::default();

    if let Some(root) = std::env::args().nth(1) {
        let state_file = std::path::Path::new(&root).join("program_state.txt");
        config = config.with_resource_root(root).with_state_file(state_file);
    }

    let event_loop = EventLoop::new();
    let window_builder = WindowBuilder::new()
        .with_title(config.title.clone())
        .with_inner_size(PhysicalSize::new(config.width, config.height));

    let template = ConfigTemplateBuilder::new().with_depth_size(24);
    let (window, gl_config) = DisplayBuilder::new()
        .with_window_builder(Some(window_builder))
        .build(&event_loop, template, pick_config)
        .map_err(|e| ViewerError::Context(e.to_string()))?;

    let window = window.ok_or_else(|| ViewerError::Context("no window was created".to_string()))?;
    let gl_display = gl_config.display();

    let context_attributes = ContextAttributesBuilder::new()
        .with_context_api(ContextApi::OpenGl(Some(Version::new(3, 3))))
        .with_profile(GlProfile::Core)
        .build(Some(window.raw_window_handle()));

    let not_current = unsafe { gl_display.create_context(&gl_config, &context_attributes)? };
    let surface_attributes = window.build_surface_attributes(SurfaceAttributesBuilder::<WindowSurface>::new());
    let gl_surface = unsafe { gl_display.create_window_surface(&gl_config, &surface_attributes)? };
    let gl_context = not_current.make_current(&gl_surface)?;

    gl::load_with(|symbol| match CString::new(symbol) {
        Ok(symbol) => gl_display.get_proc_address(&symbol).cast(),
        Err(_) => std::ptr::null(),
    });

    let interval = match config.vsync {
        true => SwapInterval::Wait(NonZeroU32::MIN),
        false => SwapInterval::DontWait,
    };

    if let Err(e) = gl_surface.set_swap_interval(&gl_context, interval) {
        log::warn!("Could not set swap interval: {}", e);
    }

    let mut renderer = unsafe { Renderer::new(&config)? };

    if !renderer.is_complete() {
        log::error!("Offscreen render targets are incomplete, frames will be undefined");
    }

    let batch = renderer.load_scene(&config)?;
    let state = ProgramState::load_from_file(&config.state_file);

    window.set_cursor_visible(state.ui_enabled);

    let mut app = AppContext::new(config, state, batch);

    log::info!("Entering render loop");

    event_loop.run(move |event, _, control_flow| {
        control_flow.set_poll();

        match event {
            Event::WindowEvent { event, .. } => match event {
                WindowEvent::CloseRequested => app.handle_action(Action::Quit),
                WindowEvent::Resized(size) => {
                    if let (Some(w), Some(h)) = (NonZeroU32::new(size.width), NonZeroU32::new(size.height)) {
                        gl_surface.resize(&gl_context, w, h);
                        renderer.resize(size.width, size.height);
                    }
                }
                WindowEvent::KeyboardInput {
                    input:
                        KeyboardInput {
                            state,
                            virtual_keycode: Some(key),
                            ..
                        },
                    ..
                } => {
                    app.key_changed(key, state == ElementState::Pressed);

                    if state == ElementState::Pressed && key_binding(key) == Some(Binding::Action(Action::ToggleUi)) {
                        window.set_cursor_visible(app.state.ui_enabled);

                        if !app.state.ui_enabled {
                            window.set_title(&app.config.title);
                        }
                    }
                }
                WindowEvent::CursorMoved { position, .. } => app.cursor_moved(position.x, position.y),
                WindowEvent::MouseWheel { delta, .. } => match delta {
                    MouseScrollDelta::LineDelta(_, y) => app.scrolled(y),
                    MouseScrollDelta::PixelDelta(p) => app.scrolled(p.y as f32 / 20.0),
                },
                _ => (),
            },
            Event::MainEventsCleared => window.request_redraw(),
            Event::RedrawRequested(_) => {
                app.update();

                let mut overlay = TitleOverlay {
                    window: &window,
                    title: &app.config.title,
                };

                let mut swap = || {
                    if let Err(e) = gl_surface.swap_buffers(&gl_context) {
                        log::error!("Failed to swap buffers: {}", e);
                    }
                };

                unsafe {
                    renderer.present(&mut app.state, &app.batch, Some(&mut overlay), &mut swap);
                }
            }
            Event::LoopDestroyed => {
                if let Err(e) = app.save_state() {
                    log::error!("Failed to save program state: {}", e);
                }
            }
            _ => (),
        }

        if !app.is_running() {
            control_flow.set_exit();
        }
    })
}

fn main() {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    if let Err(e) = run() {
        log::error!("{}", e);
        std::process::exit(1);
    }
}
