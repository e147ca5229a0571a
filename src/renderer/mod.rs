pub mod bloom_pass;
pub mod composite_pass;
pub mod framebuffer;
pub mod model;
pub mod model_manager;
pub mod scene_pass;
pub mod shader_manager;
pub mod shaders;
pub mod texture_manager;

pub use self::shader_manager::ProgramKind;

use self::bloom_pass::BloomPass;
use self::composite_pass::CompositePass;
use self::model::Mesh;
use self::model_manager::ModelManager;
use self::scene_pass::{SceneFrame, ScenePass};
use self::shader_manager::ShaderManager;
use self::texture_manager::{cube_face_paths, TextureManager};
use crate::config::ViewerConfig;
use crate::error::Result;
use crate::scene::{DrawableInstance, GeometryBatch, ModelHandle, SceneModel};
use crate::state::ProgramState;
use gl::types::GLint;
use std::path::Path;

pub const SKYBOX_DIR: &str = "textures/skybox";

/// Stages of one frame, always run in this order.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FrameStage {
    SceneRender,
    BloomBlur,
    Composite,
    UiOverlay,
    Present,
}

impl FrameStage {
    pub const SEQUENCE: [FrameStage; 5] = [
        FrameStage::SceneRender,
        FrameStage::BloomBlur,
        FrameStage::Composite,
        FrameStage::UiOverlay,
        FrameStage::Present,
    ];

    pub fn next(self) -> Option<FrameStage> {
        match self {
            FrameStage::SceneRender => Some(FrameStage::BloomBlur),
            FrameStage::BloomBlur => Some(FrameStage::Composite),
            FrameStage::Composite => Some(FrameStage::UiOverlay),
            FrameStage::UiOverlay => Some(FrameStage::Present),
            FrameStage::Present => None,
        }
    }
}

/// Drawn on top of the composited frame. Edits made here are seen by the next frame.
pub trait Overlay {
    fn draw(&mut self, state: &mut ProgramState);
}

pub struct Renderer {
    shader_manager: ShaderManager,
    model_manager: ModelManager,
    texture_manager: TextureManager,
    scene_pass: ScenePass,
    bloom_pass: BloomPass,
    composite_pass: CompositePass,
    screen_quad: Mesh,
    window_size: (GLint, GLint),
    bloom_threshold: f32,
}

impl Renderer {
    /// Requires a current GL context with loaded function pointers.
    pub unsafe fn new(config: &ViewerConfig) -> Result<Renderer> {
        let mut shader_manager = ShaderManager::new();
        shader_manager.load_all()?;

        let mut texture_manager = TextureManager::new();
        let faces = cube_face_paths(&config.resource(SKYBOX_DIR), "jpg");
        let cube_map = texture_manager.load_cube_map("skybox", &faces);

        let (width, height) = (config.width as GLint, config.height as GLint);

        let scene_pass = ScenePass::new(&shader_manager, width, height, Some(cube_map));
        let bloom_pass = BloomPass::new(&mut shader_manager, width, height, config.blur_passes);
        let composite_pass = CompositePass::new(&shader_manager);

        let (vertices, indices) = model::screen_quad();
        let screen_quad = Mesh::new(gl::TRIANGLE_STRIP, &vertices, &indices);

        log::info!(
            "Renderer ready at {}x{} with {} blur passes",
            width,
            height,
            bloom_pass.schedule().steps.len()
        );

        Ok(Renderer {
            shader_manager,
            model_manager: ModelManager::new(),
            texture_manager,
            scene_pass,
            bloom_pass,
            composite_pass,
            screen_quad,
            window_size: (width, height),
            bloom_threshold: config.bloom_threshold,
        })
    }

    pub fn load_model(&mut self, path: &Path) -> Result<ModelHandle> {
        self.model_manager.load_model(path, &mut self.texture_manager)
    }

    pub fn load_scene(&mut self, config: &ViewerConfig) -> Result<GeometryBatch> {
        let mut batch = GeometryBatch::new();

        for role in SceneModel::ALL {
            let handle = self.load_model(&config.resource(role.asset_path()))?;
            batch.push(DrawableInstance::new(role, handle));
        }

        Ok(batch)
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.window_size.0 as f32 / self.window_size.1.max(1) as f32
    }

    /// True when the HDR target and both blur buffers passed their completeness check.
    pub fn is_complete(&self) -> bool {
        self.scene_pass.target().is_complete() && self.bloom_pass.is_complete()
    }

    /// Reallocates the offscreen targets. Only called on resize events.
    pub fn resize(&mut self, width: u32, height: u32) {
        let size = (width.max(1) as GLint, height.max(1) as GLint);

        if size == self.window_size {
            return;
        }

        log::info!("Resizing render targets to {}x{}", size.0, size.1);

        self.window_size = size;
        self.scene_pass.resize(size.0, size.1);
        self.bloom_pass.resize(size.0, size.1);
    }

    pub unsafe fn present(
        &mut self,
        state: &mut ProgramState,
        batch: &GeometryBatch,
        mut overlay: Option<&mut dyn Overlay>,
        swap: &mut dyn FnMut(),
    ) {
        let mut bloom_texture = self.scene_pass.bright_texture();
        let mut stage = Some(FrameStage::SceneRender);

        while let Some(current) = stage {
            log::trace!("Frame stage {:?}", current);

            match current {
                FrameStage::SceneRender => {
                    let frame = SceneFrame {
                        view: state.camera.view_matrix(),
                        projection: state.camera.projection_matrix(self.aspect_ratio()),
                        camera_position: state.camera.position,
                        lights: &state.lights,
                        clear_color: state.clear_color,
                        bloom_threshold: self.bloom_threshold,
                    };

                    self.scene_pass.render(
                        &mut self.shader_manager,
                        &self.model_manager,
                        batch,
                        &frame,
                    );
                }
                FrameStage::BloomBlur => {
                    bloom_texture = self.bloom_pass.render(
                        &mut self.shader_manager,
                        &self.screen_quad,
                        self.scene_pass.bright_texture(),
                    );
                }
                FrameStage::Composite => {
                    self.composite_pass.render(
                        &mut self.shader_manager,
                        &self.screen_quad,
                        &state.post,
                        self.scene_pass.scene_texture(),
                        bloom_texture,
                        self.window_size,
                    );
                }
                FrameStage::UiOverlay => {
                    if let Some(overlay) = overlay.as_mut() {
                        if state.ui_enabled {
                            overlay.draw(state);
                        }
                    }
                }
                FrameStage::Present => swap(),
            }

            stage = current.next();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn stages_follow_the_fixed_sequence() {
        let mut walked = vec![FrameStage::SceneRender];

        while let Some(next) = walked.last().and_then(|s| s.next()) {
            walked.push(next);
        }

        assert_eq!(walked, FrameStage::SEQUENCE.to_vec());
    }

    #[test]
    fn present_is_terminal() {
        assert_eq!(FrameStage::Present.next(), None);
        assert_eq!(FrameStage::SEQUENCE.iter().filter(|s| s.next().is_none()).count(), 1);
    }
}
