use crate::light::LightingState;
use crate::renderer::framebuffer::{ColorFormat, FramebufferTarget};
use crate::renderer::model::{self, Mesh};
use crate::renderer::model_manager::ModelManager;
use crate::renderer::shader_manager::{ProgramKind, SceneUniforms, ShaderManager, SkyboxUniforms};
use crate::scene::{CullMode, GeometryBatch};
use gl::types::{GLenum, GLint, GLuint};
use glam::{Mat3, Mat4, Vec3, Vec4};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DepthFunc {
    Less,
    LessEqual,
}

impl DepthFunc {
    pub fn gl_enum(self) -> GLenum {
        match self {
            DepthFunc::Less => gl::LESS,
            DepthFunc::LessEqual => gl::LEQUAL,
        }
    }

    pub fn passes(self, incoming: f32, stored: f32) -> bool {
        match self {
            DepthFunc::Less => incoming < stored,
            DepthFunc::LessEqual => incoming <= stored,
        }
    }
}

/// Depth the scene target is cleared to; the skybox is drawn exactly at this depth.
pub const CLEARED_DEPTH: f32 = 1.0;

pub fn skybox_view(view: &Mat4) -> Mat4 {
    Mat4::from_mat3(Mat3::from_mat4(*view))
}

/// Clip position the skybox vertex shader emits: z is replaced by w so the
/// projected depth is always the far plane.
pub fn skybox_clip_position(projection: &Mat4, view: &Mat4, vertex: Vec3) -> Vec4 {
    let pos = *projection * skybox_view(view) * vertex.extend(1.0);
    Vec4::new(pos.x, pos.y, pos.w, pos.w)
}

unsafe fn apply_cull_mode(mode: CullMode) {
    match mode {
        CullMode::None => gl::Disable(gl::CULL_FACE),
        CullMode::Back => {
            gl::Enable(gl::CULL_FACE);
            gl::CullFace(gl::BACK);
        }
        CullMode::Front => {
            gl::Enable(gl::CULL_FACE);
            gl::CullFace(gl::FRONT);
        }
    }
}

pub struct SceneFrame<'a> {
    pub view: Mat4,
    pub projection: Mat4,
    pub camera_position: Vec3,
    pub lights: &'a LightingState,
    pub clear_color: Vec3,
    pub bloom_threshold: f32,
}

/// Lit geometry into a two-attachment float target: colour in 0, bright-pass in 1.
pub struct ScenePass {
    target: FramebufferTarget,
    uniforms: SceneUniforms,
    skybox_uniforms: SkyboxUniforms,
    skybox_mesh: Mesh,
    skybox_cube_map: Option<GLuint>,
}

impl ScenePass {
    pub unsafe fn new(shaders: &ShaderManager, width: GLint, height: GLint, skybox_cube_map: Option<GLuint>) -> ScenePass {
        let (vertices, indices) = model::skybox_cube();

        ScenePass {
            target: FramebufferTarget::new(
                "hdr scene",
                width,
                height,
                &[ColorFormat::Rgba16F, ColorFormat::Rgba16F],
                true,
            ),
            uniforms: shaders.locate(ProgramKind::Scene, SceneUniforms::locate),
            skybox_uniforms: shaders.locate(ProgramKind::Skybox, SkyboxUniforms::locate),
            skybox_mesh: Mesh::new(gl::TRIANGLES, &vertices, &indices),
            skybox_cube_map,
        }
    }

    pub fn target(&self) -> &FramebufferTarget {
        &self.target
    }

    pub fn scene_texture(&self) -> GLuint {
        self.target.color_texture(0)
    }

    pub fn bright_texture(&self) -> GLuint {
        self.target.color_texture(1)
    }

    pub fn resize(&mut self, width: GLint, height: GLint) {
        self.target.resize(width, height);
    }

    pub unsafe fn render(
        &self,
        shaders: &mut ShaderManager,
        models: &ModelManager,
        batch: &GeometryBatch,
        frame: &SceneFrame,
    ) {
        self.target.bind();

        gl::ClearColor(frame.clear_color.x, frame.clear_color.y, frame.clear_color.z, 1.0);
        gl::Clear(gl::COLOR_BUFFER_BIT | gl::DEPTH_BUFFER_BIT);
        gl::Enable(gl::DEPTH_TEST);
        gl::DepthFunc(DepthFunc::Less.gl_enum());

        if shaders.activate(ProgramKind::Scene) {
            self.uniforms
                .set_camera(&frame.view, &frame.projection, frame.camera_position);
            self.uniforms.set_lights(frame.lights);
            self.uniforms.set_bloom_threshold(frame.bloom_threshold);

            for instance in batch.iter() {
                if instance.program != ProgramKind::Scene {
                    log::debug!("Skipping {:?}, drawn with {:?}", instance.role, instance.program);
                    continue;
                }

                let model = match models.get_model(instance.model) {
                    Some(m) => m,
                    None => continue,
                };

                apply_cull_mode(instance.cull_mode);
                self.uniforms.set_model(&instance.transform.matrix());
                model.draw(&self.uniforms.material);
                apply_cull_mode(CullMode::None);
            }
        }

        if let Some(cube_map) = self.skybox_cube_map {
            if shaders.activate(ProgramKind::Skybox) {
                gl::DepthFunc(DepthFunc::LessEqual.gl_enum());
                self.skybox_uniforms
                    .set(&skybox_view(&frame.view), &frame.projection, cube_map);
                self.skybox_mesh.draw();
                gl::DepthFunc(DepthFunc::Less.gl_enum());
            }
        }
    }
}
