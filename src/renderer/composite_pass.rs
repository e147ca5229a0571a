use crate::post_process::PostProcessParams;
use crate::renderer::model::Mesh;
use crate::renderer::shader_manager::{CompositeUniforms, ProgramKind, ShaderManager};
use gl::types::{GLint, GLuint};

pub struct CompositePass {
    uniforms: CompositeUniforms,
}

impl CompositePass {
    pub unsafe fn new(shaders: &ShaderManager) -> CompositePass {
        CompositePass {
            uniforms: shaders.locate(ProgramKind::Composite, CompositeUniforms::locate),
        }
    }

    pub unsafe fn render(
        &self,
        shaders: &mut ShaderManager,
        quad: &Mesh,
        params: &PostProcessParams,
        scene: GLuint,
        bloom_blur: GLuint,
        viewport: (GLint, GLint),
    ) {
        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        gl::Viewport(0, 0, viewport.0, viewport.1);
        gl::Disable(gl::DEPTH_TEST);

        gl::ClearColor(0.0, 0.0, 0.0, 1.0);
        gl::Clear(gl::COLOR_BUFFER_BIT);

        if shaders.activate(ProgramKind::Composite) {
            self.uniforms.set(params, scene, bloom_blur);
            quad.draw();
        }
    }
}
