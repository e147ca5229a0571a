use crate::post_process::{BlurAxis, Image};
use crate::renderer::framebuffer::{blur_schedule, BlurSchedule, BlurSource, PingPongPair};
use crate::renderer::model::Mesh;
use crate::renderer::shader_manager::{BlurUniforms, ProgramKind, ShaderManager};
use gl::types::{GLint, GLuint};

pub struct BloomPass {
    pair: PingPongPair,
    uniforms: BlurUniforms,
    schedule: BlurSchedule,
}

impl BloomPass {
    pub unsafe fn new(shaders: &mut ShaderManager, width: GLint, height: GLint, iterations: u32) -> BloomPass {
        let uniforms = shaders.locate(ProgramKind::Blur, BlurUniforms::locate);

        if shaders.activate(ProgramKind::Blur) {
            uniforms.set_constants();
        }

        BloomPass {
            pair: PingPongPair::new(width, height),
            uniforms,
            schedule: blur_schedule(iterations),
        }
    }

    pub fn schedule(&self) -> &BlurSchedule {
        &self.schedule
    }

    pub fn is_complete(&self) -> bool {
        self.pair.is_complete()
    }

    pub fn resize(&mut self, width: GLint, height: GLint) {
        self.pair.resize(width, height);
    }

    /// Runs every scheduled iteration and returns the texture holding the final blur. With no
    /// iterations the bright-pass texture itself is returned.
    pub unsafe fn render(&self, shaders: &mut ShaderManager, quad: &Mesh, bright_pass: GLuint) -> GLuint {
        gl::Disable(gl::DEPTH_TEST);

        if !shaders.activate(ProgramKind::Blur) {
            return bright_pass;
        }

        for step in self.schedule.steps.iter() {
            let source = match step.source {
                BlurSource::BrightPass => bright_pass,
                BlurSource::PingPong(buffer) => self.pair.texture(buffer),
            };

            self.pair.target(step.target).bind();
            self.uniforms
                .set_pass(step.axis == BlurAxis::Horizontal, source);
            quad.draw();
        }

        gl::BindFramebuffer(gl::FRAMEBUFFER, 0);

        match self.schedule.last_written {
            Some(buffer) => self.pair.texture(buffer),
            None => bright_pass,
        }
    }
}

/// Host-side counterpart of `BloomPass::render`: walks `schedule` over two images.
pub fn blur_reference(bright_pass: &Image, schedule: &BlurSchedule) -> Image {
    let black = Image::filled(bright_pass.width, bright_pass.height, Default::default());
    let mut buffers = [black.clone(), black];

    for step in schedule.steps.iter() {
        let blurred = match step.source {
            BlurSource::BrightPass => bright_pass.blur(step.axis),
            BlurSource::PingPong(buffer) => buffers[buffer.index()].blur(step.axis),
        };

        buffers[step.target.index()] = blurred;
    }

    match schedule.last_written {
        Some(buffer) => buffers[buffer.index()].clone(),
        None => bright_pass.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::renderer::framebuffer::PingPongBuffer;
    use glam::Vec3;

    fn impulse(size: usize) -> Image {
        let mut image = Image::filled(size, size, Vec3::ZERO);
        image.set(size / 2, size / 2, Vec3::splat(10.0));
        image
    }

    #[test]
    fn reference_blur_spreads_in_both_axes() {
        let blurred = blur_reference(&impulse(15), &blur_schedule(10));
        let centre = 7;

        assert!(blurred.get(centre + 3, centre).x > 0.0);
        assert!(blurred.get(centre, centre + 3).x > 0.0);
        assert!(blurred.get(centre, centre).x < 10.0);
    }

    #[test]
    fn reference_blur_reads_the_last_written_buffer() {
        let schedule = blur_schedule(2);
        let image = impulse(9);

        let expected = image.blur(BlurAxis::Horizontal).blur(BlurAxis::Vertical);

        assert_eq!(blur_reference(&image, &schedule), expected);
    }

    #[test]
    fn odd_iteration_counts_end_in_buffer_b() {
        assert_eq!(blur_schedule(1).last_written, Some(PingPongBuffer::B));
        assert_eq!(blur_schedule(9).last_written, Some(PingPongBuffer::B));
        assert_eq!(blur_schedule(10).last_written, Some(PingPongBuffer::A));
    }

    #[test]
    fn no_iterations_pass_the_bright_image_through() {
        let image = impulse(5);
        assert_eq!(blur_reference(&image, &blur_schedule(0)), image);
    }
}
