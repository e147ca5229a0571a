use crate::post_process::BlurAxis;
use gl::types::{GLenum, GLint, GLsizei, GLuint};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ColorFormat {
    Rgba8,
    Rgba16F,
}

impl ColorFormat {
    fn internal_format(self) -> GLint {
        match self {
            ColorFormat::Rgba8 => gl::RGBA8 as GLint,
            ColorFormat::Rgba16F => gl::RGBA16F as GLint,
        }
    }

    fn pixel_type(self) -> GLenum {
        match self {
            ColorFormat::Rgba8 => gl::UNSIGNED_BYTE,
            ColorFormat::Rgba16F => gl::FLOAT,
        }
    }
}

/// An offscreen render target with one or more colour attachments and an optional depth
/// renderbuffer. Attachments are allocated at creation and again only on `resize`.
pub struct FramebufferTarget {
    label: &'static str,
    fbo: GLuint,
    size: (GLint, GLint),
    formats: Vec<ColorFormat>,
    color_buffers: Vec<GLuint>,
    depth_buffer: Option<GLuint>,
    complete: bool,
}

impl FramebufferTarget {
    pub fn new(
        label: &'static str,
        width: GLint,
        height: GLint,
        formats: &[ColorFormat],
        with_depth: bool,
    ) -> FramebufferTarget {
        let mut fbo = 0;

        unsafe {
            gl::GenFramebuffers(1, &mut fbo);
        }

        let mut fb = FramebufferTarget {
            label,
            fbo,
            size: (0, 0),
            formats: formats.to_vec(),
            color_buffers: vec![0; formats.len()],
            depth_buffer: match with_depth {
                true => Some(0),
                false => None,
            },
            complete: false,
        };

        fb.resize(width, height);

        fb
    }

    pub fn is_complete(&self) -> bool {
        self.complete
    }

    pub fn color_texture(&self, attachment: usize) -> GLuint {
        self.color_buffers[attachment]
    }

    pub fn bind(&self) {
        let attachments = color_attachments(self.color_buffers.len());

        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.fbo);
            gl::DrawBuffers(attachments.len() as GLsizei, attachments.as_ptr());
            gl::Viewport(0, 0, self.size.0, self.size.1);
        }
    }

    /// Reallocates every attachment. Incompleteness is logged and otherwise ignored.
    pub fn resize(&mut self, width: GLint, height: GLint) {
        if self.size == (width, height) && self.complete {
            return;
        }

        self.size = (width.max(1), height.max(1));
        let (width, height) = self.size;

        unsafe {
            gl::BindFramebuffer(gl::FRAMEBUFFER, self.fbo);

            gl::DeleteTextures(self.color_buffers.len() as GLsizei, self.color_buffers.as_ptr());
            gl::GenTextures(self.color_buffers.len() as GLsizei, self.color_buffers.as_mut_ptr());

            for (i, (texture, format)) in self.color_buffers.iter().zip(self.formats.iter()).enumerate() {
                gl::BindTexture(gl::TEXTURE_2D, *texture);
                gl::TexImage2D(
                    gl::TEXTURE_2D,
                    0,
                    format.internal_format(),
                    width,
                    height,
                    0,
                    gl::RGBA,
                    format.pixel_type(),
                    std::ptr::null(),
                );

                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR as i32);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as i32);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as i32);
                gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as i32);

                gl::FramebufferTexture2D(
                    gl::FRAMEBUFFER,
                    gl::COLOR_ATTACHMENT0 + i as GLenum,
                    gl::TEXTURE_2D,
                    *texture,
                    0,
                );
            }

            if let Some(ref mut depth_buffer) = self.depth_buffer {
                gl::DeleteRenderbuffers(1, depth_buffer);
                gl::GenRenderbuffers(1, depth_buffer);
                gl::BindRenderbuffer(gl::RENDERBUFFER, *depth_buffer);
                gl::RenderbufferStorage(gl::RENDERBUFFER, gl::DEPTH_COMPONENT24, width, height);
                gl::BindRenderbuffer(gl::RENDERBUFFER, 0);

                gl::FramebufferRenderbuffer(
                    gl::FRAMEBUFFER,
                    gl::DEPTH_ATTACHMENT,
                    gl::RENDERBUFFER,
                    *depth_buffer,
                );
            }

            let attachments = color_attachments(self.color_buffers.len());
            gl::DrawBuffers(attachments.len() as GLsizei, attachments.as_ptr());

            let status = gl::CheckFramebufferStatus(gl::FRAMEBUFFER);
            self.complete = status == gl::FRAMEBUFFER_COMPLETE;

            match self.complete {
                true => log::debug!("Framebuffer '{}' allocated at {}x{}", self.label, width, height),
                false => log::error!(
                    "Framebuffer '{}' is not complete (status 0x{:x})",
                    self.label,
                    status
                ),
            }

            gl::BindFramebuffer(gl::FRAMEBUFFER, 0);
        }
    }
}

impl Drop for FramebufferTarget {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteTextures(self.color_buffers.len() as GLsizei, self.color_buffers.as_ptr());

            if let Some(ref depth_buffer) = self.depth_buffer {
                gl::DeleteRenderbuffers(1, depth_buffer);
            }

            gl::DeleteFramebuffers(1, &self.fbo);
        }
    }
}

fn color_attachments(count: usize) -> Vec<GLenum> {
    (0..count).map(|i| gl::COLOR_ATTACHMENT0 + i as GLenum).collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum PingPongBuffer {
    A,
    B,
}

impl PingPongBuffer {
    pub fn next(self) -> PingPongBuffer {
        match self {
            PingPongBuffer::A => PingPongBuffer::B,
            PingPongBuffer::B => PingPongBuffer::A,
        }
    }

    pub fn index(self) -> usize {
        match self {
            PingPongBuffer::A => 0,
            PingPongBuffer::B => 1,
        }
    }
}

pub struct PingPongPair {
    targets: [FramebufferTarget; 2],
}

impl PingPongPair {
    pub fn new(width: GLint, height: GLint) -> PingPongPair {
        PingPongPair {
            targets: [
                FramebufferTarget::new("ping-pong A", width, height, &[ColorFormat::Rgba16F], false),
                FramebufferTarget::new("ping-pong B", width, height, &[ColorFormat::Rgba16F], false),
            ],
        }
    }

    pub fn target(&self, buffer: PingPongBuffer) -> &FramebufferTarget {
        &self.targets[buffer.index()]
    }

    pub fn texture(&self, buffer: PingPongBuffer) -> GLuint {
        self.target(buffer).color_texture(0)
    }

    pub fn is_complete(&self) -> bool {
        self.targets.iter().all(|t| t.is_complete())
    }

    pub fn resize(&mut self, width: GLint, height: GLint) {
        for target in self.targets.iter_mut() {
            target.resize(width, height);
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum BlurSource {
    BrightPass,
    PingPong(PingPongBuffer),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct BlurStep {
    pub source: BlurSource,
    pub target: PingPongBuffer,
    pub axis: BlurAxis,
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct BlurSchedule {
    pub steps: Vec<BlurStep>,
    pub last_written: Option<PingPongBuffer>,
}

/// Plans `iterations` alternating blur passes. The first pass reads the bright-pass image and
/// writes buffer B horizontally; every later pass reads the buffer written just before it.
pub fn blur_schedule(iterations: u32) -> BlurSchedule {
    let mut steps = Vec::with_capacity(iterations as usize);
    let mut target = PingPongBuffer::B;
    let mut axis = BlurAxis::Horizontal;
    let mut source = BlurSource::BrightPass;

    for _ in 0..iterations {
        steps.push(BlurStep {
            source,
            target,
            axis,
        });

        source = BlurSource::PingPong(target);
        target = target.next();
        axis = match axis {
            BlurAxis::Horizontal => BlurAxis::Vertical,
            BlurAxis::Vertical => BlurAxis::Horizontal,
        };
    }

    BlurSchedule {
        last_written: steps.last().map(|s| s.target),
        steps,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// The flag-flipping loop the schedule replaces, returning the buffer index read afterwards.
    fn flag_loop_read_index(iterations: u32) -> usize {
        let mut horizontal = true;

        for _ in 0..iterations {
            horizontal = !horizontal;
        }

        (!horizontal) as usize
    }

    #[test]
    fn next_alternates() {
        assert_eq!(PingPongBuffer::A.next(), PingPongBuffer::B);
        assert_eq!(PingPongBuffer::B.next(), PingPongBuffer::A);
        assert_eq!(PingPongBuffer::A.next().next(), PingPongBuffer::A);
    }

    #[test]
    fn last_written_matches_the_flag_loop() {
        for n in 1..=64 {
            let schedule = blur_schedule(n);
            let last = schedule.last_written.unwrap();

            assert_eq!(last.index(), flag_loop_read_index(n), "n = {}", n);
        }
    }

    #[test]
    fn even_iteration_counts_end_in_buffer_a() {
        for n in (2..=40).step_by(2) {
            assert_eq!(blur_schedule(n).last_written, Some(PingPongBuffer::A));
        }
    }

    #[test]
    fn every_step_reads_one_buffer_and_writes_the_other() {
        let schedule = blur_schedule(10);

        assert_eq!(schedule.steps[0].source, BlurSource::BrightPass);
        assert_eq!(schedule.steps[0].target, PingPongBuffer::B);
        assert_eq!(schedule.steps[0].axis, BlurAxis::Horizontal);

        for pair in schedule.steps.windows(2) {
            assert_eq!(pair[1].source, BlurSource::PingPong(pair[0].target));
            assert_eq!(pair[1].target, pair[0].target.next());
            assert_ne!(pair[1].axis, pair[0].axis);
        }
    }

    #[test]
    fn zero_iterations_write_nothing() {
        let schedule = blur_schedule(0);
        assert!(schedule.steps.is_empty());
        assert_eq!(schedule.last_written, None);
    }
}
