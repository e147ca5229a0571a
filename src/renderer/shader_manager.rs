use crate::error::{Result, ViewerError};
use crate::light::{Attenuation, LightColors, LightingState, POINT_LIGHT_COUNT};
use crate::post_process::{PostProcessParams, GAUSSIAN_WEIGHTS};
use crate::renderer::shaders;
use fnv::FnvHashMap;
use gl::types::{GLchar, GLenum, GLint, GLuint};
use glam::{Mat4, Vec3};
use std::ffi::CString;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum ProgramKind {
    Scene,
    Skybox,
    Blur,
    Composite,
}

impl ProgramKind {
    pub const ALL: [ProgramKind; 4] = [
        ProgramKind::Scene,
        ProgramKind::Skybox,
        ProgramKind::Blur,
        ProgramKind::Composite,
    ];

    pub fn name(self) -> &'static str {
        match self {
            ProgramKind::Scene => "scene",
            ProgramKind::Skybox => "skybox",
            ProgramKind::Blur => "blur",
            ProgramKind::Composite => "composite",
        }
    }

    pub fn sources(self) -> (&'static str, &'static str) {
        match self {
            ProgramKind::Scene => (shaders::SCENE_VERTEX, shaders::SCENE_FRAGMENT),
            ProgramKind::Skybox => (shaders::SKYBOX_VERTEX, shaders::SKYBOX_FRAGMENT),
            ProgramKind::Blur => (shaders::SCREEN_VERTEX, shaders::BLUR_FRAGMENT),
            ProgramKind::Composite => (shaders::SCREEN_VERTEX, shaders::COMPOSITE_FRAGMENT),
        }
    }
}

pub struct ShaderProgram {
    pub id: GLuint,
}

impl Drop for ShaderProgram {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteProgram(self.id);
        }
    }
}

pub struct ShaderManager {
    programs: FnvHashMap<ProgramKind, ShaderProgram>,
    current_program: GLuint,
}

impl ShaderManager {
    pub fn new() -> ShaderManager {
        ShaderManager {
            programs: FnvHashMap::default(),
            current_program: 0,
        }
    }

    pub unsafe fn load_all(&mut self) -> Result<()> {
        for kind in ProgramKind::ALL {
            self.create_program(kind)?;
        }

        Ok(())
    }

    pub unsafe fn create_program(&mut self, kind: ProgramKind) -> Result<GLuint> {
        let (vertex_src, fragment_src) = kind.sources();

        let vs = compile_glsl(gl::VERTEX_SHADER, "vertex", vertex_src)?;
        let fs = match compile_glsl(gl::FRAGMENT_SHADER, "fragment", fragment_src) {
            Ok(fs) => fs,
            Err(e) => {
                gl::DeleteShader(vs);
                return Err(e);
            }
        };

        let program = link_program(kind.name(), vs, fs);

        gl::DeleteShader(vs);
        gl::DeleteShader(fs);

        let program = program?;
        log::debug!("Linked '{}' program ({})", kind.name(), program);

        self.programs.insert(kind, ShaderProgram { id: program });

        Ok(program)
    }

    pub fn get_program(&self, kind: ProgramKind) -> Option<GLuint> {
        self.programs.get(&kind).map(|p| p.id)
    }

    /// Binds `kind` unless it is already current. Returns false if it was never loaded.
    pub unsafe fn activate(&mut self, kind: ProgramKind) -> bool {
        match self.get_program(kind) {
            Some(program) => {
                if self.current_program != program {
                    gl::UseProgram(program);
                    self.current_program = program;
                }

                true
            }
            None => {
                log::warn!("Program '{}' is not loaded", kind.name());
                false
            }
        }
    }

    /// Looks up every uniform of `kind` once through `locate`.
    pub unsafe fn locate<T>(&self, kind: ProgramKind, locate: impl FnOnce(&mut dyn FnMut(&str) -> GLint) -> T) -> T {
        let program = self.get_program(kind).unwrap_or(0);

        let mut lookup = |name: &str| -> GLint {
            let location = uniform_location(program, name);

            if location < 0 {
                log::warn!("Uniform '{}' not found in '{}' program", name, kind.name());
            }

            location
        };

        locate(&mut lookup)
    }
}

impl Default for ShaderManager {
    fn default() -> ShaderManager {
        ShaderManager::new()
    }
}

unsafe fn uniform_location(program: GLuint, name: &str) -> GLint {
    match CString::new(name) {
        Ok(name) => gl::GetUniformLocation(program, name.as_ptr()),
        Err(_) => -1,
    }
}

unsafe fn compile_glsl(shader_type: GLenum, stage: &'static str, src: &str) -> Result<GLuint> {
    let source = CString::new(src.as_bytes()).map_err(|_| ViewerError::ShaderCompile {
        stage,
        log: "source contains a NUL byte".to_string(),
    })?;

    let shader = gl::CreateShader(shader_type);
    gl::ShaderSource(shader, 1, &source.as_ptr(), std::ptr::null());
    gl::CompileShader(shader);

    let mut status = gl::FALSE as GLint;
    gl::GetShaderiv(shader, gl::COMPILE_STATUS, &mut status);

    if status != (gl::TRUE as GLint) {
        let mut len = 0;
        gl::GetShaderiv(shader, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];

        gl::GetShaderInfoLog(
            shader,
            len,
            std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut GLchar,
        );
        gl::DeleteShader(shader);

        return Err(ViewerError::ShaderCompile {
            stage,
            log: info_log_to_string(&buf),
        });
    }

    Ok(shader)
}

unsafe fn link_program(program_name: &'static str, vertex_shader: GLuint, fragment_shader: GLuint) -> Result<GLuint> {
    let program = gl::CreateProgram();
    gl::AttachShader(program, vertex_shader);
    gl::AttachShader(program, fragment_shader);
    gl::LinkProgram(program);

    let mut status = gl::FALSE as GLint;
    gl::GetProgramiv(program, gl::LINK_STATUS, &mut status);

    if status != (gl::TRUE as GLint) {
        let mut len = 0;
        gl::GetProgramiv(program, gl::INFO_LOG_LENGTH, &mut len);
        let mut buf = vec![0u8; len.max(1) as usize];

        gl::GetProgramInfoLog(
            program,
            len,
            std::ptr::null_mut(),
            buf.as_mut_ptr() as *mut GLchar,
        );
        gl::DeleteProgram(program);

        return Err(ViewerError::ShaderLink {
            program: program_name,
            log: info_log_to_string(&buf),
        });
    }

    gl::DetachShader(program, vertex_shader);
    gl::DetachShader(program, fragment_shader);

    Ok(program)
}

fn info_log_to_string(buf: &[u8]) -> String {
    let end = buf.iter().position(|b| *b == 0).unwrap_or(buf.len());
    String::from_utf8_lossy(&buf[..end]).trim_end().to_string()
}

pub unsafe fn set_mat4(location: GLint, matrix: &Mat4) {
    gl::UniformMatrix4fv(location, 1, gl::FALSE, matrix.as_ref().as_ptr());
}

pub unsafe fn set_vec3(location: GLint, v: Vec3) {
    gl::Uniform3f(location, v.x, v.y, v.z);
}

pub unsafe fn set_f32(location: GLint, v: f32) {
    gl::Uniform1f(location, v);
}

pub unsafe fn set_bool(location: GLint, v: bool) {
    gl::Uniform1i(location, v as GLint);
}

pub unsafe fn set_sampler(location: GLint, unit: u32) {
    gl::Uniform1i(location, unit as GLint);
}

pub struct ColorUniforms {
    ambient: GLint,
    diffuse: GLint,
    specular: GLint,
}

impl ColorUniforms {
    fn locate(prefix: &str, lookup: &mut dyn FnMut(&str) -> GLint) -> ColorUniforms {
        ColorUniforms {
            ambient: lookup(&format!("{}.ambient", prefix)),
            diffuse: lookup(&format!("{}.diffuse", prefix)),
            specular: lookup(&format!("{}.specular", prefix)),
        }
    }

    unsafe fn set(&self, colors: &LightColors) {
        set_vec3(self.ambient, colors.ambient);
        set_vec3(self.diffuse, colors.diffuse);
        set_vec3(self.specular, colors.specular);
    }
}

pub struct AttenuationUniforms {
    constant: GLint,
    linear: GLint,
    quadratic: GLint,
}

impl AttenuationUniforms {
    fn locate(prefix: &str, lookup: &mut dyn FnMut(&str) -> GLint) -> AttenuationUniforms {
        AttenuationUniforms {
            constant: lookup(&format!("{}.constant", prefix)),
            linear: lookup(&format!("{}.linear", prefix)),
            quadratic: lookup(&format!("{}.quadratic", prefix)),
        }
    }

    unsafe fn set(&self, attenuation: &Attenuation) {
        set_f32(self.constant, attenuation.constant);
        set_f32(self.linear, attenuation.linear);
        set_f32(self.quadratic, attenuation.quadratic);
    }
}

pub struct PointLightUniforms {
    position: GLint,
    colors: ColorUniforms,
    attenuation: AttenuationUniforms,
}

pub struct SpotLightUniforms {
    position: GLint,
    direction: GLint,
    cut_off: GLint,
    outer_cut_off: GLint,
    colors: ColorUniforms,
    attenuation: AttenuationUniforms,
}

pub const DIFFUSE_UNIT: u32 = 0;
pub const SPECULAR_UNIT: u32 = 1;

pub struct MaterialUniforms {
    pub diffuse: GLint,
    pub specular: GLint,
    pub shininess: GLint,
}

impl MaterialUniforms {
    pub unsafe fn bind(&self, diffuse: GLuint, specular: GLuint, shininess: f32) {
        gl::ActiveTexture(gl::TEXTURE0 + DIFFUSE_UNIT);
        gl::BindTexture(gl::TEXTURE_2D, diffuse);
        set_sampler(self.diffuse, DIFFUSE_UNIT);

        gl::ActiveTexture(gl::TEXTURE0 + SPECULAR_UNIT);
        gl::BindTexture(gl::TEXTURE_2D, specular);
        set_sampler(self.specular, SPECULAR_UNIT);

        set_f32(self.shininess, shininess);
    }
}

pub struct SceneUniforms {
    model: GLint,
    view: GLint,
    projection: GLint,
    view_position: GLint,
    dir_direction: GLint,
    dir_colors: ColorUniforms,
    point_lights: Vec<PointLightUniforms>,
    spot: SpotLightUniforms,
    blinn: GLint,
    spot_enabled: GLint,
    bloom_threshold: GLint,
    pub material: MaterialUniforms,
}

impl SceneUniforms {
    pub fn locate(lookup: &mut dyn FnMut(&str) -> GLint) -> SceneUniforms {
        let point_lights = (0..POINT_LIGHT_COUNT)
            .map(|i| {
                let prefix = format!("pointLights[{}]", i);

                PointLightUniforms {
                    position: lookup(&format!("{}.position", prefix)),
                    colors: ColorUniforms::locate(&prefix, lookup),
                    attenuation: AttenuationUniforms::locate(&prefix, lookup),
                }
            })
            .collect();

        SceneUniforms {
            model: lookup("model"),
            view: lookup("view"),
            projection: lookup("projection"),
            view_position: lookup("viewPosition"),
            dir_direction: lookup("dirLight.direction"),
            dir_colors: ColorUniforms::locate("dirLight", lookup),
            point_lights,
            spot: SpotLightUniforms {
                position: lookup("spotLight.position"),
                direction: lookup("spotLight.direction"),
                cut_off: lookup("spotLight.cutOff"),
                outer_cut_off: lookup("spotLight.outerCutOff"),
                colors: ColorUniforms::locate("spotLight", lookup),
                attenuation: AttenuationUniforms::locate("spotLight", lookup),
            },
            blinn: lookup("blinn"),
            spot_enabled: lookup("spotEnabled"),
            bloom_threshold: lookup("bloomThreshold"),
            material: MaterialUniforms {
                diffuse: lookup("material.texture_diffuse1"),
                specular: lookup("material.texture_specular1"),
                shininess: lookup("material.shininess"),
            },
        }
    }

    pub unsafe fn set_camera(&self, view: &Mat4, projection: &Mat4, position: Vec3) {
        set_mat4(self.view, view);
        set_mat4(self.projection, projection);
        set_vec3(self.view_position, position);
    }

    pub unsafe fn set_model(&self, model: &Mat4) {
        set_mat4(self.model, model);
    }

    pub unsafe fn set_bloom_threshold(&self, threshold: f32) {
        set_f32(self.bloom_threshold, threshold);
    }

    pub unsafe fn set_lights(&self, lights: &LightingState) {
        set_vec3(self.dir_direction, lights.directional.direction);
        self.dir_colors.set(&lights.directional.colors);

        for (uniforms, light) in self.point_lights.iter().zip(lights.point_lights()) {
            set_vec3(uniforms.position, light.position);
            uniforms.colors.set(&light.colors);
            uniforms.attenuation.set(&light.attenuation);
        }

        let spot = &lights.camera_spot;
        set_vec3(self.spot.position, spot.position);
        set_vec3(self.spot.direction, spot.direction);
        set_f32(self.spot.cut_off, spot.cut_off);
        set_f32(self.spot.outer_cut_off, spot.outer_cut_off);
        self.spot.colors.set(&spot.colors);
        self.spot.attenuation.set(&spot.attenuation);

        set_bool(self.blinn, lights.specular_model.is_blinn());
        set_bool(self.spot_enabled, lights.spot_enabled);
    }
}

pub struct SkyboxUniforms {
    view: GLint,
    projection: GLint,
    skybox: GLint,
}

impl SkyboxUniforms {
    pub fn locate(lookup: &mut dyn FnMut(&str) -> GLint) -> SkyboxUniforms {
        SkyboxUniforms {
            view: lookup("view"),
            projection: lookup("projection"),
            skybox: lookup("skybox"),
        }
    }

    pub unsafe fn set(&self, view: &Mat4, projection: &Mat4, cube_map: GLuint) {
        set_mat4(self.view, view);
        set_mat4(self.projection, projection);

        gl::ActiveTexture(gl::TEXTURE0);
        gl::BindTexture(gl::TEXTURE_CUBE_MAP, cube_map);
        set_sampler(self.skybox, 0);
    }
}

pub struct BlurUniforms {
    image: GLint,
    horizontal: GLint,
    weight: GLint,
}

impl BlurUniforms {
    pub fn locate(lookup: &mut dyn FnMut(&str) -> GLint) -> BlurUniforms {
        BlurUniforms {
            image: lookup("image"),
            horizontal: lookup("horizontal"),
            weight: lookup("weight[0]"),
        }
    }

    /// Kernel weights and sampler unit never change, so they are uploaded once after linking.
    pub unsafe fn set_constants(&self) {
        set_sampler(self.image, 0);
        gl::Uniform1fv(self.weight, GAUSSIAN_WEIGHTS.len() as i32, GAUSSIAN_WEIGHTS.as_ptr());
    }

    pub unsafe fn set_pass(&self, horizontal: bool, source: GLuint) {
        set_bool(self.horizontal, horizontal);

        gl::ActiveTexture(gl::TEXTURE0);
        gl::BindTexture(gl::TEXTURE_2D, source);
    }
}

pub struct CompositeUniforms {
    scene: GLint,
    bloom_blur: GLint,
    hdr: GLint,
    bloom: GLint,
    exposure: GLint,
    gamma: GLint,
}

impl CompositeUniforms {
    pub fn locate(lookup: &mut dyn FnMut(&str) -> GLint) -> CompositeUniforms {
        CompositeUniforms {
            scene: lookup("scene"),
            bloom_blur: lookup("bloomBlur"),
            hdr: lookup("hdr"),
            bloom: lookup("bloom"),
            exposure: lookup("exposure"),
            gamma: lookup("gamma"),
        }
    }

    pub unsafe fn set(&self, params: &PostProcessParams, scene: GLuint, bloom_blur: GLuint) {
        gl::ActiveTexture(gl::TEXTURE0);
        gl::BindTexture(gl::TEXTURE_2D, scene);
        set_sampler(self.scene, 0);

        gl::ActiveTexture(gl::TEXTURE1);
        gl::BindTexture(gl::TEXTURE_2D, bloom_blur);
        set_sampler(self.bloom_blur, 1);

        set_bool(self.hdr, params.hdr);
        set_bool(self.bloom, params.bloom);
        set_f32(self.exposure, params.exposure);
        set_f32(self.gamma, params.gamma);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    fn recorded<T>(locate: impl FnOnce(&mut dyn FnMut(&str) -> GLint) -> T) -> Vec<String> {
        let mut names = Vec::new();
        let mut lookup = |name: &str| -> GLint {
            names.push(name.to_string());
            names.len() as GLint
        };

        locate(&mut lookup);
        names
    }

    fn identifiers(name: &str) -> Vec<&str> {
        name.split('.')
            .map(|part| part.split('[').next().unwrap_or(part))
            .collect()
    }

    fn assert_declared(names: &[String], kind: ProgramKind) {
        let (vertex, fragment) = kind.sources();
        let source = format!("{}\n{}", vertex, fragment);

        let unique: HashSet<&String> = names.iter().collect();
        assert_eq!(unique.len(), names.len(), "duplicate lookups in {:?}", kind);

        for name in names {
            for ident in identifiers(name) {
                let declared = source
                    .split(|c: char| !(c.is_alphanumeric() || c == '_'))
                    .any(|word| word == ident);

                assert!(declared, "'{}' from '{}' is not in the {:?} source", ident, name, kind);
            }
        }
    }

    #[test]
    fn scene_uniforms_are_declared_in_glsl() {
        let names = recorded(SceneUniforms::locate);

        assert!(names.contains(&"pointLights[2].quadratic".to_string()));
        assert!(names.contains(&"spotLight.outerCutOff".to_string()));
        assert_declared(&names, ProgramKind::Scene);
    }

    #[test]
    fn post_process_uniforms_are_declared_in_glsl() {
        assert_declared(&recorded(SkyboxUniforms::locate), ProgramKind::Skybox);
        assert_declared(&recorded(BlurUniforms::locate), ProgramKind::Blur);
        assert_declared(&recorded(CompositeUniforms::locate), ProgramKind::Composite);
    }

    #[test]
    fn scene_shader_declares_every_point_light() {
        let (_, fragment) = ProgramKind::Scene.sources();
        assert!(fragment.contains(&format!("#define NR_POINT_LIGHTS {}", POINT_LIGHT_COUNT)));
    }

    #[test]
    fn blur_shader_kernel_matches_host_weights() {
        let (_, fragment) = ProgramKind::Blur.sources();
        assert!(fragment.contains(&format!("uniform float weight[{}];", GAUSSIAN_WEIGHTS.len())));
    }

    #[test]
    fn info_log_stops_at_nul() {
        assert_eq!(info_log_to_string(b"0:1: error\n\0garbage"), "0:1: error");
    }
}
