use crate::camera::Camera;
use crate::error::Result;
use crate::light::{Attenuation, LightColors, LightingState};
use crate::post_process::PostProcessParams;
use crate::scene::{Placement, SceneLayout};
use glam::Vec3;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

#[derive(Clone, Debug)]
pub struct ProgramState {
    pub clear_color: Vec3,
    pub ui_enabled: bool,
    pub camera: Camera,
    pub camera_mouse_enabled: bool,
    pub layout: SceneLayout,
    pub lights: LightingState,
    pub post: PostProcessParams,
}

impl Default for ProgramState {
    fn default() -> ProgramState {
        ProgramState {
            clear_color: Vec3::ZERO,
            ui_enabled: false,
            camera: Camera::default(),
            camera_mouse_enabled: true,
            layout: SceneLayout::default(),
            lights: LightingState::default(),
            post: PostProcessParams::default(),
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum RecordStatus {
    Complete,
    /// Reading stopped at the first missing or malformed field; the rest kept their defaults.
    Truncated { fields_read: usize },
}

trait RecordVisitor {
    fn scalar(&mut self, value: &mut f32);
    fn flag(&mut self, value: &mut bool);

    fn vector(&mut self, value: &mut Vec3) {
        self.scalar(&mut value.x);
        self.scalar(&mut value.y);
        self.scalar(&mut value.z);
    }

    fn placement(&mut self, placement: &mut Placement) {
        self.vector(&mut placement.position);
        self.scalar(&mut placement.scale);
    }

    fn colors(&mut self, colors: &mut LightColors) {
        self.vector(&mut colors.ambient);
        self.vector(&mut colors.diffuse);
        self.vector(&mut colors.specular);
    }

    fn attenuation(&mut self, attenuation: &mut Attenuation) {
        self.scalar(&mut attenuation.constant);
        self.scalar(&mut attenuation.linear);
        self.scalar(&mut attenuation.quadratic);
    }
}

struct RecordWriter {
    out: String,
}

impl RecordVisitor for RecordWriter {
    fn scalar(&mut self, value: &mut f32) {
        let _ = writeln!(self.out, "{}", value);
    }

    fn flag(&mut self, value: &mut bool) {
        let _ = writeln!(self.out, "{}", *value as u8);
    }
}

struct RecordReader<'a> {
    tokens: std::str::SplitWhitespace<'a>,
    fields_read: usize,
    stopped: bool,
}

impl<'a> RecordReader<'a> {
    fn next_token(&mut self) -> Option<&'a str> {
        if self.stopped {
            return None;
        }

        let token = self.tokens.next();

        if token.is_none() {
            self.stopped = true;
        }

        token
    }
}

impl<'a> RecordVisitor for RecordReader<'a> {
    fn scalar(&mut self, value: &mut f32) {
        if let Some(token) = self.next_token() {
            match token.parse::<f32>() {
                Ok(v) => {
                    *value = v;
                    self.fields_read += 1;
                }
                Err(_) => self.stopped = true,
            }
        }
    }

    fn flag(&mut self, value: &mut bool) {
        if let Some(token) = self.next_token() {
            match token {
                "1" | "true" => *value = true,
                "0" | "false" => *value = false,
                _ => {
                    self.stopped = true;
                    return;
                }
            }

            self.fields_read += 1;
        }
    }
}

impl ProgramState {
    fn visit(&mut self, v: &mut dyn RecordVisitor) {
        v.vector(&mut self.clear_color);
        v.flag(&mut self.ui_enabled);
        v.vector(&mut self.camera.position);

        let mut front = self.camera.front();
        v.vector(&mut front);
        if front != self.camera.front() {
            self.camera.set_front(front);
        }

        let layout = &mut self.layout;
        v.placement(&mut layout.lighthouse);
        v.placement(&mut layout.shed);
        v.placement(&mut layout.picnic_table);
        v.placement(&mut layout.tree);
        v.placement(&mut layout.round_table);
        v.placement(&mut layout.candle);
        v.placement(&mut layout.island);
        v.scalar(&mut layout.eye_scale);

        let lights = &mut self.lights;
        let mut blinn = lights.specular_model.is_blinn();
        v.flag(&mut blinn);
        if blinn != lights.specular_model.is_blinn() {
            lights.toggle_specular_model();
        }
        v.flag(&mut lights.spot_enabled);

        v.scalar(&mut self.post.exposure);
        v.scalar(&mut self.post.gamma);
        v.flag(&mut self.post.hdr);
        v.flag(&mut self.post.bloom);

        v.vector(&mut lights.directional.direction);
        v.colors(&mut lights.directional.colors);

        for eye in lights.eye_lights.iter_mut() {
            v.colors(&mut eye.colors);
            v.attenuation(&mut eye.attenuation);
        }

        v.vector(&mut lights.candle.position);
        v.colors(&mut lights.candle.colors);
        v.attenuation(&mut lights.candle.attenuation);

        v.colors(&mut lights.camera_spot.colors);
        v.attenuation(&mut lights.camera_spot.attenuation);
        v.scalar(&mut lights.camera_spot.cut_off);
        v.scalar(&mut lights.camera_spot.outer_cut_off);
    }

    pub fn to_record(&self) -> String {
        let mut writer = RecordWriter { out: String::new() };
        self.clone().visit(&mut writer);
        writer.out
    }

    pub fn read_record(&mut self, text: &str) -> RecordStatus {
        let mut reader = RecordReader {
            tokens: text.split_whitespace(),
            fields_read: 0,
            stopped: false,
        };

        self.visit(&mut reader);
        self.post = self.post.sanitized();

        let restored = self.lights.restore_degenerate_attenuation();

        if restored > 0 {
            log::warn!(
                "{} light(s) had attenuation that divides by zero, using defaults",
                restored
            );
        }

        match reader.stopped {
            false => RecordStatus::Complete,
            true => RecordStatus::Truncated {
                fields_read: reader.fields_read,
            },
        }
    }

    /// A missing file leaves the defaults in place.
    pub fn load_from_file(path: &Path) -> ProgramState {
        let mut state = ProgramState::default();

        match fs::read_to_string(path) {
            Ok(text) => match state.read_record(&text) {
                RecordStatus::Complete => log::info!("Loaded program state from {}", path.display()),
                RecordStatus::Truncated { fields_read } => log::warn!(
                    "Program state in {} ended after {} fields, the rest use defaults",
                    path.display(),
                    fields_read
                ),
            },
            Err(e) => log::info!("No program state at {} ({}), using defaults", path.display(), e),
        }

        state
    }

    pub fn save_to_file(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }

        fs::write(path, self.to_record())?;
        log::info!("Saved program state to {}", path.display());

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::light::SpecularModel;

    #[test]
    fn record_round_trips() {
        let mut state = ProgramState::default();
        state.clear_color = Vec3::new(0.1, 0.2, 0.3);
        state.ui_enabled = true;
        state.camera.position = Vec3::new(-3.0, 1.5, 12.0);
        state.layout.shed.position = Vec3::new(2.0, -1.0, 0.5);
        state.layout.candle.scale = 0.25;
        state.lights.toggle_specular_model();
        state.lights.candle.attenuation.quadratic = 0.07;
        state.post.exposure = 0.6;
        state.post.gamma = 1.255;
        state.post.bloom = false;

        let mut restored = ProgramState::default();
        let status = restored.read_record(&state.to_record());

        assert_eq!(status, RecordStatus::Complete);
        assert_eq!(restored.clear_color, state.clear_color);
        assert!(restored.ui_enabled);
        assert_eq!(restored.camera.position, state.camera.position);
        assert_eq!(restored.layout, state.layout);
        assert_eq!(restored.lights.specular_model, SpecularModel::BlinnPhong);
        assert_eq!(restored.lights.candle, state.lights.candle);
        assert_eq!(restored.post, state.post);
    }

    #[test]
    fn record_begins_with_clear_colour_and_ui_flag() {
        let record = ProgramState::default().to_record();
        let lines: Vec<&str> = record.lines().take(4).collect();

        assert_eq!(lines, vec!["0", "0", "0", "0"]);
    }

    #[test]
    fn truncated_record_keeps_defaults_for_the_tail() {
        let mut state = ProgramState::default();
        let status = state.read_record("0.5 0.5 0.5 1 4.0");

        assert_eq!(status, RecordStatus::Truncated { fields_read: 5 });
        assert_eq!(state.clear_color, Vec3::splat(0.5));
        assert!(state.ui_enabled);
        assert_eq!(state.camera.position.x, 4.0);
        assert_eq!(state.camera.position.y, 0.0);
        assert_eq!(state.layout, SceneLayout::default());
    }

    #[test]
    fn malformed_field_stops_reading() {
        let mut state = ProgramState::default();
        let status = state.read_record("0.5 oops 0.5 1");

        assert_eq!(status, RecordStatus::Truncated { fields_read: 1 });
        assert_eq!(state.clear_color, Vec3::new(0.5, 0.0, 0.0));
        assert!(!state.ui_enabled);
    }

    #[test]
    fn zero_attenuation_is_replaced_on_load() {
        let mut state = ProgramState::default();
        state.lights.candle.attenuation = Attenuation::new(0.0, 0.0, 0.0);
        state.lights.camera_spot.attenuation = Attenuation::new(1.0, -0.5, 0.0);
        state.lights.eye_lights[1].attenuation.quadratic = 0.2;

        let mut restored = ProgramState::default();
        assert_eq!(restored.read_record(&state.to_record()), RecordStatus::Complete);

        let defaults = LightingState::default();
        assert_eq!(restored.lights.candle.attenuation, defaults.candle.attenuation);
        assert_eq!(restored.lights.camera_spot.attenuation, defaults.camera_spot.attenuation);
        assert_eq!(restored.lights.eye_lights[1].attenuation.quadratic, 0.2);
        assert!(restored.lights.candle.attenuation.factor(0.5).is_finite());
    }

    #[test]
    fn missing_file_yields_defaults() {
        let state = ProgramState::load_from_file(Path::new("/nonexistent/island/state.txt"));
        assert_eq!(state.layout, SceneLayout::default());
        assert_eq!(state.post, PostProcessParams::default());
    }

    #[test]
    fn save_then_load_from_disk() {
        let dir = std::env::temp_dir().join(format!("island_viewer_state_{}", std::process::id()));
        let path = dir.join("program_state.txt");

        let mut state = ProgramState::default();
        state.layout.tree.position = Vec3::new(7.0, 0.0, -2.0);
        state.save_to_file(&path).unwrap();

        let loaded = ProgramState::load_from_file(&path);
        assert_eq!(loaded.layout.tree.position, Vec3::new(7.0, 0.0, -2.0));

        let _ = fs::remove_dir_all(dir);
    }
}
