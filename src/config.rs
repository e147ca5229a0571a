use std::path::PathBuf;

pub const DEFAULT_BLUR_PASSES: u32 = 10;

#[derive(Clone, Debug)]
pub struct ViewerConfig {
    pub width: u32,
    pub height: u32,
    pub title: String,
    pub resource_root: PathBuf,
    pub state_file: PathBuf,
    /// Number of one-dimensional blur passes per frame, horizontal and vertical alternating.
    pub blur_passes: u32,
    pub bloom_threshold: f32,
    pub vsync: bool,
}

impl Default for ViewerConfig {
    fn default() -> ViewerConfig {
        ViewerConfig {
            width: 1280,
            height: 720,
            title: String::from("Island Viewer"),
            resource_root: PathBuf::from("resources"),
            state_file: PathBuf::from("resources/program_state.txt"),
            blur_passes: DEFAULT_BLUR_PASSES,
            bloom_threshold: 1.0,
            vsync: true,
        }
    }
}

impl ViewerConfig {
    pub fn with_size(mut self, width: u32, height: u32) -> ViewerConfig {
        self.width = width.max(1);
        self.height = height.max(1);
        self
    }

    pub fn with_resource_root(mut self, root: impl Into<PathBuf>) -> ViewerConfig {
        self.resource_root = root.into();
        self
    }

    pub fn with_state_file(mut self, path: impl Into<PathBuf>) -> ViewerConfig {
        self.state_file = path.into();
        self
    }

    pub fn with_blur_passes(mut self, passes: u32) -> ViewerConfig {
        self.blur_passes = passes;
        self
    }

    pub fn with_bloom_threshold(mut self, threshold: f32) -> ViewerConfig {
        self.bloom_threshold = threshold;
        self
    }

    pub fn with_vsync(mut self, vsync: bool) -> ViewerConfig {
        self.vsync = vsync;
        self
    }

    pub fn aspect_ratio(&self) -> f32 {
        self.width as f32 / self.height as f32
    }

    pub fn resource(&self, relative: &str) -> PathBuf {
        self.resource_root.join(relative)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_the_stock_scene() {
        let config = ViewerConfig::default();

        assert_eq!((config.width, config.height), (1280, 720));
        assert_eq!(config.blur_passes, 10);
        assert_eq!(config.blur_passes % 2, 0);
        assert!((config.aspect_ratio() - 16.0 / 9.0).abs() < 1e-6);
    }

    #[test]
    fn zero_sizes_are_clamped() {
        let config = ViewerConfig::default().with_size(0, 0);
        assert_eq!((config.width, config.height), (1, 1));
    }

    #[test]
    fn resources_resolve_under_the_root() {
        let config = ViewerConfig::default().with_resource_root("assets");
        assert_eq!(
            config.resource("objects/shed/shed.obj"),
            PathBuf::from("assets/objects/shed/shed.obj")
        );
    }
}
