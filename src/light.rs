use glam::Vec3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct LightColors {
    pub ambient: Vec3,
    pub diffuse: Vec3,
    pub specular: Vec3,
}

impl LightColors {
    pub fn new(ambient: Vec3, diffuse: Vec3, specular: Vec3) -> LightColors {
        LightColors {
            ambient,
            diffuse,
            specular,
        }
    }
}

/// Distance falloff `1 / (constant + linear * d + quadratic * d^2)`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Attenuation {
    pub constant: f32,
    pub linear: f32,
    pub quadratic: f32,
}

impl Attenuation {
    pub fn new(constant: f32, linear: f32, quadratic: f32) -> Attenuation {
        Attenuation {
            constant,
            linear,
            quadratic,
        }
    }

    pub fn factor(&self, distance: f32) -> f32 {
        1.0 / (self.constant + self.linear * distance + self.quadratic * distance * distance)
    }

    pub fn is_well_formed(&self) -> bool {
        self.constant > 0.0 && self.linear >= 0.0 && self.quadratic >= 0.0
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DirectionalLight {
    pub direction: Vec3,
    pub colors: LightColors,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub colors: LightColors,
    pub attenuation: Attenuation,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SpotLight {
    pub position: Vec3,
    pub direction: Vec3,
    /// Cosine of the inner cone angle.
    pub cut_off: f32,
    /// Cosine of the outer cone angle.
    pub outer_cut_off: f32,
    pub colors: LightColors,
    pub attenuation: Attenuation,
}

impl SpotLight {
    /// Soft-edged cone intensity for a fragment seen along `light_dir` (fragment to light).
    pub fn cone_intensity(&self, light_dir: Vec3) -> f32 {
        let theta = light_dir.dot(-self.direction.normalize());
        let epsilon = self.cut_off - self.outer_cut_off;

        ((theta - self.outer_cut_off) / epsilon).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SpecularModel {
    Phong,
    BlinnPhong,
}

impl SpecularModel {
    pub fn toggled(self) -> SpecularModel {
        match self {
            SpecularModel::Phong => SpecularModel::BlinnPhong,
            SpecularModel::BlinnPhong => SpecularModel::Phong,
        }
    }

    pub fn is_blinn(self) -> bool {
        self == SpecularModel::BlinnPhong
    }

    pub fn label(self) -> &'static str {
        match self {
            SpecularModel::Phong => "Phong",
            SpecularModel::BlinnPhong => "Blinn",
        }
    }

    /// Specular term. `light_dir` and `view_dir` point away from the surface.
    pub fn specular_factor(self, normal: Vec3, light_dir: Vec3, view_dir: Vec3, shininess: f32) -> f32 {
        match self {
            SpecularModel::Phong => {
                let reflect_dir = reflect(-light_dir, normal);
                view_dir.dot(reflect_dir).max(0.0).powf(shininess)
            }
            SpecularModel::BlinnPhong => {
                let halfway = (light_dir + view_dir).normalize();
                normal.dot(halfway).max(0.0).powf(shininess)
            }
        }
    }
}

fn reflect(incident: Vec3, normal: Vec3) -> Vec3 {
    incident - 2.0 * normal.dot(incident) * normal
}

#[derive(Clone, Copy, Debug)]
pub enum Light<'a> {
    Directional(&'a DirectionalLight),
    Point(&'a PointLight),
    Spot(&'a SpotLight),
}

#[derive(Clone, Copy, Debug)]
pub struct SurfacePoint {
    pub position: Vec3,
    pub normal: Vec3,
    pub view_dir: Vec3,
    pub albedo: Vec3,
    pub specular: Vec3,
    pub shininess: f32,
}

impl<'a> Light<'a> {
    pub fn colors(&self) -> &LightColors {
        match self {
            Light::Directional(l) => &l.colors,
            Light::Point(l) => &l.colors,
            Light::Spot(l) => &l.colors,
        }
    }

    /// Radiance this light contributes at `surface`, matching the scene fragment shader.
    pub fn shade(&self, surface: &SurfacePoint, model: SpecularModel) -> Vec3 {
        let normal = surface.normal.normalize();
        let (light_dir, falloff, cone) = match self {
            Light::Directional(l) => (-l.direction.normalize(), 1.0, 1.0),
            Light::Point(l) => {
                let to_light = l.position - surface.position;
                (
                    to_light.normalize(),
                    l.attenuation.factor(to_light.length()),
                    1.0,
                )
            }
            Light::Spot(l) => {
                let to_light = l.position - surface.position;
                let light_dir = to_light.normalize();
                (
                    light_dir,
                    l.attenuation.factor(to_light.length()),
                    l.cone_intensity(light_dir),
                )
            }
        };

        let colors = self.colors();
        let diff = normal.dot(light_dir).max(0.0);
        let spec = model.specular_factor(normal, light_dir, surface.view_dir, surface.shininess);

        let ambient = colors.ambient * surface.albedo;
        let diffuse = colors.diffuse * diff * surface.albedo;
        let specular = colors.specular * spec * surface.specular;

        (ambient + (diffuse + specular) * cone) * falloff
    }
}

pub const EYE_LIGHT_COUNT: usize = 2;
pub const POINT_LIGHT_COUNT: usize = 3;

/// All scene lights. Eye lights orbit on closed-form paths and the spot light follows the camera.
#[derive(Clone, Debug, PartialEq)]
pub struct LightingState {
    pub directional: DirectionalLight,
    pub eye_lights: [PointLight; EYE_LIGHT_COUNT],
    pub candle: PointLight,
    pub camera_spot: SpotLight,
    pub specular_model: SpecularModel,
    pub spot_enabled: bool,
}

impl Default for LightingState {
    fn default() -> LightingState {
        let eye = PointLight {
            position: Vec3::new(4.0, 4.0, 0.0),
            colors: LightColors::new(Vec3::splat(0.735), Vec3::splat(0.8), Vec3::ONE),
            attenuation: Attenuation::new(0.505, 0.025, 0.015),
        };

        LightingState {
            directional: DirectionalLight {
                direction: Vec3::new(-0.2, -1.0, -0.3),
                colors: LightColors::new(Vec3::splat(0.1), Vec3::splat(0.05), Vec3::splat(0.05)),
            },
            eye_lights: [eye, eye],
            candle: PointLight {
                position: Vec3::new(0.9, -1.7, -1.545),
                colors: LightColors::new(Vec3::splat(0.2), Vec3::splat(0.5), Vec3::ONE),
                attenuation: Attenuation::new(1.0, 0.09, 0.032),
            },
            camera_spot: SpotLight {
                position: Vec3::new(0.0, 0.0, 20.0),
                direction: Vec3::NEG_Z,
                cut_off: 12.5_f32.to_radians().cos(),
                outer_cut_off: 15.0_f32.to_radians().cos(),
                colors: LightColors::new(Vec3::ZERO, Vec3::ONE, Vec3::ONE),
                attenuation: Attenuation::new(1.0, 0.09, 0.032),
            },
            specular_model: SpecularModel::Phong,
            spot_enabled: false,
        }
    }
}

impl LightingState {
    pub fn update(&mut self, elapsed: f32, camera_position: Vec3, camera_front: Vec3) {
        self.eye_lights[0].position = eye_orbit(0, elapsed);
        self.eye_lights[1].position = eye_orbit(1, elapsed);
        self.camera_spot.position = camera_position;
        self.camera_spot.direction = camera_front;
    }

    /// Point lights in the order the scene shader declares them.
    pub fn point_lights(&self) -> [&PointLight; POINT_LIGHT_COUNT] {
        [&self.eye_lights[0], &self.eye_lights[1], &self.candle]
    }

    pub fn active_lights(&self) -> Vec<Light<'_>> {
        let mut lights = vec![Light::Directional(&self.directional)];
        lights.extend(self.point_lights().into_iter().map(Light::Point));

        if self.spot_enabled {
            lights.push(Light::Spot(&self.camera_spot));
        }

        lights
    }

    pub fn shade(&self, surface: &SurfacePoint) -> Vec3 {
        self.active_lights()
            .iter()
            .map(|light| light.shade(surface, self.specular_model))
            .fold(Vec3::ZERO, |acc, c| acc + c)
    }

    pub fn toggle_specular_model(&mut self) {
        self.specular_model = self.specular_model.toggled();
    }

    pub fn toggle_spot(&mut self) {
        self.spot_enabled = !self.spot_enabled;
    }

    /// Resets attenuation that could divide by zero. Returns how many lights were reset.
    pub fn restore_degenerate_attenuation(&mut self) -> usize {
        let defaults = LightingState::default();
        let default_eyes = defaults.eye_lights.iter().map(|l| l.attenuation);

        let attenuations = self
            .eye_lights
            .iter_mut()
            .map(|l| &mut l.attenuation)
            .zip(default_eyes)
            .chain(std::iter::once((&mut self.candle.attenuation, defaults.candle.attenuation)))
            .chain(std::iter::once((
                &mut self.camera_spot.attenuation,
                defaults.camera_spot.attenuation,
            )));

        let mut restored = 0;

        for (current, fallback) in attenuations {
            if !current.is_well_formed() {
                *current = fallback;
                restored += 1;
            }
        }

        restored
    }
}

pub fn eye_orbit(index: usize, t: f32) -> Vec3 {
    let half = t / 2.0;

    match index {
        0 => Vec3::new(20.0 * half.cos(), 10.0 * half.sin(), 10.0 * half.sin()),
        _ => Vec3::new(-10.0 * half.sin(), -10.0 * half.sin(), -20.0 * half.cos()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn surface_at(position: Vec3) -> SurfacePoint {
        SurfacePoint {
            position,
            normal: Vec3::Y,
            view_dir: Vec3::Y,
            albedo: Vec3::ONE,
            specular: Vec3::ONE,
            shininess: 32.0,
        }
    }

    #[test]
    fn constant_only_attenuation_is_distance_independent() {
        let attenuation = Attenuation::new(1.0, 0.0, 0.0);

        for d in [0.0, 0.5, 3.0, 50.0, 1000.0] {
            assert_eq!(attenuation.factor(d), 1.0);
        }

        let light = PointLight {
            position: Vec3::new(0.0, 1.0, 0.0),
            colors: LightColors::new(Vec3::splat(0.1), Vec3::ONE, Vec3::ZERO),
            attenuation,
        };
        let near = Light::Point(&light).shade(&surface_at(Vec3::ZERO), SpecularModel::Phong);
        let far_light = PointLight {
            position: Vec3::new(0.0, 40.0, 0.0),
            ..light
        };
        let far = Light::Point(&far_light).shade(&surface_at(Vec3::ZERO), SpecularModel::Phong);

        assert!((near - far).length() < 1e-5);
    }

    #[test]
    fn attenuation_decreases_with_distance() {
        let attenuation = LightingState::default().candle.attenuation;
        assert!(attenuation.factor(1.0) > attenuation.factor(2.0));
        assert!(attenuation.factor(2.0) > attenuation.factor(10.0));
    }

    #[test]
    fn default_lights_have_positive_constant_term() {
        let lights = LightingState::default();

        for light in lights.point_lights() {
            assert!(light.attenuation.is_well_formed());
        }
        assert!(lights.camera_spot.attenuation.is_well_formed());
        assert!(!Attenuation::new(0.0, 0.0, 0.0).is_well_formed());
    }

    #[test]
    fn degenerate_attenuation_falls_back_to_defaults() {
        let mut lights = LightingState::default();
        lights.eye_lights[0].attenuation = Attenuation::new(0.0, 0.0, 0.0);
        lights.candle.attenuation.constant = 2.0;

        assert_eq!(lights.restore_degenerate_attenuation(), 1);
        assert_eq!(lights.eye_lights[0].attenuation, LightingState::default().eye_lights[0].attenuation);
        assert_eq!(lights.candle.attenuation.constant, 2.0);
        assert_eq!(lights.restore_degenerate_attenuation(), 0);
    }

    #[test]
    fn phong_and_blinn_agree_on_mirror_direction() {
        let normal = Vec3::Y;
        let light_dir = Vec3::new(1.0, 1.0, 0.0).normalize();
        let view_dir = Vec3::new(-1.0, 1.0, 0.0).normalize();

        let phong = SpecularModel::Phong.specular_factor(normal, light_dir, view_dir, 8.0);
        let blinn = SpecularModel::BlinnPhong.specular_factor(normal, light_dir, view_dir, 8.0);

        assert!((phong - 1.0).abs() < 1e-5);
        assert!((blinn - 1.0).abs() < 1e-5);
    }

    #[test]
    fn blinn_keeps_highlight_past_ninety_degrees() {
        let normal = Vec3::Y;
        let light_dir = Vec3::new(1.0, 0.2, 0.0).normalize();
        let view_dir = Vec3::new(1.0, 0.3, 0.0).normalize();

        let phong = SpecularModel::Phong.specular_factor(normal, light_dir, view_dir, 4.0);
        let blinn = SpecularModel::BlinnPhong.specular_factor(normal, light_dir, view_dir, 4.0);

        assert_eq!(phong, 0.0);
        assert!(blinn > 0.0);
    }

    #[test]
    fn update_moves_eye_lights_and_tracks_camera() {
        let mut lights = LightingState::default();
        let camera_position = Vec3::new(1.0, 2.0, 3.0);
        let camera_front = Vec3::new(0.0, 0.0, -1.0);

        lights.update(0.0, camera_position, camera_front);

        assert_eq!(lights.eye_lights[0].position, Vec3::new(20.0, 0.0, 0.0));
        assert_eq!(lights.eye_lights[1].position, Vec3::new(0.0, 0.0, -20.0));
        assert_eq!(lights.camera_spot.position, camera_position);
        assert_eq!(lights.camera_spot.direction, camera_front);

        lights.update(std::f32::consts::PI, camera_position, camera_front);

        assert!((lights.eye_lights[0].position - Vec3::new(0.0, 10.0, 10.0)).length() < 1e-4);
    }

    #[test]
    fn spot_cone_is_full_inside_and_dark_outside() {
        let spot = LightingState::default().camera_spot;

        assert_eq!(spot.cone_intensity(Vec3::Z), 1.0);
        assert_eq!(spot.cone_intensity(Vec3::X), 0.0);
    }

    #[test]
    fn spot_light_only_counts_when_enabled() {
        let mut lights = LightingState::default();
        assert_eq!(lights.active_lights().len(), 4);

        lights.toggle_spot();
        assert_eq!(lights.active_lights().len(), 5);
    }
}
