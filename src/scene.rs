use crate::light::LightingState;
use crate::renderer::ProgramKind;
use glam::{Mat4, Quat, Vec3};

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub struct ModelHandle(usize);

impl ModelHandle {
    pub fn from_index(index: usize) -> ModelHandle {
        ModelHandle(index)
    }

    pub fn index(&self) -> usize {
        self.0
    }
}

/// Face culling applied around a single instance's draw call.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum CullMode {
    #[default]
    None,
    Back,
    Front,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Transform {
    pub position: Vec3,
    pub scale: Vec3,
    pub rotation: Quat,
}

impl Transform {
    pub fn at(position: Vec3, scale: f32) -> Transform {
        Transform {
            position,
            scale: Vec3::splat(scale),
            rotation: Quat::IDENTITY,
        }
    }

    /// translate * rotate * scale
    pub fn matrix(&self) -> Mat4 {
        Mat4::from_scale_rotation_translation(self.scale, self.rotation, self.position)
    }
}

impl Default for Transform {
    fn default() -> Transform {
        Transform::at(Vec3::ZERO, 1.0)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum SceneModel {
    Island,
    EyeOne,
    EyeTwo,
    Lighthouse,
    Shed,
    PicnicTable,
    Tree,
    RoundTable,
    Candle,
}

impl SceneModel {
    pub const ALL: [SceneModel; 9] = [
        SceneModel::Island,
        SceneModel::EyeOne,
        SceneModel::EyeTwo,
        SceneModel::Lighthouse,
        SceneModel::Shed,
        SceneModel::PicnicTable,
        SceneModel::Tree,
        SceneModel::RoundTable,
        SceneModel::Candle,
    ];

    pub fn asset_path(self) -> &'static str {
        match self {
            SceneModel::Island => "objects/island/island.obj",
            SceneModel::EyeOne | SceneModel::EyeTwo => "objects/eyeball/eyeball.obj",
            SceneModel::Lighthouse => "objects/lighthouse/lighthouse.obj",
            SceneModel::Shed => "objects/shed/shed.obj",
            SceneModel::PicnicTable => "objects/picnic table/picnic_table.obj",
            SceneModel::Tree => "objects/tree/tree.obj",
            SceneModel::RoundTable => "objects/round-table/round_table.obj",
            SceneModel::Candle => "objects/candle/candle.obj",
        }
    }

    pub fn cull_mode(self) -> CullMode {
        match self {
            SceneModel::Lighthouse => CullMode::Back,
            _ => CullMode::None,
        }
    }

    /// Eyeballs ride on the animated point lights instead of a stored placement.
    pub fn eye_index(self) -> Option<usize> {
        match self {
            SceneModel::EyeOne => Some(0),
            SceneModel::EyeTwo => Some(1),
            _ => None,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Placement {
    pub position: Vec3,
    pub scale: f32,
}

impl Placement {
    pub fn new(position: Vec3, scale: f32) -> Placement {
        Placement { position, scale }
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct SceneLayout {
    pub island: Placement,
    pub lighthouse: Placement,
    pub shed: Placement,
    pub picnic_table: Placement,
    pub tree: Placement,
    pub round_table: Placement,
    pub candle: Placement,
    pub eye_scale: f32,
}

impl Default for SceneLayout {
    fn default() -> SceneLayout {
        SceneLayout {
            island: Placement::new(Vec3::ZERO, 0.1),
            lighthouse: Placement::new(Vec3::ZERO, 0.3),
            shed: Placement::new(Vec3::ZERO, 0.3),
            picnic_table: Placement::new(Vec3::ZERO, 1.0),
            tree: Placement::new(Vec3::ZERO, 1.0),
            round_table: Placement::new(Vec3::ZERO, 1.0),
            candle: Placement::new(Vec3::ZERO, 0.1),
            eye_scale: 1.0,
        }
    }
}

impl SceneLayout {
    pub fn placement(&self, model: SceneModel) -> Option<&Placement> {
        match model {
            SceneModel::Island => Some(&self.island),
            SceneModel::Lighthouse => Some(&self.lighthouse),
            SceneModel::Shed => Some(&self.shed),
            SceneModel::PicnicTable => Some(&self.picnic_table),
            SceneModel::Tree => Some(&self.tree),
            SceneModel::RoundTable => Some(&self.round_table),
            SceneModel::Candle => Some(&self.candle),
            SceneModel::EyeOne | SceneModel::EyeTwo => None,
        }
    }

    pub fn transform(&self, model: SceneModel, lights: &LightingState) -> Transform {
        match (self.placement(model), model.eye_index()) {
            (Some(p), _) => Transform::at(p.position, p.scale),
            (None, Some(eye)) => {
                let position = lights.eye_lights[eye].position;

                Transform {
                    position,
                    scale: Vec3::splat(self.eye_scale),
                    rotation: look_rotation(position, self.shed.position),
                }
            }
            (None, None) => Transform::default(),
        }
    }
}

/// Yaw about Y then pitch about Z so the model's +X axis points from `from` to `target`.
pub fn look_rotation(from: Vec3, target: Vec3) -> Quat {
    let direction = (target - from).normalize_or_zero();
    let yaw = direction.z.atan2(direction.x);
    let pitch = direction.y.clamp(-1.0, 1.0).asin();

    Quat::from_rotation_y(-yaw) * Quat::from_rotation_z(pitch)
}

#[derive(Clone, Debug)]
pub struct DrawableInstance {
    pub role: SceneModel,
    pub model: ModelHandle,
    pub program: ProgramKind,
    pub transform: Transform,
    pub cull_mode: CullMode,
}

impl DrawableInstance {
    pub fn new(role: SceneModel, model: ModelHandle) -> DrawableInstance {
        DrawableInstance {
            role,
            model,
            program: ProgramKind::Scene,
            transform: Transform::default(),
            cull_mode: role.cull_mode(),
        }
    }
}

/// Drawables in insertion order. No sorting is applied; everything is opaque.
#[derive(Clone, Debug, Default)]
pub struct GeometryBatch {
    instances: Vec<DrawableInstance>,
}

impl GeometryBatch {
    pub fn new() -> GeometryBatch {
        GeometryBatch {
            instances: Vec::new(),
        }
    }

    pub fn push(&mut self, instance: DrawableInstance) -> usize {
        self.instances.push(instance);
        self.instances.len() - 1
    }

    pub fn iter(&self) -> std::slice::Iter<'_, DrawableInstance> {
        self.instances.iter()
    }

    pub fn sync(&mut self, layout: &SceneLayout, lights: &LightingState) {
        for instance in self.instances.iter_mut() {
            instance.transform = layout.transform(instance.role, lights);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn full_batch() -> GeometryBatch {
        let mut batch = GeometryBatch::new();

        for (index, model) in SceneModel::ALL.iter().enumerate() {
            batch.push(DrawableInstance::new(*model, ModelHandle::from_index(index)));
        }

        batch
    }

    #[test]
    fn batch_preserves_insertion_order() {
        let batch = full_batch();
        let roles: Vec<SceneModel> = batch.iter().map(|i| i.role).collect();

        assert_eq!(roles, SceneModel::ALL.to_vec());
    }

    #[test]
    fn only_the_lighthouse_overrides_culling() {
        let batch = full_batch();

        for instance in batch.iter() {
            let expected = match instance.role {
                SceneModel::Lighthouse => CullMode::Back,
                _ => CullMode::None,
            };
            assert_eq!(instance.cull_mode, expected);
        }
    }

    #[test]
    fn transform_matrix_translates_then_scales() {
        let t = Transform::at(Vec3::new(1.0, 2.0, 3.0), 0.5);
        let p = t.matrix().transform_point3(Vec3::new(2.0, 0.0, 0.0));

        assert!((p - Vec3::new(2.0, 2.0, 3.0)).length() < 1e-6);
    }

    #[test]
    fn eyes_follow_lights_and_face_the_shed() {
        let mut layout = SceneLayout::default();
        layout.shed.position = Vec3::new(0.0, 0.0, 0.0);
        let mut lights = LightingState::default();
        lights.update(0.0, Vec3::ZERO, Vec3::NEG_Z);

        let mut batch = full_batch();
        batch.sync(&layout, &lights);

        let eye = batch.iter().find(|i| i.role == SceneModel::EyeOne).unwrap();
        assert_eq!(eye.transform.position, lights.eye_lights[0].position);

        let facing = eye.transform.rotation * Vec3::X;
        let expected = (layout.shed.position - eye.transform.position).normalize();
        assert!((facing - expected).length() < 1e-4);
    }

    #[test]
    fn look_rotation_handles_pitch() {
        let from = Vec3::new(3.0, 4.0, -2.0);
        let target = Vec3::new(-1.0, 0.5, 1.0);

        let facing = look_rotation(from, target) * Vec3::X;
        assert!((facing - (target - from).normalize()).length() < 1e-4);
    }

    #[test]
    fn user_edits_reach_the_batch_on_sync() {
        let mut layout = SceneLayout::default();
        let lights = LightingState::default();
        let mut batch = full_batch();

        layout.tree.position = Vec3::new(5.0, 0.0, 1.0);
        layout.tree.scale = 2.0;
        batch.sync(&layout, &lights);

        let tree = batch.iter().find(|i| i.role == SceneModel::Tree).unwrap();
        assert_eq!(tree.transform.position, Vec3::new(5.0, 0.0, 1.0));
        assert_eq!(tree.transform.scale, Vec3::splat(2.0));
    }
}
