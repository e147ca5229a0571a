use crate::error::{Result, ViewerError};
use crate::renderer::model::{Mesh, MeshMaterial, Model, Vertex, DEFAULT_SHININESS};
use crate::renderer::texture_manager::TextureManager;
use crate::scene::ModelHandle;
use fnv::FnvHashMap;
use glam::{Vec2, Vec3};
use std::path::{Path, PathBuf};

/// Owns every loaded model. Loading the same path twice returns the first handle.
pub struct ModelManager {
    models: Vec<Model>,
    by_path: FnvHashMap<PathBuf, ModelHandle>,
}

impl ModelManager {
    pub fn new() -> ModelManager {
        ModelManager {
            models: Vec::new(),
            by_path: FnvHashMap::default(),
        }
    }

    pub fn get_model(&self, handle: ModelHandle) -> Option<&Model> {
        self.models.get(handle.index())
    }

    pub fn load_model(&mut self, path: &Path, textures: &mut TextureManager) -> Result<ModelHandle> {
        if let Some(handle) = self.by_path.get(path) {
            return Ok(*handle);
        }

        let (obj_models, obj_materials) =
            tobj::load_obj(path, &tobj::GPU_LOAD_OPTIONS).map_err(|source| ViewerError::Model {
                path: path.display().to_string(),
                source,
            })?;

        let obj_materials = match obj_materials {
            Ok(m) => m,
            Err(e) => {
                log::warn!("No materials for '{}': {}", path.display(), e);
                Vec::new()
            }
        };

        let directory = path.parent().unwrap_or_else(|| Path::new(""));

        let materials: Vec<MeshMaterial> = obj_materials
            .iter()
            .map(|m| MeshMaterial {
                diffuse: material_texture(directory, m.diffuse_texture.as_deref(), textures),
                specular: material_texture(directory, m.specular_texture.as_deref(), textures),
                shininess: match m.shininess {
                    Some(s) if s > 0.0 => s,
                    _ => DEFAULT_SHININESS,
                },
            })
            .collect();

        let meshes = obj_models
            .iter()
            .map(|m| {
                let vertices = interleave(&m.mesh.positions, &m.mesh.normals, &m.mesh.texcoords);
                let material = m
                    .mesh
                    .material_id
                    .and_then(|id| materials.get(id).copied())
                    .unwrap_or_default();

                (Mesh::new(gl::TRIANGLES, &vertices, &m.mesh.indices), material)
            })
            .collect::<Vec<_>>();

        log::info!("Loaded model '{}' ({} meshes)", path.display(), meshes.len());

        let handle = ModelHandle::from_index(self.models.len());
        self.models.push(Model::new(meshes));
        self.by_path.insert(path.to_path_buf(), handle);

        Ok(handle)
    }
}

impl Default for ModelManager {
    fn default() -> ModelManager {
        ModelManager::new()
    }
}

fn material_texture(directory: &Path, name: Option<&str>, textures: &mut TextureManager) -> u32 {
    match name {
        Some(name) if !name.is_empty() => textures.get_texture(&directory.join(name)).unwrap_or(0),
        _ => 0,
    }
}

/// Missing normals or texture coordinates are zero-filled.
pub fn interleave(positions: &[f32], normals: &[f32], texcoords: &[f32]) -> Vec<Vertex> {
    let count = positions.len() / 3;

    (0..count)
        .map(|i| {
            let position = Vec3::from_slice(&positions[i * 3..i * 3 + 3]);

            let normal = match normals.get(i * 3..i * 3 + 3) {
                Some(n) => Vec3::from_slice(n),
                None => Vec3::ZERO,
            };

            let uv = match texcoords.get(i * 2..i * 2 + 2) {
                Some(t) => Vec2::from_slice(t),
                None => Vec2::ZERO,
            };

            Vertex::new(position, normal, uv)
        })
        .collect()
}
