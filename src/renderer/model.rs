use crate::renderer::shader_manager::MaterialUniforms;
use bytemuck::{Pod, Zeroable};
use core::ffi::c_void;
use gl::types::{GLboolean, GLenum, GLsizei, GLsizeiptr, GLuint};
use glam::{Vec2, Vec3};
use std::mem::{offset_of, size_of};

#[repr(C)]
#[derive(Clone, Copy, Debug, Default, PartialEq, Pod, Zeroable)]
pub struct Vertex {
    pub position: Vec3,
    pub normal: Vec3,
    pub uv: Vec2,
}

impl Vertex {
    pub fn new(position: Vec3, normal: Vec3, uv: Vec2) -> Vertex {
        Vertex {
            position,
            normal,
            uv,
        }
    }
}

pub struct Mesh {
    vao: GLuint,
    vbo: GLuint,
    ibo: (GLuint, GLsizei),
    render_mode: GLenum,
}

impl Mesh {
    pub fn new(render_mode: GLenum, vertices: &[Vertex], indices: &[u32]) -> Mesh {
        let mut vao = 0;
        let mut vbo = 0;
        let mut ibo = 0;

        let vertex_bytes: &[u8] = bytemuck::cast_slice(vertices);
        let index_bytes: &[u8] = bytemuck::cast_slice(indices);

        unsafe {
            gl::GenVertexArrays(1, &mut vao);
            gl::BindVertexArray(vao);

            gl::GenBuffers(1, &mut vbo);
            gl::BindBuffer(gl::ARRAY_BUFFER, vbo);
            gl::BufferData(
                gl::ARRAY_BUFFER,
                vertex_bytes.len() as GLsizeiptr,
                vertex_bytes.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );

            gl::GenBuffers(1, &mut ibo);
            gl::BindBuffer(gl::ELEMENT_ARRAY_BUFFER, ibo);
            gl::BufferData(
                gl::ELEMENT_ARRAY_BUFFER,
                index_bytes.len() as GLsizeiptr,
                index_bytes.as_ptr() as *const c_void,
                gl::STATIC_DRAW,
            );

            vertex_attribute(0, 3, offset_of!(Vertex, position));
            vertex_attribute(1, 3, offset_of!(Vertex, normal));
            vertex_attribute(2, 2, offset_of!(Vertex, uv));

            gl::BindVertexArray(0);
        }

        Mesh {
            vao,
            vbo,
            ibo: (ibo, indices.len() as GLsizei),
            render_mode,
        }
    }

    pub unsafe fn draw(&self) {
        gl::BindVertexArray(self.vao);
        gl::DrawElements(self.render_mode, self.ibo.1, gl::UNSIGNED_INT, std::ptr::null());
        gl::BindVertexArray(0);
    }
}

unsafe fn vertex_attribute(index: GLuint, components: i32, offset: usize) {
    gl::EnableVertexAttribArray(index);
    gl::VertexAttribPointer(
        index,
        components,
        gl::FLOAT,
        gl::FALSE as GLboolean,
        size_of::<Vertex>() as GLsizei,
        offset as *const c_void,
    );
}

impl Drop for Mesh {
    fn drop(&mut self) {
        unsafe {
            gl::DeleteBuffers(1, &self.vbo);
            gl::DeleteBuffers(1, &self.ibo.0);
            gl::DeleteVertexArrays(1, &self.vao);
        }
    }
}

/// Texture names are owned by the texture manager; 0 means the map was missing.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MeshMaterial {
    pub diffuse: GLuint,
    pub specular: GLuint,
    pub shininess: f32,
}

pub const DEFAULT_SHININESS: f32 = 32.0;

impl Default for MeshMaterial {
    fn default() -> MeshMaterial {
        MeshMaterial {
            diffuse: 0,
            specular: 0,
            shininess: DEFAULT_SHININESS,
        }
    }
}

pub struct Model {
    meshes: Vec<(Mesh, MeshMaterial)>,
}

impl Model {
    pub fn new(meshes: Vec<(Mesh, MeshMaterial)>) -> Model {
        Model { meshes }
    }

    /// Draws every mesh with the scene program, which must already be active.
    pub unsafe fn draw(&self, material: &MaterialUniforms) {
        for (mesh, m) in self.meshes.iter() {
            material.bind(m.diffuse, m.specular, m.shininess);
            mesh.draw();
        }
    }
}

pub fn screen_quad() -> (Vec<Vertex>, Vec<u32>) {
    let corner = |x: f32, y: f32| {
        Vertex::new(
            Vec3::new(x, y, 0.0),
            Vec3::Z,
            Vec2::new((x + 1.0) / 2.0, (y + 1.0) / 2.0),
        )
    };

    (
        vec![corner(-1.0, 1.0), corner(-1.0, -1.0), corner(1.0, 1.0), corner(1.0, -1.0)],
        vec![0, 1, 2, 3],
    )
}

/// Unit cube centred on the origin for the skybox. Faces wind inward.
pub fn skybox_cube() -> (Vec<Vertex>, Vec<u32>) {
    let vertices = (0..8)
        .map(|i| {
            let x = if i & 1 == 0 { -1.0 } else { 1.0 };
            let y = if i & 2 == 0 { -1.0 } else { 1.0 };
            let z = if i & 4 == 0 { -1.0 } else { 1.0 };
            let position = Vec3::new(x, y, z);

            Vertex::new(position, -position.normalize(), Vec2::ZERO)
        })
        .collect();

    let indices = vec![
        0, 1, 2, 1, 3, 2, // -z
        4, 6, 5, 5, 6, 7, // +z
        0, 4, 1, 1, 4, 5, // -y
        2, 3, 6, 3, 7, 6, // +y
        0, 2, 4, 2, 6, 4, // -x
        1, 5, 3, 3, 5, 7, // +x
    ];

    (vertices, indices)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn vertex_is_tightly_packed() {
        assert_eq!(size_of::<Vertex>(), 8 * size_of::<f32>());
        assert_eq!(offset_of!(Vertex, normal), 3 * size_of::<f32>());
        assert_eq!(offset_of!(Vertex, uv), 6 * size_of::<f32>());
    }

    #[test]
    fn screen_quad_covers_clip_space() {
        let (vertices, indices) = screen_quad();

        assert_eq!(indices.len(), 4);
        for v in vertices.iter() {
            assert_eq!(v.position.x.abs(), 1.0);
            assert_eq!(v.position.y.abs(), 1.0);
            assert!(v.uv.cmpge(Vec2::ZERO).all() && v.uv.cmple(Vec2::ONE).all());
        }
    }

    #[test]
    fn skybox_faces_point_inward() {
        let (vertices, indices) = skybox_cube();

        assert_eq!(indices.len(), 36);

        for tri in indices.chunks(3) {
            let a = vertices[tri[0] as usize].position;
            let b = vertices[tri[1] as usize].position;
            let c = vertices[tri[2] as usize].position;

            let normal = (b - a).cross(c - a);
            let centre = (a + b + c) / 3.0;

            assert!(normal.dot(centre) < 0.0, "triangle {:?} faces outward", tri);
        }
    }
}
