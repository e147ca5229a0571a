use fnv::FnvHashMap;
use gl::types::{GLenum, GLint, GLuint};
use image::RgbaImage;
use std::path::{Path, PathBuf};

/// Face order of a cube map: +X, -X, +Y, -Y, +Z, -Z.
pub const CUBE_FACES: [&str; 6] = ["right", "left", "top", "bottom", "front", "back"];

pub struct TextureManager {
    textures: FnvHashMap<PathBuf, GLuint>,
    cube_maps: FnvHashMap<String, GLuint>,
}

impl TextureManager {
    pub fn new() -> TextureManager {
        TextureManager {
            textures: FnvHashMap::default(),
            cube_maps: FnvHashMap::default(),
        }
    }

    /// Loads `path` once and returns its texture. A failed load is logged and yields `None`.
    pub fn get_texture(&mut self, path: &Path) -> Option<GLuint> {
        if let Some(texture) = self.textures.get(path) {
            return Some(*texture);
        }

        let image = match image::open(path) {
            Ok(i) => i.flipv().to_rgba8(),
            Err(e) => {
                log::warn!("Failed to load texture '{}': {}", path.display(), e);
                return None;
            }
        };

        let texture = unsafe { upload_texture_2d(&image) };
        self.textures.insert(path.to_path_buf(), texture);

        Some(texture)
    }

    /// Loads six faces into a cube map. Faces that fail to load are logged and left empty.
    pub fn load_cube_map(&mut self, name: &str, files: &[PathBuf; 6]) -> GLuint {
        let mut texture: GLuint = 0;
        let mut loaded = 0;

        unsafe {
            gl::GenTextures(1, &mut texture);
            gl::BindTexture(gl::TEXTURE_CUBE_MAP, texture);

            for (i, file) in files.iter().enumerate() {
                let image = match image::open(file) {
                    Ok(i) => i.to_rgba8(),
                    Err(e) => {
                        log::error!("Cube map face '{}' failed to load: {}", file.display(), e);
                        continue;
                    }
                };

                upload_image(gl::TEXTURE_CUBE_MAP_POSITIVE_X + i as GLenum, &image);
                loaded += 1;
            }

            gl::TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_MIN_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);
            gl::TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_WRAP_S, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_WRAP_T, gl::CLAMP_TO_EDGE as GLint);
            gl::TexParameteri(gl::TEXTURE_CUBE_MAP, gl::TEXTURE_WRAP_R, gl::CLAMP_TO_EDGE as GLint);
        }

        log::info!("Cube map '{}' loaded with {}/6 faces", name, loaded);
        self.cube_maps.insert(name.to_string(), texture);

        texture
    }

    pub unsafe fn clear_all_textures(&mut self) {
        for texture in self.textures.values() {
            gl::DeleteTextures(1, texture);
        }

        self.textures.clear();
    }

    pub unsafe fn clear_all_cube_maps(&mut self) {
        for texture in self.cube_maps.values() {
            gl::DeleteTextures(1, texture);
        }

        self.cube_maps.clear();
    }
}

impl Default for TextureManager {
    fn default() -> TextureManager {
        TextureManager::new()
    }
}

impl Drop for TextureManager {
    fn drop(&mut self) {
        unsafe {
            self.clear_all_textures();
            self.clear_all_cube_maps();
        };
    }
}

pub fn cube_face_paths(dir: &Path, extension: &str) -> [PathBuf; 6] {
    CUBE_FACES.map(|face| dir.join(format!("{}.{}", face, extension)))
}

unsafe fn upload_image(target: GLenum, image: &RgbaImage) {
    gl::TexImage2D(
        target,
        0,
        gl::RGBA as GLint,
        image.width() as GLint,
        image.height() as GLint,
        0,
        gl::RGBA,
        gl::UNSIGNED_BYTE,
        image.as_raw().as_ptr() as *const _,
    );
}

unsafe fn upload_texture_2d(image: &RgbaImage) -> GLuint {
    let mut texture: GLuint = 0;

    gl::GenTextures(1, &mut texture);
    gl::BindTexture(gl::TEXTURE_2D, texture);
    upload_image(gl::TEXTURE_2D, image);
    gl::GenerateMipmap(gl::TEXTURE_2D);

    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_S, gl::REPEAT as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_WRAP_T, gl::REPEAT as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MIN_FILTER, gl::LINEAR_MIPMAP_LINEAR as GLint);
    gl::TexParameteri(gl::TEXTURE_2D, gl::TEXTURE_MAG_FILTER, gl::LINEAR as GLint);

    texture
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cube_faces_follow_gl_face_order() {
        let paths = cube_face_paths(Path::new("skybox"), "jpg");

        assert_eq!(paths[0], Path::new("skybox/right.jpg"));
        assert_eq!(paths[3], Path::new("skybox/bottom.jpg"));
        assert_eq!(paths[5], Path::new("skybox/back.jpg"));
    }
}
