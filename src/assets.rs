//! File I/O around the core: texture and OBJ loading, PNG output
//!
//! Thin wrappers over `image` and `tobj`. Everything here fails at load
//! time, before a device ever draws.

use std::path::Path;

use crate::rasterizer::{Framebuffer, Texture, TextureError, Vec2, Vec3, Vertex};
use crate::scene::Mesh;

/// Gamma used to linearize 8-bit textures on load (matches the 1/2.2
/// correction applied to textured fragments)
const DECODE_GAMMA: f32 = 2.2;

/// Error type for asset loading and saving
#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("image error: {0}")]
    Image(#[from] image::ImageError),

    #[error("OBJ error in {path}: {source}")]
    Obj {
        path: String,
        source: tobj::LoadError,
    },

    #[error("invalid texture: {0}")]
    Texture(#[from] TextureError),

    #[error("{0} contains no triangles")]
    EmptyMesh(String),
}

/// Decode an image file into a linear float RGB texture
pub fn load_texture<P: AsRef<Path>>(path: P) -> Result<Texture, AssetError> {
    let path = path.as_ref();
    let img = image::open(path)?.to_rgb32f();
    let (width, height) = img.dimensions();
    let data = img
        .into_raw()
        .into_iter()
        .map(|c| c.powf(DECODE_GAMMA))
        .collect();

    let texture = Texture::new(width as usize, height as usize, 3, data)?;
    log::info!("Loaded texture: {} ({}x{})", path.display(), width, height);
    Ok(texture)
}

/// Parse an OBJ file into a single indexed triangle mesh.
///
/// All models in the file are merged. Missing normals and texture
/// coordinates are zero.
pub fn load_obj<P: AsRef<Path>>(path: P) -> Result<Mesh, AssetError> {
    let path = path.as_ref();
    let options = tobj::LoadOptions {
        single_index: true,
        triangulate: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj(path, &options).map_err(|source| AssetError::Obj {
        path: path.display().to_string(),
        source,
    })?;

    let mut mesh = Mesh::default();
    for model in &models {
        let m = &model.mesh;
        let base = mesh.vertices.len() as u32;
        let count = m.positions.len() / 3;

        mesh.vertices.extend((0..count).map(|i| {
            let pos = Vec3::new(m.positions[3 * i], m.positions[3 * i + 1], m.positions[3 * i + 2]);
            let normal = m
                .normals
                .get(3 * i..3 * i + 3)
                .map(|n| Vec3::new(n[0], n[1], n[2]))
                .unwrap_or_default();
            let texcoord = m
                .texcoords
                .get(2 * i..2 * i + 2)
                .map(|t| Vec2::new(t[0], t[1]))
                .unwrap_or_default();
            Vertex::new(pos, normal, texcoord)
        }));
        mesh.indices.extend(m.indices.iter().map(|i| base + i));
    }

    if mesh.triangle_count() == 0 {
        return Err(AssetError::EmptyMesh(path.display().to_string()));
    }

    log::info!(
        "Loaded mesh: {} ({} vertices, {} triangles)",
        path.display(),
        mesh.vertices.len(),
        mesh.triangle_count()
    );
    Ok(mesh)
}

/// Write the framebuffer as an 8-bit RGBA PNG
pub fn save_png<P: AsRef<Path>>(fb: &Framebuffer, path: P) -> Result<(), AssetError> {
    image::save_buffer(
        path.as_ref(),
        &fb.to_rgba8(),
        fb.width as u32,
        fb.height as u32,
        image::ExtendedColorType::Rgba8,
    )?;
    log::info!("Wrote {}", path.as_ref().display());
    Ok(())
}
