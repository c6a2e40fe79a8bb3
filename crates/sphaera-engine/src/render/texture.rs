//! Texture and cubemap loading.
//!
//! Images are decoded with the `image` crate into RGBA8 and uploaded as
//! sRGB textures with linear filtering and clamp-to-edge addressing.

use std::fmt;
use std::path::{Path, PathBuf};

use image::RgbaImage;

use super::RenderCtx;

const TEXTURE_FORMAT: wgpu::TextureFormat = wgpu::TextureFormat::Rgba8UnormSrgb;

/// Cubemap faces in layer order.
pub const CUBE_FACES: [&str; 6] = ["+X", "-X", "+Y", "-Y", "+Z", "-Z"];

// ── errors ────────────────────────────────────────────────────────────────

/// Failure to turn an image file into a texture.
#[derive(Debug)]
pub enum TextureError {
    /// The file could not be opened or decoded.
    Decode { path: PathBuf, source: image::ImageError },
    /// A cubemap face is not square or differs in size from the first face.
    FaceSize {
        path: PathBuf,
        expected: Option<u32>,
        width: u32,
        height: u32,
    },
    /// The image exceeds the device's 2D texture size limit.
    TooLarge {
        path: PathBuf,
        width: u32,
        height: u32,
        max: u32,
    },
}

impl fmt::Display for TextureError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TextureError::Decode { path, source } => {
                write!(f, "failed to decode {}: {source}", path.display())
            }
            TextureError::FaceSize { path, expected: Some(size), width, height } => write!(
                f,
                "cubemap face {} is {width}x{height}, expected {size}x{size}",
                path.display()
            ),
            TextureError::FaceSize { path, expected: None, width, height } => write!(
                f,
                "cubemap face {} is {width}x{height}, faces must be square",
                path.display()
            ),
            TextureError::TooLarge { path, width, height, max } => write!(
                f,
                "{} is {width}x{height}, larger than the device limit of {max}",
                path.display()
            ),
        }
    }
}

impl std::error::Error for TextureError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TextureError::Decode { source, .. } => Some(source),
            TextureError::FaceSize { .. } | TextureError::TooLarge { .. } => None,
        }
    }
}

// ── asset paths ───────────────────────────────────────────────────────────

/// Six cubemap face files, ordered `+X, -X, +Y, -Y, +Z, -Z`.
#[derive(Debug, Clone, PartialEq)]
pub struct CubemapPaths {
    pub faces: [PathBuf; 6],
}

impl CubemapPaths {
    /// `dir/{stem}1.{ext}` .. `dir/{stem}6.{ext}` in face order.
    pub fn numbered(dir: impl AsRef<Path>, stem: &str, ext: &str) -> Self {
        let dir = dir.as_ref();
        Self {
            faces: std::array::from_fn(|i| dir.join(format!("{stem}{}.{ext}", i + 1))),
        }
    }
}

/// Files the particle renderer reads.
#[derive(Debug, Clone, PartialEq)]
pub struct TexturePaths {
    /// Texture modulated by the sprite lighting.
    pub sprite: PathBuf,
    /// Skybox faces, also sampled by reflective spheres.
    pub cubemap: CubemapPaths,
}

impl TexturePaths {
    /// Default file names (`ball1.jpg`, `cubemap1.jpg` .. `cubemap6.jpg`) under `dir`.
    pub fn under(dir: impl AsRef<Path>) -> Self {
        let dir = dir.as_ref();
        Self {
            sprite: dir.join("ball1.jpg"),
            cubemap: CubemapPaths::numbered(dir, "cubemap", "jpg"),
        }
    }
}

impl Default for TexturePaths {
    fn default() -> Self {
        Self::under("textures")
    }
}

// ── decoding ──────────────────────────────────────────────────────────────

/// Decodes `path` into RGBA8, whatever the source channel layout.
pub fn decode_rgba(path: &Path) -> Result<RgbaImage, TextureError> {
    image::open(path)
        .map(|img| img.to_rgba8())
        .map_err(|source| TextureError::Decode {
            path: path.to_path_buf(),
            source,
        })
}

/// Checks that a face is square and, if `expected` is set, of that size.
/// Returns the face size.
fn check_face(path: &Path, img: &RgbaImage, expected: Option<u32>) -> Result<u32, TextureError> {
    let (width, height) = img.dimensions();
    let square = width == height && width > 0;
    if !square || expected.is_some_and(|size| size != width) {
        return Err(TextureError::FaceSize {
            path: path.to_path_buf(),
            expected,
            width,
            height,
        });
    }
    Ok(width)
}

/// Checks that an image fits in a texture of at most `max` pixels per side.
fn check_fits(path: &Path, img: &RgbaImage, max: u32) -> Result<(), TextureError> {
    let (width, height) = img.dimensions();
    if width > max || height > max {
        return Err(TextureError::TooLarge {
            path: path.to_path_buf(),
            width,
            height,
            max,
        });
    }
    Ok(())
}

// ── textures ──────────────────────────────────────────────────────────────

/// Linear, clamp-to-edge sampler used by every texture here.
fn clamped_linear_sampler(device: &wgpu::Device, label: &str) -> wgpu::Sampler {
    device.create_sampler(&wgpu::SamplerDescriptor {
        label: Some(label),
        address_mode_u: wgpu::AddressMode::ClampToEdge,
        address_mode_v: wgpu::AddressMode::ClampToEdge,
        address_mode_w: wgpu::AddressMode::ClampToEdge,
        mag_filter: wgpu::FilterMode::Linear,
        min_filter: wgpu::FilterMode::Linear,
        ..Default::default()
    })
}

fn write_layer(
    queue: &wgpu::Queue,
    texture: &wgpu::Texture,
    layer: u32,
    width: u32,
    height: u32,
    rgba: &[u8],
) {
    queue.write_texture(
        wgpu::TexelCopyTextureInfo {
            texture,
            mip_level: 0,
            origin: wgpu::Origin3d { x: 0, y: 0, z: layer },
            aspect: wgpu::TextureAspect::All,
        },
        rgba,
        wgpu::TexelCopyBufferLayout {
            offset: 0,
            bytes_per_row: Some(4 * width),
            rows_per_image: Some(height),
        },
        wgpu::Extent3d {
            width,
            height,
            depth_or_array_layers: 1,
        },
    );
}

/// A sampled 2D texture.
pub struct Texture2d {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
}

impl Texture2d {
    /// Uploads tightly packed RGBA8 pixels.
    pub fn from_rgba(ctx: &RenderCtx<'_>, label: &str, width: u32, height: u32, rgba: &[u8]) -> Self {
        debug_assert_eq!(rgba.len(), (width * height * 4) as usize);

        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width,
                height,
                depth_or_array_layers: 1,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });
        write_layer(ctx.queue, &texture, 0, width, height, rgba);

        let view = texture.create_view(&wgpu::TextureViewDescriptor::default());
        let sampler = clamped_linear_sampler(ctx.device, label);

        Self { texture, view, sampler }
    }

    /// 1x1 white texture: sprites keep their lighting without an image.
    pub fn placeholder(ctx: &RenderCtx<'_>) -> Self {
        Self::from_rgba(ctx, "sphaera placeholder texture", 1, 1, &[255, 255, 255, 255])
    }
}

/// Loads `path` into a 2D texture.
pub fn load_texture(ctx: &RenderCtx<'_>, path: &Path) -> Result<Texture2d, TextureError> {
    let img = decode_rgba(path)?;
    check_fits(path, &img, ctx.device.limits().max_texture_dimension_2d)?;
    let (width, height) = img.dimensions();
    log::debug!("loaded texture {} ({width}x{height})", path.display());
    Ok(Texture2d::from_rgba(
        ctx,
        &path.display().to_string(),
        width,
        height,
        img.as_raw(),
    ))
}

/// A sampled cube texture.
pub struct Cubemap {
    pub texture: wgpu::Texture,
    pub view: wgpu::TextureView,
    pub sampler: wgpu::Sampler,
    pub face_size: u32,
}

impl Cubemap {
    /// Uploads six square RGBA8 faces of `size` pixels, in `CUBE_FACES` order.
    pub fn from_faces(ctx: &RenderCtx<'_>, label: &str, size: u32, faces: [&[u8]; 6]) -> Self {
        let texture = ctx.device.create_texture(&wgpu::TextureDescriptor {
            label: Some(label),
            size: wgpu::Extent3d {
                width: size,
                height: size,
                depth_or_array_layers: 6,
            },
            mip_level_count: 1,
            sample_count: 1,
            dimension: wgpu::TextureDimension::D2,
            format: TEXTURE_FORMAT,
            usage: wgpu::TextureUsages::TEXTURE_BINDING | wgpu::TextureUsages::COPY_DST,
            view_formats: &[],
        });

        for (layer, rgba) in faces.iter().enumerate() {
            write_layer(ctx.queue, &texture, layer as u32, size, size, rgba);
        }

        let view = texture.create_view(&wgpu::TextureViewDescriptor {
            label: Some(label),
            dimension: Some(wgpu::TextureViewDimension::Cube),
            ..Default::default()
        });
        let sampler = clamped_linear_sampler(ctx.device, label);

        Self {
            texture,
            view,
            sampler,
            face_size: size,
        }
    }

    /// 1x1 dark blue-grey faces: reflections and sky read as a flat backdrop.
    pub fn placeholder(ctx: &RenderCtx<'_>) -> Self {
        const FACE: [u8; 4] = [40, 44, 56, 255];
        Self::from_faces(ctx, "sphaera placeholder cubemap", 1, [&FACE; 6])
    }
}

/// Loads six face images into a cubemap.
pub fn load_cubemap(ctx: &RenderCtx<'_>, paths: &CubemapPaths) -> Result<Cubemap, TextureError> {
    let max = ctx.device.limits().max_texture_dimension_2d;
    let mut size = None;
    let mut faces = Vec::with_capacity(6);
    for (name, path) in CUBE_FACES.iter().zip(&paths.faces) {
        let img = decode_rgba(path)?;
        check_fits(path, &img, max)?;
        size = Some(check_face(path, &img, size)?);
        log::debug!("cubemap face {name}: {}", path.display());
        faces.push(img);
    }

    let size = size.unwrap_or(1);
    log::debug!("loaded cubemap ({size}x{size} faces)");

    let raw: [&[u8]; 6] = std::array::from_fn(|i| faces[i].as_raw().as_slice());
    Ok(Cubemap::from_faces(ctx, "sphaera cubemap", size, raw))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scratch_path(name: &str) -> PathBuf {
        std::env::temp_dir().join(format!("sphaera-{}-{name}", std::process::id()))
    }

    #[test]
    fn numbered_faces_follow_layer_order() {
        let paths = CubemapPaths::numbered("textures", "cubemap", "jpg");
        assert_eq!(paths.faces[0], Path::new("textures/cubemap1.jpg"));
        assert_eq!(paths.faces[5], Path::new("textures/cubemap6.jpg"));
    }

    #[test]
    fn default_paths_match_asset_layout() {
        let paths = TexturePaths::default();
        assert_eq!(paths.sprite, Path::new("textures/ball1.jpg"));
        assert_eq!(paths.cubemap.faces[2], Path::new("textures/cubemap3.jpg"));
    }

    #[test]
    fn rgb_image_decodes_with_opaque_alpha() {
        let path = scratch_path("rgb.png");
        let mut img = image::RgbImage::new(2, 1);
        img.put_pixel(0, 0, image::Rgb([10, 20, 30]));
        img.put_pixel(1, 0, image::Rgb([200, 100, 50]));
        img.save(&path).unwrap();

        let decoded = decode_rgba(&path).unwrap();
        std::fs::remove_file(&path).ok();

        assert_eq!(decoded.dimensions(), (2, 1));
        assert_eq!(decoded.get_pixel(0, 0).0, [10, 20, 30, 255]);
        assert_eq!(decoded.get_pixel(1, 0).0, [200, 100, 50, 255]);
    }

    #[test]
    fn missing_file_reports_path() {
        let path = scratch_path("does-not-exist.jpg");
        let err = decode_rgba(&path).unwrap_err();
        assert!(matches!(err, TextureError::Decode { .. }));
        assert!(err.to_string().contains("does-not-exist.jpg"));
        assert!(std::error::Error::source(&err).is_some());
    }

    #[test]
    fn square_face_passes() {
        let img = RgbaImage::new(4, 4);
        assert_eq!(check_face(Path::new("f"), &img, None).unwrap(), 4);
        assert_eq!(check_face(Path::new("f"), &img, Some(4)).unwrap(), 4);
    }

    #[test]
    fn non_square_face_is_rejected() {
        let img = RgbaImage::new(4, 2);
        let err = check_face(Path::new("f.jpg"), &img, None).unwrap_err();
        assert_eq!(err.to_string(), "cubemap face f.jpg is 4x2, faces must be square");
    }

    #[test]
    fn image_within_limit_fits() {
        let img = RgbaImage::new(16, 8);
        assert!(check_fits(Path::new("f"), &img, 16).is_ok());
    }

    #[test]
    fn oversized_image_is_rejected() {
        let img = RgbaImage::new(4, 17);
        let err = check_fits(Path::new("big.png"), &img, 16).unwrap_err();
        assert!(matches!(
            err,
            TextureError::TooLarge { width: 4, height: 17, max: 16, .. }
        ));
        assert_eq!(
            err.to_string(),
            "big.png is 4x17, larger than the device limit of 16"
        );
        assert!(std::error::Error::source(&err).is_none());
    }

    #[test]
    fn mismatched_face_is_rejected() {
        let img = RgbaImage::new(8, 8);
        let err = check_face(Path::new("f.jpg"), &img, Some(4)).unwrap_err();
        assert_eq!(err.to_string(), "cubemap face f.jpg is 8x8, expected 4x4");
    }
}
