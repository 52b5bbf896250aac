//! 对 `plex-berry::dataset` 的更一层封装. 提供更直接的图像加载器.

use log::{info, warn};
use ndarray::Array4;
use plex_berry::data::Image;
use plex_berry::dataset;
use std::env;
use std::path::PathBuf;

/// 合成图像的亮点位置 `(batch, height, width, channel)`.
pub const SPOT: (usize, usize, usize, usize) = (0, 200, 200, 0);

/// 合成图像的亮点强度.
pub const SPOT_VALUE: f32 = 5000.0;

/// 获取输入图像 npz 路径. 即环境变量 `$PLEX_IMAGE_NPZ` 的值.
pub fn image_path_from_env() -> Option<PathBuf> {
    env::var_os("PLEX_IMAGE_NPZ").map(PathBuf::from)
}

/// 获取 npz 内的图像名称.
///
/// 1. 若环境变量 `$PLEX_IMAGE_NAME` 非空, 则返回其值;
/// 2. 否则, 返回 `image.npy`.
pub fn image_name_from_env() -> String {
    env::var("PLEX_IMAGE_NAME").unwrap_or_else(|_| "image.npy".to_string())
}

/// 合成一张 (1, 300, 300, 2) 的双通道图像.
///
/// 背景为周期纹理 `(31 * h + 17 * w) % 100`, 核通道在 [`SPOT`] 处有一个强度为
/// [`SPOT_VALUE`] 的亮点.
pub fn synthetic_image() -> Image {
    let mut image = Array4::from_shape_fn((1, 300, 300, 2), |(_, h, w, c)| {
        ((h * 31 + w * 17 + c * 7) % 100) as f32
    });
    image[SPOT] = SPOT_VALUE;
    image
}

/// 从 `$PLEX_IMAGE_NPZ` 加载图像. 未设置或加载失败时退回 [`synthetic_image`].
pub fn image_from_env_or_synthetic() -> Image {
    let Some(path) = image_path_from_env() else {
        info!("$PLEX_IMAGE_NPZ not set, using a synthetic image");
        return synthetic_image();
    };
    let name = image_name_from_env();
    match dataset::read_image(&path, &name) {
        Ok(image) => image,
        Err(e) => {
            warn!("failed to load `{name}` from {}: {e}", path.display());
            synthetic_image()
        }
    }
}
