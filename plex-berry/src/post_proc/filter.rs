//! 可分离高斯平滑.

use ndarray::{Array2, ArrayView2, Axis};

/// 高斯核截断于 `TRUNCATE * sigma`.
const TRUNCATE: f64 = 4.0;

/// 对平面做标准差为 `sigma` 的高斯平滑, 边界按半像素对称方式镜像延拓.
///
/// `sigma <= 0` 时返回原平面的拷贝.
pub fn gaussian_filter(plane: ArrayView2<f32>, sigma: f64) -> Array2<f32> {
    if sigma <= 0.0 || plane.is_empty() {
        return plane.to_owned();
    }
    let kernel = gaussian_kernel(sigma);
    let rows = convolve_axis(plane, &kernel, Axis(1));
    convolve_axis(rows.view(), &kernel, Axis(0))
}

/// 归一化的一维高斯核, 长度为 `2 * radius + 1`.
fn gaussian_kernel(sigma: f64) -> Vec<f64> {
    let radius = (TRUNCATE * sigma + 0.5) as isize;
    let mut kernel: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x as f64 / sigma).powi(2)).exp())
        .collect();
    let sum: f64 = kernel.iter().sum();
    kernel.iter_mut().for_each(|k| *k /= sum);
    kernel
}

/// 半像素对称镜像: `d c b a | a b c d | d c b a`.
#[inline]
fn reflect(i: isize, n: usize) -> usize {
    let n = n as isize;
    let m = i.rem_euclid(2 * n);
    (if m >= n { 2 * n - 1 - m } else { m }) as usize
}

fn convolve_axis(plane: ArrayView2<f32>, kernel: &[f64], axis: Axis) -> Array2<f32> {
    let radius = (kernel.len() / 2) as isize;
    let mut out = Array2::<f32>::zeros(plane.dim());
    for (src, mut dst) in plane.lanes(axis).into_iter().zip(out.lanes_mut(axis)) {
        let n = src.len();
        for (i, d) in dst.iter_mut().enumerate() {
            let acc: f64 = kernel
                .iter()
                .enumerate()
                .map(|(k, w)| w * src[reflect(i as isize + k as isize - radius, n)] as f64)
                .sum();
            *d = acc as f32;
        }
    }
    out
}
