use ndarray::Array3;

use crate::error::ensure_positive;
use crate::{GridAttr, StageResult, Volume};

/// 一个轴上的采样位置: 目标下标 -> (源下标下界, 插值权重).
fn axis_samples(src_len: usize, dst_len: usize) -> Vec<(usize, f64)> {
    if dst_len <= 1 || src_len <= 1 {
        return vec![(0, 0.0); dst_len];
    }
    let step = (src_len - 1) as f64 / (dst_len - 1) as f64;
    (0..dst_len)
        .map(|i| {
            let x = i as f64 * step;
            let lo = (x.floor() as usize).min(src_len - 2);
            (lo, x - lo as f64)
        })
        .collect()
}

/// 各向同性重采样.
///
/// `spacing` 为 `(x, y, z)` 方向的物理体素间距, 分别对应 `W`, `H`, `z` 轴.
/// 每个轴按 `spacing / min(spacing)` 放大, 新长度取四舍五入 (至少为 1),
/// 首尾两个体素对齐, 三线性插值.
///
/// 三个间距相等时结果与输入相同.
pub fn isotropic(volume: &Volume, spacing: [f64; 3]) -> StageResult<Volume> {
    volume.ensure_non_empty("isotropic")?;
    let [x, y, z] = spacing;
    let x = ensure_positive("isotropic", "x", x)?;
    let y = ensure_positive("isotropic", "y", y)?;
    let z = ensure_positive("isotropic", "z", z)?;
    let base = x.min(y).min(z);

    let (lz, lh, lw) = volume.shape();
    let scaled = |len: usize, s: f64| ((len as f64 * s / base).round() as usize).max(1);
    let (nz, nh, nw) = (scaled(lz, z), scaled(lh, y), scaled(lw, x));

    let (sz, sh, sw) = (
        axis_samples(lz, nz),
        axis_samples(lh, nh),
        axis_samples(lw, nw),
    );
    let src = volume.data();
    let at = |i: usize, j: usize, k: usize| -> f64 {
        f64::from(src[(i.min(lz - 1), j.min(lh - 1), k.min(lw - 1))])
    };

    let out = Array3::from_shape_fn((nz, nh, nw), |(i, j, k)| {
        let (z0, tz) = sz[i];
        let (h0, th) = sh[j];
        let (w0, tw) = sw[k];
        let lerp = |a: f64, b: f64, t: f64| a * (1.0 - t) + b * t;

        let c00 = lerp(at(z0, h0, w0), at(z0, h0, w0 + 1), tw);
        let c01 = lerp(at(z0, h0 + 1, w0), at(z0, h0 + 1, w0 + 1), tw);
        let c10 = lerp(at(z0 + 1, h0, w0), at(z0 + 1, h0, w0 + 1), tw);
        let c11 = lerp(at(z0 + 1, h0 + 1, w0), at(z0 + 1, h0 + 1, w0 + 1), tw);
        let c0 = lerp(c00, c01, th);
        let c1 = lerp(c10, c11, th);
        lerp(c0, c1, tz) as f32
    });
    log::debug!(
        "isotropic ({x}, {y}, {z}): {:?} -> {:?}",
        (lz, lh, lw),
        (nz, nh, nw)
    );
    Ok(Volume::new(out))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::StageError;

    #[test]
    fn test_identity() {
        let data = Array3::from_shape_fn((3, 4, 5), |(z, h, w)| (z * 100 + h * 10 + w) as f32);
        let v = Volume::new(data);
        assert_eq!(isotropic(&v, [0.5, 0.5, 0.5]).unwrap(), v);
    }

    #[test]
    fn test_stretch_z() {
        // z 方向间距是平面内的两倍: z 轴长度翻倍, 线性数据保持线性.
        let data = Array3::from_shape_fn((3, 2, 2), |(z, _, _)| z as f32 * 6.0);
        let v = Volume::new(data);
        let r = isotropic(&v, [0.1, 0.1, 0.2]).unwrap();
        assert_eq!(r.shape(), (6, 2, 2));
        assert_eq!(r[(0, 0, 0)], 0.0);
        assert_eq!(r[(5, 1, 1)], 12.0);
        for i in 0..6 {
            let expected = i as f32 * 12.0 / 5.0;
            assert!((r[(i, 0, 1)] - expected).abs() < 1e-4);
        }
    }

    #[test]
    fn test_single_slice() {
        let v = Volume::new(Array3::from_elem((1, 3, 3), 2.0));
        let r = isotropic(&v, [0.108, 0.108, 0.29]).unwrap();
        assert_eq!(r.shape(), (3, 3, 3));
        assert!(r.data().iter().all(|&p| p == 2.0));
    }

    #[test]
    fn test_bad_spacing() {
        let v = Volume::new(Array3::zeros((1, 1, 1)));
        assert!(matches!(
            isotropic(&v, [0.1, 0.0, 0.1]),
            Err(StageError::InvalidParameter { name: "y", .. })
        ));
    }
}
