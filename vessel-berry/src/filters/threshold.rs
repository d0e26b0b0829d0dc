use crate::error::ensure_finite;
use crate::{Mask, StageError, StageResult, Volume};

/// 全局阈值分割: `mask = volume > mean + scale * std`.
///
/// 标准差为总体标准差. `scale` 越大, 前景越少 (单调).
pub fn threshold(volume: &Volume, scale: f64) -> StageResult<Mask> {
    let scale = ensure_finite("threshold", "scale", scale)?;
    let (mean, std) = volume
        .mean_std()
        .ok_or_else(|| StageError::NoInput("`threshold` got an empty volume".to_string()))?;
    let cutoff = mean + scale * std;

    let mask = Mask::new(volume.data().mapv(|v| f64::from(v) > cutoff));
    log::debug!(
        "threshold scale={scale}: mean {mean:.4}, std {std:.4}, {} voxels kept",
        mask.count()
    );
    Ok(mask)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridAttr;
    use ndarray::Array3;

    #[test]
    fn test_single_peak() {
        let values = vec![0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 0.0, 10.0, 0.0];
        let data = Array3::from_shape_vec((3, 3, 1), values).unwrap();
        let v = Volume::new(data);
        let m = threshold(&v, 0.0).unwrap();
        assert_eq!(m.shape(), (3, 3, 1));
        assert_eq!(m.count(), 1);
        assert!(m[(2, 1, 0)]);
    }

    #[test]
    fn test_deterministic_and_monotone() {
        let data =
            Array3::from_shape_fn((4, 5, 6), |(z, h, w)| ((z * 31 + h * 7 + w * 3) % 17) as f32);
        let v = Volume::new(data);
        assert_eq!(threshold(&v, 0.5).unwrap(), threshold(&v, 0.5).unwrap());

        let mut last = usize::MAX;
        for k in [-1.0, 0.0, 0.5, 1.0, 2.0, 5.0] {
            let n = threshold(&v, k).unwrap().count();
            assert!(n <= last, "scale {k}: {n} > {last}");
            last = n;
        }
    }

    #[test]
    fn test_errors() {
        let v = Volume::new(Array3::zeros((0, 1, 1)));
        assert!(matches!(threshold(&v, 1.0), Err(StageError::NoInput(_))));

        let v = Volume::new(Array3::zeros((1, 1, 1)));
        assert!(matches!(
            threshold(&v, f64::NAN),
            Err(StageError::InvalidParameter { .. })
        ));
        // 常数体数据: 没有体素严格大于均值.
        assert!(threshold(&v, 0.0).unwrap().is_background());
    }
}
