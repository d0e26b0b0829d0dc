use super::hessian::{gaussian_kernel, separable};
use crate::consts::GAUSSIAN_TRUNCATE;
use crate::error::ensure_positive;
use crate::{StageResult, Volume};

/// 三维高斯平滑. 核在 `3 * sigma` 处截断, 边界按最近值延拓.
pub fn smooth(volume: &Volume, sigma: f64) -> StageResult<Volume> {
    volume.ensure_non_empty("smoothing")?;
    let sigma = ensure_positive("smoothing", "sigma", sigma)?;

    let kernel = gaussian_kernel(sigma, GAUSSIAN_TRUNCATE, 0);
    let k: &[f64] = &kernel;
    let out = separable(volume.data().mapv(f64::from), &[k, k, k]);
    log::debug!("smoothing sigma={sigma}: kernel of {} taps", k.len());
    Ok(Volume::new(out.mapv(|v| v as f32)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{GridAttr, StageError};
    use ndarray::Array3;

    #[test]
    fn test_smooth_impulse() {
        let mut data = Array3::<f32>::zeros((7, 7, 7));
        data[(3, 3, 3)] = 1000.0;
        let v = Volume::new(data);
        let s = smooth(&v, 1.0).unwrap();
        assert_eq!(s.shape(), v.shape());

        // 能量守恒 (冲激远离边界), 峰值变低, 且仍在原位置.
        let total: f32 = s.data().sum();
        assert!((total - 1000.0).abs() < 1e-1);
        assert!(s[(3, 3, 3)] < 1000.0);
        assert!(s[(3, 3, 3)] > s[(3, 3, 4)]);
        assert!((s[(3, 3, 4)] - s[(3, 4, 3)]).abs() < 1e-3);
    }

    #[test]
    fn test_smooth_errors() {
        let v = Volume::new(Array3::zeros((2, 2, 2)));
        assert!(matches!(
            smooth(&v, -1.0),
            Err(StageError::InvalidParameter { name: "sigma", .. })
        ));
        let v = Volume::new(Array3::zeros((2, 0, 2)));
        assert!(matches!(smooth(&v, 1.0), Err(StageError::NoInput(_))));
    }
}
