//! Hessian 管状结构 (vesselness) 滤波.

use ndarray::{Array2, Array3, ArrayView2, Axis, Zip};

use super::cutoff::CutoffMethod;
use super::hessian::{objectness, sym_eigenvalues_2, sym_eigenvalues_3, Hessian2, Hessian3};
use crate::consts::HESSIAN_TRUNCATE;
use crate::data::io::stack_slices;
use crate::error::{ensure_finite, ensure_positive};
use crate::{Mask, StageError, StageResult, Volume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// vesselness 的计算维度.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum OperationDim {
    /// 每个水平切片独立计算 2D 响应, 再按原顺序堆叠.
    ///
    /// 层间分辨率太低, 无法估计 3D 结构时使用.
    Two,

    /// 整体计算 3D 响应.
    Three,
}

impl OperationDim {
    /// 由整数维度构造. 只接受 2 或 3.
    pub fn from_dim(dim: usize) -> StageResult<Self> {
        match dim {
            2 => Ok(Self::Two),
            3 => Ok(Self::Three),
            _ => Err(StageError::invalid("vesselness", "operation_dim", dim)),
        }
    }

    /// 整数维度.
    #[inline]
    pub fn dim(&self) -> usize {
        match self {
            Self::Two => 2,
            Self::Three => 3,
        }
    }
}

/// 单个切片的 2D objectness 响应.
fn response_2d(slice: ArrayView2<'_, f32>, sigma: f64, gamma: f64) -> Array2<f32> {
    let h = Hessian2::compute(slice, sigma, HESSIAN_TRUNCATE);
    Zip::from(&h.hh)
        .and(&h.hw)
        .and(&h.ww)
        .map_collect(|&a, &b, &c| objectness(sym_eigenvalues_2(a, b, c), gamma) as f32)
}

/// 计算连续值的 vesselness 响应, 形状与输入一致.
///
/// `sigma` 必须为有限正数, `gamma` 必须为有限数.
pub fn vesselness_response(
    volume: &Volume,
    sigma: f64,
    gamma: f64,
    dim: OperationDim,
) -> StageResult<Array3<f32>> {
    volume.ensure_non_empty("vesselness")?;
    let sigma = ensure_positive("vesselness", "sigma", sigma)?;
    let gamma = ensure_finite("vesselness", "gamma", gamma)?;

    let data = volume.data();
    let response = match dim {
        OperationDim::Three => {
            let h = Hessian3::compute(data, sigma, HESSIAN_TRUNCATE);
            let mut out = Array3::<f32>::zeros(data.raw_dim());
            let voxel = |idx: (usize, usize, usize), o: &mut f32| {
                let e = sym_eigenvalues_3(
                    h.zz[idx], h.hh[idx], h.ww[idx], h.zh[idx], h.zw[idx], h.hw[idx],
                );
                *o = objectness(e, gamma) as f32;
            };
            cfg_if::cfg_if! {
                if #[cfg(feature = "rayon")] {
                    Zip::indexed(&mut out).par_for_each(voxel);
                } else {
                    Zip::indexed(&mut out).for_each(voxel);
                }
            }
            out
        }
        OperationDim::Two => {
            #[cfg(feature = "rayon")]
            let slices: Vec<Array2<f32>> = {
                use rayon::iter::{IntoParallelIterator, ParallelIterator};
                data.axis_iter(Axis(0))
                    .into_par_iter()
                    .map(|s| response_2d(s, sigma, gamma))
                    .collect()
            };
            #[cfg(not(feature = "rayon"))]
            let slices: Vec<Array2<f32>> = data
                .axis_iter(Axis(0))
                .map(|s| response_2d(s, sigma, gamma))
                .collect();

            stack_slices(&slices)
                .ok_or_else(|| StageError::NoInput("vesselness: no slice to stack".to_string()))?
        }
    };
    Ok(response)
}

/// vesselness 滤波并以 `cutoff` 二值化: `mask = response > cutoff(response)`.
pub fn vesselness(
    volume: &Volume,
    sigma: f64,
    gamma: f64,
    cutoff: CutoffMethod,
    dim: OperationDim,
) -> StageResult<Mask> {
    let response = vesselness_response(volume, sigma, gamma, dim)?;
    let samples: Vec<f64> = response.iter().map(|&v| f64::from(v)).collect();
    let t = cutoff.eval(&samples);
    let mask = Mask::new(response.mapv(|v| f64::from(v) > t));
    log::debug!(
        "vesselness sigma={sigma} gamma={gamma} {cutoff} {}D: cutoff {t:.6}, {} voxels kept",
        dim.dim(),
        mask.count()
    );
    Ok(mask)
}

/// 与 [`vesselness`] 相同, 但截断方法以名字给出 (见 [`CutoffMethod::NAMES`]).
///
/// 名字在计算响应之前解析, 因此未知名字会立即返回 [`StageError::UnknownMethod`].
pub fn vesselness_named(
    volume: &Volume,
    sigma: f64,
    gamma: f64,
    cutoff: &str,
    dim: OperationDim,
) -> StageResult<Mask> {
    let method: CutoffMethod = cutoff.parse()?;
    vesselness(volume, sigma, gamma, method, dim)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridAttr;

    /// 沿 W 方向的一根亮管, 截面为 3x3, 位于体数据中心.
    fn tube_volume() -> Volume {
        let mut data = Array3::<f32>::zeros((9, 9, 20));
        for z in 3..6 {
            for h in 3..6 {
                for w in 0..20 {
                    data[(z, h, w)] = 100.0;
                }
            }
        }
        Volume::new(data)
    }

    #[test]
    fn test_tube_detected() {
        let v = tube_volume();
        let m = vesselness(&v, 1.0, 5.0, CutoffMethod::Otsu, OperationDim::Three).unwrap();
        assert_eq!(m.shape(), v.shape());
        assert!(m[(4, 4, 10)]);
        assert!(!m[(0, 0, 10)]);
        assert!(!m[(8, 8, 0)]);
    }

    #[test]
    fn test_slice_wise() {
        let v = tube_volume();
        let m = vesselness(&v, 1.0, 5.0, CutoffMethod::Li, OperationDim::Two).unwrap();
        assert_eq!(m.shape(), v.shape());
        // 2D 下, 管在中间层切片中是一条亮线.
        assert!(m[(4, 4, 10)]);
        // 没有管的切片无响应.
        assert!(m.slice_at(0).iter().all(|p| !p));
    }

    #[test]
    fn test_constant_cutoff() {
        let v = tube_volume();
        let r = vesselness_response(&v, 1.0, 5.0, OperationDim::Three).unwrap();
        let m = vesselness(&v, 1.0, 5.0, CutoffMethod::Constant(0.0), OperationDim::Three).unwrap();
        assert_eq!(m.count(), r.iter().filter(|&&x| x > 0.0).count());

        let high = vesselness(&v, 1.0, 5.0, CutoffMethod::Constant(1e9), OperationDim::Three)
            .unwrap();
        assert!(high.is_background());
    }

    #[test]
    fn test_flat_volume() {
        let v = Volume::new(Array3::from_elem((3, 4, 4), 7.0));
        for m in [CutoffMethod::Li, CutoffMethod::Otsu, CutoffMethod::Triangle] {
            assert!(vesselness(&v, 1.0, 5.0, m, OperationDim::Three)
                .unwrap()
                .is_background());
        }
    }

    #[test]
    fn test_bogus_method() {
        let v = tube_volume();
        assert_eq!(
            vesselness_named(&v, 1.0, 5.0, "threshold_bogus", OperationDim::Three),
            Err(StageError::UnknownMethod("threshold_bogus".to_string()))
        );
    }

    #[test]
    fn test_invalid_parameters() {
        let v = tube_volume();
        assert!(matches!(
            vesselness(&v, 0.0, 5.0, CutoffMethod::Li, OperationDim::Three),
            Err(StageError::InvalidParameter { name: "sigma", .. })
        ));
        assert!(matches!(
            OperationDim::from_dim(4),
            Err(StageError::InvalidParameter { .. })
        ));
        let empty = Volume::new(Array3::zeros((0, 2, 2)));
        assert!(matches!(
            vesselness(&empty, 1.0, 5.0, CutoffMethod::Li, OperationDim::Two),
            Err(StageError::NoInput(_))
        ));
    }
}
