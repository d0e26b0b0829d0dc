use std::ops::{Index, IndexMut};

use ndarray::{Array3, ArrayView2, ArrayView3, ArrayViewMut2, ArrayViewMut3, Axis};
use num::{ToPrimitive, Zero};

use crate::{Idx3d, StageError, StageResult};

pub mod io;

/// 三维体数据与掩码的共用属性和部分通用操作.
pub trait GridAttr {
    /// 获取数据形状大小, 按 `(z, H, W)` 组织.
    fn shape(&self) -> Idx3d;

    /// 获取水平切片个数.
    #[inline]
    fn len_z(&self) -> usize {
        self.shape().0
    }

    /// 获取数据体素个数.
    #[inline]
    fn size(&self) -> usize {
        let (z, h, w) = self.shape();
        z * h * w
    }

    /// 是否不含任何体素?
    #[inline]
    fn is_empty(&self) -> bool {
        self.size() == 0
    }
}

/// 3D 灰度体数据. 体素值以 `f32` 保存.
///
/// 体数据是不可变的流水线输入: 所有阶段都只读取它, 并返回新的数组.
#[derive(Debug, Clone, PartialEq)]
pub struct Volume {
    data: Array3<f32>,
}

impl GridAttr for Volume {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for Volume {
    type Output = f32;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl From<Array3<f32>> for Volume {
    #[inline]
    fn from(data: Array3<f32>) -> Self {
        Self::new(data)
    }
}

impl Volume {
    /// 直接由 `(z, H, W)` 组织的数组创建.
    #[inline]
    pub fn new(data: Array3<f32>) -> Self {
        Self { data }
    }

    /// 由任意数值类型的数组创建. 无法表示为 `f32` 的值被记为 `NaN`.
    pub fn from_raw<T: ToPrimitive>(data: ArrayView3<'_, T>) -> Self {
        Self {
            data: data.map(|v| v.to_f32().unwrap_or(f32::NAN)),
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, f32> {
        self.data.view()
    }

    /// 获取 3D 体数据 z 空间的第 `z_index` 层切片视图.
    ///
    /// 当 `z_index` 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, f32> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 计算均值和总体标准差 (ddof = 0). 若不含任何体素则返回 `None`.
    ///
    /// 累加在 `f64` 下进行.
    pub fn mean_std(&self) -> Option<(f64, f64)> {
        if self.is_empty() {
            return None;
        }
        let n = self.size() as f64;
        let mean = self.data.iter().map(|&v| v as f64).sum::<f64>() / n;
        let var = self
            .data
            .iter()
            .map(|&v| {
                let d = v as f64 - mean;
                d * d
            })
            .sum::<f64>()
            / n;
        Some((mean, var.sqrt()))
    }

    /// 获取最小值和最大值. `NaN` 被忽略; 若无有效值则返回 `None`.
    pub fn min_max(&self) -> Option<(f32, f32)> {
        self.data
            .iter()
            .copied()
            .filter(|v| !v.is_nan())
            .fold(None, |acc, v| match acc {
                None => Some((v, v)),
                Some((lo, hi)) => Some((lo.min(v), hi.max(v))),
            })
    }

    /// 若体数据为空, 返回 [`StageError::NoInput`].
    #[inline]
    pub(crate) fn ensure_non_empty(&self, stage: &str) -> StageResult<()> {
        if self.is_empty() {
            Err(StageError::NoInput(format!("`{stage}` got an empty volume")))
        } else {
            Ok(())
        }
    }
}

/// 3D 二值掩码. 体素值以 `bool` 保存, 形状与产生它的体数据完全一致.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Mask {
    data: Array3<bool>,
}

impl GridAttr for Mask {
    #[inline]
    fn shape(&self) -> Idx3d {
        self.data.dim()
    }
}

impl Index<Idx3d> for Mask {
    type Output = bool;

    #[inline]
    fn index(&self, index: Idx3d) -> &Self::Output {
        &self.data[index]
    }
}

impl IndexMut<Idx3d> for Mask {
    #[inline]
    fn index_mut(&mut self, index: Idx3d) -> &mut Self::Output {
        &mut self.data[index]
    }
}

impl From<Array3<bool>> for Mask {
    #[inline]
    fn from(data: Array3<bool>) -> Self {
        Self::new(data)
    }
}

impl Mask {
    /// 直接由 `(z, H, W)` 组织的布尔数组创建.
    #[inline]
    pub fn new(data: Array3<bool>) -> Self {
        Self { data }
    }

    /// 创建给定形状的全背景掩码.
    #[inline]
    pub fn falses((z, h, w): Idx3d) -> Self {
        Self {
            data: Array3::from_elem((z, h, w), false),
        }
    }

    /// 由任意数值数组创建. 非零值视为前景.
    pub fn from_nonzero<T: Zero>(data: ArrayView3<'_, T>) -> Self {
        Self {
            data: data.map(|v| !v.is_zero()),
        }
    }

    /// 获得数据的一份不可变 shallow copy.
    #[inline]
    pub fn data(&self) -> ArrayView3<'_, bool> {
        self.data.view()
    }

    /// 获得数据的一份可变 shallow copy.
    #[inline]
    pub fn data_mut(&mut self) -> ArrayViewMut3<'_, bool> {
        self.data.view_mut()
    }

    /// 前景体素个数.
    #[inline]
    pub fn count(&self) -> usize {
        self.data.iter().filter(|p| **p).count()
    }

    /// 是否全为背景?
    #[inline]
    pub fn is_background(&self) -> bool {
        !self.data.iter().any(|p| *p)
    }

    /// 获取 z 空间的第 `z_index` 层不可变切片. 越界时 panic.
    #[inline]
    pub fn slice_at(&self, z_index: usize) -> ArrayView2<'_, bool> {
        self.data.index_axis(Axis(0), z_index)
    }

    /// 获取能按升序迭代水平可变切片的迭代器.
    #[inline]
    pub fn slice_iter_mut(&mut self) -> impl ExactSizeIterator<Item = ArrayViewMut2<'_, bool>> {
        self.data.axis_iter_mut(Axis(0))
    }

    /// 收集所有前景体素的下标. 结果按行优先存储.
    pub fn foreground_pos(&self) -> Vec<Idx3d> {
        self.data
            .indexed_iter()
            .filter_map(|(pos, p)| p.then_some(pos))
            .collect()
    }

    /// 检查 `other` 与自身形状一致.
    #[inline]
    pub fn ensure_same_shape<G: GridAttr>(&self, other: &G) -> StageResult<()> {
        let (expected, found) = (self.shape(), other.shape());
        if expected == found {
            Ok(())
        } else {
            Err(StageError::ShapeMismatch { expected, found })
        }
    }

    /// 对每个水平可变切片实施 `op` 操作. 打开 `rayon` feature 时并行执行.
    pub fn for_each_slice_mut<F>(&mut self, op: F)
    where
        F: Fn(ArrayViewMut2<'_, bool>) + Sync + Send,
    {
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                self.par_for_each_slice_mut(op);
            } else {
                self.slice_iter_mut().for_each(op);
            }
        }
    }
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IntoParallelIterator, ParallelIterator};
    }
}

/// 并发操作部分
#[cfg(feature = "rayon")]
impl Mask {
    /// 借助 `rayon`, 并行地对 3D 掩码每个水平可变切片实施 `op` 操作.
    pub fn par_for_each_slice_mut<F>(&mut self, op: F)
    where
        F: Fn(ArrayViewMut2<'_, bool>) + Sync + Send,
    {
        self.data
            .axis_iter_mut(Axis(0))
            .into_par_iter()
            .for_each(op);
    }
}
