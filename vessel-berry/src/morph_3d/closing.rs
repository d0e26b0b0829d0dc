//! 立方体结构元素的二值膨胀, 腐蚀与闭运算.
//!
//! 立方体可分解为三个轴向线段, 每个轴上借助前缀和在 O(n) 内求窗口内前景个数.
//! 边长为偶数时, 结构元素的中心偏向下标较大的一侧.

use ndarray::{ArrayView1, ArrayViewMut1, Axis, Zip};

use crate::{Mask, StageError, StageResult};

/// 轴向窗口的前后延伸量 `(向前, 向后)`.
#[inline]
fn reach(kernel: usize) -> (usize, usize) {
    (kernel / 2, (kernel - 1) / 2)
}

/// 一条 lane 上的膨胀: 窗口 `[x - back, x + front]` 中存在前景即为前景. 越界视为背景.
fn dilate_line(
    src: ArrayView1<'_, bool>,
    mut dst: ArrayViewMut1<'_, bool>,
    back: usize,
    front: usize,
) {
    let n = src.len();
    let mut prefix = vec![0usize; n + 1];
    for (i, &p) in src.iter().enumerate() {
        prefix[i + 1] = prefix[i] + usize::from(p);
    }
    for x in 0..n {
        let lo = x.saturating_sub(back);
        let hi = (x + front + 1).min(n);
        dst[x] = prefix[hi] > prefix[lo];
    }
}

/// 一条 lane 上的腐蚀: 窗口 `[x - back, x + front]` 中所有界内体素均为前景即为前景.
/// 越界视为前景.
fn erode_line(
    src: ArrayView1<'_, bool>,
    mut dst: ArrayViewMut1<'_, bool>,
    back: usize,
    front: usize,
) {
    let n = src.len();
    let mut prefix = vec![0usize; n + 1];
    for (i, &p) in src.iter().enumerate() {
        prefix[i + 1] = prefix[i] + usize::from(!p);
    }
    for x in 0..n {
        let lo = x.saturating_sub(back);
        let hi = (x + front + 1).min(n);
        dst[x] = prefix[hi] == prefix[lo];
    }
}

/// 对三个轴依次施加一维操作.
fn separable<F>(mask: &Mask, line: F, back: usize, front: usize) -> Mask
where
    F: Fn(ArrayView1<'_, bool>, ArrayViewMut1<'_, bool>, usize, usize) + Sync + Send,
{
    let mut cur = mask.clone();
    for axis in 0..3 {
        let mut next = cur.clone();
        let src = cur.data();
        let mut dst = next.data_mut();
        let zip = Zip::from(src.lanes(Axis(axis))).and(dst.lanes_mut(Axis(axis)));
        cfg_if::cfg_if! {
            if #[cfg(feature = "rayon")] {
                zip.par_for_each(|s, d| line(s, d, back, front));
            } else {
                zip.for_each(|s, d| line(s, d, back, front));
            }
        }
        cur = next;
    }
    cur
}

#[inline]
fn check_kernel(stage: &'static str, kernel: usize) -> StageResult<(usize, usize)> {
    if kernel == 0 {
        Err(StageError::invalid(stage, "kernel", kernel))
    } else {
        Ok(reach(kernel))
    }
}

/// 以边长为 `kernel` 的立方体结构元素做二值膨胀.
pub fn dilate(mask: &Mask, kernel: usize) -> StageResult<Mask> {
    let (front, back) = check_kernel("dilation", kernel)?;
    Ok(separable(mask, dilate_line, back, front))
}

/// 以边长为 `kernel` 的立方体结构元素做二值腐蚀. 数据范围外视为前景.
pub fn erode(mask: &Mask, kernel: usize) -> StageResult<Mask> {
    let (front, back) = check_kernel("erosion", kernel)?;
    Ok(separable(mask, erode_line, front, back))
}

/// 二值闭运算 (先膨胀后腐蚀), 结构元素为边长 `kernel` 的立方体.
///
/// 能弥合小于结构元素的缝隙; 核太大时可能把邻近的结构连在一起.
/// 结果总是包含输入.
pub fn closing(mask: &Mask, kernel: usize) -> StageResult<Mask> {
    let out = erode(&dilate(mask, kernel)?, kernel)?;
    log::debug!(
        "closing kernel={kernel}: {} -> {} voxels",
        mask.count(),
        out.count()
    );
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridAttr;
    use ndarray::Array3;

    #[test]
    fn test_bridge_gap() {
        // 一根中间断开一个体素的线.
        let mut m = Mask::falses((5, 5, 11));
        for w in 2..9 {
            if w != 5 {
                m[(2, 2, w)] = true;
            }
        }
        let c = closing(&m, 3).unwrap();
        assert_eq!(c.shape(), m.shape());
        assert!(c[(2, 2, 5)]);
        // 闭运算不会在线以外增加体素.
        assert_eq!(c.count(), 7);
    }

    #[test]
    fn test_extensive() {
        let m = Mask::new(Array3::from_shape_fn((4, 6, 6), |(z, h, w)| (z + h * w) % 5 == 0));
        for k in 1..5 {
            let c = closing(&m, k).unwrap();
            assert!(m.foreground_pos().into_iter().all(|p| c[p]));
        }
        assert_eq!(closing(&m, 1).unwrap(), m);
    }

    #[test]
    fn test_dilate_erode_cube() {
        let mut m = Mask::falses((7, 7, 7));
        m[(3, 3, 3)] = true;
        let d = dilate(&m, 3).unwrap();
        assert_eq!(d.count(), 27);
        assert_eq!(erode(&d, 3).unwrap(), m);

        // 偶数边长.
        assert_eq!(dilate(&m, 2).unwrap().count(), 8);
        // 全前景的腐蚀在边界上也保持前景.
        let full = Mask::new(Array3::from_elem((3, 3, 3), true));
        assert_eq!(erode(&full, 5).unwrap(), full);
    }

    #[test]
    fn test_zero_kernel() {
        let m = Mask::falses((1, 1, 1));
        assert!(matches!(
            closing(&m, 0),
            Err(StageError::InvalidParameter { name: "kernel", .. })
        ));
    }
}
