use std::collections::VecDeque;

use ndarray::{Array2, ArrayView2, ArrayViewMut2};

use crate::{Idx2d, Mask};

/// 一个 4 连通背景区域.
struct Hollow {
    pixels: Vec<Idx2d>,
    touches_border: bool,
}

/// 收集切片中所有 4 连通的背景区域.
fn background_areas(slice: ArrayView2<'_, bool>) -> Vec<Hollow> {
    let (height, width) = slice.dim();
    let mut visited = Array2::from_elem((height, width), false);
    let mut bfs_q = VecDeque::with_capacity(4);
    let mut ans = Vec::new();

    for (pos, &p) in slice.indexed_iter() {
        if p || visited[pos] {
            continue;
        }
        visited[pos] = true;
        bfs_q.push_back(pos);
        let mut this_area = Hollow {
            pixels: Vec::with_capacity(1),
            touches_border: false,
        };
        while let Some(cur_pos) = bfs_q.pop_front() {
            this_area.pixels.push(cur_pos);

            // bfs
            let (cur_h, cur_w) = cur_pos;
            if cur_h == 0 || cur_w == 0 || cur_h + 1 == height || cur_w + 1 == width {
                this_area.touches_border = true;
            }
            let mut visit = |next: Idx2d| {
                if !slice[next] && !visited[next] {
                    visited[next] = true;
                    bfs_q.push_back(next);
                }
            };
            if cur_h > 0 {
                visit((cur_h - 1, cur_w));
            }
            if cur_h + 1 < height {
                visit((cur_h + 1, cur_w));
            }
            if cur_w > 0 {
                visit((cur_h, cur_w - 1));
            }
            if cur_w + 1 < width {
                visit((cur_h, cur_w + 1));
            }
        }
        ans.push(this_area);
    }
    ans
}

/// 填充单个切片中被前景包围, 且面积不超过 `max_size` 的背景区域.
fn fill_slice(mut slice: ArrayViewMut2<'_, bool>, max_size: usize) {
    for hollow in background_areas(slice.view()) {
        if !hollow.touches_border && hollow.pixels.len() <= max_size {
            for pos in hollow.pixels {
                slice[pos] = true;
            }
        }
    }
}

/// 逐水平切片填充空洞.
///
/// 空洞是不接触切片边界的 4 连通背景区域; 面积 (像素数) 不超过 `max_size`
/// 的空洞被填为前景. 常用于在提取骨架之前去掉环状伪影.
pub fn fill_holes(mask: &Mask, max_size: usize) -> Mask {
    let mut out = mask.clone();
    if max_size > 0 {
        out.for_each_slice_mut(|s| fill_slice(s, max_size));
    }
    log::debug!(
        "hole filling max_size={max_size}: {} voxels filled",
        out.count() - mask.count()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::GridAttr;

    /// 两层切片, 每层一个 5x5 的环, 环内空洞大小为 3x3.
    fn rings() -> Mask {
        let mut m = Mask::falses((2, 7, 7));
        for z in 0..2 {
            for h in 1..6 {
                for w in 1..6 {
                    m[(z, h, w)] = h == 1 || h == 5 || w == 1 || w == 5;
                }
            }
        }
        m
    }

    #[test]
    fn test_fill_small_hole() {
        let m = rings();
        let f = fill_holes(&m, 10);
        assert_eq!(f.shape(), m.shape());
        assert_eq!(f.count(), 2 * 25);
        // 外部背景接触边界, 不会被填.
        assert!(!f[(0, 0, 0)]);
    }

    #[test]
    fn test_large_hole_kept() {
        let m = rings();
        // 上限包含在内: 恰好 9 个像素的空洞会被填.
        assert_eq!(fill_holes(&m, 9).count(), 2 * 25);
        assert_eq!(fill_holes(&m, 8), m);
        assert_eq!(fill_holes(&m, 0), m);
    }

    #[test]
    fn test_slice_wise_only() {
        // 两层之间的 3D 空腔在每一层内都不是空洞.
        let mut m = Mask::falses((3, 5, 5));
        for h in 0..5 {
            for w in 0..5 {
                m[(0, h, w)] = true;
                m[(2, h, w)] = true;
            }
        }
        assert_eq!(fill_holes(&m, 100), m);
    }

    #[test]
    fn test_border_hollow() {
        let mut m = Mask::falses((1, 4, 4));
        // 一个从边界开口的 "U" 形.
        for h in 0..3 {
            m[(0, h, 1)] = true;
            m[(0, h, 3)] = true;
        }
        m[(0, 2, 2)] = true;
        assert_eq!(fill_holes(&m, 100), m);
    }
}
