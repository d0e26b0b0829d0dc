use std::collections::VecDeque;

use itertools::iproduct;
use ndarray::{Array2, Array3, ArrayView2, Zip};

use super::edt::distance_to_foreground;
use super::neighbourhood::{shift, Offset3d};
use super::skeleton_2d::skeletonize_2d;
use crate::error::ensure_finite;
use crate::{GridAttr, Idx2d, Mask, StageError, StageResult};

/// 半径为 `r` 的球形结构元素偏移量 (`dz^2 + dh^2 + dw^2 <= r^2`).
fn ball(r: usize) -> Vec<Offset3d> {
    let r = r as isize;
    iproduct!(-r..=r, -r..=r, -r..=r)
        .filter(|&(z, h, w)| z * z + h * h + w * w <= r * r)
        .collect()
}

/// 切片中骨架为空的 8 连通前景分量的全部像素.
///
/// Zhang-Suen 会把 2x2 的小块整块删掉, 这些分量没有可以依靠的骨架.
fn orphan_pixels(slice: ArrayView2<'_, bool>, skeleton: ArrayView2<'_, bool>) -> Vec<Idx2d> {
    let (height, width) = slice.dim();
    let mut visited = Array2::from_elem((height, width), false);
    let mut bfs_q = VecDeque::with_capacity(8);
    let mut ans = Vec::new();

    for (pos, &p) in slice.indexed_iter() {
        if !p || visited[pos] {
            continue;
        }
        visited[pos] = true;
        bfs_q.push_back(pos);
        let mut this_component = Vec::with_capacity(4);
        let mut on_skeleton = false;
        while let Some(cur_pos) = bfs_q.pop_front() {
            this_component.push(cur_pos);
            on_skeleton |= skeleton[cur_pos];

            let (cur_h, cur_w) = cur_pos;
            for (dh, dw) in iproduct!(-1isize..=1, -1isize..=1) {
                let next = match (cur_h.checked_add_signed(dh), cur_w.checked_add_signed(dw)) {
                    (Some(y), Some(x)) if y < height && x < width => (y, x),
                    _ => continue,
                };
                if slice[next] && !visited[next] {
                    visited[next] = true;
                    bfs_q.push_back(next);
                }
            }
        }
        if !on_skeleton {
            ans.extend(this_component);
        }
    }
    ans
}

/// 安全区: 逐切片求骨架, 到骨架距离超过 `min_thickness` 的像素.
///
/// 空切片没有安全区. 骨架为空的分量整体不在安全区内.
fn safe_zone(mask: &Mask, min_thickness: f64) -> Mask {
    let mut safe = mask.clone();
    safe.for_each_slice_mut(|mut s| {
        if !s.iter().any(|p| *p) {
            return;
        }
        let skeleton = skeletonize_2d(s.view());
        let orphans = orphan_pixels(s.view(), skeleton.view());
        let dist = distance_to_foreground(skeleton.view());
        Zip::from(&mut s)
            .and(&dist)
            .for_each(|p, &d| *p = d > min_thickness + 1e-5);
        for pos in orphans {
            s[pos] = false;
        }
    });
    safe
}

/// 拓扑保持细化.
///
/// 已经不比 `min_thickness` 粗的结构 (即所有像素到本切片骨架的距离都不超过
/// `min_thickness`) 保持不变; 其余结构至多剥去 `thin` 层表面体素.
/// 剥去的体素只来自远离骨架的一侧, 因此不会切断结构的连通性.
pub fn thin(mask: &Mask, min_thickness: f64, thin: usize) -> StageResult<Mask> {
    let min_thickness = ensure_finite("thinning", "min_thickness", min_thickness)?;
    if min_thickness < 0.0 {
        return Err(StageError::invalid("thinning", "min_thickness", min_thickness));
    }
    if thin == 0 || mask.is_background() {
        return Ok(mask.clone());
    }

    let safe = safe_zone(mask, min_thickness);
    let offsets = ball(thin);
    let shape = mask.shape();
    let src = mask.data();

    // 表面层: 前景中被球形结构元素腐蚀掉的部分. 越界邻居不参与比较.
    let mut out = Array3::from_elem(shape, false);
    let voxel = |pos: (usize, usize, usize), o: &mut bool| {
        if !src[pos] {
            return;
        }
        let surface = offsets
            .iter()
            .filter_map(|&d| shift(pos, d, shape))
            .any(|q| !src[q]);
        *o = !(surface && safe[pos]);
    };
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            Zip::indexed(&mut out).par_for_each(voxel);
        } else {
            Zip::indexed(&mut out).for_each(voxel);
        }
    }

    let out = Mask::new(out);
    log::debug!(
        "thinning min_thickness={min_thickness} thin={thin}: {} -> {} voxels",
        mask.count(),
        out.count()
    );
    Ok(out)
}
