//! 三维骨架化 (方向顺序细化).
//!
//! 每一轮依次从六个方向剥离边界体素. 被剥离的体素必须是简单点 (删除后不改变
//! 前景和背景的连通性), 且不是端点. 直到某一轮没有任何体素被删除为止.

use super::neighbourhood::{shift, ADJ_26, ADJ_6_IN_18, CENTER, CUBE, FACES};
use crate::{GridAttr, Idx3d, Mask};

/// 读取 `pos` 的 3x3x3 邻域. 越界视为背景.
fn cube_at(mask: &Mask, pos: Idx3d) -> [bool; 27] {
    let shape = mask.shape();
    CUBE.map(|d| shift(pos, d, shape).map_or(false, |q| mask[q]))
}

/// 在 `members` 限定的邻域位置中, 以 `adj` 邻接关系统计连通块个数.
///
/// 若 `seeds` 非空, 只统计至少包含一个种子位置的连通块.
fn count_groups(members: &[bool; 27], adj: &[Vec<usize>], seeds: Option<&[usize]>) -> usize {
    let mut seen = [false; 27];
    let mut stack = Vec::with_capacity(27);
    let mut groups = 0;
    for start in 0..27 {
        if !members[start] || seen[start] {
            continue;
        }
        seen[start] = true;
        stack.push(start);
        let mut has_seed = seeds.is_none();
        while let Some(cur) = stack.pop() {
            if let Some(s) = seeds {
                has_seed |= s.contains(&cur);
            }
            for &next in &adj[cur] {
                if members[next] && !seen[next] {
                    seen[next] = true;
                    stack.push(next);
                }
            }
        }
        if has_seed {
            groups += 1;
        }
    }
    groups
}

/// 六个面心在邻域中的编号.
fn face_indices() -> [usize; 6] {
    let mut idx = [0; 6];
    for (k, f) in FACES.iter().enumerate() {
        idx[k] = CUBE.iter().position(|d| d == f).unwrap_or(CENTER);
    }
    idx
}

/// 简单点判定:
///
/// 1. 26 邻域中的前景恰好构成一个 26 连通块;
/// 2. 18 邻域中的背景恰好有一个与中心 6 邻接的 6 连通块.
fn is_simple(cube: &[bool; 27], faces: &[usize; 6]) -> bool {
    let mut fg = *cube;
    fg[CENTER] = false;
    if count_groups(&fg, &ADJ_26, None) != 1 {
        return false;
    }

    let mut bg = [false; 27];
    for (i, b) in bg.iter_mut().enumerate() {
        *b = i != CENTER && !cube[i];
    }
    count_groups(&bg, &ADJ_6_IN_18, Some(&faces[..])) == 1
}

/// 是否为端点 (26 邻域中恰有一个前景).
#[inline]
fn is_endpoint(cube: &[bool; 27]) -> bool {
    cube.iter().filter(|p| **p).count() == 2
}

/// 三维骨架化. 结果是输入的子集, 且各连通块保持连通.
pub fn skeletonize(mask: &Mask) -> Mask {
    let shape = mask.shape();
    let faces = face_indices();
    let mut out = mask.clone();
    let mut rounds = 0;

    loop {
        rounds += 1;
        let mut removed = 0;
        for &dir in FACES.iter() {
            // 当前方向上的边界候选点.
            let candidates: Vec<Idx3d> = out
                .foreground_pos()
                .into_iter()
                .filter(|&p| shift(p, dir, shape).map_or(true, |q| !out[q]))
                .filter(|&p| {
                    let c = cube_at(&out, p);
                    !is_endpoint(&c) && is_simple(&c, &faces)
                })
                .collect();

            // 顺序删除, 删除前重新检查.
            for p in candidates {
                let c = cube_at(&out, p);
                if !is_endpoint(&c) && is_simple(&c, &faces) {
                    out[p] = false;
                    removed += 1;
                }
            }
        }
        if removed == 0 {
            break;
        }
    }
    log::debug!(
        "skeleton: {} -> {} voxels after {rounds} rounds",
        mask.count(),
        out.count()
    );
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph_3d::cleaning::components;
    use crate::morph_3d::neighbourhood::FULL;
    use itertools::iproduct;

    fn subset(a: &Mask, b: &Mask) -> bool {
        a.foreground_pos().into_iter().all(|p| b[p])
    }

    #[test]
    fn test_simple_point() {
        let faces = face_indices();
        let mut c = [false; 27];
        c[CENTER] = true;
        // 孤立点不是简单点.
        assert!(!is_simple(&c, &faces));
        // 线中间的点不是简单点.
        c[CENTER - 1] = true;
        c[CENTER + 1] = true;
        assert!(!is_simple(&c, &faces));
        // 线的端点是简单点, 但也是端点.
        c[CENTER - 1] = false;
        assert!(is_simple(&c, &faces));
        assert!(is_endpoint(&c));
    }

    #[test]
    fn test_line_unchanged() {
        let mut m = Mask::falses((5, 5, 10));
        for w in 1..9 {
            m[(2, 2, w)] = true;
        }
        assert_eq!(skeletonize(&m), m);
    }

    #[test]
    fn test_rod_to_line() {
        let mut m = Mask::falses((7, 7, 20));
        for (z, h, w) in iproduct!(2..5, 2..5, 2..18) {
            m[(z, h, w)] = true;
        }
        let s = skeletonize(&m);
        assert_eq!(s.shape(), m.shape());
        assert!(subset(&s, &m));
        assert!(!s.is_background());
        assert_eq!(components(&s, &FULL).len(), 1);
        // 中段截面只剩一个体素.
        let cross = iproduct!(0..7, 0..7).filter(|&(z, h)| s[(z, h, 10)]).count();
        assert_eq!(cross, 1);
    }

    #[test]
    fn test_components_preserved() {
        let mut m = Mask::falses((6, 6, 6));
        for (z, h, w) in iproduct!(0..2, 0..2, 0..2) {
            m[(z, h, w)] = true;
            m[(z + 4, h + 4, w + 4)] = true;
        }
        let s = skeletonize(&m);
        assert!(subset(&s, &m));
        assert_eq!(components(&s, &FULL).len(), 2);
    }
}
