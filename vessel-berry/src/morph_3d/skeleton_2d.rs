//! 二维骨架 (Zhang-Suen 并行细化).

use ndarray::{Array2, ArrayView2};

use crate::Idx2d;

/// 按 P2, P3, ..., P9 (从正上方开始顺时针) 排列的 8 邻域偏移.
const RING: [(isize, isize); 8] = [
    (-1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
    (1, 0),
    (1, -1),
    (0, -1),
    (-1, -1),
];

/// 读取 `(h, w)` 的 8 邻域. 越界视为背景.
fn ring(img: &Array2<bool>, (h, w): Idx2d) -> [bool; 8] {
    let (height, width) = img.dim();
    RING.map(|(dh, dw)| {
        match (h.checked_add_signed(dh), w.checked_add_signed(dw)) {
            (Some(y), Some(x)) if y < height && x < width => img[(y, x)],
            _ => false,
        }
    })
}

/// 一次子迭代中可删除的像素.
fn deletable(img: &Array2<bool>, first_pass: bool) -> Vec<Idx2d> {
    img.indexed_iter()
        .filter(|&(_, &p)| p)
        .filter_map(|(pos, _)| {
            let n = ring(img, pos);
            let b = n.iter().filter(|p| **p).count();
            let a = (0..8).filter(|&i| !n[i] && n[(i + 1) % 8]).count();
            let [p2, _, p4, _, p6, _, p8, _] = n;
            let cond = if first_pass {
                !(p2 && p4 && p6) && !(p4 && p6 && p8)
            } else {
                !(p2 && p4 && p8) && !(p2 && p6 && p8)
            };
            ((2..=6).contains(&b) && a == 1 && cond).then_some(pos)
        })
        .collect()
}

/// 计算二维骨架. 结果是输入的子集.
pub(crate) fn skeletonize_2d(slice: ArrayView2<'_, bool>) -> Array2<bool> {
    let mut img = slice.to_owned();
    loop {
        let mut changed = false;
        for first_pass in [true, false] {
            let del = deletable(&img, first_pass);
            changed |= !del.is_empty();
            for pos in del {
                img[pos] = false;
            }
        }
        if !changed {
            break;
        }
    }
    img
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bar_to_line() {
        // 5 像素宽的横条骨架化为一条线.
        let mut img = Array2::from_elem((9, 20), false);
        for h in 2..7 {
            for w in 2..18 {
                img[(h, w)] = true;
            }
        }
        let sk = skeletonize_2d(img.view());
        assert!(sk.iter().zip(img.iter()).all(|(&s, &i)| !s || i));
        // 中间列恰好只剩一个像素.
        assert_eq!(sk.column(10).iter().filter(|p| **p).count(), 1);
        assert!(sk[(4, 10)]);
    }

    #[test]
    fn test_line_kept() {
        let mut img = Array2::from_elem((5, 8), false);
        for w in 1..7 {
            img[(2, w)] = true;
        }
        assert_eq!(skeletonize_2d(img.view()), img);
    }
}
