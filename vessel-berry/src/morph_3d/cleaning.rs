use std::collections::VecDeque;

use ndarray::Array3;

use super::neighbourhood::{shift, Offset3d, FACES};
use crate::{GridAttr, Idx3d, Mask};

/// 收集所有前景连通域. `offsets` 决定连通性 (6 或 26 邻域).
///
/// 连通域按其第一个体素 (行优先) 的顺序排列.
pub(crate) fn components(mask: &Mask, offsets: &[Offset3d]) -> Vec<Vec<Idx3d>> {
    let shape = mask.shape();
    let mut visited = Array3::from_elem(shape, false);
    let mut bfs_q = VecDeque::with_capacity(16);
    let mut ans = Vec::new();

    for (pos, &p) in mask.data().indexed_iter() {
        if !p || visited[pos] {
            continue;
        }
        visited[pos] = true;
        bfs_q.push_back(pos);
        let mut this_area = Vec::with_capacity(1);
        while let Some(cur) = bfs_q.pop_front() {
            this_area.push(cur);
            for &d in offsets {
                if let Some(next) = shift(cur, d, shape) {
                    if mask[next] && !visited[next] {
                        visited[next] = true;
                        bfs_q.push_back(next);
                    }
                }
            }
        }
        ans.push(this_area);
    }
    ans
}

/// 去除体素数小于 `min_size` 的 6 连通前景区域.
///
/// 该操作是幂等的.
pub fn remove_small_objects(mask: &Mask, min_size: usize) -> Mask {
    if min_size <= 1 {
        return mask.clone();
    }
    let mut out = mask.clone();
    let mut removed = 0;
    for area in components(mask, &FACES) {
        if area.len() < min_size {
            removed += 1;
            for pos in area {
                out[pos] = false;
            }
        }
    }
    log::debug!("cleaning min_size={min_size}: {removed} objects removed");
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::morph_3d::neighbourhood::FULL;

    fn sample() -> Mask {
        let mut m = Mask::falses((4, 6, 6));
        // 8 体素的块.
        for z in 0..2 {
            for h in 0..2 {
                for w in 0..2 {
                    m[(z, h, w)] = true;
                }
            }
        }
        // 3 体素的线.
        for w in 2..5 {
            m[(3, 4, w)] = true;
        }
        // 与线仅对角相接的单个体素.
        m[(2, 5, 5)] = true;
        m
    }

    #[test]
    fn test_components() {
        let m = sample();
        assert_eq!(components(&m, &FACES).len(), 3);
        assert_eq!(components(&m, &FULL).len(), 2);
        let sizes: Vec<usize> = components(&m, &FACES).iter().map(|a| a.len()).collect();
        assert_eq!(sizes, vec![8, 1, 3]);
    }

    #[test]
    fn test_remove_small_objects() {
        let m = sample();
        let c = remove_small_objects(&m, 3);
        assert_eq!(c.shape(), m.shape());
        assert_eq!(c.count(), 11);
        assert!(!c[(2, 5, 5)]);

        let c = remove_small_objects(&m, 9);
        assert!(c.is_background());
        assert_eq!(remove_small_objects(&m, 1), m);
    }

    #[test]
    fn test_idempotent() {
        let m = sample();
        for k in [2, 4, 8, 100] {
            let once = remove_small_objects(&m, k);
            assert_eq!(remove_small_objects(&once, k), once);
        }
    }
}
