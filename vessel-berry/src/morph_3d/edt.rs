//! 二维精确欧氏距离变换 (下包络抛物线法, 按行列分离计算).

use ndarray::{Array2, ArrayView2, Axis};

/// 一维平方距离变换. `f` 中的无穷大表示该位置不是候选点.
fn squared_1d(f: &[f64], out: &mut [f64]) {
    let mut v: Vec<usize> = Vec::with_capacity(f.len());
    let mut z: Vec<f64> = Vec::with_capacity(f.len());

    for (q, &fq) in f.iter().enumerate() {
        if fq.is_infinite() {
            continue;
        }
        let qf = q as f64;
        loop {
            let Some(&p) = v.last() else {
                v.push(q);
                z.push(f64::NEG_INFINITY);
                break;
            };
            let pf = p as f64;
            let s = ((fq + qf * qf) - (f[p] + pf * pf)) / (2.0 * (qf - pf));
            if z.last().map_or(false, |&zk| s <= zk) {
                v.pop();
                z.pop();
            } else {
                v.push(q);
                z.push(s);
                break;
            }
        }
    }

    if v.is_empty() {
        out.iter_mut().for_each(|d| *d = f64::INFINITY);
        return;
    }
    let mut k = 0;
    for (q, d) in out.iter_mut().enumerate() {
        let qf = q as f64;
        while k + 1 < v.len() && z[k + 1] < qf {
            k += 1;
        }
        let dq = qf - v[k] as f64;
        *d = dq * dq + f[v[k]];
    }
}

/// 每个像素到最近的 `true` 像素的欧氏距离. 若没有任何 `true` 像素, 结果全为无穷大.
pub(crate) fn distance_to_foreground(slice: ArrayView2<'_, bool>) -> Array2<f64> {
    let mut d = slice.mapv(|p| if p { 0.0 } else { f64::INFINITY });
    for axis in [Axis(0), Axis(1)] {
        for mut lane in d.lanes_mut(axis) {
            let f: Vec<f64> = lane.to_vec();
            let mut out = vec![0.0; f.len()];
            squared_1d(&f, &mut out);
            lane.iter_mut().zip(out).for_each(|(l, o)| *l = o);
        }
    }
    d.mapv_inplace(f64::sqrt);
    d
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn test_single_point() {
        let mut s = Array2::from_elem((5, 5), false);
        s[(2, 2)] = true;
        let d = distance_to_foreground(s.view());
        assert_eq!(d[(2, 2)], 0.0);
        assert_eq!(d[(2, 4)], 2.0);
        assert!((d[(0, 0)] - 8f64.sqrt()).abs() < 1e-12);
        assert!((d[(1, 4)] - 5f64.sqrt()).abs() < 1e-12);
    }

    #[test]
    fn test_two_points_and_empty() {
        let s = array![[true, false, false, false, true]];
        let d = distance_to_foreground(s.view());
        assert_eq!(d.row(0).to_vec(), vec![0.0, 1.0, 2.0, 1.0, 0.0]);

        let e = Array2::from_elem((2, 3), false);
        assert!(distance_to_foreground(e.view())
            .iter()
            .all(|v| v.is_infinite()));
    }
}
