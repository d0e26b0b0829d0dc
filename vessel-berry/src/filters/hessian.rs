//! 高斯导数卷积, Hessian 矩阵与对称矩阵特征值.
//!
//! 卷积沿单个轴逐 lane 进行, 边界按最近值延拓. 多维卷积由若干一维卷积组合.

use ndarray::{Array, Array2, Array3, ArrayView2, ArrayView3, Axis, Dimension, Zip};

use crate::consts::objectness::{ALPHA, BETA, OBJECT_DIMENSION};

/// 采样得到的一维高斯 (导数) 核, 长度为 `2 * radius + 1`, `radius = round(truncate * sigma)`.
///
/// `order` 为导数阶数, 仅支持 0, 1, 2. 返回的是**相关**权重:
/// 第 `k` 个元素作用于偏移量 `k - radius` 处的样本, 相关结果即为平滑后信号的导数.
///
/// 当 `order > 2` 时 panic.
pub fn gaussian_kernel(sigma: f64, truncate: f64, order: usize) -> Vec<f64> {
    assert!(order <= 2, "gaussian derivative order {order} is not supported");
    let radius = (truncate * sigma + 0.5).floor().max(0.0) as isize;
    let s2 = sigma * sigma;

    let mut phi: Vec<f64> = (-radius..=radius)
        .map(|x| (-0.5 * (x * x) as f64 / s2).exp())
        .collect();
    let sum: f64 = phi.iter().sum();
    phi.iter_mut().for_each(|p| *p /= sum);

    match order {
        0 => phi,
        1 => (-radius..=radius)
            .zip(phi)
            .map(|(x, p)| x as f64 / s2 * p)
            .collect(),
        _ => (-radius..=radius)
            .zip(phi)
            .map(|(x, p)| ((x * x) as f64 / (s2 * s2) - 1.0 / s2) * p)
            .collect(),
    }
}

/// 沿 `axis` 做一维相关. 越界样本取最近的边界值.
pub(crate) fn correlate_axis<D: Dimension>(
    data: &Array<f64, D>,
    axis: Axis,
    kernel: &[f64],
) -> Array<f64, D> {
    let mut out = Array::zeros(data.raw_dim());
    let radius = (kernel.len() / 2) as isize;

    let line = |mut o: ndarray::ArrayViewMut1<'_, f64>, i: ndarray::ArrayView1<'_, f64>| {
        let n = i.len() as isize;
        if n == 0 {
            return;
        }
        for x in 0..n {
            let mut acc = 0.0;
            for (k, w) in kernel.iter().enumerate() {
                let src = (x + k as isize - radius).clamp(0, n - 1);
                acc += w * i[src as usize];
            }
            o[x as usize] = acc;
        }
    };

    let zip = Zip::from(out.lanes_mut(axis)).and(data.lanes(axis));
    cfg_if::cfg_if! {
        if #[cfg(feature = "rayon")] {
            zip.par_for_each(line);
        } else {
            zip.for_each(line);
        }
    }
    out
}

/// 依次沿第 `i` 轴以 `kernels[i]` 做一维相关.
pub(crate) fn separable<D: Dimension>(data: Array<f64, D>, kernels: &[&[f64]]) -> Array<f64, D> {
    debug_assert_eq!(kernels.len(), data.ndim());
    kernels
        .iter()
        .enumerate()
        .fold(data, |acc, (i, k)| correlate_axis(&acc, Axis(i), k))
}

/// 3D Hessian 的六个独立分量, 以 `sigma^2` 做尺度归一化.
pub(crate) struct Hessian3 {
    pub zz: Array3<f64>,
    pub zh: Array3<f64>,
    pub zw: Array3<f64>,
    pub hh: Array3<f64>,
    pub hw: Array3<f64>,
    pub ww: Array3<f64>,
}

impl Hessian3 {
    /// 在尺度 `sigma` 下计算 Hessian.
    pub fn compute(data: ArrayView3<'_, f32>, sigma: f64, truncate: f64) -> Self {
        let k: [Vec<f64>; 3] = [0, 1, 2].map(|o| gaussian_kernel(sigma, truncate, o));
        let (k0, k1, k2) = (k[0].as_slice(), k[1].as_slice(), k[2].as_slice());
        let src = data.mapv(f64::from);
        let norm = sigma * sigma;

        let d = |kz: &[f64], kh: &[f64], kw: &[f64]| {
            let mut r = separable(src.clone(), &[kz, kh, kw]);
            r.mapv_inplace(|v| v * norm);
            r
        };
        Self {
            zz: d(k2, k0, k0),
            zh: d(k1, k1, k0),
            zw: d(k1, k0, k1),
            hh: d(k0, k2, k0),
            hw: d(k0, k1, k1),
            ww: d(k0, k0, k2),
        }
    }
}

/// 2D Hessian 的三个独立分量, 以 `sigma^2` 做尺度归一化.
pub(crate) struct Hessian2 {
    pub hh: Array2<f64>,
    pub hw: Array2<f64>,
    pub ww: Array2<f64>,
}

impl Hessian2 {
    /// 在尺度 `sigma` 下计算 Hessian.
    pub fn compute(data: ArrayView2<'_, f32>, sigma: f64, truncate: f64) -> Self {
        let k: [Vec<f64>; 3] = [0, 1, 2].map(|o| gaussian_kernel(sigma, truncate, o));
        let (k0, k1, k2) = (k[0].as_slice(), k[1].as_slice(), k[2].as_slice());
        let src = data.mapv(f64::from);
        let norm = sigma * sigma;

        let d = |kh: &[f64], kw: &[f64]| {
            let mut r = separable(src.clone(), &[kh, kw]);
            r.mapv_inplace(|v| v * norm);
            r
        };
        Self {
            hh: d(k2, k0),
            hw: d(k1, k1),
            ww: d(k0, k2),
        }
    }
}

/// 2x2 实对称矩阵 `[[a, b], [b, c]]` 的特征值, 升序.
pub fn sym_eigenvalues_2(a: f64, b: f64, c: f64) -> [f64; 2] {
    let mean = 0.5 * (a + c);
    let half = 0.5 * (a - c);
    let r = (half * half + b * b).sqrt();
    [mean - r, mean + r]
}

/// 3x3 实对称矩阵的特征值 (三角函数闭式解), 升序.
///
/// 参数依次为对角元 `a11, a22, a33` 与非对角元 `a12, a13, a23`.
pub fn sym_eigenvalues_3(a11: f64, a22: f64, a33: f64, a12: f64, a13: f64, a23: f64) -> [f64; 3] {
    let p1 = a12 * a12 + a13 * a13 + a23 * a23;
    if p1 == 0.0 {
        let mut d = [a11, a22, a33];
        d.sort_by(f64::total_cmp);
        return d;
    }

    let q = (a11 + a22 + a33) / 3.0;
    let (b11, b22, b33) = (a11 - q, a22 - q, a33 - q);
    let p2 = b11 * b11 + b22 * b22 + b33 * b33 + 2.0 * p1;
    let p = (p2 / 6.0).sqrt();

    let (b11, b22, b33) = (b11 / p, b22 / p, b33 / p);
    let (b12, b13, b23) = (a12 / p, a13 / p, a23 / p);
    let det = b11 * (b22 * b33 - b23 * b23) - b12 * (b12 * b33 - b23 * b13)
        + b13 * (b12 * b23 - b22 * b13);
    let r = det / 2.0;

    let phi = if r <= -1.0 {
        std::f64::consts::PI / 3.0
    } else if r >= 1.0 {
        0.0
    } else {
        r.acos() / 3.0
    };

    let e_max = q + 2.0 * p * phi.cos();
    let e_min = q + 2.0 * p * (phi + 2.0 * std::f64::consts::PI / 3.0).cos();
    let e_mid = 3.0 * q - e_max - e_min;
    [e_min, e_mid, e_max]
}

/// 亮目标的 objectness 度量, 目标维度为 [`OBJECT_DIMENSION`].
///
/// 特征值按绝对值升序排列后记为 `l[0..N]`, `m = OBJECT_DIMENSION`:
///
/// - 若存在 `j >= m` 使 `l[j] > 0`, 结果为 0;
/// - `Ra = |l[m]| / (prod_{j>m} |l[j]|)^(1/(N-m-1))`, 仅当 `m < N - 1` 时参与;
/// - `Rb = |l[m-1]| / (prod_{j>=m} |l[j]|)^(1/(N-m))`;
/// - `S = ||l||_2`;
/// - 结果为 `(1 - e^{-Ra^2/2a^2}) * e^{-Rb^2/2b^2} * (1 - e^{-S^2/2g^2}) * |l[N-1]|`.
///
/// 分母为 0 时结果为 0.
pub(crate) fn objectness<const N: usize>(mut eig: [f64; N], gamma: f64) -> f64 {
    let m = OBJECT_DIMENSION;
    debug_assert!(m < N);
    eig.sort_by(|a, b| a.abs().total_cmp(&b.abs()));
    if eig[m..].iter().any(|&l| l > 0.0) {
        return 0.0;
    }
    let abs = eig.map(f64::abs);
    let mut measure = 1.0;

    if m + 1 < N {
        let base: f64 = abs[m + 1..].iter().product();
        if base <= 0.0 {
            return 0.0;
        }
        let ra = abs[m] / base.powf(1.0 / (N - m - 1) as f64);
        measure *= 1.0 - (-0.5 * ra * ra / (ALPHA * ALPHA)).exp();
    }

    let base: f64 = abs[m..].iter().product();
    if base <= 0.0 {
        return 0.0;
    }
    let rb = abs[m - 1] / base.powf(1.0 / (N - m) as f64);
    measure *= (-0.5 * rb * rb / (BETA * BETA)).exp();

    if gamma != 0.0 {
        let s2: f64 = abs.iter().map(|l| l * l).sum();
        measure *= 1.0 - (-0.5 * s2 / (gamma * gamma)).exp();
    }

    measure * abs[N - 1]
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::objectness::GAMMA;
    use ndarray::Array1;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-6
    }

    #[test]
    fn test_gaussian_kernel() {
        let k = gaussian_kernel(1.0, 4.0, 0);
        assert_eq!(k.len(), 9);
        assert!(f64_eq(k.iter().sum(), 1.0));
        assert!(f64_eq(k[0], k[8]));

        let k1 = gaussian_kernel(2.0, 4.0, 1);
        assert!(f64_eq(k1.iter().sum(), 0.0));
        assert!(k1[0] < 0.0 && *k1.last().unwrap() > 0.0);
    }

    #[test]
    fn test_derivative_of_ramp() {
        // f(x) = 3x 的一阶导数在内部恒为 3.
        let ramp = Array1::from_iter((0..64).map(|x| 3.0 * x as f64));
        let k1 = gaussian_kernel(1.5, 4.0, 1);
        let d1 = correlate_axis(&ramp, Axis(0), &k1);
        for x in 10..54 {
            assert!((d1[x] - 3.0).abs() < 1e-2, "d1[{x}] = {}", d1[x]);
        }
    }

    #[test]
    fn test_smoothing_keeps_constant() {
        let c = Array1::from_elem(7, 2.5);
        let k = gaussian_kernel(3.0, 3.0, 0);
        let s = correlate_axis(&c, Axis(0), &k);
        assert!(s.iter().all(|&v| f64_eq(v, 2.5)));
    }

    #[test]
    fn test_eigenvalues() {
        let e = sym_eigenvalues_2(2.0, 1.0, 2.0);
        assert!(f64_eq(e[0], 1.0) && f64_eq(e[1], 3.0));

        let e = sym_eigenvalues_3(3.0, -1.0, 2.0, 0.0, 0.0, 0.0);
        assert_eq!(e, [-1.0, 2.0, 3.0]);

        // [[2,1,0],[1,2,0],[0,0,5]] -> 1, 3, 5.
        let e = sym_eigenvalues_3(2.0, 2.0, 5.0, 1.0, 0.0, 0.0);
        assert!(f64_eq(e[0], 1.0) && f64_eq(e[1], 3.0) && f64_eq(e[2], 5.0));
    }

    #[test]
    fn test_objectness() {
        // 理想的亮管: 一个接近 0, 两个大负特征值.
        let tube = objectness([-0.01, -4.0, -4.0], GAMMA);
        assert!(tube > 1.0);
        // 团块: 三个相同的负特征值.
        let blob = objectness([-4.0, -4.0, -4.0], GAMMA);
        assert!(blob < tube);
        // 暗管.
        assert_eq!(objectness([0.01, 4.0, 4.0], GAMMA), 0.0);
        // 零矩阵.
        assert_eq!(objectness([0.0, 0.0, 0.0], GAMMA), 0.0);
        // 2D 中的亮线.
        assert!(objectness([-0.01, -3.0], GAMMA) > 0.4);
    }
}
