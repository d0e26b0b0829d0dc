//! 由连续值图像选取二值化截断值的统计方法.
//!
//! 直方图类方法 (Otsu, triangle) 在 `[min, max]` 上均匀分为
//! [`HISTOGRAM_BINS`] 个箱, 返回值为某个箱的中心.

use std::fmt;
use std::str::FromStr;

use ordered_float::OrderedFloat;

use crate::consts::HISTOGRAM_BINS;
use crate::{StageError, StageResult};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 截断方法. 封闭的枚举取代按名字查找函数.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum CutoffMethod {
    /// Li 最小交叉熵迭代法.
    Li,

    /// Otsu 类间方差最大化.
    Otsu,

    /// 三角形法. 适合单峰且拖尾很长的直方图.
    Triangle,

    /// 调用方给定的固定截断值.
    Constant(f64),
}

impl CutoffMethod {
    /// 所有可识别的名字. `threshold_constant` 需要以 `=value` 携带截断值.
    pub const NAMES: [&'static str; 4] = [
        "threshold_li",
        "threshold_otsu",
        "threshold_triangle",
        "threshold_constant",
    ];

    /// 方法名, 不含常数值.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Li => Self::NAMES[0],
            Self::Otsu => Self::NAMES[1],
            Self::Triangle => Self::NAMES[2],
            Self::Constant(_) => Self::NAMES[3],
        }
    }

    /// 由 `data` 计算截断值. `NaN` 样本被忽略.
    ///
    /// 若没有任何有效样本, 返回 `NaN` (此时任何 `v > cutoff` 比较均为假).
    pub fn eval(&self, data: &[f64]) -> f64 {
        let samples: Vec<f64> = match self {
            Self::Constant(c) => return *c,
            _ => data.iter().copied().filter(|v| !v.is_nan()).collect(),
        };
        match self {
            Self::Constant(c) => *c,
            _ if samples.is_empty() => f64::NAN,
            Self::Li => li(&samples),
            Self::Otsu => otsu(&samples, HISTOGRAM_BINS),
            Self::Triangle => triangle(&samples, HISTOGRAM_BINS),
        }
    }
}

impl fmt::Display for CutoffMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Constant(c) => write!(f, "{}={c}", self.name()),
            _ => f.write_str(self.name()),
        }
    }
}

impl FromStr for CutoffMethod {
    type Err = StageError;

    /// 解析 `threshold_li`, `threshold_otsu`, `threshold_triangle`
    /// 或 `threshold_constant=<value>`. 其它名字一律返回 [`StageError::UnknownMethod`].
    fn from_str(s: &str) -> StageResult<Self> {
        let s = s.trim();
        match s {
            "threshold_li" => return Ok(Self::Li),
            "threshold_otsu" => return Ok(Self::Otsu),
            "threshold_triangle" => return Ok(Self::Triangle),
            _ => {}
        }
        let Some(rest) = s.strip_prefix(Self::NAMES[3]) else {
            return Err(StageError::UnknownMethod(s.to_string()));
        };
        match rest.strip_prefix(&['=', ':'][..]) {
            Some(v) => v
                .trim()
                .parse::<f64>()
                .ok()
                .filter(|c| c.is_finite())
                .map(Self::Constant)
                .ok_or_else(|| StageError::invalid("cutoff", "constant", v)),
            None if rest.is_empty() => Err(StageError::invalid("cutoff", "constant", "<missing>")),
            None => Err(StageError::UnknownMethod(s.to_string())),
        }
    }
}

/// 均匀分箱直方图. 返回 (计数, 箱中心).
///
/// 调用方保证 `data` 非空且不含 `NaN`, 且 `min < max`.
fn histogram(data: &[f64], lo: f64, hi: f64, bins: usize) -> (Vec<u64>, Vec<f64>) {
    debug_assert!(lo < hi);
    let width = (hi - lo) / bins as f64;
    let mut counts = vec![0u64; bins];
    for &v in data {
        let b = ((v - lo) / width).floor() as usize;
        counts[b.min(bins - 1)] += 1;
    }
    let centers = (0..bins).map(|i| lo + (i as f64 + 0.5) * width).collect();
    (counts, centers)
}

/// 样本的最小值和最大值.
#[inline]
fn min_max(data: &[f64]) -> (f64, f64) {
    let lo = data.iter().copied().map(OrderedFloat).min().unwrap_or_default();
    let hi = data.iter().copied().map(OrderedFloat).max().unwrap_or_default();
    (lo.0, hi.0)
}

/// Otsu 方法. 在箱边界处分割, 返回使类间方差最大的那个箱的中心.
fn otsu(data: &[f64], bins: usize) -> f64 {
    let (lo, hi) = min_max(data);
    if lo == hi {
        return lo;
    }
    let (counts, centers) = histogram(data, lo, hi, bins);

    let hist: Vec<f64> = counts.iter().map(|&c| c as f64).collect();
    let weighted: Vec<f64> = hist.iter().zip(&centers).map(|(h, c)| h * c).collect();

    // 前缀: 前景 (低侧) 类权重与均值. 后缀: 背景 (高侧) 类.
    let mut w1 = vec![0.0; bins];
    let mut m1 = vec![0.0; bins];
    let (mut acc_w, mut acc_m) = (0.0, 0.0);
    for i in 0..bins {
        acc_w += hist[i];
        acc_m += weighted[i];
        w1[i] = acc_w;
        m1[i] = if acc_w > 0.0 { acc_m / acc_w } else { 0.0 };
    }
    let mut w2 = vec![0.0; bins];
    let mut m2 = vec![0.0; bins];
    let (mut acc_w, mut acc_m) = (0.0, 0.0);
    for i in (0..bins).rev() {
        acc_w += hist[i];
        acc_m += weighted[i];
        w2[i] = acc_w;
        m2[i] = if acc_w > 0.0 { acc_m / acc_w } else { 0.0 };
    }

    let mut best = (f64::MIN, 0usize);
    for i in 0..bins - 1 {
        let d = m1[i] - m2[i + 1];
        let var = w1[i] * w2[i + 1] * d * d;
        if var > best.0 {
            best = (var, i);
        }
    }
    centers[best.1]
}

/// Li 最小交叉熵迭代法.
///
/// 初值为均值, 容差为相邻不同样本值最小间距的一半.
fn li(data: &[f64]) -> f64 {
    const MAX_ITER: usize = 10_000;

    let mut sorted: Vec<OrderedFloat<f64>> = data.iter().copied().map(OrderedFloat).collect();
    sorted.sort_unstable();
    sorted.dedup();
    if sorted.len() == 1 {
        return sorted[0].0;
    }
    let tolerance = sorted
        .windows(2)
        .map(|w| w[1].0 - w[0].0)
        .fold(f64::INFINITY, f64::min)
        / 2.0;

    let lo = sorted[0].0;
    let shifted: Vec<f64> = data.iter().map(|v| v - lo).collect();
    let mut t_next = shifted.iter().sum::<f64>() / shifted.len() as f64;
    let mut t_curr = -2.0 * tolerance;

    let mut iter = 0;
    while (t_next - t_curr).abs() > tolerance && iter < MAX_ITER {
        iter += 1;
        t_curr = t_next;
        let (mut fore, mut n_fore, mut back, mut n_back) = (0.0, 0usize, 0.0, 0usize);
        for &v in shifted.iter() {
            if v > t_curr {
                fore += v;
                n_fore += 1;
            } else {
                back += v;
                n_back += 1;
            }
        }
        if n_fore == 0 || n_back == 0 {
            break;
        }
        let mean_fore = fore / n_fore as f64;
        let mean_back = back / n_back as f64;
        if mean_back == 0.0 {
            break;
        }
        t_next = (mean_back - mean_fore) / (mean_back.ln() - mean_fore.ln());
    }
    if iter == MAX_ITER {
        log::warn!("Li cutoff did not converge after {MAX_ITER} iterations");
    }
    t_next + lo
}

/// 三角形法. 在直方图峰值与较远一端之间连线, 取离直线最远的箱.
fn triangle(data: &[f64], bins: usize) -> f64 {
    let (lo, hi) = min_max(data);
    if lo == hi {
        return lo;
    }
    let (mut hist, centers) = histogram(data, lo, hi, bins);

    // 第一个最大值.
    let mut arg_peak = 0;
    for (i, &h) in hist.iter().enumerate() {
        if h > hist[arg_peak] {
            arg_peak = i;
        }
    }
    let peak_height = hist[arg_peak] as f64;

    // `min < max` 时首尾两箱必然非空.
    let mut arg_low = 0;
    let arg_high = bins - 1;
    debug_assert!(hist[arg_low] > 0 && hist[arg_high] > 0);

    let flip = arg_peak - arg_low < arg_high - arg_peak;
    if flip {
        hist.reverse();
        arg_low = bins - arg_high - 1;
        arg_peak = bins - arg_peak - 1;
    }

    let width = (arg_peak - arg_low) as f64;
    let norm = (peak_height * peak_height + width * width).sqrt();
    let (ph, wd) = (peak_height / norm, width / norm);

    let mut best = (f64::MIN, 0usize);
    for x in 0..(arg_peak - arg_low) {
        let y = hist[x + arg_low] as f64;
        let length = ph * x as f64 - wd * y;
        if length > best.0 {
            best = (length, x);
        }
    }
    let mut level = best.1 + arg_low;
    if flip {
        level = bins - level - 1;
    }
    centers[level]
}
