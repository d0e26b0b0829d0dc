//! 通用常量.

/// Hessian objectness 相关默认值. 与 ITK `HessianToObjectnessMeasureImageFilter` 一致.
pub mod objectness {
    /// 区分片状与线状结构的灵敏度.
    pub const ALPHA: f64 = 0.5;

    /// 区分团块与线状结构的灵敏度.
    pub const BETA: f64 = 0.5;

    /// 默认的噪声 (结构强度) 灵敏度.
    pub const GAMMA: f64 = 5.0;

    /// 目标维度. 1 代表管状 / 线状结构.
    pub const OBJECT_DIMENSION: usize = 1;
}

/// 直方图类截断方法的默认分箱个数.
pub const HISTOGRAM_BINS: usize = 256;

/// 高斯核在 `sigma` 的多少倍处截断.
pub const GAUSSIAN_TRUNCATE: f64 = 3.0;

/// Hessian 高斯导数核在 `sigma` 的多少倍处截断.
pub const HESSIAN_TRUNCATE: f64 = 4.0;

/// 预设流程中平滑阶段使用的 sigma.
pub const PRESET_SMOOTHING_SIGMA: f64 = 1.0;

/// 8-bit 预览图中的前景灰度.
pub const PREVIEW_FOREGROUND: u8 = 0b_1111_1111;

/// 8-bit 预览图中的背景灰度.
pub const PREVIEW_BACKGROUND: u8 = 0b_0000_0000;
