#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 提供三维血管分割流水线的各个阶段, 以及按组织类型组织的预设流程.
//!
//! 该 crate 目前仅提供 `safe` 接口. 所有阶段都是纯函数: 输入体数据不会被修改,
//! 每个阶段都会返回新的数组.
//!
//! # 注意
//!
//! 1. 体数据一律按照 `(z, H, W)` 组织, 即第一维为相邻切片方向.
//! 2. 用户输入导致的错误以 [`StageError`] 返回, 不会 panic.
//!   内部不变量被破坏时才会 panic.
//!
//! # 开发计划
//!
//! ### 阈值分割 (mean + k * std) ✅
//!
//! 实现位于 `vessel-berry/src/filters/threshold.rs`.
//!
//! ### Hessian vesselness 及四种截断方法 ✅
//!
//! Li, Otsu, triangle 和常数截断. 支持 3D 和逐切片 2D 两种模式.
//!
//! 实现位于 `vessel-berry/src/filters/{cutoff, hessian, vesselness}.rs`.
//!
//! ### 平滑与各向同性重采样 ✅
//!
//! 实现位于 `vessel-berry/src/filters/{smoothing, isotropic}.rs`.
//!
//! ### 三维形态学后处理 ✅
//!
//! 闭运算, 逐切片空洞填充, 拓扑保持细化, 小连通域去除, 骨架化.
//!
//! 实现位于 `vessel-berry/src/morph_3d`.
//!
//! ### 预设流程与结果登记表 ✅
//!
//! 预设表是纯数据, 由一个线性解释器执行. 所有中间结果以名字登记在 [`Registry`] 中.
//!
//! 实现位于 `vessel-berry/src/{preset, registry.rs}`.
//!
//! ### 数据读写 ✅
//!
//! npy 读写, nifti / 多页 TIFF 原始数据读取, 单切片 PNG 预览.
//!
//! 实现位于 `vessel-berry/src/data/io.rs`, 数据目录约定位于 `vessel-berry/src/dataset.rs`.

/// 二维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx2d = (usize, usize);

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

/// 体数据与掩码基础数据结构.
mod data;

pub use data::{io, GridAttr, Mask, Volume};

pub mod consts;

pub mod dataset;

mod error;

pub use error::{StageError, StageResult};

pub mod filters;

pub mod morph_3d;

pub mod preset;

mod registry;

pub use registry::{Layer, Registry};

pub mod prelude;
