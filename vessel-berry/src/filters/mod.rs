//! 灰度体数据上的滤波与二值化阶段.

mod cutoff;
mod hessian;
mod isotropic;
mod smoothing;
mod threshold;
mod vesselness;

pub use cutoff::CutoffMethod;
pub use hessian::{gaussian_kernel, sym_eigenvalues_2, sym_eigenvalues_3};
pub use isotropic::isotropic;
pub use smoothing::smooth;
pub use threshold::threshold;
pub use vesselness::{vesselness, vesselness_named, vesselness_response, OperationDim};
