//! 三维二值掩码上的形态学后处理.
//!
//! 各阶段的先后顺序会影响结果 (例如先闭运算后细化与反过来不同),
//! 因此由预设流程显式给出.

mod cleaning;
mod closing;
mod edt;
mod holes;
mod merge;
mod neighbourhood;
mod skeleton;
mod skeleton_2d;
mod thinning;

pub use cleaning::remove_small_objects;
pub use closing::{closing, dilate, erode};
pub use holes::fill_holes;
pub use merge::{merge, merge_all};
pub use skeleton::skeletonize;
pub use thinning::thin;
