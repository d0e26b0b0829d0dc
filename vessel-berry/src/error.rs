//! 运行时错误.

use crate::Idx3d;
use thiserror::Error;

/// 流水线各阶段的运行时错误.
///
/// 所有错误都原样返回给调用方, 库内部不做任何恢复或重试.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum StageError {
    /// 数值参数超出定义域 (如非正的 sigma, 边长为 0 的结构元素).
    #[error("stage `{stage}`: invalid parameter `{name}` = {value}")]
    InvalidParameter {
        /// 出错的阶段名.
        stage: &'static str,

        /// 参数名.
        name: &'static str,

        /// 参数值的文本形式.
        value: String,
    },

    /// 无法识别的截断方法名.
    #[error("unknown cutoff method `{0}`")]
    UnknownMethod(String),

    /// 输入掩码之间形状不一致.
    #[error("shape mismatch: expected {expected:?}, found {found:?}")]
    ShapeMismatch {
        /// 第一个输入的形状.
        expected: Idx3d,

        /// 与之不一致的形状.
        found: Idx3d,
    },

    /// 缺少必需的输入 (空体数据, 零个掩码, 未登记的图层等).
    #[error("missing input: {0}")]
    NoInput(String),

    /// 预设编号越界.
    #[error("preset index {0} is out of range")]
    InvalidPreset(usize),
}

impl StageError {
    /// 构造 [`StageError::InvalidParameter`].
    #[inline]
    pub(crate) fn invalid(stage: &'static str, name: &'static str, value: impl ToString) -> Self {
        Self::InvalidParameter {
            stage,
            name,
            value: value.to_string(),
        }
    }
}

/// 流水线阶段的返回类型.
pub type StageResult<T> = Result<T, StageError>;

/// 检查 `value` 是有限正数, 否则返回 [`StageError::InvalidParameter`].
#[inline]
pub(crate) fn ensure_positive(
    stage: &'static str,
    name: &'static str,
    value: f64,
) -> StageResult<f64> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(StageError::invalid(stage, name, value))
    }
}

/// 检查 `value` 是有限数.
#[inline]
pub(crate) fn ensure_finite(
    stage: &'static str,
    name: &'static str,
    value: f64,
) -> StageResult<f64> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(StageError::invalid(stage, name, value))
    }
}
