use std::fmt;

use crate::filters::{isotropic, smooth, threshold, vesselness, CutoffMethod, OperationDim};
use crate::morph_3d::{closing, fill_holes, merge_all, remove_small_objects, skeletonize, thin};
use crate::{Layer, Mask, StageError, StageResult, Volume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 流水线中的一个阶段及其参数.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(tag = "stage", rename_all = "snake_case"))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum Stage {
    /// 高斯平滑.
    Smoothing {
        /// 高斯核标准差.
        sigma: f64,
    },

    /// 各向同性重采样.
    Isotropic {
        /// `(x, y, z)` 方向的体素间距.
        spacing: [f64; 3],
    },

    /// `mean + scale * std` 阈值分割.
    Threshold {
        /// 标准差的倍数.
        scale: f64,
    },

    /// Hessian vesselness 滤波与二值化.
    Vesselness {
        /// Hessian 尺度.
        sigma: f64,

        /// 结构强度灵敏度.
        gamma: f64,

        /// 响应的截断方法.
        cutoff: CutoffMethod,

        /// 计算维度.
        dim: OperationDim,
    },

    /// 合并 1 到 3 个掩码.
    Merge,

    /// 立方体结构元素闭运算.
    Closing {
        /// 立方体边长.
        kernel: usize,
    },

    /// 逐切片空洞填充.
    HoleFilling {
        /// 被填充空洞的面积上限 (不含).
        max_size: usize,
    },

    /// 拓扑保持细化.
    Thinning {
        /// 不再细化的结构厚度.
        min_thickness: f64,

        /// 最多剥去的层数.
        thin: usize,
    },

    /// 去除小连通域.
    Cleaning {
        /// 保留连通域的最小体素数.
        min_size: usize,
    },

    /// 三维骨架化.
    Skeleton,
}

/// 取出唯一的体数据输入.
fn single_volume<'a>(stage: &Stage, inputs: &[&'a Layer]) -> StageResult<&'a Volume> {
    match inputs {
        [Layer::Image(v)] => Ok(v),
        _ => Err(StageError::NoInput(format!("`{}` expects one volume", stage.kind()))),
    }
}

/// 取出唯一的掩码输入.
fn single_mask<'a>(stage: &Stage, inputs: &[&'a Layer]) -> StageResult<&'a Mask> {
    match inputs {
        [Layer::Labels(m)] => Ok(m),
        _ => Err(StageError::NoInput(format!("`{}` expects one mask", stage.kind()))),
    }
}

impl Stage {
    /// 阶段种类名, 不含参数.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Smoothing { .. } => "smoothing",
            Self::Isotropic { .. } => "isotropic",
            Self::Threshold { .. } => "threshold",
            Self::Vesselness { .. } => "vesselness",
            Self::Merge => "merge",
            Self::Closing { .. } => "closing",
            Self::HoleFilling { .. } => "hole_removal",
            Self::Thinning { .. } => "thinning",
            Self::Cleaning { .. } => "cleaning",
            Self::Skeleton => "skeleton",
        }
    }

    /// 输出图层名. 名字编码了阶段与参数; `inputs` 为输入个数, 仅合并阶段使用.
    pub fn layer_name(&self, inputs: usize) -> String {
        match *self {
            Self::Smoothing { sigma } => format!("smoothed_{sigma}"),
            Self::Isotropic { spacing: [x, y, z] } => format!("isotropic_{x}_{y}_{z}"),
            Self::Threshold { scale } => format!("threshold_{scale}"),
            Self::Vesselness {
                sigma,
                gamma,
                cutoff,
                dim,
            } => format!("vesselness_{sigma}_{gamma}_{cutoff}_{}D", dim.dim()),
            Self::Merge => format!("merge_{inputs}layers"),
            Self::Closing { kernel } => format!("closing_{kernel}"),
            Self::HoleFilling { max_size } => format!("hole_removal_{max_size}"),
            Self::Thinning {
                min_thickness,
                thin,
            } => format!("thinning_{min_thickness}_{thin}"),
            Self::Cleaning { min_size } => format!("cleaning_{min_size}"),
            Self::Skeleton => "skeleton".to_string(),
        }
    }

    /// 对输入图层执行该阶段.
    ///
    /// 合并阶段接受 1 到 3 个掩码, 其余阶段恰好接受一个图层;
    /// 图层种类或个数不符时返回 [`StageError::NoInput`].
    pub fn apply(&self, inputs: &[&Layer]) -> StageResult<Layer> {
        let out = match *self {
            Self::Smoothing { sigma } => Layer::Image(smooth(single_volume(self, inputs)?, sigma)?),
            Self::Isotropic { spacing } => {
                Layer::Image(isotropic(single_volume(self, inputs)?, spacing)?)
            }
            Self::Threshold { scale } => {
                Layer::Labels(threshold(single_volume(self, inputs)?, scale)?)
            }
            Self::Vesselness {
                sigma,
                gamma,
                cutoff,
                dim,
            } => Layer::Labels(vesselness(
                single_volume(self, inputs)?,
                sigma,
                gamma,
                cutoff,
                dim,
            )?),
            Self::Merge => {
                if inputs.len() > 3 {
                    return Err(StageError::invalid("merge", "inputs", inputs.len()));
                }
                let masks = inputs
                    .iter()
                    .map(|l| {
                        l.as_mask()
                            .ok_or_else(|| StageError::NoInput("`merge` expects masks".to_string()))
                    })
                    .collect::<StageResult<Vec<&Mask>>>()?;
                Layer::Labels(merge_all(masks)?)
            }
            Self::Closing { kernel } => Layer::Labels(closing(single_mask(self, inputs)?, kernel)?),
            Self::HoleFilling { max_size } => {
                Layer::Labels(fill_holes(single_mask(self, inputs)?, max_size))
            }
            Self::Thinning {
                min_thickness,
                thin: amount,
            } => Layer::Labels(thin(single_mask(self, inputs)?, min_thickness, amount)?),
            Self::Cleaning { min_size } => {
                Layer::Labels(remove_small_objects(single_mask(self, inputs)?, min_size))
            }
            Self::Skeleton => Layer::Labels(skeletonize(single_mask(self, inputs)?)),
        };
        Ok(out)
    }
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Merge => f.write_str(self.kind()),
            _ => f.write_str(&self.layer_name(1)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_layer_names() {
        assert_eq!(Stage::Threshold { scale: 2.0 }.layer_name(1), "threshold_2");
        assert_eq!(
            Stage::Vesselness {
                sigma: 2.0,
                gamma: 10.0,
                cutoff: CutoffMethod::Li,
                dim: OperationDim::Three
            }
            .layer_name(1),
            "vesselness_2_10_threshold_li_3D"
        );
        assert_eq!(Stage::Merge.layer_name(3), "merge_3layers");
        assert_eq!(
            Stage::Thinning {
                min_thickness: 1.5,
                thin: 1
            }
            .layer_name(1),
            "thinning_1.5_1"
        );
        assert_eq!(Stage::HoleFilling { max_size: 10 }.to_string(), "hole_removal_10");
        assert_eq!(Stage::Merge.to_string(), "merge");
    }

    #[test]
    fn test_wrong_inputs() {
        let v = Layer::Image(Volume::new(Array3::zeros((1, 2, 2))));
        let m = Layer::Labels(Mask::falses((1, 2, 2)));
        assert!(matches!(
            Stage::Closing { kernel: 3 }.apply(&[&v]),
            Err(StageError::NoInput(_))
        ));
        assert!(matches!(
            Stage::Threshold { scale: 1.0 }.apply(&[&m]),
            Err(StageError::NoInput(_))
        ));
        assert!(matches!(Stage::Merge.apply(&[]), Err(StageError::NoInput(_))));
        assert!(matches!(
            Stage::Merge.apply(&[&m, &v]),
            Err(StageError::NoInput(_))
        ));
        assert!(Stage::Merge.apply(&[&m, &m]).is_ok());
        assert!(Stage::Skeleton.apply(&[&m]).unwrap().as_mask().is_some());
    }
}
