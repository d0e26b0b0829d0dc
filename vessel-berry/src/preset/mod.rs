//! 按组织类型组织的预设流程.
//!
//! 每个预设是一张静态的步骤表, 由 [`run_preset_into`] 线性解释执行:
//! 平滑 -> 阈值分割和/或 1 到 2 个 vesselness -> 合并 -> [闭运算] -> [空洞填充]
//! -> [细化] -> 去除小连通域 -> [骨架化]. 方括号中的阶段视预设而定.

mod stage;
mod table;

use std::fmt;

pub use stage::Stage;
pub use table::PRESETS;

use crate::{GridAttr, Mask, Registry, StageError, StageResult, Volume};

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// 步骤的输入来源.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Source {
    /// 原始体数据.
    Raw,

    /// 同一预设中第 `n` 个步骤 (从 0 开始) 的输出. 只能引用更早的步骤.
    Step(usize),
}

/// 预设中的一个步骤.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Step {
    /// 阶段及其参数.
    pub stage: Stage,

    /// 输入来源.
    pub inputs: &'static [Source],
}

/// 组织类型.
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub enum Tissue {
    /// 膀胱.
    Bladder,
    /// 脑.
    Brain,
    /// 耳.
    Ear,
    /// 心脏.
    Heart,
    /// 肾脏.
    Kidney,
    /// 肝脏.
    Liver,
    /// 肌肉.
    Muscle,
    /// 脾脏.
    Spleen,
    /// 肿瘤.
    Tumor,
}

impl Tissue {
    /// 小写名字.
    pub fn name(&self) -> &'static str {
        match self {
            Self::Bladder => "bladder",
            Self::Brain => "brain",
            Self::Ear => "ear",
            Self::Heart => "heart",
            Self::Kidney => "kidney",
            Self::Liver => "liver",
            Self::Muscle => "muscle",
            Self::Spleen => "spleen",
            Self::Tumor => "tumor",
        }
    }
}

impl fmt::Display for Tissue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// 一个组织类型的完整预设.
#[cfg_attr(feature = "serde", derive(Serialize))]
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Preset {
    /// 组织类型.
    pub tissue: Tissue,

    /// 按执行顺序排列的步骤.
    pub steps: &'static [Step],
}

/// 按组织名查找预设编号 (不区分大小写).
pub fn find_preset(name: &str) -> Option<usize> {
    PRESETS
        .iter()
        .position(|p| p.tissue.name().eq_ignore_ascii_case(name.trim()))
}

/// 在 `registry` 中以名为 `raw` 的体数据为输入执行第 `index` 个预设.
/// 每个步骤的输出都登记在 `registry` 中, 返回最后一个步骤的图层名.
///
/// 编号越界时返回 [`StageError::InvalidPreset`]; 原始体数据为空时返回
/// [`StageError::NoInput`]. `raw` 与某个步骤的输出图层同名时返回
/// [`StageError::InvalidParameter`], 原始图层不会被覆盖.
pub fn run_preset_into(registry: &mut Registry, index: usize, raw: &str) -> StageResult<String> {
    let preset = PRESETS.get(index).ok_or(StageError::InvalidPreset(index))?;
    if preset
        .steps
        .iter()
        .any(|s| s.stage.layer_name(s.inputs.len()) == raw)
    {
        return Err(StageError::invalid("preset", "raw", raw));
    }
    registry.volume(raw)?.ensure_non_empty("preset")?;
    log::info!(
        "running preset #{index} ({}) with {} steps",
        preset.tissue,
        preset.steps.len()
    );

    let mut names: Vec<String> = Vec::with_capacity(preset.steps.len());
    for (i, step) in preset.steps.iter().enumerate() {
        let inputs = step
            .inputs
            .iter()
            .map(|src| match *src {
                Source::Raw => Ok(raw),
                Source::Step(n) if n < i => Ok(names[n].as_str()),
                Source::Step(n) => Err(StageError::NoInput(format!(
                    "step {i} refers to step {n}, which has not run yet"
                ))),
            })
            .collect::<StageResult<Vec<&str>>>()?;
        let name = registry.run(&step.stage, &inputs)?;
        log::info!("[{}/{}] {} -> `{name}`", i + 1, preset.steps.len(), step.stage);
        names.push(name);
    }
    names
        .pop()
        .ok_or_else(|| StageError::NoInput(format!("preset #{index} has no steps")))
}

/// 以 `volume` 为输入执行第 `index` 个预设, 返回最终掩码.
///
/// 中间结果不保留; 需要它们时使用 [`run_preset_into`].
pub fn run_preset(index: usize, volume: &Volume) -> StageResult<Mask> {
    if index >= PRESETS.len() {
        return Err(StageError::InvalidPreset(index));
    }
    volume.ensure_non_empty("preset")?;

    let mut registry = Registry::new();
    registry.insert("raw", volume.clone());
    let last = run_preset_into(&mut registry, index, "raw")?;
    let out = registry.mask(&last)?.clone();
    debug_assert_eq!(out.shape(), volume.shape());
    Ok(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array3;

    #[test]
    fn test_table_shape() {
        assert_eq!(PRESETS.len(), 9);
        for (i, p) in PRESETS.iter().enumerate() {
            assert!(!p.steps.is_empty());
            // 第一步总是平滑原始数据, 最后的掩码都经过清理或骨架化.
            assert!(matches!(p.steps[0].stage, Stage::Smoothing { .. }));
            assert!(matches!(
                p.steps.last().unwrap().stage,
                Stage::Cleaning { .. } | Stage::Skeleton
            ));
            for (j, s) in p.steps.iter().enumerate() {
                for src in s.inputs {
                    if let Source::Step(n) = src {
                        assert!(*n < j, "preset {i} step {j} refers to step {n}");
                    }
                }
                if let Stage::Merge = s.stage {
                    assert!((1..=3).contains(&s.inputs.len()));
                }
            }
            assert_eq!(find_preset(p.tissue.name()), Some(i));
        }
        assert_eq!(find_preset("Liver"), find_preset("liver"));
        assert_eq!(find_preset("bone"), None);
    }

    #[test]
    fn test_invalid_preset() {
        let v = Volume::new(Array3::zeros((2, 2, 2)));
        assert_eq!(run_preset(9, &v), Err(StageError::InvalidPreset(9)));
        let empty = Volume::new(Array3::zeros((0, 2, 2)));
        assert!(matches!(run_preset(0, &empty), Err(StageError::NoInput(_))));
    }

    #[test]
    fn test_raw_name_clash() {
        let mut registry = Registry::new();
        let v = Volume::new(Array3::from_elem((2, 3, 3), 1.0));
        registry.insert("smoothed_1", v.clone());
        let idx = find_preset("liver").unwrap();
        assert!(matches!(
            run_preset_into(&mut registry, idx, "smoothed_1"),
            Err(StageError::InvalidParameter { .. })
        ));
        assert_eq!(registry.len(), 1);
        assert_eq!(registry.volume("smoothed_1").unwrap(), &v);
    }
}
