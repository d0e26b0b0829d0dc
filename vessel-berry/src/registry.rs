//! 按名字登记的阶段输出.

use std::collections::HashMap;

use crate::preset::Stage;
use crate::{GridAttr, Idx3d, Mask, StageError, StageResult, Volume};

/// 一个图层: 灰度体数据或二值掩码.
#[derive(Debug, Clone, PartialEq)]
pub enum Layer {
    /// 灰度体数据.
    Image(Volume),

    /// 二值掩码.
    Labels(Mask),
}

impl Layer {
    /// 数据形状.
    pub fn shape(&self) -> Idx3d {
        match self {
            Self::Image(v) => v.shape(),
            Self::Labels(m) => m.shape(),
        }
    }

    /// 若为体数据, 返回其引用.
    #[inline]
    pub fn as_volume(&self) -> Option<&Volume> {
        match self {
            Self::Image(v) => Some(v),
            Self::Labels(_) => None,
        }
    }

    /// 若为掩码, 返回其引用.
    #[inline]
    pub fn as_mask(&self) -> Option<&Mask> {
        match self {
            Self::Labels(m) => Some(m),
            Self::Image(_) => None,
        }
    }
}

impl From<Volume> for Layer {
    fn from(v: Volume) -> Self {
        Self::Image(v)
    }
}

impl From<Mask> for Layer {
    fn from(m: Mask) -> Self {
        Self::Labels(m)
    }
}

/// 内存中的图层登记表. 记住插入顺序; 同名插入会替换旧图层, 但保留其原位置.
#[derive(Debug, Clone, Default)]
pub struct Registry {
    layers: HashMap<String, Layer>,
    order: Vec<String>,
}

impl Registry {
    /// 创建空的登记表.
    #[inline]
    pub fn new() -> Self {
        Self::default()
    }

    /// 登记 `layer`. 若已有同名图层, 返回被替换的旧图层.
    pub fn insert<S: Into<String>, L: Into<Layer>>(&mut self, name: S, layer: L) -> Option<Layer> {
        let name = name.into();
        let old = self.layers.insert(name.clone(), layer.into());
        if old.is_none() {
            self.order.push(name);
        }
        old
    }

    /// 移除并返回图层.
    pub fn remove(&mut self, name: &str) -> Option<Layer> {
        let old = self.layers.remove(name)?;
        self.order.retain(|n| n != name);
        Some(old)
    }

    /// 按名字获取图层.
    #[inline]
    pub fn get(&self, name: &str) -> Option<&Layer> {
        self.layers.get(name)
    }

    /// 按名字获取图层; 不存在时返回 [`StageError::NoInput`].
    pub fn layer(&self, name: &str) -> StageResult<&Layer> {
        self.get(name)
            .ok_or_else(|| StageError::NoInput(format!("no layer named `{name}`")))
    }

    /// 按名字获取体数据图层.
    pub fn volume(&self, name: &str) -> StageResult<&Volume> {
        self.layer(name)?
            .as_volume()
            .ok_or_else(|| StageError::NoInput(format!("layer `{name}` is not a volume")))
    }

    /// 按名字获取掩码图层.
    pub fn mask(&self, name: &str) -> StageResult<&Mask> {
        self.layer(name)?
            .as_mask()
            .ok_or_else(|| StageError::NoInput(format!("layer `{name}` is not a mask")))
    }

    /// 是否存在名为 `name` 的图层?
    #[inline]
    pub fn contains(&self, name: &str) -> bool {
        self.layers.contains_key(name)
    }

    /// 按插入顺序迭代图层名.
    #[inline]
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.order.iter().map(String::as_str)
    }

    /// 图层个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.order.len()
    }

    /// 是否为空?
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    /// 以名为 `inputs` 的图层为输入执行 `stage`, 将结果以
    /// [`Stage::layer_name`] 登记, 返回该名字.
    pub fn run(&mut self, stage: &Stage, inputs: &[&str]) -> StageResult<String> {
        let layers = inputs
            .iter()
            .map(|name| self.layer(name))
            .collect::<StageResult<Vec<&Layer>>>()?;
        let out = stage.apply(&layers)?;
        let name = stage.layer_name(inputs.len());
        log::debug!("registry: {inputs:?} -> `{name}`");
        self.insert(name.clone(), out);
        Ok(name)
    }
}
