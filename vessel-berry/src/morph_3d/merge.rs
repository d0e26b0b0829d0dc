use ndarray::Zip;

use crate::{GridAttr, Mask, StageError, StageResult};

/// 合并 1 到 3 个掩码 (逐体素逻辑或). 缺省的参数传 `None`.
///
/// 全部为 `None` 时返回 [`StageError::NoInput`]; 形状不一致时返回
/// [`StageError::ShapeMismatch`].
pub fn merge(
    mask1: Option<&Mask>,
    mask2: Option<&Mask>,
    mask3: Option<&Mask>,
) -> StageResult<Mask> {
    merge_all([mask1, mask2, mask3].into_iter().flatten())
}

/// 合并任意多个掩码. 结果与参数顺序无关.
pub fn merge_all<'a, I>(masks: I) -> StageResult<Mask>
where
    I: IntoIterator<Item = &'a Mask>,
{
    let mut it = masks.into_iter();
    let first = it
        .next()
        .ok_or_else(|| StageError::NoInput("`merge` needs at least one mask".to_string()))?;
    let mut out = first.clone();
    let mut n = 1;
    for m in it {
        out.ensure_same_shape(m)?;
        Zip::from(out.data_mut()).and(m.data()).for_each(|o, &p| *o |= p);
        n += 1;
    }
    log::debug!(
        "merge {n} layers of shape {:?}: {} voxels",
        out.shape(),
        out.count()
    );
    Ok(out)
}
