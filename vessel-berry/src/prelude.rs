//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::{Idx2d, Idx3d};

pub use crate::data::io::{
    open_nifti, open_raw, open_tiff_stack, read_npy_mask, read_npy_volume, write_npy_mask,
    write_npy_volume, LoadError, SlicePreview,
};
pub use crate::{GridAttr, Mask, Volume};

pub use crate::{StageError, StageResult};

pub use crate::filters::{
    isotropic, smooth, threshold, vesselness, vesselness_named, vesselness_response, CutoffMethod,
    OperationDim,
};
pub use crate::morph_3d::{
    closing, fill_holes, merge, merge_all, remove_small_objects, skeletonize, thin,
};

pub use crate::preset::{find_preset, run_preset, run_preset_into, Stage, Tissue, PRESETS};
pub use crate::{Layer, Registry};

pub use crate::dataset::home_dataset_dir_with;
