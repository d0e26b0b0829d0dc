//! 九个组织类型的预设参数.

use super::Source::{Raw, Step as S};
use super::{Preset, Stage, Step, Tissue};
use crate::consts::objectness::GAMMA;
use crate::consts::PRESET_SMOOTHING_SIGMA;
use crate::filters::CutoffMethod::{Li, Otsu, Triangle};
use crate::filters::OperationDim::{Three, Two};

const SMOOTHING: Step = Step {
    stage: Stage::Smoothing {
        sigma: PRESET_SMOOTHING_SIGMA,
    },
    inputs: &[Raw],
};

/// 按 [`Tissue`] 声明顺序排列的预设表.
pub static PRESETS: [Preset; 9] = [
    Preset {
        tissue: Tissue::Bladder,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Threshold { scale: 2.0 },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 2.0,
                    gamma: 10.0,
                    cutoff: Li,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2)],
            },
            Step {
                stage: Stage::Closing { kernel: 5 },
                inputs: &[S(3)],
            },
            Step {
                stage: Stage::Thinning {
                    min_thickness: 1.0,
                    thin: 1,
                },
                inputs: &[S(4)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 100 },
                inputs: &[S(5)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Brain,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Vesselness {
                    sigma: 1.0,
                    gamma: GAMMA,
                    cutoff: Otsu,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 2.5,
                    gamma: 10.0,
                    cutoff: Triangle,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2)],
            },
            Step {
                stage: Stage::Closing { kernel: 3 },
                inputs: &[S(3)],
            },
            Step {
                stage: Stage::HoleFilling { max_size: 10 },
                inputs: &[S(4)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 80 },
                inputs: &[S(5)],
            },
            Step {
                stage: Stage::Skeleton,
                inputs: &[S(6)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Ear,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Threshold { scale: 1.5 },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 1.0,
                    gamma: GAMMA,
                    cutoff: Li,
                    dim: Two,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 50 },
                inputs: &[S(3)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Heart,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Threshold { scale: 2.5 },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 2.0,
                    gamma: 10.0,
                    cutoff: Otsu,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 3.0,
                    gamma: 15.0,
                    cutoff: Triangle,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2), S(3)],
            },
            Step {
                stage: Stage::Closing { kernel: 5 },
                inputs: &[S(4)],
            },
            Step {
                stage: Stage::HoleFilling { max_size: 50 },
                inputs: &[S(5)],
            },
            Step {
                stage: Stage::Thinning {
                    min_thickness: 2.0,
                    thin: 1,
                },
                inputs: &[S(6)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 200 },
                inputs: &[S(7)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Kidney,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Threshold { scale: 2.0 },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 1.5,
                    gamma: 8.0,
                    cutoff: Li,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2)],
            },
            Step {
                stage: Stage::Closing { kernel: 3 },
                inputs: &[S(3)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 100 },
                inputs: &[S(4)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Liver,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Threshold { scale: 2.0 },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 2.0,
                    gamma: 10.0,
                    cutoff: Li,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2)],
            },
            Step {
                stage: Stage::Closing { kernel: 5 },
                inputs: &[S(3)],
            },
            Step {
                stage: Stage::HoleFilling { max_size: 10 },
                inputs: &[S(4)],
            },
            Step {
                stage: Stage::Thinning {
                    min_thickness: 1.0,
                    thin: 1,
                },
                inputs: &[S(5)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 100 },
                inputs: &[S(6)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Muscle,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Vesselness {
                    sigma: 1.5,
                    gamma: GAMMA,
                    cutoff: Otsu,
                    dim: Two,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1)],
            },
            Step {
                stage: Stage::Thinning {
                    min_thickness: 1.0,
                    thin: 1,
                },
                inputs: &[S(2)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 60 },
                inputs: &[S(3)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Spleen,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Threshold { scale: 3.0 },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 2.0,
                    gamma: 12.0,
                    cutoff: Triangle,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2)],
            },
            Step {
                stage: Stage::Closing { kernel: 7 },
                inputs: &[S(3)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 150 },
                inputs: &[S(4)],
            },
        ],
    },
    Preset {
        tissue: Tissue::Tumor,
        steps: &[
            SMOOTHING,
            Step {
                stage: Stage::Threshold { scale: 1.5 },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 1.0,
                    gamma: GAMMA,
                    cutoff: Li,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Vesselness {
                    sigma: 2.0,
                    gamma: 10.0,
                    cutoff: Otsu,
                    dim: Three,
                },
                inputs: &[S(0)],
            },
            Step {
                stage: Stage::Merge,
                inputs: &[S(1), S(2), S(3)],
            },
            Step {
                stage: Stage::Closing { kernel: 3 },
                inputs: &[S(4)],
            },
            Step {
                stage: Stage::HoleFilling { max_size: 30 },
                inputs: &[S(5)],
            },
            Step {
                stage: Stage::Thinning {
                    min_thickness: 1.0,
                    thin: 2,
                },
                inputs: &[S(6)],
            },
            Step {
                stage: Stage::Cleaning { min_size: 120 },
                inputs: &[S(7)],
            },
        ],
    },
];
