use std::sync::Once;

use ndarray::Array3;
use vessel_berry::prelude::*;

static LOGGER: Once = Once::new();

fn init_logger() {
    LOGGER.call_once(|| {
        let _ = simple_logger::SimpleLogger::new()
            .with_level(log::LevelFilter::Info)
            .init();
    });
}

/// 一根沿 W 方向的主管, 中部有一根沿 H 方向的分支, 背景带有确定性的弱纹理.
fn branching_vessels() -> Volume {
    let (lz, lh, lw) = (12, 32, 32);
    let data = Array3::from_shape_fn((lz, lh, lw), |(z, h, w)| {
        let dz = z as f32 - 6.0;
        let trunk = {
            let dh = h as f32 - 10.0;
            (dz * dz + dh * dh).sqrt() <= 2.0
        };
        let branch = {
            let dw = w as f32 - 16.0;
            h >= 10 && (dz * dz + dw * dw).sqrt() <= 1.5
        };
        let texture = ((z * 7 + h * 13 + w * 29) % 11) as f32;
        if trunk || branch {
            200.0 + texture
        } else {
            20.0 + texture
        }
    });
    Volume::new(data)
}

fn subset(a: &Mask, b: &Mask) -> bool {
    a.foreground_pos().into_iter().all(|p| b[p])
}

#[test]
fn test_every_preset_runs() {
    init_logger();
    let v = branching_vessels();
    for (i, p) in PRESETS.iter().enumerate() {
        let m = run_preset(i, &v).unwrap();
        assert_eq!(m.shape(), v.shape(), "preset {}", p.tissue);
        assert!(!m.is_background(), "preset {} lost the vessels", p.tissue);
        // 远离血管的角落始终为背景.
        assert!(!m[(0, 31, 0)], "preset {}", p.tissue);
    }
}

#[test]
fn test_registry_keeps_intermediates() {
    init_logger();
    let idx = find_preset("liver").unwrap();
    let mut registry = Registry::new();
    registry.insert("raw", branching_vessels());

    let last = run_preset_into(&mut registry, idx, "raw").unwrap();
    assert_eq!(last, "cleaning_100");
    for name in [
        "raw",
        "smoothed_1",
        "threshold_2",
        "vesselness_2_10_threshold_li_3D",
        "merge_2layers",
        "closing_5",
        "hole_removal_10",
        "thinning_1_1",
        "cleaning_100",
    ] {
        assert!(registry.contains(name), "missing layer `{name}`");
    }
    assert_eq!(registry.len(), 9);

    // 闭运算的结果包含合并结果, 细化的结果包含于填充结果.
    let merged = registry.mask("merge_2layers").unwrap();
    let closed = registry.mask("closing_5").unwrap();
    assert!(subset(merged, closed));
    let filled = registry.mask("hole_removal_10").unwrap();
    let thinned = registry.mask("thinning_1_1").unwrap();
    assert!(subset(thinned, filled));

    // 与一次性执行的结果一致.
    let direct = run_preset(idx, registry.volume("raw").unwrap()).unwrap();
    assert_eq!(&direct, registry.mask(&last).unwrap());
}

#[test]
fn test_skeleton_preset() {
    init_logger();
    let idx = find_preset("brain").unwrap();
    let mut registry = Registry::new();
    registry.insert("raw", branching_vessels());
    let last = run_preset_into(&mut registry, idx, "raw").unwrap();
    assert_eq!(last, "skeleton");

    let skeleton = registry.mask("skeleton").unwrap();
    let cleaned = registry.mask("cleaning_80").unwrap();
    assert!(subset(skeleton, cleaned));
    assert!(skeleton.count() < cleaned.count());
}

#[test]
fn test_manual_chain() {
    init_logger();
    let v = branching_vessels();
    let t = threshold(&v, 2.0).unwrap();
    let a = vesselness_named(&v, 2.0, 10.0, "threshold_otsu", OperationDim::Three).unwrap();
    let b = vesselness_named(&v, 2.0, 10.0, "threshold_triangle", OperationDim::Three).unwrap();
    let merged = merge(Some(&t), Some(&a), Some(&b)).unwrap();
    assert!(subset(&t, &merged) && subset(&a, &merged) && subset(&b, &merged));

    let closed = closing(&merged, 5).unwrap();
    let filled = fill_holes(&closed, 10);
    let thinned = thin(&filled, 1.0, 1).unwrap();
    let cleaned = remove_small_objects(&thinned, 100);
    assert_eq!(remove_small_objects(&cleaned, 100), cleaned);
    let skeleton = skeletonize(&cleaned);
    assert!(subset(&skeleton, &cleaned));
    for m in [&closed, &filled, &thinned, &cleaned, &skeleton] {
        assert_eq!(m.shape(), v.shape());
    }

    assert_eq!(
        vesselness_named(&v, 2.0, 10.0, "threshold_bogus", OperationDim::Three),
        Err(StageError::UnknownMethod("threshold_bogus".to_string()))
    );
}
