//! 程序运行函数.

use crate::report::{Entry, Report};
use std::error::Error;
use std::path::Path;
use std::thread;
use std::time::Instant;
use utils::loader;
use vessel_berry::prelude::*;

type RunResult<T> = Result<T, Box<dyn Error>>;

/// 各向同性重采样使用的体素间距 `(x, y, z)`.
const SPACING: [f64; 3] = [0.108, 0.108, 0.29];

/// 写出体数据并记录.
fn write_volume(
    dir: &Path,
    file: &'static str,
    v: &Volume,
    t: Instant,
    r: &mut Report,
) -> RunResult<()> {
    write_npy_volume(dir.join(file), v)?;
    log::info!("wrote `{file}`");
    r.push(Entry::new(file, v.shape(), None, t.elapsed()));
    Ok(())
}

/// 写出掩码并记录.
fn write_mask(
    dir: &Path,
    file: &'static str,
    m: &Mask,
    t: Instant,
    r: &mut Report,
) -> RunResult<()> {
    write_npy_mask(dir.join(file), m)?;
    log::info!("wrote `{file}` ({} voxels)", m.count());
    r.push(Entry::new(file, m.shape(), Some(m.count()), t.elapsed()));
    Ok(())
}

/// 实际运行.
pub fn run(dir: &Path) -> RunResult<Report> {
    let raw = loader::load_raw(dir)?;
    let mut report = Report::default();

    let t = Instant::now();
    let smoothed = smooth(&raw, 1.0)?;
    write_volume(dir, "smoothing.npy", &smoothed, t, &mut report)?;

    let t = Instant::now();
    let iso = isotropic(&raw, SPACING)?;
    write_volume(dir, "isotropic.npy", &iso, t, &mut report)?;

    let t = Instant::now();
    let th = threshold(&raw, 2.0)?;
    write_mask(dir, "threshold.npy", &th, t, &mut report)?;

    // 三种截断方法互不依赖, 各占一个线程.
    println!("Running vesselness on {} cpus...", utils::cpus());
    let methods = [CutoffMethod::Li, CutoffMethod::Otsu, CutoffMethod::Triangle];
    let t = Instant::now();
    let [li, otsu, triangle] = thread::scope(|s| {
        let raw = &raw;
        let handles =
            methods.map(|m| s.spawn(move || vesselness(raw, 2.0, 10.0, m, OperationDim::Three)));
        handles.map(|th| {
            th.join().unwrap_or_else(|_| {
                Err(StageError::NoInput("vesselness worker panicked".to_string()))
            })
        })
    });
    let (li, otsu, triangle) = (li?, otsu?, triangle?);
    for (file, m) in [
        ("ves_li.npy", &li),
        ("ves_otsu.npy", &otsu),
        ("ves_triangle.npy", &triangle),
    ] {
        write_mask(dir, file, m, t, &mut report)?;
    }

    let t = Instant::now();
    let merged2 = merge(Some(&th), Some(&li), None)?;
    write_mask(dir, "merge_2layers.npy", &merged2, t, &mut report)?;

    let t = Instant::now();
    let merged3 = merge(Some(&th), Some(&otsu), Some(&triangle))?;
    write_mask(dir, "merge_3layers.npy", &merged3, t, &mut report)?;

    let t = Instant::now();
    let closed = closing(&merged2, 5)?;
    write_mask(dir, "closing.npy", &closed, t, &mut report)?;

    let t = Instant::now();
    let filled = fill_holes(&closed, 10);
    write_mask(dir, "hole_removal.npy", &filled, t, &mut report)?;

    let t = Instant::now();
    let thinned = thin(&filled, 1.0, 1)?;
    write_mask(dir, "thinning.npy", &thinned, t, &mut report)?;

    let t = Instant::now();
    let cleaned = remove_small_objects(&thinned, 100);
    write_mask(dir, "cleaning.npy", &cleaned, t, &mut report)?;

    let t = Instant::now();
    let skeleton = skeletonize(&cleaned);
    write_mask(dir, "skeleton.npy", &skeleton, t, &mut report)?;

    if let Some(z) = cleaned.len_z().checked_sub(1).map(|n| n / 2) {
        cleaned.save_slice(z, dir.join("cleaning_preview.png"))?;
    }
    Ok(report)
}
