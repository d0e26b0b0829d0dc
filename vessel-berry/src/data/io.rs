//! 体数据 / 掩码的文件读写.
//!
//! - 夹具文件: 每个 `.npy` 文件保存一个完整的 3D 数组;
//! - 原始数据: nifti (`.nii`) 或多页 TIFF;
//! - 预览: 单个水平切片的 8-bit 灰度 PNG.

use std::fs::File;
use std::io::BufReader;
use std::path::Path;

use image::{GrayImage, ImageResult, Luma};
use ndarray::{Array2, Array3, Axis, Ix3};
use ndarray_npy::{read_npy, write_npy, ReadNpyError, WriteNpyError};
use nifti::{IntoNdArray, NiftiObject, ReaderOptions};
use thiserror::Error;
use tiff::decoder::{Decoder, DecodingResult};

use super::{GridAttr, Mask, Volume};
use crate::consts::{PREVIEW_BACKGROUND, PREVIEW_FOREGROUND};
use crate::Idx2d;

/// 读写文件时的错误.
#[derive(Error, Debug)]
pub enum LoadError {
    /// 底层 I/O 错误.
    #[error(transparent)]
    Io(#[from] std::io::Error),

    /// 读取 npy 文件错误.
    #[error(transparent)]
    ReadNpy(#[from] ReadNpyError),

    /// 写入 npy 文件错误.
    #[error(transparent)]
    WriteNpy(#[from] WriteNpyError),

    /// 读取 nifti 文件错误.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 解码 TIFF 文件错误.
    #[error(transparent)]
    Tiff(#[from] tiff::TiffError),

    /// 写入预览图错误.
    #[error(transparent)]
    Image(#[from] image::ImageError),

    /// 数组维度不是 3.
    #[error(transparent)]
    Shape(#[from] ndarray::ShapeError),

    /// 多页 TIFF 不含任何页.
    #[error("image stack is empty")]
    EmptyStack,

    /// 多页 TIFF 中各页形状不一致.
    #[error("page {page} has shape {found:?}, expected {expected:?}")]
    RaggedStack {
        /// 页码.
        page: usize,

        /// 第一页的 (高, 宽).
        expected: Idx2d,

        /// 该页的 (高, 宽).
        found: Idx2d,
    },

    /// 不支持的采样类型.
    #[error("unsupported sample format")]
    UnsupportedSample,

    /// 切片索引越界.
    #[error("slice {0} is out of range")]
    SliceOutOfRange(usize),
}

/// 依次尝试以若干元素类型读取 npy 文件, 只有 dtype 不符时才尝试下一个.
macro_rules! read_npy_as_any {
    ($path: expr, $convert: expr, $($t: ty),+) => {{
        let mut last = None;
        $(
            if last.is_none() || matches!(last, Some(ReadNpyError::WrongDescriptor(_))) {
                match read_npy::<_, Array3<$t>>($path) {
                    Ok(a) => return Ok($convert(a.view())),
                    Err(e) => last = Some(e),
                }
            }
        )+
        Err(LoadError::from(last.unwrap_or(ReadNpyError::WrongNdim(Some(3), 0))))
    }};
}

/// 读取保存一个 3D 体数据的 npy 文件.
///
/// 支持 `f32`, `f64`, `u8`, `u16`, `i16`, `i32` 元素类型, 统一转换为 `f32`.
pub fn read_npy_volume<P: AsRef<Path>>(path: P) -> Result<Volume, LoadError> {
    let p = path.as_ref();
    read_npy_as_any!(p, Volume::from_raw, f32, f64, u16, u8, i16, i32)
}

/// 读取保存一个 3D 掩码的 npy 文件. 非零值视为前景.
pub fn read_npy_mask<P: AsRef<Path>>(path: P) -> Result<Mask, LoadError> {
    let p = path.as_ref();
    if let Ok(a) = read_npy::<_, Array3<bool>>(p) {
        return Ok(Mask::new(a));
    }
    read_npy_as_any!(p, Mask::from_nonzero, u8, i64, u16, f32, f64)
}

/// 将体数据写入 npy 文件 (`<f4`).
pub fn write_npy_volume<P: AsRef<Path>>(path: P, volume: &Volume) -> Result<(), LoadError> {
    write_npy(path, &volume.data())?;
    Ok(())
}

/// 将掩码写入 npy 文件 (`|b1`).
pub fn write_npy_mask<P: AsRef<Path>>(path: P, mask: &Mask) -> Result<(), LoadError> {
    write_npy(path, &mask.data())?;
    Ok(())
}

/// 打开 nii 文件格式的 3D 体数据. 数据被转换为 `(z, H, W)` 组织.
pub fn open_nifti<P: AsRef<Path>>(path: P) -> Result<Volume, LoadError> {
    let obj = ReaderOptions::new().read_file(path.as_ref())?;

    // [W, H, z] -> [z, H, W].
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = obj
        .into_volume()
        .into_ndarray::<f32>()?
        .into_dimensionality::<Ix3>()?
        .permuted_axes([2, 1, 0]);

    // The nature of nifti data field layout.
    debug_assert!(data.is_standard_layout());
    Ok(Volume::new(data.as_standard_layout().into_owned()))
}

/// 将一页 TIFF 的解码结果转换为 `f32` 序列.
fn plane_to_f32(plane: DecodingResult) -> Result<Vec<f32>, LoadError> {
    use DecodingResult::*;

    let v = match plane {
        U8(v) => v.into_iter().map(f32::from).collect(),
        U16(v) => v.into_iter().map(f32::from).collect(),
        U32(v) => v.into_iter().map(|p| p as f32).collect(),
        I8(v) => v.into_iter().map(f32::from).collect(),
        I16(v) => v.into_iter().map(f32::from).collect(),
        I32(v) => v.into_iter().map(|p| p as f32).collect(),
        F32(v) => v,
        F64(v) => v.into_iter().map(|p| p as f32).collect(),
        #[allow(unreachable_patterns)]
        _ => return Err(LoadError::UnsupportedSample),
    };
    Ok(v)
}

/// 打开多页 (单通道) TIFF 文件, 每一页作为一个水平切片, 按页序堆叠.
pub fn open_tiff_stack<P: AsRef<Path>>(path: P) -> Result<Volume, LoadError> {
    let file = File::open(path.as_ref())?;
    let mut decoder = Decoder::new(BufReader::new(file))?;

    let mut pages: Vec<f32> = Vec::new();
    let mut shape: Option<Idx2d> = None;
    let mut len_z = 0usize;
    loop {
        let (w, h) = decoder.dimensions()?;
        let found = (h as usize, w as usize);
        let plane = plane_to_f32(decoder.read_image()?)?;
        let expected = *shape.get_or_insert(found);
        if found != expected || plane.len() != expected.0 * expected.1 {
            return Err(LoadError::RaggedStack {
                page: len_z,
                expected,
                found,
            });
        }
        pages.extend(plane);
        len_z += 1;

        if !decoder.more_images() {
            break;
        }
        decoder.next_image()?;
    }

    let (h, w) = shape.ok_or(LoadError::EmptyStack)?;
    Ok(Volume::new(Array3::from_shape_vec((len_z, h, w), pages)?))
}

/// 按扩展名选择原始数据的读取方式: `.nii` / `.nii.gz` 走 nifti,
/// `.npy` 走 npy, 其余按 TIFF 处理.
pub fn open_raw<P: AsRef<Path>>(path: P) -> Result<Volume, LoadError> {
    let p = path.as_ref();
    let name = p
        .file_name()
        .map(|s| s.to_string_lossy().to_lowercase())
        .unwrap_or_default();
    if name.ends_with(".nii") || name.ends_with(".nii.gz") {
        open_nifti(p)
    } else if name.ends_with(".npy") {
        read_npy_volume(p)
    } else {
        open_tiff_stack(p)
    }
}

/// 将单个水平切片保存为 8-bit 灰度图片.
pub trait SlicePreview {
    /// 将第 `z_index` 层切片保存至 `path`. 图片格式由扩展名决定.
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> Result<(), LoadError>;
}

/// 将 2D 灰度数组写成图片.
fn save_gray(gray: &Array2<u8>, path: &Path) -> ImageResult<()> {
    let (height, width) = gray.dim();
    let mut buf = GrayImage::new(width as u32, height as u32);
    for ((h, w), &pix) in gray.indexed_iter() {
        buf.put_pixel(w as u32, h as u32, Luma([pix]));
    }
    buf.save(path)
}

impl SlicePreview for Mask {
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> Result<(), LoadError> {
        if z_index >= self.len_z() {
            return Err(LoadError::SliceOutOfRange(z_index));
        }
        let gray = self.slice_at(z_index).mapv(|p| {
            if p {
                PREVIEW_FOREGROUND
            } else {
                PREVIEW_BACKGROUND
            }
        });
        save_gray(&gray, path.as_ref())?;
        Ok(())
    }
}

/// 体数据以全局最小/最大值线性拉伸到 `[0, 255]`.
impl SlicePreview for Volume {
    fn save_slice<P: AsRef<Path>>(&self, z_index: usize, path: P) -> Result<(), LoadError> {
        if z_index >= self.len_z() {
            return Err(LoadError::SliceOutOfRange(z_index));
        }
        let (lo, hi) = self.min_max().unwrap_or((0.0, 0.0));
        let range = hi - lo;
        let gray = self.slice_at(z_index).mapv(|v| {
            if !v.is_finite() || range <= 0.0 {
                PREVIEW_BACKGROUND
            } else {
                // 255, not 256.
                (((v - lo) / range) * 255.0) as u8
            }
        });
        save_gray(&gray, path.as_ref())?;
        Ok(())
    }
}

/// 堆叠 2D 切片的辅助函数. 若切片形状不一致返回 `None`.
pub(crate) fn stack_slices<T: Clone>(slices: &[Array2<T>]) -> Option<Array3<T>> {
    let views: Vec<_> = slices.iter().map(|s| s.view()).collect();
    ndarray::stack(Axis(0), &views).ok()
}
