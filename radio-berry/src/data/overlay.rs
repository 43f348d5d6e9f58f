//! 单张水平切片的扫描 + 标注叠加图. 仅用于人工检查, 与特征计算完全解耦.

use std::path::Path;

use image::{ImageResult, Rgb, RgbImage};
use ndarray::{ArrayView3, Axis};

use super::CtWindow;
use crate::consts::mask::MASK_BACKGROUND;

/// 标注体素的叠加透明度.
const ALPHA: f64 = 0.5;

/// 将灰度值与红色按 [`ALPHA`] 混合.
#[inline]
fn blend_red(gray: u8) -> Rgb<u8> {
    let g = gray as f64 * (1.0 - ALPHA);
    Rgb([(g + 255.0 * ALPHA) as u8, g as u8, g as u8])
}

/// 以 `window` 渲染第 `z_index` 层切片的扫描, 并将标注非零处以半透明红色叠加.
///
/// 若 `z_index` 越界或扫描与标注形状不一致, 返回 `None`.
pub fn render_overlay(
    volume: ArrayView3<i16>,
    mask: ArrayView3<u8>,
    z_index: usize,
    window: CtWindow,
) -> Option<RgbImage> {
    if volume.shape() != mask.shape() || z_index >= volume.len_of(Axis(0)) {
        return None;
    }
    let scan = volume.index_axis(Axis(0), z_index);
    let label = mask.index_axis(Axis(0), z_index);
    let (height, width) = scan.dim();

    let mut buf = RgbImage::new(width as u32, height as u32);
    for ((h, w), &hu) in scan.indexed_iter() {
        let gray = window.eval(hu);
        let pix = if label[(h, w)] == MASK_BACKGROUND {
            Rgb([gray; 3])
        } else {
            blend_red(gray)
        };
        buf.put_pixel(w as u32, h as u32, pix);
    }
    Some(buf)
}

/// 渲染叠加图并保存到 `path`. 图片格式由扩展名决定.
///
/// 若 `z_index` 越界或形状不一致, 返回 `Ok(false)` 且不写文件.
pub fn save_overlay<P: AsRef<Path>>(
    volume: ArrayView3<i16>,
    mask: ArrayView3<u8>,
    z_index: usize,
    window: CtWindow,
    path: P,
) -> ImageResult<bool> {
    match render_overlay(volume, mask, z_index, window) {
        Some(img) => img.save(path).map(|_| true),
        None => Ok(false),
    }
}
