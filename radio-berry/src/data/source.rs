//! 从 nii 文件加载样本.
//!
//! 这里只做格式适配: nii 中的扫描值被视为已经标定好的 HU, 不做任何重新标定.

use std::path::Path;

use ndarray::{Array3, Ix3};
use nifti::{IntoNdArray, NiftiHeader, NiftiObject, ReaderOptions};

use super::{binarize, Sample, Spacing};
use crate::error::SourceError;

/// 读取 nii 文件, 返回 header 与 `(z, H, W)` 组织的体数据.
fn read_volume<P: AsRef<Path>>(path: P) -> Result<(NiftiHeader, Array3<f32>), SourceError> {
    let obj = ReaderOptions::new().read_file(path.as_ref())?;
    let header = obj.header().clone();

    // [W, H, z] -> [z, H, W].
    // hint: 原第一维向下增长, 原第二维向右增长.
    let data = obj
        .into_volume()
        .into_ndarray::<f32>()?
        .permuted_axes([2, 1, 0].as_slice())
        .into_dimensionality::<Ix3>()?;

    let data = if data.is_standard_layout() {
        data
    } else {
        data.as_standard_layout().into_owned()
    };
    Ok((header, data))
}

/// 从 header 获取 `(z, h, w)` 体素分辨率.
#[inline]
fn spacing_from_header(header: &NiftiHeader) -> Result<Spacing, SourceError> {
    let [_, w, h, z, ..] = header.pixdim;
    Ok(Spacing::new(z as f64, h as f64, w as f64)?)
}

impl Sample {
    /// 打开 nii 文件格式的 3D CT 扫描和对应标注, 构建样本.
    ///
    /// 扫描值四舍五入为 `i16` HU, 标注中值为 `target_label` 的体素被视为 ROI
    /// (LiTS 格式中肿瘤为 2). 体素分辨率取自扫描文件的 header.
    ///
    /// 任一文件打开失败, 或扫描与标注形状不一致时返回 `Err`.
    pub fn open_nifti(
        id: impl Into<String>,
        scan_path: impl AsRef<Path>,
        label_path: impl AsRef<Path>,
        target_label: u8,
    ) -> Result<Self, SourceError> {
        let (header, scan) = read_volume(scan_path)?;
        let (_, label) = read_volume(label_path)?;

        let spacing = spacing_from_header(&header)?;
        let volume = scan.mapv(|hu| hu.round().clamp(i16::MIN as f32, i16::MAX as f32) as i16);
        let label = label.mapv(|p| p.round().clamp(0.0, u8::MAX as f32) as u8);
        let mask = binarize(label.view(), target_label);

        log::debug!(
            "loaded nii sample with shape {:?}, spacing {:?}",
            volume.dim(),
            spacing.as_array()
        );

        Ok(Self::builder(id)
            .volume(volume)
            .mask(mask)
            .spacing(spacing)
            .build()?)
    }
}
