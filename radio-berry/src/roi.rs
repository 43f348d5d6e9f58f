//! ROI 提取.
//!
//! 从扫描与二值标注中取出 ROI 体素的 HU 值 (按行优先展平为 1 x N 的行向量),
//! 以及仅包含肿瘤切片的子扫描与子标注.

use ndarray::{Array1, Array2, Array3, ArrayView1, ArrayView3, Axis};

use crate::consts::mask::*;
use crate::data::{check_shape, Spacing};
use crate::error::InvalidInputError;

/// ROI 提取结果. 每次提取都重新生成, 构建后不可变.
#[derive(Debug, Clone)]
pub struct Roi {
    values: Array2<f64>,
    voxel_volume: f64,
    tumor_slices: Vec<usize>,
    sub_volume: Array3<i16>,
    sub_mask: Array3<u8>,
    spacing: Spacing,
}

impl Roi {
    /// ROI 体素的 HU 值, 形状为 `(1, N)`, 按行优先顺序排列.
    #[inline]
    pub fn values(&self) -> &Array2<f64> {
        &self.values
    }

    /// ROI 体素的 HU 值的一维视图.
    #[inline]
    pub fn row(&self) -> ArrayView1<'_, f64> {
        self.values.row(0)
    }

    /// ROI 体素个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// ROI 是否为空. 由 [`extract_roi`] 得到的 ROI 总是非空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 单个体素的实际体积, 以立方毫米为单位.
    #[inline]
    pub fn voxel_volume(&self) -> f64 {
        self.voxel_volume
    }

    /// 含有 ROI 体素的水平切片索引, 升序且不重复.
    #[inline]
    pub fn tumor_slices(&self) -> &[usize] {
        &self.tumor_slices
    }

    /// 仅包含肿瘤切片的子扫描.
    #[inline]
    pub fn sub_volume(&self) -> ArrayView3<'_, i16> {
        self.sub_volume.view()
    }

    /// 仅包含肿瘤切片的子标注.
    #[inline]
    pub fn sub_mask(&self) -> ArrayView3<'_, u8> {
        self.sub_mask.view()
    }

    /// 体素分辨率.
    #[inline]
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }
}

/// 检查输入, 返回 ROI 之外的所有错误.
fn check_input(volume: &ArrayView3<i16>, mask: &ArrayView3<u8>) -> Result<(), InvalidInputError> {
    check_shape(mask.raw_dim(), volume.raw_dim())?;
    if volume.is_empty() {
        return Err(InvalidInputError::EmptyVolume);
    }
    match mask.iter().copied().find(|p| !is_binary(*p)) {
        Some(p) => Err(InvalidInputError::InvalidMaskValue(p)),
        None => Ok(()),
    }
}

/// 由逐切片收集的结果组装 ROI.
fn assemble(
    volume: ArrayView3<i16>,
    mask: ArrayView3<u8>,
    spacing: Spacing,
    values: Vec<f64>,
    tumor_slices: Vec<usize>,
) -> Result<Roi, InvalidInputError> {
    if values.is_empty() {
        return Err(InvalidInputError::EmptyRoi);
    }
    let n = values.len();
    let values = Array1::from(values).insert_axis(Axis(0));

    log::trace!("roi: {n} voxels on {} slices", tumor_slices.len());

    Ok(Roi {
        values,
        voxel_volume: spacing.voxel(),
        sub_volume: volume.select(Axis(0), &tumor_slices),
        sub_mask: mask.select(Axis(0), &tumor_slices),
        tumor_slices,
        spacing,
    })
}

/// 提取 ROI.
///
/// `volume` 和 `mask` 以 `(z, h, w)` 组织, 形状必须一致; `mask` 只允许 0 和 1.
/// 返回的 ROI 至少含有一个体素.
pub fn extract_roi(
    volume: ArrayView3<i16>,
    mask: ArrayView3<u8>,
    spacing: Spacing,
) -> Result<Roi, InvalidInputError> {
    check_input(&volume, &mask)?;

    let mut values = Vec::with_capacity(256);
    let mut tumor_slices = Vec::with_capacity(16);
    for (z, (scan, label)) in volume
        .axis_iter(Axis(0))
        .zip(mask.axis_iter(Axis(0)))
        .enumerate()
    {
        let before = values.len();
        values.extend(
            scan.iter()
                .zip(label.iter())
                .filter_map(|(hu, p)| is_roi(*p).then_some(*hu as f64)),
        );
        if values.len() > before {
            tumor_slices.push(z);
        }
    }
    assemble(volume, mask, spacing, values, tumor_slices)
}

cfg_if::cfg_if! {
    if #[cfg(feature = "rayon")] {
        use rayon::iter::{IndexedParallelIterator, IntoParallelIterator, ParallelIterator};
    }
}

/// 借助 `rayon`, 逐切片并行地提取 ROI. 结果与 [`extract_roi`] 完全一致.
#[cfg(feature = "rayon")]
pub fn par_extract_roi(
    volume: ArrayView3<i16>,
    mask: ArrayView3<u8>,
    spacing: Spacing,
) -> Result<Roi, InvalidInputError> {
    check_input(&volume, &mask)?;

    let per_slice: Vec<Vec<f64>> = volume
        .axis_iter(Axis(0))
        .into_par_iter()
        .zip(mask.axis_iter(Axis(0)).into_par_iter())
        .map(|(scan, label)| {
            scan.iter()
                .zip(label.iter())
                .filter_map(|(hu, p)| is_roi(*p).then_some(*hu as f64))
                .collect::<Vec<f64>>()
        })
        .collect();

    let tumor_slices = per_slice
        .iter()
        .enumerate()
        .filter_map(|(z, v)| (!v.is_empty()).then_some(z))
        .collect();
    let values = per_slice.into_iter().flatten().collect();
    assemble(volume, mask, spacing, values, tumor_slices)
}
