//! 影像组学特征计算.
//!
//! 每个样本先提取一次 ROI, 然后分别计算一阶统计特征 ([`FirstOrder`]) 与三维形状特征
//! ([`ShapeFeatures`]). 两者互相独立: 形状特征失败 (点集退化) 时, 一阶统计特征照常给出.

use ndarray::ArrayView3;

use crate::data::{Sample, Spacing};
use crate::error::{GeometryError, InvalidInputError};
use crate::geometry::{ConvexHullProvider, EigenSolver, IncrementalHull, SymmetricEigenSolver};
use crate::roi::extract_roi;

pub mod first_order;
pub mod shape;

pub use first_order::FirstOrder;
pub use shape::{ShapeExtractor, ShapeFeatures};

/// 有序的具名特征向量. 名称固定, 与特征值一一对应.
#[derive(Debug, Clone, PartialEq)]
pub struct FeatureVector {
    names: &'static [&'static str],
    values: Vec<f64>,
}

impl FeatureVector {
    pub(crate) fn new(names: &'static [&'static str], values: Vec<f64>) -> Self {
        debug_assert_eq!(names.len(), values.len());
        Self { names, values }
    }

    /// 特征名称, 按输出顺序排列.
    #[inline]
    pub fn names(&self) -> &'static [&'static str] {
        self.names
    }

    /// 特征值, 按输出顺序排列.
    #[inline]
    pub fn values(&self) -> &[f64] {
        &self.values
    }

    /// 按名称查找特征值.
    pub fn get(&self, name: &str) -> Option<f64> {
        self.names
            .iter()
            .position(|n| *n == name)
            .map(|i| self.values[i])
    }

    /// 特征个数.
    #[inline]
    pub fn len(&self) -> usize {
        self.values.len()
    }

    /// 是否为空.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }

    /// 依次迭代 `(名称, 特征值)`.
    pub fn iter(&self) -> impl Iterator<Item = (&'static str, f64)> + '_ {
        self.names.iter().copied().zip(self.values.iter().copied())
    }
}

/// 单个样本的特征计算结果.
///
/// 形状特征无法计算时 (ROI 退化), `shape` 为 `Err`, 一阶统计特征不受影响.
#[derive(Debug, Clone, PartialEq)]
pub struct SampleFeatures {
    /// 样本标识.
    pub sample_id: String,

    /// 一阶统计特征.
    pub first_order: FirstOrder,

    /// 三维形状特征.
    pub shape: Result<ShapeFeatures, GeometryError>,
}

impl SampleFeatures {
    /// 一阶统计特征向量.
    #[inline]
    pub fn first_order_vector(&self) -> FeatureVector {
        self.first_order.to_vector()
    }

    /// 形状特征向量. 形状特征缺失时返回 `None`.
    #[inline]
    pub fn shape_vector(&self) -> Option<FeatureVector> {
        self.shape.as_ref().ok().map(ShapeFeatures::to_vector)
    }
}

/// 特征提取流水线.
///
/// 无内部可变状态, 可在多个线程间共享, 对不同样本并发调用.
#[derive(Debug, Clone, Copy, Default)]
pub struct FeatureExtractor<H = IncrementalHull, E = SymmetricEigenSolver> {
    shape: ShapeExtractor<H, E>,
}

impl<H, E> FeatureExtractor<H, E>
where
    H: ConvexHullProvider,
    E: EigenSolver,
{
    /// 以给定的几何后端创建流水线.
    pub fn new(hull: H, eigen: E) -> Self {
        Self {
            shape: ShapeExtractor::new(hull, eigen),
        }
    }

    /// 计算样本 `sample` 的全部特征.
    ///
    /// 输入不合法时返回 `Err`, 此时不给出任何特征.
    pub fn extract(&self, sample: &Sample) -> Result<SampleFeatures, InvalidInputError> {
        self.extract_views(sample.id(), sample.volume(), sample.mask(), sample.spacing())
    }

    /// 同 [`FeatureExtractor::extract`], 但直接接受扫描与标注视图.
    pub fn extract_views(
        &self,
        sample_id: &str,
        volume: ArrayView3<i16>,
        mask: ArrayView3<u8>,
        spacing: Spacing,
    ) -> Result<SampleFeatures, InvalidInputError> {
        let roi = extract_roi(volume, mask, spacing)?;
        let first_order = FirstOrder::compute(roi.row(), roi.voxel_volume());
        let shape = self.shape.compute(roi.sub_mask(), spacing);

        match &shape {
            Ok(_) => log::debug!("{sample_id}: {} roi voxels", roi.len()),
            Err(e) => log::debug!("{sample_id}: shape features withheld: {e}"),
        }

        Ok(SampleFeatures {
            sample_id: sample_id.to_string(),
            first_order,
            shape,
        })
    }
}
