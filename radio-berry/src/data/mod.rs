use ndarray::{Array3, ArrayView3, Dimension, Ix3};

use crate::consts::mask::*;
use crate::error::InvalidInputError;
use crate::features::{FeatureExtractor, SampleFeatures};
use crate::Idx3d;

pub mod overlay;
mod source;
pub mod window;

pub use window::CtWindow;

/// 体素分辨率, 以毫米为单位, 分别代表空间 (相邻切片方向), 高 (自然图像的垂直方向),
/// 宽 (自然图像的水平方向).
///
/// 三个分量均为正有限值. 该结构是只读的.
#[derive(Copy, Clone, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Spacing {
    z: f64,
    height: f64,
    width: f64,
}

impl Spacing {
    /// 构建体素分辨率. 任一分量不是正有限值时返回 `Err`.
    pub fn new(z: f64, height: f64, width: f64) -> Result<Self, InvalidInputError> {
        let valid = |v: f64| v.is_finite() && v > 0.0;
        if valid(z) && valid(height) && valid(width) {
            Ok(Self { z, height, width })
        } else {
            Err(InvalidInputError::NonPositiveSpacing([z, height, width]))
        }
    }

    /// 构建各向同性的体素分辨率.
    #[inline]
    pub fn isotropic(mm: f64) -> Result<Self, InvalidInputError> {
        Self::new(mm, mm, mm)
    }

    /// 以 `[z, h, w]` 格式构建体素分辨率.
    #[inline]
    pub fn from_array([z, h, w]: [f64; 3]) -> Result<Self, InvalidInputError> {
        Self::new(z, h, w)
    }

    /// 空间方向 (相邻 2D 切片的方向) 分辨率.
    #[inline]
    pub fn z_mm(&self) -> f64 {
        self.z
    }

    /// height 方向 (自然 2D 图像的垂直方向) 分辨率.
    #[inline]
    pub fn height_mm(&self) -> f64 {
        self.height
    }

    /// width 方向 (自然 2D 图像的水平方向) 分辨率.
    #[inline]
    pub fn width_mm(&self) -> f64 {
        self.width
    }

    /// 以 `[z, h, w]` 格式获取分辨率.
    #[inline]
    pub fn as_array(&self) -> [f64; 3] {
        [self.z, self.height, self.width]
    }

    /// 单个体素的实际体积, 以立方毫米为单位.
    #[inline]
    pub fn voxel(&self) -> f64 {
        self.z * self.height * self.width
    }

    /// 三个方向同时放大 `k` 倍. `k` 不是正有限值时返回 `Err`.
    #[inline]
    pub fn scaled(&self, k: f64) -> Result<Self, InvalidInputError> {
        Self::new(self.z * k, self.height * k, self.width * k)
    }

    /// 将体素索引换算为物理坐标 (毫米).
    #[inline]
    pub fn physical(&self, (z, h, w): Idx3d) -> [f64; 3] {
        [z as f64 * self.z, h as f64 * self.height, w as f64 * self.width]
    }

    /// 体素分辨率在三个维度上是否是各向同的?
    #[inline]
    pub fn is_isotropic(&self) -> bool {
        self.z == self.height && self.z == self.width
    }
}

/// 将多值标注 (如 LiTS 格式的 0/1/2) 中值为 `target` 的体素标记为 ROI, 其余标记为背景.
pub fn binarize(label: ArrayView3<u8>, target: u8) -> Array3<u8> {
    label.mapv(|p| if p == target { MASK_ROI } else { MASK_BACKGROUND })
}

/// 检查标注与扫描形状是否一致.
#[inline]
pub(crate) fn check_shape(mask: Ix3, volume: Ix3) -> Result<(), InvalidInputError> {
    if mask == volume {
        Ok(())
    } else {
        Err(InvalidInputError::ShapeMismatch {
            mask: mask.into_pattern(),
            volume: volume.into_pattern(),
        })
    }
}

/// 一个待计算特征的样本: 3D CT 扫描 (HU), 对应的二值标注, 体素分辨率和样本标识.
///
/// 通过 [`SampleBuilder`] 构建, 构建成功时扫描与标注形状一致.
#[derive(Debug, Clone)]
pub struct Sample {
    id: String,
    volume: Array3<i16>,
    mask: Array3<u8>,
    spacing: Spacing,
}

impl Sample {
    /// 开始构建样本.
    #[inline]
    pub fn builder(id: impl Into<String>) -> SampleBuilder {
        SampleBuilder::new(id)
    }

    /// 样本标识 (如病人 ID).
    #[inline]
    pub fn id(&self) -> &str {
        &self.id
    }

    /// 获取 CT 扫描的不可变视图, 以 `(z, h, w)` 访问.
    #[inline]
    pub fn volume(&self) -> ArrayView3<'_, i16> {
        self.volume.view()
    }

    /// 获取标注的不可变视图, 以 `(z, h, w)` 访问.
    #[inline]
    pub fn mask(&self) -> ArrayView3<'_, u8> {
        self.mask.view()
    }

    /// 体素分辨率.
    #[inline]
    pub fn spacing(&self) -> Spacing {
        self.spacing
    }

    /// 获取数据形状大小.
    #[inline]
    pub fn shape(&self) -> Idx3d {
        self.volume.dim()
    }

    /// 使用默认的凸包与特征值实现计算该样本的全部特征.
    #[inline]
    pub fn extract(&self) -> Result<SampleFeatures, InvalidInputError> {
        <FeatureExtractor>::default().extract(self)
    }
}

/// [`Sample`] 构建器. 缺失的部分在 [`SampleBuilder::build`] 时报告.
#[derive(Debug, Clone, Default)]
pub struct SampleBuilder {
    id: String,
    volume: Option<Array3<i16>>,
    mask: Option<Array3<u8>>,
    spacing: Option<Spacing>,
}

impl SampleBuilder {
    /// 以样本标识 `id` 开始构建.
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            ..Default::default()
        }
    }

    /// 设置 CT 扫描 (HU), 以 `(z, h, w)` 组织.
    #[inline]
    pub fn volume(mut self, volume: Array3<i16>) -> Self {
        self.volume = Some(volume);
        self
    }

    /// 设置二值标注, 以 `(z, h, w)` 组织.
    #[inline]
    pub fn mask(mut self, mask: Array3<u8>) -> Self {
        self.mask = Some(mask);
        self
    }

    /// 设置体素分辨率.
    #[inline]
    pub fn spacing(mut self, spacing: Spacing) -> Self {
        self.spacing = Some(spacing);
        self
    }

    /// 完成构建.
    ///
    /// 扫描, 标注, 分辨率任一缺失, 或扫描与标注形状不一致时返回 `Err`.
    /// 标注取值的合法性在提取 ROI 时检查.
    pub fn build(self) -> Result<Sample, InvalidInputError> {
        let volume = self.volume.ok_or(InvalidInputError::MissingVolume)?;
        let mask = self.mask.ok_or(InvalidInputError::MissingMask)?;
        let spacing = self.spacing.ok_or(InvalidInputError::MissingSpacing)?;
        check_shape(mask.raw_dim(), volume.raw_dim())?;
        Ok(Sample {
            id: self.id,
            volume,
            mask,
            spacing,
        })
    }
}
