//! 运行时错误.
//!
//! 数学意义上无定义的特征 (如零方差的偏度) **不是** 错误, 它们以 `f64::NAN` 表示.
//! 这里的错误只代表 "计算无法进行".

use crate::Idx3d;
use thiserror::Error;

/// 输入数据不合法. 出现该错误时, 不会产生任何特征向量.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum InvalidInputError {
    /// 缺少 CT 扫描体数据.
    #[error("缺少 CT 扫描体数据")]
    MissingVolume,

    /// 缺少分割标注.
    #[error("缺少分割标注")]
    MissingMask,

    /// 缺少体素分辨率.
    #[error("缺少体素分辨率")]
    MissingSpacing,

    /// 扫描体数据为空 (某一维长度为 0).
    #[error("扫描体数据为空")]
    EmptyVolume,

    /// 标注与扫描形状不一致. 依次为标注形状和扫描形状.
    #[error("标注形状 {mask:?} 与扫描形状 {volume:?} 不一致")]
    ShapeMismatch {
        /// 标注形状 `(z, h, w)`.
        mask: Idx3d,

        /// 扫描形状 `(z, h, w)`.
        volume: Idx3d,
    },

    /// 标注中出现了 0, 1 以外的值.
    #[error("标注只允许 0 或 1, 但发现了 `{0}`")]
    InvalidMaskValue(u8),

    /// 标注中不存在任何 ROI 体素.
    #[error("标注中不存在 ROI 体素")]
    EmptyRoi,

    /// 体素分辨率存在非正数或非有限值. 参数为原始输入 `[z, h, w]`.
    #[error("体素分辨率必须为正有限值, 但得到 {0:?}")]
    NonPositiveSpacing([f64; 3]),
}

/// 三维几何计算无法进行. 出现该错误时, 仅形状特征向量缺失.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum GeometryError {
    /// 标注中没有前景体素.
    #[error("标注中没有前景体素")]
    EmptyMask,

    /// 点数不足 4 个, 无法构成三维凸包. 参数为实际点数.
    #[error("凸包至少需要 4 个点, 但只有 {0} 个")]
    TooFewPoints(usize),

    /// 点集共面 (或共线, 重合), 无法构成三维凸包.
    ///
    /// `rank` 为点集仿射包的维数: 0 为单点, 1 为共线, 2 为共面.
    #[error("{points} 个点的仿射维数仅为 {rank}, 无法构成三维凸包")]
    Degenerate {
        /// 点数.
        points: usize,

        /// 仿射维数.
        rank: usize,
    },

    /// 索引超出精确几何计算允许的范围.
    #[error("体素索引 {0:?} 超出精确几何计算范围")]
    IndexOverflow(Idx3d),

    /// 特征值分解失败.
    #[error("特征值分解失败: {0}")]
    Eigen(String),
}

/// 从 nii 文件加载样本时的错误.
#[derive(Error, Debug)]
pub enum SourceError {
    /// nii 文件读取/解析失败.
    #[error(transparent)]
    Nifti(#[from] nifti::NiftiError),

    /// 体数据不是三维的.
    #[error("nii 体数据不是三维的: {0}")]
    Shape(#[from] ndarray::ShapeError),

    /// 读取成功, 但数据不合法.
    #[error(transparent)]
    Input(#[from] InvalidInputError),
}
