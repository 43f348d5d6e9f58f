//! 通用常量.

/// 标注取值.
pub mod mask {
    /// 背景体素.
    pub const MASK_BACKGROUND: u8 = 0;

    /// ROI (肿瘤) 体素.
    pub const MASK_ROI: u8 = 1;

    /// 体素是否属于 ROI?
    #[inline]
    pub const fn is_roi(p: u8) -> bool {
        matches!(p, MASK_ROI)
    }

    /// 体素是否是合法的二值标注值?
    #[inline]
    pub const fn is_binary(p: u8) -> bool {
        matches!(p, MASK_BACKGROUND | MASK_ROI)
    }
}

/// 一阶统计特征个数.
pub const FIRST_ORDER_LEN: usize = 19;

/// 三维形状特征个数.
pub const SHAPE_LEN: usize = 13;

/// 一阶统计特征名称, 按输出顺序排列.
///
/// 顺序是下游约定的一部分, 不得调整.
pub const FIRST_ORDER_NAMES: [&str; FIRST_ORDER_LEN] = [
    "Energy",
    "TotalEnergy",
    "Entropy",
    "Minimum",
    "10Percentile",
    "90Percentile",
    "Maximum",
    "Mean",
    "Median",
    "InterquartileRange",
    "Range",
    "MeanAbsoluteDeviation",
    "RobustMeanAbsoluteDeviation",
    "RootMeanSquared",
    "StandardDeviation",
    "Skewness",
    "Kurtosis",
    "Variance",
    "Uniformity",
];

/// 三维形状特征名称, 按输出顺序排列.
///
/// 顺序是下游约定的一部分, 不得调整.
pub const SHAPE_NAMES: [&str; SHAPE_LEN] = [
    "Volume",
    "VoxelVolume",
    "SurfaceArea",
    "SurfaceVolumeRatio",
    "Sphericity",
    "Compactness1",
    "Compactness2",
    "SphericalDisproportion",
    "Maximum3DDiameter",
    "MajorAxisLength",
    "MinorAxisLength",
    "Elongation",
    "Flatness",
];
