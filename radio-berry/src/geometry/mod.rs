//! 三维几何计算: 凸包与对称矩阵特征值.
//!
//! 形状特征只通过 [`ConvexHullProvider`] 和 [`EigenSolver`] 两个 trait 使用几何后端,
//! 因此可以替换为其他实现 (例如 `lapack` feature 下的 [`LapackEigenSolver`]).

use ndarray::ArrayView2;

use crate::data::Spacing;
use crate::error::GeometryError;
use crate::Idx3d;

mod eigen;
mod hull;

pub use eigen::SymmetricEigenSolver;
pub use hull::IncrementalHull;

#[cfg(feature = "lapack")]
pub use eigen::LapackEigenSolver;

/// 凸包的度量信息, 均以物理单位 (毫米) 表示.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct HullMeasure {
    /// 表面积 (平方毫米).
    pub area: f64,

    /// 体积 (立方毫米).
    pub volume: f64,

    /// 轴对齐包围盒的最小角, `[z, h, w]`.
    pub min_bound: [f64; 3],

    /// 轴对齐包围盒的最大角, `[z, h, w]`.
    pub max_bound: [f64; 3],

    /// 三角剖分中的顶点数 (可能包含位于棱或面上的点).
    pub vertices: usize,

    /// 凸包三角面片数.
    pub facets: usize,
}

impl HullMeasure {
    /// 包围盒对角线长度.
    #[inline]
    pub fn diagonal(&self) -> f64 {
        self.min_bound
            .iter()
            .zip(self.max_bound.iter())
            .map(|(a, b)| (b - a).powi(2))
            .sum::<f64>()
            .sqrt()
    }
}

/// 三维凸包后端.
pub trait ConvexHullProvider {
    /// 计算体素索引点集 `points` 在 `spacing` 下的物理凸包.
    ///
    /// 点数少于 4 个, 或点集共面 (共线, 重合) 时返回 `Err`.
    fn convex_hull(&self, points: &[Idx3d], spacing: Spacing)
        -> Result<HullMeasure, GeometryError>;
}

/// 3 x 3 实对称矩阵特征值后端.
pub trait EigenSolver {
    /// 求 `covariance` 的三个特征值, 按升序排列.
    fn eigenvalues(&self, covariance: ArrayView2<f64>) -> Result<[f64; 3], GeometryError>;
}
