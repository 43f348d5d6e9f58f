//! 三维形状特征.
//!
//! 坐标均按体素分辨率换算为物理单位 (毫米). 体积和表面积取自凸包,
//! 轴长, 伸长度和扁平度取自体素坐标协方差矩阵的特征值.

use std::f64::consts::PI;

use ndarray::{Array2, ArrayView3, Axis};

use super::FeatureVector;
use crate::consts::{mask::MASK_BACKGROUND, SHAPE_NAMES};
use crate::data::Spacing;
use crate::error::GeometryError;
use crate::geometry::{ConvexHullProvider, EigenSolver, IncrementalHull, SymmetricEigenSolver};
use crate::Idx3d;

/// 三维形状特征, 字段顺序即输出顺序.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ShapeFeatures {
    /// 凸包体积.
    pub volume: f64,

    /// 体素计数体积, 即 ROI 体素个数乘以单个体素体积.
    pub voxel_volume: f64,

    /// 凸包表面积.
    pub surface_area: f64,

    /// `A / V`.
    pub surface_volume_ratio: f64,

    /// `(36 pi V^2)^(1/3) / A`.
    pub sphericity: f64,

    /// `V / (A^1.5 sqrt(pi))`.
    pub compactness_1: f64,

    /// `36 pi V^2 / A^3`.
    pub compactness_2: f64,

    /// `A / (36 pi V^2)^(1/3)`.
    pub spherical_disproportion: f64,

    /// 凸包包围盒对角线长度的 2 倍.
    pub maximum_3d_diameter: f64,

    /// `4 sqrt(l2)`.
    pub major_axis_length: f64,

    /// `4 sqrt(l0)`.
    pub minor_axis_length: f64,

    /// `sqrt(l1 / l2)`.
    pub elongation: f64,

    /// `sqrt(l0 / l2)`.
    pub flatness: f64,
}

/// 负特征值 (数值误差) 视为无定义.
#[inline]
fn axis_length(lambda: f64) -> f64 {
    if lambda >= 0.0 {
        lambda.sqrt() * 4.0
    } else {
        f64::NAN
    }
}

#[inline]
fn axis_ratio(num: f64, den: f64) -> f64 {
    if num >= 0.0 && den >= 0.0 {
        (num / den).sqrt()
    } else {
        f64::NAN
    }
}

impl ShapeFeatures {
    /// 按输出顺序排列的特征值.
    pub fn as_array(&self) -> [f64; 13] {
        [
            self.volume,
            self.voxel_volume,
            self.surface_area,
            self.surface_volume_ratio,
            self.sphericity,
            self.compactness_1,
            self.compactness_2,
            self.spherical_disproportion,
            self.maximum_3d_diameter,
            self.major_axis_length,
            self.minor_axis_length,
            self.elongation,
            self.flatness,
        ]
    }

    /// 转换为带名称的有序特征向量.
    #[inline]
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::new(&SHAPE_NAMES, self.as_array().to_vec())
    }
}

/// 收集所有非零体素的索引, 行优先顺序.
fn roi_points(mask: &ArrayView3<u8>) -> Vec<Idx3d> {
    mask.indexed_iter()
        .filter_map(|(pos, p)| (*p != MASK_BACKGROUND).then_some(pos))
        .collect()
}

/// 物理坐标的协方差矩阵.
///
/// 坐标先去中心化, 再乘以 `1 / sqrt(N)`, 于是 `X^T X` 即总体协方差.
fn covariance(points: &[Idx3d], spacing: Spacing) -> Array2<f64> {
    let n = points.len();
    let mut x = Array2::<f64>::zeros((n, 3));
    for (mut row, pos) in x.axis_iter_mut(Axis(0)).zip(points.iter()) {
        let p = spacing.physical(*pos);
        row[0] = p[0];
        row[1] = p[1];
        row[2] = p[2];
    }
    if let Some(centroid) = x.mean_axis(Axis(0)) {
        x -= &centroid;
    }
    x /= (n as f64).sqrt();
    x.t().dot(&x)
}

/// 三维形状特征提取器.
///
/// 凸包后端 `H` 与特征值后端 `E` 可替换.
#[derive(Debug, Clone, Copy, Default)]
pub struct ShapeExtractor<H = IncrementalHull, E = SymmetricEigenSolver> {
    hull: H,
    eigen: E,
}

impl<H, E> ShapeExtractor<H, E>
where
    H: ConvexHullProvider,
    E: EigenSolver,
{
    /// 以给定的几何后端创建提取器.
    pub fn new(hull: H, eigen: E) -> Self {
        Self { hull, eigen }
    }

    /// 计算二值标注 `mask` 在分辨率 `spacing` 下的形状特征.
    ///
    /// 所有非零体素均视为 ROI. 空标注返回 [`GeometryError::EmptyMask`];
    /// 无法构成凸包的点集 (少于 4 个点, 或共面) 同样返回 `Err`.
    pub fn compute(
        &self,
        mask: ArrayView3<u8>,
        spacing: Spacing,
    ) -> Result<ShapeFeatures, GeometryError> {
        let points = roi_points(&mask);
        if points.is_empty() {
            return Err(GeometryError::EmptyMask);
        }

        let hull = self.hull.convex_hull(&points, spacing)?;
        let [l0, l1, l2] = self.eigen.eigenvalues(covariance(&points, spacing).view())?;

        let (a, v) = (hull.area, hull.volume);
        let sphere = (36.0 * PI * v * v).cbrt();

        Ok(ShapeFeatures {
            volume: v,
            voxel_volume: points.len() as f64 * spacing.voxel(),
            surface_area: a,
            surface_volume_ratio: a / v,
            sphericity: sphere / a,
            compactness_1: v / (a.powf(1.5) * PI.sqrt()),
            compactness_2: 36.0 * PI * v * v / a.powi(3),
            spherical_disproportion: a / sphere,
            maximum_3d_diameter: hull.diagonal() * 2.0,
            major_axis_length: axis_length(l2),
            minor_axis_length: axis_length(l0),
            elongation: axis_ratio(l1, l2),
            flatness: axis_ratio(l0, l2),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::{covariance, ShapeExtractor, ShapeFeatures};
    use crate::data::Spacing;
    use crate::error::GeometryError;
    use crate::phantom;
    use ndarray::{s, Array3};
    use std::f64::consts::PI;

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    fn compute(mask: &Array3<u8>, spacing: Spacing) -> Result<ShapeFeatures, GeometryError> {
        <ShapeExtractor>::default().compute(mask.view(), spacing)
    }

    #[test]
    fn test_shape_tetrahedron() {
        let mut mask = Array3::<u8>::zeros((2, 2, 2));
        for pos in [(0, 0, 0), (1, 0, 0), (0, 1, 0), (0, 0, 1)] {
            mask[pos] = 1;
        }
        let f = compute(&mask, Spacing::isotropic(1.0).unwrap()).unwrap();
        let area = 1.5 + 3f64.sqrt() / 2.0;
        assert!(f64_eq(f.volume, 1.0 / 6.0));
        assert!(f64_eq(f.voxel_volume, 4.0));
        assert!(f64_eq(f.surface_area, area));
        assert!(f64_eq(f.surface_volume_ratio, area * 6.0));
        assert!(f64_eq(f.maximum_3d_diameter, 2.0 * 3f64.sqrt()));
        assert!(f64_eq(f.sphericity * f.spherical_disproportion, 1.0));
    }

    #[test]
    fn test_shape_cube() {
        let mask = Array3::<u8>::ones((3, 3, 3));
        let f = compute(&mask, Spacing::isotropic(1.0).unwrap()).unwrap();
        assert!(f64_eq(f.volume, 8.0));
        assert!(f64_eq(f.voxel_volume, 27.0));
        assert!(f64_eq(f.surface_area, 24.0));
        assert!(f64_eq(f.surface_volume_ratio, 3.0));
        assert!(f64_eq(f.sphericity, (36.0 * PI * 64.0).cbrt() / 24.0));
        assert!(f64_eq(f.compactness_1, 8.0 / (24f64.powf(1.5) * PI.sqrt())));
        assert!(f64_eq(f.compactness_2, 36.0 * PI * 64.0 / 24f64.powi(3)));
        assert!(f64_eq(f.maximum_3d_diameter, 4.0 * 3f64.sqrt()));
        // 每个轴上坐标 0, 1, 2 各占三分之一, 方差 2/3.
        let axis = 4.0 * (2.0f64 / 3.0).sqrt();
        assert!(f64_eq(f.major_axis_length, axis));
        assert!(f64_eq(f.minor_axis_length, axis));
        assert!(f64_eq(f.elongation, 1.0));
        assert!(f64_eq(f.flatness, 1.0));
    }

    #[test]
    fn test_shape_box_axes() {
        let mask = Array3::<u8>::ones((2, 2, 10));
        let f = compute(&mask, Spacing::isotropic(1.0).unwrap()).unwrap();
        assert!(f64_eq(f.volume, 9.0));
        assert!(f64_eq(f.major_axis_length, 4.0 * 8.25f64.sqrt()));
        assert!(f64_eq(f.minor_axis_length, 2.0));
        assert!(f64_eq(f.elongation, (0.25f64 / 8.25).sqrt()));
        assert!(f64_eq(f.flatness, (0.25f64 / 8.25).sqrt()));
    }

    #[test]
    fn test_covariance_population() {
        let points = [(0, 0, 0), (0, 0, 2), (0, 2, 0), (0, 2, 2)];
        let cov = covariance(&points, Spacing::new(1.0, 1.0, 3.0).unwrap());
        assert!(f64_eq(cov[(0, 0)], 0.0));
        assert!(f64_eq(cov[(1, 1)], 1.0));
        assert!(f64_eq(cov[(2, 2)], 9.0));
        assert!(f64_eq(cov[(1, 2)], 0.0));
        assert!(f64_eq(cov[(2, 1)], 0.0));
    }

    #[test]
    fn test_shape_nonzero_labels_are_roi() {
        let sp = Spacing::isotropic(1.0).unwrap();
        let ones = compute(&Array3::<u8>::ones((3, 3, 3)), sp).unwrap();
        let twos = compute(&Array3::<u8>::from_elem((3, 3, 3), 2), sp).unwrap();
        assert_eq!(ones, twos);
        assert!(f64_eq(twos.voxel_volume, 27.0));

        // 多标签混合时, 全部非零体素参与计算.
        let mut mixed = Array3::<u8>::ones((3, 3, 3));
        mixed[(0, 0, 0)] = 2;
        mixed[(2, 2, 2)] = 7;
        assert_eq!(compute(&mixed, sp).unwrap(), ones);
    }

    #[test]
    fn test_shape_degenerate() {
        let sp = Spacing::isotropic(1.0).unwrap();

        let empty = Array3::<u8>::zeros((3, 3, 3));
        assert_eq!(compute(&empty, sp).unwrap_err(), GeometryError::EmptyMask);

        let mut single = Array3::<u8>::zeros((3, 3, 3));
        single[(1, 1, 1)] = 1;
        assert_eq!(compute(&single, sp).unwrap_err(), GeometryError::TooFewPoints(1));

        // 单层平面.
        let mut sheet = Array3::<u8>::zeros((3, 4, 4));
        sheet.slice_mut(s![1, .., ..]).fill(1);
        assert!(matches!(
            compute(&sheet, sp).unwrap_err(),
            GeometryError::Degenerate { rank: 2, .. }
        ));
    }

    #[test]
    fn test_shape_translation_invariant() {
        let sp = Spacing::new(2.5, 0.7, 0.7).unwrap();
        let mut a = Array3::<u8>::zeros((12, 12, 12));
        let mut b = Array3::<u8>::zeros((12, 12, 12));
        for (z, h, w) in [(0, 0, 0), (1, 2, 0), (2, 1, 3), (0, 3, 1), (1, 1, 1), (2, 3, 2)] {
            a[(z, h, w)] = 1;
            b[(z + 7, h + 5, w + 3)] = 1;
        }
        let fa = compute(&a, sp).unwrap().as_array();
        let fb = compute(&b, sp).unwrap().as_array();
        for (x, y) in fa.iter().zip(fb.iter()) {
            assert!((x - y).abs() <= 1e-9 * x.abs().max(1.0));
        }
    }

    #[test]
    fn test_shape_spacing_scales() {
        let unit = Spacing::isotropic(1.0).unwrap();
        let mask = phantom::ellipsoid((9, 11, 13), [4.0, 5.0, 6.0], [3.5, 4.5, 5.5], unit);
        let a = compute(&mask, Spacing::new(1.0, 0.8, 0.6).unwrap()).unwrap();
        let b = compute(&mask, Spacing::new(2.0, 1.6, 1.2).unwrap()).unwrap();
        assert!((b.volume / a.volume - 8.0).abs() < 1e-9);
        assert!((b.voxel_volume / a.voxel_volume - 8.0).abs() < 1e-9);
        assert!((b.surface_area / a.surface_area - 4.0).abs() < 1e-9);
        assert!((b.maximum_3d_diameter / a.maximum_3d_diameter - 2.0).abs() < 1e-9);
        // 无量纲特征不变.
        assert!((b.sphericity - a.sphericity).abs() < 1e-9);
        assert!((b.elongation - a.elongation).abs() < 1e-9);
    }

    #[test]
    fn test_shape_sphere_phantom() {
        let sp = Spacing::isotropic(1.0).unwrap();
        let mask = phantom::sphere((19, 19, 19), 8.0, sp);
        let f = compute(&mask, sp).unwrap();
        assert!(f.sphericity > 0.97 && f.sphericity <= 1.0);
        assert!(f.spherical_disproportion >= 1.0);
        assert!((f.elongation - 1.0).abs() < 1e-9);
        assert!((f.flatness - 1.0).abs() < 1e-9);
        // 体素中心的凸包略小于理想球体.
        assert!(f.volume < 4.0 / 3.0 * PI * 512.0);
        assert!(f.volume > 0.75 * 4.0 / 3.0 * PI * 512.0);
    }

    #[test]
    fn test_shape_vector_names() {
        let mask = Array3::<u8>::ones((3, 3, 3));
        let f = compute(&mask, Spacing::isotropic(1.0).unwrap()).unwrap();
        let v = f.to_vector();
        assert_eq!(v.len(), 13);
        assert_eq!(v.names()[0], "Volume");
        assert_eq!(v.names()[12], "Flatness");
        assert!(f64_eq(v.get("SurfaceArea").unwrap(), 24.0));
    }
}
