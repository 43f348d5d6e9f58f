//! 合成体模标注, 用于验证形状特征和消融实验.
//!
//! 所有函数都返回以 `(z, h, w)` 组织的二值标注.

use ndarray::{s, Array3};

use crate::consts::mask::{MASK_BACKGROUND, MASK_ROI};
use crate::data::Spacing;
use crate::Idx3d;

/// 椭球体模. `center` 与 `radii` 均以毫米为单位, 按 `[z, h, w]` 给出.
///
/// 体素中心 (物理坐标) 落在椭球内 (含边界) 的体素为 ROI.
pub fn ellipsoid(shape: Idx3d, center: [f64; 3], radii: [f64; 3], spacing: Spacing) -> Array3<u8> {
    Array3::from_shape_fn(shape, |pos| {
        let p = spacing.physical(pos);
        let d: f64 = (0..3).map(|i| ((p[i] - center[i]) / radii[i]).powi(2)).sum();
        if d <= 1.0 {
            MASK_ROI
        } else {
            MASK_BACKGROUND
        }
    })
}

/// 以数组中心为球心, 半径 `radius` 毫米的球体模.
pub fn sphere(shape: Idx3d, radius: f64, spacing: Spacing) -> Array3<u8> {
    let (z, h, w) = shape;
    let center = spacing.physical((z / 2, h / 2, w / 2));
    ellipsoid(shape, center, [radius; 3], spacing)
}

/// 长方体体模, 覆盖索引区间 `[from, to)`. 区间会被裁剪到数组范围内.
pub fn cuboid(shape: Idx3d, from: Idx3d, to: Idx3d) -> Array3<u8> {
    let mut mask = Array3::from_elem(shape, MASK_BACKGROUND);
    let z = from.0.min(shape.0)..to.0.min(shape.0);
    let h = from.1.min(shape.1)..to.1.min(shape.1);
    let w = from.2.min(shape.2)..to.2.min(shape.2);
    if !(z.is_empty() || h.is_empty() || w.is_empty()) {
        mask.slice_mut(s![z, h, w]).fill(MASK_ROI);
    }
    mask
}

/// 能完整容纳半径 `radius` 毫米球体的最小数组形状 (每边各留一层背景).
pub fn sphere_shape(radius: f64, spacing: Spacing) -> Idx3d {
    let n = |mm: f64| 2 * (radius / mm).ceil() as usize + 3;
    (n(spacing.z_mm()), n(spacing.height_mm()), n(spacing.width_mm()))
}
