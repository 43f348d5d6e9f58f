//! 实验用体模.

use ndarray::Array3;
use radio_berry::{phantom, Idx3d, InvalidInputError, Sample, Spacing};
use std::f64::consts::PI;
use std::fmt;

/// 体模形状.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Kind {
    /// 半径 `r` 的球.
    Sphere,

    /// 半轴 `(r, r, 1.5r)` 的椭球, 长轴沿宽方向.
    Ellipsoid,

    /// 边长约 `2r` 的立方体.
    Cube,
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Kind::Sphere => "sphere",
            Kind::Ellipsoid => "ellipsoid",
            Kind::Cube => "cube",
        };
        f.write_str(s)
    }
}

/// 单个实验用例: 形状, 半径 (毫米) 与体素分辨率.
#[derive(Debug, Clone, Copy)]
pub struct Case {
    pub kind: Kind,
    pub radius: f64,
    pub spacing: Spacing,
}

impl fmt::Display for Case {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let [z, h, w] = self.spacing.as_array();
        write!(f, "{} r={} @ ({z}, {h}, {w}) mm", self.kind, self.radius)
    }
}

impl Case {
    /// 容纳体模的数组形状.
    fn shape(&self) -> Idx3d {
        let r = match self.kind {
            Kind::Ellipsoid => self.radius * 1.5,
            _ => self.radius,
        };
        phantom::sphere_shape(r, self.spacing)
    }

    /// 立方体每个方向覆盖的体素个数.
    fn cube_side(&self, mm: f64) -> usize {
        (2.0 * self.radius / mm).round() as usize + 1
    }

    /// 生成标注.
    pub fn mask(&self) -> Array3<u8> {
        let shape = self.shape();
        let (z, h, w) = shape;
        let center = self.spacing.physical((z / 2, h / 2, w / 2));
        let r = self.radius;
        match self.kind {
            Kind::Sphere => phantom::sphere(shape, r, self.spacing),
            Kind::Ellipsoid => phantom::ellipsoid(shape, center, [r, r, 1.5 * r], self.spacing),
            Kind::Cube => {
                let n = [
                    self.cube_side(self.spacing.z_mm()),
                    self.cube_side(self.spacing.height_mm()),
                    self.cube_side(self.spacing.width_mm()),
                ];
                phantom::cuboid(shape, (1, 1, 1), (1 + n[0], 1 + n[1], 1 + n[2]))
            }
        }
    }

    /// 理想形状的解析体积 (立方毫米).
    ///
    /// 立方体以体素中心围成的长方体为准, 与凸包体积应完全一致.
    pub fn analytic_volume(&self) -> f64 {
        let r = self.radius;
        match self.kind {
            Kind::Sphere => 4.0 / 3.0 * PI * r.powi(3),
            Kind::Ellipsoid => 4.0 / 3.0 * PI * r * r * 1.5 * r,
            Kind::Cube => self
                .spacing
                .as_array()
                .iter()
                .map(|mm| (self.cube_side(*mm) - 1) as f64 * mm)
                .product(),
        }
    }

    /// 以固定的 HU 纹理生成样本.
    pub fn sample(&self) -> Result<Sample, InvalidInputError> {
        let mask = self.mask();
        let volume =
            Array3::from_shape_fn(mask.raw_dim(), |(z, h, w)| 40 + ((z + h + w) % 7) as i16);
        Sample::builder(self.to_string())
            .volume(volume)
            .mask(mask)
            .spacing(self.spacing)
            .build()
    }
}

/// 实验中使用的体素分辨率: 各向同性, 常见的薄层与厚层 CT.
pub fn spacings() -> [Spacing; 3] {
    [[1.0, 1.0, 1.0], [2.5, 0.75, 0.75], [5.0, 0.7, 0.7]].map(|s| {
        Spacing::from_array(s).unwrap_or_else(|e| panic!("Invalid spacing {s:?}: {e}"))
    })
}

/// 所有 (形状, 半径, 分辨率) 组合.
pub fn cases(radii: &[f64]) -> Vec<Case> {
    let mut ans = Vec::with_capacity(radii.len() * 9);
    for &radius in radii {
        for kind in [Kind::Sphere, Kind::Ellipsoid, Kind::Cube] {
            for spacing in spacings() {
                ans.push(Case {
                    kind,
                    radius,
                    spacing,
                });
            }
        }
    }
    ans
}
