//! 体素点集的三维凸包.
//!
//! 凸包在整数体素索引上以精确的 `i64` 方向判定增量构建, 之后再乘以体素分辨率换算到物理空间.
//! 正对角缩放是仿射变换, 不改变凸包的组合结构, 因此两者等价, 且避免了浮点退化问题.

use std::collections::{BTreeMap, HashSet};

use itertools::Itertools;

use super::{ConvexHullProvider, HullMeasure};
use crate::data::Spacing;
use crate::error::GeometryError;
use crate::Idx3d;

/// 整数点 / 向量.
type P = [i64; 3];

/// 每一维索引的上限. 保证方向判定在 `i64` 下不会溢出.
const MAX_INDEX: usize = 1 << 20;

#[inline]
fn sub(a: P, b: P) -> P {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross(a: P, b: P) -> P {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn dot(a: P, b: P) -> i64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// `d` 相对于有向三角形 `(a, b, c)` 的方向. 正值表示 `d` 在法向 `(b - a) x (c - a)` 一侧.
#[inline]
fn orient(a: P, b: P, c: P, d: P) -> i64 {
    dot(cross(sub(b, a), sub(c, a)), sub(d, a))
}

#[inline]
fn sub_f(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

#[inline]
fn cross_f(a: [f64; 3], b: [f64; 3]) -> [f64; 3] {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

#[inline]
fn dot_f(a: [f64; 3], b: [f64; 3]) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

/// 收集每一条 `(z, h)` 行上最左、最右两个点.
///
/// 同一行上的其它点都位于这两点连成的线段上, 不影响凸包 (也不影响点集的仿射维数).
/// 结果按 `(z, h, w)` 字典序排列.
fn lane_extremes(points: &[Idx3d]) -> Result<Vec<P>, GeometryError> {
    let mut lanes: BTreeMap<(usize, usize), (usize, usize)> = BTreeMap::new();
    for &(z, h, w) in points {
        if z >= MAX_INDEX || h >= MAX_INDEX || w >= MAX_INDEX {
            return Err(GeometryError::IndexOverflow((z, h, w)));
        }
        lanes
            .entry((z, h))
            .and_modify(|(lo, hi)| {
                *lo = (*lo).min(w);
                *hi = (*hi).max(w);
            })
            .or_insert((w, w));
    }

    let mut ans = Vec::with_capacity(lanes.len() * 2);
    for ((z, h), (lo, hi)) in lanes {
        ans.push([z as i64, h as i64, lo as i64]);
        if hi != lo {
            ans.push([z as i64, h as i64, hi as i64]);
        }
    }
    Ok(ans)
}

/// 寻找 4 个不共面的点作为初始单纯形, 返回它们在 `points` 中的索引.
///
/// `total` 是原始点数, 仅用于报告错误.
fn initial_simplex(points: &[P], total: usize) -> Result<[usize; 4], GeometryError> {
    let degenerate = |rank| GeometryError::Degenerate {
        points: total,
        rank,
    };
    let p0 = *points.first().ok_or(GeometryError::TooFewPoints(0))?;
    let i1 = points
        .iter()
        .position(|p| *p != p0)
        .ok_or_else(|| degenerate(0))?;
    let d1 = sub(points[i1], p0);
    let i2 = points
        .iter()
        .position(|p| cross(d1, sub(*p, p0)) != [0; 3])
        .ok_or_else(|| degenerate(1))?;
    let i3 = points
        .iter()
        .position(|p| orient(p0, points[i1], points[i2], *p) != 0)
        .ok_or_else(|| degenerate(2))?;
    Ok([0, i1, i2, i3])
}

/// 三角面片. 顶点按从外侧看逆时针排列, 即法向朝外.
#[derive(Debug, Clone, Copy)]
struct Facet {
    v: [usize; 3],
    alive: bool,
}

impl Facet {
    #[inline]
    fn edges(&self) -> [(usize, usize); 3] {
        let [a, b, c] = self.v;
        [(a, b), (b, c), (c, a)]
    }
}

/// 增量凸包.
struct Hull<'a> {
    points: &'a [P],
    facets: Vec<Facet>,
    dead: usize,
}

impl<'a> Hull<'a> {
    /// 以初始单纯形构建凸包.
    fn new(points: &'a [P], [a, b, c, d]: [usize; 4]) -> Self {
        let mut facets = Vec::with_capacity(64);
        for ([x, y, z], opposite) in [([a, b, c], d), ([a, b, d], c), ([a, c, d], b), ([b, c, d], a)] {
            let v = if orient(points[x], points[y], points[z], points[opposite]) > 0 {
                [x, z, y]
            } else {
                [x, y, z]
            };
            facets.push(Facet { v, alive: true });
        }
        Self {
            points,
            facets,
            dead: 0,
        }
    }

    /// 点 `p` 是否严格位于面片 `f` 外侧.
    #[inline]
    fn sees(&self, f: &Facet, p: P) -> bool {
        let [a, b, c] = f.v;
        orient(self.points[a], self.points[b], self.points[c], p) > 0
    }

    /// 将第 `idx` 个点加入凸包. 若该点已在凸包内 (或表面上), 返回 `false`.
    fn insert(&mut self, idx: usize) -> bool {
        let p = self.points[idx];
        let visible: Vec<usize> = self
            .facets
            .iter()
            .enumerate()
            .filter(|(_, f)| f.alive && self.sees(f, p))
            .map(|(i, _)| i)
            .collect();
        if visible.is_empty() {
            return false;
        }

        let edges: HashSet<(usize, usize)> = visible
            .iter()
            .flat_map(|&i| self.facets[i].edges())
            .collect();

        // 按可见面片的顺序收集地平线, 以保证结果可复现.
        let horizon: Vec<(usize, usize)> = visible
            .iter()
            .flat_map(|&i| self.facets[i].edges())
            .filter(|&(a, b)| !edges.contains(&(b, a)))
            .collect();

        for &i in visible.iter() {
            self.facets[i].alive = false;
        }
        self.dead += visible.len();
        self.facets.extend(horizon.into_iter().map(|(a, b)| Facet {
            v: [a, b, idx],
            alive: true,
        }));

        if self.dead * 2 > self.facets.len() {
            self.facets.retain(|f| f.alive);
            self.dead = 0;
        }
        true
    }

    /// 存活的面片.
    fn alive(&self) -> impl Iterator<Item = &Facet> + '_ {
        self.facets.iter().filter(|f| f.alive)
    }

    /// 将凸包换算到物理空间并计算度量.
    fn measure(&self, spacing: Spacing) -> HullMeasure {
        let [sz, sh, sw] = spacing.as_array();
        let phys = |i: usize| {
            let [z, h, w] = self.points[i];
            [z as f64 * sz, h as f64 * sh, w as f64 * sw]
        };

        let vertices: Vec<usize> = self
            .alive()
            .flat_map(|f| f.v)
            .sorted_unstable()
            .dedup()
            .collect();

        // 以某一顶点为原点, 减小浮点误差. 闭曲面的散度公式与原点无关.
        let origin = phys(vertices[0]);
        let (mut area, mut volume, mut facets) = (0.0, 0.0, 0usize);
        for f in self.alive() {
            let [a, b, c] = f.v.map(|i| sub_f(phys(i), origin));
            let n = cross_f(sub_f(b, a), sub_f(c, a));
            area += 0.5 * dot_f(n, n).sqrt();
            volume += dot_f(a, cross_f(b, c)) / 6.0;
            facets += 1;
        }

        let mut min_bound = [0.0; 3];
        let mut max_bound = [0.0; 3];
        for k in 0..3 {
            if let Some((lo, hi)) = vertices.iter().map(|&i| phys(i)[k]).minmax().into_option() {
                (min_bound[k], max_bound[k]) = (lo, hi);
            }
        }

        HullMeasure {
            area,
            volume,
            min_bound,
            max_bound,
            vertices: vertices.len(),
            facets,
        }
    }
}

/// 基于精确整数判定的增量凸包. 默认的凸包后端.
///
/// 时间复杂度为 `O(n * f)`, `n` 为每行首尾体素个数, `f` 为凸包面片数.
#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalHull;

impl ConvexHullProvider for IncrementalHull {
    fn convex_hull(&self, points: &[Idx3d], spacing: Spacing) -> Result<HullMeasure, GeometryError> {
        if points.len() < 4 {
            return Err(GeometryError::TooFewPoints(points.len()));
        }
        let candidates = lane_extremes(points)?;
        let simplex = initial_simplex(&candidates, points.len())?;

        let mut hull = Hull::new(&candidates, simplex);
        let mut inserted = 0usize;
        for i in (0..candidates.len()).filter(|i| !simplex.contains(i)) {
            if hull.insert(i) {
                inserted += 1;
            }
        }

        let m = hull.measure(spacing);
        log::trace!(
            "hull: {} candidates, {} inserted, {} vertices, {} facets",
            candidates.len(),
            inserted,
            m.vertices,
            m.facets
        );
        Ok(m)
    }
}
