//! 一阶统计特征.
//!
//! 所有统计量都会跳过 NaN. 直方图以实际出现的每个不同 HU 值为一个 bin, 而非固定网格.

use itertools::Itertools;
use ndarray::ArrayView1;

use super::FeatureVector;
use crate::consts::FIRST_ORDER_NAMES;

/// 计算 `n` 阶中心矩 `mean((x - mean(x))^n)`. NaN 会被跳过.
///
/// 1 阶中心矩按约定恒为 0. 若没有有效值, 返回 NaN.
pub fn moment(values: ArrayView1<f64>, n: u32) -> f64 {
    let x: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
    moment_of(&x, n)
}

/// [`moment`] 的无 NaN 版本.
fn moment_of(x: &[f64], n: u32) -> f64 {
    if n == 1 {
        return 0.0;
    }
    let mean = mean_of(x);
    x.iter().map(|v| (v - mean).powi(n as i32)).sum::<f64>() / x.len() as f64
}

#[inline]
fn mean_of(x: &[f64]) -> f64 {
    x.iter().sum::<f64>() / x.len() as f64
}

/// 求升序数组 `sorted` 的 `q` 分位数 (`0 <= q <= 100`),
/// 在相邻两个秩之间线性插值. 数组为空时返回 NaN.
pub fn percentile(sorted: &[f64], q: f64) -> f64 {
    debug_assert!((0.0..=100.0).contains(&q));
    let Some(last) = sorted.len().checked_sub(1) else {
        return f64::NAN;
    };
    let rank = q / 100.0 * last as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    let frac = rank - lo as f64;
    sorted[lo] + (sorted[hi] - sorted[lo]) * frac
}

/// 一阶统计特征, 字段顺序即输出顺序.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct FirstOrder {
    /// 平方和.
    pub energy: f64,

    /// 平方和乘以单个体素体积.
    pub total_energy: f64,

    /// `-sum(p * log2(p + eps))`, 其中 `p` 为每个不同值出现的 **次数** (未归一化).
    pub entropy: f64,

    /// 最小值.
    pub minimum: f64,

    /// 10 分位数.
    pub percentile_10: f64,

    /// 90 分位数.
    pub percentile_90: f64,

    /// 最大值.
    pub maximum: f64,

    /// 均值.
    pub mean: f64,

    /// 中位数.
    pub median: f64,

    /// 四分位距 `P75 - P25`.
    pub interquartile_range: f64,

    /// 极差.
    pub range: f64,

    /// 平均绝对偏差.
    pub mean_absolute_deviation: f64,

    /// 仅在 `[P10, P90]` 内的体素上计算的平均绝对偏差.
    pub robust_mean_absolute_deviation: f64,

    /// 均方根.
    pub root_mean_squared: f64,

    /// 标准差 (总体).
    pub standard_deviation: f64,

    /// 偏度. 零方差时为 NaN.
    pub skewness: f64,

    /// 峰度 (非超额). 零方差时为 0.
    pub kurtosis: f64,

    /// 方差.
    pub variance: f64,

    /// 各不同值出现次数的平方和.
    pub uniformity: f64,
}

impl FirstOrder {
    /// 由 ROI 体素值 `values` 和单个体素体积 `voxel_volume` 计算一阶统计特征.
    ///
    /// NaN 会被跳过. 若没有有效值, 各求和量 (能量, 熵, 均匀度) 为 0, 其余为 NaN.
    pub fn compute(values: ArrayView1<f64>, voxel_volume: f64) -> Self {
        let mut x: Vec<f64> = values.iter().copied().filter(|v| !v.is_nan()).collect();
        x.sort_unstable_by(f64::total_cmp);
        let n = x.len() as f64;

        let energy: f64 = x.iter().map(|v| v * v).sum();

        // 已排序, 相同值必然相邻.
        let counts: Vec<f64> = x
            .iter()
            .dedup_with_count()
            .map(|(c, _)| c as f64)
            .collect();
        let entropy = -counts
            .iter()
            .map(|p| p * (p + f64::EPSILON).log2())
            .sum::<f64>();
        let uniformity = counts.iter().map(|p| p * p).sum();

        let minimum = x.first().copied().unwrap_or(f64::NAN);
        let maximum = x.last().copied().unwrap_or(f64::NAN);
        let p10 = percentile(&x, 10.0);
        let p90 = percentile(&x, 90.0);

        let mean = mean_of(&x);
        let mad = x.iter().map(|v| (v - mean).abs()).sum::<f64>() / n;

        // 严格小于 P10 或严格大于 P90 的体素被排除.
        let robust: Vec<f64> = x.iter().copied().filter(|v| (p10..=p90).contains(v)).collect();
        let robust_mean = mean_of(&robust);
        let robust_mad =
            robust.iter().map(|v| (v - robust_mean).abs()).sum::<f64>() / robust.len() as f64;

        let m2 = moment_of(&x, 2);
        let m3 = moment_of(&x, 3);
        let m4 = moment_of(&x, 4);
        let standard_deviation = m2.sqrt();
        let kurtosis = if m2 == 0.0 { 0.0 } else { m4 / m2.powi(2) };

        Self {
            energy,
            total_energy: energy * voxel_volume,
            entropy,
            minimum,
            percentile_10: p10,
            percentile_90: p90,
            maximum,
            mean,
            median: percentile(&x, 50.0),
            interquartile_range: percentile(&x, 75.0) - percentile(&x, 25.0),
            range: maximum - minimum,
            mean_absolute_deviation: mad,
            robust_mean_absolute_deviation: robust_mad,
            root_mean_squared: (energy / n).sqrt(),
            standard_deviation,
            skewness: m3 / m2.powf(1.5),
            kurtosis,
            variance: standard_deviation.powi(2),
            uniformity,
        }
    }

    /// 按输出顺序排列的特征值.
    pub fn as_array(&self) -> [f64; 19] {
        [
            self.energy,
            self.total_energy,
            self.entropy,
            self.minimum,
            self.percentile_10,
            self.percentile_90,
            self.maximum,
            self.mean,
            self.median,
            self.interquartile_range,
            self.range,
            self.mean_absolute_deviation,
            self.robust_mean_absolute_deviation,
            self.root_mean_squared,
            self.standard_deviation,
            self.skewness,
            self.kurtosis,
            self.variance,
            self.uniformity,
        ]
    }

    /// 转换为带名称的有序特征向量.
    #[inline]
    pub fn to_vector(&self) -> FeatureVector {
        FeatureVector::new(&FIRST_ORDER_NAMES, self.as_array().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::{moment, percentile, FirstOrder};
    use ndarray::{array, Array1};

    fn f64_eq(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-10
    }

    #[test]
    fn test_percentile_interpolation() {
        let x: Vec<f64> = (1..=10).map(f64::from).collect();
        assert!(f64_eq(percentile(&x, 0.0), 1.0));
        assert!(f64_eq(percentile(&x, 10.0), 1.9));
        assert!(f64_eq(percentile(&x, 50.0), 5.5));
        assert!(f64_eq(percentile(&x, 90.0), 9.1));
        assert!(f64_eq(percentile(&x, 100.0), 10.0));
        assert!(f64_eq(percentile(&[3.0], 25.0), 3.0));
        assert!(percentile(&[], 50.0).is_nan());
    }

    #[test]
    fn test_moment() {
        let x = array![1.0, 2.0, 3.0, 4.0];
        assert_eq!(moment(x.view(), 1), 0.0);
        assert!(f64_eq(moment(x.view(), 2), 1.25));
        assert!(f64_eq(moment(x.view(), 3), 0.0));

        let with_nan = array![1.0, f64::NAN, 2.0, 3.0, 4.0];
        assert!(f64_eq(moment(with_nan.view(), 2), 1.25));
    }

    #[test]
    fn test_first_order_ramp() {
        let x: Array1<f64> = (1..=10).map(f64::from).collect();
        let f = FirstOrder::compute(x.view(), 2.0);

        assert!(f64_eq(f.energy, 385.0));
        assert!(f64_eq(f.total_energy, 770.0));
        // 每个值只出现一次, log2(1 + eps) 接近 0.
        assert!(f.entropy.abs() < 1e-12);
        assert!(f64_eq(f.minimum, 1.0));
        assert!(f64_eq(f.percentile_10, 1.9));
        assert!(f64_eq(f.percentile_90, 9.1));
        assert!(f64_eq(f.maximum, 10.0));
        assert!(f64_eq(f.mean, 5.5));
        assert!(f64_eq(f.median, 5.5));
        assert!(f64_eq(f.interquartile_range, 7.75 - 3.25));
        assert!(f64_eq(f.range, 9.0));
        assert!(f64_eq(f.mean_absolute_deviation, 2.5));
        assert!(f64_eq(f.robust_mean_absolute_deviation, 2.0));
        assert!(f64_eq(f.root_mean_squared, 38.5f64.sqrt()));
        assert!(f64_eq(f.variance, 8.25));
        assert!(f64_eq(f.standard_deviation, 8.25f64.sqrt()));
        assert!(f64_eq(f.skewness, 0.0));
        assert!(f64_eq(f.kurtosis, 120.8625 / 8.25f64.powi(2)));
        assert!(f64_eq(f.uniformity, 10.0));
    }

    #[test]
    fn test_first_order_constant() {
        let x = Array1::from_elem(4, 5.0);
        let f = FirstOrder::compute(x.view(), 1.0);
        assert!(f64_eq(f.energy, 100.0));
        // 计数未归一化: -4 * log2(4 + eps).
        assert!(f64_eq(f.entropy, -8.0));
        for v in [f.minimum, f.maximum, f.mean, f.median, f.percentile_10, f.percentile_90] {
            assert!(f64_eq(v, 5.0));
        }
        assert_eq!(f.interquartile_range, 0.0);
        assert_eq!(f.range, 0.0);
        assert_eq!(f.standard_deviation, 0.0);
        assert_eq!(f.variance, 0.0);
        assert_eq!(f.mean_absolute_deviation, 0.0);
        assert!(f.skewness.is_nan());
        assert_eq!(f.kurtosis, 0.0);
        assert!(f64_eq(f.uniformity, 16.0));
        assert!(f64_eq(f.root_mean_squared, 5.0));
    }

    #[test]
    fn test_first_order_single_voxel() {
        let f = FirstOrder::compute(array![-40.0].view(), 1.0);
        assert!(f64_eq(f.entropy, -(1.0 + f64::EPSILON).log2()));
        assert!(f64_eq(f.median, -40.0));
        assert!(f.skewness.is_nan());
        assert_eq!(f.kurtosis, 0.0);
    }

    #[test]
    fn test_first_order_skewed() {
        let f = FirstOrder::compute(array![0.0, 0.0, 0.0, 1.0].view(), 1.0);
        assert!(f64_eq(f.skewness, 2.0 / 3f64.sqrt()));
        // 计数为 3 和 1.
        assert!(f64_eq(f.uniformity, 10.0));
        assert!(f64_eq(
            f.entropy,
            -(3.0 * (3.0 + f64::EPSILON).log2() + (1.0 + f64::EPSILON).log2())
        ));
    }

    #[test]
    fn test_first_order_skips_nan() {
        let a = FirstOrder::compute(array![3.0, -1.0, 7.0, 7.0, 2.0].view(), 0.5);
        let with_nan = array![f64::NAN, 3.0, -1.0, 7.0, f64::NAN, 7.0, 2.0];
        let b = FirstOrder::compute(with_nan.view(), 0.5);
        assert_eq!(a, b);
    }

    #[test]
    fn test_first_order_all_nan() {
        let f = FirstOrder::compute(array![f64::NAN, f64::NAN].view(), 1.0);
        assert_eq!(f.energy, 0.0);
        assert_eq!(f.total_energy, 0.0);
        assert_eq!(f.entropy, 0.0);
        assert_eq!(f.uniformity, 0.0);
        for v in [f.minimum, f.median, f.mean, f.variance, f.skewness, f.kurtosis] {
            assert!(v.is_nan());
        }
    }

    #[test]
    fn test_first_order_order_invariant() {
        let a = FirstOrder::compute(array![3.0, -1.0, 7.0, 7.0, 2.0, 11.0].view(), 1.0);
        let b = FirstOrder::compute(array![11.0, 7.0, 2.0, -1.0, 7.0, 3.0].view(), 1.0);
        assert!(a
            .as_array()
            .iter()
            .zip(b.as_array().iter())
            .all(|(x, y)| f64_eq(*x, *y)));
    }

    #[test]
    fn test_first_order_vector_names() {
        let v = FirstOrder::compute(array![1.0, 2.0].view(), 1.0).to_vector();
        assert_eq!(v.len(), 19);
        assert_eq!(v.names()[0], "Energy");
        assert_eq!(v.names()[18], "Uniformity");
        assert!(f64_eq(v.get("Mean").unwrap(), 1.5));
        assert!(v.get("Nope").is_none());
    }
}
