//! 实验结果.

use crate::phantoms::Case;
use radio_berry::SampleFeatures;
use std::io::{self, Write};
use std::time::Duration;

/// 单个体模的测量结果.
pub struct Measurement {
    /// 输入非法时的错误信息.
    invalid: Option<String>,

    /// 形状特征缺失时的原因.
    withheld: Option<String>,

    analytic_volume: f64,
    hull_volume: Option<f64>,
    voxel_volume: Option<f64>,
    sphericity: Option<f64>,
    elongation: Option<f64>,
    flatness: Option<f64>,
    mean_hu: Option<f64>,
    time_us: u64,
}

impl Measurement {
    /// 由一次成功的特征计算生成.
    pub fn new(case: &Case, f: &SampleFeatures, elapsed: Duration) -> Self {
        let shape = f.shape.as_ref().ok();
        Self {
            invalid: None,
            withheld: f.shape.as_ref().err().map(|e| e.to_string()),
            analytic_volume: case.analytic_volume(),
            hull_volume: shape.map(|s| s.volume),
            voxel_volume: shape.map(|s| s.voxel_volume),
            sphericity: shape.map(|s| s.sphericity),
            elongation: shape.map(|s| s.elongation),
            flatness: shape.map(|s| s.flatness),
            mean_hu: Some(f.first_order.mean),
            time_us: elapsed.as_micros() as u64,
        }
    }

    /// 输入非法, 没有任何特征.
    pub fn invalid(reason: String) -> Self {
        Self {
            invalid: Some(reason),
            withheld: None,
            analytic_volume: f64::NAN,
            hull_volume: None,
            voxel_volume: None,
            sphericity: None,
            elongation: None,
            flatness: None,
            mean_hu: None,
            time_us: 0,
        }
    }

    /// 凸包体积与解析体积之比.
    pub fn hull_ratio(&self) -> Option<f64> {
        self.hull_volume.map(|v| v / self.analytic_volume)
    }
}

#[inline]
fn f64_to_display(f: Option<f64>) -> String {
    match f {
        Some(f) => format!("{f:.6}"),
        None => "/".to_string(),
    }
}

/// 将 `m` 的结果写进 `w` 中.
fn describe_into<W: Write>(case: &Case, m: &Measurement, w: &mut W) -> io::Result<()> {
    const S4: &str = "    ";

    writeln!(w, "Phantom `{case}`:")?;
    if let Some(reason) = &m.invalid {
        return write!(w, "{S4}Invalid input: {reason}");
    }
    if let Some(reason) = &m.withheld {
        writeln!(w, "{S4}Shape features withheld: {reason}")?;
    }
    writeln!(w, "{S4}Analytic volume: {:.6} mm^3", m.analytic_volume)?;
    writeln!(w, "{S4}Hull volume: {} mm^3", f64_to_display(m.hull_volume))?;
    writeln!(w, "{S4}Voxel-count volume: {} mm^3", f64_to_display(m.voxel_volume))?;
    writeln!(w, "{S4}Hull / analytic: {}", f64_to_display(m.hull_ratio()))?;
    writeln!(w, "{S4}Sphericity: {}", f64_to_display(m.sphericity))?;
    writeln!(w, "{S4}Elongation: {}", f64_to_display(m.elongation))?;
    writeln!(w, "{S4}Flatness: {}", f64_to_display(m.flatness))?;
    writeln!(w, "{S4}Mean HU: {}", f64_to_display(m.mean_hu))?;
    write!(w, "{S4}Extraction costs {} us", m.time_us)?;
    Ok(())
}

/// 消融实验最终结果.
pub struct AblationResult {
    data: Vec<(Case, Measurement)>,
}

impl AblationResult {
    pub fn from_iter<I: IntoIterator<Item = (Case, Measurement)>>(it: I) -> Self {
        Self {
            data: it.into_iter().collect(),
        }
    }

    /// 分析运行结果.
    pub fn analyze(&self) {
        utils::sep();
        let mut buf = Vec::with_capacity(512);

        for (case, m) in self.data.iter() {
            describe_into(case, m, &mut buf).expect("Writing into memory buffer never fails");
            println!("{}", String::from_utf8_lossy(&buf));
            buf.clear();

            utils::sep();
        }

        let withheld = self.data.iter().filter(|(_, m)| m.withheld.is_some()).count();
        let invalid = self.data.iter().filter(|(_, m)| m.invalid.is_some()).count();
        println!(
            "{} phantoms, {withheld} without shape features, {invalid} invalid",
            self.data.len()
        );
    }
}
