//! 消融实验依赖的通用组件.

use radio_berry::CtWindow;
use std::env;

const SEP: &str = "--------------------------------------------------------";

/// 体模半径列表的环境变量名.
pub const PHANTOM_RADII_ENV: &str = "RADIO_BERRY_PHANTOM_RADII";

/// 默认体模半径 (毫米).
pub const DEFAULT_PHANTOM_RADII: [f64; 4] = [3.0, 5.0, 8.0, 12.0];

/// 简单分隔线.
#[inline]
pub fn sep() {
    println!("{SEP}");
}

/// 简单分隔线.
#[inline]
pub fn sep_to<W: std::io::Write>(mut w: W) -> std::io::Result<()> {
    writeln!(&mut w, "{SEP}")
}

/// 获得可并行核心数.
pub fn cpus() -> usize {
    std::thread::available_parallelism().map_or_else(|_| num_cpus::get(), usize::from)
}

/// 创建一般情况下合适的、用于可视化腹部 CT 软组织的窗口.
/// 该窗口窗位为 40, 窗宽为 400.
#[inline]
pub fn soft_tissue_window() -> CtWindow {
    CtWindow::from_soft_tissue()
}

/// 解析以逗号分隔的正半径列表. 任一项非法时返回 `None`.
pub fn parse_radii(s: &str) -> Option<Vec<f64>> {
    let radii = s
        .split(',')
        .map(|r| r.trim().parse::<f64>().ok().filter(|r| r.is_finite() && *r > 0.0))
        .collect::<Option<Vec<_>>>()?;
    (!radii.is_empty()).then_some(radii)
}

/// 获取体模半径 (毫米).
///
/// 1. 若环境变量 `$RADIO_BERRY_PHANTOM_RADII` 非空且合法, 则返回其值;
/// 2. 否则, 返回 [`DEFAULT_PHANTOM_RADII`].
pub fn radii_from_env_or_default() -> Vec<f64> {
    match env::var(PHANTOM_RADII_ENV) {
        Ok(s) => parse_radii(&s).unwrap_or_else(|| {
            log::warn!("`${PHANTOM_RADII_ENV}` = {s:?} 无法解析, 使用默认半径");
            DEFAULT_PHANTOM_RADII.to_vec()
        }),
        Err(_) => DEFAULT_PHANTOM_RADII.to_vec(),
    }
}
