//! 程序运行函数.

use crate::phantoms::{self, Case};
use crate::result::{AblationResult, Measurement};
use radio_berry::data::overlay;
use radio_berry::FeatureExtractor;
use std::env;
use std::path::{Path, PathBuf};
use std::thread;
use std::time::Instant;

/// 叠加图输出目录的环境变量名.
const OVERLAY_DIR_ENV: &str = "RADIO_BERRY_OVERLAY_DIR";

/// 对单个用例计算特征并计时.
fn measure(case: &Case, overlay_dir: Option<&Path>) -> Measurement {
    let sample = match case.sample() {
        Ok(s) => s,
        Err(e) => return Measurement::invalid(e.to_string()),
    };

    if let Some(dir) = overlay_dir {
        let z = sample.shape().0 / 2;
        let path = dir.join(format!(
            "{}-r{}-dz{}-{z}.png",
            case.kind,
            case.radius,
            case.spacing.z_mm()
        ));
        match overlay::save_overlay(
            sample.volume(),
            sample.mask(),
            z,
            utils::soft_tissue_window(),
            &path,
        ) {
            Ok(true) => log::debug!("saved overlay to {}", path.display()),
            Ok(false) => log::warn!("slice {z} out of range for {case}"),
            Err(e) => log::warn!("failed to save overlay {}: {e}", path.display()),
        }
    }

    let start = Instant::now();
    let features = <FeatureExtractor>::default().extract(&sample);
    let elapsed = start.elapsed();

    match features {
        Ok(f) => Measurement::new(case, &f, elapsed),
        Err(e) => Measurement::invalid(e.to_string()),
    }
}

/// 实际运行.
pub fn run() -> AblationResult {
    let radii = utils::radii_from_env_or_default();
    let cases = phantoms::cases(&radii);
    let overlay_dir = env::var(OVERLAY_DIR_ENV).ok().map(PathBuf::from);
    if let Some(dir) = overlay_dir.as_deref() {
        assert!(dir.is_dir(), "`${OVERLAY_DIR_ENV}` is not a directory");
    }

    let workers = utils::cpus().max(1);
    log::info!(
        "Running {} phantoms (radii {radii:?}) on {workers} threads...",
        cases.len()
    );

    // 样本间相互独立, 每批最多 `workers` 个线程.
    let mut data = Vec::with_capacity(cases.len());
    for chunk in cases.chunks(workers) {
        let measured = thread::scope(|s| {
            let overlay_dir = overlay_dir.as_deref();
            let handles: Vec<_> = chunk
                .iter()
                .map(|case| s.spawn(move || measure(case, overlay_dir)))
                .collect();
            handles
                .into_iter()
                .map(|th| th.join().expect("Thread joining error"))
                .collect::<Vec<_>>()
        });
        data.extend(chunk.iter().copied().zip(measured));
    }
    AblationResult::from_iter(data)
}
