//! 在合成体模上运行特征计算, 对比凸包体积, 体素计数体积与解析体积.
//!
//! 体模半径由环境变量 `$RADIO_BERRY_PHANTOM_RADII` 指定 (逗号分隔, 毫米),
//! 若设置了 `$RADIO_BERRY_OVERLAY_DIR`, 还会保存每个体模中间切片的叠加图.

mod phantoms;
mod result;
mod runner;

fn main() {
    if let Err(e) = simple_logger::init_with_level(log::Level::Info) {
        eprintln!("Logger initialization error: {e}");
    }
    runner::run().analyze();
}
