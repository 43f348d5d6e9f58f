#![warn(missing_docs)] // <= 合适时移除它.
// #![warn(clippy::missing_docs_in_private_items)]  // <= too strict.

//! 核心库. 由 CT 扫描 (HU) 与肿瘤二值标注计算影像组学特征:
//! 19 个一阶统计特征与 13 个三维形状特征.
//!
//! 该 crate 目前仅提供 `safe` 接口.
//!
//! # 注意
//!
//! 1. 数据一律以 `(z, h, w)` 组织, 体素分辨率以毫米为单位. 读取 NIfTI 文件时会自动转置.
//! 2. 非法输入 (形状不一致, 标注非二值, ROI 为空等) 以 `Err` 返回, 不会 panic.
//! 3. 数值上无定义的特征 (如零方差 ROI 的偏度) 以 NaN 给出, 而不是 `Err`.
//!
//! # 开发计划
//!
//! ### ROI 提取 ✅
//!
//! 行优先展平 ROI 体素, 并截取含肿瘤的切片. 提供 `rayon` 并行版本.
//!
//! 实现位于 `radio-berry/src/roi.rs`.
//!
//! ### 一阶统计特征 ✅
//!
//! 分位数 (线性插值), 中心矩, 熵与均匀度等.
//!
//! 实现位于 `radio-berry/src/features/first_order.rs`.
//!
//! ### 三维凸包与对称矩阵特征值的纯 Rust 实现 ✅
//!
//! 凸包基于精确整数判定, 结果与点的顺序无关. 特征值默认使用 `nalgebra`,
//! 开启 `lapack` feature 后可使用 `ndarray-linalg`.
//!
//! 实现位于 `radio-berry/src/geometry`.
//!
//! ### 三维形状特征 ✅
//!
//! 实现位于 `radio-berry/src/features/shape.rs`.
//!
//! ### 二维投影直径 ❌
//!
//! 按切片 / 行 / 列平面计算的最大直径不在计划内.
//!
//! ### CT window 视图与标注叠加图 ✅
//!
//! 提供一个独立的 CT 窗口对象, 以便将 CT HU 值转换为 8-bit 灰度值,
//! 并将标注以半透明红色叠加在切片上.
//!
//! 实现位于 `radio-berry/src/data/window.rs` 与 `radio-berry/src/data/overlay.rs`.
//!
//! ### 合成体模 ✅
//!
//! 球体, 椭球体, 长方体标注. 用于验证形状特征.
//!
//! 实现位于 `radio-berry/src/phantom.rs`.

#[cfg(all(feature = "lapack", target_os = "macos", target_arch = "aarch64"))]
extern crate blas_src;

/// 三维索引, 同时也可一定程度上用作非负整数向量.
pub type Idx3d = (usize, usize, usize);

pub mod consts;

/// 样本数据结构与文件读写.
pub mod data;

pub mod error;
pub mod features;
pub mod geometry;
pub mod phantom;
pub mod prelude;
pub mod roi;

pub use data::{binarize, CtWindow, Sample, SampleBuilder, Spacing};
pub use error::{GeometryError, InvalidInputError, SourceError};
pub use features::{FeatureExtractor, FeatureVector, FirstOrder, SampleFeatures, ShapeFeatures};
