//! 🍇欢迎光临🍓
//!
//! 涵盖了本 crate 一系列常用的功能.

pub use crate::Idx3d;

pub use crate::data::overlay::{render_overlay, save_overlay};
pub use crate::data::{binarize, CtWindow, Sample, SampleBuilder, Spacing};

pub use crate::error::{GeometryError, InvalidInputError, SourceError};

pub use crate::features::{
    FeatureExtractor, FeatureVector, FirstOrder, SampleFeatures, ShapeExtractor, ShapeFeatures,
};
pub use crate::geometry::{ConvexHullProvider, EigenSolver, IncrementalHull, SymmetricEigenSolver};

#[cfg(feature = "lapack")]
pub use crate::geometry::LapackEigenSolver;

pub use crate::consts::{FIRST_ORDER_NAMES, SHAPE_NAMES};
pub use crate::roi::{extract_roi, Roi};

#[cfg(feature = "rayon")]
pub use crate::roi::par_extract_roi;
