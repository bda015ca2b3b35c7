//! Image-space primitives used by the region detector.
//!
//! This module provides the geometric region type plus the binarization and
//! rectangular-kernel morphology operations the detector composes. Nothing
//! here knows about rows, records, or recognizers.

pub mod binarize;
pub mod geometry;
pub mod morphology;

pub use binarize::{binarize_inverted, blur, estimate_skew_degrees, to_grayscale};
pub use geometry::{Region, sort_reading_order};
pub use morphology::{close_rect, dilate_rect, erode_rect, open_rect, union_masks};
