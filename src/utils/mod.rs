//! Supporting utilities: image loading, region cropping, and the debug
//! overlay renderer.

pub mod crop;
pub mod image;
pub mod visualization;

pub use crop::crop_region;
pub use self::image::{dynamic_to_rgb, load_image};
pub use visualization::draw_region_overlay;
