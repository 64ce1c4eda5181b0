//! Pixel decoding and geometry transforms.

pub mod convert;
pub mod transform;

pub use convert::{DisplayImage, to_display_image};
pub use transform::{rotate90, scale_to_fit};
