//! Map frame: descriptor, pixel ⇄ metric transform, and load state.
//!
//! Pixel space is image-relative with y growing downward; map space is
//! metric with y growing upward. A [`MapFrame`] is built once per loaded
//! descriptor and is read-only afterward.

mod descriptor;
mod load;
mod transform;

pub use descriptor::MapDescriptor;
pub use load::MapLoadState;
pub use transform::{MapFrame, RenderSize, heading_to_screen_rotation};
