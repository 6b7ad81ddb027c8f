//! Map load lifecycle.

use log::{info, warn};

use crate::error::{DrishtiError, Result};

use super::descriptor::MapDescriptor;
use super::transform::MapFrame;

/// Where the map view is in fetching its descriptor and image.
///
/// A [`MapFrame`] can only be obtained in the `Ready` state; every other
/// state fails closed.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum MapLoadState {
    /// Descriptor not fetched yet
    #[default]
    Loading,
    /// Descriptor validated (and image checked when one was supplied)
    Ready(MapFrame),
    /// Fetch, decode, or validation failed
    Failed(String),
}

impl MapLoadState {
    /// State after a descriptor fetch completes.
    pub fn from_descriptor(fetched: Result<MapDescriptor>) -> Self {
        match fetched.and_then(MapFrame::new) {
            Ok(frame) => {
                let d = frame.descriptor();
                info!(
                    "Map ready: {}x{} px @ {} m/px, origin ({:.3}, {:.3})",
                    d.width, d.height, d.resolution, d.origin_x, d.origin_y
                );
                Self::Ready(frame)
            }
            Err(e) => {
                warn!("Map descriptor unavailable: {}", e);
                Self::Failed(e.to_string())
            }
        }
    }

    /// Check the decoded image against the descriptor.
    ///
    /// A mismatch moves `Ready` to `Failed`. Other states are unchanged.
    pub fn verify_image(&mut self, width: u32, height: u32) {
        if let Self::Ready(frame) = self {
            if let Err(e) = frame.verify_image_dimensions(width, height) {
                warn!("Map image rejected: {}", e);
                *self = Self::Failed(e.to_string());
            }
        }
    }

    /// The transform, or an error if the map is not usable.
    pub fn frame(&self) -> Result<&MapFrame> {
        match self {
            Self::Ready(frame) => Ok(frame),
            Self::Loading => Err(DrishtiError::MapUnavailable("still loading".to_string())),
            Self::Failed(reason) => Err(DrishtiError::MapUnavailable(reason.clone())),
        }
    }

    #[inline]
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready(_))
    }
}
