//! Live view session lifecycle and cancellation.

mod cancel;
mod live_view;

pub use cancel::CancelToken;
pub use live_view::{LiveView, LiveViewSettings, SessionStats};
