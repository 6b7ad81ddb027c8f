//! Console-wide state passed explicitly to consumers.

mod context;

pub use context::{ConsoleContext, ContextStore};
