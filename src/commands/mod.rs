//! CLI commands implementation

pub mod scan;
pub mod setup;
pub mod status;
pub mod sync;

pub use scan::*;
pub use setup::*;
pub use status::*;
pub use sync::*;
