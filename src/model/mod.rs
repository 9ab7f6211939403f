pub mod node;
pub mod plan;
pub mod config;
pub mod workspace;

pub use node::*;
pub use plan::*;
pub use config::*;
pub use workspace::*;
