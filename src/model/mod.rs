pub mod task;
pub mod project;
pub mod priority;
pub mod mutation;
pub mod view;
pub mod config;

pub use task::*;
pub use project::*;
pub use priority::*;
pub use mutation::*;
pub use view::*;
pub use config::*;
