mod agent;
mod delete;
mod repo_root;
mod scan;
mod session_names;

pub use agent::*;
pub use delete::*;
pub use repo_root::*;
pub use scan::*;
pub use session_names::*;
