mod format;
mod label;
mod parse;
mod scope;
mod types;

pub use format::*;
pub use label::*;
pub use parse::*;
pub use scope::*;
pub use types::*;
