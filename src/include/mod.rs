//! Include resolution module

pub mod path;
pub mod resolver;

pub use path::{parse_include_path, IncludePath};
pub use resolver::{Flattened, IncludeIssue, IncludeResolver};
