//! Asset path matching module

pub mod fileset;
pub mod strategies;

pub use fileset::FileSet;
pub use strategies::strip_scheme;
