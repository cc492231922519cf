pub mod dict;

pub use dict::Dict;
