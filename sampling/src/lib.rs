pub mod distributions;
pub mod source;

pub use distributions::Distribution;
pub use source::{new_seed, Source};
