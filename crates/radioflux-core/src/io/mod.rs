pub mod fits;
pub mod header;

pub use fits::FitsImage;
pub use header::{Card, FitsHeader, HeaderValue};
