//! HTTP protocol layer module
//!
//! Protocol helpers shared by the static file server and the caching layer
//! on top of it.

pub mod cache;
pub mod mime;
pub mod range;
pub mod response;

pub use cache::CachePolicy;
pub use range::{parse_range_header, ByteRange, RangeParseResult};
pub use response::{
    build_400_response, build_403_response, build_404_response, build_405_response,
    build_500_response, build_options_response,
};
