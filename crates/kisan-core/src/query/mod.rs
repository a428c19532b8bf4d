//! Query domain module.
//!
//! # Module Structure
//!
//! - `model`: request, image and location types
//! - `response`: fetcher response payload
//! - `fetcher`: the `ResponseFetcher` strategy trait

mod fetcher;
mod model;
mod response;

pub use fetcher::ResponseFetcher;
pub use model::{GeoLocation, ImageAttachment, QueryContextSnapshot, QueryRequest};
pub use response::{APOLOGY_MESSAGE, FetchResponse};
