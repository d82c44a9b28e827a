//! External business-data providers for AlphaLeads.
//!
//! Each provider implements [`SourceAdapter`] and turns normalized search
//! criteria into [`alphaleads_core::Lead`] records. Adapters never fail a
//! search: disabled or erroring providers contribute no leads.

pub mod adapter;
pub mod cache;
pub mod error;
pub(crate) mod http;
pub mod osm;
pub(crate) mod retry;
pub mod sec;
pub mod website_phone;
pub mod yelp;

pub use adapter::{build_source_adapters, SourceAdapter, SourceSettings};
pub use cache::TtlCache;
pub use error::SourceError;
pub use osm::OsmAdapter;
pub use sec::SecEdgarAdapter;
pub use website_phone::WebsitePhoneFinder;
pub use yelp::YelpAdapter;
