//! URL handling: normalization, domain membership, and admission filtering
//!
//! Normalization produces the canonical dedup key for crawl sessions;
//! [`should_crawl`] is the admission rule set deciding whether a discovered
//! URL is eligible to be fetched.

mod admission;
mod domain;
mod normalize;

pub use admission::{matches_path_pattern, should_crawl, AdmissionRules};
pub use domain::same_domain;
pub use normalize::{normalize_url, NormalizedUrl};
