//! External catalog access for Marquee.
//!
//! This crate turns partial, possibly noisy knowledge about a media file into
//! a normalized [`CatalogRecord`](marquee_core::CatalogRecord):
//!
//! - [`CatalogApi`]: the narrow catalog capability (find by cross-reference,
//!   fetch record, search, fetch image bytes), every call returning a
//!   [`CallOutcome`](marquee_core::CallOutcome)
//! - [`TmdbClient`]: HTTP implementation against a TMDB-compatible v3 API,
//!   paced with a rate limiter and retried with jittered backoff
//! - [`normalize`]: maps raw movie or series payloads onto a record
//! - [`CatalogResolver`]: ordered lookup strategies, first success wins
//!
//! # Example
//!
//! ```rust,no_run
//! use marquee_catalog::{CatalogConfig, CatalogContext, CatalogResolver, TmdbClient};
//! use marquee_core::WorkItem;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CatalogConfig::default().with_api_key(Some("secret".to_string()));
//! let client = TmdbClient::new(&config)?;
//! let ctx = CatalogContext::from_config(&config).expect("credential configured");
//!
//! let resolver = CatalogResolver::new(Arc::new(client), ctx);
//! let item = WorkItem::new("a1b2", "/media/Sintel.2010.mkv");
//! if let Some(resolution) = resolver.resolve(&item).await {
//!     println!("{}", resolution.record.display_title());
//! }
//! # Ok(())
//! # }
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]

mod api;
mod auth;
mod client;
mod config;
mod locale;
mod normalize;
mod resolver;
mod title;

pub use api::{CatalogApi, CatalogContext, SearchHit};
pub use auth::CatalogAuth;
pub use client::TmdbClient;
pub use config::{CatalogConfig, CatalogConfigBuilder};
pub use locale::Locale;
pub use marquee_error::{CatalogError, CatalogErrorKind};
pub use normalize::{infer_media_kind, normalize};
pub use resolver::{CatalogResolver, Resolution, ResolutionStrategy};
pub use title::{search_title, strip_trailing_year};
