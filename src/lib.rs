//! # yuque - A client for the Yuque REST API
//!
//! `yuque` is a typed, retry-aware client for the Yuque documentation platform,
//! built on top of `reqwest`. Every endpoint answers with the same JSON
//! envelope; the client unwraps it, turns service-reported failures into
//! structured errors and keeps the raw body around for debugging.
//!
//! ## Quick Start
//!
//! ```no_run
//! use yuque::{Client, Identifier};
//! use yuque::services::docs::ListDocsRequest;
//! use std::time::Duration;
//! use tokio_util::sync::CancellationToken;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), yuque::Error> {
//!     let client = Client::builder()
//!         .token("my-token")
//!         .timeout(Duration::from_secs(30))
//!         .build()?;
//!     let cancel = CancellationToken::new();
//!
//!     let me = client.users().current(&cancel, &[]).await?;
//!     println!("Hello, {}", me.login);
//!
//!     let request = ListDocsRequest {
//!         offset: Some(0),
//!         limit: Some(10),
//!         optional_properties: Some("hits,tags".to_string()),
//!     };
//!     let docs = client
//!         .docs()
//!         .list(&cancel, Identifier::from("my-team/handbook"), &request, &[])
//!         .await?;
//!     for doc in &docs.docs {
//!         println!("{} ({} hits)", doc.title, doc.hits);
//!     }
//!     println!("{} in total", docs.total_count);
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Typed services** - docs, repos, groups, search, statistics and users
//! - **Envelope decoding** - `data` is decoded into your type only after the call is known to have succeeded
//! - **Structured errors** - service failures carry the HTTP status, the envelope code and its message
//! - **Retries** - exponential backoff with jitter on network errors, 429 and most 5xx, honoring `Retry-After`
//! - **Cancellation** - every call takes a `CancellationToken`, checked before each attempt and during waits
//! - **Per-call options** - extra headers, basic auth or a different user agent for a single request
//! - **Logging** - request construction, attempts and retries are traced with `tracing`
//!
//! ## Error Handling
//!
//! ```no_run
//! use yuque::{Client, Error};
//! use tokio_util::sync::CancellationToken;
//!
//! # async fn example() -> Result<(), Error> {
//! # let client = Client::new("my-token")?;
//! let cancel = CancellationToken::new();
//! match client.repos().get(&cancel, "my-team/missing", &[]).await {
//!     Ok(book) => println!("{}", book.name),
//!     Err(Error::Api(api)) => {
//!         eprintln!("Yuque said no (HTTP {}): {}", api.status(), api.info());
//!     }
//!     Err(e @ Error::MaxRetriesExceeded { .. }) => {
//!         eprintln!("Gave up: {}", e);
//!     }
//!     Err(e) => eprintln!("Other error: {}", e),
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Retry Policy
//!
//! ```no_run
//! use yuque::Client;
//! use yuque::retry::RetryPolicy;
//! use std::time::Duration;
//!
//! # fn example() -> Result<(), yuque::Error> {
//! let client = Client::builder()
//!     .token("my-token")
//!     .retry_policy(
//!         RetryPolicy::builder()
//!             .max_retries(5)
//!             .min_delay(Duration::from_millis(200))
//!             .max_delay(Duration::from_secs(10))
//!             .max_elapsed(Duration::from_secs(60))
//!             .build(),
//!     )
//!     .build()?;
//! # Ok(())
//! # }
//! ```

mod client;
mod decode;
mod endpoint;
pub mod envelope;
mod error;
mod options;
pub mod rate_limit;
mod request;
mod response;
pub mod retry;
pub mod services;
mod transport;
pub mod types;

pub use client::{Client, ClientBuilder, AUTH_TOKEN_HEADER, DEFAULT_BASE_URL, DEFAULT_USER_AGENT};
pub use endpoint::Endpoint;
pub use error::{ApiError, Error, Result};
pub use options::{HeaderFn, RequestOption};
pub use response::Response;
pub use retry::RetryPolicy;
pub use transport::{RetryableTransport, TransportBuilder, TransportResponse};
pub use types::Identifier;
