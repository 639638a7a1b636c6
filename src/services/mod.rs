//! Typed resource services.
//!
//! Each service borrows the [`Client`](crate::Client) and maps one method to
//! one endpoint. Every method takes the call's cancellation token first and
//! its per-call options last.

pub mod docs;
pub mod groups;
pub mod repos;
pub mod search;
pub mod statistics;
pub mod users;

pub use docs::DocService;
pub use groups::GroupService;
pub use repos::RepoService;
pub use search::SearchService;
pub use statistics::StatisticService;
pub use users::UserService;
