//! Terminal dashboard for TRL project evaluations.
//!
//! The ranking and pagination engine ([`ranking`], [`pagination`],
//! [`record::derive_total_score`]) is pure and synchronous. [`client`] talks
//! to the evaluation backend, [`session`] holds the view state, and [`render`]
//! turns it into text.

pub mod api;
pub mod browse;
pub mod client;
pub mod config;
pub mod pagination;
pub mod ranking;
pub mod record;
pub mod render;
pub mod session;

pub use pagination::{paginate, Page, PageSpec};
pub use ranking::{rank, request_sort, SortDirection, SortKey, SortSpec};
pub use record::{derive_total_score, Approval, ProjectRecord};
