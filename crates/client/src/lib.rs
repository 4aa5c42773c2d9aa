//! HTTP client for an editor running away from the database.
//!
//! [`RemoteGateway`] implements the commit, reconciliation and lookup seams
//! of `storebooks-core` against the Storebooks API. Requests are never
//! retried; a transport failure surfaces for the user to retry manually.

mod remote;

pub use remote::{ClientError, RemoteGateway};
