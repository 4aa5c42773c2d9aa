//! HTTP middleware.

pub mod auth;

pub use auth::{AuthRequester, COMPANY_ID_HEADER, USER_ID_HEADER, auth_middleware};
