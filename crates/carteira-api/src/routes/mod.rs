//! # API Route Modules
//!
//! - `pessoa`: person records at `/api/pessoa`.
//! - `investimento`: investment records at `/api/investimento`.
//!
//! Both mount the same eight operations, wrapped in
//! [`crate::middleware::operation_log`].

pub mod investimento;
pub mod pessoa;
