#![deny(missing_docs)]

//! # carteira-core: Domain Types for the Carteira Service
//!
//! Defines the two records the service manages, [`Pessoa`] and
//! [`Investimento`], together with the shapes the HTTP layer accepts for
//! them. The crate knows nothing about HTTP or databases.
//!
//! ## Shapes per entity
//!
//! | Shape | Purpose |
//! |---|---|
//! | `Pessoa` / `Investimento` | stored record, `id` always present |
//! | `*Input` | create and full-replace body, `id` optional |
//! | `*Patch` | partial update, every field optional |
//! | `*Filter` | equality template for read and delete-by-template |
//!
//! The [`Entity`] trait ties the four together so the service layer can be
//! written once for both entities.

pub mod entity;
pub mod error;
pub mod investimento;
pub mod pessoa;
pub mod validate;

pub use entity::{Entity, Filter, Identified};
pub use error::ValidationError;
pub use investimento::{Investimento, InvestimentoFilter, InvestimentoInput, InvestimentoPatch};
pub use pessoa::{Pessoa, PessoaFilter, PessoaInput, PessoaPatch};
pub use validate::Validate;
