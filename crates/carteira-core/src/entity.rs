//! # Entity Contract
//!
//! The [`Entity`] trait lets one generic service handle both records. An
//! implementor names its companion shapes (input, patch, filter) and says
//! how they combine with a stored record.

use std::fmt;

use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::validate::Validate;

/// Payloads that may carry an identifier the caller claims to address.
///
/// The identifier is only used for consistency checks; stored ids are
/// always assigned by the persistence layer.
pub trait Identified {
    /// The `id` field of the payload, if one was sent.
    fn claimed_id(&self) -> Option<i32>;
}

/// An equality template over an entity's fields.
pub trait Filter {
    /// Whether the template specifies no field at all.
    fn is_empty(&self) -> bool;
}

/// A record managed by the CRUD service.
pub trait Entity:
    Clone + fmt::Debug + PartialEq + Serialize + DeserializeOwned + Send + Sync + 'static
{
    /// Create and full-replace body.
    type Input: Validate + Identified + fmt::Debug + DeserializeOwned + Send + 'static;
    /// Partial update body.
    type Patch: Validate + Identified + fmt::Debug + DeserializeOwned + Send + 'static;
    /// Equality template for read and delete-by-template.
    type Filter: Filter + fmt::Debug + Default + DeserializeOwned + Send + Sync + 'static;

    /// Singular name, used as the XML root element and in messages.
    const NAME: &'static str;
    /// Plural name, used as the XML root element of collections.
    const COLLECTION: &'static str;

    /// The assigned identifier.
    fn id(&self) -> i32;

    /// Build a record from a validated input and an assigned id.
    ///
    /// Any `id` inside the input is ignored.
    fn from_input(id: i32, input: Self::Input) -> Self;

    /// Overwrite the fields present in `patch`, leaving the rest untouched.
    fn apply_patch(&mut self, patch: Self::Patch);

    /// Whether this record equals the template on every field it specifies.
    fn matches(&self, filter: &Self::Filter) -> bool;
}

/// `true` when the template leaves the field open or the values are equal.
pub(crate) fn field_matches<T: PartialEq + ?Sized>(wanted: Option<&T>, actual: &T) -> bool {
    wanted.map_or(true, |w| w == actual)
}

/// Like [`field_matches`] for optional record fields: a specified template
/// value never matches an absent record value.
pub(crate) fn optional_field_matches<T: PartialEq + ?Sized>(
    wanted: Option<&T>,
    actual: Option<&T>,
) -> bool {
    match wanted {
        None => true,
        Some(w) => actual == Some(w),
    }
}
