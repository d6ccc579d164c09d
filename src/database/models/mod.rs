pub mod api_key;
pub mod card;
pub mod card_details;
pub mod card_set;
pub mod era;
pub mod tcg;

use std::collections::HashMap;

use serde::Serialize;
use sqlx::{postgres::PgRow, FromRow};
use uuid::{Uuid, Variant};

pub use api_key::ApiKey;
pub use card::{AffiliateLink, Card, NaturalKey, NewCard};
pub use card_details::CardDetails;
pub use card_set::{CardSet, NewSet, SetWithCards};
pub use era::{Era, EraWithSets, NewEra};
pub use tcg::{NewTcg, Tcg};

/// A catalog table readable through [`crate::database::Repository`].
pub trait Entity: for<'r> FromRow<'r, PgRow> + Send + Unpin + Serialize {
    const TABLE: &'static str;
    const DOCUMENT_COLUMN: Option<&'static str> = None;
}

/// Field name -> problem, reported back to clients on invalid writes.
pub type FieldErrors = HashMap<String, String>;

pub(crate) fn require_text(errors: &mut FieldErrors, field: &str, value: &str) {
    if value.trim().is_empty() {
        errors.insert(field.to_string(), "This field is required".to_string());
    }
}

/// Client-chosen ids must be canonical v4 so they resolve as ids on lookup.
pub(crate) fn require_v4_id(errors: &mut FieldErrors, id: Option<Uuid>) {
    if let Some(id) = id {
        if id.get_version_num() != 4 || id.get_variant() != Variant::RFC4122 {
            errors.insert("id".to_string(), "Must be a version 4 UUID".to_string());
        }
    }
}
