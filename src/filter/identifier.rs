use uuid::{Uuid, Variant};

use super::types::{Condition, FilterValue};

/// How a path identifier is looked up: by surrogate key or by slug.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Lookup {
    Id(Uuid),
    Slug(String),
}

impl Lookup {
    /// Canonical hyphenated v4 UUIDs (either case) resolve to the primary key;
    /// everything else, including other UUID versions and non-hyphenated forms,
    /// is a slug. The identifier is used byte-for-byte.
    pub fn resolve(identifier: &str) -> Self {
        match parse_v4(identifier) {
            Some(id) => Lookup::Id(id),
            None => Lookup::Slug(identifier.to_string()),
        }
    }

    pub fn condition(&self) -> Condition {
        match self {
            Lookup::Id(id) => Condition::column_eq("id", FilterValue::Uuid(*id)),
            Lookup::Slug(slug) => Condition::column_eq("slug", FilterValue::Text(slug.clone())),
        }
    }
}

fn parse_v4(s: &str) -> Option<Uuid> {
    let bytes = s.as_bytes();
    if bytes.len() != 36 {
        return None;
    }
    for (i, b) in bytes.iter().enumerate() {
        let is_hyphen_slot = matches!(i, 8 | 13 | 18 | 23);
        if is_hyphen_slot != (*b == b'-') {
            return None;
        }
        if !is_hyphen_slot && !b.is_ascii_hexdigit() {
            return None;
        }
    }
    let id = Uuid::parse_str(s).ok()?;
    (id.get_version_num() == 4 && id.get_variant() == Variant::RFC4122).then_some(id)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::types::{FieldRef, FilterOp};

    #[test]
    fn v4_uuid_resolves_to_primary_key() {
        let id = Uuid::new_v4();
        assert_eq!(Lookup::resolve(&id.to_string()), Lookup::Id(id));
        assert_eq!(Lookup::resolve(&id.to_string().to_uppercase()), Lookup::Id(id));
    }

    #[test]
    fn slugs_never_fall_back_to_key_lookup() {
        assert_eq!(Lookup::resolve("base-set"), Lookup::Slug("base-set".to_string()));
        assert_eq!(Lookup::resolve(" base-set"), Lookup::Slug(" base-set".to_string()));
    }

    #[test]
    fn non_canonical_uuid_forms_are_slugs() {
        let id = Uuid::new_v4();
        let simple = id.simple().to_string();
        assert_eq!(Lookup::resolve(&simple), Lookup::Slug(simple.clone()));
        let braced = id.braced().to_string();
        assert_eq!(Lookup::resolve(&braced), Lookup::Slug(braced.clone()));
    }

    #[test]
    fn other_uuid_versions_are_slugs() {
        // version 1 time-based uuid
        let v1 = "c232ab00-9414-11ec-b3c8-9f6bdeced846";
        assert_eq!(Lookup::resolve(v1), Lookup::Slug(v1.to_string()));
        // nil uuid
        let nil = Uuid::nil().to_string();
        assert_eq!(Lookup::resolve(&nil), Lookup::Slug(nil.clone()));
    }

    #[test]
    fn builds_equality_conditions() {
        let id = Uuid::new_v4();
        let by_id = Lookup::Id(id).condition();
        assert_eq!(by_id.field, FieldRef::Column("id"));
        assert_eq!(by_id.op, FilterOp::Eq);
        assert_eq!(by_id.value, FilterValue::Uuid(id));

        let by_slug = Lookup::resolve("charizard").condition();
        assert_eq!(by_slug.field, FieldRef::Column("slug"));
        assert_eq!(by_slug.value, FilterValue::Text("charizard".to_string()));
    }
}
