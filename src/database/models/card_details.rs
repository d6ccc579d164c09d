//! Typed shape of the `cards.details` JSONB document.
//!
//! Storage treats the column as an opaque document; writes go through these
//! types so every stored card carries a known `card_type` and a set position.

use serde::{Deserialize, Deserializer, Serialize};
use std::collections::HashMap;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CardDetails {
    #[serde(flatten)]
    pub kind: CardKind,

    #[serde(default)]
    pub sub_types: Vec<String>,

    #[serde(alias = "set_info")]
    pub set_position: SetPosition,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub illustrator: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub flavor_text: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image_url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub github_image_url: Option<String>,
}

/// Category-specific attributes, discriminated by `card_type`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "card_type", rename_all = "snake_case")]
pub enum CardKind {
    Pokemon(CreatureDetails),
    Trainer(TrainerDetails),
    Energy(EnergyDetails),
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct CreatureDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub hp: Option<NumberOrText>,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub energy_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stage: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolves_from: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub evolves_into: Option<String>,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub attacks: Vec<Attack>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub weakness: Option<TypeModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resistance: Option<TypeModifier>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub retreat_cost: Option<NumberOrText>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TrainerDetails {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_text: Option<String>,
    #[serde(default)]
    pub special_rules: Vec<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct EnergyDetails {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub energy_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rules_text: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum AbilityKind {
    Ability,
    PokePower,
    PokeBody,
    VstarPower,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ability {
    #[serde(rename = "type")]
    pub kind: AbilityKind,
    pub name: String,
    pub description: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EnergyCost {
    #[serde(rename = "type")]
    pub energy_type: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Attack {
    #[serde(default)]
    pub cost: Vec<EnergyCost>,
    pub name: String,
    #[serde(default)]
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<NumberOrText>,
    #[serde(rename = "isGXAttack", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_gx_attack: bool,
    #[serde(rename = "isVSTARAttack", default, skip_serializing_if = "std::ops::Not::not")]
    pub is_vstar_attack: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TypeModifier {
    #[serde(rename = "type")]
    pub energy_type: String,
    pub modifier: String,
}

/// Where a card sits in its set. `number` is part of the card's natural key
/// and is always stored as text, e.g. `"4"` or `"4/102"`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SetPosition {
    #[serde(deserialize_with = "string_or_number")]
    pub number: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rarity: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none", deserialize_with = "optional_string_or_number")]
    pub total_cards: Option<String>,
}

/// Attribute that may arrive as a JSON number or as text, kept as given.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum NumberOrText {
    Number(serde_json::Number),
    Text(String),
}

impl NumberOrText {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            NumberOrText::Number(n) => n.as_f64(),
            NumberOrText::Text(s) => s.trim().parse().ok(),
        }
    }
}

impl CardDetails {
    /// Field-level problems that deserialization alone does not catch.
    pub fn validate(&self) -> HashMap<String, String> {
        let mut errors = HashMap::new();
        if self.set_position.number.trim().is_empty() {
            errors.insert("details.set_position.number".to_string(), "This field is required".to_string());
        }
        if let CardKind::Pokemon(creature) = &self.kind {
            if let Some(hp) = &creature.hp {
                match hp.as_f64() {
                    Some(v) if v >= 0.0 => {}
                    _ => {
                        errors.insert("details.hp".to_string(), "Must be a non-negative number".to_string());
                    }
                }
            }
        }
        errors
    }
}

fn string_or_number<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    match NumberOrText::deserialize(deserializer)? {
        NumberOrText::Number(n) => Ok(n.to_string()),
        NumberOrText::Text(s) => Ok(s),
    }
}

fn optional_string_or_number<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<NumberOrText>::deserialize(deserializer)?.map(|v| match v {
        NumberOrText::Number(n) => n.to_string(),
        NumberOrText::Text(s) => s,
    }))
}
