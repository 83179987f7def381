//! Character catalog data and the materialized combatant record.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::DomainError;
use crate::ids::{CharacterId, InstanceId, InstanceRole, TalentId};

/// The five tracked stats. Saved-stat overrides and choice effects address
/// stats by name, so the set is closed and parseable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StatKind {
    Hp,
    Mana,
    Attack,
    Defense,
    Speed,
}

impl StatKind {
    pub const ALL: [StatKind; 5] = [
        StatKind::Hp,
        StatKind::Mana,
        StatKind::Attack,
        StatKind::Defense,
        StatKind::Speed,
    ];
}

impl std::fmt::Display for StatKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            StatKind::Hp => "hp",
            StatKind::Mana => "mana",
            StatKind::Attack => "attack",
            StatKind::Defense => "defense",
            StatKind::Speed => "speed",
        };
        write!(f, "{name}")
    }
}

impl FromStr for StatKind {
    type Err = DomainError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hp" => Ok(StatKind::Hp),
            "mana" => Ok(StatKind::Mana),
            "attack" => Ok(StatKind::Attack),
            "defense" => Ok(StatKind::Defense),
            "speed" => Ok(StatKind::Speed),
            other => Err(DomainError::parse(format!("unknown stat: {other}"))),
        }
    }
}

/// One full snapshot of the five stats.
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatBlock {
    pub hp: f64,
    pub mana: f64,
    pub attack: f64,
    pub defense: f64,
    pub speed: f64,
}

impl StatBlock {
    pub fn get(&self, kind: StatKind) -> f64 {
        match kind {
            StatKind::Hp => self.hp,
            StatKind::Mana => self.mana,
            StatKind::Attack => self.attack,
            StatKind::Defense => self.defense,
            StatKind::Speed => self.speed,
        }
    }

    pub fn set(&mut self, kind: StatKind, value: f64) {
        match kind {
            StatKind::Hp => self.hp = value,
            StatKind::Mana => self.mana = value,
            StatKind::Attack => self.attack = value,
            StatKind::Defense => self.defense = value,
            StatKind::Speed => self.speed = value,
        }
    }

    /// A block is structurally valid when every field is a finite,
    /// non-negative number. Downstream damage math cannot tolerate NaN or
    /// negative maxima.
    pub fn is_valid(&self) -> bool {
        StatKind::ALL
            .iter()
            .all(|kind| self.get(*kind).is_finite() && self.get(*kind) >= 0.0)
    }
}

/// Live stats plus their "base" shadow copy.
///
/// The base copy exists so that mid-battle stat recalculation (buffs expire,
/// passives recompute) has a stable anchor. Permanent changes (stage
/// modifications, saved run growth) are written to both copies; transient
/// buffs only ever touch the live copy.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Stats {
    #[serde(flatten)]
    pub current: StatBlock,
    pub base: StatBlock,
}

impl Stats {
    pub fn from_base(block: StatBlock) -> Self {
        Self {
            current: block,
            base: block,
        }
    }

    pub fn get(&self, kind: StatKind) -> f64 {
        self.current.get(kind)
    }

    /// Write a stat into both the live copy and the base shadow, so a later
    /// recalculation pass does not erase it.
    pub fn set_permanent(&mut self, kind: StatKind, value: f64) {
        self.current.set(kind, value);
        self.base.set(kind, value);
    }

    /// Multiply the *current* value and persist the result into both copies.
    pub fn scale_permanent(&mut self, kind: StatKind, multiplier: f64) {
        let value = self.current.get(kind) * multiplier;
        self.set_permanent(kind, value);
    }

    pub fn is_valid(&self) -> bool {
        self.current.is_valid() && self.base.is_valid()
    }
}

/// What an ability's `amount` field means.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EffectKind {
    Damage,
    Heal,
    Buff,
    Debuff,

    /// Forward-compatibility fallback for newer variants.
    #[serde(other)]
    Unknown,
}

/// One ability as authored in the character catalog.
///
/// Damage-bearing fields are all optional; which ones are present depends on
/// how the ability was authored.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Ability {
    pub name: String,
    #[serde(rename = "type", default)]
    pub kind: Option<EffectKind>,
    #[serde(default)]
    pub mana_cost: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub damage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub fixed_damage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub min_damage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub max_damage: Option<f64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
}

impl Ability {
    /// Multiply every damage-bearing field present on this ability.
    ///
    /// `amount` is only scaled when the ability's kind is damage; for heals
    /// and buffs it is not a damage field.
    pub fn scale_damage(&mut self, multiplier: f64) {
        for field in [
            &mut self.damage,
            &mut self.fixed_damage,
            &mut self.min_damage,
            &mut self.max_damage,
        ] {
            if let Some(value) = field {
                *value *= multiplier;
            }
        }
        if self.kind == Some(EffectKind::Damage) {
            if let Some(amount) = &mut self.amount {
                *amount *= multiplier;
            }
        }
    }
}

/// One character as authored in the character catalog.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CharacterData {
    pub id: CharacterId,
    pub name: String,
    #[serde(default)]
    pub image: Option<String>,
    #[serde(default)]
    pub locked: bool,
    pub stats: StatBlock,
    #[serde(default)]
    pub abilities: Vec<Ability>,
    #[serde(default)]
    pub base_talents: Vec<TalentId>,
    #[serde(default)]
    pub passive: Option<String>,
}

/// The materialized in-memory character used in a battle.
///
/// Never persisted directly; only the HP/mana/stats projection goes into the
/// saved team state.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Combatant {
    pub instance_id: InstanceId,
    pub character_id: CharacterId,
    pub name: String,
    pub is_ai: bool,
    pub stats: Stats,
    pub abilities: Vec<Ability>,
    pub current_hp: f64,
    pub current_mana: f64,
    #[serde(default)]
    pub passive: Option<String>,
}

impl Combatant {
    /// Materialize a catalog character at full vitals.
    pub fn from_catalog(data: &CharacterData, is_ai: bool, counter: u32) -> Self {
        let role = if is_ai {
            InstanceRole::Ai
        } else {
            InstanceRole::Player
        };
        Self {
            instance_id: InstanceId::compose(&data.id, role, counter),
            character_id: data.id.clone(),
            name: data.name.clone(),
            is_ai,
            stats: Stats::from_base(data.stats),
            abilities: data.abilities.clone(),
            current_hp: data.stats.hp,
            current_mana: data.stats.mana,
            passive: data.passive.clone(),
        }
    }

    pub fn max_hp(&self) -> f64 {
        self.stats.get(StatKind::Hp)
    }

    pub fn max_mana(&self) -> f64 {
        self.stats.get(StatKind::Mana)
    }

    /// Clamp current HP/mana into `[0, max]` against the current maxima.
    pub fn clamp_vitals(&mut self) {
        self.current_hp = self.current_hp.clamp(0.0, self.max_hp());
        self.current_mana = self.current_mana.clamp(0.0, self.max_mana());
    }

    pub fn restore_full(&mut self) {
        self.current_hp = self.max_hp();
        self.current_mana = self.max_mana();
    }

    pub fn is_down(&self) -> bool {
        self.current_hp <= 0.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ability(kind: Option<EffectKind>) -> Ability {
        Ability {
            name: "strike".into(),
            kind,
            mana_cost: 10.0,
            damage: Some(40.0),
            fixed_damage: Some(5.0),
            min_damage: Some(30.0),
            max_damage: Some(50.0),
            amount: Some(20.0),
        }
    }

    #[test]
    fn scale_damage_touches_every_damage_field() {
        let mut a = ability(Some(EffectKind::Damage));
        a.scale_damage(2.0);
        assert_eq!(a.damage, Some(80.0));
        assert_eq!(a.fixed_damage, Some(10.0));
        assert_eq!(a.min_damage, Some(60.0));
        assert_eq!(a.max_damage, Some(100.0));
        assert_eq!(a.amount, Some(40.0));
    }

    #[test]
    fn scale_damage_leaves_heal_amounts_alone() {
        let mut a = ability(Some(EffectKind::Heal));
        a.scale_damage(2.0);
        assert_eq!(a.amount, Some(20.0));
        assert_eq!(a.damage, Some(80.0));
    }

    #[test]
    fn permanent_scaling_writes_both_copies() {
        let mut stats = Stats::from_base(StatBlock {
            hp: 1000.0,
            mana: 100.0,
            attack: 50.0,
            defense: 20.0,
            speed: 10.0,
        });
        stats.scale_permanent(StatKind::Hp, 1.3);
        assert_eq!(stats.current.hp, 1300.0);
        assert_eq!(stats.base.hp, 1300.0);
    }

    #[test]
    fn stat_block_rejects_nan_and_negatives() {
        let mut block = StatBlock::default();
        assert!(block.is_valid());
        block.attack = f64::NAN;
        assert!(!block.is_valid());
        block.attack = -1.0;
        assert!(!block.is_valid());
    }

    #[test]
    fn clamp_vitals_bounds_against_current_maxima() {
        let data = CharacterData {
            id: CharacterId::from("knight"),
            name: "Knight".into(),
            image: None,
            locked: false,
            stats: StatBlock {
                hp: 1500.0,
                mana: 100.0,
                ..StatBlock::default()
            },
            abilities: vec![],
            base_talents: vec![],
            passive: None,
        };
        let mut combatant = Combatant::from_catalog(&data, false, 0);
        combatant.current_hp = 1800.0;
        combatant.current_mana = -5.0;
        combatant.clamp_vitals();
        assert_eq!(combatant.current_hp, 1500.0);
        assert_eq!(combatant.current_mana, 0.0);
    }

    #[test]
    fn stat_kind_round_trips_through_strings() {
        for kind in StatKind::ALL {
            let parsed: StatKind = kind.to_string().parse().expect("parse stat");
            assert_eq!(parsed, kind);
        }
        assert!("luck".parse::<StatKind>().is_err());
    }
}
