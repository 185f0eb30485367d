use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::Rarity;

/// Broad item groupings used by shop/catalog filtering.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ItemCategory {
    Equipment,
    Character,
    Key,
    Artifact,
}

/// Immutable catalog definition of an item.
///
/// Created by the shipped catalog seed or an administrative action; mutated
/// only by administrative edit/delete. Owned instances copy the display
/// attributes at acquisition time (see [`crate::ItemInstance`]).
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ItemTemplate {
    pub id: String,
    pub name: String,
    pub rarity: Rarity,
    /// Base monetary value in integer currency units.
    pub value: u64,
    pub category: ItemCategory,
    /// Count of instances ever created from this template.
    #[serde(default)]
    pub circulation: u64,
    /// Hidden templates are excluded from shop/catalog listings but remain
    /// obtainable through drops and admin grants.
    #[serde(default)]
    pub hidden: bool,
}

/// One candidate outcome in a case's drop table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct DropEntry {
    pub template_id: String,
    /// Non-negative base weight. Entries referencing unknown templates are
    /// skipped at resolution time.
    pub weight: f64,
}

/// A purchasable reward table.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct CaseSpec {
    pub id: String,
    pub name: String,
    /// Base price before the configured case-price multiplier.
    pub price: u64,
    /// Template id of the key consumed on open, if the case is key-gated.
    #[serde(default)]
    pub required_key: Option<String>,
    /// Minimum account level required to open.
    #[serde(default)]
    pub min_level: u32,
    pub drop_table: Vec<DropEntry>,
}

/// Shipped default item catalog.
///
/// Spans every rarity tier and includes a key template so the key-gated flow
/// works out of the box. Used for new stores and to repopulate missing maps on
/// snapshot import.
pub fn default_templates() -> BTreeMap<String, ItemTemplate> {
    let seed = [
        ("rusted_blade", "Rusted Blade", Rarity::Common, 8, ItemCategory::Equipment),
        ("field_jacket", "Field Jacket", Rarity::Common, 12, ItemCategory::Equipment),
        ("scout_visor", "Scout Visor", Rarity::Uncommon, 35, ItemCategory::Equipment),
        ("courier_drone", "Courier Drone", Rarity::Uncommon, 50, ItemCategory::Character),
        ("ion_pistol", "Ion Pistol", Rarity::Rare, 140, ItemCategory::Equipment),
        ("night_operative", "Night Operative", Rarity::Rare, 180, ItemCategory::Character),
        ("plasma_lance", "Plasma Lance", Rarity::Epic, 520, ItemCategory::Equipment),
        ("vault_sigil", "Vault Sigil", Rarity::Epic, 600, ItemCategory::Artifact),
        ("dragon_core", "Dragon Core", Rarity::Legendary, 2_400, ItemCategory::Artifact),
        ("hero_vanguard", "Hero Vanguard", Rarity::Legendary, 2_800, ItemCategory::Character),
        ("mythic_crown", "Mythic Crown", Rarity::Mythic, 9_500, ItemCategory::Artifact),
        ("smuggled_reactor", "Smuggled Reactor", Rarity::Contraband, 24_000, ItemCategory::Artifact),
        ("void_shard", "Void Shard", Rarity::DarkMatter, 80_000, ItemCategory::Artifact),
        ("godlike_avatar", "Godlike Avatar", Rarity::Godlike, 250_000, ItemCategory::Character),
        ("hero_key", "Hero Key", Rarity::Uncommon, 60, ItemCategory::Key),
    ];

    seed.into_iter()
        .map(|(id, name, rarity, value, category)| {
            (
                id.to_string(),
                ItemTemplate {
                    id: id.to_string(),
                    name: name.to_string(),
                    rarity,
                    value,
                    category,
                    circulation: 0,
                    hidden: false,
                },
            )
        })
        .collect()
}

/// Shipped default case catalog, referencing [`default_templates`].
pub fn default_cases() -> BTreeMap<String, CaseSpec> {
    let starter = CaseSpec {
        id: "starter_case".to_string(),
        name: "Starter Case".to_string(),
        price: 100,
        required_key: None,
        min_level: 0,
        drop_table: vec![
            DropEntry { template_id: "rusted_blade".into(), weight: 4_000.0 },
            DropEntry { template_id: "field_jacket".into(), weight: 3_000.0 },
            DropEntry { template_id: "scout_visor".into(), weight: 1_600.0 },
            DropEntry { template_id: "courier_drone".into(), weight: 900.0 },
            DropEntry { template_id: "ion_pistol".into(), weight: 380.0 },
            DropEntry { template_id: "plasma_lance".into(), weight: 100.0 },
            DropEntry { template_id: "dragon_core".into(), weight: 18.0 },
            DropEntry { template_id: "mythic_crown".into(), weight: 2.0 },
        ],
    };

    let hero = CaseSpec {
        id: "hero_case".to_string(),
        name: "Hero Case".to_string(),
        price: 750,
        required_key: Some("hero_key".to_string()),
        min_level: 5,
        drop_table: vec![
            DropEntry { template_id: "ion_pistol".into(), weight: 4_200.0 },
            DropEntry { template_id: "night_operative".into(), weight: 3_200.0 },
            DropEntry { template_id: "plasma_lance".into(), weight: 1_500.0 },
            DropEntry { template_id: "vault_sigil".into(), weight: 800.0 },
            DropEntry { template_id: "hero_vanguard".into(), weight: 240.0 },
            DropEntry { template_id: "mythic_crown".into(), weight: 50.0 },
            DropEntry { template_id: "smuggled_reactor".into(), weight: 9.0 },
            DropEntry { template_id: "void_shard".into(), weight: 1.0 },
        ],
    };

    let vault = CaseSpec {
        id: "vault_case".to_string(),
        name: "Vault Case".to_string(),
        price: 5_000,
        required_key: None,
        min_level: 15,
        drop_table: vec![
            DropEntry { template_id: "plasma_lance".into(), weight: 5_000.0 },
            DropEntry { template_id: "vault_sigil".into(), weight: 3_000.0 },
            DropEntry { template_id: "dragon_core".into(), weight: 1_400.0 },
            DropEntry { template_id: "hero_vanguard".into(), weight: 450.0 },
            DropEntry { template_id: "mythic_crown".into(), weight: 120.0 },
            DropEntry { template_id: "smuggled_reactor".into(), weight: 25.0 },
            DropEntry { template_id: "void_shard".into(), weight: 4.0 },
            DropEntry { template_id: "godlike_avatar".into(), weight: 1.0 },
        ],
    };

    [starter, hero, vault]
        .into_iter()
        .map(|c| (c.id.clone(), c))
        .collect()
}
