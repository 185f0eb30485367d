use serde::{Deserialize, Serialize};

/// Rarity tier for item templates, ordered from least to most valuable.
#[derive(
    Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
#[repr(u8)]
pub enum Rarity {
    Common = 0,
    Uncommon = 1,
    Rare = 2,
    Epic = 3,
    Legendary = 4,
    Mythic = 5,
    Contraband = 6,
    DarkMatter = 7,
    Godlike = 8,
}

impl Rarity {
    /// All tiers in ascending order.
    pub const ALL: [Rarity; 9] = [
        Rarity::Common,
        Rarity::Uncommon,
        Rarity::Rare,
        Rarity::Epic,
        Rarity::Legendary,
        Rarity::Mythic,
        Rarity::Contraband,
        Rarity::DarkMatter,
        Rarity::Godlike,
    ];

    /// Tiers whose drop weights are scaled by the luck multiplier.
    ///
    /// Exactly Legendary, Mythic, and Contraband. Epic, DarkMatter, and
    /// Godlike are deliberately excluded: broadening the set changes game
    /// balance.
    pub fn is_lucky_tier(self) -> bool {
        matches!(self, Rarity::Legendary | Rarity::Mythic | Rarity::Contraband)
    }

    /// Tiers announced on the public live feed.
    pub fn is_feed_worthy(self) -> bool {
        self >= Rarity::Rare
    }

    /// Tiers recorded in the system log in addition to the live feed.
    pub fn is_system_tier(self) -> bool {
        self.is_lucky_tier()
    }

    /// Display label used in feeds and logs.
    pub fn label(self) -> &'static str {
        match self {
            Rarity::Common => "COMMON",
            Rarity::Uncommon => "UNCOMMON",
            Rarity::Rare => "RARE",
            Rarity::Epic => "EPIC",
            Rarity::Legendary => "LEGENDARY",
            Rarity::Mythic => "MYTHIC",
            Rarity::Contraband => "CONTRABAND",
            Rarity::DarkMatter => "DARK_MATTER",
            Rarity::Godlike => "GODLIKE",
        }
    }
}
