use serde::{Deserialize, Serialize};

/// Milliseconds per scheduled-event duration minute.
pub const MS_PER_MINUTE: u64 = 60_000;

/// Per-game enable switches. Disabled games reject new rounds but existing
/// rounds may still be played out.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct GameToggles {
    pub mines: bool,
    pub roulette: bool,
    pub slots: bool,
    pub hilo: bool,
    pub blackjack: bool,
    pub coinflip: bool,
}

impl Default for GameToggles {
    fn default() -> Self {
        Self {
            mines: true,
            roulette: true,
            slots: true,
            hilo: true,
            blackjack: true,
            coinflip: true,
        }
    }
}

/// Slot machine reel symbols, ordered by payout.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SlotSymbol {
    Bomb,
    Cherry,
    Lemon,
    Bell,
    Diamond,
    Seven,
}

impl SlotSymbol {
    pub const ALL: [SlotSymbol; 6] = [
        SlotSymbol::Bomb,
        SlotSymbol::Cherry,
        SlotSymbol::Lemon,
        SlotSymbol::Bell,
        SlotSymbol::Diamond,
        SlotSymbol::Seven,
    ];
}

/// One paytable row: symbol, draw weight, and triple-match payout multiplier.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct SlotPayline {
    pub symbol: SlotSymbol,
    pub weight: f64,
    /// Bet multiplier paid when all three reels show this symbol. A bomb on
    /// any reel zeroes the spin regardless of this value.
    pub payout: u64,
}

fn default_slots_paytable() -> Vec<SlotPayline> {
    vec![
        SlotPayline { symbol: SlotSymbol::Bomb, weight: 14.0, payout: 0 },
        SlotPayline { symbol: SlotSymbol::Cherry, weight: 30.0, payout: 2 },
        SlotPayline { symbol: SlotSymbol::Lemon, weight: 24.0, payout: 3 },
        SlotPayline { symbol: SlotSymbol::Bell, weight: 18.0, payout: 5 },
        SlotPayline { symbol: SlotSymbol::Diamond, weight: 10.0, payout: 10 },
        SlotPayline { symbol: SlotSymbol::Seven, weight: 4.0, payout: 20 },
    ]
}

fn default_mines_house_edge() -> f64 {
    0.04
}

fn default_roulette_green_payout() -> u64 {
    14
}

fn default_roulette_color_payout() -> u64 {
    2
}

fn default_coinflip_payout() -> u64 {
    2
}

fn default_hilo_step() -> f64 {
    0.2
}

fn default_blackjack_natural_payout_x10() -> u64 {
    25
}

/// Payout parameters for the casino games.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PayoutConfig {
    /// Fraction of the fair mines multiplier retained by the house.
    #[serde(default = "default_mines_house_edge")]
    pub mines_house_edge: f64,
    #[serde(default = "default_slots_paytable")]
    pub slots_paytable: Vec<SlotPayline>,
    /// Bet multiplier for a winning green roulette pick.
    #[serde(default = "default_roulette_green_payout")]
    pub roulette_green_payout: u64,
    /// Bet multiplier for a winning red/black roulette pick.
    #[serde(default = "default_roulette_color_payout")]
    pub roulette_color_payout: u64,
    #[serde(default = "default_coinflip_payout")]
    pub coinflip_payout: u64,
    /// Base multiplier increment per correct hi-lo guess, before risk scaling.
    #[serde(default = "default_hilo_step")]
    pub hilo_step: f64,
    /// Blackjack natural payout in tenths of the bet (25 = 2.5x).
    #[serde(default = "default_blackjack_natural_payout_x10")]
    pub blackjack_natural_payout_x10: u64,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            mines_house_edge: default_mines_house_edge(),
            slots_paytable: default_slots_paytable(),
            roulette_green_payout: default_roulette_green_payout(),
            roulette_color_payout: default_roulette_color_payout(),
            coinflip_payout: default_coinflip_payout(),
            hilo_step: default_hilo_step(),
            blackjack_natural_payout_x10: default_blackjack_natural_payout_x10(),
        }
    }
}

/// Kind-specific payload of a scheduled event.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum EventKind {
    /// Multiplies the global luck factor while the window is active.
    Luck { multiplier: f64 },
    /// Marks a case as promoted while the window is active. The engine
    /// surfaces the active window to callers; presentation is theirs.
    Drop { case_id: String },
}

/// A timed event window.
///
/// Active when `start_ms <= now < start_ms + duration_minutes * 60_000`.
/// When several luck windows overlap, the one with the latest start wins.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ScheduledEvent {
    pub id: String,
    #[serde(flatten)]
    pub kind: EventKind,
    pub start_ms: u64,
    pub duration_minutes: u64,
}

impl ScheduledEvent {
    /// End of the window, exclusive.
    pub fn end_ms(&self) -> u64 {
        self.start_ms
            .saturating_add(self.duration_minutes.saturating_mul(MS_PER_MINUTE))
    }

    pub fn is_active(&self, now_ms: u64) -> bool {
        now_ms >= self.start_ms && now_ms < self.end_ms()
    }
}

/// A redeemable promotional code granting a one-time balance credit.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct PromoCode {
    pub code: String,
    pub reward: u64,
    /// Remaining redemptions across all accounts. `None` means unlimited.
    #[serde(default)]
    pub uses_remaining: Option<u64>,
}

fn default_global_luck() -> f64 {
    1.0
}

fn default_multiplier() -> f64 {
    1.0
}

fn default_income_interval_ms() -> u64 {
    60_000
}

/// Engine-wide tunables, all adjustable at runtime through the admin surface.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct EngineConfig {
    /// Baseline luck applied to every account, before event windows.
    #[serde(default = "default_global_luck")]
    pub global_luck: f64,
    /// Scales effective case prices.
    #[serde(default = "default_multiplier")]
    pub case_price_multiplier: f64,
    /// Scales sell proceeds.
    #[serde(default = "default_multiplier")]
    pub sell_value_multiplier: f64,
    /// Scales upgrade success chances, before the 95% ceiling.
    #[serde(default = "default_multiplier")]
    pub upgrade_chance_multiplier: f64,
    /// Balance credited per elapsed income interval.
    #[serde(default)]
    pub passive_income: u64,
    #[serde(default = "default_income_interval_ms")]
    pub passive_income_interval_ms: u64,
    /// When set, non-admin mutating operations are rejected.
    #[serde(default)]
    pub maintenance: bool,
    #[serde(default)]
    pub games: GameToggles,
    #[serde(default)]
    pub payouts: PayoutConfig,
    #[serde(default)]
    pub events: Vec<ScheduledEvent>,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            global_luck: 1.0,
            case_price_multiplier: 1.0,
            sell_value_multiplier: 1.0,
            upgrade_chance_multiplier: 1.0,
            passive_income: 0,
            passive_income_interval_ms: default_income_interval_ms(),
            maintenance: false,
            games: GameToggles::default(),
            payouts: PayoutConfig::default(),
            events: Vec::new(),
        }
    }
}
