//! Role-gated administrative operations.
//!
//! Every operation takes the acting account's name and verifies its role
//! before touching anything. Configuration writes validate multipliers so a
//! bad value can never poison later draws.

use casefall_types::{
    CaseSpec, ItemInstance, ItemTemplate, PayoutConfig, PromoCode, Role, ScheduledEvent,
};
use tracing::{info, warn};

use crate::games::GameKind;
use crate::store::EconomyStore;
use crate::EngineError;

impl EconomyStore {
    fn require_admin(&self, actor: &str) -> Result<(), EngineError> {
        if self.account(actor)?.role.is_admin() {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied("admin"))
        }
    }

    fn require_moderator(&self, actor: &str) -> Result<(), EngineError> {
        if self.account(actor)?.role.is_moderator() {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied("moderator"))
        }
    }

    fn require_owner(&self, actor: &str) -> Result<(), EngineError> {
        if self.account(actor)?.role == Role::Owner {
            Ok(())
        } else {
            Err(EngineError::PermissionDenied("owner"))
        }
    }

    /// Bootstrap helper: promote an account without an acting owner. Intended
    /// for store setup before any privileged account exists.
    pub fn bootstrap_role(&mut self, name: &str, role: Role) -> Result<(), EngineError> {
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.role = role;
        Ok(())
    }

    // ---- configuration ----

    pub fn set_global_luck(&mut self, actor: &str, value: f64) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.config.global_luck = validated_multiplier(value)?;
        info!(actor, value, "global luck updated");
        Ok(())
    }

    pub fn set_case_price_multiplier(&mut self, actor: &str, value: f64) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.config.case_price_multiplier = validated_multiplier(value)?;
        info!(actor, value, "case price multiplier updated");
        Ok(())
    }

    pub fn set_sell_value_multiplier(&mut self, actor: &str, value: f64) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.config.sell_value_multiplier = validated_multiplier(value)?;
        info!(actor, value, "sell value multiplier updated");
        Ok(())
    }

    pub fn set_upgrade_chance_multiplier(
        &mut self,
        actor: &str,
        value: f64,
    ) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.config.upgrade_chance_multiplier = validated_multiplier(value)?;
        info!(actor, value, "upgrade chance multiplier updated");
        Ok(())
    }

    pub fn set_passive_income(
        &mut self,
        actor: &str,
        amount: u64,
        interval_ms: u64,
    ) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        if interval_ms == 0 {
            return Err(EngineError::InvalidConfig("income interval must be positive"));
        }
        let config = &mut self.config;
        config.passive_income = amount;
        config.passive_income_interval_ms = interval_ms;
        info!(actor, amount, interval_ms, "passive income updated");
        Ok(())
    }

    pub fn set_maintenance(&mut self, actor: &str, active: bool) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.config.maintenance = active;
        warn!(actor, active, "maintenance mode changed");
        Ok(())
    }

    pub fn set_game_enabled(
        &mut self,
        actor: &str,
        kind: GameKind,
        enabled: bool,
    ) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let games = &mut self.config.games;
        match kind {
            GameKind::Mines => games.mines = enabled,
            GameKind::Hilo => games.hilo = enabled,
            GameKind::Blackjack => games.blackjack = enabled,
            GameKind::Roulette => games.roulette = enabled,
            GameKind::Slots => games.slots = enabled,
            GameKind::Coinflip => games.coinflip = enabled,
        }
        info!(actor, game = kind.name(), enabled, "game toggled");
        Ok(())
    }

    pub fn set_payouts(&mut self, actor: &str, payouts: PayoutConfig) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        if !payouts.mines_house_edge.is_finite()
            || !(0.0..=0.5).contains(&payouts.mines_house_edge)
        {
            return Err(EngineError::InvalidConfig("mines house edge out of range"));
        }
        if payouts.slots_paytable.is_empty() {
            return Err(EngineError::InvalidConfig("slots paytable is empty"));
        }
        self.config.payouts = payouts;
        info!(actor, "payout configuration updated");
        Ok(())
    }

    // ---- catalog ----

    pub fn upsert_template(
        &mut self,
        actor: &str,
        template: ItemTemplate,
    ) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        if template.id.is_empty() {
            return Err(EngineError::InvalidConfig("template id is empty"));
        }
        info!(actor, template = %template.id, "template upserted");
        self.templates.insert(template.id.clone(), template);
        Ok(())
    }

    /// Remove a template from the catalog. Owned instances are unaffected;
    /// drop-table entries naming it are skipped at resolution time.
    pub fn remove_template(&mut self, actor: &str, template_id: &str) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.templates
            .remove(template_id)
            .ok_or_else(|| EngineError::UnknownTemplate(template_id.to_string()))?;
        info!(actor, template = template_id, "template removed");
        Ok(())
    }

    pub fn set_template_hidden(
        &mut self,
        actor: &str,
        template_id: &str,
        hidden: bool,
    ) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let template = self
            .templates
            .get_mut(template_id)
            .ok_or_else(|| EngineError::UnknownTemplate(template_id.to_string()))?;
        template.hidden = hidden;
        Ok(())
    }

    pub fn upsert_case(&mut self, actor: &str, case: CaseSpec) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        if case.id.is_empty() {
            return Err(EngineError::InvalidConfig("case id is empty"));
        }
        if case.drop_table.is_empty() {
            return Err(EngineError::InvalidConfig("drop table is empty"));
        }
        if !case
            .drop_table
            .iter()
            .any(|e| e.weight.is_finite() && e.weight > 0.0)
        {
            return Err(EngineError::InvalidConfig("drop table has no positive weight"));
        }
        info!(actor, case = %case.id, "case upserted");
        self.cases.insert(case.id.clone(), case);
        Ok(())
    }

    pub fn remove_case(&mut self, actor: &str, case_id: &str) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.cases
            .remove(case_id)
            .ok_or_else(|| EngineError::UnknownCase(case_id.to_string()))?;
        info!(actor, case = case_id, "case removed");
        Ok(())
    }

    // ---- accounts ----

    pub fn grant_balance(&mut self, actor: &str, name: &str, amount: u64) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.balance = account.balance.saturating_add(amount);
        info!(actor, account = name, amount, "balance granted");
        Ok(())
    }

    pub fn deduct_balance(&mut self, actor: &str, name: &str, amount: u64) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.balance = account.balance.saturating_sub(amount);
        info!(actor, account = name, amount, "balance deducted");
        Ok(())
    }

    /// Mint one instance of a template straight into an account's inventory.
    /// Returns the new instance id.
    pub fn grant_item(
        &mut self,
        actor: &str,
        name: &str,
        template_id: &str,
        now_ms: u64,
    ) -> Result<u64, EngineError> {
        self.require_admin(actor)?;
        let template = self.template(template_id)?.clone();
        if !self.accounts.contains_key(name) {
            return Err(EngineError::UnknownAccount(name.to_string()));
        }
        let item = ItemInstance {
            id: self.next_item_id,
            template_id: template.id.clone(),
            name: template.name.clone(),
            rarity: template.rarity,
            value: template.value,
            acquired_at: now_ms,
        };
        self.next_item_id += 1;
        let id = item.id;
        if let Some(account) = self.accounts.get_mut(name) {
            account.inventory.insert(0, item);
        }
        if let Some(t) = self.templates.get_mut(template_id) {
            t.circulation += 1;
        }
        info!(actor, account = name, template = template_id, "item granted");
        Ok(id)
    }

    /// Credit every registered account at once. Returns the number of
    /// accounts credited.
    pub fn gift_all(&mut self, actor: &str, amount: u64) -> Result<usize, EngineError> {
        self.require_admin(actor)?;
        let mut credited = 0;
        for account in self.accounts.values_mut() {
            if account.banned {
                continue;
            }
            account.balance = account.balance.saturating_add(amount);
            credited += 1;
        }
        info!(actor, amount, credited, "mass gift");
        Ok(credited)
    }

    pub fn set_account_luck(&mut self, actor: &str, name: &str, luck: f64) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let luck = validated_multiplier(luck)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.luck = luck;
        info!(actor, account = name, luck, "account luck set");
        Ok(())
    }

    pub fn set_role(&mut self, actor: &str, name: &str, role: Role) -> Result<(), EngineError> {
        self.require_owner(actor)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.role = role;
        info!(actor, account = name, ?role, "role changed");
        Ok(())
    }

    pub fn set_banned(&mut self, actor: &str, name: &str, banned: bool) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.banned = banned;
        warn!(actor, account = name, banned, "ban state changed");
        Ok(())
    }

    pub fn set_muted(&mut self, actor: &str, name: &str, muted: bool) -> Result<(), EngineError> {
        self.require_moderator(actor)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.muted = muted;
        info!(actor, account = name, muted, "mute state changed");
        Ok(())
    }

    pub fn set_kicked(&mut self, actor: &str, name: &str, kicked: bool) -> Result<(), EngineError> {
        self.require_moderator(actor)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.kicked = kicked;
        info!(actor, account = name, kicked, "kick state changed");
        Ok(())
    }

    /// Queue a forced drop: the account's next case open yields this template
    /// regardless of the weighted table.
    pub fn set_forced_drop(
        &mut self,
        actor: &str,
        name: &str,
        template_id: &str,
    ) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.template(template_id)?;
        let template_id = template_id.to_string();
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.forced_drop = Some(template_id.clone());
        info!(actor, account = name, template = %template_id, "forced drop queued");
        Ok(())
    }

    pub fn clear_forced_drop(&mut self, actor: &str, name: &str) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let account = self
            .accounts
            .get_mut(name)
            .ok_or_else(|| EngineError::UnknownAccount(name.to_string()))?;
        account.forced_drop = None;
        Ok(())
    }

    // ---- promos and events ----

    pub fn add_promo(&mut self, actor: &str, promo: PromoCode) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        if promo.code.is_empty() {
            return Err(EngineError::InvalidConfig("promo code is empty"));
        }
        info!(actor, code = %promo.code, reward = promo.reward, "promo added");
        self.promo_codes.insert(promo.code.clone(), promo);
        Ok(())
    }

    /// Retire a promo code. Accounts that already redeemed it keep their
    /// reward.
    pub fn remove_promo(&mut self, actor: &str, code: &str) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        self.promo_codes
            .remove(code)
            .ok_or_else(|| EngineError::UnknownPromo(code.to_string()))?;
        info!(actor, code, "promo removed");
        Ok(())
    }

    pub fn schedule_event(&mut self, actor: &str, event: ScheduledEvent) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        if event.duration_minutes == 0 {
            return Err(EngineError::InvalidConfig("event duration must be positive"));
        }
        let events = &mut self.config.events;
        events.retain(|e| e.id != event.id);
        info!(actor, event = %event.id, start_ms = event.start_ms, "event scheduled");
        events.push(event);
        Ok(())
    }

    pub fn cancel_event(&mut self, actor: &str, event_id: &str) -> Result<(), EngineError> {
        self.require_admin(actor)?;
        let events = &mut self.config.events;
        let before = events.len();
        events.retain(|e| e.id != event_id);
        if events.len() == before {
            return Err(EngineError::InvalidConfig("no such event"));
        }
        info!(actor, event = event_id, "event cancelled");
        Ok(())
    }
}

fn validated_multiplier(value: f64) -> Result<f64, EngineError> {
    if value.is_finite() && value > 0.0 {
        Ok(value)
    } else {
        Err(EngineError::InvalidConfig("multiplier must be finite and positive"))
    }
}
