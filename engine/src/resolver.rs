//! Weighted drop resolution.
//!
//! A case's drop table is a list of (template id, base weight) entries. The
//! effective weight of an entry is its base weight, scaled by the caller's
//! effective luck only when the template sits in a lucky tier. Resolution
//! draws a uniform point in `[0, total)` and walks the cumulative weights,
//! so table order breaks exact boundary ties in favor of earlier entries.

use casefall_types::{CaseSpec, ItemTemplate};
use rand::Rng;
use std::collections::BTreeMap;

use crate::EngineError;

/// Effective weight of one entry under the given luck multiplier.
///
/// Luck scales only the lucky tiers; every other tier keeps its base weight.
/// Returns zero for weights that are negative or not finite.
fn effective_weight(weight: f64, template: &ItemTemplate, luck: f64) -> f64 {
    if !weight.is_finite() || weight <= 0.0 {
        return 0.0;
    }
    if template.rarity.is_lucky_tier() {
        weight * luck
    } else {
        weight
    }
}

/// Resolve one drop from `case`, returning the winning template id.
///
/// Entries referencing unknown templates are skipped. Fails with
/// [`EngineError::InvalidRewardTable`] when no entry contributes positive,
/// finite weight.
pub fn resolve_drop<'a, R: Rng>(
    rng: &mut R,
    case: &'a CaseSpec,
    templates: &BTreeMap<String, ItemTemplate>,
    luck: f64,
) -> Result<&'a str, EngineError> {
    let luck = if luck.is_finite() && luck > 0.0 { luck } else { 1.0 };

    let mut total = 0.0f64;
    for entry in &case.drop_table {
        if let Some(template) = templates.get(&entry.template_id) {
            total += effective_weight(entry.weight, template, luck);
        }
    }
    if !total.is_finite() || total <= 0.0 {
        return Err(EngineError::InvalidRewardTable {
            case_id: case.id.clone(),
        });
    }

    let roll = rng.gen_range(0.0..total);
    let mut cumulative = 0.0f64;
    let mut last_eligible: Option<&str> = None;
    for entry in &case.drop_table {
        let Some(template) = templates.get(&entry.template_id) else {
            continue;
        };
        let weight = effective_weight(entry.weight, template, luck);
        if weight <= 0.0 {
            continue;
        }
        cumulative += weight;
        last_eligible = Some(&entry.template_id);
        if roll < cumulative {
            return Ok(&entry.template_id);
        }
    }

    // Floating-point accumulation can leave `roll` a hair past the final
    // cumulative sum. The last eligible entry is always set here because
    // total > 0.
    last_eligible.ok_or(EngineError::InvalidRewardTable {
        case_id: case.id.clone(),
    })
}
