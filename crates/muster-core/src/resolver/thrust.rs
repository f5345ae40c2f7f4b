//! Effective thrust derivation for aerospace units.
//!
//! Non-vessels lose half their base thrust to the first engine hit and
//! everything to the second. Vessels lose a percentage of the immutable
//! base (25% for one hit, 50% for two, all of it at three); the
//! percentage is decided by the final committed hit count and applied
//! exactly once, at the point in the ordered walk where the running
//! engine count reaches that total. Thruster hits cost one each wherever
//! they fall.

use crate::ledger::crits::CritKey;

use super::StateView;

/// Percentage loss against the base value, rounded half away from zero,
/// never less than one point.
#[allow(clippy::cast_possible_truncation)]
fn percentage_loss(base: i32, fraction: f64) -> i32 {
    // Thrust ratings are tiny; the cast back cannot truncate.
    let loss = (f64::from(base) * fraction).round() as i32;
    loss.max(1)
}

/// Effective thrust. Always `0` for units without a thrust rating.
#[must_use]
pub fn effective_thrust(view: &StateView<'_>) -> i32 {
    let base = i32::from(view.template.base_thrust);
    if base == 0 {
        return 0;
    }

    let vessel = view.template.type_code.is_vessel();
    let engine_total = view.crits.committed_hits(CritKey::Engine);

    let mut thrust = base;
    let mut engines_seen = 0u32;
    for record in view.crits.committed_ordered() {
        if thrust <= 0 {
            break;
        }
        match record.key {
            CritKey::Engine => {
                engines_seen += 1;
                if vessel {
                    // Magnitude follows the final hit count, applied once
                    // where the walk reaches it.
                    if engines_seen == engine_total {
                        match engine_total {
                            1 => thrust -= percentage_loss(base, 0.25),
                            2 => thrust -= percentage_loss(base, 0.50),
                            _ => thrust = 0,
                        }
                    }
                } else if engines_seen == 1 {
                    thrust -= ((base + 1) / 2).max(1);
                } else {
                    thrust = 0;
                }
            }
            CritKey::Thruster => thrust -= 1,
            _ => {}
        }
    }
    thrust.max(0)
}
