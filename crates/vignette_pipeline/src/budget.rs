//! Token budget policy.

use vignette_context::BudgetTable;
use vignette_core::ShotType;

/// Compute the token allowance for a beat.
///
/// The base budget comes from the shot type. Sealed gear trims the budget
/// (no expression text will be spent), and a vehicle raises it (the
/// vehicle description needs room).
pub fn token_budget(table: &BudgetTable, shot: ShotType, any_sealed: bool, has_vehicle: bool) -> u32 {
    let mut budget = table.base_for(shot);
    if any_sealed {
        budget = budget.saturating_sub(*table.sealed_discount());
    }
    if has_vehicle {
        budget += table.vehicle_bonus();
    }
    budget
}

#[cfg(test)]
mod tests {
    use super::*;
    use vignette_context::BudgetTable;

    #[test]
    fn test_budget_modifiers() {
        let table = BudgetTable::default();
        let base = token_budget(&table, ShotType::Closeup, false, false);
        assert_eq!(base, 150);
        assert_eq!(token_budget(&table, ShotType::Closeup, true, false), base - 15);
        assert_eq!(token_budget(&table, ShotType::Closeup, false, true), base + 25);
        assert_eq!(
            token_budget(&table, ShotType::Closeup, true, true),
            base - 15 + 25
        );
    }
}
