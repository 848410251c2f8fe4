//! Combat Resolution
//!
//! Resolves one attack/defend exchange. Attackers are processed in ascending
//! `CreatureId` order; every pairing is independent, so the order does not
//! change the result.
//!
//! - Blocked: each side dies if the other's attack strictly exceeds its
//!   defense. Ties survive, and both can die.
//! - Unblocked: the defending player loses the attacker's attack in health,
//!   floored at zero.

use std::collections::{BTreeMap, BTreeSet};

use crate::game::state::{CreatureId, PlayerId, PlayerState};

/// A creature that died in combat.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Death {
    /// Owner of the creature.
    pub owner: PlayerId,
    /// The creature.
    pub creature: CreatureId,
}

/// Everything a combat changed.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct CombatReport {
    /// Deaths in resolution order.
    pub deaths: Vec<Death>,
    /// Health actually removed from the defending player.
    pub damage: u32,
}

/// Resolve declared attackers against assigned blockers.
///
/// `defenses` maps attacker to defender. Every id must already be validated
/// as alive and owned by the right side; unknown ids are skipped.
pub fn resolve_combat(
    attacking: &mut PlayerState,
    defending: &mut PlayerState,
    attackers: &BTreeSet<CreatureId>,
    defenses: &BTreeMap<CreatureId, CreatureId>,
) -> CombatReport {
    let mut report = CombatReport::default();

    for attacker_id in attackers {
        let attacker = match attacking.board.get(attacker_id) {
            Some(creature) => *creature,
            None => continue,
        };

        match defenses.get(attacker_id) {
            Some(defender_id) => {
                let defender = match defending.board.get(defender_id) {
                    Some(creature) => *creature,
                    None => continue,
                };

                if attacker.attack > defender.defense && defending.kill(defender.id) {
                    report.deaths.push(Death { owner: defending.id, creature: defender.id });
                }
                if defender.attack > attacker.defense && attacking.kill(attacker.id) {
                    report.deaths.push(Death { owner: attacking.id, creature: attacker.id });
                }
            }
            None => {
                let dealt = defending.take_damage(attacker.attack);
                report.damage = report.damage.saturating_add(dealt);
            }
        }
    }

    report
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::game::card::{CardId, CardStats, DeckListing};
    use crate::game::state::{Creature, CreatureLookup};
    use proptest::prelude::*;

    fn player(byte: u8, health: u32) -> PlayerState {
        PlayerState::new(PlayerId::new([byte; 16]), [byte; 32], DeckListing::default(), health)
    }

    fn summon(player: &mut PlayerState, id: u32, attack: u32, defense: u32) -> CreatureId {
        let creature_id = CreatureId(id);
        player.summon(Creature::new(creature_id, CardId(id), CardStats::new(attack, defense)));
        creature_id
    }

    #[test]
    fn test_mutual_destruction() {
        let mut a = player(1, 20);
        let mut d = player(2, 20);
        let attacker = summon(&mut a, 0, 5, 2);
        let defender = summon(&mut d, 1, 3, 4);

        let report = resolve_combat(
            &mut a,
            &mut d,
            &BTreeSet::from([attacker]),
            &BTreeMap::from([(attacker, defender)]),
        );

        assert_eq!(report.deaths.len(), 2);
        assert!(matches!(a.lookup(attacker), CreatureLookup::Dead(_)));
        assert!(matches!(d.lookup(defender), CreatureLookup::Dead(_)));
        assert_eq!(report.damage, 0);
        assert_eq!(d.health, 20);
    }

    #[test]
    fn test_ties_survive() {
        let mut a = player(1, 20);
        let mut d = player(2, 20);
        let attacker = summon(&mut a, 0, 4, 3);
        let defender = summon(&mut d, 1, 3, 4);

        let report = resolve_combat(
            &mut a,
            &mut d,
            &BTreeSet::from([attacker]),
            &BTreeMap::from([(attacker, defender)]),
        );

        assert!(report.deaths.is_empty());
        assert!(a.board.contains_key(&attacker));
        assert!(d.board.contains_key(&defender));
    }

    #[test]
    fn test_only_defender_dies() {
        let mut a = player(1, 20);
        let mut d = player(2, 20);
        let attacker = summon(&mut a, 0, 6, 9);
        let defender = summon(&mut d, 1, 2, 1);

        let report = resolve_combat(
            &mut a,
            &mut d,
            &BTreeSet::from([attacker]),
            &BTreeMap::from([(attacker, defender)]),
        );

        assert_eq!(report.deaths, vec![Death { owner: d.id, creature: defender }]);
        assert!(a.board.contains_key(&attacker));
    }

    #[test]
    fn test_unblocked_damage() {
        let mut a = player(1, 20);
        let mut d = player(2, 20);
        let attacker = summon(&mut a, 0, 7, 1);

        let report = resolve_combat(&mut a, &mut d, &BTreeSet::from([attacker]), &BTreeMap::new());

        assert_eq!(report.damage, 7);
        assert_eq!(d.health, 13);
    }

    #[test]
    fn test_unblocked_damage_floors_at_zero() {
        let mut a = player(1, 20);
        let mut d = player(2, 5);
        let attacker = summon(&mut a, 0, 7, 1);

        let report = resolve_combat(&mut a, &mut d, &BTreeSet::from([attacker]), &BTreeMap::new());

        assert_eq!(report.damage, 5);
        assert_eq!(d.health, 0);
    }

    #[test]
    fn test_mixed_blocked_and_unblocked() {
        let mut a = player(1, 20);
        let mut d = player(2, 20);
        let blocked = summon(&mut a, 0, 1, 1);
        let free = summon(&mut a, 1, 4, 1);
        let wall = summon(&mut d, 2, 0, 10);

        let report = resolve_combat(
            &mut a,
            &mut d,
            &BTreeSet::from([blocked, free]),
            &BTreeMap::from([(blocked, wall)]),
        );

        assert_eq!(report.damage, 4);
        assert_eq!(d.health, 16);
        assert!(report.deaths.is_empty());
    }

    proptest! {
        #[test]
        fn prop_unblocked_health_accounting(
            health in 0u32..100,
            attacks in proptest::collection::vec(0u32..50, 0..8),
        ) {
            let mut a = player(1, 20);
            let mut d = player(2, health);
            let mut declared = BTreeSet::new();
            for (i, attack) in attacks.iter().enumerate() {
                declared.insert(summon(&mut a, i as u32, *attack, 1));
            }

            let report = resolve_combat(&mut a, &mut d, &declared, &BTreeMap::new());

            let total: u32 = attacks.iter().sum();
            prop_assert_eq!(d.health, health.saturating_sub(total));
            prop_assert_eq!(report.damage, health - d.health);
            prop_assert!(report.deaths.is_empty());
        }

        #[test]
        fn prop_blocked_death_rule(
            aa in 0u32..10, ad in 0u32..10,
            da in 0u32..10, dd in 0u32..10,
        ) {
            let mut a = player(1, 20);
            let mut d = player(2, 20);
            let attacker = summon(&mut a, 0, aa, ad);
            let defender = summon(&mut d, 1, da, dd);

            resolve_combat(
                &mut a,
                &mut d,
                &BTreeSet::from([attacker]),
                &BTreeMap::from([(attacker, defender)]),
            );

            prop_assert_eq!(d.board.contains_key(&defender), aa <= dd);
            prop_assert_eq!(a.board.contains_key(&attacker), da <= ad);
            prop_assert_eq!(d.health, 20);
        }
    }
}
