//! Game State Definitions
//!
//! Public per-game and per-player records as held on the ledger.
//! Uses BTreeMap/BTreeSet for deterministic iteration order.

use std::collections::{BTreeMap, BTreeSet};
use std::fmt;

use serde::{Serialize, Deserialize};

use crate::commit::store::Commitments;
use crate::core::hash::{StateHash, StateHasher};
use crate::game::action::Step;
use crate::game::card::{CardId, CardStats, DeckListing};
use crate::ledger::RandomnessAnchor;
use crate::proof::gate::AcceptedTransition;

// =============================================================================
// IDENTIFIERS
// =============================================================================

/// Ledger identity of a participant (16 bytes, UUID-compatible).
///
/// Implements Ord for deterministic BTreeMap ordering.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct PlayerId(pub [u8; 16]);

impl PlayerId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Convert to UUID string.
    pub fn to_uuid_string(&self) -> String {
        uuid::Uuid::from_bytes(self.0).to_string()
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for PlayerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&hex::encode(&self.0[..4]))
    }
}

/// Identifier of one match.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct GameId(pub [u8; 16]);

impl GameId {
    /// Create from raw bytes.
    pub const fn new(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Fresh random identifier.
    pub fn random() -> Self {
        Self(uuid::Uuid::new_v4().into_bytes())
    }

    /// Create from UUID string.
    pub fn from_uuid_str(s: &str) -> Option<Self> {
        uuid::Uuid::parse_str(s)
            .ok()
            .map(|u| Self(*u.as_bytes()))
    }

    /// Get raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }
}

impl fmt::Display for GameId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_bytes(self.0))
    }
}

/// On-board creature instance, unique within a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct CreatureId(pub u32);

impl fmt::Display for CreatureId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

// =============================================================================
// CREATURES
// =============================================================================

/// A revealed card in play (or, once dead, in a graveyard).
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Creature {
    /// Instance id.
    pub id: CreatureId,
    /// Card kind it was played from.
    pub card: CardId,
    /// Damage dealt in combat.
    pub attack: u32,
    /// Damage needed (strictly exceeded) to kill it.
    pub defense: u32,
    /// False once it died.
    pub alive: bool,
}

impl Creature {
    /// Create a live creature from a played card.
    pub fn new(id: CreatureId, card: CardId, stats: CardStats) -> Self {
        Self {
            id,
            card,
            attack: stats.attack,
            defense: stats.defense,
            alive: true,
        }
    }

    fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_u32(self.id.0);
        hasher.update_u32(self.card.0);
        hasher.update_u32(self.attack);
        hasher.update_u32(self.defense);
        hasher.update_bool(self.alive);
    }
}

/// Where a creature reference points.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum CreatureLookup<'a> {
    /// On this player's board.
    Alive(&'a Creature),
    /// In this player's graveyard.
    Dead(&'a Creature),
    /// Not owned by this player.
    Missing,
}

// =============================================================================
// PLAYER STATE
// =============================================================================

/// State of a single player in a game.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlayerState {
    /// Ledger identity.
    pub id: PlayerId,

    /// Remaining health. The player loses at zero.
    pub health: u32,

    /// Hand/deck roots and sizes; written only from accepted proofs.
    commitments: Commitments,

    /// Live creatures (BTreeMap for deterministic iteration).
    pub board: BTreeMap<CreatureId, Creature>,

    /// Dead creatures, in order of death. Append-only.
    pub graveyard: Vec<Creature>,

    /// `H(seed)`, fixed for the whole game.
    pub secret_commitment: StateHash,

    /// Declared deck listing (public card data).
    pub listing: DeckListing,
}

impl PlayerState {
    /// Create a player with nothing committed yet.
    pub fn new(id: PlayerId, secret_commitment: StateHash, listing: DeckListing, health: u32) -> Self {
        Self {
            id,
            health,
            commitments: Commitments::default(),
            board: BTreeMap::new(),
            graveyard: Vec::new(),
            secret_commitment,
            listing,
        }
    }

    /// Current hand/deck commitments.
    pub fn commitments(&self) -> &Commitments {
        &self.commitments
    }

    /// Install the roots attested by an accepted proof.
    pub(crate) fn apply_proof(&mut self, accepted: &AcceptedTransition) {
        self.commitments.apply(accepted);
    }

    /// Resolve a creature reference against this player.
    pub fn lookup(&self, id: CreatureId) -> CreatureLookup<'_> {
        if let Some(creature) = self.board.get(&id) {
            return CreatureLookup::Alive(creature);
        }
        match self.graveyard.iter().find(|c| c.id == id) {
            Some(creature) => CreatureLookup::Dead(creature),
            None => CreatureLookup::Missing,
        }
    }

    /// Does this player have anything that could block?
    pub fn has_blockers(&self) -> bool {
        !self.board.is_empty()
    }

    /// Put a creature into play.
    pub fn summon(&mut self, creature: Creature) {
        self.board.insert(creature.id, creature);
    }

    /// Move a creature from the board to the graveyard.
    ///
    /// Returns false if it was not on the board.
    pub fn kill(&mut self, id: CreatureId) -> bool {
        match self.board.remove(&id) {
            Some(mut creature) => {
                creature.alive = false;
                self.graveyard.push(creature);
                true
            }
            None => false,
        }
    }

    /// Apply damage, floored at zero. Returns damage actually dealt.
    pub fn take_damage(&mut self, amount: u32) -> u32 {
        let dealt = amount.min(self.health);
        self.health -= dealt;
        dealt
    }

    /// Hash this player's public state.
    pub fn hash_into(&self, hasher: &mut StateHasher) {
        hasher.update_id(&self.id.0);
        hasher.update_u32(self.health);
        self.commitments.hash_into(hasher);
        hasher.update_u32(self.board.len() as u32);
        for creature in self.board.values() {
            creature.hash_into(hasher);
        }
        hasher.update_u32(self.graveyard.len() as u32);
        for creature in &self.graveyard {
            creature.hash_into(hasher);
        }
        hasher.update_hash(&self.secret_commitment);
        hasher.update_u32(self.listing.len() as u32);
        for def in self.listing.cards() {
            hasher.update_u32(def.id.0);
            hasher.update_u32(def.stats.attack);
            hasher.update_u32(def.stats.defense);
        }
    }
}

// =============================================================================
// GAME STATE
// =============================================================================

/// Lifecycle of a game.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameStatus {
    /// Created; waiting for both players to join with their initial draw.
    WaitingForPlayers,
    /// Both players joined; turns are being played.
    InProgress,
    /// Terminal.
    Finished {
        /// The surviving player.
        winner: PlayerId,
    },
}

/// Complete public state of one match.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Game {
    /// Match identifier.
    pub id: GameId,

    /// Seats in turn order. `players[0]` takes the first turn.
    pub players: [PlayerId; 2],

    /// Seat that must act next (the defender during `Defend`).
    pub current_player_index: usize,

    /// Step the current player is in.
    pub current_step: Step,

    /// Turn counter, bumped whenever the active turn passes over.
    pub turn: u32,

    /// Anchor whose ledger value feeds the next draw.
    pub last_randomness_anchor: RandomnessAnchor,

    /// Creatures declared as attacking; empty outside combat.
    pub attackers: BTreeSet<CreatureId>,

    /// Attacker → defender, populated only while a defense resolves.
    pub pending_defenses: BTreeMap<CreatureId, CreatureId>,

    /// Lifecycle.
    pub status: GameStatus,

    /// Per-seat player state, present once that player joined.
    seats: [Option<PlayerState>; 2],

    /// Next creature id to hand out.
    pub next_creature_id: u32,
}

impl Game {
    /// Create a game waiting for both players.
    pub fn new(id: GameId, players: [PlayerId; 2], anchor: RandomnessAnchor) -> Self {
        Self {
            id,
            players,
            current_player_index: 0,
            current_step: Step::Draw,
            turn: 0,
            last_randomness_anchor: anchor,
            attackers: BTreeSet::new(),
            pending_defenses: BTreeMap::new(),
            status: GameStatus::WaitingForPlayers,
            seats: [None, None],
            next_creature_id: 0,
        }
    }

    /// Player whose move it is.
    pub fn current_player(&self) -> PlayerId {
        self.players[self.current_player_index]
    }

    /// Seat index of a player.
    pub fn seat_of(&self, player: &PlayerId) -> Option<usize> {
        self.players.iter().position(|p| p == player)
    }

    /// Identity in the other seat.
    pub fn opponent_of(&self, player: &PlayerId) -> Option<PlayerId> {
        self.seat_of(player).map(|seat| self.players[1 - seat])
    }

    /// Player state by identity (None until joined).
    pub fn player(&self, id: &PlayerId) -> Option<&PlayerState> {
        self.seat_of(id).and_then(|seat| self.seats[seat].as_ref())
    }

    /// Player state by seat.
    pub fn player_at(&self, seat: usize) -> Option<&PlayerState> {
        self.seats.get(seat).and_then(Option::as_ref)
    }

    /// Mutable player state by seat.
    pub fn player_at_mut(&mut self, seat: usize) -> Option<&mut PlayerState> {
        self.seats.get_mut(seat).and_then(Option::as_mut)
    }

    /// Whether a seat already has a joined player.
    pub fn is_seated(&self, seat: usize) -> bool {
        self.player_at(seat).is_some()
    }

    /// Seat a joined player.
    pub(crate) fn seat(&mut self, seat: usize, state: PlayerState) {
        self.seats[seat] = Some(state);
    }

    /// Both joined players, `first` seat first.
    pub fn pair_mut(&mut self, first: usize) -> Option<(&mut PlayerState, &mut PlayerState)> {
        let [a, b] = &mut self.seats;
        let (first, second) = if first == 0 { (a, b) } else { (b, a) };
        Some((first.as_mut()?, second.as_mut()?))
    }

    /// Hand out the next creature id. `None` once the id space is used up.
    pub fn allocate_creature_id(&mut self) -> Option<CreatureId> {
        let id = CreatureId(self.next_creature_id);
        self.next_creature_id = self.next_creature_id.checked_add(1)?;
        Some(id)
    }

    /// Winner, once finished.
    pub fn winner(&self) -> Option<PlayerId> {
        match self.status {
            GameStatus::Finished { winner } => Some(winner),
            _ => None,
        }
    }

    /// Check if the game has ended.
    pub fn is_finished(&self) -> bool {
        matches!(self.status, GameStatus::Finished { .. })
    }

    /// Compute hash of the public state for verification.
    pub fn compute_hash(&self) -> StateHash {
        let mut hasher = StateHasher::for_game_state();
        hasher.update_id(&self.id.0);
        for player in &self.players {
            hasher.update_id(&player.0);
        }
        hasher.update_u8(self.current_player_index as u8);
        hasher.update_u8(self.current_step as u8);
        hasher.update_u32(self.turn);
        hasher.update_u64(self.last_randomness_anchor.0);

        hasher.update_u32(self.attackers.len() as u32);
        for attacker in &self.attackers {
            hasher.update_u32(attacker.0);
        }
        hasher.update_u32(self.pending_defenses.len() as u32);
        for (attacker, defender) in &self.pending_defenses {
            hasher.update_u32(attacker.0);
            hasher.update_u32(defender.0);
        }

        match self.status {
            GameStatus::WaitingForPlayers => hasher.update_u8(0),
            GameStatus::InProgress => hasher.update_u8(1),
            GameStatus::Finished { winner } => {
                hasher.update_u8(2);
                hasher.update_id(&winner.0);
            }
        }

        for seat in &self.seats {
            match seat {
                Some(player) => {
                    hasher.update_bool(true);
                    player.hash_into(&mut hasher);
                }
                None => hasher.update_bool(false),
            }
        }
        hasher.update_u32(self.next_creature_id);
        hasher.finalize()
    }
}

// =============================================================================
// TESTS
// =============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    fn player(byte: u8) -> PlayerState {
        PlayerState::new(PlayerId::new([byte; 16]), [byte; 32], DeckListing::default(), 20)
    }

    #[test]
    fn test_player_id_ordering() {
        let id1 = PlayerId::new([0; 16]);
        let id2 = PlayerId::new([1; 16]);
        let id3 = PlayerId::new([0, 1, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0, 0]);

        assert!(id1 < id2);
        assert!(id1 < id3);
        assert!(id3 < id2);
    }

    #[test]
    fn test_player_id_uuid_roundtrip() {
        let s = "67e55044-10b1-426f-9247-bb680e5fe0c8";
        let id = PlayerId::from_uuid_str(s).unwrap();
        assert_eq!(id.to_uuid_string(), s);
        assert!(PlayerId::from_uuid_str("not-a-uuid").is_none());
    }

    #[test]
    fn test_kill_moves_to_graveyard() {
        let mut p = player(1);
        let id = CreatureId(4);
        p.summon(Creature::new(id, CardId(9), CardStats::new(2, 2)));
        assert!(matches!(p.lookup(id), CreatureLookup::Alive(_)));

        assert!(p.kill(id));
        assert!(!p.kill(id));
        assert!(p.board.is_empty());
        assert_eq!(p.graveyard.len(), 1);
        assert!(!p.graveyard[0].alive);
        assert!(matches!(p.lookup(id), CreatureLookup::Dead(_)));
        assert_eq!(p.lookup(CreatureId(99)), CreatureLookup::Missing);
    }

    #[test]
    fn test_damage_floors_at_zero() {
        let mut p = player(1);
        assert_eq!(p.take_damage(7), 7);
        assert_eq!(p.health, 13);
        assert_eq!(p.take_damage(50), 13);
        assert_eq!(p.health, 0);
    }

    #[test]
    fn test_pair_mut_orders_seats() {
        let mut game = Game::new(
            GameId::new([0; 16]),
            [PlayerId::new([1; 16]), PlayerId::new([2; 16])],
            RandomnessAnchor(0),
        );
        assert!(game.pair_mut(0).is_none());

        game.seat(0, player(1));
        game.seat(1, player(2));

        let (first, second) = game.pair_mut(1).unwrap();
        assert_eq!(first.id, PlayerId::new([2; 16]));
        assert_eq!(second.id, PlayerId::new([1; 16]));
    }

    #[test]
    fn test_opponent_lookup() {
        let a = PlayerId::new([1; 16]);
        let b = PlayerId::new([2; 16]);
        let game = Game::new(GameId::new([0; 16]), [a, b], RandomnessAnchor(0));

        assert_eq!(game.opponent_of(&a), Some(b));
        assert_eq!(game.opponent_of(&b), Some(a));
        assert_eq!(game.opponent_of(&PlayerId::new([3; 16])), None);
        assert_eq!(game.current_player(), a);
    }

    #[test]
    fn test_creature_ids_run_out_without_overflow() {
        let mut game = Game::new(
            GameId::new([0; 16]),
            [PlayerId::new([1; 16]), PlayerId::new([2; 16])],
            RandomnessAnchor(0),
        );
        assert_eq!(game.allocate_creature_id(), Some(CreatureId(0)));
        assert_eq!(game.allocate_creature_id(), Some(CreatureId(1)));

        game.next_creature_id = u32::MAX - 1;
        assert_eq!(game.allocate_creature_id(), Some(CreatureId(u32::MAX - 1)));
        assert_eq!(game.allocate_creature_id(), None);
        assert_eq!(game.next_creature_id, u32::MAX);
    }

    #[test]
    fn test_game_hash_determinism() {
        let make = || {
            let mut game = Game::new(
                GameId::new([7; 16]),
                [PlayerId::new([1; 16]), PlayerId::new([2; 16])],
                RandomnessAnchor(3),
            );
            game.seat(0, player(1));
            game
        };

        assert_eq!(make().compute_hash(), make().compute_hash());

        let mut changed = make();
        changed.turn = 1;
        assert_ne!(make().compute_hash(), changed.compute_hash());
    }
}
