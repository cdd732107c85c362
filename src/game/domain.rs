use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::dealer::RoleDealer;
use super::types::{
    GameError, GameId, GameStatus, NightActionKind, PlayerId, Role, RoleCard, RoleState,
};

pub const MIN_PLAYERS: usize = 10;
pub const MAX_PLAYERS: usize = 18;

/// The special roles dealt one each, in priority order, while at least one
/// villager seat remains.
const SPECIAL_ROLES: [Role; 6] = [
    Role::Seer,
    Role::Witch,
    Role::Hunter,
    Role::Cupid,
    Role::WildChild,
    Role::Sheriff,
];

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Game {
    id: GameId,
    name: String,
    creator_id: PlayerId,
    max_players: u8,
    status: GameStatus,
    players: Vec<PlayerId>,
    roles: HashMap<PlayerId, RoleState>,
    current_round: u32,
    night_actions: HashMap<NightActionKind, HashMap<PlayerId, PlayerId>>,
    day_votes: HashMap<PlayerId, PlayerId>,
    created_at: DateTime<Utc>,
}

impl Game {
    #[tracing::instrument(skip(name))]
    pub fn new(name: impl Into<String>, creator_id: PlayerId, max_players: u8) -> Self {
        Self {
            id: GameId::new(),
            name: name.into(),
            creator_id,
            max_players: max_players.clamp(4, 24),
            status: GameStatus::Waiting,
            players: vec![creator_id],
            roles: HashMap::new(),
            current_round: 0,
            night_actions: HashMap::new(),
            day_votes: HashMap::new(),
            created_at: Utc::now(),
        }
    }

    // Getters
    pub fn get_id(&self) -> GameId {
        self.id
    }

    pub fn get_name(&self) -> &str {
        &self.name
    }

    pub fn get_creator(&self) -> PlayerId {
        self.creator_id
    }

    pub fn get_status(&self) -> GameStatus {
        self.status
    }

    pub fn get_players(&self) -> &[PlayerId] {
        &self.players
    }

    pub fn get_round(&self) -> u32 {
        self.current_round
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn role_of(&self, player_id: PlayerId) -> Option<&RoleState> {
        self.roles.get(&player_id)
    }

    pub fn role_of_mut(&mut self, player_id: PlayerId) -> Option<&mut RoleState> {
        self.roles.get_mut(&player_id)
    }

    pub fn roles(&self) -> &HashMap<PlayerId, RoleState> {
        &self.roles
    }

    pub fn day_votes(&self) -> &HashMap<PlayerId, PlayerId> {
        &self.day_votes
    }

    pub fn night_actions(&self, kind: NightActionKind) -> Option<&HashMap<PlayerId, PlayerId>> {
        self.night_actions.get(&kind)
    }

    pub fn is_alive(&self, player_id: PlayerId) -> bool {
        self.roles.get(&player_id).map(|r| r.is_alive).unwrap_or(false)
    }

    pub fn living_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .copied()
            .filter(|p| self.is_alive(*p))
            .collect()
    }

    pub fn dead_players(&self) -> Vec<PlayerId> {
        self.players
            .iter()
            .copied()
            .filter(|p| self.roles.contains_key(p) && !self.is_alive(*p))
            .collect()
    }

    pub fn living_with_role(&self, role: Role) -> Vec<PlayerId> {
        self.players
            .iter()
            .copied()
            .filter(|p| {
                self.roles
                    .get(p)
                    .map(|r| r.is_alive && r.role() == role)
                    .unwrap_or(false)
            })
            .collect()
    }

    /// Once roles are dealt, every seated player must have exactly one role
    /// entry and vice versa. Violation is fatal for this game instance.
    pub fn check_integrity(&self) -> Result<(), GameError> {
        if self.roles.is_empty() {
            return Ok(());
        }
        for player_id in &self.players {
            if !self.roles.contains_key(player_id) {
                return Err(GameError::CorruptState(*player_id));
            }
        }
        for player_id in self.roles.keys() {
            if !self.players.contains(player_id) {
                return Err(GameError::CorruptState(*player_id));
            }
        }
        Ok(())
    }

    //  --- Lobby mutators ---

    #[tracing::instrument(skip(self))]
    pub fn join(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::NotJoinable);
        }
        if self.players.contains(&player_id) {
            return Ok(()); // idempotent re-join of the lobby
        }
        if self.players.len() >= self.max_players as usize {
            return Err(GameError::GameFull);
        }
        self.players.push(player_id);
        Ok(())
    }

    #[tracing::instrument(skip(self))]
    pub fn leave(&mut self, player_id: PlayerId) -> Result<(), GameError> {
        if self.status != GameStatus::Waiting {
            return Err(GameError::NotJoinable);
        }
        self.players.retain(|p| *p != player_id);
        Ok(())
    }

    /// Deal roles to all seated players and move the game to Started.
    ///
    /// Werewolves are one third of the table (at least one); the special
    /// roles are dealt one each while a villager seat remains; everyone else
    /// is a plain villager.
    #[tracing::instrument(skip(self, dealer))]
    pub fn assign_roles(
        &mut self,
        caller: PlayerId,
        dealer: &mut impl RoleDealer,
    ) -> Result<(), GameError> {
        if caller != self.creator_id {
            return Err(GameError::NotCreator);
        }
        if self.status != GameStatus::Waiting {
            return Err(GameError::WrongPhase);
        }
        let n = self.players.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
            return Err(GameError::BadPlayerCount { min: MIN_PLAYERS, max: MAX_PLAYERS, got: n });
        }

        let num_werewolves = std::cmp::max(1, n / 3);
        let mut deck: Vec<Role> = vec![Role::Werewolf; num_werewolves];

        let mut remaining = n - num_werewolves;
        for role in SPECIAL_ROLES {
            if remaining > 1 {
                deck.push(role);
                remaining -= 1;
            } else {
                break;
            }
        }
        while deck.len() < n {
            deck.push(Role::Villager);
        }

        dealer.shuffle(&mut deck);

        self.roles = self
            .players
            .iter()
            .zip(deck)
            .map(|(player_id, role)| (*player_id, RoleState::new(role)))
            .collect();

        self.status = GameStatus::Started;
        self.current_round = 1;
        Ok(())
    }

    //  --- Phase bookkeeping, used by the resolution engine ---

    pub fn set_status(&mut self, status: GameStatus) {
        self.status = status;
    }

    /// Clear per-night bookkeeping on every role and start a fresh night.
    pub fn begin_night(&mut self) {
        self.status = GameStatus::Night;
        self.night_actions.clear();
        for role in self.roles.values_mut() {
            role.has_acted_tonight = false;
            role.target_player_id = None;
            if let RoleCard::Seer { has_used_vision_tonight } = &mut role.card {
                *has_used_vision_tonight = false;
            }
        }
    }

    pub fn begin_day(&mut self) {
        self.status = GameStatus::Day;
        self.day_votes.clear();
    }

    pub fn next_round(&mut self) {
        self.current_round += 1;
    }

    pub fn record_night_action(
        &mut self,
        kind: NightActionKind,
        actor: PlayerId,
        target: PlayerId,
    ) {
        self.night_actions.entry(kind).or_default().insert(actor, target);
    }

    pub fn record_day_vote(&mut self, voter: PlayerId, target: PlayerId) {
        self.day_votes.insert(voter, target);
    }

    pub fn clear_day_votes(&mut self) {
        self.day_votes.clear();
    }

    /// Death also reveals the card; the village always learns what it lost.
    pub fn kill(&mut self, player_id: PlayerId) -> bool {
        match self.roles.get_mut(&player_id) {
            Some(role) if role.is_alive => {
                role.is_alive = false;
                role.is_revealed = true;
                true
            }
            _ => false,
        }
    }
}
