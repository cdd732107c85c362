use serde::{Deserialize, Serialize};
use thiserror::Error;
use uuid::Uuid;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)] // Serialize directly as the inner UUID string
pub struct PlayerId(Uuid);

impl PlayerId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for PlayerId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GameId(Uuid);

impl GameId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for GameId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for GameId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        self.0.fmt(f)
    }
}

/// Coarse lifecycle status persisted on the aggregate. The finer sub-phases
/// (voting, trial, execution) live in the in-memory `PhaseController`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GameStatus {
    Waiting,
    Started,
    Night,
    Day,
    Paused,
    Finished,
}

/// Bare role name, used for vision results, summaries and counting.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Villager,
    Seer,
    Sheriff,
    Hunter,
    Witch,
    WildChild,
    Cupid,
    Werewolf,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::Villager => "villager",
            Role::Seer => "seer",
            Role::Sheriff => "sheriff",
            Role::Hunter => "hunter",
            Role::Witch => "witch",
            Role::WildChild => "wild_child",
            Role::Cupid => "cupid",
            Role::Werewolf => "werewolf",
        }
    }
}

/// Role-specific state, one variant per role so illegal field combinations
/// are unrepresentable (a Villager cannot hold a poison potion).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "role", rename_all = "snake_case")]
pub enum RoleCard {
    Villager,
    Seer {
        has_used_vision_tonight: bool,
    },
    Sheriff {
        has_double_vote: bool,
        can_break_ties: bool,
        successor_id: Option<PlayerId>,
    },
    Hunter {
        can_revenge_kill: bool,
        has_used_revenge: bool,
    },
    Witch {
        has_healing_potion: bool,
        has_poison_potion: bool,
    },
    WildChild {
        model_player_id: Option<PlayerId>,
        has_transformed: bool,
    },
    Cupid {
        has_chosen_lovers: bool,
    },
    Werewolf,
}

impl RoleCard {
    /// Fresh card for a newly dealt role, abilities fully charged.
    pub fn fresh(role: Role) -> Self {
        match role {
            Role::Villager => RoleCard::Villager,
            Role::Seer => RoleCard::Seer { has_used_vision_tonight: false },
            Role::Sheriff => RoleCard::Sheriff {
                has_double_vote: true,
                can_break_ties: true,
                successor_id: None,
            },
            Role::Hunter => RoleCard::Hunter { can_revenge_kill: true, has_used_revenge: false },
            Role::Witch => RoleCard::Witch { has_healing_potion: true, has_poison_potion: true },
            Role::WildChild => RoleCard::WildChild { model_player_id: None, has_transformed: false },
            Role::Cupid => RoleCard::Cupid { has_chosen_lovers: false },
            Role::Werewolf => RoleCard::Werewolf,
        }
    }

    pub fn role(&self) -> Role {
        match self {
            RoleCard::Villager => Role::Villager,
            RoleCard::Seer { .. } => Role::Seer,
            RoleCard::Sheriff { .. } => Role::Sheriff,
            RoleCard::Hunter { .. } => Role::Hunter,
            RoleCard::Witch { .. } => Role::Witch,
            RoleCard::WildChild { .. } => Role::WildChild,
            RoleCard::Cupid { .. } => Role::Cupid,
            RoleCard::Werewolf => Role::Werewolf,
        }
    }
}

/// Per-player state. Death is a flag, never removal: dead players retain
/// revenge, succession and lover linkage.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RoleState {
    #[serde(flatten)]
    pub card: RoleCard,
    pub is_alive: bool,
    pub is_revealed: bool,
    pub is_lover: bool,
    pub lover_partner_id: Option<PlayerId>,
    pub has_acted_tonight: bool,
    pub target_player_id: Option<PlayerId>,
}

impl RoleState {
    pub fn new(role: Role) -> Self {
        Self {
            card: RoleCard::fresh(role),
            is_alive: true,
            is_revealed: false,
            is_lover: false,
            lover_partner_id: None,
            has_acted_tonight: false,
            target_player_id: None,
        }
    }

    pub fn role(&self) -> Role {
        self.card.role()
    }
}

/// Kind of recorded night action; the actor->target maps under each kind are
/// cleared at the start of every night.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NightActionKind {
    WerewolfAttack,
    WitchHeal,
    WitchPoison,
}

#[derive(Debug, Clone, PartialEq, Error)]
pub enum GameError {
    #[error("action not allowed in the current phase")]
    WrongPhase,
    #[error("player {0} is not part of this game")]
    PlayerNotFound(PlayerId),
    #[error("player {0} is dead")]
    PlayerDead(PlayerId),
    #[error("player {0} does not hold the required role")]
    RoleMismatch(PlayerId),
    #[error("player {0} has already acted tonight")]
    AlreadyActed(PlayerId),
    #[error("target {0} is not part of this game")]
    TargetNotFound(PlayerId),
    #[error("target {0} is dead")]
    TargetDead(PlayerId),
    #[error("cannot target yourself")]
    SelfTarget,
    #[error("werewolves cannot attack each other")]
    WerewolfTarget,
    #[error("players cannot vote for themselves")]
    SelfVote,
    #[error("only the werewolves' chosen victim can be healed")]
    NotConsensusVictim,
    #[error("that potion has already been used")]
    PotionSpent,
    #[error("the hunter's revenge triggers only after death")]
    HunterStillAlive,
    #[error("revenge has already been taken")]
    RevengeSpent,
    #[error("no tied vote to break")]
    NoTieToBreak,
    #[error("target is not among the tied players")]
    TargetNotTied,
    #[error("lovers can only be chosen on the first night")]
    NotFirstNight,
    #[error("lovers have already been chosen")]
    LoversAlreadyChosen,
    #[error("a model has already been chosen")]
    ModelAlreadyChosen,
    #[error("game is full")]
    GameFull,
    #[error("game is not joinable in its current state")]
    NotJoinable,
    #[error("a game needs between {min} and {max} players, got {got}")]
    BadPlayerCount { min: usize, max: usize, got: usize },
    #[error("only the game creator may do that")]
    NotCreator,
    #[error("invalid phase transition from {from} to {to}")]
    InvalidTransition { from: &'static str, to: &'static str },
    #[error("game state is corrupt: player {0} has a role but is not seated")]
    CorruptState(PlayerId),
    #[error("voting session is not active")]
    VotingInactive,
    #[error("voter is not eligible in this voting session")]
    IneligibleVoter,
    #[error("target is not a valid option in this voting session")]
    InvalidVoteTarget,
}
