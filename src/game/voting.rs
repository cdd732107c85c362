//! Weighted voting sessions.
//!
//! A `VotingSession` is a short-lived tally independent of the `Game`
//! aggregate: the flow layer opens one per decision (day lynch, trial), feeds
//! it ballots, and closes it for a result. A sheriff's double vote enters as
//! weight 2; everyone else casts weight 1.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::types::{GameError, PlayerId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteType {
    DayLynch,
    Trial,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum VoteStatus {
    Open,
    Closed,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Vote {
    pub target: PlayerId,
    pub weight: u32,
    pub cast_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VoteResult {
    pub winner: Option<PlayerId>,
    pub is_tie: bool,
    pub tied_players: Vec<PlayerId>,
    pub tally: HashMap<PlayerId, u32>,
    pub abstained: Vec<PlayerId>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct VotingSession {
    pub vote_type: VoteType,
    pub status: VoteStatus,
    eligible_voters: Vec<PlayerId>,
    valid_targets: Vec<PlayerId>,
    votes: HashMap<PlayerId, Vote>,
    pub opened_at: DateTime<Utc>,
}

impl VotingSession {
    pub fn new(
        vote_type: VoteType,
        eligible_voters: Vec<PlayerId>,
        valid_targets: Vec<PlayerId>,
    ) -> Self {
        Self {
            vote_type,
            status: VoteStatus::Open,
            eligible_voters,
            valid_targets,
            votes: HashMap::new(),
            opened_at: Utc::now(),
        }
    }

    pub fn is_open(&self) -> bool {
        self.status == VoteStatus::Open
    }

    pub fn eligible_voters(&self) -> &[PlayerId] {
        &self.eligible_voters
    }

    pub fn votes_cast(&self) -> usize {
        self.votes.len()
    }

    pub fn all_votes_in(&self) -> bool {
        self.votes.len() == self.eligible_voters.len()
    }

    /// Records a ballot. Re-voting replaces the voter's previous ballot.
    pub fn cast_vote(
        &mut self,
        voter: PlayerId,
        target: PlayerId,
        weight: u32,
    ) -> Result<(), GameError> {
        if !self.is_open() {
            return Err(GameError::VotingInactive);
        }
        if !self.eligible_voters.contains(&voter) {
            return Err(GameError::IneligibleVoter);
        }
        if !self.valid_targets.contains(&target) {
            return Err(GameError::InvalidVoteTarget);
        }
        self.votes.insert(voter, Vote { target, weight, cast_at: Utc::now() });
        Ok(())
    }

    pub fn tally(&self) -> HashMap<PlayerId, u32> {
        let mut counts: HashMap<PlayerId, u32> = HashMap::new();
        for vote in self.votes.values() {
            *counts.entry(vote.target).or_insert(0) += vote.weight;
        }
        counts
    }

    /// Closes the session. The winner is the unique weighted maximum; a
    /// shared maximum reports a tie with no winner.
    pub fn close(&mut self) -> VoteResult {
        self.status = VoteStatus::Closed;

        let tally = self.tally();
        let abstained: Vec<PlayerId> = self
            .eligible_voters
            .iter()
            .copied()
            .filter(|v| !self.votes.contains_key(v))
            .collect();

        let Some(max) = tally.values().copied().max() else {
            return VoteResult {
                winner: None,
                is_tie: false,
                tied_players: Vec::new(),
                tally,
                abstained,
            };
        };
        let mut leaders: Vec<PlayerId> =
            tally.iter().filter(|(_, w)| **w == max).map(|(p, _)| *p).collect();
        leaders.sort();

        if leaders.len() == 1 {
            VoteResult {
                winner: Some(leaders[0]),
                is_tie: false,
                tied_players: Vec::new(),
                tally,
                abstained,
            }
        } else {
            VoteResult { winner: None, is_tie: true, tied_players: leaders, tally, abstained }
        }
    }
}
