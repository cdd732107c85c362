use super::types::Role;

pub trait RoleDealer {
    /// Shuffle the deck of roles before it is dealt out seat by seat.
    fn shuffle(&mut self, roles: &mut Vec<Role>);
}

pub struct ThreadRngDealer {
    rng: rand::rngs::ThreadRng,
}

impl ThreadRngDealer {
    pub fn new() -> Self {
        Self { rng: rand::rng() }
    }
}

impl Default for ThreadRngDealer {
    fn default() -> Self {
        Self::new()
    }
}

impl RoleDealer for ThreadRngDealer {
    fn shuffle(&mut self, roles: &mut Vec<Role>) {
        use rand::seq::SliceRandom;
        roles.shuffle(&mut self.rng);
    }
}

/// Deals roles in deck order, so tests can pin who gets what.
pub struct FixedDealer;

impl RoleDealer for FixedDealer {
    fn shuffle(&mut self, _roles: &mut Vec<Role>) {}
}
