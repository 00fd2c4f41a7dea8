//! # Parties and Per-Side Values
//!
//! A request has two active sides. `Party::None` is the third slot: it
//! marks a tie or a refusal to arbitrate, and it is never a valid side to
//! fund.

use serde::{Deserialize, Serialize};

/// Number of ruling options a registry dispute offers (Requester, Challenger).
pub const RULING_OPTIONS: u32 = 2;

/// A side of a request, or the absence of a winner.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
pub enum Party {
    /// No side: tie, quorum failure, or refusal to arbitrate.
    #[default]
    None,
    /// The party that requested the status change.
    Requester,
    /// The party that challenged the request.
    Challenger,
}

impl Party {
    /// The two sides that can be funded.
    pub const SIDES: [Party; 2] = [Party::Requester, Party::Challenger];

    /// Map an arbitrator ruling to a party (`1 = Requester`, `2 = Challenger`,
    /// `0 = None`). Values above [`RULING_OPTIONS`] are invalid.
    pub fn from_ruling(ruling: u32) -> Option<Self> {
        match ruling {
            0 => Some(Self::None),
            1 => Some(Self::Requester),
            2 => Some(Self::Challenger),
            _ => None,
        }
    }

    /// Map a winning vote choice to a party. Any choice other than 1 or 2
    /// resolves to `None`.
    pub fn from_choice(choice: u32) -> Self {
        Self::from_ruling(choice).unwrap_or(Self::None)
    }

    /// The ruling number passed to [`Arbitrable::rule`](crate::Arbitrable::rule).
    pub fn as_ruling(&self) -> u32 {
        match self {
            Self::None => 0,
            Self::Requester => 1,
            Self::Challenger => 2,
        }
    }

    /// Whether this party can hold stake (Requester or Challenger).
    pub fn is_side(&self) -> bool {
        !matches!(self, Self::None)
    }

    /// The opposing side. `None` has no opponent.
    pub fn opponent(&self) -> Self {
        match self {
            Self::None => Self::None,
            Self::Requester => Self::Challenger,
            Self::Challenger => Self::Requester,
        }
    }

    fn slot(&self) -> usize {
        self.as_ruling() as usize
    }
}

impl std::fmt::Display for Party {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(match self {
            Self::None => "NONE",
            Self::Requester => "REQUESTER",
            Self::Challenger => "CHALLENGER",
        })
    }
}

/// A value per party slot (`[none, requester, challenger]`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Sides<T>(pub [T; 3]);

impl<T> Sides<T> {
    /// Build from explicit requester/challenger values.
    pub fn new(none: T, requester: T, challenger: T) -> Self {
        Self([none, requester, challenger])
    }

    /// Iterate `(party, value)` over the two fundable sides.
    pub fn sides(&self) -> impl Iterator<Item = (Party, &T)> {
        Party::SIDES.into_iter().map(move |p| (p, &self[p]))
    }
}

impl<T> std::ops::Index<Party> for Sides<T> {
    type Output = T;

    fn index(&self, party: Party) -> &T {
        &self.0[party.slot()]
    }
}

impl<T> std::ops::IndexMut<Party> for Sides<T> {
    fn index_mut(&mut self, party: Party) -> &mut T {
        &mut self.0[party.slot()]
    }
}
