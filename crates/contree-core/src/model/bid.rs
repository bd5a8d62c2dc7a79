use crate::error::ContreeError;
use crate::model::contract::Contract;
use crate::model::player::PlayerPosition;
use crate::model::score::CAPOT_BASE_POINTS;
use crate::model::strain::Strain;
use core::fmt;
use serde::{Deserialize, Serialize};
use thiserror::Error;

pub const MIN_CONTRACT_POINTS: u16 = 80;
pub const MAX_CONTRACT_POINTS: u16 = 160;
pub const CONTRACT_STEP: u16 = 10;

/// Target of a contract. Every numeric value ranks below `AllTricks`.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize,
)]
pub enum ContractValue {
    Points(u16),
    AllTricks,
}

impl ContractValue {
    pub fn points(value: u16) -> Result<Self, ContreeError> {
        let in_range = (MIN_CONTRACT_POINTS..=MAX_CONTRACT_POINTS).contains(&value);
        if !in_range || value % CONTRACT_STEP != 0 {
            return Err(ContreeError::InvalidContractParameters {
                message: format!(
                    "value {value} is not one of {MIN_CONTRACT_POINTS}..={MAX_CONTRACT_POINTS} in steps of {CONTRACT_STEP}"
                ),
            });
        }
        Ok(ContractValue::Points(value))
    }

    /// Every biddable value, lowest first.
    pub fn ladder() -> impl Iterator<Item = ContractValue> {
        (MIN_CONTRACT_POINTS..=MAX_CONTRACT_POINTS)
            .step_by(CONTRACT_STEP as usize)
            .map(ContractValue::Points)
            .chain(std::iter::once(ContractValue::AllTricks))
    }

    pub fn base_points(self) -> u32 {
        match self {
            ContractValue::Points(value) => u32::from(value),
            ContractValue::AllTricks => CAPOT_BASE_POINTS,
        }
    }
}

impl fmt::Display for ContractValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ContractValue::Points(value) => write!(f, "{value}"),
            ContractValue::AllTricks => f.write_str("Capot"),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ContractBid {
    pub value: ContractValue,
    pub strain: Strain,
}

impl ContractBid {
    pub fn new(points: u16, strain: Strain) -> Result<Self, ContreeError> {
        Ok(Self {
            value: ContractValue::points(points)?,
            strain,
        })
    }

    pub const fn capot(strain: Strain) -> Self {
        Self {
            value: ContractValue::AllTricks,
            strain,
        }
    }

    pub fn base_points(self) -> u32 {
        self.value.base_points()
    }
}

impl fmt::Display for ContractBid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.value, self.strain)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Call {
    Pass,
    Contract(ContractBid),
    Double,
    Redouble,
}

impl Call {
    pub fn is_pass(self) -> bool {
        matches!(self, Call::Pass)
    }
}

impl fmt::Display for Call {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Call::Pass => f.write_str("Pass"),
            Call::Contract(bid) => write!(f, "{bid}"),
            Call::Double => f.write_str("Double"),
            Call::Redouble => f.write_str("Redouble"),
        }
    }
}

/// A call together with the seat that made it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Bid {
    pub player: PlayerPosition,
    pub call: Call,
}

impl Bid {
    pub const fn new(player: PlayerPosition, call: Call) -> Self {
        Self { player, call }
    }

    pub const fn pass(player: PlayerPosition) -> Self {
        Self::new(player, Call::Pass)
    }

    /// Whether this bid may follow `history` (oldest first).
    pub fn is_valid_after(&self, history: &[Bid]) -> bool {
        match self.call {
            Call::Pass => true,
            Call::Contract(candidate) => last_contract(history)
                .is_none_or(|(_, previous)| candidate.value > previous.value),
            Call::Double => {
                let Some(idx) = last_contract_index(history) else {
                    return false;
                };
                let contractor = history[idx].player;
                let since = &history[idx + 1..];
                contractor.team() != self.player.team()
                    && since.iter().all(|bid| {
                        !matches!(bid.call, Call::Pass | Call::Double | Call::Redouble)
                    })
            }
            Call::Redouble => {
                let Some(contract_idx) = last_contract_index(history) else {
                    return false;
                };
                let contractor = history[contract_idx].player;
                let after_contract = &history[contract_idx + 1..];
                let Some(double_idx) = after_contract
                    .iter()
                    .rposition(|bid| matches!(bid.call, Call::Double))
                else {
                    return false;
                };
                contractor.team() == self.player.team()
                    && after_contract[double_idx + 1..]
                        .iter()
                        .all(|bid| !matches!(bid.call, Call::Pass | Call::Redouble))
            }
        }
    }
}

impl fmt::Display for Bid {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}: {}", self.player, self.call)
    }
}

fn last_contract_index(history: &[Bid]) -> Option<usize> {
    history
        .iter()
        .rposition(|bid| matches!(bid.call, Call::Contract(_)))
}

/// The most recent contract bid and its author.
pub fn last_contract(history: &[Bid]) -> Option<(PlayerPosition, ContractBid)> {
    history.iter().rev().find_map(|bid| match bid.call {
        Call::Contract(contract) => Some((bid.player, contract)),
        _ => None,
    })
}

/// Whether the most recent contract has been doubled.
pub fn has_double(history: &[Bid]) -> bool {
    since_last_contract(history).any(|bid| matches!(bid.call, Call::Double))
}

/// Whether the most recent contract has been redoubled.
pub fn has_redouble(history: &[Bid]) -> bool {
    since_last_contract(history).any(|bid| matches!(bid.call, Call::Redouble))
}

pub fn trailing_passes(history: &[Bid]) -> usize {
    history
        .iter()
        .rev()
        .take_while(|bid| bid.call.is_pass())
        .count()
}

fn since_last_contract(history: &[Bid]) -> impl Iterator<Item = &Bid> {
    let start = last_contract_index(history).map_or(history.len(), |idx| idx + 1);
    history[start..].iter()
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum BidError {
    #[error("the auction is already closed")]
    AuctionClosed,
    #[error("bidding is not open in this phase")]
    NotInBiddingPhase,
    #[error("expected {expected} to bid next but got {actual}")]
    OutOfTurn {
        expected: PlayerPosition,
        actual: PlayerPosition,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AuctionOutcome {
    Contract(Contract),
    /// Four opening passes: the hands go back and the deal is replayed.
    Redeal,
}

/// Accepted bids of one round, oldest first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Auction {
    bids: Vec<Bid>,
}

impl Auction {
    pub fn new() -> Self {
        Self {
            bids: Vec::with_capacity(8),
        }
    }

    pub fn bids(&self) -> &[Bid] {
        &self.bids
    }

    /// Records a bid, substituting Pass for one that breaks the rules.
    /// Returns the bid actually recorded.
    pub fn submit(&mut self, bid: Bid) -> Result<Bid, BidError> {
        if self.is_finished() {
            return Err(BidError::AuctionClosed);
        }
        let accepted = if bid.is_valid_after(&self.bids) {
            bid
        } else {
            tracing::warn!(
                target: "contree_core::bidding",
                seat = ?bid.player,
                offered = %bid.call,
                reason = "invalid_call",
                message = "forcing pass"
            );
            Bid::pass(bid.player)
        };
        tracing::debug!(
            target: "contree_core::bidding",
            seat = ?accepted.player,
            call = %accepted.call,
            "bid accepted"
        );
        self.bids.push(accepted);
        Ok(accepted)
    }

    pub fn is_finished(&self) -> bool {
        let opening_passes =
            self.bids.len() >= 4 && self.bids[..4].iter().all(|bid| bid.call.is_pass());
        let has_call = self.bids.iter().any(|bid| !bid.call.is_pass());
        opening_passes || (has_call && trailing_passes(&self.bids) >= 3)
    }

    /// The result of a finished auction, `None` while bidding continues.
    pub fn outcome(&self) -> Option<AuctionOutcome> {
        if !self.is_finished() {
            return None;
        }
        match last_contract(&self.bids) {
            Some((player, bid)) => Some(AuctionOutcome::Contract(Contract::new(
                bid,
                player,
                has_double(&self.bids),
                has_redouble(&self.bids),
            ))),
            None => Some(AuctionOutcome::Redeal),
        }
    }
}
