//! Single-player blackjack.
//!
//! Shuffling is an effect: the reducer only ever sees decks handed to it by
//! the `shuffleDeck` command handler, so every transition stays a pure
//! function of the message and the previous state.

mod cards;
mod view;

use std::collections::HashSet;

use rand::seq::SliceRandom;

use crate::error::ReduceError;
use crate::executor::{CommandRegistry, RegistryError};
use crate::message::{Command, Message, Payload};
use crate::mvi::{AppState, Intent, Reducer, Transition};

pub use cards::{hand_value, standard_deck, Card, Rank, Suit};

pub const SHUFFLE_DECK: &str = "shuffleDeck";
pub const DECK_SHUFFLED: &str = "DeckShuffled";
pub const STARTING_BALANCE: u32 = 1000;
pub const BET_AMOUNTS: [u32; 3] = [10, 25, 50];

const DEALER_STANDS_AT: u32 = 17;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Phase {
    Initial,
    PlayerTurn,
    DealerTurn,
    GameOver,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Outcome {
    PlayerBust,
    DealerBust,
    PlayerWins,
    DealerWins,
    Push,
}

impl Outcome {
    /// Amount returned to the player for a settled `bet`.
    pub fn payout(self, bet: u32) -> u32 {
        match self {
            Outcome::DealerBust | Outcome::PlayerWins => bet * 2,
            Outcome::Push => bet,
            Outcome::PlayerBust | Outcome::DealerWins => 0,
        }
    }

    pub fn describe(self) -> &'static str {
        match self {
            Outcome::PlayerBust => "Bust! Dealer wins.",
            Outcome::DealerBust => "Dealer busts! You win.",
            Outcome::PlayerWins => "You win!",
            Outcome::DealerWins => "Dealer wins.",
            Outcome::Push => "Push.",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BlackjackState {
    pub deck: Vec<Card>,
    pub player_hand: Vec<Card>,
    pub dealer_hand: Vec<Card>,
    pub phase: Phase,
    pub bet: u32,
    pub balance: u32,
    pub outcome: Option<Outcome>,
    /// Set once a `DeckShuffled` message has replaced the deck for this round.
    pub shuffled: bool,
}

impl AppState for BlackjackState {}

impl BlackjackState {
    /// Fresh table with an unshuffled deck. Dealing waits for a shuffle.
    pub fn new(balance: u32) -> Self {
        Self {
            shuffled: false,
            ..Self::with_deck(balance, standard_deck())
        }
    }

    /// Table with a deck that is already in playing order.
    pub fn with_deck(balance: u32, deck: Vec<Card>) -> Self {
        Self {
            deck,
            player_hand: Vec::new(),
            dealer_hand: Vec::new(),
            phase: Phase::Initial,
            bet: 0,
            balance,
            outcome: None,
            shuffled: true,
        }
    }

    /// Whether `Deal` would start a round right now.
    pub fn can_deal(&self) -> bool {
        self.phase == Phase::Initial && self.shuffled && self.bet > 0 && self.bet <= self.balance
    }

    pub fn player_value(&self) -> u32 {
        hand_value(&self.player_hand)
    }

    pub fn dealer_value(&self) -> u32 {
        hand_value(&self.dealer_hand)
    }

    fn draw(&mut self) -> Result<Card, ReduceError> {
        self.deck
            .pop()
            .ok_or_else(|| ReduceError::Rejected("deck is exhausted".to_string()))
    }

    /// Decide the round and pay out. Called exactly once per round.
    fn settle(mut self) -> Self {
        let player = self.player_value();
        let dealer = self.dealer_value();
        let outcome = if player > 21 {
            Outcome::PlayerBust
        } else if dealer > 21 {
            Outcome::DealerBust
        } else if player > dealer {
            Outcome::PlayerWins
        } else if player < dealer {
            Outcome::DealerWins
        } else {
            Outcome::Push
        };
        self.balance += outcome.payout(self.bet);
        self.outcome = Some(outcome);
        self.phase = Phase::GameOver;
        self
    }
}

pub enum BlackjackIntent {
    PlaceBet(u32),
    Deal,
    Hit,
    Stand,
    Restart,
    DeckShuffled(Vec<Card>),
}

impl Intent for BlackjackIntent {
    fn from_message(message: &Message) -> Result<Option<Self>, ReduceError> {
        let action = message.action.as_str();
        let intent = match action {
            "PlaceBet" => {
                let amount = message
                    .value
                    .as_ref()
                    .ok_or_else(|| ReduceError::MissingValue {
                        action: action.to_string(),
                    })?
                    .to_i64()
                    .ok_or_else(|| {
                        ReduceError::invalid(action, "bet must be a whole number within range")
                    })?;
                BlackjackIntent::PlaceBet(bet_amount(action, amount)?)
            }
            "Deal" => BlackjackIntent::Deal,
            "Hit" => BlackjackIntent::Hit,
            "Stand" => BlackjackIntent::Stand,
            "Restart" => BlackjackIntent::Restart,
            DECK_SHUFFLED => BlackjackIntent::DeckShuffled(decode_deck(message)?),
            _ => match action.strip_prefix("PlaceBet_") {
                // Older clients encode the amount in the tag itself.
                Some(amount) => {
                    let amount = amount.parse::<i64>().map_err(|_| {
                        ReduceError::invalid(action, "bet must be a whole number within range")
                    })?;
                    BlackjackIntent::PlaceBet(bet_amount(action, amount)?)
                }
                None => return Ok(None),
            },
        };
        Ok(Some(intent))
    }
}

fn bet_amount(action: &str, amount: i64) -> Result<u32, ReduceError> {
    if amount < 0 {
        return Err(ReduceError::invalid(action, "bet must not be negative"));
    }
    u32::try_from(amount).map_err(|_| ReduceError::invalid(action, "bet is too large"))
}

/// The `DeckShuffled` message carrying `deck` in playing order.
pub fn deck_shuffled(deck: &[Card]) -> Result<Message, serde_json::Error> {
    let mut payload = Payload::new();
    payload.insert("deck".to_string(), serde_json::to_value(deck)?);
    Ok(Message::new(DECK_SHUFFLED).with_payload(payload))
}

fn decode_deck(message: &Message) -> Result<Vec<Card>, ReduceError> {
    let raw = message
        .payload_field("deck")
        .ok_or_else(|| ReduceError::MissingField {
            action: message.action.clone(),
            field: "deck".to_string(),
        })?;
    let deck: Vec<Card> = serde_json::from_value(raw.clone())
        .map_err(|err| ReduceError::invalid(&message.action, err.to_string()))?;
    let unique: HashSet<&Card> = deck.iter().collect();
    if deck.len() != 52 || unique.len() != 52 {
        return Err(ReduceError::invalid(
            &message.action,
            "deck must contain each of the 52 cards exactly once",
        ));
    }
    Ok(deck)
}

#[derive(Debug, Clone, Copy, Default)]
pub struct Blackjack;

impl Reducer for Blackjack {
    type State = BlackjackState;
    type Intent = BlackjackIntent;

    fn reduce(
        &self,
        state: &BlackjackState,
        intent: BlackjackIntent,
    ) -> Result<Transition<BlackjackState>, ReduceError> {
        match intent {
            BlackjackIntent::PlaceBet(amount) => {
                if state.phase != Phase::Initial || amount > state.balance {
                    return Ok(Transition::unchanged(state));
                }
                Ok(Transition::next(BlackjackState {
                    bet: amount,
                    ..state.clone()
                }))
            }

            BlackjackIntent::Deal => {
                // Also a no-op while the shuffle requested at startup or on
                // restart is still in flight.
                if !state.can_deal() {
                    return Ok(Transition::unchanged(state));
                }
                let mut next = state.clone();
                next.player_hand = vec![next.draw()?, next.draw()?];
                next.dealer_hand = vec![next.draw()?];
                next.balance -= next.bet;
                next.phase = Phase::PlayerTurn;
                Ok(Transition::next(next))
            }

            BlackjackIntent::Hit => {
                if state.phase != Phase::PlayerTurn {
                    return Ok(Transition::unchanged(state));
                }
                let mut next = state.clone();
                let card = next.draw()?;
                next.player_hand.push(card);
                if next.player_value() > 21 {
                    next = next.settle();
                }
                Ok(Transition::next(next))
            }

            BlackjackIntent::Stand => {
                if state.phase != Phase::PlayerTurn {
                    return Ok(Transition::unchanged(state));
                }
                let mut next = state.clone();
                next.phase = Phase::DealerTurn;
                while next.dealer_value() < DEALER_STANDS_AT {
                    let card = next.draw()?;
                    next.dealer_hand.push(card);
                }
                Ok(Transition::next(next.settle()))
            }

            BlackjackIntent::Restart => Ok(Transition::with_command(
                BlackjackState::new(state.balance),
                Command::new(SHUFFLE_DECK),
            )),

            BlackjackIntent::DeckShuffled(deck) => {
                // A shuffle that arrives after dealing started is stale.
                if state.phase != Phase::Initial || !state.player_hand.is_empty() {
                    return Ok(Transition::unchanged(state));
                }
                Ok(Transition::next(BlackjackState {
                    deck,
                    shuffled: true,
                    ..state.clone()
                }))
            }
        }
    }
}

/// Initial table and the command that shuffles its deck.
pub fn initial() -> (BlackjackState, Command) {
    (BlackjackState::new(STARTING_BALANCE), Command::new(SHUFFLE_DECK))
}

/// `shuffleDeck` answers with a `DeckShuffled` message carrying a random
/// permutation of the standard deck.
pub fn registry() -> Result<CommandRegistry, RegistryError> {
    let mut registry = CommandRegistry::new();
    registry.register_fn(SHUFFLE_DECK, |_| {
        let mut deck = standard_deck();
        deck.shuffle(&mut rand::thread_rng());
        match deck_shuffled(&deck) {
            Ok(message) => Some(message),
            Err(err) => {
                tracing::error!("Failed to encode shuffled deck: {}", err);
                None
            }
        }
    })?;
    Ok(registry)
}
