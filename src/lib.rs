//! Tenhou four-player game log tooling: wire-format decoding, table
//! driven hand evaluation, and replay-based extraction of labeled
//! decision points for training pipelines.

pub mod action;
pub mod agari;
pub mod decoder;
pub mod errors;
pub mod event;
pub mod hand;
pub mod meld;
pub mod parser;
pub mod shanten;
pub mod state;
pub mod tables;
pub mod tile;


#[cfg(feature = "python")]
mod python;

pub use action::{ActionSpace, Decision, Observation, RiichiDiscard};
pub use decoder::{GameLog, PlayerInfo, Round, WinDeclaration};
pub use errors::{Result, TenhouError};
pub use event::{Event, RyuukyokuKind};
pub use hand::Hand;
pub use meld::Meld;
pub use state::{DrawPolicy, GameState, PlayerState};
pub use tables::LookupTables;
pub use tile::Tile;
