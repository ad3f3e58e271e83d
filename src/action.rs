use serde::Serialize;

use crate::agari;
use crate::decoder::GameLog;
use crate::errors::{Result, TenhouError};
use crate::event::Event;
use crate::hand::Hand;
use crate::meld::Meld;
use crate::shanten;
use crate::state::{GameState, PlayerState};
use crate::tables::LookupTables;
use crate::tile::{Tile, TILE_CHANNELS};

/// Slot numbers of the flat 46-wide action encoding: 0-36 discards,
/// then the call flags.
pub const ACTION_RIICHI: usize = 37;
pub const ACTION_CHI_LOW: usize = 38;
pub const ACTION_PON: usize = 41;
pub const ACTION_KAN: usize = 42;
pub const ACTION_WIN: usize = 43;
pub const ACTION_DRAW: usize = 44;
pub const ACTION_PASS: usize = 45;
pub const ACTION_SLOTS: usize = 46;

/// Legal choices at one decision point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ActionSpace {
    /// One slot per tile channel; red fives sit next to their plain
    /// five.
    #[serde(serialize_with = "serialize_channels")]
    pub discards: [u8; TILE_CHANNELS],
    pub riichi: bool,
    /// Low / middle / high chi on the claimable tile.
    pub chi: [bool; 3],
    pub pon: bool,
    pub kan: bool,
    pub win: bool,
    pub draw: bool,
}

// serde stops deriving array impls at 32 elements.
fn serialize_channels<S: serde::Serializer>(
    discards: &[u8; TILE_CHANNELS],
    serializer: S,
) -> std::result::Result<S::Ok, S::Error> {
    serializer.collect_seq(discards.iter())
}

impl Default for ActionSpace {
    fn default() -> Self {
        ActionSpace {
            discards: [0; TILE_CHANNELS],
            riichi: false,
            chi: [false; 3],
            pon: false,
            kan: false,
            win: false,
            draw: false,
        }
    }
}

impl ActionSpace {
    pub fn any_call(&self) -> bool {
        self.riichi
            || self.chi.iter().any(|&c| c)
            || self.pon
            || self.kan
            || self.win
            || self.draw
    }

    /// Flattens to the 46-slot layout used by the training pipeline.
    pub fn encode(&self) -> [u8; ACTION_SLOTS] {
        let mut out = [0u8; ACTION_SLOTS];
        out[..TILE_CHANNELS].copy_from_slice(&self.discards);
        out[ACTION_RIICHI] = u8::from(self.riichi);
        for (i, &c) in self.chi.iter().enumerate() {
            out[ACTION_CHI_LOW + i] = u8::from(c);
        }
        out[ACTION_PON] = u8::from(self.pon);
        out[ACTION_KAN] = u8::from(self.kan);
        out[ACTION_WIN] = u8::from(self.win);
        out[ACTION_DRAW] = u8::from(self.draw);
        out[ACTION_PASS] = u8::from(self.any_call());
        out
    }
}

/// What one seat can see when it is asked to act.
#[derive(Debug, Clone, Serialize)]
pub struct Observation {
    pub seat: u8,
    pub closed_hand: Vec<Tile>,
    pub melds: Vec<Meld>,
    pub discards: [Vec<Tile>; 4],
    pub dora_indicators: Vec<Tile>,
    pub tiles_left: u8,
    pub riichi: [bool; 4],
}

impl Observation {
    fn capture(state: &GameState, seat: u8) -> Observation {
        let mut closed_hand = state.players[seat as usize].closed_hand.clone();
        closed_hand.sort();
        Observation {
            seat,
            closed_hand,
            melds: state.players[seat as usize].melds.clone(),
            discards: [
                state.players[0].discards.clone(),
                state.players[1].discards.clone(),
                state.players[2].discards.clone(),
                state.players[3].discards.clone(),
            ],
            dora_indicators: state.dora_indicators.clone(),
            tiles_left: state.tiles_left,
            riichi: [
                state.players[0].riichi_declared,
                state.players[1].riichi_declared,
                state.players[2].riichi_declared,
                state.players[3].riichi_declared,
            ],
        }
    }
}

/// One labeled decision point: the seat just drew, sees
/// `observation`, may take anything in `action_space`, and the log
/// says it chose `label` (a slot of the 46-wide encoding).
#[derive(Debug, Clone, Serialize)]
pub struct Decision {
    pub round_index: usize,
    pub player: u8,
    pub observation: Observation,
    pub action_space: ActionSpace,
    pub label: u8,
}

/// A riichi declaration row: the tile thrown and the waits the hand
/// settled on.
#[derive(Debug, Clone, Serialize)]
pub struct RiichiDiscard {
    pub round_index: usize,
    pub player: u8,
    /// 1-based discard number of the riichi tile.
    pub discard_number: u32,
    pub tile: Tile,
    pub is_red: bool,
    pub waits: Vec<u8>,
}

/// Kinds the hand could throw while staying at tenpai or better.
/// Only full 14-tile closed hands qualify.
pub fn riichi_candidates(hand: &Hand, tables: &LookupTables) -> Vec<u8> {
    let mut out = Vec::new();
    if hand.len() != 14 {
        return out;
    }
    let mut work = hand.clone();
    for k in 0..34u8 {
        if work.counts[k as usize] == 0 {
            continue;
        }
        work.remove(k);
        let sht = shanten::calc_all(&work, &tables.shanten);
        work.add(k);
        if sht <= 0 {
            out.push(k);
        }
    }
    out
}

/// Early-exit form of `riichi_candidates`.
pub fn can_declare_riichi(hand: &Hand, tables: &LookupTables) -> bool {
    if hand.len() != 14 {
        return false;
    }
    let mut work = hand.clone();
    for k in 0..34u8 {
        if work.counts[k as usize] == 0 {
            continue;
        }
        work.remove(k);
        let sht = shanten::calc_all(&work, &tables.shanten);
        work.add(k);
        if sht <= 0 {
            return true;
        }
    }
    false
}

fn action_space_after_draw(
    state: &GameState,
    player: &PlayerState,
    drawn: Tile,
    tables: &LookupTables,
    seat: u8,
) -> ActionSpace {
    let mut space = ActionSpace::default();
    let hand = Hand::from_tiles(&player.closed_hand);

    if player.riichi_declared {
        // Hand is locked: the draw goes back out unless it completes
        // a legal ankan.
        space.discards[drawn.channel()] = 1;
        space.kan = agari::ankan_allowed_after_riichi(&hand, drawn.kind(), &tables.agari);
    } else {
        for tile in &player.closed_hand {
            space.discards[tile.channel()] = 1;
        }
        space.riichi = player.melds.is_empty() && can_declare_riichi(&hand, tables);
    }
    space.win = agari::is_agari(&hand, &tables.agari);
    space.draw = state.can_declare_draw(seat);
    space
}

/// Label slot for the event that actually followed a draw.
fn label_for(next: Option<&Event>, space: &ActionSpace) -> u8 {
    match next {
        Some(Event::Riichi { .. }) => ACTION_RIICHI as u8,
        Some(Event::Call { .. }) => ACTION_KAN as u8,
        Some(Event::Tsumo { .. }) => ACTION_WIN as u8,
        Some(Event::Ryuukyoku { .. }) if space.draw => ACTION_DRAW as u8,
        _ => ACTION_PASS as u8,
    }
}

/// Replays a whole log and yields one labeled decision per draw.
pub fn extract_decisions(log: &GameLog, tables: &LookupTables) -> Result<Vec<Decision>> {
    let mut out = Vec::new();
    let mut state = GameState::new(log);
    while state.next_round().is_some() {
        let round_index = state.round_index().unwrap_or(0);
        while let Some(event) = state.peek_event() {
            if let Event::DrawTile { player, tile } = *event {
                state.process_event()?;
                let seat = player;
                let p = &state.players[seat as usize];
                let space = action_space_after_draw(&state, p, tile, tables, seat);
                let label = label_for(state.peek_event(), &space);
                out.push(Decision {
                    round_index,
                    player: seat,
                    observation: Observation::capture(&state, seat),
                    action_space: space,
                    label,
                });
            } else {
                state.process_event()?;
            }
        }
    }
    Ok(out)
}

/// Replays a whole log and yields one row per riichi declaration,
/// with the waits the locked hand ended up on.
pub fn extract_riichi_discards(
    log: &GameLog,
    tables: &LookupTables,
) -> Result<Vec<RiichiDiscard>> {
    let mut out = Vec::new();
    let mut state = GameState::new(log);
    while state.next_round().is_some() {
        let round_index = state.round_index().unwrap_or(0);
        while state.peek_event().is_some() {
            let event = state.process_event()?;
            let Event::Riichi { player } = *event else {
                continue;
            };
            let next = state.process_event()?;
            let Event::DiscardTile { player: dp, tile } = *next else {
                return Err(TenhouError::State(
                    "riichi not followed by its discard".into(),
                ));
            };
            if dp != player {
                return Err(TenhouError::State(
                    "riichi discard from the wrong seat".into(),
                ));
            }
            let p = &state.players[player as usize];
            let hand = Hand::from_tiles(&p.closed_hand);
            out.push(RiichiDiscard {
                round_index,
                player,
                discard_number: p.discard_count,
                tile,
                is_red: tile.is_red_five(),
                waits: agari::waits(&hand, &tables.agari),
            });
        }
    }
    Ok(out)
}
