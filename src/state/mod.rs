mod player;

pub use player::PlayerState;

use crate::decoder::{GameLog, Round};
use crate::errors::{Result, TenhouError};
use crate::event::Event;
use crate::meld::Meld;
use crate::tile::Tile;

/// Live wall size after dealing four hands of thirteen from 136
/// tiles, with the fourteen-tile dead wall set aside.
pub const INITIAL_WALL: u8 = 70;

/// Thresholds for the nine-terminals abortive draw. Kept adjustable
/// since rule sets disagree on the details.
#[derive(Debug, Clone, Copy)]
pub struct DrawPolicy {
    /// Wall tiles that must still be live (i.e. the declaration has
    /// to fall in the first uninterrupted go-around).
    pub min_wall: u8,
    /// Distinct-or-repeated terminal/honor tiles required in the
    /// fourteen-tile hand.
    pub min_terminals: usize,
}

impl Default for DrawPolicy {
    fn default() -> Self {
        DrawPolicy {
            min_wall: 66,
            min_terminals: 9,
        }
    }
}

/// Forward-only replay cursor over a decoded log.
///
/// Drive it with `next_round` to enter each round, then alternate
/// `peek_event` / `process_event`. Events borrow from the log, so
/// callers can hold one across state mutations.
pub struct GameState<'a> {
    log: &'a GameLog,
    round_idx: Option<usize>,
    cursor: usize,
    round_over: bool,
    pub players: [PlayerState; 4],
    pub tiles_left: u8,
    pub dora_indicators: Vec<Tile>,
    /// Any call interrupts the current go-around.
    pub call_this_round: bool,
    pub policy: DrawPolicy,
}

impl<'a> GameState<'a> {
    pub fn new(log: &'a GameLog) -> GameState<'a> {
        GameState {
            log,
            round_idx: None,
            cursor: 0,
            round_over: false,
            players: Default::default(),
            tiles_left: INITIAL_WALL,
            dora_indicators: Vec::new(),
            call_this_round: false,
            policy: DrawPolicy::default(),
        }
    }

    pub fn log(&self) -> &'a GameLog {
        self.log
    }

    pub fn current_round(&self) -> Option<&'a Round> {
        self.round_idx.and_then(|i| self.log.rounds.get(i))
    }

    pub fn round_index(&self) -> Option<usize> {
        self.round_idx
    }

    /// Advances to the next round and deals the starting hands.
    /// Returns `None` once the log is exhausted.
    pub fn next_round(&mut self) -> Option<&'a Round> {
        let next = self.round_idx.map_or(0, |i| i + 1);
        let round = self.log.rounds.get(next)?;
        self.round_idx = Some(next);
        self.cursor = 0;
        self.round_over = false;
        self.tiles_left = INITIAL_WALL;
        self.dora_indicators.clear();
        self.call_this_round = false;
        for (seat, player) in self.players.iter_mut().enumerate() {
            let hand = round
                .starting_hands
                .get(seat)
                .map_or(&[] as &[Tile], Vec::as_slice);
            player.reset_round(hand);
        }
        Some(round)
    }

    /// The event `process_event` would apply next.
    pub fn peek_event(&self) -> Option<&'a Event> {
        self.current_round()?.events.get(self.cursor)
    }

    /// Applies the next event and returns it.
    pub fn process_event(&mut self) -> Result<&'a Event> {
        if self.round_over {
            return Err(TenhouError::State(
                "round already finished; call next_round".into(),
            ));
        }
        let event = self.peek_event().ok_or_else(|| {
            TenhouError::State("no events left in this round".into())
        })?;
        self.cursor += 1;
        match event {
            Event::DrawTile { player, tile } => {
                let p = self.player_mut(*player)?;
                p.closed_hand.push(*tile);
                p.last_draw = Some(*tile);
                self.tiles_left = self.tiles_left.saturating_sub(1);
            }
            Event::DiscardTile { player, tile } => {
                let p = self.player_mut(*player)?;
                if !p.remove_tile(*tile) {
                    return Err(TenhouError::State(format!(
                        "player {} discarded {} without holding it",
                        player, tile
                    )));
                }
                p.discards.push(*tile);
                p.discard_count += 1;
                p.last_draw = None;
                self.call_this_round = false;
            }
            Event::Call { player, meld } => {
                self.apply_meld(*player, meld)?;
                self.call_this_round = true;
            }
            Event::DoraIndicator { tile } => {
                self.dora_indicators.push(*tile);
            }
            Event::Riichi { player } => {
                self.player_mut(*player)?.riichi_declared = true;
            }
            Event::Ron { .. } | Event::Tsumo { .. } | Event::Ryuukyoku { .. } => {
                self.round_over = true;
            }
        }
        Ok(event)
    }

    pub fn round_over(&self) -> bool {
        self.round_over
    }

    fn player_mut(&mut self, seat: u8) -> Result<&mut PlayerState> {
        self.players
            .get_mut(seat as usize)
            .ok_or_else(|| TenhouError::State(format!("seat {} out of range", seat)))
    }

    fn apply_meld(&mut self, seat: u8, meld: &Meld) -> Result<()> {
        let caller = seat as usize;
        if caller >= 4 {
            return Err(TenhouError::State(format!("seat {} out of range", seat)));
        }
        match meld {
            Meld::Chi { from, tiles, called }
            | Meld::Pon { from, tiles, called } => {
                self.claim_discard(caller, *from, tiles[*called as usize])?;
                for (i, tile) in tiles.iter().enumerate() {
                    if i != *called as usize {
                        self.take_from_hand(caller, *tile)?;
                    }
                }
                self.players[caller].melds.push(meld.clone());
            }
            Meld::Daiminkan { from, tiles, called } => {
                self.claim_discard(caller, *from, tiles[*called as usize])?;
                for (i, tile) in tiles.iter().enumerate() {
                    if i != *called as usize {
                        self.take_from_hand(caller, *tile)?;
                    }
                }
                self.players[caller].melds.push(meld.clone());
            }
            Meld::Shouminkan { tiles, .. } => {
                // The added tile comes out of the hand; the pon it
                // upgrades is replaced wholesale.
                let added = tiles[3];
                self.take_from_hand(caller, added)?;
                let kind = added.kind();
                let player = &mut self.players[caller];
                match player
                    .melds
                    .iter()
                    .position(|m| matches!(m, Meld::Pon { tiles, .. } if tiles[0].kind() == kind))
                {
                    Some(pos) => player.melds[pos] = meld.clone(),
                    None => {
                        return Err(TenhouError::State(format!(
                            "added kan on kind {} without a matching pon",
                            kind
                        )))
                    }
                }
            }
            Meld::Ankan { tiles } => {
                for tile in tiles {
                    self.take_from_hand(caller, *tile)?;
                }
                self.players[caller].melds.push(meld.clone());
            }
            Meld::Kita { tile, .. } => {
                self.take_from_hand(caller, *tile)?;
                self.players[caller].melds.push(meld.clone());
            }
        }
        Ok(())
    }

    /// Pops the claimed tile off the discarder's pond. `from` is the
    /// caller-relative seat offset.
    fn claim_discard(&mut self, caller: usize, from: u8, tile: Tile) -> Result<()> {
        let source = (caller + from as usize) % 4;
        if source == caller {
            return Err(TenhouError::State("open call claiming own tile".into()));
        }
        let pond = &mut self.players[source].discards;
        match pond.last() {
            Some(&last) if last == tile => {
                pond.pop();
                Ok(())
            }
            _ => Err(TenhouError::State(format!(
                "claimed tile {} is not the last discard of seat {}",
                tile, source
            ))),
        }
    }

    fn take_from_hand(&mut self, seat: usize, tile: Tile) -> Result<Tile> {
        if self.players[seat].remove_tile(tile) {
            Ok(tile)
        } else {
            Err(TenhouError::State(format!(
                "seat {} melded {} without holding it",
                seat, tile
            )))
        }
    }

    /// Whether `seat` may declare the nine-terminals abortive draw
    /// right now (on its first draw, before anyone has called).
    pub fn can_declare_draw(&self, seat: u8) -> bool {
        let Some(player) = self.players.get(seat as usize) else {
            return false;
        };
        !self.call_this_round
            && self.tiles_left >= self.policy.min_wall
            && player.yaochuu_count() >= self.policy.min_terminals
    }
}
