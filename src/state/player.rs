use crate::meld::Meld;
use crate::tile::Tile;

/// Per-seat replay state within one round.
#[derive(Debug, Clone, Default)]
pub struct PlayerState {
    pub closed_hand: Vec<Tile>,
    pub melds: Vec<Meld>,
    pub discards: Vec<Tile>,
    pub riichi_declared: bool,
    pub discard_count: u32,
    /// The tile drawn this turn, cleared on discard.
    pub last_draw: Option<Tile>,
}

impl PlayerState {
    pub fn reset_round(&mut self, starting_hand: &[Tile]) {
        self.closed_hand.clear();
        self.closed_hand.extend_from_slice(starting_hand);
        self.closed_hand.sort();
        self.melds.clear();
        self.discards.clear();
        self.riichi_declared = false;
        self.discard_count = 0;
        self.last_draw = None;
    }

    /// Removes one tile by exact 136-id. Returns whether it was held.
    pub fn remove_tile(&mut self, tile: Tile) -> bool {
        match self.closed_hand.iter().position(|&t| t == tile) {
            Some(pos) => {
                self.closed_hand.remove(pos);
                true
            }
            None => false,
        }
    }

    /// Count of terminal and honor tiles in the closed hand.
    pub fn yaochuu_count(&self) -> usize {
        self.closed_hand
            .iter()
            .filter(|t| t.is_terminal_or_honor())
            .count()
    }
}
