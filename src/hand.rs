use crate::tile::{Tile, TILE_KINDS};

/// A hand as a histogram over the 34 tile kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Hand {
    pub counts: [u8; TILE_KINDS],
}

// std stops deriving Default for arrays at 32 elements.
impl Default for Hand {
    fn default() -> Self {
        Hand {
            counts: [0; TILE_KINDS],
        }
    }
}

impl Hand {
    pub fn from_kinds(kinds: &[u8]) -> Self {
        let mut h = Hand::default();
        for &k in kinds {
            h.add(k);
        }
        h
    }

    pub fn from_tiles(tiles: &[Tile]) -> Self {
        let mut h = Hand::default();
        for t in tiles {
            h.add(t.kind());
        }
        h
    }

    pub fn add(&mut self, kind: u8) {
        if (kind as usize) < TILE_KINDS {
            self.counts[kind as usize] += 1;
        }
    }

    pub fn remove(&mut self, kind: u8) {
        if (kind as usize) < TILE_KINDS && self.counts[kind as usize] > 0 {
            self.counts[kind as usize] -= 1;
        }
    }

    pub fn len(&self) -> usize {
        self.counts.iter().map(|&c| c as usize).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.counts.iter().all(|&c| c == 0)
    }
}
