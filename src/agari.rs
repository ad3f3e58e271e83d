use crate::hand::Hand;
use crate::tables::{AgariEntry, AgariTable};
use crate::tile::{TILE_KINDS, YAOCHUU_KINDS};

/// Run-length shape key of a hand plus the distinct kinds it holds,
/// in key order. Entry positions in the agari table index into
/// `kinds`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShapeKey {
    pub kinds: Vec<u8>,
    pub key: u32,
}

/// Builds the shape key. Within each number suit, present kinds emit
/// a presence slot plus 2/4/6 marker bits for counts of 2/3/4, and a
/// separator bit closes every maximal run of present kinds. Honor
/// kinds cannot form runs, so each present honor is closed
/// immediately.
pub fn shape_key(hand: &Hand) -> ShapeKey {
    let mut kinds = Vec::with_capacity(14);
    let mut key = 0u32;
    let mut bit_idx = -1i32;
    let mut prev_in_hand = false;
    for suit in 0..3 {
        for num in 0..9 {
            let k = suit * 9 + num;
            let c = hand.counts[k];
            if c > 0 {
                prev_in_hand = true;
                kinds.push(k as u8);
                bit_idx += 1;
                match c {
                    2 => {
                        key |= 0b11 << bit_idx;
                        bit_idx += 2;
                    }
                    3 => {
                        key |= 0b1111 << bit_idx;
                        bit_idx += 4;
                    }
                    4 => {
                        key |= 0b11_1111 << bit_idx;
                        bit_idx += 6;
                    }
                    _ => {}
                }
            } else if prev_in_hand {
                prev_in_hand = false;
                key |= 1 << bit_idx;
                bit_idx += 1;
            }
        }
        if prev_in_hand {
            prev_in_hand = false;
            key |= 1 << bit_idx;
            bit_idx += 1;
        }
    }
    for k in 27..TILE_KINDS {
        let c = hand.counts[k];
        if c > 0 {
            kinds.push(k as u8);
            bit_idx += 1;
            match c {
                2 => {
                    key |= 0b11 << bit_idx;
                    bit_idx += 2;
                }
                3 => {
                    key |= 0b1111 << bit_idx;
                    bit_idx += 4;
                }
                4 => {
                    key |= 0b11_1111 << bit_idx;
                    bit_idx += 6;
                }
                _ => {}
            }
            key |= 1 << bit_idx;
            bit_idx += 1;
        }
    }
    ShapeKey { kinds, key }
}

/// Thirteen orphans. Checked in code because the shape key cannot
/// express "these exact kinds": its pattern collides with any hand of
/// thirteen scattered kinds.
pub fn is_kokushi(hand: &Hand) -> bool {
    let mut total = 0usize;
    let mut pair = false;
    for &k in YAOCHUU_KINDS.iter() {
        let c = hand.counts[k as usize];
        if c == 0 {
            return false;
        }
        if c >= 2 {
            pair = true;
        }
        total += c as usize;
    }
    pair && total == 14 && hand.len() == 14
}

/// Whether a closed hand (2, 5, 8, 11 or 14 tiles) is a winning
/// shape.
pub fn is_agari(hand: &Hand, table: &AgariTable) -> bool {
    table.contains(shape_key(hand).key) || is_kokushi(hand)
}

/// Winning tiles of a 3n+1 hand.
pub fn waits(hand: &Hand, table: &AgariTable) -> Vec<u8> {
    let mut work = hand.clone();
    let mut out = Vec::new();
    for k in 0..TILE_KINDS as u8 {
        if work.counts[k as usize] < 4 {
            work.add(k);
            if is_agari(&work, table) {
                out.push(k);
            }
            work.remove(k);
        }
    }
    out
}

/// Whether declaring ankan on `kind` is legal for a riichi hand.
///
/// `hand` is the 14-tile closed hand including the drawn tile. The
/// kan must use all four copies; honors are always fine; otherwise
/// every current wait has to stay a winning shape once the four
/// tiles leave the hand.
pub fn ankan_allowed_after_riichi(hand: &Hand, kind: u8, table: &AgariTable) -> bool {
    let k = kind as usize;
    if k >= TILE_KINDS || hand.counts[k] != 4 {
        return false;
    }
    if k >= 27 {
        return true;
    }
    let mut work = hand.clone();
    work.counts[k] -= 1;
    let ws = waits(&work, table);
    if ws.is_empty() {
        return false;
    }
    work.counts[k] = 0;
    for w in ws {
        work.add(w);
        let still_agari = is_agari(&work, table);
        work.remove(w);
        if !still_agari {
            return false;
        }
    }
    true
}

/// One way to read a winning hand as blocks of concrete kinds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Decomposition {
    pub pair: u8,
    pub triplets: Vec<u8>,
    /// Starting kinds of the runs.
    pub runs: Vec<u8>,
    pub entry: AgariEntry,
}

/// All decompositions of a winning hand. Empty when the hand does not
/// win.
pub fn decompositions(hand: &Hand, table: &AgariTable) -> Vec<Decomposition> {
    let sk = shape_key(hand);
    let Some(entries) = table.get(sk.key) else {
        return Vec::new();
    };
    entries
        .iter()
        .map(|entry| Decomposition {
            pair: sk.kinds.get(entry.pair_position()).copied().unwrap_or(0),
            triplets: entry
                .triplet_positions()
                .iter()
                .map(|&p| sk.kinds[p])
                .collect(),
            runs: entry.run_positions().iter().map(|&p| sk.kinds[p]).collect(),
            entry: *entry,
        })
        .collect()
}
