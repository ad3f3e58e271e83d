use crate::hand::Hand;
use crate::tables::ShantenTable;
use crate::tile::YAOCHUU_KINDS;

/// Base-5 hash of a block of per-kind counts, high digit first.
#[inline]
fn block_hash(counts: &[u8]) -> usize {
    counts.iter().fold(0usize, |acc, &c| acc * 5 + c as usize)
}

/// Min-plus merge of one more suit block into the accumulator row.
///
/// `lhs[j]` (j = 0..4) holds the tiles still needed for j melds over
/// the blocks merged so far; `lhs[5+j]` the same with the pair also
/// placed. `m` is the meld target for the whole hand.
fn merge_suit(lhs: &mut [u8; 10], tab: &[u8; 10], m: usize) {
    for j in (5..=5 + m).rev() {
        let mut sht = (lhs[j] + tab[0]).min(lhs[0] + tab[j]);
        for k in 5..j {
            sht = sht.min(lhs[k] + tab[j - k]).min(lhs[j - k] + tab[k]);
        }
        lhs[j] = sht;
    }
    for j in (0..=m).rev() {
        let mut sht = lhs[j] + tab[0];
        for k in 0..j {
            sht = sht.min(lhs[k] + tab[j - k]);
        }
        lhs[j] = sht;
    }
}

/// The honor block goes in last; only the final with-pair target is
/// still needed.
fn merge_honors(lhs: &mut [u8; 10], tab: &[u8; 10], m: usize) {
    let j = 5 + m;
    let mut sht = (lhs[j] + tab[0]).min(lhs[0] + tab[j]);
    for k in 5..j {
        sht = sht.min(lhs[k] + tab[j - k]).min(lhs[j - k] + tab[k]);
    }
    lhs[j] = sht;
}

/// Standard-form shanten (four melds and a pair, scaled down when the
/// hand holds fewer than 13 tiles because of open melds).
pub fn calc_normal(hand: &Hand, table: &ShantenTable) -> i8 {
    let m = (hand.len() / 3).min(4);
    let mut lhs = table.suit_row(block_hash(&hand.counts[0..9]));
    merge_suit(&mut lhs, &table.suit_row(block_hash(&hand.counts[9..18])), m);
    merge_suit(
        &mut lhs,
        &table.suit_row(block_hash(&hand.counts[18..27])),
        m,
    );
    merge_honors(
        &mut lhs,
        &table.honor_row(block_hash(&hand.counts[27..34])),
        m,
    );
    lhs[5 + m] as i8 - 1
}

/// Seven-pairs shanten. Duplicate kinds beyond a pair do not help, so
/// short kind coverage is penalized separately.
pub fn calc_chiitoitsu(hand: &Hand) -> i8 {
    let mut pairs = 0i8;
    let mut kinds = 0i8;
    for &c in hand.counts.iter() {
        if c > 0 {
            kinds += 1;
        }
        if c >= 2 {
            pairs += 1;
        }
    }
    7 - pairs + (7 - kinds).max(0) - 1
}

/// Thirteen-orphans shanten.
pub fn calc_kokushi(hand: &Hand) -> i8 {
    let mut kinds = 0i8;
    let mut has_pair = false;
    for &k in YAOCHUU_KINDS.iter() {
        let c = hand.counts[k as usize];
        if c > 0 {
            kinds += 1;
        }
        if c >= 2 {
            has_pair = true;
        }
    }
    14 - kinds - i8::from(has_pair) - 1
}

/// Overall shanten: the minimum over the three hand forms. The pair
/// forms only apply to full (13+ tile) closed hands.
pub fn calc_all(hand: &Hand, table: &ShantenTable) -> i8 {
    let mut sht = calc_normal(hand, table);
    if hand.len() >= 13 {
        sht = sht.min(calc_chiitoitsu(hand)).min(calc_kokushi(hand));
    }
    sht
}
