use std::io::Read;
use std::path::Path;
use std::str::FromStr;

use bzip2::read::BzDecoder;
use flate2::read::GzDecoder;
use log::{debug, warn};
use serde::Serialize;

use crate::errors::{Result, TenhouError};
use crate::event::{Event, RyuukyokuKind};
use crate::meld::Meld;
use crate::tile::Tile;

/// One seat's lobby identity from the UN record.
#[derive(Debug, Clone, Serialize)]
pub struct PlayerInfo {
    pub name: String,
    pub dan: u8,
    pub rate: f64,
    pub sex: String,
    /// Cleared by BYE, restored by a dan-less UN record.
    pub connected: bool,
}

/// One AGARI record. `from == who` for tsumo.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct WinDeclaration {
    pub who: u8,
    pub from: u8,
    pub points: i32,
}

impl WinDeclaration {
    pub fn is_ron(&self) -> bool {
        self.from != self.who
    }
}

/// Final standing of one seat, from the owari attribute.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct FinalScore {
    pub points: i32,
    pub result: f64,
}

/// One hand of play. `events` is the replayable stream; the decoder
/// guarantees a sealed round ends with exactly one terminal event.
#[derive(Debug, Clone, Serialize)]
pub struct Round {
    /// 0 = East 1, 4 = South 1, and so on.
    pub round_number: u8,
    pub honba: u8,
    pub riichi_sticks: u8,
    pub dealer: u8,
    pub starting_hands: Vec<Vec<Tile>>,
    pub events: Vec<Event>,
    pub wins: Vec<WinDeclaration>,
    pub ryuukyoku: Option<RyuukyokuKind>,
    /// Seats revealed tenpai at an exhaustive draw.
    pub tenpai_players: Vec<u8>,
    pub riichi_players: Vec<u8>,
    /// Discard index at which each entry of `riichi_players` declared.
    pub riichi_turns: Vec<u32>,
    pub score_deltas: [i32; 4],
    /// Turns taken per seat; draws and calls both count.
    pub turns: [u32; 4],
}

/// A fully decoded game log.
#[derive(Debug, Clone, Default, Serialize)]
pub struct GameLog {
    pub game_type: u16,
    pub lobby: Option<String>,
    pub players: Vec<PlayerInfo>,
    pub rounds: Vec<Round>,
    pub final_scores: Vec<FinalScore>,
}

impl GameLog {
    /// Decodes the raw XML-ish record stream.
    pub fn from_xml(text: &str) -> Result<GameLog> {
        Decoder::default().run(text)
    }

    /// Decodes a byte buffer, sniffing bz2 and gzip compression by
    /// magic bytes; anything else is taken as plain text.
    pub fn from_bytes(bytes: &[u8]) -> Result<GameLog> {
        let mut text = String::new();
        if bytes.starts_with(b"BZh") {
            BzDecoder::new(bytes)
                .read_to_string(&mut text)
                .map_err(|e| TenhouError::format("bz2", e.to_string()))?;
        } else if bytes.starts_with(&[0x1f, 0x8b]) {
            GzDecoder::new(bytes)
                .read_to_string(&mut text)
                .map_err(|e| TenhouError::format("gzip", e.to_string()))?;
        } else {
            text = String::from_utf8_lossy(bytes).into_owned();
        }
        GameLog::from_xml(&text)
    }

    /// Decodes a hex dump of a (possibly compressed) log, as stored
    /// by some archive pipelines. A leading `0x` is accepted.
    pub fn from_hex(hex: &str) -> Result<GameLog> {
        let hex = hex.trim();
        let hex = hex.strip_prefix("0x").unwrap_or(hex);
        if !hex.is_ascii() {
            return Err(TenhouError::format("hex", "non-ascii digit"));
        }
        if hex.len() % 2 != 0 {
            return Err(TenhouError::format("hex", "odd number of digits"));
        }
        let mut bytes = Vec::with_capacity(hex.len() / 2);
        for i in (0..hex.len()).step_by(2) {
            let b = u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|e| TenhouError::format("hex", e.to_string()))?;
            bytes.push(b);
        }
        GameLog::from_bytes(&bytes)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<GameLog> {
        let bytes = std::fs::read(path.as_ref())
            .map_err(|e| TenhouError::format("io", e.to_string()))?;
        GameLog::from_bytes(&bytes)
    }
}

struct Attrs<'a> {
    pairs: Vec<(&'a str, &'a str)>,
}

impl<'a> Attrs<'a> {
    fn get(&self, name: &str) -> Option<&'a str> {
        self.pairs
            .iter()
            .find(|(k, _)| *k == name)
            .map(|(_, v)| *v)
    }

    fn require(&self, tag: &str, name: &str) -> Result<&'a str> {
        self.get(name)
            .ok_or_else(|| TenhouError::format(tag, format!("missing `{}` attribute", name)))
    }
}

fn parse_num<T: FromStr>(tag: &str, name: &str, value: &str) -> Result<T> {
    value
        .trim()
        .parse()
        .map_err(|_| TenhouError::format(tag, format!("bad `{}` value `{}`", name, value)))
}

/// Comma-separated numeric list. The empty string is an empty list.
fn parse_list<T: FromStr>(tag: &str, name: &str, value: &str) -> Result<Vec<T>> {
    if value.is_empty() {
        return Ok(Vec::new());
    }
    value
        .split(',')
        .map(|v| parse_num(tag, name, v))
        .collect()
}

fn percent_decode(s: &str) -> String {
    let bytes = s.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hi = (bytes[i + 1] as char).to_digit(16);
            let lo = (bytes[i + 2] as char).to_digit(16);
            if let (Some(hi), Some(lo)) = (hi, lo) {
                out.push((hi * 16 + lo) as u8);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

#[derive(Default)]
struct Decoder {
    log: GameLog,
}

impl Decoder {
    fn run(mut self, text: &str) -> Result<GameLog> {
        let mut rest = text;
        while let Some(start) = rest.find('<') {
            let tail = &rest[start + 1..];
            let end = tail
                .find('>')
                .ok_or_else(|| TenhouError::format("record", "unterminated tag"))?;
            let inner = tail[..end].trim_end_matches('/').trim();
            rest = &tail[end + 1..];
            if inner.is_empty() || inner.starts_with('?') || inner.starts_with('/') {
                continue;
            }
            let (tag, attr_text) = match inner.find(char::is_whitespace) {
                Some(pos) => (&inner[..pos], &inner[pos + 1..]),
                None => (inner, ""),
            };
            let attrs = parse_attrs(tag, attr_text)?;
            self.dispatch(tag, &attrs)?;
        }
        self.seal_round();
        Ok(self.log)
    }

    fn dispatch(&mut self, tag: &str, attrs: &Attrs) -> Result<()> {
        match tag {
            "GO" => self.on_go(attrs),
            "UN" => self.on_un(attrs),
            "BYE" => self.on_bye(attrs),
            "INIT" => self.on_init(attrs),
            "N" => self.on_call(attrs),
            "DORA" => self.on_dora(attrs),
            "REACH" => self.on_reach(attrs),
            "AGARI" => self.on_agari(attrs),
            "RYUUKYOKU" => self.on_ryuukyoku(attrs),
            _ => self.on_default(tag),
        }
    }

    fn round_mut(&mut self, tag: &str) -> Result<&mut Round> {
        self.log
            .rounds
            .last_mut()
            .ok_or_else(|| TenhouError::format(tag, "record before the first INIT"))
    }

    fn on_go(&mut self, attrs: &Attrs) -> Result<()> {
        self.log.game_type = parse_num("GO", "type", attrs.require("GO", "type")?)?;
        self.log.lobby = attrs.get("lobby").map(str::to_string);
        Ok(())
    }

    fn on_un(&mut self, attrs: &Attrs) -> Result<()> {
        if let Some(dan) = attrs.get("dan") {
            let dans: Vec<u8> = parse_list("UN", "dan", dan)?;
            let rates: Vec<f64> = parse_list("UN", "rate", attrs.get("rate").unwrap_or(""))?;
            let sexes: Vec<&str> = attrs.get("sx").map_or(Vec::new(), |s| s.split(',').collect());
            self.log.players.clear();
            for i in 0..4 {
                let key = format!("n{}", i);
                let Some(raw) = attrs.get(&key) else { continue };
                if raw.is_empty() {
                    continue;
                }
                self.log.players.push(PlayerInfo {
                    name: percent_decode(raw),
                    dan: dans.get(i).copied().unwrap_or(0),
                    rate: rates.get(i).copied().unwrap_or(0.0),
                    sex: sexes.get(i).copied().unwrap_or("").to_string(),
                    connected: true,
                });
            }
        } else {
            // A dan-less UN is a reconnect notice.
            for i in 0..4 {
                if attrs.get(&format!("n{}", i)).is_some() {
                    if let Some(p) = self.log.players.get_mut(i) {
                        p.connected = true;
                    }
                }
            }
        }
        Ok(())
    }

    fn on_bye(&mut self, attrs: &Attrs) -> Result<()> {
        let who: usize = parse_num("BYE", "who", attrs.require("BYE", "who")?)?;
        if let Some(p) = self.log.players.get_mut(who) {
            p.connected = false;
        }
        Ok(())
    }

    fn on_init(&mut self, attrs: &Attrs) -> Result<()> {
        self.seal_round();
        let seed: Vec<u32> = parse_list("INIT", "seed", attrs.require("INIT", "seed")?)?;
        if seed.len() < 6 {
            return Err(TenhouError::format("INIT", "seed needs 6 entries"));
        }
        let dealer: u8 = parse_num("INIT", "oya", attrs.require("INIT", "oya")?)?;
        // Keep the list seat-indexed even when a hai attribute is
        // absent (anonymized or partial records).
        let mut starting_hands = Vec::with_capacity(4);
        for i in 0..4 {
            let key = format!("hai{}", i);
            let ids: Vec<u32> = match attrs.get(&key) {
                Some(raw) => parse_list("INIT", &key, raw)?,
                None => Vec::new(),
            };
            starting_hands.push(ids.into_iter().map(Tile::new).collect::<Result<Vec<_>>>()?);
        }
        let dora = Tile::new(seed[5])?;
        self.log.rounds.push(Round {
            round_number: seed[0] as u8,
            honba: seed[1] as u8,
            riichi_sticks: seed[2] as u8,
            dealer,
            starting_hands,
            events: vec![Event::DoraIndicator { tile: dora }],
            wins: Vec::new(),
            ryuukyoku: None,
            tenpai_players: Vec::new(),
            riichi_players: Vec::new(),
            riichi_turns: Vec::new(),
            score_deltas: [0; 4],
            turns: [0; 4],
        });
        Ok(())
    }

    fn on_call(&mut self, attrs: &Attrs) -> Result<()> {
        let who: u8 = parse_num("N", "who", attrs.require("N", "who")?)?;
        let data: u32 = parse_num("N", "m", attrs.require("N", "m")?)?;
        let meld = Meld::decode(data)?;
        let round = self.round_mut("N")?;
        if let Some(turn) = round.turns.get_mut(who as usize) {
            *turn += 1;
        }
        round.events.push(Event::Call { player: who, meld });
        Ok(())
    }

    fn on_dora(&mut self, attrs: &Attrs) -> Result<()> {
        let id: u32 = parse_num("DORA", "hai", attrs.require("DORA", "hai")?)?;
        let tile = Tile::new(id)?;
        self.round_mut("DORA")?
            .events
            .push(Event::DoraIndicator { tile });
        Ok(())
    }

    fn on_reach(&mut self, attrs: &Attrs) -> Result<()> {
        // Step 1 (declaration) carries no `ten`; the stick is only
        // paid at step 2, which is what we record.
        if attrs.get("ten").is_none() {
            return Ok(());
        }
        let who: u8 = parse_num("REACH", "who", attrs.require("REACH", "who")?)?;
        let round = self.round_mut("REACH")?;
        round.riichi_players.push(who);
        round.riichi_turns.push(round.turns[who as usize]);
        // The riichi is announced before the discard that follows it
        // in play order, but the record arrives after; slot the event
        // back in front of that discard.
        let pos = round.events.len().saturating_sub(1);
        round.events.insert(pos, Event::Riichi { player: who });
        Ok(())
    }

    fn on_agari(&mut self, attrs: &Attrs) -> Result<()> {
        let who: u8 = parse_num("AGARI", "who", attrs.require("AGARI", "who")?)?;
        let from: u8 = parse_num("AGARI", "fromWho", attrs.require("AGARI", "fromWho")?)?;
        let ten: Vec<i32> = parse_list("AGARI", "ten", attrs.require("AGARI", "ten")?)?;
        let points = ten.get(1).copied().unwrap_or(0);
        let sc: Vec<i32> = parse_list("AGARI", "sc", attrs.get("sc").unwrap_or(""))?;
        let round = self.round_mut("AGARI")?;
        round.wins.push(WinDeclaration { who, from, points });
        apply_score_deltas(&mut round.score_deltas, &sc);
        if let Some(owari) = attrs.get("owari") {
            self.log.final_scores = parse_owari(owari)?;
        }
        Ok(())
    }

    fn on_ryuukyoku(&mut self, attrs: &Attrs) -> Result<()> {
        let kind = RyuukyokuKind::from_attr(attrs.get("type"))?;
        let sc: Vec<i32> = parse_list("RYUUKYOKU", "sc", attrs.get("sc").unwrap_or(""))?;
        let reveals_tenpai = !kind.is_abortive();
        let mut tenpai = Vec::new();
        if reveals_tenpai {
            for i in 0..4u8 {
                if attrs
                    .get(&format!("hai{}", i))
                    .is_some_and(|v| !v.is_empty())
                {
                    tenpai.push(i);
                }
            }
        }
        let round = self.round_mut("RYUUKYOKU")?;
        round.ryuukyoku = Some(kind);
        round.tenpai_players = tenpai;
        apply_score_deltas(&mut round.score_deltas, &sc);
        if let Some(owari) = attrs.get("owari") {
            self.log.final_scores = parse_owari(owari)?;
        }
        Ok(())
    }

    /// Draw and discard records are a letter plus the tile id: T/U/V/W
    /// draw for seats 0..3, D/E/F/G discard. Everything else (SHUFFLE,
    /// TAIKYOKU, the document root) is noise.
    fn on_default(&mut self, tag: &str) -> Result<()> {
        let first = tag.as_bytes()[0];
        let id = match tag.get(1..).and_then(|s| s.parse::<u32>().ok()) {
            Some(id) => id,
            None => {
                debug!("ignoring record `{}`", tag);
                return Ok(());
            }
        };
        match first {
            b'D'..=b'G' => {
                let player = first - b'D';
                let tile = Tile::new(id)?;
                self.round_mut(tag)?
                    .events
                    .push(Event::DiscardTile { player, tile });
            }
            b'T'..=b'W' => {
                let player = first - b'T';
                let tile = Tile::new(id)?;
                let round = self.round_mut(tag)?;
                round.turns[player as usize] += 1;
                round.events.push(Event::DrawTile { player, tile });
            }
            _ => debug!("ignoring record `{}`", tag),
        }
        Ok(())
    }

    /// Appends the terminal event of the round in progress, from the
    /// result records gathered so far. Called at every INIT and once
    /// at end of input.
    fn seal_round(&mut self) {
        let index = self.log.rounds.len();
        let Some(round) = self.log.rounds.last_mut() else {
            return;
        };
        if round.events.last().is_some_and(Event::is_terminal) {
            return;
        }
        if let Some(kind) = round.ryuukyoku {
            round.events.push(Event::Ryuukyoku { kind });
        } else if let Some(first) = round.wins.first().copied() {
            if first.is_ron() {
                round.events.push(Event::Ron {
                    winners: round.wins.iter().map(|w| w.who).collect(),
                    from: first.from,
                });
            } else {
                round.events.push(Event::Tsumo { player: first.who });
            }
        } else {
            warn!("round {} has no result record, leaving it unsealed", index);
        }
    }
}

fn parse_attrs<'a>(tag: &str, mut rest: &'a str) -> Result<Attrs<'a>> {
    let mut pairs = Vec::new();
    loop {
        rest = rest.trim_start();
        if rest.is_empty() {
            break;
        }
        let eq = rest
            .find('=')
            .ok_or_else(|| TenhouError::format(tag, "attribute without `=`"))?;
        let name = rest[..eq].trim();
        let after = rest[eq + 1..]
            .strip_prefix('"')
            .ok_or_else(|| TenhouError::format(tag, "attribute value not quoted"))?;
        let close = after
            .find('"')
            .ok_or_else(|| TenhouError::format(tag, "unterminated attribute value"))?;
        pairs.push((name, &after[..close]));
        rest = &after[close + 1..];
    }
    Ok(Attrs { pairs })
}

/// sc / owari style lists alternate per-seat values with per-seat
/// deltas; the deltas sit at the odd indices.
fn apply_score_deltas(deltas: &mut [i32; 4], sc: &[i32]) {
    for (i, delta) in deltas.iter_mut().enumerate() {
        if let Some(v) = sc.get(2 * i + 1) {
            *delta += *v;
        }
    }
}

fn parse_owari(owari: &str) -> Result<Vec<FinalScore>> {
    let parts: Vec<&str> = owari.split(',').collect();
    let mut out = Vec::with_capacity(parts.len() / 2);
    for chunk in parts.chunks(2) {
        if chunk.len() < 2 {
            break;
        }
        out.push(FinalScore {
            points: parse_num("AGARI", "owari", chunk[0])?,
            result: parse_num("AGARI", "owari", chunk[1])?,
        });
    }
    Ok(out)
}
