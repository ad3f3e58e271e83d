use std::sync::OnceLock;

use pyo3::exceptions::PyValueError;
use pyo3::prelude::*;

use crate::action;
use crate::agari;
use crate::decoder::GameLog;
use crate::errors::TenhouError;
use crate::hand::Hand;
use crate::parser;
use crate::shanten;
use crate::tables::LookupTables;

impl From<TenhouError> for PyErr {
    fn from(err: TenhouError) -> PyErr {
        PyValueError::new_err(err.to_string())
    }
}

fn tables() -> PyResult<&'static LookupTables> {
    static TABLES: OnceLock<LookupTables> = OnceLock::new();
    if let Some(t) = TABLES.get() {
        return Ok(t);
    }
    let built = LookupTables::bundled()?;
    Ok(TABLES.get_or_init(|| built))
}

fn hand_from_counts(counts: Vec<u8>) -> PyResult<Hand> {
    let arr: [u8; 34] = counts
        .try_into()
        .map_err(|_| PyValueError::new_err("expected 34 tile counts"))?;
    Ok(Hand { counts: arr })
}

/// Decode a raw (or bz2/gzip compressed) log into JSON.
#[pyfunction]
fn decode_log(data: &[u8]) -> PyResult<String> {
    let log = GameLog::from_bytes(data)?;
    serde_json::to_string(&log).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Decode a hex dump of a log into JSON.
#[pyfunction]
fn decode_log_hex(data: &str) -> PyResult<String> {
    let log = GameLog::from_hex(data)?;
    serde_json::to_string(&log).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Shanten of a 34-count hand (-1 when complete).
#[pyfunction]
fn calc_shanten(counts: Vec<u8>) -> PyResult<i8> {
    let hand = hand_from_counts(counts)?;
    Ok(shanten::calc_all(&hand, &tables()?.shanten))
}

#[pyfunction]
fn is_agari(counts: Vec<u8>) -> PyResult<bool> {
    let hand = hand_from_counts(counts)?;
    Ok(agari::is_agari(&hand, &tables()?.agari))
}

/// Winning kinds of a 3n+1 hand.
#[pyfunction]
fn hand_waits(counts: Vec<u8>) -> PyResult<Vec<u8>> {
    let hand = hand_from_counts(counts)?;
    Ok(agari::waits(&hand, &tables()?.agari))
}

#[pyfunction]
fn check_ankan_after_riichi(counts: Vec<u8>, kind: u8) -> PyResult<bool> {
    let hand = hand_from_counts(counts)?;
    Ok(agari::ankan_allowed_after_riichi(
        &hand,
        kind,
        &tables()?.agari,
    ))
}

/// Kinds a 14-tile hand can throw while declaring riichi.
#[pyfunction]
fn riichi_candidates(counts: Vec<u8>) -> PyResult<Vec<u8>> {
    let hand = hand_from_counts(counts)?;
    Ok(action::riichi_candidates(&hand, tables()?))
}

/// Parse text notation like "123m055p789s11z" into 136-format ids.
#[pyfunction]
fn parse_hand(text: &str) -> PyResult<Vec<u8>> {
    Ok(parser::parse_tiles(text)?.iter().map(|t| t.id()).collect())
}

/// Labeled draw decisions of a whole log, as JSON rows.
#[pyfunction]
fn extract_decisions(data: &[u8]) -> PyResult<String> {
    let log = GameLog::from_bytes(data)?;
    let rows = action::extract_decisions(&log, tables()?)?;
    serde_json::to_string(&rows).map_err(|e| PyValueError::new_err(e.to_string()))
}

/// Riichi declaration rows of a whole log, as JSON.
#[pyfunction]
fn extract_riichi_discards(data: &[u8]) -> PyResult<String> {
    let log = GameLog::from_bytes(data)?;
    let rows = action::extract_riichi_discards(&log, tables()?)?;
    serde_json::to_string(&rows).map_err(|e| PyValueError::new_err(e.to_string()))
}

#[pymodule]
fn tenhou_core(_py: Python, m: &Bound<'_, PyModule>) -> PyResult<()> {
    m.add_function(wrap_pyfunction!(decode_log, m)?)?;
    m.add_function(wrap_pyfunction!(decode_log_hex, m)?)?;
    m.add_function(wrap_pyfunction!(calc_shanten, m)?)?;
    m.add_function(wrap_pyfunction!(is_agari, m)?)?;
    m.add_function(wrap_pyfunction!(hand_waits, m)?)?;
    m.add_function(wrap_pyfunction!(check_ankan_after_riichi, m)?)?;
    m.add_function(wrap_pyfunction!(riichi_candidates, m)?)?;
    m.add_function(wrap_pyfunction!(parse_hand, m)?)?;
    m.add_function(wrap_pyfunction!(extract_decisions, m)?)?;
    m.add_function(wrap_pyfunction!(extract_riichi_discards, m)?)?;
    Ok(())
}
