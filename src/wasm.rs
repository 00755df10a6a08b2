use wasm_bindgen::prelude::*;

use crate::builder::parse;

/// Solve the puzzle in `puzzle`, returning the rendered board.
///
/// Throws if the puzzle does not parse or cannot be solved; the message then carries the board as far as it got.
#[wasm_bindgen(js_name = solvePuzzle)]
pub fn solve_puzzle(puzzle: &str) -> Result<String, JsValue> {
    let board = parse(puzzle).map_err(|err| JsValue::from(js_sys::Error::new(&err.to_string())))?;

    let outcome = board.solve();
    if outcome.verdict.is_solved() {
        Ok(outcome.board.to_string())
    } else {
        Err(js_sys::Error::new(&format!("{}{}", outcome.board, outcome.verdict)).into())
    }
}
