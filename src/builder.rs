//! Laying out islands and reading puzzles from text.

use std::num::NonZero;
use std::str::FromStr;

use ndarray::Array2;
use thiserror::Error;

use crate::board::Board;
use crate::location::{Dimension, Location};

/// Largest number an island may carry: two bridges in each of four directions.
pub const MAX_TARGET: u8 = 8;

/// Reasons a board may fail to build. No partial board is ever produced.
#[derive(Clone, Debug, Error, Eq, PartialEq)]
pub enum ConstructionError {
    /// There were no rows, or no columns.
    #[error("board has no cells")]
    Empty,
    /// A row's length differs from that of the first row.
    #[error("board has {expected} cols, but row {row} has {found} cells")]
    DimensionMismatch {
        /// Index of the offending row, from 0.
        row: usize,
        /// Length of the first row.
        expected: usize,
        /// Length of the offending row.
        found: usize,
    },
    /// An island was placed outside the bounds given to [`BoardBuilder::with_dims`].
    #[error("island at {0} is outside the board")]
    FeatureOutOfBounds(Location),
    /// An island's number is 0 or more than [`MAX_TARGET`].
    #[error("island at {location} has target {target}; targets run from 1 to 8")]
    TargetOutOfRange {
        /// Where the island was placed.
        location: Location,
        /// The rejected number.
        target: u8,
    },
}

/// Lays out islands, then converts them into a [`Board`] with every river and crossing generated.
///
/// Builders mutate themselves while building but can be [`Clone`]d to save their state at some point.
#[derive(Clone)]
pub struct BoardBuilder {
    // width, height
    dims: (Dimension, Dimension),
    cells: Array2<Option<u8>>,
    invalid_reasons: Vec<ConstructionError>,
}

impl Default for BoardBuilder {
    fn default() -> Self {
        Self::with_dims((NonZero::<usize>::MIN, NonZero::<usize>::MIN))
    }
}

impl BoardBuilder {
    /// Construct a new [`Self`] with the specified dimensions, specified in `(width, height)` order.
    pub fn with_dims(dims: (Dimension, Dimension)) -> Self {
        Self {
            dims,
            cells: Array2::from_elem((dims.1.get(), dims.0.get()), None),
            invalid_reasons: Default::default(),
        }
    }

    /// Take the dimensions and islands from a grid of rows, with `None` for open water.
    ///
    /// The first row fixes the width; every other row must match it.
    pub fn from_rows(rows: &[Vec<Option<u8>>]) -> Result<Self, ConstructionError> {
        let height = NonZero::new(rows.len()).ok_or(ConstructionError::Empty)?;
        let width = NonZero::new(rows[0].len()).ok_or(ConstructionError::Empty)?;

        let mut builder = Self::with_dims((width, height));
        for (y, row) in rows.iter().enumerate() {
            if row.len() != width.get() {
                return Err(ConstructionError::DimensionMismatch { row: y, expected: width.get(), found: row.len() });
            }
            for (x, target) in row.iter().enumerate() {
                if let Some(target) = target {
                    builder.add_island(Location(x, y), *target);
                }
            }
        }

        match builder.invalid_reasons.first() {
            Some(reason) => Err(reason.clone()),
            None => Ok(builder),
        }
    }

    /// Place an island at `location`, replacing any already there.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](ConstructionError::FeatureOutOfBounds) or
    /// [`TargetOutOfRange`](ConstructionError::TargetOutOfRange) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn add_island(&mut self, location: Location, target: u8) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        if !(1..=MAX_TARGET).contains(&target) {
            self.invalid_reasons.push(ConstructionError::TargetOutOfRange { location, target });
            return self;
        }

        match self.cells.get_mut(location.as_index()) {
            Some(cell) => *cell = Some(target),
            None => self.invalid_reasons.push(ConstructionError::FeatureOutOfBounds(location)),
        }

        self
    }

    /// Remove the island at `location`, if there is one.
    ///
    /// May cause the builder to enter a [`FeatureOutOfBounds`](ConstructionError::FeatureOutOfBounds) invalid state.
    /// If the builder is already in an invalid state, this function does nothing.
    pub fn drop_location(&mut self, location: Location) -> &mut Self {
        if !self.invalid_reasons.is_empty() {
            return self;
        }

        match self.cells.get_mut(location.as_index()) {
            Some(cell) => *cell = None,
            None => self.invalid_reasons.push(ConstructionError::FeatureOutOfBounds(location)),
        }

        self
    }

    /// Check the validity of this builder.
    ///
    /// Returns `None` if the builder is valid, `Some(&Vec<ConstructionError>)` otherwise.
    pub fn is_valid(&self) -> Option<&Vec<ConstructionError>> {
        if self.invalid_reasons.is_empty() {
            None
        } else {
            Some(&self.invalid_reasons)
        }
    }

    /// Convert the state of this builder into a [`Board`], or report the first reason it is invalid.
    pub fn build(&self) -> Result<Board, ConstructionError> {
        if let Some(reason) = self.invalid_reasons.first() {
            return Err(reason.clone());
        }

        Ok(Board::from_cells(self.dims, &self.cells))
    }
}

/// Read a puzzle from text: one line per row, `1` through `8` for islands and anything else for water.
///
/// Blank lines are skipped, as are the carriage returns of Windows line endings.
pub fn parse(text: &str) -> Result<Board, ConstructionError> {
    let rows = text.split('\n')
        .map(|line| line.trim_matches(|c| c == '\r' || c == '\n'))
        .filter(|line| !line.is_empty())
        .map(|line| line.chars()
            .map(|c| match c {
                '1'..='8' => c.to_digit(10).and_then(|digit| u8::try_from(digit).ok()),
                _ => None,
            })
            .collect())
        .collect::<Vec<Vec<Option<u8>>>>();

    BoardBuilder::from_rows(&rows)?.build()
}

impl FromStr for Board {
    type Err = ConstructionError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse(s)
    }
}
