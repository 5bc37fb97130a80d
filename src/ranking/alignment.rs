use serde::{Deserialize, Serialize};

use crate::ranking::MAX_SCORE;

/// Marks a cell whose row or column has been claimed
const CLAIMED: f64 = f64::NEG_INFINITY;

/// Row-major `rows x cols` score grid: observed mods down, reference mods across
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct SimilarityMatrix {
    rows: usize,
    cols: usize,
    cells: Vec<f64>,
}

/// One cell picked by the greedy pass
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AlignedPair {
    pub row: usize,
    pub col: usize,
    pub score: f64,
}

impl SimilarityMatrix {
    /// All-zero matrix
    pub fn new(rows: usize, cols: usize) -> Self {
        Self {
            rows,
            cols,
            cells: vec![0.0; rows * cols],
        }
    }

    pub fn rows(&self) -> usize {
        self.rows
    }

    pub fn cols(&self) -> usize {
        self.cols
    }

    pub fn get(&self, row: usize, col: usize) -> f64 {
        self.cells[row * self.cols + col]
    }

    pub fn set(&mut self, row: usize, col: usize, score: f64) {
        self.cells[row * self.cols + col] = score;
    }

    pub fn row(&self, row: usize) -> &[f64] {
        &self.cells[row * self.cols..(row + 1) * self.cols]
    }

    /// Rows holding more than one perfect cell
    pub fn ambiguous_rows(&self) -> Vec<usize> {
        (0..self.rows)
            .filter(|&r| self.row(r).iter().filter(|&&s| s >= MAX_SCORE).count() > 1)
            .collect()
    }

    /// Columns holding more than one perfect cell
    pub fn ambiguous_cols(&self) -> Vec<usize> {
        (0..self.cols)
            .filter(|&c| {
                (0..self.rows)
                    .filter(|&r| self.get(r, c) >= MAX_SCORE)
                    .count()
                    > 1
            })
            .collect()
    }

    /// Greedy one-to-one alignment.
    ///
    /// Repeatedly takes the highest remaining cell (first in row-major order
    /// on ties), then claims its row and column. Not an optimal assignment:
    /// ties between perfect cells are settled by scan order alone.
    pub fn greedy_pairs(&self) -> Vec<AlignedPair> {
        let mut cells = self.cells.clone();
        let mut pairs = Vec::with_capacity(self.rows.min(self.cols));

        for _ in 0..self.rows.min(self.cols) {
            let mut best: Option<AlignedPair> = None;
            for (index, &score) in cells.iter().enumerate() {
                if score == CLAIMED {
                    continue;
                }
                if best.map_or(true, |b| score > b.score) {
                    best = Some(AlignedPair {
                        row: index / self.cols,
                        col: index % self.cols,
                        score,
                    });
                }
            }

            let Some(pick) = best else {
                break;
            };
            for col in 0..self.cols {
                cells[pick.row * self.cols + col] = CLAIMED;
            }
            for row in 0..self.rows {
                cells[row * self.cols + pick.col] = CLAIMED;
            }
            pairs.push(pick);
        }

        pairs
    }
}
