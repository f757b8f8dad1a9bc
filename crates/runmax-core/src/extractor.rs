//! Max-run symbol extraction
//!
//! Splits a sequence into maximal runs of equal adjacent symbols and reports
//! which symbols own the longest run(s).
//!
//! ```rust
//! use runmax_core::extract_max_runs;
//!
//! let input = ["a", "a", "z", "z", "z", "a", "a"];
//! assert_eq!(extract_max_runs(&input), vec!["z"]);
//!
//! // Only singleton runs: no winner
//! assert!(extract_max_runs(&["a", "b", "c"]).is_empty());
//! ```

/// A maximal block of identical adjacent symbols
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Run<T> {
    /// The repeated symbol
    pub symbol: T,
    /// Number of consecutive occurrences (always >= 1)
    pub length: usize,
    /// Index of the first element of the run in the input
    pub start: usize,
}

/// Decompose `symbols` into maximal runs, in input order
pub fn runs<T: PartialEq + Clone>(symbols: &[T]) -> Vec<Run<T>> {
    let mut out: Vec<Run<T>> = Vec::new();

    for (index, symbol) in symbols.iter().enumerate() {
        match out.last_mut() {
            Some(run) if run.symbol == *symbol => run.length += 1,
            _ => out.push(Run {
                symbol: symbol.clone(),
                length: 1,
                start: index,
            }),
        }
    }

    out
}

/// Return the sorted, distinct symbols whose runs reach the maximum run length.
///
/// Empty input, or input where every run has length 1, yields an empty result.
pub fn extract_max_runs<T: Ord + Clone>(symbols: &[T]) -> Vec<T> {
    let runs = runs(symbols);

    let max_len = match runs.iter().map(|run| run.length).max() {
        Some(len) if len > 1 => len,
        _ => return Vec::new(),
    };

    let mut winners: Vec<T> = runs
        .into_iter()
        .filter(|run| run.length == max_len)
        .map(|run| run.symbol)
        .collect();

    winners.sort();
    winners.dedup();
    winners
}
