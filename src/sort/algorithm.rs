//! Names of all available sorts.
use serde_derive::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// All sorts the engine knows how to animate.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Algorithm {
    /// adjacent swaps until a pass swaps nothing
    Bubble,
    /// shift right while greater
    Insertion,
    /// swap the suffix minimum into place
    Selection,
    /// lomuto partitioning directly on the links
    Quick,
    /// top-down merge with a single scratch buffer
    Merge,
    /// bitonic network, power of two lengths only
    Bitonic,
    /// shuffle until sorted
    Bogo,
    /// LSD base 10, non-negative integers only
    Radix,
}

impl Algorithm {
    /// Every algorithm, in cycling order.
    pub const ALL: [Algorithm; 8] = [
        Algorithm::Bubble,
        Algorithm::Quick,
        Algorithm::Merge,
        Algorithm::Insertion,
        Algorithm::Bitonic,
        Algorithm::Bogo,
        Algorithm::Selection,
        Algorithm::Radix,
    ];

    /// Human readable name.
    pub fn name(self) -> &'static str {
        match self {
            Algorithm::Bubble => "Bubble Sort",
            Algorithm::Insertion => "Insertion Sort",
            Algorithm::Selection => "Selection Sort",
            Algorithm::Quick => "Quick Sort",
            Algorithm::Merge => "Merge Sort",
            Algorithm::Bitonic => "Bitonic Sort",
            Algorithm::Bogo => "Bogo Sort",
            Algorithm::Radix => "Radix Sort",
        }
    }

    /// The algorithm following us in `ALL`, wrapping around.
    pub fn next(self) -> Algorithm {
        let position = Algorithm::ALL
            .iter()
            .position(|&a| a == self)
            .unwrap_or(0);
        Algorithm::ALL[(position + 1) % Algorithm::ALL.len()]
    }

    /// Do equal values keep their relative order ?
    pub fn is_stable(self) -> bool {
        matches!(
            self,
            Algorithm::Bubble | Algorithm::Insertion | Algorithm::Merge | Algorithm::Radix
        )
    }
}

impl fmt::Display for Algorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Unknown algorithm name.
#[derive(Debug, Error)]
#[error("unknown sort algorithm '{0}'")]
pub struct ParseAlgorithmError(String);

impl FromStr for Algorithm {
    type Err = ParseAlgorithmError;
    /// Accepts "quick", "Quick Sort", "quicksort"... case insensitively.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted: String = s
            .chars()
            .filter(|c| !c.is_whitespace() && *c != '_' && *c != '-')
            .collect::<String>()
            .to_lowercase();
        let wanted = wanted.strip_suffix("sort").unwrap_or(&wanted);
        Algorithm::ALL
            .iter()
            .copied()
            .find(|a| {
                a.name()
                    .trim_end_matches(" Sort")
                    .eq_ignore_ascii_case(wanted)
            })
            .ok_or_else(|| ParseAlgorithmError(s.to_owned()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_names() {
        assert_eq!("bubble".parse::<Algorithm>().unwrap(), Algorithm::Bubble);
        assert_eq!("Quick Sort".parse::<Algorithm>().unwrap(), Algorithm::Quick);
        assert_eq!("mergesort".parse::<Algorithm>().unwrap(), Algorithm::Merge);
        assert_eq!("RADIX".parse::<Algorithm>().unwrap(), Algorithm::Radix);
        assert!("heap".parse::<Algorithm>().is_err());
        for algorithm in Algorithm::ALL.iter() {
            assert_eq!(algorithm.name().parse::<Algorithm>().unwrap(), *algorithm);
        }
    }

    #[test]
    fn cycling_visits_everything() {
        let mut algorithm = Algorithm::Bubble;
        let mut seen = Vec::new();
        for _ in 0..Algorithm::ALL.len() {
            seen.push(algorithm);
            algorithm = algorithm.next();
        }
        assert_eq!(algorithm, Algorithm::Bubble);
        assert_eq!(seen, Algorithm::ALL.to_vec());
    }
}
