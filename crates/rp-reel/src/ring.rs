//! Symbol rings, spin targets and the fractional-target denylist

use serde::{Deserialize, Serialize};

use crate::POSITION_EPSILON;
use crate::error::{ReelError, ReelResult, RingError};

/// The 26 capital letters every reel carries
pub const LETTERS: &str = "ABCDEFGHIJKLMNOPQRSTUVWXYZ";

/// An ordered, cyclic sequence of distinct symbols
///
/// Serialized as the plain symbol list; deserializing goes through
/// [`SymbolRing::new`], so empty or duplicated lists are rejected.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "Vec<char>", into = "Vec<char>")]
pub struct SymbolRing {
    symbols: Vec<char>,
}

impl SymbolRing {
    /// Create a ring from symbols in order
    pub fn new(symbols: impl IntoIterator<Item = char>) -> Result<Self, RingError> {
        let symbols: Vec<char> = symbols.into_iter().collect();
        if symbols.is_empty() {
            return Err(RingError::Empty);
        }
        for (i, symbol) in symbols.iter().enumerate() {
            if symbols[..i].contains(symbol) {
                return Err(RingError::DuplicateSymbol(*symbol));
            }
        }
        Ok(Self { symbols })
    }

    /// A–Z
    pub fn alphabet() -> Self {
        Self {
            symbols: LETTERS.chars().collect(),
        }
    }

    /// A–Z followed by one special symbol (e.g. `#`)
    pub fn alphabet_with(extra: char) -> Result<Self, RingError> {
        Self::new(LETTERS.chars().chain(std::iter::once(extra)))
    }

    /// Ring length N
    pub fn len(&self) -> usize {
        self.symbols.len()
    }

    /// Always false; a ring is never empty
    pub fn is_empty(&self) -> bool {
        self.symbols.is_empty()
    }

    /// Symbols in ring order
    pub fn symbols(&self) -> &[char] {
        &self.symbols
    }

    /// Check ring membership
    pub fn contains(&self, symbol: char) -> bool {
        self.symbols.contains(&symbol)
    }

    /// Symbol at any signed index (wraps)
    pub fn symbol_at(&self, index: i64) -> char {
        let n = self.symbols.len() as i64;
        self.symbols[index.rem_euclid(n) as usize]
    }

    /// Wrap a real-valued index into `[0, N)`.
    ///
    /// Non-finite input has no place on the ring and maps to 0.
    pub fn normalize(&self, index: f64) -> f64 {
        if !index.is_finite() {
            return 0.0;
        }
        let n = self.symbols.len() as f64;
        let wrapped = index.rem_euclid(n);
        // rem_euclid can round up to exactly N for tiny negative inputs
        if wrapped >= n { 0.0 } else { wrapped }
    }

    /// Exact-match lookup of a symbol's index
    pub fn index_of(&self, symbol: char) -> ReelResult<usize> {
        self.symbols
            .iter()
            .position(|&s| s == symbol)
            .ok_or(ReelError::UnknownSymbol(symbol))
    }

    /// Resolve a spin target to a ring index.
    ///
    /// Fractional targets map to `floor(fraction * N)` and then pass through
    /// the denylist; concrete symbols are never remapped.
    pub fn resolve_target(&self, target: SpinTarget, denylist: &Denylist) -> ReelResult<usize> {
        match target {
            SpinTarget::Symbol(symbol) => self.index_of(symbol),
            SpinTarget::Fraction(fraction) => {
                if !(0.0..1.0).contains(&fraction) {
                    return Err(ReelError::InvalidFraction(fraction));
                }
                let n = self.symbols.len();
                let index = ((fraction * n as f64).floor() as usize).min(n - 1);
                denylist.apply(self, index)
            }
        }
    }

    /// Forward distance (increasing index, wrapping) from a possibly
    /// fractional position to a target index.
    ///
    /// Landing exactly on the target already is distance 0, not a full lap.
    pub fn distance_forward(&self, from: f64, to: usize) -> f64 {
        let n = self.symbols.len() as f64;
        let distance = self.normalize(to as f64 - self.normalize(from));
        if distance < POSITION_EPSILON || n - distance < POSITION_EPSILON {
            0.0
        } else {
            distance
        }
    }
}

impl TryFrom<Vec<char>> for SymbolRing {
    type Error = RingError;

    fn try_from(symbols: Vec<char>) -> Result<Self, Self::Error> {
        Self::new(symbols)
    }
}

impl From<SymbolRing> for Vec<char> {
    fn from(ring: SymbolRing) -> Self {
        ring.symbols
    }
}

/// Where a reel should come to rest
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpinTarget {
    /// A concrete ring symbol
    Symbol(char),
    /// A fraction in `[0, 1)` of the way around the ring
    Fraction(f64),
}

impl From<char> for SpinTarget {
    fn from(symbol: char) -> Self {
        Self::Symbol(symbol)
    }
}

/// One denylist rule
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Substitution {
    /// Symbol that must never be a fractional landing target
    pub symbol: char,
    /// Replacement; `None` means the ring successor of `symbol`
    #[serde(default)]
    pub substitute: Option<char>,
}

/// Rules forbidding symbols as fractional landing targets
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Denylist {
    rules: Vec<Substitution>,
}

impl Denylist {
    /// Empty denylist
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a rule
    pub fn with_rule(mut self, symbol: char, substitute: Option<char>) -> Self {
        self.rules.push(Substitution { symbol, substitute });
        self
    }

    /// Configured rules, in order
    pub fn rules(&self) -> &[Substitution] {
        &self.rules
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }

    /// Whether a symbol is forbidden as a fractional landing target
    pub fn forbids(&self, symbol: char) -> bool {
        self.rules.iter().any(|r| r.symbol == symbol)
    }

    /// Remap a resolved index once if its symbol is forbidden.
    ///
    /// Indices past the ring end wrap.
    pub fn apply(&self, ring: &SymbolRing, index: usize) -> ReelResult<usize> {
        let index = index % ring.len();
        let symbol = ring.symbols()[index];
        match self.rules.iter().find(|r| r.symbol == symbol) {
            None => Ok(index),
            Some(Substitution {
                substitute: Some(substitute),
                ..
            }) => ring.index_of(*substitute),
            Some(_) => Ok((index + 1) % ring.len()),
        }
    }
}

impl FromIterator<Substitution> for Denylist {
    fn from_iter<I: IntoIterator<Item = Substitution>>(iter: I) -> Self {
        Self {
            rules: iter.into_iter().collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn letter_ring() -> SymbolRing {
        SymbolRing::alphabet_with('#').unwrap()
    }

    #[test]
    fn test_ring_rejects_empty_and_duplicates() {
        assert_eq!(SymbolRing::new("".chars()), Err(RingError::Empty));
        assert_eq!(
            SymbolRing::new("ABCA".chars()),
            Err(RingError::DuplicateSymbol('A'))
        );
        assert_eq!(
            SymbolRing::alphabet_with('Q'),
            Err(RingError::DuplicateSymbol('Q'))
        );
    }

    #[test]
    fn test_normalize_wraps_both_directions() {
        let ring = letter_ring();
        assert_eq!(ring.len(), 27);
        assert_eq!(ring.normalize(49.5), 22.5);
        assert_eq!(ring.normalize(-1.0), 26.0);
        assert_eq!(ring.normalize(27.0), 0.0);
        assert_eq!(ring.normalize(-54.25), 26.75);
        assert_eq!(ring.normalize(1.0e9), 1.0e9 % 27.0);
        assert_eq!(ring.normalize(-1.0e-20), 0.0);
        assert_eq!(ring.normalize(f64::NAN), 0.0);
    }

    #[test]
    fn test_symbol_at_wraps() {
        let ring = letter_ring();
        assert_eq!(ring.symbol_at(0), 'A');
        assert_eq!(ring.symbol_at(26), '#');
        assert_eq!(ring.symbol_at(27), 'A');
        assert_eq!(ring.symbol_at(-1), '#');
    }

    #[test]
    fn test_index_of_unknown_symbol() {
        let ring = SymbolRing::alphabet();
        assert_eq!(ring.index_of('M'), Ok(12));
        assert_eq!(ring.index_of('#'), Err(ReelError::UnknownSymbol('#')));
    }

    #[test]
    fn test_distance_forward() {
        let ring = letter_ring();
        assert_eq!(ring.distance_forward(5.0, 5), 0.0);
        assert_eq!(ring.distance_forward(5.0, 6), 1.0);
        assert_eq!(ring.distance_forward(6.0, 5), 26.0);
        assert_eq!(ring.distance_forward(22.5, 12), 16.5);
        assert_eq!(ring.distance_forward(11.9999999999999, 12), 0.0);
    }

    #[test]
    fn test_resolve_fraction_targets() {
        let ring = SymbolRing::alphabet();
        let none = Denylist::new();
        assert_eq!(ring.resolve_target(SpinTarget::Fraction(0.0), &none), Ok(0));
        assert_eq!(ring.resolve_target(SpinTarget::Fraction(0.5), &none), Ok(13));
        assert_eq!(
            ring.resolve_target(SpinTarget::Fraction(0.999_999), &none),
            Ok(25)
        );
        assert_eq!(
            ring.resolve_target(SpinTarget::Fraction(1.0), &none),
            Err(ReelError::InvalidFraction(1.0))
        );
        assert!(matches!(
            ring.resolve_target(SpinTarget::Fraction(f64::NAN), &none),
            Err(ReelError::InvalidFraction(_))
        ));
    }

    #[test]
    fn test_denylist_successor_and_explicit_substitute() {
        let ring = SymbolRing::alphabet();
        // 'G' is index 6; 6/26 lands on it
        let g_slot = 6.0 / 26.0 + 0.001;

        let successor = Denylist::new().with_rule('G', None);
        assert_eq!(ring.resolve_target(SpinTarget::Fraction(g_slot), &successor), Ok(7));

        let explicit = Denylist::new().with_rule('G', Some('X'));
        assert_eq!(ring.resolve_target(SpinTarget::Fraction(g_slot), &explicit), Ok(23));

        // concrete symbols bypass the denylist
        assert_eq!(ring.resolve_target('G'.into(), &successor), Ok(6));
    }

    #[test]
    fn test_denylist_successor_wraps_at_ring_end() {
        let ring = SymbolRing::alphabet();
        let list = Denylist::new().with_rule('Z', None);
        assert_eq!(list.apply(&ring, 25), Ok(0));
    }

    #[test]
    fn test_denylist_wraps_out_of_range_index() {
        let ring = SymbolRing::alphabet();
        let list = Denylist::new().with_rule('G', None);
        assert_eq!(list.apply(&ring, 26 + 6), Ok(7));
        assert_eq!(list.apply(&ring, 26 * 3 + 1), Ok(1));
    }

    #[test]
    fn test_ring_deserialize_is_validated() {
        let ring: SymbolRing = serde_json::from_str(r##"["A","B","#"]"##).unwrap();
        assert_eq!(ring.symbols(), &['A', 'B', '#']);
        assert_eq!(serde_json::to_string(&ring).unwrap(), r##"["A","B","#"]"##);

        let empty = serde_json::from_str::<SymbolRing>("[]").unwrap_err();
        assert!(empty.to_string().contains("at least one symbol"));
        let duplicate = serde_json::from_str::<SymbolRing>(r#"["A","A"]"#).unwrap_err();
        assert!(duplicate.to_string().contains("'A' appears more than once"));
    }

    #[test]
    fn test_denylist_unknown_substitute() {
        let ring = SymbolRing::alphabet();
        let list = Denylist::new().with_rule('A', Some('#'));
        assert_eq!(list.apply(&ring, 0), Err(ReelError::UnknownSymbol('#')));
    }
}
