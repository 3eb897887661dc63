//! Harmonic vectors and their permuted (encrypted) form.
//!
//! A [`HarmonicVector`] maps integer multipliers of a base frequency to
//! amplitudes. It is stored as an explicit ordered list of pairs: the keyed
//! cipher draws one offset per pair in order, so the order used to encrypt is
//! part of the data, not an accident of map iteration.

use std::fmt;

/// Integer factor applied to a base frequency.
///
/// Signed so that decrypting with the wrong secret can return whatever the
/// rounding produced, zero and negatives included, instead of failing.
pub type Multiplier = i32;

/// The canonical 3-6-9 multiplier set.
pub const CANONICAL_HARMONICS: [Multiplier; 3] = [3, 6, 9];

/// Ordered `(multiplier, amplitude)` pairs with unique multipliers.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct HarmonicVector {
    pairs: Vec<(Multiplier, f64)>,
}

impl HarmonicVector {
    /// Empty vector.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build from pairs; a repeated multiplier keeps its first position and
    /// takes the last amplitude.
    pub fn from_pairs(pairs: impl IntoIterator<Item = (Multiplier, f64)>) -> Self {
        pairs.into_iter().collect()
    }

    /// Layered signature with amplitude `1 / m` for each multiplier.
    pub fn reciprocal(multipliers: impl IntoIterator<Item = Multiplier>) -> Self {
        multipliers
            .into_iter()
            .filter(|&m| m != 0)
            .map(|m| (m, 1.0 / f64::from(m).abs()))
            .collect()
    }

    /// Set the amplitude for `multiplier`, returning the previous value.
    ///
    /// An existing multiplier keeps its position in the order.
    pub fn insert(&mut self, multiplier: Multiplier, amplitude: f64) -> Option<f64> {
        if let Some(slot) = self.pairs.iter_mut().find(|(m, _)| *m == multiplier) {
            Some(std::mem::replace(&mut slot.1, amplitude))
        } else {
            self.pairs.push((multiplier, amplitude));
            None
        }
    }

    /// Amplitude for `multiplier`, if present.
    pub fn get(&self, multiplier: Multiplier) -> Option<f64> {
        self.pairs
            .iter()
            .find(|(m, _)| *m == multiplier)
            .map(|&(_, a)| a)
    }

    /// Whether `multiplier` is present.
    pub fn contains(&self, multiplier: Multiplier) -> bool {
        self.get(multiplier).is_some()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// Pairs in order.
    pub fn pairs(&self) -> &[(Multiplier, f64)] {
        &self.pairs
    }

    /// Iterate pairs in order.
    pub fn iter(&self) -> impl Iterator<Item = (Multiplier, f64)> + '_ {
        self.pairs.iter().copied()
    }

    /// Multipliers in order.
    pub fn multipliers(&self) -> Vec<Multiplier> {
        self.pairs.iter().map(|&(m, _)| m).collect()
    }

    /// True when both vectors hold the same multiplier set, ignoring order
    /// and amplitudes.
    pub fn same_multipliers(&self, other: &HarmonicVector) -> bool {
        let mut a = self.multipliers();
        let mut b = other.multipliers();
        a.sort_unstable();
        b.sort_unstable();
        a == b
    }
}

impl FromIterator<(Multiplier, f64)> for HarmonicVector {
    fn from_iter<I: IntoIterator<Item = (Multiplier, f64)>>(iter: I) -> Self {
        let mut vector = HarmonicVector::new();
        for (m, a) in iter {
            vector.insert(m, a);
        }
        vector
    }
}

impl<'a> IntoIterator for &'a HarmonicVector {
    type Item = &'a (Multiplier, f64);
    type IntoIter = std::slice::Iter<'a, (Multiplier, f64)>;

    fn into_iter(self) -> Self::IntoIter {
        self.pairs.iter()
    }
}

impl fmt::Display for HarmonicVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .pairs
            .iter()
            .map(|(m, a)| format!("{m}x: {a:.3}"))
            .collect();
        write!(f, "{{{}}}", parts.join(", "))
    }
}

/// Encrypted form of a harmonic vector: `(frequency, amplitude)` pairs in the
/// order they were drawn, plus the base frequency they were computed from.
#[derive(Debug, Clone, PartialEq)]
pub struct PermutedHarmonicVector {
    base_freq: f64,
    pairs: Vec<(f64, f64)>,
}

impl PermutedHarmonicVector {
    /// Assemble a received sequence. The order of `pairs` must be the
    /// encryption order.
    pub fn new(base_freq: f64, pairs: Vec<(f64, f64)>) -> Self {
        Self { base_freq, pairs }
    }

    /// Base frequency used at encryption time.
    pub fn base_freq(&self) -> f64 {
        self.base_freq
    }

    /// `(frequency, amplitude)` pairs in encryption order.
    pub fn pairs(&self) -> &[(f64, f64)] {
        &self.pairs
    }

    /// Iterate pairs in encryption order.
    pub fn iter(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.pairs.iter().copied()
    }

    /// Number of pairs.
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether there are no pairs.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }
}
