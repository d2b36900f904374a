//! Canonical k-mer enumeration over 2-bit packed nucleotides.
//!
//! Bases are packed as A=0, C=1, G=2, T=3, so comparing two packed k-mers
//! numerically is the same as comparing them lexicographically. Any byte
//! outside `ACGTacgt` ends the current run of valid bases; no k-mer spans it.

/// Largest k that fits a packed k-mer into a `u64`
pub const MAX_KMER_LENGTH: usize = 32;

#[inline]
fn encode_base(base: u8) -> Option<u64> {
    match base {
        b'A' | b'a' => Some(0),
        b'C' | b'c' => Some(1),
        b'G' | b'g' => Some(2),
        b'T' | b't' => Some(3),
        _ => None,
    }
}

/// Iterator over the canonical packed k-mers of a sequence.
///
/// Yields one value per window of `k` consecutive valid bases: the smaller of
/// the forward k-mer and its reverse complement.
pub struct CanonicalKmers<'a> {
    sequence: &'a [u8],
    position: usize,
    k: usize,
    mask: u64,
    shift: usize,
    forward: u64,
    reverse: u64,
    /// Valid bases seen since the last break, saturating at k
    filled: usize,
}

impl<'a> CanonicalKmers<'a> {
    /// Callers must keep `k` within `1..=MAX_KMER_LENGTH`.
    pub fn new(sequence: &'a [u8], k: usize) -> Self {
        debug_assert!((1..=MAX_KMER_LENGTH).contains(&k));
        let mask = if k == MAX_KMER_LENGTH {
            u64::MAX
        } else {
            (1u64 << (2 * k)) - 1
        };
        Self {
            sequence,
            position: 0,
            k,
            mask,
            shift: 2 * (k - 1),
            forward: 0,
            reverse: 0,
            filled: 0,
        }
    }
}

impl Iterator for CanonicalKmers<'_> {
    type Item = u64;

    fn next(&mut self) -> Option<u64> {
        while self.position < self.sequence.len() {
            let base = self.sequence[self.position];
            self.position += 1;

            let Some(code) = encode_base(base) else {
                self.filled = 0;
                self.forward = 0;
                self.reverse = 0;
                continue;
            };

            self.forward = ((self.forward << 2) | code) & self.mask;
            self.reverse = (self.reverse >> 2) | ((3 - code) << self.shift);
            if self.filled < self.k {
                self.filled += 1;
            }
            if self.filled == self.k {
                return Some(self.forward.min(self.reverse));
            }
        }
        None
    }
}

/// Reverse complement of a nucleotide sequence; non-ACGT bytes are kept as is
#[must_use]
pub fn reverse_complement(sequence: &[u8]) -> Vec<u8> {
    sequence
        .iter()
        .rev()
        .map(|&base| match base {
            b'A' => b'T',
            b'T' => b'A',
            b'C' => b'G',
            b'G' => b'C',
            b'a' => b't',
            b't' => b'a',
            b'c' => b'g',
            b'g' => b'c',
            other => other,
        })
        .collect()
}
