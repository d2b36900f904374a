//! Sequence input and output.
//!
//! [`fasta`] reads plain or gzip-compressed FASTA through `noodles` and
//! writes records back out for cluster representatives.

pub mod fasta;
