use alloc::vec::Vec;
use core::cmp::min;

use crate::{TrieError, TrieResult};

/// Nibble marking the end of a leaf path.
pub const TERMINATOR: u8 = 16;

/// A path through the trie, one half byte per element.
///
/// Leaf paths end with [`TERMINATOR`].
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Nibbles {
    hex_data: Vec<u8>,
}

impl Nibbles {
    #[must_use]
    pub fn from_hex(hex: &[u8]) -> Self {
        Self {
            hex_data: hex.to_vec(),
        }
    }

    /// Splits every byte of `raw` into two nibbles, appending the terminator for leaf paths.
    #[must_use]
    pub fn from_raw(raw: &[u8], is_leaf: bool) -> Self {
        let mut hex_data = Vec::with_capacity(raw.len() * 2 + usize::from(is_leaf));
        for byte in raw {
            hex_data.push(byte >> 4);
            hex_data.push(byte & 0x0f);
        }
        if is_leaf {
            hex_data.push(TERMINATOR);
        }
        Self { hex_data }
    }

    /// Decodes the hex-prefix encoding used for leaf and extension keys.
    ///
    /// The high nibble of the first byte is the flag: bit 1 marks a leaf, bit 0 an odd path
    /// whose first nibble lives in the low half of the flag byte.
    pub fn from_compact(compact: &[u8]) -> TrieResult<Self> {
        let (&flag, rest) = compact.split_first().ok_or(TrieError::EmptyCompactPath)?;
        let mut hex_data = Vec::with_capacity(rest.len() * 2 + 2);

        let is_leaf = match flag >> 4 {
            0x0 => false,
            0x1 => {
                hex_data.push(flag & 0x0f);
                false
            }
            0x2 => true,
            0x3 => {
                hex_data.push(flag & 0x0f);
                true
            }
            _ => return Err(TrieError::InvalidCompactFlag(flag)),
        };

        for byte in rest {
            hex_data.push(byte >> 4);
            hex_data.push(byte & 0x0f);
        }
        if is_leaf {
            hex_data.push(TERMINATOR);
        }

        Ok(Self { hex_data })
    }

    /// Inverse of [`Nibbles::from_compact`].
    #[must_use]
    pub fn encode_compact(&self) -> Vec<u8> {
        let (path, flag) = if self.is_leaf() {
            (&self.hex_data[..self.hex_data.len() - 1], 0x20)
        } else {
            (self.hex_data.as_slice(), 0x00)
        };

        let mut compact = Vec::with_capacity(path.len() / 2 + 1);
        let even = match path.split_first() {
            Some((&first, rest)) if path.len() % 2 == 1 => {
                compact.push(flag | 0x10 | first);
                rest
            }
            _ => {
                compact.push(flag);
                path
            }
        };
        for pair in even.chunks_exact(2) {
            compact.push((pair[0] << 4) | pair[1]);
        }
        compact
    }

    #[must_use]
    pub fn is_leaf(&self) -> bool {
        self.hex_data.last() == Some(&TERMINATOR)
    }

    /// True when nothing but (at most) the terminator is left of the path.
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        self.hex_data.first().is_none_or(|nibble| *nibble == TERMINATOR)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.hex_data.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// # Panics
    /// If `i` is out of bounds.
    #[must_use]
    pub fn at(&self, i: usize) -> usize {
        usize::from(self.hex_data[i])
    }

    #[must_use]
    pub fn as_slice(&self) -> &[u8] {
        &self.hex_data
    }

    #[must_use]
    pub fn common_prefix(&self, other_partial: &Nibbles) -> usize {
        let len = min(self.len(), other_partial.len());
        self.hex_data[..len]
            .iter()
            .zip(&other_partial.hex_data[..len])
            .take_while(|(left, right)| left == right)
            .count()
    }

    #[must_use]
    pub fn offset(&self, index: usize) -> Nibbles {
        self.slice(index, self.hex_data.len())
    }

    #[must_use]
    pub fn slice(&self, start: usize, end: usize) -> Nibbles {
        Nibbles::from_hex(&self.hex_data[start..end])
    }
}
