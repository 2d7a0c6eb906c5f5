//! Offline converters producing the driver's font and bitmap formats.

pub mod bitmap;
pub mod font;

/// Packs bits most significant first.
#[derive(Debug, Default)]
pub struct BitWriter {
    bytes: Vec<u8>,
    len: usize,
}

impl BitWriter {
    /// Bits written so far.
    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn push(&mut self, bit: bool) {
        if self.len % 8 == 0 {
            self.bytes.push(0);
        }
        if bit {
            if let Some(last) = self.bytes.last_mut() {
                *last |= 0x80 >> (self.len % 8);
            }
        }
        self.len += 1;
    }

    /// Appends the low `count` bits of `value`, highest first.
    pub fn push_bits(&mut self, value: usize, count: usize) {
        for bit in (0..count).rev() {
            self.push(value >> bit & 1 != 0);
        }
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bit_writer() {
        let mut bits = BitWriter::default();
        assert!(bits.is_empty());
        bits.push(true);
        bits.push_bits(0b01, 2);
        bits.push_bits(0b11111, 5);
        bits.push(true);
        assert_eq!(bits.len(), 9);
        assert!(!bits.is_empty());
        assert_eq!(bits.into_bytes(), vec![0b1011_1111, 0b1000_0000]);
    }
}
