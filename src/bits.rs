/// Packs bits MSB-first into a byte buffer with no alignment between writes.
#[derive(Debug, Default)]
pub struct BitWriter {
    buffer: Vec<u8>,
    byte: u8,
    bit_count: u8,
}

impl BitWriter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn write_bit(&mut self, bit: bool) {
        self.byte = (self.byte << 1) | bit as u8;
        self.bit_count += 1;

        if self.bit_count == 8 {
            self.buffer.push(self.byte);
            self.byte = 0;
            self.bit_count = 0;
        }
    }

    pub fn write_u8(&mut self, value: u8) {
        for shift in (0..8).rev() {
            self.write_bit((value >> shift) & 1 != 0);
        }
    }

    /// Zero-pads the last partial byte and returns the packed stream.
    pub fn finish(mut self) -> Vec<u8> {
        if self.bit_count > 0 {
            self.buffer.push(self.byte << (8 - self.bit_count));
        }

        self.buffer
    }
}

/// Reads bits MSB-first from a byte slice. Returns `None` once the slice is exhausted.
#[derive(Debug, Clone)]
pub struct BitReader<'a> {
    src: &'a [u8],
    // position in bits from the start of `src`
    bit_pos: usize,
}

impl<'a> BitReader<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self { src, bit_pos: 0 }
    }

    pub fn bit_pos(&self) -> usize {
        self.bit_pos
    }

    pub fn read_bit(&mut self) -> Option<bool> {
        let byte = *self.src.get(self.bit_pos / 8)?;
        let shift = 7 - (self.bit_pos % 8);
        self.bit_pos += 1;

        Some((byte >> shift) & 1 != 0)
    }

    pub fn read_u8(&mut self) -> Option<u8> {
        if self.bit_pos + 8 > self.src.len() * 8 {
            return None;
        }

        let mut value = 0;
        for _ in 0..8 {
            value = (value << 1) | self.read_bit()? as u8;
        }

        Some(value)
    }
}
