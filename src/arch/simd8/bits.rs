/// Sub-word packing helpers.
///
/// Lane `i` of a packed word always occupies bits `[i * width, (i + 1) * width)`,
/// i.e. lanes are little-endian. Signed lanes are two's complement.

/// Number of 16-bit weight slots in the weight bank
pub const SLOTS: usize = 4;

/// Number of 2-bit weight codes per slot
pub const CODES_PER_SLOT: usize = 8;

pub fn unpack_i8x4(word: u32) -> [i8; 4] {
  word.to_le_bytes().map(|b| b as i8)
}

pub fn pack_i8x4(lanes: [i8; 4]) -> u32 {
  u32::from_le_bytes(lanes.map(|l| l as u8))
}

pub fn unpack_i8x8(word: u64) -> [i8; 8] {
  word.to_le_bytes().map(|b| b as i8)
}

pub fn pack_i8x8(lanes: [i8; 8]) -> u64 {
  u64::from_le_bytes(lanes.map(|l| l as u8))
}

/// `lo` occupies bits [0, 32), `hi` bits [32, 64)
pub fn concat_u32(lo: u32, hi: u32) -> u64 {
  (hi as u64) << 32 | lo as u64
}

/// Inverse of [`concat_u32`]: returns `(lo, hi)`
pub fn split_u64(word: u64) -> (u32, u32) {
  (word as u32, (word >> 32) as u32)
}

/// Select one of the four 16-bit slots of a weight bank. Only the low two
/// bits of `index` are used.
pub fn slot(bank: u64, index: u8) -> u16 {
  (bank >> (16 * (index as u32 & 0b11))) as u16
}

/// Split a slot into its eight 2-bit codes, code 0 first
pub fn unpack_codes(slot: u16) -> [u8; CODES_PER_SLOT] {
  std::array::from_fn(|i| ((slot >> (2 * i)) & 0b11) as u8)
}
