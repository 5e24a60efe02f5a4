mod compress;
pub use compress::{encode, encode_parallel, Compressor};

mod decompress;
pub use decompress::{decode, DecompressError, Decompressor};

mod matcher;
pub use matcher::{find_best_match, MatchError};

/// Back-references can reach at most this many bytes behind the current position.
pub const MAX_DISTANCE: usize = 0xff;
/// Longest run a single back-reference can copy.
pub const MAX_LENGTH: usize = 0xff;
/// A one byte match costs more bits than a literal, so it is never emitted.
pub const MIN_LENGTH: usize = 2;

/// Copy `length` bytes starting `distance` bytes behind the end of the output.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct LzEntry {
    pub distance: u8,
    pub length: u8,
}

/// A single instruction of a compressed program.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Command {
    /// Emit the byte as-is
    Raw(u8),
    /// Repeat earlier output, see [`LzEntry`]
    Lz(LzEntry),
}

impl Command {
    /// Number of plain bytes this command produces.
    pub const fn plain_len(&self) -> usize {
        match self {
            Command::Raw(_) => 1,
            Command::Lz(entry) => entry.length as usize,
        }
    }

    /// Size of the command in the packed bitstream, tag bit included.
    pub const fn bit_len(&self) -> usize {
        match self {
            Command::Raw(_) => 1 + 8,
            Command::Lz(_) => 1 + 8 + 8,
        }
    }
}

impl From<LzEntry> for Command {
    fn from(entry: LzEntry) -> Self {
        Command::Lz(entry)
    }
}
