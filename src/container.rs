use byteorder::{BigEndian, ByteOrder, LittleEndian};
use thiserror::Error;

use crate::{
    bits::{BitReader, BitWriter},
    compression::{self, Command, DecompressError, LzEntry},
};

mod platform;
pub use platform::{PlatformDefinition, PlatformMap, PlatformMapError};

/// Marks a compressed file, stored at offset 0 in both layouts.
pub const SIGNATURE: u32 = 0x8000_0001;
/// Signature and plain size, the only meaningful header bytes.
pub const HEADER_FIELDS_LEN: usize = 8;

#[derive(Error, Debug, PartialEq, Eq)]
pub enum FormatError {
    #[error("Compressed signature not found (found {0:#010x})")]
    BadSignature(u32),
    #[error("Header declares a plain size of zero")]
    ZeroPlainSize,
    #[error("Stream is {len} bytes long but the header needs {required}")]
    TruncatedHeader { len: usize, required: usize },
    #[error("Bitstream ended at bit {bit_offset} after {decoded} of {plain_size} bytes")]
    Truncated {
        bit_offset: usize,
        decoded: usize,
        plain_size: u32,
    },
}

#[derive(Error, Debug)]
pub enum PackError {
    #[error("Input of {0} bytes does not fit into the 32-bit size field")]
    TooLarge(usize),
}

#[derive(Error, Debug)]
pub enum UnpackError {
    #[error("Malformed compressed stream")]
    Format(#[from] FormatError),
    #[error("Failed to decompress data")]
    Decompress(#[from] DecompressError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Endianness {
    Big,
    Little,
}

impl Endianness {
    fn read_u32(self, buf: &[u8]) -> u32 {
        match self {
            Endianness::Big => BigEndian::read_u32(buf),
            Endianness::Little => LittleEndian::read_u32(buf),
        }
    }

    fn write_u32(self, buf: &mut [u8], value: u32) {
        match self {
            Endianness::Big => BigEndian::write_u32(buf, value),
            Endianness::Little => LittleEndian::write_u32(buf, value),
        }
    }
}

/// Byte order of the header fields and the offset at which the bitstream starts.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeaderLayout {
    endianness: Endianness,
    data_offset: usize,
}

impl HeaderLayout {
    pub const GAMECUBE: Self = Self {
        endianness: Endianness::Big,
        data_offset: 0x20,
    };
    /// Shared by the PC and Xbox releases.
    pub const PC: Self = Self {
        endianness: Endianness::Little,
        data_offset: 0x80,
    };

    /// Returns `None` if the header would not fit the signature and plain size.
    pub const fn new(endianness: Endianness, data_offset: usize) -> Option<Self> {
        if data_offset < HEADER_FIELDS_LEN {
            return None;
        }

        Some(Self {
            endianness,
            data_offset,
        })
    }

    pub const fn from_flag(gamecube: bool) -> Self {
        if gamecube {
            Self::GAMECUBE
        } else {
            Self::PC
        }
    }

    pub const fn endianness(&self) -> Endianness {
        self.endianness
    }

    pub const fn data_offset(&self) -> usize {
        self.data_offset
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    pub plain_size: u32,
}

impl Header {
    /// Read and validate the signature and plain size fields.
    pub fn read(data: &[u8], layout: HeaderLayout) -> Result<Self, FormatError> {
        if data.len() < HEADER_FIELDS_LEN {
            return Err(FormatError::TruncatedHeader {
                len: data.len(),
                required: HEADER_FIELDS_LEN,
            });
        }

        let signature = layout.endianness.read_u32(&data[0..4]);
        if signature != SIGNATURE {
            return Err(FormatError::BadSignature(signature));
        }

        let plain_size = layout.endianness.read_u32(&data[4..8]);
        if plain_size == 0 {
            return Err(FormatError::ZeroPlainSize);
        }

        Ok(Self { plain_size })
    }
}

/// Signature and plain size followed by zero padding up to the bitstream offset.
pub fn build_header(plain_size: u32, layout: HeaderLayout) -> Vec<u8> {
    let mut header = vec![0; layout.data_offset];

    layout.endianness.write_u32(&mut header[0..4], SIGNATURE);
    layout.endianness.write_u32(&mut header[4..8], plain_size);

    header
}

/// Pack commands into the bitstream that follows the header.
pub fn serialize<'c>(commands: impl IntoIterator<Item = &'c Command>) -> Vec<u8> {
    let mut writer = BitWriter::new();

    for command in commands {
        match *command {
            Command::Raw(value) => {
                writer.write_bit(false);
                writer.write_u8(value);
            }
            Command::Lz(entry) => {
                writer.write_bit(true);
                writer.write_u8(entry.distance);
                writer.write_u8(entry.length);
            }
        }
    }

    writer.finish()
}

/// Parse a whole compressed file, header included, into its commands.
///
/// Reading stops as soon as the commands cover the plain size from the header;
/// the last one may overshoot it and anything after it is ignored.
pub fn deserialize(data: &[u8], layout: HeaderLayout) -> Result<Vec<Command>, FormatError> {
    let header = Header::read(data, layout)?;

    let stream = data
        .get(layout.data_offset..)
        .ok_or(FormatError::TruncatedHeader {
            len: data.len(),
            required: layout.data_offset,
        })?;
    let mut reader = BitReader::new(stream);

    let plain_size = header.plain_size as usize;
    let mut plain_pos = 0;
    let mut commands = Vec::new();

    while plain_pos < plain_size {
        let command = read_command(&mut reader).ok_or_else(|| FormatError::Truncated {
            bit_offset: reader.bit_pos(),
            decoded: plain_pos,
            plain_size: header.plain_size,
        })?;

        plain_pos += command.plain_len();
        commands.push(command);
    }

    log::debug!(
        "Read {} commands from {} bits of stream",
        commands.len(),
        reader.bit_pos()
    );

    Ok(commands)
}

fn read_command(reader: &mut BitReader) -> Option<Command> {
    if reader.read_bit()? {
        let distance = reader.read_u8()?;
        let length = reader.read_u8()?;

        Some(Command::Lz(LzEntry { distance, length }))
    } else {
        Some(Command::Raw(reader.read_u8()?))
    }
}

/// Compress a plain buffer into a complete file: header followed by the bitstream.
pub fn pack(plain: &[u8], layout: HeaderLayout) -> Result<Vec<u8>, PackError> {
    let plain_size = u32::try_from(plain.len()).map_err(|_| PackError::TooLarge(plain.len()))?;

    let commands = compression::encode(plain);

    let mut packed = build_header(plain_size, layout);
    packed.extend(serialize(&commands));

    Ok(packed)
}

/// Decompress a complete file produced by [`pack`] or the game's own tools.
pub fn unpack(data: &[u8], layout: HeaderLayout) -> Result<Vec<u8>, UnpackError> {
    let header = Header::read(data, layout)?;
    let commands = deserialize(data, layout)?;
    let plain = compression::decode(&commands)?;

    if plain.len() != header.plain_size as usize {
        log::warn!(
            "Decoded {} bytes but the header declares {}",
            plain.len(),
            header.plain_size
        );
    }

    Ok(plain)
}
