mod bits;

mod compression;
pub use compression::{
    decode, encode, encode_parallel, find_best_match, Command, Compressor, DecompressError,
    Decompressor, LzEntry, MatchError, MAX_DISTANCE, MAX_LENGTH, MIN_LENGTH,
};

mod container;
pub use container::{
    build_header, deserialize, pack, serialize, unpack, Endianness, FormatError, Header,
    HeaderLayout, PackError, PlatformDefinition, PlatformMap, PlatformMapError, UnpackError,
    SIGNATURE,
};
