use super::{Command, LzEntry};
use thiserror::Error;

#[derive(Debug, Clone)]
pub struct Decompressor<'a> {
    src: &'a [Command],
    dst: Vec<u8>,
}

#[derive(Error, Debug, PartialEq, Eq)]
pub enum DecompressError {
    #[error("Back-reference distance {distance} exceeds the {available} bytes decoded so far")]
    DistanceOutOfBounds { distance: u8, available: usize },
}

impl<'a> Decompressor<'a> {
    pub fn new(src: &'a [Command]) -> Self {
        let capacity = src.iter().map(Command::plain_len).sum();

        Self {
            src,
            dst: Vec::with_capacity(capacity),
        }
    }

    pub fn decompress(mut self) -> Result<Vec<u8>, DecompressError> {
        for command in self.src {
            log::trace!("command: {:?}", command);

            match *command {
                Command::Raw(value) => self.dst.push(value),
                Command::Lz(entry) => self.copy_backread(entry)?,
            }
        }

        Ok(self.dst)
    }

    fn copy_backread(&mut self, entry: LzEntry) -> Result<(), DecompressError> {
        let back = entry.distance as usize;
        if back == 0 || back > self.dst.len() {
            return Err(DecompressError::DistanceOutOfBounds {
                distance: entry.distance,
                available: self.dst.len(),
            });
        }

        // byte by byte: the source may run into bytes written by this same copy
        for _ in 0..entry.length {
            self.dst.push(self.dst[self.dst.len() - back]);
        }

        Ok(())
    }
}

/// Replay a command sequence into the plain buffer it describes.
pub fn decode(commands: &[Command]) -> Result<Vec<u8>, DecompressError> {
    Decompressor::new(commands).decompress()
}
