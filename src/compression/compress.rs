use super::{matcher, Command, LzEntry};
use rayon::prelude::*;

/// Greedy LZ encoder with one byte of lazy lookahead.
pub struct Compressor<'a> {
    src: &'a [u8],
    pos: usize,

    // match finder results for every position, filled by `precompute`
    matches: Option<Vec<Option<LzEntry>>>,
    progress: Option<&'a (dyn Fn(u64) + Sync)>,

    dst: Vec<Command>,
}

impl<'a> Compressor<'a> {
    pub fn new(src: &'a [u8]) -> Self {
        Self {
            src,
            pos: 0,
            matches: None,
            progress: None,
            dst: Vec::new(),
        }
    }

    /// Report progress in plain bytes. When matches are precomputed the callback
    /// fires once per searched position instead.
    pub fn with_progress(mut self, progress: &'a (dyn Fn(u64) + Sync)) -> Self {
        self.progress = Some(progress);
        self
    }

    /// Run the match finder for every position up front, spread across threads.
    /// The commands produced afterwards are identical to the sequential path.
    pub fn precompute(mut self) -> Self {
        let src = self.src;
        let progress = self.progress;

        let matches = (0..src.len())
            .into_par_iter()
            .map(|pos| {
                let found = matcher::search(src, pos);
                if let Some(progress) = progress {
                    progress(1);
                }
                found
            })
            .collect();

        self.matches = Some(matches);
        self
    }

    pub fn compress(mut self) -> Vec<Command> {
        while self.pos < self.src.len() {
            let Some(entry) = self.find_match(self.pos) else {
                self.dst.push(Command::Raw(self.src[self.pos]));
                self.advance(1);
                continue;
            };

            // entry.length >= 2, so pos + 1 is still inside the buffer
            match self.find_match(self.pos + 1) {
                Some(skip) if skip.length > entry.length => {
                    self.dst.push(Command::Raw(self.src[self.pos]));
                    self.dst.push(Command::Lz(skip));
                    self.advance(skip.length as usize + 1);
                }
                _ => {
                    self.dst.push(Command::Lz(entry));
                    self.advance(entry.length as usize);
                }
            }
        }

        let raw_count = self
            .dst
            .iter()
            .filter(|command| matches!(command, Command::Raw(_)))
            .count();
        log::debug!(
            "Encoded {} bytes into {} commands ({} raw, {} back-references)",
            self.src.len(),
            self.dst.len(),
            raw_count,
            self.dst.len() - raw_count
        );

        self.dst
    }

    fn find_match(&self, pos: usize) -> Option<LzEntry> {
        match &self.matches {
            Some(matches) => matches[pos],
            None => matcher::search(self.src, pos),
        }
    }

    fn advance(&mut self, count: usize) {
        self.pos += count;

        if self.matches.is_none() {
            if let Some(progress) = self.progress {
                progress(count as u64);
            }
        }
    }
}

/// Encode a plain buffer into a command sequence.
pub fn encode(src: &[u8]) -> Vec<Command> {
    Compressor::new(src).compress()
}

/// Same output as [`encode`], with the match search run in parallel.
pub fn encode_parallel(src: &[u8]) -> Vec<Command> {
    Compressor::new(src).precompute().compress()
}
