use anyhow::Context;
use clap::{Args, Parser, Subcommand};
use indicatif::ProgressBar;
use riders_lzss::{Command, Compressor, Header, HeaderLayout, PackError, PlatformMap};
use std::{
    fs,
    path::{Path, PathBuf},
};

/// Compress and decompress data for the Sonic Riders PC, Xbox and GameCube releases
#[derive(Parser, Debug)]
struct Arguments {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Decompress a packed file
    Unpack {
        input: PathBuf,

        /// Output plain file name
        #[arg(short, long, default_value = "decompressed.bin")]
        out_name: PathBuf,

        #[command(flatten)]
        platform: PlatformArgs,
    },

    /// Compress a plain file
    Pack {
        input: PathBuf,

        /// Output packed file name
        #[arg(short, long, default_value = "compressed.bin")]
        out_name: PathBuf,

        #[command(flatten)]
        platform: PlatformArgs,

        #[command(flatten)]
        args: PackArgs,
    },

    /// Print the header and command statistics of a packed file
    Info {
        input: PathBuf,

        #[command(flatten)]
        platform: PlatformArgs,
    },
}

#[derive(Args, Debug, Clone)]
struct PlatformArgs {
    /// Platform the file belongs to, which decides the header layout
    #[arg(short, long, default_value = "pc")]
    platform: String,

    /// Shortcut for `--platform gamecube`
    #[arg(long, conflicts_with = "platform")]
    gamecube: bool,

    /// Supply a custom platform map with additional header layouts
    #[arg(short = 'm', long)]
    platform_map: Option<PathBuf>,
}

impl PlatformArgs {
    fn layout(&self) -> anyhow::Result<HeaderLayout> {
        let additional_maps = match &self.platform_map {
            Some(path) => {
                let map = fs::read_to_string(path)
                    .with_context(|| format!("Failed to read platform map {}", path.display()))?;
                vec![PlatformMap::parse(&map)?]
            }
            None => Vec::new(),
        };

        let name = if self.gamecube {
            "gamecube"
        } else {
            self.platform.as_str()
        };

        let platform = PlatformMap::find_platform(name, &additional_maps).with_context(|| {
            let known = additional_maps
                .iter()
                .chain(std::iter::once(PlatformMap::inbuilt()))
                .flat_map(|map| map.names())
                .collect::<Vec<_>>();
            format!("Unknown platform '{}', known platforms: {}", name, known.join(", "))
        })?;

        let layout = platform.layout();
        log::debug!(
            "Using platform '{}': {:?} header, bitstream at {:#x}",
            platform.name,
            layout.endianness(),
            layout.data_offset()
        );

        Ok(layout)
    }
}

#[derive(Args, Debug, Clone)]
struct PackArgs {
    /// Search for matches on all cores before encoding. The output is identical
    #[arg(long)]
    parallel: bool,

    /// Unpack the result again and compare it against the input before writing
    #[arg(long)]
    verify: bool,
}

fn main() -> anyhow::Result<()> {
    let args = Arguments::parse();
    colog::init();

    match &args.command {
        Commands::Unpack {
            input,
            out_name,
            platform,
        } => unpack(input, out_name, platform.layout()?),
        Commands::Pack {
            input,
            out_name,
            platform,
            args,
        } => pack(input, out_name, platform.layout()?, args),
        Commands::Info { input, platform } => info(input, platform.layout()?),
    }
}

fn read_input(input: &Path) -> anyhow::Result<Vec<u8>> {
    fs::read(input).with_context(|| format!("Failed to read input file {}", input.display()))
}

fn unpack(input: &Path, out_name: &Path, layout: HeaderLayout) -> anyhow::Result<()> {
    let packed = read_input(input)?;

    let plain = riders_lzss::unpack(&packed, layout)
        .with_context(|| format!("Failed to unpack {}", input.display()))?;

    fs::write(out_name, &plain)
        .with_context(|| format!("Failed to write {}", out_name.display()))?;

    log::info!(
        "Unpacked {} bytes with CRC: {:#010x} to {}",
        plain.len(),
        crc32fast::hash(&plain),
        out_name.display()
    );

    Ok(())
}

fn pack(input: &Path, out_name: &Path, layout: HeaderLayout, args: &PackArgs) -> anyhow::Result<()> {
    let plain = read_input(input)?;
    let plain_size = u32::try_from(plain.len()).map_err(|_| PackError::TooLarge(plain.len()))?;

    if plain.is_empty() {
        log::warn!("Input is empty, the packed file will declare a plain size of zero");
    }

    log::info!("Encoding (1/2)...");
    let progress = ProgressBar::new(plain.len() as u64);
    let report = |count: u64| progress.inc(count);

    let mut compressor = Compressor::new(&plain).with_progress(&report);
    if args.parallel {
        compressor = compressor.precompute();
    }
    let commands = compressor.compress();
    progress.finish_and_clear();

    log::info!("Serializing (2/2)...");
    let progress = ProgressBar::new(commands.len() as u64);
    let stream = riders_lzss::serialize(progress.wrap_iter(commands.iter()));
    progress.finish_and_clear();

    let mut packed = riders_lzss::build_header(plain_size, layout);
    packed.extend(stream);

    if args.verify {
        verify(&plain, &packed, layout)?;
    }

    fs::write(out_name, &packed)
        .with_context(|| format!("Failed to write {}", out_name.display()))?;

    log::info!(
        "Packed {} bytes with CRC: {:#010x} into {} bytes ({:.1}%)",
        plain.len(),
        crc32fast::hash(&plain),
        packed.len(),
        packed.len() as f64 * 100.0 / plain.len().max(1) as f64
    );

    Ok(())
}

fn verify(plain: &[u8], packed: &[u8], layout: HeaderLayout) -> anyhow::Result<()> {
    let unpacked =
        riders_lzss::unpack(packed, layout).with_context(|| "Packed output failed to unpack")?;

    let expected = crc32fast::hash(plain);
    let actual = crc32fast::hash(&unpacked);
    anyhow::ensure!(
        plain.len() == unpacked.len() && expected == actual,
        "Round trip mismatch: expected {} bytes with CRC {:#010x}, got {} bytes with CRC {:#010x}",
        plain.len(),
        expected,
        unpacked.len(),
        actual
    );

    log::info!("Verified round trip with CRC: {:#010x}", expected);

    Ok(())
}

fn info(input: &Path, layout: HeaderLayout) -> anyhow::Result<()> {
    let packed = read_input(input)?;

    let header = Header::read(&packed, layout)
        .with_context(|| format!("Failed to read header of {}", input.display()))?;
    let commands = riders_lzss::deserialize(&packed, layout)
        .with_context(|| format!("Failed to read commands of {}", input.display()))?;

    let raw_count = commands
        .iter()
        .filter(|command| matches!(command, Command::Raw(_)))
        .count();
    let longest = commands
        .iter()
        .filter_map(|command| match command {
            Command::Lz(entry) => Some(entry.length),
            Command::Raw(_) => None,
        })
        .max();
    let stream_bits: usize = commands.iter().map(Command::bit_len).sum();

    println!("plain size:      {:#x} ({} bytes)", header.plain_size, header.plain_size);
    println!("bitstream start: {:#x}", layout.data_offset());
    println!("bitstream size:  {} bytes", stream_bits.div_ceil(8));
    println!("commands:        {}", commands.len());
    println!("  raw:           {}", raw_count);
    println!("  back-refs:     {}", commands.len() - raw_count);
    if let Some(longest) = longest {
        println!("  longest copy:  {}", longest);
    }
    println!(
        "ratio:           {:.1}%",
        (layout.data_offset() + stream_bits.div_ceil(8)) as f64 * 100.0
            / header.plain_size as f64
    );

    Ok(())
}
