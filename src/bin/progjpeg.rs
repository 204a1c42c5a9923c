//! progjpeg CLI - progressive JPEG encoder and decoder.
//!
//! Encodes PNM or raw 8-bit pixels with a configurable scan script, decodes
//! baseline and progressive streams, and dumps frame and scan structure.

use clap::{Parser, Subcommand, ValueEnum};
use progjpeg::{
    EncodeOptions, GrayImage, Image, Jpeg1Decoder, RgbImage, ScanDescriptor, ScanScript, ScanScriptPolicy,
};
use std::fs;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// Progressive JPEG encoder and decoder with configurable scan scripts
#[derive(Parser)]
#[command(name = "progjpeg")]
#[command(version)]
#[command(about = "Encode, decode and inspect progressive JPEG streams", long_about = None)]
#[command(after_help = "EXAMPLES:
    progjpeg encode -i photo.ppm -o photo.jpg -q 85
    progjpeg encode -i photo.ppm -o photo.jpg --scan all:0-0 --scan 0:1-63 --scan 1:1-63 --scan 2:1-63
    progjpeg encode -i pixels.raw -o gray.jpg -w 640 -H 480 -n 1 --baseline
    progjpeg decode -i photo.jpg -o preview.ppm -f pnm --scans 1
    progjpeg info -i photo.jpg

SCAN SYNTAX:
    <component>:<start>-<end>[:<ah>/<al>]  where component is 'all' or a component index")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Encode PNM (P5/P6) or raw pixels to JPEG
    ///
    /// Raw input is assumed when --width and --height are given.
    #[command(visible_alias = "e")]
    Encode {
        #[arg(short, long, help = "Path to a PGM/PPM file or raw pixel data")]
        input: PathBuf,

        #[arg(short, long, help = "Path for the encoded output file")]
        output: PathBuf,

        /// Image width in pixels (raw input)
        #[arg(short, long)]
        width: Option<usize>,

        /// Image height in pixels (raw input)
        #[arg(short = 'H', long)]
        height: Option<usize>,

        /// Number of color components of raw input (1=grayscale, 3=RGB)
        #[arg(short = 'n', long, default_value = "3")]
        components: usize,

        /// Quality level (1-100)
        #[arg(short, long, default_value = "75")]
        quality: u8,

        /// Write a single sequential scan instead of a progressive stream
        #[arg(long)]
        baseline: bool,

        /// Scan of the progressive script, repeat in coding order
        #[arg(short, long = "scan", value_name = "SCAN")]
        scans: Vec<ScanDescriptor>,

        /// Reject an invalid scan script instead of falling back to the default
        #[arg(long)]
        strict: bool,

        /// Restart interval in MCUs (0 disables restart markers)
        #[arg(short, long, default_value = "0")]
        restart_interval: u16,
    },

    /// Decode a JPEG stream to raw pixels or PNM
    #[command(visible_alias = "d")]
    Decode {
        #[arg(short, long, help = "Path to the JPEG file")]
        input: PathBuf,

        #[arg(short, long, help = "Path for the output file")]
        output: PathBuf,

        #[arg(short, long, default_value = "raw", value_enum)]
        format: OutputFormat,

        /// Decode only the first N scans
        #[arg(long)]
        scans: Option<usize>,
    },

    /// Display frame, table and scan structure
    #[command(visible_alias = "i")]
    Info {
        #[arg(short, long, help = "Path to the JPEG file to inspect")]
        input: PathBuf,
    },

    /// Print the built-in scan scripts
    #[command(visible_alias = "s")]
    Scripts,
}

#[derive(Clone, ValueEnum)]
enum OutputFormat {
    /// Raw interleaved 8-bit samples (gray or RGB)
    Raw,
    /// Portable anymap (PGM for gray, PPM for color)
    Pnm,
}

fn main() {
    env_logger::init();
    let cli = Cli::parse();

    let result = match cli.command {
        Commands::Encode {
            input,
            output,
            width,
            height,
            components,
            quality,
            baseline,
            scans,
            strict,
            restart_interval,
        } => {
            let options = EncodeOptions {
                quality,
                progressive: !baseline,
                scan_script: (!scans.is_empty()).then(|| ScanScript::new(scans)),
                scan_script_policy: if strict { ScanScriptPolicy::Strict } else { ScanScriptPolicy::Lenient },
                restart_interval,
            };
            encode_image(&input, &output, width.zip(height), components, &options)
        }
        Commands::Decode { input, output, format, scans } => decode_image(&input, &output, &format, scans),
        Commands::Info { input } => show_info(&input),
        Commands::Scripts => list_scripts(),
    };

    if let Err(e) = result {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }
}

enum SourceImage {
    Gray(GrayImage),
    Rgb(RgbImage),
}

fn encode_image(
    input: &Path,
    output: &Path,
    raw_size: Option<(usize, usize)>,
    components: usize,
    options: &EncodeOptions,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let image = match raw_size {
        Some((width, height)) => match components {
            1 => SourceImage::Gray(GrayImage::new(width, height, data)?),
            3 => SourceImage::Rgb(RgbImage::new(width, height, data)?),
            _ => return Err("raw input must have 1 or 3 components".into()),
        },
        None => read_pnm(&data)?,
    };

    let mut file = BufWriter::new(fs::File::create(output)?);
    let (width, height) = match &image {
        SourceImage::Gray(gray) => {
            progjpeg::encode(&mut file, gray, options)?;
            (gray.width(), gray.height())
        }
        SourceImage::Rgb(rgb) => {
            progjpeg::encode(&mut file, rgb, options)?;
            (rgb.width(), rgb.height())
        }
    };
    file.flush()?;

    println!(
        "Encoded {}x{} image to {:?} ({})",
        width,
        height,
        output,
        if options.progressive { "progressive" } else { "baseline" }
    );
    Ok(())
}

fn decode_image(
    input: &Path,
    output: &Path,
    format: &OutputFormat,
    scan_limit: Option<usize>,
) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    let mut decoder = Jpeg1Decoder::new(&data);
    if let Some(limit) = scan_limit {
        decoder = decoder.with_scan_limit(limit);
    }
    let image = decoder.decode()?;

    let (pixels, components) = match &image {
        Image::Gray(gray) => (gray.pixels().to_vec(), 1),
        Image::YCbCr(_) => (image.to_rgb().into_pixels(), 3),
    };
    match format {
        OutputFormat::Raw => fs::write(output, &pixels)?,
        OutputFormat::Pnm => write_pnm(output, &pixels, image.width(), image.height(), components)?,
    }

    println!(
        "Decoded {}x{} image ({} components, {} scans) to {:?}",
        image.width(),
        image.height(),
        components,
        decoder.scans().len(),
        output
    );
    Ok(())
}

fn show_info(input: &Path) -> Result<(), Box<dyn std::error::Error>> {
    let data = fs::read(input)?;
    println!("File: {:?}", input);
    println!("Size: {} bytes", data.len());
    println!();

    let mut decoder = Jpeg1Decoder::new(&data);
    decoder.decode_coefficients()?;
    let frame = decoder.frame_header().ok_or("missing frame header")?;
    println!("  Mode:       {:?}", frame.kind);
    println!("  Dimensions: {}x{}", frame.width, frame.height);
    println!("  Components: {}", frame.components.len());
    for (i, c) in frame.components.iter().enumerate() {
        println!("    [{}] id={} sampling={}x{} Tq={}", i, c.id, c.h, c.v, c.quant_table_dest);
    }
    if let Some(subsampling) = frame.subsampling() {
        println!("  Subsampling: {}", subsampling);
    }
    if decoder.restart_interval() > 0 {
        println!("  Restart:    every {} units", decoder.restart_interval());
    }
    println!("  Scans:      {}", decoder.scans().len());
    for (i, scan) in decoder.scans().iter().enumerate() {
        println!(
            "    #{:<2} components={:?} Ss={} Se={} Ah={} Al={}",
            i,
            scan.component_indices(),
            scan.spectral_start,
            scan.spectral_end,
            scan.approx_high,
            scan.approx_low
        );
    }
    Ok(())
}

fn list_scripts() -> Result<(), Box<dyn std::error::Error>> {
    println!("Grayscale: {}", ScanScript::default_grayscale());
    println!("Color:     {}", ScanScript::default_color());
    println!("Baseline:  {}", ScanScript::baseline());
    Ok(())
}

// Internal helpers

fn read_pnm(data: &[u8]) -> Result<SourceImage, Box<dyn std::error::Error>> {
    let mut pos = 0;
    let mut fields = Vec::with_capacity(4);
    while fields.len() < 4 {
        while pos < data.len() && (data[pos].is_ascii_whitespace() || data[pos] == b'#') {
            if data[pos] == b'#' {
                while pos < data.len() && data[pos] != b'\n' {
                    pos += 1;
                }
            } else {
                pos += 1;
            }
        }
        let start = pos;
        while pos < data.len() && !data[pos].is_ascii_whitespace() {
            pos += 1;
        }
        if start == pos {
            return Err("truncated PNM header".into());
        }
        fields.push(std::str::from_utf8(&data[start..pos])?);
    }
    // Exactly one whitespace byte separates the header from the samples.
    pos += 1;

    let width: usize = fields[1].parse()?;
    let height: usize = fields[2].parse()?;
    if fields[3] != "255" {
        return Err("only 8-bit PNM files are supported".into());
    }
    let samples = data.get(pos..).ok_or("truncated PNM data")?.to_vec();
    match fields[0] {
        "P5" => Ok(SourceImage::Gray(GrayImage::new(width, height, samples)?)),
        "P6" => Ok(SourceImage::Rgb(RgbImage::new(width, height, samples)?)),
        _ => Err("unsupported PNM type (expected P5 or P6)".into()),
    }
}

fn write_pnm(
    path: &Path,
    pixels: &[u8],
    width: usize,
    height: usize,
    components: usize,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut file = BufWriter::new(fs::File::create(path)?);

    if components == 1 {
        writeln!(file, "P5")?;
    } else {
        writeln!(file, "P6")?;
    }
    writeln!(file, "{} {}", width, height)?;
    writeln!(file, "255")?;
    file.write_all(pixels)?;
    file.flush()?;

    Ok(())
}
