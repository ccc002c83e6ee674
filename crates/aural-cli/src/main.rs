//! Aural CLI: command-line interface for the binaural renderer.
//!
//! Provides commands for resampling WAV files, applying inter-aural
//! effects (delay, gain, low-pass), spatializing audio through a SOFA
//! HRIR dataset, and inspecting dataset contents.
//!
//! # Usage
//!
//! ```bash
//! aural resample input.wav -o output.wav --rate 96000
//! aural delay input.wav -o output.wav --ear right --delay-ms 0.5
//! aural gain input.wav -o output.wav --ear left --factor 0.5
//! aural lowpass input.wav -o output.wav --ear right --cutoff 8000
//! aural render input.wav -o output.wav --sofa hrtf.sofa --azimuth 90 --elevation 0
//! aural info hrtf.sofa --json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};

use aural_codec::{decode_wav_file, encode_wav_file, resample, AudioBuffer};
use aural_dsp::{effects, render_buffer, Ear};
use aural_sofa::HrirDataset;

// ───────────────────────────── CLI definition ─────────────────────────────

/// Top-level CLI entry point for the `aural` binary.
#[derive(Parser)]
#[command(
    name = "aural",
    about = "Binaural audio renderer using measured HRTF datasets",
    version,
    long_about = "Spatializes audio by convolving it against head-related impulse\n\
                  responses from a SOFA dataset, with inter-aural delay, gain,\n\
                  and low-pass effects for psychoacoustic experiments."
)]
struct Cli {
    /// Enable verbose (debug-level) logging.
    #[arg(short, long, global = true)]
    verbose: bool,

    #[command(subcommand)]
    command: Commands,
}

/// Available sub-commands.
#[derive(Subcommand)]
enum Commands {
    /// Resample a WAV file to a new rate with linear interpolation.
    Resample {
        /// Input WAV file path.
        input: PathBuf,

        /// Output WAV file path.
        #[arg(short, long)]
        output: PathBuf,

        /// Target sample rate in Hz.
        #[arg(short, long, default_value_t = 96_000)]
        rate: u32,
    },

    /// Delay one ear of a stereo WAV file.
    ///
    /// Mono input is expanded to stereo first. A delay that truncates to
    /// zero whole samples leaves the audio untouched.
    Delay {
        /// Input WAV file path.
        input: PathBuf,

        /// Output WAV file path.
        #[arg(short, long)]
        output: PathBuf,

        /// Which ear to delay (left, right).
        #[arg(short, long)]
        ear: Ear,

        /// Delay in milliseconds.
        #[arg(short, long)]
        delay_ms: f64,
    },

    /// Scale one ear of a stereo WAV file by a gain factor.
    Gain {
        /// Input WAV file path.
        input: PathBuf,

        /// Output WAV file path.
        #[arg(short, long)]
        output: PathBuf,

        /// Which ear to scale (left, right).
        #[arg(short, long)]
        ear: Ear,

        /// Linear gain factor (1.0 = unchanged, 0.5 = half amplitude).
        #[arg(short, long)]
        factor: f64,
    },

    /// Low-pass filter one ear of a stereo WAV file.
    Lowpass {
        /// Input WAV file path.
        input: PathBuf,

        /// Output WAV file path.
        #[arg(short, long)]
        output: PathBuf,

        /// Which ear to filter (left, right).
        #[arg(short, long)]
        ear: Ear,

        /// Cutoff frequency in Hz.
        #[arg(short, long)]
        cutoff: f64,

        /// Butterworth filter order.
        #[arg(long, default_value_t = 2)]
        order: usize,
    },

    /// Spatialize a WAV file at a measured direction.
    ///
    /// The source is resampled to the dataset's native rate, convolved
    /// against the HRIR pair measured at exactly (azimuth, elevation),
    /// and written as 16-bit stereo at that rate.
    Render {
        /// Input WAV file path.
        input: PathBuf,

        /// Output WAV file path.
        #[arg(short, long)]
        output: PathBuf,

        /// SOFA HRIR dataset path.
        #[arg(short, long)]
        sofa: PathBuf,

        /// Source azimuth in degrees.
        #[arg(short, long)]
        azimuth: f64,

        /// Source elevation in degrees.
        #[arg(short, long)]
        elevation: f64,
    },

    /// Display information about a SOFA dataset or WAV file.
    Info {
        /// SOFA dataset or WAV file path (picked by extension).
        input: PathBuf,

        /// Output the information as JSON.
        #[arg(long)]
        json: bool,
    },
}

// ────────────────────────────── main ──────────────────────────────

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Initialize tracing subscriber with env-filter support.
    let filter = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Resample {
            input,
            output,
            rate,
        } => cmd_resample(&input, &output, rate),

        Commands::Delay {
            input,
            output,
            ear,
            delay_ms,
        } => cmd_delay(&input, &output, ear, delay_ms),

        Commands::Gain {
            input,
            output,
            ear,
            factor,
        } => cmd_gain(&input, &output, ear, factor),

        Commands::Lowpass {
            input,
            output,
            ear,
            cutoff,
            order,
        } => cmd_lowpass(&input, &output, ear, cutoff, order),

        Commands::Render {
            input,
            output,
            sofa,
            azimuth,
            elevation,
        } => cmd_render(&input, &output, &sofa, azimuth, elevation),

        Commands::Info { input, json } => cmd_info(&input, json),
    }
}

// ──────────────────────────── commands ──────────────────────────────

/// Resample a WAV file with linear interpolation.
fn cmd_resample(input: &Path, output: &Path, rate: u32) -> Result<()> {
    let buffer = read_input(input)?;
    let resampled = resample(&buffer, rate)
        .with_context(|| format!("Failed to resample to {rate} Hz"))?;

    println!(
        "  Resampled: {} Hz -> {} Hz ({} -> {} frames)",
        buffer.sample_rate(),
        rate,
        buffer.frame_count(),
        resampled.frame_count(),
    );
    write_output(output, &resampled)
}

/// Delay one ear of a stereo file.
fn cmd_delay(input: &Path, output: &Path, ear: Ear, delay_ms: f64) -> Result<()> {
    let buffer = as_stereo(read_input(input)?);
    let delayed = effects::delay(&buffer, ear, delay_ms / 1000.0)
        .with_context(|| format!("Failed to delay {ear} ear by {delay_ms} ms"))?;

    println!("  Delayed {ear} ear by {delay_ms} ms");
    write_output(output, &delayed)
}

/// Scale one ear of a stereo file.
fn cmd_gain(input: &Path, output: &Path, ear: Ear, factor: f64) -> Result<()> {
    let buffer = as_stereo(read_input(input)?);
    let scaled = effects::gain(&buffer, ear, factor)
        .with_context(|| format!("Failed to scale {ear} ear by {factor}"))?;

    println!("  Scaled {ear} ear by {factor}");
    write_output(output, &scaled)
}

/// Low-pass filter one ear of a stereo file.
fn cmd_lowpass(input: &Path, output: &Path, ear: Ear, cutoff: f64, order: usize) -> Result<()> {
    let buffer = as_stereo(read_input(input)?);
    let filtered = effects::lowpass(&buffer, ear, cutoff, order)
        .with_context(|| format!("Failed to low-pass {ear} ear at {cutoff} Hz"))?;

    println!("  Low-passed {ear} ear at {cutoff} Hz (order {order})");
    write_output(output, &filtered)
}

/// Spatialize a WAV file at the requested direction.
fn cmd_render(
    input: &Path,
    output: &Path,
    sofa: &Path,
    azimuth: f64,
    elevation: f64,
) -> Result<()> {
    let dataset = HrirDataset::load(sofa)
        .with_context(|| format!("Failed to load SOFA dataset: {}", sofa.display()))?;

    let buffer = read_input(input)?;
    let at_native = resample(&buffer, dataset.sample_rate())
        .with_context(|| format!("Failed to resample to {} Hz", dataset.sample_rate()))?;

    let (left_ir, right_ir) = dataset
        .lookup(azimuth, elevation)
        .with_context(|| format!("No measurement at azimuth {azimuth}, elevation {elevation}"))?;

    let rendered = render_buffer(&at_native, left_ir, right_ir, dataset.sample_rate())
        .context("Binaural rendering failed")?;

    println!(
        "  Rendered at azimuth {azimuth}, elevation {elevation} ({} taps, {} Hz)",
        dataset.taps(),
        dataset.sample_rate(),
    );
    write_output(output, &rendered)
}

/// Display information about a SOFA dataset or WAV file.
///
/// `.wav` inputs get a container summary; everything else is loaded as a
/// SOFA dataset. If `--json` is specified, outputs the summary as JSON.
fn cmd_info(input: &Path, json: bool) -> Result<()> {
    let is_wav = input
        .extension()
        .is_some_and(|e| e.eq_ignore_ascii_case("wav"));
    if is_wav {
        return cmd_info_wav(input, json);
    }

    let dataset = HrirDataset::load(input)
        .with_context(|| format!("Failed to load SOFA dataset: {}", input.display()))?;
    let info = dataset.info();

    if json {
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("  SOFA Dataset Information");
    println!("  ============================================");
    println!("  File:         {}", input.display());
    println!("  Measurements: {}", info.measurements);
    println!("  Taps:         {}", info.taps);
    println!("  Rate:         {} Hz", info.sample_rate);
    println!(
        "  Azimuths:     {} distinct ({})",
        info.azimuths.len(),
        summarize(&info.azimuths),
    );
    println!(
        "  Elevations:   {} distinct ({})",
        info.elevations.len(),
        summarize(&info.elevations),
    );
    println!();

    Ok(())
}

/// WAV container summary from the header alone.
fn cmd_info_wav(input: &Path, json: bool) -> Result<()> {
    let reader = hound::WavReader::open(input)
        .with_context(|| format!("Failed to open WAV file: {}", input.display()))?;
    let spec = reader.spec();
    let frames = reader.duration();
    let duration_secs = frames as f64 / spec.sample_rate as f64;
    let format = match spec.sample_format {
        hound::SampleFormat::Int => "int",
        hound::SampleFormat::Float => "float",
    };

    if json {
        let info = serde_json::json!({
            "file": input.display().to_string(),
            "channels": spec.channels,
            "sample_rate": spec.sample_rate,
            "bits_per_sample": spec.bits_per_sample,
            "sample_format": format,
            "frames": frames,
            "duration_secs": duration_secs,
        });
        println!("{}", serde_json::to_string_pretty(&info)?);
        return Ok(());
    }

    println!();
    println!("  WAV File Information");
    println!("  ============================================");
    println!("  File:     {}", input.display());
    println!("  Channels: {}", spec.channels);
    println!("  Rate:     {} Hz", spec.sample_rate);
    println!("  Depth:    {}-bit {format}", spec.bits_per_sample);
    println!("  Frames:   {frames}");
    println!("  Duration: {duration_secs:.2}s");
    println!();

    Ok(())
}

// ──────────────────────────── helpers ──────────────────────────────

/// Decode a WAV file into an audio buffer.
fn read_input(path: &Path) -> Result<AudioBuffer> {
    let buffer = decode_wav_file(path)
        .with_context(|| format!("Failed to read WAV file: {}", path.display()))?;
    tracing::debug!(
        path = %path.display(),
        channels = buffer.channel_count(),
        sample_rate = buffer.sample_rate(),
        frames = buffer.frame_count(),
        "Decoded input"
    );
    Ok(buffer)
}

/// Encode a buffer as 16-bit WAV and report the result.
fn write_output(path: &Path, buffer: &AudioBuffer) -> Result<()> {
    encode_wav_file(path, buffer)
        .with_context(|| format!("Failed to write WAV file: {}", path.display()))?;

    let size = std::fs::metadata(path).map(|m| m.len()).unwrap_or(0);
    println!(
        "  Output: {} ({}ch, {} Hz, {:.2}s, {} bytes)",
        path.display(),
        buffer.channel_count(),
        buffer.sample_rate(),
        buffer.duration_secs(),
        size,
    );
    Ok(())
}

/// Expand mono input to stereo so ear-targeted effects apply.
fn as_stereo(buffer: AudioBuffer) -> AudioBuffer {
    if buffer.channel_count() == 1 {
        buffer.expand_to_stereo()
    } else {
        buffer
    }
}

/// Compact "first .. last" description of a sorted value list.
fn summarize(values: &[f64]) -> String {
    match values {
        [] => "none".to_string(),
        [only] => format!("{only}"),
        [first, .., last] => format!("{first} .. {last}"),
    }
}
