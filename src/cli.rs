use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "ffpass")]
#[command(author, version, about = "Multi-pass ffmpeg encoding")]
pub struct Cli {
    /// Path to config file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Encode a file, optionally in several passes
    Transcode(TranscodeArgs),

    /// Encode the segments of a concat list, repeated
    Loop {
        /// Concat descriptor file (ffmpeg concat demuxer format)
        #[arg(required = true)]
        descriptor: PathBuf,

        /// Output file
        #[arg(required = true)]
        output: PathBuf,

        /// How many times the whole list is played
        #[arg(short = 'n', long, default_value = "1")]
        count: u32,

        /// Use an audio preset from the config file
        #[arg(short, long)]
        preset: Option<String>,

        /// Audio bitrate in kbit/s
        #[arg(long)]
        audio_kbps: Option<u32>,

        /// Audio channel count
        #[arg(long)]
        channels: Option<u32>,
    },

    /// Probe a media file and display its streams
    Probe {
        /// File to probe
        #[arg(required = true)]
        file: PathBuf,

        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that required external tools are available
    CheckTools,

    /// Validate configuration file
    Validate {
        /// Config file to validate (uses default if not specified)
        config: Option<PathBuf>,
    },

    /// Display version information
    Version,
}

#[derive(Args)]
pub struct TranscodeArgs {
    /// Primary input file
    #[arg(required = true)]
    pub input: PathBuf,

    /// Output file
    #[arg(required = true)]
    pub output: PathBuf,

    /// Use a format preset from the config file
    #[arg(short, long)]
    pub preset: Option<String>,

    /// Video codec (e.g. libx264)
    #[arg(long)]
    pub vcodec: Option<String>,

    /// Audio codec (e.g. aac)
    #[arg(long)]
    pub acodec: Option<String>,

    /// Video bitrate in kbit/s
    #[arg(long)]
    pub kbps: Option<u32>,

    /// Audio bitrate in kbit/s
    #[arg(long)]
    pub audio_kbps: Option<u32>,

    /// Audio channel count
    #[arg(long)]
    pub channels: Option<u32>,

    /// Number of encoder passes
    #[arg(long)]
    pub passes: Option<u32>,

    /// Additional input file (repeatable)
    #[arg(long = "input")]
    pub inputs: Vec<PathBuf>,

    /// Mix the audio of all inputs together
    #[arg(long)]
    pub mix_audio: bool,

    /// Scale to fit and pad to WIDTHxHEIGHT
    #[arg(long)]
    pub pad: Option<String>,

    /// Print the ffmpeg command lines instead of running them
    #[arg(long)]
    pub dry_run: bool,
}
