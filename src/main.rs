mod cli;

use ffpass::config::{self, Config, Preset};
use ffpass_av::{
    command, passes, AudioFormat, AudioMixFilter, Dimension, FfmpegDriver, FfprobeProber, Format,
    Media, MediaKind, PadFilter, Point, ProgressCallback, ProgressEvent, Prober, Transcoder,
    VideoFormat,
};

use anyhow::{Context, Result};
use clap::Parser;
use cli::{Cli, Commands, TranscodeArgs};
use std::path::Path;
use std::sync::Arc;

fn build_transcoder(config: &Config) -> Result<Transcoder> {
    let prober = FfprobeProber::discover(config.tools.ffprobe_path.as_deref())?;
    let driver = FfmpegDriver::discover(config.tools.ffmpeg_path.as_deref())?
        .with_config(config.tools.driver_config());
    Ok(Transcoder::new(prober, driver).with_temp_dir(config.encoding.temp_dir.clone()))
}

fn progress_printer() -> ProgressCallback {
    Arc::new(|event: &ProgressEvent| {
        if let Some(percent) = event.percent {
            eprint!(
                "\rpass {}/{}  {:5.1}%",
                event.pass, event.total_passes, percent
            );
        }
    })
}

/// Start from the named preset (or x264) and apply command-line overrides.
fn resolve_format(config: &Config, args: &TranscodeArgs, progress: bool) -> Result<Preset> {
    let base = match &args.preset {
        Some(name) => config::preset(config, name)?.clone(),
        None => Preset::Video(VideoFormat::x264()),
    };

    let preset = match base {
        Preset::Video(mut f) => {
            if let Some(codec) = &args.vcodec {
                f = f.with_video_codec(codec);
            }
            if let Some(codec) = &args.acodec {
                f = f.with_audio_codec(codec);
            }
            if let Some(kbps) = args.kbps {
                f = f.with_kilobitrate(kbps);
            }
            if let Some(kbps) = args.audio_kbps {
                f = f.with_audio_kilobitrate(kbps);
            }
            if let Some(channels) = args.channels {
                f = f.with_audio_channels(channels);
            }
            if let Some(passes) = args.passes {
                f = f.with_passes(passes);
            }
            if progress {
                f = f.on_progress(progress_printer());
            }
            Preset::Video(f)
        }
        Preset::Audio(mut f) => {
            if args.vcodec.is_some() || args.kbps.is_some() || args.passes.is_some() {
                tracing::warn!("Video options are ignored for an audio preset");
            }
            if let Some(codec) = &args.acodec {
                f = f.with_codec(codec);
            }
            if let Some(kbps) = args.audio_kbps {
                f = f.with_kilobitrate(kbps);
            }
            if let Some(channels) = args.channels {
                f = f.with_channels(channels);
            }
            if progress {
                f = f.on_progress(progress_printer());
            }
            Preset::Audio(f)
        }
    };

    Ok(preset)
}

fn transcode(args: &TranscodeArgs, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !args.input.exists() {
        anyhow::bail!("Input file does not exist: {:?}", args.input);
    }

    let preset = resolve_format(&config, args, !args.dry_run)?;
    let format = preset.format();
    let transcoder = build_transcoder(&config)?;

    let mut media = transcoder
        .open(&args.input)
        .with_context(|| format!("Failed to open {:?}", args.input))?;
    if !args.inputs.is_empty() {
        media.add_input_file(&args.inputs)?;
    }
    if args.mix_audio {
        media.add_filter(AudioMixFilter::new(1 + args.inputs.len()));
    }
    if let Some(pad) = &args.pad {
        let dimension: Dimension = pad.parse()?;
        media.add_filter(PadFilter::new(dimension, Point::default()));
    }

    if args.dry_run {
        let base = command::build_base(&media, format)?;
        let total = match media.kind() {
            MediaKind::Video => format.passes(),
            MediaKind::Audio => 1,
        };
        let plan = passes::plan_passes(&base, &args.output, total, Path::new("<passlogfile>"))?;
        for pass in plan {
            println!("ffmpeg {}", pass.tokens.join(" "));
        }
        return Ok(());
    }

    tracing::info!("Transcoding {:?} -> {:?}", args.input, args.output);
    let result = media.save(format, &args.output);
    eprintln!();
    result?;

    println!("Output: {}", args.output.display());
    Ok(())
}

fn loop_file(
    descriptor: &Path,
    output: &Path,
    count: u32,
    preset: Option<&str>,
    audio_kbps: Option<u32>,
    channels: Option<u32>,
    config_path: Option<&Path>,
) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !descriptor.exists() {
        anyhow::bail!("Concat list does not exist: {:?}", descriptor);
    }

    let mut format = match preset {
        Some(name) => match config::preset(&config, name)? {
            Preset::Audio(f) => f.clone(),
            Preset::Video(_) => anyhow::bail!("Preset '{}' is not an audio preset", name),
        },
        None => AudioFormat::new(),
    };
    if let Some(kbps) = audio_kbps {
        format = format.with_kilobitrate(kbps);
    }
    if let Some(channels) = channels {
        format = format.with_channels(channels);
    }

    let transcoder = build_transcoder(&config)?;
    let mut media = Media::new(
        descriptor,
        MediaKind::Audio,
        transcoder.prober(),
        transcoder.driver(),
    );
    media.loop_concat(&format, descriptor, count, output)?;

    println!("Output: {}", output.display());
    Ok(())
}

fn probe_file(file: &Path, json: bool, config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;

    if !file.exists() {
        anyhow::bail!("File does not exist: {:?}", file);
    }

    let prober = FfprobeProber::discover(config.tools.ffprobe_path.as_deref())?;
    let info = prober.streams(file)?;

    if json {
        let json_str = serde_json::to_string_pretty(&info)?;
        println!("{}", json_str);
    } else {
        println!("File: {}", info.file_path.display());
        println!("Container: {}", info.container);
        if let Some(ref duration) = info.duration {
            let secs = duration.as_secs();
            let mins = secs / 60;
            let hours = mins / 60;
            println!("Duration: {:02}:{:02}:{:02}", hours, mins % 60, secs % 60);
        }

        println!("\nVideo Streams: {}", info.videos.len());
        for stream in &info.videos {
            print!("  [{}] {} {}x{}", stream.index, stream.codec, stream.width, stream.height);
            if let Some(fps) = stream.frame_rate {
                print!(", {:.3} fps", fps);
            }
            println!();
        }

        println!("\nAudio Streams: {}", info.audios.len());
        for stream in &info.audios {
            print!("  [{}] {} {}ch", stream.index, stream.codec, stream.channels);
            if let Some(rate) = stream.sample_rate {
                print!(", {} Hz", rate);
            }
            if let Some(ref lang) = stream.language {
                print!(" ({})", lang);
            }
            println!();
        }
    }

    Ok(())
}

fn check_tools(config_path: Option<&Path>) -> Result<()> {
    let config = config::load_config_or_default(config_path)?;
    println!("Checking external tools...\n");

    let tools = ffpass_av::check_tools(
        config.tools.ffmpeg_path.as_deref(),
        config.tools.ffprobe_path.as_deref(),
    );
    let mut all_ok = true;

    for tool in &tools {
        let status = if tool.available {
            "✓"
        } else {
            all_ok = false;
            "✗"
        };

        print!("{} {}", status, tool.name);

        if let Some(ref version) = tool.version {
            print!(" ({})", version);
        }

        if let Some(ref path) = tool.path {
            print!(" - {}", path.display());
        }

        println!();
    }

    println!();
    if all_ok {
        println!("All required tools are available!");
    } else {
        println!("Some tools are missing. Install ffmpeg to enable encoding.");
    }

    Ok(())
}

fn validate_config(path: Option<&Path>) -> Result<()> {
    let config = match path {
        Some(p) => {
            println!("Validating config: {:?}", p);
            let config = config::load_config(p)?;
            println!("✓ Configuration is valid");
            config
        }
        None => {
            println!("No config file specified, using defaults");
            Config::default()
        }
    };

    let show = |p: &Option<std::path::PathBuf>| {
        p.as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(PATH)".to_string())
    };
    println!("  ffmpeg: {}", show(&config.tools.ffmpeg_path));
    println!("  ffprobe: {}", show(&config.tools.ffprobe_path));
    if let Some(threads) = config.tools.threads {
        println!("  Threads: {}", threads);
    }
    if let Some(timeout) = config.tools.timeout_secs {
        println!("  Timeout: {}s", timeout);
    }
    println!("  Presets: {}", config.presets.len());
    for (name, preset) in &config.presets {
        let kind = match preset {
            Preset::Video(_) => "video",
            Preset::Audio(_) => "audio",
        };
        println!("    {} ({}, {} pass(es))", name, kind, preset.format().passes());
    }

    Ok(())
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // Respect RUST_LOG env var if set, otherwise use defaults based on verbose flag
    let env_filter = std::env::var("RUST_LOG").unwrap_or_else(|_| {
        if cli.verbose {
            "ffpass=trace,ffpass_av=trace".to_string()
        } else {
            "ffpass=info,ffpass_av=info".to_string()
        }
    });

    tracing_subscriber::fmt()
        .with_env_filter(&env_filter)
        .with_writer(std::io::stderr)
        .init();

    match cli.command {
        Commands::Transcode(args) => transcode(&args, cli.config.as_deref()),
        Commands::Loop {
            descriptor,
            output,
            count,
            preset,
            audio_kbps,
            channels,
        } => loop_file(
            &descriptor,
            &output,
            count,
            preset.as_deref(),
            audio_kbps,
            channels,
            cli.config.as_deref(),
        ),
        Commands::Probe { file, json } => probe_file(&file, json, cli.config.as_deref()),
        Commands::CheckTools => check_tools(cli.config.as_deref()),
        Commands::Validate {
            config: config_path,
        } => {
            let path = config_path.or(cli.config);
            validate_config(path.as_deref())
        }
        Commands::Version => {
            println!("ffpass {}", env!("CARGO_PKG_VERSION"));
            Ok(())
        }
    }
}
