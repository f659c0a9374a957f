//! Assembly of the encoder command line for one pass.
//!
//! The encoder is order sensitive, so the sequence here is fixed: inputs,
//! filter chain (user filters plus extra params, threads and codecs), raw
//! commands, bitrate and quality flags, additional params. The output path is
//! appended by the caller, after any pass flags.

use std::path::Path;

use crate::filter::{SimpleFilter, EXTRA_PARAMS_PRIORITY};
use crate::format::Format;
use crate::media::Media;
use crate::{Error, Result};

/// x264 tuning applied to every video encode, after `-b:v`.
pub const VIDEO_QUALITY_FLAGS: [&str; 20] = [
    "-refs",
    "6",
    "-coder",
    "1",
    "-sc_threshold",
    "40",
    "-flags",
    "+loop",
    "-me_range",
    "16",
    "-subq",
    "7",
    "-i_qfactor",
    "0.71",
    "-qcomp",
    "0.6",
    "-qdiff",
    "4",
    "-trellis",
    "1",
];

/// Render a path as a single command token.
///
/// Paths that are not valid UTF-8 are rejected rather than rewritten, so the
/// encoder never reads or writes a different file than the one asked for.
pub fn path_token(path: &Path) -> Result<String> {
    path.to_str().map(str::to_string).ok_or_else(|| {
        Error::InvalidInput(format!("path is not valid UTF-8: {}", path.display()))
    })
}

/// Tokens for one pass of encoding `media` into `format`, without the output path.
pub fn build_base(media: &Media<'_>, format: &dyn Format) -> Result<Vec<String>> {
    let caps = media.capabilities().intersect(format.capabilities());

    let mut tokens = vec!["-y".to_string(), "-i".to_string(), path_token(media.path())?];
    for input in media.input_files() {
        tokens.push("-i".to_string());
        tokens.push(path_token(input)?);
    }

    let mut chain = media.filters().clone();
    chain.add(
        SimpleFilter::new(format.extra_params().iter().cloned())
            .with_priority(EXTRA_PARAMS_PRIORITY),
    );
    if let Some(threads) = media.driver().threads() {
        chain.add(SimpleFilter::new(["-threads".to_string(), threads.to_string()]));
    }
    if caps.video {
        if let Some(codec) = format.video_codec() {
            chain.add(SimpleFilter::new(["-vcodec", codec]));
        }
    }
    if caps.audio {
        if let Some(codec) = format.audio_codec() {
            chain.add(SimpleFilter::new(["-acodec", codec]));
        }
    }
    tokens.extend(chain.freeze().apply(media, format));

    for command in media.commands() {
        tokens.extend(command.iter().cloned());
    }

    if caps.video {
        if let Some(kbps) = format.video_kilobitrate() {
            tokens.push("-b:v".to_string());
            tokens.push(format!("{kbps}k"));
        }
        tokens.extend(VIDEO_QUALITY_FLAGS.iter().map(|s| s.to_string()));
    }
    if caps.audio {
        tokens.extend(audio_rate_tokens(format));
    }

    tokens.extend(format.additional_params().iter().cloned());
    Ok(tokens)
}

/// `-b:a` and `-ac` for whichever of them the format declares.
pub fn audio_rate_tokens(format: &dyn Format) -> Vec<String> {
    let mut tokens = Vec::new();
    if let Some(kbps) = format.audio_kilobitrate() {
        tokens.push("-b:a".to_string());
        tokens.push(format!("{kbps}k"));
    }
    if let Some(channels) = format.audio_channels() {
        tokens.push("-ac".to_string());
        tokens.push(channels.to_string());
    }
    tokens
}

/// Tokens reading a concat descriptor instead of individual inputs.
pub fn build_concat(
    descriptor: &Path,
    repeat_count: u32,
    format: &dyn Format,
    output: &Path,
) -> Result<Vec<String>> {
    let mut tokens = Vec::new();
    if repeat_count > 1 {
        tokens.push("-stream_loop".to_string());
        tokens.push((repeat_count - 1).to_string());
    }
    tokens.extend([
        "-f".to_string(),
        "concat".to_string(),
        "-i".to_string(),
        path_token(descriptor)?,
    ]);
    tokens.extend(audio_rate_tokens(format));
    tokens.push(path_token(output)?);
    Ok(tokens)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::filter::SimpleFilter;
    use crate::format::{AudioFormat, VideoFormat};
    use crate::testing::{audio_media, video_media, FakeProber, RecordingDriver};

    fn position(tokens: &[String], needle: &str) -> usize {
        tokens
            .iter()
            .position(|t| t == needle)
            .unwrap_or_else(|| panic!("{needle} missing from {tokens:?}"))
    }

    #[test]
    fn video_command_order() {
        let prober = FakeProber::default();
        let driver = RecordingDriver::default();
        let mut media = video_media("a.mp4", &prober, &driver);
        media.add_input_file(["b.mp4"]).unwrap();
        media.add_command(["-map", "0:v"]).unwrap();
        media.add_filter(SimpleFilter::new(["-r", "25"]));

        let format = VideoFormat::x264()
            .with_extra_params(["-preset", "slow"])
            .with_additional_params(["-movflags", "+faststart"])
            .with_audio_kilobitrate(192)
            .with_audio_channels(2);
        let tokens = build_base(&media, &format).unwrap();

        assert_eq!(tokens[..5], ["-y", "-i", "a.mp4", "-i", "b.mp4"]);
        // user filter (0) < codec filters (0, registered later) < extra params (10)
        assert!(position(&tokens, "-r") < position(&tokens, "-vcodec"));
        assert!(position(&tokens, "-vcodec") < position(&tokens, "-acodec"));
        assert!(position(&tokens, "-acodec") < position(&tokens, "-preset"));
        assert!(position(&tokens, "-preset") < position(&tokens, "-map"));
        assert!(position(&tokens, "-map") < position(&tokens, "-b:v"));
        assert!(position(&tokens, "-trellis") < position(&tokens, "-b:a"));
        assert!(position(&tokens, "-ac") < position(&tokens, "-movflags"));
        assert_eq!(tokens.last().unwrap(), "+faststart");
    }

    #[test]
    fn quality_flags_follow_video_bitrate() {
        let prober = FakeProber::default();
        let driver = RecordingDriver::default();
        let media = video_media("a.mp4", &prober, &driver);

        let tokens = build_base(&media, &VideoFormat::x264().with_kilobitrate(1000)).unwrap();
        let at = position(&tokens, "-b:v");
        assert_eq!(tokens[at + 1], "1000k");
        assert_eq!(tokens[at + 2..at + 22], VIDEO_QUALITY_FLAGS);
    }

    #[test]
    fn threads_come_from_driver() {
        let prober = FakeProber::default();
        let driver = RecordingDriver::default().with_threads(8);
        let media = video_media("a.mp4", &prober, &driver);

        let tokens = build_base(&media, &VideoFormat::new()).unwrap();
        let at = position(&tokens, "-threads");
        assert_eq!(tokens[at + 1], "8");
    }

    #[test]
    fn audio_media_ignores_video_parts_of_format() {
        let prober = FakeProber::default();
        let driver = RecordingDriver::default();
        let media = audio_media("song.flac", &prober, &driver);

        let tokens = build_base(&media, &VideoFormat::x264().with_audio_channels(1)).unwrap();
        assert!(!tokens.contains(&"-vcodec".to_string()));
        assert!(!tokens.contains(&"-b:v".to_string()));
        assert!(!tokens.contains(&"-refs".to_string()));
        assert!(tokens.contains(&"-acodec".to_string()));
        assert!(tokens.contains(&"-ac".to_string()));
    }

    #[test]
    fn audio_format_on_video_media_has_no_video_tokens() {
        let prober = FakeProber::default();
        let driver = RecordingDriver::default();
        let media = video_media("a.mp4", &prober, &driver);

        let tokens = build_base(&media, &AudioFormat::new().with_codec("libmp3lame")).unwrap();
        assert!(!tokens.contains(&"-b:v".to_string()));
        assert!(tokens.contains(&"libmp3lame".to_string()));
    }

    #[test]
    fn concat_tokens() {
        let format = AudioFormat::new().with_kilobitrate(128).with_channels(2);
        let tokens = build_concat(Path::new("list.txt"), 1, &format, Path::new("out.mp3")).unwrap();
        assert_eq!(
            tokens,
            ["-f", "concat", "-i", "list.txt", "-b:a", "128k", "-ac", "2", "out.mp3"]
        );

        let looped = build_concat(Path::new("list.txt"), 3, &format, Path::new("out.mp3")).unwrap();
        assert_eq!(looped[..2], ["-stream_loop", "2"]);
    }
}
