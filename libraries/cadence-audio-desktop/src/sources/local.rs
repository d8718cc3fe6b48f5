//! Local file decoding using Symphonia with streaming resampling
//!
//! # Format Support
//!
//! - **Containers**: MP3, FLAC, OGG, WAV, AAC, M4A and anything else enabled
//!   by Symphonia's `all` feature
//! - **Sample types**: every `AudioBufferRef` variant, normalized to `[-1, 1]`
//! - **Channel layouts**: mono is duplicated to stereo, wider layouts keep
//!   their first two channels
//!
//! Output is always interleaved stereo `f32` at the rate requested by the
//! engine. When the file rate differs, a `SincFixedIn` resampler runs over
//! fixed-size chunks and the final partial chunk is flushed at end of stream.

use crate::error::{AudioError, Result};
use rubato::{
    Resampler, SincFixedIn, SincInterpolationParameters, SincInterpolationType, WindowFunction,
};
use std::collections::VecDeque;
use std::fs::File;
use std::path::{Path, PathBuf};
use std::time::Duration;
use symphonia::core::audio::{AudioBuffer, AudioBufferRef, Signal};
use symphonia::core::codecs::{Decoder, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::sample::Sample;
use symphonia::core::units::TimeBase;

/// Output channel count
pub const OUTPUT_CHANNELS: usize = 2;

/// Rate assumed when the container does not declare one
const FALLBACK_SAMPLE_RATE: u32 = 44100;

/// Streaming decoder for one file
///
/// Only the header is read on open; packets are decoded on demand by
/// [`FileDecoder::read`].
pub struct FileDecoder {
    path: PathBuf,
    source_sample_rate: u32,
    target_sample_rate: u32,

    format_reader: Box<dyn FormatReader>,
    decoder: Box<dyn Decoder>,
    track_id: u32,
    time_base: TimeBase,

    /// Declared length at the target rate
    length_frames: Option<u64>,

    resampler: Option<SincFixedIn<f32>>,
    /// Source-rate stereo samples waiting for a full resampler chunk
    pending: Vec<f32>,
    /// Target-rate stereo samples ready for output
    buffer: VecDeque<f32>,

    /// Source frames to drop after an accurate seek
    skip_frames: u64,
    is_eof: bool,
}

impl FileDecoder {
    /// Open `path` and prepare to decode it at `target_sample_rate`
    pub fn open(path: impl AsRef<Path>, target_sample_rate: u32) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        let file = File::open(&path).map_err(|e| AudioError::decode(&path, e))?;
        let mss = MediaSourceStream::new(Box::new(file), Default::default());

        let mut hint = Hint::new();
        if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
            hint.with_extension(ext);
        }

        let probed = symphonia::default::get_probe()
            .format(
                &hint,
                mss,
                &FormatOptions::default(),
                &MetadataOptions::default(),
            )
            .map_err(|e| AudioError::decode(&path, e))?;

        let format_reader = probed.format;
        let track = format_reader
            .default_track()
            .ok_or_else(|| AudioError::decode(&path, "no audio track"))?;

        let source_sample_rate = track.codec_params.sample_rate.unwrap_or(FALLBACK_SAMPLE_RATE);
        let track_id = track.id;
        let time_base = track
            .codec_params
            .time_base
            .unwrap_or(TimeBase::new(1, source_sample_rate));
        let length_frames = track
            .codec_params
            .n_frames
            .map(|frames| rescale(frames, source_sample_rate, target_sample_rate));

        let decoder = symphonia::default::get_codecs()
            .make(&track.codec_params, &DecoderOptions::default())
            .map_err(|e| AudioError::decode(&path, e))?;

        let resampler = if source_sample_rate == target_sample_rate {
            None
        } else {
            Some(
                create_resampler(source_sample_rate, target_sample_rate)
                    .map_err(|e| AudioError::decode(&path, e))?,
            )
        };

        tracing::debug!(
            path = %path.display(),
            source_sample_rate,
            target_sample_rate,
            length_frames,
            "Opened audio file"
        );

        Ok(Self {
            path,
            source_sample_rate,
            target_sample_rate,
            format_reader,
            decoder,
            track_id,
            time_base,
            length_frames,
            resampler,
            pending: Vec::new(),
            buffer: VecDeque::new(),
            skip_frames: 0,
            is_eof: false,
        })
    }

    /// Fill `output` with interleaved stereo samples
    ///
    /// Returns the number of samples written. Anything short of
    /// `output.len()` is zero-filled and means the stream has ended; a full
    /// read that reached the end leaves [`is_finished`](Self::is_finished) set.
    pub fn read(&mut self, output: &mut [f32]) -> Result<usize> {
        while self.buffer.len() < output.len() && !self.is_eof {
            self.decode_next_packet()?;
        }

        let written = self.buffer.len().min(output.len());
        for (slot, sample) in output.iter_mut().zip(self.buffer.drain(..written)) {
            *slot = sample;
        }
        output[written..].fill(0.0);

        // Look ahead after a drain so an exact fill still reports the end
        while self.buffer.is_empty() && !self.is_eof {
            self.decode_next_packet()?;
        }

        Ok(written)
    }

    /// Reposition the stream at `frame` (target rate)
    ///
    /// Seeking at or past the declared end leaves the decoder finished.
    pub fn seek_to_frame(&mut self, frame: u64) -> Result<()> {
        self.buffer.clear();
        self.pending.clear();
        self.skip_frames = 0;
        if let Some(resampler) = self.resampler.as_mut() {
            resampler.reset();
        }

        if self.length_frames.is_some_and(|length| frame >= length) {
            self.is_eof = true;
            return Ok(());
        }

        let position =
            Duration::from_secs_f64(frame as f64 / f64::from(self.target_sample_rate));
        let ts = self.time_base.calc_timestamp(position.into());

        let seeked = self
            .format_reader
            .seek(
                SeekMode::Accurate,
                SeekTo::TimeStamp {
                    ts,
                    track_id: self.track_id,
                },
            )
            .map_err(|e| AudioError::decode(&self.path, e))?;

        self.decoder.reset();
        self.is_eof = false;

        let lead_in = self
            .time_base
            .calc_time(seeked.required_ts.saturating_sub(seeked.actual_ts));
        self.skip_frames = ((lead_in.seconds as f64 + lead_in.frac)
            * f64::from(self.source_sample_rate))
        .round() as u64;

        Ok(())
    }

    /// Declared length in frames at the target rate, if the container has one
    pub fn length_frames(&self) -> Option<u64> {
        self.length_frames
    }

    /// True once every decoded sample has been read
    pub fn is_finished(&self) -> bool {
        self.is_eof && self.buffer.is_empty() && self.pending.is_empty()
    }

    /// File being decoded
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Output sample rate
    pub fn sample_rate(&self) -> u32 {
        self.target_sample_rate
    }

    /// Sample rate declared by the file
    pub fn source_sample_rate(&self) -> u32 {
        self.source_sample_rate
    }

    fn decode_next_packet(&mut self) -> Result<()> {
        let packet = match self.format_reader.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                return self.finish();
            }
            Err(SymphoniaError::ResetRequired) => return self.finish(),
            Err(e) => return Err(AudioError::decode(&self.path, e)),
        };

        if packet.track_id() != self.track_id {
            return Ok(());
        }

        let decoded = match self.decoder.decode(&packet) {
            Ok(decoded) => decoded,
            Err(SymphoniaError::DecodeError(reason)) => {
                tracing::warn!(path = %self.path.display(), "Skipping corrupt packet: {}", reason);
                return Ok(());
            }
            Err(e) => return Err(AudioError::decode(&self.path, e)),
        };

        let mut samples = convert_to_stereo_f32(decoded);
        if self.skip_frames > 0 {
            let frames = (samples.len() / OUTPUT_CHANNELS) as u64;
            let skipped = self.skip_frames.min(frames);
            samples.drain(..skipped as usize * OUTPUT_CHANNELS);
            self.skip_frames -= skipped;
        }

        if self.resampler.is_some() {
            self.pending.extend_from_slice(&samples);
            self.resample_pending()
        } else {
            self.buffer.extend(samples);
            Ok(())
        }
    }

    /// Resample every full chunk held in `pending`
    fn resample_pending(&mut self) -> Result<()> {
        let Some(resampler) = self.resampler.as_mut() else {
            return Ok(());
        };

        loop {
            let chunk_frames = resampler.input_frames_next();
            if self.pending.len() < chunk_frames * OUTPUT_CHANNELS {
                return Ok(());
            }

            let chunk = deinterleave(&self.pending[..chunk_frames * OUTPUT_CHANNELS]);
            let resampled = resampler
                .process(&chunk, None)
                .map_err(|e| AudioError::ResampleError(e.to_string()))?;
            interleave_into(&resampled, &mut self.buffer);
            self.pending.drain(..chunk_frames * OUTPUT_CHANNELS);
        }
    }

    /// Mark end of stream and flush the resampler tail
    fn finish(&mut self) -> Result<()> {
        self.is_eof = true;

        if let Some(resampler) = self.resampler.as_mut() {
            if !self.pending.is_empty() {
                let chunk = deinterleave(&self.pending);
                let resampled = resampler
                    .process_partial(Some(chunk.as_slice()), None)
                    .map_err(|e| AudioError::ResampleError(e.to_string()))?;
                interleave_into(&resampled, &mut self.buffer);
                self.pending.clear();
            }
        }

        Ok(())
    }
}

fn create_resampler(source_rate: u32, target_rate: u32) -> Result<SincFixedIn<f32>> {
    let params = SincInterpolationParameters {
        sinc_len: 256,
        f_cutoff: 0.95,
        interpolation: SincInterpolationType::Linear,
        oversampling_factor: 256,
        window: WindowFunction::BlackmanHarris2,
    };

    // 0.1 seconds per chunk
    let chunk_frames = (source_rate as usize / 10).max(1);

    SincFixedIn::<f32>::new(
        f64::from(target_rate) / f64::from(source_rate),
        2.0,
        params,
        chunk_frames,
        OUTPUT_CHANNELS,
    )
    .map_err(|e| AudioError::ResampleError(e.to_string()))
}

/// Convert a frame count between sample rates
pub fn rescale(frames: u64, from_rate: u32, to_rate: u32) -> u64 {
    if from_rate == to_rate {
        return frames;
    }
    (u128::from(frames) * u128::from(to_rate) / u128::from(from_rate)) as u64
}

fn deinterleave(samples: &[f32]) -> Vec<Vec<f32>> {
    let frames = samples.len() / OUTPUT_CHANNELS;
    let mut planar = vec![Vec::with_capacity(frames); OUTPUT_CHANNELS];
    for frame in samples.chunks_exact(OUTPUT_CHANNELS) {
        for (channel, sample) in planar.iter_mut().zip(frame) {
            channel.push(*sample);
        }
    }
    planar
}

fn interleave_into(planar: &[Vec<f32>], out: &mut VecDeque<f32>) {
    let frames = planar.first().map_or(0, Vec::len);
    for frame in 0..frames {
        for channel in planar {
            out.push_back(channel[frame]);
        }
    }
}

/// Interleave a planar buffer to stereo, normalizing each sample
fn interleave_to_stereo_f32<T, F>(buf: &AudioBuffer<T>, normalize: F) -> Vec<f32>
where
    T: Sample,
    F: Fn(T) -> f32,
{
    let channels = buf.spec().channels.count();
    let frames = buf.frames();
    let left = buf.chan(0);
    let right = if channels > 1 { buf.chan(1) } else { left };

    let mut output = Vec::with_capacity(frames * OUTPUT_CHANNELS);
    for frame in 0..frames {
        output.push(normalize(left[frame]));
        output.push(normalize(right[frame]));
    }
    output
}

fn convert_to_stereo_f32(decoded: AudioBufferRef) -> Vec<f32> {
    match decoded {
        AudioBufferRef::F32(buf) => interleave_to_stereo_f32(&buf, |s| s),
        AudioBufferRef::F64(buf) => interleave_to_stereo_f32(&buf, |s| s as f32),

        AudioBufferRef::S8(buf) => interleave_to_stereo_f32(&buf, |s| f32::from(s) / f32::from(i8::MAX)),
        AudioBufferRef::S16(buf) => {
            interleave_to_stereo_f32(&buf, |s| f32::from(s) / f32::from(i16::MAX))
        }
        AudioBufferRef::S24(buf) => interleave_to_stereo_f32(&buf, |s| s.inner() as f32 / 8_388_607.0),
        AudioBufferRef::S32(buf) => interleave_to_stereo_f32(&buf, |s| s as f32 / i32::MAX as f32),

        AudioBufferRef::U8(buf) => {
            interleave_to_stereo_f32(&buf, |s| (f32::from(s) / f32::from(u8::MAX)) * 2.0 - 1.0)
        }
        AudioBufferRef::U16(buf) => {
            interleave_to_stereo_f32(&buf, |s| (f32::from(s) / f32::from(u16::MAX)) * 2.0 - 1.0)
        }
        AudioBufferRef::U24(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s.inner() as f32 / 16_777_215.0) * 2.0 - 1.0)
        }
        AudioBufferRef::U32(buf) => {
            interleave_to_stereo_f32(&buf, |s| (s as f32 / u32::MAX as f32) * 2.0 - 1.0)
        }
    }
}
