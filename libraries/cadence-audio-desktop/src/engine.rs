//! CPAL output engine
//!
//! One output stream per engine. Every opened file becomes a voice in a
//! mixer shared with the device callback; the callback pulls decoded frames
//! from running voices, sums them and applies the engine gain.

use crate::error::{AudioError, Result};
use crate::sources::{FileDecoder, OUTPUT_CHANNELS};
use cadence_playback::{AudioEngine, Sound};
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::Sample as _;
use std::collections::HashMap;
use std::path::Path;
use std::sync::{Arc, Mutex, MutexGuard};

struct Voice {
    decoder: FileDecoder,
    running: bool,
    /// Frames delivered to the device since the last seek origin
    cursor: u64,
    finished: bool,
}

impl Voice {
    /// Length as currently known
    ///
    /// Until the decoder hits the end, an undeclared length reads as
    /// `u64::MAX` and a declared one never falls at or behind the cursor.
    fn length_frames(&self) -> u64 {
        match (self.finished, self.decoder.length_frames()) {
            (true, _) => self.cursor,
            (false, Some(declared)) => declared.max(self.cursor + 1),
            (false, None) => u64::MAX,
        }
    }
}

struct Mixer {
    voices: HashMap<u64, Voice>,
    next_id: u64,
    volume: f32,
    scratch: Vec<f32>,
}

impl Mixer {
    fn new(volume: f32) -> Self {
        Self {
            voices: HashMap::new(),
            next_id: 0,
            volume,
            scratch: Vec::new(),
        }
    }

    fn insert(&mut self, decoder: FileDecoder) -> u64 {
        let id = self.next_id;
        self.next_id += 1;
        self.voices.insert(
            id,
            Voice {
                decoder,
                running: false,
                cursor: 0,
                finished: false,
            },
        );
        id
    }

    /// Render one device buffer
    fn render(&mut self, data: &mut [f32], device_channels: usize) {
        data.fill(0.0);
        if device_channels == 0 {
            return;
        }

        let frames = data.len() / device_channels;
        self.scratch.resize(frames * OUTPUT_CHANNELS, 0.0);
        let volume = self.volume;

        for voice in self.voices.values_mut().filter(|v| v.running) {
            let read = match voice.decoder.read(&mut self.scratch) {
                Ok(read) => read,
                Err(e) => {
                    tracing::error!("Stopping voice after decode failure: {}", e);
                    voice.running = false;
                    voice.finished = true;
                    continue;
                }
            };

            let read_frames = read / OUTPUT_CHANNELS;
            for (frame, stereo) in data
                .chunks_exact_mut(device_channels)
                .zip(self.scratch.chunks_exact(OUTPUT_CHANNELS))
                .take(read_frames)
            {
                let (left, right) = (stereo[0] * volume, stereo[1] * volume);
                if device_channels == 1 {
                    frame[0] += (left + right) * 0.5;
                } else {
                    frame[0] += left;
                    frame[1] += right;
                }
            }

            voice.cursor += read_frames as u64;
            if read < self.scratch.len() || voice.decoder.is_finished() {
                voice.running = false;
                voice.finished = true;
            }
        }
    }
}

fn lock(mixer: &Mutex<Mixer>) -> MutexGuard<'_, Mixer> {
    mixer
        .lock()
        .unwrap_or_else(std::sync::PoisonError::into_inner)
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    mixer: &Arc<Mutex<Mixer>>,
) -> Result<cpal::Stream>
where
    T: cpal::SizedSample + cpal::FromSample<f32>,
{
    let mixer = Arc::clone(mixer);
    let device_channels = usize::from(config.channels);
    let mut mixed: Vec<f32> = Vec::new();

    let stream = device.build_output_stream(
        config,
        move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
            mixed.resize(data.len(), 0.0);
            lock(&mixer).render(&mut mixed, device_channels);
            for (out, sample) in data.iter_mut().zip(&mixed) {
                *out = T::from_sample(*sample);
            }
        },
        |err| tracing::error!("Audio stream error: {}", err),
        None,
    )?;
    Ok(stream)
}

/// Decode `path` at `sample_rate` and attach it to `mixer` as a stopped voice
fn open_voice(
    mixer: &Arc<Mutex<Mixer>>,
    path: &Path,
    sample_rate: u32,
) -> cadence_playback::Result<Box<dyn Sound>> {
    let decoder = FileDecoder::open(path, sample_rate)?;
    let id = lock(mixer).insert(decoder);
    Ok(Box::new(CpalSound {
        mixer: Arc::clone(mixer),
        id,
        sample_rate,
    }))
}

/// Desktop audio engine backed by the default CPAL output device
pub struct CpalEngine {
    _stream: cpal::Stream,
    mixer: Arc<Mutex<Mixer>>,
    sample_rate: u32,
    channels: u16,
}

impl CpalEngine {
    /// Open the default output device at its default configuration
    pub fn new() -> Result<Self> {
        Self::with_volume(1.0)
    }

    /// Open the default output device with an initial gain
    pub fn with_volume(volume: f32) -> Result<Self> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(AudioError::DeviceNotFound)?;

        let supported = device.default_output_config()?;
        let sample_format = supported.sample_format();
        let config: cpal::StreamConfig = supported.into();
        let sample_rate = config.sample_rate.0;
        let channels = config.channels;

        let mixer = Arc::new(Mutex::new(Mixer::new(volume)));
        let stream = match sample_format {
            cpal::SampleFormat::F32 => build_stream::<f32>(&device, &config, &mixer)?,
            cpal::SampleFormat::I16 => build_stream::<i16>(&device, &config, &mixer)?,
            cpal::SampleFormat::U16 => build_stream::<u16>(&device, &config, &mixer)?,
            other => return Err(AudioError::UnsupportedFormat(format!("{:?}", other))),
        };
        stream.play()?;

        tracing::info!(
            device = %device.name().unwrap_or_else(|_| "unknown".to_string()),
            sample_rate,
            channels,
            "Audio output opened"
        );

        Ok(Self {
            _stream: stream,
            mixer,
            sample_rate,
            channels,
        })
    }

    /// Device channel count
    pub fn channels(&self) -> u16 {
        self.channels
    }

    /// Number of sounds currently attached to the mixer
    pub fn voice_count(&self) -> usize {
        lock(&self.mixer).voices.len()
    }
}

impl AudioEngine for CpalEngine {
    fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    fn open(&mut self, path: &Path) -> cadence_playback::Result<Box<dyn Sound>> {
        open_voice(&self.mixer, path, self.sample_rate)
    }

    fn volume(&self) -> f32 {
        lock(&self.mixer).volume
    }

    fn set_volume(&mut self, gain: f32) {
        lock(&self.mixer).volume = gain;
    }
}

impl std::fmt::Debug for CpalEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CpalEngine")
            .field("sample_rate", &self.sample_rate)
            .field("channels", &self.channels)
            .finish_non_exhaustive()
    }
}

/// Handle to one voice in the engine mixer
///
/// Dropping the handle detaches the voice.
pub struct CpalSound {
    mixer: Arc<Mutex<Mixer>>,
    id: u64,
    sample_rate: u32,
}

impl CpalSound {
    fn with_voice<T>(&self, f: impl FnOnce(&mut Voice) -> T) -> Option<T> {
        lock(&self.mixer).voices.get_mut(&self.id).map(f)
    }

    fn detached(&self) -> cadence_playback::PlaybackError {
        cadence_playback::PlaybackError::Device(format!("sound {} is no longer attached", self.id))
    }
}

impl Sound for CpalSound {
    fn start(&mut self) -> cadence_playback::Result<()> {
        self.with_voice(|voice| voice.running = !voice.finished)
            .ok_or_else(|| self.detached())
    }

    fn stop(&mut self) -> cadence_playback::Result<()> {
        self.with_voice(|voice| voice.running = false)
            .ok_or_else(|| self.detached())
    }

    fn seek_to_frame(&mut self, frame: u64) -> cadence_playback::Result<()> {
        let mut mixer = lock(&self.mixer);
        let voice = mixer.voices.get_mut(&self.id).ok_or_else(|| self.detached())?;

        voice.decoder.seek_to_frame(frame)?;
        voice.cursor = frame;
        voice.finished = voice.decoder.is_finished();
        Ok(())
    }

    fn cursor_frame(&self) -> u64 {
        self.with_voice(|voice| voice.cursor).unwrap_or(0)
    }

    fn length_frames(&self) -> u64 {
        self.with_voice(|voice| voice.length_frames()).unwrap_or(0)
    }

    fn length_seconds(&self) -> f32 {
        match self.length_frames() {
            u64::MAX => 0.0,
            frames => (frames as f64 / f64::from(self.sample_rate)) as f32,
        }
    }
}

impl Drop for CpalSound {
    fn drop(&mut self) {
        lock(&self.mixer).voices.remove(&self.id);
    }
}
