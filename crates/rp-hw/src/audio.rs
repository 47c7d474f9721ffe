//! Clip playback
//!
//! WAV clips are decoded up front into shared buffers. The control loop
//! sends commands to the mixer through a lock-free ring buffer; the mixer
//! runs inside the output callback and never locks or allocates.
//!
//! ```text
//! ClipPlayer ──rtrb──▶ Mixer::process ──▶ cpal output (feature `audio`)
//! ```

use std::collections::HashMap;
use std::path::Path;
use std::sync::Arc;

use rtrb::{Consumer, Producer, RingBuffer};

use rp_game::{AudioPlayer, Clip, DeviceError, DeviceResult};

// ═══════════════════════════════════════════════════════════════════════════
// CONSTANTS
// ═══════════════════════════════════════════════════════════════════════════

/// Concurrent voices (pre-allocated)
const MAX_VOICES: usize = 8;

/// Command ring buffer size
const COMMAND_BUFFER_SIZE: usize = 32;

// ═══════════════════════════════════════════════════════════════════════════
// CLIPS
// ═══════════════════════════════════════════════════════════════════════════

/// Decoded clip: interleaved f32 samples
#[derive(Debug, Clone, PartialEq)]
pub struct ClipBuffer {
    samples: Vec<f32>,
    channels: u16,
    sample_rate: u32,
}

impl ClipBuffer {
    pub fn from_samples(samples: Vec<f32>, channels: u16, sample_rate: u32) -> Self {
        Self {
            samples,
            channels: channels.max(1),
            sample_rate,
        }
    }

    /// Decode a WAV file (integer or float samples)
    pub fn load(path: &Path) -> DeviceResult<Self> {
        let audio_error = |err: hound::Error| DeviceError::Audio(format!("{}: {}", path.display(), err));

        let mut reader = hound::WavReader::open(path).map_err(audio_error)?;
        let spec = reader.spec();
        let samples = match spec.sample_format {
            hound::SampleFormat::Float => reader
                .samples::<f32>()
                .collect::<Result<Vec<_>, _>>()
                .map_err(audio_error)?,
            hound::SampleFormat::Int => {
                let scale = 1.0 / (1_i64 << (spec.bits_per_sample.clamp(1, 32) - 1)) as f32;
                reader
                    .samples::<i32>()
                    .map(|sample| sample.map(|value| value as f32 * scale))
                    .collect::<Result<Vec<_>, _>>()
                    .map_err(audio_error)?
            }
        };

        let clip = Self::from_samples(samples, spec.channels, spec.sample_rate);
        log::info!(
            "loaded {} ({} Hz, {} ch, {:.2}s)",
            path.display(),
            clip.sample_rate,
            clip.channels,
            clip.duration_secs()
        );
        Ok(clip)
    }

    pub fn frames(&self) -> usize {
        self.samples.len() / usize::from(self.channels)
    }

    pub fn channels(&self) -> u16 {
        self.channels
    }

    pub fn sample_rate(&self) -> u32 {
        self.sample_rate
    }

    pub fn duration_secs(&self) -> f64 {
        if self.sample_rate == 0 {
            0.0
        } else {
            self.frames() as f64 / f64::from(self.sample_rate)
        }
    }

    /// Left and right sample of a frame; mono is duplicated
    #[inline]
    fn frame(&self, index: usize) -> (f32, f32) {
        let channels = usize::from(self.channels);
        let left = self.samples[index * channels];
        let right = if channels > 1 { self.samples[index * channels + 1] } else { left };
        (left, right)
    }
}

/// Clips by id
#[derive(Debug, Clone, Default)]
pub struct ClipBank {
    clips: HashMap<Clip, Arc<ClipBuffer>>,
}

impl ClipBank {
    pub fn new() -> Self {
        Self::default()
    }

    /// Load whichever clip files are given
    pub fn load(spin: Option<&Path>, win: Option<&Path>) -> DeviceResult<Self> {
        let mut bank = Self::new();
        for (clip, path) in [(Clip::Spin, spin), (Clip::Win, win)] {
            if let Some(path) = path {
                bank.insert(clip, ClipBuffer::load(path)?);
            }
        }
        Ok(bank)
    }

    pub fn insert(&mut self, clip: Clip, buffer: ClipBuffer) {
        self.clips.insert(clip, Arc::new(buffer));
    }

    pub fn get(&self, clip: Clip) -> Option<&Arc<ClipBuffer>> {
        self.clips.get(&clip)
    }

    pub fn is_empty(&self) -> bool {
        self.clips.is_empty()
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// MIXER (output thread side)
// ═══════════════════════════════════════════════════════════════════════════

enum MixerCommand {
    Play {
        clip: Clip,
        audio: Arc<ClipBuffer>,
        looping: bool,
    },
    /// Fade every voice of `clip` to silence over `frames`
    FadeOut { clip: Clip, frames: u64 },
    StopAll,
}

struct Voice {
    clip: Clip,
    audio: Arc<ClipBuffer>,
    position: usize,
    looping: bool,
    fading: bool,
    fade_total: u64,
    fade_remaining: u64,
}

impl Voice {
    fn new(clip: Clip, audio: Arc<ClipBuffer>, looping: bool) -> Self {
        Self {
            clip,
            audio,
            position: 0,
            looping,
            fading: false,
            fade_total: 0,
            fade_remaining: 0,
        }
    }

    fn start_fade_out(&mut self, frames: u64) {
        if !self.fading {
            self.fading = true;
            self.fade_total = frames;
            self.fade_remaining = frames;
        }
    }

    /// Add this voice into `output`; false once it has finished
    #[inline]
    fn mix_into(&mut self, output: &mut [f32], channels: usize) -> bool {
        let total_frames = self.audio.frames();
        if total_frames == 0 || channels == 0 {
            return false;
        }

        for frame in output.chunks_exact_mut(channels) {
            if self.position >= total_frames {
                if !self.looping {
                    return false;
                }
                self.position = 0;
            }

            let gain = if self.fading {
                if self.fade_remaining == 0 {
                    return false;
                }
                let gain = self.fade_remaining as f32 / self.fade_total as f32;
                self.fade_remaining -= 1;
                gain
            } else {
                1.0
            };

            let (left, right) = self.audio.frame(self.position);
            match frame {
                [mono] => *mono += (left + right) * 0.5 * gain,
                // Extra channels stay silent
                [l, r, ..] => {
                    *l += left * gain;
                    *r += right * gain;
                }
                [] => {}
            }
            self.position += 1;
        }

        self.looping || self.position < total_frames
    }
}

/// Voice mixer driven by the output callback
pub struct Mixer {
    voices: [Option<Voice>; MAX_VOICES],
    commands: Consumer<MixerCommand>,
}

impl Mixer {
    fn new(commands: Consumer<MixerCommand>) -> Self {
        Self {
            voices: std::array::from_fn(|_| None),
            commands,
        }
    }

    fn process_commands(&mut self) {
        while let Ok(command) = self.commands.pop() {
            match command {
                MixerCommand::Play { clip, audio, looping } => {
                    // No free slot: the clip is dropped
                    if let Some(slot) = self.voices.iter_mut().find(|v| v.is_none()) {
                        *slot = Some(Voice::new(clip, audio, looping));
                    }
                }
                MixerCommand::FadeOut { clip, frames } => {
                    for voice in self.voices.iter_mut().flatten().filter(|v| v.clip == clip) {
                        voice.start_fade_out(frames);
                    }
                }
                MixerCommand::StopAll => self.voices.iter_mut().for_each(|v| *v = None),
            }
        }
    }

    /// Fill one interleaved output buffer
    #[inline]
    pub fn process(&mut self, output: &mut [f32], channels: usize) {
        self.process_commands();
        output.fill(0.0);

        for slot in &mut self.voices {
            if let Some(voice) = slot {
                if !voice.mix_into(output, channels) {
                    *slot = None;
                }
            }
        }

        for sample in output.iter_mut() {
            *sample = sample.clamp(-1.0, 1.0);
        }
    }

    pub fn active_voices(&self) -> usize {
        self.voices.iter().flatten().count()
    }

    pub fn is_playing(&self, clip: Clip) -> bool {
        self.voices.iter().flatten().any(|v| v.clip == clip)
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// PLAYER (control loop side)
// ═══════════════════════════════════════════════════════════════════════════

/// [`AudioPlayer`] backed by the mixer.
///
/// The spin clip loops until faded; the win clip plays once.
pub struct ClipPlayer {
    bank: ClipBank,
    commands: Producer<MixerCommand>,
    output_rate: u32,
    #[cfg(feature = "audio")]
    _stream: Option<output::OutputStream>,
}

impl ClipPlayer {
    /// Player and mixer without an output device; the caller drives
    /// [`Mixer::process`] at `output_rate`
    pub fn detached(bank: ClipBank, output_rate: u32) -> (Self, Mixer) {
        let (producer, consumer) = RingBuffer::new(COMMAND_BUFFER_SIZE);
        let player = Self {
            bank,
            commands: producer,
            output_rate,
            #[cfg(feature = "audio")]
            _stream: None,
        };
        (player, Mixer::new(consumer))
    }

    /// Open the default output device
    #[cfg(feature = "audio")]
    pub fn start(bank: ClipBank) -> DeviceResult<Self> {
        let (producer, consumer) = RingBuffer::new(COMMAND_BUFFER_SIZE);
        let (stream, output_rate) = output::OutputStream::spawn(Mixer::new(consumer))?;
        for clip in [Clip::Spin, Clip::Win] {
            if let Some(audio) = bank.get(clip) {
                if audio.sample_rate() != output_rate {
                    log::warn!(
                        "{:?} clip is {} Hz but output runs at {} Hz; it will play off-pitch",
                        clip,
                        audio.sample_rate(),
                        output_rate
                    );
                }
            }
        }
        Ok(Self {
            bank,
            commands: producer,
            output_rate,
            _stream: Some(stream),
        })
    }

    #[cfg(not(feature = "audio"))]
    pub fn start(_bank: ClipBank) -> DeviceResult<Self> {
        Err(DeviceError::Unavailable("built without the `audio` feature".into()))
    }

    pub fn output_rate(&self) -> u32 {
        self.output_rate
    }

    /// Output frames for a fade of `duration_ms`
    pub fn fade_frames(&self, duration_ms: u32) -> u64 {
        u64::from(duration_ms) * u64::from(self.output_rate) / 1000
    }

    pub fn stop_all(&mut self) -> DeviceResult<()> {
        self.send(MixerCommand::StopAll)
    }

    fn send(&mut self, command: MixerCommand) -> DeviceResult<()> {
        self.commands
            .push(command)
            .map_err(|_| DeviceError::Audio("mixer command queue full".into()))
    }
}

impl AudioPlayer for ClipPlayer {
    fn play(&mut self, clip: Clip) -> DeviceResult<()> {
        let audio = Arc::clone(self.bank.get(clip).ok_or(DeviceError::UnknownClip(clip))?);
        self.send(MixerCommand::Play {
            clip,
            audio,
            looping: clip == Clip::Spin,
        })
    }

    fn fade_out(&mut self, clip: Clip, duration_ms: u32) -> DeviceResult<()> {
        if self.bank.get(clip).is_none() {
            return Ok(());
        }
        let frames = self.fade_frames(duration_ms);
        self.send(MixerCommand::FadeOut { clip, frames })
    }
}

// ═══════════════════════════════════════════════════════════════════════════
// OUTPUT STREAM THREAD
// ═══════════════════════════════════════════════════════════════════════════

#[cfg(feature = "audio")]
mod output {
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};
    use std::thread::{self, JoinHandle};
    use std::time::Duration;

    use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
    use crossbeam_channel::{Sender, bounded};

    use rp_game::{DeviceError, DeviceResult};

    use super::Mixer;

    /// Owns the thread that keeps the cpal stream alive
    pub(super) struct OutputStream {
        stop: Arc<AtomicBool>,
        handle: Option<JoinHandle<()>>,
    }

    impl OutputStream {
        /// Start the stream; returns once it is playing, with its sample rate
        pub(super) fn spawn(mixer: Mixer) -> DeviceResult<(Self, u32)> {
            let stop = Arc::new(AtomicBool::new(false));
            let (ready_tx, ready_rx) = bounded(1);

            let thread_stop = Arc::clone(&stop);
            let handle = thread::Builder::new()
                .name("clip-output".into())
                .spawn(move || {
                    if let Err(err) = run_stream(mixer, &thread_stop, &ready_tx) {
                        let _ = ready_tx.send(Err(err));
                    }
                })?;

            let mut stream = Self {
                stop,
                handle: Some(handle),
            };
            match ready_rx.recv_timeout(Duration::from_secs(2)) {
                Ok(Ok(rate)) => Ok((stream, rate)),
                Ok(Err(message)) => {
                    stream.shutdown();
                    Err(DeviceError::Audio(message))
                }
                Err(_) => {
                    stream.shutdown();
                    Err(DeviceError::Audio("output stream did not start".into()))
                }
            }
        }

        fn shutdown(&mut self) {
            self.stop.store(true, Ordering::Release);
            if let Some(handle) = self.handle.take() {
                let _ = handle.join();
            }
        }
    }

    impl Drop for OutputStream {
        fn drop(&mut self) {
            self.shutdown();
        }
    }

    fn run_stream(
        mut mixer: Mixer,
        stop: &AtomicBool,
        ready: &Sender<Result<u32, String>>,
    ) -> Result<(), String> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("no audio output device")?;
        let config = device
            .default_output_config()
            .map_err(|e| format!("output config: {}", e))?;

        let channels = config.channels() as usize;
        let sample_rate = config.sample_rate().0;

        let stream = device
            .build_output_stream(
                &config.into(),
                move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                    mixer.process(data, channels);
                },
                |err| log::warn!("audio stream error: {}", err),
                None,
            )
            .map_err(|e| format!("build stream: {}", e))?;
        stream.play().map_err(|e| format!("start stream: {}", e))?;

        log::info!("audio output: {} Hz, {} channels", sample_rate, channels);
        let _ = ready.send(Ok(sample_rate));

        while !stop.load(Ordering::Acquire) {
            thread::sleep(Duration::from_millis(50));
        }
        drop(stream);
        log::info!("audio output stopped");
        Ok(())
    }
}
