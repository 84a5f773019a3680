/// Sound engine: gentle procedural feedback notes via rodio.
///
/// All sounds are generated as in-memory WAV buffers at init time.
/// Playback is fire-and-forget (non-blocking) via rodio's Sink.
///
/// The engine core never plays audio — it emits events, and this
/// collaborator owns everything audible, including the rapid-click
/// debounce: a short window for placement blips, a longer one for the
/// celebration chord, so mashing tiles never stacks sounds.
///
/// Compile without the "sound" feature to disable audio entirely (the
/// stub SoundEngine does nothing).

#[cfg(feature = "sound")]
mod inner {
    use std::cell::Cell;
    use std::io::Cursor;
    use std::sync::Arc;
    use std::time::{Duration, Instant};

    use rodio::{OutputStream, OutputStreamHandle, Sink};

    const SAMPLE_RATE: u32 = 22050;

    /// Rapid repeated triggers inside these windows are swallowed.
    const DEBOUNCE_SHORT: Duration = Duration::from_millis(200);
    const DEBOUNCE_LONG: Duration = Duration::from_millis(750);

    /// Pre-generated WAV buffers for each sound effect.
    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        sfx_success: Arc<Vec<u8>>,
        sfx_error: Arc<Vec<u8>>,
        sfx_celebration: Arc<Vec<u8>>,
        sfx_blip: Arc<Vec<u8>>,
        last_success: Cell<Option<Instant>>,
        last_error: Cell<Option<Instant>>,
        last_celebration: Cell<Option<Instant>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = OutputStream::try_default().ok()?;

            // ── Generate all sound buffers ──
            let sfx_success = Arc::new(make_wav(&gen_success()));
            let sfx_error = Arc::new(make_wav(&gen_error()));
            let sfx_celebration = Arc::new(make_wav(&gen_celebration()));
            let sfx_blip = Arc::new(make_wav(&gen_blip(660.0, 0.04, 0.2)));

            Some(SoundEngine {
                _stream: stream,
                handle,
                sfx_success,
                sfx_error,
                sfx_celebration,
                sfx_blip,
                last_success: Cell::new(None),
                last_error: Cell::new(None),
                last_celebration: Cell::new(None),
            })
        }

        fn play(&self, buf: &Arc<Vec<u8>>) {
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }

        fn debounced(&self, last: &Cell<Option<Instant>>, window: Duration) -> bool {
            let now = Instant::now();
            if let Some(prev) = last.get() {
                if now.duration_since(prev) < window {
                    return false;
                }
            }
            last.set(Some(now));
            true
        }

        /// Correct placement: a soft A5 tap.
        pub fn play_success(&self) {
            if self.debounced(&self.last_success, DEBOUNCE_SHORT) {
                self.play(&self.sfx_success);
            }
        }

        /// Wrong placement: a muted F#4 bump.
        pub fn play_error(&self) {
            if self.debounced(&self.last_error, DEBOUNCE_SHORT) {
                self.play(&self.sfx_error);
            }
        }

        /// Word complete: rising C6-E6-G6-C7 chord.
        pub fn play_celebration(&self) {
            if self.debounced(&self.last_celebration, DEBOUNCE_LONG) {
                self.play(&self.sfx_celebration);
            }
        }

        /// Menu navigation blip (not debounced; menus can't be mashed).
        pub fn play_menu_blip(&self) {
            self.play(&self.sfx_blip);
        }
    }

    // ════════════════════════════════════════════════════════════
    //  Waveform generators — all produce Vec<f32> mono samples
    // ════════════════════════════════════════════════════════════

    /// Simple sine blip at given frequency and duration
    fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32); // linear fade out
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * volume
            })
            .collect()
    }

    /// Success: short A5 with a touch of second harmonic for warmth.
    fn gen_success() -> Vec<f32> {
        let freq = 880.0_f32; // A5
        let duration = 0.07;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(0.5);
                let wave = (t * freq * 2.0 * std::f32::consts::PI).sin() * 0.7
                    + (t * freq * 2.0 * 2.0 * std::f32::consts::PI).sin() * 0.3;
                wave * env * 0.25
            })
            .collect()
    }

    /// Error: low F#4, slightly longer, fading fast.
    fn gen_error() -> Vec<f32> {
        let freq = 370.0_f32; // F#4
        let duration = 0.12;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = (1.0 - i as f32 / n as f32).powf(0.8);
                (t * freq * 2.0 * std::f32::consts::PI).sin() * env * 0.25
            })
            .collect()
    }

    /// Celebration: C6-E6-G6-C7 struck together and held half a second.
    fn gen_celebration() -> Vec<f32> {
        let chord = [1047.0_f32, 1319.0, 1568.0, 2093.0]; // C6 E6 G6 C7
        let duration = 0.5;
        let n = (SAMPLE_RATE as f32 * duration) as usize;
        (0..n)
            .map(|i| {
                let t = i as f32 / SAMPLE_RATE as f32;
                let env = 1.0 - (i as f32 / n as f32).powf(2.0);
                let wave: f32 = chord
                    .iter()
                    .map(|&f| (t * f * 2.0 * std::f32::consts::PI).sin())
                    .sum();
                wave / chord.len() as f32 * env * 0.3
            })
            .collect()
    }

    // ════════════════════════════════════════════════════════════
    //  WAV encoder — wraps f32 samples into a valid WAV buffer
    // ════════════════════════════════════════════════════════════

    fn make_wav(samples: &[f32]) -> Vec<u8> {
        let num_channels: u16 = 1;
        let bits_per_sample: u16 = 16;
        let byte_rate = SAMPLE_RATE * (num_channels as u32) * (bits_per_sample as u32) / 8;
        let block_align = num_channels * bits_per_sample / 8;
        let data_size = samples.len() as u32 * 2; // 16-bit = 2 bytes per sample
        let file_size = 36 + data_size;

        let mut buf = Vec::with_capacity(44 + data_size as usize);

        // RIFF header
        buf.extend_from_slice(b"RIFF");
        buf.extend_from_slice(&file_size.to_le_bytes());
        buf.extend_from_slice(b"WAVE");

        // fmt chunk
        buf.extend_from_slice(b"fmt ");
        buf.extend_from_slice(&16u32.to_le_bytes()); // chunk size
        buf.extend_from_slice(&1u16.to_le_bytes()); // PCM format
        buf.extend_from_slice(&num_channels.to_le_bytes());
        buf.extend_from_slice(&SAMPLE_RATE.to_le_bytes());
        buf.extend_from_slice(&byte_rate.to_le_bytes());
        buf.extend_from_slice(&block_align.to_le_bytes());
        buf.extend_from_slice(&bits_per_sample.to_le_bytes());

        // data chunk
        buf.extend_from_slice(b"data");
        buf.extend_from_slice(&data_size.to_le_bytes());

        for &s in samples {
            let clamped = s.max(-1.0).min(1.0);
            let val = (clamped * 32767.0) as i16;
            buf.extend_from_slice(&val.to_le_bytes());
        }

        buf
    }
}

// ════════════════════════════════════════════════════════════
//  Public API — compiles to no-ops when sound feature is off
// ════════════════════════════════════════════════════════════

#[cfg(feature = "sound")]
pub use inner::SoundEngine;

#[cfg(not(feature = "sound"))]
pub struct SoundEngine;

#[cfg(not(feature = "sound"))]
impl SoundEngine {
    pub fn new() -> Option<Self> {
        Some(SoundEngine)
    }
    pub fn play_success(&self) {}
    pub fn play_error(&self) {}
    pub fn play_celebration(&self) {}
    pub fn play_menu_blip(&self) {}
}
