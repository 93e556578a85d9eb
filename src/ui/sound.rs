/// Sound engine: procedural 8-bit style sound effects via rodio.
///
/// Every `Sample` the simulation can trigger is generated as an in-memory
/// WAV buffer at init time. Playback is fire-and-forget (non-blocking) via
/// rodio's Sink.
///
/// Compile with `--no-default-features` or without "sound" feature
/// to disable audio entirely (the stub SoundEngine does nothing).
use std::f32::consts::PI;

use crate::domain::effect::Sample;

const SAMPLE_RATE: u32 = 22050;

/// Every sample, in a fixed order.
pub const ALL_SAMPLES: [Sample; 12] = [
    Sample::HitWall,
    Sample::HitGround,
    Sample::HurtLanding,
    Sample::Drink,
    Sample::TakeSword,
    Sample::Plate,
    Sample::LooseShake,
    Sample::LooseBreak,
    Sample::DoorOpen,
    Sample::DoorClose,
    Sample::DoorSlam,
    Sample::Spiked,
];

#[cfg(feature = "sound")]
mod inner {
    use std::collections::HashMap;
    use std::io::Cursor;
    use std::sync::Arc;

    use log::warn;
    use rodio::{OutputStream, OutputStreamHandle, Sink};

    use super::{make_wav, voice, ALL_SAMPLES};
    use crate::domain::effect::Sample;

    pub struct SoundEngine {
        _stream: OutputStream,
        handle: OutputStreamHandle,
        buffers: HashMap<Sample, Arc<Vec<u8>>>,
    }

    impl SoundEngine {
        pub fn new() -> Option<Self> {
            let (stream, handle) = match OutputStream::try_default() {
                Ok(s) => s,
                Err(e) => {
                    warn!("no audio output: {e}");
                    return None;
                }
            };
            let buffers = ALL_SAMPLES
                .iter()
                .map(|&s| (s, Arc::new(make_wav(&voice(s)))))
                .collect();
            Some(SoundEngine { _stream: stream, handle, buffers })
        }

        pub fn play(&self, sample: Sample) {
            let Some(buf) = self.buffers.get(&sample) else { return };
            if let Ok(sink) = Sink::try_new(&self.handle) {
                let cursor = Cursor::new(buf.as_ref().clone());
                if let Ok(src) = rodio::Decoder::new(cursor) {
                    sink.append(src);
                    sink.detach(); // fire-and-forget
                }
            }
        }
    }
}

// ════════════════════════════════════════════════════════════
//  Waveform generators — all produce Vec<f32> mono samples
// ════════════════════════════════════════════════════════════

/// The waveform for one sample.
pub fn voice(sample: Sample) -> Vec<f32> {
    match sample {
        Sample::HitWall => gen_thud(140.0, 0.08, 0.5),
        Sample::HitGround => gen_thud(90.0, 0.10, 0.4),
        Sample::HurtLanding => {
            let mut s = gen_thud(70.0, 0.12, 0.6);
            s.extend(gen_sweep(400.0, 250.0, 0.15, 0.25));
            s
        }
        Sample::Drink => gen_arpeggio(&[392.0, 494.0, 587.0, 784.0], 0.06),
        Sample::TakeSword => gen_arpeggio(&[523.0, 659.0, 784.0, 1047.0], 0.08),
        Sample::Plate => gen_blip(880.0, 0.03, 0.2),
        Sample::LooseShake => gen_noise(0.06, 0.15, 7),
        Sample::LooseBreak => gen_noise(0.25, 0.35, 11),
        Sample::DoorOpen => gen_sweep(200.0, 320.0, 0.2, 0.15),
        Sample::DoorClose => gen_sweep(320.0, 200.0, 0.2, 0.15),
        Sample::DoorSlam => {
            let mut s = gen_thud(110.0, 0.05, 0.6);
            s.extend(gen_noise(0.1, 0.3, 3));
            s
        }
        Sample::Spiked => gen_arpeggio(&[440.0, 370.0, 311.0, 261.0], 0.1),
    }
}

/// Simple sine blip at given frequency and duration
fn gen_blip(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32); // linear fade out
            (t * freq * 2.0 * PI).sin() * env * volume
        })
        .collect()
}

/// Low square-ish pulse with a fast decay: something heavy meeting stone.
fn gen_thud(freq: f32, duration: f32, volume: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    (0..n)
        .map(|i| {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = (1.0 - i as f32 / n as f32).powf(2.0);
            let wave = (t * freq * 2.0 * PI).sin().signum() * 0.6 + (t * freq * 2.0 * PI).sin() * 0.4;
            wave * env * volume
        })
        .collect()
}

/// Linear pitch sweep.
fn gen_sweep(from: f32, to: f32, duration: f32, volume: f32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    let mut phase = 0.0_f32;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            let freq = from + (to - from) * t;
            phase += freq * 2.0 * PI / SAMPLE_RATE as f32;
            let env = (1.0 - t).powf(0.6);
            phase.sin() * env * volume
        })
        .collect()
}

/// One short note per frequency, sine plus a harmonic for retro feel.
fn gen_arpeggio(notes: &[f32], note_dur: f32) -> Vec<f32> {
    let mut samples = Vec::new();
    for &freq in notes {
        let n = (SAMPLE_RATE as f32 * note_dur) as usize;
        for i in 0..n {
            let t = i as f32 / SAMPLE_RATE as f32;
            let env = 1.0 - (i as f32 / n as f32).powf(0.5);
            let wave = (t * freq * 2.0 * PI).sin() * 0.7 + (t * freq * 3.0 * 2.0 * PI).sin() * 0.3;
            samples.push(wave * env * 0.25);
        }
    }
    samples
}

/// Decaying noise burst. Seeded, so every run sounds the same.
fn gen_noise(duration: f32, volume: f32, seed: u32) -> Vec<f32> {
    let n = (SAMPLE_RATE as f32 * duration) as usize;
    let mut rng: u32 = seed;
    (0..n)
        .map(|i| {
            let t = i as f32 / n as f32;
            // Simple LCG noise
            rng = rng.wrapping_mul(1103515245).wrapping_add(12345);
            let noise = (rng as f32 / u32::MAX as f32) * 2.0 - 1.0;
            noise * (1.0 - t).powf(0.8) * volume
        })
        .collect()
}

// ════════════════════════════════════════════════════════════
//  WAV encoder — wraps f32 samples into a valid WAV buffer
// ════════════════════════════════════════════════════════════

#[cfg_attr(not(any(feature = "sound", test)), allow(dead_code))]
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
        let val = (s.clamp(-1.0, 1.0) * 32767.0) as i16;
        buf.extend_from_slice(&val.to_le_bytes());
    }

    buf
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
    pub fn play(&self, _sample: Sample) {}
}
