//! Audio combiner
//!
//! Joins per-line clips into one conversation track. Every clip is decoded,
//! downmixed to mono and followed by a fixed gap of silence; the result is
//! encoded as a single 16-bit PCM WAV.

use crate::{PracticeError, Result};
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use log::debug;
use std::io::Cursor;
use symphonia::core::audio::SampleBuffer;
use symphonia::core::codecs::{DecoderOptions, CODEC_TYPE_NULL};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::FormatOptions;
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;

/// Silence appended after every clip
pub const GAP_MS: u32 = 500;

/// Decoded mono audio
#[derive(Debug, Clone, PartialEq)]
pub struct Clip {
    pub samples: Vec<f32>,
    pub sample_rate: u32,
}

impl Clip {
    pub fn duration_secs(&self) -> f64 {
        self.samples.len() as f64 / self.sample_rate as f64
    }
}

/// Number of silent samples in one gap at `sample_rate`
pub fn gap_samples(sample_rate: u32) -> usize {
    (u64::from(sample_rate) * u64::from(GAP_MS) / 1000) as usize
}

/// Combine encoded clips into one WAV track, in order
///
/// Fails without a partial result if any clip is undecodable or the clips
/// disagree on sample rate.
pub fn combine(clips: &[Vec<u8>]) -> Result<Vec<u8>> {
    if clips.is_empty() {
        return Err(PracticeError::Audio("No clips to combine".to_string()));
    }

    let decoded = clips
        .iter()
        .enumerate()
        .map(|(i, bytes)| {
            decode(bytes).map_err(|e| PracticeError::Audio(format!("Clip {}: {}", i + 1, e)))
        })
        .collect::<Result<Vec<Clip>>>()?;

    let sample_rate = decoded[0].sample_rate;
    if let Some((i, clip)) = decoded
        .iter()
        .enumerate()
        .find(|(_, clip)| clip.sample_rate != sample_rate)
    {
        return Err(PracticeError::Audio(format!(
            "Clip {} has sample rate {} Hz, expected {} Hz",
            i + 1,
            clip.sample_rate,
            sample_rate
        )));
    }

    let gap = gap_samples(sample_rate);
    let total: usize = decoded.iter().map(|c| c.samples.len() + gap).sum();
    let mut samples = Vec::with_capacity(total);
    for clip in &decoded {
        samples.extend_from_slice(&clip.samples);
        samples.extend(std::iter::repeat(0.0).take(gap));
    }

    debug!(
        "Combined {} clips into {} samples at {} Hz",
        decoded.len(),
        samples.len(),
        sample_rate
    );
    encode_wav(&samples, sample_rate)
}

/// Encode mono samples as 16-bit PCM WAV bytes
pub fn encode_wav(samples: &[f32], sample_rate: u32) -> Result<Vec<u8>> {
    let spec = WavSpec {
        channels: 1,
        sample_rate,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };
    let mut cursor = Cursor::new(Vec::new());
    {
        let mut writer = WavWriter::new(&mut cursor, spec)?;
        for &sample in samples {
            let scaled = (sample * 32768.0).round().clamp(-32768.0, 32767.0);
            writer.write_sample(scaled as i16)?;
        }
        writer.finalize()?;
    }
    Ok(cursor.into_inner())
}

/// Decode WAV or any compressed format symphonia understands into mono f32
pub fn decode(bytes: &[u8]) -> Result<Clip> {
    if bytes.starts_with(b"RIFF") {
        decode_wav(bytes)
    } else {
        decode_compressed(bytes)
    }
}

fn decode_wav(bytes: &[u8]) -> Result<Clip> {
    let reader = WavReader::new(Cursor::new(bytes))?;
    let spec = reader.spec();
    let interleaved: Vec<f32> = match spec.sample_format {
        SampleFormat::Float => reader
            .into_samples::<f32>()
            .collect::<std::result::Result<_, _>>()?,
        SampleFormat::Int => {
            let scale = (1i64 << (spec.bits_per_sample - 1)) as f32;
            reader
                .into_samples::<i32>()
                .map(|s| s.map(|s| s as f32 / scale))
                .collect::<std::result::Result<_, _>>()?
        }
    };

    Ok(Clip {
        samples: downmix(&interleaved, spec.channels as usize),
        sample_rate: spec.sample_rate,
    })
}

fn decode_compressed(bytes: &[u8]) -> Result<Clip> {
    let mss = MediaSourceStream::new(Box::new(Cursor::new(bytes.to_vec())), Default::default());
    let probed = symphonia::default::get_probe()
        .format(
            &Hint::new(),
            mss,
            &FormatOptions::default(),
            &MetadataOptions::default(),
        )
        .map_err(|e| PracticeError::Audio(format!("Unrecognized audio format: {}", e)))?;

    let mut format = probed.format;
    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or_else(|| PracticeError::Audio("No audio track found".to_string()))?;
    let track_id = track.id;
    let mut sample_rate = track.codec_params.sample_rate;

    let mut decoder = symphonia::default::get_codecs()
        .make(&track.codec_params, &DecoderOptions::default())
        .map_err(|e| PracticeError::Audio(format!("Unsupported codec: {}", e)))?;

    let mut samples = Vec::new();
    loop {
        let packet = match format.next_packet() {
            Ok(packet) => packet,
            Err(SymphoniaError::IoError(e)) if e.kind() == std::io::ErrorKind::UnexpectedEof => {
                break
            }
            Err(e) => return Err(PracticeError::Audio(format!("Failed to read packet: {}", e))),
        };
        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                sample_rate.get_or_insert(spec.rate);
                let mut buffer = SampleBuffer::<f32>::new(decoded.capacity() as u64, spec);
                buffer.copy_interleaved_ref(decoded);
                samples.extend(downmix(buffer.samples(), spec.channels.count()));
            }
            Err(e) => return Err(PracticeError::Audio(format!("Decode failed: {}", e))),
        }
    }

    if samples.is_empty() {
        return Err(PracticeError::Audio("Clip decoded to no samples".to_string()));
    }
    let sample_rate =
        sample_rate.ok_or_else(|| PracticeError::Audio("Unknown sample rate".to_string()))?;

    Ok(Clip {
        samples,
        sample_rate,
    })
}

fn downmix(interleaved: &[f32], channels: usize) -> Vec<f32> {
    if channels <= 1 {
        return interleaved.to_vec();
    }
    interleaved
        .chunks(channels)
        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
        .collect()
}
