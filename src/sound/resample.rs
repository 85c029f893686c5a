// Copyright (C) 2026 Michael Wilson <mike@mdwn.dev>
//
// This program is free software: you can redistribute it and/or modify it under
// the terms of the GNU General Public License as published by the Free Software
// Foundation, version 3.
//
// This program is distributed in the hope that it will be useful, but WITHOUT
// ANY WARRANTY; without even the implied warranty of MERCHANTABILITY or FITNESS
// FOR A PARTICULAR PURPOSE. See the GNU General Public License for more details.
//
// You should have received a copy of the GNU General Public License along with
// this program. If not, see <https://www.gnu.org/licenses/>.
//

//! Fixed-point linear interpolation from unsigned 8-bit source samples to
//! normalized float samples at the device rate.

use tracing::warn;

use super::error::SoundError;

/// Fractional bits carried by the position accumulator.
const FRAC_BITS: u32 = 8;
const FRAC_MASK: usize = (1 << FRAC_BITS) - 1;

/// Unsigned 8-bit silence.
const CENTER: i32 = 128;

/// Computes the output length for a source at `source_rate` played at `device_rate`.
pub fn target_len(srclen: usize, source_rate: u16, device_rate: u32) -> usize {
    if source_rate == 0 {
        return 0;
    }
    (srclen as u64 * u64::from(device_rate) / u64::from(source_rate)) as usize
}

/// Accumulator increment per output sample. The first output lands on the
/// first source sample and the last output lands on the last one.
fn step(srclen: usize, dstlen: usize) -> usize {
    if dstlen <= 1 {
        return 0;
    }
    ((srclen - 1) << FRAC_BITS) / (dstlen - 1)
}

/// Yields the (source index, fraction) pair read by every output sample.
fn positions(srclen: usize, dstlen: usize) -> impl Iterator<Item = (usize, usize)> {
    let step = step(srclen, dstlen);
    (0..dstlen).map(move |n| {
        let pos = n * step;
        ((pos >> FRAC_BITS).min(srclen - 1), pos & FRAC_MASK)
    })
}

/// Resamples `source` to exactly `dstlen` samples in [-1.0, 1.0].
pub fn resample(source: &[u8], dstlen: usize) -> Result<Vec<f32>, SoundError> {
    let srclen = source.len();
    if srclen == 0 || dstlen == 0 {
        warn!(srclen, dstlen, "unable to resample sound");
        return Err(SoundError::Resample { srclen, dstlen });
    }

    let last = srclen - 1;
    let output = positions(srclen, dstlen)
        .map(|(i, frac)| {
            let s1 = i32::from(source[i]) - CENTER;
            let s2 = i32::from(source[(i + 1).min(last)]) - CENTER;
            let frac = frac as i32;
            let value = (s1 * (255 - frac) + s2 * frac) >> FRAC_BITS;
            value as f32 / 128.0
        })
        .collect();
    Ok(output)
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;

    #[test]
    fn test_target_len() {
        assert_eq!(target_len(4, 11025, 44100), 16);
        assert_eq!(target_len(100, 22050, 44100), 200);
        assert_eq!(target_len(3, 44100, 11025), 0);
        assert_eq!(target_len(100, 0, 44100), 0);
    }

    #[test]
    fn test_output_length_and_positions() {
        let source: Vec<u8> = (0..100).map(|n| (n * 2) as u8).collect();
        let output = resample(&source, 200).unwrap();
        assert_eq!(output.len(), 200);

        let indexes: Vec<usize> = positions(100, 200).map(|(i, _)| i).collect();
        assert_eq!(indexes.len(), 200);
        assert!(indexes.windows(2).all(|w| w[0] <= w[1]));
        assert!(indexes.iter().all(|i| *i < 100));
    }

    #[test]
    fn test_silence() {
        for len in [1usize, 2, 7, 512] {
            let output = resample(&vec![128u8; len], len * 4).unwrap();
            assert!(output.iter().all(|s| s.abs() < f32::EPSILON));
        }
    }

    #[test]
    fn test_upsample_endpoints() {
        let source = [118u8, 128, 138, 128];
        let output = resample(&source, target_len(source.len(), 11025, 44100)).unwrap();

        assert_eq!(output.len(), 16);
        assert_relative_eq!(output[0], -0.078125);
        assert_relative_eq!(output[15], 0.0);
        assert!(output.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_extremes_stay_in_range() {
        let output = resample(&[0u8, 255, 0, 255], 64).unwrap();
        assert_relative_eq!(output[0], -1.0);
        assert!(output.iter().all(|s| (-1.0..=1.0).contains(s)));
    }

    #[test]
    fn test_single_sample_source() {
        let output = resample(&[255u8], 8).unwrap();
        assert_eq!(output.len(), 8);
        // 127 * 255 >> 8
        assert!(output.iter().all(|s| (*s - 126.0 / 128.0).abs() < f32::EPSILON));
    }

    #[test]
    fn test_empty_input_or_output() {
        assert!(matches!(
            resample(&[], 10),
            Err(SoundError::Resample { srclen: 0, dstlen: 10 })
        ));
        assert!(matches!(
            resample(&[128, 128], 0),
            Err(SoundError::Resample { srclen: 2, dstlen: 0 })
        ));
    }

    #[test]
    fn test_downsample() {
        let source: Vec<u8> = (0..=255).collect();
        let output = resample(&source, 4).unwrap();
        assert_eq!(output.len(), 4);
        assert!(output.windows(2).all(|w| w[0] <= w[1]));
    }
}
