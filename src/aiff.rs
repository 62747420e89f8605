use crate::prelude::*;

// Chunk Identifiers
const FORM_CHUNK_ID: &[u8; 4] = b"FORM";
const AIFF_FORMAT_ID: &[u8; 4] = b"AIFF";
const FMT_CHUNK_ID: &[u8; 4] = b"COMM";
const DATA_CHUNK_ID: &[u8; 4] = b"SSND";

// COMM payload: channels (2) + frames (4) + bit depth (2) + rate (10)
const COMM_CHUNK_SIZE: u32 = 18;

/// 80-bit IEEE 754 extended-precision encoding of a COMM sample rate.
///
/// Audio rates come from a small fixed set, so the encoder carries their
/// precomputed representations instead of a general 80-bit float writer.
/// Rates outside the table are rejected rather than written as a zeroed,
/// non-conformant field.
pub fn extended_sample_rate(rate: u32) -> R<[u8; 10]> {
    let bytes: [u8; 10] = match rate {
        8000 => [0x40, 0x0B, 0xFA, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        11025 => [0x40, 0x0C, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        16000 => [0x40, 0x0C, 0xFA, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        22050 => [0x40, 0x0D, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        32000 => [0x40, 0x0D, 0xFA, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        37800 => [0x40, 0x0E, 0x93, 0xA8, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        44056 => [0x40, 0x0E, 0xAC, 0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        44100 => [0x40, 0x0E, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        47250 => [0x40, 0x0E, 0xB8, 0x92, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        48000 => [0x40, 0x0E, 0xBB, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        50000 => [0x40, 0x0E, 0xC3, 0x50, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        50400 => [0x40, 0x0E, 0xC4, 0xE0, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        88200 => [0x40, 0x0F, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        96000 => [0x40, 0x0F, 0xBB, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        176400 => [0x40, 0x10, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        192000 => [0x40, 0x10, 0xBB, 0x80, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        352800 => [0x40, 0x11, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        2822400 => [0x40, 0x14, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        5644800 => [0x40, 0x15, 0xAC, 0x44, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00],
        _ => return Err(anyhow!("Unsupported sample rate: {} Hz", rate)),
    };

    Ok(bytes)
}

pub struct AiffEncoder;

impl AiffEncoder {
    /// Assemble a complete AIFF byte buffer from interleaved samples.
    ///
    /// `samples` is frame-major (left/right alternating for stereo) with
    /// values in [-1.0, 1.0]; out-of-range values are clamped before
    /// quantization to 16-bit signed big-endian PCM.
    pub fn encode(&self, samples: &[f32], sample_rate: u32, channels: u16) -> R<Vec<u8>> {
        if samples.is_empty() {
            return Err(anyhow!("Cannot encode empty sample buffer"));
        }
        if !(1..=2).contains(&channels) {
            return Err(anyhow!("Unsupported channel count: {}", channels));
        }
        if samples.len() % channels as usize != 0 {
            return Err(anyhow!(
                "{} samples cannot be split into {} equal channels",
                samples.len(),
                channels
            ));
        }

        let rate_bytes = extended_sample_rate(sample_rate)?;
        let num_frames = (samples.len() / channels as usize) as u32;

        dprintln!(
            "Encoding {} frames, {} ch @ {} Hz",
            num_frames,
            channels,
            sample_rate
        );

        let mut output = Cursor::new(Vec::with_capacity(54 + samples.len() * 2));

        // Write FORM header
        output.write_all(FORM_CHUNK_ID)?;
        output.write_u32::<BigEndian>(0)?; // Placeholder for file size
        output.write_all(AIFF_FORMAT_ID)?;

        // Write COMM chunk
        output.write_all(FMT_CHUNK_ID)?;
        output.write_u32::<BigEndian>(COMM_CHUNK_SIZE)?;
        output.write_u16::<BigEndian>(channels)?;
        output.write_u32::<BigEndian>(num_frames)?;
        output.write_u16::<BigEndian>(BIT_DEPTH_16)?;
        output.write_all(&rate_bytes)?;

        // Write SSND chunk header
        output.write_all(DATA_CHUNK_ID)?;
        let ssnd_chunk_size_pos = output.position();
        output.write_u32::<BigEndian>(0)?; // Placeholder for chunk size
        output.write_u32::<BigEndian>(0)?; // Offset
        output.write_u32::<BigEndian>(0)?; // Block size

        let start_data = output.position();
        encode_samples(&mut output, samples)?;
        let data_size = (output.position() - start_data) as u32;

        // Fill in SSND chunk size (sample bytes + offset and block size fields)
        let mut out = output.into_inner();
        (&mut out[ssnd_chunk_size_pos as usize..(ssnd_chunk_size_pos + 4) as usize])
            .write_u32::<BigEndian>(data_size + 8)?;

        // Fill in FORM file size
        let form_size = out.len() as u32 - 8;
        (&mut out[4..8]).write_u32::<BigEndian>(form_size)?;

        Ok(out)
    }
}

fn encode_samples<W: Write>(out: &mut W, samples: &[f32]) -> R<()> {
    for &sample in samples {
        let val = (sample.clamp(-1.0, 1.0) * I16_MAX_F).round() as i16;
        out.write_i16::<BigEndian>(val)?;
    }

    Ok(())
}

// ================================== TESTS ==================================

#[cfg(test)]
mod tests {
    use super::*;

    fn be_u32(buf: &[u8], offset: usize) -> u32 {
        u32::from_be_bytes(buf[offset..offset + 4].try_into().unwrap())
    }

    fn be_u16(buf: &[u8], offset: usize) -> u16 {
        u16::from_be_bytes(buf[offset..offset + 2].try_into().unwrap())
    }

    #[test]
    fn test_header_layout_mono() {
        let samples = vec![0.0f32; 100];
        let out = AiffEncoder.encode(&samples, 44100, 1).unwrap();

        assert_eq!(out.len(), 54 + 2 * samples.len());
        assert_eq!(&out[0..4], b"FORM");
        assert_eq!(be_u32(&out, 4), 4 + 26 + 16 + 2 * samples.len() as u32);
        assert_eq!(&out[8..12], b"AIFF");

        assert_eq!(&out[12..16], b"COMM");
        assert_eq!(be_u32(&out, 16), 18);
        assert_eq!(be_u16(&out, 20), 1);
        assert_eq!(be_u32(&out, 22), 100);
        assert_eq!(be_u16(&out, 26), 16);

        assert_eq!(&out[38..42], b"SSND");
        assert_eq!(be_u32(&out, 42), 2 * samples.len() as u32 + 8);
        assert_eq!(be_u32(&out, 46), 0); // offset
        assert_eq!(be_u32(&out, 50), 0); // block size
    }

    #[test]
    fn test_frames_per_channel_stereo() {
        let samples = vec![0.0f32; 10];
        let out = AiffEncoder.encode(&samples, 48000, 2).unwrap();

        assert_eq!(be_u16(&out, 20), 2);
        assert_eq!(be_u32(&out, 22), 5);
    }

    #[test]
    fn test_sample_rate_bytes_in_comm_chunk() {
        let out = AiffEncoder.encode(&[0.0], 44100, 1).unwrap();
        assert_eq!(&out[28..38], &[64, 14, 172, 68, 0, 0, 0, 0, 0, 0]);

        let out = AiffEncoder.encode(&[0.0], 8000, 1).unwrap();
        assert_eq!(&out[28..38], &[64, 11, 250, 0, 0, 0, 0, 0, 0, 0]);
    }

    #[test]
    fn test_extended_rate_table_covers_known_rates() {
        for rate in [
            8000, 11025, 16000, 22050, 32000, 37800, 44056, 44100, 47250, 48000, 50000, 50400,
            88200, 96000, 176400, 192000, 352800, 2822400, 5644800,
        ] {
            let bytes = extended_sample_rate(rate).unwrap();
            // Sign bit clear, biased exponent in the audio range
            assert_eq!(bytes[0], 0x40);
            assert_ne!(bytes[1], 0);
        }

        assert_eq!(
            extended_sample_rate(22050).unwrap(),
            [0x40, 0x0D, 0xAC, 0x44, 0, 0, 0, 0, 0, 0]
        );
    }

    #[test]
    fn test_unsupported_sample_rate_is_rejected() {
        assert!(extended_sample_rate(44101).is_err());
        assert!(AiffEncoder.encode(&[0.0], 12345, 1).is_err());
    }

    #[test]
    fn test_quantization_extremes() {
        let out = AiffEncoder.encode(&[1.0, -1.0, 0.0], 44100, 1).unwrap();

        assert_eq!(&out[54..56], &[0x7F, 0xFF]); // 32767
        assert_eq!(&out[56..58], &[0x80, 0x01]); // -32767
        assert_eq!(&out[58..60], &[0x00, 0x00]);
    }

    #[test]
    fn test_out_of_range_samples_clamp_to_full_scale() {
        let out = AiffEncoder.encode(&[2.5, -7.0], 44100, 1).unwrap();

        assert_eq!(&out[54..56], &[0x7F, 0xFF]);
        assert_eq!(&out[56..58], &[0x80, 0x01]);
    }

    #[test]
    fn test_invalid_inputs_are_rejected() {
        assert!(AiffEncoder.encode(&[], 44100, 1).is_err());
        assert!(AiffEncoder.encode(&[0.0], 44100, 0).is_err());
        assert!(AiffEncoder.encode(&[0.0], 44100, 3).is_err());
        // Odd sample count cannot form whole stereo frames
        assert!(AiffEncoder.encode(&[0.0, 0.0, 0.0], 44100, 2).is_err());
    }

    #[test]
    fn test_encode_is_idempotent() {
        let samples = [0.1f32, -0.2, 0.3, -0.4];
        let first = AiffEncoder.encode(&samples, 96000, 2).unwrap();
        let second = AiffEncoder.encode(&samples, 96000, 2).unwrap();
        assert_eq!(first, second);
    }
}
