use crate::prelude::*;

/// De-interleaved float audio as handed over by a decoder or capture stage.
#[derive(Debug, Default, Clone)]
pub struct AudioSignal {
    pub sample_rate: u32,
    pub channels: u16,
    pub data: Vec<Vec<f32>>, // one buffer per channel, equal lengths
}

impl AudioSignal {
    pub fn mono(samples: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 1,
            data: vec![samples],
        }
    }

    pub fn stereo(left: Vec<f32>, right: Vec<f32>, sample_rate: u32) -> Self {
        Self {
            sample_rate,
            channels: 2,
            data: vec![left, right],
        }
    }

    /// Reject malformed signals before any encoding work happens.
    pub fn validate(&self) -> R<()> {
        if !(1..=2).contains(&self.channels) {
            return Err(anyhow!("Unsupported channel count: {}", self.channels));
        }
        if self.data.len() != self.channels as usize {
            return Err(anyhow!(
                "Channel count {} does not match {} channel buffers",
                self.channels,
                self.data.len()
            ));
        }

        let frame_count = self.data[0].len();
        if frame_count == 0 {
            return Err(anyhow!("Cannot encode empty audio signal"));
        }
        for (i, channel) in self.data.iter().enumerate() {
            if channel.len() != frame_count {
                return Err(anyhow!(
                    "Channel {} has {} samples, expected {}",
                    i,
                    channel.len(),
                    frame_count
                ));
            }
        }

        Ok(())
    }

    /// Flatten the signal into one frame-major sample sequence.
    ///
    /// Stereo channels are zipped left/right per frame; a mono channel is
    /// returned as-is.
    pub fn interleaved(&self) -> Vec<f32> {
        if self.channels == 2 {
            interleave(&self.data[0], &self.data[1])
        } else {
            self.data[0].clone()
        }
    }
}

/// Zip two channels into left/right pairs, one frame at a time.
///
/// Both channels must be the same length; `AudioSignal::validate` enforces
/// this before encoding.
pub fn interleave(left: &[f32], right: &[f32]) -> Vec<f32> {
    debug_assert_eq!(left.len(), right.len());

    let mut result = Vec::with_capacity(left.len() + right.len());
    for (l, r) in left.iter().zip(right) {
        result.push(*l);
        result.push(*r);
    }
    result
}

// ================================== TESTS ==================================
