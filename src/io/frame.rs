/// A block of 16-bit PCM samples with a fixed capacity and a valid length.
///
/// Frames are allocated once and recycled, so nothing on the audio path
/// allocates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    samples: Box<[i16]>,
    len: usize,
}

impl Frame {
    /// Empty frame able to hold `capacity` samples.
    pub fn new(capacity: usize) -> Self {
        Self {
            samples: vec![0; capacity].into_boxed_slice(),
            len: 0,
        }
    }

    /// Full frame holding a copy of `samples`.
    pub fn from_samples(samples: &[i16]) -> Self {
        Self {
            samples: samples.into(),
            len: samples.len(),
        }
    }

    pub fn capacity(&self) -> usize {
        self.samples.len()
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn is_full(&self) -> bool {
        self.len == self.samples.len()
    }

    /// Valid samples.
    pub fn as_slice(&self) -> &[i16] {
        &self.samples[..self.len]
    }

    /// The whole buffer, regardless of the valid length.
    pub fn buffer_mut(&mut self) -> &mut [i16] {
        &mut self.samples
    }

    /// Mark the first `len` samples valid, capped at the capacity.
    pub fn set_len(&mut self, len: usize) {
        self.len = len.min(self.samples.len());
    }

    /// Append as many of `samples` as fit. Returns how many were taken.
    pub fn extend_from(&mut self, samples: &[i16]) -> usize {
        let taken = samples.len().min(self.samples.len() - self.len);
        self.samples[self.len..self.len + taken].copy_from_slice(&samples[..taken]);
        self.len += taken;
        taken
    }

    pub fn clear(&mut self) {
        self.len = 0;
    }

    /// Zero the whole buffer and mark it full.
    pub fn fill_silence(&mut self) {
        self.samples.fill(0);
        self.len = self.samples.len();
    }
}
