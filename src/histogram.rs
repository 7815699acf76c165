use image::GrayImage;

pub const BUCKETS: usize = 256;

/// Frequency of every 8-bit value in a height map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Histogram {
    counts: [u64; BUCKETS],
}

impl Default for Histogram {
    fn default() -> Self {
        Self { counts: [0; BUCKETS] }
    }
}

impl Histogram {
    pub fn from_counts(counts: [u64; BUCKETS]) -> Self {
        Self { counts }
    }

    pub fn counts(&self) -> &[u64; BUCKETS] {
        &self.counts
    }

    pub fn count(&self, value: u8) -> u64 {
        self.counts[value as usize]
    }

    /// Number of pixels summarized
    pub fn total(&self) -> u64 {
        self.counts.iter().sum()
    }

    pub fn max_count(&self) -> u64 {
        self.counts.iter().copied().max().unwrap_or(0)
    }

    /// Most frequent value, lowest wins on ties. `None` for an empty histogram.
    pub fn mode(&self) -> Option<u8> {
        let max = self.max_count();
        if max == 0 {
            return None;
        }
        self.counts.iter().position(|&c| c == max).map(|i| i as u8)
    }

    pub fn nonzero_buckets(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// Counts how many pixels of `buffer` hold each value.
pub fn summarize(buffer: &GrayImage) -> Histogram {
    let mut histogram = Histogram::default();
    for &value in buffer.as_raw() {
        histogram.counts[value as usize] += 1;
    }
    histogram
}
