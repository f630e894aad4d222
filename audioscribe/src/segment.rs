use crate::audio::AudioStream;

/// Default window length submitted per recognition call.
pub const DEFAULT_CHUNK_DURATION: f64 = 60.0;

/// Default cap on how much of the stream is processed (first 5 minutes).
pub const DEFAULT_MAX_TOTAL_DURATION: f64 = 300.0;

/// Windowing parameters for the cloud recognition path.
#[derive(Debug, Clone)]
pub struct SegmenterConfig {
    /// Length of each window in seconds. The final window may be shorter.
    pub chunk_duration: f64,
    /// Cap on total processed duration in seconds; `None` processes the
    /// whole stream. Bounds total work, not wall-clock time.
    pub max_total_duration: Option<f64>,
}

impl Default for SegmenterConfig {
    fn default() -> Self {
        Self {
            chunk_duration: DEFAULT_CHUNK_DURATION,
            max_total_duration: Some(DEFAULT_MAX_TOTAL_DURATION),
        }
    }
}

/// One time window `[start, end)` over an audio stream, with its sub-buffer.
///
/// Borrowed from the stream; dropped as soon as its recognition outcome has
/// been recorded.
#[derive(Debug, Clone, Copy)]
pub struct Segment<'a> {
    /// Window start in seconds.
    pub start: f64,
    /// Window end in seconds (exclusive).
    pub end: f64,
    /// The PCM samples of this window.
    pub samples: &'a [f32],
}

/// Slices a stream into non-overlapping, chronologically ordered windows
/// covering `[0, min(duration, max_total_duration))`.
///
/// Window arithmetic is done in sample indices, so consecutive windows tile
/// the stream exactly with no float drift. [`Segmenter::segments`] can be
/// called repeatedly; each call restarts from the beginning.
pub struct Segmenter<'a> {
    stream: &'a AudioStream,
    chunk_samples: usize,
    limit_samples: usize,
}

impl<'a> Segmenter<'a> {
    pub fn new(stream: &'a AudioStream, config: &SegmenterConfig) -> Self {
        let rate = stream.sample_rate() as f64;
        // At least one sample per window, so the iterator always advances.
        let chunk_samples = ((config.chunk_duration * rate).round() as usize).max(1);
        let limit_samples = match config.max_total_duration {
            Some(cap) => stream
                .samples()
                .len()
                .min((cap.max(0.0) * rate).round() as usize),
            None => stream.samples().len(),
        };
        Self {
            stream,
            chunk_samples,
            limit_samples,
        }
    }

    /// A fresh iterator over the stream's windows.
    pub fn segments(&self) -> Segments<'a> {
        Segments {
            samples: &self.stream.samples()[..self.limit_samples],
            sample_rate: self.stream.sample_rate(),
            chunk_samples: self.chunk_samples,
            pos: 0,
        }
    }

    /// Number of windows the iterator will yield.
    pub fn len(&self) -> usize {
        self.limit_samples.div_ceil(self.chunk_samples)
    }

    pub fn is_empty(&self) -> bool {
        self.limit_samples == 0
    }
}

/// Lazy window iterator produced by [`Segmenter::segments`].
pub struct Segments<'a> {
    samples: &'a [f32],
    sample_rate: u32,
    chunk_samples: usize,
    pos: usize,
}

impl<'a> Iterator for Segments<'a> {
    type Item = Segment<'a>;

    fn next(&mut self) -> Option<Segment<'a>> {
        if self.pos >= self.samples.len() {
            return None;
        }
        let start = self.pos;
        let end = (start + self.chunk_samples).min(self.samples.len());
        self.pos = end;
        Some(Segment {
            start: start as f64 / self.sample_rate as f64,
            end: end as f64 / self.sample_rate as f64,
            samples: &self.samples[start..end],
        })
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        let remaining = (self.samples.len() - self.pos.min(self.samples.len()))
            .div_ceil(self.chunk_samples);
        (remaining, Some(remaining))
    }
}

impl ExactSizeIterator for Segments<'_> {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::audio::AudioStream;

    fn stream_of(duration_secs: f64, rate: u32) -> AudioStream {
        let n = (duration_secs * rate as f64).round() as usize;
        AudioStream::new(vec![0.0; n], rate).unwrap()
    }

    fn config(chunk: f64, cap: Option<f64>) -> SegmenterConfig {
        SegmenterConfig {
            chunk_duration: chunk,
            max_total_duration: cap,
        }
    }

    #[test]
    fn test_empty_stream_yields_nothing() {
        let stream = stream_of(0.0, 16_000);
        let segmenter = Segmenter::new(&stream, &SegmenterConfig::default());
        assert!(segmenter.is_empty());
        assert_eq!(segmenter.segments().count(), 0);
    }

    #[test]
    fn test_exact_multiple() {
        let stream = stream_of(120.0, 16_000);
        let segmenter = Segmenter::new(&stream, &config(60.0, Some(300.0)));
        let segs: Vec<_> = segmenter.segments().collect();
        assert_eq!(segs.len(), 2);
        assert_eq!(segs[0].start, 0.0);
        assert_eq!(segs[0].end, 60.0);
        assert_eq!(segs[1].start, 60.0);
        assert_eq!(segs[1].end, 120.0);
    }

    #[test]
    fn test_short_final_window() {
        // 125 s stream, 60 s chunks, 300 s cap: [0,60) [60,120) [120,125)
        let stream = stream_of(125.0, 16_000);
        let segmenter = Segmenter::new(&stream, &config(60.0, Some(300.0)));
        let segs: Vec<_> = segmenter.segments().collect();
        assert_eq!(segs.len(), 3);
        assert_eq!((segs[2].start, segs[2].end), (120.0, 125.0));
        assert_eq!(segs[2].samples.len(), 5 * 16_000);
    }

    #[test]
    fn test_cap_truncates() {
        let stream = stream_of(600.0, 8_000);
        let segmenter = Segmenter::new(&stream, &config(60.0, Some(300.0)));
        let segs: Vec<_> = segmenter.segments().collect();
        assert_eq!(segs.len(), 5);
        assert_eq!(segs.last().unwrap().end, 300.0);
    }

    #[test]
    fn test_no_cap_covers_whole_stream() {
        let stream = stream_of(400.0, 8_000);
        let segmenter = Segmenter::new(&stream, &config(60.0, None));
        let segs: Vec<_> = segmenter.segments().collect();
        assert_eq!(segs.len(), 7);
        assert_eq!(segs.last().unwrap().end, 400.0);
    }

    #[test]
    fn test_windows_tile_exactly() {
        // ceil(min(D, cap) / C) windows, strictly increasing, no gaps.
        for (duration, chunk, cap) in [
            (125.0, 60.0, Some(300.0)),
            (61.5, 10.0, Some(300.0)),
            (300.0, 60.0, Some(300.0)),
            (17.0, 5.0, None),
        ] {
            let stream = stream_of(duration, 16_000);
            let segmenter = Segmenter::new(&stream, &config(chunk, cap));
            let segs: Vec<_> = segmenter.segments().collect();

            let covered = cap.map_or(duration, |c| duration.min(c));
            let expected = (covered / chunk).ceil() as usize;
            assert_eq!(segs.len(), expected, "D={duration} C={chunk}");
            assert_eq!(segmenter.len(), expected);

            assert_eq!(segs[0].start, 0.0);
            for pair in segs.windows(2) {
                assert!(pair[0].start < pair[1].start);
                assert_eq!(pair[0].end, pair[1].start, "gap or overlap");
            }
            assert!((segs.last().unwrap().end - covered).abs() < 1e-9);
        }
    }

    #[test]
    fn test_restartable() {
        let stream = stream_of(90.0, 16_000);
        let segmenter = Segmenter::new(&stream, &config(60.0, None));
        let first: Vec<_> = segmenter.segments().map(|s| (s.start, s.end)).collect();
        let second: Vec<_> = segmenter.segments().map(|s| (s.start, s.end)).collect();
        assert_eq!(first, second);
    }

    #[test]
    fn test_size_hint_is_exact() {
        let stream = stream_of(125.0, 16_000);
        let segmenter = Segmenter::new(&stream, &config(60.0, Some(300.0)));
        let mut iter = segmenter.segments();
        assert_eq!(iter.len(), 3);
        iter.next();
        assert_eq!(iter.len(), 2);
    }

    #[test]
    fn test_degenerate_chunk_duration() {
        // chunk_duration of 0 still makes progress (1-sample windows).
        let stream = stream_of(0.001, 16_000);
        let segmenter = Segmenter::new(&stream, &config(0.0, None));
        assert_eq!(segmenter.segments().count(), 16);
    }
}
