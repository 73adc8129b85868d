use std::path::{Path, PathBuf};

/// Numbered output file names: `<dir>/<prefix><NNNN>.<ext>`.
///
/// The counter only moves on [`advance`](Self::advance), so a caller that
/// fails to write a frame reuses the same name for the next one and the
/// written sequence stays contiguous.
#[derive(Debug, Clone)]
pub struct FrameSequence {
    dir: PathBuf,
    prefix: String,
    extension: String,
    counter: u32,
}

impl FrameSequence {
    pub fn new(dir: impl Into<PathBuf>, prefix: impl Into<String>, extension: impl Into<String>) -> Self {
        Self {
            dir: dir.into(),
            prefix: prefix.into(),
            extension: extension.into(),
            counter: 0,
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number the next written frame will carry.
    pub fn counter(&self) -> u32 {
        self.counter
    }

    /// File name for frame `n`. Numbers past 9999 widen instead of wrapping.
    pub fn file_name(&self, n: u32) -> String {
        format!("{}{:04}.{}", self.prefix, n, self.extension)
    }

    /// Path the next frame should be written to.
    pub fn next_path(&self) -> PathBuf {
        self.dir.join(self.file_name(self.counter))
    }

    /// Marks the current path as written.
    pub fn advance(&mut self) {
        self.counter = self.counter.saturating_add(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_at_zero() {
        let seq = FrameSequence::new("out", "image_", "ppm");
        assert_eq!(seq.next_path(), Path::new("out").join("image_0000.ppm"));
    }

    #[test]
    fn contiguous_suffixes() {
        let mut seq = FrameSequence::new("out", "image_", "ppm");
        let names: Vec<String> = (0..12)
            .map(|_| {
                let name = seq.file_name(seq.counter());
                seq.advance();
                name
            })
            .collect();
        for (i, name) in names.iter().enumerate() {
            assert_eq!(name, &format!("image_{i:04}.ppm"));
        }
    }

    #[test]
    fn failed_write_reuses_number() {
        let mut seq = FrameSequence::new("out", "f", "png");
        seq.advance();
        let before = seq.next_path();
        // no advance: frame was dropped
        assert_eq!(seq.next_path(), before);
        assert!(before.ends_with("f0001.png"));
    }

    #[test]
    fn wide_numbers_do_not_wrap() {
        let seq = FrameSequence::new("out", "image_", "ppm");
        assert_eq!(seq.file_name(12345), "image_12345.ppm");
    }
}
