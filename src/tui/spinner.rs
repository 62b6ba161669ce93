/// Frame cursor for the in-progress animation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Spinner {
    frames: &'static [&'static str],
    index: usize,
}

impl Spinner {
    pub fn new(frames: &'static [&'static str]) -> Self {
        Self { frames, index: 0 }
    }

    /// Advance to the next frame (wrapping)
    pub fn tick(&mut self) {
        if !self.frames.is_empty() {
            self.index = (self.index + 1) % self.frames.len();
        }
    }

    pub fn frame(&self) -> &'static str {
        self.frames.get(self.index).copied().unwrap_or("")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spinner_tick_wraps_around() {
        let mut spinner = Spinner::new(&["a", "b"]);
        assert_eq!(spinner.frame(), "a");

        spinner.tick();
        assert_eq!(spinner.frame(), "b");

        spinner.tick();
        assert_eq!(spinner.frame(), "a");
    }

    #[test]
    fn spinner_without_frames_renders_nothing() {
        let mut spinner = Spinner::new(&[]);
        spinner.tick();
        assert_eq!(spinner.frame(), "");
    }
}
