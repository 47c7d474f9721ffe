//! Level-to-press conversion

/// Turns a sampled "is held" level into one press per hold
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EdgeDetector {
    held: bool,
}

impl EdgeDetector {
    pub fn new() -> Self {
        Self::default()
    }

    /// True only on the sample where the level goes from released to held
    pub fn update(&mut self, held: bool) -> bool {
        let pressed = held && !self.held;
        self.held = held;
        pressed
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_one_press_per_hold() {
        let mut edge = EdgeDetector::new();
        let levels = [false, true, true, true, false, false, true, false];
        let presses: Vec<bool> = levels.iter().map(|&held| edge.update(held)).collect();
        assert_eq!(
            presses,
            vec![false, true, false, false, false, false, true, false]
        );
    }

    #[test]
    fn test_held_at_start_counts_once() {
        let mut edge = EdgeDetector::new();
        assert!(edge.update(true));
        assert!(!edge.update(true));
        assert!(edge.is_held());
    }
}
