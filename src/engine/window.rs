//! Bounded history of recent observations.

use super::observation::Observation;
use std::collections::VecDeque;

/// Default number of observations the smoother votes over.
pub const DEFAULT_WINDOW_CAPACITY: usize = 20;

/// Largest window a session may be configured with.
pub const MAX_WINDOW_CAPACITY: usize = 1024;

/// Fixed-capacity ring of the most recent observations for one session.
///
/// Pushing at capacity evicts the oldest entry.
#[derive(Debug, Clone)]
pub struct PredictionWindow {
    entries: VecDeque<Observation>,
    capacity: usize,
}

impl PredictionWindow {
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.clamp(1, MAX_WINDOW_CAPACITY);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
        }
    }

    pub fn push(&mut self, observation: Observation) {
        if self.entries.len() == self.capacity {
            self.entries.pop_front();
        }
        self.entries.push_back(observation);
    }

    /// Copy of the current contents, oldest first.
    pub fn snapshot(&self) -> Vec<Observation> {
        self.entries.iter().cloned().collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

impl Default for PredictionWindow {
    fn default() -> Self {
        Self::new(DEFAULT_WINDOW_CAPACITY)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Instant;

    fn obs(i: usize) -> Observation {
        Observation {
            label: format!("S{}", i),
            confidence: 0.9,
            timestamp: Instant::now(),
        }
    }

    #[test]
    fn test_length_is_bounded() {
        for pushes in [0usize, 1, 5, 20, 21, 57] {
            let mut window = PredictionWindow::new(20);
            for i in 1..=pushes {
                window.push(obs(i));
            }
            assert_eq!(window.len(), pushes.min(20));
        }
    }

    #[test]
    fn test_evicts_oldest() {
        let mut window = PredictionWindow::new(20);
        let pushes = 27;
        for i in 1..=pushes {
            window.push(obs(i));
        }

        let snapshot = window.snapshot();
        // oldest retained entry is the (N - capacity + 1)-th push
        assert_eq!(snapshot[0].label, format!("S{}", pushes - 20 + 1));
        assert_eq!(snapshot[19].label, format!("S{}", pushes));
    }

    #[test]
    fn test_snapshot_is_a_copy() {
        let mut window = PredictionWindow::new(3);
        window.push(obs(1));
        let snapshot = window.snapshot();
        window.push(obs(2));

        assert_eq!(snapshot.len(), 1);
        assert_eq!(window.len(), 2);
    }

    #[test]
    fn test_capacity_is_clamped() {
        assert_eq!(PredictionWindow::new(0).capacity(), 1);
        let window = PredictionWindow::new(usize::MAX / 2);
        assert_eq!(window.capacity(), MAX_WINDOW_CAPACITY);
    }

    #[test]
    fn test_clear() {
        let mut window = PredictionWindow::default();
        window.push(obs(1));
        window.clear();
        assert!(window.is_empty());
        assert_eq!(window.capacity(), DEFAULT_WINDOW_CAPACITY);
    }
}
