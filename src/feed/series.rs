//! Bounded in-memory series of accepted data points.

use crate::models::DataPoint;
use std::collections::VecDeque;

/// Default series capacity.
pub const SERIES_CAP: usize = 500;

/// Ordered sequence of data points, insertion order = arrival order.
///
/// Once the capacity is exceeded the oldest points are evicted FIFO by
/// insertion, never by timestamp: a late-arriving historical point is still
/// evicted first if it arrived first.
#[derive(Debug, Clone)]
pub struct Series {
    points: VecDeque<DataPoint>,
    cap: usize,
}

impl Default for Series {
    fn default() -> Self {
        Self::new(SERIES_CAP)
    }
}

impl Series {
    pub fn new(cap: usize) -> Self {
        Self {
            points: VecDeque::with_capacity(cap.min(SERIES_CAP)),
            cap,
        }
    }

    /// Replace the whole series with `points` (bootstrap path).
    pub fn replace(&mut self, points: Vec<DataPoint>) {
        self.points.clear();
        self.extend(points);
    }

    /// Append a validated batch, evicting from the front past capacity.
    pub fn extend(&mut self, batch: Vec<DataPoint>) {
        for p in batch {
            self.points.push_back(p);
            if self.points.len() > self.cap {
                self.points.pop_front();
            }
        }
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn to_vec(&self) -> Vec<DataPoint> {
        self.points.iter().cloned().collect()
    }
}
