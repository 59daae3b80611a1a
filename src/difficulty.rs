use serde::Deserialize;

use crate::error::ConfigError;

/// One rung of the difficulty ladder: players rated `rating` or more get a
/// search of `depth` plies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
pub struct EloDepthEntry {
    pub rating: u32,
    pub depth: u32,
}

/// Maps a playing strength to a search depth. Ratings and depths both
/// strictly increase from one entry to the next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EloDepthMap {
    entries: Vec<EloDepthEntry>,
}

impl Default for EloDepthMap {
    fn default() -> Self {
        Self {
            entries: [(100, 1), (400, 2), (800, 3), (1200, 4), (1600, 5)]
                .into_iter()
                .map(|(rating, depth)| EloDepthEntry { rating, depth })
                .collect(),
        }
    }
}

impl EloDepthMap {
    pub fn new(entries: Vec<EloDepthEntry>) -> Result<Self, ConfigError> {
        if entries.is_empty() {
            return Err(ConfigError::EmptyEloMap);
        }
        for pair in entries.windows(2) {
            let (prev, next) = (pair[0], pair[1]);
            if next.rating <= prev.rating || next.depth <= prev.depth {
                return Err(ConfigError::UnorderedEloMap {
                    prev_rating: prev.rating,
                    prev_depth: prev.depth,
                    rating: next.rating,
                    depth: next.depth,
                });
            }
        }
        if entries[0].depth == 0 {
            return Err(ConfigError::InvalidDepth(0));
        }
        Ok(Self { entries })
    }

    pub fn entries(&self) -> &[EloDepthEntry] {
        &self.entries
    }

    /// Depth of the highest threshold not above `rating`. Ratings below every
    /// threshold get the weakest depth.
    pub fn depth_for_rating(&self, rating: u32) -> u32 {
        let weakest = self.entries.first().map_or(1, |entry| entry.depth);
        self.entries
            .iter()
            .take_while(|entry| entry.rating <= rating)
            .last()
            .map_or(weakest, |entry| entry.depth)
    }
}
