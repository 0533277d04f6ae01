use std::path::PathBuf;

use thiserror::Error;

use crate::snake::{FileHighScoreStore, Grid, SnakeGame, ThreadRngSampler};

#[derive(Error, Debug, PartialEq, Eq)]
pub enum ConfigurationError {
    #[error("Board {width}x{height} is not a multiple of the grid unit {unit}")]
    Misaligned { width: u32, height: u32, unit: u32 },
    #[error("Frame rate must be positive")]
    FrameRate,
}

#[derive(Debug, Clone)]
pub struct Configuration {
    pub width: u32,
    pub height: u32,
    pub grid_unit: u32,
    pub high_score_path: PathBuf,
    pub alert_threshold: i32,
    pub frame_rate: f64,
    pub shake_duration_ms: u64,
    pub shake_strength: i32,
    pub music_volume: f32,
    pub eat_volume: f32,
    pub alert_volume: f32,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            width: 800,
            height: 600,
            grid_unit: 25,
            high_score_path: PathBuf::from("highest_score.txt"),
            alert_threshold: 4,
            frame_rate: 60.,
            shake_duration_ms: 150,
            shake_strength: 4,
            music_volume: 0.2,
            eat_volume: 0.8,
            alert_volume: 0.3,
        }
    }
}

impl Configuration {
    pub fn grid(&self) -> Result<Grid, ConfigurationError> {
        Grid::new(self.width, self.height, self.grid_unit)
    }

    pub fn validate(&self) -> Result<(), ConfigurationError> {
        self.grid()?;
        if !(self.frame_rate > 0.) {
            return Err(ConfigurationError::FrameRate);
        }
        Ok(())
    }

    /// A game backed by the high score file and fastrand.
    pub fn build_game(&self) -> Result<SnakeGame, ConfigurationError> {
        self.validate()?;
        let game = SnakeGame::new(
            self.grid()?,
            Box::new(FileHighScoreStore::new(&self.high_score_path)),
            Box::new(ThreadRngSampler),
        )
        .with_alert_threshold(self.alert_threshold);
        Ok(game)
    }
}

#[cfg(test)]
mod tests {
    use super::{Configuration, ConfigurationError};

    #[test]
    fn test_default_is_valid() {
        let configuration = Configuration::default();
        assert_eq!(configuration.validate(), Ok(()));
        assert_eq!(configuration.grid().unwrap().columns(), 32);
    }

    #[test]
    fn test_misaligned_board_is_rejected() {
        let configuration = Configuration {
            width: 790,
            ..Default::default()
        };
        assert_eq!(
            configuration.validate(),
            Err(ConfigurationError::Misaligned {
                width: 790,
                height: 600,
                unit: 25
            })
        );
    }

    #[test]
    fn test_frame_rate_must_be_positive() {
        let configuration = Configuration {
            frame_rate: 0.,
            ..Default::default()
        };
        assert_eq!(configuration.validate(), Err(ConfigurationError::FrameRate));
    }
}
