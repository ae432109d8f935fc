//! World generation parameters
//!
//! Loaded from JSON (camelCase keys); any key left out takes its default.

use std::path::Path;

use glam::Vec2;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::consts::{BLOCK_SIZE, KID_SIZE, MAX_CHAOS, SHELF_HEIGHT, SHELF_WIDTH, TARGET_TIME};
use crate::sim::block::BlockColor;
use crate::sim::collision::Aabb;
use crate::sim::kid::DROP_OFFSET;

/// Clear floor a shelf needs above and below it for dropped blocks
pub const DROP_CLEARANCE: f32 = DROP_OFFSET + BLOCK_SIZE * 0.5;

/// Errors that can occur when loading configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file: {0}")]
    Io(#[from] std::io::Error),

    #[error("failed to parse config JSON: {0}")]
    Parse(#[from] serde_json::Error),

    #[error("invalid config: {0}")]
    Invalid(String),
}

/// Layout and tuning for a session
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct WorldConfig {
    pub world_width: f32,
    pub world_height: f32,
    pub shelf_rows: u32,
    pub shelf_cols: u32,
    /// Centre-to-centre distance between neighbouring shelves
    pub shelf_spacing: Vec2,
    pub shelf_capacity: usize,
    pub color_palette: Vec<BlockColor>,
    pub spawn_points: Vec<Vec2>,
    /// Blocks pre-placed on each shelf
    pub initial_fill: usize,
    /// Seconds to survive
    pub target_time: f32,
    pub max_chaos: f32,
}

impl Default for WorldConfig {
    fn default() -> Self {
        Self {
            world_width: 1600.0,
            world_height: 1200.0,
            shelf_rows: 3,
            shelf_cols: 4,
            shelf_spacing: Vec2::new(320.0, 280.0),
            shelf_capacity: 6,
            color_palette: vec![
                BlockColor::Red,
                BlockColor::Blue,
                BlockColor::Green,
                BlockColor::Yellow,
            ],
            spawn_points: vec![
                Vec2::new(60.0, 60.0),
                Vec2::new(800.0, 60.0),
                Vec2::new(1540.0, 60.0),
                Vec2::new(60.0, 1140.0),
                Vec2::new(1540.0, 1140.0),
            ],
            initial_fill: 6,
            target_time: TARGET_TIME,
            max_chaos: MAX_CHAOS,
        }
    }
}

impl WorldConfig {
    pub fn from_json_str(json: &str) -> Result<Self, ConfigError> {
        let config: WorldConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let config = Self::from_json_str(&json)?;
        log::info!("Loaded world config from {}", path.display());
        Ok(config)
    }

    pub fn world_size(&self) -> Vec2 {
        Vec2::new(self.world_width, self.world_height)
    }

    pub fn shelf_count(&self) -> usize {
        (self.shelf_rows * self.shelf_cols) as usize
    }

    /// Top-left shelf centre; the grid is centred in the world
    pub fn grid_origin(&self) -> Vec2 {
        let span = Vec2::new(
            (self.shelf_cols.saturating_sub(1)) as f32 * self.shelf_spacing.x,
            (self.shelf_rows.saturating_sub(1)) as f32 * self.shelf_spacing.y,
        );
        self.world_size() * 0.5 - span * 0.5
    }

    /// Centre of every shelf, row by row
    pub fn shelf_positions(&self) -> impl Iterator<Item = Vec2> + '_ {
        let origin = self.grid_origin();
        (0..self.shelf_rows).flat_map(move |row| {
            (0..self.shelf_cols).map(move |col| {
                origin + Vec2::new(col as f32, row as f32) * self.shelf_spacing
            })
        })
    }

    /// Where kids may appear: the configured spawn points, then the world
    /// corners. Every candidate is pulled inside the world.
    pub fn spawn_candidates(&self) -> impl Iterator<Item = Vec2> + '_ {
        let size = Vec2::splat(KID_SIZE);
        let world = Aabb::new(Vec2::ZERO, self.world_size());
        let corners = [
            Vec2::ZERO,
            Vec2::new(self.world_width, 0.0),
            Vec2::new(0.0, self.world_height),
            self.world_size(),
        ];
        self.spawn_points
            .iter()
            .copied()
            .chain(corners)
            .map(move |p| world.clamp_center(p, size))
    }

    /// First spawn candidate whose kid box is clear of `shelves`
    pub fn clear_spawn_point(&self, shelves: &[Aabb]) -> Option<Vec2> {
        self.spawn_candidates().find(|&p| {
            let b = Aabb::from_center(p, Vec2::splat(KID_SIZE));
            !shelves.iter().any(|s| s.overlaps(&b))
        })
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        let invalid = |msg: String| Err(ConfigError::Invalid(msg));

        if !(self.world_width > 0.0 && self.world_height > 0.0) {
            return invalid(format!(
                "world size must be positive, got {}x{}",
                self.world_width, self.world_height
            ));
        }
        if self.shelf_rows == 0 || self.shelf_cols == 0 {
            return invalid("shelf grid needs at least one row and one column".into());
        }
        if self.shelf_capacity == 0 {
            return invalid("shelf capacity must be at least 1".into());
        }
        if self.initial_fill > self.shelf_capacity {
            return invalid(format!(
                "initial fill {} exceeds shelf capacity {}",
                self.initial_fill, self.shelf_capacity
            ));
        }
        if self.color_palette.is_empty() {
            return invalid("color palette is empty".into());
        }
        if self.spawn_points.is_empty() {
            return invalid("no spawn points".into());
        }
        if (self.shelf_cols > 1 && self.shelf_spacing.x < SHELF_WIDTH + KID_SIZE)
            || (self.shelf_rows > 1
                && self.shelf_spacing.y < SHELF_HEIGHT + (2.0 * DROP_CLEARANCE).max(KID_SIZE))
        {
            return invalid(format!(
                "shelf spacing {:?} leaves no aisle between shelves",
                self.shelf_spacing
            ));
        }

        let origin = self.grid_origin();
        let far = origin
            + Vec2::new(
                (self.shelf_cols - 1) as f32 * self.shelf_spacing.x,
                (self.shelf_rows - 1) as f32 * self.shelf_spacing.y,
            );
        let half = Vec2::new(SHELF_WIDTH, SHELF_HEIGHT) * 0.5;
        if origin.x - half.x < 0.0
            || origin.y - half.y - DROP_CLEARANCE < 0.0
            || far.x + half.x > self.world_width
            || far.y + half.y + DROP_CLEARANCE > self.world_height
        {
            return invalid("shelf grid does not fit inside the world".into());
        }

        if let Some(p) = self
            .spawn_points
            .iter()
            .find(|p| p.x < 0.0 || p.y < 0.0 || p.x > self.world_width || p.y > self.world_height)
        {
            return invalid(format!("spawn point {p:?} is outside the world"));
        }
        let shelves: Vec<Aabb> = self
            .shelf_positions()
            .map(|p| Aabb::from_center(p, Vec2::new(SHELF_WIDTH, SHELF_HEIGHT)))
            .collect();
        if self.clear_spawn_point(&shelves).is_none() {
            return invalid("no spawn point or world corner is clear of the shelves".into());
        }
        if !(self.target_time > 0.0 && self.max_chaos > 0.0) {
            return invalid("target time and max chaos must be positive".into());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_is_valid() {
        assert!(WorldConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let config = WorldConfig::from_json_str(
            r#"{ "shelfRows": 2, "shelfCapacity": 8, "initialFill": 4, "colorPalette": ["red", "purple"] }"#,
        )
        .unwrap();
        assert_eq!(config.shelf_rows, 2);
        assert_eq!(config.shelf_capacity, 8);
        assert_eq!(config.color_palette, vec![BlockColor::Red, BlockColor::Purple]);
        assert_eq!(config.world_width, 1600.0);
    }

    #[test]
    fn test_spawn_points_parse_as_pairs() {
        let config = WorldConfig::from_json_str(r#"{ "spawnPoints": [[10, 20], [30, 40]] }"#).unwrap();
        assert_eq!(config.spawn_points, vec![Vec2::new(10.0, 20.0), Vec2::new(30.0, 40.0)]);
    }

    #[test]
    fn test_rejects_bad_configs() {
        let cases = [
            r#"{ "shelfCapacity": 0 }"#,
            r#"{ "colorPalette": [] }"#,
            r#"{ "spawnPoints": [] }"#,
            r#"{ "shelfSpacing": [50, 280] }"#,
            r#"{ "worldWidth": 300 }"#,
            r#"{ "initialFill": 9 }"#,
            r#"{ "spawnPoints": [[-5, 10]] }"#,
        ];
        for json in cases {
            assert!(
                matches!(WorldConfig::from_json_str(json), Err(ConfigError::Invalid(_))),
                "{json} should be rejected"
            );
        }
    }

    #[test]
    fn test_rows_leave_room_for_dropped_blocks() {
        // A kid fits through a 28 unit aisle, but a block dropped 24 units
        // off one shelf would land on the next
        let tight = r#"{ "shelfSpacing": [320, 68] }"#;
        assert!(matches!(WorldConfig::from_json_str(tight), Err(ConfigError::Invalid(_))));

        let roomy = r#"{ "shelfSpacing": [320, 104] }"#;
        let config = WorldConfig::from_json_str(roomy).unwrap();
        let rows: Vec<Vec2> = config.shelf_positions().step_by(4).collect();
        let aisle = rows[1].y - rows[0].y - SHELF_HEIGHT;
        assert!(aisle >= 2.0 * DROP_CLEARANCE);

        // Grid flush against the top of the world leaves no floor above it
        let flush = r#"{ "worldHeight": 100, "shelfRows": 1, "spawnPoints": [[10, 10]] }"#;
        assert!(matches!(WorldConfig::from_json_str(flush), Err(ConfigError::Invalid(_))));
    }

    #[test]
    fn test_clear_spawn_point_falls_back_to_corners() {
        let config = WorldConfig {
            spawn_points: vec![Vec2::new(500.0, 500.0)],
            ..Default::default()
        };
        let blocker = Aabb::from_center(Vec2::new(500.0, 500.0), Vec2::splat(100.0));
        assert_eq!(config.clear_spawn_point(&[]), Some(Vec2::new(500.0, 500.0)));
        assert_eq!(config.clear_spawn_point(&[blocker]), Some(Vec2::splat(KID_SIZE * 0.5)));

        let everything = Aabb::new(Vec2::ZERO, config.world_size());
        assert_eq!(config.clear_spawn_point(&[everything]), None);
    }

    #[test]
    fn test_parse_error() {
        assert!(matches!(
            WorldConfig::from_json_str("{ not json"),
            Err(ConfigError::Parse(_))
        ));
        assert!(matches!(
            WorldConfig::from_json_str(r#"{ "colorPalette": ["teal"] }"#),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn test_load_missing_file() {
        assert!(matches!(
            WorldConfig::load("/definitely/not/here.json"),
            Err(ConfigError::Io(_))
        ));
    }
}
