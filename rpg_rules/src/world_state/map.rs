//! Tile map and coordinates.

use serde::{Deserialize, Serialize};
use std::str::FromStr;

use crate::error::{RulesError, RulesResult};

/// A map tile position. Displayed and parsed as `"row-col"`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Coord {
    pub row: i32,
    pub col: i32,
}

impl Coord {
    pub fn new(row: i32, col: i32) -> Self {
        Self { row, col }
    }

    /// Chebyshev distance: diagonal steps cost the same as straight ones.
    pub fn distance(&self, other: &Coord) -> u32 {
        let dr = (self.row - other.row).unsigned_abs();
        let dc = (self.col - other.col).unsigned_abs();
        dr.max(dc)
    }

    /// Location id string used by the presentation shell.
    pub fn location_id(&self) -> String {
        self.to_string()
    }
}

impl std::fmt::Display for Coord {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}-{}", self.row, self.col)
    }
}

impl FromStr for Coord {
    type Err = RulesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || RulesError::InvalidLocation(s.to_string());
        let (row, col) = s.trim().split_once('-').ok_or_else(invalid)?;
        let row: u32 = row.parse().map_err(|_| invalid())?;
        let col: u32 = col.parse().map_err(|_| invalid())?;
        Ok(Self {
            row: i32::try_from(row).map_err(|_| invalid())?,
            col: i32::try_from(col).map_err(|_| invalid())?,
        })
    }
}

/// Terrain types.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Terrain {
    Grass,
    Forest,
    Hills,
    Mountain,
    Water,
    Swamp,
    Desert,
    Snow,
    Town,
    Ruins,
}

/// Rectangular grid of terrain.
#[derive(Debug, Clone, Serialize)]
pub struct TileMap {
    rows: i32,
    cols: i32,
    tiles: Vec<Terrain>,
}

impl TileMap {
    /// Build from row-major rows. All rows must have the same length.
    pub fn from_rows(rows: Vec<Vec<Terrain>>) -> RulesResult<Self> {
        let row_count = rows.len();
        let col_count = rows.first().map(Vec::len).unwrap_or(0);
        if row_count == 0 || col_count == 0 {
            return Err(RulesError::invalid_template("map", "map must not be empty"));
        }
        if let Some(bad) = rows.iter().position(|r| r.len() != col_count) {
            return Err(RulesError::invalid_template(
                "map",
                format!("row {} has {} tiles, expected {}", bad, rows[bad].len(), col_count),
            ));
        }
        let too_large = || RulesError::invalid_template("map", "map too large");
        Ok(Self {
            rows: i32::try_from(row_count).map_err(|_| too_large())?,
            cols: i32::try_from(col_count).map_err(|_| too_large())?,
            tiles: rows.into_iter().flatten().collect(),
        })
    }

    /// Load from a JSON array of rows.
    pub fn from_json_str(input: &str) -> RulesResult<Self> {
        let rows: Vec<Vec<Terrain>> = serde_json::from_str(input)
            .map_err(|e| RulesError::invalid_template("map", e.to_string()))?;
        Self::from_rows(rows)
    }

    /// Number of rows.
    pub fn rows(&self) -> i32 {
        self.rows
    }

    /// Number of columns.
    pub fn cols(&self) -> i32 {
        self.cols
    }

    /// Whether `coord` lies on the map.
    pub fn contains(&self, coord: Coord) -> bool {
        (0..self.rows).contains(&coord.row) && (0..self.cols).contains(&coord.col)
    }

    /// Terrain at `coord`, or `None` off the map.
    pub fn terrain_at(&self, coord: Coord) -> Option<Terrain> {
        if !self.contains(coord) {
            return None;
        }
        let index = usize::try_from(coord.row * self.cols + coord.col).ok()?;
        self.tiles.get(index).copied()
    }

    /// Like [`TileMap::terrain_at`], but off-map is an error.
    pub fn require(&self, coord: Coord) -> RulesResult<Terrain> {
        self.terrain_at(coord).ok_or(RulesError::OutOfBounds {
            row: coord.row,
            col: coord.col,
        })
    }

    /// All tiles in row-major order.
    pub fn tiles(&self) -> impl Iterator<Item = (Coord, Terrain)> + '_ {
        let cols = self.cols;
        self.tiles.iter().enumerate().map(move |(i, terrain)| {
            let i = i as i32;
            (Coord::new(i / cols, i % cols), *terrain)
        })
    }

    /// Tiles of `terrain` whose distance from `origin` satisfies `accept`.
    pub fn tiles_matching<'a>(
        &'a self,
        terrain: Terrain,
        origin: Coord,
        accept: impl Fn(u32) -> bool + 'a,
    ) -> impl Iterator<Item = Coord> + 'a {
        self.tiles()
            .filter(move |(coord, t)| *t == terrain && accept(coord.distance(&origin)))
            .map(|(coord, _)| coord)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn small_map() -> TileMap {
        use Terrain::*;
        TileMap::from_rows(vec![
            vec![Town, Grass, Forest],
            vec![Grass, Water, Forest],
            vec![Hills, Grass, Grass],
        ])
        .unwrap()
    }

    #[test]
    fn test_coord_parse_and_display() {
        let coord: Coord = "12-7".parse().unwrap();
        assert_eq!(coord, Coord::new(12, 7));
        assert_eq!(coord.to_string(), "12-7");
        assert!("12".parse::<Coord>().is_err());
        assert!("a-b".parse::<Coord>().is_err());
        assert!("-1-2".parse::<Coord>().is_err());
    }

    #[test]
    fn test_distance_is_chebyshev() {
        let a = Coord::new(0, 0);
        assert_eq!(a.distance(&Coord::new(3, 1)), 3);
        assert_eq!(a.distance(&Coord::new(-2, 2)), 2);
        assert_eq!(a.distance(&a), 0);
    }

    #[test]
    fn test_terrain_lookup() {
        let map = small_map();
        assert_eq!(map.terrain_at(Coord::new(1, 1)), Some(Terrain::Water));
        assert_eq!(map.terrain_at(Coord::new(3, 0)), None);
        assert!(map.require(Coord::new(-1, 0)).is_err());
    }

    #[test]
    fn test_tiles_matching() {
        let map = small_map();
        let forests: Vec<_> = map
            .tiles_matching(Terrain::Forest, Coord::new(0, 0), |d| d >= 2)
            .collect();
        assert_eq!(forests, vec![Coord::new(0, 2), Coord::new(1, 2)]);

        let near_grass = map
            .tiles_matching(Terrain::Grass, Coord::new(0, 0), |d| d <= 1)
            .count();
        assert_eq!(near_grass, 2);
    }

    #[test]
    fn test_ragged_rows_rejected() {
        let rows = vec![vec![Terrain::Grass, Terrain::Grass], vec![Terrain::Grass]];
        assert!(TileMap::from_rows(rows).is_err());
        assert!(TileMap::from_rows(vec![]).is_err());
    }

    #[test]
    fn test_from_json() {
        let map = TileMap::from_json_str(r#"[["grass", "forest"], ["ruins", "snow"]]"#).unwrap();
        assert_eq!(map.terrain_at(Coord::new(1, 0)), Some(Terrain::Ruins));
    }
}
