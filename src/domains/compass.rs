use serde::{Deserialize, Serialize};
use std::fmt;

/// The eight compass sectors used by the directional assessments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Direction {
    #[serde(alias = "n")]
    North,
    #[serde(alias = "ne")]
    Northeast,
    #[serde(alias = "e")]
    East,
    #[serde(alias = "se")]
    Southeast,
    #[serde(alias = "s")]
    South,
    #[serde(alias = "sw")]
    Southwest,
    #[serde(alias = "w")]
    West,
    #[serde(alias = "nw")]
    Northwest,
}

impl Direction {
    pub const ALL: [Direction; 8] = [
        Direction::North,
        Direction::Northeast,
        Direction::East,
        Direction::Southeast,
        Direction::South,
        Direction::Southwest,
        Direction::West,
        Direction::Northwest,
    ];
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Direction::North => "North",
            Direction::Northeast => "Northeast",
            Direction::East => "East",
            Direction::Southeast => "Southeast",
            Direction::South => "South",
            Direction::Southwest => "Southwest",
            Direction::West => "West",
            Direction::Northwest => "Northwest",
        };
        f.write_str(label)
    }
}
