use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Role {
    Farmer,
    Guard,
    Miner,
}

impl Role {
    pub const ALL: [Role; 3] = [Role::Farmer, Role::Guard, Role::Miner];

    pub fn as_str(self) -> &'static str {
        match self {
            Role::Farmer => "farmer",
            Role::Guard => "guard",
            Role::Miner => "miner",
        }
    }

    /// The role a directional command selects from `self`.
    ///
    /// The three roles sit on a triangle: left and up step one way round it,
    /// right and down step the other way.
    pub fn neighbor(self, direction: Direction) -> Role {
        let forward = matches!(direction, Direction::Left | Direction::Up);
        match (self, forward) {
            (Role::Farmer, true) => Role::Guard,
            (Role::Guard, true) => Role::Miner,
            (Role::Miner, true) => Role::Farmer,
            (Role::Farmer, false) => Role::Miner,
            (Role::Guard, false) => Role::Farmer,
            (Role::Miner, false) => Role::Guard,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    Left,
    Right,
    Up,
    Down,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn horizontal_neighbors_match_layout() {
        assert_eq!(Role::Farmer.neighbor(Direction::Right), Role::Miner);
        assert_eq!(Role::Farmer.neighbor(Direction::Left), Role::Guard);
        assert_eq!(Role::Guard.neighbor(Direction::Right), Role::Farmer);
        assert_eq!(Role::Guard.neighbor(Direction::Left), Role::Miner);
        assert_eq!(Role::Miner.neighbor(Direction::Right), Role::Guard);
        assert_eq!(Role::Miner.neighbor(Direction::Left), Role::Farmer);
    }

    #[test]
    fn vertical_neighbors_match_layout() {
        assert_eq!(Role::Farmer.neighbor(Direction::Up), Role::Guard);
        assert_eq!(Role::Farmer.neighbor(Direction::Down), Role::Miner);
        assert_eq!(Role::Guard.neighbor(Direction::Up), Role::Miner);
        assert_eq!(Role::Guard.neighbor(Direction::Down), Role::Farmer);
        assert_eq!(Role::Miner.neighbor(Direction::Up), Role::Farmer);
        assert_eq!(Role::Miner.neighbor(Direction::Down), Role::Guard);
    }

    #[test]
    fn every_direction_changes_role() {
        for role in Role::ALL {
            for direction in [
                Direction::Left,
                Direction::Right,
                Direction::Up,
                Direction::Down,
            ] {
                assert_ne!(role.neighbor(direction), role);
            }
        }
    }
}
