use crate::error::ContreeError;
use crate::model::player::PlayerPosition;
use core::fmt;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[repr(u8)]
pub enum TeamId {
    NorthSouth = 0,
    EastWest = 1,
}

impl TeamId {
    pub const ALL: [TeamId; 2] = [TeamId::NorthSouth, TeamId::EastWest];

    pub const fn index(self) -> usize {
        self as usize
    }

    pub const fn opponent(self) -> TeamId {
        match self {
            TeamId::NorthSouth => TeamId::EastWest,
            TeamId::EastWest => TeamId::NorthSouth,
        }
    }

    pub const fn members(self) -> [PlayerPosition; 2] {
        match self {
            TeamId::NorthSouth => [PlayerPosition::North, PlayerPosition::South],
            TeamId::EastWest => [PlayerPosition::East, PlayerPosition::West],
        }
    }

    pub const fn name(self) -> &'static str {
        match self {
            TeamId::NorthSouth => "North-South",
            TeamId::EastWest => "East-West",
        }
    }
}

impl fmt::Display for TeamId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Team {
    id: TeamId,
    members: [PlayerPosition; 2],
    total_score: u32,
}

impl Team {
    /// Forms a partnership from exactly two partnered seats.
    pub fn new(members: &[PlayerPosition]) -> Result<Self, ContreeError> {
        let &[first, second] = members else {
            return Err(ContreeError::player_count(2, members.len(), "creating team"));
        };
        if first.partner() != second {
            return Err(ContreeError::InvalidPosition {
                position: second,
                context: "creating team",
            });
        }
        Ok(Self {
            id: first.team(),
            members: [first, second],
            total_score: 0,
        })
    }

    pub fn for_id(id: TeamId) -> Self {
        Self {
            id,
            members: id.members(),
            total_score: 0,
        }
    }

    pub fn id(&self) -> TeamId {
        self.id
    }

    pub fn name(&self) -> &'static str {
        self.id.name()
    }

    pub fn members(&self) -> [PlayerPosition; 2] {
        self.members
    }

    pub fn total_score(&self) -> u32 {
        self.total_score
    }

    pub fn add_points(&mut self, points: u32) {
        self.total_score += points;
    }

    pub fn contains(&self, position: PlayerPosition) -> bool {
        self.members.contains(&position)
    }

    pub fn partner_of(&self, position: PlayerPosition) -> Option<PlayerPosition> {
        match self.members {
            [a, b] if a == position => Some(b),
            [a, b] if b == position => Some(a),
            _ => None,
        }
    }
}

impl fmt::Display for Team {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {} & {} ({} pts)",
            self.name(),
            self.members[0],
            self.members[1],
            self.total_score
        )
    }
}

#[cfg(test)]
mod tests {
    use super::{Team, TeamId};
    use crate::error::ContreeError;
    use crate::model::player::PlayerPosition;

    #[test]
    fn team_requires_exactly_two_players() {
        let err = Team::new(&[PlayerPosition::North]).unwrap_err();
        assert!(matches!(
            err,
            ContreeError::InvalidPlayerCount {
                expected: 2,
                actual: 1,
                ..
            }
        ));
        let err = Team::new(&[
            PlayerPosition::North,
            PlayerPosition::South,
            PlayerPosition::East,
        ])
        .unwrap_err();
        assert!(matches!(err, ContreeError::InvalidPlayerCount { actual: 3, .. }));
    }

    #[test]
    fn team_members_must_be_partners() {
        let err = Team::new(&[PlayerPosition::North, PlayerPosition::East]).unwrap_err();
        assert!(matches!(err, ContreeError::InvalidPosition { .. }));
    }

    #[test]
    fn partner_lookup() {
        let team = Team::new(&[PlayerPosition::East, PlayerPosition::West]).unwrap();
        assert_eq!(team.id(), TeamId::EastWest);
        assert_eq!(team.partner_of(PlayerPosition::West), Some(PlayerPosition::East));
        assert_eq!(team.partner_of(PlayerPosition::North), None);
        assert!(!team.contains(PlayerPosition::South));
    }

    #[test]
    fn score_accumulates() {
        let mut team = Team::for_id(TeamId::NorthSouth);
        team.add_points(162);
        team.add_points(80);
        assert_eq!(team.total_score(), 242);
        assert_eq!(team.to_string(), "North-South: North & South (242 pts)");
    }
}
