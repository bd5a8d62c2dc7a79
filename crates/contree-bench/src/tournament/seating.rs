/// Deterministic seating: which configured agent sits at each seat index.
pub struct SeatRotation {
    rotate: bool,
}

impl SeatRotation {
    pub fn new(rotate: bool) -> Self {
        Self { rotate }
    }

    /// Agents move one seat along the table per game. Partnerships are kept
    /// because agents two apart in the list always face each other.
    pub fn for_game(&self, game_index: usize) -> [usize; 4] {
        let shift = if self.rotate { game_index % 4 } else { 0 };
        std::array::from_fn(|seat| (seat + 4 - shift) % 4)
    }
}
