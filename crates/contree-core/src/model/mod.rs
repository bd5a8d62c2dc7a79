pub mod bid;
pub mod card;
pub mod contract;
pub mod deck;
pub mod hand;
pub mod player;
pub mod rank;
pub mod round;
pub mod score;
pub mod strain;
pub mod suit;
pub mod team;
pub mod trick;
