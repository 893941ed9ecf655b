pub mod daily_movie;
pub mod game;
pub mod providers;
pub mod session;

pub use daily_movie::DailySelector;
pub use game::GuessScorer;
