pub mod postgres;
pub mod store;

pub use postgres::create_pool;
pub use store::{DailyMovieStore, GameStore, PgDailyMovieStore, PgGameStore};

#[cfg(test)]
pub use store::{MockDailyMovieStore, MockGameStore};
