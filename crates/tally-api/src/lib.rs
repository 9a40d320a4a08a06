pub mod error;
pub mod leaderboard;
pub mod points;
pub mod routes;
pub mod state;
pub mod users;

pub use routes::router;
pub use state::{AppState, AppStateInner};
