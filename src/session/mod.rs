pub mod countdown;
pub mod manager;
pub mod progress;
pub mod state;

pub use countdown::{Countdown, CountdownHandle, CountdownState};
pub use manager::{QuizSession, SessionSnapshot};
pub use progress::{storage_key, ProgressStore};
pub use state::{AttemptState, AttemptStatus, Navigation};
