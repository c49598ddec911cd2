pub mod session;

pub use session::{SessionId, SessionManager};
