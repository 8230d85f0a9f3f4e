pub mod feedback;
pub mod letters;
pub mod session;
pub mod validator;

pub use feedback::{FeedbackExpiry, FeedbackPresenter};
pub use session::{GameSession, LookupTicket, SubmitOutcome};
pub use validator::{Rejection, WordValidator};
