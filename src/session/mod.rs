pub mod draft;
pub mod edit_session;
pub mod mutation;

pub use draft::{DraftPatch, EditDraft};
pub use edit_session::{ScheduleEditSession, SessionError, SessionState};
pub use mutation::MutationRequest;
