pub mod animator;
pub mod event;
pub mod session;
pub mod ticker;

pub use animator::Animator;
pub use event::{AnimatorEvent, AnimatorSnapshot, TickOutcome};
pub use session::{lock, Session, SharedAnimator};
pub use ticker::Ticker;
