//! The capture pipeline.
//!
//! Three pure pieces do the real work: [`rank`] picks destination candidates,
//! [`resolve`] decides where the note lands and whether it already exists, and
//! [`compose`] assembles the note body. [`CaptureSession`] wires them to the
//! collaborators in [`collaborators`].

pub mod collaborators;
mod compose;
mod rank;
mod resolve;
mod session;
mod uri;

pub use collaborators::*;
pub use compose::compose;
pub use rank::{rank, ranked_matches, RankedMatch, MAX_CANDIDATES, MIN_QUERY_LEN};
pub use resolve::{resolve, Destination};
pub use session::*;
pub use uri::{fallback_target, primary_target, WriteRequest};
