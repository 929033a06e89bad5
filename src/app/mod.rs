// Views: each owns its session and talks to the outside only through ports.

pub mod candidate;
pub mod legislators;
pub mod routes;

pub use candidate::{CandidateProfile, CandidateView};
pub use legislators::{LegislatorList, LegislatorsView};
pub use routes::Route;
