pub mod lead;
pub mod overrides;
pub mod request;

pub use lead::{Lead, LeadDraft};
pub use overrides::ContentOverrides;
pub use request::*;
