pub mod submit;

pub use submit::{SubmitService, Timeouts};
