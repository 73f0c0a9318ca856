mod agent;
pub use agent::*;

mod executor;
pub use executor::*;

mod open_ai_tools;
pub use open_ai_tools::*;

mod error;
pub use error::*;
