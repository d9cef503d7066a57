pub mod check;
pub mod config;
pub mod participants;
pub mod run;
pub mod util;

pub use check::*;
pub use config::*;
pub use participants::*;
pub use run::*;
pub use util::*;
