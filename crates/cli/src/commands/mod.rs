pub mod extract;
pub mod fingerprint;
pub mod run;
pub mod show;

pub use extract::*;
pub use fingerprint::*;
pub use run::*;
pub use show::*;
