pub mod cli;
pub mod error;
pub mod infer;
pub mod media;
pub mod normalize;
pub mod rules;
pub mod sidecar;

pub use cli::Cli;
pub use error::{FixerError, Result};
pub use normalize::{NormalizeOptions, NormalizeReport, normalize};
pub use rules::{Rewrite, RewriteRule, RuleSet};
