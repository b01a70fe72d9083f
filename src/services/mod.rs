//! Advisory pipeline services.

mod assembler;
mod extractor;
mod pipeline;
mod strategist;

pub use assembler::assemble;
pub use extractor::{QueryExtractor, parse_expressions};
pub use pipeline::{Advisor, TurnState};
pub use strategist::StrategyStage;
