//! System prompts for specialized agents
//!
//! Each prompt defines the agent's role and what its output should cover.

mod code;
mod development;
mod orchestrator;
mod planner;
mod researcher;

pub use code::CODE_SPECIALIST_PROMPT;
pub use development::{ARCHITECT_PROMPT, DEVELOPER_PROMPT, REVIEWER_PROMPT, TESTER_PROMPT};
pub use orchestrator::ORCHESTRATOR_PROMPT;
pub use planner::PLANNER_PROMPT;
pub use researcher::RESEARCHER_PROMPT;
