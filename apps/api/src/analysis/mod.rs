// CV benchmarking, learning paths and interview questions.
// All oracle calls go through llm_client::CompletionClient — no direct Gemini calls here.

pub mod handlers;
pub mod prompts;
pub mod skill_matcher;
pub mod validation;
pub mod view;
pub mod workflow;
