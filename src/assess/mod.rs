pub mod grading;
pub mod parsers;
pub mod pipeline;
pub mod prompts;
pub mod types;

pub use grading::{assumed_improvement, grade_of, reduction_rate, RiskGrade};
pub use pipeline::PipelineSession;
pub use types::{Assessment, AssessmentResult, RetrievedCase, RiskScore};
