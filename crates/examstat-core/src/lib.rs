//! examstat-core: psychometric exam analysis and integrity similarity engine.
//!
//! This crate turns graded student responses (possibly spread over several
//! randomized exam variants) into item-level and exam-level statistics, and
//! computes the pairwise similarity matrices used to spot collusion or
//! badly randomized variants. The analysis functions are pure: they perform
//! no I/O and never mutate their inputs.

pub mod config;
pub mod dataset;
pub mod error;
pub mod exam;
pub mod item;
pub mod model;
pub mod report;
pub mod results;
pub mod similarity;
pub mod statistics;
pub mod variant;

pub use config::AnalysisConfig;
pub use error::AnalysisError;
pub use exam::analyze_exam;
pub use results::AnalysisResult;
pub use similarity::{
    calculate_student_similarity_matrix, calculate_variant_similarity_matrix, SimilarityMatrix,
};
pub use variant::analyze_by_variant;
