pub mod json;
pub mod seaorm;
