pub mod analyst;
pub mod compiler;
pub mod converter;
pub mod cov;
pub mod doubter;
pub mod role;
pub mod verifier;

pub use analyst::Analyst;
pub use compiler::AnalysisCompiler;
pub use converter::PhraseConverter;
pub use cov::ChainOfVerification;
pub use doubter::Doubter;
pub use role::StructuredRole;
pub use verifier::ConsistencyVerifier;
