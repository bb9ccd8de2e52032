pub mod anonymizer;
pub mod config;
pub mod confirm;
pub mod detection;
pub mod error;
pub mod records;
pub mod redaction;


pub use anonymizer::{Anonymizer, Disposition, RunSummary};
pub use config::{AnonymizeConfig, Config, TableTarget};
pub use confirm::{Confirmer, PromptConfirmer};
pub use detection::{EmailMatcher, EMAIL_PATTERN};
pub use error::{AnonymizeError, Result};
pub use records::{open_database, select_candidates, update_text, CandidateQuery, Record};
pub use redaction::Redactor;
