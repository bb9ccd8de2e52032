//! Anonymization run: select, rewrite, stage, confirm, commit or roll back

use crate::config::{AnonymizeConfig, TableTarget};
use crate::confirm::Confirmer;
use crate::error::Result;
use crate::records::{select_candidates, update_text, CandidateQuery};
use crate::redaction::Redactor;
use chrono::{Local, NaiveDate};
use rusqlite::Connection;
use std::fmt;
use tracing::{debug, info, warn};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Disposition {
    Committed,
    Cancelled,
    NoneFound,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RunSummary {
    /// Candidate records the rewrite ran over, changed or not.
    pub considered: usize,
    /// Records whose text actually changed and got an update staged.
    pub staged: usize,
    pub disposition: Disposition,
}

impl RunSummary {
    fn none_found() -> Self {
        Self {
            considered: 0,
            staged: 0,
            disposition: Disposition::NoneFound,
        }
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.disposition {
            Disposition::Committed => write!(f, "{} records anonymized.", self.considered),
            Disposition::Cancelled => write!(f, "Anonymization cancelled."),
            Disposition::NoneFound => write!(f, "No records to anonymize."),
        }
    }
}

#[derive(Debug)]
pub struct Anonymizer {
    target: TableTarget,
    settings: AnonymizeConfig,
    redactor: Redactor,
}

impl Anonymizer {
    /// Validates the threshold and identifiers up front; a configuration
    /// error here means no query is ever issued.
    pub fn new(target: TableTarget, settings: AnonymizeConfig) -> Result<Self> {
        settings.validate()?;
        target.validate()?;
        let redactor = Redactor::new(settings.exclude.clone())?;

        Ok(Self {
            target,
            settings,
            redactor,
        })
    }

    pub fn redactor(&self) -> &Redactor {
        &self.redactor
    }

    pub fn run(&self, conn: &mut Connection, confirmer: &mut dyn Confirmer) -> Result<RunSummary> {
        self.run_at(conn, confirmer, Local::now().date_naive())
    }

    /// Same as [`Anonymizer::run`] with the age threshold measured from `today`.
    ///
    /// The transaction is opened only when there are candidates. Any early
    /// return after that drops it, which rolls back.
    pub fn run_at(
        &self,
        conn: &mut Connection,
        confirmer: &mut dyn Confirmer,
        today: NaiveDate,
    ) -> Result<RunSummary> {
        info!(
            "Anonymizing {}.{} (age >= {} days, excluding '{}')",
            self.target.table, self.target.column, self.settings.age_days, self.settings.exclude
        );

        let query = CandidateQuery {
            target: &self.target,
            age_days: self.settings.age_days,
            excluded_domain: &self.settings.exclude,
        };
        let records = select_candidates(conn, &query, today)?;

        if records.is_empty() {
            info!("No records to anonymize");
            return Ok(RunSummary::none_found());
        }

        let tx = conn.transaction()?;
        let mut staged = 0;

        for record in &records {
            let rewritten = self.redactor.rewrite(&record.text);
            if rewritten.as_ref() == record.text.as_str() {
                debug!("Record {} has nothing to redact", record.id);
                continue;
            }

            if update_text(&tx, &self.target, record.id, &rewritten)? == 0 {
                warn!("Record {} was not updated, leaving it out of the staged count", record.id);
                continue;
            }
            staged += 1;
        }

        let considered = records.len();
        info!("Staged {} updates across {} considered records", staged, considered);

        let confirmed = if self.settings.skip_confirm {
            info!("Skipping confirmation");
            true
        } else {
            confirmer.confirm(considered)?
        };

        let disposition = if confirmed {
            tx.commit()?;
            info!("Committed {} staged updates", staged);
            Disposition::Committed
        } else {
            tx.rollback()?;
            info!("Rolled back {} staged updates", staged);
            Disposition::Cancelled
        };

        Ok(RunSummary {
            considered,
            staged,
            disposition,
        })
    }
}
