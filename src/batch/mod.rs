//! Concurrent validation of many emails.
//!
//! Each job runs in its own task under a shared semaphore. A job that fails
//! (bad HTML, a panicking check) produces an error entry for that job only;
//! the other jobs carry on.

use std::sync::Arc;

use futures::stream::{FuturesUnordered, StreamExt};
use serde::Serialize;

use crate::initialization::init_semaphore;
use crate::report::{ValidationReport, VerdictStatus};
use crate::requirements::RequirementsDocument;
use crate::validate::Validator;

/// One email to validate.
#[derive(Debug, Clone)]
pub struct BatchJob {
    /// Label reported back with the result (usually the file name)
    pub name: String,
    pub html: String,
    pub requirements: RequirementsDocument,
}

/// Result of one job. Exactly one of `report` and `error` is set.
#[derive(Debug, Clone, Serialize)]
pub struct BatchOutcome {
    pub name: String,
    pub locale: Option<String>,
    pub report: Option<ValidationReport>,
    pub error: Option<String>,
}

impl BatchOutcome {
    fn failed(name: String, locale: Option<String>, error: impl Into<String>) -> Self {
        Self {
            name,
            locale,
            report: None,
            error: Some(error.into()),
        }
    }

    /// The report's overall status; an errored job counts as FAIL.
    pub fn overall(&self) -> VerdictStatus {
        self.report
            .as_ref()
            .map_or(VerdictStatus::Fail, |r| r.summary.overall)
    }
}

/// Validates every job, at most `max_parallel` at a time.
///
/// Outcomes come back in job order.
pub async fn validate_batch(
    validator: &Validator,
    jobs: Vec<BatchJob>,
    max_parallel: usize,
) -> Vec<BatchOutcome> {
    log::info!("Validating {} emails ({} at a time)", jobs.len(), max_parallel.max(1));
    let semaphore = init_semaphore(max_parallel);
    let mut tasks = FuturesUnordered::new();
    let mut labels = Vec::with_capacity(jobs.len());

    for (index, job) in jobs.into_iter().enumerate() {
        labels.push((job.name.clone(), job.requirements.locale.clone()));
        let validator = validator.clone();
        let semaphore = Arc::clone(&semaphore);
        tasks.push(async move {
            let handle = tokio::spawn(async move {
                let _permit = semaphore.acquire_owned().await.ok();
                log::debug!("Validating {}", job.name);
                let result = validator.validate(&job.html, &job.requirements).await;
                let locale = job.requirements.locale;
                match result {
                    Ok(report) => BatchOutcome {
                        name: job.name,
                        locale,
                        report: Some(report),
                        error: None,
                    },
                    Err(e) => {
                        log::warn!("Skipping {}: {}", job.name, e);
                        BatchOutcome::failed(job.name, locale, e.to_string())
                    }
                }
            });
            (index, handle.await)
        });
    }

    let mut outcomes: Vec<Option<BatchOutcome>> = labels.iter().map(|_| None).collect();
    while let Some((index, joined)) = tasks.next().await {
        let outcome = joined.unwrap_or_else(|join_error| {
            log::warn!("Validation task panicked: {:?}", join_error);
            let (name, locale) = labels[index].clone();
            BatchOutcome::failed(name, locale, "validation task panicked")
        });
        outcomes[index] = Some(outcome);
    }

    outcomes.into_iter().flatten().collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::{BrowserBackend, Config, DomainSettings};

    fn validator() -> Validator {
        let config = Config {
            check_links: false,
            check_products: false,
            browser: BrowserBackend::Disabled,
            ..Default::default()
        };
        Validator::new(config, DomainSettings::default()).expect("validator builds")
    }

    fn job(name: &str, html: &str) -> BatchJob {
        BatchJob {
            name: name.to_string(),
            html: html.to_string(),
            requirements: RequirementsDocument::from_json(r#"{"metadata": {"subject": "Hello"}}"#)
                .expect("valid requirements"),
        }
    }

    #[tokio::test]
    async fn test_batch_isolates_failing_jobs() {
        let jobs = vec![
            job("good.html", "<html><head><title>Hello</title></head></html>"),
            job("empty.html", ""),
            job("wrong.html", "<html><head><title>Goodbye</title></head></html>"),
        ];
        let outcomes = validate_batch(&validator(), jobs, 2).await;

        let names: Vec<&str> = outcomes.iter().map(|o| o.name.as_str()).collect();
        assert_eq!(names, ["good.html", "empty.html", "wrong.html"]);

        assert!(outcomes[0].error.is_none());
        assert_eq!(
            outcomes[0].report.as_ref().and_then(|r| r.metadata_field("subject")).map(|v| v.status),
            Some(VerdictStatus::Pass)
        );
        assert_eq!(outcomes[1].error.as_deref(), Some("Email document is empty"));
        assert_eq!(outcomes[1].overall(), VerdictStatus::Fail);
        assert_eq!(outcomes[2].overall(), VerdictStatus::Fail);
    }

    #[tokio::test]
    async fn test_empty_batch() {
        assert!(validate_batch(&validator(), Vec::new(), 4).await.is_empty());
    }
}
