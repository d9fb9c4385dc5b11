//! Writes synthetic readings into the batch form.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use ms_core::ElementSymbol;
use ms_form::fields::{TIMESTAMP, ZONE1_TEMP, format_minute};
use ms_form::{ElementFamily, FormModel};
use tracing::{debug, info, warn};

use crate::{ReadingError, ReadingMode, ReadingResult, SyntheticReading, SyntheticSource};

/// What one reading wrote into the form.
#[derive(Debug, Clone, PartialEq)]
pub struct ReadingReport {
    pub family: ElementFamily,
    pub written: Vec<ElementSymbol>,
    /// Elements in the reading that the active schema does not expose.
    pub dropped: Vec<String>,
    pub temperature: Option<f64>,
    pub timestamp: Option<String>,
}

/// Both stages of a mixed reading. Each stage fails independently.
#[derive(Debug, Clone, PartialEq)]
pub struct MixedReport {
    pub raw: ReadingResult<ReadingReport>,
    pub scrap: ReadingResult<ReadingReport>,
}

impl MixedReport {
    /// Neither stage wrote anything.
    pub fn is_total_failure(&self) -> bool {
        self.raw.is_err() && self.scrap.is_err()
    }

    pub fn is_partial(&self) -> bool {
        self.raw.is_err() != self.scrap.is_err()
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum ReadingOutcome {
    Single(ReadingReport),
    Mixed(MixedReport),
}

pub struct ReadingGenerator {
    source: Arc<dyn SyntheticSource>,
}

impl ReadingGenerator {
    pub fn new(source: Arc<dyn SyntheticSource>) -> Self {
        Self { source }
    }

    /// Dispatch on `mode`. Only a missing grade fails a mixed reading
    /// outright; stage failures are reported inside the [`MixedReport`].
    pub async fn generate(
        &self,
        mode: ReadingMode,
        grade: &str,
        form: &mut FormModel,
    ) -> ReadingResult<ReadingOutcome> {
        match mode {
            ReadingMode::RawMetal => self.generate_raw(grade, form).await.map(ReadingOutcome::Single),
            ReadingMode::Scrap => self.generate_scrap(grade, form).await.map(ReadingOutcome::Single),
            ReadingMode::Mixed => self.generate_mixed(grade, form).await.map(ReadingOutcome::Mixed),
        }
    }

    pub async fn generate_raw(&self, grade: &str, form: &mut FormModel) -> ReadingResult<ReadingReport> {
        self.generate_into(ElementFamily::Raw, grade, form).await
    }

    pub async fn generate_scrap(
        &self,
        grade: &str,
        form: &mut FormModel,
    ) -> ReadingResult<ReadingReport> {
        self.generate_into(ElementFamily::Scrap, grade, form).await
    }

    /// Raw then scrap, each awaited in turn.
    pub async fn generate_mixed(&self, grade: &str, form: &mut FormModel) -> ReadingResult<MixedReport> {
        let grade = selected(grade)?;
        let raw = self.generate_into(ElementFamily::Raw, grade, form).await;
        let scrap = self.generate_into(ElementFamily::Scrap, grade, form).await;
        let report = MixedReport { raw, scrap };
        if report.is_total_failure() {
            warn!(grade, "mixed reading failed in both stages");
        }
        Ok(report)
    }

    async fn generate_into(
        &self,
        family: ElementFamily,
        grade: &str,
        form: &mut FormModel,
    ) -> ReadingResult<ReadingReport> {
        let grade = selected(grade)?;
        let reading = self.source.fetch(grade).await.map_err(|error| {
            warn!(%error, grade, ?family, "synthetic reading failed");
            ReadingError::from(error)
        })?;
        let report = apply_reading(family, reading, form);
        info!(
            grade,
            ?family,
            written = report.written.len(),
            dropped = report.dropped.len(),
            "synthetic reading applied"
        );
        Ok(report)
    }
}

fn selected(grade: &str) -> ReadingResult<&str> {
    let grade = grade.trim();
    if grade.is_empty() {
        return Err(ReadingError::NoGradeSelected);
    }
    Ok(grade)
}

fn apply_reading(family: ElementFamily, reading: SyntheticReading, form: &mut FormModel) -> ReadingReport {
    let mut written = Vec::new();
    let mut dropped = Vec::new();
    for (symbol, value) in reading.composition {
        match ElementSymbol::parse(&symbol) {
            Some(element) if form.write_element(family, &element, value) => written.push(element),
            _ => dropped.push(symbol),
        }
    }
    if !dropped.is_empty() {
        debug!(?dropped, "reading elements outside the active schema");
    }

    let temperature = reading.temperature.filter(|t| t.is_finite()).map(f64::round);
    if let Some(t) = temperature {
        form.set(ZONE1_TEMP, t);
    }

    let timestamp = reading
        .timestamp
        .as_deref()
        .and_then(|raw| DateTime::parse_from_rfc3339(raw.trim()).ok())
        .map(|at| format_minute(at.with_timezone(&Utc)));
    if let Some(stamp) = &timestamp {
        form.set(TIMESTAMP, stamp.as_str());
    }

    ReadingReport {
        family,
        written,
        dropped,
        temperature,
        timestamp,
    }
}
