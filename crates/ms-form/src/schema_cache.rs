//! Grade list and per-grade element schemas.

use std::collections::HashMap;
use std::sync::Arc;

use ms_core::ElementSymbol;
use ms_transport::{Endpoint, Request, Transport};
use serde::{Deserialize, Serialize};
use serde_json::json;
use tracing::{info, warn};

use crate::envelope::{decode_element_entries, decode_grade_names};
use crate::{SchemaError, SchemaResult};

/// Ordered element list of one grade. Replaced whole on refresh.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GradeSchema {
    pub grade_name: String,
    pub elements: Vec<ElementSymbol>,
}

impl GradeSchema {
    pub fn empty(grade_name: impl Into<String>) -> Self {
        Self {
            grade_name: grade_name.into(),
            elements: Vec::new(),
        }
    }
}

/// Outcome of a grade-list refresh.
#[derive(Debug, Clone, PartialEq)]
pub struct GradeList {
    pub grades: Vec<String>,
    /// Set when the refresh failed and `grades` is the previous list.
    pub stale: Option<SchemaError>,
}

impl GradeList {
    pub fn is_fresh(&self) -> bool {
        self.stale.is_none()
    }
}

/// Session-lifetime cache of grade names and element schemas.
pub struct GradeSchemaCache {
    transport: Arc<dyn Transport>,
    grades: Vec<String>,
    schemas: HashMap<String, GradeSchema>,
}

impl GradeSchemaCache {
    pub fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            grades: Vec::new(),
            schemas: HashMap::new(),
        }
    }

    pub fn grades(&self) -> &[String] {
        &self.grades
    }

    pub fn cached(&self, grade: &str) -> Option<&GradeSchema> {
        self.schemas.get(grade)
    }

    /// Refresh the grade list. On failure the previous list is kept.
    pub async fn list_grades(&mut self) -> GradeList {
        match self.transport.send(Request::new(Endpoint::GradeNames)).await {
            Ok(body) => {
                self.grades = decode_grade_names(body);
                info!(count = self.grades.len(), "grade list refreshed");
                GradeList {
                    grades: self.grades.clone(),
                    stale: None,
                }
            }
            Err(error) => {
                warn!(%error, "grade list refresh failed, keeping cached list");
                GradeList {
                    grades: self.grades.clone(),
                    stale: Some(error.into()),
                }
            }
        }
    }

    /// Fetch the element schema of `grade`.
    ///
    /// A blank grade yields an empty schema without a remote call. When the
    /// fetch fails and the grade was fetched before, the cached schema is
    /// returned instead.
    pub async fn elements(&mut self, grade: &str) -> SchemaResult<GradeSchema> {
        let grade = grade.trim();
        if grade.is_empty() {
            return Ok(GradeSchema::empty(""));
        }

        match self.fetch_elements(grade).await {
            Ok(schema) => {
                self.schemas.insert(grade.to_string(), schema.clone());
                Ok(schema)
            }
            Err(error) => match self.schemas.get(grade) {
                Some(cached) => {
                    warn!(%error, grade, "element lookup failed, using cached schema");
                    Ok(cached.clone())
                }
                None => Err(error),
            },
        }
    }

    async fn fetch_elements(&self, grade: &str) -> SchemaResult<GradeSchema> {
        let request = Request::new(Endpoint::GradeElements).with_body(json!({ "name": grade }));
        let body = self.transport.send(request).await?;
        let entries = decode_element_entries(body).ok_or_else(|| SchemaError::Malformed {
            grade: grade.to_string(),
            message: "no element list in response".to_string(),
        })?;

        let mut elements: Vec<ElementSymbol> = Vec::with_capacity(entries.len());
        for symbol in entries.iter().filter_map(|e| ElementSymbol::parse(e)) {
            if !elements.contains(&symbol) {
                elements.push(symbol);
            }
        }
        Ok(GradeSchema {
            grade_name: grade.to_string(),
            elements,
        })
    }
}
