//! The batch form.

use std::collections::{BTreeMap, BTreeSet};

use chrono::{DateTime, Utc};
use ms_core::ElementSymbol;
use serde_json::{Map, Value};
use tracing::debug;

use crate::fields;
use crate::{ElementFamily, FieldKey, FieldValue};

/// Keys added and removed by one schema reconciliation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct SchemaChange {
    pub added: Vec<FieldKey>,
    pub removed: Vec<FieldKey>,
}

impl SchemaChange {
    pub fn is_empty(&self) -> bool {
        self.added.is_empty() && self.removed.is_empty()
    }
}

/// Key/value store behind the batch form.
///
/// Schema-driven keys always match the element list last passed to
/// [`apply_schema`](Self::apply_schema); static keys are never touched by it.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FormModel {
    fields: BTreeMap<FieldKey, FieldValue>,
    elements: Vec<ElementSymbol>,
}

impl FormModel {
    /// Empty form without any field.
    pub fn empty() -> Self {
        Self::default()
    }

    /// Form with the standard static fields and their defaults.
    pub fn new(now: DateTime<Utc>) -> Self {
        let mut form = Self::empty();
        form.set(fields::BATCH_ID, fields::default_batch_id(now));
        form.set(fields::TIMESTAMP, fields::format_minute(now));
        form.set(fields::STIRRER_RPM, fields::DEFAULT_STIRRER_RPM);
        form.set(fields::STIRRER_TIME, fields::DEFAULT_STIRRER_TIME);
        for key in [
            fields::CHARGE_WEIGHT_KG,
            fields::SCRAP_ADDED_KG,
            fields::ZONE1_TEMP,
            fields::ZONE2_TEMP,
            fields::ZONE3_TEMP,
            fields::STIRRER_TORQUE,
            fields::GAS_FLOW,
            fields::ENERGY_BASELINE_KWH,
        ] {
            form.set(key, FieldValue::default());
        }
        form
    }

    pub fn get(&self, key: &str) -> Option<&FieldValue> {
        self.fields.get(&FieldKey::parse(key))
    }

    pub fn set(&mut self, key: &str, value: impl Into<FieldValue>) {
        self.fields.insert(FieldKey::parse(key), value.into());
    }

    pub fn get_field(&self, key: &FieldKey) -> Option<&FieldValue> {
        self.fields.get(key)
    }

    pub fn set_field(&mut self, key: FieldKey, value: impl Into<FieldValue>) {
        self.fields.insert(key, value.into());
    }

    /// Numeric value of a field; missing fields read as zero.
    pub fn number(&self, key: &str) -> f64 {
        self.get(key).map(FieldValue::as_number).unwrap_or(0.0)
    }

    pub fn text(&self, key: &str) -> String {
        self.get(key).map(ToString::to_string).unwrap_or_default()
    }

    pub fn contains(&self, key: &str) -> bool {
        self.fields.contains_key(&FieldKey::parse(key))
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&FieldKey, &FieldValue)> {
        self.fields.iter()
    }

    /// Elements of the active grade schema.
    pub fn active_elements(&self) -> &[ElementSymbol] {
        &self.elements
    }

    pub fn is_active(&self, element: &ElementSymbol) -> bool {
        self.elements.contains(element)
    }

    pub fn schema_keys(&self) -> impl Iterator<Item = &FieldKey> {
        self.fields.keys().filter(|key| key.is_schema_driven())
    }

    /// Values of one family keyed by element, in schema order.
    pub fn family_values(&self, family: ElementFamily) -> Vec<(ElementSymbol, &FieldValue)> {
        self.elements
            .iter()
            .filter_map(|element| {
                self.fields
                    .get(&family.key(element))
                    .map(|value| (element.clone(), value))
            })
            .collect()
    }

    /// Write an element value if the element belongs to the active schema.
    ///
    /// Returns `false`, leaving the form untouched, otherwise.
    pub fn write_element(
        &mut self,
        family: ElementFamily,
        element: &ElementSymbol,
        value: impl Into<FieldValue>,
    ) -> bool {
        if !self.is_active(element) {
            return false;
        }
        self.fields.insert(family.key(element), value.into());
        true
    }

    /// Reconcile schema-driven keys with a new element list.
    ///
    /// Keys of elements that remain keep their values, keys of dropped
    /// elements disappear, new elements get empty fields. Static keys are
    /// untouched. The new key set is built aside and swapped in whole.
    pub fn apply_schema(&mut self, elements: &[ElementSymbol]) -> SchemaChange {
        let mut active = Vec::with_capacity(elements.len());
        let mut seen = BTreeSet::new();
        for element in elements {
            if seen.insert(element.clone()) {
                active.push(element.clone());
            }
        }

        let allowed: BTreeSet<FieldKey> = active
            .iter()
            .flat_map(|e| [ElementFamily::Raw.key(e), ElementFamily::Scrap.key(e)])
            .collect();

        let mut change = SchemaChange::default();
        let mut next = BTreeMap::new();
        for (key, value) in &self.fields {
            if key.is_schema_driven() && !allowed.contains(key) {
                change.removed.push(key.clone());
            } else {
                next.insert(key.clone(), value.clone());
            }
        }
        for key in allowed {
            if !next.contains_key(&key) {
                next.insert(key.clone(), FieldValue::default());
                change.added.push(key);
            }
        }

        self.fields = next;
        self.elements = active;
        debug!(
            added = change.added.len(),
            removed = change.removed.len(),
            "form schema reconciled"
        );
        change
    }

    /// Flat JSON object of every field, keyed by the textual key.
    pub fn to_json(&self) -> Value {
        let map: Map<String, Value> = self
            .fields
            .iter()
            .map(|(key, value)| {
                let json = match value {
                    FieldValue::Number(v) => serde_json::Number::from_f64(*v)
                        .map(Value::Number)
                        .unwrap_or(Value::Null),
                    FieldValue::Text(text) => Value::String(text.clone()),
                };
                (key.to_string(), json)
            })
            .collect();
        Value::Object(map)
    }
}
