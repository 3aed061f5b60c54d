//! Configuration report items and the `NotifyReport` assembly buffer
//!
//! This is the data side of §4.D's assembler: a buffer that accumulates
//! `ReportItem` rows across a multi-part `NotifyReport` cycle, keyed by
//! variable name, append-only until read-out, where duplicates are
//! resolved in favour of whichever entry carries a non-null value.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One `(component, variable)` row from a charge point's configuration report.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ReportItem {
    pub key: String,
    pub component: Value,
    pub value: Option<String>,
    /// `None` until the aggregator has determined writability (§4.K steps 5-7).
    pub readonly: Option<bool>,
    pub data_type: Option<String>,
    pub unit: Option<String>,
    pub values_list: Option<String>,
    pub mutability: Option<String>,
    pub attribute_type: Option<String>,
}

impl ReportItem {
    pub fn placeholder(key: impl Into<String>, component: Value) -> Self {
        Self {
            key: key.into(),
            component,
            value: None,
            readonly: None,
            data_type: None,
            unit: None,
            values_list: None,
            mutability: None,
            attribute_type: None,
        }
    }
}

/// Accumulates `ReportItem`s across a `GetBaseReport` → `NotifyReport*` cycle.
///
/// Invariant (§3): items are keyed unique by `key` *after* dedup; during the
/// cycle the buffer is append-only, so duplicate keys can and do occur.
#[derive(Debug, Default)]
pub struct NotifyReportBuffer {
    items: Vec<ReportItem>,
    done: bool,
    last_seq: i64,
}

impl NotifyReportBuffer {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn done(&self) -> bool {
        self.done
    }

    /// Reset for a new `GetBaseReport` cycle (§4.K step 1).
    pub fn reset(&mut self) {
        self.items.clear();
        self.done = false;
        self.last_seq = 0;
    }

    /// Ingest one `NotifyReport` frame. Returns the parsed row slice for this
    /// frame only (used as the bus event payload — §4.D step 5), not the
    /// whole buffer.
    pub fn ingest_frame(&mut self, seq_no: i64, tbc: bool, report_data: &[Value]) -> Vec<ReportItem> {
        if seq_no == 0 {
            self.reset();
        }
        self.last_seq = seq_no;

        let mut parsed = Vec::with_capacity(report_data.len());
        for entry in report_data {
            let item = parse_report_entry(entry);
            parsed.push(item.clone());
            self.items.push(item);
        }

        if !tbc {
            self.done = true;
        }

        parsed
    }

    /// Dedup items by key: a later entry with a non-null value overrides an
    /// earlier null-valued entry for the same key (§4.D invariant, §8).
    pub fn dedup(&self) -> Vec<ReportItem> {
        let mut order: Vec<String> = Vec::new();
        let mut by_key: std::collections::HashMap<String, ReportItem> =
            std::collections::HashMap::new();

        for item in &self.items {
            match by_key.get(&item.key) {
                None => {
                    order.push(item.key.clone());
                    by_key.insert(item.key.clone(), item.clone());
                }
                Some(existing) => {
                    if existing.value.is_none() && item.value.is_some() {
                        by_key.insert(item.key.clone(), item.clone());
                    }
                }
            }
        }

        order.into_iter().map(|k| by_key.remove(&k).unwrap()).collect()
    }
}

/// Parse one `report_data` entry from a `NotifyReport` frame into a `ReportItem`.
///
/// Scans `variableAttribute[]` for the first attribute whose value field
/// (tolerant to `value` / `attribute_value` / `attributeValue`) is usable —
/// neither null, empty, nor the literal string `"null"`.
fn parse_report_entry(entry: &Value) -> ReportItem {
    let key = entry
        .get("variable")
        .and_then(|v| v.get("name"))
        .and_then(|v| v.as_str())
        .unwrap_or_default()
        .to_string();

    let component = entry.get("component").cloned().unwrap_or(Value::Null);

    let data_type = entry
        .get("variableCharacteristics")
        .or_else(|| entry.get("variable_characteristics"))
        .and_then(|c| c.get("dataType").or_else(|| c.get("data_type")))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let unit = entry
        .get("variableCharacteristics")
        .or_else(|| entry.get("variable_characteristics"))
        .and_then(|c| c.get("unit"))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let values_list = entry
        .get("variableCharacteristics")
        .or_else(|| entry.get("variable_characteristics"))
        .and_then(|c| c.get("valuesList").or_else(|| c.get("values_list")))
        .and_then(|v| v.as_str())
        .map(str::to_string);

    let attributes = entry
        .get("variableAttribute")
        .or_else(|| entry.get("variable_attribute"))
        .and_then(|v| v.as_array())
        .cloned()
        .unwrap_or_default();

    for attr in &attributes {
        if let Some(raw) = tolerant_attribute_value(attr) {
            let mutability = attr
                .get("mutability")
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let attribute_type = attr
                .get("type")
                .or_else(|| attr.get("attributeType"))
                .and_then(|v| v.as_str())
                .map(str::to_string);
            let readonly = mutability.as_deref() == Some("ReadOnly");

            return ReportItem {
                key,
                component,
                value: Some(raw),
                readonly: Some(readonly),
                data_type,
                unit,
                values_list,
                mutability,
                attribute_type,
            };
        }
    }

    // No attribute had a usable value — null-valued placeholder (§4.D step 2).
    ReportItem {
        key,
        component,
        value: None,
        readonly: None,
        data_type,
        unit,
        values_list,
        mutability: None,
        attribute_type: None,
    }
}

/// Probe a small, closed set of field-name spellings in a fixed order,
/// returning the first non-null/non-empty/non-`"null"` value (§9).
fn tolerant_attribute_value(attr: &Value) -> Option<String> {
    for field in ["value", "attribute_value", "attributeValue"] {
        if let Some(v) = attr.get(field) {
            if let Some(s) = v.as_str() {
                if !s.is_empty() && s != "null" {
                    return Some(s.to_string());
                }
            } else if !v.is_null() {
                return Some(v.to_string());
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn assembles_two_frame_cycle() {
        let mut buf = NotifyReportBuffer::new();

        let frame0 = vec![json!({
            "variable": {"name": "Key1"},
            "component": {"name": "CompA"},
            "variableAttribute": [{"value": "Val1", "mutability": "ReadWrite"}],
        })];
        buf.ingest_frame(0, true, &frame0);
        assert!(!buf.done());

        let frame1 = vec![json!({
            "variable": {"name": "Key2"},
            "component": {"name": "CompB"},
            "variableAttribute": [],
        })];
        buf.ingest_frame(1, false, &frame1);
        assert!(buf.done());

        let mut items = buf.dedup();
        items.sort_by(|a, b| a.key.cmp(&b.key));
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].key, "Key1");
        assert_eq!(items[0].value.as_deref(), Some("Val1"));
        assert_eq!(items[0].readonly, Some(false));
        assert_eq!(items[1].key, "Key2");
        assert_eq!(items[1].value, None);
    }

    #[test]
    fn dedup_prefers_non_null_value() {
        let mut buf = NotifyReportBuffer::new();
        buf.ingest_frame(
            0,
            true,
            &[json!({"variable": {"name": "K1"}, "component": {}, "variableAttribute": []})],
        );
        buf.ingest_frame(
            1,
            false,
            &[json!({
                "variable": {"name": "K1"},
                "component": {},
                "variableAttribute": [{"attributeValue": "v1"}],
            })],
        );
        let items = buf.dedup();
        assert_eq!(items.len(), 1);
        assert_eq!(items[0].value.as_deref(), Some("v1"));
    }

    #[test]
    fn tbc_only_leaves_done_false() {
        let mut buf = NotifyReportBuffer::new();
        buf.ingest_frame(0, true, &[]);
        assert!(!buf.done());
    }

    #[test]
    fn tolerant_accessor_skips_null_literal() {
        let attr = json!({"value": "null", "attribute_value": "real"});
        assert_eq!(tolerant_attribute_value(&attr).as_deref(), Some("real"));
    }
}
