//! Pending lots and internal name numbering

use std::collections::BTreeMap;

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};

use super::catalog::{NamingGroup, ReagentType, find_reagent_type, parse_set_letter};
use crate::errors::{LimsError, Result};

/// Form input for one lot
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LotRequest {
    pub reagent_type: String,
    #[serde(default)]
    pub set_letter: Option<String>,
    #[serde(default)]
    pub lot_number: String,
    #[serde(default)]
    pub received_date: Option<String>,
    #[serde(default)]
    pub expiry_date: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct PendingLot {
    pub reagent_type: &'static ReagentType,
    pub lot_number: String,
    pub received_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub internal_name: String,
    /// Numbering key, e.g. `index_B` or `prep`
    pub key: String,
    pub number: u32,
}

/// Outcome of one lot submission
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LotResult {
    pub name: String,
    pub success: bool,
    pub lims_id: Option<String>,
    pub message: String,
}

/// Numbering key of a reagent type and set letter
pub fn naming_key(reagent: &ReagentType, set_letter: char) -> String {
    match reagent.naming_group {
        NamingGroup::Index => format!("index_{}", set_letter),
        group => group.as_str().to_string(),
    }
}

pub fn internal_name(reagent: &ReagentType, set_letter: char, number: u32) -> String {
    match reagent.naming_group {
        NamingGroup::Index => format!("{}#{} (192)", set_letter, number),
        NamingGroup::Prep => format!("#{} (192)", number),
    }
}

fn parse_form_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| LimsError::date_parse(format!("{} must be YYYY-MM-DD, got '{}'", field, s))),
    }
}

/// Lots waiting to be submitted, with the numbering state
#[derive(Debug, Clone, Default)]
pub struct ReagentQueue {
    base_numbers: BTreeMap<String, u32>,
    pending: Vec<PendingLot>,
    /// Taken by a running submission, still reserving their numbers
    in_flight: Vec<PendingLot>,
    last_expiry: Option<NaiveDate>,
    results: Vec<LotResult>,
}

impl ReagentQueue {
    pub fn new(base_numbers: BTreeMap<String, u32>) -> Self {
        Self {
            base_numbers,
            ..Self::default()
        }
    }

    pub fn pending(&self) -> &[PendingLot] {
        &self.pending
    }

    pub fn results(&self) -> &[LotResult] {
        &self.results
    }

    pub fn last_expiry(&self) -> Option<NaiveDate> {
        self.last_expiry
    }

    pub fn base_number(&self, key: &str) -> u32 {
        self.base_numbers.get(key).copied().unwrap_or(0)
    }

    pub fn in_flight(&self) -> &[PendingLot] {
        &self.in_flight
    }

    /// Next free number: above the last used one and anything queued or in flight
    pub fn next_number(&self, key: &str) -> u32 {
        let highest_pending = self
            .pending
            .iter()
            .chain(&self.in_flight)
            .filter(|lot| lot.key == key)
            .map(|lot| lot.number)
            .max()
            .unwrap_or(0);
        self.base_number(key).max(highest_pending) + 1
    }

    /// Internal name the next lot of this type would get
    pub fn preview(&self, reagent_type: &str, set_letter: Option<&str>) -> Result<String> {
        let reagent = find_reagent_type(reagent_type)?;
        let letter = parse_set_letter(set_letter)?;
        let number = self.next_number(&naming_key(reagent, letter));
        Ok(internal_name(reagent, letter, number))
    }

    pub fn add(&mut self, request: &LotRequest) -> Result<&PendingLot> {
        let reagent = find_reagent_type(&request.reagent_type)?;
        let lot_number = request.lot_number.trim();
        if lot_number.is_empty() {
            return Err(LimsError::validation("Please enter a lot number"));
        }
        let expiry_date = parse_form_date(request.expiry_date.as_deref(), "Expiry date")?
            .ok_or_else(|| LimsError::validation("Please enter an expiry date"))?;
        let received_date = parse_form_date(request.received_date.as_deref(), "Received date")?
            .unwrap_or_else(|| Local::now().date_naive());

        let letter = parse_set_letter(request.set_letter.as_deref())?;
        let key = naming_key(reagent, letter);
        let number = self.next_number(&key);

        self.last_expiry = Some(expiry_date);
        self.pending.push(PendingLot {
            reagent_type: reagent,
            lot_number: lot_number.to_string(),
            received_date,
            expiry_date,
            internal_name: internal_name(reagent, letter, number),
            key,
            number,
        });
        Ok(&self.pending[self.pending.len() - 1])
    }

    /// Empty the queue and forget previous results
    pub fn clear(&mut self) {
        self.pending.clear();
        self.results.clear();
    }

    /// Move every queued lot into the in-flight set and return them
    ///
    /// Returns nothing while another submission is still in flight.
    pub fn take_pending(&mut self) -> Vec<PendingLot> {
        if !self.in_flight.is_empty() {
            return Vec::new();
        }
        self.in_flight = std::mem::take(&mut self.pending);
        self.in_flight.clone()
    }

    /// Put in-flight lots back in front of the queue, e.g. after a crashed submission
    pub fn restore_in_flight(&mut self) {
        let mut lots = std::mem::take(&mut self.in_flight);
        lots.append(&mut self.pending);
        self.pending = lots;
    }

    /// Apply submission results to the in-flight lots
    ///
    /// `results[i]` belongs to the i-th in-flight lot. Successful lots
    /// advance their key's base number; failed or unanswered lots go back to
    /// the front of the queue.
    pub fn apply_results(&mut self, results: Vec<LotResult>) {
        let lots = std::mem::take(&mut self.in_flight);
        let mut failed = Vec::new();
        for (i, lot) in lots.into_iter().enumerate() {
            match results.get(i) {
                Some(result) if result.success => {
                    let base = self.base_numbers.entry(lot.key.clone()).or_insert(0);
                    *base = (*base).max(lot.number);
                }
                _ => failed.push(lot),
            }
        }
        failed.append(&mut self.pending);
        self.pending = failed;
        self.results = results;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::default_sequence_numbers;

    fn request(kind: &str, letter: Option<&str>, lot: &str) -> LotRequest {
        LotRequest {
            reagent_type: kind.to_string(),
            set_letter: letter.map(String::from),
            lot_number: lot.to_string(),
            received_date: Some("2025-03-01".to_string()),
            expiry_date: Some("2026-03-01".to_string()),
        }
    }

    #[test]
    fn names_follow_sequence_numbers() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        assert_eq!(queue.preview("IDT-Index", Some("B")).unwrap(), "B#46 (192)");
        assert_eq!(queue.preview("Tag-Beads", None).unwrap(), "#29 (192)");

        queue.add(&request("IDT-Index", Some("B"), "L1")).unwrap();
        queue.add(&request("IPB-Buffers", None, "L2")).unwrap();
        queue.add(&request("PCR-Buffers", None, "L3")).unwrap();

        let names: Vec<&str> = queue.pending().iter().map(|l| l.internal_name.as_str()).collect();
        assert_eq!(names, vec!["B#46 (192)", "#29 (192)", "#30 (192)"]);
        assert_eq!(queue.preview("IDT-Index", Some("A")).unwrap(), "A#63 (192)");
    }

    #[test]
    fn missing_set_letter_defaults_to_a() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        let lot = queue.add(&request("IDT-Index", None, "L1")).unwrap();
        assert_eq!(lot.internal_name, "A#63 (192)");
        assert_eq!(lot.key, "index_A");
    }

    #[test]
    fn lot_number_and_expiry_are_required() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        let err = queue.add(&request("Tag-Beads", None, "  ")).unwrap_err();
        assert!(matches!(err, LimsError::Validation(_)));

        let mut no_expiry = request("Tag-Beads", None, "L9");
        no_expiry.expiry_date = None;
        let err = queue.add(&no_expiry).unwrap_err();
        assert!(matches!(err, LimsError::Validation(_)));
        assert!(queue.pending().is_empty());
        assert_eq!(queue.last_expiry(), None);
    }

    #[test]
    fn expiry_is_remembered() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        queue.add(&request("Tag-Beads", None, "L1")).unwrap();
        assert_eq!(
            queue.last_expiry(),
            NaiveDate::from_ymd_opt(2026, 3, 1)
        );
    }

    #[test]
    fn partial_failure_keeps_failed_lots() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        queue.add(&request("Tag-Beads", None, "L1")).unwrap();
        queue.add(&request("Tag-Beads", None, "L2")).unwrap();
        let submitted = queue.take_pending();
        assert_eq!(submitted.len(), 2);
        assert!(queue.pending().is_empty());

        queue.apply_results(vec![
                LotResult {
                    name: "#29 (192)".into(),
                    success: true,
                    lims_id: Some("124-902".into()),
                    message: "Created successfully".into(),
                },
                LotResult {
                    name: "#30 (192)".into(),
                    success: false,
                    lims_id: None,
                    message: "API error (400): duplicate".into(),
                },
            ]);

        assert_eq!(queue.pending().len(), 1);
        assert_eq!(queue.pending()[0].lot_number, "L2");
        assert_eq!(queue.base_number("prep"), 29);
        assert_eq!(queue.next_number("prep"), 31);
        assert_eq!(queue.results().len(), 2);
    }

    #[test]
    fn in_flight_lots_keep_their_numbers() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        queue.add(&request("Tag-Beads", None, "L1")).unwrap();
        assert_eq!(queue.take_pending().len(), 1);

        // A second taker gets nothing while the first is running
        assert!(queue.take_pending().is_empty());

        queue.clear();
        let lot = queue.add(&request("Tag-Beads", None, "L2")).unwrap();
        assert_eq!(lot.internal_name, "#30 (192)");

        queue.restore_in_flight();
        let lots: Vec<&str> = queue.pending().iter().map(|l| l.lot_number.as_str()).collect();
        assert_eq!(lots, vec!["L1", "L2"]);
        assert!(queue.in_flight().is_empty());
    }

    #[test]
    fn clear_resets_queue_but_not_base_numbers() {
        let mut queue = ReagentQueue::new(default_sequence_numbers());
        queue.add(&request("Tag-Beads", None, "L1")).unwrap();
        queue.clear();
        assert!(queue.pending().is_empty());
        assert_eq!(queue.preview("Tag-Beads", None).unwrap(), "#29 (192)");
    }
}
