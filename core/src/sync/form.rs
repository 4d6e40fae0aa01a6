use crate::api::{ParamGroup, ParamKey, ParamPatch, ParamValue, ParameterSet};
use log::warn;
use std::collections::{BTreeMap, BTreeSet};

/// Text held by the console's parameter widgets, one entry per tracked key.
///
/// The form is the live UI-bound state the sync scheduler snapshots at flush
/// time. Fields the operator touched since the last full populate are marked
/// edited so a load that lands mid-edit can leave them alone.
#[derive(Debug, Clone, PartialEq)]
pub struct ParamForm {
    fields: BTreeMap<ParamKey, String>,
    edited: BTreeSet<ParamKey>,
}

impl ParamForm {
    pub fn tracking(keys: impl IntoIterator<Item = ParamKey>) -> Self {
        Self {
            fields: keys
                .into_iter()
                .map(|key| (key, key.default_value().to_string()))
                .collect(),
            edited: BTreeSet::new(),
        }
    }

    /// Tracks every key that belongs to one of `groups`.
    pub fn for_groups(groups: &[ParamGroup]) -> Self {
        Self::tracking(
            ParamKey::ALL
                .into_iter()
                .filter(|key| groups.contains(&key.group())),
        )
    }

    pub fn is_tracked(&self, key: ParamKey) -> bool {
        self.fields.contains_key(&key)
    }

    pub fn text(&self, key: ParamKey) -> &str {
        self.fields.get(&key).map(String::as_str).unwrap_or_default()
    }

    pub fn is_edited(&self, key: ParamKey) -> bool {
        self.edited.contains(&key)
    }

    /// Updates a tracked field and marks it edited; untracked keys are ignored.
    pub fn set_text(&mut self, key: ParamKey, text: impl Into<String>) -> bool {
        match self.fields.get_mut(&key) {
            Some(slot) => {
                *slot = text.into();
                self.edited.insert(key);
                true
            }
            None => false,
        }
    }

    pub fn set_value(&mut self, key: ParamKey, value: ParamValue) -> bool {
        self.set_text(key, value.to_string())
    }

    /// Current coerced value, `None` when the text does not parse.
    pub fn value(&self, key: ParamKey) -> Option<ParamValue> {
        self.fields
            .get(&key)
            .and_then(|text| key.kind().coerce_text(text))
    }

    /// Overwrites every tracked field with the backend's value and forgets
    /// which fields were edited.
    pub fn populate(&mut self, set: &ParameterSet) {
        for (key, text) in self.fields.iter_mut() {
            *text = set.get(*key).to_string();
        }
        self.edited.clear();
    }

    /// Like [`ParamForm::populate`], but edited fields keep their text.
    pub fn populate_unedited(&mut self, set: &ParameterSet) {
        for (key, text) in self.fields.iter_mut() {
            if !self.edited.contains(key) {
                *text = set.get(*key).to_string();
            }
        }
    }

    /// Coerces every tracked field independently. A field whose text does not
    /// parse is left out of the patch.
    pub fn snapshot(&self) -> ParamPatch {
        let mut patch = ParamPatch::new();
        for (key, text) in &self.fields {
            match key.kind().coerce_text(text) {
                Some(value) => patch.insert(*key, value),
                None => warn!("not sending {key}: cannot read '{text}' as {:?}", key.kind()),
            }
        }
        patch
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn snapshot_coerces_each_field_independently() {
        let mut form = ParamForm::tracking([
            ParamKey::HofThreshold,
            ParamKey::SteerK,
            ParamKey::AutoDrive,
        ]);
        form.set_text(ParamKey::HofThreshold, "4o");
        form.set_text(ParamKey::SteerK, "7.25");
        form.set_text(ParamKey::AutoDrive, "1");

        let patch = form.snapshot();
        assert_eq!(patch.len(), 2);
        assert_eq!(patch.value(ParamKey::HofThreshold), None);
        assert_eq!(patch.value(ParamKey::SteerK), Some(ParamValue::Float(7.25)));
        assert_eq!(patch.value(ParamKey::AutoDrive), Some(ParamValue::Int(1)));
    }

    #[test]
    fn untracked_keys_are_ignored() {
        let mut form = ParamForm::for_groups(&[ParamGroup::Vision]);
        assert!(!form.set_text(ParamKey::SpeedKp, "1.0"));
        assert!(form.is_tracked(ParamKey::CannyLowThreshold));
        assert_eq!(form.snapshot().len(), 5);
    }

    #[test]
    fn populate_overwrites_with_backend_values() {
        let mut form = ParamForm::tracking([ParamKey::ManualMotor, ParamKey::ManualServo]);
        form.set_text(ParamKey::ManualMotor, "garbage");
        let mut set = ParameterSet::default();
        set.set(ParamKey::ManualMotor, ParamValue::Float(0.15));
        set.set(ParamKey::ManualServo, ParamValue::Int(1620));
        form.populate(&set);
        assert_eq!(form.text(ParamKey::ManualMotor), "0.15");
        assert_eq!(form.text(ParamKey::ManualServo), "1620");
        assert!(!form.is_edited(ParamKey::ManualMotor));
    }

    #[test]
    fn unedited_populate_keeps_operator_text() {
        let mut form = ParamForm::tracking([ParamKey::BinaryValue, ParamKey::HofThreshold]);
        form.set_text(ParamKey::BinaryValue, "120");
        let mut set = ParameterSet::default();
        set.set(ParamKey::BinaryValue, ParamValue::Int(90));
        set.set(ParamKey::HofThreshold, ParamValue::Int(33));

        form.populate_unedited(&set);
        assert_eq!(form.text(ParamKey::BinaryValue), "120");
        assert_eq!(form.text(ParamKey::HofThreshold), "33");
        assert!(form.is_edited(ParamKey::BinaryValue));
        assert!(!form.is_edited(ParamKey::HofThreshold));
    }
}
