//! Field-level validation of submitted medications.
//!
//! Validation never stops at the first problem: every failing field contributes one
//! [`RequestError`], and the errors are always produced in the same order for the same input.
//! Required fields are checked in [`MedicationField::REQUIRED`] order, followed by the
//! `policyDate` format check. Name uniqueness is checked separately by the service and appended
//! last.

use crate::medication::{MedicationDetails, MedicationDraft};
use crate::NonEmptyText;
use chrono::{NaiveDate, NaiveDateTime};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Error categories reported back to the client.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RequestErrorKind {
    /// A required field was missing, empty or whitespace-only.
    IsBlank,
    /// A field was present but its value could not be understood.
    IsInvalid,
    /// The value collides with another record.
    IsInUse,
}

/// Medication fields that can be named in a [`RequestError`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MedicationField {
    AdviceIfDeclined,
    AdviceIfTaken,
    Dose,
    ExclusionCriteria,
    Form,
    InclusionCriteria,
    Indications,
    Name,
    Route,
    SideEffects,
    PolicyDate,
}

impl MedicationField {
    /// Required text fields, in the order they are validated.
    pub const REQUIRED: [MedicationField; 10] = [
        MedicationField::AdviceIfDeclined,
        MedicationField::AdviceIfTaken,
        MedicationField::Dose,
        MedicationField::ExclusionCriteria,
        MedicationField::Form,
        MedicationField::InclusionCriteria,
        MedicationField::Indications,
        MedicationField::Name,
        MedicationField::Route,
        MedicationField::SideEffects,
    ];

    /// The field name as it appears in JSON payloads.
    pub fn path(self) -> &'static str {
        match self {
            MedicationField::AdviceIfDeclined => "adviceIfDeclined",
            MedicationField::AdviceIfTaken => "adviceIfTaken",
            MedicationField::Dose => "dose",
            MedicationField::ExclusionCriteria => "exclusionCriteria",
            MedicationField::Form => "form",
            MedicationField::InclusionCriteria => "inclusionCriteria",
            MedicationField::Indications => "indications",
            MedicationField::Name => "name",
            MedicationField::Route => "route",
            MedicationField::SideEffects => "sideEffects",
            MedicationField::PolicyDate => "policyDate",
        }
    }

    /// Looks a field up by its JSON name.
    pub fn from_path(path: &str) -> Option<Self> {
        Self::REQUIRED
            .into_iter()
            .chain([MedicationField::PolicyDate])
            .find(|field| field.path() == path)
    }

    fn draft_value(self, draft: &MedicationDraft) -> Option<&str> {
        let value = match self {
            MedicationField::AdviceIfDeclined => &draft.advice_if_declined,
            MedicationField::AdviceIfTaken => &draft.advice_if_taken,
            MedicationField::Dose => &draft.dose,
            MedicationField::ExclusionCriteria => &draft.exclusion_criteria,
            MedicationField::Form => &draft.form,
            MedicationField::InclusionCriteria => &draft.inclusion_criteria,
            MedicationField::Indications => &draft.indications,
            MedicationField::Name => &draft.name,
            MedicationField::Route => &draft.route,
            MedicationField::SideEffects => &draft.side_effects,
            MedicationField::PolicyDate => &draft.policy_date,
        };
        value.as_deref()
    }
}

impl fmt::Display for MedicationField {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.path())
    }
}

/// A single field-level problem with a request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RequestError {
    pub error: RequestErrorKind,
    pub path: String,
}

impl RequestError {
    pub fn new(error: RequestErrorKind, field: MedicationField) -> Self {
        Self {
            error,
            path: field.path().to_owned(),
        }
    }

    pub fn blank(field: MedicationField) -> Self {
        Self::new(RequestErrorKind::IsBlank, field)
    }

    pub fn invalid(field: MedicationField) -> Self {
        Self::new(RequestErrorKind::IsInvalid, field)
    }

    pub fn name_in_use() -> Self {
        Self::new(RequestErrorKind::IsInUse, MedicationField::Name)
    }
}

/// Ordered, non-truncated list of request errors.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RequestErrors(Vec<RequestError>);

impl RequestErrors {
    pub fn push(&mut self, error: RequestError) {
        self.0.push(error);
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn as_slice(&self) -> &[RequestError] {
        &self.0
    }

    pub fn iter(&self) -> std::slice::Iter<'_, RequestError> {
        self.0.iter()
    }

    pub fn into_vec(self) -> Vec<RequestError> {
        self.0
    }
}

impl From<Vec<RequestError>> for RequestErrors {
    fn from(errors: Vec<RequestError>) -> Self {
        Self(errors)
    }
}

impl<'a> IntoIterator for &'a RequestErrors {
    type Item = &'a RequestError;
    type IntoIter = std::slice::Iter<'a, RequestError>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

impl fmt::Display for RequestErrors {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<String> = self
            .0
            .iter()
            .map(|e| format!("{:?}({})", e.error, e.path))
            .collect();
        write!(f, "[{}]", parts.join(", "))
    }
}

/// Accepted `policyDate` layouts. A bare date is preferred; a date-time has its time dropped.
const POLICY_DATE_FORMAT: &str = "%Y-%m-%d";
const POLICY_DATE_TIME_FORMAT: &str = "%Y-%m-%dT%H:%M:%S";

fn parse_policy_date(value: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value, POLICY_DATE_FORMAT)
        .ok()
        .or_else(|| {
            NaiveDateTime::parse_from_str(value, POLICY_DATE_TIME_FORMAT)
                .ok()
                .map(|dt| dt.date())
        })
}

#[derive(Default)]
struct Collector {
    errors: RequestErrors,
}

impl Collector {
    fn required(&mut self, draft: &MedicationDraft, field: MedicationField) -> Option<NonEmptyText> {
        match field.draft_value(draft).map(NonEmptyText::new) {
            Some(Ok(text)) => Some(text),
            _ => {
                self.errors.push(RequestError::blank(field));
                None
            }
        }
    }

    fn optional_date(&mut self, draft: &MedicationDraft) -> Option<NaiveDate> {
        let field = MedicationField::PolicyDate;
        let raw = field.draft_value(draft).map(str::trim).filter(|v| !v.is_empty())?;

        let parsed = parse_policy_date(raw);
        if parsed.is_none() {
            self.errors.push(RequestError::invalid(field));
        }
        parsed
    }
}

/// Validates a submitted draft.
///
/// Returns the validated details, or every problem found, in deterministic order. Accepted text
/// is kept exactly as submitted; whitespace only decides whether a field is blank.
///
/// # Errors
///
/// Returns [`RequestErrors`] containing one `IsBlank` per missing, empty or whitespace-only
/// required field (in [`MedicationField::REQUIRED`] order), followed by `IsInvalid` for a
/// `policyDate` that is not a date.
pub fn validate(draft: &MedicationDraft) -> Result<MedicationDetails, RequestErrors> {
    use MedicationField as F;

    let mut c = Collector::default();

    let advice_if_declined = c.required(draft, F::AdviceIfDeclined);
    let advice_if_taken = c.required(draft, F::AdviceIfTaken);
    let dose = c.required(draft, F::Dose);
    let exclusion_criteria = c.required(draft, F::ExclusionCriteria);
    let form = c.required(draft, F::Form);
    let inclusion_criteria = c.required(draft, F::InclusionCriteria);
    let indications = c.required(draft, F::Indications);
    let name = c.required(draft, F::Name);
    let route = c.required(draft, F::Route);
    let side_effects = c.required(draft, F::SideEffects);
    let policy_date = c.optional_date(draft);

    if !c.errors.is_empty() {
        return Err(c.errors);
    }

    match (
        advice_if_declined,
        advice_if_taken,
        dose,
        exclusion_criteria,
        form,
        inclusion_criteria,
        indications,
        name,
        route,
        side_effects,
    ) {
        (
            Some(advice_if_declined),
            Some(advice_if_taken),
            Some(dose),
            Some(exclusion_criteria),
            Some(form),
            Some(inclusion_criteria),
            Some(indications),
            Some(name),
            Some(route),
            Some(side_effects),
        ) => Ok(MedicationDetails {
            advice_if_declined,
            advice_if_taken,
            dose,
            exclusion_criteria,
            form,
            inclusion_criteria,
            indications,
            name,
            route,
            side_effects,
            policy_date,
        }),
        // Every None above pushed an error, so this arm is unreachable in practice.
        _ => Err(c.errors),
    }
}

/// The name a draft would be stored under, if it has one.
pub(crate) fn candidate_name(draft: &MedicationDraft) -> Option<NonEmptyText> {
    draft.name.as_deref().and_then(|n| NonEmptyText::new(n).ok())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::medication::tests::sample_draft;

    fn set_field(draft: &mut MedicationDraft, field: MedicationField, value: Option<&str>) {
        let value = value.map(str::to_owned);
        match field {
            MedicationField::AdviceIfDeclined => draft.advice_if_declined = value,
            MedicationField::AdviceIfTaken => draft.advice_if_taken = value,
            MedicationField::Dose => draft.dose = value,
            MedicationField::ExclusionCriteria => draft.exclusion_criteria = value,
            MedicationField::Form => draft.form = value,
            MedicationField::InclusionCriteria => draft.inclusion_criteria = value,
            MedicationField::Indications => draft.indications = value,
            MedicationField::Name => draft.name = value,
            MedicationField::Route => draft.route = value,
            MedicationField::SideEffects => draft.side_effects = value,
            MedicationField::PolicyDate => draft.policy_date = value,
        }
    }

    #[test]
    fn test_valid_draft_keeps_submitted_text_verbatim() {
        let mut draft = sample_draft("  Paracetamol  ");
        draft.dose = Some("1g\n".into());
        draft.policy_date = Some("2020-04-01T00:00:00".into());

        let details = validate(&draft).expect("draft should be valid");

        assert_eq!(details.name, "  Paracetamol  ");
        assert_eq!(details.dose, "1g\n");
        assert_eq!(details.policy_date, NaiveDate::from_ymd_opt(2020, 4, 1));
    }

    #[test]
    fn test_field_lookup_by_json_name() {
        assert_eq!(MedicationField::from_path("sideEffects"), Some(MedicationField::SideEffects));
        assert_eq!(MedicationField::from_path("policyDate"), Some(MedicationField::PolicyDate));
        assert_eq!(MedicationField::from_path("side_effects"), None);
        assert_eq!(MedicationField::from_path(""), None);
    }

    #[test]
    fn test_each_blank_field_reports_exactly_one_error() {
        for field in MedicationField::REQUIRED {
            for blank in [None, Some(""), Some("   "), Some("\t\n")] {
                let mut draft = sample_draft("Paracetamol");
                set_field(&mut draft, field, blank);

                let errors = validate(&draft).expect_err("blank field should fail validation");

                assert_eq!(
                    errors.as_slice(),
                    &[RequestError::blank(field)],
                    "field {field} with value {blank:?}"
                );
            }
        }
    }

    #[test]
    fn test_multiple_blank_fields_are_reported_in_declared_order() {
        let mut draft = sample_draft("Paracetamol");
        draft.side_effects = None;
        draft.dose = Some(" ".into());
        draft.name = Some(String::new());
        draft.advice_if_declined = None;

        let errors = validate(&draft).expect_err("draft should fail validation");
        let paths: Vec<&str> = errors.iter().map(|e| e.path.as_str()).collect();

        assert_eq!(paths, ["adviceIfDeclined", "dose", "name", "sideEffects"]);
        assert!(errors.iter().all(|e| e.error == RequestErrorKind::IsBlank));
    }

    #[test]
    fn test_empty_draft_reports_all_ten_required_fields() {
        let errors = validate(&MedicationDraft::default()).expect_err("empty draft should fail");

        let expected: Vec<RequestError> = MedicationField::REQUIRED
            .iter()
            .map(|f| RequestError::blank(*f))
            .collect();
        assert_eq!(errors.into_vec(), expected);
    }

    #[test]
    fn test_policy_date_is_optional() {
        for value in [None, Some(""), Some("  ")] {
            let mut draft = sample_draft("Paracetamol");
            draft.policy_date = value.map(str::to_owned);

            let details = validate(&draft).expect("missing policy date is allowed");
            assert_eq!(details.policy_date, None);
        }
    }

    #[test]
    fn test_malformed_policy_date_is_invalid_and_follows_blank_errors() {
        let mut draft = sample_draft("Paracetamol");
        draft.route = None;
        draft.policy_date = Some("next tuesday".into());

        let errors = validate(&draft).expect_err("draft should fail validation");

        assert_eq!(
            errors.as_slice(),
            &[
                RequestError::blank(MedicationField::Route),
                RequestError::invalid(MedicationField::PolicyDate),
            ]
        );
    }

    #[test]
    fn test_request_errors_serialize_as_camel_case_list() {
        let errors = RequestErrors::from(vec![
            RequestError::blank(MedicationField::ExclusionCriteria),
            RequestError::name_in_use(),
        ]);

        let json = serde_json::to_string(&errors).expect("should serialize");

        assert_eq!(
            json,
            r#"[{"error":"isBlank","path":"exclusionCriteria"},{"error":"isInUse","path":"name"}]"#
        );
    }

    #[test]
    fn test_candidate_name_ignores_blank_names_and_keeps_padding() {
        assert_eq!(candidate_name(&sample_draft("   ")), None);
        assert_eq!(
            candidate_name(&sample_draft(" Ibuprofen ")).map(NonEmptyText::into_inner),
            Some(" Ibuprofen ".to_string())
        );
    }
}
