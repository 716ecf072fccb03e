//! Mapping between core types and wire DTOs.

use api_shared::{
    MedicationReq, MedicationRes, MedicationSummaryRes, RequestErrorRes, RequestErrorType,
};
use pocketbook_core::{
    Medication, MedicationDraft, MedicationSummary, RequestErrorKind, RequestErrors,
};

pub(crate) fn draft_from_req(req: MedicationReq) -> MedicationDraft {
    MedicationDraft {
        advice_if_declined: req.advice_if_declined,
        advice_if_taken: req.advice_if_taken,
        dose: req.dose,
        exclusion_criteria: req.exclusion_criteria,
        form: req.form,
        inclusion_criteria: req.inclusion_criteria,
        indications: req.indications,
        name: req.name,
        route: req.route,
        side_effects: req.side_effects,
        policy_date: req.policy_date,
    }
}

pub(crate) fn medication_res(medication: &Medication) -> MedicationRes {
    let details = &medication.details;
    MedicationRes {
        id: medication.id.get(),
        advice_if_declined: details.advice_if_declined.to_string(),
        advice_if_taken: details.advice_if_taken.to_string(),
        dose: details.dose.to_string(),
        exclusion_criteria: details.exclusion_criteria.to_string(),
        form: details.form.to_string(),
        inclusion_criteria: details.inclusion_criteria.to_string(),
        indications: details.indications.to_string(),
        name: details.name.to_string(),
        route: details.route.to_string(),
        side_effects: details.side_effects.to_string(),
        policy_date: details.policy_date,
        last_modified: medication.last_modified,
    }
}

pub(crate) fn summary_res(summary: MedicationSummary) -> MedicationSummaryRes {
    MedicationSummaryRes {
        id: summary.id.get(),
        name: summary.name,
        last_modified: summary.last_modified,
    }
}

pub(crate) fn request_errors_res(errors: &RequestErrors) -> Vec<RequestErrorRes> {
    errors
        .iter()
        .map(|e| RequestErrorRes {
            error: match e.error {
                RequestErrorKind::IsBlank => RequestErrorType::IsBlank,
                RequestErrorKind::IsInvalid => RequestErrorType::IsInvalid,
                RequestErrorKind::IsInUse => RequestErrorType::IsInUse,
            },
            path: e.path.clone(),
        })
        .collect()
}
