use std::fmt;
use serde_json::Value;
use crate::job::{JobResults, JobStatus, PredictionPayload};

/// Short human-readable view of a results document.
///
/// Artifact lines are only shown once the job is COMPLETED; before that the
/// server has nothing to report.
pub struct Summary<'a>(pub &'a JobResults);

/// A score printed the way the server wrote it.
struct Metric<'a>(Option<&'a Value>);

impl fmt::Display for Metric<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(Value::String(s)) => f.write_str(s),
            Some(v @ (Value::Number(_) | Value::Bool(_))) => write!(f, "{}", v),
            _ => f.write_str("n/a"),
        }
    }
}

fn cif_url(payload: Option<&PredictionPayload>) -> &str {
    payload.and_then(|p| p.cif_url()).unwrap_or("(none)")
}

impl fmt::Display for Summary<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let results = self.0;
        write!(f, "Status: {}\nComplex: {}", results.status(), results.is_complex())?;
        if results.status() != &JobStatus::Completed {
            return Ok(());
        }

        match (&results.prediction_payload, results.is_complex()) {
            (Some(pred), true) => {
                write!(f, "\ncif_url: {}", cif_url(Some(pred)))?;
                write!(f, "\nmeanPLLDT: {}", Metric(pred.mean_plddt.as_ref()))?;
                write!(f, "\nptm_score: {}", Metric(pred.ptm_score.as_ref()))?;
                write!(f, "\niptm_score: {}", Metric(pred.iptm_score.as_ref()))?;
            }
            _ => {
                for (i, payload) in results.sequence_payloads().enumerate() {
                    write!(f, "\n[{}] cif_url: {}", i, cif_url(payload))?;
                    write!(f, "\n[{}] meanPLLDT: {}", i, Metric(payload.and_then(|p| p.mean_plddt.as_ref())))?;
                }
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn render(doc: serde_json::Value) -> String {
        let results: JobResults = serde_json::from_value(doc).unwrap();
        Summary(&results).to_string()
    }

    #[test]
    fn test_pending_job_has_no_artifacts() {
        let out = render(json!({
            "job": {"status": "RUNNING", "isComplex": true},
            "predictionPayload": {"cif_url": "https://x/c.cif"}
        }));
        assert_eq!(out, "Status: RUNNING\nComplex: true");
    }

    #[test]
    fn test_complex_summary() {
        let out = render(json!({
            "job": {"status": "COMPLETED", "isComplex": true},
            "predictionPayload": {"cif_url": "https://x/c.cif", "meanPLLDT": 87.5, "ptm_score": 0.81}
        }));
        assert_eq!(
            out,
            "Status: COMPLETED\nComplex: true\ncif_url: https://x/c.cif\nmeanPLLDT: 87.5\nptm_score: 0.81\niptm_score: n/a"
        );
    }

    #[test]
    fn test_per_sequence_summary() {
        let out = render(json!({
            "job": {"status": "COMPLETED", "isComplex": false},
            "sequences": [
                {"predictionPayload": {"cif_url": "https://x/0.cif", "meanPLLDT": 91.25}},
                null
            ]
        }));
        assert_eq!(
            out,
            "Status: COMPLETED\nComplex: false\n[0] cif_url: https://x/0.cif\n[0] meanPLLDT: 91.25\n[1] cif_url: (none)\n[1] meanPLLDT: n/a"
        );
    }

    #[test]
    fn test_metrics_print_as_sent() {
        let out = render(json!({
            "job": {"status": "COMPLETED", "isComplex": true},
            "predictionPayload": {"cif_url": "https://x/c.cif", "meanPLLDT": 87, "ptm_score": "0.8", "iptm_score": [1]}
        }));
        assert!(out.ends_with("meanPLLDT: 87\nptm_score: 0.8\niptm_score: n/a"), "{}", out);
    }

    #[test]
    fn test_complex_job_with_empty_payload_lists_sequences() {
        let out = render(json!({
            "job": {"status": "COMPLETED", "isComplex": true},
            "predictionPayload": {},
            "sequences": [{"predictionPayload": {"cif_url": "https://x/0.cif", "meanPLLDT": 70.5}}]
        }));
        assert_eq!(
            out,
            "Status: COMPLETED\nComplex: true\n[0] cif_url: https://x/0.cif\n[0] meanPLLDT: 70.5"
        );
    }

    #[test]
    fn test_missing_job_block() {
        assert_eq!(render(json!({})), "Status: UNKNOWN\nComplex: false");
    }
}
