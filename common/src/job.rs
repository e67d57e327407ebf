use serde::de::{DeserializeOwned, Deserializer, Error as _};
use serde::{Deserialize, Serialize, Serializer};
use serde_json::Value;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Hash)]
#[serde(transparent)]
pub struct JobId(pub String);

impl std::fmt::Display for JobId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<&str> for JobId {
    fn from(s: &str) -> Self {
        JobId(s.to_string())
    }
}

/// Job state as reported by the server. Only `Completed`, `Failed` and
/// `Stopped` are terminal; anything else means the job is still going.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub enum JobStatus {
    Pending,
    Running,
    Completed,
    Failed,
    Stopped,
    #[default]
    Unknown,
    Other(String),
}

impl JobStatus {
    pub fn is_terminal(&self) -> bool {
        matches!(self, JobStatus::Completed | JobStatus::Failed | JobStatus::Stopped)
    }

    pub fn is_failure(&self) -> bool {
        matches!(self, JobStatus::Failed | JobStatus::Stopped)
    }

    pub fn as_str(&self) -> &str {
        match self {
            JobStatus::Pending => "PENDING",
            JobStatus::Running => "RUNNING",
            JobStatus::Completed => "COMPLETED",
            JobStatus::Failed => "FAILED",
            JobStatus::Stopped => "STOPPED",
            JobStatus::Unknown => "UNKNOWN",
            JobStatus::Other(s) => s,
        }
    }
}

impl From<String> for JobStatus {
    fn from(s: String) -> Self {
        match s.as_str() {
            "PENDING" => JobStatus::Pending,
            "RUNNING" => JobStatus::Running,
            "COMPLETED" => JobStatus::Completed,
            "FAILED" => JobStatus::Failed,
            "STOPPED" => JobStatus::Stopped,
            "UNKNOWN" => JobStatus::Unknown,
            _ => JobStatus::Other(s),
        }
    }
}

impl From<JobStatus> for String {
    fn from(status: JobStatus) -> Self {
        status.as_str().to_string()
    }
}

impl std::fmt::Display for JobStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Decode a field, falling back to its default when the value is `null` or
/// of an unexpected type.
fn lenient<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let value = Value::deserialize(deserializer)?;
    Ok(T::deserialize(value).unwrap_or_default())
}

/// Metrics are kept as sent so that `87` stays `87`; only `null` counts as
/// missing.
fn metric<'de, D>(deserializer: D) -> Result<Option<Value>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Value>::deserialize(deserializer)?.filter(|v| !v.is_null()))
}

/// An empty `{}` payload reads as no payload at all.
fn payload<'de, D>(deserializer: D) -> Result<Option<PredictionPayload>, D::Error>
where
    D: Deserializer<'de>,
{
    match Value::deserialize(deserializer)? {
        Value::Object(map) if !map.is_empty() => {
            Ok(PredictionPayload::deserialize(Value::Object(map)).ok())
        }
        _ => Ok(None),
    }
}

fn sequence_entries<'de, D>(deserializer: D) -> Result<Vec<SequenceEntry>, D::Error>
where
    D: Deserializer<'de>,
{
    let entries: Vec<Value> = lenient(deserializer)?;
    Ok(entries
        .into_iter()
        .map(|e| SequenceEntry::deserialize(e).unwrap_or_default())
        .collect())
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct JobInfo {
    #[serde(default, deserialize_with = "lenient")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient")]
    pub status: JobStatus,
    #[serde(rename = "isComplex", default, deserialize_with = "lenient")]
    pub is_complex: bool,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct PredictionPayload {
    #[serde(default, deserialize_with = "lenient")]
    pub cif_url: Option<String>,
    #[serde(rename = "meanPLLDT", default, deserialize_with = "metric")]
    pub mean_plddt: Option<Value>,
    #[serde(default, deserialize_with = "metric")]
    pub ptm_score: Option<Value>,
    #[serde(default, deserialize_with = "metric")]
    pub iptm_score: Option<Value>,
}

impl PredictionPayload {
    /// The structure file URL, treating an empty string as missing.
    pub fn cif_url(&self) -> Option<&str> {
        self.cif_url.as_deref().filter(|u| !u.is_empty())
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct SequenceEntry {
    #[serde(rename = "predictionPayload", default, deserialize_with = "payload")]
    pub prediction_payload: Option<PredictionPayload>,
}

#[derive(Deserialize)]
struct ResultsFields {
    #[serde(default, deserialize_with = "lenient")]
    job: JobInfo,
    #[serde(default, deserialize_with = "sequence_entries")]
    sequences: Vec<SequenceEntry>,
    #[serde(rename = "predictionPayload", default, deserialize_with = "payload")]
    prediction_payload: Option<PredictionPayload>,
}

/// The document served by `GET /v1/jobs/{id}/results`.
///
/// The typed fields are a lenient view for the client's own decisions; the
/// document as the server sent it is kept alongside and is what gets
/// serialized back out.
#[derive(Debug, Clone, Default)]
pub struct JobResults {
    pub job: JobInfo,
    pub sequences: Vec<SequenceEntry>,
    pub prediction_payload: Option<PredictionPayload>,
    raw: Value,
}

impl<'de> Deserialize<'de> for JobResults {
    fn deserialize<D>(deserializer: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Value::deserialize(deserializer)?;
        let fields = ResultsFields::deserialize(&raw).map_err(D::Error::custom)?;
        Ok(Self {
            job: fields.job,
            sequences: fields.sequences,
            prediction_payload: fields.prediction_payload,
            raw,
        })
    }
}

impl Serialize for JobResults {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

impl JobResults {
    pub fn status(&self) -> &JobStatus {
        &self.job.status
    }

    pub fn is_complex(&self) -> bool {
        self.job.is_complex
    }

    /// The document exactly as the server returned it.
    pub fn raw(&self) -> &Value {
        &self.raw
    }

    /// Per-sequence payloads in source order; `None` where the payload is
    /// missing.
    pub fn sequence_payloads(&self) -> impl Iterator<Item = Option<&PredictionPayload>> {
        self.sequences.iter().map(|s| s.prediction_payload.as_ref())
    }

    /// The combined structure URL of a complex job, if there is one.
    pub fn complex_cif_url(&self) -> Option<&str> {
        if !self.is_complex() {
            return None;
        }
        self.prediction_payload.as_ref().and_then(|p| p.cif_url())
    }

    /// Structure URLs of the individual sequences. Entries without one are
    /// skipped.
    pub fn sequence_cif_urls(&self) -> Vec<&str> {
        self.sequence_payloads()
            .filter_map(|p| p.and_then(|p| p.cif_url()))
            .collect()
    }

    pub fn to_pretty_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(&self.raw)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_status_parsing() {
        let status: JobStatus = serde_json::from_value(json!("COMPLETED")).unwrap();
        assert_eq!(status, JobStatus::Completed);
        assert!(status.is_terminal());
        assert!(!status.is_failure());

        let status: JobStatus = serde_json::from_value(json!("STOPPED")).unwrap();
        assert!(status.is_terminal());
        assert!(status.is_failure());

        let status: JobStatus = serde_json::from_value(json!("QUEUED")).unwrap();
        assert_eq!(status, JobStatus::Other("QUEUED".to_string()));
        assert!(!status.is_terminal());
        assert_eq!(status.to_string(), "QUEUED");
    }

    #[test]
    fn test_lenient_results_document() {
        let results: JobResults = serde_json::from_value(json!({
            "sequences": [null, {"predictionPayload": {"cif_url": ""}}, {"predictionPayload": {"cif_url": "https://x/1.cif"}}]
        }))
        .unwrap();

        assert_eq!(results.status(), &JobStatus::Unknown);
        assert!(!results.is_complex());
        assert_eq!(results.sequence_cif_urls(), vec!["https://x/1.cif"]);
        assert_eq!(results.complex_cif_url(), None);
    }

    #[test]
    fn test_complex_cif_url_requires_complex_flag() {
        let mut results: JobResults = serde_json::from_value(json!({
            "job": {"status": "COMPLETED", "isComplex": false},
            "predictionPayload": {"cif_url": "https://x/complex.cif"}
        }))
        .unwrap();
        assert_eq!(results.complex_cif_url(), None);

        results.job.is_complex = true;
        assert_eq!(results.complex_cif_url(), Some("https://x/complex.cif"));
    }

    #[test]
    fn test_output_is_the_document_as_sent() {
        let text = r#"{"job":{"status":"COMPLETED","isComplex":true},"parameters":null,"sequences":[],"predictionPayload":{"cif_url":"https://x/c.cif","meanPLLDT":87,"ptm_score":null}}"#;
        let results: JobResults = serde_json::from_str(text).unwrap();

        assert_eq!(serde_json::to_string(&results).unwrap(), text);
        let pretty: Value = serde_json::from_str(&results.to_pretty_json().unwrap()).unwrap();
        assert_eq!(&pretty, results.raw());
        assert_eq!(results.complex_cif_url(), Some("https://x/c.cif"));
    }

    #[test]
    fn test_nulls_and_wrong_types_read_as_absent() {
        let results: JobResults = serde_json::from_value(json!({
            "job": {"status": null, "isComplex": null, "name": 7},
            "sequences": null
        }))
        .unwrap();
        assert_eq!(results.status(), &JobStatus::Unknown);
        assert!(!results.is_complex());
        assert!(results.sequences.is_empty());

        let results: JobResults = serde_json::from_value(json!({
            "job": {"status": "COMPLETED", "isComplex": "yes"},
            "sequences": [
                "garbage",
                {"predictionPayload": {"cif_url": 3, "meanPLLDT": "88.1"}},
                {"predictionPayload": {"cif_url": "https://x/2.cif"}}
            ]
        }))
        .unwrap();
        assert!(!results.is_complex());
        assert_eq!(results.sequences.len(), 3);
        let second = results.sequences[1].prediction_payload.as_ref().unwrap();
        assert_eq!(second.cif_url(), None);
        assert_eq!(second.mean_plddt, Some(json!("88.1")));
        assert_eq!(results.sequence_cif_urls(), vec!["https://x/2.cif"]);
    }

    #[test]
    fn test_empty_payload_is_absent() {
        let results: JobResults = serde_json::from_value(json!({
            "job": {"status": "COMPLETED", "isComplex": true},
            "predictionPayload": {},
            "sequences": [{"predictionPayload": {}}]
        }))
        .unwrap();
        assert!(results.prediction_payload.is_none());
        assert!(results.sequences[0].prediction_payload.is_none());
    }
}
