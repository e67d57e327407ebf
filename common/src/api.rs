use serde::{Deserialize, Deserializer, Serialize, Serializer};
use serde_json::Value;
use crate::error::{Error, Result};
use crate::job::JobId;

/// Body of `POST /v1/jobs`.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CreateJobRequest {
    pub name: String,
    pub sequences: Vec<SequenceInput>,
    pub params: JobParams,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SequenceInput {
    #[serde(rename = "proteinChain")]
    pub protein_chain: ProteinChain,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ProteinChain {
    pub sequence: String,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct JobParams {
    #[serde(rename = "modelName")]
    pub model_name: String,
}

impl CreateJobRequest {
    /// A single-chain protein job.
    pub fn protein(name: &str, sequence: &str, model_name: &str) -> Self {
        Self {
            name: name.to_string(),
            sequences: vec![SequenceInput {
                protein_chain: ProteinChain {
                    sequence: sequence.to_string(),
                },
            }],
            params: JobParams {
                model_name: model_name.to_string(),
            },
        }
    }

    /// Reject requests the server would refuse anyway.
    pub fn validate(&self) -> Result<()> {
        if self.name.trim().is_empty() {
            return Err(Error::InvalidInput("job name must not be empty".to_string()));
        }
        if self.params.model_name.trim().is_empty() {
            return Err(Error::InvalidInput("model name must not be empty".to_string()));
        }
        for seq in &self.sequences {
            let sequence = &seq.protein_chain.sequence;
            if sequence.trim().is_empty() {
                return Err(Error::InvalidInput("sequence must not be empty".to_string()));
            }
        }
        Ok(())
    }
}

/// Reply to `POST /v1/jobs`. Serializes back to exactly what the server
/// sent.
#[derive(Debug, Clone)]
pub struct CreateJobResponse {
    pub job_id: Option<JobId>,
    raw: Value,
}

impl CreateJobResponse {
    pub fn raw(&self) -> &Value {
        &self.raw
    }
}

impl<'de> Deserialize<'de> for CreateJobResponse {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> std::result::Result<Self, D::Error> {
        let raw = Value::deserialize(deserializer)?;
        let job_id = match raw.get("jobId") {
            Some(Value::String(id)) if !id.is_empty() => Some(JobId(id.clone())),
            _ => None,
        };
        Ok(Self { job_id, raw })
    }
}

impl Serialize for CreateJobResponse {
    fn serialize<S: Serializer>(&self, serializer: S) -> std::result::Result<S::Ok, S::Error> {
        self.raw.serialize(serializer)
    }
}

/// Error payload the API attaches to 400/429 responses.
#[derive(Debug, Deserialize)]
pub(crate) struct ApiErrorBody {
    pub message: Option<String>,
}
