//! Content-based hashing for run IDs.

use crate::ResultsResult;
use crate::types::RunType;
use serde::Serialize;
use sha2::{Digest, Sha256};

/// Run id from everything that determines a run's output.
///
/// `inputs` is any serializable description of the component and its driving
/// profile; identical inputs, run type and engine version give identical ids.
pub fn compute_run_id<T: Serialize + ?Sized>(
    inputs: &T,
    run_type: &RunType,
    engine_version: &str,
) -> ResultsResult<String> {
    let mut hasher = Sha256::new();

    let inputs_json = serde_json::to_string(inputs)?;
    hasher.update(inputs_json.as_bytes());

    let run_type_json = serde_json::to_string(run_type)?;
    hasher.update(run_type_json.as_bytes());

    hasher.update(engine_version.as_bytes());

    let result = hasher.finalize();
    Ok(format!("{:x}", result))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Serialize)]
    struct Inputs {
        id: &'static str,
        p_out_rated: f64,
    }

    const PROFILE: RunType = RunType::Profile {
        ts_min: 1.0,
        steps: 180,
    };

    #[test]
    fn hash_stability() {
        let inputs = Inputs {
            id: "sofc",
            p_out_rated: 2000.0,
        };
        let hash1 = compute_run_id(&inputs, &PROFILE, "v1").unwrap();
        let hash2 = compute_run_id(&inputs, &PROFILE, "v1").unwrap();
        assert_eq!(hash1, hash2);
        assert_eq!(hash1.len(), 64);
    }

    #[test]
    fn hash_differs_for_different_inputs() {
        let a = Inputs {
            id: "sofc",
            p_out_rated: 2000.0,
        };
        let b = Inputs {
            id: "sofc",
            p_out_rated: 1000.0,
        };
        let stationary = RunType::Stationary {
            ts_min: 1.0,
            points: 11,
        };

        let base = compute_run_id(&a, &PROFILE, "v1").unwrap();
        assert_ne!(base, compute_run_id(&b, &PROFILE, "v1").unwrap());
        assert_ne!(base, compute_run_id(&a, &stationary, "v1").unwrap());
        assert_ne!(base, compute_run_id(&a, &PROFILE, "v2").unwrap());
    }
}
