//! Small pure helpers shared by the generator call paths.

use lmgen_utils::ModelKwargs;

/// Merge per-call model kwargs over the generator's defaults.
///
/// Neither input is mutated. Keys present in `overrides` win over keys in
/// `defaults`; everything else passes through unchanged.
#[must_use]
pub fn compose_model_kwargs(defaults: &ModelKwargs, overrides: &ModelKwargs) -> ModelKwargs {
    let mut combined = defaults.clone();
    for (key, value) in overrides {
        combined.insert(key.clone(), value.clone());
    }
    combined
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn kwargs(pairs: &[(&str, serde_json::Value)]) -> ModelKwargs {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    #[test]
    fn test_overrides_win() {
        let defaults = kwargs(&[("model", json!("gpt-4o")), ("temperature", json!(0.2))]);
        let overrides = kwargs(&[("temperature", json!(0.9))]);
        let combined = compose_model_kwargs(&defaults, &overrides);
        assert_eq!(combined["model"], json!("gpt-4o"));
        assert_eq!(combined["temperature"], json!(0.9));
    }

    #[test]
    fn test_empty_overrides_is_identity() {
        let defaults = kwargs(&[("model", json!("gpt-4o"))]);
        let combined = compose_model_kwargs(&defaults, &ModelKwargs::new());
        assert_eq!(combined, defaults);
    }

    #[test]
    fn test_inputs_unchanged() {
        let defaults = kwargs(&[("model", json!("a"))]);
        let overrides = kwargs(&[("model", json!("b"))]);
        let _ = compose_model_kwargs(&defaults, &overrides);
        assert_eq!(defaults["model"], json!("a"));
        assert_eq!(overrides["model"], json!("b"));
    }
}
