use serde_json::Value;

use crate::{SkillVector, ValidationError, matching::SkillDimension};

/// リクエスト境界で緩い JSON オブジェクトを固定形状の SkillVector に変換
///
/// The value must be an object carrying at least one numeric dimension.
/// Absent or `null` dimensions default to 0.0; any other non-numeric value is
/// rejected. Unknown keys are ignored.
pub fn parse_skills(value: &Value) -> Result<SkillVector, ValidationError> {
    let Value::Object(map) = value else {
        return Err(ValidationError::invalid(
            "skills object is required with at least one skill dimension",
        ));
    };

    let mut skills = SkillVector::default();
    let mut present = 0;
    for dimension in SkillDimension::ALL {
        match map.get(dimension.as_ref()) {
            None | Some(Value::Null) => {}
            Some(Value::Number(number)) => {
                let parsed = number.as_f64().filter(|v| v.is_finite()).ok_or_else(|| {
                    ValidationError::invalid(format!("skill {dimension} is out of range"))
                })?;
                skills.set(dimension, parsed);
                present += 1;
            }
            Some(_) => {
                return Err(ValidationError::invalid(format!(
                    "skill {dimension} must be a number"
                )));
            }
        }
    }

    if present == 0 {
        return Err(ValidationError::invalid(
            "at least one skill dimension is required (academic skills or github_similarity)",
        ));
    }

    Ok(skills)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn missing_dimensions_default_to_zero() {
        let skills = parse_skills(&json!({"product": 4, "unrelated": "x"})).unwrap();
        assert_eq!(skills, SkillVector::academic(0.0, 0.0, 4.0));
    }

    #[test]
    fn github_only_is_accepted() {
        let skills = parse_skills(&json!({"github_similarity": 0.8})).unwrap();
        assert_eq!(skills.github_similarity, 0.8);
    }

    #[test]
    fn rejects_malformed_skills() {
        for bad in [
            json!(null),
            json!([1, 2, 3]),
            json!({}),
            json!({"product": null}),
            json!({"product": "high"}),
            json!({"systems_infrastructure": 3, "product": true}),
        ] {
            assert!(
                matches!(parse_skills(&bad), Err(ValidationError::InvalidInput(_))),
                "{bad} should be rejected"
            );
        }
    }
}
