use serde::{Deserialize, Serialize};

use crate::error::{EmiError, EmiResult};

/// Upper bound on the installments a single request may generate.
/// 100 years of monthly installments.
pub const DEFAULT_MAX_INSTALLMENTS: u32 = 1200;

/// Bounds applied to loan requests before any schedule is built.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct ScheduleLimits {
    pub max_installments: u32,
}

impl Default for ScheduleLimits {
    fn default() -> Self {
        ScheduleLimits {
            max_installments: DEFAULT_MAX_INSTALLMENTS,
        }
    }
}

impl ScheduleLimits {
    /// Reads limits from a JSON document; missing keys keep their defaults.
    pub fn from_json(json: &str) -> anyhow::Result<Self> {
        let limits: ScheduleLimits = serde_json::from_str(json)?;
        if limits.max_installments == 0 {
            anyhow::bail!("maxInstallments must be greater than zero");
        }
        Ok(limits)
    }

    pub(crate) fn check_installments(&self, installment_count: u32) -> EmiResult<()> {
        if installment_count > self.max_installments {
            return Err(EmiError::invalid(
                "termValue",
                format!(
                    "{installment_count} installments exceeds the limit of {}",
                    self.max_installments
                ),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        let limits = ScheduleLimits::default();
        assert_eq!(limits.max_installments, 1200);
        assert!(limits.check_installments(1200).is_ok());
        assert_eq!(limits.check_installments(1201).unwrap_err().field(), Some("termValue"));
    }

    #[test]
    fn test_from_json() {
        let limits = ScheduleLimits::from_json(r#"{"maxInstallments": 60}"#).unwrap();
        assert_eq!(limits.max_installments, 60);

        let defaults = ScheduleLimits::from_json("{}").unwrap();
        assert_eq!(defaults, ScheduleLimits::default());
    }

    #[test]
    fn test_from_json_rejects_zero() {
        assert!(ScheduleLimits::from_json(r#"{"maxInstallments": 0}"#).is_err());
        assert!(ScheduleLimits::from_json("not json").is_err());
    }
}
