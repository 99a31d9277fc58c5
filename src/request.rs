use serde_json::Value;

use crate::error::InputError;
use crate::observation::{Observation, SiteInfo};

/// A validated report request: a non-empty observation list plus site context.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReportRequest {
    observations: Vec<Observation>,
    pub site: SiteInfo,
}

impl ReportRequest {
    pub fn new(observations: Vec<Observation>, site: SiteInfo) -> Result<Self, InputError> {
        if observations.is_empty() {
            return Err(InputError::EmptyObservations);
        }
        Ok(Self { observations, site })
    }

    pub fn from_json(body: &str) -> Result<Self, InputError> {
        let v: Value = serde_json::from_str(body)?;
        Self::from_value(&v)
    }

    pub fn from_value(v: &Value) -> Result<Self, InputError> {
        let obj = v.as_object().ok_or(InputError::NotAnObject)?;
        let list = match obj.get("observations") {
            None | Some(Value::Null) => return Err(InputError::MissingObservations),
            Some(Value::Array(items)) => items,
            Some(_) => return Err(InputError::ObservationsNotList),
        };
        // Elements that are not objects still count, with every field defaulted
        let observations: Vec<Observation> = list
            .iter()
            .map(|item| match item {
                Value::Object(_) => serde_json::from_value(item.clone()).unwrap_or_default(),
                _ => Observation::default(),
            })
            .collect();
        let site = match obj.get("siteInfo") {
            Some(s @ Value::Object(_)) => serde_json::from_value(s.clone()).unwrap_or_default(),
            _ => SiteInfo::default(),
        };
        Self::new(observations, site)
    }

    pub fn observations(&self) -> &[Observation] {
        &self.observations
    }
}
