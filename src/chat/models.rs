//! The core models for a stateful conversation with the therapist
//! model.
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::openai::Role;

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct Message {
    pub id: String,
    pub role: Role,
    pub content: String,
    pub created_at: DateTime<Utc>,
}

impl Message {
    pub fn new(role: Role, content: &str) -> Self {
        Self {
            id: Uuid::new_v4().to_string(),
            role,
            content: content.to_string(),
            created_at: Utc::now(),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct Diagnosis {
    pub emotions: Vec<String>,
    pub conditions: Vec<String>,
    // Expected 1-5 and 0-100 respectively but both come straight from
    // model output and are not clamped
    pub severity: i64,
    pub confidence: i64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TherapyPlan {
    pub strategies: Vec<String>,
}

/// Where a session is in its lifecycle. Derived from the session
/// fields rather than stored.
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Phase {
    Active,
    Diagnosed,
    Concluded,
}

#[derive(Clone, Debug, Serialize)]
pub struct Session {
    pub id: String,
    pub messages: Vec<Message>,
    pub diagnosis: Option<Diagnosis>,
    pub therapy_plan: TherapyPlan,
    pub completed: bool,
}

impl Session {
    pub fn new(id: &str) -> Self {
        Self {
            id: id.to_string(),
            messages: Vec::new(),
            diagnosis: None,
            therapy_plan: TherapyPlan::default(),
            completed: false,
        }
    }

    pub fn phase(&self) -> Phase {
        if self.completed {
            Phase::Concluded
        } else if self.diagnosis.is_some() {
            Phase::Diagnosed
        } else {
            Phase::Active
        }
    }
}

/// Profile of a person using the service. Not created or read by any
/// endpoint yet.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct UserProfile {
    pub id: String,
    pub name: String,
    pub age: u32,
    pub gender: String,
    pub session_ids: Vec<String>,
}
