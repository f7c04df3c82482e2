//! Text and JSON rendering of command results.

use anyhow::Result;
use roster_core::model::{Class, Student, Teacher};
use serde::Serialize;

/// A command result, prepared in both output forms.
pub struct Rendered {
  json: serde_json::Value,
  text: String,
}

impl Rendered {
  pub fn new<T: Serialize>(value: &T, text: String) -> Result<Self> {
    Ok(Self {
      json: serde_json::to_value(value)?,
      text,
    })
  }

  /// A bare message; JSON output is `{"message": ...}`.
  pub fn message(text: impl Into<String>) -> Self {
    let text = text.into();
    Self {
      json: serde_json::json!({ "message": text }),
      text,
    }
  }

  pub fn render(self, json: bool) -> Result<String> {
    if json {
      Ok(serde_json::to_string_pretty(&self.json)?)
    } else {
      Ok(self.text)
    }
  }
}

// ─── Lines ────────────────────────────────────────────────────────────────────

fn date(at: chrono::DateTime<chrono::Utc>) -> String {
  at.format("%Y-%m-%d").to_string()
}

pub fn teacher_line(t: &Teacher) -> String {
  let contact = t.contact_info.as_deref().unwrap_or("-");
  format!(
    "{}  {}  [{}]  {}  {}  (added {})",
    t.id,
    t.name,
    t.employee_id,
    t.subject,
    contact,
    date(t.created_at)
  )
}

/// `teacher` is the resolved teacher for `c`, if any.
pub fn class_line(c: &Class, teacher: Option<&Teacher>) -> String {
  let taught_by = match (c.teacher_id, teacher) {
    (_, Some(t)) => t.name.clone(),
    (Some(id), None) => format!("unknown teacher {id}"),
    (None, None) => "no teacher".to_string(),
  };
  format!("{}  {}  ({taught_by})", c.id, c.name)
}

pub fn student_line(s: &Student, class: Option<&Class>) -> String {
  let enrolled_in = match (s.class_id, class) {
    (_, Some(c)) => c.name.clone(),
    (Some(id), None) => format!("unknown class {id}"),
    (None, None) => "no class".to_string(),
  };
  format!("{}  {}  [{}]  ({enrolled_in})", s.id, s.name, s.student_id)
}

/// Join `lines`, or return `empty` when there are none.
pub fn list(lines: impl IntoIterator<Item = String>, empty: &str) -> String {
  let joined = lines.into_iter().collect::<Vec<_>>().join("\n");
  if joined.is_empty() {
    empty.to_string()
  } else {
    joined
  }
}
