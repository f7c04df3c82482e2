//! Record types for the three roster collections.
//!
//! Cross-collection links (`Class::teacher_id`, `Student::class_id`) are weak
//! references: plain optional ids, never owning pointers. A dangling id is a
//! valid state that the store repairs by cascading detach on delete.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// ─── Teacher ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Teacher {
  pub id:           Uuid,
  pub name:         String,
  pub employee_id:  String,
  pub subject:      String,
  #[serde(default)]
  pub contact_info: Option<String>,
  /// Store-assigned; never changes after creation.
  pub created_at:   DateTime<Utc>,
}

/// Input to [`crate::RosterStore::add_teacher`]. The id and `created_at` are
/// always set by the store.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewTeacher {
  pub name:         String,
  pub employee_id:  String,
  pub subject:      String,
  pub contact_info: Option<String>,
}

impl NewTeacher {
  pub fn new(
    name: impl Into<String>,
    employee_id: impl Into<String>,
    subject: impl Into<String>,
  ) -> Self {
    Self {
      name:         name.into(),
      employee_id:  employee_id.into(),
      subject:      subject.into(),
      contact_info: None,
    }
  }

  pub fn with_contact_info(mut self, contact_info: impl Into<String>) -> Self {
    self.contact_info = Some(contact_info.into());
    self
  }

  pub(crate) fn into_teacher(self, id: Uuid, created_at: DateTime<Utc>) -> Teacher {
    Teacher {
      id,
      name: self.name,
      employee_id: self.employee_id,
      subject: self.subject,
      contact_info: self.contact_info,
      created_at,
    }
  }
}

/// A shallow partial update. Only fields set to `Some` are written.
///
/// `contact_info: Some(None)` clears the contact info.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TeacherPatch {
  pub name:         Option<String>,
  pub employee_id:  Option<String>,
  pub subject:      Option<String>,
  pub contact_info: Option<Option<String>>,
}

impl TeacherPatch {
  pub fn apply(self, teacher: &mut Teacher) {
    if let Some(name) = self.name {
      teacher.name = name;
    }
    if let Some(employee_id) = self.employee_id {
      teacher.employee_id = employee_id;
    }
    if let Some(subject) = self.subject {
      teacher.subject = subject;
    }
    if let Some(contact_info) = self.contact_info {
      teacher.contact_info = contact_info;
    }
  }
}

// ─── Class ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Class {
  pub id:         Uuid,
  pub name:       String,
  /// Weak reference to a [`Teacher`]; `None` when unassigned.
  #[serde(default)]
  pub teacher_id: Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClassPatch {
  pub name:       Option<String>,
  pub teacher_id: Option<Option<Uuid>>,
}

impl ClassPatch {
  pub fn apply(self, class: &mut Class) {
    if let Some(name) = self.name {
      class.name = name;
    }
    if let Some(teacher_id) = self.teacher_id {
      class.teacher_id = teacher_id;
    }
  }
}

// ─── Student ─────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Student {
  pub id:         Uuid,
  pub name:       String,
  /// User-facing label such as a roll number. Not guaranteed unique.
  pub student_id: String,
  /// Weak reference to a [`Class`]; `None` when unenrolled.
  #[serde(default)]
  pub class_id:   Option<Uuid>,
  pub created_at: DateTime<Utc>,
}

/// Input to [`crate::RosterStore::add_student`].
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct NewStudent {
  pub name:       String,
  pub student_id: String,
  pub class_id:   Option<Uuid>,
}

impl NewStudent {
  pub fn new(
    name: impl Into<String>,
    student_id: impl Into<String>,
    class_id: Option<Uuid>,
  ) -> Self {
    Self {
      name: name.into(),
      student_id: student_id.into(),
      class_id,
    }
  }

  pub(crate) fn into_student(self, id: Uuid, created_at: DateTime<Utc>) -> Student {
    Student {
      id,
      name: self.name,
      student_id: self.student_id,
      class_id: self.class_id,
      created_at,
    }
  }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct StudentPatch {
  pub name:       Option<String>,
  pub student_id: Option<String>,
  pub class_id:   Option<Option<Uuid>>,
}

impl StudentPatch {
  pub fn apply(self, student: &mut Student) {
    if let Some(name) = self.name {
      student.name = name;
    }
    if let Some(student_id) = self.student_id {
      student.student_id = student_id;
    }
    if let Some(class_id) = self.class_id {
      student.class_id = class_id;
    }
  }
}
