//! [`RosterStore`] — the relational state store for teachers, classes and
//! students.
//!
//! The store owns all three collections and the active class selection. Every
//! mutation goes through a `&mut self` method that applies the change in
//! memory, runs any cascade, and then rewrites each touched collection to the
//! injected [`KeyValueStore`]. Queries hand out shared borrows in insertion
//! order.
//!
//! Mutations are total: an unknown id turns the call into a no-op. A failed
//! write never rolls back the in-memory change; it is logged and kept in
//! [`RosterStore::last_persist_error`] until the next fully successful write.

use chrono::Utc;
use serde::Serialize;
use uuid::Uuid;

use crate::{
  Error, KeyValueStore, MemoryKv, Result,
  codec::{CLASSES_KEY, STUDENTS_KEY, TEACHERS_KEY, load_collection, save_collection},
  model::{
    Class, ClassPatch, NewStudent, NewTeacher, Student, StudentPatch, Teacher,
    TeacherPatch,
  },
};

// ─── Summary ─────────────────────────────────────────────────────────────────

/// Collection totals shown on the dashboard.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Summary {
  pub teachers: usize,
  pub classes:  usize,
  pub students: usize,
}

// ─── Store ───────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Collection {
  Teachers,
  Classes,
  Students,
}

pub struct RosterStore<K> {
  kv:                 K,
  teachers:           Vec<Teacher>,
  classes:            Vec<Class>,
  students:           Vec<Student>,
  /// Class focused by the student view. Never persisted.
  active_class_id:    Option<Uuid>,
  last_persist_error: Option<Error>,
}

impl RosterStore<MemoryKv> {
  /// An empty store over a fresh [`MemoryKv`] — useful for testing.
  pub fn in_memory() -> Self {
    Self {
      kv:                 MemoryKv::new(),
      teachers:           Vec::new(),
      classes:            Vec::new(),
      students:           Vec::new(),
      active_class_id:    None,
      last_persist_error: None,
    }
  }
}

impl<K: KeyValueStore> RosterStore<K> {
  /// Restore all three collections from `kv`. Absent keys start empty; the
  /// active selection always starts empty.
  pub fn open(kv: K) -> Result<Self> {
    let teachers: Vec<Teacher> = load_collection(&kv, TEACHERS_KEY)?;
    let classes: Vec<Class> = load_collection(&kv, CLASSES_KEY)?;
    let students: Vec<Student> = load_collection(&kv, STUDENTS_KEY)?;

    tracing::debug!(
      teachers = teachers.len(),
      classes = classes.len(),
      students = students.len(),
      "loaded roster"
    );

    Ok(Self {
      kv,
      teachers,
      classes,
      students,
      active_class_id: None,
      last_persist_error: None,
    })
  }

  pub fn kv(&self) -> &K { &self.kv }

  /// Give up the store and hand back the persistence backend.
  pub fn into_kv(self) -> K { self.kv }

  /// The error from the most recent mutation whose write failed, if the
  /// latest mutation did not fully succeed.
  pub fn last_persist_error(&self) -> Option<&Error> {
    self.last_persist_error.as_ref()
  }

  fn persist(&mut self, collections: &[Collection]) {
    let mut failure = None;

    for collection in collections {
      let result = match collection {
        Collection::Teachers => {
          save_collection(&mut self.kv, TEACHERS_KEY, &self.teachers)
        }
        Collection::Classes => {
          save_collection(&mut self.kv, CLASSES_KEY, &self.classes)
        }
        Collection::Students => {
          save_collection(&mut self.kv, STUDENTS_KEY, &self.students)
        }
      };

      if let Err(error) = result {
        tracing::warn!(%error, "roster write failed; in-memory state kept");
        failure = Some(error);
      }
    }

    self.last_persist_error = failure;
  }

  // ── Snapshots ─────────────────────────────────────────────────────────

  pub fn teachers(&self) -> &[Teacher] { &self.teachers }

  pub fn classes(&self) -> &[Class] { &self.classes }

  pub fn students(&self) -> &[Student] { &self.students }

  pub fn summary(&self) -> Summary {
    Summary {
      teachers: self.teachers.len(),
      classes:  self.classes.len(),
      students: self.students.len(),
    }
  }

  // ── Teachers ──────────────────────────────────────────────────────────

  /// Append a new teacher and return its generated id. Fields are stored as
  /// given; callers validate them beforehand.
  pub fn add_teacher(&mut self, data: NewTeacher) -> Uuid {
    let id = Uuid::new_v4();
    self.teachers.push(data.into_teacher(id, Utc::now()));
    tracing::debug!(%id, "added teacher");
    self.persist(&[Collection::Teachers]);
    id
  }

  pub fn update_teacher(&mut self, id: Uuid, patch: TeacherPatch) {
    if let Some(teacher) = self.teachers.iter_mut().find(|t| t.id == id) {
      patch.apply(teacher);
    }
    self.persist(&[Collection::Teachers]);
  }

  /// Remove a teacher and detach it from every class that referenced it.
  pub fn delete_teacher(&mut self, id: Uuid) {
    let mut detached = 0usize;
    for class in self.classes.iter_mut().filter(|c| c.teacher_id == Some(id)) {
      class.teacher_id = None;
      detached += 1;
    }
    self.teachers.retain(|t| t.id != id);
    tracing::debug!(%id, detached, "deleted teacher");
    self.persist(&[Collection::Classes, Collection::Teachers]);
  }

  /// Point `class_id` at `teacher_id`. The teacher is not checked for
  /// existence.
  pub fn assign_teacher_to_class(&mut self, teacher_id: Uuid, class_id: Uuid) {
    if let Some(class) = self.class_mut(class_id) {
      class.teacher_id = Some(teacher_id);
    }
    self.persist(&[Collection::Classes]);
  }

  pub fn remove_teacher_from_class(&mut self, class_id: Uuid) {
    if let Some(class) = self.class_mut(class_id) {
      class.teacher_id = None;
    }
    self.persist(&[Collection::Classes]);
  }

  pub fn classes_by_teacher(&self, teacher_id: Uuid) -> Vec<&Class> {
    self
      .classes
      .iter()
      .filter(|c| c.teacher_id == Some(teacher_id))
      .collect()
  }

  /// Classes that could still be assigned to `teacher_id`, i.e. every class
  /// not already taught by them.
  pub fn assignable_classes(&self, teacher_id: Uuid) -> Vec<&Class> {
    self
      .classes
      .iter()
      .filter(|c| c.teacher_id != Some(teacher_id))
      .collect()
  }

  pub fn teacher(&self, id: Uuid) -> Option<&Teacher> {
    self.teachers.iter().find(|t| t.id == id)
  }

  /// Resolve class → teacher id → teacher. `None` if either hop is missing.
  pub fn teacher_by_class(&self, class_id: Uuid) -> Option<&Teacher> {
    self
      .class(class_id)?
      .teacher_id
      .and_then(|teacher_id| self.teacher(teacher_id))
  }

  // ── Classes ───────────────────────────────────────────────────────────

  pub fn add_class(&mut self, name: impl Into<String>) -> Uuid {
    let id = Uuid::new_v4();
    self.classes.push(Class {
      id,
      name: name.into(),
      teacher_id: None,
      created_at: Utc::now(),
    });
    tracing::debug!(%id, "added class");
    self.persist(&[Collection::Classes]);
    id
  }

  pub fn update_class(&mut self, id: Uuid, patch: ClassPatch) {
    if let Some(class) = self.class_mut(id) {
      patch.apply(class);
    }
    self.persist(&[Collection::Classes]);
  }

  /// Remove a class, unenroll its students, and drop it from the active
  /// selection if it was selected.
  pub fn delete_class(&mut self, id: Uuid) {
    let mut detached = 0usize;
    for student in self.students.iter_mut().filter(|s| s.class_id == Some(id)) {
      student.class_id = None;
      detached += 1;
    }
    self.classes.retain(|c| c.id != id);
    if self.active_class_id == Some(id) {
      self.active_class_id = None;
    }
    tracing::debug!(%id, detached, "deleted class");
    self.persist(&[Collection::Students, Collection::Classes]);
  }

  pub fn class(&self, id: Uuid) -> Option<&Class> {
    self.classes.iter().find(|c| c.id == id)
  }

  fn class_mut(&mut self, id: Uuid) -> Option<&mut Class> {
    self.classes.iter_mut().find(|c| c.id == id)
  }

  // ── Active selection ──────────────────────────────────────────────────

  pub fn active_class_id(&self) -> Option<Uuid> { self.active_class_id }

  pub fn set_active_class_id(&mut self, id: Option<Uuid>) {
    self.active_class_id = id;
  }

  /// The selected class, if one is selected and still exists.
  pub fn active_class(&self) -> Option<&Class> {
    self.active_class_id.and_then(|id| self.class(id))
  }

  // ── Students ──────────────────────────────────────────────────────────

  pub fn add_student(&mut self, data: NewStudent) -> Uuid {
    let id = Uuid::new_v4();
    self.students.push(data.into_student(id, Utc::now()));
    tracing::debug!(%id, "added student");
    self.persist(&[Collection::Students]);
    id
  }

  pub fn update_student(&mut self, id: Uuid, patch: StudentPatch) {
    if let Some(student) = self.student_mut(id) {
      patch.apply(student);
    }
    self.persist(&[Collection::Students]);
  }

  pub fn delete_student(&mut self, id: Uuid) {
    self.students.retain(|s| s.id != id);
    self.persist(&[Collection::Students]);
  }

  /// Move a student to `new_class_id`. The target class is not checked for
  /// existence.
  pub fn transfer_student(&mut self, student_id: Uuid, new_class_id: Uuid) {
    if let Some(student) = self.student_mut(student_id) {
      student.class_id = Some(new_class_id);
    }
    self.persist(&[Collection::Students]);
  }

  pub fn students_by_class(&self, class_id: Uuid) -> Vec<&Student> {
    self
      .students
      .iter()
      .filter(|s| s.class_id == Some(class_id))
      .collect()
  }

  /// Classes a student could be moved to: all classes except their current
  /// one. Empty if the student does not exist.
  pub fn transfer_targets(&self, student_id: Uuid) -> Vec<&Class> {
    let Some(student) = self.student(student_id) else {
      return Vec::new();
    };
    self
      .classes
      .iter()
      .filter(|c| student.class_id != Some(c.id))
      .collect()
  }

  pub fn student(&self, id: Uuid) -> Option<&Student> {
    self.students.iter().find(|s| s.id == id)
  }

  fn student_mut(&mut self, id: Uuid) -> Option<&mut Student> {
    self.students.iter_mut().find(|s| s.id == id)
  }
}
