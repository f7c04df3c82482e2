//! Behavioural tests for `RosterStore` over in-memory and failing backends.

use std::{cell::Cell, rc::Rc};

use uuid::Uuid;

use crate::{
  Error, KeyValueStore, MemoryKv, RosterStore, Summary,
  codec::{CLASSES_KEY, STUDENTS_KEY, TEACHERS_KEY},
  model::{ClassPatch, NewStudent, NewTeacher, StudentPatch, TeacherPatch},
};

fn store() -> RosterStore<MemoryKv> { RosterStore::in_memory() }

fn lee() -> NewTeacher { NewTeacher::new("Ms. Lee", "E1", "Math") }

/// Backend that rejects every write while `failing` is set. The flag is
/// shared so a test can flip it while the store owns the backend.
#[derive(Default)]
struct FlakyKv {
  inner:   MemoryKv,
  failing: Rc<Cell<bool>>,
}

#[derive(Debug, thiserror::Error)]
#[error("quota exceeded")]
struct QuotaExceeded;

impl KeyValueStore for FlakyKv {
  type Error = QuotaExceeded;

  fn load(&self, key: &str) -> Result<Option<String>, QuotaExceeded> {
    Ok(self.inner.get(key).map(str::to_owned))
  }

  fn save(&mut self, key: &str, value: &str) -> Result<(), QuotaExceeded> {
    if self.failing.get() {
      return Err(QuotaExceeded);
    }
    let _ = self.inner.save(key, value);
    Ok(())
  }
}

// ─── Teachers ────────────────────────────────────────────────────────────────

#[test]
fn add_and_get_teacher() {
  let mut s = store();
  let input = lee().with_contact_info("lee@school.example");

  let id = s.add_teacher(input.clone());
  let teacher = s.teacher(id).unwrap();

  assert_eq!(teacher.id, id);
  assert_eq!(teacher.name, input.name);
  assert_eq!(teacher.employee_id, input.employee_id);
  assert_eq!(teacher.subject, input.subject);
  assert_eq!(teacher.contact_info.as_deref(), Some("lee@school.example"));
  assert_eq!(s.teachers().len(), 1);
}

#[test]
fn add_teacher_generates_distinct_ids() {
  let mut s = store();
  let a = s.add_teacher(lee());
  let b = s.add_teacher(lee());
  assert_ne!(a, b);
  // Duplicate employee ids are permitted.
  assert_eq!(s.teachers().len(), 2);
}

#[test]
fn update_teacher_merges_only_given_fields() {
  let mut s = store();
  let id = s.add_teacher(lee());
  let before = s.teacher(id).unwrap().clone();

  s.update_teacher(id, TeacherPatch {
    subject: Some("Physics".into()),
    ..Default::default()
  });

  let after = s.teacher(id).unwrap();
  assert_eq!(after.subject, "Physics");
  assert_eq!(after.name, before.name);
  assert_eq!(after.employee_id, before.employee_id);
  assert_eq!(after.created_at, before.created_at);
  assert_eq!(after.id, before.id);
}

#[test]
fn update_teacher_can_clear_contact_info() {
  let mut s = store();
  let id = s.add_teacher(lee().with_contact_info("555-0100"));

  s.update_teacher(id, TeacherPatch {
    contact_info: Some(None),
    ..Default::default()
  });

  assert_eq!(s.teacher(id).unwrap().contact_info, None);
}

#[test]
fn update_missing_teacher_is_noop() {
  let mut s = store();
  let id = s.add_teacher(lee());
  let before = s.teachers().to_vec();

  s.update_teacher(Uuid::new_v4(), TeacherPatch {
    name: Some("Nobody".into()),
    ..Default::default()
  });

  assert_eq!(s.teachers(), before.as_slice());
  assert!(s.teacher(id).is_some());
}

#[test]
fn delete_teacher_detaches_only_their_classes() {
  let mut s = store();
  let t1 = s.add_teacher(lee());
  let t2 = s.add_teacher(NewTeacher::new("Mr. Ortiz", "E2", "History"));
  let algebra = s.add_class("Algebra");
  let geometry = s.add_class("Geometry");
  let history = s.add_class("History");
  s.assign_teacher_to_class(t1, algebra);
  s.assign_teacher_to_class(t1, geometry);
  s.assign_teacher_to_class(t2, history);

  s.delete_teacher(t1);

  assert!(s.teacher(t1).is_none());
  assert_eq!(s.class(algebra).unwrap().teacher_id, None);
  assert_eq!(s.class(geometry).unwrap().teacher_id, None);
  assert_eq!(s.class(history).unwrap().teacher_id, Some(t2));
  assert_eq!(s.classes().len(), 3);
}

#[test]
fn assign_and_lookup_teacher_by_class() {
  let mut s = store();
  let t1 = s.add_teacher(lee());
  let c1 = s.add_class("Algebra");

  s.assign_teacher_to_class(t1, c1);
  assert_eq!(s.teacher_by_class(c1).map(|t| t.id), Some(t1));

  s.delete_teacher(t1);
  assert_eq!(s.class(c1).unwrap().teacher_id, None);
  assert!(s.teacher_by_class(c1).is_none());
}

#[test]
fn teacher_by_class_misses_either_hop() {
  let mut s = store();
  let unassigned = s.add_class("Art");
  let dangling = s.add_class("Music");
  s.assign_teacher_to_class(Uuid::new_v4(), dangling);

  assert!(s.teacher_by_class(Uuid::new_v4()).is_none());
  assert!(s.teacher_by_class(unassigned).is_none());
  assert!(s.teacher_by_class(dangling).is_none());
}

#[test]
fn remove_teacher_from_class_clears_reference() {
  let mut s = store();
  let t1 = s.add_teacher(lee());
  let c1 = s.add_class("Algebra");
  s.assign_teacher_to_class(t1, c1);

  s.remove_teacher_from_class(c1);

  assert_eq!(s.class(c1).unwrap().teacher_id, None);
  assert!(s.teacher(t1).is_some());
}

#[test]
fn classes_by_teacher_and_assignable_classes() {
  let mut s = store();
  let t1 = s.add_teacher(lee());
  let a = s.add_class("Algebra");
  let b = s.add_class("Biology");
  let c = s.add_class("Calculus");
  s.assign_teacher_to_class(t1, c);
  s.assign_teacher_to_class(t1, a);

  let taught: Vec<_> = s.classes_by_teacher(t1).iter().map(|c| c.id).collect();
  assert_eq!(taught, vec![a, c], "collection order, not assignment order");

  let open: Vec<_> = s.assignable_classes(t1).iter().map(|c| c.id).collect();
  assert_eq!(open, vec![b]);
}

// ─── Classes ─────────────────────────────────────────────────────────────────

#[test]
fn add_class_starts_unassigned() {
  let mut s = store();
  let id = s.add_class("Algebra");
  let class = s.class(id).unwrap();
  assert_eq!(class.name, "Algebra");
  assert_eq!(class.teacher_id, None);
}

#[test]
fn update_class_renames() {
  let mut s = store();
  let id = s.add_class("Algebra");
  let created_at = s.class(id).unwrap().created_at;

  s.update_class(id, ClassPatch {
    name: Some("Algebra II".into()),
    ..Default::default()
  });

  let class = s.class(id).unwrap();
  assert_eq!(class.name, "Algebra II");
  assert_eq!(class.created_at, created_at);
}

#[test]
fn delete_active_class_detaches_students_and_clears_selection() {
  let mut s = store();
  let c1 = s.add_class("Algebra");
  let s1 = s.add_student(NewStudent::new("Ana", "S-001", Some(c1)));
  s.set_active_class_id(Some(c1));
  assert_eq!(s.active_class().map(|c| c.id), Some(c1));

  s.delete_class(c1);

  assert_eq!(s.active_class_id(), None);
  assert_eq!(s.student(s1).unwrap().class_id, None);
  assert!(s.class(c1).is_none());
}

#[test]
fn delete_other_class_keeps_selection() {
  let mut s = store();
  let keep = s.add_class("Algebra");
  let dropped = s.add_class("Biology");
  let moved = s.add_student(NewStudent::new("Ben", "S-002", Some(dropped)));
  let stays = s.add_student(NewStudent::new("Cleo", "S-003", Some(keep)));
  s.set_active_class_id(Some(keep));

  s.delete_class(dropped);

  assert_eq!(s.active_class_id(), Some(keep));
  assert_eq!(s.student(moved).unwrap().class_id, None);
  assert_eq!(s.student(stays).unwrap().class_id, Some(keep));
}

#[test]
fn active_class_resolves_only_existing_classes() {
  let mut s = store();
  s.set_active_class_id(Some(Uuid::new_v4()));
  assert!(s.active_class().is_none());

  s.set_active_class_id(None);
  assert_eq!(s.active_class_id(), None);
}

// ─── Students ────────────────────────────────────────────────────────────────

#[test]
fn transfer_student_moves_between_classes() {
  let mut s = store();
  let x = s.add_class("Algebra");
  let y = s.add_class("Biology");
  let st = s.add_student(NewStudent::new("Ana", "S-001", Some(x)));

  s.transfer_student(st, y);

  assert!(s.students_by_class(y).iter().any(|s| s.id == st));
  assert!(s.students_by_class(x).is_empty());
}

#[test]
fn transfer_targets_exclude_current_class() {
  let mut s = store();
  let x = s.add_class("Algebra");
  let y = s.add_class("Biology");
  let z = s.add_class("Chemistry");
  let st = s.add_student(NewStudent::new("Ana", "S-001", Some(y)));

  let targets: Vec<_> = s.transfer_targets(st).iter().map(|c| c.id).collect();
  assert_eq!(targets, vec![x, z]);
  assert!(s.transfer_targets(Uuid::new_v4()).is_empty());
}

#[test]
fn update_student_changes_only_name() {
  let mut s = store();
  let c1 = s.add_class("Algebra");
  let id = s.add_student(NewStudent::new("Ana", "S-001", Some(c1)));
  let before = s.student(id).unwrap().clone();

  s.update_student(id, StudentPatch {
    name: Some("X".into()),
    ..Default::default()
  });

  let after = s.student(id).unwrap();
  assert_eq!(after.name, "X");
  assert_eq!(after.student_id, before.student_id);
  assert_eq!(after.class_id, before.class_id);
  assert_eq!(after.created_at, before.created_at);
  assert_eq!(after.id, before.id);
}

#[test]
fn delete_student_removes_only_that_student() {
  let mut s = store();
  let c1 = s.add_class("Algebra");
  let a = s.add_student(NewStudent::new("Ana", "S-001", Some(c1)));
  let b = s.add_student(NewStudent::new("Ben", "S-001", Some(c1)));

  s.delete_student(a);

  assert!(s.student(a).is_none());
  assert!(s.student(b).is_some());
  assert!(s.class(c1).is_some());
  s.delete_student(a);
  assert_eq!(s.students().len(), 1);
}

#[test]
fn summary_counts_each_collection() {
  let mut s = store();
  s.add_teacher(lee());
  let c1 = s.add_class("Algebra");
  s.add_class("Biology");
  s.add_student(NewStudent::new("Ana", "S-001", Some(c1)));
  s.add_student(NewStudent::new("Ben", "S-002", Some(c1)));
  s.add_student(NewStudent::new("Cleo", "S-003", None));

  assert_eq!(s.summary(), Summary {
    teachers: 1,
    classes:  2,
    students: 3,
  });
}

// ─── Persistence ─────────────────────────────────────────────────────────────

#[test]
fn reopen_restores_collections_and_resets_selection() {
  let mut s = store();
  let t1 = s.add_teacher(lee().with_contact_info("555-0100"));
  let c1 = s.add_class("Algebra");
  let c2 = s.add_class("Biology");
  s.assign_teacher_to_class(t1, c1);
  s.add_student(NewStudent::new("Ana", "S-001", Some(c1)));
  s.add_student(NewStudent::new("Ben", "S-002", Some(c2)));
  s.set_active_class_id(Some(c1));

  let teachers = s.teachers().to_vec();
  let classes = s.classes().to_vec();
  let students = s.students().to_vec();

  let reopened = RosterStore::open(s.into_kv()).unwrap();

  assert_eq!(reopened.teachers(), teachers.as_slice());
  assert_eq!(reopened.classes(), classes.as_slice());
  assert_eq!(reopened.students(), students.as_slice());
  assert_eq!(reopened.active_class_id(), None);
}

#[test]
fn cascade_detach_survives_reopen() {
  let mut s = store();
  let t1 = s.add_teacher(lee());
  let c1 = s.add_class("Algebra");
  s.assign_teacher_to_class(t1, c1);
  let s1 = s.add_student(NewStudent::new("Ana", "S-001", Some(c1)));

  s.delete_teacher(t1);
  let mut s = RosterStore::open(s.into_kv()).unwrap();
  assert!(s.teacher(t1).is_none());
  assert_eq!(s.class(c1).unwrap().teacher_id, None);

  s.delete_class(c1);
  let s = RosterStore::open(s.into_kv()).unwrap();
  assert!(s.class(c1).is_none());
  assert_eq!(s.student(s1).unwrap().class_id, None);
}

#[test]
fn open_with_absent_keys_starts_empty() {
  let s = RosterStore::open(MemoryKv::new()).unwrap();
  assert_eq!(s.summary(), Summary {
    teachers: 0,
    classes:  0,
    students: 0,
  });
}

#[test]
fn each_mutation_rewrites_only_touched_collections() {
  let mut s = store();
  s.add_class("Algebra");
  assert!(s.kv().get(CLASSES_KEY).is_some());
  assert!(s.kv().get(TEACHERS_KEY).is_none());
  assert!(s.kv().get(STUDENTS_KEY).is_none());

  let t1 = s.add_teacher(lee());
  s.delete_teacher(t1);
  assert_eq!(s.kv().get(TEACHERS_KEY), Some("[]"));
}

#[test]
fn stored_records_use_camel_case_and_null_references() {
  let mut s = store();
  let c1 = s.add_class("Algebra");
  s.add_student(NewStudent::new("Ana", "S-001", None));

  let classes: serde_json::Value =
    serde_json::from_str(s.kv().get(CLASSES_KEY).unwrap()).unwrap();
  assert_eq!(classes[0]["id"], c1.to_string());
  assert!(classes[0]["teacherId"].is_null());
  assert!(classes[0]["createdAt"].is_string());

  let students: serde_json::Value =
    serde_json::from_str(s.kv().get(STUDENTS_KEY).unwrap()).unwrap();
  assert_eq!(students[0]["studentId"], "S-001");
  assert!(students[0]["classId"].is_null());
}

#[test]
fn open_accepts_records_without_optional_fields() {
  let mut kv = MemoryKv::new();
  let raw = r#"[{"id":"6f1c2a8e-3d4b-4c5a-9e7f-0a1b2c3d4e5f","name":"Algebra","createdAt":"2024-09-01T08:00:00.000Z"}]"#;
  let _ = kv.save(CLASSES_KEY, raw);

  let s = RosterStore::open(kv).unwrap();
  assert_eq!(s.classes().len(), 1);
  assert_eq!(s.classes()[0].teacher_id, None);
}

#[test]
fn open_rejects_corrupt_collection() {
  let mut kv = MemoryKv::new();
  let _ = kv.save(STUDENTS_KEY, "{not json");

  let result = RosterStore::open(kv);
  assert!(matches!(result, Err(Error::Decode {
    key: STUDENTS_KEY,
    ..
  })));
}

#[test]
fn failed_write_keeps_in_memory_state() {
  let kv = FlakyKv::default();
  let failing = kv.failing.clone();
  let mut s = RosterStore::open(kv).unwrap();
  let c1 = s.add_class("Algebra");
  assert!(s.last_persist_error().is_none());

  failing.set(true);
  let c2 = s.add_class("Biology");

  assert!(s.class(c2).is_some(), "mutation commits despite failed write");
  assert!(matches!(
    s.last_persist_error(),
    Some(Error::Backend { key: CLASSES_KEY, .. })
  ));

  // The durable copy lags behind.
  let stored = s.kv().inner.get(CLASSES_KEY).unwrap();
  assert!(stored.contains(&c1.to_string()));
  assert!(!stored.contains(&c2.to_string()));
}

#[test]
fn next_successful_write_carries_state_forward() {
  let kv = FlakyKv::default();
  let failing = kv.failing.clone();
  let mut s = RosterStore::open(kv).unwrap();

  failing.set(true);
  let c1 = s.add_class("Algebra");
  assert!(s.last_persist_error().is_some());
  assert!(s.kv().inner.get(CLASSES_KEY).is_none());

  failing.set(false);
  let c2 = s.add_class("Biology");

  assert!(s.last_persist_error().is_none());
  let stored = s.kv().inner.get(CLASSES_KEY).unwrap();
  assert!(stored.contains(&c1.to_string()));
  assert!(stored.contains(&c2.to_string()));
}

#[test]
fn failed_cascade_write_still_detaches() {
  let kv = FlakyKv::default();
  let failing = kv.failing.clone();
  let mut s = RosterStore::open(kv).unwrap();
  let t1 = s.add_teacher(lee());
  let c1 = s.add_class("Algebra");
  s.assign_teacher_to_class(t1, c1);

  failing.set(true);
  s.delete_teacher(t1);

  assert!(s.teacher(t1).is_none());
  assert_eq!(s.class(c1).unwrap().teacher_id, None);
  assert!(s.last_persist_error().is_some());
}
