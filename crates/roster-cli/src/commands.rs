//! Subcommands and their execution against a [`RosterStore`].
//!
//! This layer stands in for the forms of a graphical front end: it checks that
//! required fields are filled in and that referenced records exist before it
//! calls the store, which itself accepts anything.

use anyhow::{Result, bail};
use clap::{Args, Subcommand};
use roster_core::{
  KeyValueStore, RosterStore,
  model::{
    Class, ClassPatch, NewStudent, NewTeacher, Student, StudentPatch, Teacher,
    TeacherPatch,
  },
};
use serde::Serialize;
use uuid::Uuid;

use crate::output::{Rendered, class_line, list, student_line, teacher_line};

// ─── Command tree ─────────────────────────────────────────────────────────────

#[derive(Subcommand, Debug)]
pub enum Command {
  /// Show how many teachers, classes and students are on record.
  Summary,
  /// Manage teachers and their class assignments.
  #[command(subcommand)]
  Teacher(TeacherCommand),
  /// Manage classes.
  #[command(subcommand)]
  Class(ClassCommand),
  /// Manage students and transfers.
  #[command(subcommand)]
  Student(StudentCommand),
}

#[derive(Subcommand, Debug)]
pub enum TeacherCommand {
  Add(TeacherFields),
  Edit {
    id: Uuid,
    #[command(flatten)]
    fields: TeacherEdit,
  },
  Delete { id: Uuid },
  /// Show a teacher with the classes they teach.
  Show { id: Uuid },
  List,
  /// Make a teacher the teacher of a class, replacing any previous one.
  Assign { teacher: Uuid, class: Uuid },
  /// Leave a class without a teacher.
  Unassign { class: Uuid },
  /// List the classes a teacher teaches.
  Classes {
    teacher:    Uuid,
    /// List the classes they could still be assigned instead.
    #[arg(long)]
    assignable: bool,
  },
}

#[derive(Args, Debug)]
pub struct TeacherFields {
  #[arg(long)]
  name:         String,
  #[arg(long)]
  employee_id:  String,
  #[arg(long)]
  subject:      String,
  #[arg(long)]
  contact_info: Option<String>,
}

#[derive(Args, Debug)]
pub struct TeacherEdit {
  #[arg(long)]
  name:               Option<String>,
  #[arg(long)]
  employee_id:        Option<String>,
  #[arg(long)]
  subject:            Option<String>,
  #[arg(long, conflicts_with = "clear_contact_info")]
  contact_info:       Option<String>,
  #[arg(long)]
  clear_contact_info: bool,
}

#[derive(Subcommand, Debug)]
pub enum ClassCommand {
  Add { name: String },
  Edit {
    id:   Uuid,
    #[arg(long)]
    name: String,
  },
  Delete { id: Uuid },
  /// Show a class with its teacher and students.
  Show { id: Uuid },
  List,
  /// List the students enrolled in a class.
  Students { id: Uuid },
}

#[derive(Subcommand, Debug)]
pub enum StudentCommand {
  Add {
    #[arg(long)]
    name:       String,
    #[arg(long)]
    student_id: String,
    /// Class to enrol the student in.
    #[arg(long)]
    class:      Uuid,
  },
  Edit {
    id:         Uuid,
    #[arg(long)]
    name:       Option<String>,
    #[arg(long)]
    student_id: Option<String>,
  },
  Delete { id: Uuid },
  Show { id: Uuid },
  /// List every student, enrolled or not.
  List,
  /// Move a student to another class.
  Transfer { id: Uuid, class: Uuid },
}

// ─── Field checks ─────────────────────────────────────────────────────────────

/// Reject blank input the way the entry forms do; surrounding whitespace is
/// dropped.
fn require(field: &str, value: String) -> Result<String> {
  let trimmed = value.trim();
  if trimmed.is_empty() {
    bail!("{field} must not be blank");
  }
  Ok(trimmed.to_owned())
}

/// Optional free text; blank counts as absent.
fn non_blank(value: Option<String>) -> Option<String> {
  value
    .map(|v| v.trim().to_owned())
    .filter(|v| !v.is_empty())
}

fn require_opt(field: &str, value: Option<String>) -> Result<Option<String>> {
  value.map(|v| require(field, v)).transpose()
}

fn find_teacher<K: KeyValueStore>(store: &RosterStore<K>, id: Uuid) -> Result<&Teacher> {
  match store.teacher(id) {
    Some(t) => Ok(t),
    None => bail!("teacher {id} not found"),
  }
}

fn find_class<K: KeyValueStore>(store: &RosterStore<K>, id: Uuid) -> Result<&Class> {
  match store.class(id) {
    Some(c) => Ok(c),
    None => bail!("class {id} not found"),
  }
}

fn find_student<K: KeyValueStore>(store: &RosterStore<K>, id: Uuid) -> Result<&Student> {
  match store.student(id) {
    Some(s) => Ok(s),
    None => bail!("student {id} not found"),
  }
}

// ─── Views ────────────────────────────────────────────────────────────────────

#[derive(Serialize)]
struct Created {
  id: Uuid,
}

#[derive(Serialize)]
struct TeacherDetail<'a> {
  teacher: &'a Teacher,
  classes: Vec<&'a Class>,
}

#[derive(Serialize)]
struct ClassDetail<'a> {
  class:    &'a Class,
  teacher:  Option<&'a Teacher>,
  students: Vec<&'a Student>,
}

#[derive(Serialize)]
struct StudentDetail<'a> {
  student: &'a Student,
  class:   Option<&'a Class>,
}

// ─── Dispatch ─────────────────────────────────────────────────────────────────

pub fn run<K: KeyValueStore>(store: &mut RosterStore<K>, command: Command) -> Result<Rendered> {
  match command {
    Command::Summary => {
      let summary = store.summary();
      let text = format!(
        "Total Teachers: {}\nTotal Classes:  {}\nTotal Students: {}",
        summary.teachers, summary.classes, summary.students
      );
      Rendered::new(&summary, text)
    }
    Command::Teacher(cmd) => run_teacher(store, cmd),
    Command::Class(cmd) => run_class(store, cmd),
    Command::Student(cmd) => run_student(store, cmd),
  }
}

fn run_teacher<K: KeyValueStore>(
  store: &mut RosterStore<K>,
  command: TeacherCommand,
) -> Result<Rendered> {
  match command {
    TeacherCommand::Add(fields) => {
      let data = NewTeacher {
        name:         require("name", fields.name)?,
        employee_id:  require("employee id", fields.employee_id)?,
        subject:      require("subject", fields.subject)?,
        contact_info: non_blank(fields.contact_info),
      };
      let id = store.add_teacher(data);
      Rendered::new(&Created { id }, format!("added teacher {id}"))
    }
    TeacherCommand::Edit { id, fields } => {
      find_teacher(store, id)?;
      // A blank value clears the contact info, like the explicit flag.
      let contact_info = if fields.clear_contact_info {
        Some(None)
      } else {
        fields.contact_info.map(|c| non_blank(Some(c)))
      };
      let patch = TeacherPatch {
        name: require_opt("name", fields.name)?,
        employee_id: require_opt("employee id", fields.employee_id)?,
        subject: require_opt("subject", fields.subject)?,
        contact_info,
      };
      store.update_teacher(id, patch);
      Ok(Rendered::message(format!("updated teacher {id}")))
    }
    TeacherCommand::Delete { id } => {
      find_teacher(store, id)?;
      let detached = store.classes_by_teacher(id).len();
      store.delete_teacher(id);
      Ok(Rendered::message(format!(
        "deleted teacher {id}; {detached} class(es) now have no teacher"
      )))
    }
    TeacherCommand::Show { id } => {
      let teacher = find_teacher(store, id)?;
      let classes = store.classes_by_teacher(id);
      let text = format!(
        "{}\nclasses:\n{}",
        teacher_line(teacher),
        list(
          classes.iter().map(|c| format!("  {}  {}", c.id, c.name)),
          "  (none)"
        )
      );
      Rendered::new(&TeacherDetail { teacher, classes }, text)
    }
    TeacherCommand::List => {
      let teachers = store.teachers();
      let text = list(teachers.iter().map(teacher_line), "no teachers");
      Rendered::new(&teachers, text)
    }
    TeacherCommand::Assign { teacher, class } => {
      find_teacher(store, teacher)?;
      find_class(store, class)?;
      store.assign_teacher_to_class(teacher, class);
      Ok(Rendered::message(format!("assigned teacher {teacher} to class {class}")))
    }
    TeacherCommand::Unassign { class } => {
      find_class(store, class)?;
      store.remove_teacher_from_class(class);
      Ok(Rendered::message(format!("class {class} has no teacher")))
    }
    TeacherCommand::Classes { teacher, assignable } => {
      find_teacher(store, teacher)?;
      let classes = if assignable {
        store.assignable_classes(teacher)
      } else {
        store.classes_by_teacher(teacher)
      };
      let text = list(
        classes
          .iter()
          .map(|c| class_line(c, store.teacher_by_class(c.id))),
        "no classes",
      );
      Rendered::new(&classes, text)
    }
  }
}

fn run_class<K: KeyValueStore>(
  store: &mut RosterStore<K>,
  command: ClassCommand,
) -> Result<Rendered> {
  match command {
    ClassCommand::Add { name } => {
      let id = store.add_class(require("class name", name)?);
      Rendered::new(&Created { id }, format!("added class {id}"))
    }
    ClassCommand::Edit { id, name } => {
      find_class(store, id)?;
      store.update_class(id, ClassPatch {
        name: Some(require("class name", name)?),
        ..Default::default()
      });
      Ok(Rendered::message(format!("updated class {id}")))
    }
    ClassCommand::Delete { id } => {
      find_class(store, id)?;
      let detached = store.students_by_class(id).len();
      store.delete_class(id);
      Ok(Rendered::message(format!(
        "deleted class {id}; {detached} student(s) now have no class"
      )))
    }
    ClassCommand::Show { id } => {
      let class = find_class(store, id)?;
      let teacher = store.teacher_by_class(id);
      let students = store.students_by_class(id);
      let text = format!(
        "{}\nstudents:\n{}",
        class_line(class, teacher),
        list(
          students
            .iter()
            .map(|s| format!("  {}  {}  [{}]", s.id, s.name, s.student_id)),
          "  (none)"
        )
      );
      Rendered::new(
        &ClassDetail {
          class,
          teacher,
          students,
        },
        text,
      )
    }
    ClassCommand::List => {
      let classes = store.classes();
      let text = list(
        classes
          .iter()
          .map(|c| class_line(c, store.teacher_by_class(c.id))),
        "no classes",
      );
      Rendered::new(&classes, text)
    }
    ClassCommand::Students { id } => {
      let class = find_class(store, id)?;
      let students = store.students_by_class(id);
      let text = list(
        students.iter().map(|s| student_line(s, Some(class))),
        "no students",
      );
      Rendered::new(&students, text)
    }
  }
}

fn run_student<K: KeyValueStore>(
  store: &mut RosterStore<K>,
  command: StudentCommand,
) -> Result<Rendered> {
  match command {
    StudentCommand::Add {
      name,
      student_id,
      class,
    } => {
      let name = require("name", name)?;
      let student_id = require("student id", student_id)?;

      find_class(store, class)?;

      // Students are always added into the focused class.
      store.set_active_class_id(Some(class));
      let Some(class_id) = store.active_class().map(|c| c.id) else {
        bail!("class {class} not found");
      };
      let id = store.add_student(NewStudent::new(name, student_id, Some(class_id)));
      Rendered::new(&Created { id }, format!("added student {id}"))
    }
    StudentCommand::Edit {
      id,
      name,
      student_id,
    } => {
      find_student(store, id)?;
      store.update_student(id, StudentPatch {
        name: require_opt("name", name)?,
        student_id: require_opt("student id", student_id)?,
        ..Default::default()
      });
      Ok(Rendered::message(format!("updated student {id}")))
    }
    StudentCommand::Delete { id } => {
      find_student(store, id)?;
      store.delete_student(id);
      Ok(Rendered::message(format!("deleted student {id}")))
    }
    StudentCommand::Show { id } => {
      let student = find_student(store, id)?;
      let class = student.class_id.and_then(|c| store.class(c));
      Rendered::new(
        &StudentDetail { student, class },
        student_line(student, class),
      )
    }
    StudentCommand::List => {
      let students = store.students();
      let text = list(
        students
          .iter()
          .map(|s| student_line(s, s.class_id.and_then(|c| store.class(c)))),
        "no students",
      );
      Rendered::new(&students, text)
    }
    StudentCommand::Transfer { id, class } => {
      find_student(store, id)?;
      find_class(store, class)?;
      if !store.transfer_targets(id).iter().any(|c| c.id == class) {
        bail!("student {id} is already in class {class}");
      }
      store.transfer_student(id, class);
      Ok(Rendered::message(format!("moved student {id} to class {class}")))
    }
  }
}
