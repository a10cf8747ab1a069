use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{
    AttendanceByStudent, AttendanceBySubject, Group, NewAttendance, ScheduleEntry, Student,
};
use crate::db::{is_foreign_key_violation, StoreError};

/// Query layer for the university reference data and attendance.
///
/// `get_*` return `None` for an absent id; list and lookup operations return
/// an empty vector when nothing matches.
#[async_trait]
pub trait UniversityStore: Send + Sync {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError>;
    async fn get_student(&self, id: i32) -> Result<Option<Student>, StoreError>;

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError>;
    async fn get_group(&self, id: i32) -> Result<Option<Group>, StoreError>;

    async fn list_schedule(&self) -> Result<Vec<ScheduleEntry>, StoreError>;
    async fn group_schedule(&self, group_id: i32) -> Result<Vec<ScheduleEntry>, StoreError>;

    /// Insert, or overwrite the presence flag of an existing
    /// (student, schedule, visit day) record.
    async fn upsert_attendance(&self, record: &NewAttendance) -> Result<(), StoreError>;
    async fn attendance_by_subject(
        &self,
        schedule_id: i32,
    ) -> Result<Vec<AttendanceBySubject>, StoreError>;
    async fn attendance_by_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<AttendanceByStudent>, StoreError>;
}

#[derive(Clone)]
pub struct PgUniversityStore {
    db: PgPool,
}

impl PgUniversityStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UniversityStore for PgUniversityStore {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        let rows = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, name, surname, gender, birthday, group_id
            FROM students
            ORDER BY student_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_student(&self, id: i32) -> Result<Option<Student>, StoreError> {
        let row = sqlx::query_as::<_, Student>(
            r#"
            SELECT student_id, name, surname, gender, birthday, group_id
            FROM students
            WHERE student_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        let rows = sqlx::query_as::<_, Group>(
            r#"
            SELECT group_id, group_name, faculty
            FROM groups
            ORDER BY group_id
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn get_group(&self, id: i32) -> Result<Option<Group>, StoreError> {
        let row = sqlx::query_as::<_, Group>(
            r#"
            SELECT group_id, group_name, faculty
            FROM groups
            WHERE group_id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await?;
        Ok(row)
    }

    async fn list_schedule(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        let rows = sqlx::query_as::<_, ScheduleEntry>(
            r#"
            SELECT group_id, lesson_name AS subject, start_time, end_time
            FROM schedule
            ORDER BY day_of_week, start_time
            "#,
        )
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn group_schedule(&self, group_id: i32) -> Result<Vec<ScheduleEntry>, StoreError> {
        let rows = sqlx::query_as::<_, ScheduleEntry>(
            r#"
            SELECT group_id, lesson_name AS subject, start_time, end_time
            FROM schedule
            WHERE group_id = $1
            ORDER BY day_of_week, start_time
            "#,
        )
        .bind(group_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn upsert_attendance(&self, record: &NewAttendance) -> Result<(), StoreError> {
        sqlx::query(
            r#"
            INSERT INTO attendance (student_id, schedule_id, attendance_date, is_present)
            VALUES ($1, $2, TO_DATE($3, 'DD.MM.YYYY'), $4)
            ON CONFLICT (student_id, schedule_id, attendance_date)
            DO UPDATE SET is_present = EXCLUDED.is_present
            "#,
        )
        .bind(record.student_id)
        .bind(record.schedule_id)
        .bind(&record.visit_day)
        .bind(record.visited)
        .execute(&self.db)
        .await
        .map_err(|e| {
            if is_foreign_key_violation(&e) {
                StoreError::MissingReference
            } else {
                StoreError::Database(e)
            }
        })?;
        Ok(())
    }

    async fn attendance_by_subject(
        &self,
        schedule_id: i32,
    ) -> Result<Vec<AttendanceBySubject>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceBySubject>(
            r#"
            SELECT s.student_id,
                   s.name AS student_name,
                   s.surname AS student_surname,
                   g.group_name,
                   TO_CHAR(a.attendance_date, 'DD.MM.YYYY') AS visit_day,
                   a.is_present AS visited
            FROM attendance a
            JOIN students s ON a.student_id = s.student_id
            JOIN groups g ON s.group_id = g.group_id
            WHERE a.schedule_id = $1
            ORDER BY s.surname, s.name, a.attendance_date DESC
            "#,
        )
        .bind(schedule_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }

    async fn attendance_by_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<AttendanceByStudent>, StoreError> {
        let rows = sqlx::query_as::<_, AttendanceByStudent>(
            r#"
            SELECT a.schedule_id AS subject_id,
                   sch.lesson_name AS subject_name,
                   TO_CHAR(a.attendance_date, 'DD.MM.YYYY') AS visit_day,
                   a.is_present AS visited
            FROM attendance a
            JOIN schedule sch ON a.schedule_id = sch.schedule_id
            WHERE a.student_id = $1
            ORDER BY a.attendance_date DESC, sch.lesson_name
            "#,
        )
        .bind(student_id)
        .fetch_all(&self.db)
        .await?;
        Ok(rows)
    }
}
