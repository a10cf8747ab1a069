//! In-memory stores and router helpers for endpoint tests.

use std::collections::BTreeMap;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::{
    body::Body,
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::Value;
use time::{
    macros::{date, datetime},
    OffsetDateTime,
};
use tower::ServiceExt;

use crate::app::build_app;
use crate::auth::{repo::UserStore, repo_types::User};
use crate::config::{AppConfig, JwtConfig, PasswordConfig};
use crate::db::StoreError;
use crate::state::AppState;
use crate::university::{
    dates,
    repo::UniversityStore,
    repo_types::{
        AttendanceByStudent, AttendanceBySubject, Group, NewAttendance, ScheduleEntry, Student,
    },
};

pub const TEST_SECRET: &str = "test-secret";

pub fn test_config(ttl_minutes: i64) -> AppConfig {
    AppConfig {
        database_url: "postgres://unused".into(),
        db_max_connections: 1,
        host: "127.0.0.1".into(),
        port: 0,
        jwt: JwtConfig {
            secret: TEST_SECRET.into(),
            issuer: "test-issuer".into(),
            audience: "test-aud".into(),
            ttl_minutes,
        },
        password: PasswordConfig {
            memory_kib: 64,
            iterations: 1,
            parallelism: 1,
        },
    }
}

fn simulated_outage() -> StoreError {
    StoreError::Database(sqlx::Error::PoolTimedOut)
}

#[derive(Default)]
pub struct InMemoryUserStore {
    users: Mutex<Vec<User>>,
}

impl InMemoryUserStore {
    pub fn count(&self) -> usize {
        self.users.lock().unwrap().len()
    }
}

#[async_trait]
impl UserStore for InMemoryUserStore {
    async fn create(&self, email: &str, password_hash: &str) -> Result<User, StoreError> {
        let mut users = self.users.lock().unwrap();
        if users.iter().any(|u| u.email == email) {
            return Err(StoreError::DuplicateEmail);
        }
        let user = User {
            id: users.len() as i32 + 1,
            email: email.to_string(),
            password_hash: password_hash.to_string(),
            created_at: OffsetDateTime::now_utc(),
        };
        users.push(user.clone());
        Ok(user)
    }

    async fn find_by_email(&self, email: &str) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.email == email).cloned())
    }

    async fn find_by_id(&self, id: i32) -> Result<Option<User>, StoreError> {
        Ok(self.users.lock().unwrap().iter().find(|u| u.id == id).cloned())
    }
}

pub struct ScheduleSlot {
    pub schedule_id: i32,
    pub day_of_week: i16,
    pub entry: ScheduleEntry,
}

/// Seeded reference data plus a mutable attendance table.
pub struct InMemoryUniversityStore {
    pub students: Vec<Student>,
    pub groups: Vec<Group>,
    pub slots: Vec<ScheduleSlot>,
    attendance: Mutex<BTreeMap<(i32, i32, String), bool>>,
    broken: bool,
}

impl InMemoryUniversityStore {
    pub fn seeded() -> Self {
        let groups = vec![
            Group {
                group_id: 1,
                group_name: "CS-101".into(),
                faculty: "Computer Science".into(),
            },
            Group {
                group_id: 2,
                group_name: "MA-201".into(),
                faculty: "Mathematics".into(),
            },
        ];
        let students = vec![
            Student {
                student_id: 1,
                name: "Ivan".into(),
                surname: "Ivanov".into(),
                gender: "male".into(),
                birthday: date!(2003 - 05 - 14),
                group_id: 1,
            },
            Student {
                student_id: 2,
                name: "Anna".into(),
                surname: "Abramova".into(),
                gender: "female".into(),
                birthday: date!(2004 - 01 - 30),
                group_id: 1,
            },
        ];
        let slots = vec![
            ScheduleSlot {
                schedule_id: 2,
                day_of_week: 2,
                entry: ScheduleEntry {
                    group_id: 1,
                    subject: "Databases".into(),
                    start_time: datetime!(2024-09-03 11:00 UTC),
                    end_time: datetime!(2024-09-03 12:30 UTC),
                },
            },
            ScheduleSlot {
                schedule_id: 1,
                day_of_week: 1,
                entry: ScheduleEntry {
                    group_id: 1,
                    subject: "Algorithms".into(),
                    start_time: datetime!(2024-09-02 09:00 UTC),
                    end_time: datetime!(2024-09-02 10:30 UTC),
                },
            },
        ];
        Self {
            students,
            groups,
            slots,
            attendance: Mutex::new(BTreeMap::new()),
            broken: false,
        }
    }

    /// Every call fails as if the database were unreachable.
    pub fn broken() -> Self {
        Self {
            broken: true,
            ..Self::seeded()
        }
    }

    pub fn attendance_rows(&self) -> Vec<((i32, i32, String), bool)> {
        self.attendance
            .lock()
            .unwrap()
            .iter()
            .map(|(k, v)| (k.clone(), *v))
            .collect()
    }

    fn check(&self) -> Result<(), StoreError> {
        if self.broken {
            Err(simulated_outage())
        } else {
            Ok(())
        }
    }

    fn sorted_slots(&self, group_id: Option<i32>) -> Vec<ScheduleEntry> {
        let mut slots: Vec<&ScheduleSlot> = self
            .slots
            .iter()
            .filter(|s| group_id.map_or(true, |g| s.entry.group_id == g))
            .collect();
        slots.sort_by_key(|s| (s.day_of_week, s.entry.start_time));
        slots.into_iter().map(|s| s.entry.clone()).collect()
    }
}

#[async_trait]
impl UniversityStore for InMemoryUniversityStore {
    async fn list_students(&self) -> Result<Vec<Student>, StoreError> {
        self.check()?;
        Ok(self.students.clone())
    }

    async fn get_student(&self, id: i32) -> Result<Option<Student>, StoreError> {
        self.check()?;
        Ok(self.students.iter().find(|s| s.student_id == id).cloned())
    }

    async fn list_groups(&self) -> Result<Vec<Group>, StoreError> {
        self.check()?;
        Ok(self.groups.clone())
    }

    async fn get_group(&self, id: i32) -> Result<Option<Group>, StoreError> {
        self.check()?;
        Ok(self.groups.iter().find(|g| g.group_id == id).cloned())
    }

    async fn list_schedule(&self) -> Result<Vec<ScheduleEntry>, StoreError> {
        self.check()?;
        Ok(self.sorted_slots(None))
    }

    async fn group_schedule(&self, group_id: i32) -> Result<Vec<ScheduleEntry>, StoreError> {
        self.check()?;
        Ok(self.sorted_slots(Some(group_id)))
    }

    async fn upsert_attendance(&self, record: &NewAttendance) -> Result<(), StoreError> {
        self.check()?;
        let student_known = self.students.iter().any(|s| s.student_id == record.student_id);
        let slot_known = self.slots.iter().any(|s| s.schedule_id == record.schedule_id);
        if !student_known || !slot_known {
            return Err(StoreError::MissingReference);
        }
        self.attendance.lock().unwrap().insert(
            (record.student_id, record.schedule_id, record.visit_day.clone()),
            record.visited,
        );
        Ok(())
    }

    async fn attendance_by_subject(
        &self,
        schedule_id: i32,
    ) -> Result<Vec<AttendanceBySubject>, StoreError> {
        self.check()?;
        let attendance = self.attendance.lock().unwrap();
        let mut rows: Vec<AttendanceBySubject> = attendance
            .iter()
            .filter(|((_, slot, _), _)| *slot == schedule_id)
            .filter_map(|((student_id, _, day), visited)| {
                let student = self.students.iter().find(|s| s.student_id == *student_id)?;
                let group = self.groups.iter().find(|g| g.group_id == student.group_id)?;
                Some(AttendanceBySubject {
                    student_id: *student_id,
                    student_name: student.name.clone(),
                    student_surname: student.surname.clone(),
                    group_name: group.group_name.clone(),
                    visit_day: day.clone(),
                    visited: *visited,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            (&a.student_surname, &a.student_name)
                .cmp(&(&b.student_surname, &b.student_name))
                .then_with(|| {
                    dates::parse(&b.visit_day)
                        .ok()
                        .cmp(&dates::parse(&a.visit_day).ok())
                })
        });
        Ok(rows)
    }

    async fn attendance_by_student(
        &self,
        student_id: i32,
    ) -> Result<Vec<AttendanceByStudent>, StoreError> {
        self.check()?;
        let attendance = self.attendance.lock().unwrap();
        let mut rows: Vec<AttendanceByStudent> = attendance
            .iter()
            .filter(|((student, _, _), _)| *student == student_id)
            .filter_map(|((_, slot_id, day), visited)| {
                let slot = self.slots.iter().find(|s| s.schedule_id == *slot_id)?;
                Some(AttendanceByStudent {
                    subject_id: *slot_id,
                    subject_name: slot.entry.subject.clone(),
                    visit_day: day.clone(),
                    visited: *visited,
                })
            })
            .collect();
        rows.sort_by(|a, b| {
            dates::parse(&b.visit_day)
                .ok()
                .cmp(&dates::parse(&a.visit_day).ok())
                .then_with(|| a.subject_name.cmp(&b.subject_name))
        });
        Ok(rows)
    }
}

/// Router wired to in-memory stores, with handles kept for inspection.
pub struct TestApp {
    pub router: Router,
    pub state: AppState,
    pub users: Arc<InMemoryUserStore>,
    pub university: Arc<InMemoryUniversityStore>,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_university(InMemoryUniversityStore::seeded())
    }

    pub fn with_university(university: InMemoryUniversityStore) -> Self {
        let users = Arc::new(InMemoryUserStore::default());
        let university = Arc::new(university);
        let state = AppState::from_parts(
            Arc::new(test_config(60)),
            users.clone(),
            university.clone(),
        )
        .expect("test state");
        Self {
            router: build_app(state.clone()),
            state,
            users,
            university,
        }
    }

    pub fn token_for(&self, user_id: i32) -> String {
        self.state.tokens.issue(user_id).expect("issue test token")
    }

    pub async fn send(&self, req: Request<Body>) -> (StatusCode, Value) {
        let resp = self.router.clone().oneshot(req).await.expect("router is infallible");
        let status = resp.status();
        let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX)
            .await
            .expect("read body");
        let json = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).expect("body is json")
        };
        (status, json)
    }

    pub async fn get(&self, uri: &str, token: Option<&str>) -> (StatusCode, Value) {
        let mut req = Request::builder().method(Method::GET).uri(uri);
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(req.body(Body::empty()).unwrap()).await
    }

    pub async fn post_json(
        &self,
        uri: &str,
        token: Option<&str>,
        body: Value,
    ) -> (StatusCode, Value) {
        let mut req = Request::builder()
            .method(Method::POST)
            .uri(uri)
            .header(header::CONTENT_TYPE, "application/json");
        if let Some(token) = token {
            req = req.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        self.send(req.body(Body::from(body.to_string())).unwrap()).await
    }
}
