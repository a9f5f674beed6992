#![allow(dead_code)]

use photo_collector::protocol::{Backend, NewUser, RankingRow, Summary, UploadForm, UserData};
use photo_collector::upload::SelectedFile;
use photo_collector::{Error, Result};
use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Mutex;

pub const PNG_HEADER: [u8; 8] = [0x89, 0x50, 0x4E, 0x47, 0x0D, 0x0A, 0x1A, 0x0A];
pub const IDENTITY: &str = "user-123";

pub fn png(name: &str) -> SelectedFile {
    let mut bytes = PNG_HEADER.to_vec();
    bytes.extend_from_slice(name.as_bytes());
    SelectedFile::from_bytes(name, bytes)
}

pub fn pngs(count: usize) -> Vec<SelectedFile> {
    (0..count).map(|i| png(&format!("img-{i:03}.png"))).collect()
}

#[derive(Debug, Clone, PartialEq)]
pub enum Call {
    CheckIn(String),
    Register { amount: usize, ids: Vec<String> },
    Upload { record_id: String, filename: String, data: String },
    Summary(String),
    Ranking,
    CreateUser(NewUserCall),
}

#[derive(Debug, Clone, PartialEq)]
pub struct NewUserCall {
    pub student_number: String,
    pub nickname: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum CheckInMode {
    Known,
    Unknown,
    Error,
}

/// Scripted in-memory backend. Every call is recorded in order.
pub struct MockBackend {
    calls: Mutex<Vec<Call>>,
    check_in: Mutex<CheckInMode>,
    failing_registration: Mutex<Option<usize>>,
    short_registration: Mutex<bool>,
    rejected: Mutex<HashSet<String>>,
    erroring: Mutex<HashSet<String>>,
    hanging: Mutex<HashSet<String>>,
    summary: Mutex<Option<Summary>>,
    registrations: AtomicUsize,
    next_record: AtomicUsize,
}

impl Default for MockBackend {
    fn default() -> Self {
        Self {
            calls: Mutex::new(Vec::new()),
            check_in: Mutex::new(CheckInMode::Known),
            failing_registration: Mutex::new(None),
            short_registration: Mutex::new(false),
            rejected: Mutex::new(HashSet::new()),
            erroring: Mutex::new(HashSet::new()),
            hanging: Mutex::new(HashSet::new()),
            summary: Mutex::new(None),
            registrations: AtomicUsize::new(0),
            next_record: AtomicUsize::new(0),
        }
    }
}

impl MockBackend {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_check_in(self, mode: CheckInMode) -> Self {
        *self.check_in.lock().unwrap() = mode;
        self
    }

    /// Fail the n-th registration call (1-based).
    pub fn failing_registration(self, call: usize) -> Self {
        *self.failing_registration.lock().unwrap() = Some(call);
        self
    }

    pub fn short_registration(self) -> Self {
        *self.short_registration.lock().unwrap() = true;
        self
    }

    /// Uploads of these files come back with `success: false`.
    pub fn rejecting(self, names: &[&str]) -> Self {
        self.rejected
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Uploads of these files fail at the transport.
    pub fn erroring(self, names: &[&str]) -> Self {
        self.erroring
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    /// Uploads of these files never answer.
    pub fn hanging(self, names: &[&str]) -> Self {
        self.hanging
            .lock()
            .unwrap()
            .extend(names.iter().map(|n| n.to_string()));
        self
    }

    pub fn with_summary(self, summary: Summary) -> Self {
        *self.summary.lock().unwrap() = Some(summary);
        self
    }

    pub fn accept_all(&self) {
        self.rejected.lock().unwrap().clear();
        self.erroring.lock().unwrap().clear();
    }

    pub fn calls(&self) -> Vec<Call> {
        self.calls.lock().unwrap().clone()
    }

    pub fn registrations(&self) -> Vec<(usize, Vec<String>)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Register { amount, ids } => Some((amount, ids)),
                _ => None,
            })
            .collect()
    }

    pub fn uploads(&self) -> Vec<(String, String)> {
        self.calls()
            .into_iter()
            .filter_map(|c| match c {
                Call::Upload {
                    record_id,
                    filename,
                    ..
                } => Some((record_id, filename)),
                _ => None,
            })
            .collect()
    }

    fn record(&self, call: Call) {
        self.calls.lock().unwrap().push(call);
    }

    fn remote_error(function: &str, message: &str) -> Error {
        Error::Remote {
            function: function.to_string(),
            message: message.to_string(),
        }
    }
}

impl Backend for MockBackend {
    async fn check_in(&self, identity: &str) -> Result<Option<UserData>> {
        self.record(Call::CheckIn(identity.to_string()));
        let mode = *self.check_in.lock().unwrap();
        match mode {
            CheckInMode::Known => Ok(Some(UserData {
                user_id: identity.to_string(),
                created_at: None,
                images: 0,
                ranking: 0,
            })),
            CheckInMode::Unknown => Ok(None),
            CheckInMode::Error => Err(Self::remote_error("getUserData", "script timed out")),
        }
    }

    async fn register_records(&self, _identity: &str, amount: usize) -> Result<Vec<String>> {
        let call_number = self.registrations.fetch_add(1, Ordering::SeqCst) + 1;
        let failing = *self.failing_registration.lock().unwrap();
        if failing == Some(call_number) {
            self.record(Call::Register {
                amount,
                ids: Vec::new(),
            });
            return Err(Error::Registration("lock acquisition failed".to_string()));
        }

        let mut count = amount;
        if *self.short_registration.lock().unwrap() {
            count = amount.saturating_sub(1);
        }

        let ids: Vec<String> = (0..count)
            .map(|_| format!("rec-{}", self.next_record.fetch_add(1, Ordering::SeqCst)))
            .collect();
        self.record(Call::Register {
            amount,
            ids: ids.clone(),
        });
        Ok(ids)
    }

    async fn upload_file(&self, record_id: &str, form: UploadForm) -> Result<bool> {
        self.record(Call::Upload {
            record_id: record_id.to_string(),
            filename: form.filename.clone(),
            data: form.data.clone(),
        });

        let hang = self.hanging.lock().unwrap().contains(&form.filename);
        if hang {
            std::future::pending::<()>().await;
        }

        let erroring = self.erroring.lock().unwrap().contains(&form.filename);
        if erroring {
            return Err(Self::remote_error("imageUpload", "connection reset"));
        }

        let rejected = self.rejected.lock().unwrap().contains(&form.filename);
        Ok(!rejected)
    }

    async fn get_summary(&self, identity: &str) -> Result<Option<Summary>> {
        self.record(Call::Summary(identity.to_string()));
        Ok(*self.summary.lock().unwrap())
    }

    async fn get_ranking(&self) -> Result<Option<Vec<RankingRow>>> {
        self.record(Call::Ranking);
        Ok(Some(vec![RankingRow {
            identity: IDENTITY.to_string(),
            image_count: 3,
            rank: 1,
        }]))
    }

    async fn create_user(&self, user: NewUser) -> Result<String> {
        self.record(Call::CreateUser(NewUserCall {
            student_number: user.student_number.clone(),
            nickname: user.nickname.clone(),
        }));
        Ok(format!("user-{}", user.student_number))
    }
}
