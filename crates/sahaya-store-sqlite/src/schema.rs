//! SQL schema for the Sahaya SQLite store.
//!
//! Executed once at connection startup via `PRAGMA user_version`. Future
//! migrations will be gated on that version number.

/// Full schema DDL; idempotent thanks to `CREATE TABLE IF NOT EXISTS`.
pub const SCHEMA: &str = "
PRAGMA journal_mode = WAL;
PRAGMA foreign_keys = ON;

-- Base identity record; role is written once and never updated.
CREATE TABLE IF NOT EXISTS users (
    user_id     TEXT PRIMARY KEY,   -- identity-provider id, caller-supplied
    name        TEXT NOT NULL,
    email       TEXT,
    role        TEXT NOT NULL,      -- 'student' | 'scribe' | 'admin' | 'superadmin'
    is_active   INTEGER NOT NULL DEFAULT 1,
    created_at  TEXT NOT NULL,      -- ISO 8601 UTC; server-assigned
    updated_at  TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS students (
    user_id      TEXT PRIMARY KEY REFERENCES users(user_id),
    class        TEXT NOT NULL,
    subjects     TEXT NOT NULL DEFAULT '[]',  -- JSON string array
    exam_details TEXT,                        -- JSON ExamDetails or NULL
    disability   TEXT NOT NULL,               -- JSON Disability
    school_id    TEXT
);

-- rating/total_ratings are written only by the feedback transaction.
CREATE TABLE IF NOT EXISTS scribes (
    user_id       TEXT PRIMARY KEY REFERENCES users(user_id),
    subjects      TEXT NOT NULL DEFAULT '[]',
    experience    TEXT NOT NULL,
    rating        REAL NOT NULL DEFAULT 0,
    total_ratings INTEGER NOT NULL DEFAULT 0,
    exam_types    TEXT NOT NULL DEFAULT '[]',
    location      TEXT NOT NULL,
    languages     TEXT NOT NULL DEFAULT '[]',
    availability  TEXT NOT NULL,   -- 'available' | 'busy' | 'inactive'
    gender        TEXT NOT NULL,
    age           INTEGER NOT NULL
);

-- is_approved is written only by the admin-request approval transaction.
CREATE TABLE IF NOT EXISTS admins (
    user_id     TEXT PRIMARY KEY REFERENCES users(user_id),
    school_name TEXT NOT NULL,
    school_id   TEXT NOT NULL,
    is_approved INTEGER NOT NULL DEFAULT 0,
    approved_by TEXT,
    approved_at TEXT
);

CREATE TABLE IF NOT EXISTS matches (
    match_id      TEXT PRIMARY KEY,
    student_id    TEXT NOT NULL REFERENCES students(user_id),
    scribe_id     TEXT NOT NULL REFERENCES scribes(user_id),
    exam_details  TEXT NOT NULL,    -- JSON ExamDetails
    match_score   INTEGER NOT NULL, -- 0..=100
    status        TEXT NOT NULL,    -- 'matched' | 'confirmed' | 'completed' | 'cancelled'
    created_at    TEXT NOT NULL,
    confirmed_at  TEXT,
    completed_at  TEXT,
    cancelled_at  TEXT,
    cancel_reason TEXT
);

CREATE TABLE IF NOT EXISTS scribe_requests (
    request_id       TEXT PRIMARY KEY,
    student_id       TEXT NOT NULL REFERENCES students(user_id),
    scribe_id        TEXT NOT NULL REFERENCES scribes(user_id),
    exam_details     TEXT NOT NULL,
    match_score      INTEGER NOT NULL,
    admin_id         TEXT,
    status           TEXT NOT NULL, -- 'pending' | 'approved' | 'rejected' | 'completed'
    approved_by      TEXT,
    approved_at      TEXT,
    rejected_by      TEXT,
    rejected_at      TEXT,
    rejection_reason TEXT,
    created_at       TEXT NOT NULL,
    updated_at       TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS admin_requests (
    request_id       TEXT PRIMARY KEY,
    user_id          TEXT NOT NULL,
    school_name      TEXT NOT NULL,
    school_id        TEXT NOT NULL,
    documents        TEXT NOT NULL DEFAULT '{}', -- JSON AdminDocuments
    status           TEXT NOT NULL,              -- 'pending' | 'approved' | 'rejected'
    approved_by      TEXT,
    approved_at      TEXT,
    rejected_by      TEXT,
    rejected_at      TEXT,
    rejection_reason TEXT,
    requested_at     TEXT NOT NULL
);

CREATE TABLE IF NOT EXISTS feedback (
    feedback_id  TEXT PRIMARY KEY,
    match_id     TEXT NOT NULL REFERENCES matches(match_id),
    student_id   TEXT NOT NULL REFERENCES students(user_id),
    scribe_id    TEXT NOT NULL REFERENCES scribes(user_id),
    rating       INTEGER NOT NULL, -- 1..=5
    comment      TEXT NOT NULL,
    is_anonymous INTEGER NOT NULL DEFAULT 0,
    created_at   TEXT NOT NULL
);

CREATE INDEX IF NOT EXISTS scribes_availability_idx     ON scribes(availability);
CREATE INDEX IF NOT EXISTS matches_student_idx          ON matches(student_id);
CREATE INDEX IF NOT EXISTS matches_scribe_idx           ON matches(scribe_id);
CREATE INDEX IF NOT EXISTS scribe_requests_status_idx   ON scribe_requests(status);
CREATE INDEX IF NOT EXISTS scribe_requests_admin_idx    ON scribe_requests(admin_id);
CREATE INDEX IF NOT EXISTS admin_requests_status_idx    ON admin_requests(status);
CREATE INDEX IF NOT EXISTS admin_requests_user_idx      ON admin_requests(user_id);
CREATE INDEX IF NOT EXISTS feedback_scribe_idx          ON feedback(scribe_id);

PRAGMA user_version = 1;
";
