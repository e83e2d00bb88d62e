//! SQLite schema definition.

/// Key in `store_meta` marking that the collection has been written.
pub const WRITTEN_AT_KEY: &str = "patients_written_at";

/// Complete database schema for the triage store.
pub const SCHEMA: &str = r#"
-- ============================================================================
-- Patients
-- ============================================================================

CREATE TABLE IF NOT EXISTS patients (
    id INTEGER PRIMARY KEY,                       -- store-assigned, never reused
    submission_timestamp INTEGER NOT NULL,        -- epoch milliseconds
    status TEXT NOT NULL CHECK (status IN ('ACTIVE', 'DISCHARGED')),
    patient_id TEXT NOT NULL,                     -- display id, e.g. P0007
    age INTEGER NOT NULL DEFAULT 0,
    gender TEXT NOT NULL,
    pregnancy_status INTEGER,                     -- NULL unless female
    temperature_f REAL NOT NULL DEFAULT 0,
    heart_rate_bpm INTEGER NOT NULL DEFAULT 0,
    respiration_rate INTEGER NOT NULL DEFAULT 0,
    bp_systolic INTEGER NOT NULL DEFAULT 0,
    bp_diastolic INTEGER NOT NULL DEFAULT 0,
    oxygen_saturation REAL NOT NULL DEFAULT 0,
    symptoms TEXT NOT NULL DEFAULT '[]',          -- JSON array of strings
    pain_level INTEGER NOT NULL DEFAULT 0,
    symptom_severity_weight INTEGER NOT NULL DEFAULT 0,
    consciousness TEXT NOT NULL,
    duration_of_symptoms_hrs INTEGER NOT NULL DEFAULT 1,
    comorbidities TEXT NOT NULL DEFAULT '[]',     -- JSON array of strings, order matters
    urgency_score INTEGER NOT NULL,
    urgency_color TEXT NOT NULL CHECK (urgency_color IN ('Green', 'Yellow', 'Red')),
    care_plan TEXT NOT NULL,                      -- JSON object
    ai_recommendation_text TEXT NOT NULL DEFAULT '',
    triage_ai_summary TEXT NOT NULL DEFAULT ''
);

CREATE INDEX IF NOT EXISTS idx_patients_status_submitted
    ON patients(status, submission_timestamp DESC);

-- ============================================================================
-- Store metadata
-- ============================================================================

CREATE TABLE IF NOT EXISTS store_meta (
    key TEXT PRIMARY KEY,
    value TEXT NOT NULL,
    updated_at TEXT NOT NULL DEFAULT (datetime('now'))
);
"#;
