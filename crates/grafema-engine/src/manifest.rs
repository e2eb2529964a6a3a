//! Line-oriented processing manifest (spec.md §6.3): `<StableID>|<Phase>|
//! <Status>|<UnixTime>\n`. Append-only; `#`-prefixed lines are comments.
//! Grounded on the teacher's plain-`std::fs` append-and-rewrite persistence
//! idiom (no database dependency for a file this small).

use chrono::Utc;
use grafema_core::{CodeGraphError, Result};
use std::fmt;
use std::io::Write;
use std::path::{Path, PathBuf};
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ManifestStatus {
    Done,
    InProgress,
    Pending,
    Crashed,
}

impl fmt::Display for ManifestStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ManifestStatus::Done => "done",
            ManifestStatus::InProgress => "in_progress",
            ManifestStatus::Pending => "pending",
            ManifestStatus::Crashed => "crashed",
        };
        write!(f, "{s}")
    }
}

impl FromStr for ManifestStatus {
    type Err = CodeGraphError;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "done" => Ok(ManifestStatus::Done),
            "in_progress" => Ok(ManifestStatus::InProgress),
            "pending" => Ok(ManifestStatus::Pending),
            "crashed" => Ok(ManifestStatus::Crashed),
            other => Err(CodeGraphError::Parse(format!("unknown manifest status: {other}"))),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    pub stable_id: String,
    pub phase: String,
    pub status: ManifestStatus,
    pub unix_time: i64,
}

impl ManifestEntry {
    fn to_line(&self) -> String {
        format!(
            "{}|{}|{}|{}",
            self.stable_id, self.phase, self.status, self.unix_time
        )
    }

    fn parse_line(line: &str) -> Option<ManifestEntry> {
        let trimmed = line.trim();
        if trimmed.is_empty() || trimmed.starts_with('#') {
            return None;
        }
        let mut parts = trimmed.splitn(4, '|');
        let stable_id = parts.next()?.to_string();
        let phase = parts.next()?.to_string();
        let status = parts.next()?.parse().ok()?;
        let unix_time = parts.next()?.parse().ok()?;
        Some(ManifestEntry {
            stable_id,
            phase,
            status,
            unix_time,
        })
    }
}

pub struct ManifestStore {
    path: PathBuf,
}

impl ManifestStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        ManifestStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Appends one entry (spec.md §6.3: append-only).
    pub fn append(
        &self,
        stable_id: impl Into<String>,
        phase: impl Into<String>,
        status: ManifestStatus,
    ) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let entry = ManifestEntry {
            stable_id: stable_id.into(),
            phase: phase.into(),
            status,
            unix_time: Utc::now().timestamp(),
        };
        let mut file = std::fs::OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)?;
        writeln!(file, "{}", entry.to_line())?;
        Ok(())
    }

    pub fn read_all(&self) -> Result<Vec<ManifestEntry>> {
        if !self.path.exists() {
            return Ok(Vec::new());
        }
        let contents = std::fs::read_to_string(&self.path)?;
        Ok(contents.lines().filter_map(ManifestEntry::parse_line).collect())
    }

    /// Rewrites `in_progress` entries older than `age_secs` to `crashed`
    /// (spec.md §6.3 `cleanupStaleProgress(age)`). Comment lines are dropped
    /// on rewrite — acceptable since they are not referenced by id.
    pub fn cleanup_stale_progress(&self, age_secs: i64) -> Result<usize> {
        let now = Utc::now().timestamp();
        let mut entries = self.read_all()?;
        let mut rewritten = 0usize;
        for entry in &mut entries {
            if entry.status == ManifestStatus::InProgress && now - entry.unix_time > age_secs {
                entry.status = ManifestStatus::Crashed;
                rewritten += 1;
            }
        }
        if rewritten > 0 {
            let body: String = entries
                .iter()
                .map(|e| e.to_line())
                .collect::<Vec<_>>()
                .join("\n");
            std::fs::write(&self.path, format!("{body}\n"))?;
        }
        Ok(rewritten)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn appends_and_reads_back_entries() {
        let dir = tempfile::tempdir().unwrap();
        let store = ManifestStore::new(dir.path().join("manifest"));
        store.append("a.ts::module", "ANALYSIS", ManifestStatus::Done).unwrap();
        let entries = store.read_all().unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].stable_id, "a.ts::module");
        assert_eq!(entries[0].status, ManifestStatus::Done);
    }

    #[test]
    fn cleanup_marks_old_in_progress_entries_crashed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest");
        std::fs::write(&path, "a.ts::module|ANALYSIS|in_progress|1\n# a comment\n").unwrap();
        let store = ManifestStore::new(&path);
        let rewritten = store.cleanup_stale_progress(0).unwrap();
        assert_eq!(rewritten, 1);
        let entries = store.read_all().unwrap();
        assert_eq!(entries[0].status, ManifestStatus::Crashed);
    }

    #[test]
    fn ignores_comment_lines() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("manifest");
        std::fs::write(&path, "# header\na.ts::module|ANALYSIS|done|100\n").unwrap();
        let store = ManifestStore::new(&path);
        assert_eq!(store.read_all().unwrap().len(), 1);
    }
}
