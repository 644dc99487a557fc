use std::io::ErrorKind;
use std::path::{Path, PathBuf};

use async_trait::async_trait;
use tokio::fs::{self, File, OpenOptions};
use tokio::io::AsyncWriteExt;
use tokio::sync::Mutex;
use tracing::{debug, warn};
use votechain_types::VoterId;

use crate::error::{ServerError, ServerResult};
use crate::store::{VoterIndex, VoterRecord, VoterStore};

/// Voter registry backed by an append-only JSON-lines file.
///
/// One [`VoterRecord`] per line. On open the file is read front to back;
/// lines that fail to parse (a torn final write after a crash) are skipped
/// with a warning. Every record is synced to disk before `record` returns.
/// After a torn tail, found on open or left by a failed write, the next
/// record starts with a newline so it never merges with the fragment.
pub struct JournalVoterStore {
    path: PathBuf,
    state: Mutex<JournalState>,
}

struct JournalState {
    index: VoterIndex,
    file: File,
    needs_fence: bool,
}

impl JournalVoterStore {
    /// Open (or create) the journal at `path` and replay it.
    pub async fn open(path: &Path) -> ServerResult<Self> {
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent).await?;
        }

        let mut index = VoterIndex::default();
        let mut needs_fence = false;
        match fs::read_to_string(path).await {
            Ok(text) => {
                replay(&text, &mut index, path);
                needs_fence = !text.is_empty() && !text.ends_with('\n');
            }
            Err(e) if e.kind() == ErrorKind::NotFound => {}
            Err(e) => return Err(e.into()),
        }

        let file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(path)
            .await?;

        debug!(
            path = %path.display(),
            records = index.records().len(),
            "voter journal opened"
        );
        Ok(Self {
            path: path.to_path_buf(),
            state: Mutex::new(JournalState {
                index,
                file,
                needs_fence,
            }),
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

async fn append_line(file: &mut File, line: &[u8]) -> std::io::Result<()> {
    file.write_all(line).await?;
    file.flush().await?;
    file.sync_data().await
}

fn replay(text: &str, index: &mut VoterIndex, path: &Path) {
    for (number, line) in text.lines().enumerate() {
        if line.trim().is_empty() {
            continue;
        }
        let record = match serde_json::from_str::<VoterRecord>(line) {
            Ok(record) => record,
            Err(e) => {
                warn!(path = %path.display(), line = number + 1, error = %e, "skipping unreadable voter record");
                continue;
            }
        };
        if index.insert(record).is_err() {
            warn!(path = %path.display(), line = number + 1, "skipping duplicate voter record");
        }
    }
}

#[async_trait]
impl VoterStore for JournalVoterStore {
    async fn has_voted(&self, voter: &VoterId) -> ServerResult<bool> {
        Ok(self.state.lock().await.index.contains(voter))
    }

    async fn record(&self, record: &VoterRecord) -> ServerResult<()> {
        let mut state = self.state.lock().await;
        if state.index.contains(&record.voter_id) {
            return Err(ServerError::AlreadyVoted);
        }

        let json = serde_json::to_vec(record).map_err(|e| ServerError::Storage(e.to_string()))?;
        let mut line = Vec::with_capacity(json.len() + 2);
        if state.needs_fence {
            line.push(b'\n');
        }
        line.extend_from_slice(&json);
        line.push(b'\n');

        if let Err(e) = append_line(&mut state.file, &line).await {
            // Part of the line may have reached the file.
            state.needs_fence = true;
            warn!(path = %self.path.display(), error = %e, "voter record write failed");
            return Err(e.into());
        }
        state.needs_fence = false;

        state.index.insert(record.clone())
    }

    async fn records(&self) -> ServerResult<Vec<VoterRecord>> {
        Ok(self.state.lock().await.index.records().to_vec())
    }
}
