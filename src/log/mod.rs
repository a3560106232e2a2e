use chrono::Utc;
use fs_err as fs;
use serde_json::{json, to_string_pretty};
use std::io::Write;
use std::path::{Path, PathBuf};
use uuid::Uuid;

use crate::wire::CompletionRequest;

/// Where to put per-run artifacts, and which ones to write.
#[derive(Debug, Clone)]
pub struct ArtifactSink {
    pub root: PathBuf,
    pub run: Uuid,
    pub save_request: bool,
    pub save_response: bool,
}

pub struct SavedPaths {
    pub dir: PathBuf,
    pub request: Option<PathBuf>,
    pub response: Option<PathBuf>,
}

impl ArtifactSink {
    pub fn new(root: impl Into<PathBuf>, save_request: bool, save_response: bool) -> Self {
        Self {
            root: root.into(),
            run: Uuid::new_v4(),
            save_request,
            save_response,
        }
    }

    pub fn enabled(&self) -> bool {
        self.save_request || self.save_response
    }

    pub fn run_dir(&self) -> PathBuf {
        run_dir(&self.root, self.run)
    }

    /// Writes `<stage>.request.json` / `<stage>.response.json` under the run directory.
    pub fn save_stage(
        &self,
        stage: &str,
        req: &CompletionRequest,
        reply: &str,
    ) -> anyhow::Result<SavedPaths> {
        let dir = self.run_dir();
        let mut request_path = None;
        let mut response_path = None;
        if !self.enabled() {
            return Ok(SavedPaths { dir, request: None, response: None });
        }
        fs::create_dir_all(&dir)?;

        if self.save_request {
            let p = dir.join(format!("{stage}.request.json"));
            fs::write(&p, to_string_pretty(req)?)?;
            request_path = Some(p);
        }

        if self.save_response {
            let p = dir.join(format!("{stage}.response.json"));
            let body = json!({
                "run": self.run,
                "stage": stage,
                "saved_at": Utc::now(),
                "text": reply,
            });
            fs::write(&p, to_string_pretty(&body)?)?;
            response_path = Some(p);
        }

        Ok(SavedPaths { dir, request: request_path, response: response_path })
    }
}

fn run_dir(root: &Path, run: Uuid) -> PathBuf {
    root.join(run.to_string())
}

pub fn print_saved_paths(stage: &str, saved: &SavedPaths) {
    println!("debug[{stage}]: artifacts directory: {}", saved.dir.display());
    if let Some(p) = &saved.request {
        println!("debug[{stage}]: request saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: request not saved (flag off)");
    }
    if let Some(p) = &saved.response {
        println!("debug[{stage}]: response saved at: {}", p.display());
    } else {
        println!("debug[{stage}]: response not saved (flag off)");
    }
    std::io::stdout().flush().ok();
}

pub fn print_prompt_debug(stage: &str, req: &CompletionRequest) {
    for m in &req.messages {
        eprintln!("\n===== DEBUG [{stage}]: {:?} PROMPT =====\n{}\n", m.role, m.content);
    }
    std::io::stderr().flush().ok();
}
