use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;

use crate::auth::AdminCodeGate;
use crate::moderation::{ModerationLoadError, ModerationPolicy};
use crate::names::NameValidator;
use crate::record_store::RecordStore;

#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "Leaderboard HTTP server")]
pub struct ServerConfig {
    #[arg(long, env = "PORT", default_value_t = 8080)]
    pub port: u16,

    #[arg(long, env = "BIND_ADDR", default_value = "0.0.0.0")]
    pub bind: String,

    #[arg(long, env = "LEADERBOARD_DB_PATH", default_value = ".data/leaderboard.json")]
    pub db_path: PathBuf,

    /// Keep records in memory only.
    #[arg(long)]
    pub in_memory: bool,

    #[arg(long, env = "LEADERBOARD_ADMIN_CODE", hide_env_values = true)]
    pub admin_code: Option<String>,

    /// JSON file with versioned banned-term lists.
    #[arg(long, env = "LEADERBOARD_BLOCKLIST_PATH")]
    pub blocklist: Option<PathBuf>,

    #[arg(long, env = "STATIC_DIR")]
    pub static_dir: Option<PathBuf>,
}

impl ServerConfig {
    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.bind, self.port)
    }

    pub fn moderation_policy(&self) -> Result<Arc<ModerationPolicy>, ModerationLoadError> {
        let policy = match &self.blocklist {
            Some(path) => ModerationPolicy::from_file(path)?,
            None => ModerationPolicy::default(),
        };
        Ok(Arc::new(policy))
    }

    pub fn record_store(&self, names: &NameValidator) -> RecordStore {
        if self.in_memory {
            RecordStore::in_memory()
        } else {
            RecordStore::new(self.db_path.clone(), names)
        }
    }

    pub fn admin_gate(&self) -> AdminCodeGate {
        AdminCodeGate::new(self.admin_code.clone())
    }

    /// Directory holding the front-end build, if one can be found.
    pub fn resolve_static_dir(&self) -> Option<PathBuf> {
        if let Some(path) = &self.static_dir {
            if path.join("index.html").is_file() {
                return Some(path.clone());
            }
        }
        let candidates = [PathBuf::from("dist"), PathBuf::from("public")];
        candidates
            .into_iter()
            .find(|path| path.join("index.html").is_file())
    }
}
