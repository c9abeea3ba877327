//! File-backed exception store.
//!
//! Rules live in one JSON file, written atomically on every mutation. A
//! missing file is an empty store; a file that exists but does not parse
//! is an explicit error, never a silent reset.

use crate::exceptions::ExceptionRule;
use crate::fsio::atomic_write;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

const STORE_DIR: &str = ".harfnegar";
const STORE_FILE: &str = "exceptions.json";

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("malformed exception store {path}: {message}")]
    Malformed { path: PathBuf, message: String },

    #[error("no exception rule with id {id}")]
    UnknownId { id: u64 },

    #[error("store I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreFile {
    #[serde(default)]
    next_id: u64,
    #[serde(default)]
    rules: Vec<ExceptionRule>,
}

#[derive(Debug)]
pub struct ExceptionStore {
    path: PathBuf,
    next_id: u64,
    rules: Vec<ExceptionRule>,
}

impl ExceptionStore {
    /// Default store location under the user's home directory.
    pub fn default_path() -> Option<PathBuf> {
        home::home_dir().map(|dir| dir.join(STORE_DIR).join(STORE_FILE))
    }

    /// Open a store file, treating a missing file as an empty store.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self, StoreError> {
        let path = path.into();
        if !path.exists() {
            return Ok(Self {
                path,
                next_id: 1,
                rules: Vec::new(),
            });
        }

        let text = fs::read_to_string(&path)?;
        let file: StoreFile =
            serde_json::from_str(&text).map_err(|err| StoreError::Malformed {
                path: path.clone(),
                message: err.to_string(),
            })?;

        let highest = file.rules.iter().map(|rule| rule.id + 1).max().unwrap_or(1);
        let next_id = file.next_id.max(highest).max(1);

        Ok(Self {
            path,
            next_id,
            rules: file.rules,
        })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn rules(&self) -> &[ExceptionRule] {
        &self.rules
    }

    /// Add a rule, enabled by default. Returns false without writing when
    /// the pattern is already present.
    pub fn add(&mut self, pattern: &str, description: &str) -> Result<bool, StoreError> {
        if self.rules.iter().any(|rule| rule.pattern == pattern) {
            return Ok(false);
        }
        let rule = ExceptionRule {
            id: self.next_id,
            pattern: pattern.to_string(),
            description: description.to_string(),
            enabled: true,
        };
        self.next_id += 1;
        self.rules.push(rule);
        self.persist()?;
        Ok(true)
    }

    pub fn update(
        &mut self,
        id: u64,
        pattern: &str,
        description: &str,
        enabled: bool,
    ) -> Result<(), StoreError> {
        let rule = self.rule_mut(id)?;
        rule.pattern = pattern.to_string();
        rule.description = description.to_string();
        rule.enabled = enabled;
        self.persist()
    }

    pub fn set_enabled(&mut self, id: u64, enabled: bool) -> Result<(), StoreError> {
        self.rule_mut(id)?.enabled = enabled;
        self.persist()
    }

    pub fn delete(&mut self, id: u64) -> Result<(), StoreError> {
        let position = self
            .rules
            .iter()
            .position(|rule| rule.id == id)
            .ok_or(StoreError::UnknownId { id })?;
        self.rules.remove(position);
        self.persist()
    }

    pub fn get(&self, id: u64) -> Result<&ExceptionRule, StoreError> {
        self.rules
            .iter()
            .find(|rule| rule.id == id)
            .ok_or(StoreError::UnknownId { id })
    }

    fn rule_mut(&mut self, id: u64) -> Result<&mut ExceptionRule, StoreError> {
        self.rules
            .iter_mut()
            .find(|rule| rule.id == id)
            .ok_or(StoreError::UnknownId { id })
    }

    fn persist(&self) -> Result<(), StoreError> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                fs::create_dir_all(parent)?;
            }
        }
        let file = StoreFile {
            next_id: self.next_id,
            rules: self.rules.clone(),
        };
        let json = serde_json::to_vec_pretty(&file).map_err(|err| StoreError::Malformed {
            path: self.path.clone(),
            message: err.to_string(),
        })?;
        atomic_write(&self.path, &json)?;
        Ok(())
    }
}
