//! 测试用内存后端，可以指定第几个文件失败

use async_trait::async_trait;
use std::sync::Mutex;

use super::{BackendError, StorageBackend, StoreError};
use crate::errors::FluffyError;
use crate::models::StoredFile;

#[derive(Debug, Clone)]
pub enum Failure {
    Backend(&'static str),
    Internal(&'static str),
}

#[derive(Default)]
pub struct MemoryBackend {
    stored: Mutex<Vec<(String, Vec<u8>)>>,
    attempts: Mutex<usize>,
    fail_at: Option<(usize, Failure)>,
}

impl MemoryBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// 第 `index` 次调用 store 时失败（从 0 开始）
    pub fn failing_at(index: usize, failure: Failure) -> Self {
        Self {
            fail_at: Some((index, failure)),
            ..Self::default()
        }
    }

    pub fn stored_names(&self) -> Vec<String> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .map(|(name, _)| name.clone())
            .collect()
    }

    pub fn stored_data(&self, name: &str) -> Option<Vec<u8>> {
        self.stored
            .lock()
            .unwrap()
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, data)| data.clone())
    }

    pub fn attempts(&self) -> usize {
        *self.attempts.lock().unwrap()
    }
}

#[async_trait]
impl StorageBackend for MemoryBackend {
    fn name(&self) -> &str {
        "memory"
    }

    async fn store(&self, file: &StoredFile) -> Result<(), StoreError> {
        let attempt = {
            let mut attempts = self.attempts.lock().unwrap();
            *attempts += 1;
            *attempts - 1
        };

        if let Some((index, failure)) = &self.fail_at
            && *index == attempt
        {
            return Err(match failure {
                Failure::Backend(msg) => {
                    BackendError::new(*msg, format!("scripted failure for {}", file.name)).into()
                }
                Failure::Internal(msg) => FluffyError::network(*msg).into(),
            });
        }

        self.stored
            .lock()
            .unwrap()
            .push((file.name.clone(), file.data.to_vec()));
        Ok(())
    }
}
