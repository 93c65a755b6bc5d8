// ==========================================
// 采购申请跟踪 - 导入状态机
// ==========================================
// 状态: Idle → HeaderValidated → TableCleared → RowsInserted → Committed
// 终态: Failed（任意状态可达）
// ==========================================

use crate::importer::error::{ImportError, ImportResult};
use serde::{Deserialize, Serialize};
use std::fmt;
use tracing::debug;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum LoadState {
    Idle,
    HeaderValidated,
    TableCleared,
    RowsInserted,
    Committed,
    Failed,
}

impl LoadState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, LoadState::Committed | LoadState::Failed)
    }

    /// 合法的下一状态
    pub fn can_transition_to(&self, next: LoadState) -> bool {
        use LoadState::*;
        match (self, next) {
            (Committed, _) | (Failed, _) => false,
            (_, Failed) => true,
            (Idle, HeaderValidated)
            | (HeaderValidated, TableCleared)
            | (TableCleared, RowsInserted)
            | (RowsInserted, Committed) => true,
            _ => false,
        }
    }
}

impl fmt::Display for LoadState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoadState::Idle => "Idle",
            LoadState::HeaderValidated => "HeaderValidated",
            LoadState::TableCleared => "TableCleared",
            LoadState::RowsInserted => "RowsInserted",
            LoadState::Committed => "Committed",
            LoadState::Failed => "Failed",
        };
        f.write_str(name)
    }
}

// ==========================================
// LoadTracker - 状态跟踪
// ==========================================
#[derive(Debug, Clone)]
pub struct LoadTracker {
    state: LoadState,
    history: Vec<LoadState>,
}

impl LoadTracker {
    pub fn new() -> Self {
        Self {
            state: LoadState::Idle,
            history: vec![LoadState::Idle],
        }
    }

    pub fn state(&self) -> LoadState {
        self.state
    }

    pub fn history(&self) -> &[LoadState] {
        &self.history
    }

    /// 推进状态（非法转换返回 InvalidStateTransition）
    pub fn advance(&mut self, next: LoadState) -> ImportResult<()> {
        if !self.state.can_transition_to(next) {
            return Err(ImportError::InvalidStateTransition {
                from: self.state.to_string(),
                to: next.to_string(),
            });
        }
        debug!(from = %self.state, to = %next, "load state");
        self.state = next;
        self.history.push(next);
        Ok(())
    }

    /// 标记失败（已处于终态时保持不变）
    pub fn fail(&mut self) {
        if !self.state.is_terminal() {
            self.state = LoadState::Failed;
            self.history.push(LoadState::Failed);
        }
    }
}

impl Default for LoadTracker {
    fn default() -> Self {
        Self::new()
    }
}
