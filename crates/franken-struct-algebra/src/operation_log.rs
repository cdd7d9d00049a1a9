//! Structured operation events.
//!
//! Every facade call records one [`OperationEvent`]; events carry the
//! caller's trace/decision/policy identifiers so that they can be joined with
//! logs produced elsewhere.

use std::collections::VecDeque;

use serde::{Deserialize, Serialize};

use crate::error::StructError;

pub const COMPONENT: &str = "struct_algebra";
pub const OUTCOME_ALLOW: &str = "allow";
pub const OUTCOME_DENY: &str = "deny";
pub const NO_ERROR_CODE: &str = "none";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationContext {
    pub trace_id: String,
    pub decision_id: String,
    pub policy_id: String,
}

impl OperationContext {
    pub fn new(
        trace_id: impl Into<String>,
        decision_id: impl Into<String>,
        policy_id: impl Into<String>,
    ) -> Self {
        Self {
            trace_id: trace_id.into(),
            decision_id: decision_id.into(),
            policy_id: policy_id.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationEvent {
    pub seq: u64,
    pub trace_id: String,
    pub decision_id: String,
    pub policy_id: String,
    pub component: String,
    pub event: String,
    pub outcome: String,
    pub error_code: String,
    pub operand_count: usize,
    pub detail: String,
}

impl OperationEvent {
    pub fn is_allow(&self) -> bool {
        self.outcome == OUTCOME_ALLOW
    }
}

/// Bounded, append-only event buffer. When full, the oldest event is
/// evicted; sequence numbers keep counting.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct OperationLog {
    events: VecDeque<OperationEvent>,
    next_event_seq: u64,
    max_events: usize,
    enabled: bool,
}

impl OperationLog {
    pub fn new(max_events: usize, enabled: bool) -> Self {
        Self {
            events: VecDeque::new(),
            next_event_seq: 0,
            max_events,
            enabled,
        }
    }

    /// Buffered events, oldest first.
    pub fn events(&self) -> &VecDeque<OperationEvent> {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<OperationEvent> {
        self.events.drain(..).collect()
    }

    pub fn record_allow(
        &mut self,
        event: &str,
        operand_count: usize,
        detail: impl Into<String>,
        context: &OperationContext,
    ) {
        self.push_event(event, OUTCOME_ALLOW, NO_ERROR_CODE, operand_count, detail, context);
    }

    pub fn record_deny(
        &mut self,
        event: &str,
        operand_count: usize,
        error: &StructError,
        context: &OperationContext,
    ) {
        self.push_event(
            event,
            OUTCOME_DENY,
            error.code().stable_code(),
            operand_count,
            error.to_string(),
            context,
        );
    }

    fn push_event(
        &mut self,
        event: &str,
        outcome: &str,
        error_code: &str,
        operand_count: usize,
        detail: impl Into<String>,
        context: &OperationContext,
    ) {
        if !self.enabled || self.max_events == 0 {
            return;
        }
        let event = OperationEvent {
            seq: self.next_event_seq,
            trace_id: context.trace_id.clone(),
            decision_id: context.decision_id.clone(),
            policy_id: context.policy_id.clone(),
            component: COMPONENT.to_string(),
            event: event.to_string(),
            outcome: outcome.to_string(),
            error_code: error_code.to_string(),
            operand_count,
            detail: detail.into(),
        };
        self.next_event_seq = self.next_event_seq.saturating_add(1);
        while self.events.len() >= self.max_events {
            self.events.pop_front();
        }
        self.events.push_back(event);
    }
}
