//! Conversation turn orchestration.
//!
//! One turn is: resolve the platform rule, assemble context, call the model
//! once under a timeout, then validate and edit the reply. The orchestrator
//! keeps no session state; the caller owns the history and decides whether
//! to append the outcome to it.

use std::future::Future;
use std::sync::Arc;
use std::time::{Duration, Instant};

use chrono::{DateTime, Utc};
use marketeer_core::error::{Error, Result};
use marketeer_core::message::ChatTurn;
use marketeer_core::model::ChatModel;
use marketeer_core::platform::PlatformRuleTable;
use marketeer_core::request::RequestDescriptor;
use serde::Serialize;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::context::ContextAssembler;
use crate::validate::{ValidationAudit, validate_and_edit};

/// The result of one successful turn.
#[derive(Debug, Clone, Serialize)]
pub struct TurnOutcome {
    pub turn_id: Uuid,
    /// Canonical id of the platform the text was validated for
    pub platform: String,
    /// Validated, compliant text
    pub final_text: String,
    /// Unmodified model output
    pub raw_text: String,
    pub audit: ValidationAudit,
    pub elapsed_ms: u64,
    pub completed_at: DateTime<Utc>,
}

impl TurnOutcome {
    /// The turn to append to the caller's history.
    pub fn as_chat_turn(&self, user_message: &str) -> ChatTurn {
        ChatTurn::new(user_message, self.final_text.clone())
    }
}

/// Runs copywriting turns against one model and one rule table.
pub struct TurnOrchestrator {
    model: Arc<dyn ChatModel>,
    rules: Arc<PlatformRuleTable>,
    assembler: ContextAssembler,
    timeout: Duration,
}

impl TurnOrchestrator {
    pub fn new(model: Arc<dyn ChatModel>, rules: Arc<PlatformRuleTable>, timeout: Duration) -> Self {
        Self {
            model,
            rules,
            assembler: ContextAssembler::new(),
            timeout,
        }
    }

    pub fn rules(&self) -> &PlatformRuleTable {
        &self.rules
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Run one turn. History is read, never modified.
    pub async fn run_turn(
        &self,
        request: &RequestDescriptor,
        new_user_message: &str,
        history: &[ChatTurn],
    ) -> Result<TurnOutcome> {
        self.run_turn_until(request, new_user_message, history, std::future::pending())
            .await
    }

    /// Run one turn, abandoning the model call with [`Error::Cancelled`] as
    /// soon as `cancel` completes.
    pub async fn run_turn_until<C>(
        &self,
        request: &RequestDescriptor,
        new_user_message: &str,
        history: &[ChatTurn],
        cancel: C,
    ) -> Result<TurnOutcome>
    where
        C: Future<Output = ()>,
    {
        let start = Instant::now();
        let turn_id = Uuid::new_v4();

        let rule = self.rules.get(&request.platform)?;
        let generation = self
            .assembler
            .assemble(request, rule, history, new_user_message)?;

        debug!(
            %turn_id,
            model = self.model.name(),
            platform = rule.id(),
            messages = generation.messages().len(),
            "Calling model"
        );

        let call = tokio::time::timeout(self.timeout, self.model.generate(generation.messages()));
        let raw_text = tokio::select! {
            biased;
            _ = cancel => {
                info!(%turn_id, "Turn cancelled");
                return Err(Error::Cancelled);
            }
            result = call => match result {
                Ok(reply) => reply?,
                Err(_) => {
                    let timeout_ms = self.timeout.as_millis() as u64;
                    warn!(%turn_id, timeout_ms, "Model call timed out");
                    return Err(Error::GenerationTimeout { timeout_ms });
                }
            },
        };

        let (final_text, audit) = validate_and_edit(&raw_text, rule)?;
        let elapsed_ms = start.elapsed().as_millis() as u64;

        info!(
            %turn_id,
            platform = rule.id(),
            raw_length = audit.raw_length,
            final_length = audit.final_length,
            violations = audit.violations.len(),
            elapsed_ms,
            "Turn complete"
        );

        Ok(TurnOutcome {
            turn_id,
            platform: rule.id().to_string(),
            final_text,
            raw_text,
            audit,
            elapsed_ms,
            completed_at: Utc::now(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::test_helpers::{FailingModel, HangingModel, ScriptedModel};
    use marketeer_core::error::ModelError;
    use marketeer_core::message::Role;

    fn orchestrator(model: Arc<dyn ChatModel>) -> TurnOrchestrator {
        TurnOrchestrator::new(
            model,
            Arc::new(PlatformRuleTable::builtin()),
            Duration::from_secs(5),
        )
    }

    fn request(platform: &str) -> RequestDescriptor {
        RequestDescriptor::new("Brew Haven", "Pumpkin latte", platform)
    }

    #[tokio::test]
    async fn turn_returns_final_raw_and_audit() {
        let model = Arc::new(ScriptedModel::single("  No risk, all reward.  "));
        let orch = orchestrator(model.clone());

        let outcome = orch.run_turn(&request("twitter"), "write a post", &[]).await.unwrap();
        assert_eq!(outcome.raw_text, "  No risk, all reward.  ");
        assert_eq!(outcome.final_text, "Low risk, all reward.");
        assert_eq!(outcome.audit.violations.len(), 1);
        assert_eq!(outcome.platform, "twitter");
        assert_eq!(model.call_count(), 1);
    }

    #[tokio::test]
    async fn history_is_forwarded_and_untouched() {
        let model = Arc::new(ScriptedModel::single("Shorter post."));
        let orch = orchestrator(model.clone());
        let history = vec![ChatTurn::new("draft", "A long first draft.")];
        let before = history.clone();

        orch.run_turn(&request("x"), "shorter", &history).await.unwrap();

        assert_eq!(history, before);
        let calls = model.calls();
        let roles: Vec<Role> = calls[0].iter().map(|m| m.role).collect();
        assert_eq!(
            roles,
            vec![Role::Directive, Role::User, Role::Assistant, Role::User]
        );
    }

    #[tokio::test]
    async fn unknown_platform_skips_model() {
        let model = Arc::new(ScriptedModel::new(Vec::<String>::new()));
        let orch = orchestrator(model.clone());
        let err = orch.run_turn(&request("myspace"), "hi", &[]).await.unwrap_err();
        assert!(matches!(err, Error::UnknownPlatform(ref p) if p == "myspace"));
        assert_eq!(model.call_count(), 0);
    }

    #[tokio::test(start_paused = true)]
    async fn slow_model_times_out() {
        let orch = TurnOrchestrator::new(
            Arc::new(HangingModel),
            Arc::new(PlatformRuleTable::builtin()),
            Duration::from_millis(250),
        );
        let err = orch.run_turn(&request("linkedin"), "hi", &[]).await.unwrap_err();
        assert!(matches!(err, Error::GenerationTimeout { timeout_ms: 250 }));
    }

    #[tokio::test]
    async fn cancellation_wins_over_pending_call() {
        let orch = orchestrator(Arc::new(HangingModel));
        let err = orch
            .run_turn_until(&request("linkedin"), "hi", &[], async {})
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Cancelled));
    }

    #[tokio::test]
    async fn model_error_keeps_cause() {
        let orch = orchestrator(Arc::new(FailingModel(ModelError::RateLimited {
            retry_after_secs: 30,
        })));
        let err = orch.run_turn(&request("instagram"), "hi", &[]).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Model(ModelError::RateLimited {
                retry_after_secs: 30
            })
        ));
    }

    #[tokio::test]
    async fn empty_reply_is_an_error() {
        let orch = orchestrator(Arc::new(ScriptedModel::single("   ")));
        let err = orch.run_turn(&request("instagram"), "hi", &[]).await.unwrap_err();
        assert!(matches!(err, Error::EmptyGeneration));
    }

    #[tokio::test]
    async fn outcome_becomes_history_turn() {
        let orch = orchestrator(Arc::new(ScriptedModel::single("Hello fall.")));
        let outcome = orch.run_turn(&request("facebook"), "go", &[]).await.unwrap();
        assert_eq!(outcome.as_chat_turn("go"), ChatTurn::new("go", "Hello fall."));
    }
}
