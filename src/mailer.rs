use axum::async_trait;
use tracing::{info, warn};

/// Outbound mail seam. Delivery is best-effort everywhere it is used:
/// callers log a failure and carry on with the primary operation.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()>;
}

/// Default implementation: writes the mail to the log. Swap in a real
/// provider behind the same trait for production delivery.
pub struct LogMailer {
    pub from: String,
}

#[async_trait]
impl Mailer for LogMailer {
    async fn send(&self, to: &str, subject: &str, body: &str) -> anyhow::Result<()> {
        info!(from = %self.from, %to, %subject, %body, "outbound mail");
        Ok(())
    }
}

/// Fire-and-forget helper: a delivery failure must never fail the
/// registration/reset flow that triggered it.
pub async fn send_best_effort(mailer: &dyn Mailer, to: &str, subject: &str, body: &str) {
    if let Err(e) = mailer.send(to, subject, body).await {
        warn!(error = %e, %to, "mail delivery failed; continuing");
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct FailingMailer;

    #[async_trait]
    impl Mailer for FailingMailer {
        async fn send(&self, _to: &str, _subject: &str, _body: &str) -> anyhow::Result<()> {
            anyhow::bail!("smtp down")
        }
    }

    #[tokio::test]
    async fn log_mailer_always_succeeds() {
        let mailer = LogMailer { from: "no-reply@test".into() };
        mailer.send("a@b.c", "hi", "body").await.expect("log mailer");
    }

    #[tokio::test]
    async fn best_effort_swallows_failures() {
        // Must not panic or propagate.
        send_best_effort(&FailingMailer, "a@b.c", "hi", "body").await;
    }
}
