//! Log-only notification channel

use dibs_domain::traits::Notifier;
use dibs_domain::PrincipalId;
use std::convert::Infallible;

/// Notifier that records deliveries in the log
///
/// Stands in for a real delivery channel: deployments that send email or
/// chat messages swap in their own `Notifier` implementation; everyone else
/// gets an audit trail of what would have been sent.
pub struct LogNotifier;

impl Notifier for LogNotifier {
    type Error = Infallible;

    fn notify(&self, recipient: PrincipalId, message: &str) -> Result<(), Self::Error> {
        tracing::info!(recipient = %recipient, message, "notification dispatched");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_log_notifier_never_fails() {
        assert!(LogNotifier.notify(PrincipalId::new(), "hello").is_ok());
    }
}
