use super::ConfigurationError;

/// Checks the event names a listener subscribes to.
///
/// The list must be non-empty and every entry must be a non-empty name.
/// Duplicates are allowed: a listener subscribed twice to the same event is
/// invoked twice per firing.
pub fn validate_listen_to<S: AsRef<str>>(
    listener: &str,
    listen_to: &[S],
) -> Result<(), ConfigurationError> {
    if listen_to.is_empty() {
        return Err(ConfigurationError::NoSubscriptions {
            listener: listener.to_owned(),
        });
    }

    if let Some(index) = listen_to.iter().position(|n| n.as_ref().is_empty()) {
        return Err(ConfigurationError::SubscriptionEmpty {
            listener: listener.to_owned(),
            index,
        });
    }

    Ok(())
}
