use super::ConfigurationError;

pub fn validate_listener_name(name: &str) -> Result<(), ConfigurationError> {
    if name.is_empty() {
        return Err(ConfigurationError::ListenerNameEmpty);
    }

    Ok(())
}

pub fn validate_event_name(name: &str) -> Result<(), ConfigurationError> {
    if name.is_empty() {
        return Err(ConfigurationError::EventNameEmpty);
    }

    Ok(())
}
