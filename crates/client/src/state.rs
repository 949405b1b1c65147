use vergestack_core::FieldError;

/// Snapshot of one invoker's lifecycle.
///
/// Idle: nothing set. Pending: `is_pending` only. Success: `data` only.
/// Error: `errors` only.
#[derive(Debug, Clone, PartialEq)]
pub struct ActionState<T> {
    pub data: Option<T>,
    pub errors: Option<Vec<FieldError>>,
    pub is_pending: bool,
}

impl<T> ActionState<T> {
    pub fn idle() -> Self {
        Self {
            data: None,
            errors: None,
            is_pending: false,
        }
    }

    pub fn pending() -> Self {
        Self {
            is_pending: true,
            ..Self::idle()
        }
    }

    pub fn succeeded(data: T) -> Self {
        Self {
            data: Some(data),
            ..Self::idle()
        }
    }

    pub fn failed(errors: Vec<FieldError>) -> Self {
        Self {
            errors: Some(errors),
            ..Self::idle()
        }
    }

    pub fn is_idle(&self) -> bool {
        !self.is_pending && self.data.is_none() && self.errors.is_none()
    }
}

impl<T> Default for ActionState<T> {
    fn default() -> Self {
        Self::idle()
    }
}
