#![forbid(unsafe_code)]

//! Programmatic configuration for scopes and lists.
//!
//! There is no environment or file based configuration; callers build these
//! structs directly and pass them to the `with_config` constructors.

/// What a [`Subscriptions`](crate::scope::Subscriptions) scope does with a
/// disposable added after the scope itself was disposed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AfterDispose {
    /// Dispose the incoming disposable on the spot and hand back
    /// [`SubscriptionHandle::INVALID`](crate::scope::SubscriptionHandle::INVALID).
    #[default]
    DisposeImmediately,
    /// Refuse the add with [`ReactiveError::ScopeDisposed`](crate::ReactiveError::ScopeDisposed).
    /// The incoming disposable is dropped, which disposes it.
    Reject,
}

/// Configuration for a subscription scope.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ScopeConfig {
    /// Policy for adds that arrive after disposal.
    pub after_dispose: AfterDispose,
}

impl ScopeConfig {
    /// Set the post-dispose policy.
    #[must_use]
    pub fn with_after_dispose(mut self, policy: AfterDispose) -> Self {
        self.after_dispose = policy;
        self
    }
}

/// Configuration for an observable list.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ListConfig {
    /// Number of elements to pre-allocate room for.
    pub capacity: usize,
}

impl ListConfig {
    /// Set the initial capacity.
    #[must_use]
    pub fn with_capacity(mut self, capacity: usize) -> Self {
        self.capacity = capacity;
        self
    }
}
