/// Classification for retry policy.
///
/// Used by callers walking a provider chain to decide how loudly to report a
/// failure and whether a stale cached answer is an acceptable substitute.
///
/// | Class | Try Next Provider? | Transient? |
/// |-------|-------------------|------------|
/// | `Never` | Yes (another provider may know the symbol) | No |
/// | `WithBackoff` | Yes | Yes |
/// | `NextProvider` | Yes | Yes |
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub enum RetryClass {
    /// Terminal for this provider: bad symbol, validation error, unsupported call.
    Never,

    /// Rate limiting (429) or timeout. The same request may succeed later.
    WithBackoff,

    /// The provider failed (5xx, malformed body, transport error).
    NextProvider,
}

impl RetryClass {
    /// Whether the failure says something about the provider's health rather
    /// than about the request itself.
    pub fn is_transient(&self) -> bool {
        !matches!(self, Self::Never)
    }
}
