//! Configurable bounds for archive navigation.

/// Bounds applied while navigating an archive.
///
/// Archive content is caller-supplied and possibly hostile; the only
/// unbounded construct in the format is a chain of link entries pointing
/// at each other, so resolution carries an explicit hop budget.
///
/// # Example
///
/// ```
/// use ustar_nav::nav::Limits;
///
/// let limits = Limits::default();
/// assert_eq!(limits.max_link_depth, 40);
///
/// let strict = Limits { max_link_depth: 4 };
/// # let _ = strict;
/// ```
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Limits {
    /// Maximum number of symlink/hardlink hops followed while resolving a
    /// path to a non-link entry. Exceeding the bound yields
    /// [`NavError::LinkLoop`] rather than looping forever on a cyclic
    /// chain.
    ///
    /// Default: 40, matching the kernel's symlink resolution bound.
    ///
    /// [`NavError::LinkLoop`]: super::NavError::LinkLoop
    pub max_link_depth: usize,
}

impl Default for Limits {
    fn default() -> Self {
        Self { max_link_depth: 40 }
    }
}

impl Limits {
    /// Create a new `Limits` with default values.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_limits() {
        assert_eq!(Limits::default().max_link_depth, 40);
        assert_eq!(Limits::new(), Limits::default());
    }
}
