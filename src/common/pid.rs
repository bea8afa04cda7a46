use crate::Pid;

/// Sequential packet identifier allocator.
///
/// Owned by one session. The first call returns 1, identifiers increase by
/// one per call and wrap from 65535 back to 1. Identifiers are not tracked
/// after they are issued, so no acknowledgement state lives here.
#[derive(Debug, Clone, Default)]
pub struct PidAllocator {
    last: Option<Pid>,
}

impl PidAllocator {
    pub fn new() -> Self {
        Self::default()
    }

    /// Issue the next packet identifier.
    pub fn next(&mut self) -> Pid {
        let pid = self.peek();
        self.last = Some(pid);
        pid
    }

    /// The identifier the next `next` call will issue.
    pub fn peek(&self) -> Pid {
        match self.last {
            Some(last) => last + 1,
            None => Pid::default(),
        }
    }

    /// The identifier issued by the previous `next` call.
    pub fn last(&self) -> Option<Pid> {
        self.last
    }
}

#[cfg(test)]
mod tests {
    use std::collections::HashSet;

    use super::*;

    #[test]
    fn test_sequential() {
        let mut pids = PidAllocator::new();
        assert_eq!(pids.last(), None);
        assert_eq!(pids.peek().value(), 1);
        assert_eq!(pids.peek().value(), 1);
        assert_eq!(pids.next().value(), 1);
        assert_eq!(pids.next().value(), 2);
        assert_eq!(pids.next().value(), 3);
        assert_eq!(pids.last().map(Pid::value), Some(3));
    }

    #[test]
    fn test_wraparound() {
        let mut pids = PidAllocator::new();
        let mut seen = HashSet::new();
        for expected in 1..=u16::MAX {
            let pid = pids.next();
            assert_eq!(pid.value(), expected);
            assert!(seen.insert(pid));
        }
        assert_eq!(seen.len(), 65535);
        assert_eq!(pids.next().value(), 1);
        assert_eq!(pids.next().value(), 2);
    }
}
