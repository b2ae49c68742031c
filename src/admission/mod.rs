//! Global request admission.
//!
//! # Responsibilities
//! - Assign each inbound request a strictly increasing ordinal
//! - Enforce the process-wide access count ceiling
//! - Keep ordinal assignment and the ceiling check a single atomic step
//!
//! # Design Decisions
//! - The counter is private to the gate; `admit()` is the only mutation path
//! - `fetch_add` makes the ordinal exclusively owned by one caller, so the
//!   ceiling comparison is a pure function of it
//! - Rejected requests still consume their ordinal; the sequence has no gaps

use std::sync::atomic::{AtomicU64, Ordering};

/// Outcome of one admission check.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Admission {
    /// This request's position in the global sequence, starting at 1.
    pub ordinal: u64,
    /// Whether the request may proceed to the forwarder.
    pub admitted: bool,
}

/// Process-wide admission gate.
///
/// Tracks how many requests have been seen and rejects everything past the
/// configured ceiling. With no ceiling, every request is admitted.
#[derive(Debug)]
pub struct AdmissionGate {
    counter: AtomicU64,
    ceiling: Option<u64>,
}

impl AdmissionGate {
    /// Create a gate with the given ceiling. `None` means unlimited.
    pub fn new(ceiling: Option<u64>) -> Self {
        Self {
            counter: AtomicU64::new(0),
            ceiling,
        }
    }

    /// Claim the next ordinal and decide admission.
    ///
    /// Increments the counter exactly once per call, rejection included.
    /// Safe under unbounded concurrent invocation: no two callers observe
    /// the same ordinal and no ordinal is skipped.
    pub fn admit(&self) -> Admission {
        let ordinal = self.counter.fetch_add(1, Ordering::SeqCst) + 1;
        let admitted = match self.ceiling {
            Some(ceiling) => ordinal <= ceiling,
            None => true,
        };
        Admission { ordinal, admitted }
    }

    /// Configured ceiling, if any.
    pub fn ceiling(&self) -> Option<u64> {
        self.ceiling
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;
    use std::sync::Arc;

    #[test]
    fn ordinals_are_sequential() {
        let gate = AdmissionGate::new(None);
        for expected in 1..=100 {
            let adm = gate.admit();
            assert_eq!(adm.ordinal, expected);
            assert!(adm.admitted);
        }
    }

    #[test]
    fn ceiling_rejects_everything_past_it() {
        let gate = AdmissionGate::new(Some(3));
        assert!(gate.admit().admitted);
        assert!(gate.admit().admitted);
        assert!(gate.admit().admitted);
        let fourth = gate.admit();
        assert!(!fourth.admitted);
        assert_eq!(fourth.ordinal, 4);
        assert!(!gate.admit().admitted);
    }

    #[test]
    fn ceiling_zero_rejects_every_request() {
        let gate = AdmissionGate::new(Some(0));
        let adm = gate.admit();
        assert!(!adm.admitted);
        assert_eq!(adm.ordinal, 1);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_admissions_are_exact() {
        const N: usize = 1000;
        const CEILING: u64 = 250;

        let gate = Arc::new(AdmissionGate::new(Some(CEILING)));
        let mut handles = Vec::with_capacity(N);
        for _ in 0..N {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move { gate.admit() }));
        }

        let mut ordinals = HashSet::new();
        let mut admitted = 0usize;
        for handle in handles {
            let adm = handle.await.unwrap();
            assert!(
                ordinals.insert(adm.ordinal),
                "ordinal {} observed twice",
                adm.ordinal
            );
            assert!(adm.ordinal >= 1 && adm.ordinal <= N as u64);
            if adm.admitted {
                admitted += 1;
                assert!(adm.ordinal <= CEILING);
            } else {
                assert!(adm.ordinal > CEILING);
            }
        }
        assert_eq!(ordinals.len(), N);
        assert_eq!(admitted, CEILING as usize);
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 8)]
    async fn concurrent_unlimited_admits_everything() {
        let gate = Arc::new(AdmissionGate::new(None));
        let mut handles = Vec::new();
        for _ in 0..500 {
            let gate = gate.clone();
            handles.push(tokio::spawn(async move { gate.admit() }));
        }
        for handle in handles {
            assert!(handle.await.unwrap().admitted);
        }
    }
}
