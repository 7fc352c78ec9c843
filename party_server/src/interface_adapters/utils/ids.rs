use std::sync::atomic::{AtomicU64, Ordering};

use crate::domain::ConnId;

/// Returns a process-unique connection id. Ids start at 1 and are never reused
/// while the process lives.
pub fn next_conn_id() -> ConnId {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    NEXT.fetch_add(1, Ordering::Relaxed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn ids_are_unique_and_increasing() {
        let a = next_conn_id();
        let b = next_conn_id();
        assert!(a >= 1);
        assert!(b > a);
    }
}
