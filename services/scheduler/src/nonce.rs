//! A single signer address serves every strategy task, so nonce assignment has to be
//! centralized even though strategy tasks otherwise run independently (spec.md §4.9).
//! An atomic counter is the simplest thing that can't hand out the same nonce twice.

use std::sync::atomic::{AtomicU64, Ordering};

use ethers::types::U256;

pub struct NonceAllocator {
    next: AtomicU64,
}

impl NonceAllocator {
    pub fn starting_at(nonce: u64) -> Self {
        Self { next: AtomicU64::new(nonce) }
    }

    pub fn next(&self) -> U256 {
        U256::from(self.next.fetch_add(1, Ordering::SeqCst))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn hands_out_strictly_increasing_nonces() {
        let alloc = NonceAllocator::starting_at(5);
        assert_eq!(alloc.next(), U256::from(5u64));
        assert_eq!(alloc.next(), U256::from(6u64));
        assert_eq!(alloc.next(), U256::from(7u64));
    }
}
