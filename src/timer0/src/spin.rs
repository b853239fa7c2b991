/// Blocks until a condition holds by repeatedly checking it.
///
/// There is no timeout. An implementation returns only after `cond` has
/// returned `true`, calling it at least once.
pub trait SpinWait {
    fn spin_until(&mut self, cond: impl FnMut() -> bool);
}

impl<T: SpinWait> SpinWait for &mut T {
    #[inline]
    fn spin_until(&mut self, cond: impl FnMut() -> bool) {
        (**self).spin_until(cond)
    }
}

/// The hardware spin-wait. Spins forever if the condition never holds.
#[derive(Debug, Default, Copy, Clone)]
pub struct BusyWait;

impl SpinWait for BusyWait {
    #[inline]
    fn spin_until(&mut self, mut cond: impl FnMut() -> bool) {
        while !cond() {
            core::hint::spin_loop();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn busy_wait_calls_until_true() {
        let mut calls = 0;
        BusyWait.spin_until(|| {
            calls += 1;
            calls == 7
        });
        assert_eq!(calls, 7);
    }

    #[test]
    fn busy_wait_checks_once_if_already_true() {
        let mut calls = 0;
        BusyWait.spin_until(|| {
            calls += 1;
            true
        });
        assert_eq!(calls, 1);
    }
}
