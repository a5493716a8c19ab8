/*++

Licensed under the Apache-2.0 license.

File Name:

    fake_irq.rs

Abstract:

    File contains an IrqLine implementation that records every level change.

--*/
use std::cell::{Cell, RefCell};
use std::rc::Rc;

use crate::IrqLine;

/// An interrupt line that remembers its current level and the history of
/// calls to `set_level()`.
///
/// Clones share the same state, so a test can hand one clone to a device and
/// keep another for assertions.
///
/// # Example
///
/// ```
/// use ccp_emu_bus::{IrqLine, testing::FakeIrq};
///
/// let irq = FakeIrq::new();
/// let device_side = irq.clone();
/// device_side.set_level(true);
/// assert!(irq.is_high());
/// assert_eq!(irq.take_history(), vec![true]);
/// ```
#[derive(Clone, Default)]
pub struct FakeIrq {
    level: Rc<Cell<bool>>,
    history: Rc<RefCell<Vec<bool>>>,
}

impl FakeIrq {
    pub fn new() -> Self {
        Self::default()
    }

    /// Level of the most recent `set_level()` call. A line that was never
    /// driven is low.
    pub fn is_high(&self) -> bool {
        self.level.get()
    }

    /// Returns every level driven since the last call, oldest first.
    pub fn take_history(&self) -> Vec<bool> {
        std::mem::take(&mut *self.history.borrow_mut())
    }
}

impl IrqLine for FakeIrq {
    fn set_level(&self, is_high: bool) {
        self.level.set(is_high);
        self.history.borrow_mut().push(is_high);
    }
}
