/*++

Licensed under the Apache-2.0 license.

File Name:

    mod.rs

Abstract:

    File contains exports for code useful for testing devices.

--*/
mod fake_irq;

pub use fake_irq::FakeIrq;
