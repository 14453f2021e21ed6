#![no_main]

use bootloader_core::{process_cycle, BootBus, BootCore, NackCode, QUEUE_CAPACITY};
use libfuzzer_sys::fuzz_target;

#[derive(Default)]
struct NoopBus {
    now_us: u64,
    flash_busy_until_us: u64,
}

impl BootBus for NoopBus {
    fn tick_us(&mut self) -> u64 {
        self.now_us += 1_000;
        self.now_us
    }

    fn start_flash_write(&mut self, _address: u32, _data: &[u8]) -> bool {
        if self.now_us < self.flash_busy_until_us {
            return false;
        }
        self.flash_busy_until_us = self.now_us + 1_500;
        true
    }

    fn flash_write_complete(&mut self) -> bool {
        self.now_us >= self.flash_busy_until_us
    }

    fn send_ack(&mut self) {}

    fn send_nack(&mut self, _code: NackCode) {}
}

fuzz_target!(|data: &[u8]| {
    let mut core = BootCore::new();
    let mut bus = NoopBus::default();

    // First byte of each chunk doubles as a cycle trigger so the storm
    // interleaves ingress with supervisor cycles.
    for chunk in data.chunks(33) {
        core.receive_packet(chunk);
        if chunk.first().is_some_and(|byte| byte % 3 == 0) {
            process_cycle(&mut core, &mut bus);
        }
        assert!(core.queued_packets() <= QUEUE_CAPACITY);
    }

    process_cycle(&mut core, &mut bus);
    assert_eq!(core.queued_packets(), 0);
});
