//! Deterministic end-to-end update fingerprint used by CI cross-host
//! comparison: same image, same tick, same fingerprint on every machine.

use bootloader_core::{
    crc16_ccitt, process_cycle, BootBus, BootCore, BootState, NackCode,
};
use proptest as _;
use rstest as _;
#[cfg(feature = "serde")]
use serde as _;
use thiserror as _;

struct SimBus {
    now_us: u64,
    flash_busy_until_us: u64,
    acks: u32,
    nacks: u32,
}

impl SimBus {
    const fn new() -> Self {
        Self {
            now_us: 0,
            flash_busy_until_us: 0,
            acks: 0,
            nacks: 0,
        }
    }
}

impl BootBus for SimBus {
    fn tick_us(&mut self) -> u64 {
        self.now_us += 1_000;
        self.now_us
    }

    fn start_flash_write(&mut self, _address: u32, _data: &[u8]) -> bool {
        if self.now_us < self.flash_busy_until_us {
            return false;
        }
        self.flash_busy_until_us = self.now_us + 800;
        true
    }

    fn flash_write_complete(&mut self) -> bool {
        self.now_us >= self.flash_busy_until_us
    }

    fn send_ack(&mut self) {
        self.acks += 1;
    }

    fn send_nack(&mut self, _code: NackCode) {
        self.nacks += 1;
    }
}

fn hash_bytes(hash: &mut u64, bytes: &[u8]) {
    for byte in bytes {
        *hash ^= u64::from(*byte);
        *hash = hash.wrapping_mul(0x1000_0000_01B3);
    }
}

fn fingerprint() -> String {
    let image: Vec<u8> = (0_u32..4096)
        .map(|value| u8::try_from(value % 241).expect("residue fits a byte"))
        .collect();

    let mut core = BootCore::new();
    let mut bus = SimBus::new();

    let mut start = vec![0x00, 0x01];
    #[allow(clippy::cast_possible_truncation)]
    start.extend_from_slice(&(image.len() as u32).to_be_bytes());
    start.extend_from_slice(&crc16_ccitt(&image).to_be_bytes());
    assert!(core.receive_packet(&start));
    process_cycle(&mut core, &mut bus);

    let mut sequence = 1_u8;
    for chunk in image.chunks(128) {
        let mut frame = vec![sequence, 0x02];
        frame.extend_from_slice(chunk);
        loop {
            assert!(core.receive_packet(&frame));
            let nacks_before = bus.nacks;
            process_cycle(&mut core, &mut bus);
            if bus.nacks == nacks_before {
                break;
            }
        }
        sequence = if sequence == u8::MAX { 1 } else { sequence + 1 };
    }

    assert!(core.receive_packet(&[0x00, 0x03]));
    process_cycle(&mut core, &mut bus);

    while core.state() != BootState::Idle {
        process_cycle(&mut core, &mut bus);
    }

    let report = core.status_report();
    let mut hash = 0xcbf2_9ce4_8422_2325_u64;
    hash_bytes(&mut hash, &report.stats.packets_processed.to_le_bytes());
    hash_bytes(&mut hash, &report.stats.packets_dropped.to_le_bytes());
    hash_bytes(&mut hash, &report.stats.error_count.to_le_bytes());
    hash_bytes(&mut hash, &report.stats.app_launch_attempts.to_le_bytes());
    hash_bytes(&mut hash, &bus.acks.to_le_bytes());
    hash_bytes(&mut hash, &bus.nacks.to_le_bytes());
    hash_bytes(&mut hash, &bus.now_us.to_le_bytes());
    let record = core.validation().expect("transfer verifies");
    hash_bytes(&mut hash, &record.calculated_crc.to_le_bytes());
    hash_bytes(&mut hash, &[u8::from(record.valid)]);

    format!("{hash:016x}")
}

fn main() {
    println!("{}", fingerprint());
}
