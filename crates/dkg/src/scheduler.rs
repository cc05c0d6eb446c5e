//! # Height Scheduler Policy
//!
//! Kebijakan stateless yang dievaluasi sekali per committed block:
//! kapan round baru dimulai dan di height mana verifier handover terjadi.
//!
//! ## Change height
//!
//! ```text
//! change_height = (h + BLOCKS_AHEAD) − ((h + BLOCKS_AHEAD) mod 5)
//! ```
//!
//! Pembulatan ke kelipatan 5 membuat semua honest node mendapat swap
//! height yang sama walaupun menyelesaikan round di height yang sedikit
//! berbeda.

/// Swap verifier disepakati sekitar sebanyak ini block setelah completion.
pub const BLOCKS_AHEAD: u64 = 20;

/// Modulus pembulatan change height.
pub const CHANGE_HEIGHT_MODULUS: u64 = 5;

/// Cadence default: node menjalankan DKG setiap sekian block.
pub const DEFAULT_DKG_NUM_BLOCKS: u64 = 100;

/// Kapasitas message queue lokal, mengikuti queue consensus engine.
pub const MSG_QUEUE_SIZE: usize = 1000;

/// Batas task detached yang boleh hidup bersamaan untuk menampung
/// overflow queue.
pub const OVERFLOW_TASK_BUDGET: usize = 64;

/// Height di mana semua node mempromosikan `next` menjadi `current`,
/// dihitung dari height saat dealer menghasilkan verifier.
#[must_use]
pub const fn change_height_for(height: u64) -> u64 {
    let target = height + BLOCKS_AHEAD;
    target - (target % CHANGE_HEIGHT_MODULUS)
}

/// Cadence konfigurasi nol di-coerce ke default.
#[must_use]
pub const fn coerce_num_blocks(num_blocks: u64) -> u64 {
    if num_blocks == 0 {
        DEFAULT_DKG_NUM_BLOCKS
    } else {
        num_blocks
    }
}

/// Apakah round baru harus dimulai di height ini.
///
/// Height 0 dan 1 selalu di-skip, sekalipun memenuhi kondisi modular.
#[must_use]
pub const fn round_cadence_reached(height: u64, num_blocks: u64) -> bool {
    height > 1 && height % num_blocks == 0
}
