#![no_main]

use libfuzzer_sys::fuzz_target;

// Stored records are decoded straight from LMDB values; malformed bytes must
// produce an error, never a panic.
fuzz_target!(|data: &[u8]| {
    if let Ok(position) = bincode::deserialize::<stake_types::StakePosition>(data) {
        let _ = position.matures_at(stake_types::params::SECONDS_PER_MONTH);
        let _ = position.cleared();
    }
    let _ = bincode::deserialize::<stake_store::Totals>(data);
    let _ = bincode::deserialize::<stake_types::Timestamp>(data);
    let _ = bincode::deserialize::<stake_types::AccountId>(data);
});
