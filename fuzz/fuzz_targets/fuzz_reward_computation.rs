#![no_main]

use arbitrary::Arbitrary;
use libfuzzer_sys::fuzz_target;

use stake_rewards::{div_round_half_up, RewardEngine};
use stake_types::LedgerParams;

#[derive(Debug, Arbitrary)]
struct Input {
    principal: u128,
    elapsed: u64,
    apy_bps: u64,
    rate_divisor: u64,
    seconds_per_year: u64,
    reward_scale: u64,
}

// Reward computation must never panic, and must agree with the unscaled
// half-up quotient whenever that quotient is computable.
fuzz_target!(|input: Input| {
    let params = LedgerParams {
        apy_bps: input.apy_bps,
        rate_divisor: input.rate_divisor,
        seconds_per_year: input.seconds_per_year,
        reward_scale: input.reward_scale.max(1),
        ..LedgerParams::default()
    };
    let engine = RewardEngine::new(params);
    let result = engine.accrued(input.principal, input.elapsed);

    let numerator = input
        .principal
        .checked_mul(u128::from(input.apy_bps))
        .and_then(|v| v.checked_mul(u128::from(input.elapsed)));
    let denominator = u128::from(input.rate_divisor) * u128::from(input.seconds_per_year);
    if let (Some(n), Ok(reward)) = (numerator, &result) {
        assert_eq!(Ok(*reward), div_round_half_up(n, denominator));
    }
});
