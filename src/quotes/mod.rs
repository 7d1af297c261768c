//! Constant-product pricing engine.
//!
//! Pure functions over a [`LiquidityPool`] snapshot and a swap direction.
//! All integer arithmetic runs on arbitrary-precision integers; floating
//! point appears only in the final price-impact ratio.

use crate::core::{LiquidityPool, SwapError, SwapResult, Token, BASIS_POINT_SCALE};
use num_bigint::BigUint;
use num_traits::{One, ToPrimitive, Zero};
use rust_decimal::prelude::FromPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};

/// Pool reserves ordered for the given swap direction: the reserve of the
/// token being sold first, the reserve being bought second.
pub fn corresponding_reserves(
    pool: &LiquidityPool,
    swap_in_token: &Token,
) -> SwapResult<(u128, u128)> {
    if *swap_in_token == pool.asset_a {
        Ok((pool.reserve_a, pool.reserve_b))
    } else if *swap_in_token == pool.asset_b {
        Ok((pool.reserve_b, pool.reserve_a))
    } else {
        Err(SwapError::TokenNotInPool {
            token: swap_in_token.id(),
            pool: pool.identifier(),
        })
    }
}

/// Convert a percentage fee (e.g. `0.35` meaning 0.35%) to integer basis
/// points. Rounding is fixed to midpoint-away-from-zero so DEXs with
/// different fee encodings cannot drift.
pub fn fee_basis_points(fee_percent: f64) -> SwapResult<u32> {
    let percent = Decimal::from_f64(fee_percent)
        .ok_or_else(|| SwapError::MathDomain(format!("fee percent {} is not finite", fee_percent)))?;

    if percent.is_sign_negative() {
        return Err(SwapError::MathDomain(format!(
            "fee percent {} is negative",
            fee_percent
        )));
    }

    let basis_points = (percent * Decimal::from(100))
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero);
    let basis_points = basis_points
        .to_u32()
        .ok_or(SwapError::MathOverflow)?;

    if basis_points >= BASIS_POINT_SCALE {
        return Err(SwapError::MathDomain(format!(
            "fee percent {} consumes the whole trade",
            fee_percent
        )));
    }

    Ok(basis_points)
}

fn ceil_div(numerator: &BigUint, denominator: &BigUint) -> BigUint {
    (numerator + denominator - BigUint::one()) / denominator
}

/// Output amount for selling `swap_in_amount` of `swap_in_token` into the
/// pool. The fee is deducted from the input (rounded up), then the
/// constant-product invariant is solved for the output with truncating
/// division and a one-unit conservative guard, so the estimate never
/// overstates what the pool will pay out.
pub fn estimated_receive(
    pool: &LiquidityPool,
    swap_in_token: &Token,
    swap_in_amount: u128,
) -> SwapResult<u128> {
    let (reserve_in, reserve_out) = corresponding_reserves(pool, swap_in_token)?;
    if reserve_in == 0 || reserve_out == 0 {
        return Err(SwapError::InvalidPoolState(format!(
            "pool {} has an empty reserve",
            pool.identifier()
        )));
    }

    let fee_bps = fee_basis_points(pool.pool_fee_percent)?;
    let scale = BigUint::from(BASIS_POINT_SCALE);
    let amount = BigUint::from(swap_in_amount);
    let swap_fee = ceil_div(&(&amount * fee_bps), &scale);

    let reserve_in = BigUint::from(reserve_in);
    let reserve_out = BigUint::from(reserve_out);
    let denominator = &reserve_in + &amount - swap_fee;
    if denominator.is_zero() {
        return Err(SwapError::MathDomain(
            "swap denominator collapsed to zero".to_string(),
        ));
    }

    // reserve_out - (reserve_in * reserve_out - 1) / (reserve_in + amount - fee) - 1
    let quotient = (&reserve_in * &reserve_out - BigUint::one()) / denominator;
    let receive = reserve_out - quotient - BigUint::one();

    receive.to_u128().ok_or(SwapError::MathOverflow)
}

/// Input amount required to receive at least `swap_out_amount` of
/// `swap_out_token`: closed-form inverse of [`estimated_receive`] plus a
/// bounded forward search to absorb the fee's ceiling rounding.
pub fn estimated_give(
    pool: &LiquidityPool,
    swap_out_token: &Token,
    swap_out_amount: u128,
) -> SwapResult<u128> {
    let (reserve_out, reserve_in) = corresponding_reserves(pool, swap_out_token)?;
    if reserve_in == 0 || reserve_out == 0 {
        return Err(SwapError::InvalidPoolState(format!(
            "pool {} has an empty reserve",
            pool.identifier()
        )));
    }
    if swap_out_amount == 0 {
        return Ok(0);
    }
    // The -1 output guard means the last reserve unit is never payable.
    if swap_out_amount + 1 >= reserve_out {
        return Err(SwapError::InsufficientLiquidity {
            pool: pool.identifier(),
            available: reserve_out,
            requested: swap_out_amount,
        });
    }

    let swap_in_token = pool.other_asset(swap_out_token)?.clone();
    let fee_bps = fee_basis_points(pool.pool_fee_percent)?;
    let scale = BigUint::from(BASIS_POINT_SCALE);

    let reserve_in_big = BigUint::from(reserve_in);
    let reserve_out_big = BigUint::from(reserve_out);
    let target = BigUint::from(reserve_out - swap_out_amount - 1);

    // Smallest net input satisfying the constant-product bound, then grossed
    // back up for the input fee.
    let required = ceil_div(&(&reserve_in_big * &reserve_out_big - BigUint::one()), &target);
    let net = if required > reserve_in_big {
        required - reserve_in_big
    } else {
        BigUint::zero()
    };
    let gross = ceil_div(&(&net * &scale), &(&scale - BigUint::from(fee_bps)));

    let mut give = gross.to_u128().ok_or(SwapError::MathOverflow)?;
    for _ in 0..=4 {
        if estimated_receive(pool, &swap_in_token, give)? >= swap_out_amount {
            return Ok(give);
        }
        give = give.checked_add(1).ok_or(SwapError::MathOverflow)?;
    }

    Err(SwapError::MathDomain(
        "inverted swap search did not converge".to_string(),
    ))
}

/// Scale an estimated receive down by a slippage tolerance, using the same
/// basis-point conversion as the fee path.
pub fn minimum_receive(estimated_receive: u128, slippage_percent: f64) -> SwapResult<u128> {
    if slippage_percent < 0.0 {
        return Err(SwapError::InvalidSlippage(
            "Slippage percent must be zero or above.".to_string(),
        ));
    }

    let slippage_bps = Decimal::from_f64(slippage_percent)
        .ok_or_else(|| {
            SwapError::MathDomain(format!("slippage percent {} is not finite", slippage_percent))
        })?
        .checked_mul(Decimal::from(100))
        .ok_or(SwapError::MathOverflow)?
        .round_dp_with_strategy(0, RoundingStrategy::MidpointAwayFromZero)
        .to_u128()
        .ok_or(SwapError::MathOverflow)?;

    let scale = BigUint::from(BASIS_POINT_SCALE);
    let minimum = (BigUint::from(estimated_receive) * &scale) / (scale + BigUint::from(slippage_bps));

    minimum.to_u128().ok_or(SwapError::MathOverflow)
}

/// Deviation of the realized marginal price from the pool's pre-trade spot
/// price, as a percentage of their average. A zero estimated receive is a
/// domain error, never an infinite ratio.
pub fn price_impact_percent(
    pool: &LiquidityPool,
    swap_in_token: &Token,
    swap_in_amount: u128,
) -> SwapResult<f64> {
    let receive = estimated_receive(pool, swap_in_token, swap_in_amount)?;
    if receive == 0 {
        return Err(SwapError::MathDomain(
            "price impact is undefined for a zero estimated receive".to_string(),
        ));
    }

    let (reserve_in, reserve_out) = corresponding_reserves(pool, swap_in_token)?;
    let spot_price = reserve_in as f64 / reserve_out as f64;
    let swap_price = swap_in_amount as f64 / receive as f64;

    Ok((swap_price - spot_price).abs() / ((swap_price + spot_price) / 2.0) * 100.0)
}
