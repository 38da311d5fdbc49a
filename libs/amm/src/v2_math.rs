//! Constant-product (x*y=k) AMM math over 256-bit integers.
//!
//! Every monetary magnitude here is wei-scale and integer; `Decimal`/`f64` never touch
//! a reserve or an amount, only heuristic scores built from these results downstream.

use crate::KernelError;
use ethers::types::U256;

/// Pool reserves and fee structure for a constant-product pool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct V2PoolState {
    pub reserve_in: U256,
    pub reserve_out: U256,
    pub fee_bps: u32,
}

pub struct V2Math;

impl V2Math {
    /// Exact output amount for the constant-product formula, net of fees.
    pub fn calculate_output_amount(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: u32,
    ) -> Result<U256, KernelError> {
        if amount_in.is_zero() {
            return Err(KernelError::InvalidInput("amount_in must be positive".into()));
        }
        if reserve_in.is_zero() || reserve_out.is_zero() {
            return Err(KernelError::InvalidInput("reserves must be positive".into()));
        }
        if fee_bps > 10_000 {
            return Err(KernelError::InvalidInput("fee_bps exceeds 10000".into()));
        }

        let amount_in_after_fee = amount_in
            .checked_mul(U256::from(10_000 - fee_bps))
            .ok_or(KernelError::Overflow)?
            / U256::from(10_000u32);

        let numerator = amount_in_after_fee
            .checked_mul(reserve_out)
            .ok_or(KernelError::Overflow)?;
        let denominator = reserve_in
            .checked_add(amount_in_after_fee)
            .ok_or(KernelError::Overflow)?;

        if denominator.is_zero() {
            return Err(KernelError::InvalidInput("denominator is zero".into()));
        }

        Ok(numerator / denominator)
    }

    /// Required input amount to receive `amount_out`, rounded up.
    pub fn calculate_input_amount(
        amount_out: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: u32,
    ) -> Result<U256, KernelError> {
        if amount_out.is_zero() {
            return Err(KernelError::InvalidInput("amount_out must be positive".into()));
        }
        if amount_out >= reserve_out {
            return Err(KernelError::InvalidInput("output exceeds reserves".into()));
        }

        let numerator = reserve_in
            .checked_mul(amount_out)
            .and_then(|v| v.checked_mul(U256::from(10_000u32)))
            .ok_or(KernelError::Overflow)?;
        let denominator = (reserve_out - amount_out)
            .checked_mul(U256::from(10_000 - fee_bps))
            .ok_or(KernelError::Overflow)?;

        if denominator.is_zero() {
            return Err(KernelError::InvalidInput("denominator is zero".into()));
        }

        Ok(numerator / denominator + U256::one())
    }

    /// Closed-form optimal arbitrage amount between two pools reached in sequence:
    /// buy from `pool_a`, sell to `pool_b`. x* = (sqrt(r_a_in*r_a_out*r_b_in*r_b_out*fee_a*fee_b) - r_a_in*fee_a) / fee_a,
    /// with fee_a/fee_b expressed as numerator-over-10000 fractions to stay integral.
    pub fn calculate_optimal_arbitrage_amount(
        pool_a: &V2PoolState,
        pool_b: &V2PoolState,
    ) -> Result<U256, KernelError> {
        let fee_a = U256::from(10_000 - pool_a.fee_bps);
        let fee_b = U256::from(10_000 - pool_b.fee_bps);
        let scale = U256::from(10_000u32);

        let product = [
            pool_a.reserve_in,
            pool_a.reserve_out,
            pool_b.reserve_out,
            pool_b.reserve_in,
        ]
        .into_iter()
        .try_fold(fee_a.checked_mul(fee_b).ok_or(KernelError::Overflow)?, |acc, term| {
            acc.checked_mul(term)
        })
        .ok_or(KernelError::Overflow)?;

        if product.is_zero() {
            return Ok(U256::zero());
        }

        // The product above carries two extra factors of `scale` (from fee_a, fee_b);
        // undo them before taking the square root so units line up with reserve_in.
        let sqrt_value = crate::integer_sqrt(product) * scale;
        let r_a_in_fee_a = pool_a
            .reserve_in
            .checked_mul(fee_a)
            .ok_or(KernelError::Overflow)?;

        if sqrt_value <= r_a_in_fee_a {
            return Ok(U256::zero());
        }

        let optimal_amount = (sqrt_value - r_a_in_fee_a) / fee_a;

        // Cap at 10% of the smaller side of liquidity.
        let max_amount = pool_a.reserve_in.min(pool_b.reserve_out) / U256::from(10u8);
        Ok(optimal_amount.min(max_amount))
    }

    /// Fraction of the pre-trade price lost to slippage + fee, in parts-per-million.
    pub fn calculate_slippage_ppm(
        amount_in: U256,
        reserve_in: U256,
        reserve_out: U256,
        fee_bps: u32,
    ) -> Result<u32, KernelError> {
        let ideal_output = amount_in
            .checked_mul(reserve_out)
            .ok_or(KernelError::Overflow)?
            / reserve_in;
        let actual_output =
            Self::calculate_output_amount(amount_in, reserve_in, reserve_out, fee_bps)?;

        if ideal_output.is_zero() {
            return Ok(0);
        }
        if actual_output >= ideal_output {
            return Ok(0);
        }

        let shortfall = ideal_output - actual_output;
        let ppm = shortfall
            .checked_mul(U256::from(1_000_000u32))
            .ok_or(KernelError::Overflow)?
            / ideal_output;
        Ok(ppm.min(U256::from(1_000_000u32)).as_u32())
    }
}
