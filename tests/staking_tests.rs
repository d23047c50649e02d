//! Staking lifecycle tests: warmup, claim, forfeit, locks, unstake,
//! wrap/unwrap, and the rebase loop.

mod common;

use common::{env, EPOCH_LENGTH};
use fiscus::prelude::*;

// ═══════════════════════════════════════════════════════════════════════════════
// STAKE / CLAIM / FORFEIT
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_immediate_stake_pays_rebasing() {
    let mut e = env();
    let before = e.sfisc_of(e.alice);
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, true, true).unwrap();
    assert_eq!(e.sfisc_of(e.alice), before + 10 * BASE_UNIT);
    assert_eq!(e.fisc_of(e.alice), 90 * BASE_UNIT);
}

#[test]
fn test_immediate_stake_pays_wrapped() {
    let mut e = env();
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, false, true).unwrap();
    // index is 10.0, so 10 FISC wraps to 1 unit worth of gons
    assert_eq!(e.p.gfisc.balance_of(e.alice), BASE_UNIT as u128);
}

#[test]
fn test_warmup_holds_claim_until_expiry() {
    let mut e = env();
    e.p.set_warmup_length(e.governor, 2).unwrap();
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, true, true).unwrap();

    assert_eq!(e.p.supply_in_warmup(), 10 * BASE_UNIT);
    assert_eq!(e.sfisc_of(e.alice), 10 * BASE_UNIT); // pre-existing balance only

    // before expiry the claim pays nothing, silently
    assert_eq!(e.p.claim(e.alice, e.alice, true).unwrap(), 0);

    // two epoch turns mature the warmup
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();

    let paid = e.p.claim(e.alice, e.alice, true).unwrap();
    assert!(paid >= 10 * BASE_UNIT);
    assert_eq!(e.p.supply_in_warmup(), 0);
    // a second claim finds nothing
    assert_eq!(e.p.claim(e.alice, e.alice, true).unwrap(), 0);
}

#[test]
fn test_stake_without_claim_queues_even_with_zero_warmup() {
    let mut e = env();
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, true, false).unwrap();
    assert_eq!(e.p.supply_in_warmup(), 10 * BASE_UNIT);
    // warmup of zero epochs means it is claimable right away
    assert_eq!(e.p.claim(e.alice, e.alice, true).unwrap(), 10 * BASE_UNIT);
}

#[test]
fn test_forfeit_refunds_principal_only() {
    let mut e = env();
    e.p.set_warmup_length(e.governor, 2).unwrap();
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, true, true).unwrap();

    let fisc_before = e.fisc_of(e.alice);
    assert_eq!(e.p.forfeit(e.alice).unwrap(), 10 * BASE_UNIT);
    assert_eq!(e.fisc_of(e.alice), fisc_before + 10 * BASE_UNIT);
    assert_eq!(e.p.supply_in_warmup(), 0);

    // forfeiting with nothing queued is a zero refund, not an error
    assert_eq!(e.p.forfeit(e.alice).unwrap(), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// LOCKS
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_lock_blocks_external_deposits() {
    let mut e = env();
    e.p.toggle_lock(e.alice);
    e.p.fisc.approve(e.bob, e.staking, 10 * BASE_UNIT);
    let err = e.p.stake(e.bob, e.alice, 10 * BASE_UNIT, true, false).unwrap_err();
    assert_eq!(err, Error::ExternalDepositsLocked);

    // the account itself is unaffected
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, true, false).unwrap();
}

#[test]
fn test_lock_blocks_external_claims() {
    let mut e = env();
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, true, false).unwrap();
    e.p.toggle_lock(e.alice);

    let err = e.p.claim(e.bob, e.alice, true).unwrap_err();
    assert_eq!(err, Error::ExternalClaimsLocked);
    assert_eq!(e.p.claim(e.alice, e.alice, true).unwrap(), 10 * BASE_UNIT);
}

#[test]
fn test_locked_caller_cannot_stake_for_others() {
    let mut e = env();
    e.p.set_warmup_length(e.governor, 1).unwrap();
    e.p.toggle_lock(e.alice);

    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    let err = e.p.stake(e.alice, e.bob, 10 * BASE_UNIT, true, false).unwrap_err();
    assert_eq!(err, Error::ExternalDepositsLocked);

    // unlocking restores third-party deposits
    e.p.toggle_lock(e.alice);
    e.p.stake(e.alice, e.bob, 10 * BASE_UNIT, true, false).unwrap();
    assert_eq!(e.p.supply_in_warmup(), 10 * BASE_UNIT);
}

#[test]
fn test_locked_caller_cannot_claim_for_others() {
    let mut e = env();
    e.p.toggle_lock(e.alice);

    let err = e.p.claim(e.alice, e.bob, true).unwrap_err();
    assert_eq!(err, Error::ExternalClaimsLocked);
}

// ═══════════════════════════════════════════════════════════════════════════════
// UNSTAKE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_unstake_round_trip() {
    let mut e = env();
    let fisc_before = e.fisc_of(e.alice);
    e.p.sfisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    let paid = e.p.unstake(e.alice, e.alice, 10 * BASE_UNIT, false).unwrap();
    assert_eq!(paid, 10 * BASE_UNIT);
    assert_eq!(e.fisc_of(e.alice), fisc_before + 10 * BASE_UNIT);
    assert_eq!(e.sfisc_of(e.alice), 0);
}

#[test]
fn test_unstake_wrapped_converts_through_index() {
    let mut e = env();
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, false, true).unwrap();
    let wrapped = e.p.gfisc.balance_of(e.alice);

    let fisc_before = e.fisc_of(e.alice);
    let paid = e.p.unstake_wrapped(e.alice, e.alice, wrapped, false).unwrap();
    assert_eq!(paid, 10 * BASE_UNIT);
    assert_eq!(e.fisc_of(e.alice), fisc_before + 10 * BASE_UNIT);
    assert_eq!(e.p.gfisc.balance_of(e.alice), 0);
}

// ═══════════════════════════════════════════════════════════════════════════════
// WRAP / UNWRAP
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_wrap_and_unwrap() {
    let mut e = env();
    e.p.sfisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    let wrapped = e.p.wrap(e.alice, e.alice, 10 * BASE_UNIT).unwrap();
    assert_eq!(wrapped, BASE_UNIT as u128); // 10 / index of 10.0
    assert_eq!(e.sfisc_of(e.alice), 0);

    let back = e.p.unwrap(e.alice, e.alice, wrapped).unwrap();
    assert_eq!(back, 10 * BASE_UNIT);
    assert_eq!(e.sfisc_of(e.alice), 10 * BASE_UNIT);
}

#[test]
fn test_wrapped_balance_survives_rebase_unchanged() {
    let mut e = env();
    e.p.sfisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    let wrapped = e.p.wrap(e.alice, e.alice, 10 * BASE_UNIT).unwrap();

    // two turns: first plans the reward, second applies it to the index
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();

    assert_eq!(e.p.gfisc.balance_of(e.alice), wrapped);
    let redeemable = WrappedToken::balance_from(wrapped, e.p.index());
    assert!(redeemable > 10 * BASE_UNIT);
}

// ═══════════════════════════════════════════════════════════════════════════════
// REBASE
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_rebase_is_inert_before_epoch_end() {
    let mut e = env();
    let index = e.p.index();
    let epoch_number = e.p.staking.epoch.number;
    e.p.advance_blocks(5); // epoch ends at block 9
    e.p.rebase(e.alice).unwrap();
    assert_eq!(e.p.index(), index);
    assert_eq!(e.p.staking.epoch.number, epoch_number);
}

#[test]
fn test_rebase_distributes_planned_reward() {
    let mut e = env();

    // first turn: reward of supply * 1000 / 1_000_000 = 1 FISC is minted
    // to the engine and planned as the next distribution
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();
    assert_eq!(e.p.staking.epoch.number, 2);
    assert_eq!(e.p.staking.epoch.distribute, BASE_UNIT);
    assert_eq!(e.p.index(), 10 * INDEX_ONE);

    // second turn: the planned 1 FISC is applied across 500 circulating,
    // growing the index by 0.2%
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();
    assert_eq!(e.p.index(), 10 * INDEX_ONE + 10 * INDEX_ONE / 500);
    assert_eq!(e.sfisc_of(e.alice), 10 * BASE_UNIT + 10 * BASE_UNIT / 500);
}

#[test]
fn test_rebase_plans_zero_when_engine_balance_matches_circulating() {
    // fresh deployment with no distributor: every staked token is backed
    // one-for-one, so there is no surplus to plan
    let governor = Address::from_label("governor");
    let treasury = Address::from_label("treasury");
    let staking = Address::from_label("staking");
    let deployer = Address::from_label("deployer");
    let authority = Authority::new(
        governor,
        Address::from_label("guardian"),
        Address::from_label("policy"),
        treasury,
    )
    .unwrap();
    let config = ProtocolConfig {
        base_address: Address::from_label("fisc"),
        wrapped_address: Address::from_label("gfisc"),
        staking_address: staking,
        treasury_address: treasury,
        epoch_length: 10,
        first_epoch_number: 1,
        first_epoch_end: 9,
        initial_index: INDEX_ONE,
        treasury_timelock_blocks: 0,
    };
    let mut p = Protocol::new(config, authority, deployer).unwrap();
    let auth = p.authority.clone();
    p.fisc.mint(treasury, deployer, 100 * BASE_UNIT, &auth).unwrap();
    p.fisc.approve(deployer, staking, 100 * BASE_UNIT);
    p.stake(deployer, deployer, 100 * BASE_UNIT, true, true).unwrap();

    p.advance_blocks(10);
    p.rebase(deployer).unwrap();
    assert_eq!(p.staking.epoch.distribute, 0);
    assert_eq!(p.staking.epoch.number, 2);
}

#[test]
fn test_rebase_idempotent_within_block() {
    let mut e = env();
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();
    let epoch_number = e.p.staking.epoch.number;
    let index = e.p.index();
    e.p.rebase(e.alice).unwrap();
    assert_eq!(e.p.staking.epoch.number, epoch_number);
    assert_eq!(e.p.index(), index);
}

#[test]
fn test_unstake_trigger_pays_bounty() {
    let mut e = env();
    e.p.set_bounty(e.governor, BASE_UNIT).unwrap();

    e.p.advance_blocks(EPOCH_LENGTH);
    let fisc_before = e.fisc_of(e.alice);
    e.p.sfisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    let paid = e.p.unstake(e.alice, e.alice, 10 * BASE_UNIT, true).unwrap();
    assert_eq!(paid, 11 * BASE_UNIT);
    assert_eq!(e.fisc_of(e.alice), fisc_before + 11 * BASE_UNIT);
}

#[test]
fn test_epoch_bookkeeping_advances_exactly() {
    let mut e = env();
    assert_eq!(e.p.staking.epoch.end, 9);
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();
    assert_eq!(e.p.staking.epoch.end, 19);
    assert_eq!(e.p.staking.epoch.number, 2);
}

#[test]
fn test_deposit_then_warmup_deposit_scenario() {
    // epoch length 10, first number 1, first end 9 (the env defaults)
    let mut e = env();
    e.p.fisc.approve(e.alice, e.staking, 100 * BASE_UNIT);

    // warmup 0, claim: the rebasing balance grows immediately
    let sfisc_before = e.sfisc_of(e.alice);
    e.p.stake(e.alice, e.alice, 50 * BASE_UNIT, true, true).unwrap();
    assert_eq!(e.sfisc_of(e.alice), sfisc_before + 50 * BASE_UNIT);
    assert_eq!(e.p.supply_in_warmup(), 0);

    // warmup 1: the same deposit queues instead
    e.p.set_warmup_length(e.governor, 1).unwrap();
    e.p.stake(e.alice, e.alice, 50 * BASE_UNIT, true, true).unwrap();
    assert_eq!(e.p.supply_in_warmup(), 50 * BASE_UNIT);
    let info = e.p.staking.warmup_info(e.alice).copied().unwrap();
    assert_eq!(info.expiry, e.p.staking.epoch.number + 1);

    // an immediate claim is a silent no-op and keeps the record
    assert_eq!(e.p.claim(e.alice, e.alice, true).unwrap(), 0);
    assert!(e.p.staking.warmup_info(e.alice).is_some());
    assert_eq!(e.p.supply_in_warmup(), 50 * BASE_UNIT);
}

// ═══════════════════════════════════════════════════════════════════════════════
// ADMINISTRATION
// ═══════════════════════════════════════════════════════════════════════════════

#[test]
fn test_admin_entry_points_are_governor_gated() {
    let mut e = env();
    assert!(e.p.set_warmup_length(e.alice, 3).unwrap_err().is_authorization());
    assert!(e.p.install_distributor(e.alice, e.distributor).unwrap_err().is_authorization());
    assert!(e.p.set_bounty(e.alice, 1).unwrap_err().is_authorization());

    e.p.set_warmup_length(e.governor, 3).unwrap();
    assert_eq!(e.p.staking.warmup_period(), 3);
    assert_eq!(e.p.events.of_type("WarmupSet").len(), 1);
}

#[test]
fn test_events_record_the_lifecycle() {
    let mut e = env();
    e.p.fisc.approve(e.alice, e.staking, 10 * BASE_UNIT);
    e.p.stake(e.alice, e.alice, 10 * BASE_UNIT, true, true).unwrap();
    e.p.advance_blocks(EPOCH_LENGTH);
    e.p.rebase(e.alice).unwrap();

    assert!(!e.p.events.of_type("Staked").is_empty());
    assert!(!e.p.events.of_type("Rebased").is_empty());
    assert!(!e.p.events.of_type("Deposited").is_empty());
}
